//! Block height estimation from wall-clock time.

use chrono::{DateTime, Utc};
use solocommit_types::{ChainTip, constants};

/// Estimate the block height at `target_time` from a reference tip.
///
/// `block_diff = round((current_time - target_time) / avg_block_secs)`, with
/// halves rounded toward positive infinity, and the result is
/// `current_height - block_diff` clamped at zero. Targets in the future
/// therefore estimate heights above `current_height`.
///
/// Differences are taken in milliseconds and rounded once, so no precision
/// is lost to intermediate division. A zero `avg_block_secs` is treated as
/// one second.
#[must_use]
pub fn estimate_height(
    current_height: u64,
    current_time: DateTime<Utc>,
    target_time: DateTime<Utc>,
    avg_block_secs: u64,
) -> u64 {
    let diff_ms = i128::from((current_time - target_time).num_milliseconds());
    let block_ms = i128::from(avg_block_secs.max(1)) * 1000;
    // floor(x + 1/2) == floor((2x + 1) / 2)
    let block_diff = (2 * diff_ms + block_ms).div_euclid(2 * block_ms);
    let height = i128::from(current_height) - block_diff;
    u64::try_from(height.max(0)).unwrap_or(u64::MAX)
}

/// [`estimate_height`] from a [`ChainTip`] with the network's average block
/// interval.
#[must_use]
pub fn estimate_height_from_tip(tip: &ChainTip, target_time: DateTime<Utc>) -> u64 {
    estimate_height(
        tip.height,
        tip.time,
        target_time,
        constants::AVG_BLOCK_TIME_SECS,
    )
}
