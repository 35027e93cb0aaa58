//! Settlement actions and the roles that may authorize them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CommitError;

/// One of the three ways escrowed funds are finally disbursed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementAction {
    /// Arbiter co-signs an early payout of the claim amount to the owner.
    Release,
    /// Owner or arbiter splits the remaining funds 70/30.
    Cancel,
    /// After expiration the arbiter pays everything left to the owner.
    Sweep,
}

impl SettlementAction {
    /// All actions, in contract ABI order.
    pub const ALL: [Self; 3] = [Self::Release, Self::Cancel, Self::Sweep];

    /// The contract function this action spends through.
    #[must_use]
    pub fn function_name(&self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Cancel => "cancel",
            Self::Sweep => "sweep",
        }
    }

    /// The role whose credential this action accepts.
    #[must_use]
    pub fn required_role(&self) -> Role {
        match self {
            Self::Release | Self::Sweep => Role::Arbiter,
            Self::Cancel => Role::OwnerOrArbiter,
        }
    }
}

impl fmt::Display for SettlementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function_name())
    }
}

impl FromStr for SettlementAction {
    type Err = CommitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "release" => Ok(Self::Release),
            "cancel" => Ok(Self::Cancel),
            "sweep" => Ok(Self::Sweep),
            other => Err(CommitError::invalid_input(format!(
                "unknown settlement action '{other}'"
            ))),
        }
    }
}

/// A party entitled to sign for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Arbiter,
    /// Either party.
    OwnerOrArbiter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Arbiter => write!(f, "arbiter"),
            Self::OwnerOrArbiter => write!(f, "owner or arbiter"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_roles() {
        assert_eq!(SettlementAction::Release.required_role(), Role::Arbiter);
        assert_eq!(SettlementAction::Sweep.required_role(), Role::Arbiter);
        assert_eq!(SettlementAction::Cancel.required_role(), Role::OwnerOrArbiter);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            "Release".parse::<SettlementAction>().unwrap(),
            SettlementAction::Release
        );
        assert_eq!(
            "SWEEP".parse::<SettlementAction>().unwrap(),
            SettlementAction::Sweep
        );
        assert!("balance".parse::<SettlementAction>().is_err());
    }

    #[test]
    fn display_matches_function_name() {
        for action in SettlementAction::ALL {
            assert_eq!(action.to_string(), action.function_name());
        }
    }
}
