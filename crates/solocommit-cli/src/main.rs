//! `solocommit`: derive a commitment contract and run one action on it.
//!
//! ```text
//! solocommit <balance|release|cancel|sweep> [EXPIRATION_HEIGHT]
//! ```
//!
//! Keys and endpoints come from flags or the environment (a `.env` file in
//! the working directory is loaded first). Results are printed to stdout as
//! JSON; logs go to stderr.

mod args;

use std::process::ExitCode;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Parser;
use serde_json::json;
use solocommit_chain::{ElectrumClient, ElectrumProvider, StatsClient};
use solocommit_contract::{Artifact, ContractHandle};
use solocommit_settlement::{SettlementEngine, estimate_height_from_tip};
use solocommit_types::{
    ChainTip, CommitmentParameters, Result, SettlementConfig, constants, total_value,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::Args;

/// How far ahead the default expiration lies.
const DEFAULT_EXPIRATION_MINUTES: i64 = 5;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.log_json);

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Ignoring unreadable environment file"),
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "solocommit failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(args: Args) -> Result<()> {
    let timeout = Duration::from_secs(args.timeout_secs);
    let config = SettlementConfig::new(
        args.tx_fee,
        constants::P2PKH_DUST,
        args.network,
        args.address_type,
    )?;

    let expiration = match args.expiration {
        Some(height) => height,
        None => {
            let tip = StatsClient::new(&args.stats_url, timeout)?.tip().await?;
            let height = default_expiration(&tip, Utc::now());
            info!(
                tip_height = tip.height,
                tip_time = %tip.time,
                expiration = height,
                "Estimated expiration height"
            );
            height
        }
    };

    let parameters = CommitmentParameters::from_public_keys(
        &args.owner_pubkey,
        &args.arbiter_pubkey,
        expiration,
        args.claim_amount,
    )?;
    let artifact = match &args.artifact {
        Some(path) => Artifact::from_file(path)?,
        None => {
            warn!("No --artifact given; using the bundled stand-in contract");
            Artifact::bundled()?
        }
    };
    let provider =
        ElectrumProvider::new(ElectrumClient::new(&args.electrum).with_timeout(timeout));
    let handle = ContractHandle::derive(parameters, &artifact, &config, provider)?;

    info!(
        action = ?args.action,
        address = %handle.address(),
        owner = %handle.parameters().owner_hash(),
        arbiter = %handle.parameters().arbiter_hash(),
        expiration,
        claim_amount = args.claim_amount,
        bytesize = handle.bytesize(),
        "Contract"
    );

    let Some((action, signer)) = args.action.settlement(args.signer) else {
        return print_balance(&handle).await;
    };
    let credential = args.credential(signer)?;
    let engine = SettlementEngine::new(handle, config)?;
    let outcome = engine.settle(action, &credential).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Height expected [`DEFAULT_EXPIRATION_MINUTES`] after `now`.
fn default_expiration(tip: &ChainTip, now: DateTime<Utc>) -> u64 {
    estimate_height_from_tip(tip, now + chrono::Duration::minutes(DEFAULT_EXPIRATION_MINUTES))
}

async fn print_balance(handle: &ContractHandle<ElectrumProvider>) -> Result<()> {
    let utxos = handle.utxos().await?;
    let balance = total_value(&utxos)?;
    let report = json!({
        "address": handle.address().as_str(),
        "balance": balance,
        "utxos": utxos,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
