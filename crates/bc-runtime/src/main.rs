//! # Block-Chain Wallet
//!
//! Runs a wallet host with in-memory collaborators, opens a page against it
//! and answers approval windows from the terminal.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (`RUST_LOG`, default `info`)
//! 2. Load configuration (file, then `BCW_*` environment)
//! 3. Start the wallet host and the approval driver
//! 4. Run the requested page calls
//! 5. Shut down, rejecting anything still pending

use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bc_runtime::demo::{self, report};
use bc_runtime::{Decision, Policy, RuntimeConfig, Wallet};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bc-wallet")]
#[command(author, version, about = "Wallet bridge with user-approved page calls", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "BCW_CONFIG")]
    config: Option<PathBuf>,

    /// URL of the page making calls
    #[arg(long, default_value = "https://dapp.example")]
    origin: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scripted walkthrough: approve the connect, deny the signature
    Demo {
        /// URL of a second page that never connects
        #[arg(long, default_value = "https://other.example")]
        other_origin: String,
    },
    /// Issue one page call
    Call {
        /// Method name, e.g. `signMessage`
        method: String,

        /// JSON params
        #[arg(default_value = "{}")]
        params: String,

        /// Connect the page first
        #[arg(long)]
        connect: bool,

        /// Answer every approval window this way instead of asking
        #[arg(long, value_enum)]
        decision: Option<Decision>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = RuntimeConfig::load(args.config.as_deref())?;
    info!(
        version = bc_wallet_host::VERSION,
        extension_id = %config.host.trust.extension_id,
        "Starting wallet"
    );

    let command = args.command.unwrap_or(Command::Demo {
        other_origin: "https://other.example".into(),
    });

    let policy = match &command {
        Command::Demo { .. } => Policy::Script(VecDeque::from([Decision::Approve, Decision::Deny])),
        Command::Call { decision: Some(decision), .. } => Policy::Fixed(*decision),
        Command::Call { decision: None, .. } => Policy::Prompt,
    };
    let mut wallet = Wallet::start(&config, policy)?;

    let run = async {
        match command {
            Command::Demo { other_origin } => {
                demo::run_demo(&mut wallet, &args.origin, &other_origin).await
            }
            Command::Call {
                method,
                params,
                connect,
                ..
            } => {
                let params = serde_json::from_str(&params).context("params must be JSON")?;
                let result =
                    demo::run_call(&mut wallet, &args.origin, &method, params, connect).await?;
                report(&method, result);
                Ok(())
            }
        }
    };

    tokio::select! {
        result = run => result?,
        _ = tokio::signal::ctrl_c() => warn!("Interrupted"),
    }

    let cut_short = wallet.shutdown();
    info!(pending_rejected = cut_short, "Wallet stopped");
    Ok(())
}
