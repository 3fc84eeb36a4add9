//! proofdesk: connect to a wallet provider, list its accounts with their
//! balances and proofs, and create or update an account's proof.

mod config;

use anyhow::{bail, Context};
use clap::Parser;
use proofdesk_contract::RpcProofContract;
use proofdesk_provider::{ProviderError, RpcProvider};
use proofdesk_rpc::HttpTransport;
use proofdesk_session::render::{connect_error_message, render_account, render_session};
use proofdesk_session::{OpenOutcome, ProofOutcome, SessionController};
use proofdesk_types::{Address, ProofTerms};
use proofdesk_utils::{init_logging, LogFormat};
use std::path::PathBuf;

use crate::config::ClientConfig;

#[derive(Parser)]
#[command(name = "proofdesk", about = "Wallet session client for the proof contract")]
struct Cli {
    /// JSON-RPC endpoint of the wallet provider.
    #[arg(long, env = "PROOFDESK_PROVIDER_URL")]
    provider_url: Option<String>,

    /// Address of the proof contract.
    #[arg(long, env = "PROOFDESK_CONTRACT")]
    contract: Option<String>,

    /// Expected chain id of the provider.
    #[arg(long, env = "PROOFDESK_CHAIN_ID")]
    chain_id: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "PROOFDESK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "PROOFDESK_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Connect and list every authorized account.
    Accounts,
    /// Create the proof of an account that has none.
    CreateProof(TermsArgs),
    /// Replace the terms of an account's existing proof.
    UpdateProof(TermsArgs),
}

#[derive(clap::Args)]
struct TermsArgs {
    /// Account to act for. Must be one of the wallet's accounts.
    #[arg(long)]
    account: String,

    #[arg(long)]
    proof_type: u8,

    /// Interval in seconds.
    #[arg(long)]
    interval: u64,

    /// Amount in wei.
    #[arg(long)]
    amount: u128,
}

impl TermsArgs {
    fn terms(&self) -> ProofTerms {
        ProofTerms {
            proof_type: self.proof_type,
            interval: self.interval,
            amount: self.amount,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_toml_file(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = &cli.provider_url {
        config.provider_url = Some(url.clone());
    }
    if let Some(contract) = &cli.contract {
        config.contract_address = Some(contract.clone());
    }
    if let Some(chain_id) = cli.chain_id {
        config.chain_id = Some(chain_id);
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    config.validate()?;
    Ok(config)
}

type Controller = SessionController<RpcProvider, RpcProofContract>;

/// Open the session and fail unless at least one account is connected.
async fn connect(ctl: &Controller) -> anyhow::Result<()> {
    match ctl.open_session().await {
        OpenOutcome::Connected { .. } => Ok(()),
        OpenOutcome::NoAuthorizedAccounts => bail!("the wallet did not authorize any account"),
        OpenOutcome::Failed(error) => bail!(connect_error_message(&error)),
        other => bail!("session did not open: {other:?}"),
    }
}

async fn run_proof_command(ctl: &Controller, args: &TermsArgs, update: bool) -> anyhow::Result<()> {
    connect(ctl).await?;
    let account = Address::new(args.account.as_str());
    let outcome = if update {
        ctl.update_proof_for(&account, args.terms()).await
    } else {
        ctl.create_proof_for(&account, args.terms()).await
    };

    match outcome {
        ProofOutcome::Created(receipt) | ProofOutcome::Updated(receipt) => {
            println!("confirmed in transaction {}", receipt.tx_hash);
        }
        ProofOutcome::Refused(reason) => println!("nothing to do: {reason}"),
        ProofOutcome::UnknownAccount => {
            bail!("{account} is not one of the wallet's accounts")
        }
        ProofOutcome::Failed(err) => return Err(err.into()),
        other => bail!("proof command did not run: {other:?}"),
    }

    if let Some(view) = ctl.snapshot().account(&account) {
        println!("{}", render_account(view));
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level);

    let Some(url) = config.provider_url.as_deref() else {
        bail!(connect_error_message(
            &ProviderError::Unavailable.to_connect_error()
        ));
    };
    let transport = HttpTransport::with_timeout(url, config.request_timeout())
        .with_context(|| format!("invalid provider endpoint {url}"))?;
    tracing::debug!(url = transport.url(), "using wallet provider");

    let contract_address = config
        .contract_address
        .as_deref()
        .context("no proof contract configured (set --contract or PROOFDESK_CONTRACT)")?;
    let contract = RpcProofContract::new(transport.clone(), Address::new(contract_address))?
        .with_receipt_policy(config.receipt_policy());
    contract.check_deployment(config.chain_id).await?;

    let ctl = SessionController::new(RpcProvider::new(transport), contract);

    match &cli.command {
        Command::Accounts => {
            let outcome = ctl.open_session().await;
            if outcome == OpenOutcome::NoAuthorizedAccounts {
                println!("The wallet did not authorize any account.");
            } else {
                println!("{}", render_session(&ctl.snapshot()));
            }
        }
        Command::CreateProof(args) => run_proof_command(&ctl, args, false).await?,
        Command::UpdateProof(args) => run_proof_command(&ctl, args, true).await?,
    }

    Ok(())
}
