//! CTAS CLI - Main entry point

use clap::{Parser, Subcommand};
use ctas_core::{AccountId, Amount, RequestId, RequestStatus, Timestamp};
use ctas_rpc::{commands, AppContext, CliConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ctas")]
#[command(about = "CTAS - Cash transfer approval system", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data", global = true)]
    data: PathBuf,

    /// Account performing the operation
    #[arg(long, env = "CTAS_CALLER", global = true)]
    caller: Option<AccountId>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the system with an owner and initial treasury funding
    Deploy {
        #[arg(long)]
        owner: AccountId,
        #[arg(long)]
        initial_fund: Amount,
    },

    /// Credit the treasury (caller is recorded as the sender)
    Deposit { amount: Amount },

    /// Whitelist an implementing partner (owner only)
    AddIp { account: AccountId },

    /// Register a fund manager (owner only)
    AddFundManager { account: AccountId },

    /// Remove an implementing partner (owner only)
    RemoveIp { account: AccountId },

    /// Remove a fund manager (owner only)
    RemoveFundManager { account: AccountId },

    /// File a fund request (whitelisted IP only)
    RequestFund {
        amount: Amount,
        description: String,
        /// Seconds since the Unix epoch
        deadline: Timestamp,
    },

    /// Approve a pending request (fund manager only)
    Approve { id: RequestId },

    /// Reject a pending request (fund manager only)
    Reject { id: RequestId },

    /// Release an approved request to its requester (fund manager only)
    Release { id: RequestId },

    /// Print a request's status code
    Status { id: RequestId },

    /// Print a request as JSON
    Show { id: RequestId },

    /// List requests
    List {
        /// pending, approved, rejected or released
        #[arg(long)]
        status: Option<RequestStatus>,
    },

    /// Print the treasury balance
    Balance,

    /// Request counts per status
    Stats,

    /// Verify the journal hash chain
    Audit,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };

    // Audit reads the raw journal, so a broken chain is reported rather
    // than failing replay
    if matches!(cli.command, Commands::Audit) {
        commands::audit(&cli.data.join("journal"))?;
        return Ok(());
    }

    let caller = match cli.caller {
        Some(caller) => Some(caller),
        None => config.caller.as_deref().map(AccountId::new).transpose()?,
    };

    let mut ctx = AppContext::new(&cli.data, config)?;
    run(&mut ctx, cli.command, caller)
}

fn run(ctx: &mut AppContext, command: Commands, caller: Option<AccountId>) -> anyhow::Result<()> {
    let require_caller =
        || caller.clone().ok_or_else(|| anyhow::anyhow!("--caller (or CTAS_CALLER) is required"));

    match command {
        Commands::Deploy {
            owner,
            initial_fund,
        } => {
            commands::deploy(ctx, owner, initial_fund)?;
        }

        Commands::Deposit { amount } => {
            commands::deposit(ctx, &require_caller()?, amount)?;
        }

        Commands::AddIp { account } => {
            commands::add_ip(ctx, &require_caller()?, account)?;
        }

        Commands::AddFundManager { account } => {
            commands::add_fund_manager(ctx, &require_caller()?, account)?;
        }

        Commands::RemoveIp { account } => {
            commands::remove_ip(ctx, &require_caller()?, &account)?;
        }

        Commands::RemoveFundManager { account } => {
            commands::remove_fund_manager(ctx, &require_caller()?, &account)?;
        }

        Commands::RequestFund {
            amount,
            description,
            deadline,
        } => {
            commands::request_fund(ctx, &require_caller()?, amount, &description, deadline)?;
        }

        Commands::Approve { id } => {
            commands::approve(ctx, &require_caller()?, id)?;
        }

        Commands::Reject { id } => {
            commands::reject(ctx, &require_caller()?, id)?;
        }

        Commands::Release { id } => {
            commands::release(ctx, &require_caller()?, id)?;
        }

        Commands::Status { id } => {
            commands::status(ctx, id)?;
        }

        Commands::Show { id } => {
            commands::show(ctx, id)?;
        }

        Commands::List { status } => {
            commands::list(ctx, status)?;
        }

        Commands::Balance => {
            commands::balance(ctx)?;
        }

        Commands::Stats => {
            commands::stats(ctx)?;
        }

        Commands::Audit => {
            commands::audit(ctx.journal_path())?;
        }
    }

    Ok(())
}
