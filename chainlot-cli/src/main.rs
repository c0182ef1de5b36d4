mod commands;

use chainlot_core::{
    AccountKeeper, ChainConfig, ChainlotError, ContractResolver, Environment, Ledger,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chainlot")]
#[command(about = "Smart-contract lottery toolkit - mocks, funding and round lifecycle")]
#[command(version)]
struct Cli {
    /// Target network (development, ganache-local, mainnet-fork, or a live name)
    #[arg(short, long, global = true, default_value = "development")]
    network: String,

    /// Data directory for deployment records
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dev accounts and their native balances
    Accounts,
    /// Deploy the mock contract suite (local networks only)
    DeployMocks {
        /// Price feed precision
        #[arg(long)]
        decimals: Option<u8>,
        /// Initial price feed answer, in feed fixed-point units
        #[arg(long)]
        initial_answer: Option<u128>,
    },
    /// Show the current entrance fee
    Fee,
    /// Run a full lottery round against a local network
    Run {
        /// Number of dev accounts entering the round
        #[arg(long, default_value_t = 3)]
        players: usize,
        /// Randomness value to deliver; random when omitted
        #[arg(long)]
        randomness: Option<u128>,
    },
    /// List recorded deployments for the network
    Deployments {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "chainlot={},chainlot_engine={},chainlot_core={}",
            log_level, log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get data directory
    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chainlot")
    });
    tokio::fs::create_dir_all(&data_dir).await?;

    let environment: Environment = cli.network.parse()?;
    let config = ChainConfig::new(environment.clone());

    let keeper = AccountKeeper::new(config.clone());
    let ledger = Arc::new(Ledger::new());
    if environment.is_local() || environment.is_forked() {
        keeper.fund_dev_accounts(&ledger);
    }

    let resolver = ContractResolver::new(config, &data_dir).await?;

    let result = match cli.command {
        Commands::Accounts => commands::show_accounts(&keeper, &ledger).await,
        Commands::DeployMocks {
            decimals,
            initial_answer,
        } => commands::deploy_mocks(&resolver, decimals, initial_answer).await,
        Commands::Fee => commands::show_fee(&resolver).await,
        Commands::Run {
            players,
            randomness,
        } => commands::run_round(&resolver, &keeper, ledger.clone(), players, randomness).await,
        Commands::Deployments { json } => commands::list_deployments(&resolver, json).await,
    };

    if let Err(e) = result {
        if let Some(core_err) = e.downcast_ref::<ChainlotError>() {
            match core_err {
                ChainlotError::MissingContract { name, network } => {
                    eprintln!("Error: no contract '{}' available on network '{}'", name, network);
                    eprintln!("Configure its address, or run against a local development network");
                }
                ChainlotError::InsufficientFunds { need, available } => {
                    eprintln!("Error: insufficient funds");
                    eprintln!("Need: {} wei, Available: {} wei", need, available);
                }
                other => eprintln!("Error: {}", other),
            }
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}
