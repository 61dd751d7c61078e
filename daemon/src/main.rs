//! votereward drives voting-reward epochs against a fixture of votes and
//! balances, persisting the epoch ledger between invocations.

mod fixture;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::{json, Value};

use votereward_ledger::Collection;
use votereward_node::{
    init_logging, DistributionDriver, DistributionOutcome, DriverConfig, DriverError, LogFormat,
};
use votereward_store_lmdb::LmdbMetaStore;
use votereward_types::{AccountId, Boundary};

use crate::fixture::{parse_account, Fixture};

#[derive(Parser)]
#[command(name = "votereward", about = "Voting rewards epoch distribution")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "VOTEREWARD_CONFIG")]
    config: Option<PathBuf>,

    /// JSON fixture describing votes, balances and the current boundary.
    #[arg(long, env = "VOTEREWARD_FIXTURE")]
    fixture: Option<PathBuf>,

    /// Directory holding the persisted ledger.
    #[arg(long, env = "VOTEREWARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Override the fixture's current boundary.
    #[arg(long, env = "VOTEREWARD_NOW")]
    now: Option<u64>,

    /// Beneficiaries evaluated per worker task.
    #[arg(long, env = "VOTEREWARD_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Maximum concurrent worker tasks.
    #[arg(long, env = "VOTEREWARD_MAX_CONCURRENT")]
    max_concurrent: Option<usize>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VOTEREWARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VOTEREWARD_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Open the distribution window for the current epoch.
    Open {
        /// First boundary of the epoch.
        #[arg(long)]
        start: u64,
    },
    /// Evaluate and lock rewards in the open window.
    Distribute {
        /// Comma-separated accounts; the fixture's beneficiaries when omitted.
        #[arg(long, value_delimiter = ',')]
        accounts: Vec<String>,
    },
    /// Close the open window and reserve its total.
    Close,
    /// Withdraw matured rewards.
    Collect {
        #[arg(long, value_delimiter = ',')]
        accounts: Vec<String>,
    },
    /// Show ledger state.
    Status {
        /// Also print Prometheus metrics.
        #[arg(long)]
        metrics: bool,
        /// Also list every reward record of these accounts.
        #[arg(long, value_delimiter = ',')]
        accounts: Vec<String>,
    },
    /// Open, distribute and close in one step.
    Run {
        #[arg(long)]
        start: u64,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn effective_config(cli: &Cli) -> anyhow::Result<DriverConfig> {
    let mut config = match &cli.config {
        Some(path) => DriverConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DriverConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(n) = cli.batch_size {
        config.batch_size = n;
    }
    if let Some(n) = cli.max_concurrent {
        config.max_concurrent = n;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    config.validate()?;
    Ok(config)
}

fn resolve_accounts(requested: &[String], fallback: &[AccountId]) -> anyhow::Result<Vec<AccountId>> {
    if requested.is_empty() {
        return Ok(fallback.to_vec());
    }
    requested.iter().map(|a| parse_account(a)).collect()
}

fn error_json(err: &DriverError) -> Value {
    json!({ "status": "error", "error": err.to_string() })
}

fn collection_json(result: &Result<Collection, DriverError>) -> Value {
    match result {
        Ok(c) => json!({
            "status": "collected",
            "amount": c.amount,
            "epochs": c.withdrawn.iter().map(|(e, _)| e).collect::<Vec<_>>(),
        }),
        Err(e) => error_json(e),
    }
}

fn distribution_json(result: &Result<DistributionOutcome, DriverError>) -> Value {
    match result {
        Ok(DistributionOutcome::Locked {
            amount,
            lock_boundary,
        }) => json!({ "status": "locked", "amount": amount, "lock_boundary": lock_boundary }),
        Ok(DistributionOutcome::Skipped) => json!({ "status": "skipped" }),
        Err(e) => error_json(e),
    }
}

fn print(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = effective_config(&cli)?;
    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;

    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let fixture_path = cli
        .fixture
        .as_ref()
        .context("--fixture (or VOTEREWARD_FIXTURE) is required")?;
    let world = Fixture::from_file(fixture_path)?.build()?;
    if let Some(now) = cli.now {
        world.clock.set(now);
    }

    let store = Arc::new(
        LmdbMetaStore::open(&config.data_dir)
            .with_context(|| format!("opening data dir {}", config.data_dir.display()))?,
    );
    let driver = DistributionDriver::new(&config, world.collaborators.clone())?.with_store(store)?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        beneficiaries = world.beneficiaries.len(),
        "driver ready"
    );

    let output = match &cli.command {
        Command::Open { start } => {
            let epoch = driver.open_epoch(Boundary::new(*start)).await?;
            json!({ "opened": epoch })
        }
        Command::Distribute { accounts } => {
            let accounts = resolve_accounts(accounts, &world.beneficiaries)?;
            let report = driver.distribute(&accounts).await?;
            json!({
                "epoch": report.epoch,
                "total_locked": report.total_locked(),
                "results": report
                    .results
                    .iter()
                    .map(|(a, r)| (a.to_string(), distribution_json(r)))
                    .collect::<serde_json::Map<_, _>>(),
            })
        }
        Command::Close => {
            let closure = driver.close_epoch().await?;
            json!({ "closed": closure, "vault": world.vault.requests() })
        }
        Command::Collect { accounts } => {
            let accounts = resolve_accounts(accounts, &world.beneficiaries)?;
            let report = driver.collect(&accounts).await?;
            json!({
                "total_collected": report.total_collected(),
                "results": report
                    .results
                    .iter()
                    .map(|(a, r)| (a.to_string(), collection_json(r)))
                    .collect::<serde_json::Map<_, _>>(),
                "vault": world.vault.requests(),
            })
        }
        Command::Status { metrics, accounts } => {
            let status = driver.status().await;
            let ledger = driver.ledger().await;
            let mut rewards = serde_json::Map::new();
            for account in resolve_accounts(accounts, &[])? {
                rewards.insert(account.to_string(), json!(ledger.rewards_for(&account)));
            }
            let mut out = json!({
                "now": status.now,
                "current_epoch": status.current_epoch,
                "window": status.window,
                "last_distribution": status.last_distribution,
                "next_min_start": status.next_min_start,
                "total_locked": status.total_locked,
                "params": status.params,
                "history": ledger.epoch_history(),
                "rewards": rewards,
            });
            if *metrics {
                out["metrics"] = Value::String(driver.metrics().encode()?);
            }
            out
        }
        Command::Run { start } => {
            let run = driver
                .run_epoch(Boundary::new(*start), &world.beneficiaries)
                .await?;
            json!({
                "epoch": run.epoch,
                "results": run
                    .distribution
                    .results
                    .iter()
                    .map(|(a, r)| (a.to_string(), distribution_json(r)))
                    .collect::<serde_json::Map<_, _>>(),
                "closed": run.closure,
                "vault": world.vault.requests(),
            })
        }
        Command::Config => Value::Null,
    };

    print(&output)
}
