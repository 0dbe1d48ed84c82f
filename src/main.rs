//! `fayol`: command-line access to the Fayol API.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use fayol_client::config::{load_config, ClientConfig};
use fayol_client::models::{LaunchType, LoginInput, Pagination, TransactionFilters};
use fayol_client::observability::logging::init_logging;
use fayol_client::ApiClient;

#[derive(Parser)]
#[command(name = "fayol")]
#[command(about = "Command-line client for the Fayol API", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL, overrides the configuration file
    #[arg(short, long)]
    url: Option<String>,

    /// Bearer token for authenticated calls
    #[arg(short, long, env = "FAYOL_TOKEN")]
    token: Option<String>,

    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List accounts, or show one
    Accounts { id: Option<String> },
    /// List transactions, or show the totals
    Transactions {
        #[arg(long = "type", value_parser = parse_launch_type)]
        launch_type: Option<LaunchType>,
        #[arg(long)]
        account: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        /// Print income/expense totals instead of the list
        #[arg(long)]
        summary: bool,
    },
    /// List categories, or show one
    Categories { id: Option<String> },
    /// List budgets, or show one
    Budgets { id: Option<String> },
    /// List goals, or show one
    Goals { id: Option<String> },
    /// Dashboard overview
    Dashboard,
    /// Monthly report when a month is given, yearly otherwise
    Report { year: i32, month: Option<u32> },
    /// Log in and print the issued tokens
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "FAYOL_PASSWORD")]
        password: String,
    },
}

fn parse_launch_type(raw: &str) -> Result<LaunchType, String> {
    match raw.to_ascii_uppercase().as_str() {
        "INCOME" => Ok(LaunchType::Income),
        "EXPENSE" => Ok(LaunchType::Expense),
        "TRANSFER" => Ok(LaunchType::Transfer),
        other => Err(format!("unknown transaction type '{}'", other)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = cli.url {
        config.base_url = url;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    // One-shot commands have no use for the background sweeper
    config.cache.cleanup_interval_ms = 0;

    init_logging(&config.observability.log_level);
    tracing::debug!(base_url = %config.base_url, "Starting fayol");

    let client = ApiClient::new(config)?;
    if let Some(token) = cli.token {
        client.set_token(token).await;
    }

    match cli.command {
        Commands::Accounts { id } => match id {
            Some(id) => print_json(&client.accounts().get(&id).await?)?,
            None => print_json(&client.accounts().list().await?)?,
        },
        Commands::Transactions {
            launch_type,
            account,
            start,
            end,
            page,
            limit,
            summary,
        } => {
            let filters = TransactionFilters {
                account_id: account,
                launch_type,
                start_date: start,
                end_date: end,
                ..Default::default()
            };
            let transactions = client.transactions();
            if summary {
                print_json(&transactions.summary(&filters).await?)?;
            } else {
                let page = transactions
                    .list_filtered(&filters, Pagination { page, limit })
                    .await?;
                print_json(&page)?;
            }
        }
        Commands::Categories { id } => match id {
            Some(id) => print_json(&client.categories().get(&id).await?)?,
            None => print_json(&client.categories().list().await?)?,
        },
        Commands::Budgets { id } => match id {
            Some(id) => print_json(&client.budgets().get(&id).await?)?,
            None => print_json(&client.budgets().list().await?)?,
        },
        Commands::Goals { id } => match id {
            Some(id) => print_json(&client.goals().get(&id).await?)?,
            None => print_json(&client.goals().list().await?)?,
        },
        Commands::Dashboard => print_json(&client.reports().dashboard().await?)?,
        Commands::Report { year, month } => {
            let report = match month {
                Some(month) => client.reports().monthly(year, month).await?,
                None => client.reports().yearly(year).await?,
            };
            print_json(&report)?;
        }
        Commands::Login { email, password } => {
            let auth = client.auth().login(&LoginInput { email, password }).await?;
            print_json(&auth)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
