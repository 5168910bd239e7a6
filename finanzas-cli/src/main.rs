use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use finanzas_core::YearMonth;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod auth;
mod commands;
mod config;
mod gendata;
mod state;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FINANZAS_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "finanzas", version = VERSION, about = "Personal finance statements: import, summarize, categorize, project")]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Statements to load and the view to compute over
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Statement files, imported and merged in order
    #[arg(long, required = true, num_args = 1..)]
    pub csv: Vec<PathBuf>,

    /// First day of the view (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["from_month", "to_month"])]
    pub from: Option<NaiveDate>,

    /// Last day of the view (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["from_month", "to_month"])]
    pub to: Option<NaiveDate>,

    /// First month of the view (YYYY-MM)
    #[arg(long)]
    pub from_month: Option<YearMonth>,

    /// Last month of the view (YYYY-MM); clamped to the newest row
    #[arg(long)]
    pub to_month: Option<YearMonth>,

    /// Include hidden rows
    #[arg(long)]
    pub show_hidden: bool,

    /// Hide rows by index before computing
    #[arg(long, num_args = 1..)]
    pub hide: Vec<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import and merge statements, optionally exporting the native CSV
    Import {
        #[command(flatten)]
        data: DataArgs,

        /// Write the merged dataset here
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Date range, totals and income/expense breakdowns
    Summary {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Average monthly spend per category/subcategory
    Averages {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Balance trend and projection toward a target balance
    Trend {
        #[command(flatten)]
        data: DataArgs,

        /// Target balance
        #[arg(long, allow_negative_numbers = true)]
        target: f64,

        /// Monthly rate to use instead of the historical one
        #[arg(long, allow_negative_numbers = true)]
        rate: Option<f64>,
    },

    /// Find rows by concept, category or subcategory
    Search {
        term: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Categorize uncategorized rows in batches and export the result
    Categorize {
        #[command(flatten)]
        data: DataArgs,

        /// Write the categorized dataset here
        #[arg(long)]
        out: PathBuf,

        /// Use the offline keyword rules instead of the configured service
        #[arg(long)]
        offline: bool,

        #[arg(long)]
        batch_size: Option<usize>,

        /// Allow categories not yet in the dataset
        #[arg(long)]
        all_categories: bool,

        /// Only categorize the row itself, not others with the same concept
        #[arg(long)]
        no_similar: bool,
    },

    /// Write a synthetic native dataset
    Gendata {
        #[arg(long)]
        out: PathBuf,

        /// Days of history ending today
        #[arg(long, default_value_t = 180)]
        days: u64,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value_t = 5000.0)]
        initial_balance: f64,
    },

    /// Manage ~/.finanzas/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Manage stored credentials
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Store an OpenAI API key in ~/.finanzas/auth.json
    PasteOpenaiApiKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG > --verbose > info
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    match cli.command {
        Command::Import { data, out } => commands::cmd_import(&data, out.as_deref()),
        Command::Summary { data } => commands::cmd_summary(&data),
        Command::Averages { data } => commands::cmd_averages(&data),
        Command::Trend { data, target, rate } => commands::cmd_trend(&data, target, rate),
        Command::Search { term, data } => commands::cmd_search(&data, &term),
        Command::Categorize {
            data,
            out,
            offline,
            batch_size,
            all_categories,
            no_similar,
        } => {
            commands::cmd_categorize(
                &data,
                &out,
                commands::CategorizeFlags {
                    offline,
                    batch_size,
                    all_categories,
                    no_similar,
                },
            )
            .await
        }
        Command::Gendata {
            out,
            days,
            seed,
            initial_balance,
        } => commands::cmd_gendata(&out, days, seed, initial_balance),
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(),
        },
        Command::Auth { command } => match command {
            AuthCommand::PasteOpenaiApiKey => auth::openai_paste_api_key(),
        },
    }
}
