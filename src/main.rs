//! # Product Scout CLI (`scout`)
//!
//! ## Usage
//!
//! ```bash
//! scout --config ./config/scout.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scout init` | Create the SQLite database and run schema migrations |
//! | `scout search "<keyword>"` | Fetch, filter, and store matching products |
//! | `scout get <id>` | Show one stored product |
//! | `scout recent` | List the most recently captured distinct titles |
//! | `scout serve` | Start the HTTP API server |
//! | `scout completions <shell>` | Print a shell completion script |
//!
//! ## Examples
//!
//! ```bash
//! scout init --config ./config/scout.toml
//! scout search "mechanical keyboard" --min-rating 4.5 --prime
//! scout search laptop --min-price 500 --max-price 1500
//! scout serve --config ./config/scout.toml
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use rust_decimal::Decimal;
use std::path::PathBuf;

use product_scout::search::SearchArgs;
use product_scout::{config, get, logging, migrate, search, server};

/// Product Scout CLI. Searches a storefront, filters the listings, and
/// serves de-duplicated results over HTTP.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file.
#[derive(Parser)]
#[command(
    name = "scout",
    about = "Product Scout: storefront product search with price/rating/prime filtering",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/scout.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent; safe to run repeatedly.
    Init,

    /// Search the storefront and store matching products.
    Search {
        /// Search keyword; spaces are allowed.
        keyword: String,

        /// Minimum price (inclusive).
        #[arg(long)]
        min_price: Option<Decimal>,

        /// Maximum price (inclusive). Unbounded when omitted.
        #[arg(long)]
        max_price: Option<Decimal>,

        /// Minimum rating (inclusive).
        #[arg(long)]
        min_rating: Option<Decimal>,

        /// Only keep prime-eligible listings.
        #[arg(long)]
        prime: bool,
    },

    /// Show a stored product by id.
    Get {
        /// Product id.
        id: i64,
    },

    /// List the most recently captured distinct titles.
    Recent,

    /// Start the HTTP API server on `[server].bind`.
    Serve,

    /// Print a shell completion script to stdout.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init();

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "scout", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Search {
            keyword,
            min_price,
            max_price,
            min_rating,
            prime,
        } => {
            let args = SearchArgs {
                min_price,
                max_price,
                min_rating,
                prime_only: prime,
            };
            search::run_search(&cfg, &keyword, &args).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, id).await?;
        }
        Commands::Recent => {
            get::run_recent(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
