use anyhow::Context;
use catalog_e2e::config::data::DEFAULT_DATA_PATH;
use catalog_e2e::config::settings::DEFAULT_CONFIG_PATH;
use catalog_e2e::{MovieApi, Report, Session};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "catalog-e2e")]
#[command(about = "Check fixtures and probe the movie catalog API")]
#[command(version)]
struct Cli {
    /// Settings file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Test data file
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load settings and test data, print a summary
    Check,
    /// Search the API by title
    Search {
        /// Query string (may be empty)
        query: String,
    },
    /// Fetch one movie by id
    Movie {
        /// Catalog id
        id: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    let session = Session::load(&cli.config, &cli.data).with_context(|| {
        format!(
            "loading {} and {}",
            cli.config.display(),
            cli.data.display()
        )
    })?;

    match cli.command {
        Command::Check => {
            println!("Config valid: {}", cli.config.display());
            println!("  API: {}", session.settings.api.base_url);
            println!("  UI: {}", session.settings.ui.base_url);
            println!("  Headless: {}", session.settings.browser.headless);
            println!(
                "  Results: {}",
                session.settings.report.results_dir.display()
            );
            println!("Test data: {} keys", session.data.len());
            for key in session.data.keys() {
                println!("    - {}", key);
            }
            for (key, reason) in session.data.unresolved() {
                println!("  Unresolved {}: {}", key, reason);
            }
            session.data.api_key()?;
        }
        Command::Search { query } => {
            let report = Report::start("CLI", "search", query.as_str());
            let api = MovieApi::new(
                &session.settings.api.base_url,
                session.data.api_key()?,
                &report,
            )?;
            let found = api.search_movie(&query).await?;
            println!("Found: {}", found.docs.len());
            for movie in &found.docs {
                let id = movie.id.map(|id| id.to_string()).unwrap_or_default();
                let year = movie.year.map(|y| y.to_string()).unwrap_or_default();
                println!(
                    "  {:>8}  {}  {}",
                    id,
                    movie.title().unwrap_or("-"),
                    year
                );
            }
        }
        Command::Movie { id } => {
            let report = Report::start("CLI", "movie", id.to_string());
            let api = MovieApi::new(
                &session.settings.api.base_url,
                session.data.api_key()?,
                &report,
            )?;
            let movie = api.get_movie(id).await?;
            println!("{}", serde_json::to_string_pretty(&movie)?);
        }
    }

    Ok(())
}
