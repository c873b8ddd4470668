//! Gazette crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gazette_crawler::{
    error::Result,
    models::{Config, RenderFormat},
    navigation::HttpNavigator,
    pipeline,
    services::{self, ArtifactFetcher},
    storage::LocalStorage,
    utils::http,
};

/// Paginated catalog crawler with per-row document retrieval
#[derive(Parser, Debug)]
#[command(
    name = "gazette-crawler",
    version,
    about = "Crawl paginated publication catalogs and harvest their documents"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the catalog and download one document per row
    Catalog {
        /// Stop each reference type after this many pages
        #[arg(long)]
        limit: Option<usize>,

        /// Reference type to crawl (repeatable; replaces the configured list)
        #[arg(long = "ref-type")]
        ref_types: Vec<String>,

        /// Output CSV path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Crawl section × month listings and render each item
    Sections {
        /// Stop each section month after this many pages
        #[arg(long)]
        limit: Option<usize>,

        /// Rendered artifact format: pdf or html (overrides the configured one)
        #[arg(long)]
        format: Option<RenderFormat>,

        /// Output CSV path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging from the verbosity flag, else the configured level.
fn init_logging(verbose: bool, configured: Option<&str>) {
    let level = if verbose {
        "debug"
    } else {
        configured.unwrap_or("info")
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn artifact_fetcher(config: &Config) -> Result<ArtifactFetcher> {
    Ok(ArtifactFetcher::new(
        http::create_async_client(&config.crawler)?,
        &config.paths.download_dir,
        &config.paths.render_dir,
        services::renderer_for(config.sections.render_format),
    ))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let configured = Config::load(&cli.config).ok().map(|c| c.logging.level);
    init_logging(cli.verbose, configured.as_deref());

    if let Command::Validate = cli.command {
        pipeline::run_validate(&cli.config)?;
        return Ok(());
    }

    let mut config = Config::load_or_default(&cli.config);
    log::info!("Loaded configuration from {}", cli.config.display());
    if let Err(e) = config.validate() {
        log::warn!("{e}");
    }

    let storage = LocalStorage::new(".");
    let mut navigator = HttpNavigator::new(&config.crawler)?;

    match cli.command {
        Command::Catalog {
            limit,
            ref_types,
            output,
        } => {
            if limit.is_some() {
                config.catalog.page_limit = limit;
            }
            if !ref_types.is_empty() {
                config.catalog.ref_types = ref_types;
            }
            if let Some(output) = output {
                config.paths.output_csv = output;
            }
            let fetcher = artifact_fetcher(&config)?;
            pipeline::run_catalog(&config, &mut navigator, &fetcher, &storage).await?;
        }

        Command::Sections {
            limit,
            format,
            output,
        } => {
            if limit.is_some() {
                config.sections.page_limit = limit;
            }
            if let Some(format) = format {
                config.sections.render_format = format;
            }
            if let Some(output) = output {
                config.paths.items_csv = output;
            }
            let fetcher = artifact_fetcher(&config)?;
            let today = chrono::Local::now().date_naive();
            pipeline::run_sections(&config, &mut navigator, &fetcher, &storage, today).await?;
        }

        Command::Validate => {}
    }

    log::info!("Done.");
    Ok(())
}
