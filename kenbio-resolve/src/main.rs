//! kenbio-resolve - command-line front end
//!
//! Runs one read operation against the live providers and prints the
//! result as JSON on stdout. Logs go to stderr (or the configured file).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kenbio_common::config::TomlConfig;
use kenbio_common::logging::init_tracing;
use kenbio_resolve::models::{AggregateRequest, OccurrenceSearch};
use kenbio_resolve::services::filter_aggregates;
use kenbio_resolve::services::verification::DEFAULT_PACING;
use kenbio_resolve::taxa::{registry_kingdom, KingdomTab, TaxonGroup};
use kenbio_resolve::Explorer;
use serde::Serialize;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Command-line arguments for kenbio-resolve
#[derive(Parser, Debug)]
#[command(name = "kenbio-resolve")]
#[command(about = "Kenya biodiversity data: regions, species and identification")]
#[command(version)]
struct Args {
    /// Configuration file (overrides KENBIO_CONFIG and default locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive (overrides [logging] level)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List administrative regions
    Regions {
        /// Only regions whose name contains this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
    },

    /// Resolve a region name to an Observation Service place
    Resolve {
        name: String,
    },

    /// Most-observed species in a region
    Species {
        /// Region name, or Registry region id with --by-id
        region: String,

        /// Treat REGION as a Registry region id
        #[arg(long)]
        by_id: bool,

        #[arg(long, value_enum, default_value = "fauna")]
        tab: KingdomTab,

        /// Finer taxon group within the tab
        #[arg(long, value_enum)]
        group: Option<TaxonGroup>,

        /// Raw Observation Service taxon id (overrides --tab/--group)
        #[arg(long)]
        taxon: Option<u64>,

        #[arg(long, default_value = "60")]
        limit: u32,

        #[arg(long, default_value = "1")]
        page: u32,

        /// Only species whose common or scientific name contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Descriptive detail for one taxon
    Taxon {
        id: u64,
    },

    /// Identify the species in an image file
    Identify {
        image: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Raw Registry occurrences for a region id
    Occurrences {
        region_id: String,

        /// Restrict to a Registry kingdom
        #[arg(long, value_enum)]
        kingdom: Option<KingdomTab>,

        /// Registry class key
        #[arg(long)]
        class: Option<u32>,

        #[arg(long, default_value = "20")]
        limit: u32,

        #[arg(long, default_value = "0")]
        offset: u32,

        /// Include records without still images
        #[arg(long)]
        any_media: bool,
    },

    /// Registry species record by key
    RegistrySpecies {
        key: u64,
    },

    /// Resolve every region and report names needing a place override
    Verify {
        /// Pause between autocomplete calls
        #[arg(long, default_value_t = DEFAULT_PACING.as_millis() as u64)]
        pacing_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, location) = TomlConfig::load_located(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    info!("kenbio-resolve {}", env!("CARGO_PKG_VERSION"));
    match location.path() {
        Some(path) => info!("Loaded TOML configuration from {}", path.display()),
        None => warn!("No config file found, using compiled defaults"),
    }

    let explorer = Explorer::from_config(&config).context("Failed to build provider clients")?;

    match args.command {
        Command::Regions { search } => match search {
            Some(term) => print_json(&explorer.catalog.search(&term).await)?,
            None => print_json(&explorer.list_regions().await)?,
        },

        Command::Resolve { name } => print_json(&explorer.resolve_place(&name).await)?,

        Command::Species {
            region,
            by_id,
            tab,
            group,
            taxon,
            limit,
            page,
            filter,
        } => {
            let region_name = if by_id {
                explorer.catalog.display_name(&region).await
            } else {
                region
            };
            let scope = taxon.unwrap_or_else(|| tab.scope_for(group));
            let request = AggregateRequest::new(Some(scope), limit).with_page(page);
            let aggregates = explorer.observations.query(&region_name, &request).await;
            match filter {
                Some(term) => print_json(&filter_aggregates(&aggregates, &term))?,
                None => print_json(&aggregates)?,
            }
        }

        Command::Taxon { id } => print_json(&explorer.get_taxon_detail(id).await)?,

        Command::Identify { image, lat, lon } => {
            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("Failed to read image {}", image.display()))?;
            print_json(&explorer.identify(&bytes, lat, lon).await)?
        }

        Command::Occurrences {
            region_id,
            kingdom,
            class,
            limit,
            offset,
            any_media,
        } => {
            let mut search = OccurrenceSearch::new(region_id);
            search.kingdom = kingdom.map(|tab| match tab {
                KingdomTab::Fauna => registry_kingdom::ANIMALS,
                KingdomTab::Flora => registry_kingdom::PLANTS,
            });
            search.class = class;
            search.limit = limit;
            search.offset = offset;
            search.require_image = !any_media;
            print_json(&explorer.search_occurrences(&search).await)?
        }

        Command::RegistrySpecies { key } => print_json(&explorer.registry_species(key).await)?,

        Command::Verify { pacing_ms } => {
            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping verification");
                    on_signal.cancel();
                }
            });

            let report = explorer
                .verify(Duration::from_millis(pacing_ms), &cancel)
                .await;
            print_json(&report)?;

            if !report.failures.is_empty() {
                eprintln!("\nRegions needing a place override:\n");
                eprintln!("{}", report.overrides_template());
            }
            if !report.all_verified() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
