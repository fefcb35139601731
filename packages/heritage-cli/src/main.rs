// Command-line front end for the heritage site loader

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use heritage::pipeline::{bubble_label, count_inscribed_in, current_year, summary_label, total_label};
use heritage::render::style::{category_style, filter_style};
use heritage::{
    filter_sites, load_sites, CategoryCounts, CommonsImageResolver, FilterCriteria,
    HttpSiteSource, ImageResolver, SearchTerms, Site, SiteType, TypeFilter, YearRange,
};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "heritage", about = "Browse UNESCO World Heritage Sites from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List sites matching the filters
    Sites {
        /// Show sites inscribed up to this year (defaults to the latest)
        #[arg(long)]
        year: Option<i32>,

        /// all, cultural, natural or mixed
        #[arg(long = "type", default_value = "all", value_parser = parse_type_filter)]
        site_type: TypeFilter,

        /// Comma-separated search terms, all of which must match
        #[arg(long)]
        search: Option<String>,

        /// Print canonical site JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Per-category counts up to a year
    Counts {
        #[arg(long)]
        year: Option<i32>,
    },

    /// Resolve a site's image references to thumbnail URLs
    Images {
        /// Site id, e.g. Q5788
        site_id: String,
    },
}

fn parse_type_filter(value: &str) -> std::result::Result<TypeFilter, String> {
    TypeFilter::parse(value)
        .ok_or_else(|| format!("unknown site type `{}` (expected all, cultural, natural or mixed)", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,heritage=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let sites = fetch(&config).await?;
    let (range, latest) = YearRange::from_sites(&sites).unwrap_or_else(|| {
        let range = YearRange::default();
        (range, range.clamp(current_year()))
    });

    match cli.command {
        Command::Sites {
            year,
            site_type,
            search,
            json,
        } => {
            let year = year.map(|y| range.clamp(y)).unwrap_or(latest);
            let mut terms = SearchTerms::new();
            if let Some(search) = search {
                terms.submit(&search);
            }
            let criteria = FilterCriteria::up_to(year)
                .with_type(site_type)
                .with_terms(terms.as_slice().iter().cloned());
            let filtered = filter_sites(&sites, &criteria);

            if json {
                let canonical: Vec<&Site> = filtered.iter().map(|s| s.as_ref()).collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&canonical).context("Failed to serialize sites")?
                );
            } else {
                print_sites(&filtered);
                println!();
                println!("{}", summary_label(filtered.len(), year, current_year()).bold());
            }
        }
        Command::Counts { year } => {
            let year = year.map(|y| range.clamp(y)).unwrap_or(latest);
            print_counts(&sites, year);
        }
        Command::Images { site_id } => {
            let Some(site) = sites.iter().find(|s| s.id == site_id) else {
                bail!("No site with id {}", site_id);
            };
            if !site.has_images() {
                println!("{} has no image references", site.name);
                return Ok(());
            }

            let resolver = CommonsImageResolver::new(config.commons())
                .context("Failed to create Commons resolver")?;
            let urls = resolver
                .resolve(&site.images)
                .await
                .context("Failed to resolve images")?;

            println!("{}", site.name.bold());
            for url in &urls {
                println!("  {}", url);
            }
            if urls.len() < site.images.len() {
                println!(
                    "{}",
                    format!("  {} reference(s) could not be resolved", site.images.len() - urls.len())
                        .dimmed()
                );
            }
        }
    }

    Ok(())
}

async fn fetch(config: &Config) -> Result<Vec<Arc<Site>>> {
    let mut source = HttpSiteSource::with_timeout(
        &config.data_url,
        Duration::from_secs(config.http_timeout_secs),
    )
    .context("Invalid HERITAGE_DATA_URL")?;
    if let Some(query) = &config.data_query {
        source = source.with_query(query.clone());
    }

    tracing::info!(url = %config.data_url, "Loading site data");
    let sites = load_sites(&source)
        .await
        .context("Unable to load site data")?;
    tracing::info!(count = sites.len(), "Site data loaded");
    Ok(sites)
}

fn print_sites(sites: &[Arc<Site>]) {
    for site in sites {
        let style = category_style(site.site_type);
        let (r, g, b) = (style.color.r, style.color.g, style.color.b);
        println!(
            "{:>10}  {}  {:<9} {}  {}",
            site.id.dimmed(),
            site.inscription_year,
            style.label.truecolor(r, g, b),
            site.name.bold(),
            site.country.dimmed()
        );
    }
}

fn print_counts(sites: &[Arc<Site>], year: i32) {
    let counts = CategoryCounts::up_to(sites, year);
    let filters = [
        TypeFilter::All,
        SiteType::Cultural.into(),
        SiteType::Natural.into(),
        SiteType::Mixed.into(),
    ];

    for filter in filters {
        let style = filter_style(filter);
        let (r, g, b) = (style.color.r, style.color.g, style.color.b);
        println!(
            "{:<10} {:>5}   {}",
            style.label.truecolor(r, g, b),
            counts.get(filter),
            bubble_label(year, count_inscribed_in(sites, year, filter)).dimmed()
        );
    }
    println!();
    println!("{}", total_label(sites.len()).bold());
}
