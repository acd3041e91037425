//! Operational CLI: run a scrape from a products JSON file and print the
//! result table as CSV on stdout. `--logs` mirrors the run trace to
//! stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use precios_core::{default_vendors, Product, ScrapeOptions, Vendor};
use precios_scraper::{CancelToken, PriceScraper};

#[derive(Debug, Parser)]
#[command(name = "precios-cli")]
#[command(about = "Multi-vendor retail price resolution")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve prices for a JSON product list across the vendor table.
    Scrape {
        /// Path to a JSON array of product records.
        #[arg(long)]
        products: PathBuf,
        /// Optional JSON array of `{name, base_url}` vendors; the built-in
        /// table is used when omitted.
        #[arg(long)]
        vendors: Option<PathBuf>,
        /// Lower bound of the inter-request delay window, seconds.
        #[arg(long, default_value_t = 2.0)]
        min_delay: f64,
        /// Upper bound of the inter-request delay window, seconds.
        #[arg(long, default_value_t = 5.0)]
        max_delay: f64,
        /// Print the run trace log to stderr.
        #[arg(long)]
        logs: bool,
    },
    /// Print the built-in vendor table.
    Vendors,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scrape {
            products,
            vendors,
            min_delay,
            max_delay,
            logs,
        } => scrape(products, vendors, min_delay, max_delay, logs).await,
        Commands::Vendors => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["name", "base_url"])?;
            for vendor in default_vendors() {
                writer.write_record([vendor.name, vendor.base_url])?;
            }
            writer.flush()?;
            Ok(())
        }
    }
}

async fn scrape(
    products_path: PathBuf,
    vendors_path: Option<PathBuf>,
    min_delay: f64,
    max_delay: f64,
    logs: bool,
) -> anyhow::Result<()> {
    let products: Vec<Product> = read_json(&products_path)
        .with_context(|| format!("reading products from {}", products_path.display()))?;
    let vendors: Vec<Vendor> = match vendors_path {
        Some(path) => {
            read_json(&path).with_context(|| format!("reading vendors from {}", path.display()))?
        }
        None => default_vendors(),
    };

    let options = ScrapeOptions {
        min_delay_secs: min_delay,
        max_delay_secs: max_delay,
        return_logs: logs,
        ..ScrapeOptions::default()
    };
    let scraper = PriceScraper::new(options);
    let report = scraper
        .scrape_all(&products, &vendors, &CancelToken::none())
        .await?;

    if logs {
        for line in &report.log {
            eprintln!("{line}");
        }
    }

    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(report.table.headers())?;
    for row in &report.table.rows {
        writer.write_record(report.table.values(row))?;
    }
    writer.flush()?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
