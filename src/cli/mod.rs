//! Command-line parsing for the price elasticity estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the estimation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Settings;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "elast", version, about = "Price Elasticity of Demand estimator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate per-product elasticities for one merchant/category and write the chart.
    Estimate(EstimateArgs),
    /// List the valid merchant/category combinations.
    Merchants(MerchantsArgs),
    /// Manage the persistent product catalog.
    #[command(subcommand)]
    Catalog(CatalogCommand),
    /// Write a synthetic observation CSV.
    Sample(SampleArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying estimate pipeline as `elast estimate`, but
    /// renders results in a terminal UI using Ratatui.
    Tui(TuiArgs),
}

/// Paths shared by every command that reads observations or writes the chart.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// Observation CSV (overrides ELASTICITY_DATA).
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Merchant enumeration JSON (overrides ELASTICITY_MERCHANTS).
    #[arg(long, value_name = "JSON")]
    pub merchants: Option<PathBuf>,

    /// Chart output directory (overrides ELASTICITY_MEDIA_DIR).
    #[arg(long, value_name = "DIR")]
    pub media_dir: Option<PathBuf>,

    /// URL prefix of the chart directory (overrides ELASTICITY_MEDIA_URL).
    #[arg(long, value_name = "URL")]
    pub media_url: Option<String>,
}

impl SourceArgs {
    /// Apply command-line overrides on top of environment settings.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(data) = &self.data {
            settings.data = Some(data.clone());
        }
        if let Some(merchants) = &self.merchants {
            settings.merchants = Some(merchants.clone());
        }
        if let Some(dir) = &self.media_dir {
            settings.media_dir = dir.clone();
        }
        if let Some(url) = &self.media_url {
            settings.media_url = url.clone();
        }
        settings
    }
}

#[derive(Debug, Parser, Clone)]
pub struct EstimateArgs {
    /// Merchant (exact match against the enumeration).
    #[arg(short = 'm', long)]
    pub merchant: Option<String>,

    /// Category (exact match against the merchant's categories).
    #[arg(short = 'c', long)]
    pub category: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Skip writing the SVG chart.
    #[arg(long)]
    pub no_chart: bool,

    /// Also render an ASCII bar chart in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// ASCII plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Print every statistic of one presented product.
    #[arg(long, value_name = "NAME")]
    pub product: Option<String>,

    /// Export presented rows to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the whole run (selection, chart URL, rows, skipped products) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct MerchantsArgs {
    /// Merchant enumeration JSON (overrides ELASTICITY_MERCHANTS).
    #[arg(long, value_name = "JSON")]
    pub merchants: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Insert products from a JSON fixture; existing names are skipped.
    Load(CatalogLoadArgs),
    /// List stored products.
    List(CatalogStoreArgs),
    /// Show every field of one stored product.
    Show(CatalogShowArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct CatalogStoreArgs {
    /// Catalog store file (overrides ELASTICITY_CATALOG).
    #[arg(long, value_name = "JSON")]
    pub store: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct CatalogLoadArgs {
    /// JSON array of product records.
    #[arg(value_name = "FIXTURE")]
    pub fixture: PathBuf,

    #[command(flatten)]
    pub store: CatalogStoreArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct CatalogShowArgs {
    /// Product name.
    pub name: String,

    #[command(flatten)]
    pub store: CatalogStoreArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Products per merchant/category pair.
    #[arg(long, default_value_t = 6)]
    pub products: usize,

    /// Number of weekly periods.
    #[arg(long, default_value_t = 26)]
    pub periods: usize,

    /// Merchant enumeration JSON (overrides ELASTICITY_MERCHANTS).
    #[arg(long, value_name = "JSON")]
    pub merchants: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone, Default)]
pub struct TuiArgs {
    /// Preselect this merchant.
    #[arg(short = 'm', long)]
    pub merchant: Option<String>,

    /// Preselect this category.
    #[arg(short = 'c', long)]
    pub category: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,
}
