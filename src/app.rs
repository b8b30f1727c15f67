//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves settings
//! - runs the estimate pipeline and prints reports/plots
//! - writes the chart and optional exports
//! - manages the product catalog and synthetic samples

use clap::Parser;
use tracing::info;

use crate::cli::{
    CatalogCommand, CatalogLoadArgs, CatalogShowArgs, CatalogStoreArgs, Command, EstimateArgs,
    MerchantsArgs, SampleArgs, TuiArgs,
};
use crate::config::Settings;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `elast` binary.
pub fn run() -> Result<(), AppError> {
    // We want `elast` and `elast -m X -c Y` to behave like `elast tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let directive = match cli.command {
        Command::Tui(_) => crate::logging::TUI_DIRECTIVE,
        _ => crate::logging::CLI_DIRECTIVE,
    };
    crate::logging::init(directive);
    let settings = Settings::from_env();

    match cli.command {
        Command::Estimate(args) => handle_estimate(args, settings),
        Command::Merchants(args) => handle_merchants(args, settings),
        Command::Catalog(cmd) => handle_catalog(cmd, settings),
        Command::Sample(args) => handle_sample(args, settings),
        Command::Tui(args) => handle_tui(args, settings),
    }
}

fn handle_estimate(args: EstimateArgs, settings: Settings) -> Result<(), AppError> {
    let settings = args.source.apply(settings);
    let catalog = settings.merchant_catalog()?;
    let selection = catalog.validate(args.merchant.as_deref(), args.category.as_deref())?;

    let dataset = crate::io::ingest::load_observations(settings.data_path()?)?;
    let run = pipeline::run_estimate(&dataset, &selection);

    println!("{}", crate::report::format_run_summary(&dataset, &run));
    println!("{}", crate::report::format_table(&run.presented));

    if args.plot {
        println!("{}", crate::plot::render_ascii_bars(&run.presented, args.width));
    }

    let chart = if args.no_chart {
        None
    } else {
        let artifact =
            crate::plot::write_elasticity_chart(&settings.media_dir, &settings.media_url, &run.presented)?;
        println!("Chart: {} ({})", artifact.url, artifact.path.display());
        Some(artifact)
    };

    // Detail lookups only see what is presented.
    if let Some(name) = &args.product {
        let record = crate::report::find_presented(&run.presented, name).ok_or_else(|| {
            AppError::new(2, format!("Product '{name}' is not in the presented results."))
        })?;
        println!();
        println!("{}", crate::report::format_detail(record));
    }

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::export::write_results_csv(path, &run.presented)?;
        info!(path = %path.display(), rows = run.presented.len(), "exported results CSV");
    }
    if let Some(path) = &args.export_json {
        let url = chart.as_ref().map(|c| c.url.as_str());
        crate::io::export::write_run_json(path, &run, url)?;
        info!(path = %path.display(), "exported run JSON");
    }

    Ok(())
}

fn handle_merchants(args: MerchantsArgs, mut settings: Settings) -> Result<(), AppError> {
    if let Some(path) = args.merchants {
        settings.merchants = Some(path);
    }
    let catalog = settings.merchant_catalog()?;
    print!("{}", crate::report::format_merchants(&catalog));
    Ok(())
}

fn handle_catalog(cmd: CatalogCommand, settings: Settings) -> Result<(), AppError> {
    let store_path = |args: &CatalogStoreArgs| args.store.clone().unwrap_or_else(|| settings.catalog.clone());

    match cmd {
        CatalogCommand::Load(CatalogLoadArgs { fixture, store }) => {
            let path = store_path(&store);
            let summary = crate::io::catalog::bulk_load(&fixture, &path)?;
            println!(
                "Loaded {} product(s) into {}; skipped {} existing.",
                summary.inserted,
                path.display(),
                summary.skipped.len()
            );
            for name in &summary.skipped {
                println!("  skipped: {name}");
            }
        }
        CatalogCommand::List(store) => {
            let path = store_path(&store);
            let catalog = crate::io::catalog::CatalogStore::open(&path)?;
            if catalog.is_empty() {
                println!("Catalog {} is empty.", path.display());
                return Ok(());
            }
            let rows: Vec<_> = catalog.list().cloned().collect();
            print!("{}", crate::report::format_table(&rows));
            if let Some(at) = catalog.loaded_at {
                println!("\nLast loaded: {}", at.to_rfc3339());
            }
        }
        CatalogCommand::Show(CatalogShowArgs { name, store }) => {
            let path = store_path(&store);
            let catalog = crate::io::catalog::CatalogStore::open(&path)?;
            let record = catalog
                .get(&name)
                .ok_or_else(|| AppError::new(2, format!("Product '{name}' is not in the catalog.")))?;
            print!("{}", crate::report::format_detail(record));
        }
    }
    Ok(())
}

fn handle_sample(args: SampleArgs, mut settings: Settings) -> Result<(), AppError> {
    if let Some(path) = args.merchants {
        settings.merchants = Some(path);
    }
    let catalog = settings.merchant_catalog()?;
    let config = crate::data::SampleConfig {
        seed: args.seed,
        products_per_selection: args.products,
        periods: args.periods,
    };
    let observations = crate::data::generate_sample(&catalog, &config)?;
    crate::data::write_observations_csv(&args.out, &observations)?;

    info!(path = %args.out.display(), rows = observations.len(), "wrote sample data");
    println!("Wrote {} rows to {}", observations.len(), args.out.display());
    Ok(())
}

fn handle_tui(args: TuiArgs, settings: Settings) -> Result<(), AppError> {
    let settings = args.source.apply(settings);
    crate::tui::run(settings, args.merchant, args.category)
}

/// Rewrite argv so `elast` defaults to `elast tui`.
///
/// Rules:
/// - `elast`                      -> `elast tui`
/// - `elast -m X -c Y ...`        -> `elast tui -m X -c Y ...`
/// - `elast --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "estimate" | "merchants" | "catalog" | "sample" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
