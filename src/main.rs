//! xcreport CLI
//!
//! Entry point for the `xcreport` command-line tool.

use clap::Parser;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use xcreport::model::ResultSource;
use xcreport::source::MANIFEST_FILE;
use xcreport::{
    discover_bundles, remove_unattached_files, Aggregator, BundleError, JsonBundle, ReportConfig,
    Run, SourceAction, TracingLogger,
};

/// Environment variable holding the log filter
const LOG_ENV: &str = "XCREPORT_LOG";

#[derive(Parser, Debug)]
#[command(name = "xcreport")]
#[command(about = "Aggregate test result bundles into report runs", version)]
struct Cli {
    /// Result bundles, or directories to search for *.xcresult bundles
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Fold every action of every bundle into one grouped run
    #[arg(long)]
    merge: bool,

    /// Embed logs instead of linking to them
    #[arg(long)]
    inline_logs: bool,

    /// Shrink screenshots before embedding them
    #[arg(long)]
    downsize_images: bool,

    /// Scale used with --downsize-images, in (0, 1]
    #[arg(long)]
    downsize_scale: Option<f64>,

    /// Delete files in the bundles that no run references
    #[arg(long)]
    delete_unattached: bool,

    /// With --delete-unattached, only report what would be deleted
    #[arg(long, requires = "delete_unattached")]
    dry_run: bool,

    /// Number of summary-building threads
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Path to config file (default: .xcreport.toml if present)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    let bundles = match open_bundles(&cli.paths) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error opening bundles: {}", e);
            process::exit(1);
        }
    };

    let logger = TracingLogger;
    let aggregator = Aggregator::from_config(&config, &logger);
    let runs = build_runs(&aggregator, &bundles, cli.merge);

    if runs.is_empty() {
        eprintln!("No runs could be built from {} bundle(s)", bundles.len());
        process::exit(1);
    }

    if cli.json {
        let reports: Vec<_> = runs.iter().map(Run::report).collect();
        match serde_json::to_string_pretty(&reports) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        for run in &runs {
            println!("{}", run);
            if let Some(log_source) = run.log_source() {
                println!("  log: {}", truncate(&log_source, 120));
            }
        }
    }

    if cli.delete_unattached {
        let collector = config.collector.clone().preserve(MANIFEST_FILE);
        let removed = remove_unattached_files(&runs, &collector, &logger);
        if collector.dry_run {
            eprintln!("Would remove {} unattached file(s)", removed);
        } else {
            eprintln!("Removed {} unattached file(s)", removed);
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Effective config: defaults, then the config file, then flags.
fn load_config(cli: &Cli) -> Result<ReportConfig, xcreport::ConfigError> {
    let file = cli.config.clone().or_else(|| {
        let default = PathBuf::from(ReportConfig::DEFAULT_FILE);
        default.is_file().then_some(default)
    });
    ReportConfig::load(file.as_deref(), cli_layer(cli))
}

/// Only the keys actually set on the command line.
fn cli_layer(cli: &Cli) -> Value {
    let mut rendering = Map::new();
    if cli.inline_logs {
        rendering.insert("rendering_mode".to_string(), json!("inline"));
    }
    if cli.downsize_images {
        rendering.insert("downsize_images_enabled".to_string(), json!(true));
    }
    if let Some(scale) = cli.downsize_scale {
        rendering.insert("downsize_scale_factor".to_string(), json!(scale));
    }

    let mut layer = Map::new();
    if !rendering.is_empty() {
        layer.insert("rendering".to_string(), Value::Object(rendering));
    }
    if cli.dry_run {
        layer.insert("collector".to_string(), json!({"dry_run": true}));
    }
    if let Some(jobs) = cli.jobs {
        layer.insert("worker_threads".to_string(), json!(jobs));
    }
    Value::Object(layer)
}

fn open_bundles(paths: &[PathBuf]) -> Result<Vec<Arc<JsonBundle>>, BundleError> {
    let locations = discover_bundles(paths)?;
    locations
        .iter()
        .map(|location| JsonBundle::open(location).map(Arc::new))
        .collect()
}

fn build_runs(aggregator: &Aggregator<'_>, bundles: &[Arc<JsonBundle>], merge: bool) -> Vec<Run> {
    let pairs: Vec<SourceAction> = bundles
        .iter()
        .flat_map(|bundle| {
            bundle.actions().iter().map(move |action| {
                let source: Arc<dyn ResultSource> = bundle.clone();
                (source, action.clone())
            })
        })
        .collect();

    if merge {
        aggregator.grouped(&pairs).into_iter().collect()
    } else {
        pairs
            .into_iter()
            .filter_map(|(source, action)| aggregator.single(source, &action))
            .collect()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}...", head)
    }
}
