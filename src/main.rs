//! analitico-pipeline - command line entry point
//!
//! Inspects items that carry a plugin pipeline: prints the rendered view
//! tree, checks placement rules, and lists the plugin catalogue.

use analitico_pipeline::{
    config::EngineConfig,
    pipeline::{PipelineEnvironment, PluginKind, ViewNode},
    PipelineDocument,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Engine configuration file (defaults to the app data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rendered pipeline of an item
    Inspect {
        /// Item JSON file
        item: PathBuf,
    },
    /// Report plugins that break the placement rules
    Check {
        /// Item JSON file
        item: PathBuf,
    },
    /// List the plugins that can be added to a pipeline
    Catalogue,
}

fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "analitico-pipeline.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,analitico_pipeline=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(EngineConfig::load_or_default()),
    }
}

fn load_document(env: &std::sync::Arc<PipelineEnvironment>, path: &Path) -> anyhow::Result<PipelineDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let item: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    PipelineDocument::load(env, item).with_context(|| format!("failed to load {}", path.display()))
}

fn print_view(view: &ViewNode, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}[{}] {} ({})", indent, view.variant, view.title, view.instance);
    for (key, value) in &view.fields {
        println!("{}    {}: {}", indent, key, value);
    }
    for child in &view.children {
        print_view(child, depth + 1);
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let _guard = init_logging(config.log_dir.as_deref());

    let env = PipelineEnvironment::from_config(&config);

    match &cli.command {
        Commands::Inspect { item } => {
            let doc = load_document(&env, item)?;
            println!("{}", doc.title());
            match doc.pipeline() {
                Some(pipeline) => {
                    for view in pipeline.render() {
                        print_view(&view, 1);
                    }
                }
                None => println!("  (no pipeline)"),
            }
        }
        Commands::Check { item } => {
            let report = load_document(&env, item)?.placement_report();
            for line in report.lines() {
                println!("{}", line);
            }
            if !report.is_clean() {
                return Ok(ExitCode::from(1));
            }
        }
        Commands::Catalogue => {
            for kind in PluginKind::all() {
                println!("{:<22} {}", kind.display_name(), kind.symbolic_name());
                for line in kind.description().lines() {
                    println!("    {}", line);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
