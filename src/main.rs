use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use splice_core::AppConfig;
use splice_graph::{
    description, run_raw, GraphBuilder, ProcedureDescription, RunOptions, Site, SiteFactory,
};
use splice_primitives::PrimitiveLibrary;

#[derive(Parser)]
#[command(name = "splice", version, about = "Dataflow procedures, wired and run")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "splice.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the configured library plus FILES and list what was registered
    Check {
        /// Extra description files (YAML or JSON)
        files: Vec<PathBuf>,
    },
    /// List procedures in the workspace site
    List {
        /// List the builtin site instead
        #[arg(long)]
        builtin: bool,
    },
    /// Run a procedure once
    Run {
        /// Procedure signature, e.g. int:add
        signature: String,
        /// Input values as JSON literals; null is an empty input
        values: Vec<String>,
        /// Extra description files to load first
        #[arg(short, long = "load")]
        load: Vec<PathBuf>,
    },
    /// Run a procedure on many input lists concurrently
    Batch {
        /// Procedure signature
        signature: String,
        /// JSON file holding an array of input lists
        inputs: PathBuf,
    },
    /// Print workspace composites as YAML descriptions
    Export,
    /// Show current configuration
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Handle completions before config loading
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "splice", &mut std::io::stdout());
        return Ok(());
    }

    let config = if cli.config.exists() {
        AppConfig::load(&cli.config)?
    } else {
        AppConfig::default()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if !cli.config.exists() {
        warn!(path = %cli.config.display(), "No config file found, using defaults");
    }

    let options = RunOptions::with_max_depth(config.engine.max_depth);

    match cli.command {
        Commands::Check { files } => {
            let (_, site) = load_workspace(&config, &cli.config, &files)?;
            for procedure in site.procedures() {
                println!(
                    "{}  ({}) -> ({})",
                    procedure.signature(),
                    join(procedure.input_signatures()),
                    join(procedure.output_signatures())
                );
            }
        }
        Commands::List { builtin } => {
            let (factory, site) = load_workspace(&config, &cli.config, &[])?;
            let site = if builtin {
                factory.builtin_site()
            } else {
                Arc::new(site)
            };
            for procedure in site.procedures() {
                if procedure.docstring().is_empty() {
                    println!("{}", procedure.signature());
                } else {
                    println!("{}  # {}", procedure.signature(), procedure.docstring());
                }
            }
        }
        Commands::Run {
            signature,
            values,
            load,
        } => {
            let (factory, site) = load_workspace(&config, &cli.config, &load)?;
            let raw: Vec<serde_json::Value> = values.iter().map(|v| parse_literal(v)).collect();
            let outputs = run_raw(&site, factory.data_factory(), &signature, &raw, &options)?;
            println!("{}", serde_json::to_string(&outputs)?);
        }
        Commands::Batch { signature, inputs } => {
            let (factory, site) = load_workspace(&config, &cli.config, &[])?;
            let content = std::fs::read_to_string(&inputs)
                .with_context(|| format!("reading {}", inputs.display()))?;
            let batch: Vec<Vec<serde_json::Value>> = serde_json::from_str(&content)?;

            let site = Arc::new(site);
            let data = Arc::clone(factory.data_factory());
            let signature: Arc<str> = Arc::from(signature);
            info!(procedure = %signature, runs = batch.len(), "Starting batch");

            let handles: Vec<_> = batch
                .into_iter()
                .map(|raw| {
                    let site = Arc::clone(&site);
                    let data = Arc::clone(&data);
                    let signature = Arc::clone(&signature);
                    let options = options.clone();
                    tokio::task::spawn_blocking(move || {
                        run_raw(&site, &data, &signature, &raw, &options)
                    })
                })
                .collect();

            for handle in handles {
                match handle.await? {
                    Ok(outputs) => println!("{}", serde_json::to_string(&outputs)?),
                    Err(e) => println!("{}", serde_json::json!({ "error": e.to_string() })),
                }
            }
        }
        Commands::Export => {
            let (_, site) = load_workspace(&config, &cli.config, &[])?;
            let descriptions: Vec<ProcedureDescription> = site
                .procedures()
                .filter_map(|p| ProcedureDescription::from_procedure(p))
                .collect();
            print!("{}", description::to_yaml(&descriptions)?);
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        // handled before config loading
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Build the site factory and a workspace site holding the configured
/// library followed by `extra` description files.
fn load_workspace(
    config: &AppConfig,
    config_path: &Path,
    extra: &[PathBuf],
) -> anyhow::Result<(SiteFactory, Site)> {
    let data = Arc::new(config.data_factory()?);
    let factory = SiteFactory::new(Arc::new(PrimitiveLibrary::with_builtins(data)));
    let mut site = factory.create("workspace", Vec::new());

    let mut builder = GraphBuilder::new(&mut site).with_default_cache(config.engine.default_cache);
    for path in config.library_paths(config_path).iter().chain(extra) {
        let built = builder
            .build_file(path)
            .with_context(|| format!("building {}", path.display()))?;
        info!(path = %path.display(), procedures = built.len(), "Loaded library");
    }

    Ok((factory, site))
}

/// Parse a CLI value as JSON, falling back to a plain string.
fn parse_literal(value: &str) -> serde_json::Value {
    serde_json::from_str(value).unwrap_or_else(|_| serde_json::Value::String(value.to_string()))
}

fn join(signatures: &[splice_core::Signature]) -> String {
    signatures
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
