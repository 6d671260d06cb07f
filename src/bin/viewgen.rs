//! SDK Generator CLI
//!
//! Generates a typed Python SDK or a mock-data batch from a data-model
//! schema dump.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use viewgen::config::GeneratorConfig;
use viewgen::generator::output::write_sdk;
use viewgen::mock::{ExternalIdFactory, IdStrategy, MockGenerator};
use viewgen::schema::DataModel;
use viewgen::SdkGenerator;

#[derive(Parser)]
#[command(name = "viewgen")]
#[command(about = "Generate a typed Python SDK from a data-model schema")]
struct Cli {
    /// Path to the data-model JSON dump
    #[arg(short, long)]
    model: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the SDK package
    Generate {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Synthesize a batch of mock instances
    Mock {
        /// Output file (JSON); stdout when absent
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,

        /// Nodes per view
        #[arg(long)]
        node_count: Option<usize>,

        /// Derive ids by hashing record content instead of counting
        #[arg(long)]
        hash_ids: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = GeneratorConfig::load()?;
    let text = fs::read_to_string(&cli.model)?;
    let model: DataModel = serde_json::from_str(&text)?;

    match cli.command {
        Commands::Generate { out } => {
            let mut generator = SdkGenerator::new(config.clone());
            let sdk = generator.generate(&model)?;

            let summary = write_sdk(&sdk.files, &out, config.output.overwrite)?;
            println!(
                "Generated {} classes ({} files written, {} skipped)",
                sdk.report.generated.len(),
                summary.written,
                summary.skipped
            );
            for skipped in &sdk.report.skipped {
                println!("  skipped view {}: {}", skipped.view, skipped.reason);
            }
        }

        Commands::Mock {
            out,
            seed,
            node_count,
            hash_ids,
        } => {
            let mut mock_config = config.mock.clone();
            if let Some(seed) = seed {
                mock_config.seed = seed;
            }
            if let Some(n) = node_count {
                mock_config.node_count = n;
            }

            let mut generator = MockGenerator::new(mock_config);
            if hash_ids {
                generator = generator.with_factory(ExternalIdFactory::new(IdStrategy::ContentHash));
            }
            let data = generator.generate(&model.views)?;

            let json = serde_json::to_string_pretty(&data)?;
            match out {
                Some(path) => {
                    fs::write(&path, json)?;
                    println!(
                        "Wrote {} nodes, {} edges, {} resources to {}",
                        data.nodes.len(),
                        data.edges.len(),
                        data.resources.len(),
                        path.display()
                    );
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}
