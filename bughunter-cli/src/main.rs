//! BugHunter CLI Entry Point
//!
//! Automated security review of source code driven by a locally-run
//! inference process. Subcommands cover the full hunt workflow plus each
//! analysis mode on its own.

mod orchestrator;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bughunter_llm::{HuntSession, OllamaConfig, OllamaInvoker, VulnerabilityRecord};
use orchestrator::{HuntOutcome, Orchestrator};

#[derive(Parser)]
#[command(name = "bughunter")]
#[command(about = "BugHunter - AI-assisted security review of source code")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Model identifier passed to the inference backend
    #[arg(short = 'm', long, default_value = "llama2")]
    model: String,

    /// Inference executable to spawn
    #[arg(long, default_value = "ollama")]
    binary: PathBuf,

    /// Timeout in seconds for a single model invocation
    #[arg(long, default_value_t = 300)]
    timeout: u64,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a codebase, with a demonstration workflow if the scan fails
    Hunt {
        /// Path to the codebase to analyze
        target: PathBuf,

        /// Output directory for analysis artifacts
        #[arg(short = 'o', long, default_value = "hunt_output")]
        output_dir: PathBuf,

        /// Maximum number of files to analyze
        #[arg(long, default_value_t = 16)]
        max_files: usize,
    },

    /// Analyze a single file for vulnerabilities
    Analyze {
        /// File to analyze
        file: PathBuf,
    },

    /// Walk a directory and have the model render its file tree
    Tree {
        /// Directory to walk
        directory: PathBuf,

        /// Print the walked tree as JSON without invoking the model
        #[arg(long)]
        raw: bool,
    },

    /// Run a bounded self-dialogue on a topic
    Dialogue {
        /// Conversation topic
        topic: String,

        /// Number of dialogue turns
        #[arg(short = 't', long, default_value_t = 3)]
        turns: usize,
    },

    /// Compose a markdown report from a vulnerability record JSON file
    Report {
        /// JSON file holding {description, location, writeup, poc}
        record: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Print a byte range of a file
    Chunk {
        /// File to read
        file: PathBuf,
        /// First byte offset (inclusive)
        start: u64,
        /// Last byte offset (exclusive)
        end: u64,
    },

    /// Interactive conversation loop on stdin
    Repl,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let backend = Arc::new(OllamaInvoker::new(OllamaConfig {
        binary: cli.binary,
        model: cli.model,
        timeout: Duration::from_secs(cli.timeout),
    }));

    match cli.command {
        Commands::Hunt {
            target,
            output_dir,
            max_files,
        } => {
            let mut orchestrator = Orchestrator::new(backend, output_dir.clone(), max_files);
            match orchestrator.hunt(&target).await? {
                HuntOutcome::Primary { files_analyzed } => {
                    println!(
                        "Analyzed {files_analyzed} file(s); artifacts in {}",
                        output_dir.display()
                    );
                }
                HuntOutcome::Fallback => {
                    println!(
                        "Primary scan failed; demonstration artifacts in {}",
                        output_dir.display()
                    );
                }
            }
        }

        Commands::Analyze { file } => {
            let mut session = HuntSession::new(backend);
            let analysis = session
                .analyze_file(&file)
                .await
                .with_context(|| format!("analyzing {}", file.display()))?;
            println!("{analysis}");
        }

        Commands::Tree { directory, raw } => {
            if raw {
                let tree = bughunter_core::walk(&directory)
                    .await
                    .with_context(|| format!("walking {}", directory.display()))?;
                println!("{}", tree.to_pretty_json());
            } else {
                let mut session = HuntSession::new(backend);
                let description = session
                    .describe_tree(&directory)
                    .await
                    .with_context(|| format!("describing {}", directory.display()))?;
                println!("{}", description.rendered);
            }
        }

        Commands::Dialogue { topic, turns } => {
            let mut session = HuntSession::new(backend);
            match session.self_dialogue(&topic, turns).await {
                Ok(transcript) => println!("{}", transcript.text),
                Err(err) => {
                    // Surface the partial transcript alongside the failure
                    println!("{}", err.transcript);
                    return Err(err).context("self-dialogue failed");
                }
            }
        }

        Commands::Report { record, output } => {
            let json = tokio::fs::read_to_string(&record)
                .await
                .with_context(|| format!("reading {}", record.display()))?;
            let record: VulnerabilityRecord =
                serde_json::from_str(&json).context("parsing vulnerability record")?;

            let mut session = HuntSession::new(backend);
            let report = session.compose_report(&record).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, report)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Report written to {}", path.display());
                }
                None => println!("{report}"),
            }
        }

        Commands::Chunk { file, start, end } => {
            let chunk = bughunter_core::read_range(&file, start, end)
                .await
                .with_context(|| format!("reading {}[{start}..{end}]", file.display()))?;
            println!("{chunk}");
        }

        Commands::Repl => {
            let mut session = HuntSession::new(backend);
            repl::run(&mut session).await?;
        }
    }

    Ok(())
}
