//! Hunt Orchestrator
//!
//! Sequences the analysis workflows: a primary scan of the target codebase,
//! and a secondary demonstration workflow (tree walk, self-dialogue, sample
//! report) that runs only when the primary attempt fails. This is the one
//! layer that catches errors, and only to choose between those two paths.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tracing::{info, warn};

use bughunter_core::discover_source_files;
use bughunter_llm::{HuntSession, ModelBackend, VulnerabilityRecord};

const FALLBACK_TOPIC: &str = "code vulnerabilities in C programs";
const FALLBACK_DIALOGUE_TURNS: usize = 3;

/// Which path a hunt ended up taking
#[derive(Debug, PartialEq, Eq)]
pub enum HuntOutcome {
    /// Primary scan completed
    Primary { files_analyzed: usize },
    /// Primary scan failed; demonstration workflow ran instead
    Fallback,
}

pub struct Orchestrator {
    session: HuntSession,
    output_dir: PathBuf,
    max_files: usize,
    demo_root: PathBuf,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn ModelBackend>, output_dir: PathBuf, max_files: usize) -> Self {
        Self {
            session: HuntSession::new(backend),
            output_dir,
            max_files,
            demo_root: PathBuf::from("."),
        }
    }

    /// Directory the fallback workflow demonstrates on
    pub fn with_demo_root(mut self, root: PathBuf) -> Self {
        self.demo_root = root;
        self
    }

    /// Run the hunt against `target`, falling back to the demonstration
    /// workflow only if the primary scan fails. The session transcript is
    /// written as an artifact on both paths.
    pub async fn hunt(&mut self, target: &Path) -> Result<HuntOutcome> {
        fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("creating output directory {}", self.output_dir.display()))?;

        let outcome = match self.primary(target).await {
            Ok(files_analyzed) => {
                info!(files_analyzed, "primary analysis complete");
                HuntOutcome::Primary { files_analyzed }
            }
            Err(err) => {
                warn!(
                    target = %target.display(),
                    "primary analysis failed: {err:#}; running demonstration workflow"
                );
                self.fallback().await.context("fallback workflow failed")?;
                HuntOutcome::Fallback
            }
        };

        let transcript = self.session.ledger().to_transcript();
        fs::write(self.output_dir.join("transcript.txt"), transcript)
            .await
            .context("writing session transcript")?;
        Ok(outcome)
    }

    async fn primary(&mut self, target: &Path) -> Result<usize> {
        let backend = self.session.backend();
        if !backend.is_available().await {
            bail!(
                "inference backend for model `{}` is not available",
                backend.model_id()
            );
        }

        let files = discover_source_files(target, self.max_files)
            .with_context(|| format!("discovering source files under {}", target.display()))?;
        if files.is_empty() {
            bail!("no source files found under {}", target.display());
        }

        let analyses_dir = self.output_dir.join("analyses");
        fs::create_dir_all(&analyses_dir).await?;

        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} {msg}",
        )?);

        for (index, file) in files.iter().enumerate() {
            let stem = file
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("file");
            bar.set_message(stem.to_string());

            let analysis = self
                .session
                .analyze_file(file)
                .await
                .with_context(|| format!("analyzing {}", file.display()))?;
            fs::write(analyses_dir.join(format!("{index:03}-{stem}.md")), analysis).await?;
            bar.inc(1);
        }
        bar.finish_with_message("scan complete");

        Ok(files.len())
    }

    // Tree walk, bounded self-dialogue, sample report composition.
    async fn fallback(&mut self) -> Result<()> {
        let description = self
            .session
            .describe_tree(&self.demo_root)
            .await
            .with_context(|| format!("describing tree at {}", self.demo_root.display()))?;
        fs::write(
            self.output_dir.join("tree.json"),
            description.tree.to_pretty_json(),
        )
        .await?;
        fs::write(self.output_dir.join("tree.txt"), &description.rendered).await?;

        match self
            .session
            .self_dialogue(FALLBACK_TOPIC, FALLBACK_DIALOGUE_TURNS)
            .await
        {
            Ok(transcript) => {
                fs::write(self.output_dir.join("dialogue.txt"), &transcript.text).await?;
            }
            Err(err) => {
                // Keep what the dialogue produced before it died
                fs::write(self.output_dir.join("dialogue.txt"), &err.transcript).await?;
                return Err(err).context("self-dialogue failed");
            }
        }

        let report = self.session.compose_report(&sample_record()).await?;
        fs::write(self.output_dir.join("report.md"), report).await?;
        Ok(())
    }
}

/// Canned finding used by the demonstration workflow
fn sample_record() -> VulnerabilityRecord {
    VulnerabilityRecord {
        description: "Buffer Overflow in input handling".to_string(),
        location: "main.c:123".to_string(),
        writeup: "The function fails to check input length before copying to a fixed-size buffer."
            .to_string(),
        poc: "Input of 1000 'A' characters causes a segmentation fault.".to_string(),
    }
}
