//! Ollama Inference Process Invocation
//!
//! Drives `ollama run <model>` for one prompt/response exchange: the prompt
//! goes to the child's stdin, the response is everything it writes to stdout
//! before exiting. Stderr is diagnostic only and never fails a call by
//! itself; a non-zero exit code or a wall-clock timeout does.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::backend::ModelBackend;
use crate::{LlmError, LlmResult};

/// Configuration for the Ollama invoker
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Inference executable to spawn
    pub binary: PathBuf,
    /// Model identifier passed to `run`
    pub model: String,
    /// Wall-clock bound on one full exchange; on expiry the child is killed
    /// and its pipes are released
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ollama"),
            model: "llama2".to_string(),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Invokes the Ollama inference process, one subprocess per exchange
pub struct OllamaInvoker {
    config: OllamaConfig,
}

impl OllamaInvoker {
    pub fn new(config: OllamaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }
}

#[async_trait]
impl ModelBackend for OllamaInvoker {
    async fn invoke(&self, prompt: &str) -> LlmResult<String> {
        debug!(
            model = %self.config.model,
            prompt_bytes = prompt.len(),
            "invoking inference process"
        );

        let mut child = Command::new(&self.config.binary)
            .arg("run")
            .arg(&self.config.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LlmError::Spawn {
                command: format!("{} run {}", self.config.binary.display(), self.config.model),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            LlmError::Io(std::io::Error::other("child stdin was not captured"))
        })?;

        // The whole exchange runs under one timeout: a hung child that never
        // reads its stdin would otherwise block the write forever. On expiry
        // the future is dropped and kill_on_drop reaps the child.
        let prompt_bytes = prompt.as_bytes().to_vec();
        let exchange = async move {
            stdin.write_all(&prompt_bytes).await?;
            stdin.shutdown().await?;
            drop(stdin);
            child.wait_with_output().await
        };

        let output = match timeout(self.config.timeout, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    model = %self.config.model,
                    seconds = self.config.timeout.as_secs(),
                    "inference process timed out, killing it"
                );
                return Err(LlmError::Timeout {
                    seconds: self.config.timeout.as_secs(),
                });
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!(model = %self.config.model, "inference diagnostics: {}", stderr.trim());
        }

        if !output.status.success() {
            return Err(LlmError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }

        let response = String::from_utf8_lossy(&output.stdout)
            .trim_end()
            .to_string();
        if response.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(response)
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }

    async fn is_available(&self) -> bool {
        match Command::new(&self.config.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
        {
            Ok(status) => status.success(),
            Err(_) => false,
        }
    }
}
