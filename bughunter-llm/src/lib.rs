//! BugHunter LLM - Model Invocation and Conversation Orchestration
//!
//! This crate drives a locally-run inference process to review source code
//! for vulnerabilities. Key components:
//! - Inference subprocess invocation with timeout hardening
//! - Append-only conversation ledger shared by all workflows of a session
//! - Bounded self-dialogue refinement loop
//! - Vulnerability report composition
//!
//! The backend is abstracted behind [`ModelBackend`] so orchestration logic
//! is testable against a deterministic stub.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod conversation;
pub mod dialogue;
pub mod ollama;
pub mod report;
pub mod session;

// Re-export main types for convenience
pub use backend::ModelBackend;
pub use conversation::{ConversationLedger, ConversationTurn, Role};
pub use dialogue::{DialogueConfig, DialogueError, DialogueTranscript, SelfDialogueEngine};
pub use ollama::{OllamaConfig, OllamaInvoker};
pub use report::{ReportComposer, VulnerabilityRecord};
pub use session::{HuntSession, TreeDescription};

/// Result type for LLM operations
pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Error types for LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Inference process could not be started
    #[error("Failed to spawn inference process `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Inference process terminated with a non-zero exit code
    #[error("Inference process exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    /// Inference process did not terminate within the configured bound
    #[error("Inference process timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Model produced no output
    #[error("Model returned an empty response")]
    EmptyResponse,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem layer error
    #[error(transparent)]
    Fs(#[from] bughunter_core::Error),
}
