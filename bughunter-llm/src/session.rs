//! Hunt Session
//!
//! One security-review session: a backend handle plus the session's
//! conversation ledger. All analysis modes run through here so every
//! exchange lands in the same ordered history. Sessions are independent;
//! running several concurrently shares nothing but the process-wide logger.

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::backend::ModelBackend;
use crate::conversation::{ConversationLedger, Role};
use crate::dialogue::{DialogueError, DialogueTranscript, SelfDialogueEngine};
use crate::report::{ReportComposer, VulnerabilityRecord};
use crate::LlmResult;

fn analysis_prompt(code: &str) -> String {
    format!(
        "Analyze the following code for potential vulnerabilities:\n\
         \n\
         {code}\n\
         \n\
         Provide a detailed report on any vulnerabilities found, including their \
         exact location in the code, a writeup explaining the vulnerability, and \
         a proof of concept (PoC) if possible."
    )
}

fn tree_prompt(listing: &str) -> String {
    format!(
        "Generate a file tree representation of the following directory structure:\n\
         \n\
         {listing}"
    )
}

/// Result of a whole-tree exploration
#[derive(Debug)]
pub struct TreeDescription {
    /// The walked directory structure
    pub tree: bughunter_core::FileTreeNode,
    /// The model's rendering of it
    pub rendered: String,
}

/// A single security-review session with its own conversation ledger
pub struct HuntSession {
    id: Uuid,
    backend: Arc<dyn ModelBackend>,
    ledger: ConversationLedger,
}

impl HuntSession {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, model = backend.model_id(), "starting hunt session");
        Self {
            id,
            backend,
            ledger: ConversationLedger::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn backend(&self) -> Arc<dyn ModelBackend> {
        Arc::clone(&self.backend)
    }

    pub fn ledger(&self) -> &ConversationLedger {
        &self.ledger
    }

    /// Single-file vulnerability scan: feed the whole file to the model
    pub async fn analyze_file(&mut self, path: &Path) -> LlmResult<String> {
        let bytes = tokio::fs::read(path).await?;
        let content = String::from_utf8_lossy(&bytes);

        info!(file = %path.display(), "analyzing file for vulnerabilities");
        let prompt = analysis_prompt(&content);
        let analysis = self.backend.invoke(&prompt).await?;
        self.ledger.record_exchange(&prompt, &analysis);
        Ok(analysis)
    }

    /// Whole-tree exploration: walk the target and have the model render it
    pub async fn describe_tree(&mut self, root: &Path) -> LlmResult<TreeDescription> {
        let tree = bughunter_core::tree::walk(root).await?;
        let listing = serde_json::to_string_pretty(&tree)?;

        info!(root = %root.display(), files = tree.file_count(), "describing directory tree");
        let prompt = tree_prompt(&listing);
        let rendered = self.backend.invoke(&prompt).await?;
        self.ledger.record_exchange(&prompt, &rendered);
        Ok(TreeDescription { tree, rendered })
    }

    /// Bounded byte-range read of an analysis target; no model involvement
    pub async fn read_chunk(&self, path: &Path, start: u64, end: u64) -> LlmResult<String> {
        Ok(bughunter_core::chunk::read_range(path, start, end).await?)
    }

    /// One-shot free-form prompt from an interactive user
    pub async fn prompt(&mut self, text: &str) -> LlmResult<String> {
        let response = self.backend.invoke(text).await?;
        self.ledger.append(Role::Human, text);
        self.ledger.append(Role::Assistant, response.clone());
        Ok(response)
    }

    /// Multi-turn self-dialogue refinement against this session's ledger
    pub async fn self_dialogue(
        &mut self,
        topic: &str,
        turns: usize,
    ) -> Result<DialogueTranscript, DialogueError> {
        SelfDialogueEngine::new(Arc::clone(&self.backend))
            .run(topic, turns, &mut self.ledger)
            .await
    }

    /// Compose a markdown report for a structured finding
    pub async fn compose_report(&mut self, record: &VulnerabilityRecord) -> LlmResult<String> {
        ReportComposer::new(Arc::clone(&self.backend))
            .compose(record, &mut self.ledger)
            .await
    }
}
