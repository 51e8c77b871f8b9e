//! Vulnerability Report Composition
//!
//! Turns a structured finding into a markdown document via a single model
//! invocation. Record fields are substituted into the prompt verbatim; the
//! response comes back unmodified. Failures propagate unchanged.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::ModelBackend;
use crate::conversation::ConversationLedger;
use crate::LlmResult;

/// A structured finding; all fields are opaque plain text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    pub description: String,
    pub location: String,
    pub writeup: String,
    pub poc: String,
}

/// Composes one report document per vulnerability record
pub struct ReportComposer {
    backend: Arc<dyn ModelBackend>,
}

impl ReportComposer {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    /// Prompt fed to the model, with record fields passed through verbatim
    pub fn render_prompt(record: &VulnerabilityRecord) -> String {
        format!(
            "Create a markdown document highlighting the following vulnerability:\n\
             \n\
             Vulnerability: {}\n\
             Location: {}\n\
             Writeup: {}\n\
             PoC: {}\n\
             \n\
             Format the document with appropriate headings, code blocks, and explanations.",
            record.description, record.location, record.writeup, record.poc
        )
    }

    /// Issue one invocation and return the model's raw response
    pub async fn compose(
        &self,
        record: &VulnerabilityRecord,
        ledger: &mut ConversationLedger,
    ) -> LlmResult<String> {
        info!(location = %record.location, "composing vulnerability report");
        let prompt = Self::render_prompt(record);
        let report = self.backend.invoke(&prompt).await?;
        ledger.record_exchange(&prompt, &report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_passes_fields_through_verbatim() {
        let record = VulnerabilityRecord {
            description: "Injection via `$(cmd)`\nsecond line".to_string(),
            location: "src/main.c:42".to_string(),
            writeup: "# not a heading, just text with *markup*".to_string(),
            poc: "printf '%s' \"payload\" | ./app".to_string(),
        };

        let prompt = ReportComposer::render_prompt(&record);
        assert!(prompt.contains("Injection via `$(cmd)`\nsecond line"));
        assert!(prompt.contains("Location: src/main.c:42"));
        assert!(prompt.contains("# not a heading, just text with *markup*"));
        assert!(prompt.contains("printf '%s' \"payload\" | ./app"));
    }
}
