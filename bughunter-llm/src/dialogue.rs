//! Bounded Self-Dialogue Loop
//!
//! Runs a fixed number of turns where the model's own output, plus a scripted
//! continue cue, seeds its next prompt. The loop always executes exactly the
//! requested number of turns; a failed invocation aborts immediately and
//! surfaces the transcript accumulated so far.
//!
//! The accumulated prompt would otherwise grow without bound, so it is capped
//! by a byte budget: when exceeded, the topic preamble is kept and the oldest
//! middle of the conversation is elided.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::backend::ModelBackend;
use crate::conversation::{ConversationLedger, Role};
use crate::LlmError;

const CONTINUE_CUE: &str = "Please continue the analysis.";
const ELISION_MARKER: &str = "\n\n[earlier turns elided]\n\n";

/// Tuning knobs for the self-dialogue loop
#[derive(Debug, Clone)]
pub struct DialogueConfig {
    /// Upper bound on the accumulated prompt fed back into the model
    pub max_prompt_bytes: usize,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_prompt_bytes: 64 * 1024,
        }
    }
}

/// Completed dialogue output
#[derive(Debug, Clone, Serialize)]
pub struct DialogueTranscript {
    pub topic: String,
    /// Number of model invocations that ran
    pub turns: usize,
    /// Full accumulated conversation text
    pub text: String,
}

/// A mid-loop invocation failure, carrying everything accumulated before it
#[derive(Debug, thiserror::Error)]
#[error("Self-dialogue aborted after {completed} of {requested} turns")]
pub struct DialogueError {
    pub completed: usize,
    pub requested: usize,
    /// Conversation text accumulated before the failure
    pub transcript: String,
    #[source]
    pub source: LlmError,
}

/// Bounded N-turn self-dialogue built on a [`ModelBackend`]
pub struct SelfDialogueEngine {
    backend: Arc<dyn ModelBackend>,
    config: DialogueConfig,
}

impl SelfDialogueEngine {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self::with_config(backend, DialogueConfig::default())
    }

    pub fn with_config(backend: Arc<dyn ModelBackend>, config: DialogueConfig) -> Self {
        Self { backend, config }
    }

    fn seed_prompt(topic: &str) -> String {
        format!(
            "Let's have a conversation about {topic}. \
             Focus on potential vulnerabilities and security concerns."
        )
    }

    /// Run exactly `turns` invocations against the accumulating prompt.
    ///
    /// Every model response is appended to `ledger` as an [`Role::Assistant`]
    /// turn; the scripted continue cue lives only in the prompt text. There is
    /// no early exit on success, and `turns == 0` performs no invocations.
    pub async fn run(
        &self,
        topic: &str,
        turns: usize,
        ledger: &mut ConversationLedger,
    ) -> Result<DialogueTranscript, DialogueError> {
        let mut prompt = Self::seed_prompt(topic);
        let preamble_len = prompt.len();

        for turn in 0..turns {
            let response = match self.backend.invoke(&prompt).await {
                Ok(response) => response,
                Err(source) => {
                    return Err(DialogueError {
                        completed: turn,
                        requested: turns,
                        transcript: prompt,
                        source,
                    });
                }
            };

            ledger.append(Role::Assistant, response.clone());
            prompt.push_str("\n\nAI: ");
            prompt.push_str(&response);
            prompt.push_str("\n\nHuman: ");
            prompt.push_str(CONTINUE_CUE);
            self.enforce_budget(&mut prompt, preamble_len);

            debug!(turn, prompt_bytes = prompt.len(), "self-dialogue turn complete");
        }

        Ok(DialogueTranscript {
            topic: topic.to_string(),
            turns,
            text: prompt,
        })
    }

    // Keeps the topic preamble and the most recent tail of the conversation,
    // eliding the oldest middle once the budget is exceeded.
    fn enforce_budget(&self, prompt: &mut String, preamble_len: usize) {
        let max = self.config.max_prompt_bytes;
        if prompt.len() <= max {
            return;
        }

        let tail_budget = max.saturating_sub(preamble_len + ELISION_MARKER.len());
        let mut cut = prompt.len().saturating_sub(tail_budget);
        while cut < prompt.len() && !prompt.is_char_boundary(cut) {
            cut += 1;
        }
        let tail = prompt[cut..].to_string();

        prompt.truncate(preamble_len);
        prompt.push_str(ELISION_MARKER);
        prompt.push_str(&tail);
    }
}
