//! Model Backend Capability Interface
//!
//! One request/response exchange with whatever runs the model. Orchestration
//! code only sees this trait, so tests substitute a scripted stub and the
//! production binary plugs in [`crate::OllamaInvoker`].

use async_trait::async_trait;

use crate::LlmResult;

/// A backend that can turn one prompt into one response
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Send `prompt` to the model and return its full response text.
    ///
    /// Each invocation is independent; implementations hold no mutable state
    /// across calls. Conversation history is the caller's concern.
    async fn invoke(&self, prompt: &str) -> LlmResult<String>;

    /// Identifier of the model answering the prompts
    fn model_id(&self) -> &str;

    /// Whether the backend can currently serve invocations
    async fn is_available(&self) -> bool {
        true
    }
}
