//! LLM Inference

pub mod local;
pub mod mock;

use crate::error::Error;
use crate::models::Generation;

pub use local::LocalRuntime;
pub use mock::Mock;

/// A loaded model that turns a prompt into generated text.
///
/// Generation needs exclusive access, as implementors keep per-request state such as
/// a KV cache. Any such state must be reset at the start of every call, so a failed
/// generation never leaks into the next one.
pub trait LLMRuntimeModel: Send {
    /// Generates a continuation of `prompt` and returns the decoded output sequence.
    ///
    /// The output never holds more than the runtime's `max_length` tokens. A prompt
    /// that already reaches it fails with [`Error::PromptTooLong`].
    fn generate(&mut self, prompt: &str) -> Result<Generation, Error>;
}
