use crate::llmconfig::DEFAULT_MAX_LENGTH;
use crate::models::{Generation, TokenUsage};
use crate::runtime::LLMRuntimeModel;

/// A model stand-in that needs no weights.
///
/// Whitespace separated words count as tokens. The prompt is echoed and filled up
/// with a fixed word until `max_length` words are reached. Prompts of `max_length`
/// words or more are rejected.
pub struct Mock {
    max_length: usize,
    filler: String,
}

impl Default for Mock {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}

impl Mock {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            filler: "hello".to_string(),
        }
    }
}

impl LLMRuntimeModel for Mock {
    fn generate(&mut self, prompt: &str) -> Result<Generation, crate::Error> {
        let mut words: Vec<&str> = prompt.split_whitespace().collect();
        if words.is_empty() {
            return Err(crate::Error::EmptyPrompt);
        }

        let prompt_tokens = words.len();
        if prompt_tokens >= self.max_length {
            return Err(crate::Error::PromptTooLong {
                prompt_tokens,
                max_length: self.max_length,
            });
        }

        while words.len() < self.max_length {
            words.push(&self.filler);
        }

        Ok(Generation {
            text: words.join(" "),
            usage: TokenUsage {
                prompt_tokens,
                completion_tokens: words.len() - prompt_tokens,
                total_tokens: words.len(),
            },
        })
    }
}
