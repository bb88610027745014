use serde::{ser::Serializer, Serialize};
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Environment variable {0} is not set")]
    MissingEnvironment(String),

    #[error("Invalid value for environment variable {0} ({1})")]
    InvalidEnvironment(String, String),

    #[error("Model directory not found ({})", .0.display())]
    MissingModelDir(PathBuf),

    #[error("Missing model file ({})", .0.display())]
    MissingModelFile(PathBuf),

    #[error("Error Loading File ({0}): {1}")]
    LoadingFile(String, String),

    #[error("Unsupported model type ({0})")]
    UnsupportedModelType(String),

    #[error("Request is not valid JSON ({0})")]
    MalformedRequest(serde_json::Error),

    #[error("Invalid request ({0})")]
    InvalidRequest(serde_json::Error),

    #[error("Error Encoding Message ({0})")]
    MessageEncodingError(String),

    #[error("Error Decoding Message ({0})")]
    MessageDecodingError(String),

    #[error("Prompt encodes to zero tokens")]
    EmptyPrompt,

    #[error("Input length of the prompt is {prompt_tokens} tokens, but max_length is set to {max_length}")]
    PromptTooLong {
        prompt_tokens: usize,
        max_length: usize,
    },

    #[error("Error during execution ({0})")]
    ExecutionError(String),

    #[error("Tensor operation failed ({0})")]
    Tensor(#[from] candle_core::Error),

    #[error("Error deserializing JSON ({0})")]
    JsonSerdeError(#[from] serde_json::Error),

    #[error("Inference panicked ({0})")]
    Panic(String),

    #[error("Could not initialize logging ({0})")]
    Logging(String),

    #[error("adapter is already initialized")]
    AlreadyInitialized,

    #[error("adapter is not initialized")]
    NotInitialized,
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
