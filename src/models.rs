use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::{fs::File, path::Path};

/// An inbound scoring request.
///
/// Only `input_data.input_string` is recognized, every other field is ignored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScoreRequest {
    pub input_data: InputData,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InputData {
    pub input_string: String,
}

impl ScoreRequest {
    /// Parses a raw request body.
    ///
    /// Syntax errors and shape errors are reported separately, so callers can tell
    /// a body that is not JSON at all from one that lacks `input_data.input_string`.
    pub fn from_raw<S>(raw: S) -> Result<Self, Error>
    where
        S: AsRef<str>,
    {
        let value: serde_json::Value =
            serde_json::from_str(raw.as_ref()).map_err(Error::MalformedRequest)?;

        serde_json::from_value(value).map_err(Error::InvalidRequest)
    }
}

/// The outbound scoring response.
///
/// Serializes as either `{"response": "..."}` or `{"error": "..."}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScoreResponse {
    Response(String),
    Error(String),
}

impl ScoreResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ScoreResponse::Error(_))
    }

    /// Renders the response as a single JSON line.
    pub fn to_json(&self) -> String {
        // a map with one string value always serializes
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"error":"{}"}}"#, e.to_string().replace('"', "'"))
        })
    }
}

impl From<Error> for ScoreResponse {
    fn from(error: Error) -> Self {
        ScoreResponse::Error(error.to_string())
    }
}

/// Metrics on actual token usage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    /// The number of input tokens
    pub prompt_tokens: usize,

    /// The number of tokens generated
    pub completion_tokens: usize,

    /// the total number of tokens in the output sequence (prompt + completion)
    pub total_tokens: usize,
}

/// The decoded output of a single generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub usage: TokenUsage,
}

/// One or more token ids, as found in `config.json` and `generation_config.json`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum EosTokenId {
    Single(u32),
    Multiple(Vec<u32>),
}

impl EosTokenId {
    pub fn ids(&self) -> Vec<u32> {
        match self {
            EosTokenId::Single(id) => vec![*id],
            EosTokenId::Multiple(ids) => ids.clone(),
        }
    }
}

/// A token as written in `tokenizer_config.json`.
///
/// Older files store a plain string, newer ones an added-token object.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum TokenSpec {
    Text(String),
    Added { content: String },
}

impl TokenSpec {
    pub fn content(&self) -> &str {
        match self {
            TokenSpec::Text(content) => content,
            TokenSpec::Added { content } => content,
        }
    }
}

/// Use this to deserialize the `tokenizer_config.json`
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct TokenizerConfig {
    pub eos_token: Option<TokenSpec>,
}

/// The architecture independent part of a model's `config.json`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PretrainedConfig {
    pub model_type: String,

    #[serde(default)]
    pub eos_token_id: Option<EosTokenId>,
}

/// Use this to deserialize the `generation_config.json`
///
/// Every field is optional; missing values fall back to the defaults of a plain
/// `generate` call.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct GenerationConfig {
    pub do_sample: Option<bool>,
    pub temperature: Option<f64>,
    pub top_k: Option<usize>,
    pub top_p: Option<f64>,
    pub repetition_penalty: Option<f32>,
    pub eos_token_id: Option<EosTokenId>,
}

/// Reads a JSON file into `T`.
pub(crate) fn read_json<T, P>(path: P) -> Result<T, Error>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let name = path.as_ref().display().to_string();
    let mut file =
        File::open(path.as_ref()).map_err(|e| Error::LoadingFile(name.clone(), e.to_string()))?;
    serde_json::from_reader(&mut file).map_err(|e| Error::LoadingFile(name, e.to_string()))
}

impl TokenizerConfig {
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        read_json(path)
    }
}

impl PretrainedConfig {
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        read_json(path)
    }
}

impl GenerationConfig {
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        read_json(path)
    }
}
