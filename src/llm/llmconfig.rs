use crate::error::Error;
use crate::models::GenerationConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    path::{Path, PathBuf},
};

/// Names the base directory of the deployed model artifact.
pub const MODEL_DIR_ENV: &str = "AZUREML_MODEL_DIR";

/// Fixed subpath below [`MODEL_DIR_ENV`] holding the model and tokenizer files.
pub const MODEL_SUBDIR: &str = "model";

/// Optional override of [`DEFAULT_MAX_LENGTH`].
pub const MAX_LENGTH_ENV: &str = "SCORE_MAX_LENGTH";

/// Maximum length of the output sequence, prompt included.
pub const DEFAULT_MAX_LENGTH: usize = 100;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AdapterConfig {
    /// Path to the model directory
    ///
    /// Holds `config.json`, `tokenizer.json` and either `model.safetensors` or
    /// `model.safetensors.index.json` with its shards.
    pub model_dir: PathBuf,

    /// Upper bound for prompt plus generated tokens
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Seed used when the model's generation config asks for sampling
    #[serde(default)]
    pub seed: GenerationSeed,
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub enum GenerationSeed {
    Fixed(usize),

    #[default]
    Random,
}

/// SamplingConfig mirrors the variants of
/// candle_transformers::generation::Sampling that a generation config can select
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SamplingConfig {
    #[default]
    ArgMax,
    All,          // { temperature: f64 },
    TopK,         // { k: usize, temperature: f64 },
    TopP,         // { p: f64, temperature: f64 },
    TopKThenTopP, // { k: usize, p: f64, temperature: f64 },
}

/// Resolved decoding parameters for one model.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub sampling: SamplingConfig,

    /// Lower Temperatures 0.1 - 0.5 select tokens with high confidence
    /// Higher Temperatures 0.5 - 1.0 consider more possibilities for the next token
    pub temperature: f64,

    /// Limits sampling to the K most likely next tokens.
    pub top_k: usize,

    /// Nucleus sampling. Dynamically selects the smallest
    /// set of tokens whose cumulative probability exceeds P
    pub top_p: f64,

    /// Repetition penalty, 1.0 disables it
    pub repetition_penalty: f32,

    pub seed: GenerationSeed,
}

impl Default for SamplingParams {
    /// Greedy decoding
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::ArgMax,
            temperature: 1.0,
            top_k: 50,
            top_p: 1.0,
            repetition_penalty: 1.0,
            seed: GenerationSeed::Random,
        }
    }
}

impl SamplingParams {
    pub fn uses_repetition_penalty(&self) -> bool {
        (self.repetition_penalty - 1.0).abs() > f32::EPSILON
    }
}

impl GenerationConfig {
    /// Maps the model's `generation_config.json` onto candle sampling parameters.
    ///
    /// Without `do_sample` the model decodes greedily, which is also what an empty
    /// or missing generation config yields.
    pub fn sampling_params(&self, seed: GenerationSeed) -> SamplingParams {
        let defaults = SamplingParams::default();

        let temperature = self.temperature.unwrap_or(defaults.temperature);
        let top_k = self.top_k.unwrap_or(defaults.top_k);
        let top_p = self.top_p.unwrap_or(defaults.top_p);
        let repetition_penalty = self
            .repetition_penalty
            .unwrap_or(defaults.repetition_penalty);

        let sampling = if !self.do_sample.unwrap_or(false) {
            SamplingConfig::ArgMax
        } else {
            match (top_k > 0, top_p < 1.0) {
                (true, true) => SamplingConfig::TopKThenTopP,
                (true, false) => SamplingConfig::TopK,
                (false, true) => SamplingConfig::TopP,
                (false, false) => SamplingConfig::All,
            }
        };

        SamplingParams {
            sampling,
            temperature,
            top_k,
            top_p,
            repetition_penalty,
            seed,
        }
    }
}

impl AdapterConfig {
    /// Creates a config for `model_dir` with default generation settings.
    pub fn new<P>(model_dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            model_dir: model_dir.into(),
            max_length: DEFAULT_MAX_LENGTH,
            seed: GenerationSeed::default(),
        }
    }

    /// Resolves the config the hosting platform provides through the environment.
    ///
    /// The model lives in the `model` subdirectory of [`MODEL_DIR_ENV`].
    pub fn from_env() -> Result<Self, Error> {
        let base = std::env::var_os(MODEL_DIR_ENV)
            .ok_or_else(|| Error::MissingEnvironment(MODEL_DIR_ENV.to_string()))?;

        let mut config = Self::new(PathBuf::from(base).join(MODEL_SUBDIR));

        if let Ok(raw) = std::env::var(MAX_LENGTH_ENV) {
            config.max_length = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|len| *len > 0)
                .ok_or_else(|| Error::InvalidEnvironment(MAX_LENGTH_ENV.to_string(), raw))?;
        }

        tracing::debug!("Resolved adapter config: {:?}", config);

        Ok(config)
    }

    /// Loads a config from path
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let mut file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(&mut file)?)
    }

    /// Loads [`Self`] from a raw String.
    pub fn from_raw<S>(content: S) -> Result<Self, Error>
    where
        S: AsRef<str>,
    {
        Ok(serde_json::from_str(content.as_ref())?)
    }
}
