//! Local runtime running a candle model backend with a HuggingFace tokenizer.

use candle_core::{Device, Tensor};
use candle_transformers::generation::{LogitsProcessor, Sampling};
use rand::Rng;
use tokenizers::Tokenizer;

use crate::backend::{self, Architecture, ModelBackend};
use crate::error::Error;
use crate::llmconfig::{AdapterConfig, GenerationSeed, SamplingConfig, SamplingParams};
use crate::loaders::ModelFiles;
use crate::models::{
    EosTokenId, Generation, GenerationConfig, PretrainedConfig, TokenUsage, TokenizerConfig,
};
use crate::runtime::LLMRuntimeModel;

/// Fallback end-of-sequence token, if neither config names one.
const DEFAULT_EOS_TOKEN: &str = "</s>";

/// Runs generation for a single loaded model.
///
/// Model-specific logic (forward pass, KV cache) is delegated to the
/// [`ModelBackend`] trait. This struct handles the model-agnostic parts:
/// tokenization, sampling, the length bound and decoding.
pub struct LocalRuntime {
    device: Device,
    tokenizer: Tokenizer,
    backend: Box<dyn ModelBackend>,
    eos_token_ids: Vec<u32>,
    sampling: SamplingParams,
    max_length: usize,
}

impl LocalRuntime {
    /// Creates a runtime decoding greedily up to `max_length` tokens, without EOS tokens.
    pub fn new(tokenizer: Tokenizer, backend: Box<dyn ModelBackend>, max_length: usize) -> Self {
        Self {
            device: Device::Cpu,
            tokenizer,
            backend,
            eos_token_ids: Vec::new(),
            sampling: SamplingParams::default(),
            max_length,
        }
    }

    pub fn with_eos_tokens(mut self, eos_token_ids: Vec<u32>) -> Self {
        self.eos_token_ids = eos_token_ids;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Loads tokenizer, configs and weights from a model directory.
    ///
    /// This is a heavy process. Every error is returned to the caller unchanged.
    pub fn load(files: &ModelFiles, config: &AdapterConfig) -> Result<Self, Error> {
        tracing::info!("Loading Tokenizer");
        let tokenizer = Tokenizer::from_file(&files.tokenizer_file).map_err(|e| {
            Error::LoadingFile(files.tokenizer_file.display().to_string(), e.to_string())
        })?;

        let pretrained = PretrainedConfig::from_path(&files.model_config_file)?;
        let architecture = Architecture::from_model_type(&pretrained.model_type)?;

        let tokenizer_config = match &files.tokenizer_config_file {
            Some(path) => Some(TokenizerConfig::from_path(path)?),
            None => None,
        };

        let generation_config = match &files.generation_config_file {
            Some(path) => GenerationConfig::from_path(path)?,
            None => {
                tracing::info!("No generation config found, decoding greedily");
                GenerationConfig::default()
            }
        };

        let eos_token_ids = resolve_eos_tokens(
            &generation_config,
            &pretrained,
            tokenizer_config.as_ref(),
            &tokenizer,
        );
        let sampling = generation_config.sampling_params(config.seed.clone());

        tracing::info!("Loading Model Backend");
        let device = Device::Cpu;
        let backend = backend::create_backend(architecture, files, &device)?;

        tracing::info!(
            "Runtime has been initialized (eos: {:?}, sampling: {:?}, max_length: {})",
            eos_token_ids,
            sampling.sampling,
            config.max_length
        );

        Ok(Self {
            device,
            tokenizer,
            backend,
            eos_token_ids,
            sampling,
            max_length: config.max_length,
        })
    }

    /// Creates a LogitsProcessor from the resolved sampling parameters
    fn create_logits_processor(params: &SamplingParams) -> LogitsProcessor {
        let SamplingParams {
            temperature,
            top_k,
            top_p,
            ..
        } = *params;

        let sampling = match params.sampling {
            SamplingConfig::ArgMax => Sampling::ArgMax,
            SamplingConfig::All => Sampling::All { temperature },
            SamplingConfig::TopK => Sampling::TopK {
                k: top_k,
                temperature,
            },
            SamplingConfig::TopP => Sampling::TopP {
                p: top_p,
                temperature,
            },
            SamplingConfig::TopKThenTopP => Sampling::TopKThenTopP {
                k: top_k,
                p: top_p,
                temperature,
            },
        };

        let seed = match params.seed {
            GenerationSeed::Fixed(inner) => inner as u64,
            GenerationSeed::Random => {
                let mut rng = rand::rng();
                let seed = rng.random_range(1..1e10 as u64);
                tracing::debug!("Using seed for Logits Processor: {seed}");
                seed
            }
        };

        LogitsProcessor::from_sampling(seed, sampling)
    }

    /// Runs the model on `prompt_tokens` until the output sequence reaches
    /// `max_length` or ends with an EOS token. Returns the full sequence.
    ///
    /// A prompt that already fills `max_length` leaves no room and is rejected.
    fn generate_tokens(&mut self, prompt_tokens: &[u32]) -> Result<Vec<u32>, Error> {
        if prompt_tokens.len() >= self.max_length {
            return Err(Error::PromptTooLong {
                prompt_tokens: prompt_tokens.len(),
                max_length: self.max_length,
            });
        }

        let mut tokens = prompt_tokens.to_vec();

        // Clear cache for fresh generation
        self.backend.clear_kv_cache()?;

        let mut logits_processor = Self::create_logits_processor(&self.sampling);
        let mut input = Tensor::new(prompt_tokens, &self.device)?.unsqueeze(0)?;
        let mut index = 0usize;

        while tokens.len() < self.max_length {
            let logits = self.backend.forward(&input, index)?.squeeze(0)?;

            let logits = if self.sampling.uses_repetition_penalty() {
                candle_transformers::utils::apply_repeat_penalty(
                    &logits,
                    self.sampling.repetition_penalty,
                    &tokens,
                )?
            } else {
                logits
            };

            let next_token = logits_processor.sample(&logits)?;

            index = tokens.len();
            tokens.push(next_token);

            if self.eos_token_ids.contains(&next_token) {
                tracing::debug!("FOUND EOS TOKEN");
                break;
            }

            input = Tensor::new(&[next_token], &self.device)?.unsqueeze(0)?;
        }

        Ok(tokens)
    }
}

impl LLMRuntimeModel for LocalRuntime {
    fn generate(&mut self, prompt: &str) -> Result<Generation, Error> {
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| Error::MessageEncodingError(e.to_string()))?;

        let prompt_tokens = encoding.get_ids();
        if prompt_tokens.is_empty() {
            return Err(Error::EmptyPrompt);
        }

        let tokens = self.generate_tokens(prompt_tokens)?;

        let text = self
            .tokenizer
            .decode(&tokens, true)
            .map_err(|e| Error::MessageDecodingError(e.to_string()))?;

        let usage = TokenUsage {
            prompt_tokens: prompt_tokens.len(),
            completion_tokens: tokens.len() - prompt_tokens.len(),
            total_tokens: tokens.len(),
        };

        tracing::debug!(
            "Finished inference. Prompt tokens: {}, Completion tokens: {}",
            usage.prompt_tokens,
            usage.completion_tokens
        );

        Ok(Generation { text, usage })
    }
}

/// Collects the ids that end generation.
///
/// `generation_config.json` wins over `config.json`. Without either, the EOS token of
/// `tokenizer_config.json` (or `</s>`) is looked up in the vocabulary.
pub fn resolve_eos_tokens(
    generation_config: &GenerationConfig,
    pretrained: &PretrainedConfig,
    tokenizer_config: Option<&TokenizerConfig>,
    tokenizer: &Tokenizer,
) -> Vec<u32> {
    if let Some(ids) = generation_config
        .eos_token_id
        .as_ref()
        .or(pretrained.eos_token_id.as_ref())
        .map(EosTokenId::ids)
    {
        return ids;
    }

    let eos = match tokenizer_config.and_then(|tc| tc.eos_token.as_ref()) {
        Some(eos) => {
            tracing::info!("Using EOS token from tokenizer_config: {}", eos.content());
            eos.content()
        }
        None => {
            tracing::warn!("No EOS token in model configs, falling back to default");
            DEFAULT_EOS_TOKEN
        }
    };

    match tokenizer.token_to_id(eos) {
        Some(id) => vec![id],
        None => {
            tracing::warn!("EOS token {eos} is not in the tokenizer vocabulary");
            Vec::new()
        }
    }
}
