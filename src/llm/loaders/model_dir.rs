use std::path::{Path, PathBuf};

use super::IndexFile;
use crate::Error;

pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const TOKENIZER_CONFIG_FILE: &str = "tokenizer_config.json";
pub const MODEL_CONFIG_FILE: &str = "config.json";
pub const GENERATION_CONFIG_FILE: &str = "generation_config.json";
pub const MODEL_FILE: &str = "model.safetensors";
pub const MODEL_INDEX_FILE: &str = "model.safetensors.index.json";

/// The files of a HuggingFace style model directory.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    /// Path to model directory
    pub model_dir: PathBuf,

    /// Path to `tokenizer.json`
    pub tokenizer_file: PathBuf,

    /// Path to `tokenizer_config.json`
    pub tokenizer_config_file: Option<PathBuf>,

    /// Path to `config.json`
    pub model_config_file: PathBuf,

    /// Path to `generation_config.json`
    pub generation_config_file: Option<PathBuf>,

    /// All safetensor files holding the weights
    ///
    /// Either the single `model.safetensors` or every shard named by
    /// `model.safetensors.index.json`.
    pub weights: Vec<PathBuf>,
}

impl ModelFiles {
    /// Inspects `dir` and collects the files needed to load a model from it.
    ///
    /// Fails if the directory, the tokenizer, the model config or any weight file
    /// is missing. Nothing is parsed beyond the shard index.
    pub fn discover<P>(dir: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let model_dir = dir.as_ref().to_path_buf();

        if !model_dir.is_dir() {
            return Err(Error::MissingModelDir(model_dir));
        }

        let tokenizer_file = required(&model_dir, TOKENIZER_FILE)?;
        let model_config_file = required(&model_dir, MODEL_CONFIG_FILE)?;
        let tokenizer_config_file = optional(&model_dir, TOKENIZER_CONFIG_FILE);
        let generation_config_file = optional(&model_dir, GENERATION_CONFIG_FILE);

        let weights = if let Some(single) = optional(&model_dir, MODEL_FILE) {
            tracing::debug!("Using single weight file {}", single.display());
            vec![single]
        } else if let Some(index) = optional(&model_dir, MODEL_INDEX_FILE) {
            let index_file = IndexFile::from_path(&index)?;
            let shards = index_file.files(&model_dir);

            tracing::debug!(
                "Index lists {} tensors in {} shards",
                index_file.num_tensors(),
                shards.len()
            );

            if let Some(missing) = shards.iter().find(|shard| !shard.is_file()) {
                return Err(Error::MissingModelFile(missing.clone()));
            }

            shards
        } else {
            return Err(Error::MissingModelFile(model_dir.join(MODEL_FILE)));
        };

        Ok(Self {
            model_dir,
            tokenizer_file,
            tokenizer_config_file,
            model_config_file,
            generation_config_file,
            weights,
        })
    }
}

fn required(dir: &Path, name: &str) -> Result<PathBuf, Error> {
    optional(dir, name).ok_or_else(|| Error::MissingModelFile(dir.join(name)))
}

fn optional(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = dir.join(name);
    path.is_file().then_some(path)
}
