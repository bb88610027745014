use std::path::Path;

use candle_core::Tensor;
use candle_nn::VarBuilder;
use candle_transformers::models::qwen3::{self as qwen3_model, Config as Qwen3Config};

use crate::error::Error;
use crate::models::read_json;

use super::{extract_last_token_logits, ModelBackend};

pub struct Qwen3Backend {
    model: qwen3_model::ModelForCausalLM,
}

impl Qwen3Backend {
    /// Load Qwen3 weights from safetensors files.
    pub fn from_safetensors(vb: VarBuilder, model_config_file: &Path) -> Result<Self, Error> {
        let qwen3_config: Qwen3Config = read_json(model_config_file)?;

        let model = qwen3_model::ModelForCausalLM::new(&qwen3_config, vb)?;

        Ok(Self { model })
    }
}

impl ModelBackend for Qwen3Backend {
    fn forward(&mut self, input: &Tensor, index: usize) -> Result<Tensor, Error> {
        let logits = self.model.forward(input, index)?;
        extract_last_token_logits(logits)
    }

    fn clear_kv_cache(&mut self) -> Result<(), Error> {
        self.model.clear_kv_cache();
        Ok(())
    }
}
