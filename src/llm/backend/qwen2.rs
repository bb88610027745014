use std::path::Path;

use candle_core::Tensor;
use candle_nn::VarBuilder;
use candle_transformers::models::qwen2::{self as qwen2_model, Config as Qwen2Config};

use crate::error::Error;
use crate::models::read_json;

use super::{extract_last_token_logits, ModelBackend};

pub struct Qwen2Backend {
    model: qwen2_model::ModelForCausalLM,
}

impl Qwen2Backend {
    /// Load Qwen2 weights from safetensors files.
    pub fn from_safetensors(vb: VarBuilder, model_config_file: &Path) -> Result<Self, Error> {
        let qwen2_config: Qwen2Config = read_json(model_config_file)?;

        let model = qwen2_model::ModelForCausalLM::new(&qwen2_config, vb)?;

        Ok(Self { model })
    }
}

impl ModelBackend for Qwen2Backend {
    fn forward(&mut self, input: &Tensor, index: usize) -> Result<Tensor, Error> {
        let logits = self.model.forward(input, index)?;
        extract_last_token_logits(logits)
    }

    fn clear_kv_cache(&mut self) -> Result<(), Error> {
        self.model.clear_kv_cache();
        Ok(())
    }
}
