use std::path::Path;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::llama::{self as llama_model, Llama, LlamaConfig};

use crate::error::Error;
use crate::models::read_json;

use super::{extract_last_token_logits, weight_dtype, ModelBackend};

pub struct LlamaBackend {
    model: Llama,
    cache: llama_model::Cache,
    config: llama_model::Config,
    device: Device,
}

impl LlamaBackend {
    /// Load Llama weights from safetensors files.
    pub fn from_safetensors(
        vb: VarBuilder,
        model_config_file: &Path,
        device: &Device,
    ) -> Result<Self, Error> {
        let llama_config: LlamaConfig = read_json(model_config_file)?;
        let config = llama_config.into_config(false);

        let model = Llama::load(vb, &config)?;
        let cache = llama_model::Cache::new(true, weight_dtype(device), &config, device)?;

        Ok(Self {
            model,
            cache,
            config,
            device: device.clone(),
        })
    }
}

impl ModelBackend for LlamaBackend {
    fn forward(&mut self, input: &Tensor, index: usize) -> Result<Tensor, Error> {
        let logits = self.model.forward(input, index, &mut self.cache)?;
        extract_last_token_logits(logits)
    }

    fn clear_kv_cache(&mut self) -> Result<(), Error> {
        self.cache = llama_model::Cache::new(
            true,
            weight_dtype(&self.device),
            &self.config,
            &self.device,
        )?;
        Ok(())
    }
}
