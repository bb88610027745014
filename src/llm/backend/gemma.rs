use std::path::Path;

use candle_core::Tensor;
use candle_nn::VarBuilder;
use candle_transformers::models::gemma3::{self as gemma3_model, Config as Gemma3Config};
use serde_json::Value;

use crate::error::Error;
use crate::models::read_json;

use super::{extract_last_token_logits, ModelBackend};

pub struct Gemma3Backend {
    model: gemma3_model::Model,
}

impl Gemma3Backend {
    /// Load Gemma3 weights from safetensors files.
    ///
    /// Multimodal checkpoints nest the language model settings under `text_config`
    /// and its weights under `language_model`; only that part is loaded.
    pub fn from_safetensors(
        vb: VarBuilder,
        model_config_file: &Path,
        use_flash: bool,
    ) -> Result<Self, Error> {
        tracing::debug!("Deserialize Gemma3Config: {model_config_file:?}");
        let mut json_value: Value = read_json(model_config_file)?;

        let (json_value, vb) = match json_value.get_mut("text_config").map(Value::take) {
            Some(text_config) => {
                tracing::debug!("Using text_config of multimodal Gemma3 checkpoint");
                (text_config, vb.pp("language_model"))
            }
            None => (json_value, vb),
        };

        let gemma3_config: Gemma3Config = match serde_json::from_value(json_value) {
            Ok(inner) => inner,
            Err(err) => {
                tracing::error!("Error reading {model_config_file:?} : {err:?}");
                return Err(err.into());
            }
        };

        let model = gemma3_model::Model::new(use_flash, &gemma3_config, vb)?;

        Ok(Self { model })
    }
}

impl ModelBackend for Gemma3Backend {
    fn forward(&mut self, input: &Tensor, index: usize) -> Result<Tensor, Error> {
        let logits = self.model.forward(input, index)?;
        extract_last_token_logits(logits)
    }

    fn clear_kv_cache(&mut self) -> Result<(), Error> {
        self.model.clear_kv_cache();
        Ok(())
    }
}
