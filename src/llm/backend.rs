//! Model backend abstraction.
//!
//! Each supported model family implements [`ModelBackend`] to encapsulate
//! model-specific forward pass, KV cache management, and weight loading.

pub mod gemma;
pub mod llama;
pub mod qwen2;
pub mod qwen3;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;

use crate::error::Error;
use crate::loaders::ModelFiles;

/// Abstraction over different model weight backends.
///
/// Implementors encapsulate model weights, forward pass logic,
/// and KV cache management.
pub trait ModelBackend: Send {
    /// Run a forward pass through the model.
    ///
    /// `input` is the token tensor [batch, seq_len].
    /// `index` is the position index for KV cache offset.
    /// Returns logits for the last token as [batch, vocab_size].
    fn forward(&mut self, input: &Tensor, index: usize) -> Result<Tensor, Error>;

    /// Clear the KV cache for a fresh generation.
    fn clear_kv_cache(&mut self) -> Result<(), Error>;
}

/// Model families with a backend, keyed by `model_type` in `config.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    Llama,
    Qwen2,
    Qwen3,
    Gemma3,
}

impl Architecture {
    pub fn from_model_type(model_type: &str) -> Result<Self, Error> {
        match model_type {
            "llama" => Ok(Self::Llama),
            "qwen2" => Ok(Self::Qwen2),
            "qwen3" => Ok(Self::Qwen3),
            "gemma3" | "gemma3_text" => Ok(Self::Gemma3),
            other => Err(Error::UnsupportedModelType(other.to_string())),
        }
    }
}

/// Extracts the last token's logits from model output.
///
/// Handles both 3D `[batch, seq_len, vocab]` and 2D `[batch, vocab]` outputs.
/// This is model-agnostic and shared by all backends.
pub fn extract_last_token_logits(logits: Tensor) -> Result<Tensor, Error> {
    if logits.dims().len() == 3 {
        let seq_len = logits.dim(1)?;
        Ok(logits.narrow(1, seq_len - 1, 1)?.squeeze(1)?)
    } else {
        Ok(logits)
    }
}

/// Weight dtype for a device. CPU kernels run in F32.
pub fn weight_dtype(device: &Device) -> DType {
    if device.is_cpu() {
        DType::F32
    } else {
        DType::BF16
    }
}

/// Creates the backend for `architecture` from the safetensor weights in `files`.
pub fn create_backend(
    architecture: Architecture,
    files: &ModelFiles,
    device: &Device,
) -> Result<Box<dyn ModelBackend>, Error> {
    let dtype = weight_dtype(device);

    tracing::info!(
        "Loading {:?} safetensors model from {} file(s)",
        architecture,
        files.weights.len()
    );

    // SAFETY: the weight files are read-only artifacts mounted for the lifetime of the process
    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(files.weights.as_slice(), dtype, device)?
    };

    let backend: Box<dyn ModelBackend> = match architecture {
        Architecture::Llama => Box::new(llama::LlamaBackend::from_safetensors(
            vb,
            &files.model_config_file,
            device,
        )?),
        Architecture::Qwen2 => Box::new(qwen2::Qwen2Backend::from_safetensors(
            vb,
            &files.model_config_file,
        )?),
        Architecture::Qwen3 => Box::new(qwen3::Qwen3Backend::from_safetensors(
            vb,
            &files.model_config_file,
        )?),
        Architecture::Gemma3 => Box::new(gemma::Gemma3Backend::from_safetensors(
            vb,
            &files.model_config_file,
            false,
        )?),
    };

    Ok(backend)
}
