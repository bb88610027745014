//! LLM
//!
//! This module loads a causal language model from a HuggingFace style model directory
//! and runs text generation on it. For now the loader supports `*.safetensors` weights
//! for the llama, qwen2, qwen3 and gemma3 families.

pub mod backend;
pub mod llmconfig;
pub mod loaders;
pub mod runtime;
