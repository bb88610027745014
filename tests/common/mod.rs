use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use candle_core::{Device, Tensor};
use llm_score_adapter::{backend::ModelBackend, runtime::LocalRuntime, Error};
use tokenizers::Tokenizer;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// Ids of the tiny fixture vocabulary
#[allow(dead_code)]
pub mod ids {
    pub const EOS: u32 = 1;
    pub const BOS: u32 = 2;
    pub const HELLO: u32 = 3;
    pub const WORLD: u32 = 4;
    pub const FOX: u32 = 8;
    pub const DOG: u32 = 12;
    pub const DOT: u32 = 13;
    pub const AGAIN: u32 = 15;
    pub const VOCAB_SIZE: usize = 16;
}

/// Initializes tracing at DEBUG level.
/// Uses `try_init()` so it doesn't panic when called from multiple tests
/// in the same process.
#[allow(dead_code)]
pub fn enable_logging() {
    let verbose = tracing_subscriber::fmt::layer().with_filter(filter::LevelFilter::DEBUG);
    let _ = Registry::default().with(verbose).try_init();
}

/// Directory with tokenizer and configs of a tiny llama-shaped model.
/// The weight shards are placeholders and do not load.
#[allow(dead_code)]
pub fn tiny_model_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/tiny")
}

#[allow(dead_code)]
pub fn tiny_tokenizer() -> Tokenizer {
    Tokenizer::from_file(tiny_model_dir().join("tokenizer.json")).expect("fixture tokenizer loads")
}

/// One observed call of [`ScriptedBackend::forward`]
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardCall {
    pub seq_len: usize,
    pub index: usize,
}

/// Shared views into a [`ScriptedBackend`] after it moved into a runtime.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct BackendHandles {
    pub calls: Arc<Mutex<Vec<ForwardCall>>>,
    pub clears: Arc<Mutex<usize>>,
    pub fail_next: Arc<AtomicBool>,
    pub panic_next: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl BackendHandles {
    pub fn calls(&self) -> Vec<ForwardCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clears(&self) -> usize {
        *self.clears.lock().unwrap()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn panic_next(&self) {
        self.panic_next.store(true, Ordering::SeqCst);
    }
}

/// A backend whose logits pick the tokens of a fixed script, one per forward pass.
///
/// The script restarts whenever the KV cache is cleared.
#[allow(dead_code)]
pub struct ScriptedBackend {
    script: Vec<u32>,
    step: usize,
    handles: BackendHandles,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new(script: Vec<u32>) -> Self {
        assert!(!script.is_empty());
        Self {
            script,
            step: 0,
            handles: BackendHandles::default(),
        }
    }

    pub fn handles(&self) -> BackendHandles {
        self.handles.clone()
    }
}

impl ModelBackend for ScriptedBackend {
    fn forward(&mut self, input: &Tensor, index: usize) -> Result<Tensor, Error> {
        if self.handles.fail_next.swap(false, Ordering::SeqCst) {
            return Err(Error::ExecutionError("scripted failure".to_string()));
        }
        if self.handles.panic_next.swap(false, Ordering::SeqCst) {
            panic!("scripted panic");
        }

        let (_, seq_len) = input.dims2()?;
        self.handles
            .calls
            .lock()
            .unwrap()
            .push(ForwardCall { seq_len, index });

        let token = self.script[self.step % self.script.len()];
        self.step += 1;

        let mut logits = vec![0f32; ids::VOCAB_SIZE];
        logits[token as usize] = 10.0;

        Ok(Tensor::from_vec(logits, (1, ids::VOCAB_SIZE), &Device::Cpu)?)
    }

    fn clear_kv_cache(&mut self) -> Result<(), Error> {
        self.step = 0;
        *self.handles.clears.lock().unwrap() += 1;
        Ok(())
    }
}

/// A greedy runtime over the tiny tokenizer and a scripted backend, stopping at `</s>`.
#[allow(dead_code)]
pub fn scripted_runtime(script: Vec<u32>, max_length: usize) -> (LocalRuntime, BackendHandles) {
    let backend = ScriptedBackend::new(script);
    let handles = backend.handles();

    let runtime = LocalRuntime::new(tiny_tokenizer(), Box::new(backend), max_length)
        .with_eos_tokens(vec![ids::EOS]);

    (runtime, handles)
}
