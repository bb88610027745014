//! The inference adapter: one loaded model and the request handler around it.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};

use crate::error::Error;
use crate::llmconfig::AdapterConfig;
use crate::loaders::ModelFiles;
use crate::models::{ScoreRequest, ScoreResponse};
use crate::runtime::{LLMRuntimeModel, LocalRuntime};

/// Owns the model and tokenizer handles of the serving process.
///
/// A value only exists after initialization succeeded, so every call to
/// [`InferenceAdapter::handle`] sees a ready model. The handles are never replaced
/// afterwards.
///
/// Generation needs exclusive access to the model, which the inner mutex provides.
/// Concurrent callers are therefore serialized, but no ordering between them is
/// promised.
pub struct InferenceAdapter {
    generator: Mutex<Box<dyn LLMRuntimeModel>>,
}

impl InferenceAdapter {
    /// Loads the model named by the hosting environment.
    ///
    /// Errors are not recovered. A process without a model must not serve.
    pub fn initialize() -> Result<Self, Error> {
        Self::initialize_from(AdapterConfig::from_env()?)
    }

    /// Loads the model from an explicit config.
    pub fn initialize_from(config: AdapterConfig) -> Result<Self, Error> {
        tracing::info!("Initializing adapter from {}", config.model_dir.display());

        let files = ModelFiles::discover(&config.model_dir)?;
        let runtime = LocalRuntime::load(&files, &config)?;

        Ok(Self::with_generator(runtime))
    }

    /// Wraps an already loaded generator.
    pub fn with_generator<G>(generator: G) -> Self
    where
        G: LLMRuntimeModel + 'static,
    {
        Self {
            generator: Mutex::new(Box::new(generator)),
        }
    }

    /// Turns a raw request body into a response.
    ///
    /// Never fails: every error along parse, tokenize, generate and decode is logged
    /// and returned as `{"error": ...}`.
    pub fn handle(&self, raw_request: &str) -> ScoreResponse {
        match self.try_handle(raw_request) {
            Ok(text) => ScoreResponse::Response(text),
            Err(error) => {
                tracing::error!("Error: {error}");
                ScoreResponse::from(error)
            }
        }
    }

    fn try_handle(&self, raw_request: &str) -> Result<String, Error> {
        let request = ScoreRequest::from_raw(raw_request)?;
        let prompt = request.input_data.input_string;

        // generators reset their state on every call, a poisoned lock is still usable
        let mut generator = self.generator.lock().unwrap_or_else(PoisonError::into_inner);

        let generation = panic::catch_unwind(AssertUnwindSafe(|| generator.generate(&prompt)))
            .map_err(|payload| Error::Panic(panic_message(payload.as_ref())))??;

        tracing::debug!("Generated {:?}", generation.usage);

        Ok(generation.text)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
