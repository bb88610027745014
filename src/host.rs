//! Lifecycle hooks of the hosting platform.
//!
//! The platform calls `init` once at process start and `run` once per request.
//! [`Host`] mirrors that contract with an explicit uninitialized and ready phase.

use std::sync::OnceLock;

use crate::adapter::InferenceAdapter;
use crate::error::Error;
use crate::llmconfig::AdapterConfig;
use crate::models::ScoreResponse;

#[derive(Default)]
pub struct Host {
    adapter: OnceLock<InferenceAdapter>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `init` hook: loads the model named by the environment.
    ///
    /// On error the host stays uninitialized.
    pub fn init(&self) -> Result<(), Error> {
        self.ensure_uninitialized()?;
        self.install(InferenceAdapter::initialize()?)
    }

    /// Same as [`Host::init`] with an explicit config.
    pub fn init_with(&self, config: AdapterConfig) -> Result<(), Error> {
        self.ensure_uninitialized()?;
        self.install(InferenceAdapter::initialize_from(config)?)
    }

    /// Moves the host into the ready phase with an already built adapter.
    ///
    /// The transition happens once. Later calls fail and keep the first adapter.
    pub fn install(&self, adapter: InferenceAdapter) -> Result<(), Error> {
        self.adapter
            .set(adapter)
            .map_err(|_| Error::AlreadyInitialized)?;

        tracing::info!("Adapter is ready");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.adapter.get().is_some()
    }

    /// The `run` hook: handles one raw request body.
    pub fn run(&self, raw_request: &str) -> ScoreResponse {
        match self.adapter.get() {
            Some(adapter) => adapter.handle(raw_request),
            None => {
                let error = Error::NotInitialized;
                tracing::error!("Error: {error}");
                ScoreResponse::from(error)
            }
        }
    }

    fn ensure_uninitialized(&self) -> Result<(), Error> {
        if self.is_ready() {
            return Err(Error::AlreadyInitialized);
        }
        Ok(())
    }
}
