//! Inference adapter between a model-server `init`/`run` contract and a causal
//! language model loaded with candle.
//!
//! ```no_run
//! use llm_score_adapter::Host;
//!
//! let host = Host::new();
//! host.init().expect("model must load before serving");
//!
//! let response = host.run(r#"{"input_data": {"input_string": "Hello"}}"#);
//! println!("{}", response.to_json());
//! ```

mod adapter;
mod error;
mod host;
mod llm;
pub mod logging;
mod models;

pub use adapter::InferenceAdapter;
pub use error::{Error, Result};
pub use host::Host;
pub use llm::backend;
pub use llm::llmconfig;
pub use llm::loaders;
pub use llm::runtime;
pub use llmconfig::*;
pub use models::*;
