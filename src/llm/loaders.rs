//! Locating model artifacts on disk.

pub mod model_dir;
pub mod safetensor;

pub use model_dir::ModelFiles;
pub use safetensor::IndexFile;
