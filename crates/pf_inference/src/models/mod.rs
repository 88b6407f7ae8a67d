use pf_core::{Error, Result};
use std::sync::Arc;

pub use pf_core::InferenceModel;

pub mod dummy;
pub mod openai;

pub use dummy::DummyModel;
pub use openai::OpenAiModel;

use crate::Config;

/// Pick a model backend by `Config::backend` (`openai` or `dummy`).
pub fn create_model(config: Option<Config>) -> Result<Arc<dyn InferenceModel>> {
    let config = config.unwrap_or_default();
    match config.backend.as_str() {
        "openai" => Ok(Arc::new(OpenAiModel::new(&config)?)),
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::Configuration(format!(
            "Unknown model backend: {} (available: openai, dummy)",
            other
        ))),
    }
}
