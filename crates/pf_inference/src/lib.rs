use std::time::Duration;

pub mod classify;
pub mod fit;
pub mod models;
pub mod prompts;
pub mod thread;

#[derive(Debug, Clone)]
pub struct Config {
    /// `openai` for any OpenAI-compatible endpoint, `dummy` for offline runs.
    pub backend: String,
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: "openai".to_string(),
            api_key: None,
            model_name: None,
            base_url: None,
            temperature: None,
            request_timeout: Duration::from_secs(90),
        }
    }
}

pub mod prelude {
    pub use super::classify::PromptClassifier;
    pub use super::fit::{fits_profile, FitDecisionRule};
    pub use super::models::create_model;
    pub use super::thread::{split_thread, ThreadWriter};
    pub use super::Config;
    pub use pf_core::{Error, InferenceModel, Result};
}

pub use classify::PromptClassifier;
pub use fit::{fits_profile, FitDecisionRule};
pub use models::create_model;
pub use thread::ThreadWriter;
