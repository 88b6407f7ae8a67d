use async_trait::async_trait;
use std::fmt;

use crate::Result;

#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Send a single user prompt and return the model's reply text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Judges an article against a profile and returns the raw verdict text.
#[async_trait]
pub trait RelevanceClassifier: Send + Sync {
    async fn classify(&self, profile: &str, article: &str) -> Result<String>;
}
