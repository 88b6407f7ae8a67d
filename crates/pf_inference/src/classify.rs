use async_trait::async_trait;
use pf_core::{Error, InferenceModel, RelevanceClassifier, Result};
use std::fmt;
use std::sync::Arc;

use crate::prompts::{render, truncate_chars, FIT_TEMPLATE};

pub const DEFAULT_MAX_ARTICLE_CHARS: usize = 24_000;

/// Asks a model whether an article fits a profile using the profile-comparison
/// template.
pub struct PromptClassifier {
    model: Arc<dyn InferenceModel>,
    template: String,
    max_article_chars: usize,
}

impl fmt::Debug for PromptClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptClassifier")
            .field("model", &self.model.name())
            .field("max_article_chars", &self.max_article_chars)
            .finish()
    }
}

impl PromptClassifier {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self {
            model,
            template: FIT_TEMPLATE.to_string(),
            max_article_chars: DEFAULT_MAX_ARTICLE_CHARS,
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_max_article_chars(mut self, max_article_chars: usize) -> Self {
        self.max_article_chars = max_article_chars.max(1);
        self
    }
}

#[async_trait]
impl RelevanceClassifier for PromptClassifier {
    async fn classify(&self, profile: &str, article: &str) -> Result<String> {
        let article = truncate_chars(article, self.max_article_chars);
        let prompt = render(&self.template, &[("profile", profile), ("article", article)]);

        let verdict = self
            .model
            .complete(&prompt)
            .await
            .map_err(|e| Error::Classification(format!("{}: {}", self.model.name(), e)))?;

        tracing::debug!(model = self.model.name(), verdict = %verdict.trim(), "classified article");
        Ok(verdict)
    }
}
