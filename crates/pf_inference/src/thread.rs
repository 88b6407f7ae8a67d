use pf_core::{Error, InferenceModel, Result};
use std::fmt;
use std::sync::Arc;

use crate::prompts::{render, truncate_chars, SUMMARY_TEMPLATE, THREAD_TEMPLATE};

pub const SUMMARY_FAILED: &str = "Error: Could not generate summary";

/// Split a model reply into tweets on blank lines.
pub fn split_thread(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render the secondary-articles block of the thread prompt. `None` when there
/// are no secondary articles.
pub fn format_secondary(summaries: &[(String, String)]) -> String {
    if summaries.is_empty() {
        return "None".to_string();
    }
    summaries
        .iter()
        .enumerate()
        .map(|(i, (url, summary))| {
            format!(
                "**Article: {}**\nURL: {}\nContent: {}\n\n---\n",
                i + 1,
                url,
                summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes threads and short summaries with a model.
pub struct ThreadWriter {
    model: Arc<dyn InferenceModel>,
    template: String,
    max_article_chars: usize,
}

impl fmt::Debug for ThreadWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadWriter")
            .field("model", &self.model.name())
            .finish()
    }
}

impl ThreadWriter {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self {
            model,
            template: THREAD_TEMPLATE.to_string(),
            max_article_chars: crate::classify::DEFAULT_MAX_ARTICLE_CHARS,
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

    pub async fn summarize(&self, content: &str) -> Result<String> {
        let content = truncate_chars(content, self.max_article_chars);
        let summary = self
            .model
            .complete(&render(SUMMARY_TEMPLATE, &[("content", content)]))
            .await?;
        Ok(summary.trim().to_string())
    }

    /// Write a thread about `primary`, given the already formatted secondary
    /// block.
    pub async fn write(&self, primary: &str, secondary: &str) -> Result<Vec<String>> {
        let primary = truncate_chars(primary, self.max_article_chars);
        let prompt = render(&self.template, &[("primary", primary), ("secondary", secondary)]);
        let reply = self.model.complete(&prompt).await?;

        let tweets = split_thread(&reply);
        if tweets.is_empty() {
            return Err(Error::Inference("Model returned an empty thread".to_string()));
        }
        Ok(tweets)
    }
}
