use async_trait::async_trait;
use pf_core::{ArticleExtractor, Error, InferenceModel, Result};
use pf_inference::prompts::{render, truncate_chars, EXTRACTION_TEMPLATE};
use std::sync::Arc;

use super::utils::{fetch_html, parse_url, text_blocks};

async fn page_text(client: &reqwest::Client, url: &str) -> Result<String> {
    parse_url(url)?;
    let html = fetch_html(client, url)
        .await
        .map_err(|e| Error::Extraction(format!("Failed to fetch {}: {}", url, e)))?;
    let blocks = text_blocks(&html)?;
    if blocks.is_empty() {
        return Err(Error::Extraction(format!("No text found at {}", url)));
    }
    Ok(blocks.join("\n\n"))
}

/// Returns the page's text blocks as they are.
pub struct HtmlArticleExtractor {
    client: reqwest::Client,
}

impl HtmlArticleExtractor {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArticleExtractor for HtmlArticleExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        page_text(&self.client, url).await
    }
}

/// Has a model rebuild the article from the page's text blocks, dropping
/// navigation, ads and comments.
pub struct LlmArticleExtractor {
    client: reqwest::Client,
    model: Arc<dyn InferenceModel>,
    max_chars: usize,
}

impl LlmArticleExtractor {
    pub fn new(client: reqwest::Client, model: Arc<dyn InferenceModel>, max_chars: usize) -> Self {
        Self {
            client,
            model,
            max_chars: max_chars.max(1),
        }
    }
}

#[async_trait]
impl ArticleExtractor for LlmArticleExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        let content = page_text(&self.client, url).await?;
        let prompt = render(
            EXTRACTION_TEMPLATE,
            &[("url", url), ("content", truncate_chars(&content, self.max_chars))],
        );

        let article = self
            .model
            .complete(&prompt)
            .await
            .map_err(|e| Error::Extraction(format!("{}: {}", url, e)))?;
        let article = article.trim();
        if article.is_empty() {
            return Err(Error::Extraction(format!("Model returned no text for {}", url)));
        }
        Ok(article.to_string())
    }
}
