use async_trait::async_trait;

use crate::types::DiscoveredArticle;
use crate::Result;

#[async_trait]
pub trait ArticleIndexDiscoverer: Send + Sync {
    /// Candidate articles on `index_url`, in page order. URLs are absolute and
    /// unique.
    async fn discover(&self, index_url: &str) -> Result<Vec<DiscoveredArticle>>;
}

#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    /// Reconstructed article text. Never returns an empty `Ok`.
    async fn extract(&self, url: &str) -> Result<String>;
}
