use async_trait::async_trait;
use pf_core::{ArticleIndexDiscoverer, DiscoveredArticle, InferenceModel, Result};
use pf_inference::prompts::{render, truncate_chars, INDEX_TEMPLATE, RELATED_LINKS_TEMPLATE};
use std::sync::Arc;
use url::Url;

use super::utils::{collect_links, fetch_html, parse_url, same_page};
use super::Link;

/// Related-link discovery never returns more than this many articles.
pub const MAX_RELATED_LINKS: usize = 5;

/// Link listings sent to the model are cut to this many characters.
const MAX_LISTING_CHARS: usize = 40_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    /// Every article listed on a blog index or news homepage.
    IndexPage,
    /// Articles that the main content of one article links to.
    RelatedLinks { limit: usize },
}

/// Lets a model pick the article links out of all anchors on a page.
pub struct LlmIndexDiscoverer {
    client: reqwest::Client,
    model: Arc<dyn InferenceModel>,
    mode: DiscoveryMode,
}

impl LlmIndexDiscoverer {
    pub fn index_page(client: reqwest::Client, model: Arc<dyn InferenceModel>) -> Self {
        Self {
            client,
            model,
            mode: DiscoveryMode::IndexPage,
        }
    }

    pub fn related_links(client: reqwest::Client, model: Arc<dyn InferenceModel>) -> Self {
        Self {
            client,
            model,
            mode: DiscoveryMode::RelatedLinks {
                limit: MAX_RELATED_LINKS,
            },
        }
    }

    pub fn mode(&self) -> DiscoveryMode {
        self.mode
    }

    fn prompt(&self, page_url: &str, links: &[Link]) -> String {
        let listing = links
            .iter()
            .map(|link| format!("- [{}]({})", link.text, link.url))
            .collect::<Vec<_>>()
            .join("\n");
        let listing = truncate_chars(&listing, MAX_LISTING_CHARS);

        match self.mode {
            DiscoveryMode::IndexPage => {
                render(INDEX_TEMPLATE, &[("url", page_url), ("links", listing)])
            }
            DiscoveryMode::RelatedLinks { limit } => render(
                RELATED_LINKS_TEMPLATE,
                &[
                    ("limit", limit.to_string().as_str()),
                    ("url", page_url),
                    ("links", listing),
                ],
            ),
        }
    }
}

#[async_trait]
impl ArticleIndexDiscoverer for LlmIndexDiscoverer {
    async fn discover(&self, index_url: &str) -> Result<Vec<DiscoveredArticle>> {
        let base = parse_url(index_url)?;
        let html = fetch_html(&self.client, index_url).await?;
        let links = collect_links(&html, &base, "a[href]")?;
        if links.is_empty() {
            tracing::warn!(url = index_url, "page has no links");
            return Ok(Vec::new());
        }

        let reply = self.model.complete(&self.prompt(index_url, &links)).await?;
        let mut found = super::utils::parse_link_list(&reply, &base)?;
        if let DiscoveryMode::RelatedLinks { limit } = self.mode {
            found.truncate(limit);
        }

        tracing::debug!(url = index_url, links = links.len(), found = found.len(), "discovered articles");
        Ok(found)
    }
}

/// Model-free discovery: anchors inside article bodies, main content and
/// headings that stay on the index page's host.
pub struct HtmlIndexDiscoverer {
    client: reqwest::Client,
}

const ARTICLE_ANCHORS: &str = "article a[href], main a[href], h1 a[href], h2 a[href], h3 a[href]";

impl HtmlIndexDiscoverer {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn pick(html: &str, base: &Url) -> Result<Vec<DiscoveredArticle>> {
        Ok(collect_links(html, base, ARTICLE_ANCHORS)?
            .into_iter()
            .filter(|link| {
                Url::parse(&link.url)
                    .map(|url| {
                        url.host_str() == base.host_str()
                            && url.path() != "/"
                            && !same_page(&url, base)
                            && !link.text.is_empty()
                    })
                    .unwrap_or(false)
            })
            .map(|link| DiscoveredArticle::new(link.url, link.text))
            .collect())
    }
}

#[async_trait]
impl ArticleIndexDiscoverer for HtmlIndexDiscoverer {
    async fn discover(&self, index_url: &str) -> Result<Vec<DiscoveredArticle>> {
        let base = parse_url(index_url)?;
        let html = fetch_html(&self.client, index_url).await?;
        Self::pick(&html, &base)
    }
}
