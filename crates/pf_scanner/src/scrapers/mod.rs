use pf_core::{DiscoveredArticle, Error, Result};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::collections::HashSet;
use url::Url;

use crate::config::ScanConfig;

pub mod extract;
pub mod index;

pub use extract::{HtmlArticleExtractor, LlmArticleExtractor};
pub use index::{DiscoveryMode, HtmlIndexDiscoverer, LlmIndexDiscoverer};

/// A resolved anchor on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub text: String,
}

pub fn http_client(config: &ScanConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(config.fetch_timeout)
        .user_agent(config.user_agent.clone())
        .build()?)
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use super::*;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    pub fn selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| Error::Extraction(format!("Invalid selector {}: {:?}", css, e)))
    }

    pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String> {
        let response = client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    pub fn element_text(el: ElementRef<'_>) -> String {
        el.text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Same page, ignoring the fragment and a trailing slash.
    pub fn same_page(a: &Url, b: &Url) -> bool {
        let strip = |u: &Url| {
            let mut u = u.clone();
            u.set_fragment(None);
            u.as_str().trim_end_matches('/').to_string()
        };
        strip(a) == strip(b)
    }

    /// Resolve `href` against `base`, keeping only http(s) targets.
    pub fn resolve(base: &Url, href: &str) -> Option<Url> {
        let mut url = base.join(href.trim()).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        url.set_fragment(None);
        Some(url)
    }

    /// Anchors matching `css`, resolved against `base`, deduplicated in page
    /// order. Links back to `base` itself are dropped.
    pub fn collect_links(html: &str, base: &Url, css: &str) -> Result<Vec<Link>> {
        let document = Html::parse_document(html);
        let anchors = selector(css)?;
        let mut seen = HashSet::new();

        Ok(document
            .select(&anchors)
            .filter_map(|el| {
                let url = resolve(base, el.value().attr("href")?)?;
                if same_page(&url, base) || !seen.insert(url.to_string()) {
                    return None;
                }
                Some(Link {
                    url: url.to_string(),
                    text: element_text(el),
                })
            })
            .collect())
    }

    /// Headings, paragraphs and list items of a page, in page order. Headings
    /// keep a markdown marker for their level.
    pub fn text_blocks(html: &str) -> Result<Vec<String>> {
        let document = Html::parse_document(html);
        let blocks = selector("h1, h2, h3, h4, p, li, blockquote, pre")?;

        Ok(document
            .select(&blocks)
            .filter_map(|el| {
                let text = element_text(el);
                if text.is_empty() {
                    return None;
                }
                Some(match el.value().name() {
                    "h1" => format!("# {}", text),
                    "h2" => format!("## {}", text),
                    "h3" | "h4" => format!("### {}", text),
                    "li" => format!("- {}", text),
                    _ => text,
                })
            })
            .collect())
    }

    #[derive(Debug, Deserialize)]
    struct LinkEntry {
        url: String,
        #[serde(default)]
        title: Option<String>,
    }

    /// Parse a model reply holding a JSON array of `{url, title}`. Anything
    /// around the outermost brackets, such as a code fence, is ignored.
    pub fn parse_link_list(reply: &str, base: &Url) -> Result<Vec<DiscoveredArticle>> {
        let (start, end) = match (reply.find('['), reply.rfind(']')) {
            (Some(start), Some(end)) if start < end => (start, end),
            _ => {
                return Err(Error::Inference(
                    "Model reply did not contain a JSON array".to_string(),
                ))
            }
        };
        let entries: Vec<LinkEntry> = serde_json::from_str(&reply[start..=end])?;

        let mut seen = HashSet::new();
        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                let url = resolve(base, &entry.url)?;
                if same_page(&url, base) || !seen.insert(url.to_string()) {
                    return None;
                }
                let title = entry.title.map(|t| t.trim().to_string()).unwrap_or_default();
                Some(DiscoveredArticle::new(url.to_string(), title))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::utils;
    use super::*;

    fn base() -> Url {
        Url::parse("https://blog.example.com/").unwrap()
    }

    #[test]
    fn test_parse_url() {
        assert!(utils::parse_url("https://example.com").is_ok());
        assert!(matches!(
            utils::parse_url("invalid-url"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn collects_resolved_unique_links() {
        let html = r##"
            <nav><a href="/">Home</a></nav>
            <article>
              <a href="/posts/one">  First
                 post </a>
              <a href="https://blog.example.com/posts/one#comments">First again</a>
              <a href="mailto:me@example.com">Mail</a>
              <a href="posts/two">Second</a>
            </article>
        "##;
        let links = utils::collect_links(html, &base(), "a[href]").unwrap();
        assert_eq!(
            links,
            vec![
                Link {
                    url: "https://blog.example.com/posts/one".to_string(),
                    text: "First post".to_string(),
                },
                Link {
                    url: "https://blog.example.com/posts/two".to_string(),
                    text: "Second".to_string(),
                },
            ]
        );
    }

    #[test]
    fn reduces_pages_to_text_blocks() {
        let html = r#"
            <h1>Title</h1>
            <p>First paragraph.</p>
            <p>   </p>
            <ul><li>point</li></ul>
        "#;
        let blocks = utils::text_blocks(html).unwrap();
        assert_eq!(blocks, vec!["# Title", "First paragraph.", "- point"]);
    }

    #[test]
    fn parses_fenced_link_lists() {
        let reply = "```json\n[{\"url\": \"/a\", \"title\": \" A \"}, {\"url\": \"https://blog.example.com/a\"}, {\"url\": \"ftp://x/y\"}, {\"url\": \"/b\"}]\n```";
        let found = utils::parse_link_list(reply, &base()).unwrap();
        assert_eq!(
            found,
            vec![
                DiscoveredArticle::new("https://blog.example.com/a", "A"),
                DiscoveredArticle::new("https://blog.example.com/b", ""),
            ]
        );
    }

    #[test]
    fn rejects_replies_without_arrays() {
        assert!(matches!(
            utils::parse_link_list("I could not find any", &base()),
            Err(Error::Inference(_))
        ));
    }
}
