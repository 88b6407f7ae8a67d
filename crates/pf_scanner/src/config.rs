use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_UNIT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; pfit/0.1)";

/// Knobs shared by scans and thread generation.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Units allowed in flight at once. Values below 1 are treated as 1.
    pub concurrency: usize,
    /// Budget for one unit once it holds a permit.
    pub unit_timeout: Duration,
    /// Article text passed to the model is cut to this many characters.
    pub max_article_chars: usize,
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            unit_timeout: DEFAULT_UNIT_TIMEOUT,
            max_article_chars: pf_inference::classify::DEFAULT_MAX_ARTICLE_CHARS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
