use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// A user's interests, fed verbatim to the relevance classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub interests_description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(user_id: UserId, interests_description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            interests_description: interests_description.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True when there is something to classify against.
    pub fn is_configured(&self) -> bool {
        !self.interests_description.trim().is_empty()
    }
}

/// A candidate article found on an index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredArticle {
    pub url: String,
    pub title: String,
}

impl DiscoveredArticle {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// One persisted (user, url) classification. `fits_profile` is `None` when the
/// classification failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedArticle {
    pub user_id: UserId,
    pub url: String,
    pub title: Option<String>,
    pub source_blog: Option<String>,
    pub fits_profile: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProcessedArticle {
    pub fn from_outcome(
        user_id: UserId,
        source_blog: Option<&str>,
        outcome: &ClassificationOutcome,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            url: outcome.url.clone(),
            title: outcome.title.clone(),
            source_blog: source_blog.map(str::to_string),
            fits_profile: outcome.fits_profile,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Error,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fits_profile: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ClassificationOutcome {
    pub fn success(url: impl Into<String>, title: impl Into<String>, fits_profile: bool) -> Self {
        Self {
            url: url.into(),
            title: Some(title.into()),
            status: OutcomeStatus::Success,
            fits_profile: Some(fits_profile),
            error_message: None,
        }
    }

    pub fn error(
        url: impl Into<String>,
        title: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: Some(title.into()),
            status: OutcomeStatus::Error,
            fits_profile: None,
            error_message: Some(error_message.into()),
        }
    }

    pub fn skipped(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            status: OutcomeStatus::Skipped,
            fits_profile: None,
            error_message: None,
        }
    }

    /// Whether this outcome becomes a new row at the end of a scan.
    pub fn is_new(&self) -> bool {
        self.status != OutcomeStatus::Skipped
    }
}

/// Ordered per-URL outcomes of one scan, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanResult {
    pub outcomes: Vec<ClassificationOutcome>,
}

impl ScanResult {
    pub fn new(outcomes: Vec<ClassificationOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn fitting(&self) -> impl Iterator<Item = &ClassificationOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.fits_profile == Some(true))
    }

    pub fn into_outcomes(self) -> Vec<ClassificationOutcome> {
        self.outcomes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    Success,
    Error,
}

impl ThreadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadStatus::Success => "success",
            ThreadStatus::Error => "error",
        }
    }
}

impl std::str::FromStr for ThreadStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "success" => Ok(ThreadStatus::Success),
            "error" => Ok(ThreadStatus::Error),
            other => Err(crate::Error::Storage(format!("Unknown thread status: {}", other))),
        }
    }
}

/// A stored thread-generation attempt for one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub user_id: UserId,
    pub url: String,
    pub status: ThreadStatus,
    pub tweets: Vec<String>,
    pub tweet_count: usize,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProcessingResult {
    pub fn success(user_id: UserId, url: impl Into<String>, tweets: Vec<String>) -> Self {
        Self {
            user_id,
            url: url.into(),
            status: ThreadStatus::Success,
            tweet_count: tweets.len(),
            tweets,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    pub fn error(user_id: UserId, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id,
            url: url.into(),
            status: ThreadStatus::Error,
            tweets: Vec::new(),
            tweet_count: 0,
            error_message: Some(message.into()),
            created_at: Utc::now(),
        }
    }
}
