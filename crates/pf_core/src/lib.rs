pub mod error;
pub mod models;
pub mod sources;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use models::{InferenceModel, RelevanceClassifier};
pub use sources::{ArticleExtractor, ArticleIndexDiscoverer};
pub use storage::{
    ProcessedArticleStore, ProcessingResultStore, ProfileStore, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use types::{
    ClassificationOutcome, DiscoveredArticle, OutcomeStatus, ProcessedArticle, ProcessingResult,
    Profile, ScanResult, ThreadStatus, UserId,
};
