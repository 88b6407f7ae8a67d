use pf_core::{ProcessedArticleStore, ProcessingResultStore, ProfileStore};
use pf_scanner::{BlogScanOrchestrator, ThreadGenerator};
use std::sync::Arc;

pub struct AppState {
    pub orchestrator: Arc<BlogScanOrchestrator>,
    pub threads: Arc<ThreadGenerator>,
    pub articles: Arc<dyn ProcessedArticleStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub results: Arc<dyn ProcessingResultStore>,
}
