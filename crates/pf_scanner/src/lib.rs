pub mod config;
pub mod fanout;
pub mod logging;
pub mod orchestrator;
pub mod scrapers;
pub mod thread;

pub use config::ScanConfig;
pub use fanout::FanOut;
pub use logging::{init_logging, Logger};
pub use orchestrator::BlogScanOrchestrator;
pub use scrapers::{
    http_client, DiscoveryMode, HtmlArticleExtractor, HtmlIndexDiscoverer, LlmArticleExtractor,
    LlmIndexDiscoverer,
};
pub use thread::ThreadGenerator;

pub mod prelude {
    pub use super::orchestrator::BlogScanOrchestrator;
    pub use super::thread::ThreadGenerator;
    pub use super::ScanConfig;
    pub use pf_core::{ClassificationOutcome, Error, OutcomeStatus, Result, ScanResult};
}
