use pf_core::{
    ArticleExtractor, ArticleIndexDiscoverer, ProcessingResult, ProcessingResultStore, Result,
    UserId,
};
use pf_inference::thread::{format_secondary, ThreadWriter, SUMMARY_FAILED};
use std::sync::Arc;

use crate::config::ScanConfig;
use crate::fanout::FanOut;
use crate::logging::Logger;

/// Turns one article, plus the articles it links to, into a Twitter thread.
pub struct ThreadGenerator {
    extractor: Arc<dyn ArticleExtractor>,
    related: Arc<dyn ArticleIndexDiscoverer>,
    writer: Arc<ThreadWriter>,
    results: Arc<dyn ProcessingResultStore>,
    fanout: FanOut,
}

impl ThreadGenerator {
    pub fn new(
        extractor: Arc<dyn ArticleExtractor>,
        related: Arc<dyn ArticleIndexDiscoverer>,
        writer: ThreadWriter,
        results: Arc<dyn ProcessingResultStore>,
        config: &ScanConfig,
    ) -> Self {
        Self {
            extractor,
            related,
            writer: Arc::new(writer),
            results,
            fanout: FanOut::from_config(config),
        }
    }

    /// Generate and store a thread. Generation failures are stored as error
    /// results; only a failure to store comes back as `Err`.
    pub async fn generate(&self, url: &str, user_id: UserId) -> Result<ProcessingResult> {
        let logger = Logger::new()
            .with_prefix(format!("[user {}]", user_id))
            .with_prefix(format!("[thread {}]", url));

        let result = match self.write_thread(url, &logger).await {
            Ok(tweets) => {
                logger.info(&format!("✅ Generated {} tweets", tweets.len()));
                ProcessingResult::success(user_id, url, tweets)
            }
            Err(e) => {
                logger.error(&format!("Thread generation failed: {}", e));
                ProcessingResult::error(user_id, url, e.to_string())
            }
        };

        self.results.store_result(&result).await?;
        Ok(result)
    }

    async fn write_thread(&self, url: &str, logger: &Logger) -> Result<Vec<String>> {
        let primary = self.extractor.extract(url).await?;

        let secondary = match self.related.discover(url).await {
            Ok(found) => found,
            Err(e) => {
                logger.warn(&format!("No related articles: {}", e));
                Vec::new()
            }
        };
        logger.debug(&format!("Summarizing {} related articles", secondary.len()));

        let summaries = self
            .fanout
            .run(secondary.clone(), |article| {
                let extractor = self.extractor.clone();
                let writer = self.writer.clone();
                async move {
                    let text = extractor.extract(&article.url).await?;
                    writer.summarize(&text).await
                }
            })
            .await;

        let summaries: Vec<(String, String)> = secondary
            .into_iter()
            .zip(summaries)
            .map(|(article, summary)| {
                let summary = summary.unwrap_or_else(|e| {
                    logger.warn(&format!("Could not summarize {}: {}", article.url, e));
                    SUMMARY_FAILED.to_string()
                });
                (article.url, summary)
            })
            .collect();

        self.writer.write(&primary, &format_secondary(&summaries)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pf_core::{DiscoveredArticle, Error, InferenceModel, ThreadStatus};
    use pf_storage::InMemoryStorage;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct ThreadModel {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl InferenceModel for ThreadModel {
        fn name(&self) -> &str {
            "thread"
        }

        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if prompt.contains("Summarize") {
                Ok("A short summary.".to_string())
            } else {
                Ok("Big news today\n\nThe details\n\nFollow for more".to_string())
            }
        }
    }

    struct Pages;

    #[async_trait]
    impl ArticleExtractor for Pages {
        async fn extract(&self, url: &str) -> Result<String> {
            match url {
                "https://a.dev/broken" => Err(Error::Extraction("404".to_string())),
                "https://a.dev/missing" => Err(Error::Extraction("gone".to_string())),
                _ => Ok(format!("Text of {}", url)),
            }
        }
    }

    struct Related(Vec<DiscoveredArticle>);

    #[async_trait]
    impl ArticleIndexDiscoverer for Related {
        async fn discover(&self, _url: &str) -> Result<Vec<DiscoveredArticle>> {
            Ok(self.0.clone())
        }
    }

    fn generator(model: Arc<ThreadModel>, store: InMemoryStorage) -> ThreadGenerator {
        ThreadGenerator::new(
            Arc::new(Pages),
            Arc::new(Related(vec![
                DiscoveredArticle::new("https://a.dev/ok", "Ok"),
                DiscoveredArticle::new("https://a.dev/broken", "Broken"),
            ])),
            ThreadWriter::new(model),
            Arc::new(store),
            &ScanConfig::default(),
        )
    }

    #[tokio::test]
    async fn stores_threads_and_tolerates_failed_summaries() {
        let model = Arc::new(ThreadModel::default());
        let store = InMemoryStorage::new();
        let result = generator(model.clone(), store.clone())
            .generate("https://a.dev/main", 7)
            .await
            .unwrap();

        assert_eq!(result.status, ThreadStatus::Success);
        assert_eq!(result.tweets, vec!["Big news today", "The details", "Follow for more"]);
        assert_eq!(result.tweet_count, 3);

        let prompts = model.prompts.lock().unwrap();
        let thread_prompt = prompts.iter().find(|p| p.contains("Primary Article")).unwrap();
        assert!(thread_prompt.contains("Text of https://a.dev/main"));
        assert!(thread_prompt.contains("URL: https://a.dev/ok\nContent: A short summary."));
        assert!(thread_prompt.contains(&format!("URL: https://a.dev/broken\nContent: {}", SUMMARY_FAILED)));

        let stored = store.list_results(7, 10).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn failed_primary_extraction_is_stored_as_an_error() {
        let store = InMemoryStorage::new();
        let result = generator(Arc::new(ThreadModel::default()), store.clone())
            .generate("https://a.dev/missing", 3)
            .await
            .unwrap();

        assert_eq!(result.status, ThreadStatus::Error);
        assert!(result.error_message.unwrap().contains("gone"));
        assert_eq!(store.list_results(3, 10).await.unwrap().len(), 1);
    }
}
