use pf_core::{
    ArticleExtractor, ArticleIndexDiscoverer, ClassificationOutcome, DiscoveredArticle, Error,
    ProcessedArticle, ProcessedArticleStore, ProfileStore, RelevanceClassifier, Result,
    ScanResult, UserId,
};
use pf_inference::FitDecisionRule;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::ScanConfig;
use crate::fanout::FanOut;
use crate::logging::Logger;

/// Scans one blog index for one user: discover, skip what the user has already
/// seen, classify the rest concurrently and persist every new outcome in one
/// batch.
pub struct BlogScanOrchestrator {
    discoverer: Arc<dyn ArticleIndexDiscoverer>,
    extractor: Arc<dyn ArticleExtractor>,
    classifier: Arc<dyn RelevanceClassifier>,
    articles: Arc<dyn ProcessedArticleStore>,
    profiles: Arc<dyn ProfileStore>,
    fit_rule: Arc<FitDecisionRule>,
    fanout: FanOut,
}

impl BlogScanOrchestrator {
    pub fn new(
        discoverer: Arc<dyn ArticleIndexDiscoverer>,
        extractor: Arc<dyn ArticleExtractor>,
        classifier: Arc<dyn RelevanceClassifier>,
        articles: Arc<dyn ProcessedArticleStore>,
        profiles: Arc<dyn ProfileStore>,
        config: &ScanConfig,
    ) -> Self {
        Self {
            discoverer,
            extractor,
            classifier,
            articles,
            profiles,
            fit_rule: Arc::new(FitDecisionRule::default()),
            fanout: FanOut::from_config(config),
        }
    }

    pub fn with_fit_rule(mut self, fit_rule: FitDecisionRule) -> Self {
        self.fit_rule = Arc::new(fit_rule);
        self
    }

    pub async fn scan(&self, blog_url: &str, user_id: UserId) -> Result<ScanResult> {
        let logger = Logger::new()
            .with_prefix(format!("[user {}]", user_id))
            .with_prefix(format!("[blog {}]", blog_url));

        let interests = self.interests(user_id).await?;

        let discovered = self
            .discoverer
            .discover(blog_url)
            .await
            .map_err(|e| Error::discovery(blog_url, e))?;
        let mut seen = HashSet::new();
        let discovered: Vec<DiscoveredArticle> = discovered
            .into_iter()
            .filter(|article| seen.insert(article.url.clone()))
            .collect();
        logger.info(&format!("📰 Discovered {} articles", discovered.len()));

        let mut slots: Vec<Option<ClassificationOutcome>> = Vec::with_capacity(discovered.len());
        let mut pending = Vec::new();
        for (slot, article) in discovered.into_iter().enumerate() {
            if self.articles.exists(user_id, &article.url).await? {
                logger.debug(&format!("Already processed: {}", article.url));
                slots.push(Some(ClassificationOutcome::skipped(article.url)));
            } else {
                slots.push(None);
                pending.push((slot, article));
            }
        }

        if pending.is_empty() {
            logger.info("✨ Nothing new");
            return Ok(ScanResult::new(slots.into_iter().flatten().collect()));
        }

        logger.info(&format!("🤖 Classifying {} new articles", pending.len()));
        let (positions, articles): (Vec<usize>, Vec<DiscoveredArticle>) = pending.into_iter().unzip();
        let titles: Vec<(String, String)> = articles
            .iter()
            .map(|a| (a.url.clone(), a.title.clone()))
            .collect();

        let results = self
            .fanout
            .run(articles, |article| {
                let extractor = self.extractor.clone();
                let classifier = self.classifier.clone();
                let fit_rule = self.fit_rule.clone();
                let interests = interests.clone();
                async move {
                    let text = extractor.extract(&article.url).await?;
                    let verdict = classifier.classify(&interests, &text).await?;
                    Ok(fit_rule.decide(&verdict))
                }
            })
            .await;

        for ((slot, (url, title)), result) in positions.into_iter().zip(titles).zip(results) {
            let outcome = match result {
                Ok(fits) => ClassificationOutcome::success(url, title, fits),
                Err(e) => {
                    logger.warn(&format!("Failed to classify {}: {}", url, e));
                    ClassificationOutcome::error(url, title, e.to_string())
                }
            };
            slots[slot] = Some(outcome);
        }

        let outcomes: Vec<ClassificationOutcome> = slots.into_iter().flatten().collect();
        let records: Vec<ProcessedArticle> = outcomes
            .iter()
            .filter(|o| o.is_new())
            .map(|o| ProcessedArticle::from_outcome(user_id, Some(blog_url), o))
            .collect();

        if let Err(e) = self.articles.insert_batch(&records).await {
            logger.error(&format!("Failed to persist {} outcomes: {}", records.len(), e));
            return Err(Error::Persistence {
                message: e.to_string(),
                outcomes,
            });
        }

        let result = ScanResult::new(outcomes);
        logger.info(&format!(
            "💾 Stored {} articles, {} fit the profile",
            records.len(),
            result.fitting().count()
        ));
        Ok(result)
    }

    async fn interests(&self, user_id: UserId) -> Result<Arc<str>> {
        match self.profiles.get_profile(user_id).await? {
            Some(profile) if profile.is_configured() => {
                Ok(Arc::from(profile.interests_description))
            }
            _ => Err(Error::Configuration(format!(
                "User {} has no interests description",
                user_id
            ))),
        }
    }
}
