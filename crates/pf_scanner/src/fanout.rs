//! Scatter-gather over a bounded number of tokio tasks.
//!
//! Every unit is spawned immediately but waits for a semaphore permit before it
//! starts. The per-unit timeout starts once the permit is held, so queueing
//! never eats into a unit's budget. Results come back in submission order and a
//! failing, hanging or panicking unit only affects its own slot.

use futures::future::join_all;
use pf_core::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::config::ScanConfig;

#[derive(Debug, Clone)]
pub struct FanOut {
    semaphore: Arc<Semaphore>,
    unit_timeout: Duration,
}

impl FanOut {
    pub fn new(limit: usize, unit_timeout: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(limit.max(1))),
            unit_timeout,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.concurrency, config.unit_timeout)
    }

    pub fn unit_timeout(&self) -> Duration {
        self.unit_timeout
    }

    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, work: F) -> Vec<Result<R>>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R>> + Send + 'static,
        R: Send + 'static,
    {
        let handles: Vec<_> = items
            .into_iter()
            .map(|item| {
                let semaphore = self.semaphore.clone();
                let unit_timeout = self.unit_timeout;
                let unit = work(item);
                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| Error::External(e.into()))?;
                    match timeout(unit_timeout, unit).await {
                        Ok(result) => result,
                        Err(_) => Err(Error::Timeout(unit_timeout)),
                    }
                })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap_or_else(|e| Err(Error::External(e.into()))))
            .collect()
    }
}
