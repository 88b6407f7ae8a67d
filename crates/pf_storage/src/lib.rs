use async_trait::async_trait;
use pf_core::{Error, ProcessedArticleStore, ProcessingResultStore, ProfileStore, Result};
use std::sync::Arc;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;

    /// Open the backend at its default location.
    async fn open_default() -> Result<Self>
    where
        Self: Sized;
}

/// One backend viewed through each of the store traits.
#[derive(Clone)]
pub struct Stores {
    pub articles: Arc<dyn ProcessedArticleStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub results: Arc<dyn ProcessingResultStore>,
}

impl Stores {
    pub fn from_backend<T>(backend: T) -> Self
    where
        T: ProcessedArticleStore + ProfileStore + ProcessingResultStore + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            articles: backend.clone(),
            profiles: backend.clone(),
            results: backend,
        }
    }
}

async fn open<T>() -> Result<Stores>
where
    T: StorageBackend + ProcessedArticleStore + ProfileStore + ProcessingResultStore + 'static,
{
    let storage_type = std::any::type_name::<T>()
        .rsplit("::")
        .next()
        .unwrap_or("unknown");
    let backend = T::open_default().await.map_err(|e| {
        Error::Storage(format!("{} ({}): {}", T::get_error_message(), storage_type, e))
    })?;
    tracing::debug!(storage_type, "opened default storage backend");
    Ok(Stores::from_backend(backend))
}

/// Build stores from a backend name (`memory` or `sqlite`). `location` is the
/// database file for `sqlite`; memory storage has none.
pub async fn create_storage(kind: &str, location: Option<&str>) -> Result<Stores> {
    match kind {
        "memory" => open::<InMemoryStorage>().await,
        #[cfg(feature = "sqlite")]
        "sqlite" => match location {
            Some(path) => {
                let storage = SQLiteStorage::new_with_path(std::path::Path::new(path)).await?;
                Ok(Stores::from_backend(storage))
            }
            None => open::<SQLiteStorage>().await,
        },
        other => Err(Error::Configuration(format!(
            "Unknown storage backend: {}",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend, Stores};
}
