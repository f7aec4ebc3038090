use async_trait::async_trait;
use gist_core::{ArticleStorage, RecordingStorage, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub mod backends;
pub mod cache;

pub use backends::*;
pub use cache::{ArtifactCache, CACHE_TTL_SECS};

#[async_trait]
pub trait StorageBackend: ArticleStorage + RecordingStorage + Sized + 'static {
    fn get_error_message() -> &'static str;
    async fn open(path: &Path) -> Result<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StorageKind {
    Memory,
    #[default]
    Sqlite,
}

/// Both stores, backed by the same backend instance
#[derive(Clone)]
pub struct Storage {
    pub articles: Arc<dyn ArticleStorage>,
    pub recordings: Arc<dyn RecordingStorage>,
}

impl Storage {
    pub fn from_backend<T: StorageBackend>(backend: T) -> Self {
        let backend = Arc::new(backend);
        Self {
            articles: backend.clone(),
            recordings: backend,
        }
    }
}

async fn open_backend<T: StorageBackend>(path: &Path) -> Result<Storage> {
    match T::open(path).await {
        Ok(backend) => Ok(Storage::from_backend(backend)),
        Err(e) => {
            tracing::error!("{}", T::get_error_message());
            Err(e)
        }
    }
}

pub async fn create_storage(kind: StorageKind, path: &Path) -> Result<Storage> {
    let storage = match kind {
        StorageKind::Memory => open_backend::<MemoryStorage>(path).await?,
        #[cfg(feature = "sqlite")]
        StorageKind::Sqlite => open_backend::<SQLiteStorage>(path).await?,
        #[cfg(not(feature = "sqlite"))]
        StorageKind::Sqlite => {
            return Err(gist_core::Error::Config(
                "gist_storage was built without the sqlite feature".to_string(),
            ))
        }
    };
    info!("💾 Storage ready ({:?})", kind);
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, ArtifactCache, Storage, StorageKind};
}
