#[cfg(feature = "gist-store")]
pub mod gist;
pub mod memory;

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{info, warn};

use crate::dao::{
    models::LeagueDocument,
    storage::{StorageError, StorageResult},
};

/// League document together with the version token it was read at.
#[derive(Debug, Clone)]
pub struct VersionedDocument {
    pub document: LeagueDocument,
    /// Opaque version token, when the backend exposes one.
    pub version: Option<String>,
}

/// Abstraction over the external store holding the League Document.
///
/// Writes always replace the whole document. When `expected_version` is set
/// the backend refuses the write with [`StorageError::Conflict`] if the stored
/// document moved in the meantime.
pub trait LeagueStore: Send + Sync {
    /// Read the current document, `None` when the store holds no league yet.
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<VersionedDocument>>>;
    /// Replace the stored document, returning the new version token.
    fn save(
        &self,
        document: LeagueDocument,
        expected_version: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Option<String>>>;
    /// Cheap reachability probe.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Storage backend selected at startup.
#[derive(Clone)]
pub enum StoreBackend {
    #[cfg(feature = "gist-store")]
    Gist(gist::GistConfig),
    Memory(Arc<memory::MemoryLeagueStore>),
}

impl StoreBackend {
    /// Pick the gist backend when its environment is configured, the
    /// in-memory backend otherwise.
    pub fn from_env() -> Self {
        #[cfg(feature = "gist-store")]
        match gist::GistConfig::from_env() {
            Ok(config) => {
                info!(
                    gist_id = %config.gist_id,
                    file = %config.file_name,
                    "using gist league store"
                );
                return StoreBackend::Gist(config);
            }
            Err(err) => warn!(error = %err, "gist store not configured"),
        }

        warn!("using in-memory league store; data will not survive a restart");
        StoreBackend::Memory(Arc::new(memory::MemoryLeagueStore::new()))
    }

    /// Build a store handle for the selected backend.
    pub async fn connect(self) -> Result<Arc<dyn LeagueStore>, StorageError> {
        match self {
            #[cfg(feature = "gist-store")]
            StoreBackend::Gist(config) => {
                let store = gist::GistLeagueStore::connect(config).await?;
                Ok(Arc::new(store))
            }
            StoreBackend::Memory(store) => Ok(store),
        }
    }
}
