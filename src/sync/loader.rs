//! Best-effort priming of the offline cache.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::{ApiError, RemoteProvider};
use crate::content::{ContentRecord, ContentType, Language};
use crate::store::{OfflineStore, StoreError};

/// Refreshes the offline snapshots from the remote API.
///
/// One fetch per namespace, concurrently; a failed fetch is logged and its
/// namespace's previous snapshot is left untouched, so a single unreachable
/// endpoint never blocks or clobbers the others. Invoked at startup and on
/// reconnect; no retries, no backoff.
pub struct CacheLoader<R> {
  remote: R,
  store: Arc<OfflineStore>,
  language: Language,
}

impl<R: RemoteProvider> CacheLoader<R> {
  pub fn new(remote: R, store: Arc<OfflineStore>, language: Language) -> Self {
    Self {
      remote,
      store,
      language,
    }
  }

  /// Fetch all four namespaces and write each successful result to the
  /// store. Fails only if a snapshot write fails; fetch failures are
  /// isolated per namespace.
  pub async fn prime(&self) -> Result<(), StoreError> {
    let (qa, prayers, documents, bible) = futures::join!(
      self.remote.list(ContentType::Qa, self.language),
      self.remote.list(ContentType::Prayers, self.language),
      self.remote.list(ContentType::Documents, self.language),
      self.remote.list(ContentType::Bible, self.language),
    );

    self.write(ContentType::Qa, qa)?;
    self.write(ContentType::Prayers, prayers)?;
    self.write(ContentType::Documents, documents)?;
    self.write(ContentType::Bible, bible)?;

    Ok(())
  }

  fn write(
    &self,
    content_type: ContentType,
    fetched: Result<Vec<ContentRecord>, ApiError>,
  ) -> Result<(), StoreError> {
    match fetched {
      Ok(records) => {
        debug!(content_type = %content_type, count = records.len(), "caching snapshot");
        self.store.put_snapshot(content_type, &records)
      }
      Err(err) => {
        warn!(content_type = %content_type, %err, "fetch failed, keeping previous snapshot");
        Ok(())
      }
    }
  }
}
