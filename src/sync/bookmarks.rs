//! Bookmark reconciliation across the online/offline boundary.
//!
//! Server-held bookmarks are authoritative. Bookmarks created while offline
//! live in the local store under a synthesized id and are merged into reads;
//! once the server holds a bookmark for the same (namespace, content id)
//! the local row is suppressed at read time. It is not retired from the
//! store, matching the original behavior: it lingers until toggled off.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::api::{ApiError, RemoteProvider};
use crate::content::{Bookmark, ContentType, NewBookmark};
use crate::store::OfflineStore;

/// What a toggle did to the merged membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
  Added,
  Removed,
}

/// Presents a unified bookmark view and mediates toggles.
pub struct BookmarkReconciler<R> {
  remote: R,
  store: Arc<OfflineStore>,
  user_id: String,
}

impl<R: RemoteProvider> BookmarkReconciler<R> {
  pub fn new(remote: R, store: Arc<OfflineStore>, user_id: impl Into<String>) -> Self {
    Self {
      remote,
      store,
      user_id: user_id.into(),
    }
  }

  /// The merged bookmark view: server bookmarks plus local ones whose
  /// triple the server does not already hold. Never contains two entries
  /// for the same (namespace, content id). Recomputed per call, not cached.
  pub async fn merged(&self) -> Vec<Bookmark> {
    let (server, local) = self.fetch_parts().await;
    merge(server, local)
  }

  /// Toggle membership for a triple: create if absent, delete if present.
  ///
  /// Transport failures are downgraded to local-store fallbacks — the
  /// toggle always takes effect from the caller's point of view. The only
  /// error that escapes is a rejected creation payload.
  pub async fn toggle(
    &self,
    content_type: ContentType,
    content_id: i64,
  ) -> Result<ToggleOutcome, ApiError> {
    let (server, local) = self.fetch_parts().await;
    let on_server = server
      .iter()
      .any(|b| b.triple() == (content_type, content_id));
    let on_local = local
      .iter()
      .any(|b| b.triple() == (content_type, content_id));

    if on_server {
      match self
        .remote
        .delete_bookmark(content_type, content_id, &self.user_id)
        .await
      {
        Ok(_) => {}
        Err(err) => {
          warn!(%err, content_type = %content_type, content_id, "server delete failed");
        }
      }
      // A stale local duplicate may exist from an earlier offline session;
      // toggling off is the one moment it gets cleaned up.
      self.remove_local(content_type, content_id);
      Ok(ToggleOutcome::Removed)
    } else if on_local {
      // The record never reached the server, so no network call is made.
      self.remove_local(content_type, content_id);
      Ok(ToggleOutcome::Removed)
    } else {
      let payload = NewBookmark {
        content_type,
        content_id,
        user_id: self.user_id.clone(),
      };
      match self.remote.create_bookmark(&payload).await {
        Ok(_) => Ok(ToggleOutcome::Added),
        Err(err) if err.is_recoverable() => {
          debug!(%err, content_type = %content_type, content_id, "creating bookmark locally");
          let bookmark = Bookmark {
            // Synthesized id, monotonic enough for a single local user
            id: Utc::now().timestamp_millis(),
            content_type,
            content_id,
            user_id: self.user_id.clone(),
            created_at: Some(Utc::now()),
          };
          if let Err(err) = self.store.add_local_bookmark(&bookmark) {
            warn!(%err, "failed to store local bookmark");
          }
          Ok(ToggleOutcome::Added)
        }
        Err(err) => Err(err),
      }
    }
  }

  async fn fetch_parts(&self) -> (Vec<Bookmark>, Vec<Bookmark>) {
    let server = match self.remote.bookmarks(&self.user_id).await {
      Ok(bookmarks) => bookmarks,
      Err(err) => {
        debug!(%err, "server bookmarks unavailable");
        Vec::new()
      }
    };
    let local = self.store.local_bookmarks(&self.user_id).unwrap_or_else(|err| {
      warn!(%err, "offline store unavailable, treating local bookmarks as empty");
      Vec::new()
    });
    (server, local)
  }

  fn remove_local(&self, content_type: ContentType, content_id: i64) {
    if let Err(err) = self
      .store
      .remove_local_bookmark(content_type, content_id, &self.user_id)
    {
      warn!(%err, content_type = %content_type, content_id, "failed to remove local bookmark");
    }
  }
}

/// Union with read-time de-duplication: local entries whose triple already
/// exists among server entries are excluded.
fn merge(server: Vec<Bookmark>, local: Vec<Bookmark>) -> Vec<Bookmark> {
  let seen: HashSet<(ContentType, i64)> = server.iter().map(Bookmark::triple).collect();
  let mut merged = server;
  merged.extend(local.into_iter().filter(|b| !seen.contains(&b.triple())));
  merged
}
