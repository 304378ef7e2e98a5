//! Remote data provider boundary.
//!
//! The sync layer never talks HTTP directly; it goes through the
//! [`RemoteProvider`] trait so the try-remote-then-fallback branch is an
//! explicit match on a `Result` rather than exception-style control flow,
//! and so tests can substitute an in-memory provider.

pub mod client;

pub use client::ApiClient;

use thiserror::Error;

use crate::content::{Bookmark, ContentRecord, ContentType, Language, NewBookmark, SearchResults};

/// Errors from the remote provider.
///
/// Everything except `InvalidPayload` is a transport-class failure: the
/// caller is expected to fall back to the offline store rather than surface
/// it. `InvalidPayload` is the one error a user should see.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("server returned {status} for {url}")]
  Status {
    status: reqwest::StatusCode,
    url: String,
  },

  #[error("failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("invalid bookmark payload: {0}")]
  InvalidPayload(String),
}

impl ApiError {
  /// Whether falling back to the offline store is appropriate.
  pub fn is_recoverable(&self) -> bool {
    !matches!(self, ApiError::InvalidPayload(_))
  }
}

/// Read and bookmark operations the remote API offers, one method per
/// endpoint.
#[allow(async_fn_in_trait)]
pub trait RemoteProvider {
  /// List every record of a namespace.
  async fn list(
    &self,
    content_type: ContentType,
    language: Language,
  ) -> Result<Vec<ContentRecord>, ApiError>;

  /// Server-side substring search within a namespace.
  async fn search(
    &self,
    content_type: ContentType,
    term: &str,
    language: Language,
  ) -> Result<Vec<ContentRecord>, ApiError>;

  /// Fetch a single record. `Ok(None)` means the server answered and the
  /// record does not exist; that is not a fallback trigger.
  async fn get_one(
    &self,
    content_type: ContentType,
    id: i64,
  ) -> Result<Option<ContentRecord>, ApiError>;

  /// All server-held bookmarks for a user.
  async fn bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>, ApiError>;

  /// Create a bookmark; returns the server-assigned record.
  async fn create_bookmark(&self, bookmark: &NewBookmark) -> Result<Bookmark, ApiError>;

  /// Delete a bookmark by triple. `Ok(false)` when the server had no such
  /// bookmark.
  async fn delete_bookmark(
    &self,
    content_type: ContentType,
    content_id: i64,
    user_id: &str,
  ) -> Result<bool, ApiError>;

  /// Search every namespace at once.
  async fn global_search(&self, term: &str) -> Result<SearchResults, ApiError>;
}
