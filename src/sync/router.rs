//! Remote-first query resolution with offline fallback.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::RemoteProvider;
use crate::content::{ContentRecord, ContentType, Language, SearchResults};
use crate::store::OfflineStore;

/// Resolves content requests, preferring live data and falling back to the
/// offline snapshots when the remote is unreachable.
///
/// Infallible from the caller's side: transport and storage failures are
/// routine in an offline-first design, so they are logged and degraded to
/// "whatever the cache has" rather than surfaced. An empty result is a valid
/// terminal outcome at every stage, never a fallback trigger.
pub struct QueryRouter<R> {
  remote: R,
  store: Arc<OfflineStore>,
  language: Language,
}

impl<R: RemoteProvider> QueryRouter<R> {
  pub fn new(remote: R, store: Arc<OfflineStore>, language: Language) -> Self {
    Self {
      remote,
      store,
      language,
    }
  }

  /// Resolve a namespace listing or search.
  pub async fn resolve(&self, content_type: ContentType, term: Option<&str>) -> Vec<ContentRecord> {
    let term = term.map(str::trim).filter(|t| !t.is_empty());

    let attempt = match term {
      Some(t) => self.remote.search(content_type, t, self.language).await,
      None => self.remote.list(content_type, self.language).await,
    };

    match attempt {
      Ok(records) => records,
      Err(err) => {
        debug!(content_type = %content_type, %err, "remote unavailable, serving from cache");
        self.resolve_local(content_type, term)
      }
    }
  }

  /// Resolve a single record by id. A genuine not-found from the server is
  /// terminal; only transport failures trigger the cache scan.
  pub async fn resolve_one(&self, content_type: ContentType, id: i64) -> Option<ContentRecord> {
    match self.remote.get_one(content_type, id).await {
      Ok(record) => record,
      Err(err) => {
        debug!(content_type = %content_type, id, %err, "remote unavailable, scanning cache");
        self
          .snapshot(content_type)
          .into_iter()
          .find(|r| r.id() == id)
      }
    }
  }

  /// Search every namespace. Remote-first; when the combined endpoint is
  /// unreachable the result is reassembled from the local snapshots.
  pub async fn global_search(&self, term: &str) -> SearchResults {
    match self.remote.global_search(term).await {
      Ok(results) => results,
      Err(err) => {
        debug!(%err, "remote unavailable, searching cache");
        let mut results = SearchResults::default();
        for ct in ContentType::ALL {
          for record in self.resolve_local(ct, Some(term)) {
            match record {
              ContentRecord::Qa(q) => results.qa.push(q),
              ContentRecord::Prayer(p) => results.prayers.push(p),
              ContentRecord::Document(d) => results.documents.push(d),
              ContentRecord::Verse(v) => results.bible.push(v),
            }
          }
        }
        results.total =
          results.qa.len() + results.prayers.len() + results.documents.len() + results.bible.len();
        results
      }
    }
  }

  fn resolve_local(&self, content_type: ContentType, term: Option<&str>) -> Vec<ContentRecord> {
    let snapshot = self.snapshot(content_type);
    match term {
      Some(t) => {
        let needle = t.to_lowercase();
        snapshot.into_iter().filter(|r| r.matches(&needle)).collect()
      }
      None => snapshot,
    }
  }

  fn snapshot(&self, content_type: ContentType) -> Vec<ContentRecord> {
    self
      .store
      .get_snapshot(content_type)
      .unwrap_or_else(|err| {
        warn!(content_type = %content_type, %err, "offline store unavailable");
        Vec::new()
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sync::testutil::{prayer, qa, temp_store, verse, FakeRemote};

  fn router(remote: &FakeRemote, store: &Arc<OfflineStore>) -> QueryRouter<FakeRemote> {
    QueryRouter::new(remote.clone(), Arc::clone(store), Language::English)
  }

  #[tokio::test]
  async fn online_results_come_from_the_remote() {
    let (_dir, store) = temp_store();
    let remote = FakeRemote::default();
    remote.insert_records(ContentType::Qa, vec![qa(1, "Why pray?", "Because.")]);

    let results = router(&remote, &store).resolve(ContentType::Qa, None).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id(), 1);
  }

  #[tokio::test]
  async fn empty_remote_success_is_terminal() {
    let (_dir, store) = temp_store();
    // Cache holds data, but the remote answering with nothing wins.
    store.put_snapshot(ContentType::Qa, &[qa(1, "Why?", "Because.")]).unwrap();
    let remote = FakeRemote::default();

    let results = router(&remote, &store).resolve(ContentType::Qa, None).await;
    assert!(results.is_empty());
  }

  #[tokio::test]
  async fn offline_list_serves_the_cached_snapshot() {
    // Scenario A: prime from the remote, lose connectivity, keep serving.
    let (_dir, store) = temp_store();
    let record = verse(1, "John", "For God so loved...");
    store.put_snapshot(ContentType::Bible, &[record]).unwrap();

    let remote = FakeRemote::default();
    remote.set_online(false);

    let results = router(&remote, &store).resolve(ContentType::Bible, Some("")).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id(), 1);
  }

  #[tokio::test]
  async fn offline_search_filters_case_insensitively() {
    let (_dir, store) = temp_store();
    store
      .put_snapshot(
        ContentType::Prayers,
        &[
          prayer(1, "Ave Maria", "Hail Mary, full of grace"),
          prayer(2, "Pater Noster", "Our Father"),
        ],
      )
      .unwrap();

    let remote = FakeRemote::default();
    remote.set_online(false);
    let router = router(&remote, &store);

    let results = router.resolve(ContentType::Prayers, Some("MARIA")).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id(), 1);

    // Matching in the content field, not just the title
    let results = router.resolve(ContentType::Prayers, Some("father")).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id(), 2);

    let results = router.resolve(ContentType::Prayers, Some("rosary")).await;
    assert!(results.is_empty());
  }

  #[tokio::test]
  async fn offline_with_no_snapshot_resolves_to_empty() {
    let (_dir, store) = temp_store();
    let remote = FakeRemote::default();
    remote.set_online(false);

    let results = router(&remote, &store).resolve(ContentType::Documents, None).await;
    assert!(results.is_empty());
  }

  #[tokio::test]
  async fn resolve_one_falls_back_to_the_cache() {
    let (_dir, store) = temp_store();
    store
      .put_snapshot(ContentType::Bible, &[verse(7, "Mark", "The beginning")])
      .unwrap();

    let remote = FakeRemote::default();
    remote.set_online(false);
    let router = router(&remote, &store);

    let record = router.resolve_one(ContentType::Bible, 7).await;
    assert_eq!(record.unwrap().id(), 7);

    assert!(router.resolve_one(ContentType::Bible, 99).await.is_none());
  }

  #[tokio::test]
  async fn remote_not_found_is_not_a_fallback_trigger() {
    let (_dir, store) = temp_store();
    // The cache has id 7 but the server is authoritative while reachable.
    store
      .put_snapshot(ContentType::Bible, &[verse(7, "Mark", "The beginning")])
      .unwrap();
    let remote = FakeRemote::default();

    assert!(router(&remote, &store).resolve_one(ContentType::Bible, 7).await.is_none());
  }

  #[tokio::test]
  async fn offline_global_search_reassembles_from_snapshots() {
    let (_dir, store) = temp_store();
    store
      .put_snapshot(ContentType::Qa, &[qa(1, "What is grace?", "A gift.")])
      .unwrap();
    store
      .put_snapshot(ContentType::Prayers, &[prayer(2, "Ave Maria", "full of grace")])
      .unwrap();

    let remote = FakeRemote::default();
    remote.set_online(false);

    let results = router(&remote, &store).global_search("grace").await;
    assert_eq!(results.qa.len(), 1);
    assert_eq!(results.prayers.len(), 1);
    assert!(results.documents.is_empty());
    assert_eq!(results.total, 2);
  }
}
