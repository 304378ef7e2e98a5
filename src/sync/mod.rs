//! Offline-first sync layer: cache priming, remote-first query resolution
//! with local fallback, and bookmark reconciliation across the
//! online/offline boundary.

mod bookmarks;
mod loader;
mod router;

pub use bookmarks::{BookmarkReconciler, ToggleOutcome};
pub use loader::CacheLoader;
pub use router::QueryRouter;

#[cfg(test)]
pub(crate) mod testutil {
  use std::collections::{HashMap, HashSet};
  use std::sync::{Arc, Mutex};

  use reqwest::StatusCode;

  use crate::api::{ApiError, RemoteProvider};
  use crate::content::{
    BibleVerse, Bookmark, ContentRecord, ContentType, DocumentRecord, Language, NewBookmark,
    Prayer, QaQuestion, SearchResults,
  };

  /// In-memory remote provider for sync-layer tests. Can be taken offline
  /// wholesale or made to fail for individual namespaces.
  #[derive(Clone, Default)]
  pub struct FakeRemote {
    state: Arc<Mutex<FakeState>>,
  }

  struct FakeState {
    records: HashMap<ContentType, Vec<ContentRecord>>,
    bookmarks: Vec<Bookmark>,
    failing: HashSet<ContentType>,
    online: bool,
    next_id: i64,
  }

  impl Default for FakeState {
    fn default() -> Self {
      Self {
        records: HashMap::new(),
        bookmarks: Vec::new(),
        failing: HashSet::new(),
        online: true,
        next_id: 1,
      }
    }
  }

  fn unreachable_err() -> ApiError {
    ApiError::Status {
      status: StatusCode::BAD_GATEWAY,
      url: "fake://remote".to_string(),
    }
  }

  impl FakeRemote {
    pub fn set_online(&self, online: bool) {
      self.state.lock().unwrap().online = online;
    }

    pub fn fail_namespace(&self, content_type: ContentType) {
      self.state.lock().unwrap().failing.insert(content_type);
    }

    pub fn insert_records(&self, content_type: ContentType, records: Vec<ContentRecord>) {
      self.state.lock().unwrap().records.insert(content_type, records);
    }

    pub fn insert_bookmark(&self, bookmark: Bookmark) {
      self.state.lock().unwrap().bookmarks.push(bookmark);
    }

    pub fn server_bookmarks(&self) -> Vec<Bookmark> {
      self.state.lock().unwrap().bookmarks.clone()
    }

    fn check(&self, content_type: Option<ContentType>) -> Result<(), ApiError> {
      let state = self.state.lock().unwrap();
      if !state.online {
        return Err(unreachable_err());
      }
      if let Some(ct) = content_type {
        if state.failing.contains(&ct) {
          return Err(unreachable_err());
        }
      }
      Ok(())
    }

    fn records_of(&self, content_type: ContentType) -> Vec<ContentRecord> {
      self
        .state
        .lock()
        .unwrap()
        .records
        .get(&content_type)
        .cloned()
        .unwrap_or_default()
    }
  }

  impl RemoteProvider for FakeRemote {
    async fn list(
      &self,
      content_type: ContentType,
      _language: Language,
    ) -> Result<Vec<ContentRecord>, ApiError> {
      self.check(Some(content_type))?;
      Ok(self.records_of(content_type))
    }

    async fn search(
      &self,
      content_type: ContentType,
      term: &str,
      _language: Language,
    ) -> Result<Vec<ContentRecord>, ApiError> {
      self.check(Some(content_type))?;
      let needle = term.to_lowercase();
      Ok(
        self
          .records_of(content_type)
          .into_iter()
          .filter(|r| r.matches(&needle))
          .collect(),
      )
    }

    async fn get_one(
      &self,
      content_type: ContentType,
      id: i64,
    ) -> Result<Option<ContentRecord>, ApiError> {
      self.check(Some(content_type))?;
      Ok(self.records_of(content_type).into_iter().find(|r| r.id() == id))
    }

    async fn bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>, ApiError> {
      self.check(None)?;
      Ok(
        self
          .state
          .lock()
          .unwrap()
          .bookmarks
          .iter()
          .filter(|b| b.user_id == user_id)
          .cloned()
          .collect(),
      )
    }

    async fn create_bookmark(&self, bookmark: &NewBookmark) -> Result<Bookmark, ApiError> {
      self.check(None)?;
      if bookmark.user_id.is_empty() {
        return Err(ApiError::InvalidPayload("userId must not be empty".to_string()));
      }
      let mut state = self.state.lock().unwrap();
      let created = Bookmark {
        id: state.next_id,
        content_type: bookmark.content_type,
        content_id: bookmark.content_id,
        user_id: bookmark.user_id.clone(),
        created_at: Some(chrono::Utc::now()),
      };
      state.next_id += 1;
      state.bookmarks.push(created.clone());
      Ok(created)
    }

    async fn delete_bookmark(
      &self,
      content_type: ContentType,
      content_id: i64,
      user_id: &str,
    ) -> Result<bool, ApiError> {
      self.check(None)?;
      let mut state = self.state.lock().unwrap();
      let before = state.bookmarks.len();
      state.bookmarks.retain(|b| {
        !(b.content_type == content_type && b.content_id == content_id && b.user_id == user_id)
      });
      Ok(state.bookmarks.len() < before)
    }

    async fn global_search(&self, term: &str) -> Result<SearchResults, ApiError> {
      self.check(None)?;
      let needle = term.to_lowercase();
      let mut results = SearchResults::default();
      for ct in ContentType::ALL {
        for record in self.records_of(ct) {
          if !record.matches(&needle) {
            continue;
          }
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
      Ok(results)
    }
  }

  // Record builders shared by the sync tests.

  pub fn qa(id: i64, question: &str, answer: &str) -> ContentRecord {
    ContentRecord::Qa(QaQuestion {
      id,
      question: question.to_string(),
      answer: answer.to_string(),
      full_answer: None,
      category: None,
      language: "english".to_string(),
      subject_overview: None,
      etymology: None,
      church_documents: None,
      scripture_support: None,
      early_church_fathers: None,
      summary_points: None,
      created_at: None,
    })
  }

  pub fn prayer(id: i64, title: &str, content: &str) -> ContentRecord {
    ContentRecord::Prayer(Prayer {
      id,
      title: title.to_string(),
      content: content.to_string(),
      category: None,
      latin: None,
      language: "english".to_string(),
      created_at: None,
    })
  }

  pub fn document(id: i64, title: &str, content: &str) -> ContentRecord {
    ContentRecord::Document(DocumentRecord {
      id,
      title: title.to_string(),
      content: content.to_string(),
      doc_type: "encyclical".to_string(),
      author: None,
      article_count: None,
      language: "english".to_string(),
      created_at: None,
    })
  }

  pub fn verse(id: i64, book: &str, content: &str) -> ContentRecord {
    ContentRecord::Verse(BibleVerse {
      id,
      book: book.to_string(),
      chapter: 3,
      verse: 16,
      content: content.to_string(),
      testament: "new".to_string(),
      language: "english".to_string(),
      created_at: None,
    })
  }

  pub fn temp_store() -> (tempfile::TempDir, std::sync::Arc<crate::store::OfflineStore>) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = crate::store::OfflineStore::open_at(&dir.path().join("cache.db")).unwrap();
    (dir, std::sync::Arc::new(store))
  }
}
