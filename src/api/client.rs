//! HTTP client for the content API.

use color_eyre::Result;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::content::{
  BibleVerse, Bookmark, ContentRecord, ContentType, DocumentRecord, Language, NewBookmark, Prayer,
  QaQuestion, SearchResults,
};

use super::{ApiError, RemoteProvider};

/// Error body the server sends with non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
  message: String,
}

/// Client for the content API.
#[derive(Clone)]
pub struct ApiClient {
  client: reqwest::Client,
  base: Url,
}

impl ApiClient {
  pub fn new(base_url: &str) -> Result<Self> {
    use color_eyre::eyre::eyre;

    let base = Url::parse(base_url).map_err(|e| eyre!("Invalid API url {}: {}", base_url, e))?;
    Ok(Self {
      client: reqwest::Client::new(),
      base,
    })
  }

  /// Build a url from path segments, percent-encoding each segment.
  fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|_| ApiError::Status {
        status: StatusCode::BAD_REQUEST,
        url: self.base.to_string(),
      })?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
    let response = self.client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(ApiError::Status {
        status,
        url: url.to_string(),
      });
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
  }

  async fn list_namespace<T, F>(
    &self,
    content_type: ContentType,
    term: Option<&str>,
    language: Language,
    wrap: F,
  ) -> Result<Vec<ContentRecord>, ApiError>
  where
    T: DeserializeOwned,
    F: Fn(T) -> ContentRecord,
  {
    let mut url = match term {
      Some(t) => self.endpoint(&["api", content_type.as_str(), "search", t])?,
      None => self.endpoint(&["api", content_type.as_str()])?,
    };
    url
      .query_pairs_mut()
      .append_pair("lang", language.as_str());

    let records: Vec<T> = self.get_json(url).await?;
    Ok(records.into_iter().map(wrap).collect())
  }

  async fn fetch_records(
    &self,
    content_type: ContentType,
    term: Option<&str>,
    language: Language,
  ) -> Result<Vec<ContentRecord>, ApiError> {
    match content_type {
      ContentType::Qa => {
        self
          .list_namespace::<QaQuestion, _>(content_type, term, language, ContentRecord::Qa)
          .await
      }
      ContentType::Prayers => {
        self
          .list_namespace::<Prayer, _>(content_type, term, language, ContentRecord::Prayer)
          .await
      }
      ContentType::Documents => {
        self
          .list_namespace::<DocumentRecord, _>(content_type, term, language, ContentRecord::Document)
          .await
      }
      ContentType::Bible => {
        self
          .list_namespace::<BibleVerse, _>(content_type, term, language, ContentRecord::Verse)
          .await
      }
    }
  }
}

impl RemoteProvider for ApiClient {
  async fn list(
    &self,
    content_type: ContentType,
    language: Language,
  ) -> Result<Vec<ContentRecord>, ApiError> {
    self.fetch_records(content_type, None, language).await
  }

  async fn search(
    &self,
    content_type: ContentType,
    term: &str,
    language: Language,
  ) -> Result<Vec<ContentRecord>, ApiError> {
    self.fetch_records(content_type, Some(term), language).await
  }

  async fn get_one(
    &self,
    content_type: ContentType,
    id: i64,
  ) -> Result<Option<ContentRecord>, ApiError> {
    let url = self.endpoint(&["api", content_type.as_str(), &id.to_string()])?;

    let response = self.client.get(url.clone()).send().await?;
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !status.is_success() {
      return Err(ApiError::Status {
        status,
        url: url.to_string(),
      });
    }
    let body = response.text().await?;

    let record = match content_type {
      ContentType::Qa => ContentRecord::Qa(serde_json::from_str(&body)?),
      ContentType::Prayers => ContentRecord::Prayer(serde_json::from_str(&body)?),
      ContentType::Documents => ContentRecord::Document(serde_json::from_str(&body)?),
      ContentType::Bible => ContentRecord::Verse(serde_json::from_str(&body)?),
    };
    Ok(Some(record))
  }

  async fn bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>, ApiError> {
    let mut url = self.endpoint(&["api", "bookmarks"])?;
    url.query_pairs_mut().append_pair("userId", user_id);
    self.get_json(url).await
  }

  async fn create_bookmark(&self, bookmark: &NewBookmark) -> Result<Bookmark, ApiError> {
    let url = self.endpoint(&["api", "bookmarks"])?;

    let response = self.client.post(url.clone()).json(bookmark).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if status == StatusCode::BAD_REQUEST {
      let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or_else(|_| "invalid bookmark data".to_string());
      return Err(ApiError::InvalidPayload(message));
    }
    if !status.is_success() {
      return Err(ApiError::Status {
        status,
        url: url.to_string(),
      });
    }
    Ok(serde_json::from_str(&body)?)
  }

  async fn delete_bookmark(
    &self,
    content_type: ContentType,
    content_id: i64,
    user_id: &str,
  ) -> Result<bool, ApiError> {
    let mut url = self.endpoint(&[
      "api",
      "bookmarks",
      content_type.as_str(),
      &content_id.to_string(),
    ])?;
    url.query_pairs_mut().append_pair("userId", user_id);

    let response = self.client.delete(url.clone()).send().await?;
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
      return Ok(false);
    }
    if !status.is_success() {
      return Err(ApiError::Status {
        status,
        url: url.to_string(),
      });
    }
    Ok(true)
  }

  async fn global_search(&self, term: &str) -> Result<SearchResults, ApiError> {
    let url = self.endpoint(&["api", "search", term])?;
    self.get_json(url).await
  }
}
