//! Domain types shared across the API, the offline store and the sync layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User id used for all bookmark operations. There is no account system;
/// the server partitions bookmarks by this implicit single user.
pub const DEFAULT_USER: &str = "default";

/// The four content namespaces. A content id is only unique within its
/// namespace, never globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
  Qa,
  Prayers,
  Documents,
  Bible,
}

impl ContentType {
  pub const ALL: [ContentType; 4] = [
    ContentType::Qa,
    ContentType::Prayers,
    ContentType::Documents,
    ContentType::Bible,
  ];

  /// Wire name, matching both the API paths and the store partitions.
  pub fn as_str(&self) -> &'static str {
    match self {
      ContentType::Qa => "qa",
      ContentType::Prayers => "prayers",
      ContentType::Documents => "documents",
      ContentType::Bible => "bible",
    }
  }
}

impl fmt::Display for ContentType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ContentType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "qa" => Ok(ContentType::Qa),
      "prayers" => Ok(ContentType::Prayers),
      "documents" => Ok(ContentType::Documents),
      "bible" => Ok(ContentType::Bible),
      other => Err(format!(
        "unknown content type '{}' (expected qa, prayers, documents or bible)",
        other
      )),
    }
  }
}

/// UI languages the API can serve content in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  #[default]
  English,
  Cebuano,
  Tagalog,
}

impl Language {
  pub fn as_str(&self) -> &'static str {
    match self {
      Language::English => "english",
      Language::Cebuano => "cebuano",
      Language::Tagalog => "tagalog",
    }
  }
}

impl fmt::Display for Language {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Language {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "english" => Ok(Language::English),
      "cebuano" => Ok(Language::Cebuano),
      "tagalog" => Ok(Language::Tagalog),
      other => Err(format!(
        "unknown language '{}' (expected english, cebuano or tagalog)",
        other
      )),
    }
  }
}

/// A question and answer pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaQuestion {
  pub id: i64,
  pub question: String,
  pub answer: String,
  #[serde(default)]
  pub full_answer: Option<String>,
  #[serde(default)]
  pub category: Option<String>,
  pub language: String,
  #[serde(default)]
  pub subject_overview: Option<String>,
  #[serde(default)]
  pub etymology: Option<String>,
  #[serde(default)]
  pub church_documents: Option<String>,
  #[serde(default)]
  pub scripture_support: Option<String>,
  #[serde(default)]
  pub early_church_fathers: Option<String>,
  #[serde(default)]
  pub summary_points: Option<String>,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}

/// A prayer, optionally with its Latin text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prayer {
  pub id: i64,
  pub title: String,
  pub content: String,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub latin: Option<String>,
  pub language: String,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}

/// A church document (encyclical, catechism section, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
  pub id: i64,
  pub title: String,
  pub content: String,
  #[serde(rename = "type")]
  pub doc_type: String,
  #[serde(default)]
  pub author: Option<String>,
  #[serde(default)]
  pub article_count: Option<i64>,
  pub language: String,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}

/// A single Bible verse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibleVerse {
  pub id: i64,
  pub book: String,
  pub chapter: i64,
  pub verse: i64,
  pub content: String,
  pub testament: String,
  pub language: String,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}

/// A content record of any namespace. The tag only appears in locally
/// stored snapshots; the API returns bare per-namespace arrays where the
/// endpoint determines the variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentRecord {
  Qa(QaQuestion),
  Prayer(Prayer),
  Document(DocumentRecord),
  Verse(BibleVerse),
}

impl ContentRecord {
  pub fn id(&self) -> i64 {
    match self {
      ContentRecord::Qa(q) => q.id,
      ContentRecord::Prayer(p) => p.id,
      ContentRecord::Document(d) => d.id,
      ContentRecord::Verse(v) => v.id,
    }
  }

  pub fn content_type(&self) -> ContentType {
    match self {
      ContentRecord::Qa(_) => ContentType::Qa,
      ContentRecord::Prayer(_) => ContentType::Prayers,
      ContentRecord::Document(_) => ContentType::Documents,
      ContentRecord::Verse(_) => ContentType::Bible,
    }
  }

  /// The fields considered by substring search, per variant.
  pub fn search_text(&self) -> Vec<&str> {
    match self {
      ContentRecord::Qa(q) => vec![&q.question, &q.answer],
      ContentRecord::Prayer(p) => vec![&p.title, &p.content],
      ContentRecord::Document(d) => vec![&d.title, &d.content],
      ContentRecord::Verse(v) => vec![&v.book, &v.content],
    }
  }

  /// Case-insensitive substring match against the searchable fields.
  /// `needle` must already be lowercased.
  pub fn matches(&self, needle: &str) -> bool {
    self
      .search_text()
      .iter()
      .any(|field| field.to_lowercase().contains(needle))
  }

  /// One-line summary for list output.
  pub fn summary(&self) -> String {
    match self {
      ContentRecord::Qa(q) => format!("#{} {}", q.id, q.question),
      ContentRecord::Prayer(p) => format!("#{} {}", p.id, p.title),
      ContentRecord::Document(d) => format!("#{} {} ({})", d.id, d.title, d.doc_type),
      ContentRecord::Verse(v) => format!("#{} {} {}:{}", v.id, v.book, v.chapter, v.verse),
    }
  }
}

/// A saved bookmark. `id` is server-assigned, or synthesized from the
/// current time when created offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
  pub id: i64,
  pub content_type: ContentType,
  pub content_id: i64,
  pub user_id: String,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}

impl Bookmark {
  /// The (namespace, content id) pair that identifies a bookmark logically,
  /// regardless of which side assigned its record id.
  pub fn triple(&self) -> (ContentType, i64) {
    (self.content_type, self.content_id)
  }
}

/// Creation payload for a bookmark.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookmark {
  pub content_type: ContentType,
  pub content_id: i64,
  pub user_id: String,
}

/// Combined result of a search across all namespaces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
  pub qa: Vec<QaQuestion>,
  pub prayers: Vec<Prayer>,
  pub documents: Vec<DocumentRecord>,
  pub bible: Vec<BibleVerse>,
  pub total: usize,
}
