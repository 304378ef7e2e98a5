//! Command handlers wiring the API client and the offline store into the
//! sync components.

use color_eyre::Result;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::Config;
use crate::content::{ContentRecord, ContentType, SearchResults};
use crate::store::OfflineStore;
use crate::sync::{BookmarkReconciler, CacheLoader, QueryRouter, ToggleOutcome};

fn setup(config: &Config) -> Result<(ApiClient, Arc<OfflineStore>)> {
  let api = ApiClient::new(&config.api.url)?;
  let store = Arc::new(OfflineStore::open()?);
  Ok((api, store))
}

/// `refresh` — prime the offline cache for every namespace.
pub async fn refresh(config: &Config) -> Result<()> {
  let (api, store) = setup(config)?;
  CacheLoader::new(api, store, config.language).prime().await?;
  println!("Offline cache refreshed");
  Ok(())
}

/// `list` — list or search one namespace, offline-tolerant.
pub async fn list(config: &Config, content_type: ContentType, term: Option<String>) -> Result<()> {
  let (api, store) = setup(config)?;
  let router = QueryRouter::new(api, store, config.language);

  let records = router.resolve(content_type, term.as_deref()).await;
  if records.is_empty() {
    println!("No {} entries found", content_type);
    return Ok(());
  }
  for record in &records {
    println!("{}", record.summary());
  }
  Ok(())
}

/// `show` — print one record in full.
pub async fn show(config: &Config, content_type: ContentType, id: i64) -> Result<()> {
  let (api, store) = setup(config)?;
  let router = QueryRouter::new(api, store, config.language);

  match router.resolve_one(content_type, id).await {
    Some(record) => print_record(&record),
    None => println!("No {} record with id {}", content_type, id),
  }
  Ok(())
}

/// `search` — combined search across all namespaces.
pub async fn search(config: &Config, term: &str) -> Result<()> {
  let (api, store) = setup(config)?;
  let router = QueryRouter::new(api, store, config.language);

  let results = router.global_search(term).await;
  print_search_results(&results);
  Ok(())
}

/// `bookmarks` — the merged server + local bookmark view.
pub async fn bookmarks(config: &Config) -> Result<()> {
  let (api, store) = setup(config)?;
  let reconciler = BookmarkReconciler::new(api, store, config.user.clone());

  let bookmarks = reconciler.merged().await;
  if bookmarks.is_empty() {
    println!("No bookmarks");
    return Ok(());
  }
  for bookmark in &bookmarks {
    println!("{} #{}", bookmark.content_type, bookmark.content_id);
  }
  Ok(())
}

/// `bookmark` — toggle a bookmark on or off.
pub async fn toggle_bookmark(config: &Config, content_type: ContentType, id: i64) -> Result<()> {
  let (api, store) = setup(config)?;
  let reconciler = BookmarkReconciler::new(api, store, config.user.clone());

  // The only error the reconciler lets through is a rejected payload;
  // transport failures have already been downgraded to local state.
  match reconciler.toggle(content_type, id).await? {
    ToggleOutcome::Added => println!("Bookmarked {} #{}", content_type, id),
    ToggleOutcome::Removed => println!("Removed bookmark {} #{}", content_type, id),
  }
  Ok(())
}

fn print_record(record: &ContentRecord) {
  match record {
    ContentRecord::Qa(q) => {
      println!("Q: {}", q.question);
      println!("A: {}", q.answer);
      if let Some(full) = &q.full_answer {
        println!("\n{}", full);
      }
      if let Some(scripture) = &q.scripture_support {
        println!("\nScripture: {}", scripture);
      }
    }
    ContentRecord::Prayer(p) => {
      println!("{}\n", p.title);
      println!("{}", p.content);
      if let Some(latin) = &p.latin {
        println!("\nLatin:\n{}", latin);
      }
    }
    ContentRecord::Document(d) => {
      println!("{} ({})", d.title, d.doc_type);
      if let Some(author) = &d.author {
        println!("by {}", author);
      }
      println!("\n{}", d.content);
    }
    ContentRecord::Verse(v) => {
      println!("{} {}:{}", v.book, v.chapter, v.verse);
      println!("{}", v.content);
    }
  }
}

fn print_search_results(results: &SearchResults) {
  if results.total == 0 {
    println!("No results");
    return;
  }
  for q in &results.qa {
    println!("qa        #{} {}", q.id, q.question);
  }
  for p in &results.prayers {
    println!("prayers   #{} {}", p.id, p.title);
  }
  for d in &results.documents {
    println!("documents #{} {}", d.id, d.title);
  }
  for v in &results.bible {
    println!("bible     #{} {} {}:{}", v.id, v.book, v.chapter, v.verse);
  }
  println!("\n{} result(s)", results.total);
}
