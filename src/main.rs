mod api;
mod commands;
mod config;
mod content;
mod store;
mod sync;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use content::{ContentType, Language};

#[derive(Parser, Debug)]
#[command(name = "catechist")]
#[command(about = "Offline-first browser for Q&A, prayers, church documents and Bible verses")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/catechist/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// API base url, overriding the config file
  #[arg(long)]
  url: Option<String>,

  /// Content language (english, cebuano, tagalog)
  #[arg(long)]
  lang: Option<Language>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Refresh the offline cache from the API
  Refresh,
  /// List content of one type, optionally filtered by a search term
  List {
    content_type: ContentType,
    #[arg(short, long)]
    search: Option<String>,
  },
  /// Show a single record in full
  Show { content_type: ContentType, id: i64 },
  /// Search all content types at once
  Search { term: String },
  /// List all bookmarks (server and locally created)
  Bookmarks,
  /// Toggle a bookmark on or off
  Bookmark { content_type: ContentType, id: i64 },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = init_tracing();

  // Load configuration; --url alone is enough to run without a config file
  let config = match (args.url, config::Config::load(args.config.as_deref())) {
    (Some(url), Ok(config)) => config::Config {
      api: config::ApiConfig { url },
      ..config
    },
    (Some(url), Err(_)) => config::Config::with_url(url),
    (None, result) => result?,
  };
  let config = match args.lang {
    Some(language) => config::Config { language, ..config },
    None => config,
  };

  match args.command {
    Command::Refresh => commands::refresh(&config).await,
    Command::List {
      content_type,
      search,
    } => commands::list(&config, content_type, search).await,
    Command::Show { content_type, id } => commands::show(&config, content_type, id).await,
    Command::Search { term } => commands::search(&config, &term).await,
    Command::Bookmarks => commands::bookmarks(&config).await,
    Command::Bookmark { content_type, id } => {
      commands::toggle_bookmark(&config, content_type, id).await
    }
  }
}

/// Log to a file under the data directory so command output stays clean.
/// Logging is best-effort; a missing data dir just means no logs.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let dir = dirs::data_dir()?.join("catechist");
  std::fs::create_dir_all(&dir).ok()?;

  let appender = tracing_appender::rolling::never(dir, "catechist.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Some(guard)
}
