//! Subcommand implementations and the state they share.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use vlogbook_core::model::Entry;
use vlogbook_core::traits::EntryStore;
use vlogbook_providers::config::{load_config_from, VlogbookConfig};
use vlogbook_store::JsonFileStore;

pub mod analyze;
pub mod create;
pub mod delete;
pub mod init;
pub mod list;
pub mod modify;
pub mod quiz;
pub mod show;
pub mod speak;

/// Loaded configuration plus the entry store it points at.
pub struct App {
    pub config: VlogbookConfig,
    pub store: JsonFileStore,
}

impl App {
    pub fn load(config_path: Option<&Path>, store_path: Option<PathBuf>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let store_path = store_path.unwrap_or_else(|| config.store_path.clone());
        tracing::debug!(store = %store_path.display(), backend = ?config.backend, "starting");
        Ok(Self {
            store: JsonFileStore::new(store_path),
            config,
        })
    }

    /// Fetch an entry or fail with a readable message.
    pub async fn entry(&self, id: &str) -> Result<Entry> {
        self.store
            .get_by_id(id)
            .await?
            .with_context(|| format!("no entry with id {id}"))
    }
}

/// Print an entry's script followed by its vocabulary and grammar cards.
pub fn print_entry(entry: &Entry) {
    println!("ID: {}", entry.id);
    println!("Created: {}", format_timestamp(entry.created_at));
    println!("\n{}", entry.source_text.trim());
    println!("\n{}", entry.target_text.trim());

    if !entry.vocabulary.is_empty() {
        println!("\nVocabulary:");
        for item in &entry.vocabulary {
            println!("  {} — {}", item.term, item.meaning);
            if !item.context.is_empty() {
                println!("      {}", item.context);
            }
        }
    }

    if !entry.grammar.is_empty() {
        println!("\nGrammar:");
        for item in &entry.grammar {
            println!("  {}", item.point);
            println!("      {}", item.explanation);
            if !item.example.is_empty() {
                println!("      e.g. {}", item.example);
            }
        }
    }
}

/// Local date and time for a millisecond Unix timestamp.
pub fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|utc| {
            utc.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| millis.to_string())
}
