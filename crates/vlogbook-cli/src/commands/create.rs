//! The `vlogbook create` command.

use std::io::Read;

use anyhow::{Context, Result};

use vlogbook_core::model::Entry;
use vlogbook_core::traits::EntryStore;
use vlogbook_providers::{create_generator, with_retry};

use super::{print_entry, App};

pub async fn execute(app: &App, text: Option<String>) -> Result<()> {
    let source = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read source text from stdin")?;
            buf
        }
    };
    let source = source.trim();
    if source.is_empty() {
        anyhow::bail!("no source text given; pass --text or pipe it on stdin");
    }

    let generator = create_generator(&app.config)?;
    let policy = app.config.retry_policy();
    let content = with_retry(&policy, "generate", || generator.generate(source)).await?;

    let entry = Entry::new(source, content);
    app.store.put(&entry).await?;
    tracing::info!(id = %entry.id, words = entry.vocabulary.len(), "saved entry");

    print_entry(&entry);
    Ok(())
}
