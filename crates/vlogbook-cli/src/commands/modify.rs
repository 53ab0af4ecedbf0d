//! The `vlogbook modify` command.

use anyhow::Result;

use vlogbook_core::traits::EntryStore;
use vlogbook_providers::{create_generator, with_retry};

use super::{print_entry, App};

pub async fn execute(app: &App, id: &str, instruction: &str) -> Result<()> {
    if instruction.trim().is_empty() {
        anyhow::bail!("instruction must not be empty");
    }
    let mut entry = app.entry(id).await?;

    let generator = create_generator(&app.config)?;
    let policy = app.config.retry_policy();
    let content = with_retry(&policy, "rewrite", || {
        generator.rewrite(&entry.target_text, instruction)
    })
    .await?;

    entry.apply_rewrite(content);
    app.store.put(&entry).await?;
    tracing::info!(id = %entry.id, "rewrote entry");

    print_entry(&entry);
    Ok(())
}
