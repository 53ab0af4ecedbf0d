//! The `vlogbook analyze` command.

use anyhow::Result;

use vlogbook_core::model::{SelectionAnalysis, SelectionKind};
use vlogbook_core::traits::EntryStore;
use vlogbook_providers::{create_generator, with_retry};

use super::App;

pub async fn execute(app: &App, id: &str, selection: &str, kind: SelectionKind) -> Result<()> {
    let selection = selection.trim();
    if selection.is_empty() {
        anyhow::bail!("selection must not be empty");
    }
    let mut entry = app.entry(id).await?;
    if !entry.target_text.contains(selection) {
        tracing::warn!(selection, "selection does not appear in the script");
    }

    let generator = create_generator(&app.config)?;
    let policy = app.config.retry_policy();
    let analysis = with_retry(&policy, "analyze", || {
        generator.analyze_selection(selection, &entry.target_text, kind)
    })
    .await?;

    match &analysis {
        SelectionAnalysis::Vocabulary(item) => {
            println!("Added vocabulary: {} — {}", item.term, item.meaning);
            if !item.context.is_empty() {
                println!("    {}", item.context);
            }
        }
        SelectionAnalysis::Grammar(item) => {
            println!("Added grammar: {}", item.point);
            println!("    {}", item.explanation);
        }
    }

    entry.attach(analysis);
    app.store.put(&entry).await?;
    Ok(())
}
