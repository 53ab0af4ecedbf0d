//! The `vlogbook list` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use vlogbook_core::traits::EntryStore;

use super::{format_timestamp, App};

const PREVIEW_CHARS: usize = 30;

pub async fn execute(app: &App) -> Result<()> {
    let entries = app.store.get_all().await?;
    if entries.is_empty() {
        println!("No entries yet. Run `vlogbook create` to add one.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Created", "Words", "Grammar", "Note"]);

    for entry in entries.iter().rev() {
        table.add_row(vec![
            Cell::new(&entry.id),
            Cell::new(format_timestamp(entry.created_at)),
            Cell::new(entry.vocabulary.len()),
            Cell::new(entry.grammar.len()),
            Cell::new(preview(&entry.source_text)),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    if line.chars().count() > PREVIEW_CHARS {
        let cut: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}…")
    } else {
        line.to_string()
    }
}
