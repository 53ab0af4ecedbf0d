//! The `vlogbook show` command.

use anyhow::Result;

use super::{print_entry, App};

pub async fn execute(app: &App, id: &str) -> Result<()> {
    let entry = app.entry(id).await?;
    print_entry(&entry);
    Ok(())
}
