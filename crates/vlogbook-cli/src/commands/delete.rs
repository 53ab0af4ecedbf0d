//! The `vlogbook delete` command.

use anyhow::Result;

use vlogbook_core::traits::EntryStore;

use super::App;

pub async fn execute(app: &App, id: &str) -> Result<()> {
    if app.store.get_by_id(id).await?.is_none() {
        println!("No entry with id {id}; nothing deleted.");
        return Ok(());
    }
    app.store.delete(id).await?;
    println!("Deleted {id}");
    Ok(())
}
