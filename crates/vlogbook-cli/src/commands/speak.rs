//! The `vlogbook speak` command.

use std::path::Path;

use anyhow::Result;

use vlogbook_providers::audio::write_wav;
use vlogbook_providers::{create_synthesizer, with_retry};

use super::App;

pub async fn execute(app: &App, text: &str, out: &Path) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("text must not be empty");
    }
    let synthesizer = create_synthesizer(&app.config)?;
    let policy = app.config.retry_policy();
    let audio = with_retry(&policy, "speak", || synthesizer.synthesize(text)).await?;

    write_wav(out, &audio)?;
    println!("Wrote {} ({} ms)", out.display(), audio.duration_ms());
    Ok(())
}
