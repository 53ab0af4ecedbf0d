//! The `vlogbook init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("vlogbook.toml").exists() {
        println!("vlogbook.toml already exists, skipping.");
    } else {
        std::fs::write("vlogbook.toml", SAMPLE_CONFIG)?;
        println!("Created vlogbook.toml");
    }

    println!("\nNext steps:");
    println!("  1. Export VLOGBOOK_GEMINI_KEY or edit vlogbook.toml with your API key");
    println!("  2. Run: vlogbook create --text \"今天我去公园散步了\"");
    println!("  3. Run: vlogbook quiz");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# vlogbook configuration

# "gemini" or "mock" (offline canned responses)
backend = "gemini"
store_path = "./vlogbook-data/entries.json"
max_questions = 10
max_retries = 3
retry_delay_ms = 1000

[gemini]
api_key = "${GEMINI_API_KEY}"
model = "gemini-2.5-flash"
tts_model = "gemini-2.5-flash-preview-tts"
voice = "Kore"
"#;
