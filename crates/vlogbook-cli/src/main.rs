//! vlogbook CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use vlogbook_core::model::SelectionKind;

mod commands;

#[derive(Parser)]
#[command(
    name = "vlogbook",
    version,
    about = "Chinese-to-Spanish vlog journal and vocabulary quiz"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Entry store path (overrides `store_path` in the config)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter vlogbook.toml
    Init,

    /// Turn a Chinese note into a Spanish vlog script and save it
    Create {
        /// Source text (read from stdin when omitted)
        #[arg(long)]
        text: Option<String>,
    },

    /// Rewrite a saved script following an instruction
    Modify {
        #[arg(long)]
        id: String,

        /// e.g. "make it more formal"
        #[arg(long)]
        instruction: String,
    },

    /// Analyse a word or phrase from a saved script and attach the result
    Analyze {
        #[arg(long)]
        id: String,

        /// Text selected from the script
        #[arg(long)]
        selection: String,

        /// vocab or grammar
        #[arg(long, default_value = "vocab")]
        kind: SelectionKind,
    },

    /// List saved entries, newest first
    List,

    /// Show one entry with its vocabulary and grammar
    Show {
        #[arg(long)]
        id: String,
    },

    /// Delete an entry
    Delete {
        #[arg(long)]
        id: String,
    },

    /// Review saved vocabulary with a multiple-choice quiz
    Quiz {
        /// Max questions (default from config)
        #[arg(long)]
        max_questions: Option<usize>,

        /// Seed for a reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Write a pronunciation clip for each target word here
        #[arg(long)]
        audio_dir: Option<PathBuf>,
    },

    /// Synthesize speech to a WAV file
    Speak {
        #[arg(long)]
        text: String,

        /// Output .wav path
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vlogbook=info")),
        )
        .init();

    let cli = Cli::parse();
    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let app = || commands::App::load(cli.config.as_deref(), cli.store.clone());

    match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Create { text } => commands::create::execute(&app()?, text).await,
        Commands::Modify { id, instruction } => {
            commands::modify::execute(&app()?, &id, &instruction).await
        }
        Commands::Analyze {
            id,
            selection,
            kind,
        } => commands::analyze::execute(&app()?, &id, &selection, kind).await,
        Commands::List => commands::list::execute(&app()?).await,
        Commands::Show { id } => commands::show::execute(&app()?, &id).await,
        Commands::Delete { id } => commands::delete::execute(&app()?, &id).await,
        Commands::Quiz {
            max_questions,
            seed,
            audio_dir,
        } => commands::quiz::execute(&app()?, max_questions, seed, audio_dir).await,
        Commands::Speak { text, out } => commands::speak::execute(&app()?, &text, &out).await,
    }
}
