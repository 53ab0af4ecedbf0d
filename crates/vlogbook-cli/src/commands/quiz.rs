//! The `vlogbook quiz` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use vlogbook_core::quiz::{
    build_session, can_start_session, vocabulary_pool, QuizSession, MIN_POOL_SIZE, OPTION_COUNT,
};
use vlogbook_core::shuffle::RandomShuffle;
use vlogbook_core::traits::{EntryStore, SpeechSynthesizer};
use vlogbook_providers::audio::write_wav;
use vlogbook_providers::create_synthesizer;

use super::App;

pub async fn execute(
    app: &App,
    max_questions: Option<usize>,
    seed: Option<u64>,
    audio_dir: Option<PathBuf>,
) -> Result<()> {
    let entries = app.store.get_all().await?;
    let pool = vocabulary_pool(&entries);
    if !can_start_session(&pool) {
        println!(
            "Not enough words yet: {} saved, at least {MIN_POOL_SIZE} needed.",
            pool.len()
        );
        return Ok(());
    }

    let limit = max_questions.unwrap_or(app.config.max_questions);
    let shuffle = match seed {
        Some(seed) => RandomShuffle::seeded(seed),
        None => RandomShuffle::from_entropy(),
    };
    let mut session = match build_session(&pool, limit, shuffle) {
        Ok(session) => session,
        Err(e) if e.is_data_condition() => {
            println!("Not enough distinct words yet: {e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let clips = match audio_dir {
        Some(dir) => match create_synthesizer(&app.config) {
            Ok(synthesizer) => Some(ClipWriter { synthesizer, dir }),
            Err(e) => {
                tracing::warn!("pronunciation clips disabled: {e:#}");
                None
            }
        },
        None => None,
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    drive(&mut session, &mut stdin.lock(), &mut stdout.lock(), clips.as_ref()).await
}

/// Writes one pronunciation clip per question. Failures are logged only.
struct ClipWriter {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    dir: PathBuf,
}

impl ClipWriter {
    async fn write(&self, number: usize, term: &str) {
        let path = self
            .dir
            .join(format!("{number:02}-{}.wav", file_stem(term)));
        let result = match self.synthesizer.synthesize(term).await {
            Ok(audio) => write_wav(&path, &audio),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => tracing::debug!(path = %path.display(), "wrote pronunciation clip"),
            Err(e) => tracing::warn!(term, "could not write pronunciation clip: {e:#}"),
        }
    }
}

fn file_stem(term: &str) -> String {
    term.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Ask every question in turn. Stops early on end of input or `q`.
async fn drive<R: BufRead, W: Write>(
    session: &mut QuizSession,
    input: &mut R,
    out: &mut W,
    clips: Option<&ClipWriter>,
) -> Result<()> {
    let total = session.len();

    while let Some(question) = session.current_question().cloned() {
        let number = session.current_index() + 1;
        if let Some(clips) = clips {
            clips.write(number, &question.target.term).await;
        }

        writeln!(out, "\nQuestion {number}/{total}: {}", question.target.term)?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(out, "  {}) {option}", i + 1)?;
        }

        let Some(choice) = read_choice(input, out)? else {
            let answered = session.current_index();
            writeln!(
                out,
                "\nStopped after {answered} of {total} questions. Score: {}/{answered}",
                session.score()
            )?;
            return Ok(());
        };

        let outcome = session.answer(choice)?;
        if outcome.is_correct() {
            writeln!(out, "Correct!")?;
        } else {
            writeln!(
                out,
                "Wrong. The answer is {}) {}",
                outcome.correct_index + 1,
                question.options[outcome.correct_index]
            )?;
        }
        session.advance()?;
    }

    if let Some(result) = session.result() {
        writeln!(out, "\nScore: {result} ({:.0}%)", result.percentage())?;
    }
    Ok(())
}

/// Read a 1-based option number, reprompting on bad input. `None` on end of
/// input or `q`.
fn read_choice<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<usize>> {
    loop {
        write!(out, "Your answer (1-{OPTION_COUNT}, q to quit): ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match line.parse::<usize>() {
            Ok(n) if (1..=OPTION_COUNT).contains(&n) => return Ok(Some(n - 1)),
            _ => writeln!(out, "Please enter a number from 1 to {OPTION_COUNT}.")?,
        }
    }
}
