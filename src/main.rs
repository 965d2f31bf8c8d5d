use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use srs::{Answer, Flashcard, Quality, ReviewState, SrsError};
use time::OffsetDateTime;
use uuid::Uuid;

use studydash::assistant::{AssistantClient, AssistantError, ChatSession, StudyMode};
use studydash::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error("invalid review input: {0}")]
    Srs(#[from] SrsError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read {}: {source}", path.display())]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("stdout write failed: {0}")]
    Io(#[from] io::Error),
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Assistant(e) => e.error_code(),
            Self::Srs(_) => "E_INVALID_REVIEW",
            Self::Json(_) => "E_INVALID_JSON",
            Self::ReadFile { .. } => "E_READ_FILE",
            Self::Io(_) => "E_IO",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Assistant(e) => e.retryable(),
            _ => false,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "studydash", about = "Flashcard scheduling and study-assistant CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the next review state for one answer.
    Review(ReviewArgs),
    /// Show deck stats and a shuffled study queue for a card file.
    Queue(QueueArgs),
    /// Stream an answer from the study assistant.
    Ask(AskArgs),
}

#[derive(Args, Debug)]
struct ReviewArgs {
    #[arg(long, default_value_t = srs::INITIAL_EASINESS)]
    easiness: f64,

    #[arg(long, default_value_t = 0)]
    interval: u32,

    #[arg(long, default_value_t = 0)]
    repetitions: u32,

    #[arg(long, allow_negative_numbers = true)]
    quality: i64,

    #[arg(long, default_value_t = false, help = "Reject out-of-range quality instead of clamping")]
    strict: bool,
}

#[derive(Args, Debug)]
struct QueueArgs {
    #[arg(help = "JSON array of flashcards")]
    cards: PathBuf,

    #[arg(long)]
    deck: Option<Uuid>,
}

#[derive(Args, Debug)]
struct AskArgs {
    #[arg(long, default_value_t = StudyMode::Answer)]
    mode: StudyMode,

    #[arg(required = true, num_args = 1..)]
    prompt: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "studydash: no .env loaded");
    }

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Review(args) => run_review(&args),
        Command::Queue(args) => run_queue(&args),
        Command::Ask(args) => run_ask(args).await,
    };
    if let Err(e) = &result {
        tracing::error!(code = e.error_code(), retryable = e.retryable(), error = %e, "studydash: command failed");
    }
    result
}

// =============================================================================
// REVIEW
// =============================================================================

fn run_review(args: &ReviewArgs) -> Result<(), CliError> {
    let json = review_json(args, OffsetDateTime::now_utc())?;
    print_json(&json)
}

fn review_json(args: &ReviewArgs, now: OffsetDateTime) -> Result<Value, CliError> {
    let quality = if args.strict { Quality::new(args.quality)? } else { Quality::clamped(args.quality) };
    let state = ReviewState {
        easiness: args.easiness,
        interval: args.interval,
        repetitions: args.repetitions,
        next_review: now,
    };

    let next = srs::schedule(&state, quality, now);
    tracing::info!(quality = quality.value(), interval = next.interval, "review: scheduled");

    let preview: serde_json::Map<String, Value> = Answer::ALL
        .iter()
        .zip(srs::preview_intervals(&next))
        .map(|(answer, days)| (answer.label().to_string(), Value::String(srs::format_interval(days))))
        .collect();

    let mut json = serde_json::to_value(next)?;
    if let Value::Object(fields) = &mut json {
        fields.insert("quality".into(), Value::from(quality.value()));
        fields.insert("preview".into(), Value::Object(preview));
    }
    Ok(json)
}

// =============================================================================
// QUEUE
// =============================================================================

fn run_queue(args: &QueueArgs) -> Result<(), CliError> {
    let cards = load_cards(&args.cards)?;
    let json = queue_json(&cards, args.deck, OffsetDateTime::now_utc(), &mut rand::rng());
    print_json(&json)
}

fn load_cards(path: &Path) -> Result<Vec<Flashcard>, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::ReadFile { path: path.to_path_buf(), source })?;
    let cards: Vec<Flashcard> = serde_json::from_str(&raw)?;
    tracing::info!(path = %path.display(), cards = cards.len(), "queue: cards loaded");
    Ok(cards)
}

fn queue_json<R: rand::Rng + ?Sized>(
    cards: &[Flashcard],
    deck: Option<Uuid>,
    now: OffsetDateTime,
    rng: &mut R,
) -> Value {
    let decks: Vec<Uuid> = match deck {
        Some(id) => vec![id],
        None => {
            let mut ids: Vec<Uuid> = cards.iter().map(|card| card.deck_id).collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        }
    };
    let stats: BTreeMap<String, srs::DeckStats> = decks
        .into_iter()
        .map(|id| (id.to_string(), srs::deck_stats(cards, id, now)))
        .collect();

    let queue: Vec<Value> = srs::build_study_queue(cards, deck, now, rng)
        .into_iter()
        .map(|card| serde_json::json!({ "id": card.id, "front": card.front, "due": card.is_due(now) }))
        .collect();

    serde_json::json!({ "stats": stats, "queue": queue })
}

// =============================================================================
// ASK
// =============================================================================

async fn run_ask(args: AskArgs) -> Result<(), CliError> {
    let prompt = args.prompt.join(" ");
    let client = AssistantClient::from_env()?;
    tracing::debug!(endpoint = client.endpoint(), mode = %args.mode, hint = args.mode.description(), "ask: client ready");

    let mut session = ChatSession::new(client);
    let mut printer = SuffixPrinter::new(io::stdout());
    let mut on_snapshot = |text: &str| printer.show(text);
    session.send(&prompt, args.mode, &mut on_snapshot).await?;

    printer.finish()?;
    Ok(())
}

/// Writes only the part of each snapshot not yet printed.
///
/// Write errors are held until [`SuffixPrinter::finish`], since the snapshot
/// callback cannot return one.
struct SuffixPrinter<W: Write> {
    out: W,
    printed: usize,
    error: Option<io::Error>,
}

impl<W: Write> SuffixPrinter<W> {
    fn new(out: W) -> Self {
        Self { out, printed: 0, error: None }
    }

    fn show(&mut self, snapshot: &str) {
        if self.error.is_some() {
            return;
        }
        let Some(suffix) = snapshot.get(self.printed..) else {
            return;
        };
        if suffix.is_empty() {
            return;
        }
        match self.out.write_all(suffix.as_bytes()).and_then(|()| self.out.flush()) {
            Ok(()) => self.printed = snapshot.len(),
            Err(e) => self.error = Some(e),
        }
    }

    fn finish(mut self) -> Result<W, io::Error> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.printed > 0 {
            writeln!(self.out)?;
        }
        Ok(self.out)
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
