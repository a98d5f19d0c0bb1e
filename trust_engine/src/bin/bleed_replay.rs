//! Bleed Replay
//!
//! Feeds a recorded stream of player decisions through the engine and prints
//! one JSON result per input line. Input is JSON lines, each either an action
//! (`{"sessionId", "character", "action", ...}`) or a free-text message
//! (`{"sessionId", "character", "message", ...}`). A `create` line with an
//! empty `sessionId` opens the storyline under a generated id, reported in
//! the response. Logs go to stderr.

use bleed_rules::{Action, CharacterId, Ruleset};
use clap::Parser;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trust_engine::{ActionRequest, EngineError, MessageRequest, TrustEngine};

#[derive(Parser)]
#[command(name = "bleed_replay")]
#[command(about = "Replay recorded player decisions through the trust engine")]
struct Cli {
    /// Ruleset file (TOML, or JSON with a .json extension). Defaults to the
    /// built-in reference storylines.
    #[arg(short, long)]
    rules: Option<PathBuf>,
    /// JSON lines input; reads stdin when omitted
    input: Option<PathBuf>,
    /// Print the configured characters and exit
    #[arg(long)]
    characters: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReplayLine {
    Message(MessageRequest),
    Action(ActionRequest),
}

/// A `create` line without a session id gets a generated one.
fn opens_without_id(request: &ActionRequest) -> bool {
    request.session_id.trim().is_empty()
        && request.action.parse::<Action>().is_ok_and(|action| action.is_create())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let rules = match &cli.rules {
        Some(path) => Ruleset::from_path(path)?,
        None => Ruleset::reference(),
    };
    let engine = TrustEngine::new(rules)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if cli.characters {
        serde_json::to_writer_pretty(&mut out, &engine.characters())?;
        writeln!(out)?;
        return Ok(());
    }

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut handled = 0usize;
    let mut rejected = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let result = match serde_json::from_str::<ReplayLine>(&line) {
            Ok(ReplayLine::Message(request)) => engine.handle_message(&request),
            Ok(ReplayLine::Action(request)) if opens_without_id(&request) => {
                engine.open_session(&CharacterId::new(&request.character))
            }
            Ok(ReplayLine::Action(request)) => engine.handle_request(&request),
            Err(err) => Err(EngineError::InvalidRequest {
                field: format!("line {}", index + 1),
                message: err.to_string(),
            }),
        };

        match result {
            Ok(response) => {
                handled += 1;
                serde_json::to_writer(&mut out, &response)?;
            }
            Err(err) => {
                rejected += 1;
                if err.is_configuration_error() {
                    warn!(line = index + 1, error = %err, "configuration error");
                }
                serde_json::to_writer(&mut out, &err.to_body())?;
            }
        }
        writeln!(out)?;
    }
    out.flush()?;

    info!(
        handled,
        rejected,
        sessions = engine.session_count(),
        "replay finished"
    );
    Ok(())
}
