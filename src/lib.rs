//! readalong - read-along tutor core
//!
//! Tracks a reader through a story script from a noisy stream of speech
//! recognizer hypotheses, and produces focus phrases that bias the
//! recognizer toward the words expected next.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod alignment;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod focus;
pub mod ingest;
pub mod normalize;
pub mod output;
pub mod protocol;
pub mod script;
pub mod session;
pub mod story;
pub mod transport;

// Core model
pub use script::{Page, Position, ScriptModel, Sentence, Word};

// Alignment
pub use alignment::{AlignmentEngine, AlignmentEvent, AlignmentState, MatchResult, MatchStrategy};
pub use focus::{FocusPhraseBuilder, FocusPhraseEntry, build_phrase_entries, build_window};
pub use ingest::{HypothesisBatch, HypothesisIngestor, IngestReport, ResultSlot};
pub use normalize::{HomophoneTable, NormalizationService, normalize};

// Sessions
pub use session::{ChannelListener, ReadingSession, SessionListener, SessionRunner};
pub use transport::{HypothesisSource, JsonLinesSource};

// Error handling
pub use error::{ReadAlongError, Result};

// Config
pub use config::{Config, PhraseMode};

/// Build version string with optional git commit hash.
///
/// Returns `"0.0.1+abc1234"` when git hash is available, `"0.0.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
