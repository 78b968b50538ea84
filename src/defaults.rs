//! Default configuration constants for readalong.
//!
//! Shared by the config types and the components that fall back to them.

/// Default number of words in the focus window.
///
/// Two words behind the reader, the current word and two words ahead.
pub const FOCUS_WINDOW_WIDTH: usize = 5;

/// Minimum length of a token (and of the target word) for merged-token
/// prefix matching. Keeps single letters from matching everything.
pub const PREFIX_MIN_LENGTH: usize = 2;

/// Boost for a single focus word in weighted phrase mode.
pub const WORD_BOOST: f32 = 5.0;

/// Boost for a consecutive word pair in weighted phrase mode.
pub const BIGRAM_BOOST: f32 = 7.0;

/// Boost for the full focus phrase.
pub const PHRASE_BOOST: f32 = 10.0;

/// Characters removed during normalization.
pub const STRIPPED_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '\'', '"'];

/// Sentence shown on the generated back cover page.
pub const BACK_COVER_TEXT: &str = "The End";

/// Capacity of the transport event channel feeding a session runner.
pub const TRANSPORT_BUFFER: usize = 64;

/// Capacity of the session event channel used by `ChannelListener`.
pub const EVENT_BUFFER: usize = 256;
