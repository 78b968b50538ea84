//! Terminal rendering of session events.
//! Used by `readalong read` to show progress as the reader speaks.

use crate::focus::FocusPhraseEntry;
use crate::protocol::SessionEvent;
use crate::script::{Position, ScriptModel};
use std::sync::Arc;

const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";
const UNDERLINE: &str = "\x1b[4m";

/// Clear the current terminal line.
pub fn clear_line() {
    eprint!("\r\x1b[2K");
}

/// Formats session events against the story being read.
pub struct EventRenderer {
    script: Arc<ScriptModel>,
    show_focus: bool,
}

impl EventRenderer {
    pub fn new(script: Arc<ScriptModel>) -> Self {
        Self {
            script,
            show_focus: false,
        }
    }

    /// Also print focus phrase changes.
    pub fn with_focus(mut self, show_focus: bool) -> Self {
        self.show_focus = show_focus;
        self
    }

    /// Text for one event, or `None` when the event is not shown.
    pub fn format_event(&self, event: &SessionEvent) -> Option<String> {
        match event {
            SessionEvent::FocusPhraseChanged { entries } => {
                self.show_focus.then(|| format_focus(entries))
            }
            SessionEvent::WordAdvanced { position } => Some(self.format_progress(*position)),
            SessionEvent::SentenceComplete { page, sentence } => Some(format!(
                "{GREEN}✓ sentence {} on page {}{RESET}",
                sentence + 1,
                page + 1
            )),
            SessionEvent::PageComplete { page } => Some(format!(
                "{GREEN}{BOLD}✓ page {} done{RESET} {DIM}(turn the page){RESET}",
                page + 1
            )),
            SessionEvent::StoryComplete => Some(format!("{GREEN}{BOLD}★ The End!{RESET}")),
        }
    }

    /// The sentence being read: words already read in green, the next word
    /// underlined, the rest dimmed.
    ///
    /// At a sentence boundary the finished sentence is shown fully read.
    pub fn format_progress(&self, position: Position) -> String {
        let (page, sentence, read) = if position.word == 0 {
            match self.previous_sentence(position) {
                Some((page, sentence, len)) => (page, sentence, len),
                None => (position.page, position.sentence, 0),
            }
        } else {
            (position.page, position.sentence, position.word)
        };

        let Some(words) = self.script.sentence(page, sentence).map(|s| s.words()) else {
            return String::new();
        };

        let mut out = format!("{DIM}[{}:{}]{RESET} ", page + 1, sentence + 1);
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let text = word.text();
            if i < read {
                out.push_str(&format!("{GREEN}{text}{RESET}"));
            } else if i == read {
                out.push_str(&format!("{YELLOW}{UNDERLINE}{text}{RESET}"));
            } else {
                out.push_str(&format!("{DIM}{text}{RESET}"));
            }
        }
        out
    }

    /// Sentence just finished when `position` is the start of the next one.
    fn previous_sentence(&self, position: Position) -> Option<(usize, usize, usize)> {
        let index = match self.script.flat_index(position) {
            Some(index) => index,
            None if position >= self.script.end_position() => self.script.word_count(),
            None => return None,
        };
        let last = self.script.position_at(index.checked_sub(1)?)?;
        let len = self.script.sentence(last.page, last.sentence)?.len();
        Some((last.page, last.sentence, len))
    }

    /// Print an event to stderr.
    pub fn render(&self, event: &SessionEvent) {
        if let Some(line) = self.format_event(event) {
            clear_line();
            eprintln!("{line}");
        }
    }
}

fn format_focus(entries: &[FocusPhraseEntry]) -> String {
    if entries.is_empty() {
        return format!("{DIM}focus: (none){RESET}");
    }
    // The whole-window phrase carries the highest boost.
    let phrase = entries
        .iter()
        .max_by(|a, b| a.boost.total_cmp(&b.boost))
        .map(|e| e.phrase.as_str())
        .unwrap_or_default();
    format!("{DIM}focus:{RESET} {CYAN}{phrase}{RESET} {DIM}({} hints){RESET}", entries.len())
}
