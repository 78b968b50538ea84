//! Focus phrase: the words the reader is expected to say next.
//!
//! The window is handed to the recognizer as vocabulary hints so that
//! upcoming story words win over acoustically similar alternatives.

use crate::config::{FocusConfig, PhraseMode};
use crate::defaults;
use crate::script::{Position, ScriptModel, Word};
use serde::{Deserialize, Serialize};

/// One weighted phrase for recognizer biasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusPhraseEntry {
    pub phrase: String,
    pub boost: f32,
}

impl FocusPhraseEntry {
    pub fn new(phrase: impl Into<String>, boost: f32) -> Self {
        Self {
            phrase: phrase.into(),
            boost,
        }
    }
}

/// Words around `position`, in reading order.
///
/// Up to `width / 2` words come from before the cursor, never from an
/// earlier page; the current word and the words after it fill the rest,
/// spilling into following sentences and pages. Backward slots that cannot
/// be used go to the forward side and vice versa, so the window is `width`
/// words long whenever the script has enough words. A past-the-end
/// position yields an empty window.
pub fn build_window(script: &ScriptModel, position: Position, width: usize) -> Vec<Word> {
    let Some(index) = script.flat_index(position) else {
        return Vec::new();
    };
    if width == 0 {
        return Vec::new();
    }

    let page_start = script.page_start(position.page).unwrap_or(index);
    let behind_available = index - page_start;

    let mut behind = (width / 2).min(behind_available);
    let end = (index + width - behind).min(script.word_count());
    let ahead = end - index;
    if behind + ahead < width {
        behind = (width - ahead).min(behind_available);
    }

    (index - behind..end)
        .filter_map(|i| script.word(i))
        .cloned()
        .collect()
}

/// Phrase entries for a window of words.
///
/// `Weighted` emits every word, every adjacent pair and the whole phrase
/// with increasing boosts; `Single` emits only the whole phrase. A phrase
/// appearing twice keeps its highest boost.
pub fn build_phrase_entries(words: &[Word], mode: PhraseMode) -> Vec<FocusPhraseEntry> {
    let forms: Vec<&str> = words
        .iter()
        .map(Word::normalized)
        .filter(|w| !w.is_empty())
        .collect();
    if forms.is_empty() {
        return Vec::new();
    }

    let mut entries: Vec<FocusPhraseEntry> = Vec::new();
    let mut push = |phrase: String, boost: f32| {
        match entries.iter_mut().find(|e| e.phrase == phrase) {
            Some(existing) => existing.boost = existing.boost.max(boost),
            None => entries.push(FocusPhraseEntry { phrase, boost }),
        }
    };

    if mode == PhraseMode::Weighted {
        for form in &forms {
            push((*form).to_string(), defaults::WORD_BOOST);
        }
        for pair in forms.windows(2) {
            push(pair.join(" "), defaults::BIGRAM_BOOST);
        }
    }
    push(forms.join(" "), defaults::PHRASE_BOOST);

    entries
}

/// Builds focus entries for the current cursor, memoized on the cursor.
#[derive(Debug, Clone)]
pub struct FocusPhraseBuilder {
    width: usize,
    mode: PhraseMode,
    cached: Option<(Position, Vec<FocusPhraseEntry>)>,
}

impl FocusPhraseBuilder {
    pub fn new(config: &FocusConfig) -> Self {
        Self {
            width: config.window_width,
            mode: config.phrase_mode,
            cached: None,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mode(&self) -> PhraseMode {
        self.mode
    }

    /// Entries for `position`, recomputed only when the cursor moved.
    pub fn entries(&mut self, script: &ScriptModel, position: Position) -> &[FocusPhraseEntry] {
        let stale = !matches!(&self.cached, Some((cached, _)) if *cached == position);
        if stale {
            let window = build_window(script, position, self.width);
            let entries = build_phrase_entries(&window, self.mode);
            log::debug!("Focus window at {}: {} entries", position, entries.len());
            self.cached = Some((position, entries));
        }
        match &self.cached {
            Some((_, entries)) => entries,
            None => &[],
        }
    }

    /// Like [`entries`](Self::entries), but `None` when the cursor has not
    /// moved since the last call.
    pub fn refresh(
        &mut self,
        script: &ScriptModel,
        position: Position,
    ) -> Option<&[FocusPhraseEntry]> {
        if matches!(&self.cached, Some((cached, _)) if *cached == position) {
            return None;
        }
        Some(self.entries(script, position))
    }

    /// Forget the memoized window (after the script changed).
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
