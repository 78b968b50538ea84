//! Immutable story script: pages → sentences → words.
//!
//! Built once when a story is loaded and shared read-only (usually behind an
//! `Arc`) for the lifetime of a reading session. A flat index over all words
//! lets the focus window walk across sentence and page boundaries cheaply.

use crate::error::{ReadAlongError, Result};
use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single word as printed in the story, with its normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Word {
    text: String,
    normalized: String,
}

impl Word {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            normalized: normalize(text),
        }
    }

    /// The word as printed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lowercase form without punctuation, used for every comparison.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// Words of one sentence in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    words: Vec<Word>,
}

impl Sentence {
    /// Words that normalize to nothing (a lone quote mark) can never be
    /// spoken, so they are dropped.
    pub fn new(mut words: Vec<Word>) -> Self {
        words.retain(|w| !w.normalized.is_empty());
        Self { words }
    }

    /// Split sentence text on whitespace.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.split_whitespace().map(Word::new).collect())
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Printed text, words joined by single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(Word::text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One page: its sentences plus media references the core never interprets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    sentences: Vec<Sentence>,
    images: Vec<String>,
}

impl Page {
    pub fn new(sentences: Vec<Sentence>, images: Vec<String>) -> Self {
        Self { sentences, images }
    }

    /// Page built from sentence strings, without media.
    pub fn from_sentences<S: AsRef<str>>(sentences: &[S]) -> Self {
        Self::new(
            sentences
                .iter()
                .map(|s| Sentence::from_text(s.as_ref()))
                .collect(),
            Vec::new(),
        )
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn word_count(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }
}

/// Cursor into a script.
///
/// Ordered lexicographically (page, sentence, word), which is reading order.
/// `{ page: page_count, sentence: 0, word: 0 }` is the past-the-end sentinel.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub page: usize,
    pub sentence: usize,
    pub word: usize,
}

impl Position {
    pub const START: Position = Position {
        page: 0,
        sentence: 0,
        word: 0,
    };

    pub fn new(page: usize, sentence: usize, word: usize) -> Self {
        Self {
            page,
            sentence,
            word,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {} sentence {} word {}",
            self.page, self.sentence, self.word
        )
    }
}

/// Whole story, validated and indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptModel {
    pages: Vec<Page>,
    /// Position of every word in reading order.
    flat: Vec<Position>,
    /// Flat index of the first word of each page.
    page_offsets: Vec<usize>,
}

impl ScriptModel {
    /// Validate and index the pages.
    ///
    /// Every page needs at least one sentence and every sentence at least one
    /// word; an empty script cannot be read.
    pub fn new(pages: Vec<Page>) -> Result<Self> {
        if pages.is_empty() {
            return Err(ReadAlongError::EmptyScript);
        }

        let mut flat = Vec::new();
        let mut page_offsets = Vec::with_capacity(pages.len());
        for (p, page) in pages.iter().enumerate() {
            if page.sentences.is_empty() {
                return Err(ReadAlongError::EmptyPage { page: p });
            }
            page_offsets.push(flat.len());
            for (s, sentence) in page.sentences.iter().enumerate() {
                if sentence.is_empty() {
                    return Err(ReadAlongError::EmptySentence {
                        page: p,
                        sentence: s,
                    });
                }
                flat.extend((0..sentence.len()).map(|w| Position::new(p, s, w)));
            }
        }

        Ok(Self {
            pages,
            flat,
            page_offsets,
        })
    }

    /// Convenience constructor: one slice of sentence strings per page.
    pub fn from_text_pages(pages: &[&[&str]]) -> Result<Self> {
        Self::new(pages.iter().map(|&p| Page::from_sentences(p)).collect())
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total number of words across all pages.
    pub fn word_count(&self) -> usize {
        self.flat.len()
    }

    /// The past-the-end sentinel.
    pub fn end_position(&self) -> Position {
        Position::new(self.pages.len(), 0, 0)
    }

    pub fn sentence(&self, page: usize, sentence: usize) -> Option<&Sentence> {
        self.pages.get(page)?.sentences.get(sentence)
    }

    /// Word at a position, `None` when out of bounds.
    pub fn word_at(&self, position: Position) -> Option<&Word> {
        self.sentence(position.page, position.sentence)?
            .words
            .get(position.word)
    }

    /// Word at a flat index.
    pub fn word(&self, index: usize) -> Option<&Word> {
        self.flat.get(index).and_then(|&p| self.word_at(p))
    }

    /// Position of a flat index.
    pub fn position_at(&self, index: usize) -> Option<Position> {
        self.flat.get(index).copied()
    }

    /// Flat index of a position, `None` when out of bounds.
    pub fn flat_index(&self, position: Position) -> Option<usize> {
        self.word_at(position)?;
        let page_start = self.page_offsets[position.page];
        let sentence_start: usize = self.pages[position.page].sentences[..position.sentence]
            .iter()
            .map(Sentence::len)
            .sum();
        Some(page_start + sentence_start + position.word)
    }

    /// Flat index of the first word on a page.
    pub fn page_start(&self, page: usize) -> Option<usize> {
        self.page_offsets.get(page).copied()
    }

    /// All words in reading order.
    pub fn words(&self) -> impl Iterator<Item = &Word> + '_ {
        self.flat.iter().filter_map(|&p| self.word_at(p))
    }
}
