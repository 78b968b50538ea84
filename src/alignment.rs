//! Alignment engine: tracks the reading cursor against recognized tokens.
//!
//! Each token is tested against the word under the cursor with three
//! strategies, in order:
//!
//! 1. exact: normalized token equals the normalized target
//! 2. homophone: token and target share a homophone class
//! 3. merged-token prefix: the recognizer fused the target with the next
//!    spoken word ("dig" + "ger" → "digger"), so the token, or one of its
//!    homophones, starts with the target
//!
//! The first strategy that succeeds advances the cursor by one word. Tokens
//! that match nothing are dropped without touching any state, so noise,
//! filler words and false starts are harmless.

use crate::config::AlignmentConfig;
use crate::normalize::{NormalizationService, normalize};
use crate::script::{Position, ScriptModel, Word};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which strategy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    Exact,
    Homophone,
    Prefix,
    None,
}

/// Outcome of testing one token against the current target word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub advanced: bool,
    pub strategy: MatchStrategy,
    /// Suffix left over after a prefix match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remainder: Option<String>,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            advanced: false,
            strategy: MatchStrategy::None,
            remainder: None,
        }
    }

    fn matched(strategy: MatchStrategy) -> Self {
        Self {
            advanced: true,
            strategy,
            remainder: None,
        }
    }

    fn prefix(remainder: &str) -> Self {
        Self {
            advanced: true,
            strategy: MatchStrategy::Prefix,
            remainder: Some(remainder.to_string()),
        }
    }
}

/// Coarse reading state derived from the completion flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentState {
    Reading,
    SentenceComplete,
    /// The page was read to the end; waiting for the page to turn.
    PageComplete,
    /// Absorbing: nothing leaves this state.
    StoryComplete,
}

/// Progress notifications, queued in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlignmentEvent {
    /// The cursor moved; carries the new cursor.
    WordAdvanced { position: Position },
    SentenceComplete { page: usize, sentence: usize },
    PageComplete { page: usize },
    StoryComplete,
}

/// Holds the reading position and applies the matching policy.
#[derive(Debug, Clone)]
pub struct AlignmentEngine {
    script: Arc<ScriptModel>,
    normalizer: NormalizationService,
    prefix_min_length: usize,
    position: Position,
    sentence_complete: bool,
    page_complete: bool,
    story_complete: bool,
    events: Vec<AlignmentEvent>,
}

impl AlignmentEngine {
    /// Engine at the start of the script.
    ///
    /// `ScriptModel` cannot be empty, so construction cannot fail.
    pub fn new(
        script: Arc<ScriptModel>,
        normalizer: NormalizationService,
        config: &AlignmentConfig,
    ) -> Self {
        Self {
            script,
            normalizer,
            prefix_min_length: config.prefix_min_length.max(1),
            position: Position::START,
            sentence_complete: false,
            page_complete: false,
            story_complete: false,
            events: Vec::new(),
        }
    }

    /// Engine with built-in homophones and default settings.
    pub fn with_defaults(script: Arc<ScriptModel>) -> Self {
        Self::new(
            script,
            NormalizationService::default(),
            &AlignmentConfig::default(),
        )
    }

    /// Test one recognized token against the word under the cursor.
    ///
    /// Never fails: unmatched, empty or late tokens return
    /// `{ advanced: false, strategy: None }` and change nothing.
    pub fn submit_token(&mut self, token: &str) -> MatchResult {
        if self.story_complete || self.page_complete {
            return MatchResult::none();
        }

        let script = Arc::clone(&self.script);
        let Some(word) = script.word_at(self.position) else {
            return MatchResult::none();
        };

        let input = normalize(token);
        if input.is_empty() {
            return MatchResult::none();
        }

        let result = self.match_target(&input, word.normalized());
        if result.advanced {
            log::debug!(
                "'{}' matched '{}' ({:?}) at {}",
                input,
                word.normalized(),
                result.strategy,
                self.position
            );
            self.advance();
        }
        result
    }

    fn match_target(&self, input: &str, target: &str) -> MatchResult {
        if input == target {
            return MatchResult::matched(MatchStrategy::Exact);
        }

        let table = self.normalizer.table();
        if table.same_class(input, target) {
            return MatchResult::matched(MatchStrategy::Homophone);
        }

        let min = self.prefix_min_length;
        if target.chars().count() < min {
            return MatchResult::none();
        }

        let homophones = table.class_of(input).unwrap_or_default();
        let candidates = std::iter::once(input).chain(homophones.iter().map(String::as_str));
        for candidate in candidates {
            if candidate.chars().count() < min {
                continue;
            }
            if let Some(rest) = candidate.strip_prefix(target)
                && !rest.is_empty()
            {
                return MatchResult::prefix(rest);
            }
        }

        MatchResult::none()
    }

    /// Move past the word under the cursor, handling boundaries.
    fn advance(&mut self) {
        let script = Arc::clone(&self.script);
        let Position {
            page,
            sentence,
            word,
        } = self.position;

        let sentence_len = script.sentence(page, sentence).map_or(0, |s| s.len());
        let sentences_on_page = script.page(page).map_or(0, |p| p.sentences().len());

        self.sentence_complete = false;
        let mut completions = Vec::new();

        if word + 1 < sentence_len {
            self.position.word += 1;
        } else {
            self.sentence_complete = true;
            completions.push(AlignmentEvent::SentenceComplete { page, sentence });

            if sentence + 1 < sentences_on_page {
                self.position = Position::new(page, sentence + 1, 0);
            } else {
                self.page_complete = true;
                completions.push(AlignmentEvent::PageComplete { page });
                log::info!("Page {} complete", page);

                if page + 1 < script.page_count() {
                    self.position = Position::new(page + 1, 0, 0);
                } else {
                    self.story_complete = true;
                    self.position = script.end_position();
                    completions.push(AlignmentEvent::StoryComplete);
                    log::info!("Story complete");
                }
            }
        }

        self.events.push(AlignmentEvent::WordAdvanced {
            position: self.position,
        });
        self.events.extend(completions);
    }

    /// Resume reading on the next page after a page was completed.
    ///
    /// Returns false (and does nothing) unless a page turn is pending.
    pub fn turn_page(&mut self) -> bool {
        if !self.awaiting_page_turn() {
            return false;
        }
        self.page_complete = false;
        self.sentence_complete = false;
        log::debug!("Turned to page {}", self.position.page);
        true
    }

    /// Swap in a new script; the cursor and all flags go back to the start.
    pub fn load_script(&mut self, script: Arc<ScriptModel>) {
        self.script = script;
        self.position = Position::START;
        self.sentence_complete = false;
        self.page_complete = false;
        self.story_complete = false;
        self.events.clear();
    }

    /// Drain queued progress events.
    pub fn take_events(&mut self) -> Vec<AlignmentEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn script(&self) -> &Arc<ScriptModel> {
        &self.script
    }

    /// Word under the cursor; `None` past the end.
    pub fn current_word(&self) -> Option<&Word> {
        self.script.word_at(self.position)
    }

    pub fn sentence_complete(&self) -> bool {
        self.sentence_complete
    }

    pub fn page_complete(&self) -> bool {
        self.page_complete
    }

    pub fn story_complete(&self) -> bool {
        self.story_complete
    }

    pub fn awaiting_page_turn(&self) -> bool {
        self.page_complete && !self.story_complete
    }

    pub fn state(&self) -> AlignmentState {
        if self.story_complete {
            AlignmentState::StoryComplete
        } else if self.page_complete {
            AlignmentState::PageComplete
        } else if self.sentence_complete {
            AlignmentState::SentenceComplete
        } else {
            AlignmentState::Reading
        }
    }
}
