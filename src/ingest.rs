//! Recognizer hypothesis ingestion.
//!
//! Recognizers deliver results in one of two shapes: finalized batches,
//! optionally numbered, or a result log that grows as the reader speaks and is
//! redelivered whole on every update. Either way each slot must reach the
//! alignment engine once, otherwise a word that was already counted could
//! advance the cursor a second time.

use crate::alignment::AlignmentEngine;
use serde::{Deserialize, Serialize};

/// One segment of recognized audio with its candidate transcriptions,
/// best first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSlot {
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl ResultSlot {
    /// Slot with a single transcription.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            alternatives: vec![text.into()],
        }
    }
}

/// A finalized batch of result slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypothesisBatch {
    /// Increases by at least one per new batch; redelivery repeats it.
    /// Unnumbered batches cannot be recognized as redelivered and are
    /// processed as they arrive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
    #[serde(default)]
    pub results: Vec<ResultSlot>,
}

/// What one ingestion call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Tokens handed to the engine.
    pub submitted: usize,
    /// Tokens that moved the cursor.
    pub advanced: usize,
    /// The batch had already been processed and was ignored.
    pub duplicate: bool,
    /// A completion cut a slot short.
    pub stopped_at_boundary: bool,
}

/// Feeds recognizer output to an [`AlignmentEngine`] exactly once.
#[derive(Debug, Clone, Default)]
pub struct HypothesisIngestor {
    last_sequence: Option<u64>,
    log_cursor: usize,
}

impl HypothesisIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a finalized batch unless its sequence was already seen.
    ///
    /// Slots left unread because the page completed are dropped with the
    /// batch.
    pub fn ingest_batch(
        &mut self,
        engine: &mut AlignmentEngine,
        sequence: Option<u64>,
        slots: &[ResultSlot],
    ) -> IngestReport {
        if let Some(sequence) = sequence {
            if self.last_sequence.is_some_and(|last| sequence <= last) {
                log::debug!("Skipping duplicate batch {}", sequence);
                return IngestReport {
                    duplicate: true,
                    ..IngestReport::default()
                };
            }
            self.last_sequence = Some(sequence);
        }
        let (report, _) = submit_slots(engine, slots);
        report
    }

    /// Process only the slots of a growing result log not seen before.
    ///
    /// A log shorter than the cursor means the recognizer started a new log,
    /// so it is read from the beginning. Slots left unread while a page turn
    /// is pending stay ahead of the cursor and are read on the next call.
    pub fn ingest_log(&mut self, engine: &mut AlignmentEngine, slots: &[ResultSlot]) -> IngestReport {
        if slots.len() < self.log_cursor {
            log::debug!(
                "Result log shrank from {} to {} slots, restarting",
                self.log_cursor,
                slots.len()
            );
            self.log_cursor = 0;
        }
        let fresh = &slots[self.log_cursor..];
        if fresh.is_empty() {
            return IngestReport {
                duplicate: true,
                ..IngestReport::default()
            };
        }
        let (report, consumed) = submit_slots(engine, fresh);
        self.log_cursor += consumed;
        report
    }

    /// Forget processed batches and log position (new recognition run).
    pub fn reset_cursor(&mut self) {
        self.last_sequence = None;
        self.log_cursor = 0;
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    pub fn log_cursor(&self) -> usize {
        self.log_cursor
    }
}

/// Submit slots in order, returning the report and how many slots were read.
///
/// A completion ends the slot it happened in; the rest of that slot's tokens
/// and alternatives are late repeats of words already counted. Reading goes
/// on with the next slot unless a page turn is pending. Once the story is
/// complete every remaining slot counts as read.
fn submit_slots(engine: &mut AlignmentEngine, slots: &[ResultSlot]) -> (IngestReport, usize) {
    let mut report = IngestReport::default();

    for (index, slot) in slots.iter().enumerate() {
        if engine.story_complete() {
            break;
        }
        if engine.awaiting_page_turn() {
            log::debug!("Page turn pending, leaving {} slots", slots.len() - index);
            return (report, index);
        }
        if submit_slot(engine, slot, &mut report) {
            report.stopped_at_boundary = true;
        }
    }

    (report, slots.len())
}

/// True when a token of `slot` completed a sentence, page or the story.
fn submit_slot(engine: &mut AlignmentEngine, slot: &ResultSlot, report: &mut IngestReport) -> bool {
    let tokens = slot
        .alternatives
        .iter()
        .flat_map(|text| text.split_whitespace());

    for token in tokens {
        report.submitted += 1;
        if !engine.submit_token(token).advanced {
            continue;
        }
        report.advanced += 1;
        if engine.sentence_complete() || engine.page_complete() || engine.story_complete() {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{Position, ScriptModel};
    use std::sync::Arc;

    fn engine() -> AlignmentEngine {
        AlignmentEngine::with_defaults(Arc::new(
            ScriptModel::from_text_pages(&[
                &["Fred likes to dig in the sandbox.", "Max helps."],
                &["Oh, no!"],
            ])
            .unwrap(),
        ))
    }

    fn slots(texts: &[&str]) -> Vec<ResultSlot> {
        texts.iter().map(|t| ResultSlot::from_text(*t)).collect()
    }

    #[test]
    fn batch_tokens_submitted_in_order() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();
        let report =
            ingestor.ingest_batch(&mut engine, Some(1), &slots(&["Fred likes", "to dig"]));
        assert_eq!(report.submitted, 4);
        assert_eq!(report.advanced, 4);
        assert!(!report.duplicate);
        assert_eq!(engine.position(), Position::new(0, 0, 4));
    }

    #[test]
    fn redelivered_batch_submits_nothing() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();
        let batch = slots(&["fred likes"]);
        ingestor.ingest_batch(&mut engine, Some(7), &batch);
        let before = engine.position();

        let again = ingestor.ingest_batch(&mut engine, Some(7), &batch);
        assert!(again.duplicate);
        assert_eq!(again.submitted, 0);
        let older = ingestor.ingest_batch(&mut engine, Some(3), &slots(&["to"]));
        assert_eq!(older.submitted, 0);
        assert_eq!(engine.position(), before);
    }

    #[test]
    fn alternatives_tried_in_order() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();
        let slot = ResultSlot {
            alternatives: vec!["bread".into(), "fred".into()],
        };
        let report = ingestor.ingest_batch(&mut engine, Some(1), &[slot]);
        assert_eq!(report.submitted, 2);
        assert_eq!(report.advanced, 1);
    }

    #[test]
    fn malformed_slots_are_skipped() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();
        let batch = vec![
            ResultSlot::default(),
            ResultSlot::from_text("   "),
            ResultSlot::from_text("fred"),
        ];
        let report = ingestor.ingest_batch(&mut engine, Some(1), &batch);
        assert_eq!(report.submitted, 1);
        assert_eq!(engine.position(), Position::new(0, 0, 1));
    }

    #[test]
    fn batch_stops_after_sentence_completes() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();
        let report = ingestor.ingest_batch(
            &mut engine,
            Some(1),
            &slots(&["fred likes to dig in the sandbox max helps"]),
        );
        assert!(report.stopped_at_boundary);
        assert_eq!(report.advanced, 7);
        assert_eq!(engine.position(), Position::new(0, 1, 0));

        let next = ingestor.ingest_batch(&mut engine, Some(2), &slots(&["max"]));
        assert_eq!(next.advanced, 1);
    }

    #[test]
    fn result_log_processes_only_new_slots() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();

        let mut log = slots(&["fred"]);
        assert_eq!(ingestor.ingest_log(&mut engine, &log).advanced, 1);

        log.push(ResultSlot::from_text("likes"));
        let report = ingestor.ingest_log(&mut engine, &log);
        assert_eq!(report.submitted, 1);
        assert_eq!(ingestor.log_cursor(), 2);

        let unchanged = ingestor.ingest_log(&mut engine, &log);
        assert!(unchanged.duplicate);
        assert_eq!(unchanged.submitted, 0);
        assert_eq!(engine.position(), Position::new(0, 0, 2));
    }

    #[test]
    fn shrunken_log_restarts_cursor() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();
        ingestor.ingest_log(&mut engine, &slots(&["fred", "likes", "to"]));

        let report = ingestor.ingest_log(&mut engine, &slots(&["dig"]));
        assert_eq!(report.advanced, 1);
        assert_eq!(ingestor.log_cursor(), 1);
        assert_eq!(engine.position(), Position::new(0, 0, 4));
    }

    #[test]
    fn reset_cursor_accepts_old_sequences() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();
        ingestor.ingest_batch(&mut engine, Some(5), &slots(&["fred"]));
        ingestor.reset_cursor();
        assert_eq!(ingestor.last_sequence(), None);
        let report = ingestor.ingest_batch(&mut engine, Some(1), &slots(&["likes"]));
        assert_eq!(report.advanced, 1);
    }

    #[test]
    fn batch_json_defaults_missing_fields() {
        let batch: HypothesisBatch =
            serde_json::from_str(r#"{"results":[{},{"alternatives":["fred"]}]}"#).unwrap();
        assert_eq!(batch.sequence, None);
        assert!(batch.results[0].alternatives.is_empty());
        assert_eq!(batch.results[1].alternatives, vec!["fred"]);
    }

    #[test]
    fn sentence_end_only_stops_its_own_slot() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();
        let mut log = slots(&["fred likes to dig in the sandbox sandbox", "max"]);

        let report = ingestor.ingest_log(&mut engine, &log);
        assert!(report.stopped_at_boundary);
        assert_eq!(report.submitted, 8);
        assert_eq!(report.advanced, 8);
        assert_eq!(ingestor.log_cursor(), 2);
        assert_eq!(engine.position(), Position::new(0, 1, 1));

        log.push(ResultSlot::from_text("helps"));
        assert_eq!(ingestor.ingest_log(&mut engine, &log).advanced, 1);
        assert!(engine.page_complete());
    }

    #[test]
    fn batch_continues_into_next_sentence_slot() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();
        let batch = vec![
            ResultSlot {
                alternatives: vec!["fred likes to dig in the sandbox".into(), "sandbox".into()],
            },
            ResultSlot::from_text("max"),
        ];
        let report = ingestor.ingest_batch(&mut engine, Some(1), &batch);
        assert!(report.stopped_at_boundary);
        assert_eq!(report.submitted, 8);
        assert_eq!(engine.position(), Position::new(0, 1, 1));
    }

    #[test]
    fn pending_page_turn_leaves_log_slots_unread() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();
        let log = slots(&["fred likes to dig in the sandbox", "max helps", "oh no"]);

        let report = ingestor.ingest_log(&mut engine, &log);
        assert_eq!(report.advanced, 9);
        assert!(engine.awaiting_page_turn());
        assert_eq!(ingestor.log_cursor(), 2);

        assert!(engine.turn_page());
        let report = ingestor.ingest_log(&mut engine, &log);
        assert_eq!(report.advanced, 2);
        assert!(!report.duplicate);
        assert!(engine.story_complete());
        assert_eq!(ingestor.log_cursor(), 3);
    }

    #[test]
    fn pending_page_turn_drops_rest_of_batch() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();
        let report = ingestor.ingest_batch(
            &mut engine,
            Some(1),
            &slots(&["fred likes to dig in the sandbox", "max helps", "oh"]),
        );
        assert_eq!(report.submitted, 9);
        assert!(engine.awaiting_page_turn());
        assert_eq!(engine.position(), Position::new(1, 0, 0));
    }

    #[test]
    fn unnumbered_batches_each_processed_once() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();
        for json in [
            r#"{"results":[{"alternatives":["fred"]}]}"#,
            r#"{"results":[{"alternatives":["likes"]}]}"#,
        ] {
            let batch: HypothesisBatch = serde_json::from_str(json).unwrap();
            let report = ingestor.ingest_batch(&mut engine, batch.sequence, &batch.results);
            assert!(!report.duplicate);
            assert_eq!(report.advanced, 1);
        }
        assert_eq!(engine.position(), Position::new(0, 0, 2));
        assert_eq!(ingestor.last_sequence(), None);
    }

    #[test]
    fn unnumbered_batch_leaves_sequence_dedup_intact() {
        let mut engine = engine();
        let mut ingestor = HypothesisIngestor::new();
        ingestor.ingest_batch(&mut engine, Some(4), &slots(&["fred"]));
        ingestor.ingest_batch(&mut engine, None, &slots(&["likes"]));
        assert_eq!(ingestor.last_sequence(), Some(4));
        assert!(ingestor.ingest_batch(&mut engine, Some(4), &slots(&["to"])).duplicate);
        assert_eq!(engine.position(), Position::new(0, 0, 2));
    }
}
