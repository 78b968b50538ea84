//! JSON messages exchanged with the transcription server and the session
//! event stream.

use crate::config::PhraseMode;
use crate::focus::FocusPhraseEntry;
use crate::ingest::{HypothesisBatch, ResultSlot};
use crate::script::Position;
use serde::{Deserialize, Serialize};

/// Message pushed by the transcription server.
///
/// `{"text": "fred likes", "partial": false}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecognizerMessage {
    Error {
        error: String,
    },
    Transcript {
        text: String,
        #[serde(default)]
        partial: bool,
    },
}

impl RecognizerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Transport event for this message.
    ///
    /// A final transcript becomes a one-slot batch with `sequence`. Partial
    /// transcripts are revised by the server until they are final, so they
    /// produce nothing.
    pub fn into_event(self, sequence: u64) -> Option<TransportEvent> {
        match self {
            RecognizerMessage::Error { error } => Some(TransportEvent::Error { message: error }),
            RecognizerMessage::Transcript { partial: true, .. } => None,
            RecognizerMessage::Transcript { text, .. } if text.trim().is_empty() => None,
            RecognizerMessage::Transcript { text, .. } => {
                Some(TransportEvent::Batch(HypothesisBatch {
                    sequence: Some(sequence),
                    results: vec![ResultSlot::from_text(text)],
                }))
            }
        }
    }
}

/// Vocabulary hint sent to the transcription server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BiasUpdate {
    /// `{"keywords": ["fred likes to dig in"]}`
    Keywords { keywords: Vec<String> },
    /// `{"phrases": [{"phrase": "dig", "boost": 5.0}, ...]}`
    Phrases { phrases: Vec<FocusPhraseEntry> },
}

impl BiasUpdate {
    /// Plain keywords in single mode, weighted phrases otherwise.
    pub fn from_entries(entries: &[FocusPhraseEntry], mode: PhraseMode) -> Self {
        match mode {
            PhraseMode::Single => BiasUpdate::Keywords {
                keywords: entries.iter().map(|e| e.phrase.clone()).collect(),
            },
            PhraseMode::Weighted => BiasUpdate::Phrases {
                phrases: entries.to_vec(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            BiasUpdate::Keywords { keywords } => keywords.is_empty(),
            BiasUpdate::Phrases { phrases } => phrases.is_empty(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// What the transport delivers to a reading session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportEvent {
    /// A finalized batch, processed once per sequence number when it has one.
    Batch(HypothesisBatch),
    /// The whole result log so far.
    ResultLog {
        #[serde(default)]
        results: Vec<ResultSlot>,
    },
    /// Recognizer or connection error.
    Error { message: String },
    Disconnected,
    /// Connection restored; biasing must be sent again.
    Reconnected,
    /// The reader turned the page.
    TurnPage,
}

impl TransportEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Session notifications, as forwarded over a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    FocusPhraseChanged { entries: Vec<FocusPhraseEntry> },
    WordAdvanced { position: Position },
    SentenceComplete { page: usize, sentence: usize },
    PageComplete { page: usize },
    StoryComplete,
}

impl SessionEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizer_transcript_parses() {
        let msg = RecognizerMessage::from_json(r#"{"text":"fred likes","partial":false}"#).unwrap();
        assert_eq!(
            msg,
            RecognizerMessage::Transcript {
                text: "fred likes".to_string(),
                partial: false
            }
        );

        let msg = RecognizerMessage::from_json(r#"{"text":"fred"}"#).unwrap();
        assert!(matches!(msg, RecognizerMessage::Transcript { partial: false, .. }));
    }

    #[test]
    fn test_recognizer_error_parses() {
        let msg = RecognizerMessage::from_json(r#"{"error":"model crashed"}"#).unwrap();
        assert_eq!(
            msg.into_event(0),
            Some(TransportEvent::Error {
                message: "model crashed".to_string()
            })
        );
    }

    #[test]
    fn test_recognizer_unknown_shape_is_error() {
        assert!(RecognizerMessage::from_json(r#"{"status":"ready"}"#).is_err());
        assert!(RecognizerMessage::from_json("not json").is_err());
    }

    #[test]
    fn test_final_transcript_becomes_batch() {
        let msg = RecognizerMessage::Transcript {
            text: "dig in".to_string(),
            partial: false,
        };
        let Some(TransportEvent::Batch(batch)) = msg.into_event(4) else {
            panic!("expected batch");
        };
        assert_eq!(batch.sequence, Some(4));
        assert_eq!(batch.results, vec![ResultSlot::from_text("dig in")]);
    }

    #[test]
    fn test_partial_and_blank_transcripts_dropped() {
        let partial = RecognizerMessage::Transcript {
            text: "dig".to_string(),
            partial: true,
        };
        assert_eq!(partial.into_event(1), None);
        let blank = RecognizerMessage::Transcript {
            text: "  ".to_string(),
            partial: false,
        };
        assert_eq!(blank.into_event(1), None);
    }

    #[test]
    fn test_bias_update_json_shapes() {
        let entries = vec![
            FocusPhraseEntry::new("dig", 5.0),
            FocusPhraseEntry::new("dig in", 7.0),
        ];
        let weighted = BiasUpdate::from_entries(&entries, PhraseMode::Weighted);
        assert_eq!(
            weighted.to_json().unwrap(),
            r#"{"phrases":[{"phrase":"dig","boost":5.0},{"phrase":"dig in","boost":7.0}]}"#
        );

        let single = BiasUpdate::from_entries(
            &[FocusPhraseEntry::new("dig in", 10.0)],
            PhraseMode::Single,
        );
        assert_eq!(single.to_json().unwrap(), r#"{"keywords":["dig in"]}"#);
        assert_eq!(BiasUpdate::from_json(r#"{"keywords":["dig in"]}"#).unwrap(), single);
        assert!(BiasUpdate::from_entries(&[], PhraseMode::Single).is_empty());
    }

    #[test]
    fn test_transport_event_format() {
        assert_eq!(
            TransportEvent::TurnPage.to_json().unwrap(),
            r#"{"type":"turn_page"}"#
        );
        let event = TransportEvent::from_json(
            r#"{"type":"batch","sequence":2,"results":[{"alternatives":["fred"]}]}"#,
        )
        .unwrap();
        let TransportEvent::Batch(batch) = event else {
            panic!("expected batch");
        };
        assert_eq!(batch.sequence, Some(2));

        let log = TransportEvent::from_json(r#"{"type":"result_log"}"#).unwrap();
        assert_eq!(log, TransportEvent::ResultLog { results: vec![] });
    }

    #[test]
    fn test_transport_event_rejects_unknown_type() {
        assert!(TransportEvent::from_json(r#"{"type":"explode"}"#).is_err());
        assert!(TransportEvent::from_json(r#"{"text":"fred"}"#).is_err());
    }

    #[test]
    fn test_session_event_format() {
        let event = SessionEvent::WordAdvanced {
            position: Position::new(0, 1, 2),
        };
        assert_eq!(
            event.to_json().unwrap(),
            r#"{"type":"word_advanced","position":{"page":0,"sentence":1,"word":2}}"#
        );
        assert_eq!(
            SessionEvent::StoryComplete.to_json().unwrap(),
            r#"{"type":"story_complete"}"#
        );
        let parsed = SessionEvent::from_json(r#"{"type":"page_complete","page":3}"#).unwrap();
        assert_eq!(parsed, SessionEvent::PageComplete { page: 3 });
    }
}
