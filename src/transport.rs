//! Recognizer transport: where hypothesis events come from.
//!
//! The connection to the transcription server is owned by the caller; a
//! [`HypothesisSource`] only has to turn it into [`TransportEvent`]s. The
//! session consumes them on its own thread through a crossbeam channel, see
//! [`pump`].

use crate::error::{ReadAlongError, Result};
use crate::protocol::{RecognizerMessage, TransportEvent};
use crossbeam_channel::Sender;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// Async producer of transport events.
#[async_trait::async_trait]
pub trait HypothesisSource: Send {
    /// Next event, or `None` once the source is exhausted.
    async fn next_event(&mut self) -> Result<Option<TransportEvent>>;
}

/// Reads newline-delimited JSON.
///
/// Each line is either a [`TransportEvent`] (`{"type": "turn_page"}`) or a
/// raw [`RecognizerMessage`] (`{"text": "..."}`). Final transcripts and
/// batches without a sequence are numbered in arrival order. Blank lines and unrecognized shapes are
/// skipped.
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    next_sequence: u64,
    line_number: usize,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            next_sequence: 1,
            line_number: 0,
        }
    }

    fn parse_line(&mut self, line: &str) -> Option<TransportEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Ok(mut event) = TransportEvent::from_json(line) {
            if let TransportEvent::Batch(batch) = &mut event {
                let sequence = *batch.sequence.get_or_insert(self.next_sequence);
                self.next_sequence = self.next_sequence.max(sequence.saturating_add(1));
            }
            return Some(event);
        }

        match RecognizerMessage::from_json(line) {
            Ok(message) => {
                let event = message.into_event(self.next_sequence);
                if matches!(event, Some(TransportEvent::Batch(_))) {
                    self.next_sequence = self.next_sequence.saturating_add(1);
                }
                event
            }
            Err(e) => {
                log::warn!("Skipping line {}: {}", self.line_number, e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl<R: AsyncBufRead + Unpin + Send> HypothesisSource for JsonLinesSource<R> {
    async fn next_event(&mut self) -> Result<Option<TransportEvent>> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_number += 1;
            if let Some(event) = self.parse_line(&line) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }
}

/// Forward every event from `source` into `tx` until either side ends.
///
/// A read error is forwarded as `Error` followed by `Disconnected` and then
/// returned. Returns the number of events forwarded.
pub async fn pump<S: HypothesisSource + ?Sized>(
    source: &mut S,
    tx: &Sender<TransportEvent>,
) -> Result<usize> {
    let mut forwarded = 0;
    loop {
        match source.next_event().await {
            Ok(Some(event)) => {
                if tx.send(event).is_err() {
                    log::debug!("Session channel closed, stopping transport");
                    return Ok(forwarded);
                }
                forwarded += 1;
            }
            Ok(None) => return Ok(forwarded),
            Err(e) => {
                log::warn!("Transport failed: {}", e);
                // The session may already be gone; nothing to report to then.
                tx.send(TransportEvent::Error {
                    message: e.to_string(),
                })
                .ok();
                tx.send(TransportEvent::Disconnected).ok();
                return Err(ReadAlongError::Transport {
                    message: e.to_string(),
                });
            }
        }
    }
}
