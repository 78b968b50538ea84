//! Reading session: ties the engine, ingestor and focus builder together
//! and reports progress to listeners.
//!
//! A session is an ordinary value owned by the caller. [`SessionRunner`]
//! moves one onto a dedicated thread fed by a channel of transport events,
//! so batches are processed strictly one at a time in arrival order.

use crate::alignment::{AlignmentEngine, AlignmentEvent, AlignmentState};
use crate::config::Config;
use crate::error::{ReadAlongError, Result};
use crate::focus::{FocusPhraseBuilder, FocusPhraseEntry};
use crate::ingest::{HypothesisBatch, HypothesisIngestor, IngestReport, ResultSlot};
use crate::normalize::NormalizationService;
use crate::protocol::{BiasUpdate, SessionEvent, TransportEvent};
use crate::script::{Position, ScriptModel};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Receives session progress. Every method defaults to doing nothing.
pub trait SessionListener: Send {
    /// New vocabulary hints for the recognizer.
    fn on_focus_phrase_changed(&mut self, _entries: &[FocusPhraseEntry]) {}

    fn on_word_advanced(&mut self, _position: Position) {}

    fn on_sentence_complete(&mut self, _page: usize, _sentence: usize) {}

    fn on_page_complete(&mut self, _page: usize) {}

    fn on_story_complete(&mut self) {}
}

/// Forwards notifications as [`SessionEvent`]s without ever blocking.
///
/// Events that do not fit in a full channel are dropped with a warning.
pub struct ChannelListener {
    tx: Sender<SessionEvent>,
}

impl ChannelListener {
    pub fn new(tx: Sender<SessionEvent>) -> Self {
        Self { tx }
    }

    fn forward(&self, event: SessionEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                log::warn!("Session event channel full, dropping {:?}", event);
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

impl SessionListener for ChannelListener {
    fn on_focus_phrase_changed(&mut self, entries: &[FocusPhraseEntry]) {
        self.forward(SessionEvent::FocusPhraseChanged {
            entries: entries.to_vec(),
        });
    }

    fn on_word_advanced(&mut self, position: Position) {
        self.forward(SessionEvent::WordAdvanced { position });
    }

    fn on_sentence_complete(&mut self, page: usize, sentence: usize) {
        self.forward(SessionEvent::SentenceComplete { page, sentence });
    }

    fn on_page_complete(&mut self, page: usize) {
        self.forward(SessionEvent::PageComplete { page });
    }

    fn on_story_complete(&mut self) {
        self.forward(SessionEvent::StoryComplete);
    }
}

/// One reader working through one story.
pub struct ReadingSession {
    engine: AlignmentEngine,
    ingestor: HypothesisIngestor,
    focus: FocusPhraseBuilder,
    listeners: Vec<Box<dyn SessionListener>>,
    auto_turn_pages: bool,
    running: bool,
}

impl ReadingSession {
    pub fn new(script: Arc<ScriptModel>, config: &Config) -> Self {
        let normalizer = NormalizationService::from_config(&config.homophones);
        Self {
            engine: AlignmentEngine::new(script, normalizer, &config.alignment),
            ingestor: HypothesisIngestor::new(),
            focus: FocusPhraseBuilder::new(&config.focus),
            listeners: Vec::new(),
            auto_turn_pages: config.session.auto_turn_pages,
            running: false,
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn SessionListener>) {
        self.listeners.push(listener);
    }

    /// Begin accepting hypotheses. The focus phrase is emitted so the
    /// recognizer is biased from the first word.
    ///
    /// Returns false if the session was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        // A new recognition run starts its own numbering and result log.
        self.ingestor.reset_cursor();
        log::info!("Reading session started at {}", self.engine.position());
        self.emit_focus(true);
        true
    }

    /// Stop accepting hypotheses. The reading position is kept.
    ///
    /// Returns false if the session was not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        log::info!("Reading session stopped at {}", self.engine.position());
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Feed one finalized batch.
    pub fn submit_hypothesis_batch(&mut self, batch: &HypothesisBatch) -> IngestReport {
        if !self.running {
            log::debug!("Session stopped, ignoring batch {:?}", batch.sequence);
            return IngestReport::default();
        }
        let report = self
            .ingestor
            .ingest_batch(&mut self.engine, batch.sequence, &batch.results);
        self.dispatch();
        report
    }

    /// Feed the recognizer's whole result log; only new slots are read.
    pub fn submit_result_log(&mut self, results: &[ResultSlot]) -> IngestReport {
        if !self.running {
            log::debug!("Session stopped, ignoring result log");
            return IngestReport::default();
        }
        let report = self.ingestor.ingest_log(&mut self.engine, results);
        self.dispatch();
        report
    }

    /// Continue on the next page after a page was completed.
    pub fn turn_page(&mut self) -> bool {
        if !self.engine.turn_page() {
            return false;
        }
        log::info!("Page {} started", self.engine.position().page);
        self.emit_focus(true);
        true
    }

    /// Apply one event from the recognizer transport.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Batch(batch) => {
                self.submit_hypothesis_batch(&batch);
            }
            TransportEvent::ResultLog { results } => {
                self.submit_result_log(&results);
            }
            TransportEvent::Error { message } => {
                log::warn!("Recognizer error: {}", message);
            }
            TransportEvent::Disconnected => {
                log::info!("Recognizer disconnected at {}", self.engine.position());
            }
            TransportEvent::Reconnected => {
                log::info!("Recognizer reconnected, resending focus phrase");
                self.emit_focus(true);
            }
            TransportEvent::TurnPage => {
                self.turn_page();
            }
        }
    }

    /// Replace the story. The position goes back to the start.
    pub fn load_script(&mut self, script: Arc<ScriptModel>) {
        self.engine.load_script(script);
        self.ingestor.reset_cursor();
        self.focus.invalidate();
        if self.running {
            self.emit_focus(true);
        }
    }

    /// Focus entries for the current position.
    pub fn focus_phrase(&mut self) -> Vec<FocusPhraseEntry> {
        self.focus
            .entries(self.engine.script(), self.engine.position())
            .to_vec()
    }

    /// Focus entries in the shape the recognizer expects.
    pub fn bias_update(&mut self) -> BiasUpdate {
        let mode = self.focus.mode();
        BiasUpdate::from_entries(&self.focus_phrase(), mode)
    }

    pub fn position(&self) -> Position {
        self.engine.position()
    }

    pub fn state(&self) -> AlignmentState {
        self.engine.state()
    }

    pub fn engine(&self) -> &AlignmentEngine {
        &self.engine
    }

    /// Deliver queued engine events, turn the page if configured, then
    /// refresh the focus phrase.
    fn dispatch(&mut self) {
        let events = self.engine.take_events();
        if events.is_empty() {
            return;
        }

        for event in &events {
            for listener in &mut self.listeners {
                match *event {
                    AlignmentEvent::WordAdvanced { position } => listener.on_word_advanced(position),
                    AlignmentEvent::SentenceComplete { page, sentence } => {
                        listener.on_sentence_complete(page, sentence)
                    }
                    AlignmentEvent::PageComplete { page } => listener.on_page_complete(page),
                    AlignmentEvent::StoryComplete => listener.on_story_complete(),
                }
            }
        }

        if self.auto_turn_pages && self.engine.awaiting_page_turn() {
            self.turn_page();
        } else {
            self.emit_focus(false);
        }
    }

    fn emit_focus(&mut self, force: bool) {
        let script = self.engine.script();
        let position = self.engine.position();
        let entries = if force {
            Some(self.focus.entries(script, position))
        } else {
            self.focus.refresh(script, position)
        };
        if let Some(entries) = entries {
            for listener in &mut self.listeners {
                listener.on_focus_phrase_changed(entries);
            }
        }
    }
}

/// Runs a [`ReadingSession`] on a dedicated thread.
///
/// The session is started on the thread, handles every event from the
/// channel in order, and is stopped and handed back by [`join`](Self::join)
/// once all senders are dropped.
pub struct SessionRunner {
    handle: Option<JoinHandle<ReadingSession>>,
}

impl SessionRunner {
    pub fn spawn(mut session: ReadingSession, events: Receiver<TransportEvent>) -> Self {
        let handle = thread::spawn(move || {
            session.start();
            while let Ok(event) = events.recv() {
                session.handle_transport_event(event);
            }
            session.stop();
            session
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Wait for the transport side to close and return the session.
    pub fn join(mut self) -> Result<ReadingSession> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| ReadAlongError::Other("Session runner already joined".to_string()))?;
        handle
            .join()
            .map_err(|_| ReadAlongError::Other("Session thread panicked".to_string()))
    }
}
