//! JSON-lines event sources.
//!
//! Front-ends (browser hooks, recorders, test fixtures) emit one
//! [`SensorEvent`] per line. This module parses such streams either eagerly
//! with [`parse_events`] or incrementally on a background thread with
//! [`ReplayCollector`].

use crate::collector::types::SensorEvent;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use thiserror::Error;

/// Channel capacity between the reader thread and the consumer.
const CHANNEL_CAPACITY: usize = 10_000;

/// Errors that can occur while collecting events.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Collector is already running")]
    AlreadyRunning,

    #[error("Event source has already been consumed")]
    SourceConsumed,

    #[error("Failed to read events: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid event on line {line}: {message}")]
    InvalidEvent { line: usize, message: String },
}

/// Parse a single line. Returns `Ok(None)` for blank lines and `#` comments.
fn parse_line(line: &str) -> Result<Option<SensorEvent>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some)
}

/// Parse a complete JSON-lines stream into events.
pub fn parse_events<R: BufRead>(reader: R) -> Result<Vec<SensorEvent>, CollectorError> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_line(&line) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(e) => {
                return Err(CollectorError::InvalidEvent {
                    line: index + 1,
                    message: e.to_string(),
                })
            }
        }
    }
    Ok(events)
}

/// Streams events from a JSON-lines reader on a background thread.
pub struct ReplayCollector {
    source: Option<Box<dyn BufRead + Send>>,
    sender: Option<Sender<SensorEvent>>,
    receiver: Receiver<SensorEvent>,
    running: Arc<AtomicBool>,
    dropped_lines: Arc<AtomicU64>,
}

impl ReplayCollector {
    /// Create a collector over the given reader. Nothing is read until `start`.
    pub fn new<R: BufRead + Send + 'static>(source: R) -> Self {
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);
        Self {
            source: Some(Box::new(source)),
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            dropped_lines: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start streaming events.
    ///
    /// The channel is closed when the source reaches end of input, so
    /// consumers observe `Disconnected` once everything has been delivered.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }
        let (source, sender) = match (self.source.take(), self.sender.take()) {
            (Some(source), Some(sender)) => (source, sender),
            _ => return Err(CollectorError::SourceConsumed),
        };

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let dropped = Arc::clone(&self.dropped_lines);

        thread::spawn(move || {
            for (index, line) in source.lines().enumerate() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Event source read failed: {}", e);
                        break;
                    }
                };
                match parse_line(&line) {
                    Ok(Some(event)) => {
                        if sender.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        dropped.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!("Skipping malformed event on line {}: {}", index + 1, e);
                    }
                }
            }
            running.store(false, Ordering::SeqCst);
        });

        Ok(())
    }

    /// Stop streaming. The reader thread exits after its current line.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the collector is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for sensor events.
    pub fn receiver(&self) -> &Receiver<SensorEvent> {
        &self.receiver
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&self) -> Option<SensorEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of malformed lines skipped so far.
    pub fn dropped_lines(&self) -> u64 {
        self.dropped_lines.load(Ordering::Relaxed)
    }
}
