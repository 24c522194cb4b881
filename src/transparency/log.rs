//! Privacy-preserving transparency log.
//!
//! Tracks what the engine has processed and concluded, without storing any
//! personal or identifying information.

use crate::collector::types::SensorEvent;
use crate::core::classifier::EmotionalState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the current session.
#[derive(Debug)]
pub struct TransparencyLog {
    /// Number of keyboard events processed
    keyboard_events: AtomicU64,
    /// Number of mouse events processed
    mouse_events: AtomicU64,
    /// Number of readings computed
    readings_computed: AtomicU64,
    /// Readings per smoothed state, indexed by `EmotionalState::index`
    state_counts: [AtomicU64; EmotionalState::ALL.len()],
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl TransparencyLog {
    pub fn new() -> Self {
        Self {
            keyboard_events: AtomicU64::new(0),
            mouse_events: AtomicU64::new(0),
            readings_computed: AtomicU64::new(0),
            state_counts: Default::default(),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a transparency log with persistence.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        if let Err(e) = log.load() {
            tracing::warn!("Could not load previous transparency stats: {e}");
        }

        log
    }

    /// Count an event by source.
    pub fn record_event(&self, event: &SensorEvent) {
        match event {
            SensorEvent::Keyboard(_) => self.keyboard_events.fetch_add(1, Ordering::Relaxed),
            SensorEvent::Mouse(_) => self.mouse_events.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_keyboard_events(&self, count: u64) {
        self.keyboard_events.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_mouse_events(&self, count: u64) {
        self.mouse_events.fetch_add(count, Ordering::Relaxed);
    }

    /// Count a reading and the state it concluded.
    pub fn record_reading(&self, state: EmotionalState) {
        self.readings_computed.fetch_add(1, Ordering::Relaxed);
        self.state_counts[state.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> TransparencyStats {
        let state_counts = EmotionalState::ALL
            .iter()
            .map(|s| (*s, self.state_counts[s.index()].load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();

        TransparencyStats {
            keyboard_events: self.keyboard_events.load(Ordering::Relaxed),
            mouse_events: self.mouse_events.load(Ordering::Relaxed),
            readings_computed: self.readings_computed.load(Ordering::Relaxed),
            state_counts,
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        let states = if stats.state_counts.is_empty() {
            "none".to_string()
        } else {
            stats
                .state_counts
                .iter()
                .map(|(state, count)| format!("{state}: {count}"))
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "Session Statistics:\n\
             - Keyboard events processed: {}\n\
             - Mouse events processed: {}\n\
             - Readings computed: {}\n\
             - States observed: {}\n\
             - Session duration: {} seconds\n\
             \n\
             Privacy Guarantee:\n\
             - No key content captured\n\
             - No cursor coordinates captured\n\
             - Only timing and magnitude data retained",
            stats.keyboard_events,
            stats.mouse_events,
            stats.readings_computed,
            states,
            stats.session_duration_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                keyboard_events: stats.keyboard_events,
                mouse_events: stats.mouse_events,
                readings_computed: stats.readings_computed,
                state_counts: stats.state_counts,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.keyboard_events
                    .store(persisted.keyboard_events, Ordering::Relaxed);
                self.mouse_events
                    .store(persisted.mouse_events, Ordering::Relaxed);
                self.readings_computed
                    .store(persisted.readings_computed, Ordering::Relaxed);
                for (state, count) in persisted.state_counts {
                    self.state_counts[state.index()].store(count, Ordering::Relaxed);
                }
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.keyboard_events.store(0, Ordering::Relaxed);
        self.mouse_events.store(0, Ordering::Relaxed);
        self.readings_computed.store(0, Ordering::Relaxed);
        for counter in &self.state_counts {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for TransparencyLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of transparency statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransparencyStats {
    pub keyboard_events: u64,
    pub mouse_events: u64,
    pub readings_computed: u64,
    pub state_counts: BTreeMap<EmotionalState, u64>,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    keyboard_events: u64,
    mouse_events: u64,
    readings_computed: u64,
    #[serde(default)]
    state_counts: BTreeMap<EmotionalState, u64>,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared transparency log.
pub type SharedTransparencyLog = Arc<TransparencyLog>;

pub fn create_shared_log() -> SharedTransparencyLog {
    Arc::new(TransparencyLog::new())
}

pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedTransparencyLog {
    Arc::new(TransparencyLog::with_persistence(path))
}
