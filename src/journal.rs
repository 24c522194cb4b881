//! Mood journal.
//!
//! Entries pair a self-reported mood (1-10) with free text and, when
//! available, the detector's state at the time of writing.

use crate::core::classifier::EmotionalState;
use crate::store::{JsonStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use thiserror::Error;
use uuid::Uuid;

/// Store key for the journal.
pub const JOURNAL_KEY: &str = "journal";

/// Entries needed before a trend is reported.
const MIN_TREND_ENTRIES: usize = 4;

/// Mean-mood change between halves that counts as a trend.
const TREND_DELTA: f64 = 0.5;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Mood must be between 1 and 10, got {0}")]
    MoodOutOfRange(u8),

    #[error("Journal entry text is empty")]
    EmptyText,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A single journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Self-reported mood, 1 (low) to 10 (high)
    pub mood: u8,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_state: Option<EmotionalState>,
}

/// Direction of recent mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTrend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

/// Aggregate view over the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSummary {
    pub entry_count: usize,
    pub average_mood: Option<f64>,
    /// Most frequent detected state across entries
    pub dominant_state: Option<EmotionalState>,
    pub trend: MoodTrend,
}

/// The journal, optionally backed by a store.
#[derive(Debug, Clone, Default)]
pub struct MoodJournal {
    entries: Vec<JournalEntry>,
    store: Option<JsonStore>,
}

impl MoodJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(store: JsonStore) -> Result<Self, JournalError> {
        let entries = store.read_or_default(JOURNAL_KEY)?;
        Ok(Self {
            entries,
            store: Some(store),
        })
    }

    pub fn save(&self) -> Result<(), JournalError> {
        if let Some(ref store) = self.store {
            store.write_json(JOURNAL_KEY, &self.entries)?;
        }
        Ok(())
    }

    /// Add an entry stamped with the current time.
    pub fn add(
        &mut self,
        mood: u8,
        text: &str,
        tags: Vec<String>,
        detected_state: Option<EmotionalState>,
    ) -> Result<&JournalEntry, JournalError> {
        self.add_at(Utc::now(), mood, text, tags, detected_state)
    }

    /// Add an entry with an explicit timestamp. Entries stay sorted by time.
    pub fn add_at(
        &mut self,
        created_at: DateTime<Utc>,
        mood: u8,
        text: &str,
        tags: Vec<String>,
        detected_state: Option<EmotionalState>,
    ) -> Result<&JournalEntry, JournalError> {
        if !(1..=10).contains(&mood) {
            return Err(JournalError::MoodOutOfRange(mood));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(JournalError::EmptyText);
        }

        let entry = JournalEntry {
            id: Uuid::new_v4(),
            created_at,
            mood,
            text: text.to_string(),
            tags: tags
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            detected_state,
        };

        let position = self
            .entries
            .partition_point(|e| e.created_at <= entry.created_at);
        self.entries.insert(position, entry);
        Ok(&self.entries[position])
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// The `n` most recent entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<&JournalEntry> {
        self.entries.iter().rev().take(n).collect()
    }

    /// Remove an entry by id. Returns whether it existed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn summary(&self) -> MoodSummary {
        let entry_count = self.entries.len();
        let average_mood = mean_mood(&self.entries);

        let mut counts = [0usize; EmotionalState::ALL.len()];
        for state in self.entries.iter().filter_map(|e| e.detected_state) {
            counts[state.index()] += 1;
        }
        let dominant_state = EmotionalState::ALL
            .iter()
            .copied()
            .filter(|s| counts[s.index()] > 0)
            .max_by_key(|s| counts[s.index()]);

        let trend = if entry_count < MIN_TREND_ENTRIES {
            MoodTrend::InsufficientData
        } else {
            let (older, newer) = self.entries.split_at(entry_count / 2);
            match (mean_mood(older), mean_mood(newer)) {
                (Some(old), Some(new)) if new - old >= TREND_DELTA => MoodTrend::Improving,
                (Some(old), Some(new)) if new - old <= -TREND_DELTA => MoodTrend::Declining,
                _ => MoodTrend::Stable,
            }
        };

        MoodSummary {
            entry_count,
            average_mood,
            dominant_state,
            trend,
        }
    }
}

fn mean_mood(entries: &[JournalEntry]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    Some(entries.iter().map(|e| f64::from(e.mood)).mean())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::temp_store;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rejects_invalid_entries() {
        let mut journal = MoodJournal::new();
        assert!(matches!(
            journal.add(0, "meh", vec![], None),
            Err(JournalError::MoodOutOfRange(0))
        ));
        assert!(matches!(
            journal.add(11, "meh", vec![], None),
            Err(JournalError::MoodOutOfRange(11))
        ));
        assert!(matches!(
            journal.add(5, "   ", vec![], None),
            Err(JournalError::EmptyText)
        ));
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn test_entries_sorted_and_tags_normalized() {
        let mut journal = MoodJournal::new();
        let now = Utc::now();
        journal
            .add_at(now, 6, "later", vec![" Work ".into(), "".into()], None)
            .unwrap();
        journal
            .add_at(now - Duration::hours(1), 4, "earlier", vec![], None)
            .unwrap();

        let texts: Vec<&str> = journal.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["earlier", "later"]);
        assert_eq!(journal.entries()[1].tags, vec!["work".to_string()]);
        assert_eq!(journal.recent(1)[0].text, "later");
    }

    #[test]
    fn test_summary_trend_and_dominant_state() {
        let mut journal = MoodJournal::new();
        let start = Utc::now() - Duration::days(10);
        let moods = [3, 4, 6, 7];
        let states = [
            Some(EmotionalState::Anxious),
            Some(EmotionalState::Anxious),
            Some(EmotionalState::Calm),
            None,
        ];
        for (i, (mood, state)) in moods.iter().zip(states).enumerate() {
            journal
                .add_at(start + Duration::days(i as i64), *mood, "entry", vec![], state)
                .unwrap();
        }

        let summary = journal.summary();
        let average = summary.average_mood.unwrap();
        assert!((average - 5.0).abs() < 1e-9);
        assert_eq!(
            summary,
            MoodSummary {
                entry_count: 4,
                average_mood: Some(average),
                dominant_state: Some(EmotionalState::Anxious),
                trend: MoodTrend::Improving,
            }
        );
    }

    #[test]
    fn test_small_journal_has_no_trend() {
        let mut journal = MoodJournal::new();
        journal.add(5, "fine", vec![], None).unwrap();
        let summary = journal.summary();
        assert_eq!(summary.trend, MoodTrend::InsufficientData);
        assert_eq!(summary.dominant_state, None);
    }

    #[test]
    fn test_remove_and_persist() {
        let store = temp_store("journal");
        let mut journal = MoodJournal::load(store.clone()).unwrap();
        let keep = journal.add(7, "good walk", vec![], None).unwrap().id;
        let drop = journal.add(2, "rough meeting", vec![], None).unwrap().id;

        assert!(journal.remove(drop));
        assert!(!journal.remove(drop));
        journal.save().unwrap();

        let reloaded = MoodJournal::load(store.clone()).unwrap();
        assert_eq!(reloaded.entries().len(), 1);
        assert_eq!(reloaded.entries()[0].id, keep);

        let _ = std::fs::remove_dir_all(store.root());
    }
}
