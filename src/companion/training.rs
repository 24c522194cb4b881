//! Per-user "training data" that personalizes the companion.
//!
//! Nothing is learned statistically: the companion remembers a name, counts
//! topics, tracks feedback and rotates through its responses.

use crate::companion::responses::Topic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest name the companion will remember.
const MAX_NAME_LEN: usize = 32;

/// Topic count needed before the companion brings a topic back up.
pub const RECALL_THRESHOLD: u32 = 3;

/// How responses are phrased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStyle {
    /// Empathetic, reflective responses
    #[default]
    Gentle,
    /// Short, practical suggestions
    Direct,
}

/// Helpful/unhelpful tallies for one topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackCount {
    pub helpful: u32,
    pub unhelpful: u32,
}

/// Mutable personalization state, persisted between conversations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingData {
    pub user_name: Option<String>,
    pub topic_counts: BTreeMap<Topic, u32>,
    pub feedback: BTreeMap<Topic, FeedbackCount>,
    pub style: ResponseStyle,
    pub last_topic: Option<Topic>,
    pub message_count: u64,
    /// Next response index per topic
    pub rotation: BTreeMap<Topic, usize>,
}

impl TrainingData {
    /// Look for "my name is X", "call me X" or "i'm called X".
    pub fn extract_name(tokens: &[String]) -> Option<String> {
        const LEADS: [&[&str]; 3] = [&["my", "name", "is"], &["call", "me"], &["i'm", "called"]];

        for lead in LEADS {
            if let Some(pos) = tokens
                .windows(lead.len())
                .position(|w| w.iter().zip(lead.iter()).all(|(a, b)| a == b))
            {
                let candidate = tokens.get(pos + lead.len())?;
                if candidate.is_empty()
                    || candidate.len() > MAX_NAME_LEN
                    || !candidate.chars().all(char::is_alphabetic)
                {
                    return None;
                }
                let mut chars = candidate.chars();
                let first = chars.next()?;
                return Some(first.to_uppercase().chain(chars).collect());
            }
        }
        None
    }

    /// Record that a message about `topic` was answered.
    pub fn observe(&mut self, topic: Topic) {
        *self.topic_counts.entry(topic).or_insert(0) += 1;
        self.last_topic = Some(topic);
        self.message_count += 1;
    }

    /// Pick the next response index for a topic and advance the rotation.
    pub fn next_index(&mut self, topic: Topic, available: usize) -> usize {
        if available == 0 {
            return 0;
        }
        let cursor = self.rotation.entry(topic).or_insert(0);
        let index = *cursor % available;
        *cursor = (index + 1) % available;
        index
    }

    /// Apply feedback to the last topic and recompute the style.
    ///
    /// Returns `None` when there has been no conversation yet.
    pub fn record_feedback(&mut self, helpful: bool) -> Option<ResponseStyle> {
        let topic = self.last_topic?;
        let entry = self.feedback.entry(topic).or_default();
        if helpful {
            entry.helpful += 1;
        } else {
            entry.unhelpful += 1;
        }

        let (helpful, unhelpful) = self
            .feedback
            .values()
            .fold((0u32, 0u32), |(h, u), f| (h + f.helpful, u + f.unhelpful));
        self.style = if unhelpful > helpful {
            ResponseStyle::Direct
        } else {
            ResponseStyle::Gentle
        };
        Some(self.style)
    }

    /// Most discussed recallable topic, if it has come up often enough.
    pub fn favorite_topic(&self) -> Option<Topic> {
        self.topic_counts
            .iter()
            .filter(|(topic, count)| topic.is_recallable() && **count >= RECALL_THRESHOLD)
            .max_by_key(|(_, count)| **count)
            .map(|(topic, _)| *topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::reflect::tokenize;

    #[test]
    fn test_extract_name() {
        assert_eq!(
            TrainingData::extract_name(&tokenize("Hi, my name is jordan")),
            Some("Jordan".to_string())
        );
        assert_eq!(
            TrainingData::extract_name(&tokenize("please call me Ash.")),
            Some("Ash".to_string())
        );
        assert_eq!(TrainingData::extract_name(&tokenize("my name is")), None);
        assert_eq!(TrainingData::extract_name(&tokenize("my name is r2d2")), None);
        assert_eq!(TrainingData::extract_name(&tokenize("I feel fine")), None);
    }

    #[test]
    fn test_rotation_cycles() {
        let mut data = TrainingData::default();
        let picks: Vec<usize> = (0..5).map(|_| data.next_index(Topic::Stress, 2)).collect();
        assert_eq!(picks, vec![0, 1, 0, 1, 0]);
        assert_eq!(data.next_index(Topic::Sleep, 3), 0);
    }

    #[test]
    fn test_feedback_switches_style() {
        let mut data = TrainingData::default();
        assert_eq!(data.record_feedback(false), None);

        data.observe(Topic::Work);
        assert_eq!(data.record_feedback(false), Some(ResponseStyle::Direct));
        assert_eq!(data.record_feedback(true), Some(ResponseStyle::Gentle));
        assert_eq!(data.feedback[&Topic::Work], FeedbackCount { helpful: 1, unhelpful: 1 });
    }

    #[test]
    fn test_favorite_topic_needs_repeats() {
        let mut data = TrainingData::default();
        data.observe(Topic::Sleep);
        data.observe(Topic::Greeting);
        data.observe(Topic::Greeting);
        data.observe(Topic::Greeting);
        assert_eq!(data.favorite_topic(), None);

        data.observe(Topic::Sleep);
        data.observe(Topic::Sleep);
        assert_eq!(data.favorite_topic(), Some(Topic::Sleep));
        assert_eq!(data.message_count, 6);
    }

    #[test]
    fn test_training_data_json_shape() {
        let mut data = TrainingData::default();
        data.observe(Topic::Anxiety);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["topic_counts"]["anxiety"], 1);
        assert_eq!(json["style"], "gentle");

        let back: TrainingData = serde_json::from_value(json).unwrap();
        assert_eq!(back, data);
    }
}
