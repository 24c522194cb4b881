//! Rule-based chat companion.
//!
//! A keyword cascade picks a topic, a hand-authored bank supplies the reply,
//! and [`TrainingData`] personalizes it (name, style, response rotation).
//! When a confident emotion reading is available the reply opens by
//! acknowledging it.

pub mod reflect;
pub mod responses;
pub mod training;

use crate::adaptive::MIN_ADAPTATION_CONFIDENCE;
use crate::core::classifier::EmotionalState;
use crate::core::engine::EmotionReading;
use crate::store::{JsonStore, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use reflect::{reflect, tokenize};
pub use responses::Topic;
pub use training::{FeedbackCount, ResponseStyle, TrainingData};

/// Store key for persisted training data.
pub const TRAINING_KEY: &str = "companion_training";

/// Errors from the companion.
#[derive(Debug, Error)]
pub enum CompanionError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("No conversation to give feedback on yet")]
    NoConversation,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A companion reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionReply {
    pub topic: Topic,
    pub message: String,
    pub style: ResponseStyle,
    /// Emotional state acknowledged in the reply, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledged_state: Option<EmotionalState>,
    /// Name learned from this message, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learned_name: Option<String>,
}

/// The chat companion with its personalization state.
#[derive(Debug, Clone, Default)]
pub struct Companion {
    training: TrainingData,
    store: Option<JsonStore>,
}

impl Companion {
    /// An in-memory companion with no persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load training data from a store; `save` writes it back there.
    pub fn load(store: JsonStore) -> Result<Self, CompanionError> {
        let training = store.read_or_default(TRAINING_KEY)?;
        Ok(Self {
            training,
            store: Some(store),
        })
    }

    pub fn training(&self) -> &TrainingData {
        &self.training
    }

    /// Persist training data if this companion has a store.
    pub fn save(&self) -> Result<(), CompanionError> {
        if let Some(ref store) = self.store {
            store.write_json(TRAINING_KEY, &self.training)?;
        }
        Ok(())
    }

    /// Respond to a message, optionally aware of the user's current reading.
    pub fn respond(
        &mut self,
        message: &str,
        reading: Option<&EmotionReading>,
    ) -> Result<CompanionReply, CompanionError> {
        let tokens = tokenize(message);
        if tokens.is_empty() {
            return Err(CompanionError::EmptyMessage);
        }

        let learned_name = TrainingData::extract_name(&tokens);
        if let Some(ref name) = learned_name {
            self.training.user_name = Some(name.clone());
        }

        let mut topic = responses::match_topic(&tokens);
        if learned_name.is_some() && matches!(topic, Topic::Greeting | Topic::Fallback) {
            topic = Topic::Introduction;
        }

        let style = self.training.style;
        if topic == Topic::Crisis {
            self.training.observe(topic);
            tracing::debug!(%topic, "crisis reply");
            return Ok(CompanionReply {
                topic,
                message: responses::CRISIS_RESPONSE.to_string(),
                style,
                acknowledged_state: None,
                learned_name,
            });
        }

        let mut body = self.compose(topic, message, style);

        if topic == Topic::Fallback {
            if let Some(favorite) = self.training.favorite_topic() {
                body.push_str(&format!(
                    " We've talked about {favorite} a few times. Is that still on your mind?"
                ));
            }
        }

        let acknowledged_state = match reading {
            Some(r) if r.state.is_strained() && r.confidence >= MIN_ADAPTATION_CONFIDENCE => {
                state_opener(r.state).map(|opener| {
                    body = format!("{opener} {body}");
                    r.state
                })
            }
            _ => None,
        };

        self.training.observe(topic);
        tracing::debug!(%topic, ?style, "companion reply");

        Ok(CompanionReply {
            topic,
            message: body,
            style,
            acknowledged_state,
            learned_name,
        })
    }

    /// Apply feedback about the last reply.
    pub fn feedback(&mut self, helpful: bool) -> Result<ResponseStyle, CompanionError> {
        self.training
            .record_feedback(helpful)
            .ok_or(CompanionError::NoConversation)
    }

    fn compose(&mut self, topic: Topic, message: &str, style: ResponseStyle) -> String {
        let bank = responses::responses_for(topic);
        let templates = match style {
            ResponseStyle::Gentle => bank.gentle,
            ResponseStyle::Direct => bank.direct,
        };
        let index = self.training.next_index(topic, templates.len());
        let template = templates.get(index).copied().unwrap_or_default();

        let name = self
            .training
            .user_name
            .as_ref()
            .map(|n| format!(", {n}"))
            .unwrap_or_default();

        template
            .replace("{reflect}", &reflect(message))
            .replace("{name}", &name)
    }
}

/// Opening line acknowledging a strained state.
fn state_opener(state: EmotionalState) -> Option<&'static str> {
    match state {
        EmotionalState::Stressed => Some("I notice your typing looks a bit rushed."),
        EmotionalState::Anxious => Some("Your rhythm suggests some restlessness."),
        EmotionalState::Fatigued => Some("It looks like you might be running low on energy."),
        _ => None,
    }
}
