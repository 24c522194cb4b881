//! Topics and the hand-authored response bank.
//!
//! Templates may contain `{reflect}` (the user's message with pronouns
//! swapped) and `{name}` (", Name" once a name is known, otherwise empty).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversation topic detected from a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Crisis,
    Introduction,
    Anxiety,
    Stress,
    Sadness,
    Anger,
    Loneliness,
    Sleep,
    Work,
    Relationships,
    Gratitude,
    Thanks,
    Greeting,
    Farewell,
    Fallback,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Crisis => "crisis",
            Topic::Introduction => "introduction",
            Topic::Anxiety => "anxiety",
            Topic::Stress => "stress",
            Topic::Sadness => "sadness",
            Topic::Anger => "anger",
            Topic::Loneliness => "loneliness",
            Topic::Sleep => "sleep",
            Topic::Work => "work",
            Topic::Relationships => "relationships",
            Topic::Gratitude => "gratitude",
            Topic::Thanks => "thanks",
            Topic::Greeting => "greeting",
            Topic::Farewell => "farewell",
            Topic::Fallback => "fallback",
        }
    }

    /// Topics worth bringing back up in later conversations.
    pub fn is_recallable(&self) -> bool {
        !matches!(
            self,
            Topic::Crisis
                | Topic::Introduction
                | Topic::Thanks
                | Topic::Greeting
                | Topic::Farewell
                | Topic::Fallback
        )
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword rule for one topic. Entries with spaces are matched as phrases.
pub(crate) struct TopicRule {
    pub topic: Topic,
    pub keywords: &'static [&'static str],
}

/// Keyword cascade, checked in order. Crisis always comes first.
/// Introduction is detected separately from name phrases.
pub(crate) const TOPIC_RULES: &[TopicRule] = &[
    TopicRule {
        topic: Topic::Crisis,
        keywords: &[
            "suicide",
            "suicidal",
            "kill myself",
            "end my life",
            "self harm",
            "hurt myself",
            "want to die",
            "no reason to live",
        ],
    },
    TopicRule {
        topic: Topic::Anxiety,
        keywords: &[
            "anxious", "anxiety", "worried", "worry", "nervous", "panic", "scared", "afraid",
            "on edge",
        ],
    },
    TopicRule {
        topic: Topic::Stress,
        keywords: &[
            "stressed",
            "stress",
            "overwhelmed",
            "pressure",
            "too much",
            "burnout",
            "burned out",
        ],
    },
    TopicRule {
        topic: Topic::Sadness,
        keywords: &[
            "sad", "down", "depressed", "unhappy", "crying", "cry", "hopeless", "empty",
        ],
    },
    TopicRule {
        topic: Topic::Anger,
        keywords: &["angry", "mad", "furious", "frustrated", "annoyed", "irritated"],
    },
    TopicRule {
        topic: Topic::Loneliness,
        keywords: &["lonely", "alone", "isolated", "no friends", "nobody"],
    },
    TopicRule {
        topic: Topic::Sleep,
        keywords: &["sleep", "insomnia", "tired", "exhausted", "can't sleep", "awake"],
    },
    TopicRule {
        topic: Topic::Work,
        keywords: &["work", "job", "boss", "deadline", "career", "meeting", "coworker"],
    },
    TopicRule {
        topic: Topic::Relationships,
        keywords: &[
            "partner",
            "relationship",
            "boyfriend",
            "girlfriend",
            "husband",
            "wife",
            "family",
            "friend",
            "breakup",
        ],
    },
    TopicRule {
        topic: Topic::Gratitude,
        keywords: &[
            "grateful",
            "gratitude",
            "thankful",
            "blessed",
            "happy",
            "good day",
            "great day",
        ],
    },
    TopicRule {
        topic: Topic::Thanks,
        keywords: &["thanks", "thank you", "thx"],
    },
    TopicRule {
        topic: Topic::Greeting,
        keywords: &[
            "hello",
            "hi",
            "hey",
            "good morning",
            "good afternoon",
            "good evening",
        ],
    },
    TopicRule {
        topic: Topic::Farewell,
        keywords: &["bye", "goodbye", "good night", "see you"],
    },
];

/// Find the first topic whose keywords appear in the tokenized message.
pub(crate) fn match_topic(tokens: &[String]) -> Topic {
    let padded = format!(" {} ", tokens.join(" "));
    TOPIC_RULES
        .iter()
        .find(|rule| {
            rule.keywords.iter().any(|keyword| {
                if keyword.contains(' ') {
                    padded.contains(&format!(" {keyword} "))
                } else {
                    tokens.iter().any(|t| t == keyword)
                }
            })
        })
        .map(|rule| rule.topic)
        .unwrap_or(Topic::Fallback)
}

/// Response templates for a topic in each style.
pub(crate) struct TopicResponses {
    pub gentle: &'static [&'static str],
    pub direct: &'static [&'static str],
}

pub(crate) const CRISIS_RESPONSE: &str = "I'm really glad you told me. You deserve support right now from a person who can help. \
If you are in danger, please contact your local emergency number, or reach a crisis line such as 988 (US) or your country's equivalent. \
I'm still here to keep talking with you.";

pub(crate) fn responses_for(topic: Topic) -> TopicResponses {
    match topic {
        Topic::Crisis => TopicResponses {
            gentle: &[CRISIS_RESPONSE],
            direct: &[CRISIS_RESPONSE],
        },
        Topic::Introduction => TopicResponses {
            gentle: &["It's lovely to meet you{name}. How are you feeling today?"],
            direct: &["Nice to meet you{name}. What's on your mind?"],
        },
        Topic::Anxiety => TopicResponses {
            gentle: &[
                "It sounds like {reflect}. That can feel heavy{name}. Would a short grounding exercise help?",
                "Anxiety can be exhausting{name}. Try naming five things you can see right now. What's worrying you most?",
            ],
            direct: &[
                "Try box breathing: 4 seconds in, hold 4, out 4, hold 4. What's the main worry?",
                "Write the worry down and ask what's in your control today.",
            ],
        },
        Topic::Stress => TopicResponses {
            gentle: &[
                "I hear that {reflect}{name}. What's one small thing we could take off your plate?",
                "Stress builds up quietly. Would it help to break things into smaller steps together?",
            ],
            direct: &[
                "List your three most urgent tasks and pick one to start with.",
                "Take a five minute break away from the screen, then tackle the smallest task first.",
            ],
        },
        Topic::Sadness => TopicResponses {
            gentle: &[
                "I'm sorry you're going through this{name}. When you say {reflect}, what does that feel like?",
                "It's okay to feel down. I'm here to listen for as long as you need.",
            ],
            direct: &[
                "Is there one person you could reach out to today?",
                "A short walk or some daylight can shift things a little. Could you try that?",
            ],
        },
        Topic::Anger => TopicResponses {
            gentle: &[
                "That sounds really frustrating{name}. What happened?",
                "Anger often points at something that matters to you. What feels unfair here?",
            ],
            direct: &[
                "Step away for a few minutes before responding to anyone.",
                "Name what you need from the situation in one sentence.",
            ],
        },
        Topic::Loneliness => TopicResponses {
            gentle: &[
                "Feeling alone is hard{name}. I'm glad you're talking to me. Who do you miss most?",
                "You're not alone in feeling this way. What kind of connection would feel good right now?",
            ],
            direct: &[
                "Send a short message to someone you haven't talked to in a while.",
                "Consider a group activity this week, even a small one.",
            ],
        },
        Topic::Sleep => TopicResponses {
            gentle: &[
                "Rest matters so much{name}. How has your sleep been lately?",
                "Being tired makes everything harder. Would a wind-down routine tonight help?",
            ],
            direct: &[
                "Put screens away 30 minutes before bed and keep the same wake time.",
                "Try a 10 minute body scan before sleeping.",
            ],
        },
        Topic::Work => TopicResponses {
            gentle: &[
                "Work can take a lot out of us{name}. What's been the hardest part?",
                "It sounds like {reflect}. How are you looking after yourself through it?",
            ],
            direct: &[
                "Block 25 minutes of focus time and silence notifications.",
                "Write down what's expected of you this week and check it with your manager.",
            ],
        },
        Topic::Relationships => TopicResponses {
            gentle: &[
                "Relationships can bring up so much{name}. How are you feeling about it?",
                "It sounds like {reflect}. What would you like to happen?",
            ],
            direct: &[
                "Try telling them how you feel using an 'I feel' statement.",
                "Decide what you need from this relationship and say it plainly.",
            ],
        },
        Topic::Gratitude => TopicResponses {
            gentle: &[
                "That's wonderful to hear{name}! What made it feel good?",
                "I love that. Want to save it in your journal so you can come back to it?",
            ],
            direct: &[
                "Great. Note it in your journal.",
                "Nice. What's one thing that contributed to it?",
            ],
        },
        Topic::Thanks => TopicResponses {
            gentle: &["You're very welcome{name}. I'm here whenever you need me."],
            direct: &["Anytime."],
        },
        Topic::Greeting => TopicResponses {
            gentle: &[
                "Hi{name}! How are you feeling today?",
                "Hello{name}, it's good to see you. What's on your mind?",
            ],
            direct: &["Hi{name}. What would you like to talk about?"],
        },
        Topic::Farewell => TopicResponses {
            gentle: &["Take care of yourself{name}. I'm here whenever you want to talk."],
            direct: &["Bye{name}. Come back anytime."],
        },
        Topic::Fallback => TopicResponses {
            gentle: &[
                "Tell me more about that{name}.",
                "I'm listening. How does that make you feel?",
                "When you say {reflect}, what do you mean?",
            ],
            direct: &[
                "Can you say a bit more?",
                "What would help most right now?",
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::reflect::tokenize;

    #[test]
    fn test_match_topic_words_and_phrases() {
        assert_eq!(match_topic(&tokenize("I'm so anxious today")), Topic::Anxiety);
        assert_eq!(match_topic(&tokenize("There's just too much going on")), Topic::Stress);
        assert_eq!(match_topic(&tokenize("Thank you!")), Topic::Thanks);
        assert_eq!(match_topic(&tokenize("The weather is nice")), Topic::Fallback);
    }

    #[test]
    fn test_words_match_whole_tokens_only() {
        // "this" contains "hi", "sadly" is not "sad"
        assert_eq!(match_topic(&tokenize("this sadly")), Topic::Fallback);
    }

    #[test]
    fn test_crisis_wins_over_everything() {
        let tokens = tokenize("Hi, work is awful and I want to die");
        assert_eq!(match_topic(&tokens), Topic::Crisis);
    }

    #[test]
    fn test_every_topic_has_responses() {
        for rule in TOPIC_RULES {
            let responses = responses_for(rule.topic);
            assert!(!responses.gentle.is_empty());
            assert!(!responses.direct.is_empty());
        }
        assert!(!responses_for(Topic::Fallback).gentle.is_empty());
        assert!(!responses_for(Topic::Introduction).gentle.is_empty());
    }
}
