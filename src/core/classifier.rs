//! Heuristic emotional-state classifier.
//!
//! Metrics are turned into a set of boolean [`Signal`]s. Each state owns a
//! rule (a list of signals and a threshold); rules are checked in a fixed
//! priority order and the first rule whose fired-signal count reaches its
//! threshold decides the state. Nothing here is learned.

use crate::config::DetectorConfig;
use crate::core::features::{InteractionMetrics, TypingRhythm};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Heuristic emotional state labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    Calm,
    Anxious,
    Focused,
    Stressed,
    Excited,
    Fatigued,
    Neutral,
}

impl EmotionalState {
    /// All states, in classification priority order.
    pub const ALL: [EmotionalState; 7] = [
        EmotionalState::Stressed,
        EmotionalState::Anxious,
        EmotionalState::Fatigued,
        EmotionalState::Focused,
        EmotionalState::Excited,
        EmotionalState::Calm,
        EmotionalState::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionalState::Calm => "calm",
            EmotionalState::Anxious => "anxious",
            EmotionalState::Focused => "focused",
            EmotionalState::Stressed => "stressed",
            EmotionalState::Excited => "excited",
            EmotionalState::Fatigued => "fatigued",
            EmotionalState::Neutral => "neutral",
        }
    }

    /// Position in [`EmotionalState::ALL`].
    pub fn index(&self) -> usize {
        match self {
            EmotionalState::Stressed => 0,
            EmotionalState::Anxious => 1,
            EmotionalState::Fatigued => 2,
            EmotionalState::Focused => 3,
            EmotionalState::Excited => 4,
            EmotionalState::Calm => 5,
            EmotionalState::Neutral => 6,
        }
    }

    /// States that call for de-escalation in the UI and companion.
    pub fn is_strained(&self) -> bool {
        matches!(
            self,
            EmotionalState::Stressed | EmotionalState::Anxious | EmotionalState::Fatigued
        )
    }
}

impl fmt::Display for EmotionalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse cognitive load bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CognitiveLoad {
    Low,
    Medium,
    High,
}

impl fmt::Display for CognitiveLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CognitiveLoad::Low => "low",
            CognitiveLoad::Medium => "medium",
            CognitiveLoad::High => "high",
        })
    }
}

/// A boolean heuristic derived from interaction metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    ErraticRhythm,
    SlowRhythm,
    RapidRhythm,
    SteadyRhythm,
    HighErrorRate,
    ElevatedErrorRate,
    LowErrorRate,
    FrequentPauses,
    SustainedFlow,
    ErraticMouse,
    SteadyMouse,
    FastMouse,
    SlowMouse,
    Fidgeting,
}

/// A state's firing rule.
struct StateRule {
    state: EmotionalState,
    signals: &'static [Signal],
    threshold: usize,
}

/// Rules in priority order. Neutral has no rule; it is the fallback.
const RULES: [StateRule; 6] = [
    StateRule {
        state: EmotionalState::Stressed,
        signals: &[
            Signal::ErraticRhythm,
            Signal::HighErrorRate,
            Signal::ErraticMouse,
            Signal::FastMouse,
            Signal::RapidRhythm,
        ],
        threshold: 3,
    },
    StateRule {
        state: EmotionalState::Anxious,
        signals: &[
            Signal::ErraticRhythm,
            Signal::FrequentPauses,
            Signal::Fidgeting,
            Signal::ElevatedErrorRate,
        ],
        threshold: 2,
    },
    StateRule {
        state: EmotionalState::Fatigued,
        signals: &[
            Signal::SlowRhythm,
            Signal::FrequentPauses,
            Signal::SlowMouse,
            Signal::ElevatedErrorRate,
        ],
        threshold: 2,
    },
    StateRule {
        state: EmotionalState::Focused,
        signals: &[
            Signal::SteadyRhythm,
            Signal::LowErrorRate,
            Signal::SustainedFlow,
            Signal::SteadyMouse,
        ],
        threshold: 3,
    },
    StateRule {
        state: EmotionalState::Excited,
        signals: &[Signal::RapidRhythm, Signal::FastMouse, Signal::SustainedFlow],
        threshold: 2,
    },
    StateRule {
        state: EmotionalState::Calm,
        signals: &[
            Signal::SteadyRhythm,
            Signal::SlowMouse,
            Signal::SteadyMouse,
            Signal::LowErrorRate,
        ],
        threshold: 3,
    },
];

/// Signals that contribute to cognitive load.
const LOAD_SIGNALS: [Signal; 5] = [
    Signal::ErraticRhythm,
    Signal::FrequentPauses,
    Signal::HighErrorRate,
    Signal::ErraticMouse,
    Signal::Fidgeting,
];

/// Result of classifying one set of metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub state: EmotionalState,
    pub cognitive_load: CognitiveLoad,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Signals that fired, in evaluation order
    pub signals: Vec<Signal>,
}

impl Classification {
    /// The result when there is nothing to go on.
    pub fn no_data() -> Self {
        Self {
            state: EmotionalState::Neutral,
            cognitive_load: CognitiveLoad::Low,
            confidence: 0.0,
            signals: Vec::new(),
        }
    }
}

/// Evaluate which signals fire for the given metrics.
pub fn evaluate_signals(metrics: &InteractionMetrics, config: &DetectorConfig) -> Vec<Signal> {
    let t = &config.thresholds;
    let mut fired = Vec::new();

    if metrics.keyboard_ready {
        match metrics.rhythm {
            TypingRhythm::Erratic => fired.push(Signal::ErraticRhythm),
            TypingRhythm::Slow => fired.push(Signal::SlowRhythm),
            TypingRhythm::Rapid => fired.push(Signal::RapidRhythm),
            TypingRhythm::Steady => fired.push(Signal::SteadyRhythm),
            TypingRhythm::Unknown => {}
        }
        if metrics.error_rate > t.high_error_rate {
            fired.push(Signal::HighErrorRate);
        }
        if metrics.error_rate > t.elevated_error_rate {
            fired.push(Signal::ElevatedErrorRate);
        }
        if metrics.error_rate < t.low_error_rate {
            fired.push(Signal::LowErrorRate);
        }
        if metrics.pause_ratio > t.frequent_pause_ratio {
            fired.push(Signal::FrequentPauses);
        }
        if metrics.pause_ratio < t.sustained_flow_ratio {
            fired.push(Signal::SustainedFlow);
        }
    }

    if metrics.mouse_ready {
        if metrics.mouse_variation > t.erratic_mouse_variation {
            fired.push(Signal::ErraticMouse);
        }
        if metrics.mouse_variation < t.steady_mouse_variation {
            fired.push(Signal::SteadyMouse);
        }
        if metrics.mean_mouse_magnitude > t.fast_mouse_magnitude {
            fired.push(Signal::FastMouse);
        }
        if metrics.mean_mouse_magnitude < t.slow_mouse_magnitude {
            fired.push(Signal::SlowMouse);
        }
        if metrics.micro_movement_ratio > t.fidget_ratio {
            fired.push(Signal::Fidgeting);
        }
    }

    fired
}

/// Bucket cognitive load by how many load signals fired.
pub fn cognitive_load(signals: &[Signal]) -> CognitiveLoad {
    let count = LOAD_SIGNALS.iter().filter(|s| signals.contains(s)).count();
    match count {
        0 | 1 => CognitiveLoad::Low,
        2 => CognitiveLoad::Medium,
        _ => CognitiveLoad::High,
    }
}

/// Classify metrics into a state, cognitive load and confidence.
pub fn classify(metrics: &InteractionMetrics, config: &DetectorConfig) -> Classification {
    let usable = metrics.usable_samples();
    if usable == 0 {
        return Classification::no_data();
    }

    let signals = evaluate_signals(metrics, config);
    let coverage = (usable as f64 / config.full_confidence_samples as f64).min(1.0);

    let mut best_ratio: f64 = 0.0;
    let mut matched = None;
    for rule in &RULES {
        let fired = rule.signals.iter().filter(|s| signals.contains(s)).count();
        let ratio = fired as f64 / rule.signals.len() as f64;
        best_ratio = best_ratio.max(ratio);
        if matched.is_none() && fired >= rule.threshold {
            matched = Some((rule.state, ratio));
        }
    }

    let (state, confidence) = match matched {
        Some((state, ratio)) => (state, ratio * coverage),
        None => (EmotionalState::Neutral, (1.0 - best_ratio) * coverage),
    };

    Classification {
        state,
        cognitive_load: cognitive_load(&signals),
        confidence: confidence.clamp(0.0, 1.0),
        signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard_metrics(rhythm: TypingRhythm, error_rate: f64, pause_ratio: f64) -> InteractionMetrics {
        InteractionMetrics {
            keyboard_ready: true,
            keystroke_samples: 20,
            rhythm,
            error_rate,
            pause_ratio,
            ..Default::default()
        }
    }

    fn with_mouse(mut metrics: InteractionMetrics, mean: f64, variation: f64, micro: f64) -> InteractionMetrics {
        metrics.mouse_ready = true;
        metrics.mouse_samples = 20;
        metrics.mean_mouse_magnitude = mean;
        metrics.mouse_variation = variation;
        metrics.micro_movement_ratio = micro;
        metrics
    }

    #[test]
    fn test_no_data_is_neutral_with_zero_confidence() {
        let config = DetectorConfig::default();
        let result = classify(&InteractionMetrics::default(), &config);
        assert_eq!(result, Classification::no_data());
    }

    #[test]
    fn test_steady_typing_is_focused() {
        let config = DetectorConfig::default();
        let metrics = keyboard_metrics(TypingRhythm::Steady, 0.0, 0.0);
        let result = classify(&metrics, &config);

        assert_eq!(result.state, EmotionalState::Focused);
        assert_eq!(result.cognitive_load, CognitiveLoad::Low);
        // 3 of 4 focused signals, full coverage
        assert!((result.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_stressed_outranks_anxious() {
        let config = DetectorConfig::default();
        let metrics = with_mouse(
            keyboard_metrics(TypingRhythm::Erratic, 0.2, 0.0),
            60.0,
            1.4,
            0.1,
        );
        let result = classify(&metrics, &config);

        // Erratic rhythm + high errors + erratic mouse + fast mouse
        assert_eq!(result.state, EmotionalState::Stressed);
        assert!((result.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_erratic_with_errors_is_anxious() {
        let config = DetectorConfig::default();
        let metrics = keyboard_metrics(TypingRhythm::Erratic, 0.1, 0.0);
        let result = classify(&metrics, &config);
        assert_eq!(result.state, EmotionalState::Anxious);
    }

    #[test]
    fn test_slow_typing_with_sluggish_mouse_is_fatigued() {
        let config = DetectorConfig::default();
        let metrics = with_mouse(keyboard_metrics(TypingRhythm::Slow, 0.0, 0.1), 4.0, 0.3, 0.2);
        let result = classify(&metrics, &config);
        assert_eq!(result.state, EmotionalState::Fatigued);
    }

    #[test]
    fn test_rapid_typing_with_fast_mouse_is_excited() {
        let config = DetectorConfig::default();
        let metrics = with_mouse(keyboard_metrics(TypingRhythm::Rapid, 0.05, 0.1), 50.0, 0.7, 0.0);
        let result = classify(&metrics, &config);
        assert_eq!(result.state, EmotionalState::Excited);
    }

    #[test]
    fn test_mouse_only_calm() {
        let config = DetectorConfig::default();
        let metrics = with_mouse(InteractionMetrics::default(), 6.0, 0.2, 0.1);
        let signals = evaluate_signals(&metrics, &config);
        assert_eq!(signals, vec![Signal::SteadyMouse, Signal::SlowMouse]);

        // Two calm signals, below its threshold of three.
        let result = classify(&metrics, &config);
        assert_eq!(result.state, EmotionalState::Neutral);
    }

    #[test]
    fn test_calm_when_focus_rule_falls_short() {
        let config = DetectorConfig::default();
        // Steady but with some pauses: no sustained flow, so focused has only 2 of 3.
        let metrics = with_mouse(keyboard_metrics(TypingRhythm::Steady, 0.0, 0.1), 6.0, 0.6, 0.1);
        let result = classify(&metrics, &config);
        assert_eq!(result.state, EmotionalState::Calm);
    }

    #[test]
    fn test_neutral_confidence_reflects_weak_signals() {
        let config = DetectorConfig::default();
        let metrics = InteractionMetrics {
            keyboard_ready: true,
            keystroke_samples: 10,
            rhythm: TypingRhythm::Steady,
            error_rate: 0.05,
            pause_ratio: 0.1,
            ..Default::default()
        };
        let result = classify(&metrics, &config);

        assert_eq!(result.signals, vec![Signal::SteadyRhythm]);
        assert_eq!(result.state, EmotionalState::Neutral);
        // best ratio 1/4 (focused or calm), coverage 10/20
        assert!((result.confidence - 0.375).abs() < 1e-9);
    }

    #[test]
    fn test_cognitive_load_buckets() {
        assert_eq!(cognitive_load(&[Signal::SteadyRhythm]), CognitiveLoad::Low);
        assert_eq!(
            cognitive_load(&[Signal::ErraticRhythm, Signal::Fidgeting]),
            CognitiveLoad::Medium
        );
        assert_eq!(
            cognitive_load(&[Signal::ErraticRhythm, Signal::FrequentPauses, Signal::HighErrorRate]),
            CognitiveLoad::High
        );
    }

    #[test]
    fn test_priority_order_matches_all() {
        for (i, state) in EmotionalState::ALL.iter().enumerate() {
            assert_eq!(state.index(), i);
        }
        for (rule, state) in RULES.iter().zip(EmotionalState::ALL.iter()) {
            assert_eq!(rule.state, *state);
        }
    }
}
