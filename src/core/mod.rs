//! Core detection pipeline.
//!
//! This module contains:
//! - Rolling buffers of keystroke intervals and mouse magnitudes
//! - Metric computation from those buffers
//! - The heuristic classifier and majority-vote smoother
//! - The engine that ties them together

pub mod buffers;
pub mod classifier;
pub mod engine;
pub mod features;
pub mod smoothing;

// Re-export commonly used types
pub use buffers::{InteractionBuffers, RollingBuffer};
pub use classifier::{classify, Classification, CognitiveLoad, EmotionalState, Signal};
pub use engine::{EmotionDetectionEngine, EmotionReading};
pub use features::{compute_metrics, InteractionMetrics, TypingRhythm};
pub use smoothing::StateSmoother;
