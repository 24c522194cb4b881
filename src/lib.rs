//! Neuro-adaptive engine - privacy-first emotion detection from interaction rhythm.
//!
//! This library infers a coarse emotional state and cognitive load from the
//! timing of keystrokes and the magnitude of mouse movements, and turns the
//! result into UI adaptation hints and companion replies.
//!
//! # Privacy Guarantees
//!
//! - **No key content**: only keystroke timing and a correction flag are kept
//! - **No coordinates**: only movement magnitude is kept
//! - **Bounded memory**: rolling buffers hold the most recent samples only
//! - **Transparency**: all processing is counted and auditable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Neuro-adaptive Engine                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐         │
//! │  │  Collector  │──▶│   Buffers   │──▶│   Metrics   │         │
//! │  │  (JSONL)    │   │  (rolling)  │   │  (compute)  │         │
//! │  └─────────────┘   └─────────────┘   └─────────────┘         │
//! │         │                                    │                │
//! │         ▼                                    ▼                │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐         │
//! │  │Transparency │   │  Smoother   │◀──│ Classifier  │         │
//! │  │    Log      │   │ (majority)  │   │ (heuristic) │         │
//! │  └─────────────┘   └─────────────┘   └─────────────┘         │
//! │                           │                                   │
//! │                           ▼                                   │
//! │             ┌──────────────────────────┐                      │
//! │             │ Adaptive UI · Companion  │                      │
//! │             └──────────────────────────┘                      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use neuroadaptive_engine::{DetectorConfig, EmotionDetectionEngine, UiAdaptation};
//!
//! let mut engine = EmotionDetectionEngine::new(DetectorConfig::default());
//! let start = Utc::now();
//! for i in 0..30 {
//!     engine.record_keystroke_at(start + Duration::milliseconds(i * 200), false);
//! }
//!
//! let reading = engine.detect();
//! let hints = UiAdaptation::for_reading(&reading);
//! println!("{} ({:.2}) -> {:?}", reading.state, reading.confidence, hints.theme);
//! ```

pub mod adaptive;
pub mod collector;
pub mod companion;
pub mod config;
pub mod core;
pub mod journal;
pub mod plugins;
pub mod store;
pub mod transparency;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use adaptive::{Theme, UiAdaptation};
pub use collector::{parse_events, CollectorError, ReplayCollector, SensorEvent};
pub use companion::{Companion, CompanionError, CompanionReply, Topic};
pub use config::{Config, DetectorConfig, SourceConfig, Thresholds};
pub use core::{
    classify, compute_metrics, CognitiveLoad, EmotionDetectionEngine, EmotionReading,
    EmotionalState, InteractionMetrics,
};
pub use journal::{JournalEntry, MoodJournal, MoodSummary};
pub use plugins::{PluginRegistry, SubscriptionTier};
pub use store::{JsonStore, StoreError};
pub use transparency::{SharedTransparencyLog, TransparencyLog, TransparencyStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Privacy declaration that can be displayed to users.
pub const PRIVACY_DECLARATION: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║          NEUROADAPTIVE ENGINE - PRIVACY DECLARATION              ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This engine estimates how you are doing from interaction        ║
║  rhythm, so the interface can adapt to you.                      ║
║                                                                  ║
║  ✓ WHAT WE USE:                                                  ║
║    • When keys are pressed (timing only)                         ║
║    • Whether a key was a correction (backspace/delete)           ║
║    • How far the mouse moves (magnitude only)                    ║
║                                                                  ║
║  ✗ WHAT WE NEVER CAPTURE:                                        ║
║    • Which keys you press (no passwords, messages, etc.)         ║
║    • Where your cursor is (no screen position tracking)          ║
║    • What applications you use                                   ║
║    • Any screen content                                          ║
║                                                                  ║
║  All data is processed locally. Only the most recent samples     ║
║  are kept in memory, and readings are heuristic estimates,       ║
║  not medical or psychological assessments.                       ║
║                                                                  ║
║  You can view processing statistics anytime with:                ║
║    neuroadaptive status                                          ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
