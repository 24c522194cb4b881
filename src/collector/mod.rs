//! Event collection for the neuro-adaptive engine.
//!
//! Events arrive from front-ends as JSON lines; this module defines the
//! privacy-preserving event types and the sources that read them.

pub mod replay;
pub mod types;

// Re-export commonly used types
pub use replay::{parse_events, CollectorError, ReplayCollector};
pub use types::{KeyboardEvent, MouseEvent, MouseEventType, SensorEvent};
