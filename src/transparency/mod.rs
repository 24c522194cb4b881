//! Transparency reporting.
//!
//! Tracks and exposes what the engine processes and concludes, so users can
//! see exactly what is collected.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log, create_shared_log_with_persistence, SharedTransparencyLog, TransparencyLog,
    TransparencyStats,
};
