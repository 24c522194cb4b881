//! Configuration for the neuro-adaptive engine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name used under the platform config and data directories.
const APP_DIR: &str = "neuroadaptive";

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emotion detector tuning
    pub detector: DetectorConfig,

    /// Which input sources feed the detector
    pub sources: SourceConfig,

    /// How often `watch` computes a reading
    #[serde(with = "duration_serde")]
    pub detect_interval: Duration,

    /// Path for persisted state (journal, companion training data, stats)
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);

        Self {
            detector: DetectorConfig::default(),
            sources: SourceConfig::default(),
            detect_interval: Duration::from_secs(5),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, falling back to defaults when absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.detector.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Configuration for which input sources to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub keyboard: bool,
    pub mouse: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            keyboard: true,
            mouse: true,
        }
    }
}

impl SourceConfig {
    /// Parse source configuration from a comma-separated string.
    pub fn from_csv(s: &str) -> Self {
        let sources: Vec<String> = s.split(',').map(|s| s.trim().to_lowercase()).collect();

        Self {
            keyboard: sources.iter().any(|s| s == "keyboard" || s == "all"),
            mouse: sources.iter().any(|s| s == "mouse" || s == "all"),
        }
    }

    /// Check if at least one source is enabled.
    pub fn any_enabled(&self) -> bool {
        self.keyboard || self.mouse
    }
}

/// Tuning for the emotion detector: buffer sizes, sample minimums and thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Maximum number of inter-keystroke intervals retained
    pub keystroke_buffer_size: usize,
    /// Maximum number of mouse movement magnitudes retained
    pub mouse_buffer_size: usize,
    /// Number of raw classifications in the majority vote
    pub smoothing_window: usize,
    /// Samples needed before a source contributes signals
    pub min_samples: usize,
    /// Total samples at which confidence is no longer scaled down
    pub full_confidence_samples: usize,
    /// Intervals longer than this count as pauses (ms)
    pub pause_threshold_ms: f64,
    /// Gaps longer than this are idle time, not typing (ms)
    pub idle_reset_ms: f64,
    pub thresholds: Thresholds,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            keystroke_buffer_size: 50,
            mouse_buffer_size: 50,
            smoothing_window: 5,
            min_samples: 5,
            full_confidence_samples: 20,
            pause_threshold_ms: 2_000.0,
            idle_reset_ms: 10_000.0,
            thresholds: Thresholds::default(),
        }
    }
}

impl DetectorConfig {
    /// Reject configurations the classifier cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        let t = &self.thresholds;

        if self.keystroke_buffer_size == 0 || self.mouse_buffer_size == 0 {
            return invalid("buffer sizes must be at least 1");
        }
        if self.smoothing_window == 0 {
            return invalid("smoothing_window must be at least 1");
        }
        if self.min_samples < 2 {
            return invalid("min_samples must be at least 2");
        }
        if self.full_confidence_samples == 0 {
            return invalid("full_confidence_samples must be at least 1");
        }
        if self.idle_reset_ms <= self.pause_threshold_ms {
            return invalid("idle_reset_ms must exceed pause_threshold_ms");
        }
        if t.rapid_interval_ms >= t.slow_interval_ms {
            return invalid("rapid_interval_ms must be below slow_interval_ms");
        }
        if !(t.low_error_rate < t.elevated_error_rate && t.elevated_error_rate < t.high_error_rate)
        {
            return invalid("error rate thresholds must satisfy low < elevated < high");
        }
        if t.sustained_flow_ratio >= t.frequent_pause_ratio {
            return invalid("sustained_flow_ratio must be below frequent_pause_ratio");
        }
        if t.steady_mouse_variation >= t.erratic_mouse_variation {
            return invalid("steady_mouse_variation must be below erratic_mouse_variation");
        }
        if t.slow_mouse_magnitude >= t.fast_mouse_magnitude {
            return invalid("slow_mouse_magnitude must be below fast_mouse_magnitude");
        }
        Ok(())
    }
}

/// Classifier cut-offs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Interval variance above which typing rhythm is erratic (ms²)
    pub erratic_variance: f64,
    /// Mean interval above which typing is slow (ms)
    pub slow_interval_ms: f64,
    /// Mean interval below which typing is rapid (ms)
    pub rapid_interval_ms: f64,
    pub high_error_rate: f64,
    pub elevated_error_rate: f64,
    pub low_error_rate: f64,
    pub frequent_pause_ratio: f64,
    pub sustained_flow_ratio: f64,
    /// Coefficient of variation of mouse magnitudes
    pub erratic_mouse_variation: f64,
    pub steady_mouse_variation: f64,
    pub fast_mouse_magnitude: f64,
    pub slow_mouse_magnitude: f64,
    /// Movements smaller than this are micro-adjustments
    pub micro_movement_magnitude: f64,
    pub fidget_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            erratic_variance: 60_000.0,
            slow_interval_ms: 450.0,
            rapid_interval_ms: 150.0,
            high_error_rate: 0.15,
            elevated_error_rate: 0.08,
            low_error_rate: 0.03,
            frequent_pause_ratio: 0.2,
            sustained_flow_ratio: 0.05,
            erratic_mouse_variation: 1.0,
            steady_mouse_variation: 0.5,
            fast_mouse_magnitude: 40.0,
            slow_mouse_magnitude: 8.0,
            micro_movement_magnitude: 3.0,
            fidget_ratio: 0.5,
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid detector config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_config_parsing() {
        let config = SourceConfig::from_csv("keyboard,mouse");
        assert!(config.keyboard);
        assert!(config.mouse);

        let config = SourceConfig::from_csv("keyboard");
        assert!(config.keyboard);
        assert!(!config.mouse);

        let config = SourceConfig::from_csv("all");
        assert!(config.any_enabled());

        let config = SourceConfig::from_csv("touchpad");
        assert!(!config.any_enabled());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.detect_interval, Duration::from_secs(5));
        assert_eq!(config.detector.smoothing_window, 5);
        assert!(config.detector.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{"detector":{"smoothing_window":3,"thresholds":{"fidget_ratio":0.7}}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.detector.smoothing_window, 3);
        assert_eq!(config.detector.keystroke_buffer_size, 50);
        assert_eq!(config.detector.thresholds.fidget_ratio, 0.7);
        assert_eq!(config.detector.thresholds.slow_interval_ms, 450.0);
        assert!(config.sources.mouse);

        let json = r#"{"sources":{"keyboard":false},"detector":{"min_samples":8}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(!config.sources.keyboard);
        assert!(config.sources.mouse);
        assert_eq!(config.detector.min_samples, 8);
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut detector = DetectorConfig::default();
        detector.thresholds.low_error_rate = 0.5;
        assert!(matches!(detector.validate(), Err(ConfigError::Invalid(_))));

        let mut detector = DetectorConfig::default();
        detector.keystroke_buffer_size = 0;
        assert!(detector.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir()
            .join(format!("neuroadaptive-config-{}", uuid::Uuid::new_v4()))
            .join("config.json");

        let mut config = Config::default();
        config.detect_interval = Duration::from_secs(12);
        config.sources.mouse = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.detect_interval, Duration::from_secs(12));
        assert!(!loaded.sources.mouse);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
