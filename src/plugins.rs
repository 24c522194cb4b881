//! Bundled plugin catalog and subscription tiers.
//!
//! Plugins are features compiled into the product and switched on per user;
//! nothing is loaded dynamically. Each plugin requires a minimum tier.

use crate::store::{JsonStore, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Store key for plugin state.
pub const PLUGINS_KEY: &str = "plugins";

/// Subscription tiers, ordered from least to most access.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Premium,
    Pro,
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Premium => "premium",
            SubscriptionTier::Pro => "pro",
        })
    }
}

impl FromStr for SubscriptionTier {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(SubscriptionTier::Free),
            "premium" => Ok(SubscriptionTier::Premium),
            "pro" => Ok(SubscriptionTier::Pro),
            other => Err(PluginError::UnknownTier(other.to_string())),
        }
    }
}

/// A bundled plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub min_tier: SubscriptionTier,
}

/// Everything shipped with the product.
pub const CATALOG: &[PluginInfo] = &[
    PluginInfo {
        id: "breathing-coach",
        name: "Breathing Coach",
        description: "Guided breathing prompts when stress is detected",
        min_tier: SubscriptionTier::Free,
    },
    PluginInfo {
        id: "mood-journal",
        name: "Mood Journal",
        description: "Daily mood check-ins with trend summaries",
        min_tier: SubscriptionTier::Free,
    },
    PluginInfo {
        id: "focus-mode",
        name: "Focus Mode",
        description: "Mutes notifications while focus is detected",
        min_tier: SubscriptionTier::Premium,
    },
    PluginInfo {
        id: "mind-map",
        name: "Mind Map",
        description: "Visual map of recurring journal themes",
        min_tier: SubscriptionTier::Premium,
    },
    PluginInfo {
        id: "sensory-expansion",
        name: "Sensory Expansion",
        description: "Ambient soundscapes that follow the detected state",
        min_tier: SubscriptionTier::Pro,
    },
    PluginInfo {
        id: "companion-insights",
        name: "Companion Insights",
        description: "Weekly summary of conversations with the companion",
        min_tier: SubscriptionTier::Pro,
    },
];

/// Look up a plugin by id.
pub fn find_plugin(id: &str) -> Option<&'static PluginInfo> {
    CATALOG.iter().find(|p| p.id == id)
}

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("Unknown subscription tier: {0}")]
    UnknownTier(String),

    #[error("Plugin {plugin} requires the {required} tier (current: {current})")]
    TierTooLow {
        plugin: String,
        required: SubscriptionTier,
        current: SubscriptionTier,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persisted per-user plugin state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct PluginState {
    tier: SubscriptionTier,
    enabled: BTreeSet<String>,
}

/// Per-user plugin toggles.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    state: PluginState,
    store: Option<JsonStore>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(store: JsonStore) -> Result<Self, PluginError> {
        let state = store.read_or_default(PLUGINS_KEY)?;
        Ok(Self {
            state,
            store: Some(store),
        })
    }

    pub fn save(&self) -> Result<(), PluginError> {
        if let Some(ref store) = self.store {
            store.write_json(PLUGINS_KEY, &self.state)?;
        }
        Ok(())
    }

    pub fn catalog(&self) -> &'static [PluginInfo] {
        CATALOG
    }

    pub fn tier(&self) -> SubscriptionTier {
        self.state.tier
    }

    /// Change tier. Returns the ids of plugins disabled by a downgrade.
    pub fn set_tier(&mut self, tier: SubscriptionTier) -> Vec<String> {
        self.state.tier = tier;
        let disabled: Vec<String> = self
            .state
            .enabled
            .iter()
            .filter(|id| find_plugin(id).map_or(true, |p| p.min_tier > tier))
            .cloned()
            .collect();
        for id in &disabled {
            self.state.enabled.remove(id);
        }
        disabled
    }

    /// Enable a plugin the current tier allows.
    pub fn enable(&mut self, id: &str) -> Result<&'static PluginInfo, PluginError> {
        let plugin = find_plugin(id).ok_or_else(|| PluginError::UnknownPlugin(id.to_string()))?;
        if plugin.min_tier > self.state.tier {
            return Err(PluginError::TierTooLow {
                plugin: id.to_string(),
                required: plugin.min_tier,
                current: self.state.tier,
            });
        }
        self.state.enabled.insert(plugin.id.to_string());
        Ok(plugin)
    }

    /// Disable a plugin. Returns whether it was enabled.
    pub fn disable(&mut self, id: &str) -> Result<bool, PluginError> {
        if find_plugin(id).is_none() {
            return Err(PluginError::UnknownPlugin(id.to_string()));
        }
        Ok(self.state.enabled.remove(id))
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.state.enabled.contains(id)
    }

    /// Enabled plugins in catalog order.
    pub fn enabled(&self) -> Vec<&'static PluginInfo> {
        CATALOG
            .iter()
            .filter(|p| self.state.enabled.contains(p.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::temp_store;

    #[test]
    fn test_tier_parsing_and_order() {
        assert_eq!("Premium".parse::<SubscriptionTier>().unwrap(), SubscriptionTier::Premium);
        assert!("gold".parse::<SubscriptionTier>().is_err());
        assert!(SubscriptionTier::Free < SubscriptionTier::Premium);
        assert!(SubscriptionTier::Premium < SubscriptionTier::Pro);
    }

    #[test]
    fn test_enable_respects_tier() {
        let mut registry = PluginRegistry::new();
        registry.enable("breathing-coach").unwrap();
        assert!(matches!(
            registry.enable("focus-mode"),
            Err(PluginError::TierTooLow { .. })
        ));
        assert!(matches!(
            registry.enable("nope"),
            Err(PluginError::UnknownPlugin(_))
        ));

        registry.set_tier(SubscriptionTier::Premium);
        registry.enable("focus-mode").unwrap();
        let ids: Vec<&str> = registry.enabled().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["breathing-coach", "focus-mode"]);
    }

    #[test]
    fn test_downgrade_disables_plugins() {
        let mut registry = PluginRegistry::new();
        registry.set_tier(SubscriptionTier::Pro);
        registry.enable("sensory-expansion").unwrap();
        registry.enable("mood-journal").unwrap();

        let disabled = registry.set_tier(SubscriptionTier::Free);
        assert_eq!(disabled, vec!["sensory-expansion".to_string()]);
        assert!(registry.is_enabled("mood-journal"));
        assert!(!registry.is_enabled("sensory-expansion"));
    }

    #[test]
    fn test_disable_and_persist() {
        let store = temp_store("plugins");
        let mut registry = PluginRegistry::load(store.clone()).unwrap();
        registry.set_tier(SubscriptionTier::Premium);
        registry.enable("mind-map").unwrap();
        registry.enable("mood-journal").unwrap();
        assert!(registry.disable("mood-journal").unwrap());
        assert!(!registry.disable("mood-journal").unwrap());
        registry.save().unwrap();

        let reloaded = PluginRegistry::load(store.clone()).unwrap();
        assert_eq!(reloaded.tier(), SubscriptionTier::Premium);
        assert!(reloaded.is_enabled("mind-map"));
        assert!(!reloaded.is_enabled("mood-journal"));

        let _ = std::fs::remove_dir_all(store.root());
    }
}
