//! Strategy registry for dynamic strategy loading.

use crate::{
    HoldConfig, HoldStrategy, ScriptedConfig, ScriptedStrategy, SignalFileConfig,
    SignalFileStrategy,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use trading_core::{error::StrategyError, traits::SignalStrategy, traits::StrategyConfig};

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Strategy name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

impl StrategyInfo {
    fn new(name: &str, description: &str, default_config: impl Serialize) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            default_config: serde_json::to_value(default_config).unwrap_or_default(),
        }
    }
}

/// Registry for available strategies, keyed by the name used in
/// configuration files.
pub struct StrategyRegistry {
    strategies: BTreeMap<String, StrategyInfo>,
}

impl StrategyRegistry {
    /// Create a new strategy registry with all built-in strategies.
    pub fn new() -> Self {
        let mut strategies = BTreeMap::new();

        strategies.insert(
            "hold".to_string(),
            StrategyInfo::new(
                "Hold",
                "Never trades; emits HOLD once warmed up",
                HoldConfig::default(),
            ),
        );

        strategies.insert(
            "scripted".to_string(),
            StrategyInfo::new(
                "Scripted",
                "Replays a configured list of signals by candle index",
                ScriptedConfig::default(),
            ),
        );

        strategies.insert(
            "signal_file".to_string(),
            StrategyInfo::new(
                "Signal File",
                "Replays precomputed signals keyed by candle timestamp",
                SignalFileConfig::default(),
            ),
        );

        Self { strategies }
    }

    /// List all available strategies as `(key, info)`, sorted by key.
    pub fn list(&self) -> Vec<(&String, &StrategyInfo)> {
        self.strategies.iter().collect()
    }

    /// Get strategy info by name.
    pub fn get(&self, name: &str) -> Option<&StrategyInfo> {
        self.strategies.get(name)
    }

    /// Check if a strategy exists.
    pub fn exists(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Create a strategy instance from configuration.
    ///
    /// A `null` config means the strategy's defaults. Keys missing from an
    /// object config fall back to their defaults too.
    pub fn create(
        &self,
        name: &str,
        config: serde_json::Value,
    ) -> Result<Box<dyn SignalStrategy>, StrategyError> {
        match name {
            "hold" => {
                let config: HoldConfig = parse_config(config)?;
                config.validate()?;
                Ok(Box::new(HoldStrategy::new(config)))
            }
            "scripted" => {
                let config: ScriptedConfig = parse_config(config)?;
                config.validate()?;
                Ok(Box::new(ScriptedStrategy::from_config(config)))
            }
            "signal_file" => {
                let config: SignalFileConfig = parse_config(config)?;
                Ok(Box::new(SignalFileStrategy::load(config)?))
            }
            _ => Err(StrategyError::NotFound(name.to_string())),
        }
    }

    /// Create a strategy with default configuration.
    pub fn create_default(&self, name: &str) -> Result<Box<dyn SignalStrategy>, StrategyError> {
        let info = self
            .get(name)
            .ok_or_else(|| StrategyError::NotFound(name.to_string()))?;
        self.create(name, info.default_config.clone())
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_config<T: DeserializeOwned + Default>(
    value: serde_json::Value,
) -> Result<T, StrategyError> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|e| StrategyError::InvalidConfig(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use trading_core::types::{Candle, Signal};

    #[test]
    fn test_registry_list() {
        let registry = StrategyRegistry::new();
        let keys: Vec<&String> = registry.list().into_iter().map(|(k, _)| k).collect();

        assert_eq!(keys, vec!["hold", "scripted", "signal_file"]);
    }

    #[test]
    fn test_registry_get() {
        let registry = StrategyRegistry::new();

        assert!(registry.get("hold").is_some());
        assert!(registry.exists("signal_file"));
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_create_default() {
        let registry = StrategyRegistry::new();

        let strategy = registry.create_default("hold").unwrap();
        assert_eq!(strategy.name(), "hold");
        assert_eq!(strategy.warmup_period(), 1);
    }

    #[test]
    fn test_create_with_config() {
        let registry = StrategyRegistry::new();

        let config = serde_json::json!({ "signals": ["WAIT", "BUY"] });
        let strategy = registry.create("scripted", config).unwrap();

        let c = Candle::new(Utc::now(), dec!(1));
        assert_eq!(strategy.evaluate(&[c, c]), Signal::Buy);
    }

    #[test]
    fn test_null_config_uses_defaults() {
        let registry = StrategyRegistry::new();
        let strategy = registry.create("hold", serde_json::Value::Null).unwrap();
        assert_eq!(strategy.warmup_period(), 1);
    }

    #[test]
    fn test_invalid_config() {
        let registry = StrategyRegistry::new();

        let result = registry.create("hold", serde_json::json!({ "warmup": 0 }));
        assert!(matches!(result, Err(StrategyError::InvalidConfig(_))));

        let result = registry.create("hold", serde_json::json!({ "warmup": "soon" }));
        assert!(matches!(result, Err(StrategyError::InvalidConfig(_))));
    }

    #[test]
    fn test_create_unknown_strategy() {
        let registry = StrategyRegistry::new();

        let result = registry.create_default("unknown");
        assert!(matches!(result, Err(StrategyError::NotFound(_))));
    }
}
