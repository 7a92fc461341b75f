//! Service and predictor settings.

use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_HORIZON_DAYS;

/// Why settings were rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Not JSON, or a key has the wrong type.
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// Well-formed but unusable values.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Prediction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Days past the first anchor sample at which the trend is projected.
    pub horizon_days: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

/// Service loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Pending commands before callers wait.
    pub command_queue_bound: usize,
    /// Broadcast buffer; slow subscribers lag past this.
    pub event_queue_bound: usize,
    /// Settings handed to the service's predictor.
    pub predictor: PredictorConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_queue_bound: 1024,
            predictor: PredictorConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Parses JSON; absent keys keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero queue bounds and a non-finite horizon.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_queue_bound == 0 || self.event_queue_bound == 0 {
            return Err(ConfigError::Invalid("queue bounds must be non-zero".into()));
        }
        if !self.predictor.horizon_days.is_finite() {
            return Err(ConfigError::Invalid("horizon_days must be finite".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ServiceConfig::from_json_str(r#"{"predictor":{"horizon_days":90}}"#).unwrap();
        assert_eq!(cfg.predictor.horizon_days, 90.0);
        assert_eq!(cfg.command_queue_bound, 256);
    }

    #[test]
    fn zero_queue_is_rejected() {
        let err = ServiceConfig::from_json_str(r#"{"event_queue_bound":0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
