//! Configuration for the QFOL analyzer.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`QFOL__` prefix, `__` separator)
//! 2. Config file (`qfol.toml`, top-level keys)
//! 3. Defaults

use serde::Deserialize;

use crate::error::QfolError;

/// Score thresholds used for status classification and the deployment gate.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Thresholds {
    /// Entropy below this marks the system as `warning`.
    #[serde(default = "default_entropy")]
    pub entropy: f64,
    /// Intent alignment below this marks the system as `warning`.
    #[serde(default = "default_alignment")]
    pub alignment: f64,
    /// Ethical compliance below this is `critical` and closes the gate.
    #[serde(default = "default_ethical")]
    pub ethical_compliance: f64,
    /// Safety below this is `critical` and closes the gate.
    #[serde(default = "default_ethical")]
    pub safety: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            entropy: default_entropy(),
            alignment: default_alignment(),
            ethical_compliance: default_ethical(),
            safety: default_ethical(),
        }
    }
}

/// Top-level analyzer configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct QfolConfig {
    /// Trailing window, in hours, used for metric computation and status.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u32,

    #[serde(default)]
    pub thresholds: Thresholds,

    /// Cap on retained events. `None` keeps every event for the life of
    /// the process, which grows without bound.
    #[serde(default)]
    pub max_events: Option<usize>,

    /// Seed for the randomized placeholder heuristics. `None` seeds from the OS.
    #[serde(default)]
    pub heuristic_seed: Option<u64>,

    /// System name reported in status reports.
    #[serde(default = "default_system_name")]
    pub system_name: String,
}

fn default_entropy() -> f64 {
    0.6
}

fn default_alignment() -> f64 {
    0.7
}

fn default_ethical() -> f64 {
    0.8
}

fn default_lookback_hours() -> u32 {
    24
}

fn default_system_name() -> String {
    "Crowe Logic GPT - Mycology Research Suite".to_string()
}

impl Default for QfolConfig {
    fn default() -> Self {
        Self {
            lookback_hours: default_lookback_hours(),
            thresholds: Thresholds::default(),
            max_events: None,
            heuristic_seed: None,
            system_name: default_system_name(),
        }
    }
}

impl QfolConfig {
    /// Load configuration from `{file_prefix}.toml` (optional) and `QFOL__*`
    /// environment variables, then validate it.
    pub fn load(file_prefix: &str) -> Result<Self, QfolError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("QFOL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: QfolConfig = cfg.try_deserialize()?;
        loaded.validate()?;

        tracing::debug!(
            lookback_hours = loaded.lookback_hours,
            max_events = ?loaded.max_events,
            "QFOL configuration loaded"
        );

        Ok(loaded)
    }

    /// Reject thresholds outside `[0, 1]`, a zero lookback, or a zero capacity.
    pub fn validate(&self) -> Result<(), QfolError> {
        let t = &self.thresholds;
        for (name, value) in [
            ("entropy", t.entropy),
            ("alignment", t.alignment),
            ("ethical_compliance", t.ethical_compliance),
            ("safety", t.safety),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(QfolError::Config(format!(
                    "threshold {name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.lookback_hours == 0 {
            return Err(QfolError::Config(
                "lookback_hours must be at least 1".to_string(),
            ));
        }

        if self.max_events == Some(0) {
            return Err(QfolError::Config(
                "max_events must be at least 1 when set".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QfolConfig::default();
        assert_eq!(config.lookback_hours, 24);
        assert_eq!(config.thresholds.entropy, 0.6);
        assert_eq!(config.thresholds.alignment, 0.7);
        assert_eq!(config.thresholds.ethical_compliance, 0.8);
        assert_eq!(config.thresholds.safety, 0.8);
        assert_eq!(config.max_events, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("qfol.toml"),
            "lookback_hours = 6\nmax_events = 1000\n\n[thresholds]\nentropy = 0.5\n",
        )
        .unwrap();

        let prefix = dir.path().join("qfol");
        let config = QfolConfig::load(prefix.to_str().unwrap()).unwrap();

        assert_eq!(config.lookback_hours, 6);
        assert_eq!(config.max_events, Some(1000));
        assert_eq!(config.thresholds.entropy, 0.5);
        // Unset thresholds keep their defaults.
        assert_eq!(config.thresholds.alignment, 0.7);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let config = QfolConfig::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(config.lookback_hours, 24);
        assert_eq!(config.system_name, default_system_name());
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let config = QfolConfig {
            thresholds: Thresholds {
                safety: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(QfolError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = QfolConfig {
            max_events: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
