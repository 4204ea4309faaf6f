//! Solver configuration.
//!
//! [`PackingConfig`] is plain data with serde defaults, so it can be embedded
//! in whatever configuration file an application already reads; the fluent
//! way to build one is [`DpSolverBuilder`](crate::builder::DpSolverBuilder).

use crate::error::{PackingError, Result};
use crate::scale::{Scaler, DEFAULT_SCALE, DEFAULT_TOLERANCE};
use serde::{Deserialize, Serialize};

/// Knobs of the DP solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingConfig {
    /// Integer units per physical unit (2 resolves half-kilograms).
    pub scale: u32,
    /// Accepted deviation from an integer after scaling, in units.
    pub tolerance: f64,
    /// Abort with [`PackingError::StateLimit`] once a table outgrows this.
    pub max_states: Option<usize>,
    /// Number of shards a large table is split into per step. Only has an
    /// effect with the `parallel` feature; `1` always runs sequentially.
    pub shards: usize,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            tolerance: DEFAULT_TOLERANCE,
            max_states: None,
            shards: 1,
        }
    }
}

impl PackingConfig {
    pub fn validate(&self) -> Result<()> {
        Scaler::new(self.scale, self.tolerance)?;
        if self.shards == 0 {
            return Err(PackingError::InvalidConfig(
                "shard count must be at least 1".into(),
            ));
        }
        if self.max_states == Some(0) {
            return Err(PackingError::InvalidConfig(
                "state limit must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The scaler this configuration describes.
    pub fn scaler(&self) -> Result<Scaler> {
        Scaler::new(self.scale, self.tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PackingConfig::default();
        assert_eq!(config.scale, 2);
        assert_eq!(config.shards, 1);
        assert!(config.max_states.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: PackingConfig = serde_json::from_str(r#"{"scale": 10}"#).unwrap();
        assert_eq!(config.scale, 10);
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(config.shards, 1);
    }

    #[test]
    fn rejects_degenerate_values() {
        for bad in [
            PackingConfig {
                scale: 0,
                ..Default::default()
            },
            PackingConfig {
                shards: 0,
                ..Default::default()
            },
            PackingConfig {
                max_states: Some(0),
                ..Default::default()
            },
            PackingConfig {
                tolerance: 0.75,
                ..Default::default()
            },
        ] {
            assert!(matches!(bad.validate(), Err(PackingError::InvalidConfig(_))));
        }
    }
}
