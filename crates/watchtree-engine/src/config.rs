//! Synchronization configuration, validation, and error types.
//!
//! [`SyncConfig`] selects which part of the tree a session writes to and
//! how it reports failures. [`validate()`](SyncConfig::validate) is
//! called by [`SyncContext::new`](crate::SyncContext::new), so an invalid
//! config never reaches a pass.

use std::error::Error;
use std::fmt;

use watchtree_core::PathError;
use watchtree_path::InstancePath;
use watchtree_tree::SubTreeKind;

// ── MissingStateReport ─────────────────────────────────────────────

/// How many missing identifiers a
/// [`SyncError::StateNotFound`](watchtree_core::SyncError::StateNotFound)
/// names.
///
/// The total miss count is always reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingStateReport {
    /// Only the first miss of the pass.
    First,
    /// Every miss of the pass.
    #[default]
    All,
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SyncConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The aspect id is not a valid instance-path segment.
    InvalidAspectId(PathError),
    /// The time variable is not a valid instance-path segment.
    InvalidTimeVariable(PathError),
    /// timestep is NaN, infinite, zero, or negative.
    InvalidTimestep {
        /// The invalid value.
        value: f64,
    },
    /// The time unit symbol is empty.
    EmptyTimeUnit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAspectId(e) => write!(f, "aspect_id: {e}"),
            Self::InvalidTimeVariable(e) => write!(f, "time_variable: {e}"),
            Self::InvalidTimestep { value } => {
                write!(f, "timestep must be finite and positive, got {value}")
            }
            Self::EmptyTimeUnit => write!(f, "time_unit must not be empty"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidAspectId(e) | Self::InvalidTimeVariable(e) => Some(e),
            _ => None,
        }
    }
}

// ── SyncConfig ─────────────────────────────────────────────────────

/// Configuration of one synchronization session.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncConfig {
    /// Id of the aspect whose subtree receives watched variables.
    /// Default: `"electrical"`.
    pub aspect_id: String,
    /// Which subtree of that aspect. Default: [`SubTreeKind::Watch`].
    pub subtree: SubTreeKind,
    /// Reserved leaf recording elapsed time, directly under each target
    /// subtree. `None` disables the time axis. Default: `Some("time")`.
    pub time_variable: Option<String>,
    /// Unit symbol of the time leaf. Default: `"s"`.
    pub time_unit: String,
    /// Simulated time per solver step, in `time_unit`. Default: `1e-5`.
    pub timestep: f64,
    /// How incremental-pass misses are reported. Default: `All`.
    pub missing_report: MissingStateReport,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            aspect_id: "electrical".to_string(),
            subtree: SubTreeKind::Watch,
            time_variable: Some("time".to_string()),
            time_unit: "s".to_string(),
            timestep: 1e-5,
            missing_report: MissingStateReport::All,
        }
    }
}

impl SyncConfig {
    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Aspect id must be addressable in an instance path.
        InstancePath::single(self.aspect_id.as_str()).map_err(ConfigError::InvalidAspectId)?;
        // 2. Same for the time variable, when enabled.
        if let Some(time) = &self.time_variable {
            InstancePath::single(time.as_str()).map_err(ConfigError::InvalidTimeVariable)?;
        }
        // 3. Timestep must be finite and positive.
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(ConfigError::InvalidTimestep {
                value: self.timestep,
            });
        }
        // 4. Time unit must render as something.
        if self.time_unit.is_empty() {
            return Err(ConfigError::EmptyTimeUnit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SyncConfig::default().validate().is_ok());
    }

    #[test]
    fn invalid_aspect_id_fails() {
        let cfg = SyncConfig {
            aspect_id: "a.b".into(),
            ..SyncConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidAspectId(PathError::InvalidPath { .. })) => {}
            other => panic!("expected InvalidAspectId, got {other:?}"),
        }
    }

    #[test]
    fn numeric_time_variable_fails() {
        let cfg = SyncConfig {
            time_variable: Some("0".into()),
            ..SyncConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidTimeVariable(_))
        ));
    }

    #[test]
    fn disabled_time_axis_is_valid() {
        let cfg = SyncConfig {
            time_variable: None,
            ..SyncConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn invalid_timestep_fails() {
        for value in [0.0, -1e-5, f64::NAN, f64::INFINITY] {
            let cfg = SyncConfig {
                timestep: value,
                ..SyncConfig::default()
            };
            assert!(
                matches!(cfg.validate(), Err(ConfigError::InvalidTimestep { .. })),
                "timestep {value} accepted"
            );
        }
    }

    #[test]
    fn empty_time_unit_fails() {
        let cfg = SyncConfig {
            time_unit: String::new(),
            ..SyncConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyTimeUnit));
    }

    #[test]
    fn error_source_chains_path_error() {
        let err = SyncConfig {
            aspect_id: String::new(),
            ..SyncConfig::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("aspect_id: "));
    }
}
