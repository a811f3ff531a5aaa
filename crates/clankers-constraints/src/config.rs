use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Position extents below this value are treated as equality constraints by
/// the equality and linear-system variants; larger extents leave the axis
/// free.
///
/// Must exceed the evaluation tolerance, which in turn must exceed the
/// tolerance of any downstream feasibility checker, or no state can ever be
/// valid.
pub const EQUALITY_DIMENSION_THRESHOLD: f64 = 0.001;

/// Default projection tolerance used to decide F(q) ≈ 0.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}
const fn default_equality_threshold() -> f64 {
    EQUALITY_DIMENSION_THRESHOLD
}

// ---------------------------------------------------------------------------
// ConstraintConfig
// ---------------------------------------------------------------------------

/// Numeric settings shared by every constraint built by the factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintConfig {
    /// Infinity-norm tolerance under which F(q) counts as satisfied
    /// (default: 1e-4).
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Extents below this are equality-constrained (default: 1e-3).
    #[serde(default = "default_equality_threshold")]
    pub equality_threshold: f64,

    /// Tolerance of the downstream state-validity checker, if known.
    /// Must be below `tolerance`.
    #[serde(default)]
    pub checker_tolerance: Option<f64>,

    /// Whether the host planner integration accepts orientation
    /// constraints. When false the factory still builds them but reports
    /// the limitation.
    #[serde(default)]
    pub orientation_supported: bool,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            equality_threshold: default_equality_threshold(),
            checker_tolerance: None,
            orientation_supported: false,
        }
    }
}

impl ConstraintConfig {
    /// Validate configuration. Returns Err on invalid values or when the
    /// threshold ordering `equality_threshold > tolerance > checker_tolerance`
    /// does not hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::invalid(
                "tolerance",
                format!("{} (must be positive and finite)", self.tolerance),
            ));
        }
        if !(self.equality_threshold.is_finite() && self.equality_threshold > 0.0) {
            return Err(ConfigError::invalid(
                "equality_threshold",
                format!("{} (must be positive and finite)", self.equality_threshold),
            ));
        }
        if self.equality_threshold <= self.tolerance {
            return Err(ConfigError::ThresholdOrdering(format!(
                "equality_threshold ({}) must be greater than tolerance ({})",
                self.equality_threshold, self.tolerance
            )));
        }
        if let Some(checker) = self.checker_tolerance {
            if !(checker.is_finite() && checker >= 0.0) {
                return Err(ConfigError::invalid(
                    "checker_tolerance",
                    format!("{checker} (must be non-negative and finite)"),
                ));
            }
            if checker >= self.tolerance {
                return Err(ConfigError::ThresholdOrdering(format!(
                    "tolerance ({}) must be greater than checker_tolerance ({checker})",
                    self.tolerance
                )));
            }
        }
        Ok(())
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
