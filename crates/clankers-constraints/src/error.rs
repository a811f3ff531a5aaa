use clankers_kinematics::KinematicsError;
use thiserror::Error;

/// Top-level error type for clankers-constraints.
#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Kinematics error: {0}")]
    Kinematics(#[from] KinematicsError),

    #[error("Not supported: {0}")]
    Unsupported(String),

    #[error("No path constraints found in the constraint description")]
    NoConstraints,

    #[error("Joint dimension mismatch: expected {expected}, got {got}")]
    JointDimension { expected: usize, got: usize },
}

/// Errors raised while validating configuration or initializing a
/// constraint from its description.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid bound: lower {lower} > upper {upper}")]
    InvalidBound { lower: f64, upper: f64 },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error(
        "Dimension {dim} ({value}) is below the evaluation tolerance {tolerance}; \
         use a value between {tolerance} and {threshold}"
    )]
    DimensionBelowTolerance {
        dim: usize,
        value: f64,
        tolerance: f64,
        threshold: f64,
    },

    #[error("Threshold ordering violated: {0}")]
    ThresholdOrdering(String),

    #[error("Line start and end positions coincide")]
    DegenerateLine,

    #[error("Unknown link: {0}")]
    UnknownLink(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
