//! Error handling for Pathcam
//!
//! Provides the error types shared by all layers of the pipeline:
//! - Parse errors (malformed quantity strings, unit mismatches)
//! - Config errors (unknown fields, invalid values, illegal tool changes)
//! - Resource errors (heightmap files missing or unreadable)
//!
//! All error types use `thiserror` for ergonomic error handling. Every
//! failure in this crate family is a deterministic function of the
//! configuration and geometry, so the propagation policy is fail-fast
//! with no retries.

use thiserror::Error;

/// Quantity parsing error type
///
/// Represents failures while parsing unit-suffixed scalar strings such
/// as `"500.0mm"` or `"250ms"`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The numeric portion of the value could not be parsed
    #[error("Invalid number in `{value}`")]
    InvalidNumber {
        /// The raw input value.
        value: String,
    },

    /// The numeric portion parsed but is not a finite number
    #[error("Value `{value}` is not finite")]
    NotFinite {
        /// The raw input value.
        value: String,
    },

    /// The unit suffix is not recognized for the expected dimension
    #[error("Unknown {dimension} unit `{unit}` in `{value}`")]
    UnknownUnit {
        /// The raw input value.
        value: String,
        /// The suffix that was not recognized.
        unit: String,
        /// The dimension the field expects (length, time, temperature).
        dimension: &'static str,
    },

    /// The value is empty
    #[error("Empty value where a {dimension} was expected")]
    Empty {
        /// The dimension the field expects.
        dimension: &'static str,
    },
}

/// Configuration error type
///
/// Represents failures while resolving the document and per-layer
/// configuration tables. Always reported with the offending section
/// (`document` or `layer-N`) and field name.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A field name is not part of the recognized field set
    #[error("Unrecognized field `{field}` in [{section}]")]
    UnknownField {
        /// The section the field appeared in.
        section: String,
        /// The unrecognized field name.
        field: String,
    },

    /// A field value failed to parse as a quantity
    #[error("Invalid value for `{field}` in [{section}]: {source}")]
    Parse {
        /// The section the field appeared in.
        section: String,
        /// The field name.
        field: String,
        /// The underlying parse failure.
        #[source]
        source: ParseError,
    },

    /// A field value is not valid for its type
    #[error("Invalid value for `{field}` in [{section}]: {reason}")]
    InvalidValue {
        /// The section the field appeared in.
        section: String,
        /// The field name.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// A numeric field is outside its permitted range
    #[error("Field `{field}` in [{section}] out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        /// The section the field appeared in.
        section: String,
        /// The field name.
        field: String,
        /// The offending value.
        value: f64,
        /// The minimum permitted value.
        min: f64,
        /// The maximum permitted value.
        max: f64,
    },

    /// A tool change was requested while the rack type is `off`
    #[error("Tool change required on layer {layer} but rack type is `off`")]
    ToolChangeNotAllowed {
        /// The layer that requested the change.
        layer: usize,
    },
}

/// Resource loading error type
///
/// Represents failures while loading auxiliary files before emission
/// begins. These are surfaced eagerly so no partial command stream is
/// ever produced for a missing resource.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The heightmap raster could not be loaded
    #[error("Failed to load heightmap from '{path}': {reason}")]
    HeightMapLoad {
        /// The path that failed to load.
        path: String,
        /// The reason the load failed.
        reason: String,
    },

    /// The heightmap raster contains no samples
    #[error("Heightmap '{path}' is empty")]
    EmptyHeightMap {
        /// The path of the empty raster.
        path: String,
    },
}

/// Main error type for Pathcam
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Quantity parsing error
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Resource loading error
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Check if this is a parse error
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    /// Check if this is a resource error
    pub fn is_resource_error(&self) -> bool {
        matches!(self, Error::Resource(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::InvalidNumber {
            value: "abcmm".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid number in `abcmm`");

        let err = ParseError::UnknownUnit {
            value: "10kg".to_string(),
            unit: "kg".to_string(),
            dimension: "length",
        };
        assert_eq!(err.to_string(), "Unknown length unit `kg` in `10kg`");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnknownField {
            section: "layer-2".to_string(),
            field: "work_sped".to_string(),
        };
        assert_eq!(err.to_string(), "Unrecognized field `work_sped` in [layer-2]");

        let err = ConfigError::OutOfRange {
            section: "document".to_string(),
            field: "fan_speed".to_string(),
            value: 300.0,
            min: 0.0,
            max: 255.0,
        };
        assert_eq!(
            err.to_string(),
            "Field `fan_speed` in [document] out of range: 300 (valid: 0..255)"
        );

        let err = ConfigError::ToolChangeNotAllowed { layer: 2 };
        assert_eq!(
            err.to_string(),
            "Tool change required on layer 2 but rack type is `off`"
        );
    }

    #[test]
    fn test_error_conversion() {
        let parse_err = ParseError::Empty { dimension: "time" };
        let err: Error = parse_err.into();
        assert!(err.is_parse_error());

        let config_err = ConfigError::ToolChangeNotAllowed { layer: 1 };
        let err: Error = config_err.into();
        assert!(err.is_config_error());

        let resource_err = ResourceError::HeightMapLoad {
            path: "missing.png".to_string(),
            reason: "not found".to_string(),
        };
        let err: Error = resource_err.into();
        assert!(err.is_resource_error());
    }
}
