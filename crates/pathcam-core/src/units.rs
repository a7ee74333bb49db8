//! Unit system and quantity parsing
//!
//! Configuration values are either bare numerics or numeric strings with
//! a unit suffix (`"500.0mm"`, `"250ms"`, `"60C"`). This module parses
//! them into [`Quantity`] values and converts each dimension to the
//! document's canonical unit, so differently-suffixed literals for the
//! same field always compare consistently.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

const MM_PER_INCH: f64 = 25.4;
const MS_PER_SECOND: f64 = 1000.0;
const KELVIN_OFFSET: f64 = 273.15;

/// Length unit selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnits {
    /// Millimeters (metric)
    Millimeters,
    /// Inches (imperial)
    Inches,
}

impl Default for LengthUnits {
    fn default() -> Self {
        Self::Millimeters
    }
}

impl fmt::Display for LengthUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millimeters => write!(f, "mm"),
            Self::Inches => write!(f, "in"),
        }
    }
}

impl FromStr for LengthUnits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mm" | "millimeters" | "metric" => Ok(Self::Millimeters),
            "in" | "inch" | "inches" | "imperial" => Ok(Self::Inches),
            _ => Err(format!("Unknown length units: {}", s)),
        }
    }
}

impl LengthUnits {
    /// Convert a value expressed in `self` into `target` units
    pub fn convert(&self, value: f64, target: LengthUnits) -> f64 {
        match (self, target) {
            (Self::Millimeters, Self::Inches) => value / MM_PER_INCH,
            (Self::Inches, Self::Millimeters) => value * MM_PER_INCH,
            _ => value,
        }
    }
}

/// Time unit selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnits {
    /// Seconds
    Seconds,
    /// Milliseconds
    Milliseconds,
}

impl Default for TimeUnits {
    fn default() -> Self {
        Self::Seconds
    }
}

impl fmt::Display for TimeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds => write!(f, "s"),
            Self::Milliseconds => write!(f, "ms"),
        }
    }
}

impl FromStr for TimeUnits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s" | "sec" | "seconds" => Ok(Self::Seconds),
            "ms" | "milliseconds" => Ok(Self::Milliseconds),
            _ => Err(format!("Unknown time units: {}", s)),
        }
    }
}

impl TimeUnits {
    /// Convert a value expressed in `self` into `target` units
    pub fn convert(&self, value: f64, target: TimeUnits) -> f64 {
        match (self, target) {
            (Self::Seconds, Self::Milliseconds) => value * MS_PER_SECOND,
            (Self::Milliseconds, Self::Seconds) => value / MS_PER_SECOND,
            _ => value,
        }
    }
}

/// Temperature unit selection
///
/// Temperatures are always canonicalized to Celsius before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnits {
    /// Degrees Celsius
    Celsius,
    /// Kelvin
    Kelvin,
}

impl Default for TemperatureUnits {
    fn default() -> Self {
        Self::Celsius
    }
}

impl fmt::Display for TemperatureUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Celsius => write!(f, "C"),
            Self::Kelvin => write!(f, "K"),
        }
    }
}

impl TemperatureUnits {
    /// Convert a value expressed in `self` into `target` units
    pub fn convert(&self, value: f64, target: TemperatureUnits) -> f64 {
        match (self, target) {
            (Self::Celsius, Self::Kelvin) => value + KELVIN_OFFSET,
            (Self::Kelvin, Self::Celsius) => value - KELVIN_OFFSET,
            _ => value,
        }
    }
}

/// Unit tag covering every supported dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// A length unit
    Length(LengthUnits),
    /// A time unit
    Time(TimeUnits),
    /// A temperature unit
    Temperature(TemperatureUnits),
    /// A bare number (counts, percentages, RPM)
    Dimensionless,
}

/// The physical dimension a configuration field expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Lengths and speeds (units per minute)
    Length,
    /// Durations
    Time,
    /// Temperatures
    Temperature,
    /// Plain numbers
    Dimensionless,
}

impl Dimension {
    fn name(&self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Time => "time",
            Self::Temperature => "temperature",
            Self::Dimensionless => "number",
        }
    }
}

/// A parsed magnitude with its unit tag
///
/// Constructed once at config-resolution time and converted to the
/// document's canonical unit; never re-parsed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// The parsed magnitude, always finite.
    pub magnitude: f64,
    /// The unit the magnitude is expressed in.
    pub unit: Unit,
}

impl Quantity {
    /// Create a quantity already expressed in the canonical unit of
    /// its dimension
    pub fn bare(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: Unit::Dimensionless,
        }
    }

    /// Parse a bare or unit-suffixed numeric string for a dimension
    ///
    /// The suffix must belong to the given dimension; a bare numeric is
    /// interpreted as already being in the canonical unit.
    pub fn parse(input: &str, dimension: Dimension) -> Result<Self, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::Empty {
                dimension: dimension.name(),
            });
        }

        let split = input
            .rfind(|c: char| c.is_ascii_digit() || c == '.')
            .map(|i| i + 1)
            .unwrap_or(0);
        let (number, suffix) = input.split_at(split);
        let suffix = suffix.trim();

        let magnitude: f64 = number.trim().parse().map_err(|_| ParseError::InvalidNumber {
            value: input.to_string(),
        })?;

        if !magnitude.is_finite() {
            return Err(ParseError::NotFinite {
                value: input.to_string(),
            });
        }

        let unit = Self::parse_unit(input, suffix, dimension)?;
        Ok(Self { magnitude, unit })
    }

    fn parse_unit(input: &str, suffix: &str, dimension: Dimension) -> Result<Unit, ParseError> {
        let unknown = || ParseError::UnknownUnit {
            value: input.to_string(),
            unit: suffix.to_string(),
            dimension: dimension.name(),
        };

        if suffix.is_empty() {
            // A bare numeric is already in the canonical unit
            return Ok(Unit::Dimensionless);
        }

        match dimension {
            Dimension::Length => suffix
                .parse::<LengthUnits>()
                .map(Unit::Length)
                .map_err(|_| unknown()),
            Dimension::Time => suffix
                .parse::<TimeUnits>()
                .map(Unit::Time)
                .map_err(|_| unknown()),
            Dimension::Temperature => match suffix {
                "C" | "c" => Ok(Unit::Temperature(TemperatureUnits::Celsius)),
                "K" | "k" => Ok(Unit::Temperature(TemperatureUnits::Kelvin)),
                _ => Err(unknown()),
            },
            Dimension::Dimensionless => Err(unknown()),
        }
    }

    /// Convert this quantity into canonical length units
    pub fn to_length(&self, canonical: LengthUnits) -> f64 {
        match self.unit {
            Unit::Length(units) => units.convert(self.magnitude, canonical),
            _ => self.magnitude,
        }
    }

    /// Convert this quantity into canonical time units
    pub fn to_time(&self, canonical: TimeUnits) -> f64 {
        match self.unit {
            Unit::Time(units) => units.convert(self.magnitude, canonical),
            _ => self.magnitude,
        }
    }

    /// Convert this quantity into degrees Celsius
    pub fn to_celsius(&self) -> f64 {
        match self.unit {
            Unit::Temperature(units) => units.convert(self.magnitude, TemperatureUnits::Celsius),
            _ => self.magnitude,
        }
    }
}
