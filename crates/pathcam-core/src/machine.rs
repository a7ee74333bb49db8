//! Machine modes and state axes
//!
//! Closed enumerations for tool types, rack policies, and the machine
//! state axes (spindle, beam power, coolant, heaters) shared by the
//! configuration surface, the command records, and the state tracker.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tool type selection
///
/// Determines which machine-state axes are driven and how tool changes,
/// warmup, and retraction behave. See the tool profile registry in the
/// render crate for the per-variant contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolType {
    /// Pen or marker head, no controllable axes
    Marker,
    /// Rotating spindle (mills, drills, routers)
    Spindle,
    /// Drag knife
    Blade,
    /// Cold filament extruder
    Extruder,
    /// Heated filament extruder
    HeatedExtruder,
    /// Constant-power beam (laser, plasma)
    Beam,
    /// Dynamically-modulated beam
    AdaptiveBeam,
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marker => write!(f, "marker"),
            Self::Spindle => write!(f, "spindle"),
            Self::Blade => write!(f, "blade"),
            Self::Extruder => write!(f, "extruder"),
            Self::HeatedExtruder => write!(f, "heated-extruder"),
            Self::Beam => write!(f, "beam"),
            Self::AdaptiveBeam => write!(f, "adaptive-beam"),
        }
    }
}

impl FromStr for ToolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "marker" => Ok(Self::Marker),
            "spindle" => Ok(Self::Spindle),
            "blade" => Ok(Self::Blade),
            "extruder" => Ok(Self::Extruder),
            "heated_extruder" => Ok(Self::HeatedExtruder),
            "beam" => Ok(Self::Beam),
            "adaptive_beam" => Ok(Self::AdaptiveBeam),
            _ => Err(format!("Unknown tool type: {}", s)),
        }
    }
}

/// Tool rack policy
///
/// How tool changes between layers are physically carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RackType {
    /// No rack; tool changes are rejected
    Off,
    /// Operator swaps the tool at a pause
    Manual,
    /// Automatic tool changer
    Automatic,
}

impl Default for RackType {
    fn default() -> Self {
        Self::Off
    }
}

impl fmt::Display for RackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Manual => write!(f, "manual"),
            Self::Automatic => write!(f, "automatic"),
        }
    }
}

impl FromStr for RackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "manual" => Ok(Self::Manual),
            "automatic" | "auto" => Ok(Self::Automatic),
            _ => Err(format!("Unknown rack type: {}", s)),
        }
    }
}

/// Spindle rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinDirection {
    /// Clockwise rotation
    Clockwise,
    /// Counterclockwise rotation
    Counterclockwise,
}

impl Default for SpinDirection {
    fn default() -> Self {
        Self::Clockwise
    }
}

impl fmt::Display for SpinDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clockwise => write!(f, "clockwise"),
            Self::Counterclockwise => write!(f, "counterclockwise"),
        }
    }
}

impl FromStr for SpinDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clockwise" | "cw" => Ok(Self::Clockwise),
            "counterclockwise" | "ccw" => Ok(Self::Counterclockwise),
            _ => Err(format!("Unknown spin direction: {}", s)),
        }
    }
}

/// Beam power delivery mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerMode {
    /// Constant power while the beam is on
    Constant,
    /// Power modulated with travel speed
    Dynamic,
}

/// Coolant system mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoolantMode {
    /// Coolant off
    Off,
    /// Mist coolant
    Mist,
    /// Flood coolant
    Flood,
}

impl Default for CoolantMode {
    fn default() -> Self {
        Self::Off
    }
}

impl fmt::Display for CoolantMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Mist => write!(f, "mist"),
            Self::Flood => write!(f, "flood"),
        }
    }
}

impl FromStr for CoolantMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "mist" => Ok(Self::Mist),
            "flood" => Ok(Self::Flood),
            _ => Err(format!("Unknown coolant mode: {}", s)),
        }
    }
}

/// Tracked spindle state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum SpindleState {
    /// Spindle stopped
    Off,
    /// Spindle rotating at the given speed
    Running {
        /// Rotation direction.
        direction: SpinDirection,
        /// Rotation speed in revolutions per minute.
        rpm: f64,
    },
}

impl SpindleState {
    /// Check whether the spindle is stopped
    pub fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }
}

/// Tracked beam power state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum PowerState {
    /// Beam off
    Off,
    /// Beam on at the given level
    On {
        /// Power delivery mode.
        mode: PowerMode,
        /// Power level in percent (0-100).
        level: f64,
    },
}

impl PowerState {
    /// Check whether the beam is off
    pub fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }
}

/// Tracked heater state, used for both the bed and the hotend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum HeatState {
    /// Heater off
    Off,
    /// Heater holding a target temperature
    Heated {
        /// Target temperature in degrees Celsius.
        celsius: f64,
    },
}

impl HeatState {
    /// Check whether the heater is off
    pub fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }
}
