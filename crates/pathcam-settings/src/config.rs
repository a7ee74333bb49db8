//! Configuration field table
//!
//! The full set of recognized configuration fields with their built-in
//! defaults. A [`LayerConfig`] is one complete, validated value of this
//! table: either the document defaults or a per-layer resolution of
//! sparse overrides onto them. A field's value is always taken whole
//! from one source, never partially merged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use pathcam_core::machine::{CoolantMode, RackType, SpinDirection, ToolType};
use pathcam_core::units::{LengthUnits, TimeUnits};

/// Part fan usage selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanMode {
    /// Fan unused
    Off,
    /// Cooling fan driven at the configured speed
    Cooling,
}

impl Default for FanMode {
    fn default() -> Self {
        Self::Off
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Cooling => write!(f, "cooling"),
        }
    }
}

impl FromStr for FanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "cooling" | "on" => Ok(Self::Cooling),
            _ => Err(format!("Unknown fan type: {}", s)),
        }
    }
}

/// Machine bed selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BedMode {
    /// Unheated or absent bed
    Off,
    /// Heated bed held at the configured temperature
    Heated,
}

impl Default for BedMode {
    fn default() -> Self {
        Self::Off
    }
}

impl fmt::Display for BedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Heated => write!(f, "heated"),
        }
    }
}

impl FromStr for BedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "heated" | "on" => Ok(Self::Heated),
            _ => Err(format!("Unknown bed type: {}", s)),
        }
    }
}

/// One fully-resolved configuration
///
/// Lengths and Z heights are in the document's canonical length unit,
/// speeds in length units per minute, delays in the canonical time
/// unit, and temperatures in degrees Celsius. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Canonical length unit of the document (document-level only)
    pub length_units: LengthUnits,
    /// Canonical time unit of the document (document-level only)
    pub time_units: TimeUnits,

    /// Active tool type
    pub tool_type: ToolType,
    /// Tool change policy
    pub rack_type: RackType,
    /// Tool number selected for this layer
    pub tool_number: u32,
    /// Spindle rotation direction
    pub spin_mode: SpinDirection,

    /// Feed rate while working the material
    pub work_speed: f64,
    /// Feed rate while plunging into the material
    pub plunge_speed: f64,
    /// Feed rate while traveling between operations
    pub travel_speed: f64,

    /// Beam power level in percent (0-100)
    pub power_level: f64,
    /// Spindle speed in revolutions per minute
    pub spindle_rpm: f64,
    /// Delay after tool activation before any movement
    pub warmup_delay: f64,

    /// Part fan usage
    pub fan_type: FanMode,
    /// Part fan speed (0-255)
    pub fan_speed: u8,
    /// Coolant system mode
    pub coolant_type: CoolantMode,
    /// Bed usage
    pub bed_type: BedMode,
    /// Bed target temperature in Celsius
    pub bed_temperature: f64,
    /// Hotend target temperature in Celsius
    pub hotend_temperature: f64,

    /// Z height while working
    pub work_z: f64,
    /// Z height where plunging begins
    pub plunge_z: f64,
    /// Z clearance height for travels
    pub safe_z: f64,
    /// Z parking height for tool changes and program end
    pub park_z: f64,

    /// Maximum chord length before a segment is subdivided
    pub resolution: f64,

    /// Filament retraction distance for extruder tools
    pub retract_length: f64,
    /// Feed rate for filament retract and prime moves
    pub retract_speed: f64,
    /// Filament diameter
    pub filament_diameter: f64,
    /// Nozzle diameter
    pub nozzle_diameter: f64,
    /// Printed layer height
    pub layer_height: f64,
    /// Extrusion flow multiplier
    pub extrusion_multiplier: f64,

    /// Path to the heightmap raster, if Z compensation is wanted
    pub height_map_path: Option<PathBuf>,
    /// Scale from normalized heightmap values to work units
    pub height_map_scale: f64,
    /// Maximum Z deviation between consecutive samples before a
    /// segment is subdivided
    pub height_map_tolerance: f64,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            length_units: LengthUnits::Millimeters,
            time_units: TimeUnits::Seconds,
            tool_type: ToolType::Marker,
            rack_type: RackType::Off,
            tool_number: 1,
            spin_mode: SpinDirection::Clockwise,
            work_speed: 500.0,
            plunge_speed: 200.0,
            travel_speed: 1000.0,
            power_level: 50.0,
            spindle_rpm: 1000.0,
            warmup_delay: 2.0,
            fan_type: FanMode::Off,
            fan_speed: 255,
            coolant_type: CoolantMode::Off,
            bed_type: BedMode::Off,
            bed_temperature: 60.0,
            hotend_temperature: 200.0,
            work_z: 0.0,
            plunge_z: 1.0,
            safe_z: 10.0,
            park_z: 50.0,
            resolution: 0.5,
            retract_length: 2.0,
            retract_speed: 1200.0,
            filament_diameter: 1.75,
            nozzle_diameter: 0.4,
            layer_height: 0.2,
            extrusion_multiplier: 1.0,
            height_map_path: None,
            height_map_scale: 1.0,
            height_map_tolerance: 0.01,
        }
    }
}
