//! Tool profile registry
//!
//! Static lookup from tool type to its behavioral contract: which
//! machine-state axes the tool owns, and how activation behaves. The
//! pipeline only emits state commands for axes the active profile owns,
//! so a tool that does not use the spindle never produces spindle
//! commands even when the configuration carries spindle fields.

use pathcam_core::machine::{PowerMode, ToolType};

/// Behavioral contract of one tool type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolProfile {
    /// The tool drives the spindle axis
    pub uses_spindle: bool,
    /// The tool drives the beam power axis, in the given mode
    pub power_mode: Option<PowerMode>,
    /// The tool drives the hotend heater axis
    pub uses_heater: bool,
    /// The tool retracts and primes filament around paths
    pub uses_retraction: bool,
    /// Activation must be followed by a warmup delay
    pub requires_warmup: bool,
}

static MARKER: ToolProfile = ToolProfile {
    uses_spindle: false,
    power_mode: None,
    uses_heater: false,
    uses_retraction: false,
    requires_warmup: false,
};

static SPINDLE: ToolProfile = ToolProfile {
    uses_spindle: true,
    power_mode: None,
    uses_heater: false,
    uses_retraction: false,
    requires_warmup: true,
};

static BLADE: ToolProfile = ToolProfile {
    uses_spindle: false,
    power_mode: None,
    uses_heater: false,
    uses_retraction: false,
    requires_warmup: false,
};

static EXTRUDER: ToolProfile = ToolProfile {
    uses_spindle: false,
    power_mode: None,
    uses_heater: false,
    uses_retraction: true,
    requires_warmup: false,
};

static HEATED_EXTRUDER: ToolProfile = ToolProfile {
    uses_spindle: false,
    power_mode: None,
    uses_heater: true,
    uses_retraction: true,
    requires_warmup: true,
};

static BEAM: ToolProfile = ToolProfile {
    uses_spindle: false,
    power_mode: Some(PowerMode::Constant),
    uses_heater: false,
    uses_retraction: false,
    requires_warmup: false,
};

static ADAPTIVE_BEAM: ToolProfile = ToolProfile {
    uses_spindle: false,
    power_mode: Some(PowerMode::Dynamic),
    uses_heater: false,
    uses_retraction: false,
    requires_warmup: false,
};

/// Look up the static profile for a tool type
pub fn profile(tool_type: ToolType) -> &'static ToolProfile {
    match tool_type {
        ToolType::Marker => &MARKER,
        ToolType::Spindle => &SPINDLE,
        ToolType::Blade => &BLADE,
        ToolType::Extruder => &EXTRUDER,
        ToolType::HeatedExtruder => &HEATED_EXTRUDER,
        ToolType::Beam => &BEAM,
        ToolType::AdaptiveBeam => &ADAPTIVE_BEAM,
    }
}
