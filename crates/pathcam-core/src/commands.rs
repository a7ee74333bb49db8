//! Abstract machine command records
//!
//! The pipeline produces an ordered sequence of these records; a
//! downstream code emitter renders them into literal machine
//! instructions. The core never produces instruction text itself, and
//! the emitter must consume records without reordering or dropping any.
//!
//! All positions and lengths are expressed in the document's canonical
//! length unit, delays in its canonical time unit, speeds in length
//! units per minute, and temperatures in degrees Celsius.

use serde::{Deserialize, Serialize};

use crate::machine::{CoolantMode, HeatState, PowerState, SpindleState};

/// A single abstract machine command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "command")]
pub enum Command {
    /// Rapid move above the material to a new position
    TravelMove {
        /// Target X coordinate.
        x: f64,
        /// Target Y coordinate.
        y: f64,
        /// Target Z coordinate.
        z: f64,
        /// Feed rate in units per minute.
        feed: f64,
    },

    /// Controlled descent into the material
    ///
    /// `extrude` carries a filament delta for extruder tools (a prime
    /// move when positive).
    PlungeMove {
        /// Target Z coordinate.
        z: f64,
        /// Feed rate in units per minute.
        feed: f64,
        /// Relative filament movement, if any.
        extrude: Option<f64>,
    },

    /// Working move through the material
    ///
    /// A record with an `extrude` delta and no XY displacement is a
    /// filament-only move (retract when negative, prime when positive).
    WorkMove {
        /// Target X coordinate.
        x: f64,
        /// Target Y coordinate.
        y: f64,
        /// Target Z coordinate.
        z: f64,
        /// Feed rate in units per minute.
        feed: f64,
        /// Relative filament movement, if any.
        extrude: Option<f64>,
    },

    /// Lift out of the material to a clearance height
    RetractMove {
        /// Target Z coordinate.
        z: f64,
        /// Feed rate in units per minute.
        feed: f64,
    },

    /// Select a new tool
    ToolChange {
        /// The tool number to select.
        number: u32,
    },

    /// Drive the spindle to a new state
    SpindleSet {
        /// The requested spindle state.
        state: SpindleState,
    },

    /// Drive the beam power to a new state
    PowerSet {
        /// The requested power state.
        state: PowerState,
    },

    /// Drive the coolant system to a new mode
    CoolantSet {
        /// The requested coolant mode.
        mode: CoolantMode,
    },

    /// Drive the part fan to a new speed
    FanSet {
        /// Fan speed, 0 (off) to 255 (full).
        speed: u8,
    },

    /// Drive the heated bed to a new state
    BedSet {
        /// The requested bed state.
        state: HeatState,
    },

    /// Drive the hotend heater to a new state
    HeaterSet {
        /// The requested heater state.
        state: HeatState,
    },

    /// Halt and wait for the operator
    Pause {
        /// Optional operator message.
        message: Option<String>,
    },

    /// Delay program execution
    Delay {
        /// Duration in the document's canonical time unit.
        duration: f64,
    },
}

impl Command {
    /// Check whether this record is a motion command
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Command::TravelMove { .. }
                | Command::PlungeMove { .. }
                | Command::WorkMove { .. }
                | Command::RetractMove { .. }
        )
    }

    /// Check whether this record is a machine-state command
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            Command::SpindleSet { .. }
                | Command::PowerSet { .. }
                | Command::CoolantSet { .. }
                | Command::FanSet { .. }
                | Command::BedSet { .. }
                | Command::HeaterSet { .. }
        )
    }
}

/// Receiver for the emitted command stream
///
/// Implementations must preserve the order commands are pushed in; the
/// stream is a total order matching (layer, path, point) traversal.
pub trait CommandSink {
    /// Append one command to the stream
    fn push(&mut self, command: Command);
}

impl CommandSink for Vec<Command> {
    fn push(&mut self, command: Command) {
        Vec::push(self, command);
    }
}
