//! # Pathcam Core
//!
//! Core types and utilities for the Pathcam pipeline: the unit system
//! and quantity parser, machine-mode enumerations, the layered geometry
//! model, and the abstract command records consumed by downstream code
//! emitters.

pub mod commands;
pub mod error;
pub mod geometry;
pub mod machine;
pub mod units;

pub use commands::{Command, CommandSink};

pub use error::{ConfigError, Error, ParseError, ResourceError, Result};

pub use geometry::{Document, Layer, Point, Polyline};

pub use machine::{
    CoolantMode, HeatState, PowerMode, PowerState, RackType, SpinDirection, SpindleState, ToolType,
};

pub use units::{Dimension, LengthUnits, Quantity, TemperatureUnits, TimeUnits, Unit};
