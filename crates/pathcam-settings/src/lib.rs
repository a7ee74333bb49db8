//! # Pathcam Settings
//!
//! Configuration management for the Pathcam pipeline.
//!
//! A TOML file carries one `[document]` section with document-wide
//! defaults and sparse `[layer-N]` override sections. The resolver
//! merges them into one complete, validated [`LayerConfig`] per layer
//! with strict precedence: layer override, else document value, else
//! built-in default. Unknown fields, invalid enum values, and
//! out-of-range numerics are fatal.

pub mod config;
pub mod resolver;

pub use config::{BedMode, FanMode, LayerConfig};
pub use resolver::RenderSettings;
