//! # Pathcam Render
//!
//! The toolpath and machine-state emission pipeline: consumes a layered
//! vector document plus resolved configuration and produces an ordered
//! stream of abstract machine commands for a downstream code emitter.
//!
//! ## Components
//!
//! - **Height Map Sampler**: raster Z-offset interpolation with edge
//!   clamping and tolerance-driven subdivision
//! - **Tool Profile Registry**: static per-tool-type behavioral contracts
//! - **Machine State Tracker**: diff-based state transitions that never
//!   emit redundant commands
//! - **Layer Pipeline**: per-layer setup, rack-gated tool changes,
//!   warmup, and teardown as forward diffs
//! - **Path Emitter**: travel/plunge/work/retract motion with chord and
//!   heightmap subdivision and tool-specific filament handling

pub mod emitter;
pub mod heightmap;
pub mod pipeline;
pub mod state;
pub mod tools;

pub use emitter::PathEmitter;
pub use heightmap::{RasterHeightMap, MAX_SUBDIVISION_DEPTH};
pub use pipeline::{LayerPipeline, PipelineState};
pub use state::{MachineState, Position, StateRequest, StateTracker};
pub use tools::{profile, ToolProfile};
