//! Layer pipeline
//!
//! Drives generation over the ordered layers of a document: resolves
//! the configuration for each layer, performs rack-gated tool changes,
//! applies machine-state transitions through the tracker, and delegates
//! path traversal to the emitter. The emitted command stream is a total
//! order matching (layer, path, point) traversal order.
//!
//! All resource loading (heightmap rasters) happens eagerly at
//! construction, before any command is emitted.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use pathcam_core::commands::{Command, CommandSink};
use pathcam_core::error::{ConfigError, Error, Result};
use pathcam_core::geometry::Document;
use pathcam_core::machine::{HeatState, RackType, SpindleState};
use pathcam_settings::{BedMode, FanMode, LayerConfig, RenderSettings};

use crate::emitter::PathEmitter;
use crate::heightmap::RasterHeightMap;
use crate::state::{StateRequest, StateTracker};
use crate::tools;

/// Generation phase of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No layer entered yet
    Idle,
    /// Resolving configuration and applying transitions for a layer
    LayerSetup(usize),
    /// Emitting path motion for a layer
    LayerPaths(usize),
    /// Layer complete; teardown is the next layer's forward diff
    LayerTeardown(usize),
    /// All layers processed and final shutdown emitted
    Finished,
}

/// Drives command generation for a whole document
pub struct LayerPipeline<'a> {
    settings: &'a RenderSettings,
    heightmaps: HashMap<PathBuf, RasterHeightMap>,
    tracker: StateTracker,
    state: PipelineState,
    active_config: Option<LayerConfig>,
}

impl<'a> LayerPipeline<'a> {
    /// Create a pipeline for a document
    ///
    /// Resolves every layer configuration up front (validating the
    /// whole file) and loads each referenced heightmap raster exactly
    /// once. Fails before any command is emitted if a resource is
    /// missing or a configuration is invalid.
    pub fn new(settings: &'a RenderSettings, document: &Document) -> Result<Self> {
        let configs = settings.resolve_layers(document.layers.len())?;

        let mut heightmaps = HashMap::new();
        for config in &configs {
            if let Some(path) = &config.height_map_path {
                if !heightmaps.contains_key(path) {
                    heightmaps.insert(path.clone(), RasterHeightMap::from_path(path)?);
                }
            }
        }

        Ok(Self {
            settings,
            heightmaps,
            tracker: StateTracker::new(),
            state: PipelineState::Idle,
            active_config: None,
        })
    }

    /// The current pipeline phase
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The tracked machine state
    pub fn machine_state(&self) -> &crate::state::MachineState {
        self.tracker.state()
    }

    /// Generate the complete command stream for a document
    pub fn generate(mut self, document: &Document) -> Result<Vec<Command>> {
        let mut commands = Vec::new();
        self.generate_into(document, &mut commands)?;
        Ok(commands)
    }

    /// Generate commands into a sink
    ///
    /// On any mid-stream failure the abort handler forces the machine
    /// into a safe state (Z at or above `safe_z`, tool and coolant off)
    /// before the error propagates, so the last emitted state is always
    /// safe to stop at.
    pub fn generate_into(
        &mut self,
        document: &Document,
        sink: &mut dyn CommandSink,
    ) -> Result<()> {
        info!(layers = document.layers.len(), "generating command stream");

        match self.run(document, sink) {
            Ok(()) => Ok(()),
            Err(error) => {
                self.emergency_stop(sink);
                Err(error)
            }
        }
    }

    fn run(&mut self, document: &Document, sink: &mut dyn CommandSink) -> Result<()> {
        for (offset, layer) in document.layers.iter().enumerate() {
            let index = offset + 1;

            self.state = PipelineState::LayerSetup(index);
            let config = self.settings.resolve_layer(index)?;
            self.active_config = Some(config.clone());
            self.setup_layer(index, &config, sink)?;

            self.state = PipelineState::LayerPaths(index);
            let profile = tools::profile(config.tool_type);
            let heightmap = match &config.height_map_path {
                Some(path) => {
                    let map = self.heightmaps.get_mut(path).ok_or_else(|| {
                        Error::other(format!("heightmap not preloaded: {}", path.display()))
                    })?;
                    map.set_scale(config.height_map_scale);
                    map.set_tolerance(config.height_map_tolerance);
                    Some(&*map)
                }
                None => None,
            };

            let emitter = PathEmitter::new(&config, profile, heightmap);
            for path in &layer.paths {
                emitter.emit_path(path, &mut self.tracker, sink);
            }

            self.state = PipelineState::LayerTeardown(index);
            debug!(layer = index, "layer complete");
        }

        self.finish(sink);
        Ok(())
    }

    /// Enter a layer: tool change, warmup, and state transitions
    fn setup_layer(
        &mut self,
        index: usize,
        config: &LayerConfig,
        sink: &mut dyn CommandSink,
    ) -> Result<()> {
        debug!(layer = index, tool = %config.tool_type, "layer setup");

        let profile = tools::profile(config.tool_type);
        let mounted_number = self.tracker.state().tool_number;
        let mounted_type = self.tracker.state().tool_type;

        let needs_change = match (mounted_number, mounted_type) {
            (Some(number), Some(tool_type)) => {
                number != config.tool_number || tool_type != config.tool_type
            }
            _ => {
                // First layer: the operator mounts the initial tool
                // before the program runs
                self.tracker.adopt_tool(config.tool_number, config.tool_type);
                false
            }
        };

        if needs_change {
            if config.rack_type == RackType::Off {
                return Err(ConfigError::ToolChangeNotAllowed { layer: index }.into());
            }

            // The tool and coolant must be inactive before the swap,
            // and the head parked clear of the material
            self.tracker
                .transition_to(&StateRequest::tool_shutdown(), sink);
            self.tracker
                .retract_to(config.park_z, config.travel_speed, sink);

            if config.rack_type == RackType::Manual {
                sink.push(Command::Pause {
                    message: Some(format!(
                        "Install tool {} ({})",
                        config.tool_number, config.tool_type
                    )),
                });
            }

            self.tracker
                .change_tool(config.tool_number, config.tool_type, sink);
        }

        let spindle_was_off = self.tracker.state().spindle.is_off();
        let hotend_before = self.tracker.state().hotend;

        let request = StateRequest {
            spindle: profile.uses_spindle.then(|| SpindleState::Running {
                direction: config.spin_mode,
                rpm: config.spindle_rpm,
            }),
            // Beam power is driven per path by the emitter
            power: None,
            coolant: Some(config.coolant_type),
            fan_speed: Some(match config.fan_type {
                FanMode::Off => 0,
                FanMode::Cooling => config.fan_speed,
            }),
            bed: Some(match config.bed_type {
                BedMode::Off => HeatState::Off,
                BedMode::Heated => HeatState::Heated {
                    celsius: config.bed_temperature,
                },
            }),
            hotend: profile.uses_heater.then(|| HeatState::Heated {
                celsius: config.hotend_temperature,
            }),
        };
        self.tracker.transition_to(&request, sink);

        let spindle_started =
            profile.uses_spindle && spindle_was_off && !self.tracker.state().spindle.is_off();
        let heater_changed = profile.uses_heater && self.tracker.state().hotend != hotend_before;

        if profile.requires_warmup && (spindle_started || heater_changed) {
            sink.push(Command::Delay {
                duration: config.warmup_delay,
            });
        }

        Ok(())
    }

    /// Park the head and shut every axis down after the last layer
    fn finish(&mut self, sink: &mut dyn CommandSink) {
        if let Some(config) = &self.active_config {
            let park_z = config.park_z;
            let travel_speed = config.travel_speed;
            self.tracker.retract_to(park_z, travel_speed, sink);
            self.tracker.transition_to(&StateRequest::all_off(), sink);
        }
        self.state = PipelineState::Finished;
        info!("generation finished");
    }

    /// Force a safe machine state before an error propagates
    fn emergency_stop(&mut self, sink: &mut dyn CommandSink) {
        let Some(config) = self.active_config.clone() else {
            return;
        };

        warn!("generation aborted; forcing safe machine state");

        let z = self.tracker.state().position.z.max(config.safe_z);
        self.tracker.retract_to(z, config.travel_speed, sink);
        self.tracker
            .transition_to(&StateRequest::tool_shutdown(), sink);
        sink.push(Command::Pause {
            message: Some("Generation aborted".to_string()),
        });
    }
}
