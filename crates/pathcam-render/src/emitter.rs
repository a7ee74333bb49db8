//! Path emission
//!
//! Walks the geometry of one layer and emits travel, plunge, work, and
//! retract moves for each path, applying heightmap compensation and
//! tool-specific behavior. Two independent subdivision criteria are
//! applied to every work segment: chord length against `resolution`,
//! and interpolated Z deviation against the heightmap tolerance.

use std::f64::consts::PI;

use tracing::warn;

use pathcam_core::commands::CommandSink;
use pathcam_core::geometry::{Point, Polyline};
use pathcam_core::machine::PowerState;
use pathcam_settings::LayerConfig;

use crate::heightmap::{RasterHeightMap, MAX_SUBDIVISION_DEPTH};
use crate::state::{StateRequest, StateTracker};
use crate::tools::ToolProfile;

/// Emits motion commands for the paths of one layer
pub struct PathEmitter<'a> {
    config: &'a LayerConfig,
    profile: &'static ToolProfile,
    heightmap: Option<&'a RasterHeightMap>,
}

impl<'a> PathEmitter<'a> {
    /// Create an emitter for one layer's resolved configuration
    pub fn new(
        config: &'a LayerConfig,
        profile: &'static ToolProfile,
        heightmap: Option<&'a RasterHeightMap>,
    ) -> Self {
        Self {
            config,
            profile,
            heightmap,
        }
    }

    /// Emit the full motion sequence for one path
    ///
    /// Degenerate paths (fewer than two points, or zero length) are
    /// skipped with a warning; generation continues.
    pub fn emit_path(
        &self,
        path: &Polyline,
        tracker: &mut StateTracker,
        sink: &mut dyn CommandSink,
    ) {
        if path.is_degenerate() {
            warn!(points = path.points.len(), "skipping degenerate path");
            return;
        }

        let config = self.config;
        let start = path.points[0];

        tracker.travel_to(start.x, start.y, config.safe_z, config.travel_speed, sink);
        tracker.plunge_to(config.plunge_z, config.plunge_speed, None, sink);
        tracker.plunge_to(self.work_z_at(&start), config.plunge_speed, None, sink);

        if let Some(mode) = self.profile.power_mode {
            tracker.transition_to(
                &StateRequest {
                    power: Some(PowerState::On {
                        mode,
                        level: config.power_level,
                    }),
                    ..StateRequest::none()
                },
                sink,
            );
        }

        if self.profile.uses_retraction {
            // Prime back the filament retracted after the previous path
            self.filament_move(config.retract_length, tracker, sink);
        }

        for pair in path.points.windows(2) {
            self.emit_segment(&pair[0], &pair[1], tracker, sink);
        }

        if self.profile.power_mode.is_some() {
            tracker.transition_to(
                &StateRequest {
                    power: Some(PowerState::Off),
                    ..StateRequest::none()
                },
                sink,
            );
        }

        if self.profile.uses_retraction {
            self.filament_move(-config.retract_length, tracker, sink);
        }

        tracker.retract_to(config.safe_z, config.travel_speed, sink);
    }

    /// Subdivide one input segment by chord length and emit its moves
    fn emit_segment(
        &self,
        from: &Point,
        to: &Point,
        tracker: &mut StateTracker,
        sink: &mut dyn CommandSink,
    ) {
        let length = from.distance_to(to);
        if length == 0.0 {
            return;
        }

        let chords = (length / self.config.resolution).ceil().max(1.0) as usize;
        let mut previous = *from;

        for step in 1..=chords {
            let target = from.lerp(to, step as f64 / chords as f64);
            self.refine_and_emit(previous, target, 0, tracker, sink);
            previous = target;
        }
    }

    /// Recursively split a sub-segment until consecutive interpolated
    /// Z offsets are within tolerance, then emit the work move
    fn refine_and_emit(
        &self,
        from: Point,
        to: Point,
        depth: u32,
        tracker: &mut StateTracker,
        sink: &mut dyn CommandSink,
    ) {
        if let Some(heightmap) = self.heightmap {
            if depth < MAX_SUBDIVISION_DEPTH {
                let delta = (self.offset_at(&to) - self.offset_at(&from)).abs();
                if delta > heightmap.tolerance() {
                    let mid = from.lerp(&to, 0.5);
                    self.refine_and_emit(from, mid, depth + 1, tracker, sink);
                    self.refine_and_emit(mid, to, depth + 1, tracker, sink);
                    return;
                }
            }
        }

        let extrude = self
            .profile
            .uses_retraction
            .then(|| self.extrusion_delta(from.distance_to(&to)));

        tracker.work_to(
            to.x,
            to.y,
            self.work_z_at(&to),
            self.config.work_speed,
            extrude,
            sink,
        );
    }

    /// Filament-only move at the current position
    fn filament_move(&self, delta: f64, tracker: &mut StateTracker, sink: &mut dyn CommandSink) {
        if delta == 0.0 {
            return;
        }
        let position = tracker.state().position;
        tracker.work_to(
            position.x,
            position.y,
            position.z,
            self.config.retract_speed,
            Some(delta),
            sink,
        );
    }

    /// Filament length required for a move of the given distance
    fn extrusion_delta(&self, distance: f64) -> f64 {
        let config = self.config;
        let radius = config.filament_diameter / 2.0;
        let cross_section = PI * radius * radius;
        let extrusion_area = config.nozzle_diameter * config.layer_height;

        distance * extrusion_area * config.extrusion_multiplier / cross_section
    }

    fn offset_at(&self, point: &Point) -> f64 {
        self.heightmap
            .map_or(0.0, |heightmap| heightmap.sample(point.x, point.y))
    }

    fn work_z_at(&self, point: &Point) -> f64 {
        self.config.work_z + self.offset_at(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools;
    use pathcam_core::commands::Command;
    use pathcam_core::machine::ToolType;

    fn emit(
        config: &LayerConfig,
        tool_type: ToolType,
        heightmap: Option<&RasterHeightMap>,
        path: &Polyline,
    ) -> Vec<Command> {
        let mut tracker = StateTracker::new();
        let mut sink: Vec<Command> = Vec::new();
        let emitter = PathEmitter::new(config, tools::profile(tool_type), heightmap);
        emitter.emit_path(path, &mut tracker, &mut sink);
        sink
    }

    #[test]
    fn test_basic_path_sequence() {
        let config = LayerConfig {
            resolution: 100.0,
            ..LayerConfig::default()
        };
        let path = Polyline::from_pairs(&[(0.0, 0.0), (10.0, 0.0)]);
        let commands = emit(&config, ToolType::Marker, None, &path);

        assert!(matches!(commands[0], Command::TravelMove { .. }));
        assert!(matches!(commands[1], Command::PlungeMove { .. }));
        assert!(matches!(commands[2], Command::PlungeMove { .. }));
        assert!(matches!(commands[3], Command::WorkMove { .. }));
        assert!(matches!(
            commands.last(),
            Some(Command::RetractMove { .. })
        ));
    }

    #[test]
    fn test_degenerate_paths_are_skipped() {
        let config = LayerConfig::default();

        let empty = Polyline::from_pairs(&[]);
        assert!(emit(&config, ToolType::Marker, None, &empty).is_empty());

        let single = Polyline::from_pairs(&[(1.0, 1.0)]);
        assert!(emit(&config, ToolType::Marker, None, &single).is_empty());

        let zero_length = Polyline::from_pairs(&[(1.0, 1.0), (1.0, 1.0)]);
        assert!(emit(&config, ToolType::Marker, None, &zero_length).is_empty());
    }

    #[test]
    fn test_chord_subdivision_by_resolution() {
        let config = LayerConfig {
            resolution: 1.0,
            ..LayerConfig::default()
        };
        let path = Polyline::from_pairs(&[(0.0, 0.0), (10.0, 0.0)]);
        let commands = emit(&config, ToolType::Marker, None, &path);

        let work_moves: Vec<_> = commands
            .iter()
            .filter(|c| matches!(c, Command::WorkMove { .. }))
            .collect();
        assert_eq!(work_moves.len(), 10);

        // No emitted chord exceeds the configured resolution
        let mut previous = (0.0f64, 0.0f64);
        for command in &commands {
            if let Command::WorkMove { x, y, .. } = command {
                let dx = x - previous.0;
                let dy = y - previous.1;
                assert!(dx.hypot(dy) <= 1.0 + 1e-9);
                previous = (*x, *y);
            }
        }
    }

    #[test]
    fn test_beam_power_wraps_work_moves() {
        let config = LayerConfig {
            resolution: 100.0,
            power_level: 80.0,
            ..LayerConfig::default()
        };
        let path = Polyline::from_pairs(&[(0.0, 0.0), (5.0, 0.0)]);
        let commands = emit(&config, ToolType::Beam, None, &path);

        let power_on = commands
            .iter()
            .position(|c| matches!(c, Command::PowerSet { state: PowerState::On { .. } }))
            .unwrap();
        let power_off = commands
            .iter()
            .position(|c| matches!(c, Command::PowerSet { state: PowerState::Off }))
            .unwrap();
        let first_work = commands
            .iter()
            .position(|c| matches!(c, Command::WorkMove { .. }))
            .unwrap();
        let last_work = commands
            .iter()
            .rposition(|c| matches!(c, Command::WorkMove { .. }))
            .unwrap();

        assert!(power_on < first_work);
        assert!(power_off > last_work);
    }

    #[test]
    fn test_extruder_prime_and_retract() {
        let config = LayerConfig {
            resolution: 100.0,
            retract_length: 2.0,
            ..LayerConfig::default()
        };
        let path = Polyline::from_pairs(&[(0.0, 0.0), (10.0, 0.0)]);
        let commands = emit(&config, ToolType::Extruder, None, &path);

        let filament: Vec<f64> = commands
            .iter()
            .filter_map(|c| match c {
                Command::WorkMove {
                    extrude: Some(e), ..
                } => Some(*e),
                _ => None,
            })
            .collect();

        // Prime first, forward extrusion during the move, retract last
        assert_eq!(filament.first(), Some(&2.0));
        assert_eq!(filament.last(), Some(&-2.0));
        assert!(filament[1..filament.len() - 1].iter().all(|&e| e > 0.0));
    }

    #[test]
    fn test_extrusion_volume_matches_geometry() {
        let config = LayerConfig {
            resolution: 100.0,
            filament_diameter: 1.75,
            nozzle_diameter: 0.4,
            layer_height: 0.2,
            extrusion_multiplier: 1.0,
            ..LayerConfig::default()
        };
        let emitter = PathEmitter::new(&config, tools::profile(ToolType::Extruder), None);

        let delta = emitter.extrusion_delta(10.0);
        let cross_section = PI * (1.75f64 / 2.0) * (1.75 / 2.0);
        let expected = 10.0 * 0.4 * 0.2 / cross_section;
        assert!((delta - expected).abs() < 1e-12);
    }

    #[test]
    fn test_heightmap_tolerance_subdivision() {
        // Steep ramp: z goes 0 -> 5 over 10 units of x
        let mut heightmap =
            RasterHeightMap::from_samples(11, 1, (0..11).map(|i| i as f32 / 10.0).collect());
        heightmap.set_scale(5.0);
        heightmap.set_tolerance(0.1);

        let config = LayerConfig {
            resolution: 100.0,
            ..LayerConfig::default()
        };
        let path = Polyline::from_pairs(&[(0.0, 0.0), (10.0, 0.0)]);
        let commands = emit(&config, ToolType::Marker, Some(&heightmap), &path);

        let mut z_values = Vec::new();
        for command in &commands {
            if let Command::WorkMove { z, .. } = command {
                z_values.push(*z);
            }
        }
        assert!(z_values.len() > 1);

        // Max Z delta between consecutive emitted work points is within
        // tolerance (the plunge reached the compensated start height)
        let mut previous = heightmap.sample(0.0, 0.0) + config.work_z;
        for z in z_values {
            assert!((z - previous).abs() <= 0.1 + 1e-9);
            previous = z;
        }
    }

    #[test]
    fn test_flat_heightmap_adds_no_subdivision() {
        let mut heightmap = RasterHeightMap::from_samples(4, 4, vec![0.5; 16]);
        heightmap.set_scale(2.0);
        heightmap.set_tolerance(0.01);

        let config = LayerConfig {
            resolution: 100.0,
            ..LayerConfig::default()
        };
        let path = Polyline::from_pairs(&[(0.0, 0.0), (3.0, 3.0)]);
        let commands = emit(&config, ToolType::Marker, Some(&heightmap), &path);

        let work_moves: Vec<_> = commands
            .iter()
            .filter(|c| matches!(c, Command::WorkMove { .. }))
            .collect();
        assert_eq!(work_moves.len(), 1);

        // The constant offset is applied to the work height
        if let Command::WorkMove { z, .. } = work_moves[0] {
            assert_eq!(*z, config.work_z + 1.0);
        }
    }
}
