//! Machine state tracking
//!
//! A single mutable [`MachineState`] exists per generation run, owned
//! by the pipeline and mutated in strict emission order. The tracker is
//! the only component that emits state-changing commands: every
//! requested transition is diffed against the tracked state, and a
//! command is produced only for axes that actually change. This is the
//! mechanism that suppresses redundant coolant/fan/bed/spindle commands
//! across paths and layer boundaries.

use tracing::trace;

use pathcam_core::commands::{Command, CommandSink};
use pathcam_core::machine::{CoolantMode, HeatState, PowerState, SpindleState, ToolType};

/// Current machine position in document units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

/// Snapshot of every tracked machine-state axis
#[derive(Debug, Clone, PartialEq)]
pub struct MachineState {
    /// Currently mounted tool number, if any tool was adopted yet
    pub tool_number: Option<u32>,
    /// Currently mounted tool type
    pub tool_type: Option<ToolType>,
    /// Spindle state
    pub spindle: SpindleState,
    /// Beam power state
    pub power: PowerState,
    /// Coolant mode
    pub coolant: CoolantMode,
    /// Part fan speed (0 = off)
    pub fan_speed: u8,
    /// Bed heater state
    pub bed: HeatState,
    /// Hotend heater state
    pub hotend: HeatState,
    /// Current position
    pub position: Position,
}

impl Default for MachineState {
    fn default() -> Self {
        Self {
            tool_number: None,
            tool_type: None,
            spindle: SpindleState::Off,
            power: PowerState::Off,
            coolant: CoolantMode::Off,
            fan_speed: 0,
            bed: HeatState::Off,
            hotend: HeatState::Off,
            position: Position::default(),
        }
    }
}

/// A requested partial state: `None` axes are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateRequest {
    /// Requested spindle state
    pub spindle: Option<SpindleState>,
    /// Requested beam power state
    pub power: Option<PowerState>,
    /// Requested coolant mode
    pub coolant: Option<CoolantMode>,
    /// Requested fan speed
    pub fan_speed: Option<u8>,
    /// Requested bed state
    pub bed: Option<HeatState>,
    /// Requested hotend state
    pub hotend: Option<HeatState>,
}

impl StateRequest {
    /// A request that touches no axis
    pub fn none() -> Self {
        Self::default()
    }

    /// A request that turns every axis off
    pub fn all_off() -> Self {
        Self {
            spindle: Some(SpindleState::Off),
            power: Some(PowerState::Off),
            coolant: Some(CoolantMode::Off),
            fan_speed: Some(0),
            bed: Some(HeatState::Off),
            hotend: Some(HeatState::Off),
        }
    }

    /// A request that deactivates the tool and coolant, leaving
    /// heaters and fan untouched
    pub fn tool_shutdown() -> Self {
        Self {
            spindle: Some(SpindleState::Off),
            power: Some(PowerState::Off),
            coolant: Some(CoolantMode::Off),
            ..Self::default()
        }
    }
}

/// Tracks machine state and emits only effective state changes
#[derive(Debug, Default)]
pub struct StateTracker {
    state: MachineState,
}

impl StateTracker {
    /// Create a tracker with everything off at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// The current tracked state
    pub fn state(&self) -> &MachineState {
        &self.state
    }

    /// Adopt a tool without emitting commands
    ///
    /// Used for the first layer: the operator mounts the initial tool
    /// before the program runs, so no change sequence is required.
    pub fn adopt_tool(&mut self, number: u32, tool_type: ToolType) {
        trace!(number, %tool_type, "adopting initial tool");
        self.state.tool_number = Some(number);
        self.state.tool_type = Some(tool_type);
    }

    /// Emit a tool-change record and update the tracked tool
    pub fn change_tool(&mut self, number: u32, tool_type: ToolType, sink: &mut dyn CommandSink) {
        trace!(number, %tool_type, "tool change");
        self.state.tool_number = Some(number);
        self.state.tool_type = Some(tool_type);
        sink.push(Command::ToolChange { number });
    }

    /// Drive the machine towards the requested state
    ///
    /// Compares each requested axis against the tracked state and
    /// emits a command only for axes that actually change. Returns the
    /// number of commands emitted.
    pub fn transition_to(&mut self, request: &StateRequest, sink: &mut dyn CommandSink) -> usize {
        let mut emitted = 0;

        if let Some(spindle) = request.spindle {
            if spindle != self.state.spindle {
                self.state.spindle = spindle;
                sink.push(Command::SpindleSet { state: spindle });
                emitted += 1;
            }
        }

        if let Some(power) = request.power {
            if power != self.state.power {
                self.state.power = power;
                sink.push(Command::PowerSet { state: power });
                emitted += 1;
            }
        }

        if let Some(coolant) = request.coolant {
            if coolant != self.state.coolant {
                self.state.coolant = coolant;
                sink.push(Command::CoolantSet { mode: coolant });
                emitted += 1;
            }
        }

        if let Some(fan_speed) = request.fan_speed {
            if fan_speed != self.state.fan_speed {
                self.state.fan_speed = fan_speed;
                sink.push(Command::FanSet { speed: fan_speed });
                emitted += 1;
            }
        }

        if let Some(bed) = request.bed {
            if bed != self.state.bed {
                self.state.bed = bed;
                sink.push(Command::BedSet { state: bed });
                emitted += 1;
            }
        }

        if let Some(hotend) = request.hotend {
            if hotend != self.state.hotend {
                self.state.hotend = hotend;
                sink.push(Command::HeaterSet { state: hotend });
                emitted += 1;
            }
        }

        emitted
    }

    /// Emit a travel move and update the tracked position
    ///
    /// A travel to the current position is suppressed.
    pub fn travel_to(&mut self, x: f64, y: f64, z: f64, feed: f64, sink: &mut dyn CommandSink) {
        let target = Position { x, y, z };
        if target == self.state.position {
            return;
        }
        self.state.position = target;
        sink.push(Command::TravelMove { x, y, z, feed });
    }

    /// Emit a plunge move and update the tracked Z
    pub fn plunge_to(
        &mut self,
        z: f64,
        feed: f64,
        extrude: Option<f64>,
        sink: &mut dyn CommandSink,
    ) {
        self.state.position.z = z;
        sink.push(Command::PlungeMove { z, feed, extrude });
    }

    /// Emit a work move and update the tracked position
    pub fn work_to(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        feed: f64,
        extrude: Option<f64>,
        sink: &mut dyn CommandSink,
    ) {
        self.state.position = Position { x, y, z };
        sink.push(Command::WorkMove {
            x,
            y,
            z,
            feed,
            extrude,
        });
    }

    /// Emit a retract move and update the tracked Z
    pub fn retract_to(&mut self, z: f64, feed: f64, sink: &mut dyn CommandSink) {
        self.state.position.z = z;
        sink.push(Command::RetractMove { z, feed });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathcam_core::machine::SpinDirection;

    fn running(rpm: f64) -> SpindleState {
        SpindleState::Running {
            direction: SpinDirection::Clockwise,
            rpm,
        }
    }

    #[test]
    fn test_transition_emits_only_diffs() {
        let mut tracker = StateTracker::new();
        let mut sink: Vec<Command> = Vec::new();

        let request = StateRequest {
            spindle: Some(running(1000.0)),
            coolant: Some(CoolantMode::Flood),
            ..StateRequest::none()
        };

        assert_eq!(tracker.transition_to(&request, &mut sink), 2);
        assert_eq!(tracker.transition_to(&request, &mut sink), 0);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_no_consecutive_identical_axis_commands() {
        let mut tracker = StateTracker::new();
        let mut sink: Vec<Command> = Vec::new();

        for _ in 0..3 {
            tracker.transition_to(
                &StateRequest {
                    fan_speed: Some(128),
                    ..StateRequest::none()
                },
                &mut sink,
            );
        }
        tracker.transition_to(
            &StateRequest {
                fan_speed: Some(0),
                ..StateRequest::none()
            },
            &mut sink,
        );

        assert_eq!(
            sink,
            vec![Command::FanSet { speed: 128 }, Command::FanSet { speed: 0 }]
        );
    }

    #[test]
    fn test_off_requests_on_idle_machine_emit_nothing() {
        let mut tracker = StateTracker::new();
        let mut sink: Vec<Command> = Vec::new();

        assert_eq!(tracker.transition_to(&StateRequest::all_off(), &mut sink), 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_spindle_speed_change_is_a_change() {
        let mut tracker = StateTracker::new();
        let mut sink: Vec<Command> = Vec::new();

        tracker.transition_to(
            &StateRequest {
                spindle: Some(running(1000.0)),
                ..StateRequest::none()
            },
            &mut sink,
        );
        tracker.transition_to(
            &StateRequest {
                spindle: Some(running(2000.0)),
                ..StateRequest::none()
            },
            &mut sink,
        );

        assert_eq!(sink.len(), 2);
        assert!(matches!(
            sink[1],
            Command::SpindleSet {
                state: SpindleState::Running { rpm, .. }
            } if rpm == 2000.0
        ));
    }

    #[test]
    fn test_zero_distance_travel_is_suppressed() {
        let mut tracker = StateTracker::new();
        let mut sink: Vec<Command> = Vec::new();

        tracker.travel_to(5.0, 5.0, 10.0, 3000.0, &mut sink);
        tracker.travel_to(5.0, 5.0, 10.0, 3000.0, &mut sink);

        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_moves_update_position() {
        let mut tracker = StateTracker::new();
        let mut sink: Vec<Command> = Vec::new();

        tracker.travel_to(1.0, 2.0, 10.0, 3000.0, &mut sink);
        tracker.plunge_to(0.5, 200.0, None, &mut sink);
        tracker.work_to(4.0, 6.0, 0.5, 500.0, None, &mut sink);
        tracker.retract_to(10.0, 3000.0, &mut sink);

        assert_eq!(
            tracker.state().position,
            Position {
                x: 4.0,
                y: 6.0,
                z: 10.0
            }
        );
        assert_eq!(sink.len(), 4);
    }

    #[test]
    fn test_adopt_tool_emits_nothing() {
        let mut tracker = StateTracker::new();
        tracker.adopt_tool(3, ToolType::Beam);
        assert_eq!(tracker.state().tool_number, Some(3));
        assert_eq!(tracker.state().tool_type, Some(ToolType::Beam));
    }

    #[test]
    fn test_change_tool_emits_record() {
        let mut tracker = StateTracker::new();
        let mut sink: Vec<Command> = Vec::new();

        tracker.change_tool(2, ToolType::Spindle, &mut sink);
        assert_eq!(sink, vec![Command::ToolChange { number: 2 }]);
        assert_eq!(tracker.state().tool_type, Some(ToolType::Spindle));
    }
}
