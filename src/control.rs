//! The data-collection control loop.
//!
//! One `tick` fuses the operator's tracked pose and button input into robot
//! and recorder commands, in a fixed order: buttons first, then the episode
//! and tracking state machines, then the continuous grip target, then the
//! pose target. Nothing here blocks; every input read is fresh-or-`None`.

use std::time::Duration;

use crate::buttons::{Button, ButtonFrame, ButtonHandler, Side};
use crate::geom::Pose;
use crate::recording::{RecordingState, RecordingSwitch};
use crate::signal::{Emitter, Receiver};
use crate::tracker::Tracker;
use crate::types::{ControllerPoses, Metadata, RecorderCommand, RobotCommand, RobotState};
use crate::world::ControlSystem;
use crate::Result;

pub const RECORDING_STARTED_WAV: &str = "assets/sounds/recording-has-started.wav";
pub const RECORDING_STOPPED_WAV: &str = "assets/sounds/recording-has-stopped.wav";
pub const RECORDING_ABORTED_WAV: &str = "assets/sounds/recording-has-been-aborted.wav";

const TICK_PERIOD: Duration = Duration::from_millis(1);

/// Foreground control system for teleoperated episode collection.
///
/// Right-hand mapping (from the tracking device's raw button array):
/// B toggles recording, A toggles tracking, the stick press aborts and
/// resets, the trigger is the continuous grip target.
pub struct DataCollectionController {
    tracker: Tracker,
    buttons: ButtonHandler,
    episode: RecordingSwitch,

    pub controller_poses: Receiver<ControllerPoses>,
    pub button_frames: Receiver<ButtonFrame>,
    pub robot_state: Receiver<RobotState>,

    pub robot_commands: Emitter<RobotCommand>,
    pub target_grip: Emitter<f64>,
    pub recorder_commands: Emitter<RecorderCommand>,
    pub sound: Emitter<String>,
}

impl DataCollectionController {
    /// `calibration` maps the operator frame into the robot world frame;
    /// `None` selects passthrough (UMI) mode. Episodes start with empty
    /// metadata; see `with_metadata`.
    pub fn new(calibration: Option<Pose>) -> DataCollectionController {
        Self::build(calibration, RecordingSwitch::bare())
    }

    /// As `new`, with a metadata provider snapshotted at each episode start.
    pub fn with_metadata(
        calibration: Option<Pose>,
        metadata: Box<dyn Fn() -> Metadata + Send>,
    ) -> DataCollectionController {
        Self::build(calibration, RecordingSwitch::new(metadata))
    }

    fn build(calibration: Option<Pose>, episode: RecordingSwitch) -> DataCollectionController {
        DataCollectionController {
            tracker: Tracker::new(calibration),
            buttons: ButtonHandler::new(),
            episode,
            controller_poses: Receiver::new(),
            button_frames: Receiver::new(),
            robot_state: Receiver::new(),
            robot_commands: Emitter::new(),
            target_grip: Emitter::new(),
            recorder_commands: Emitter::new(),
            sound: Emitter::new(),
        }
    }

    pub fn recording_state(&self) -> RecordingState {
        self.episode.state()
    }

    pub fn tracking_engaged(&self) -> bool {
        self.tracker.engaged()
    }

    fn toggle_recording(&mut self) {
        let command = self.episode.toggle();
        let cue = match command {
            RecorderCommand::StartEpisode(_) => RECORDING_STARTED_WAV,
            _ => RECORDING_STOPPED_WAV,
        };
        self.recorder_commands.emit(command);
        self.sound.emit(cue.to_string());
    }

    fn toggle_tracking(&mut self) {
        if self.tracker.engaged() {
            self.tracker.disengage();
        } else {
            match self.robot_state.latest() {
                Some(state) => self.tracker.engage(&state.data.ee_pose),
                None => log::warn!("cannot engage tracking: no robot state observed yet"),
            }
        }
    }

    fn abort_and_reset(&mut self) {
        log::info!("Resetting robot");
        if let Some(command) = self.episode.abort() {
            self.recorder_commands.emit(command);
            self.sound.emit(RECORDING_ABORTED_WAV.to_string());
        }
        self.tracker.disengage();
        self.robot_commands.emit(RobotCommand::Reset);
    }
}

impl ControlSystem for DataCollectionController {
    fn tick(&mut self) -> Result<Duration> {
        // 1. Latest button frame; no input yet is an ordinary tick.
        if let Some(frame) = self.button_frames.latest() {
            self.buttons.update(&frame.data);
        }

        // 2-4. Edge-driven state machines, in fixed order. The abort on the
        // reset edge runs last so it wins over anything mid-flight.
        if self.buttons.just_pressed(Side::Right, Button::B) {
            self.toggle_recording();
        }
        if self.buttons.just_pressed(Side::Right, Button::A) {
            self.toggle_tracking();
        }
        if self.buttons.just_pressed(Side::Right, Button::Stick) && !self.tracker.passthrough() {
            self.abort_and_reset();
        }

        // 5. Continuous grip target, every tick.
        self.target_grip
            .emit(self.buttons.value(Side::Right, Button::Trigger));

        // 6. Fresh controller pose -> target. The update runs even while
        // disengaged to keep the offset math warm, but only an engaged
        // tracker commands the robot.
        if let Some(poses) = self.controller_poses.read() {
            if let Some(right) = poses.data.right {
                let target = self.tracker.update(&right);
                if self.tracker.engaged() {
                    self.robot_commands
                        .emit(RobotCommand::CartesianPosition(target));
                }
            }
        }

        Ok(TICK_PERIOD)
    }
}
