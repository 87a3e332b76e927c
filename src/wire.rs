//! Port bundles for the external collaborators and the standard wiring.
//!
//! Drivers, recorder, GUI and sound player live outside this crate; each is
//! represented here only by the ports it owns. `wire` builds the fixed
//! connection graph between them and the control loop. All connections are
//! made here, once, at assembly time; absent collaborators simply contribute
//! no edges.

use std::collections::HashMap;

use crate::buttons::ButtonFrame;
use crate::control::DataCollectionController;
use crate::signal::{Emitter, Receiver};
use crate::types::{
    ControllerPoses, Frame, RecorderCommand, RobotCommand, RobotState, SignalValue,
};
use crate::world::World;
use crate::{Result, WaldoError};

/// Robot-arm driver side: a command sink and a state source.
#[derive(Default)]
pub struct RobotPorts {
    pub commands: Receiver<RobotCommand>,
    pub state: Emitter<RobotState>,
}

/// Gripper driver side: grip target in [0, 1] and the measured grip back.
#[derive(Default)]
pub struct GripperPorts {
    pub target_grip: Receiver<f64>,
    pub grip: Emitter<f64>,
}

/// Tracking-device side: controller poses and raw button frames out, an
/// optional video stream back to the operator's display.
#[derive(Default)]
pub struct ControllerPorts {
    pub poses: Emitter<ControllerPoses>,
    pub buttons: Emitter<ButtonFrame>,
    pub video: Receiver<Frame>,
}

/// Sound-player side: a wav token to play, and a continuous level (driven
/// from the arm's end-effector wrench) for force feedback audio.
#[derive(Default)]
pub struct SoundPorts {
    pub wav_path: Receiver<String>,
    pub level: Receiver<f64>,
}

/// GUI side: one frame receiver per displayed camera, created on demand.
#[derive(Default)]
pub struct GuiPorts {
    cameras: HashMap<String, Receiver<Frame>>,
}

impl GuiPorts {
    pub fn new() -> GuiPorts {
        GuiPorts::default()
    }

    pub fn camera(&mut self, name: &str) -> &mut Receiver<Frame> {
        self.cameras.entry(name.to_string()).or_default()
    }

    pub fn cameras(&mut self) -> impl Iterator<Item = (&String, &mut Receiver<Frame>)> {
        self.cameras.iter_mut()
    }
}

/// Recorder side: the episode command channel plus named signal inputs.
/// Signals must be registered before they can be wired; looking up an
/// unregistered name is an assembly error, never a silent drop.
#[derive(Default)]
pub struct RecorderPorts {
    pub commands: Receiver<RecorderCommand>,
    inputs: HashMap<String, Receiver<SignalValue>>,
}

impl RecorderPorts {
    pub fn new() -> RecorderPorts {
        RecorderPorts::default()
    }

    pub fn add_signal(&mut self, name: &str) -> Result<()> {
        if self.inputs.contains_key(name) {
            return Err(WaldoError::DuplicateSignal { name: name.to_string() });
        }
        self.inputs.insert(name.to_string(), Receiver::new());
        Ok(())
    }

    pub fn input(&mut self, name: &str) -> Result<&mut Receiver<SignalValue>> {
        self.inputs
            .get_mut(name)
            .ok_or_else(|| WaldoError::UnknownSignal { name: name.to_string() })
    }

    /// All registered inputs, for the recorder driver's drain loop.
    pub fn signals(&mut self) -> impl Iterator<Item = (&String, &mut Receiver<SignalValue>)> {
        self.inputs.iter_mut()
    }
}

/// Magnitude of the end-effector wrench, for the audio level channel.
fn wrench_level(state: &RobotState) -> f64 {
    match &state.ee_wrench {
        Some(w) => w.iter().map(|v| v * v).sum::<f64>().sqrt(),
        None => 0.0,
    }
}

/// Build the standard data-collection graph.
///
/// Camera streams fan out to every interested consumer (recorder, GUI, and
/// optionally back to the operator's display via `stream_to_controller`);
/// a camera stream that would end up with no consumers at all is an
/// assembly error.
#[allow(clippy::too_many_arguments)]
pub fn wire(
    world: &mut World,
    dc: &mut DataCollectionController,
    controller: &mut ControllerPorts,
    mut robot: Option<&mut RobotPorts>,
    gripper: Option<&mut GripperPorts>,
    mut sound: Option<&mut SoundPorts>,
    mut recorder: Option<&mut RecorderPorts>,
    mut gui: Option<&mut GuiPorts>,
    cameras: &mut HashMap<String, Emitter<Frame>>,
    stream_to_controller: Option<&str>,
) -> Result<()> {
    world.connect(&mut controller.poses, &mut dc.controller_poses);
    world.connect(&mut controller.buttons, &mut dc.button_frames);

    if let Some(rec) = recorder.as_deref_mut() {
        rec.add_signal("controller_poses")?;
        rec.add_signal("target_grip")?;
        rec.add_signal("robot_commands")?;
        rec.add_signal("robot_state")?;
        rec.add_signal("grip")?;

        world.connect(&mut dc.recorder_commands, &mut rec.commands);
        world.connect_map(&mut controller.poses, rec.input("controller_poses")?, |p| {
            SignalValue::ControllerPoses(p.clone())
        });
        world.connect_map(&mut dc.target_grip, rec.input("target_grip")?, |g| {
            SignalValue::Scalar(*g)
        });
        world.connect_map(&mut dc.robot_commands, rec.input("robot_commands")?, |c| {
            SignalValue::RobotCommand(c.clone())
        });
    }

    if let Some(robot) = robot.as_deref_mut() {
        world.connect(&mut dc.robot_commands, &mut robot.commands);
        world.connect(&mut robot.state, &mut dc.robot_state);
        if let Some(rec) = recorder.as_deref_mut() {
            world.connect_map(&mut robot.state, rec.input("robot_state")?, |s| {
                SignalValue::RobotState(s.clone())
            });
        }
        if let Some(snd) = sound.as_deref_mut() {
            world.connect_map(&mut robot.state, &mut snd.level, wrench_level);
        }
    }

    if let Some(gripper) = gripper {
        world.connect(&mut dc.target_grip, &mut gripper.target_grip);
        if let Some(rec) = recorder.as_deref_mut() {
            world.connect_map(&mut gripper.grip, rec.input("grip")?, |g| {
                SignalValue::Scalar(*g)
            });
        }
    }

    if let Some(snd) = sound.as_deref_mut() {
        world.connect(&mut dc.sound, &mut snd.wav_path);
    }

    for (name, cam) in cameras.iter_mut() {
        let mut consumers = 0;
        if let Some(rec) = recorder.as_deref_mut() {
            rec.add_signal(name)?;
            world.connect_map(cam, rec.input(name)?, |f: &Frame| SignalValue::Frame(f.clone()));
            consumers += 1;
        }
        if let Some(gui) = gui.as_deref_mut() {
            world.connect(cam, gui.camera(name));
            consumers += 1;
        }
        if stream_to_controller == Some(name.as_str()) {
            world.connect(cam, &mut controller.video);
            consumers += 1;
        }
        if consumers == 0 {
            return Err(WaldoError::NoReceivers { signal: name.clone() });
        }
    }

    Ok(())
}
