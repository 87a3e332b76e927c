use std::sync::Arc;

use crate::geom::Pose;

/// Open key/value mapping snapshotted when an episode starts
/// (task label, simulator save-state, ...).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Commands accepted by the robot-arm collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum RobotCommand {
    /// Move the arm back to its home configuration.
    Reset,
    /// Track a cartesian end-effector target.
    CartesianPosition(Pose),
}

/// Episode lifecycle commands accepted by the recorder collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderCommand {
    StartEpisode(Metadata),
    StopEpisode,
    /// Discard the episode in flight, unconditionally.
    Abort,
}

/// Robot-arm state published at the driver's own cadence.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotState {
    pub ee_pose: Pose,
    /// End-effector wrench [fx, fy, fz, tx, ty, tz], if the arm senses it.
    pub ee_wrench: Option<[f64; 6]>,
}

/// Tracked controller poses, one per hand. A side the tracking device has
/// not seen (controller off, out of view) is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerPoses {
    pub left: Option<Pose>,
    pub right: Option<Pose>,
}

/// One camera frame. The pixel payload is opaque to this crate; decoding
/// belongs to the camera and display collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub bytes: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
}

/// Tagged payload for the recorder's named signal inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalValue {
    Scalar(f64),
    ControllerPoses(ControllerPoses),
    RobotCommand(RobotCommand),
    RobotState(RobotState),
    Frame(Frame),
}
