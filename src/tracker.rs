//! Teleop tracker: maps tracked controller poses into robot targets with
//! jump-free engagement.
//!
//! While disengaged the operator can move freely; on engage the tracker
//! captures an offset so the first commanded target equals the robot's
//! current end-effector pose exactly. With no operator calibration the
//! tracker runs in passthrough (UMI) mode: permanently engaged, controller
//! pose forwarded unchanged.

use crate::geom::Pose;

/// Where the operator stands relative to the robot. Each preset is a fixed
/// rotation mapping the tracking device's axes into the robot world frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFrame {
    /// Operator faces the robot: maps xyz -> zxy.
    Front,
    /// Operator behind the robot: maps xyz -> zxy with x and y flipped.
    Back,
}

impl OperatorFrame {
    pub fn pose(self) -> Pose {
        match self {
            OperatorFrame::Front => Pose::from_quat_xyzw([0.0; 3], [0.5, 0.5, 0.5, 0.5]),
            OperatorFrame::Back => Pose::from_quat_xyzw([0.0; 3], [-0.5, -0.5, 0.5, 0.5]),
        }
    }
}

/// Engage/disengage state machine turning raw controller poses into robot
/// targets. One instance per control loop; all state is per-instance and
/// initialized in the constructor.
#[derive(Debug)]
pub struct Tracker {
    calibration: Option<Pose>,
    engaged: bool,
    /// Captured at the last engage, never cleared on disengage; the next
    /// engage overwrites it.
    offset: Pose,
    last_mapped: Pose,
}

impl Tracker {
    /// `calibration` maps the operator frame into the robot world frame;
    /// `None` selects passthrough mode.
    pub fn new(calibration: Option<Pose>) -> Tracker {
        let passthrough = calibration.is_none();
        Tracker {
            calibration,
            engaged: passthrough,
            offset: Pose::identity(),
            last_mapped: Pose::identity(),
        }
    }

    pub fn passthrough(&self) -> bool {
        self.calibration.is_none()
    }

    pub fn engaged(&self) -> bool {
        self.engaged
    }

    /// Start driving the robot from controller motion. The offset is chosen
    /// so that re-running `update` on the controller pose observed at engage
    /// time reproduces `robot_pose` exactly.
    pub fn engage(&mut self, robot_pose: &Pose) {
        if self.passthrough() {
            log::warn!("Ignoring tracking engage in passthrough mode");
            return;
        }
        self.engaged = true;
        self.offset = Pose::new(
            robot_pose.translation - self.last_mapped.translation,
            self.last_mapped.rotation.inverse() * robot_pose.rotation,
        );
        log::info!("Tracking engaged");
    }

    pub fn disengage(&mut self) {
        if self.passthrough() {
            log::warn!("Ignoring tracking disengage in passthrough mode");
            return;
        }
        self.engaged = false;
        log::info!("Tracking disengaged");
    }

    /// Map a raw controller pose to the robot target. In passthrough mode
    /// the pose is returned unchanged. Otherwise the pose is conjugated into
    /// the robot frame by the calibration and combined with the engage-time
    /// offset (translations summed, rotations composed). Callers emit the
    /// result downstream only while `engaged()`.
    pub fn update(&mut self, raw: &Pose) -> Pose {
        let Some(calibration) = &self.calibration else {
            return *raw;
        };
        let mapped = calibration.compose(raw).compose(&calibration.inverse());
        self.last_mapped = mapped;
        Pose::new(
            mapped.translation + self.offset.translation,
            mapped.rotation * self.offset.rotation,
        )
    }
}
