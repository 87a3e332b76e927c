//! # waldo - teleoperation control core for robot data collection
//!
//! Fuses a tracked 6-DoF controller pose and button input into robot motion
//! and grip commands while recording synchronized trajectories. Provides:
//! - A jump-free engage/disengage teleop tracker with operator-frame calibration
//! - A 1 kHz tick loop driving the recording and tracking state machines
//! - A latest-value dataflow wiring graph (unicast, broadcast, per-edge transforms)
//!   between independently scheduled components
//!
//! Robot, gripper, camera, sound and recorder drivers are external
//! collaborators reached through the typed ports in [`wire`].
//!
//! ## Quick Start
//! ```no_run
//! use waldo::{DataCollectionController, OperatorFrame, World};
//!
//! let mut world = World::new();
//! let mut dc = DataCollectionController::new(Some(OperatorFrame::Front.pose()));
//! let mut controller = waldo::wire::ControllerPorts::default();
//! let mut robot = waldo::wire::RobotPorts::default();
//! let mut cameras = std::collections::HashMap::new();
//!
//! waldo::wire::wire(
//!     &mut world, &mut dc, &mut controller,
//!     Some(&mut robot), None, None, None, None,
//!     &mut cameras, None,
//! ).unwrap();
//!
//! // Drivers for `controller` and `robot` run as background systems;
//! // the control loop runs in the foreground until stopped.
//! world.run(&mut dc).unwrap();
//! ```

pub mod buttons;
pub mod control;
pub mod error;
pub mod geom;
pub mod recording;
pub mod signal;
pub mod tracker;
pub mod types;
pub mod wire;
pub mod world;

pub use buttons::{Button, ButtonFrame, ButtonHandler, Side};
pub use control::DataCollectionController;
pub use error::WaldoError;
pub use geom::Pose;
pub use recording::{RecordingState, RecordingSwitch};
pub use signal::{Emitter, Message, Receiver};
pub use tracker::{OperatorFrame, Tracker};
pub use types::*;
pub use world::{ControlSystem, World};

/// Result type alias for waldo operations.
pub type Result<T> = std::result::Result<T, WaldoError>;
