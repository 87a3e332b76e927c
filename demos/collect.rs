//! Run the data-collection loop against synthetic drivers.
//!
//! A mock controller sweeps a circular pose and presses the record button
//! twice; a mock robot echoes commanded targets back as its state; a mock
//! recorder logs episode commands. The world stops itself after two seconds.
//!
//! Usage: cargo run --example collect

use std::collections::HashMap;
use std::time::Duration;

use waldo::wire::{self, ControllerPorts, RecorderPorts, RobotPorts};
use waldo::{
    ButtonFrame, ControlSystem, ControllerPoses, DataCollectionController, OperatorFrame, Pose,
    RobotCommand, RobotState, World,
};

struct MockController {
    ports: ControllerPorts,
    ticks: u64,
}

impl ControlSystem for MockController {
    fn tick(&mut self) -> waldo::Result<Duration> {
        self.ticks += 1;
        let t = self.ticks as f64 * 0.01;

        self.ports.poses.emit(ControllerPoses {
            left: None,
            right: Some(Pose::from_quat_xyzw(
                [0.3 * t.cos(), 0.3 * t.sin(), 0.4],
                [0.0, 0.0, 0.0, 1.0],
            )),
        });

        // Engage tracking early, then start and stop one episode.
        let a = if (10..15).contains(&self.ticks) { 1.0 } else { 0.0 };
        let b = if (30..35).contains(&self.ticks) || (150..155).contains(&self.ticks) {
            1.0
        } else {
            0.0
        };
        self.ports.buttons.emit(ButtonFrame {
            left: None,
            right: Some(vec![t.sin().abs(), 0.0, 0.0, 0.0, a, b]),
        });

        Ok(Duration::from_millis(10))
    }
}

struct MockRobot {
    ports: RobotPorts,
    pose: Pose,
}

impl ControlSystem for MockRobot {
    fn tick(&mut self) -> waldo::Result<Duration> {
        while let Some(msg) = self.ports.commands.read() {
            match msg.data {
                RobotCommand::Reset => self.pose = Pose::identity(),
                RobotCommand::CartesianPosition(target) => self.pose = target,
            }
        }
        self.ports.state.emit(RobotState {
            ee_pose: self.pose,
            ee_wrench: None,
        });
        Ok(Duration::from_millis(2))
    }
}

struct MockRecorder {
    ports: RecorderPorts,
}

impl ControlSystem for MockRecorder {
    fn tick(&mut self) -> waldo::Result<Duration> {
        if let Some(msg) = self.ports.commands.read() {
            println!("recorder: {:?}", msg.data);
        }
        for (name, input) in self.ports.signals() {
            if let Some(msg) = input.read() {
                println!("recorder: {} @ {} ns", name, msg.ts_ns);
            }
        }
        Ok(Duration::from_millis(5))
    }
}

fn main() {
    env_logger::init();

    let mut world = World::new();
    let mut dc = DataCollectionController::new(Some(OperatorFrame::Front.pose()));
    let mut controller = ControllerPorts::default();
    let mut robot = RobotPorts::default();
    let mut recorder = RecorderPorts::new();
    let mut cameras = HashMap::new();

    wire::wire(
        &mut world,
        &mut dc,
        &mut controller,
        Some(&mut robot),
        None,
        None,
        Some(&mut recorder),
        None,
        &mut cameras,
        None,
    )
    .expect("assembly failed");

    world
        .spawn("controller", MockController { ports: controller, ticks: 0 })
        .unwrap();
    world
        .spawn("robot", MockRobot { ports: robot, pose: Pose::identity() })
        .unwrap();
    world.spawn("recorder", MockRecorder { ports: recorder }).unwrap();

    let stop = world.stop_flag();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_secs(2));
        stop.store(true, std::sync::atomic::Ordering::Relaxed);
    });

    if let Err(e) = world.run(&mut dc) {
        eprintln!("world stopped with error: {}", e);
        std::process::exit(1);
    }
    println!("done");
}
