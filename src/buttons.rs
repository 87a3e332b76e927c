//! Rising-edge detection over raw controller button arrays.
//!
//! The tracking device reports each side as a flat analog array; this module
//! names the slots and turns per-tick levels into one-shot press events.
//! Feeding the same frame in twice is idempotent: an edge fires only on the
//! tick the level first crosses the press threshold.

use std::collections::HashMap;

/// Raw per-tick button levels per controller side. A disconnected side is
/// `None` and leaves that side's previous state untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ButtonFrame {
    pub left: Option<Vec<f64>>,
    pub right: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// Logical controls on one controller, with their slots in the raw array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Trigger,
    Thumb,
    Stick,
    A,
    B,
}

impl Button {
    const ALL: [Button; 5] = [Button::Trigger, Button::Thumb, Button::Stick, Button::A, Button::B];

    fn slot(self) -> usize {
        match self {
            Button::Trigger => 0,
            Button::Thumb => 1,
            Button::Stick => 3,
            Button::A => 4,
            Button::B => 5,
        }
    }
}

/// Analog level above which a control counts as pressed.
const PRESS_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default)]
struct Levels {
    previous: f64,
    current: f64,
}

/// Retains the last two observed levels per control to compute rising edges.
/// One instance per control loop.
#[derive(Debug, Default)]
pub struct ButtonHandler {
    levels: HashMap<(Side, Button), Levels>,
}

impl ButtonHandler {
    pub fn new() -> ButtonHandler {
        ButtonHandler::default()
    }

    /// Fold one frame into the edge state. Call once per tick with the
    /// latest known frame, even if it has not changed since the last tick.
    pub fn update(&mut self, frame: &ButtonFrame) {
        self.update_side(Side::Left, frame.left.as_deref());
        self.update_side(Side::Right, frame.right.as_deref());
    }

    fn update_side(&mut self, side: Side, raw: Option<&[f64]>) {
        let Some(raw) = raw else { return };
        for button in Button::ALL {
            let Some(&level) = raw.get(button.slot()) else { continue };
            let entry = self.levels.entry((side, button)).or_default();
            entry.previous = entry.current;
            entry.current = level;
        }
    }

    /// True exactly once per press: on the tick the level first rises above
    /// the threshold.
    pub fn just_pressed(&self, side: Side, button: Button) -> bool {
        match self.levels.get(&(side, button)) {
            Some(l) => l.current > PRESS_THRESHOLD && l.previous <= PRESS_THRESHOLD,
            None => false,
        }
    }

    /// Latest analog level for a continuous control (0.0 before any data).
    pub fn value(&self, side: Side, button: Button) -> f64 {
        self.levels.get(&(side, button)).map_or(0.0, |l| l.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right_frame(levels: &[f64]) -> ButtonFrame {
        ButtonFrame {
            left: None,
            right: Some(levels.to_vec()),
        }
    }

    #[test]
    fn test_just_pressed_fires_once_while_held() {
        let mut handler = ButtonHandler::new();
        let held = right_frame(&[0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);

        handler.update(&held);
        assert!(handler.just_pressed(Side::Right, Button::A));

        // Held for many more ticks: no further edges.
        for _ in 0..10 {
            handler.update(&held);
            assert!(!handler.just_pressed(Side::Right, Button::A));
        }
    }

    #[test]
    fn test_release_and_repress_fires_again() {
        let mut handler = ButtonHandler::new();
        handler.update(&right_frame(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]));
        assert!(handler.just_pressed(Side::Right, Button::B));

        handler.update(&right_frame(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        assert!(!handler.just_pressed(Side::Right, Button::B));

        handler.update(&right_frame(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]));
        assert!(handler.just_pressed(Side::Right, Button::B));
    }

    #[test]
    fn test_absent_side_is_skipped() {
        let mut handler = ButtonHandler::new();
        handler.update(&right_frame(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        assert!((handler.value(Side::Right, Button::Trigger) - 1.0).abs() < 1e-12);

        // A frame with no right side leaves the right trigger level alone.
        handler.update(&ButtonFrame {
            left: Some(vec![0.0; 6]),
            right: None,
        });
        assert!((handler.value(Side::Right, Button::Trigger) - 1.0).abs() < 1e-12);
        assert!((handler.value(Side::Left, Button::Trigger)).abs() < 1e-12);
    }

    #[test]
    fn test_value_defaults_to_zero() {
        let handler = ButtonHandler::new();
        assert_eq!(handler.value(Side::Right, Button::Trigger), 0.0);
        assert!(!handler.just_pressed(Side::Left, Button::Stick));
    }

    #[test]
    fn test_short_array_ignores_missing_slots() {
        let mut handler = ButtonHandler::new();
        handler.update(&right_frame(&[0.7]));
        assert!((handler.value(Side::Right, Button::Trigger) - 0.7).abs() < 1e-12);
        assert!(!handler.just_pressed(Side::Right, Button::B));
    }
}
