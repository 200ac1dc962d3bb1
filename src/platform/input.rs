//! Raw input to per-tick `Intent`
//!
//! The host forwards keyboard, mouse and touch events as they arrive and calls
//! `poll()` once per frame. Keyboard and mouse drive the rotate + thrust scheme;
//! the touch joystick drives direct velocity. Whichever device was used last
//! decides the scheme.

use std::collections::HashSet;

use glam::Vec2;

use crate::config::ControlsConfig;
use crate::sim::{ControlScheme, Intent, Movement};

/// Device family that produced the latest event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Keyboard,
    Pointer,
    Touch,
}

#[derive(Debug, Clone, Copy)]
struct JoystickTouch {
    id: u32,
    anchor: Vec2,
    current: Vec2,
}

/// Accumulates raw events between polls
#[derive(Debug, Clone)]
pub struct InputAdapter {
    controls: ControlsConfig,
    viewport: Vec2,
    /// Lowercased names of keys currently down
    held_keys: HashSet<String>,
    pointer_down: bool,
    joystick: Option<JoystickTouch>,
    fire_touches: HashSet<u32>,
    last_source: InputSource,
    start_pressed: bool,
    pause_pressed: bool,
}

fn bound(bindings: &[String], key: &str) -> bool {
    bindings.iter().any(|b| b.eq_ignore_ascii_case(key))
}

impl InputAdapter {
    pub fn new(controls: ControlsConfig, width: f32, height: f32) -> Self {
        let mut adapter = Self {
            controls,
            viewport: Vec2::ZERO,
            held_keys: HashSet::new(),
            pointer_down: false,
            joystick: None,
            fire_touches: HashSet::new(),
            last_source: InputSource::Keyboard,
            start_pressed: false,
            pause_pressed: false,
        };
        adapter.set_viewport(width, height);
        adapter
    }

    /// Resize the touch surface (pixels)
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            log::warn!("Ignoring invalid viewport {width}x{height}");
            return;
        }
        self.viewport = Vec2::new(width, height);
    }

    /// Drag distance (pixels) for full deflection
    pub fn joystick_radius(&self) -> f32 {
        self.controls.joystick_radius
    }

    pub fn last_source(&self) -> InputSource {
        self.last_source
    }

    /// Scheme the next `poll()` will report
    pub fn scheme(&self) -> ControlScheme {
        match self.last_source {
            InputSource::Touch => ControlScheme::DirectVelocity,
            InputSource::Keyboard | InputSource::Pointer => ControlScheme::RotateThrust,
        }
    }

    /// `name` is a DOM `key` or `code` value, matched case-insensitively
    pub fn key_down(&mut self, name: &str) {
        self.last_source = InputSource::Keyboard;
        let key = name.to_ascii_lowercase();
        // Auto-repeat doesn't retrigger edges
        if !self.held_keys.insert(key) {
            return;
        }
        if bound(&self.controls.start, name) {
            self.start_pressed = true;
        }
        if bound(&self.controls.pause, name) {
            self.pause_pressed = true;
        }
    }

    pub fn key_up(&mut self, name: &str) {
        self.held_keys.remove(&name.to_ascii_lowercase());
    }

    pub fn pointer_down(&mut self) {
        self.last_source = InputSource::Pointer;
        self.pointer_down = true;
    }

    pub fn pointer_up(&mut self) {
        self.pointer_down = false;
    }

    /// Left half anchors the joystick, right half holds fire
    pub fn touch_start(&mut self, id: u32, x: f32, y: f32) {
        self.last_source = InputSource::Touch;
        let point = Vec2::new(x, y);
        if x < self.viewport.x * 0.5 {
            if self.joystick.is_none() {
                self.joystick = Some(JoystickTouch {
                    id,
                    anchor: point,
                    current: point,
                });
            }
        } else {
            self.fire_touches.insert(id);
        }
    }

    pub fn touch_move(&mut self, id: u32, x: f32, y: f32) {
        if let Some(stick) = self.joystick.as_mut().filter(|s| s.id == id) {
            stick.current = Vec2::new(x, y);
            self.last_source = InputSource::Touch;
        }
    }

    pub fn touch_end(&mut self, id: u32, _x: f32, _y: f32) {
        if self.joystick.is_some_and(|s| s.id == id) {
            self.joystick = None;
        }
        self.fire_touches.remove(&id);
    }

    /// Drop everything held, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.held_keys.clear();
        self.pointer_down = false;
        self.joystick = None;
        self.fire_touches.clear();
    }

    /// Joystick deflection with y up, length <= 1
    pub fn joystick_vector(&self) -> Vec2 {
        let Some(stick) = self.joystick else {
            return Vec2::ZERO;
        };
        let offset = stick.current - stick.anchor;
        (Vec2::new(offset.x, -offset.y) / self.controls.joystick_radius).clamp_length_max(1.0)
    }

    fn held(&self, bindings: &[String]) -> bool {
        bindings
            .iter()
            .any(|b| self.held_keys.contains(&b.to_ascii_lowercase()))
    }

    fn axis(&self, negative: &[String], positive: &[String]) -> f32 {
        f32::from(u8::from(self.held(positive))) - f32::from(u8::from(self.held(negative)))
    }

    /// Build this frame's intent and consume the edge-triggered commands
    pub fn poll(&mut self) -> Intent {
        let c = &self.controls;
        let movement = match self.scheme() {
            ControlScheme::RotateThrust => Movement::Steer {
                turn: self.axis(&c.turn_left, &c.turn_right),
                thrust: self.axis(&c.thrust_backward, &c.thrust_forward),
            },
            ControlScheme::DirectVelocity => {
                let v = self.joystick_vector();
                Movement::Direct { x: v.x, y: v.y }
            }
        };
        let fire = self.held(&c.fire) || self.pointer_down || !self.fire_touches.is_empty();

        Intent {
            movement,
            fire,
            start: std::mem::take(&mut self.start_pressed),
            pause: std::mem::take(&mut self.pause_pressed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> InputAdapter {
        InputAdapter::new(ControlsConfig::default(), 800.0, 600.0)
    }

    #[test]
    fn test_idle_poll_is_default_intent() {
        let mut input = adapter();
        assert_eq!(input.poll(), Intent::default());
    }

    #[test]
    fn test_keys_map_to_steer_axes() {
        let mut input = adapter();
        input.key_down("ArrowRight");
        input.key_down("w");
        let intent = input.poll();
        assert_eq!(intent.movement, Movement::Steer { turn: 1.0, thrust: 1.0 });

        input.key_down("ArrowLeft");
        input.key_up("w");
        input.key_down("S");
        assert_eq!(input.poll().movement, Movement::Steer { turn: 0.0, thrust: -1.0 });
    }

    #[test]
    fn test_key_names_case_insensitive() {
        let mut input = adapter();
        input.key_down("KEYA");
        assert_eq!(input.poll().movement, Movement::Steer { turn: -1.0, thrust: 0.0 });
        input.key_up("keya");
        assert_eq!(input.poll().movement, Movement::default());
    }

    #[test]
    fn test_fire_is_held() {
        let mut input = adapter();
        input.key_down(" ");
        assert!(input.poll().fire);
        assert!(input.poll().fire);
        input.key_up(" ");
        assert!(!input.poll().fire);

        input.pointer_down();
        assert!(input.poll().fire);
        input.pointer_up();
        assert!(!input.poll().fire);
    }

    #[test]
    fn test_start_and_pause_are_edges() {
        let mut input = adapter();
        input.key_down("Enter");
        input.key_down("Enter");
        let intent = input.poll();
        assert!(intent.start);
        assert!(!input.poll().start);

        input.key_down("Escape");
        assert!(input.poll().pause);
        // Held key repeats don't retrigger
        input.key_down("Escape");
        assert!(!input.poll().pause);
        input.key_up("Escape");
        input.key_down("p");
        assert!(input.poll().pause);
    }

    #[test]
    fn test_left_touch_drives_joystick() {
        let mut input = adapter();
        input.touch_start(1, 100.0, 300.0);
        input.touch_move(1, 130.0, 270.0);
        assert_eq!(input.scheme(), ControlScheme::DirectVelocity);
        match input.poll().movement {
            Movement::Direct { x, y } => {
                assert!((x - 0.5).abs() < 1e-5);
                assert!((y - 0.5).abs() < 1e-5);
            }
            other => panic!("expected direct movement, got {other:?}"),
        }
    }

    #[test]
    fn test_joystick_clamped_to_unit_length() {
        let mut input = adapter();
        input.touch_start(1, 100.0, 300.0);
        input.touch_move(1, 400.0, 300.0);
        assert!((input.joystick_vector() - Vec2::X).length() < 1e-5);
        input.touch_end(1, 400.0, 300.0);
        assert_eq!(input.joystick_vector(), Vec2::ZERO);
    }

    #[test]
    fn test_right_touch_holds_fire() {
        let mut input = adapter();
        input.touch_start(2, 700.0, 300.0);
        let intent = input.poll();
        assert!(intent.fire);
        assert_eq!(intent.movement, Movement::Direct { x: 0.0, y: 0.0 });
        input.touch_end(2, 700.0, 300.0);
        assert!(!input.poll().fire);
    }

    #[test]
    fn test_second_left_touch_ignored_while_stick_held() {
        let mut input = adapter();
        input.touch_start(1, 100.0, 300.0);
        input.touch_start(3, 50.0, 50.0);
        input.touch_move(3, 0.0, 0.0);
        assert_eq!(input.joystick_vector(), Vec2::ZERO);
        input.touch_end(3, 0.0, 0.0);
        input.touch_move(1, 100.0, 240.0);
        assert!((input.joystick_vector().y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_latest_source_picks_scheme() {
        let mut input = adapter();
        input.touch_start(1, 100.0, 300.0);
        assert_eq!(input.scheme(), ControlScheme::DirectVelocity);
        input.key_down("a");
        assert_eq!(input.scheme(), ControlScheme::RotateThrust);
        assert!(matches!(input.poll().movement, Movement::Steer { .. }));
        input.touch_move(1, 120.0, 300.0);
        assert_eq!(input.last_source(), InputSource::Touch);
        input.pointer_down();
        assert_eq!(input.scheme(), ControlScheme::RotateThrust);
    }

    #[test]
    fn test_custom_bindings_and_release_all() {
        let controls = ControlsConfig {
            fire: vec!["KeyJ".to_string()],
            ..Default::default()
        };
        let mut input = InputAdapter::new(controls, 800.0, 600.0);
        input.key_down(" ");
        assert!(!input.poll().fire);
        input.key_down("keyj");
        input.key_down("d");
        assert!(input.poll().fire);
        input.release_all();
        let intent = input.poll();
        assert!(!intent.fire);
        assert_eq!(intent.movement, Movement::default());
    }

    #[test]
    fn test_invalid_viewport_keeps_previous() {
        let mut input = adapter();
        input.set_viewport(0.0, f32::NAN);
        // Still 800 wide: x = 500 is the right half
        input.touch_start(1, 500.0, 10.0);
        assert!(input.poll().fire);
    }
}
