//! Player movement schemes
//!
//! Two control schemes coexist: keyboard/mouse steer the ship (rotate and
//! thrust, with inertia), while the touch joystick sets velocity directly.
//! Input produces a [`Movement`] for whichever source was used last and the
//! player applies it without caring which device it came from.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::entity::Player;
use crate::{forward_to_heading, normalize_angle};

/// Named control schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlScheme {
    /// Rotate + thrust with inertial drift
    #[default]
    RotateThrust,
    /// Joystick vector maps straight to velocity
    DirectVelocity,
}

/// One tick of movement intent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Movement {
    /// `turn` in [-1, 1] (positive = right), `thrust` in [-1, 1] (positive = forward)
    Steer { turn: f32, thrust: f32 },
    /// Joystick deflection, `x` right and `y` forward, length <= 1
    Direct { x: f32, y: f32 },
}

impl Default for Movement {
    fn default() -> Self {
        Movement::Steer {
            turn: 0.0,
            thrust: 0.0,
        }
    }
}

impl Movement {
    pub fn scheme(&self) -> ControlScheme {
        match self {
            Movement::Steer { .. } => ControlScheme::RotateThrust,
            Movement::Direct { .. } => ControlScheme::DirectVelocity,
        }
    }

    /// Whether friction applies after this movement
    pub fn is_inertial(&self) -> bool {
        self.scheme() == ControlScheme::RotateThrust
    }

    /// Apply to the player's heading and velocity (does not integrate)
    pub fn apply(&self, player: &mut Player, dt: f32) {
        match *self {
            Movement::Steer { turn, thrust } => steer(player, turn, thrust, dt),
            Movement::Direct { x, y } => direct(player, x, y),
        }
    }
}

fn steer(player: &mut Player, turn: f32, thrust: f32, dt: f32) {
    let turn = sanitize_axis(turn);
    let thrust = sanitize_axis(thrust);
    player.heading = normalize_angle(player.heading + turn * player.turn_speed * dt);
    player.body.vel += player.forward() * (thrust * player.thrust_accel * dt);
}

fn direct(player: &mut Player, x: f32, y: f32) {
    let stick = Vec2::new(sanitize_axis(x), sanitize_axis(y)).clamp_length_max(1.0);
    let vel = Vec3::new(stick.x, 0.0, -stick.y) * player.direct_speed;
    player.body.vel = vel;
    if vel != Vec3::ZERO {
        // Face where we're going so shots follow the stick
        player.heading = forward_to_heading(vel);
    }
}

fn sanitize_axis(v: f32) -> f32 {
    if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use std::f32::consts::FRAC_PI_2;

    fn player() -> Player {
        Player::new(1, &PlayerConfig::default())
    }

    #[test]
    fn test_steer_turns_right_for_positive_input() {
        let mut p = player();
        Movement::Steer { turn: 1.0, thrust: 0.0 }.apply(&mut p, 0.1);
        assert!((p.heading - p.turn_speed * 0.1).abs() < 1e-6);
        assert_eq!(p.body.vel, Vec3::ZERO);
    }

    #[test]
    fn test_steer_thrusts_along_heading() {
        let mut p = player();
        p.heading = FRAC_PI_2;
        Movement::Steer { turn: 0.0, thrust: 1.0 }.apply(&mut p, 0.5);
        assert!((p.body.vel.x - p.thrust_accel * 0.5).abs() < 1e-3);
        assert!(p.body.vel.z.abs() < 1e-3);
    }

    #[test]
    fn test_steer_clamps_out_of_range_axes() {
        let mut a = player();
        let mut b = player();
        Movement::Steer { turn: 9.0, thrust: f32::NAN }.apply(&mut a, 0.1);
        Movement::Steer { turn: 1.0, thrust: 0.0 }.apply(&mut b, 0.1);
        assert_eq!(a.heading, b.heading);
        assert_eq!(a.body.vel, Vec3::ZERO);
    }

    #[test]
    fn test_direct_sets_velocity_and_heading() {
        let mut p = player();
        p.body.vel = Vec3::new(100.0, 0.0, 100.0);
        Movement::Direct { x: 0.0, y: 1.0 }.apply(&mut p, 0.1);
        assert_eq!(p.body.vel, Vec3::new(0.0, 0.0, -p.direct_speed));
        assert!(p.heading.abs() < 1e-6);

        Movement::Direct { x: 1.0, y: 0.0 }.apply(&mut p, 0.1);
        assert!((p.heading - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_direct_clamps_diagonal() {
        let mut p = player();
        Movement::Direct { x: 1.0, y: 1.0 }.apply(&mut p, 0.1);
        assert!((p.body.vel.length() - p.direct_speed).abs() < 1e-3);
    }

    #[test]
    fn test_idle_stick_stops_ship_and_keeps_heading() {
        let mut p = player();
        p.heading = 1.0;
        p.body.vel = Vec3::X;
        Movement::Direct { x: 0.0, y: 0.0 }.apply(&mut p, 0.1);
        assert_eq!(p.body.vel, Vec3::ZERO);
        assert_eq!(p.heading, 1.0);
    }

    #[test]
    fn test_scheme_names() {
        assert_eq!(Movement::default().scheme(), ControlScheme::RotateThrust);
        assert!(!Movement::Direct { x: 0.0, y: 0.0 }.is_inertial());
    }
}
