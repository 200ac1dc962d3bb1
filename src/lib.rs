//! Deep Field - space shooter simulation core
//!
//! Core modules:
//! - `sim`: Simulation (entities, collisions, spawning, session state)
//! - `renderer`: Render/HUD collaborator interfaces and scene syncing
//! - `platform`: Raw input translation
//! - `config`: Data-driven game balance

pub mod config;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod sim;

pub use config::GameConfig;
pub use error::{ConfigError, Error};

use glam::Vec3;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Frame duration that friction coefficients are expressed against (60 Hz)
    pub const REFERENCE_DT: f32 = 1.0 / 60.0;
    /// Largest dt a single update will integrate
    pub const MAX_DT: f32 = 0.1;

    /// Lives at session start
    pub const STARTING_LIVES: u32 = 3;

    /// Entity radii
    pub const PLAYER_RADIUS: f32 = 2.0;
    pub const ENEMY_RADIUS: f32 = 2.5;
    pub const OBSTACLE_RADIUS: f32 = 3.0;
    pub const PROJECTILE_RADIUS: f32 = 0.5;

    /// Score awards
    pub const ENEMY_KILL_BONUS: u64 = 100;
    pub const OBSTACLE_DESTROY_BONUS: u64 = 50;
    pub const OBSTACLE_DODGE_BONUS: u64 = 10;
}

/// Distance between two points
#[inline]
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    (b - a).length()
}

/// Unit vector pointing from `from` to `to` (zero if they coincide)
#[inline]
pub fn direction(from: Vec3, to: Vec3) -> Vec3 {
    (to - from).normalize_or_zero()
}

/// Clamp a point into an axis-aligned box
#[inline]
pub fn clamp_point(p: Vec3, min: Vec3, max: Vec3) -> Vec3 {
    p.max(min).min(max)
}

/// Uniform sample in `[min, max)`; returns `min` for an empty range
#[inline]
pub fn random_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

/// Forward direction for a heading on the XZ plane.
///
/// Heading 0 faces -Z; positive heading turns right (toward +X).
#[inline]
pub fn heading_to_forward(heading: f32) -> Vec3 {
    Vec3::new(heading.sin(), 0.0, -heading.cos())
}

/// Heading that faces along `dir` on the XZ plane
#[inline]
pub fn forward_to_heading(dir: Vec3) -> f32 {
    dir.x.atan2(-dir.z)
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_direction_is_unit_or_zero() {
        let d = direction(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0));
        assert!((d.length() - 1.0).abs() < 1e-5);
        assert_eq!(direction(Vec3::ONE, Vec3::ONE), Vec3::ZERO);
    }

    #[test]
    fn test_distance() {
        assert!((distance(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0)) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_clamp_point() {
        let p = clamp_point(
            Vec3::new(50.0, -3.0, 0.5),
            Vec3::splat(-10.0),
            Vec3::splat(10.0),
        );
        assert_eq!(p, Vec3::new(10.0, -3.0, 0.5));
    }

    #[test]
    fn test_heading_round_trip() {
        for heading in [0.0, 0.5, -1.2, FRAC_PI_2, -3.0] {
            let back = forward_to_heading(heading_to_forward(heading));
            assert!((normalize_angle(back - heading)).abs() < 1e-4);
        }
        // Heading 0 looks down -Z, a quarter turn right looks down +X
        assert!((heading_to_forward(0.0) - Vec3::NEG_Z).length() < 1e-6);
        assert!((heading_to_forward(FRAC_PI_2) - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-4);
        assert!((normalize_angle(-0.5) + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_random_range_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let v = random_range(&mut rng, -2.0, 5.0);
            assert!((-2.0..5.0).contains(&v));
        }
        assert_eq!(random_range(&mut rng, 4.0, 4.0), 4.0);
    }
}
