//! Plain data handed across the render boundary

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What a visual depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualKind {
    Player,
    Enemy,
    Obstacle,
    PlayerProjectile,
    EnemyProjectile,
}

impl VisualKind {
    pub fn color(self) -> [f32; 4] {
        match self {
            VisualKind::Player => colors::PLAYER,
            VisualKind::Enemy => colors::ENEMY,
            VisualKind::Obstacle => colors::OBSTACLE,
            VisualKind::PlayerProjectile => colors::PLAYER_SHOT,
            VisualKind::EnemyProjectile => colors::ENEMY_SHOT,
        }
    }
}

/// Position and Euler rotation (radians, Y up)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self {
            position: position.to_array(),
            rotation: rotation.to_array(),
        }
    }

    /// Yaw-only transform. `heading` turns right, which is negative yaw about +Y.
    pub fn facing(position: Vec3, heading: f32) -> Self {
        Self::new(position, Vec3::new(0.0, -heading, 0.0))
    }
}

/// Colors for game elements
pub mod colors {
    pub const PLAYER: [f32; 4] = [0.2, 0.8, 0.4, 1.0];
    pub const ENEMY: [f32; 4] = [1.0, 0.3, 0.3, 1.0];
    pub const OBSTACLE: [f32; 4] = [0.6, 0.55, 0.5, 1.0];
    pub const PLAYER_SHOT: [f32; 4] = [0.4, 0.9, 1.0, 1.0];
    pub const ENEMY_SHOT: [f32; 4] = [1.0, 0.6, 0.2, 1.0];
}
