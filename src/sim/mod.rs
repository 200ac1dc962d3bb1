//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Variable dt, clamped per update
//! - Seeded RNG only
//! - Stable ids for every entity
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod movement;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{CollisionBatch, ProjectileHit, check_all};
pub use entity::{
    Aabb, Body, Enemy, EnemyBehavior, EntityId, Faction, Obstacle, Player, Projectile,
};
pub use movement::{ControlScheme, Movement};
pub use spawn::{SpawnController, SpawnTick, interval_for};
pub use state::{GameEvent, GamePhase, GameSession, HudSnapshot};
pub use tick::{Intent, sanitize_dt};
