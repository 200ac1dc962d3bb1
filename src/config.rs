//! Game tuning and controls
//!
//! Loaded from JSON by the host. Every section falls back to its defaults, so a
//! config file only needs the values it changes.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::Aabb;

/// World extents and frame clamping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Anything outside these bounds is removed
    pub bounds: Aabb,
    /// Largest dt integrated in a single update (seconds)
    pub max_dt: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: Aabb::new(Vec3::new(-80.0, -10.0, -160.0), Vec3::new(80.0, 10.0, 60.0)),
            max_dt: MAX_DT,
        }
    }
}

/// Player ship handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub radius: f32,
    /// Turn rate at full stick (radians/sec)
    pub turn_speed: f32,
    /// Acceleration along heading at full thrust (units/sec²)
    pub thrust_accel: f32,
    /// Velocity multiplier per reference frame (1/60 s), in [0, 1)
    pub friction: f32,
    /// Speed at full deflection for the direct (joystick) scheme
    pub direct_speed: f32,
    /// Seconds between shots while fire is held
    pub fire_cooldown: f32,
    /// Box the ship is clamped into
    pub bounds: Aabb,
    /// Cap on live player projectiles (shots beyond it are dropped)
    pub max_projectiles: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: PLAYER_RADIUS,
            turn_speed: 3.5,
            thrust_accel: 60.0,
            friction: 0.97,
            direct_speed: 35.0,
            fire_cooldown: 0.2,
            bounds: Aabb::new(Vec3::new(-60.0, 0.0, -60.0), Vec3::new(60.0, 0.0, 40.0)),
            max_projectiles: 32,
        }
    }
}

/// Enemy tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub radius: f32,
    pub speed: f32,
    /// Hits needed to destroy a fresh enemy
    pub health: u32,
    /// Seconds between chase/evade flips
    pub behavior_period: f32,
    /// Share of an evading enemy's motion still directed at the player
    pub evade_approach: f32,
    /// Seconds between enemy shots; `None` disables enemy fire
    pub fire_interval: Option<f32>,
    /// Enemies only fire when the player is closer than this
    pub fire_range: f32,
    pub projectile_speed: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            radius: ENEMY_RADIUS,
            speed: 12.0,
            health: 2,
            behavior_period: 2.5,
            evade_approach: 0.35,
            fire_interval: Some(3.0),
            fire_range: 70.0,
            projectile_speed: 40.0,
        }
    }
}

/// Obstacle (asteroid) tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub radius_min: f32,
    pub radius_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Max cosmetic spin per axis (radians/sec)
    pub rotation_rate_max: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            radius_min: OBSTACLE_RADIUS * 0.6,
            radius_max: OBSTACLE_RADIUS * 1.5,
            speed_min: 8.0,
            speed_max: 20.0,
            rotation_rate_max: 1.5,
        }
    }
}

/// Player projectile tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub radius: f32,
    pub speed: f32,
    /// Lifetime in seconds
    pub ttl: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            radius: PROJECTILE_RADIUS,
            speed: 80.0,
            ttl: 1.5,
        }
    }
}

/// Spawn placement, intervals and difficulty ramp
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// How far ahead (-Z) of the origin spawns are centered
    pub distance: f32,
    /// Radius of the spawn disc
    pub radius: f32,
    pub enemy_interval: f32,
    pub enemy_interval_floor: f32,
    pub obstacle_interval: f32,
    pub obstacle_interval_floor: f32,
    /// Seconds between difficulty steps
    pub difficulty_interval: f32,
    /// Difficulty added per step
    pub difficulty_increment: f32,
    pub max_enemies: Option<usize>,
    pub max_obstacles: Option<usize>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            distance: 100.0,
            radius: 40.0,
            enemy_interval: 3.0,
            enemy_interval_floor: 0.8,
            obstacle_interval: 2.0,
            obstacle_interval_floor: 0.5,
            difficulty_interval: 20.0,
            difficulty_increment: 0.25,
            max_enemies: Some(12),
            max_obstacles: Some(20),
        }
    }
}

/// Score awards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub enemy_kill: u64,
    pub obstacle_destroy: u64,
    /// Awarded when an obstacle drifts past the player untouched
    pub obstacle_dodge: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            enemy_kill: ENEMY_KILL_BONUS,
            obstacle_destroy: OBSTACLE_DESTROY_BONUS,
            obstacle_dodge: OBSTACLE_DODGE_BONUS,
        }
    }
}

/// Key bindings and touch layout
///
/// Key names are DOM `KeyboardEvent.key` or `KeyboardEvent.code` values and
/// are matched case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub turn_left: Vec<String>,
    pub turn_right: Vec<String>,
    pub thrust_forward: Vec<String>,
    pub thrust_backward: Vec<String>,
    pub fire: Vec<String>,
    pub start: Vec<String>,
    pub pause: Vec<String>,
    /// Screen-space drag (pixels) for full joystick deflection
    pub joystick_radius: f32,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            turn_left: keys(&["ArrowLeft", "a", "KeyA"]),
            turn_right: keys(&["ArrowRight", "d", "KeyD"]),
            thrust_forward: keys(&["ArrowUp", "w", "KeyW"]),
            thrust_backward: keys(&["ArrowDown", "s", "KeyS"]),
            fire: keys(&[" ", "Space"]),
            start: keys(&["Enter"]),
            pause: keys(&["Escape", "p", "KeyP"]),
            joystick_radius: 60.0,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub starting_lives: u32,
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub obstacle: ObstacleConfig,
    pub projectile: ProjectileConfig,
    pub spawn: SpawnConfig,
    pub scoring: ScoringConfig,
    pub controls: ControlsConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_lives: STARTING_LIVES,
            world: WorldConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            obstacle: ObstacleConfig::default(),
            projectile: ProjectileConfig::default(),
            spawn: SpawnConfig::default(),
            scoring: ScoringConfig::default(),
            controls: ControlsConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every value the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_lives == 0 {
            return Err(ConfigError::invalid("starting_lives", "must be at least 1"));
        }
        positive("world.max_dt", self.world.max_dt)?;
        self.world.bounds.validate("world.bounds")?;
        self.player.bounds.validate("player.bounds")?;

        let p = &self.player;
        if !(0.0..1.0).contains(&p.friction) {
            return Err(ConfigError::invalid("player.friction", "must be in [0, 1)"));
        }
        positive("player.radius", p.radius)?;
        positive("player.fire_cooldown", p.fire_cooldown)?;
        non_negative("player.turn_speed", p.turn_speed)?;
        non_negative("player.thrust_accel", p.thrust_accel)?;
        non_negative("player.direct_speed", p.direct_speed)?;

        let e = &self.enemy;
        positive("enemy.radius", e.radius)?;
        non_negative("enemy.speed", e.speed)?;
        if e.health == 0 {
            return Err(ConfigError::invalid("enemy.health", "must be at least 1"));
        }
        positive("enemy.behavior_period", e.behavior_period)?;
        if !(0.0..=1.0).contains(&e.evade_approach) {
            return Err(ConfigError::invalid("enemy.evade_approach", "must be in [0, 1]"));
        }
        if let Some(interval) = e.fire_interval {
            positive("enemy.fire_interval", interval)?;
            positive("enemy.projectile_speed", e.projectile_speed)?;
        }

        let o = &self.obstacle;
        positive("obstacle.radius_min", o.radius_min)?;
        if o.radius_max < o.radius_min {
            return Err(ConfigError::invalid("obstacle.radius_max", "must be >= radius_min"));
        }
        non_negative("obstacle.speed_min", o.speed_min)?;
        if o.speed_max < o.speed_min {
            return Err(ConfigError::invalid("obstacle.speed_max", "must be >= speed_min"));
        }

        positive("projectile.radius", self.projectile.radius)?;
        positive("projectile.speed", self.projectile.speed)?;
        positive("projectile.ttl", self.projectile.ttl)?;

        let s = &self.spawn;
        non_negative("spawn.radius", s.radius)?;
        positive("spawn.enemy_interval_floor", s.enemy_interval_floor)?;
        positive("spawn.obstacle_interval_floor", s.obstacle_interval_floor)?;
        if s.enemy_interval < s.enemy_interval_floor {
            return Err(ConfigError::invalid("spawn.enemy_interval", "must be >= its floor"));
        }
        if s.obstacle_interval < s.obstacle_interval_floor {
            return Err(ConfigError::invalid("spawn.obstacle_interval", "must be >= its floor"));
        }
        positive("spawn.difficulty_interval", s.difficulty_interval)?;
        non_negative("spawn.difficulty_increment", s.difficulty_increment)?;

        positive("controls.joystick_radius", self.controls.joystick_radius)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be non-negative, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json_str(
            r#"{ "starting_lives": 5, "player": { "friction": 0.9 } }"#,
        )
        .unwrap();
        assert_eq!(config.starting_lives, 5);
        assert_eq!(config.player.friction, 0.9);
        assert_eq!(config.player.fire_cooldown, PlayerConfig::default().fire_cooldown);
        assert_eq!(config.enemy.health, 2);
    }

    #[test]
    fn test_rejects_friction_of_one() {
        let err = GameConfig::from_json_str(r#"{ "player": { "friction": 1.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "player.friction",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_interval_below_floor() {
        let mut config = GameConfig::default();
        config.spawn.enemy_interval = 0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let mut config = GameConfig::default();
        config.player.bounds = Aabb::new(Vec3::splat(5.0), Vec3::splat(-5.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error_surfaces() {
        let err = GameConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_json_round_trip_keeps_bindings() {
        let mut config = GameConfig::default();
        config.controls.fire = vec!["f".to_string()];
        let json = config.to_json_pretty().unwrap();
        let back = GameConfig::from_json_str(&json).unwrap();
        assert_eq!(back.controls.fire, vec!["f".to_string()]);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = GameConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
