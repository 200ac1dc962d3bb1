//! Timer-gated spawning and the difficulty ramp
//!
//! All randomness flows through one seeded PCG stream, so a session replays
//! identically for the same seed and inputs.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{Enemy, EntityId, Obstacle};
use crate::config::{GameConfig, SpawnConfig};
use crate::random_range;

/// What the controller asks for this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnTick {
    pub enemy: bool,
    pub obstacle: bool,
    /// Difficulty steps taken this tick
    pub level_ups: u32,
}

/// Spawn timers, difficulty and the session RNG
#[derive(Debug, Clone)]
pub struct SpawnController {
    pub enemy_timer: f32,
    pub obstacle_timer: f32,
    pub difficulty_timer: f32,
    /// Starts at 1, grows by a fixed increment per step
    pub difficulty: f32,
    /// 1-based difficulty step counter shown on the HUD
    pub level: u32,
    seed: u64,
    rng: Pcg32,
}

/// Interval shrinks with difficulty and never drops below `floor`
pub fn interval_for(base: f32, floor: f32, difficulty: f32) -> f32 {
    (base / difficulty.max(1.0)).max(floor)
}

impl SpawnController {
    pub fn new(seed: u64) -> Self {
        Self {
            enemy_timer: 0.0,
            obstacle_timer: 0.0,
            difficulty_timer: 0.0,
            difficulty: 1.0,
            level: 1,
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Back to the initial timers, difficulty and RNG stream
    pub fn reset(&mut self) {
        *self = Self::new(self.seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn enemy_interval(&self, cfg: &SpawnConfig) -> f32 {
        interval_for(cfg.enemy_interval, cfg.enemy_interval_floor, self.difficulty)
    }

    pub fn obstacle_interval(&self, cfg: &SpawnConfig) -> f32 {
        interval_for(cfg.obstacle_interval, cfg.obstacle_interval_floor, self.difficulty)
    }

    /// Accumulate `dt` into the timers. A timer that reaches its interval
    /// resets to zero and requests one spawn, unless the live count is at the
    /// cap (the timer still resets).
    pub fn advance(
        &mut self,
        dt: f32,
        cfg: &SpawnConfig,
        live_enemies: usize,
        live_obstacles: usize,
    ) -> SpawnTick {
        let mut tick = SpawnTick::default();
        if !(dt > 0.0) {
            return tick;
        }

        self.enemy_timer += dt;
        if self.enemy_timer >= self.enemy_interval(cfg) {
            self.enemy_timer = 0.0;
            tick.enemy = cfg.max_enemies.is_none_or(|cap| live_enemies < cap);
        }

        self.obstacle_timer += dt;
        if self.obstacle_timer >= self.obstacle_interval(cfg) {
            self.obstacle_timer = 0.0;
            tick.obstacle = cfg.max_obstacles.is_none_or(|cap| live_obstacles < cap);
        }

        // A non-positive interval would level up forever
        if cfg.difficulty_interval > 0.0 && cfg.difficulty_interval.is_finite() {
            self.difficulty_timer += dt;
            while self.difficulty_timer >= cfg.difficulty_interval {
                self.difficulty_timer -= cfg.difficulty_interval;
                self.difficulty += cfg.difficulty_increment;
                self.level += 1;
                tick.level_ups += 1;
            }
        }

        tick
    }

    /// Uniform point in the spawn disc, `cfg.distance` ahead on the XZ plane
    pub fn spawn_point(&mut self, cfg: &SpawnConfig) -> Vec3 {
        let r = cfg.radius * self.rng.random::<f32>().sqrt();
        let theta = self.rng.random::<f32>() * TAU;
        Vec3::new(r * theta.cos(), 0.0, -cfg.distance + r * theta.sin())
    }

    pub fn spawn_enemy(&mut self, id: EntityId, cfg: &GameConfig) -> Enemy {
        let pos = self.spawn_point(&cfg.spawn);
        let strafe = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let fire_phase = self.rng.random::<f32>();
        Enemy::new(id, pos, &cfg.enemy, strafe, fire_phase)
    }

    /// Obstacle drifting toward the player side (+Z) with a little sideways slip
    pub fn spawn_obstacle(&mut self, id: EntityId, cfg: &GameConfig) -> Obstacle {
        let o = &cfg.obstacle;
        let pos = self.spawn_point(&cfg.spawn);
        let radius = random_range(&mut self.rng, o.radius_min, o.radius_max);
        let speed = random_range(&mut self.rng, o.speed_min, o.speed_max);
        let slip = random_range(&mut self.rng, -0.25, 0.25);
        let drift = Vec3::new(slip, 0.0, 1.0).normalize() * speed;
        let spin = o.rotation_rate_max;
        let rotation_rate = Vec3::new(
            random_range(&mut self.rng, -spin, spin),
            random_range(&mut self.rng, -spin, spin),
            random_range(&mut self.rng, -spin, spin),
        );
        Obstacle::new(id, pos, drift, radius, rotation_rate)
    }
}
