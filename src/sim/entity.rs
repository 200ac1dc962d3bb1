//! Simulated entities: player ship, enemies, obstacles and projectiles
//!
//! Every entity wraps a [`Body`] (position, velocity, collision radius) and adds
//! its own per-frame behavior. Entities never spawn or remove each other; the
//! session owns the collections and applies removals.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::movement::Movement;
use crate::config::{EnemyConfig, PlayerConfig, ProjectileConfig};
use crate::consts::REFERENCE_DT;
use crate::error::ConfigError;
use crate::{clamp_point, direction, distance, heading_to_forward};

/// Stable entity identifier, unique within a session
pub type EntityId = u32;

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inclusive containment test
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn clamp(&self, p: Vec3) -> Vec3 {
        clamp_point(p, self.min, self.max)
    }

    pub(crate) fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(ConfigError::invalid(field, "bounds must be finite"));
        }
        if !self.min.cmple(self.max).all() {
            return Err(ConfigError::invalid(field, "min must be <= max on every axis"));
        }
        Ok(())
    }
}

/// Shared kinematic state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: EntityId,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Collision radius, fixed at creation
    pub radius: f32,
    pub alive: bool,
}

impl Body {
    pub fn new(id: EntityId, pos: Vec3, vel: Vec3, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            alive: true,
        }
    }

    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Strict overlap: touching spheres do not collide
    #[inline]
    pub fn overlaps(&self, other: &Body) -> bool {
        distance(self.pos, other.pos) < self.radius + other.radius
    }

    pub fn is_out_of(&self, bounds: &Aabb) -> bool {
        !bounds.contains(self.pos)
    }
}

/// Which side fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

/// A shot in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub body: Body,
    pub owner: Faction,
    /// Seconds until expiry
    pub ttl: f32,
}

impl Projectile {
    pub fn new(id: EntityId, owner: Faction, pos: Vec3, vel: Vec3, radius: f32, ttl: f32) -> Self {
        Self {
            body: Body::new(id, pos, vel, radius),
            owner,
            ttl,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if !(dt > 0.0) {
            return;
        }
        self.body.integrate(dt);
        self.ttl -= dt;
        if self.ttl <= 0.0 {
            self.body.alive = false;
        }
    }

    pub fn is_expired(&self) -> bool {
        self.ttl <= 0.0
    }

    /// Alive, unexpired and inside `bounds`
    pub fn is_live_in(&self, bounds: &Aabb) -> bool {
        self.body.alive && !self.is_expired() && bounds.contains(self.body.pos)
    }
}

/// The player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// Radians; 0 faces -Z, positive turns toward +X
    pub heading: f32,
    pub turn_speed: f32,
    pub thrust_accel: f32,
    /// Velocity multiplier per reference frame
    pub friction: f32,
    pub direct_speed: f32,
    /// Seconds until the next shot is allowed
    pub fire_cooldown: f32,
    pub fire_cooldown_max: f32,
    pub bounds: Aabb,
    pub max_projectiles: usize,
    /// Live player shots, owned and culled by the player
    pub projectiles: Vec<Projectile>,
}

impl Player {
    pub fn new(id: EntityId, cfg: &PlayerConfig) -> Self {
        Self {
            body: Body::new(id, cfg.bounds.clamp(Vec3::ZERO), Vec3::ZERO, cfg.radius),
            heading: 0.0,
            turn_speed: cfg.turn_speed,
            thrust_accel: cfg.thrust_accel,
            friction: cfg.friction,
            direct_speed: cfg.direct_speed,
            fire_cooldown: 0.0,
            fire_cooldown_max: cfg.fire_cooldown,
            bounds: cfg.bounds,
            max_projectiles: cfg.max_projectiles,
            projectiles: Vec::new(),
        }
    }

    pub fn forward(&self) -> Vec3 {
        heading_to_forward(self.heading)
    }

    /// Apply movement intent, integrate and clamp into bounds
    pub fn update(&mut self, movement: &Movement, dt: f32) {
        if !(dt > 0.0) {
            return;
        }

        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
        self.apply_movement(movement, dt);
        if movement.is_inertial() {
            // Exponential decay, scaled so friction means "per 60 Hz frame"
            self.body.vel *= self.friction.powf(dt / REFERENCE_DT);
        }
        self.body.integrate(dt);
        self.clamp_to_bounds();
    }

    /// Turn and accelerate (or set velocity) without integrating
    pub fn apply_movement(&mut self, movement: &Movement, dt: f32) {
        movement.apply(self, dt);
    }

    /// Pin the ship inside its box, dropping velocity that pushes outward
    fn clamp_to_bounds(&mut self) {
        let clamped = self.bounds.clamp(self.body.pos);
        for axis in 0..3 {
            if clamped[axis] != self.body.pos[axis] {
                let outward = (self.body.pos[axis] - clamped[axis]).signum();
                if self.body.vel[axis] * outward > 0.0 {
                    self.body.vel[axis] = 0.0;
                }
            }
        }
        self.body.pos = clamped;
    }

    pub fn can_fire(&self) -> bool {
        self.body.alive
            && self.fire_cooldown <= 0.0
            && self.projectiles.len() < self.max_projectiles
    }

    /// Launch a shot along the heading. Returns false if the cooldown or the
    /// projectile cap blocks it.
    pub fn fire(&mut self, id: EntityId, cfg: &ProjectileConfig) -> bool {
        if !self.can_fire() {
            return false;
        }
        let forward = self.forward();
        let muzzle = self.body.pos + forward * (self.body.radius + cfg.radius);
        self.projectiles.push(Projectile::new(
            id,
            Faction::Player,
            muzzle,
            forward * cfg.speed,
            cfg.radius,
            cfg.ttl,
        ));
        self.fire_cooldown = self.fire_cooldown_max;
        true
    }

    /// Advance owned projectiles and drop expired or escaped ones.
    /// Returns how many were removed.
    pub fn update_projectiles(&mut self, dt: f32, world: &Aabb) -> usize {
        for projectile in &mut self.projectiles {
            projectile.update(dt);
        }
        let before = self.projectiles.len();
        self.projectiles.retain(|p| p.is_live_in(world));
        before - self.projectiles.len()
    }
}

/// Enemy steering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyBehavior {
    /// Head straight for the player
    Chase,
    /// Strafe sideways while closing slowly
    Evade,
}

impl EnemyBehavior {
    pub fn flipped(self) -> Self {
        match self {
            EnemyBehavior::Chase => EnemyBehavior::Evade,
            EnemyBehavior::Evade => EnemyBehavior::Chase,
        }
    }
}

/// A hostile ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    pub health: u32,
    pub max_health: u32,
    pub behavior: EnemyBehavior,
    /// Seconds until the behavior flips
    pub behavior_timer: f32,
    pub behavior_period: f32,
    pub speed: f32,
    pub evade_approach: f32,
    /// +1 strafes right of the player line, -1 left
    pub strafe: f32,
    /// Seconds until the next shot (unused when fire is disabled)
    pub fire_timer: f32,
}

impl Enemy {
    pub fn new(id: EntityId, pos: Vec3, cfg: &EnemyConfig, strafe: f32, fire_phase: f32) -> Self {
        Self {
            body: Body::new(id, pos, Vec3::ZERO, cfg.radius),
            health: cfg.health,
            max_health: cfg.health,
            behavior: EnemyBehavior::Chase,
            behavior_timer: cfg.behavior_period,
            behavior_period: cfg.behavior_period,
            speed: cfg.speed,
            evade_approach: cfg.evade_approach,
            strafe: if strafe < 0.0 { -1.0 } else { 1.0 },
            fire_timer: cfg.fire_interval.unwrap_or(0.0) * fire_phase.clamp(0.0, 1.0),
        }
    }

    /// Steer toward `target` according to the current behavior and integrate
    pub fn update(&mut self, dt: f32, target: Vec3) {
        if !(dt > 0.0) {
            return;
        }

        self.behavior_timer -= dt;
        if self.behavior_timer <= 0.0 {
            self.behavior = self.behavior.flipped();
            self.behavior_timer = self.behavior_period;
        }

        let to_target = direction(self.body.pos, target);
        let heading = match self.behavior {
            EnemyBehavior::Chase => to_target,
            EnemyBehavior::Evade => {
                let lateral = Vec3::new(-to_target.z, 0.0, to_target.x) * self.strafe;
                (to_target * self.evade_approach + lateral * (1.0 - self.evade_approach))
                    .normalize_or_zero()
            }
        };
        self.body.vel = heading * self.speed;
        self.body.integrate(dt);
    }

    /// Register one projectile hit. Returns remaining health.
    pub fn apply_hit(&mut self) -> u32 {
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            self.body.alive = false;
        }
        self.health
    }

    pub fn is_destroyed(&self) -> bool {
        self.health == 0
    }

    /// Count down the weapon and, when ready and in range, return a shot aimed
    /// at `target`.
    pub fn tick_weapon(
        &mut self,
        dt: f32,
        target: Vec3,
        cfg: &EnemyConfig,
        id: EntityId,
        projectile: &ProjectileConfig,
    ) -> Option<Projectile> {
        let interval = cfg.fire_interval?;
        if !(dt > 0.0) || !self.body.alive {
            return None;
        }
        self.fire_timer -= dt;
        if self.fire_timer > 0.0 {
            return None;
        }
        self.fire_timer = interval;
        if distance(self.body.pos, target) > cfg.fire_range {
            return None;
        }
        let aim = direction(self.body.pos, target);
        if aim == Vec3::ZERO {
            return None;
        }
        Some(Projectile::new(
            id,
            Faction::Enemy,
            self.body.pos + aim * (self.body.radius + projectile.radius),
            aim * cfg.projectile_speed,
            projectile.radius,
            projectile.ttl,
        ))
    }
}

/// Drifting debris
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub body: Body,
    /// Cosmetic spin (radians/sec per axis)
    pub rotation_rate: Vec3,
    /// Accumulated cosmetic rotation (Euler radians)
    pub rotation: Vec3,
}

impl Obstacle {
    pub fn new(id: EntityId, pos: Vec3, drift: Vec3, radius: f32, rotation_rate: Vec3) -> Self {
        Self {
            body: Body::new(id, pos, drift, radius),
            rotation_rate,
            rotation: Vec3::ZERO,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if !(dt > 0.0) {
            return;
        }
        self.body.integrate(dt);
        self.rotation += self.rotation_rate * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn player() -> Player {
        Player::new(1, &PlayerConfig::default())
    }

    #[test]
    fn test_zero_dt_leaves_entities_unchanged() {
        let mut p = player();
        p.body.vel = Vec3::new(3.0, 0.0, -2.0);
        let (pos, vel) = (p.body.pos, p.body.vel);
        p.update(&Movement::Steer { turn: 1.0, thrust: 1.0 }, 0.0);
        assert_eq!((p.body.pos, p.body.vel), (pos, vel));

        let mut e = Enemy::new(2, Vec3::new(0.0, 0.0, -50.0), &EnemyConfig::default(), 1.0, 0.5);
        e.body.vel = Vec3::X;
        e.update(0.0, Vec3::ZERO);
        assert_eq!((e.body.pos, e.body.vel), (Vec3::new(0.0, 0.0, -50.0), Vec3::X));

        let mut o = Obstacle::new(3, Vec3::ONE, Vec3::Z, 2.0, Vec3::ONE);
        o.update(0.0);
        assert_eq!((o.body.pos, o.body.vel), (Vec3::ONE, Vec3::Z));

        let mut pr = Projectile::new(4, Faction::Player, Vec3::ZERO, Vec3::NEG_Z, 0.5, 1.0);
        pr.update(0.0);
        assert_eq!((pr.body.pos, pr.body.vel, pr.ttl), (Vec3::ZERO, Vec3::NEG_Z, 1.0));
    }

    #[test]
    fn test_player_clamped_at_bound() {
        let mut p = player();
        let edge = p.bounds.max.x;
        p.body.pos.x = edge;
        p.body.vel = Vec3::new(50.0, 0.0, 0.0);
        p.update(&Movement::default(), 1.0 / 60.0);
        assert_eq!(p.body.pos.x, edge);
        assert_eq!(p.body.vel.x, 0.0);
    }

    #[test]
    fn test_player_fire_respects_cooldown() {
        let mut p = player();
        let cfg = ProjectileConfig::default();
        assert!(p.fire(10, &cfg));
        assert!(!p.fire(11, &cfg));
        assert_eq!(p.projectiles.len(), 1);

        // Cooldown elapses through update
        p.update(&Movement::default(), p.fire_cooldown_max + 0.01);
        assert!(p.fire(12, &cfg));
        assert_eq!(p.projectiles.len(), 2);
    }

    #[test]
    fn test_projectile_fired_along_heading() {
        let mut p = player();
        p.heading = std::f32::consts::FRAC_PI_2;
        p.fire(10, &ProjectileConfig::default());
        let shot = &p.projectiles[0];
        assert!(shot.body.vel.x > 0.0);
        assert!(shot.body.vel.z.abs() < 1e-3);
        assert_eq!(shot.owner, Faction::Player);
    }

    #[test]
    fn test_projectiles_expire_same_tick() {
        let mut p = player();
        let cfg = ProjectileConfig {
            ttl: 0.05,
            ..Default::default()
        };
        p.fire(10, &cfg);
        let world = Aabb::new(Vec3::splat(-1000.0), Vec3::splat(1000.0));
        assert_eq!(p.update_projectiles(0.02, &world), 0);
        assert_eq!(p.update_projectiles(0.04, &world), 1);
        assert!(p.projectiles.is_empty());
    }

    #[test]
    fn test_projectiles_leave_world() {
        let mut p = player();
        p.fire(10, &ProjectileConfig::default());
        let tiny = Aabb::new(Vec3::splat(-3.0), Vec3::splat(3.0));
        assert_eq!(p.update_projectiles(0.1, &tiny), 1);
    }

    #[test]
    fn test_enemy_health_only_decreases() {
        let mut e = Enemy::new(1, Vec3::ZERO, &EnemyConfig::default(), 1.0, 0.0);
        assert_eq!(e.health, 2);
        assert_eq!(e.apply_hit(), 1);
        assert!(e.body.alive);
        assert_eq!(e.apply_hit(), 0);
        assert!(!e.body.alive);
        assert_eq!(e.apply_hit(), 0);
        assert!(e.health <= e.max_health);
    }

    #[test]
    fn test_enemy_chases_then_evades() {
        let cfg = EnemyConfig {
            behavior_period: 1.0,
            ..Default::default()
        };
        let mut e = Enemy::new(1, Vec3::new(0.0, 0.0, -50.0), &cfg, 1.0, 0.0);
        e.update(0.5, Vec3::ZERO);
        assert_eq!(e.behavior, EnemyBehavior::Chase);
        // Heading straight at the origin along +Z
        assert!(e.body.vel.z > 0.0 && e.body.vel.x.abs() < 1e-4);

        e.update(0.6, Vec3::ZERO);
        assert_eq!(e.behavior, EnemyBehavior::Evade);
        assert!(e.body.vel.x.abs() > 1.0);
        assert!((e.body.vel.length() - cfg.speed).abs() < 1e-3);
    }

    #[test]
    fn test_enemy_weapon_fires_in_range_only() {
        let cfg = EnemyConfig {
            fire_interval: Some(1.0),
            fire_range: 20.0,
            ..Default::default()
        };
        let proj = ProjectileConfig::default();
        let mut near = Enemy::new(1, Vec3::new(0.0, 0.0, -10.0), &cfg, 1.0, 0.0);
        let shot = near.tick_weapon(0.1, Vec3::ZERO, &cfg, 5, &proj).unwrap();
        assert_eq!(shot.owner, Faction::Enemy);
        assert!(shot.body.vel.z > 0.0);
        assert!(near.tick_weapon(0.1, Vec3::ZERO, &cfg, 6, &proj).is_none());

        let mut far = Enemy::new(2, Vec3::new(0.0, 0.0, -80.0), &cfg, 1.0, 0.0);
        assert!(far.tick_weapon(0.1, Vec3::ZERO, &cfg, 7, &proj).is_none());

        let silent = EnemyConfig {
            fire_interval: None,
            ..cfg
        };
        let mut quiet = Enemy::new(3, Vec3::new(0.0, 0.0, -10.0), &silent, 1.0, 0.0);
        assert!(quiet.tick_weapon(5.0, Vec3::ZERO, &silent, 8, &proj).is_none());
    }

    #[test]
    fn test_obstacle_spins_and_drifts() {
        let mut o = Obstacle::new(1, Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), 2.0, Vec3::Y);
        o.update(0.5);
        assert_eq!(o.body.pos, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(o.rotation, Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = Body::new(1, Vec3::ZERO, Vec3::ZERO, 1.0);
        let b = Body::new(2, Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, 1.0);
        assert!(!a.overlaps(&b));
        let c = Body::new(3, Vec3::new(1.9, 0.0, 0.0), Vec3::ZERO, 1.0);
        assert!(a.overlaps(&c));
    }

    proptest! {
        #[test]
        fn prop_thrust_speed_stays_bounded(
            friction in 0.05f32..0.99,
            accel in 1.0f32..200.0,
            frames in 1usize..600,
        ) {
            let cfg = PlayerConfig {
                friction,
                thrust_accel: accel,
                bounds: Aabb::new(Vec3::splat(-1.0e9), Vec3::splat(1.0e9)),
                ..Default::default()
            };
            let mut p = Player::new(1, &cfg);
            let dt = REFERENCE_DT;
            // Geometric series limit of (v + a*dt) * f
            let terminal = accel * dt * friction / (1.0 - friction);
            let thrust = Movement::Steer { turn: 0.0, thrust: 1.0 };
            let mut last = 0.0;
            for _ in 0..frames {
                p.update(&thrust, dt);
                let speed = p.body.vel.length();
                prop_assert!(speed <= terminal * 1.001 + 1e-4);
                prop_assert!(speed + 1e-4 >= last);
                last = speed;
            }
        }

        #[test]
        fn prop_player_never_leaves_bounds(
            turn in -1.0f32..1.0,
            thrust in -1.0f32..1.0,
            frames in 1usize..300,
        ) {
            let mut p = player();
            let movement = Movement::Steer { turn, thrust };
            for _ in 0..frames {
                p.update(&movement, 0.05);
                prop_assert!(p.bounds.contains(p.body.pos));
            }
        }
    }
}
