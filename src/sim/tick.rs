//! Per-frame simulation update
//!
//! Order within a tick: player → shots → hostiles → culling → collisions →
//! resolution → spawning → difficulty → terminal check.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::collision::{CollisionBatch, check_all};
use super::entity::{Aabb, EntityId, Faction};
use super::movement::Movement;
use super::state::{GameEvent, GamePhase, GameSession};

/// Input for a single tick, independent of the device that produced it
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub movement: Movement,
    /// Held fire (cooldown-gated repeat)
    pub fire: bool,
    /// Start / restart request (edge)
    pub start: bool,
    /// Pause toggle (edge)
    pub pause: bool,
}

/// Clamp a frame delta into `[0, max_dt]`. Negative and non-finite values
/// become 0.
pub fn sanitize_dt(dt: f32, max_dt: f32) -> f32 {
    if !dt.is_finite() || dt < 0.0 {
        log::warn!("Rejected frame delta {dt}");
        return 0.0;
    }
    dt.min(max_dt)
}

impl GameSession {
    /// Apply the edge-triggered commands in `intent` (start, pause)
    pub fn handle_commands(&mut self, intent: &Intent) {
        if intent.start {
            self.start();
        }
        if intent.pause {
            self.toggle_pause();
        }
    }

    /// Advance the simulation by `dt` seconds. Does nothing unless playing.
    pub fn update(&mut self, intent: &Intent, dt: f32) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let dt = sanitize_dt(dt, self.config.world.max_dt);
        let world = self.config.world.bounds;
        self.elapsed += dt;

        // Player and their shots
        self.player.update(&intent.movement, dt);
        if intent.fire && self.player.can_fire() {
            let id = self.next_entity_id();
            if self.player.fire(id, &self.config.projectile) {
                self.events.push(GameEvent::ShotFired {
                    id,
                    owner: Faction::Player,
                });
            }
        }
        self.player.update_projectiles(dt, &world);

        // Hostiles
        let target = self.player.body.pos;
        for enemy in &mut self.enemies {
            enemy.update(dt, target);
        }
        for obstacle in &mut self.obstacles {
            obstacle.update(dt);
        }
        for bolt in &mut self.enemy_projectiles {
            bolt.update(dt);
        }
        self.enemy_projectiles.retain(|p| p.is_live_in(&world));
        self.cull_out_of_bounds(&world);
        self.enemy_fire(dt, &world);

        let batch = check_all(
            &self.player,
            &self.enemies,
            &self.obstacles,
            &self.enemy_projectiles,
        );
        if !batch.is_empty() {
            self.resolve(&batch);
        }

        self.run_spawner(dt);

        if self.lives == 0 {
            self.game_over();
        }
    }

    /// Bolts whose muzzle point is already outside `world` are dropped
    fn enemy_fire(&mut self, dt: f32, world: &Aabb) {
        if self.config.enemy.fire_interval.is_none() {
            return;
        }
        let target = self.player.body.pos;
        for i in 0..self.enemies.len() {
            let id = self.peek_entity_id();
            if let Some(bolt) = self.enemies[i].tick_weapon(
                dt,
                target,
                &self.config.enemy,
                id,
                &self.config.projectile,
            ) {
                if !bolt.is_live_in(world) {
                    continue;
                }
                let id = self.next_entity_id();
                log::trace!("Enemy {} fired {}", self.enemies[i].body.id, id);
                self.enemy_projectiles.push(bolt);
                self.events.push(GameEvent::ShotFired {
                    id,
                    owner: Faction::Enemy,
                });
            }
        }
    }

    /// Drop enemies and obstacles that left the world. Obstacles that drift
    /// out past the player's side count as dodged.
    fn cull_out_of_bounds(&mut self, world: &Aabb) {
        self.enemies.retain(|e| {
            let keep = !e.body.is_out_of(world);
            if !keep {
                log::debug!("Enemy {} left the world", e.body.id);
            }
            keep
        });

        let dodge_bonus = self.config.scoring.obstacle_dodge;
        let mut dodged = Vec::new();
        self.obstacles.retain(|o| {
            if !o.body.is_out_of(world) {
                return true;
            }
            if o.body.pos.z > world.max.z {
                dodged.push(o.body.id);
            }
            false
        });
        for id in dodged {
            self.score += dodge_bonus;
            self.events.push(GameEvent::ObstacleDodged {
                id,
                bonus: dodge_bonus,
            });
        }
    }

    /// Apply a collision batch. Removals are gathered by id and applied in one
    /// pass at the end; ids that no longer exist are skipped.
    pub(crate) fn resolve(&mut self, batch: &CollisionBatch) {
        let mut spent_shots: HashSet<EntityId> = HashSet::new();
        let mut spent_bolts: HashSet<EntityId> = HashSet::new();
        let mut destroyed_obstacles: HashSet<EntityId> = HashSet::new();
        let mut rammed_enemies: HashSet<EntityId> = HashSet::new();

        // 1. Player shots damage enemies
        for hit in &batch.projectile_enemy {
            if spent_shots.contains(&hit.projectile) || !self.has_player_shot(hit.projectile) {
                continue;
            }
            let Some(enemy) = self
                .enemies
                .iter_mut()
                .find(|e| e.body.id == hit.target && !e.is_destroyed())
            else {
                continue;
            };
            let remaining = enemy.apply_hit();
            spent_shots.insert(hit.projectile);
            log::trace!(
                "Shot {} hit enemy {} ({} left)",
                hit.projectile,
                hit.target,
                remaining
            );
            self.events.push(GameEvent::EnemyHit {
                id: hit.target,
                remaining,
            });
        }

        // 2. Player shots destroy obstacles
        let destroy_bonus = self.config.scoring.obstacle_destroy;
        for hit in &batch.projectile_obstacle {
            if spent_shots.contains(&hit.projectile)
                || destroyed_obstacles.contains(&hit.target)
                || !self.has_player_shot(hit.projectile)
                || !self.obstacles.iter().any(|o| o.body.id == hit.target)
            {
                continue;
            }
            spent_shots.insert(hit.projectile);
            destroyed_obstacles.insert(hit.target);
            self.score += destroy_bonus;
            log::debug!("Obstacle {} destroyed", hit.target);
            self.events.push(GameEvent::ObstacleDestroyed {
                id: hit.target,
                bonus: destroy_bonus,
            });
        }

        // 3. Contacts cost the player one life each
        for &id in &batch.player_enemy {
            let touching = self
                .enemies
                .iter()
                .any(|e| e.body.id == id && !e.is_destroyed());
            if touching && rammed_enemies.insert(id) {
                self.lose_life();
            }
        }
        for &id in &batch.player_obstacle {
            let touching = self.obstacles.iter().any(|o| o.body.id == id);
            if touching && destroyed_obstacles.insert(id) {
                self.lose_life();
            }
        }
        for &id in &batch.enemy_projectile_player {
            let touching = self.enemy_projectiles.iter().any(|p| p.body.id == id);
            if touching && spent_bolts.insert(id) {
                self.lose_life();
            }
        }

        // 4. Enemies out of health are removed and scored
        let kill_bonus = self.config.scoring.enemy_kill;
        for enemy in self.enemies.iter().filter(|e| e.is_destroyed()) {
            self.score += kill_bonus;
            log::debug!("Enemy {} destroyed", enemy.body.id);
            self.events.push(GameEvent::EnemyDestroyed {
                id: enemy.body.id,
                bonus: kill_bonus,
            });
        }

        self.enemies
            .retain(|e| !e.is_destroyed() && !rammed_enemies.contains(&e.body.id));
        self.obstacles
            .retain(|o| !destroyed_obstacles.contains(&o.body.id));
        self.player
            .projectiles
            .retain(|p| !spent_shots.contains(&p.body.id));
        self.enemy_projectiles
            .retain(|p| !spent_bolts.contains(&p.body.id));
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        log::debug!("Player hit, {} lives left", self.lives);
        self.events.push(GameEvent::LifeLost { lives: self.lives });
    }

    fn has_player_shot(&self, id: EntityId) -> bool {
        self.player.projectiles.iter().any(|p| p.body.id == id)
    }

    fn run_spawner(&mut self, dt: f32) {
        let tick = self.spawner.advance(
            dt,
            &self.config.spawn,
            self.enemies.len(),
            self.obstacles.len(),
        );

        if tick.enemy {
            let id = self.next_entity_id();
            let enemy = self.spawner.spawn_enemy(id, &self.config);
            log::debug!("Spawned enemy {} at {}", id, enemy.body.pos);
            self.enemies.push(enemy);
            self.events.push(GameEvent::EnemySpawned { id });
        }
        if tick.obstacle {
            let id = self.next_entity_id();
            let obstacle = self.spawner.spawn_obstacle(id, &self.config);
            log::debug!("Spawned obstacle {} at {}", id, obstacle.body.pos);
            self.obstacles.push(obstacle);
            self.events.push(GameEvent::ObstacleSpawned { id });
        }
        if tick.level_ups > 0 {
            log::info!(
                "Level {} (difficulty {:.2})",
                self.spawner.level,
                self.spawner.difficulty
            );
            self.events.push(GameEvent::LevelUp {
                level: self.spawner.level,
            });
        }
    }
}
