//! Collision detection between entity categories
//!
//! Sphere-vs-sphere overlap, checked pairwise. Counts stay in the tens, so the
//! O(P·E + P·O) scan is fine. Detection is pure: it reports what touches what
//! and leaves every outcome to the session.

use super::entity::{Body, Enemy, EntityId, Obstacle, Player, Projectile};

/// A player projectile striking a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileHit {
    pub projectile: EntityId,
    pub target: EntityId,
    /// Center distance at detection time
    pub distance: f32,
}

/// Everything that overlapped during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionBatch {
    /// Player projectiles that hit an enemy (at most one record per projectile)
    pub projectile_enemy: Vec<ProjectileHit>,
    /// Player projectiles that hit an obstacle (only projectiles with no enemy hit)
    pub projectile_obstacle: Vec<ProjectileHit>,
    /// Enemies touching the player
    pub player_enemy: Vec<EntityId>,
    /// Obstacles touching the player
    pub player_obstacle: Vec<EntityId>,
    /// Enemy projectiles touching the player
    pub enemy_projectile_player: Vec<EntityId>,
}

impl CollisionBatch {
    pub fn is_empty(&self) -> bool {
        self.projectile_enemy.is_empty()
            && self.projectile_obstacle.is_empty()
            && self.player_enemy.is_empty()
            && self.player_obstacle.is_empty()
            && self.enemy_projectile_player.is_empty()
    }

    /// Distinct things that cost the player a life this tick
    pub fn player_contacts(&self) -> usize {
        self.player_enemy.len() + self.player_obstacle.len() + self.enemy_projectile_player.len()
    }
}

/// Check every relevant pair and collect the overlaps.
///
/// Each player projectile scores at most one hit: the nearest overlapping
/// enemy, or failing that the nearest overlapping obstacle. Equal distances go
/// to the lower entity id. Dead entities are ignored.
pub fn check_all(
    player: &Player,
    enemies: &[Enemy],
    obstacles: &[Obstacle],
    enemy_projectiles: &[Projectile],
) -> CollisionBatch {
    let mut batch = CollisionBatch::default();

    for shot in player.projectiles.iter().filter(|p| p.body.alive) {
        if let Some(hit) = nearest_overlap(&shot.body, enemies.iter().map(|e| &e.body)) {
            batch.projectile_enemy.push(hit);
        } else if let Some(hit) = nearest_overlap(&shot.body, obstacles.iter().map(|o| &o.body)) {
            batch.projectile_obstacle.push(hit);
        }
    }

    if player.body.alive {
        batch.player_enemy = touching(&player.body, enemies.iter().map(|e| &e.body));
        batch.player_obstacle = touching(&player.body, obstacles.iter().map(|o| &o.body));
        batch.enemy_projectile_player =
            touching(&player.body, enemy_projectiles.iter().map(|p| &p.body));
    }

    batch
}

fn nearest_overlap<'a>(
    shot: &Body,
    targets: impl Iterator<Item = &'a Body>,
) -> Option<ProjectileHit> {
    targets
        .filter(|t| t.alive && shot.overlaps(t))
        .map(|t| ProjectileHit {
            projectile: shot.id,
            target: t.id,
            distance: shot.pos.distance(t.pos),
        })
        .min_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.target.cmp(&b.target))
        })
}

fn touching<'a>(body: &Body, others: impl Iterator<Item = &'a Body>) -> Vec<EntityId> {
    others
        .filter(|o| o.alive && body.overlaps(o))
        .map(|o| o.id)
        .collect()
}
