//! Keeps an external scene in step with the session
//!
//! `SceneSync` remembers which visuals it has created and, each frame, issues
//! exactly the create/update/destroy calls needed to match the live entities.
//! Entity ids restart with every run, so a new run tears down everything left
//! over from the previous one before any id is reused.

use std::collections::{HashMap, HashSet};

use glam::Vec3;

use super::SceneSink;
use super::visual::{Transform, VisualKind};
use crate::forward_to_heading;
use crate::sim::{EntityId, GameSession};

/// Calls issued by one `sync`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub created: usize,
    pub updated: usize,
    pub destroyed: usize,
}

/// Visuals known to the sink, by entity id
#[derive(Debug, Default)]
pub struct SceneSync {
    known: HashMap<EntityId, VisualKind>,
    /// Session run the known visuals belong to
    run: Option<u32>,
}

/// Every live entity as (id, kind, transform), player first
fn scene_entries(session: &GameSession) -> Vec<(EntityId, VisualKind, Transform)> {
    let mut entries = Vec::with_capacity(
        1 + session.enemies.len()
            + session.obstacles.len()
            + session.player.projectiles.len()
            + session.enemy_projectiles.len(),
    );

    let player = &session.player;
    if player.body.alive {
        entries.push((
            player.body.id,
            VisualKind::Player,
            Transform::facing(player.body.pos, player.heading),
        ));
    }
    for enemy in session.enemies.iter().filter(|e| e.body.alive) {
        let heading = if enemy.body.vel == Vec3::ZERO {
            0.0
        } else {
            forward_to_heading(enemy.body.vel)
        };
        entries.push((
            enemy.body.id,
            VisualKind::Enemy,
            Transform::facing(enemy.body.pos, heading),
        ));
    }
    for obstacle in session.obstacles.iter().filter(|o| o.body.alive) {
        entries.push((
            obstacle.body.id,
            VisualKind::Obstacle,
            Transform::new(obstacle.body.pos, obstacle.rotation),
        ));
    }
    for shot in player.projectiles.iter().filter(|p| p.body.alive) {
        entries.push((
            shot.body.id,
            VisualKind::PlayerProjectile,
            Transform::new(shot.body.pos, Vec3::ZERO),
        ));
    }
    for bolt in session.enemy_projectiles.iter().filter(|p| p.body.alive) {
        entries.push((
            bolt.body.id,
            VisualKind::EnemyProjectile,
            Transform::new(bolt.body.pos, Vec3::ZERO),
        ));
    }
    entries
}

impl SceneSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of visuals currently alive in the sink
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.known.contains_key(&id)
    }

    /// Bring `sink` in line with the session's live entities
    pub fn sync<S: SceneSink + ?Sized>(&mut self, session: &GameSession, sink: &mut S) -> SyncStats {
        let entries = scene_entries(session);
        let mut stats = SyncStats::default();

        if self.run != Some(session.run()) {
            if !self.known.is_empty() {
                log::debug!(
                    "Run changed to {}, dropping {} visuals",
                    session.run(),
                    self.known.len()
                );
            }
            stats.destroyed += self.clear(sink);
            self.run = Some(session.run());
        }

        let live: HashSet<EntityId> = entries.iter().map(|(id, _, _)| *id).collect();
        let mut stale: Vec<EntityId> = self
            .known
            .keys()
            .filter(|id| !live.contains(*id))
            .copied()
            .collect();
        stale.sort_unstable();
        for id in stale {
            self.known.remove(&id);
            sink.destroy_visual(id);
            stats.destroyed += 1;
        }

        for (id, kind, transform) in entries {
            if self.known.contains_key(&id) {
                sink.update_visual(id, transform);
                stats.updated += 1;
            } else {
                self.known.insert(id, kind);
                sink.create_visual(id, kind, transform);
                stats.created += 1;
            }
        }

        if stats.created > 0 || stats.destroyed > 0 {
            log::trace!(
                "Scene sync: +{} -{} ({} live)",
                stats.created,
                stats.destroyed,
                self.known.len()
            );
        }
        stats
    }

    /// Destroy every known visual. Returns how many were destroyed.
    pub fn clear<S: SceneSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let mut ids: Vec<EntityId> = self.known.drain().map(|(id, _)| id).collect();
        ids.sort_unstable();
        for &id in &ids {
            sink.destroy_visual(id);
        }
        ids.len()
    }
}
