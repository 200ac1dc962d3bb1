//! Render and HUD collaborator interfaces
//!
//! The simulation never draws. A host implements [`SceneSink`] over its scene
//! graph and [`HudSink`] over its HUD, then calls [`SceneSync::sync`] and
//! [`present_hud`] once per frame.

pub mod sync;
pub mod visual;

pub use sync::{SceneSync, SyncStats};
pub use visual::{Transform, VisualKind, colors};

use crate::sim::{EntityId, GameEvent, HudSnapshot};

/// Receives visual lifecycle calls
pub trait SceneSink {
    fn create_visual(&mut self, id: EntityId, kind: VisualKind, transform: Transform);
    fn update_visual(&mut self, id: EntityId, transform: Transform);
    fn destroy_visual(&mut self, id: EntityId);
}

/// Receives score/lives/level and the game-over transition
pub trait HudSink {
    fn update_hud(&mut self, hud: &HudSnapshot);
    fn game_over(&mut self, final_score: u64);
}

/// Push this frame's HUD snapshot, plus the game-over notice if `events`
/// contains one
pub fn present_hud<H: HudSink + ?Sized>(hud: &mut H, snapshot: &HudSnapshot, events: &[GameEvent]) {
    hud.update_hud(snapshot);
    for event in events {
        if let GameEvent::GameOver { final_score } = event {
            hud.game_over(*final_score);
        }
    }
}
