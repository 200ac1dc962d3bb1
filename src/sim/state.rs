//! Session state and phase transitions
//!
//! A `GameSession` owns every entity collection plus score, lives and the
//! spawn controller. It is reusable: `start()` after game over begins a fresh
//! run with the same seed.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::{Enemy, EntityId, Faction, Obstacle, Player, Projectile};
use super::spawn::SpawnController;
use crate::config::GameConfig;

/// Top-level session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first start
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Gameplay frozen until resumed
    Paused,
    /// Run ended; `start()` begins a new one
    GameOver,
}

/// Things that happened during a tick, in order, for HUD/audio/effects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    SessionStarted,
    Paused,
    Resumed,
    ShotFired { id: EntityId, owner: Faction },
    EnemySpawned { id: EntityId },
    ObstacleSpawned { id: EntityId },
    EnemyHit { id: EntityId, remaining: u32 },
    EnemyDestroyed { id: EntityId, bonus: u64 },
    ObstacleDestroyed { id: EntityId, bonus: u64 },
    ObstacleDodged { id: EntityId, bonus: u64 },
    LifeLost { lives: u32 },
    LevelUp { level: u32 },
    GameOver { final_score: u64 },
}

/// What the HUD shows every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub phase: GamePhase,
}

/// One game session
#[derive(Debug, Clone)]
pub struct GameSession {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    /// Seconds of play in the current run
    pub elapsed: f32,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub obstacles: Vec<Obstacle>,
    /// Shots fired by enemies (player shots live on the player)
    pub enemy_projectiles: Vec<Projectile>,
    pub spawner: SpawnController,
    pub(crate) config: GameConfig,
    pub(crate) events: Vec<GameEvent>,
    next_id: EntityId,
    /// Runs started so far; entity ids are only unique within one run
    run: u32,
}

impl GameSession {
    /// Create a session in the menu phase. Nothing is spawned until `start()`.
    ///
    /// The config is used as given; an invalid one is only logged.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("Session created with an invalid config: {e}");
        }
        let player = Player::new(0, &config.player);
        Self {
            phase: GamePhase::Menu,
            score: 0,
            lives: config.starting_lives,
            elapsed: 0.0,
            player,
            enemies: Vec::new(),
            obstacles: Vec::new(),
            enemy_projectiles: Vec::new(),
            spawner: SpawnController::new(seed),
            config,
            events: Vec::new(),
            next_id: 1,
            run: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn difficulty(&self) -> f32 {
        self.spawner.difficulty
    }

    pub fn level(&self) -> u32 {
        self.spawner.level
    }

    /// 0 in the menu, then 1, 2, ... for each run started
    pub fn run(&self) -> u32 {
        self.run
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// The ID the next allocation will return
    pub(crate) fn peek_entity_id(&self) -> EntityId {
        self.next_id
    }

    /// Begin a run from the menu or after game over
    pub fn start(&mut self) {
        match self.phase {
            GamePhase::Menu | GamePhase::GameOver => self.reset_run(),
            GamePhase::Playing | GamePhase::Paused => {
                log::debug!("start() ignored while {:?}", self.phase);
            }
        }
    }

    /// Begin a fresh run from any phase
    pub fn restart(&mut self) {
        self.reset_run();
    }

    fn reset_run(&mut self) {
        self.score = 0;
        self.lives = self.config.starting_lives;
        self.elapsed = 0.0;
        self.enemies.clear();
        self.obstacles.clear();
        self.enemy_projectiles.clear();
        self.spawner.reset();
        self.next_id = 1;
        self.run += 1;
        let id = self.next_entity_id();
        self.player = Player::new(id, &self.config.player);
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::SessionStarted);
        log::info!(
            "Run {} started (seed {}, {} lives)",
            self.run,
            self.spawner.seed(),
            self.lives
        );
    }

    /// End the run. Idempotent.
    pub fn game_over(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver {
            final_score: self.score,
        });
        log::info!(
            "Game over: score {} at level {} after {:.1}s",
            self.score,
            self.level(),
            self.elapsed
        );
    }

    /// Playing ⇄ Paused; other phases are left alone
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => {
                self.phase = GamePhase::Paused;
                self.events.push(GameEvent::Paused);
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Playing;
                self.events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            lives: self.lives,
            level: self.level(),
            phase: self.phase,
        }
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Place an enemy directly (scripted waves, tests)
    pub fn spawn_enemy_at(&mut self, pos: Vec3) -> EntityId {
        let id = self.next_entity_id();
        let fire_phase = 1.0;
        self.enemies
            .push(Enemy::new(id, pos, &self.config.enemy, 1.0, fire_phase));
        self.events.push(GameEvent::EnemySpawned { id });
        id
    }

    /// Place a stationary obstacle directly (scripted waves, tests)
    pub fn spawn_obstacle_at(&mut self, pos: Vec3, radius: f32) -> EntityId {
        let id = self.next_entity_id();
        self.obstacles
            .push(Obstacle::new(id, pos, Vec3::ZERO, radius, Vec3::ZERO));
        self.events.push(GameEvent::ObstacleSpawned { id });
        id
    }
}
