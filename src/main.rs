//! Deep Field entry point
//!
//! Native builds run a headless session driven by a simple autopilot. Scene
//! and HUD calls go to the log (and optionally a scene log file) instead of a
//! renderer.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::fs::File;
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    use clap::Parser;
    use glam::Vec3;

    use deep_field::platform::InputAdapter;
    use deep_field::renderer::{HudSink, SceneSink, SceneSync, Transform, VisualKind, present_hud};
    use deep_field::sim::{EntityId, GameEvent, GamePhase, GameSession, HudSnapshot};
    use deep_field::{Error, GameConfig, forward_to_heading, normalize_angle};

    const VIEWPORT: (f32, f32) = (1280.0, 720.0);
    const STICK_TOUCH: u32 = 0;
    const FIRE_TOUCH: u32 = 1;

    /// Headless Deep Field session with an autopilot
    #[derive(Parser, Debug)]
    #[command(name = "deep-field", version, about)]
    pub struct Args {
        /// RNG seed (defaults to the current time)
        #[arg(long)]
        pub seed: Option<u64>,

        /// JSON game config; missing fields use defaults
        #[arg(long)]
        pub config: Option<PathBuf>,

        /// Simulated seconds to run
        #[arg(long, default_value_t = 60.0)]
        pub seconds: f32,

        /// Frames per simulated second
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
        pub fps: u32,

        /// Drive the ship with the touch joystick instead of the keyboard
        #[arg(long)]
        pub touch: bool,

        /// Write every scene call to this file
        #[arg(long)]
        pub scene_log: Option<PathBuf>,

        /// Print the effective config as JSON and exit
        #[arg(long)]
        pub print_config: bool,
    }

    /// Scene and HUD collaborator that reports to the log
    struct LogSink {
        out: Option<BufWriter<File>>,
        visuals_created: usize,
        visuals_destroyed: usize,
        last_hud: Option<HudSnapshot>,
    }

    impl LogSink {
        fn open(path: Option<&Path>) -> Result<Self, Error> {
            let out = match path {
                Some(path) => {
                    let file = File::create(path).map_err(|e| {
                        Error::RendererUnavailable(format!("{}: {e}", path.display()))
                    })?;
                    log::info!("Writing scene log to {}", path.display());
                    Some(BufWriter::new(file))
                }
                None => None,
            };
            Ok(Self {
                out,
                visuals_created: 0,
                visuals_destroyed: 0,
                last_hud: None,
            })
        }

        fn record(&mut self, line: std::fmt::Arguments<'_>) {
            let Some(out) = self.out.as_mut() else {
                return;
            };
            if let Err(e) = writeln!(out, "{line}") {
                log::warn!("Scene log disabled: {e}");
                self.out = None;
            }
        }

        fn finish(&mut self) {
            if let Some(out) = self.out.as_mut() {
                if let Err(e) = out.flush() {
                    log::warn!("Failed to flush scene log: {e}");
                }
            }
        }
    }

    impl SceneSink for LogSink {
        fn create_visual(&mut self, id: EntityId, kind: VisualKind, transform: Transform) {
            self.visuals_created += 1;
            self.record(format_args!(
                "create {id} {kind:?} {:?} color={:?}",
                transform.position,
                kind.color()
            ));
        }

        fn update_visual(&mut self, id: EntityId, transform: Transform) {
            self.record(format_args!(
                "update {id} {:?} {:?}",
                transform.position, transform.rotation
            ));
        }

        fn destroy_visual(&mut self, id: EntityId) {
            self.visuals_destroyed += 1;
            self.record(format_args!("destroy {id}"));
        }
    }

    impl HudSink for LogSink {
        fn update_hud(&mut self, hud: &HudSnapshot) {
            if self.last_hud.as_ref() != Some(hud) {
                log::debug!(
                    "HUD score={} lives={} level={} phase={:?}",
                    hud.score,
                    hud.lives,
                    hud.level,
                    hud.phase
                );
                self.last_hud = Some(*hud);
            }
        }

        fn game_over(&mut self, final_score: u64) {
            log::info!("HUD: GAME OVER, final score {final_score}");
        }
    }

    /// Feeds synthetic device events: aims at the nearest threat and fires
    struct Autopilot {
        touch: bool,
        held: Vec<&'static str>,
        release_start: bool,
        stick_down: bool,
        fire_down: bool,
    }

    impl Autopilot {
        fn new(touch: bool) -> Self {
            Self {
                touch,
                held: Vec::new(),
                release_start: false,
                stick_down: false,
                fire_down: false,
            }
        }

        fn press_start(&mut self, input: &mut InputAdapter) {
            input.key_down("Enter");
            self.release_start = true;
        }

        fn set_key(&mut self, input: &mut InputAdapter, key: &'static str, down: bool) {
            let held = self.held.contains(&key);
            if down && !held {
                input.key_down(key);
                self.held.push(key);
            } else if !down && held {
                input.key_up(key);
                self.held.retain(|k| *k != key);
            }
        }

        fn drive(&mut self, session: &GameSession, input: &mut InputAdapter) {
            if std::mem::take(&mut self.release_start) {
                input.key_up("Enter");
            }
            let player = &session.player;
            let target = session
                .enemies
                .iter()
                .map(|e| e.body.pos)
                .chain(session.obstacles.iter().map(|o| o.body.pos))
                .min_by(|a, b| {
                    a.distance(player.body.pos)
                        .total_cmp(&b.distance(player.body.pos))
                });

            if self.touch {
                self.drive_touch(input, player.body.pos, target);
            } else {
                self.drive_keys(input, player.body.pos, player.heading, target);
            }
        }

        fn drive_keys(&mut self, input: &mut InputAdapter, pos: Vec3, heading: f32, target: Option<Vec3>) {
            let (turn, aimed, close) = match target {
                Some(t) => {
                    let diff = normalize_angle(forward_to_heading(t - pos) - heading);
                    (diff, diff.abs() < 0.15, pos.distance(t) < 25.0)
                }
                None => (0.0, false, false),
            };
            self.set_key(input, "ArrowRight", turn > 0.05);
            self.set_key(input, "ArrowLeft", turn < -0.05);
            self.set_key(input, "ArrowDown", close);
            self.set_key(input, " ", aimed);
        }

        fn drive_touch(&mut self, input: &mut InputAdapter, pos: Vec3, target: Option<Vec3>) {
            let (w, h) = VIEWPORT;
            let anchor = (w * 0.25, h * 0.5);
            if !self.stick_down {
                input.touch_start(STICK_TOUCH, anchor.0, anchor.1);
                self.stick_down = true;
            }

            // Lean toward the target so the nose follows it, barely moving up close
            let (stick, fire) = match target {
                Some(t) => {
                    let to = (t - pos).normalize_or_zero();
                    let lean = if pos.distance(t) > 30.0 { 0.4 } else { 0.02 };
                    ((to.x * lean, -to.z * lean), true)
                }
                None => ((0.0, 0.0), false),
            };
            let radius = input.joystick_radius();
            input.touch_move(
                STICK_TOUCH,
                anchor.0 + stick.0 * radius,
                anchor.1 - stick.1 * radius,
            );

            if fire != self.fire_down {
                if fire {
                    input.touch_start(FIRE_TOUCH, w * 0.75, h * 0.5);
                } else {
                    input.touch_end(FIRE_TOUCH, w * 0.75, h * 0.5);
                }
                self.fire_down = fire;
            }
        }
    }

    #[derive(Debug, Default)]
    struct RunSummary {
        score: u64,
        level: u32,
        seconds: f32,
        kills: u32,
        rocks: u32,
        dodged: u32,
        lives_lost: u32,
        finished: bool,
    }

    impl RunSummary {
        fn record(&mut self, event: &GameEvent) {
            match event {
                GameEvent::EnemyDestroyed { .. } => self.kills += 1,
                GameEvent::ObstacleDestroyed { .. } => self.rocks += 1,
                GameEvent::ObstacleDodged { .. } => self.dodged += 1,
                GameEvent::LifeLost { .. } => self.lives_lost += 1,
                GameEvent::GameOver { .. } => self.finished = true,
                _ => {}
            }
        }
    }

    fn default_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }

    /// Load `path`, or fall back to the built-in defaults with a warning
    fn load_config(path: Option<&Path>) -> Result<GameConfig, Error> {
        match path {
            Some(path) => Ok(GameConfig::load(path)?),
            None => {
                log::warn!("No --config given, using built-in defaults");
                Ok(GameConfig::default())
            }
        }
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let config = load_config(args.config.as_deref())?;
        if args.print_config {
            println!("{}", config.to_json_pretty()?);
            return Ok(());
        }

        let seed = args.seed.unwrap_or_else(default_seed);
        let mut sink = LogSink::open(args.scene_log.as_deref())?;
        let mut scene = SceneSync::new();
        let mut input = InputAdapter::new(config.controls.clone(), VIEWPORT.0, VIEWPORT.1);
        let mut session = GameSession::new(config, seed);
        let mut autopilot = Autopilot::new(args.touch);

        log::info!(
            "Deep Field (headless) seed={seed} fps={} seconds={} input={}",
            args.fps,
            args.seconds,
            if args.touch { "touch" } else { "keyboard" }
        );

        let dt = 1.0 / args.fps as f32;
        let frames = (args.seconds.max(0.0) * args.fps as f32).round() as u64;
        let mut runs = vec![RunSummary::default()];
        let mut restarts_left = 1;
        autopilot.press_start(&mut input);

        for _ in 0..frames {
            autopilot.drive(&session, &mut input);
            let intent = input.poll();
            let was_over = session.phase == GamePhase::GameOver;
            session.handle_commands(&intent);
            if was_over && session.phase == GamePhase::Playing {
                runs.push(RunSummary::default());
            }
            session.update(&intent, dt);

            let events = session.drain_events();
            if let Some(run) = runs.last_mut() {
                for event in &events {
                    run.record(event);
                }
                run.score = session.score;
                run.level = session.level();
                run.seconds = session.elapsed;
            }
            scene.sync(&session, &mut sink);
            present_hud(&mut sink, &session.hud(), &events);

            let ended = events
                .iter()
                .any(|e| matches!(e, GameEvent::GameOver { .. }));
            if ended {
                if restarts_left == 0 {
                    break;
                }
                restarts_left -= 1;
                autopilot.press_start(&mut input);
            }
        }
        sink.finish();

        println!("Deep Field headless run (seed {seed})");
        for (i, run) in runs.iter().enumerate() {
            println!(
                "  run {}: score {:>6}  level {:>2}  {:>6.1}s  kills {:>3}  rocks {:>3}  dodged {:>3}  lives lost {}{}",
                i + 1,
                run.score,
                run.level,
                run.seconds,
                run.kills,
                run.rocks,
                run.dodged,
                run.lives_lost,
                if run.finished { "  (game over)" } else { "" }
            );
        }
        println!(
            "  visuals created {}, destroyed {}, live {}",
            sink.visuals_created,
            sink.visuals_destroyed,
            scene.len()
        );
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();
    match headless::run(headless::Args::parse()) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts embed the library directly
}
