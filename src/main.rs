//! Floppy Disk entry point
//!
//! Native builds run a headless session: one scripted run through the fixed
//! timestep loop, then the score is submitted and the ranking printed.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use glam::Vec2;

    use floppy_disk::audio::{AudioRouter, Clip, Sound};
    use floppy_disk::consts::{MAX_SUBSTEPS, SIM_DT};
    use floppy_disk::game::Cue;
    use floppy_disk::platform::{
        FileStore, HeadlessSource, KinematicBody, ListRecorder, ScreenRecorder, TextLabel,
    };
    use floppy_disk::player::ColliderTag;
    use floppy_disk::{Game, GameParts, GameState, Settings, StateCues, TickInput};

    /// Seconds between obstacle gaps
    const GAP_INTERVAL: f32 = 1.5;
    /// Simulated display refresh
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up on a run after this long
    const MAX_RUN_SECONDS: f32 = 120.0;

    fn audio() -> AudioRouter {
        let mut audio = AudioRouter::new(rand::random());
        audio.set_transition_effect("record_scratch");
        let effects = [("record_scratch", 0.6), ("game_over", 1.2)];
        for (name, length) in effects {
            audio.register(
                Sound::effect(name, Clip::new(format!("{name}.wav"), length)),
                Box::new(HeadlessSource::new()),
            );
        }
        let songs = [("menu", 42.0), ("floppy_theme", 95.0), ("disk_jockey", 120.0)];
        for (name, length) in songs {
            audio.register(
                Sound::music(name, Clip::new(format!("{name}.ogg"), length)),
                Box::new(HeadlessSource::new()),
            );
        }
        audio
    }

    pub fn run() {
        let data_dir =
            std::env::var("FLOPPY_DISK_DATA_DIR").unwrap_or_else(|_| ".floppy-disk".to_string());
        let mut args = std::env::args().skip(1);
        let name = args.next().unwrap_or_else(|| "Ada".to_string());
        let gaps: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);

        log::info!("Floppy Disk (headless) starting, data in {data_dir}");

        let mut settings_store = FileStore::new(&data_dir);
        let settings = Settings::load(&settings_store);

        let mut cues = StateCues::default();
        cues.set(GameState::Credits, Cue::QueuedSong("menu".to_string()));

        let ranking = ListRecorder::new();
        let screen = ScreenRecorder::new();
        let mut game = Game::new(GameParts {
            body: Box::new(KinematicBody::new(Vec2::ZERO, Vec2::new(0.0, -25.0))),
            start_position: Vec2::ZERO,
            storage: Box::new(FileStore::new(&data_dir)),
            audio: audio(),
            score_display: Box::new(TextLabel::new()),
            game_over_label: Box::new(TextLabel::new()),
            ranking_list: Box::new(ranking.clone()),
            surfaces: Box::new(screen.clone()),
            settings,
            cues,
        });

        game.play_game();

        // Fixed timestep loop; tap whenever the player sinks below the start line
        let mut accumulator = 0.0;
        let mut elapsed = 0.0;
        let mut next_gap = GAP_INTERVAL;
        let mut gaps_passed = 0;
        while game.state() == GameState::Play && elapsed < MAX_RUN_SECONDS {
            accumulator += FRAME_DT;
            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let body = game.player().body();
                let input = TickInput {
                    tap: body.position().y < 0.0 && body.velocity().y < 0.0,
                    ..Default::default()
                };
                game.tick(&input, SIM_DT);
                accumulator -= SIM_DT;
                elapsed += SIM_DT;
                substeps += 1;

                if elapsed >= next_gap {
                    if gaps_passed < gaps {
                        game.on_trigger(ColliderTag::Score);
                        gaps_passed += 1;
                        next_gap += GAP_INTERVAL;
                    } else {
                        game.on_trigger(ColliderTag::Obstacle);
                        break;
                    }
                }
            }
        }

        log::info!("Run over after {elapsed:.1}s with score {}", game.score());
        game.submit_score(&name);

        game.show_ranking();
        game.sort_leaderboard_by_score();
        log::debug!("Visible surfaces: {:?}", screen.visible());
        for (rank, (player, score)) in ranking.rows().iter().enumerate() {
            println!("{:>3}. {player:<16} {score}", rank + 1);
        }

        game.quit();
        if game.quit_requested() {
            game.settings().save(&mut settings_store);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    use floppy_disk::Settings;
    use floppy_disk::platform::LocalStorageStore;

    let settings = Settings::load(&LocalStorageStore::new());
    log::info!("Floppy Disk (web) ready, quality {}", settings.quality.as_str());
}
