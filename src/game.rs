//! Top-level game orchestrator
//!
//! Owns every component and wires them together: collisions from the player
//! feed the score and the state machine, state changes drive surface
//! visibility, audio cues, run resets and leaderboard submission. The host
//! calls `tick` once per fixed step and the menu entry points from its
//! button handlers.

use glam::Vec2;

use crate::audio::AudioRouter;
use crate::leaderboard::{LeaderboardStore, LeaderboardView};
use crate::platform::storage::KeyValueStore;
use crate::player::{ColliderTag, PhysicsBody, PlayerEvent, PlayerState};
use crate::score::ScoreTracker;
use crate::settings::{QualityPreset, Settings};
use crate::state::{GameState, GameStateMachine, Surface, SurfaceLayout};
use crate::ui::{ScoreDisplay, ScoreListView, SurfaceView};

/// Discrete input events for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer press / screen tap
    pub tap: bool,
    /// "Start" button pressed
    pub start: bool,
    /// "Back" button pressed
    pub back: bool,
}

/// Audio played when a state is entered
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    /// Named song via the transition effect
    Song(String),
    /// Named song once the current track has played out
    QueuedSong(String),
    /// Any registered song via the transition effect
    RandomSong,
    /// One-shot effect
    Effect(String),
}

/// State → cue mapping
#[derive(Debug, Clone)]
pub struct StateCues {
    cues: Vec<(GameState, Cue)>,
}

impl Default for StateCues {
    fn default() -> Self {
        Self {
            cues: vec![
                (GameState::MainMenu, Cue::Song("menu".to_string())),
                (GameState::Play, Cue::RandomSong),
                (GameState::GameOver, Cue::Effect("game_over".to_string())),
            ],
        }
    }
}

impl StateCues {
    /// Set (or replace) the cue for a state
    pub fn set(&mut self, state: GameState, cue: Cue) {
        self.cues.retain(|(s, _)| *s != state);
        self.cues.push((state, cue));
    }

    pub fn get(&self, state: GameState) -> Option<&Cue> {
        self.cues.iter().find(|(s, _)| *s == state).map(|(_, c)| c)
    }
}

/// Everything the host provides to build a `Game`
pub struct GameParts {
    pub body: Box<dyn PhysicsBody>,
    pub start_position: Vec2,
    pub storage: Box<dyn KeyValueStore>,
    pub audio: AudioRouter,
    pub score_display: Box<dyn ScoreDisplay>,
    pub game_over_label: Box<dyn ScoreDisplay>,
    pub ranking_list: Box<dyn ScoreListView>,
    pub surfaces: Box<dyn SurfaceView>,
    pub settings: Settings,
    pub cues: StateCues,
}

pub struct Game {
    machine: GameStateMachine,
    score: ScoreTracker,
    player: PlayerState,
    leaderboard: LeaderboardStore,
    ranking: LeaderboardView,
    audio: AudioRouter,
    surfaces: Box<dyn SurfaceView>,
    game_over_label: Box<dyn ScoreDisplay>,
    settings: Settings,
    cues: StateCues,
    /// State to return to when leaving Options
    options_return: GameState,
    /// A finished run whose score has not been submitted yet
    submission_open: bool,
    quit_requested: bool,
}

impl Game {
    /// Build the game in the main menu
    pub fn new(parts: GameParts) -> Self {
        let mut player = PlayerState::new(parts.body, parts.start_position);
        player.set_jump_force(parts.settings.jump_force);

        let mut audio = parts.audio;
        audio.set_music_volume(parts.settings.music_volume);
        audio.set_effects_volume(parts.settings.sfx_volume);

        let mut game = Self {
            machine: GameStateMachine::new(GameState::MainMenu),
            score: ScoreTracker::new(parts.score_display),
            player,
            leaderboard: LeaderboardStore::open(parts.storage),
            ranking: LeaderboardView::new(parts.ranking_list),
            audio,
            surfaces: parts.surfaces,
            game_over_label: parts.game_over_label,
            settings: parts.settings,
            cues: parts.cues,
            options_return: GameState::MainMenu,
            submission_open: false,
            quit_requested: false,
        };

        let layout = game.machine.layout();
        game.apply_layout(None, layout);
        game.play_cue(GameState::MainMenu);
        game
    }

    // === State transitions ===

    /// Switch state and apply its side effects. Returns false (after a
    /// warning) if already in `next`.
    pub fn set_state(&mut self, next: GameState) -> bool {
        let previous_layout = self.machine.layout();
        let Some(transition) = self.machine.set_state(next) else {
            return false;
        };
        let (from, to) = (transition.from, transition.to);

        if from == GameState::GameOver && self.submission_open {
            log::info!("Run left without submitting a score");
            self.submission_open = false;
        }

        match to {
            GameState::Play if from == GameState::PauseMenu => {
                self.player.set_playing(true);
            }
            GameState::Play => self.start_run(),
            GameState::PauseMenu => self.player.set_playing(false),
            GameState::Options => self.options_return = from,
            GameState::GameOver => {
                self.player.set_playing(false);
                self.game_over_label
                    .set_text(&format!("Score: {}", self.score.score()));
                // Only a run ending in play has a score to submit
                self.submission_open = from == GameState::Play;
            }
            GameState::MainMenu | GameState::Ranking | GameState::Credits => self.player.reset(),
        }

        let layout = self.machine.layout();
        self.apply_layout(Some(previous_layout), layout);

        let paused = to == GameState::PauseMenu
            || (to == GameState::Options && self.options_return == GameState::PauseMenu);
        self.audio.set_paused(paused);

        let resumed = to == GameState::Play && from == GameState::PauseMenu;
        if !resumed && from != GameState::Options {
            self.play_cue(to);
        }
        true
    }

    fn start_run(&mut self) {
        log::info!("New run");
        self.score.reset();
        self.player.reset();
        self.player.set_playing(true);
        self.submission_open = false;
    }

    fn apply_layout(&mut self, previous: Option<SurfaceLayout>, layout: SurfaceLayout) {
        for surface in Surface::ALL {
            self.surfaces
                .set_surface_visible(surface, layout.shows(surface));
        }
        self.surfaces
            .set_score_display_visible(layout.score_display);

        // Ranking list is drawn while its surface is up and cleared when it goes
        let was_ranking = previous.is_some_and(|p| p.shows(Surface::Ranking));
        let is_ranking = layout.shows(Surface::Ranking);
        if is_ranking && !was_ranking {
            self.ranking.show(self.leaderboard.entries());
        } else if was_ranking && !is_ranking {
            self.ranking.clear();
        }
    }

    fn play_cue(&mut self, state: GameState) {
        match self.cues.get(state) {
            Some(Cue::Song(name)) => self.audio.play_song(name),
            Some(Cue::QueuedSong(name)) => self.audio.queue_song(name),
            Some(Cue::RandomSong) => self.audio.play_random_song(),
            Some(Cue::Effect(name)) => self.audio.play(name),
            None => {}
        }
    }

    // === Menu entry points ===

    pub fn play_game(&mut self) -> bool {
        self.set_state(GameState::Play)
    }

    /// Start a fresh run from anywhere, including mid-run or paused
    pub fn restart(&mut self) {
        match self.machine.state() {
            GameState::Play => self.start_run(),
            GameState::PauseMenu => {
                self.set_state(GameState::Play);
                self.start_run();
            }
            _ => {
                self.set_state(GameState::Play);
            }
        }
    }

    /// Options opens from the main menu or the pause menu only
    pub fn open_options(&mut self) -> bool {
        let state = self.machine.state();
        if !matches!(state, GameState::MainMenu | GameState::PauseMenu) {
            log::warn!("Options not reachable from {state}");
            return false;
        }
        self.set_state(GameState::Options)
    }

    /// Leave Options for the menu it was opened from
    pub fn go_back(&mut self) -> bool {
        if self.machine.state() != GameState::Options {
            log::warn!("go_back outside Options (state {})", self.machine.state());
            return false;
        }
        self.set_state(self.options_return)
    }

    pub fn show_ranking(&mut self) -> bool {
        self.set_state(GameState::Ranking)
    }

    pub fn show_credits(&mut self) -> bool {
        self.set_state(GameState::Credits)
    }

    pub fn main_menu(&mut self) -> bool {
        self.set_state(GameState::MainMenu)
    }

    pub fn pause(&mut self) -> bool {
        if self.machine.state() != GameState::Play {
            return false;
        }
        self.set_state(GameState::PauseMenu)
    }

    pub fn resume(&mut self) -> bool {
        if self.machine.state() != GameState::PauseMenu {
            return false;
        }
        self.set_state(GameState::Play)
    }

    pub fn quit(&mut self) {
        log::info!("Quit requested");
        self.quit_requested = true;
    }

    // === Per-frame ===

    /// Advance one fixed step
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        self.handle_input(input);
        if self.machine.state() == GameState::Play {
            self.player.tick(dt);
        }
        self.audio.tick(dt);
    }

    fn handle_input(&mut self, input: &TickInput) {
        if input.start {
            match self.machine.state() {
                GameState::Play => {
                    self.pause();
                    return;
                }
                GameState::PauseMenu => {
                    self.resume();
                    return;
                }
                _ => {}
            }
        }

        if input.back {
            match self.machine.state() {
                GameState::PauseMenu => {
                    self.resume();
                    return;
                }
                GameState::Options => {
                    self.go_back();
                    return;
                }
                GameState::Play => {
                    self.pause();
                    return;
                }
                _ => {}
            }
        }

        if input.tap && self.machine.state() == GameState::Play {
            self.player.jump();
        }
    }

    /// Trigger contact reported by the host physics
    pub fn on_trigger(&mut self, tag: ColliderTag) {
        if self.machine.state() != GameState::Play {
            return;
        }
        match self.player.on_trigger(tag) {
            Some(PlayerEvent::Scored) => self.score.increment(),
            Some(PlayerEvent::Crashed) => {
                self.set_state(GameState::GameOver);
            }
            None => {}
        }
    }

    // === Leaderboard ===

    /// Record the finished run under `name`. Accepted once per run, only on
    /// the game-over screen.
    pub fn submit_score(&mut self, name: &str) -> bool {
        if self.machine.state() != GameState::GameOver || !self.submission_open {
            log::warn!("No finished run to submit for {name}");
            return false;
        }
        self.leaderboard.set_score(name, self.score.score());
        self.submission_open = false;
        true
    }

    pub fn sort_leaderboard_by_score(&mut self) {
        self.leaderboard.sort_by_score();
        self.refresh_ranking();
    }

    pub fn sort_leaderboard_by_name(&mut self) {
        self.leaderboard.sort_by_name();
        self.refresh_ranking();
    }

    fn refresh_ranking(&mut self) {
        if self.ranking.is_shown() {
            self.ranking.refresh(self.leaderboard.entries());
        }
    }

    // === Options ===

    pub fn set_music_volume(&mut self, volume: f32) {
        self.settings.music_volume = volume.clamp(0.0, 1.0);
        self.audio.set_music_volume(self.settings.music_volume);
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.settings.sfx_volume = volume.clamp(0.0, 1.0);
        self.audio.set_effects_volume(self.settings.sfx_volume);
    }

    /// Apply a quality preset by dropdown index
    pub fn set_quality(&mut self, index: usize) -> bool {
        match QualityPreset::from_index(index) {
            Some(preset) => {
                self.settings.quality = preset;
                true
            }
            None => {
                log::error!("No quality level {index}");
                false
            }
        }
    }

    // === Accessors ===

    pub fn state(&self) -> GameState {
        self.machine.state()
    }

    pub fn layout(&self) -> SurfaceLayout {
        self.machine.layout()
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn leaderboard(&self) -> &LeaderboardStore {
        &self.leaderboard
    }

    pub fn audio(&self) -> &AudioRouter {
        &self.audio
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_submission_open(&self) -> bool {
        self.submission_open
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("state", &self.machine.state())
            .field("score", &self.score.score())
            .field("player", &self.player)
            .field("leaderboard", &self.leaderboard)
            .finish_non_exhaustive()
    }
}
