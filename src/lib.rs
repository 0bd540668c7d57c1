//! Floppy Disk - a tap-to-flap arcade game core
//!
//! Core modules:
//! - `state`: Game state machine and the state → screen layout table
//! - `score`: Run score counter
//! - `leaderboard`: Persisted local leaderboard
//! - `audio`: Sound registry and music routing
//! - `player`: Player controller over a host physics body
//! - `game`: Orchestrator wiring the above together
//! - `platform`: Storage backends and headless collaborators

pub mod audio;
pub mod game;
pub mod leaderboard;
pub mod platform;
pub mod player;
pub mod score;
pub mod settings;
pub mod state;
pub mod ui;

pub use game::{Game, GameParts, StateCues, TickInput};
pub use leaderboard::{LeaderboardStore, ScoreEntry};
pub use settings::{QualityPreset, Settings};
pub use state::{GameState, Surface};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Upward impulse applied on tap
    pub const JUMP_FORCE: f32 = 10.0;
    /// Pitch right after a jump (degrees)
    pub const TILT_UP_DEGREES: f32 = 130.0;
    /// Level attitude (degrees)
    pub const TILT_DOWN_DEGREES: f32 = 0.0;
    /// Vertical speed below which the pitch starts re-levelling
    pub const DESCENT_TILT_THRESHOLD: f32 = -3.0;
    /// Re-levelling rate (fraction per second)
    pub const TILT_SMOOTHING: f32 = 5.0;

    /// Music group level while the pause menu is up
    pub const PAUSED_MUSIC_SCALE: f32 = 0.3;

    /// Storage key for the leaderboard document
    pub const SCORES_KEY: &str = "scores";
    /// Storage key for settings
    pub const SETTINGS_KEY: &str = "settings";
}
