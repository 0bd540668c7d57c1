//! Display collaborators
//!
//! Widget layout and focus handling belong to the host. The core only pushes
//! text, rows and visibility flags through these sinks.

use crate::state::Surface;

/// Receives a single line of text (score HUD, game-over label)
pub trait ScoreDisplay {
    fn set_text(&mut self, text: &str);
}

/// Renders leaderboard rows in the order they are pushed
pub trait ScoreListView {
    /// Remove every rendered row
    fn clear(&mut self);
    /// Append one row
    fn push_row(&mut self, name: &str, score: u32);
}

/// Top-level screen visibility
pub trait SurfaceView {
    fn set_surface_visible(&mut self, surface: Surface, visible: bool);
    fn set_score_display_visible(&mut self, visible: bool);
}
