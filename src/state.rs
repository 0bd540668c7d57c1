//! Game state machine
//!
//! Single source of truth for which screen is active. Every state maps to one
//! entry of `SURFACE_TABLE`; the orchestrator applies the layout and any
//! per-state side effects after a successful transition.

use serde::{Deserialize, Serialize};

/// Current mode of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameState {
    /// A run is in progress
    Play,
    /// Title / main menu
    #[default]
    MainMenu,
    /// Options menu (entered from MainMenu or PauseMenu)
    Options,
    /// In-run pause menu
    PauseMenu,
    /// Run ended, name entry available
    GameOver,
    /// Leaderboard screen
    Ranking,
    /// Credits roll
    Credits,
}

impl GameState {
    pub const ALL: [GameState; 7] = [
        GameState::Play,
        GameState::MainMenu,
        GameState::Options,
        GameState::PauseMenu,
        GameState::GameOver,
        GameState::Ranking,
        GameState::Credits,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Play => "Play",
            GameState::MainMenu => "MainMenu",
            GameState::Options => "Options",
            GameState::PauseMenu => "PauseMenu",
            GameState::GameOver => "GameOver",
            GameState::Ranking => "Ranking",
            GameState::Credits => "Credits",
        }
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutually exclusive top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    MainMenu,
    OptionsMenu,
    PauseMenu,
    GameOver,
    Ranking,
    Credits,
}

impl Surface {
    pub const ALL: [Surface; 6] = [
        Surface::MainMenu,
        Surface::OptionsMenu,
        Surface::PauseMenu,
        Surface::GameOver,
        Surface::Ranking,
        Surface::Credits,
    ];
}

/// What is on screen for a given state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceLayout {
    /// The one visible screen (`None` = gameplay HUD only)
    pub surface: Option<Surface>,
    /// Whether the score HUD is shown
    pub score_display: bool,
}

impl SurfaceLayout {
    const fn new(surface: Option<Surface>, score_display: bool) -> Self {
        Self {
            surface,
            score_display,
        }
    }

    /// Is `surface` visible under this layout
    pub fn shows(&self, surface: Surface) -> bool {
        self.surface == Some(surface)
    }
}

/// State → layout mapping, one row per state
pub const SURFACE_TABLE: [(GameState, SurfaceLayout); 7] = [
    (GameState::Play, SurfaceLayout::new(None, true)),
    (GameState::MainMenu, SurfaceLayout::new(Some(Surface::MainMenu), true)),
    (GameState::Options, SurfaceLayout::new(Some(Surface::OptionsMenu), true)),
    (GameState::PauseMenu, SurfaceLayout::new(Some(Surface::PauseMenu), true)),
    (GameState::GameOver, SurfaceLayout::new(Some(Surface::GameOver), false)),
    (GameState::Ranking, SurfaceLayout::new(Some(Surface::Ranking), true)),
    (GameState::Credits, SurfaceLayout::new(Some(Surface::Credits), false)),
];

/// Look up the layout for a state
pub fn layout_for(state: GameState) -> SurfaceLayout {
    SURFACE_TABLE
        .iter()
        .find(|(s, _)| *s == state)
        .map(|(_, layout)| *layout)
        // Every variant has a row (checked in tests)
        .unwrap_or(SurfaceLayout::new(None, true))
}

/// A completed state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: GameState,
    pub to: GameState,
}

/// Holds the current state; only `set_state` mutates it
#[derive(Debug, Clone)]
pub struct GameStateMachine {
    current: GameState,
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self::new(GameState::MainMenu)
    }
}

impl GameStateMachine {
    pub fn new(initial: GameState) -> Self {
        Self { current: initial }
    }

    /// Switch to `next`. Returns the transition, or `None` (with a warning)
    /// if the machine is already in that state.
    pub fn set_state(&mut self, next: GameState) -> Option<Transition> {
        if self.current == next {
            log::warn!("State already in {next}");
            return None;
        }
        let transition = Transition {
            from: self.current,
            to: next,
        };
        self.current = next;
        log::debug!("State {} -> {}", transition.from, transition.to);
        Some(transition)
    }

    pub fn state(&self) -> GameState {
        self.current
    }

    /// Layout for the current state
    pub fn layout(&self) -> SurfaceLayout {
        layout_for(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_table_covers_every_state_once() {
        for state in GameState::ALL {
            let rows = SURFACE_TABLE.iter().filter(|(s, _)| *s == state).count();
            assert_eq!(rows, 1, "{state} must have exactly one row");
        }
    }

    #[test]
    fn test_layout_matches_design() {
        assert_eq!(layout_for(GameState::Play).surface, None);
        assert!(layout_for(GameState::MainMenu).shows(Surface::MainMenu));
        assert!(layout_for(GameState::Options).shows(Surface::OptionsMenu));
        assert!(layout_for(GameState::Ranking).shows(Surface::Ranking));

        let game_over = layout_for(GameState::GameOver);
        assert!(game_over.shows(Surface::GameOver));
        assert!(!game_over.score_display);

        let credits = layout_for(GameState::Credits);
        assert!(credits.shows(Surface::Credits));
        assert!(!credits.score_display);
    }

    #[test]
    fn test_redundant_transition_is_noop() {
        let mut machine = GameStateMachine::default();
        assert_eq!(machine.state(), GameState::MainMenu);
        assert_eq!(machine.set_state(GameState::MainMenu), None);
        assert_eq!(machine.state(), GameState::MainMenu);

        let t = machine.set_state(GameState::Play).unwrap();
        assert_eq!(t.from, GameState::MainMenu);
        assert_eq!(t.to, GameState::Play);
        assert_eq!(machine.state(), GameState::Play);
    }

    fn any_state() -> impl Strategy<Value = GameState> {
        (0..GameState::ALL.len()).prop_map(|i| GameState::ALL[i])
    }

    proptest! {
        #[test]
        fn prop_one_surface_after_every_transition(seq in prop::collection::vec(any_state(), 0..40)) {
            let mut machine = GameStateMachine::default();
            for next in seq {
                let before = machine.state();
                let result = machine.set_state(next);
                prop_assert_eq!(result.is_none(), before == next);
                prop_assert_eq!(machine.state(), next);

                let layout = machine.layout();
                let visible = Surface::ALL.iter().filter(|s| layout.shows(**s)).count();
                let expected = if next == GameState::Play { 0 } else { 1 };
                prop_assert_eq!(visible, expected);
                prop_assert_eq!(layout, layout_for(next));
            }
        }
    }
}
