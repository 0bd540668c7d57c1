//! Run score counter

use crate::ui::ScoreDisplay;

/// Score for the current run. Every mutation pushes the new value to the
/// display sink before returning.
pub struct ScoreTracker {
    score: u32,
    display: Box<dyn ScoreDisplay>,
}

impl ScoreTracker {
    pub fn new(display: Box<dyn ScoreDisplay>) -> Self {
        let mut tracker = Self { score: 0, display };
        tracker.refresh();
        tracker
    }

    /// One obstacle cleared
    pub fn increment(&mut self) {
        self.add(1);
    }

    /// Add an arbitrary amount (saturates at `u32::MAX`)
    pub fn add(&mut self, amount: u32) {
        self.score = self.score.saturating_add(amount);
        self.refresh();
    }

    /// Take points away. Refused if the score would drop below zero.
    pub fn subtract(&mut self, amount: u32) -> bool {
        match self.score.checked_sub(amount) {
            Some(score) => {
                self.score = score;
                self.refresh();
                true
            }
            None => {
                log::error!("Score can't go below 0 (score {}, subtract {amount})", self.score);
                false
            }
        }
    }

    /// Back to zero for a new run
    pub fn reset(&mut self) {
        self.score = 0;
        self.refresh();
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    fn refresh(&mut self) {
        self.display.set_text(&self.score.to_string());
    }
}

impl std::fmt::Debug for ScoreTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreTracker")
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}
