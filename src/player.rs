//! Player controller
//!
//! Two-state driver over an engine physics body: idle (not simulated) or
//! playing (falls under gravity, jumps on tap). Collisions are reported
//! upward as `PlayerEvent`s; the orchestrator routes them.

use glam::Vec2;

use crate::consts::*;

/// Rigid body owned by the host physics engine
pub trait PhysicsBody {
    fn apply_impulse(&mut self, impulse: Vec2);
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);
    fn set_simulated(&mut self, simulated: bool);
    fn is_simulated(&self) -> bool;
    fn set_position(&mut self, position: Vec2);
    fn position(&self) -> Vec2;
    /// Advance one step; hosts that integrate physics themselves leave this empty
    fn step(&mut self, _dt: f32) {}
}

/// Tag carried by a trigger collider the player touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderTag {
    /// Gap between obstacles, passing it scores
    Score,
    /// Pipe, ground or ceiling
    Obstacle,
    /// Anything else (ignored)
    Other,
}

impl ColliderTag {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Score" => ColliderTag::Score,
            "Obstacle" => ColliderTag::Obstacle,
            _ => ColliderTag::Other,
        }
    }
}

/// Gameplay events raised by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Scored,
    Crashed,
}

/// Player runtime state over a physics body
pub struct PlayerState {
    body: Box<dyn PhysicsBody>,
    start_position: Vec2,
    playing: bool,
    jump_force: f32,
    /// Cosmetic pitch, degrees (0 = level)
    rotation: f32,
}

impl PlayerState {
    pub fn new(body: Box<dyn PhysicsBody>, start_position: Vec2) -> Self {
        let mut player = Self {
            body,
            start_position,
            playing: false,
            jump_force: JUMP_FORCE,
            rotation: TILT_DOWN_DEGREES,
        };
        player.reset();
        player
    }

    pub fn set_jump_force(&mut self, force: f32) {
        self.jump_force = force;
    }

    /// Enable or disable the body's simulation
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
        self.body.set_simulated(playing);
    }

    /// Back to the start position, idle
    pub fn reset(&mut self) {
        self.body.set_position(self.start_position);
        self.body.set_velocity(Vec2::ZERO);
        self.playing = false;
        self.body.set_simulated(false);
        self.rotation = TILT_DOWN_DEGREES;
    }

    /// Tap/click while playing: cancel vertical velocity then jump
    pub fn jump(&mut self) {
        if !self.playing {
            return;
        }
        let velocity = self.body.velocity();
        self.body.set_velocity(Vec2::new(velocity.x, 0.0));
        self.body.apply_impulse(Vec2::Y * self.jump_force);
        self.rotation = TILT_UP_DEGREES;
    }

    /// Per-frame update: step the body and re-level the pitch while descending
    pub fn tick(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        self.body.step(dt);
        if self.body.velocity().y <= DESCENT_TILT_THRESHOLD {
            let t = (TILT_SMOOTHING * dt).min(1.0);
            self.rotation += (TILT_DOWN_DEGREES - self.rotation) * t;
        }
    }

    /// Trigger contact. Obstacles stop the simulation immediately.
    pub fn on_trigger(&mut self, tag: ColliderTag) -> Option<PlayerEvent> {
        match tag {
            ColliderTag::Score => Some(PlayerEvent::Scored),
            ColliderTag::Obstacle => {
                self.body.set_simulated(false);
                Some(PlayerEvent::Crashed)
            }
            ColliderTag::Other => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn start_position(&self) -> Vec2 {
        self.start_position
    }

    pub fn body(&self) -> &dyn PhysicsBody {
        self.body.as_ref()
    }
}

impl std::fmt::Debug for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerState")
            .field("playing", &self.playing)
            .field("position", &self.body.position())
            .field("rotation", &self.rotation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::KinematicBody;

    fn player() -> PlayerState {
        let body = KinematicBody::new(Vec2::new(3.0, 9.0), Vec2::new(0.0, -20.0));
        PlayerState::new(Box::new(body), Vec2::ZERO)
    }

    #[test]
    fn test_new_player_is_idle_at_start() {
        let player = player();
        assert!(!player.is_playing());
        assert!(!player.body().is_simulated());
        assert_eq!(player.body().position(), Vec2::ZERO);
    }

    #[test]
    fn test_jump_ignored_when_idle() {
        let mut player = player();
        player.jump();
        assert_eq!(player.body().velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_jump_cancels_fall() {
        let mut player = player();
        player.set_playing(true);
        for _ in 0..60 {
            player.tick(SIM_DT);
        }
        assert!(player.body().velocity().y < 0.0);

        player.jump();
        assert!((player.body().velocity().y - JUMP_FORCE).abs() < 1e-4);
        assert_eq!(player.rotation(), TILT_UP_DEGREES);
    }

    #[test]
    fn test_pitch_relevels_while_descending() {
        let mut player = player();
        player.set_playing(true);
        player.jump();
        for _ in 0..240 {
            player.tick(SIM_DT);
        }
        assert!(player.rotation() < TILT_UP_DEGREES);
    }

    #[test]
    fn test_obstacle_stops_simulation() {
        let mut player = player();
        player.set_playing(true);
        assert_eq!(player.on_trigger(ColliderTag::Score), Some(PlayerEvent::Scored));
        assert!(player.body().is_simulated());

        assert_eq!(player.on_trigger(ColliderTag::Obstacle), Some(PlayerEvent::Crashed));
        assert!(!player.body().is_simulated());
        assert_eq!(player.on_trigger(ColliderTag::from_name("Cloud")), None);
    }

    #[test]
    fn test_reset_returns_to_start() {
        let mut player = player();
        player.set_playing(true);
        player.jump();
        player.tick(0.5);
        player.reset();
        assert!(!player.is_playing());
        assert!(!player.body().is_simulated());
        assert_eq!(player.body().position(), Vec2::ZERO);
    }
}
