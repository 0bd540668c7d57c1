//! Headless collaborators
//!
//! Stand-ins for the engine's physics body, audio device and widgets. Used by
//! the native binary (no renderer) and by tests. Display sinks are cheap
//! clonable handles over shared state so a caller can keep one clone and read
//! back what the core pushed into the other.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use glam::Vec2;

use crate::audio::{AudioSource, Clip};
use crate::player::PhysicsBody;
use crate::state::Surface;
use crate::ui::{ScoreDisplay, ScoreListView, SurfaceView};

/// Point mass under constant gravity
#[derive(Debug, Clone)]
pub struct KinematicBody {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Acceleration applied every step while simulated
    pub gravity: Vec2,
    pub mass: f32,
    simulated: bool,
}

impl KinematicBody {
    pub fn new(position: Vec2, gravity: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            gravity,
            mass: 1.0,
            simulated: false,
        }
    }
}

impl PhysicsBody for KinematicBody {
    fn apply_impulse(&mut self, impulse: Vec2) {
        if self.simulated {
            self.velocity += impulse / self.mass;
        }
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn set_simulated(&mut self, simulated: bool) {
        self.simulated = simulated;
    }

    fn is_simulated(&self) -> bool {
        self.simulated
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn step(&mut self, dt: f32) {
        if !self.simulated {
            return;
        }
        self.velocity += self.gravity * dt;
        self.position += self.velocity * dt;
    }
}

/// Audio source that tracks playback position without producing sound
#[derive(Debug, Clone)]
pub struct HeadlessSource {
    clip: Option<Clip>,
    playing: bool,
    time: f32,
    volume: f32,
    pitch: f32,
    looping: bool,
}

impl Default for HeadlessSource {
    fn default() -> Self {
        Self {
            clip: None,
            playing: false,
            time: 0.0,
            volume: 1.0,
            pitch: 1.0,
            looping: false,
        }
    }
}

impl HeadlessSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSource for HeadlessSource {
    fn set_clip(&mut self, clip: Clip) {
        self.clip = Some(clip);
        self.time = 0.0;
    }

    fn clip(&self) -> Option<&Clip> {
        self.clip.as_ref()
    }

    fn play(&mut self) {
        if self.clip.is_none() {
            log::warn!("HeadlessSource: play() with no clip assigned");
            return;
        }
        self.playing = true;
        self.time = 0.0;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.time = 0.0;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn time(&self) -> f32 {
        self.time
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(0.0, 3.0);
    }

    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn update(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        let Some(length) = self.clip.as_ref().map(|c| c.length) else {
            return;
        };
        self.time += dt * self.pitch;
        // Zero-length clips are treated as unbounded
        if length > 0.0 && self.time >= length {
            if self.looping {
                self.time %= length;
            } else {
                self.playing = false;
                self.time = 0.0;
            }
        }
    }
}

#[derive(Debug, Default)]
struct LabelState {
    text: String,
    updates: usize,
}

/// Text widget that remembers the last value it was given
#[derive(Debug, Clone, Default)]
pub struct TextLabel {
    inner: Rc<RefCell<LabelState>>,
}

impl TextLabel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.inner.borrow().text.clone()
    }

    /// Number of `set_text` calls received
    pub fn updates(&self) -> usize {
        self.inner.borrow().updates
    }
}

impl ScoreDisplay for TextLabel {
    fn set_text(&mut self, text: &str) {
        let mut state = self.inner.borrow_mut();
        state.text = text.to_string();
        state.updates += 1;
    }
}

#[derive(Debug, Default)]
struct ListState {
    rows: Vec<(String, u32)>,
    clears: usize,
}

/// List widget that records its rows
#[derive(Debug, Clone, Default)]
pub struct ListRecorder {
    inner: Rc<RefCell<ListState>>,
}

impl ListRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<(String, u32)> {
        self.inner.borrow().rows.clone()
    }

    /// Row names in display order
    pub fn names(&self) -> Vec<String> {
        self.inner.borrow().rows.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn clears(&self) -> usize {
        self.inner.borrow().clears
    }
}

impl ScoreListView for ListRecorder {
    fn clear(&mut self) {
        let mut state = self.inner.borrow_mut();
        state.rows.clear();
        state.clears += 1;
    }

    fn push_row(&mut self, name: &str, score: u32) {
        self.inner.borrow_mut().rows.push((name.to_string(), score));
    }
}

#[derive(Debug)]
struct ScreenState {
    visible: HashSet<Surface>,
    score_display: bool,
}

/// Records which surfaces are currently shown
#[derive(Debug, Clone)]
pub struct ScreenRecorder {
    inner: Rc<RefCell<ScreenState>>,
}

impl Default for ScreenRecorder {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ScreenState {
                visible: HashSet::new(),
                score_display: true,
            })),
        }
    }
}

impl ScreenRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self) -> Vec<Surface> {
        let state = self.inner.borrow();
        Surface::ALL
            .into_iter()
            .filter(|s| state.visible.contains(s))
            .collect()
    }

    pub fn score_display_visible(&self) -> bool {
        self.inner.borrow().score_display
    }
}

impl SurfaceView for ScreenRecorder {
    fn set_surface_visible(&mut self, surface: Surface, visible: bool) {
        let mut state = self.inner.borrow_mut();
        if visible {
            state.visible.insert(surface);
        } else {
            state.visible.remove(&surface);
        }
    }

    fn set_score_display_visible(&mut self, visible: bool) {
        self.inner.borrow_mut().score_display = visible;
    }
}
