//! Audio routing
//!
//! Maps symbolic sound names to playback sources. At most one music track
//! plays at a time. Song changes play a transition effect first, then swap the
//! track in, or queue the change until the current track has played out.
//! Only the most recent swap request survives.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::PAUSED_MUSIC_SCALE;

/// Sound categories (each routed to its own mixer group)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    SoundEffect,
    Music,
}

/// An audio asset reference
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub name: String,
    /// Duration in seconds
    pub length: f32,
}

impl Clip {
    pub fn new(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}

/// Playback device for one sound (engine-owned)
pub trait AudioSource {
    fn set_clip(&mut self, clip: Clip);
    fn clip(&self) -> Option<&Clip>;
    fn play(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    /// Playback position within the current clip, seconds
    fn time(&self) -> f32;
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn set_pitch(&mut self, pitch: f32);
    fn set_loop(&mut self, looping: bool);
    /// Advance playback; hosts that run their own mixer leave this empty
    fn update(&mut self, _dt: f32) {}
}

/// Registration parameters for a sound
#[derive(Debug, Clone)]
pub struct Sound {
    pub name: String,
    pub clip: Clip,
    pub kind: SoundKind,
    /// 0.0 - 1.0
    pub volume: f32,
    /// 0.0 - 3.0
    pub pitch: f32,
    pub looping: bool,
}

impl Sound {
    pub fn effect(name: impl Into<String>, clip: Clip) -> Self {
        Self {
            name: name.into(),
            clip,
            kind: SoundKind::SoundEffect,
            volume: 1.0,
            pitch: 1.0,
            looping: false,
        }
    }

    pub fn music(name: impl Into<String>, clip: Clip) -> Self {
        Self {
            kind: SoundKind::Music,
            ..Self::effect(name, clip)
        }
    }
}

/// A registered sound and the source that plays it
struct Channel {
    sound: Sound,
    source: Box<dyn AudioSource>,
}

/// Clip swap scheduled by a song change
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSwap {
    /// Index of the target channel
    channel: usize,
    /// Seconds until the swap fires
    pub remaining: f32,
    pub looping: bool,
}

/// Sound registry and playback policy
pub struct AudioRouter {
    channels: Vec<Channel>,
    /// Channel indices of Music sounds, in registration order
    songs: Vec<usize>,
    current_music: Option<usize>,
    /// Effect played before every song change
    transition_effect: Option<String>,
    pending: Option<PendingSwap>,
    music_volume: f32,
    sfx_volume: f32,
    /// Music group ducked while the game is paused
    paused: bool,
    rng: Pcg32,
}

impl AudioRouter {
    pub fn new(seed: u64) -> Self {
        Self {
            channels: Vec::new(),
            songs: Vec::new(),
            current_music: None,
            transition_effect: None,
            pending: None,
            music_volume: 1.0,
            sfx_volume: 1.0,
            paused: false,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Name of the effect played before each song change
    pub fn set_transition_effect(&mut self, name: impl Into<String>) {
        self.transition_effect = Some(name.into());
    }

    /// Register a sound with its own source. Re-registering a name replaces it.
    pub fn register(&mut self, sound: Sound, mut source: Box<dyn AudioSource>) {
        source.set_clip(sound.clip.clone());
        source.set_loop(sound.looping);
        source.set_pitch(sound.pitch);
        source.set_volume(sound.volume * self.group_volume(sound.kind));

        match self.find(&sound.name) {
            Some(index) => {
                log::warn!("Sound: {} registered twice, replacing", sound.name);
                self.channels[index].source.stop();
                self.channels[index] = Channel { sound, source };
                if self.channels[index].sound.kind == SoundKind::Music {
                    if !self.songs.contains(&index) {
                        self.songs.push(index);
                    }
                } else {
                    self.songs.retain(|&i| i != index);
                }
            }
            None => {
                if sound.kind == SoundKind::Music {
                    self.songs.push(self.channels.len());
                }
                self.channels.push(Channel { sound, source });
            }
        }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.sound.name == name)
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        let found = self.find(name);
        if found.is_none() {
            log::warn!("Sound: {name} not found");
        }
        found
    }

    /// Play a sound. Music stops whatever track was playing first.
    pub fn play(&mut self, name: &str) {
        let Some(index) = self.lookup(name) else {
            return;
        };
        if self.channels[index].sound.kind == SoundKind::Music {
            self.pending = None;
            self.stop_current_music();
            self.current_music = Some(index);
        }
        self.channels[index].source.play();
    }

    /// Transition effect, then a uniformly random track (no looping, no wait)
    pub fn play_random_song(&mut self) {
        if self.songs.is_empty() {
            log::warn!("No songs registered");
            return;
        }
        let pick = self.rng.random_range(0..self.songs.len());
        let index = self.songs[pick];
        self.change_song(index, false, false);
    }

    /// Transition effect, then the named track looped
    pub fn play_song(&mut self, name: &str) {
        if let Some(index) = self.song_index(name) {
            self.change_song(index, true, false);
        }
    }

    /// Like `play_song`, but the change waits until the current track has
    /// played out its clip
    pub fn queue_song(&mut self, name: &str) {
        if let Some(index) = self.song_index(name) {
            self.change_song(index, true, true);
        }
    }

    fn song_index(&self, name: &str) -> Option<usize> {
        let index = self.lookup(name)?;
        if self.channels[index].sound.kind != SoundKind::Music {
            log::warn!("Sound: {name} is not a song");
            return None;
        }
        Some(index)
    }

    fn change_song(&mut self, index: usize, looping: bool, wait: bool) {
        let remaining = if wait { self.current_remaining() } else { 0.0 };

        // Supersedes any swap still waiting
        self.pending = Some(PendingSwap {
            channel: index,
            remaining,
            looping,
        });
        if remaining <= 0.0 {
            self.fire_pending();
        }
    }

    /// Seconds left in the current track's clip, zero when nothing plays
    fn current_remaining(&self) -> f32 {
        let Some(current) = self.current_music else {
            return 0.0;
        };
        let source = &self.channels[current].source;
        if !source.is_playing() {
            return 0.0;
        }
        source
            .clip()
            .map(|clip| (clip.length - source.time()).max(0.0))
            .unwrap_or(0.0)
    }

    fn fire_pending(&mut self) {
        let Some(swap) = self.pending.take() else {
            return;
        };
        self.stop_current_music();
        if let Some(effect) = self.transition_effect.clone() {
            self.play(&effect);
        }
        self.current_music = Some(swap.channel);

        let channel = &mut self.channels[swap.channel];
        channel.source.set_clip(channel.sound.clip.clone());
        channel.source.set_loop(swap.looping);
        if !channel.source.is_playing() {
            channel.source.play();
        }
        log::debug!("Now playing {}", channel.sound.name);
    }

    fn stop_current_music(&mut self) {
        if let Some(current) = self.current_music {
            let source = &mut self.channels[current].source;
            if source.is_playing() {
                source.stop();
            }
        }
    }

    /// Advance sources and any scheduled swap
    pub fn tick(&mut self, dt: f32) {
        for channel in &mut self.channels {
            channel.source.update(dt);
        }
        let due = match &mut self.pending {
            Some(swap) => {
                swap.remaining -= dt;
                swap.remaining <= 0.0
            }
            None => false,
        };
        if due {
            self.fire_pending();
        }
    }

    pub fn stop(&mut self, name: &str) {
        if let Some(index) = self.lookup(name) {
            self.channels[index].source.stop();
        }
    }

    /// Stop every registered sound (sources owned elsewhere are untouched)
    pub fn stop_all(&mut self) {
        self.pending = None;
        self.stop_where(|_| true);
    }

    pub fn stop_music(&mut self) {
        self.pending = None;
        self.stop_where(|kind| kind == SoundKind::Music);
    }

    pub fn stop_effects(&mut self) {
        self.stop_where(|kind| kind == SoundKind::SoundEffect);
    }

    fn stop_where(&mut self, matches: impl Fn(SoundKind) -> bool) {
        for channel in &mut self.channels {
            if matches(channel.sound.kind) && channel.source.is_playing() {
                channel.source.stop();
            }
        }
    }

    /// Whether the named sound is playing (false, with a warning, if unknown)
    pub fn is_clip_playing(&self, name: &str) -> bool {
        self.lookup(name)
            .map(|index| self.channels[index].source.is_playing())
            .unwrap_or(false)
    }

    pub fn is_any_playing(&self) -> bool {
        self.channels.iter().any(|c| c.source.is_playing())
    }

    /// Name of the track currently selected as music
    pub fn current_music(&self) -> Option<&str> {
        self.current_music
            .map(|index| self.channels[index].sound.name.as_str())
    }

    pub fn pending_swap(&self) -> Option<&PendingSwap> {
        self.pending.as_ref()
    }

    pub fn source(&self, name: &str) -> Option<&dyn AudioSource> {
        self.find(name).map(|index| self.channels[index].source.as_ref())
    }

    /// Music group volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = volume.clamp(0.0, 1.0);
        self.apply_volumes();
    }

    /// Sound effects group volume (0.0 - 1.0)
    pub fn set_effects_volume(&mut self, volume: f32) {
        self.sfx_volume = volume.clamp(0.0, 1.0);
        self.apply_volumes();
    }

    /// Duck the music group while paused, restore it on resume
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            log::debug!("Audio {}", if paused { "paused" } else { "unpaused" });
            self.paused = paused;
            self.apply_volumes();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn group_volume(&self, kind: SoundKind) -> f32 {
        match kind {
            SoundKind::Music if self.paused => self.music_volume * PAUSED_MUSIC_SCALE,
            SoundKind::Music => self.music_volume,
            SoundKind::SoundEffect => self.sfx_volume,
        }
    }

    fn apply_volumes(&mut self) {
        let music = self.group_volume(SoundKind::Music);
        let sfx = self.group_volume(SoundKind::SoundEffect);
        for channel in &mut self.channels {
            let group = match channel.sound.kind {
                SoundKind::Music => music,
                SoundKind::SoundEffect => sfx,
            };
            channel.source.set_volume(channel.sound.volume * group);
        }
    }
}

impl std::fmt::Debug for AudioRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioRouter")
            .field("sounds", &self.channels.len())
            .field("current_music", &self.current_music())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::HeadlessSource;

    fn router() -> AudioRouter {
        let mut router = AudioRouter::new(7);
        router.set_transition_effect("scratch");
        router.register(
            Sound::effect("scratch", Clip::new("scratch.wav", 0.5)),
            Box::new(HeadlessSource::new()),
        );
        router.register(
            Sound::effect("jump", Clip::new("jump.wav", 0.2)),
            Box::new(HeadlessSource::new()),
        );
        router.register(
            Sound::music("menu", Clip::new("menu.ogg", 30.0)),
            Box::new(HeadlessSource::new()),
        );
        router.register(
            Sound::music("level", Clip::new("level.ogg", 60.0)),
            Box::new(HeadlessSource::new()),
        );
        router
    }

    fn playing(router: &AudioRouter, name: &str) -> bool {
        router.source(name).is_some_and(|s| s.is_playing())
    }

    #[test]
    fn test_one_track_at_a_time() {
        let mut router = router();
        router.play("menu");
        assert!(playing(&router, "menu"));

        router.play("level");
        assert!(playing(&router, "level"));
        assert!(!playing(&router, "menu"));
        assert_eq!(router.current_music(), Some("level"));
    }

    #[test]
    fn test_effects_do_not_stop_music() {
        let mut router = router();
        router.play("menu");
        router.play("jump");
        assert!(playing(&router, "menu"));
        assert!(playing(&router, "jump"));
    }

    #[test]
    fn test_unknown_sound_is_noop() {
        let mut router = router();
        router.play("nope");
        router.stop("nope");
        assert!(!router.is_clip_playing("nope"));
        assert!(!router.is_any_playing());
    }

    #[test]
    fn test_random_song_plays_transition_then_track() {
        let mut router = router();
        router.play("menu");
        router.play_random_song();

        assert!(playing(&router, "scratch"));
        let current = router.current_music().unwrap().to_string();
        assert!(current == "menu" || current == "level");
        assert!(playing(&router, &current));
        assert!(router.pending_swap().is_none());
    }

    #[test]
    fn test_play_song_switches_immediately() {
        let mut router = router();
        router.play("level");
        router.play_song("menu");

        assert!(router.pending_swap().is_none());
        assert!(playing(&router, "scratch"));
        assert!(playing(&router, "menu"));
        assert!(!playing(&router, "level"));

        // Looped, so it outlives its clip
        router.tick(45.0);
        assert!(playing(&router, "menu"));
    }

    #[test]
    fn test_queue_song_waits_for_current_track() {
        let mut router = router();
        router.play("menu");
        router.tick(10.0);
        router.queue_song("level");

        let swap = router.pending_swap().unwrap();
        assert!((swap.remaining - 20.0).abs() < 1e-3);
        assert!(playing(&router, "menu"));
        assert!(!playing(&router, "level"));

        router.tick(19.0);
        assert!(!playing(&router, "level"));
        router.tick(1.5);
        assert!(playing(&router, "level"));
        assert!(playing(&router, "scratch"));
        assert_eq!(router.current_music(), Some("level"));
        assert!(router.pending_swap().is_none());
    }

    #[test]
    fn test_queue_song_with_nothing_playing_is_immediate() {
        let mut router = router();
        router.queue_song("level");
        assert!(router.pending_swap().is_none());
        assert!(playing(&router, "level"));
    }

    #[test]
    fn test_play_song_rejects_effects() {
        let mut router = router();
        router.play_song("jump");
        assert_eq!(router.current_music(), None);
        assert!(!router.is_any_playing());
    }

    #[test]
    fn test_newer_request_supersedes_pending_swap() {
        let mut router = router();
        router.play("menu");
        router.queue_song("level");
        assert!(router.pending_swap().is_some());

        router.play("menu");
        assert!(router.pending_swap().is_none());

        router.tick(25.0);
        assert!(!playing(&router, "level"));
        assert_eq!(router.current_music(), Some("menu"));
    }

    #[test]
    fn test_stop_scopes() {
        let mut router = router();
        router.play("menu");
        router.play("jump");

        router.stop_effects();
        assert!(playing(&router, "menu"));
        assert!(!playing(&router, "jump"));

        router.play("jump");
        router.stop_music();
        assert!(!playing(&router, "menu"));
        assert!(playing(&router, "jump"));

        router.stop_all();
        assert!(!router.is_any_playing());
    }

    #[test]
    fn test_group_volume_scales_sources() {
        let mut router = router();
        router.set_music_volume(0.5);
        router.set_effects_volume(2.0);
        assert!((router.source("menu").unwrap().volume() - 0.5).abs() < 1e-6);
        assert!((router.source("jump").unwrap().volume() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_pause_ducks_music_only() {
        let mut router = router();
        router.set_music_volume(0.5);
        router.set_paused(true);
        assert!(router.is_paused());
        let ducked = 0.5 * PAUSED_MUSIC_SCALE;
        assert!((router.source("menu").unwrap().volume() - ducked).abs() < 1e-6);
        assert!((router.source("jump").unwrap().volume() - 1.0).abs() < 1e-6);

        // Volume changes while paused stay ducked
        router.set_music_volume(1.0);
        assert!((router.source("level").unwrap().volume() - PAUSED_MUSIC_SCALE).abs() < 1e-6);

        router.set_paused(false);
        assert!((router.source("menu").unwrap().volume() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_random_song_without_songs() {
        let mut router = AudioRouter::new(1);
        router.play_random_song();
        assert_eq!(router.current_music(), None);
    }
}
