//! Sound cues
//!
//! The simulation only emits [`GameEvent`]s. This module maps them to short
//! procedural tones (a frequency sweep with a decaying envelope) and hands
//! those to whatever backend the host provides. No synthesis happens here.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Rising chirp
    Jump,
    /// Low scrape
    Slide,
    /// Bright blip for an energy drink
    Collect,
    /// Long falling buzz
    Death,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
}

/// One tone: exponential sweep from `start_hz` to `end_hz` over `duration`
/// seconds, with the gain decaying from `volume`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneSpec {
    pub start_hz: f32,
    pub end_hz: f32,
    pub waveform: Waveform,
    pub duration: f32,
    pub volume: f32,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped => Some(SoundEffect::Jump),
            GameEvent::SlideStarted => Some(SoundEffect::Slide),
            GameEvent::Collected { .. } => Some(SoundEffect::Collect),
            GameEvent::RunEnded { .. } => Some(SoundEffect::Death),
            GameEvent::RunStarted | GameEvent::LevelUp { .. } => None,
        }
    }

    pub fn tone(&self) -> ToneSpec {
        let (start_hz, end_hz, waveform, duration, volume) = match self {
            SoundEffect::Jump => (150.0, 600.0, Waveform::Sine, 0.2, 0.2),
            SoundEffect::Slide => (100.0, 50.0, Waveform::Triangle, 0.2, 0.2),
            SoundEffect::Collect => (1200.0, 1800.0, Waveform::Sine, 0.1, 0.1),
            SoundEffect::Death => (300.0, 10.0, Waveform::Sawtooth, 0.5, 0.4),
        };
        ToneSpec {
            start_hz,
            end_hz,
            waveform,
            duration,
            volume,
        }
    }
}

/// Something that can actually make a noise
pub trait ToneBackend {
    /// Play `tone` scaled by `gain` (already includes master volume)
    fn play_tone(&mut self, tone: &ToneSpec, gain: f32);
}

/// Backend that writes cues to the log, for headless runs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBackend;

impl ToneBackend for LogBackend {
    fn play_tone(&mut self, tone: &ToneSpec, gain: f32) {
        log::debug!(
            "♪ {:?} {:.0}→{:.0} Hz for {:.2}s at {:.2}",
            tone.waveform,
            tone.start_hz,
            tone.end_hz,
            tone.duration,
            gain
        );
    }
}

/// Audio manager for the game
pub struct AudioManager<B: ToneBackend> {
    backend: B,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<B: ToneBackend> AudioManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            master_volume: 0.3,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let tone = effect.tone();
        self.backend.play_tone(&tone, tone.volume * vol);
    }

    /// Play the cue for each event that has one
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
