//! Per-object sound mixer
//!
//! Holds the volume of the sounds an object emits and fades it over time.
//! Cues are queued by name; an audio backend drains them each frame. With
//! no backend attached the queue keeps only the most recent cues.

use std::collections::VecDeque;

/// Cues kept before the oldest are dropped
pub const MAX_QUEUED_CUES: usize = 32;

/// Volume and cue queue for one GameObject
#[derive(Debug, Clone, PartialEq)]
pub struct SoundMixer {
    volume: f32,
    muted: bool,
    fade: Option<Fade>,
    queued: VecDeque<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    target: f32,
    rate: f32,
}

impl Default for SoundMixer {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
            fade: None,
            queued: VecDeque::new(),
        }
    }
}

impl SoundMixer {
    /// Full volume, nothing queued
    pub fn new() -> Self {
        Self::default()
    }

    /// Volume in `[0, 1]`, ignoring mute
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Volume actually applied
    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Set the volume immediately, cancelling any fade
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.fade = None;
    }

    /// Mute or unmute
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Whether the mixer is muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Reach `target` volume over `seconds`
    pub fn fade_to(&mut self, target: f32, seconds: f32) {
        let target = target.clamp(0.0, 1.0);
        if seconds <= 0.0 {
            self.set_volume(target);
            return;
        }
        self.fade = Some(Fade {
            target,
            rate: (target - self.volume).abs() / seconds,
        });
    }

    /// Whether a fade is in progress
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Queue a sound cue, dropping the oldest once [`MAX_QUEUED_CUES`] wait
    pub fn play(&mut self, cue: &str) {
        if self.queued.len() == MAX_QUEUED_CUES {
            if let Some(dropped) = self.queued.pop_front() {
                log::debug!("Sound cue '{dropped}' dropped, nothing drained the mixer");
            }
        }
        self.queued.push_back(cue.to_string());
    }

    /// Number of cues waiting to be drained
    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }

    /// Take every cue queued since the last call
    pub fn drain_cues(&mut self) -> Vec<String> {
        self.queued.drain(..).collect()
    }

    /// Advance fades by `delta_time` seconds
    pub fn update(&mut self, delta_time: f32) {
        let Some(fade) = self.fade else {
            return;
        };
        let step = fade.rate * delta_time;
        let remaining = fade.target - self.volume;

        if remaining.abs() <= step {
            self.volume = fade.target;
            self.fade = None;
        } else {
            self.volume += step.copysign(remaining);
        }
    }

    /// Copy for a duplicated GameObject; queued cues stay with the original
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            queued: VecDeque::new(),
            ..self.clone()
        }
    }
}
