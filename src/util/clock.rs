// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback clock.
//!
//! Tracks the media position in seconds. While running, the position
//! advances with wall time scaled by the playback rate and is clamped to
//! the media duration once that is known. All methods take the current
//! instant explicitly.

use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    /// Position at the moment the clock was last anchored
    base: f64,
    /// Wall time the clock started running from, `None` while stopped
    anchor: Option<Instant>,
    rate: f64,
    duration: Option<f64>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self {
            base: 0.0,
            anchor: None,
            rate: 1.0,
            duration: None,
        }
    }

    /// Current position in seconds.
    pub fn position(&self, now: Instant) -> f64 {
        let elapsed = self
            .anchor
            .map(|anchor| now.saturating_duration_since(anchor).as_secs_f64() * self.rate)
            .unwrap_or(0.0);
        self.clamp(self.base + elapsed)
    }

    pub fn start(&mut self, now: Instant) {
        if self.anchor.is_none() {
            self.anchor = Some(now);
        }
    }

    pub fn stop(&mut self, now: Instant) {
        self.base = self.position(now);
        self.anchor = None;
    }

    pub fn seek(&mut self, position: f64, now: Instant) {
        self.base = self.clamp(position);
        if self.anchor.is_some() {
            self.anchor = Some(now);
        }
    }

    pub fn set_rate(&mut self, rate: f64, now: Instant) {
        self.rebase(now);
        self.rate = rate;
    }

    pub fn set_duration(&mut self, duration: f64, now: Instant) {
        self.rebase(now);
        self.duration = Some(duration);
        self.base = self.clamp(self.base);
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Whether the position has reached the known duration.
    pub fn at_end(&self, now: Instant) -> bool {
        self.duration
            .is_some_and(|duration| self.position(now) >= duration)
    }

    fn rebase(&mut self, now: Instant) {
        if self.anchor.is_some() {
            self.base = self.position(now);
            self.anchor = Some(now);
        }
    }

    fn clamp(&self, position: f64) -> f64 {
        let position = position.max(0.0);
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }
}
