// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback session state.
//!
//! This module ties the analytics tracker to the playback clock and the
//! transient view state (rate, paused flag, one-shot resume seek) for a
//! single loaded video reference.

use super::analytics::{AnalyticsSnapshot, AnalyticsTracker, PlayerState};
use crate::config::DashboardConfig;
use crate::util::clock::PlaybackClock;
use std::time::Instant;

/// Progress of the one-shot seek to the resume position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialSeek {
    Pending,
    Done,
}

/// Transient UI state of the player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackViewState {
    pub playback_rate: f64,
    pub is_paused: bool,
    pub start_time: f64,
    pub initial_seek: InitialSeek,
}

impl PlaybackViewState {
    pub fn new(start_time: f64) -> Self {
        Self {
            playback_rate: 1.0,
            is_paused: true,
            start_time,
            initial_seek: InitialSeek::Pending,
        }
    }
}

/// Where playback should start for a video of the given duration.
///
/// Videos longer than the resume window start `resume_window` seconds
/// before their end; shorter ones start at `default_start`.
pub fn resume_start_time(duration: f64, resume_window: f64, default_start: f64) -> f64 {
    if duration > resume_window {
        duration - resume_window
    } else {
        default_start
    }
}

/// Result of a pause transition.
#[derive(Debug, Clone)]
pub struct PauseOutcome {
    pub snapshot: AnalyticsSnapshot,
    /// Clock position the frame should be captured at
    pub position: f64,
}

/// Analytics, clock, and view state for one loaded reference.
#[derive(Debug)]
pub struct PlaybackSession {
    tracker: AnalyticsTracker,
    clock: PlaybackClock,
    view: PlaybackViewState,
    resume_window: f64,
    default_start: f64,
}

impl PlaybackSession {
    /// Create a session for a freshly loaded reference.
    pub fn new(config: &DashboardConfig) -> Self {
        let mut session = Self {
            tracker: AnalyticsTracker::new(),
            clock: PlaybackClock::new(),
            view: PlaybackViewState::new(config.start_time_secs),
            resume_window: config.resume_window_secs,
            default_start: config.start_time_secs,
        };
        session.load_reference();
        session
    }

    /// Reset all analytics and view state for a new reference.
    pub fn load_reference(&mut self) -> AnalyticsSnapshot {
        self.clock = PlaybackClock::new();
        self.view = PlaybackViewState::new(self.default_start);
        self.tracker.on_load_reference()
    }

    pub fn play(&mut self, now: Instant) -> AnalyticsSnapshot {
        if self.tracker.state() != PlayerState::Paused {
            return self.tracker.snapshot();
        }
        // Playing ended media starts it over
        if self.clock.at_end(now) {
            log::debug!("Restarting finished media from the beginning");
            self.clock.seek(0.0, now);
        }
        let position = self.clock.position(now);
        self.clock.start(now);
        self.view.is_paused = false;
        self.tracker.on_play(position)
    }

    pub fn pause(&mut self, now: Instant) -> PauseOutcome {
        let position = self.clock.position(now);
        self.clock.stop(now);
        self.view.is_paused = true;
        PauseOutcome {
            snapshot: self.tracker.on_pause(position),
            position,
        }
    }

    pub fn seek(&mut self, position: f64, now: Instant) {
        self.clock.seek(position, now);
        self.tracker.on_seek(self.clock.position(now));
    }

    pub fn set_rate(&mut self, rate: f64, now: Instant) {
        self.clock.set_rate(rate, now);
        self.view.playback_rate = rate;
    }

    /// Record the media duration and perform the resume seek if it is due.
    ///
    /// Returns the position seeked to, if any. The seek happens at most once
    /// per loaded reference.
    pub fn on_duration_known(&mut self, duration: f64, now: Instant) -> Option<f64> {
        self.clock.set_duration(duration, now);
        self.view.start_time = resume_start_time(duration, self.resume_window, self.default_start);

        if self.view.initial_seek == InitialSeek::Pending && self.view.start_time > 0.0 {
            let target = self.view.start_time;
            self.clock.seek(target, now);
            self.view.initial_seek = InitialSeek::Done;
            log::info!("Resuming playback at {:.1}s of {:.1}s", target, duration);
            return Some(target);
        }
        None
    }

    /// Advance bookkeeping for one UI frame.
    ///
    /// Playback that ran into the end of the media is paused, and the
    /// resulting pause outcome is returned.
    pub fn tick(&mut self, now: Instant) -> Option<PauseOutcome> {
        self.tracker.on_progress(self.clock.position(now));
        if self.tracker.state() == PlayerState::Playing && self.clock.at_end(now) {
            log::debug!("Reached end of media");
            return Some(self.pause(now));
        }
        None
    }

    pub fn position(&self, now: Instant) -> f64 {
        self.clock.position(now)
    }

    pub fn duration(&self) -> Option<f64> {
        self.clock.duration()
    }

    pub fn state(&self) -> PlayerState {
        self.tracker.state()
    }

    pub fn view(&self) -> &PlaybackViewState {
        &self.view
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        self.tracker.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analytics::{AnalyticsSummary, WatchSession};
    use std::time::Duration;

    fn secs(t0: Instant, s: u64) -> Instant {
        t0 + Duration::from_secs(s)
    }

    #[test]
    fn test_resume_start_time() {
        assert_eq!(resume_start_time(120.0, 30.0, 0.0), 90.0);
        assert_eq!(resume_start_time(20.0, 30.0, 0.0), 0.0);
        assert_eq!(resume_start_time(30.0, 30.0, 0.0), 0.0);
    }

    #[test]
    fn test_long_video_seeks_once() {
        let t0 = Instant::now();
        let mut session = PlaybackSession::new(&DashboardConfig::default());

        assert_eq!(session.on_duration_known(120.0, t0), Some(90.0));
        assert_eq!(session.view().start_time, 90.0);
        assert_eq!(session.view().initial_seek, InitialSeek::Done);
        assert_eq!(session.position(t0), 90.0);

        session.seek(10.0, t0);
        assert_eq!(session.on_duration_known(120.0, t0), None);
        assert_eq!(session.position(t0), 10.0);
    }

    #[test]
    fn test_short_video_keeps_seek_pending() {
        let t0 = Instant::now();
        let mut session = PlaybackSession::new(&DashboardConfig::default());

        assert_eq!(session.on_duration_known(20.0, t0), None);
        assert_eq!(session.view().start_time, 0.0);
        assert_eq!(session.view().initial_seek, InitialSeek::Pending);
    }

    #[test]
    fn test_play_pause_uses_clock_positions() {
        let t0 = Instant::now();
        let mut session = PlaybackSession::new(&DashboardConfig::default());
        session.seek(5.0, t0);

        session.play(t0);
        assert!(!session.view().is_paused);
        let outcome = session.pause(secs(t0, 7));

        assert_eq!(outcome.position, 12.0);
        assert_eq!(outcome.snapshot.sections_watched, vec![WatchSession { start: 5.0, end: 12.0 }]);
        assert_eq!(outcome.snapshot.total_watch_time, 7.0);
        assert!(session.view().is_paused);
    }

    #[test]
    fn test_playback_at_end_pauses() {
        let t0 = Instant::now();
        let mut session = PlaybackSession::new(&DashboardConfig::default());
        session.on_duration_known(10.0, t0);
        session.play(t0);

        assert!(session.tick(secs(t0, 5)).is_none());
        let outcome = session.tick(secs(t0, 15)).expect("should pause at end");
        assert_eq!(outcome.position, 10.0);
        assert_eq!(session.state(), PlayerState::Paused);
        assert_eq!(outcome.snapshot.pause_count, 1);
    }

    #[test]
    fn test_play_after_end_restarts_from_beginning() {
        let t0 = Instant::now();
        let mut session = PlaybackSession::new(&DashboardConfig::default());
        session.on_duration_known(10.0, t0);
        session.play(t0);
        session.tick(secs(t0, 15)).expect("should pause at end");

        let snapshot = session.play(secs(t0, 15));
        assert_eq!(snapshot.play_count, 2);
        assert_eq!(session.position(secs(t0, 15)), 0.0);
        assert!(session.tick(secs(t0, 15)).is_none());
        assert_eq!(session.state(), PlayerState::Playing);

        let outcome = session.pause(secs(t0, 19));
        assert_eq!(
            outcome.snapshot.sections_watched,
            vec![
                WatchSession { start: 0.0, end: 10.0 },
                WatchSession { start: 0.0, end: 4.0 },
            ]
        );
        assert_eq!(outcome.snapshot.pause_count, 2);
    }

    #[test]
    fn test_load_reference_resets_state() {
        let t0 = Instant::now();
        let mut session = PlaybackSession::new(&DashboardConfig::default());
        session.on_duration_known(300.0, t0);
        session.set_rate(2.0, t0);
        session.play(t0);
        session.pause(secs(t0, 3));

        let snapshot = session.load_reference();

        assert_eq!(*snapshot, AnalyticsSummary::default());
        assert_eq!(*session.view(), PlaybackViewState::new(0.0));
        assert_eq!(session.position(t0), 0.0);
        assert_eq!(session.duration(), None);
    }

    #[test]
    fn test_rate_scales_watch_time() {
        let t0 = Instant::now();
        let mut session = PlaybackSession::new(&DashboardConfig::default());
        session.set_rate(2.0, t0);
        session.play(t0);
        let outcome = session.pause(secs(t0, 4));

        assert_eq!(outcome.snapshot.total_watch_time, 8.0);
        assert_eq!(session.view().playback_rate, 2.0);
    }
}
