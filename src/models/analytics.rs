// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback analytics state machine.
//!
//! This module tracks watch sessions (intervals of continuous playback)
//! across play/pause/seek events and aggregates them into a summary.
//! Every transition publishes a fresh immutable snapshot; snapshots that
//! were already handed out are never modified.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A contiguous interval of active playback, in playback-clock seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WatchSession {
    pub start: f64,
    pub end: f64,
}

impl WatchSession {
    /// Seconds covered by this session.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Display label with both ends rounded to whole seconds.
    pub fn label(&self) -> String {
        format!("From {}s to {}s", self.start.round(), self.end.round())
    }
}

/// Aggregate analytics for the currently loaded video reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub play_count: u32,
    pub pause_count: u32,
    pub total_watch_time: f64,
    /// Reserved, no transition writes it.
    pub last_played_time: f64,
    pub sections_watched: Vec<WatchSession>,
}

impl AnalyticsSummary {
    /// Total watch time rounded to whole seconds for display.
    pub fn rounded_watch_time(&self) -> f64 {
        self.total_watch_time.round()
    }
}

/// Shared, read-only view of a summary at one point in time.
pub type AnalyticsSnapshot = Arc<AnalyticsSummary>;

/// Player state as seen by the analytics tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// No reference loaded.
    Idle,
    Paused,
    Playing,
}

/// Owns the analytics of one loaded reference.
#[derive(Debug)]
pub struct AnalyticsTracker {
    state: PlayerState,
    /// Clock position at which the in-flight session started
    watch_start: Option<f64>,
    summary: AnalyticsSnapshot,
}

impl Default for AnalyticsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsTracker {
    /// Create a tracker with nothing loaded.
    pub fn new() -> Self {
        Self {
            state: PlayerState::Idle,
            watch_start: None,
            summary: Arc::new(AnalyticsSummary::default()),
        }
    }

    /// Start tracking a freshly loaded reference from a zero summary.
    pub fn on_load_reference(&mut self) -> AnalyticsSnapshot {
        self.state = PlayerState::Paused;
        self.watch_start = None;
        self.summary = Arc::new(AnalyticsSummary::default());
        self.snapshot()
    }

    /// Transition into playing at the given clock position.
    ///
    /// Ignored unless currently paused, so a duplicate play event can
    /// neither restart the in-flight session nor skew the play count.
    pub fn on_play(&mut self, clock: f64) -> AnalyticsSnapshot {
        if self.state != PlayerState::Paused {
            log::debug!("Ignoring play event in state {:?}", self.state);
            return self.snapshot();
        }

        self.watch_start = Some(clock);
        self.state = PlayerState::Playing;
        self.publish(|summary| summary.play_count += 1)
    }

    /// Transition into paused at the given clock position.
    ///
    /// Finalizes the in-flight session if there is one. The pause count is
    /// incremented even when no session was pending.
    pub fn on_pause(&mut self, clock: f64) -> AnalyticsSnapshot {
        if self.state == PlayerState::Idle {
            log::debug!("Ignoring pause event with no reference loaded");
            return self.snapshot();
        }

        let finished = match (self.state, self.watch_start.take()) {
            (PlayerState::Playing, Some(start)) => Some(WatchSession { start, end: clock }),
            _ => None,
        };
        self.state = PlayerState::Paused;

        self.publish(|summary| {
            if let Some(session) = finished {
                summary.total_watch_time += session.duration();
                summary.sections_watched.push(session);
            }
            summary.pause_count += 1;
        })
    }

    /// Seeks are logged only. The in-flight session keeps its start marker.
    pub fn on_seek(&self, position: f64) {
        log::info!("Video seeked to {} seconds", position);
    }

    /// Progress ticks carry no analytics yet.
    pub fn on_progress(&self, _clock: f64) {}

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Start marker of the session currently being watched.
    #[cfg(test)]
    pub fn pending_start(&self) -> Option<f64> {
        self.watch_start
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        Arc::clone(&self.summary)
    }

    /// Build the next summary from a copy of the current one and publish it.
    fn publish(&mut self, update: impl FnOnce(&mut AnalyticsSummary)) -> AnalyticsSnapshot {
        let mut next = (*self.summary).clone();
        update(&mut next);
        self.summary = Arc::new(next);
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> AnalyticsTracker {
        let mut tracker = AnalyticsTracker::new();
        tracker.on_load_reference();
        tracker
    }

    fn section_sum(summary: &AnalyticsSummary) -> f64 {
        summary.sections_watched.iter().map(WatchSession::duration).sum()
    }

    #[test]
    fn test_play_then_pause_records_session() {
        let mut tracker = loaded();
        tracker.on_play(5.0);
        let summary = tracker.on_pause(12.0);

        assert_eq!(summary.sections_watched, vec![WatchSession { start: 5.0, end: 12.0 }]);
        assert_eq!(summary.total_watch_time, 7.0);
        assert_eq!(summary.play_count, 1);
        assert_eq!(summary.pause_count, 1);
        assert_eq!(tracker.state(), PlayerState::Paused);
        assert_eq!(tracker.pending_start(), None);
    }

    #[test]
    fn test_second_pause_only_counts() {
        let mut tracker = loaded();
        tracker.on_play(5.0);
        tracker.on_pause(12.0);
        let summary = tracker.on_pause(20.0);

        assert_eq!(summary.sections_watched.len(), 1);
        assert_eq!(summary.total_watch_time, 7.0);
        assert_eq!(summary.pause_count, 2);
        assert_eq!(summary.play_count, 1);
    }

    #[test]
    fn test_play_from_zero_is_tracked() {
        let mut tracker = loaded();
        tracker.on_play(0.0);
        assert_eq!(tracker.pending_start(), Some(0.0));
        let summary = tracker.on_pause(3.5);
        assert_eq!(summary.total_watch_time, 3.5);
    }

    #[test]
    fn test_duplicate_play_keeps_original_marker() {
        let mut tracker = loaded();
        tracker.on_play(2.0);
        let summary = tracker.on_play(8.0);

        assert_eq!(summary.play_count, 1);
        assert_eq!(tracker.pending_start(), Some(2.0));
    }

    #[test]
    fn test_alternation_keeps_counts_within_one() {
        let mut tracker = loaded();
        let mut clock = 0.0;
        for step in 0..25 {
            clock += 1.5;
            let summary = if step % 2 == 0 {
                tracker.on_play(clock)
            } else {
                tracker.on_pause(clock)
            };
            assert!(
                summary.play_count == summary.pause_count
                    || summary.play_count == summary.pause_count + 1
            );
            assert!((summary.total_watch_time - section_sum(&summary)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_published_snapshots_are_never_mutated() {
        let mut tracker = loaded();
        tracker.on_play(1.0);
        let first = tracker.on_pause(4.0);
        let before = (*first).clone();

        tracker.on_play(10.0);
        let second = tracker.on_pause(15.0);

        assert_eq!(*first, before);
        assert_eq!(second.sections_watched[0], first.sections_watched[0]);
        assert_eq!(second.sections_watched.len(), 2);
    }

    #[test]
    fn test_reload_resets_everything() {
        let mut tracker = loaded();
        tracker.on_play(1.0);
        tracker.on_pause(9.0);
        tracker.on_play(9.0);

        let summary = tracker.on_load_reference();

        assert_eq!(*summary, AnalyticsSummary::default());
        assert_eq!(tracker.state(), PlayerState::Paused);
        assert_eq!(tracker.pending_start(), None);
    }

    #[test]
    fn test_events_before_load_are_ignored() {
        let mut tracker = AnalyticsTracker::new();
        tracker.on_play(1.0);
        let summary = tracker.on_pause(2.0);

        assert_eq!(tracker.state(), PlayerState::Idle);
        assert_eq!(*summary, AnalyticsSummary::default());
    }

    #[test]
    fn test_seek_does_not_move_marker() {
        let mut tracker = loaded();
        tracker.on_play(10.0);
        tracker.on_seek(50.0);
        let summary = tracker.on_pause(55.0);

        assert_eq!(summary.sections_watched[0], WatchSession { start: 10.0, end: 55.0 });
    }

    #[test]
    fn test_section_label_rounds() {
        let session = WatchSession { start: 4.6, end: 12.4 };
        assert_eq!(session.label(), "From 5s to 12s");
    }
}
