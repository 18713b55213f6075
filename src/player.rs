// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video player component.
//!
//! Owns everything tied to one loaded reference: the reference handle
//! itself, the playback session and its analytics, the decoder, and the
//! frame capture surface. Replacing the player drops all of it, which also
//! releases the reference handle.

use crate::config::DashboardConfig;
use crate::io::frame::{CaptureError, ExportRequest, FrameCapture, RasterFrame};
use crate::io::intake::MediaReference;
use crate::io::media::MediaSource;
use crate::models::analytics::{AnalyticsSnapshot, PlayerState};
use crate::models::playback::PlaybackSession;
use std::time::Instant;

/// Minimum clock movement before a new display frame is decoded.
const DISPLAY_FRAME_INTERVAL: f64 = 1.0 / 30.0;

/// Frames are read at least this far before the end of the media, where
/// decoders have nothing left to return.
const END_READ_MARGIN: f64 = 0.1;

pub struct VideoPlayer {
    reference: MediaReference,
    session: PlaybackSession,
    source: Option<Box<dyn MediaSource>>,
    capture: FrameCapture,
    /// Clock position of the frame currently on screen
    displayed_at: Option<f64>,
    /// Set when no decoder is compiled in, so display decoding stops
    display_failed: bool,
    snapshot: AnalyticsSnapshot,
}

impl VideoPlayer {
    pub fn new(reference: MediaReference, config: &DashboardConfig) -> Self {
        let session = PlaybackSession::new(config);
        let snapshot = session.snapshot();
        log::info!("Loaded video reference {}", reference.url());
        Self {
            reference,
            session,
            source: None,
            capture: FrameCapture::new(config.capture_width, config.capture_height),
            displayed_at: None,
            display_failed: false,
            snapshot,
        }
    }

    /// Attach the opened decoder and report its duration to the session.
    pub fn attach_source(&mut self, source: Box<dyn MediaSource>, now: Instant) {
        if let Some(duration) = source.duration_secs() {
            self.session.on_duration_known(duration, now);
        }
        self.source = Some(source);
        self.displayed_at = None;
        self.display_failed = false;
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn toggle_play(&mut self, now: Instant) {
        match self.session.state() {
            PlayerState::Playing => self.pause(now),
            PlayerState::Paused => self.play(now),
            PlayerState::Idle => {}
        }
    }

    pub fn play(&mut self, now: Instant) {
        self.snapshot = self.session.play(now);
    }

    /// Pause playback and capture the frame at the pause position.
    pub fn pause(&mut self, now: Instant) {
        let outcome = self.session.pause(now);
        self.snapshot = outcome.snapshot;
        self.capture_at(outcome.position);
    }

    pub fn seek(&mut self, position: f64, now: Instant) {
        self.session.seek(position, now);
    }

    pub fn set_rate(&mut self, rate: f64, now: Instant) {
        self.session.set_rate(rate, now);
    }

    /// Per-frame update. Returns true while playback is running.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(outcome) = self.session.tick(now) {
            self.snapshot = outcome.snapshot;
            self.capture_at(outcome.position);
        }
        self.session.state() == PlayerState::Playing
    }

    /// Decode the frame for the current position if it changed enough.
    pub fn display_frame(&mut self, now: Instant) -> Option<RasterFrame> {
        if self.display_failed {
            return None;
        }
        let source = self.source.as_mut()?;
        let position = self.session.position(now);
        if self
            .displayed_at
            .is_some_and(|shown| (shown - position).abs() < DISPLAY_FRAME_INTERVAL)
        {
            return None;
        }

        let read_at = readable_position(position, self.session.duration());
        self.displayed_at = Some(position);
        match source.frame_at(read_at) {
            Ok(frame) => Some(frame),
            Err(CaptureError::NoDecoder) => {
                log::warn!("Stopping display decoding: {}", CaptureError::NoDecoder);
                self.display_failed = true;
                None
            }
            Err(e) => {
                log::debug!("No display frame at {:.2}s: {}", read_at, e);
                None
            }
        }
    }

    /// What a frame export request should do right now.
    pub fn frame_export(&self) -> ExportRequest {
        self.capture.export_request(self.is_paused())
    }

    /// Whether the save-frame controls should be enabled.
    pub fn can_export_frame(&self) -> bool {
        self.is_paused() && self.capture.has_capture()
    }

    fn capture_at(&mut self, position: f64) {
        let position = readable_position(position, self.session.duration());
        let paused = self.is_paused();
        match self.source.as_mut() {
            Some(source) => {
                self.capture.capture_current_frame(source.as_mut(), position, paused);
            }
            None => log::debug!("No decoder attached yet, skipping frame capture"),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.session.view().is_paused
    }

    pub fn reference(&self) -> &MediaReference {
        &self.reference
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Latest published analytics snapshot.
    pub fn snapshot(&self) -> &AnalyticsSnapshot {
        &self.snapshot
    }
}

/// Clamp a clock position to one the decoder can still return a frame for.
fn readable_position(position: f64, duration: Option<f64>) -> f64 {
    match duration {
        Some(duration) => position.min((duration - END_READ_MARGIN).max(0.0)),
        None => position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::intake::HandleRegistry;
    use std::sync::Arc;
    use std::time::Duration;

    struct FakeSource {
        duration: f64,
    }

    impl MediaSource for FakeSource {
        fn duration_secs(&self) -> Option<f64> {
            Some(self.duration)
        }

        fn frame_at(&mut self, _position_secs: f64) -> Result<RasterFrame, CaptureError> {
            RasterFrame::new(64, 36, vec![128; 64 * 36 * 4])
        }
    }

    /// Decodes nothing at or past `tail_from`.
    struct TailFailSource {
        duration: f64,
        tail_from: f64,
    }

    impl MediaSource for TailFailSource {
        fn duration_secs(&self) -> Option<f64> {
            Some(self.duration)
        }

        fn frame_at(&mut self, position_secs: f64) -> Result<RasterFrame, CaptureError> {
            if position_secs >= self.tail_from {
                return Err(CaptureError::Decode(format!("no frame at {:.2}s", position_secs)));
            }
            RasterFrame::new(64, 36, vec![128; 64 * 36 * 4])
        }
    }

    fn remote_player() -> VideoPlayer {
        VideoPlayer::new(
            MediaReference::Remote("https://example.com/v.mp4".to_string()),
            &DashboardConfig::default(),
        )
    }

    #[test]
    fn test_snapshot_changes_only_on_transitions() {
        let t0 = Instant::now();
        let mut player = remote_player();
        let initial = Arc::clone(player.snapshot());

        player.tick(t0);
        assert!(Arc::ptr_eq(&initial, player.snapshot()));

        player.play(t0);
        assert!(!Arc::ptr_eq(&initial, player.snapshot()));
        assert_eq!(player.snapshot().play_count, 1);
    }

    #[test]
    fn test_pause_captures_frame() {
        let t0 = Instant::now();
        let mut player = remote_player();
        player.attach_source(Box::new(FakeSource { duration: 20.0 }), t0);

        assert!(!player.can_export_frame());
        player.play(t0);
        player.pause(t0 + Duration::from_secs(3));

        assert!(player.can_export_frame());
        match player.frame_export() {
            ExportRequest::Ready(frame) => assert_eq!((frame.width, frame.height), (640, 360)),
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_export_while_playing_is_noop() {
        let t0 = Instant::now();
        let mut player = remote_player();
        player.attach_source(Box::new(FakeSource { duration: 20.0 }), t0);
        player.play(t0);
        player.pause(t0 + Duration::from_secs(1));
        player.play(t0 + Duration::from_secs(1));

        assert!(!player.can_export_frame());
        assert_eq!(player.frame_export(), ExportRequest::Unavailable);
    }

    #[test]
    fn test_long_source_resumes_near_end() {
        let t0 = Instant::now();
        let mut player = remote_player();
        player.attach_source(Box::new(FakeSource { duration: 120.0 }), t0);

        assert_eq!(player.session().position(t0), 90.0);
        player.toggle_play(t0);
        player.toggle_play(t0 + Duration::from_secs(10));
        assert_eq!(player.snapshot().sections_watched[0].start, 90.0);
        assert_eq!(player.snapshot().sections_watched[0].end, 100.0);
    }

    #[test]
    fn test_display_frame_throttles_decoding() {
        let t0 = Instant::now();
        let mut player = remote_player();
        player.attach_source(Box::new(FakeSource { duration: 20.0 }), t0);

        assert!(player.display_frame(t0).is_some());
        assert!(player.display_frame(t0).is_none());
        player.seek(5.0, t0);
        assert!(player.display_frame(t0).is_some());
    }

    #[test]
    fn test_end_of_media_reads_last_frame() {
        let t0 = Instant::now();
        let mut player = remote_player();
        player.attach_source(
            Box::new(TailFailSource {
                duration: 10.0,
                tail_from: 10.0,
            }),
            t0,
        );
        player.play(t0);

        assert!(!player.tick(t0 + Duration::from_secs(15)));
        assert!(matches!(player.frame_export(), ExportRequest::Ready(_)));
        assert!(player.display_frame(t0 + Duration::from_secs(15)).is_some());
    }

    #[test]
    fn test_display_recovers_after_decode_error() {
        let t0 = Instant::now();
        let mut player = remote_player();
        player.attach_source(
            Box::new(TailFailSource {
                duration: 10.0,
                tail_from: 8.0,
            }),
            t0,
        );
        player.play(t0);
        player.tick(t0 + Duration::from_secs(15));

        assert!(player.display_frame(t0 + Duration::from_secs(15)).is_none());
        player.seek(2.0, t0 + Duration::from_secs(15));
        assert!(player.display_frame(t0 + Duration::from_secs(15)).is_some());
    }

    #[test]
    fn test_dropping_player_releases_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"not really a video").unwrap();
        let registry = HandleRegistry::new();
        let config = DashboardConfig::default();

        let reference = MediaReference::from_arg(path.to_str().unwrap(), &registry, &config).unwrap();
        let player = VideoPlayer::new(reference, &config);
        assert_eq!(registry.live_count(), 1);

        drop(player);
        assert_eq!(registry.live_count(), 0);
    }
}
