// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media decoding.
//!
//! This module opens a video reference, reports its duration, and decodes
//! individual frames for display and capture. Decoding is backed by OpenCV
//! when the `video-opencv` feature is enabled; otherwise media opens without
//! a picture and every frame read reports that no decoder is available.

use super::frame::{CaptureError, RasterFrame};
use anyhow::Result;

/// A source of decoded frames for one video reference.
pub trait MediaSource: Send {
    /// Total duration in seconds, if the container reports one.
    fn duration_secs(&self) -> Option<f64>;

    /// Decode the frame shown at `position_secs`.
    fn frame_at(&mut self, position_secs: f64) -> Result<RasterFrame, CaptureError>;
}

/// Gap beyond which skipping forward frame by frame costs more than a seek.
#[cfg_attr(not(feature = "video-opencv"), allow(dead_code))]
const MAX_SKIP_SECS: f64 = 0.5;

/// How a sequential decoder reaches a requested position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(feature = "video-opencv"), allow(dead_code))]
enum ReadPlan {
    /// Reposition the decoder, then read
    Seek,
    /// Discard this many frames, then read
    Skip(u32),
}

/// Plan a read of the frame at `position`, given the timestamp of the
/// frame the decoder returns next (`cursor`).
///
/// Playback asks for positions slightly ahead of the last read, which is
/// served by decoding forward. Going backwards or jumping far ahead needs
/// a seek.
#[cfg_attr(not(feature = "video-opencv"), allow(dead_code))]
fn plan_read(cursor: Option<f64>, position: f64, frame_secs: f64) -> ReadPlan {
    let Some(cursor) = cursor else {
        return ReadPlan::Seek;
    };
    let ahead = position - cursor;
    if ahead < -frame_secs || ahead > MAX_SKIP_SECS {
        return ReadPlan::Seek;
    }
    ReadPlan::Skip((ahead / frame_secs).floor().max(0.0) as u32)
}

/// Open a media location (file path or URL).
#[cfg(feature = "video-opencv")]
pub fn open(location: &str) -> Result<Box<dyn MediaSource>> {
    let source = opencv_source::OpenCvSource::open(location)?;
    Ok(Box::new(source))
}

/// Open a media location (file path or URL).
#[cfg(not(feature = "video-opencv"))]
pub fn open(location: &str) -> Result<Box<dyn MediaSource>> {
    log::warn!("Built without video-opencv, {} will play without a picture", location);
    Ok(Box::new(Undecoded))
}

/// Stand-in used when no decoder is compiled in.
#[cfg(not(feature = "video-opencv"))]
struct Undecoded;

#[cfg(not(feature = "video-opencv"))]
impl MediaSource for Undecoded {
    fn duration_secs(&self) -> Option<f64> {
        None
    }

    fn frame_at(&mut self, _position_secs: f64) -> Result<RasterFrame, CaptureError> {
        Err(CaptureError::NoDecoder)
    }
}

#[cfg(feature = "video-opencv")]
mod opencv_source {
    use super::{plan_read, MediaSource, ReadPlan};
    use crate::io::frame::{CaptureError, RasterFrame};
    use anyhow::{bail, Context, Result};
    use opencv::{core, imgproc, prelude::*, videoio};

    /// Frame length assumed when the container reports no frame rate.
    const FALLBACK_FRAME_SECS: f64 = 1.0 / 30.0;

    pub struct OpenCvSource {
        capture: videoio::VideoCapture,
        duration: Option<f64>,
        frame_secs: f64,
        /// Timestamp of the frame the next `read` returns
        cursor: Option<f64>,
    }

    impl OpenCvSource {
        pub fn open(location: &str) -> Result<Self> {
            let capture = videoio::VideoCapture::from_file(location, videoio::CAP_ANY)
                .with_context(|| format!("Failed to open {}", location))?;
            if !capture.is_opened()? {
                bail!("Unable to open video {}", location);
            }

            let fps = capture.get(videoio::CAP_PROP_FPS)?;
            let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT)?;
            let duration = (fps > 0.0 && frame_count > 0.0).then(|| frame_count / fps);

            log::info!(
                "Opened {} ({:.2} fps, {} frames, duration {:?})",
                location,
                fps,
                frame_count,
                duration
            );

            let frame_secs = if fps > 0.0 { 1.0 / fps } else { FALLBACK_FRAME_SECS };
            Ok(Self {
                capture,
                duration,
                frame_secs,
                cursor: None,
            })
        }

        fn read_bgr(&mut self, position_secs: f64) -> Result<core::Mat, CaptureError> {
            match plan_read(self.cursor, position_secs, self.frame_secs) {
                ReadPlan::Seek => {
                    self.capture
                        .set(videoio::CAP_PROP_POS_MSEC, position_secs * 1000.0)
                        .map_err(decode_error)?;
                    self.cursor = Some(position_secs);
                }
                ReadPlan::Skip(frames) => {
                    for _ in 0..frames {
                        if !self.capture.grab().map_err(decode_error)? {
                            break;
                        }
                    }
                    self.cursor = self.cursor.map(|c| c + frames as f64 * self.frame_secs);
                }
            }

            let mut bgr = core::Mat::default();
            if !self.capture.read(&mut bgr).map_err(decode_error)? || bgr.empty() {
                self.cursor = None;
                return Err(CaptureError::Decode(format!("no frame at {:.2}s", position_secs)));
            }
            self.cursor = self.cursor.map(|c| c + self.frame_secs);
            Ok(bgr)
        }
    }

    fn decode_error(e: opencv::Error) -> CaptureError {
        CaptureError::Decode(e.to_string())
    }

    impl MediaSource for OpenCvSource {
        fn duration_secs(&self) -> Option<f64> {
            self.duration
        }

        fn frame_at(&mut self, position_secs: f64) -> Result<RasterFrame, CaptureError> {
            let bgr = self.read_bgr(position_secs)?;

            let mut rgba = core::Mat::default();
            imgproc::cvt_color(&bgr, &mut rgba, imgproc::COLOR_BGR2RGBA, 0).map_err(decode_error)?;

            let size = rgba.size().map_err(decode_error)?;
            let pixels = rgba.data_bytes().map_err(decode_error)?.to_vec();
            RasterFrame::new(size.width as u32, size.height as u32, pixels)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 0.04;

    #[test]
    fn test_first_read_seeks() {
        assert_eq!(plan_read(None, 3.0, FRAME), ReadPlan::Seek);
    }

    #[test]
    fn test_playback_reads_forward_without_seeking() {
        // next frame is the one wanted
        assert_eq!(plan_read(Some(2.0), 2.0, FRAME), ReadPlan::Skip(0));
        // slightly behind the cursor still takes the next frame
        assert_eq!(plan_read(Some(2.0), 1.98, FRAME), ReadPlan::Skip(0));
        assert_eq!(plan_read(Some(2.0), 2.05, FRAME), ReadPlan::Skip(1));
        assert_eq!(plan_read(Some(2.0), 2.42, FRAME), ReadPlan::Skip(10));
    }

    #[test]
    fn test_jumps_seek() {
        assert_eq!(plan_read(Some(2.0), 1.0, FRAME), ReadPlan::Seek);
        assert_eq!(plan_read(Some(2.0), 2.6, FRAME), ReadPlan::Seek);
    }

    #[cfg(not(feature = "video-opencv"))]
    #[test]
    fn test_undecoded_source_reports_no_decoder() {
        let mut source = open("clip.mp4").unwrap();
        assert_eq!(source.duration_secs(), None);
        assert!(matches!(source.frame_at(1.0), Err(CaptureError::NoDecoder)));
    }
}
