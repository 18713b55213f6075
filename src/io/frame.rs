// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame capture and image export.
//!
//! A captured frame is scaled onto a fixed-size raster surface and kept
//! until the next capture. Export serializes that frame to JPEG or PNG.

use super::media::MediaSource;
use anyhow::{Context, Result};
use image::{imageops, DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("No video decoder available in this build")]
    NoDecoder,

    #[error("Failed to decode frame: {0}")]
    Decode(String),

    #[error("Frame buffer has {actual} bytes, expected {expected}")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("Failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
}

/// A decoded video frame as tightly packed RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CaptureError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(CaptureError::InvalidBuffer {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    /// Resample the frame onto a surface of the given size.
    pub fn scaled(&self, width: u32, height: u32) -> Result<Self, CaptureError> {
        if self.width == width && self.height == height {
            return Ok(self.clone());
        }
        let resized = imageops::resize(&self.to_image()?, width, height, imageops::FilterType::Triangle);
        Ok(Self {
            width,
            height,
            pixels: resized.into_raw(),
        })
    }

    fn to_image(&self) -> Result<RgbaImage, CaptureError> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or(
            CaptureError::InvalidBuffer {
                expected: self.width as usize * self.height as usize * 4,
                actual: self.pixels.len(),
            },
        )
    }
}

/// Image format for frame export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    /// Default download name, `frame.jpeg` or `frame.png`.
    pub fn file_name(&self) -> String {
        format!("frame.{}", self.extension())
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// Encode a frame into the bytes of an image file.
pub fn encode_frame(frame: &RasterFrame, format: ExportFormat) -> Result<Vec<u8>, CaptureError> {
    let image = DynamicImage::ImageRgba8(frame.to_image()?);
    // JPEG has no alpha channel
    let image = match format {
        ExportFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        ExportFormat::Png => image,
    };

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format.image_format())?;
    Ok(bytes)
}

/// Encode a frame and write it to `path`.
pub fn write_frame(frame: &RasterFrame, format: ExportFormat, path: &Path) -> Result<()> {
    let bytes = encode_frame(frame, format)?;
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Saved {}x{} frame to {}", frame.width, frame.height, path.display());
    Ok(())
}

/// Outcome of asking for the captured frame to be exported.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportRequest {
    /// A frame is ready to be written
    Ready(RasterFrame),
    /// The last capture failed; the message should be shown to the user
    Failed(String),
    /// Nothing to do (playing, or nothing captured yet)
    Unavailable,
}

/// The capture surface and the most recent frame drawn onto it.
#[derive(Debug)]
pub struct FrameCapture {
    width: u32,
    height: u32,
    latest: Option<RasterFrame>,
    last_error: Option<String>,
}

impl FrameCapture {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            latest: None,
            last_error: None,
        }
    }

    /// Draw the frame at `position` onto the capture surface.
    ///
    /// Only allowed while paused; otherwise nothing happens. A failed read
    /// clears the surface and is remembered for the next export request.
    pub fn capture_current_frame(
        &mut self,
        source: &mut dyn MediaSource,
        position: f64,
        paused: bool,
    ) -> Option<&RasterFrame> {
        if !paused {
            log::debug!("Frame capture skipped while playing");
            return None;
        }

        match source
            .frame_at(position)
            .and_then(|frame| frame.scaled(self.width, self.height))
        {
            Ok(frame) => {
                self.latest = Some(frame);
                self.last_error = None;
            }
            Err(e) => {
                log::warn!("Failed to capture frame at {:.2}s: {}", position, e);
                self.latest = None;
                self.last_error = Some(e.to_string());
            }
        }
        self.latest.as_ref()
    }

    /// Whether an export request would do anything.
    pub fn has_capture(&self) -> bool {
        self.latest.is_some() || self.last_error.is_some()
    }

    pub fn export_request(&self, paused: bool) -> ExportRequest {
        if !paused {
            return ExportRequest::Unavailable;
        }
        match (&self.latest, &self.last_error) {
            (Some(frame), _) => ExportRequest::Ready(frame.clone()),
            (None, Some(error)) => ExportRequest::Failed(error.clone()),
            (None, None) => ExportRequest::Unavailable,
        }
    }
}
