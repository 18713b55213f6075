// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the letterboxing math used to fit a video frame
//! inside the available canvas area while keeping its aspect ratio.

/// Largest (width, height) with the frame's aspect ratio that fits the area.
pub fn fit_to_area(frame_width: u32, frame_height: u32, area_width: f32, area_height: f32) -> (f32, f32) {
    if frame_width == 0 || frame_height == 0 || area_height <= 0.0 {
        return (0.0, 0.0);
    }

    let frame_aspect = frame_width as f32 / frame_height as f32;
    let area_aspect = area_width / area_height;

    if frame_aspect > area_aspect {
        // Frame is wider - fit to width
        (area_width, area_width / frame_aspect)
    } else {
        // Frame is taller - fit to height
        (area_height * frame_aspect, area_height)
    }
}

/// Offset that centers a (width, height) box inside the area.
pub fn center_offset(width: f32, height: f32, area_width: f32, area_height: f32) -> (f32, f32) {
    ((area_width - width) / 2.0, (area_height - height) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_wide_frame_letterboxes() {
        let (w, h) = fit_to_area(1920, 1080, 800.0, 800.0);
        assert_eq!(w, 800.0);
        assert_eq!(h, 450.0);

        let (x, y) = center_offset(w, h, 800.0, 800.0);
        assert_eq!(x, 0.0);
        assert_eq!(y, 175.0);
    }

    #[test]
    fn test_fit_tall_frame_pillarboxes() {
        let (w, h) = fit_to_area(1080, 1920, 1280.0, 960.0);
        assert_eq!(h, 960.0);
        assert!((w - 540.0).abs() < 0.001);
    }

    #[test]
    fn test_fit_degenerate_sizes() {
        assert_eq!(fit_to_area(0, 1080, 800.0, 600.0), (0.0, 0.0));
        assert_eq!(fit_to_area(640, 360, 800.0, 0.0), (0.0, 0.0));
    }
}
