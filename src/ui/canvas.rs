// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video surface.
//!
//! This module draws the most recently decoded frame, letterboxed into
//! the available area, or a placeholder when there is no picture.

use crate::util::geometry::{center_offset, fit_to_area};

/// Display the video surface. Clicking it toggles playback.
pub fn show(
    ui: &mut egui::Ui,
    frame_texture: &Option<egui::TextureHandle>,
    frame_size: Option<(u32, u32)>,
    placeholder: &str,
    height: f32,
) -> egui::Response {
    let size = egui::vec2(ui.available_width(), height);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, egui::Color32::from_gray(20));

    match (frame_texture, frame_size) {
        (Some(texture), Some((width, height))) => {
            let (display_width, display_height) = fit_to_area(width, height, rect.width(), rect.height());
            let (x_offset, y_offset) =
                center_offset(display_width, display_height, rect.width(), rect.height());
            let image_rect = egui::Rect::from_min_size(
                rect.min + egui::vec2(x_offset, y_offset),
                egui::vec2(display_width, display_height),
            );
            painter.image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        _ => {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                placeholder,
                egui::FontId::proportional(16.0),
                egui::Color32::from_gray(160),
            );
        }
    }

    response
}
