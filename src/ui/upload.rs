// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video drop zone.

/// Result of drop zone interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadAction {
    None,
    Browse,
}

/// Display the drop zone. Clicking it asks for the file picker.
pub fn show(ui: &mut egui::Ui, is_compressing: bool, is_hovering: bool) -> UploadAction {
    let size = egui::vec2(ui.available_width(), 220.0_f32.min(ui.available_height()));
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());

    let border = if is_hovering {
        egui::Color32::from_rgb(0, 140, 255)
    } else {
        egui::Color32::from_gray(110)
    };
    let painter = ui.painter_at(rect);
    painter.rect(
        rect.shrink(2.0),
        8.0,
        egui::Color32::from_gray(35),
        egui::Stroke::new(2.0, border),
    );
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "Drag & drop a video file here, or click to select one",
        egui::FontId::proportional(16.0),
        egui::Color32::from_gray(210),
    );
    if is_compressing {
        painter.text(
            rect.center() + egui::vec2(0.0, 28.0),
            egui::Align2::CENTER_CENTER,
            "Compressing video, please wait...",
            egui::FontId::proportional(14.0),
            egui::Color32::from_rgb(230, 180, 60),
        );
    }

    if response.clicked() && !is_compressing {
        UploadAction::Browse
    } else {
        UploadAction::None
    }
}
