// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback controls.
//!
//! This module provides the control rows under the video: play/pause,
//! playback rate selection, frame export, and video download.

use super::button::{Button, Size, Variant};
use crate::io::frame::ExportFormat;

/// Result of toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarAction {
    None,
    TogglePlay,
    SetRate(f64),
    SaveFrame(ExportFormat),
    DownloadVideo,
}

/// Inputs the toolbar renders from.
pub struct ToolbarState<'a> {
    pub is_playing: bool,
    pub current_rate: f64,
    pub rates: &'a [f64],
    pub can_save_frame: bool,
    pub can_download: bool,
    pub saving: bool,
}

/// Button caption for a playback rate.
pub fn rate_label(rate: f64) -> String {
    if rate == 1.0 {
        format!("{}x (Normal)", rate)
    } else {
        format!("{}x", rate)
    }
}

/// Display the toolbar and report the clicked control.
pub fn show(ui: &mut egui::Ui, state: &ToolbarState) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let play_text = if state.is_playing { "⏸ Pause" } else { "▶ Play" };
        if ui.add(Button::new(play_text).size(Size::Small)).clicked() {
            action = ToolbarAction::TogglePlay;
        }

        ui.separator();

        for &rate in state.rates {
            let variant = if rate == state.current_rate {
                Variant::Primary
            } else {
                Variant::Outline
            };
            let button = Button::new(rate_label(rate)).variant(variant).size(Size::Small);
            if ui.add(button).clicked() {
                action = ToolbarAction::SetRate(rate);
            }
        }
    });

    ui.add_space(4.0);

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        for (format, text) in [
            (ExportFormat::Jpeg, "Save Frame as JPEG"),
            (ExportFormat::Png, "Save Frame as PNG"),
        ] {
            let button = Button::new(text)
                .variant(Variant::Secondary)
                .size(Size::Small)
                .loading(state.saving)
                .disabled(!state.can_save_frame);
            if ui.add(button).clicked() {
                action = ToolbarAction::SaveFrame(format);
            }
        }

        if state.can_download {
            ui.separator();
            if ui.add(Button::new("Download Video")).clicked() {
                action = ToolbarAction::DownloadVideo;
            }
        }
    });

    action
}
