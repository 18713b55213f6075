// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video timeline scrubber control.
//!
//! This module provides the seek slider and the position readout.

/// Format seconds as `m:ss`, or `h:mm:ss` past one hour.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Display the scrubber. Returns the new position if the user moved it.
pub fn show(ui: &mut egui::Ui, position: f64, duration: Option<f64>) -> Option<f64> {
    let mut seek = None;

    ui.horizontal(|ui| {
        let end = duration.unwrap_or(0.0);
        ui.label(format_time(position));

        if let Some(duration) = duration.filter(|d| *d > 0.0) {
            let mut value = position.min(duration);
            let slider_width = (ui.available_width() - 60.0).max(50.0);
            ui.spacing_mut().slider_width = slider_width;
            let response = ui.add(egui::Slider::new(&mut value, 0.0..=duration).show_value(false));
            if response.changed() {
                seek = Some(value);
            }
        } else {
            ui.label(egui::RichText::new("duration unknown").italics().weak());
        }

        ui.label(format_time(end));
    });

    seek
}
