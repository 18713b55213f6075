// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Analytics summary panel.
//!
//! This module renders the play/pause counters, total watch time, and the
//! list of watched sections for the current snapshot.

use crate::models::analytics::AnalyticsSummary;

/// Text lines shown for a summary, in display order.
pub fn summary_lines(summary: &AnalyticsSummary) -> Vec<String> {
    vec![
        format!("Play Count: {}", summary.play_count),
        format!("Pause Count: {}", summary.pause_count),
        format!("Total Watch Time: {} seconds", summary.rounded_watch_time()),
    ]
}

/// Display the analytics panel.
pub fn show(ui: &mut egui::Ui, summary: &AnalyticsSummary) {
    ui.heading("Video Analytics");
    ui.add_space(6.0);

    for line in summary_lines(summary) {
        ui.label(line);
    }

    ui.add_space(6.0);
    ui.label("Sections Watched:");

    egui::ScrollArea::vertical()
        .auto_shrink([false, true])
        .show(ui, |ui| {
            if summary.sections_watched.is_empty() {
                ui.label(egui::RichText::new("none yet").italics().weak());
            }
            for section in &summary.sections_watched {
                ui.label(format!("• {}", section.label()));
            }
        });
}
