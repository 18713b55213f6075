// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the top-level composition: it shows the drop zone
//! until a video reference is loaded and the player afterwards, runs the
//! background workers (intake, decoder open, frame encoding), and owns the
//! blocking notification and the fallback shown after a rendering panic.

use crate::config::DashboardConfig;
use crate::io::{
    frame::{self, ExportFormat, ExportRequest, RasterFrame},
    intake::{self, HandleRegistry, IntakeError, MediaReference},
    media::{self, MediaSource},
    serialization,
};
use crate::player::VideoPlayer;
use crate::ui::{analytics, canvas, timeline, toolbar, upload};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

/// Height of the video surface in points.
const VIDEO_HEIGHT: f32 = 400.0;

/// Pending decoder open for a specific reference.
struct MediaLoad {
    url: String,
    receiver: Receiver<Result<Box<dyn MediaSource>, String>>,
}

/// Main application state.
pub struct DashboardApp {
    config: DashboardConfig,

    /// Registry every local reference handle is acquired from
    registry: HandleRegistry,

    /// Player for the loaded reference, if any
    player: Option<VideoPlayer>,

    /// Receiver for background intake
    intake: Option<Receiver<Result<MediaReference, IntakeError>>>,

    /// Receiver for background decoder open
    media_loader: Option<MediaLoad>,

    /// Receiver for background frame encoding
    frame_saver: Option<Receiver<Result<PathBuf, String>>>,

    /// Texture of the frame on screen
    frame_texture: Option<egui::TextureHandle>,
    frame_size: Option<(u32, u32)>,

    /// Blocking notification shown to the user
    alert: Option<String>,

    /// Set after a rendering panic; the UI stops accepting input
    fatal: Option<String>,
}

impl DashboardApp {
    /// Create a new dashboard with nothing loaded.
    pub fn new(config: DashboardConfig, registry: HandleRegistry) -> Self {
        Self {
            config,
            registry,
            player: None,
            intake: None,
            media_loader: None,
            frame_saver: None,
            frame_texture: None,
            frame_size: None,
            alert: None,
            fatal: None,
        }
    }

    /// Show a blocking notification.
    pub fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("Notifying user: {}", message);
        self.alert = Some(message);
    }

    /// Replace the current player with one for `reference` and open its decoder
    /// in the background.
    pub fn load_reference(&mut self, reference: MediaReference) {
        let url = reference.url();
        let location = reference.location();

        // Dropping the previous player releases its reference handle
        self.player = Some(VideoPlayer::new(reference, &self.config));
        self.frame_texture = None;
        self.frame_size = None;

        let (sender, receiver) = channel();
        self.media_loader = Some(MediaLoad { url, receiver });

        std::thread::spawn(move || {
            let result = media::open(&location).map_err(|e| format!("{:#}", e));
            let _ = sender.send(result);
        });
    }

    /// Close the loaded video and return to the drop zone.
    fn close_video(&mut self) {
        if self.player.take().is_some() {
            log::info!("Closed video");
        }
        self.media_loader = None;
        self.frame_texture = None;
        self.frame_size = None;
    }

    /// Run intake for the offered files on a background thread.
    fn start_intake(&mut self, files: Vec<PathBuf>) {
        if self.intake.is_some() {
            log::warn!("Intake already in progress, ignoring {} file(s)", files.len());
            return;
        }

        let (sender, receiver) = channel();
        self.intake = Some(receiver);

        let registry = self.registry.clone();
        let config = self.config.clone();
        std::thread::spawn(move || {
            let result = intake::compress_video(&registry, files, &config);
            let _ = sender.send(result);
        });
    }

    fn browse_for_video(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Videos", self.config.video_extensions.as_slice())
            .pick_file();
        self.start_intake(picked.into_iter().collect());
    }

    /// Drain finished background work.
    fn poll_workers(&mut self, now: Instant) {
        if let Some(ref receiver) = self.intake {
            if let Ok(result) = receiver.try_recv() {
                self.intake = None;
                match result {
                    Ok(reference) => self.load_reference(reference),
                    Err(e) => {
                        log::error!("Error compressing video: {}", e);
                        self.notify(format!("Failed to compress video. Please try again.\n\n{}", e));
                    }
                }
            }
        }

        if let Some(ref load) = self.media_loader {
            if let Ok(result) = load.receiver.try_recv() {
                let url = load.url.clone();
                self.media_loader = None;
                match (result, self.player.as_mut()) {
                    (Ok(source), Some(player)) if player.reference().url() == url => {
                        player.attach_source(source, now);
                        log::info!("Decoder ready for {}", url);
                    }
                    (Ok(_), _) => log::debug!("Discarding decoder for superseded reference {}", url),
                    (Err(e), _) => {
                        log::error!("Failed to open video {}: {}", url, e);
                        self.notify(format!("Failed to open video.\n\n{}", e));
                    }
                }
            }
        }

        if let Some(ref receiver) = self.frame_saver {
            if let Ok(result) = receiver.try_recv() {
                self.frame_saver = None;
                match result {
                    Ok(path) => log::info!("Frame saved to {}", path.display()),
                    Err(e) => {
                        log::error!("Failed to capture frame: {}", e);
                        self.notify(format!("Failed to capture frame.\n\n{}", e));
                    }
                }
            }
        }
    }

    fn workers_pending(&self) -> bool {
        self.intake.is_some() || self.media_loader.is_some() || self.frame_saver.is_some()
    }

    /// Export the captured frame. A no-op unless paused with a capture.
    fn save_frame(&mut self, format: ExportFormat) {
        let Some(ref player) = self.player else {
            return;
        };

        match player.frame_export() {
            ExportRequest::Ready(frame) => {
                let Some(path) = rfd::FileDialog::new()
                    .add_filter(format.extension(), &[format.extension()])
                    .set_file_name(format.file_name())
                    .save_file()
                else {
                    return;
                };
                self.spawn_frame_save(frame, format, path);
            }
            ExportRequest::Failed(error) => {
                self.notify(format!(
                    "Failed to capture frame. The video could not be read at this position.\n\n{}",
                    error
                ));
            }
            ExportRequest::Unavailable => log::debug!("Frame export not available right now"),
        }
    }

    fn spawn_frame_save(&mut self, frame: RasterFrame, format: ExportFormat, path: PathBuf) {
        let (sender, receiver) = channel();
        self.frame_saver = Some(receiver);

        std::thread::spawn(move || {
            let result = frame::write_frame(&frame, format, &path)
                .map(|_| path)
                .map_err(|e| format!("{:#}", e));
            let _ = sender.send(result);
        });
    }

    fn download_video(&mut self) {
        let Some(ref player) = self.player else {
            return;
        };
        if !player.reference().is_local() {
            self.notify("Video is not a local handle, download not possible.");
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("MP4", &["mp4"])
            .set_file_name(intake::VIDEO_DOWNLOAD_NAME)
            .save_file()
        else {
            return;
        };

        if let Err(e) = intake::save_video(player.reference(), &path) {
            log::error!("Video download failed: {}", e);
            self.notify(e.to_string());
        }
    }

    fn export_analytics(&mut self, extension: &str) {
        let Some(ref player) = self.player else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter(extension.to_uppercase(), &[extension])
            .set_file_name(format!("analytics.{}", extension))
            .save_file()
        else {
            return;
        };

        match serialization::export_summary(player.snapshot(), &path) {
            Ok(_) => log::info!("Exported analytics to {}", path.display()),
            Err(e) => {
                log::error!("Failed to export analytics: {:#}", e);
                self.notify(format!("Failed to export analytics.\n\n{:#}", e));
            }
        }
    }

    fn apply_toolbar(&mut self, action: toolbar::ToolbarAction, now: Instant) {
        use toolbar::ToolbarAction;

        match action {
            ToolbarAction::TogglePlay => {
                if let Some(ref mut player) = self.player {
                    player.toggle_play(now);
                }
            }
            ToolbarAction::SetRate(rate) => {
                if let Some(ref mut player) = self.player {
                    player.set_rate(rate, now);
                    log::info!("Playback rate set to {}x", rate);
                }
            }
            ToolbarAction::SaveFrame(format) => self.save_frame(format),
            ToolbarAction::DownloadVideo => self.download_video(),
            ToolbarAction::None => {}
        }
    }

    /// Render one frame of the whole UI.
    fn render(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.poll_workers(now);

        let blocked = self.alert.is_some();

        // Drag and drop works in both views; a new video replaces the old one
        let (dropped, dropped_files) = ctx.input(|i| {
            let paths: Vec<PathBuf> = i.raw.dropped_files.iter().filter_map(|f| f.path.clone()).collect();
            (!i.raw.dropped_files.is_empty(), paths)
        });
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        if let Some(files) = accept_dropped_files(dropped, blocked, dropped_files) {
            self.start_intake(files);
        }

        self.show_menu_bar(ctx, blocked);

        if let Some(ref player) = self.player {
            egui::SidePanel::right("analytics")
                .default_width(260.0)
                .show(ctx, |ui| {
                    analytics::show(ui, player.snapshot());
                });
        }

        let mut browse = false;
        let mut toolbar_action = toolbar::ToolbarAction::None;
        let mut seek_to = None;
        let mut surface_clicked = false;
        let mut playing = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                ui.vertical_centered(|ui| ui.heading("Video Dashboard"));
                ui.add_space(10.0);

                let Some(ref mut player) = self.player else {
                    let is_compressing = self.intake.is_some();
                    browse = upload::show(ui, is_compressing, hovering) == upload::UploadAction::Browse;
                    return;
                };

                playing = player.tick(now);
                if let Some(frame) = player.display_frame(now) {
                    upload_frame(ctx, &mut self.frame_texture, &mut self.frame_size, &frame);
                }

                let placeholder = if player.has_source() {
                    "No picture available (built without a video decoder)"
                } else {
                    "Loading video..."
                };
                surface_clicked =
                    canvas::show(ui, &self.frame_texture, self.frame_size, placeholder, VIDEO_HEIGHT)
                        .clicked();

                let session = player.session();
                seek_to = timeline::show(ui, session.position(now), session.duration());
                ui.add_space(6.0);

                let state = toolbar::ToolbarState {
                    is_playing: playing,
                    current_rate: session.view().playback_rate,
                    rates: &self.config.playback_rates,
                    can_save_frame: player.can_export_frame(),
                    can_download: player.reference().is_local(),
                    saving: self.frame_saver.is_some(),
                };
                toolbar_action = toolbar::show(ui, &state);

                ui.add_space(6.0);
                ui.label(
                    egui::RichText::new(player.reference().url())
                        .small()
                        .weak(),
                );
            });
        });

        if browse {
            self.browse_for_video();
        }
        if let (Some(position), Some(player)) = (seek_to, self.player.as_mut()) {
            player.seek(position, now);
        }
        if surface_clicked {
            toolbar_action = toolbar::ToolbarAction::TogglePlay;
        }
        self.apply_toolbar(toolbar_action, now);

        self.show_alert(ctx);

        let still_playing = self.player.as_ref().is_some_and(|player| !player.is_paused());
        if still_playing {
            ctx.request_repaint();
        } else if self.workers_pending() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context, blocked: bool) {
        let has_video = self.player.is_some();
        let mut open = false;
        let mut close = false;
        let mut export = None;

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                egui::menu::bar(ui, |ui| {
                    ui.menu_button("File", |ui| {
                        if ui.button("Open Video...").clicked() {
                            open = true;
                            ui.close_menu();
                        }
                        if ui.add_enabled(has_video, egui::Button::new("Close Video")).clicked() {
                            close = true;
                            ui.close_menu();
                        }
                        ui.separator();
                        ui.add_enabled_ui(has_video, |ui| {
                            ui.menu_button("Export Analytics", |ui| {
                                if ui.button("Export as YAML...").clicked() {
                                    export = Some("yaml");
                                    ui.close_menu();
                                }
                                if ui.button("Export as JSON...").clicked() {
                                    export = Some("json");
                                    ui.close_menu();
                                }
                            });
                        });
                        ui.separator();
                        if ui.button("Quit").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                });
            });
        });

        if open {
            self.browse_for_video();
        }
        if close {
            self.close_video();
        }
        if let Some(extension) = export {
            self.export_analytics(extension);
        }
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(ref message) = self.alert else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message.as_str());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if dismissed {
            self.alert = None;
        }
    }
}

/// Upload a decoded frame into the display texture.
fn upload_frame(
    ctx: &egui::Context,
    texture: &mut Option<egui::TextureHandle>,
    size: &mut Option<(u32, u32)>,
    frame: &RasterFrame,
) {
    let image = egui::ColorImage::from_rgba_unmultiplied(
        [frame.width as usize, frame.height as usize],
        &frame.pixels,
    );
    if let Some(handle) = texture.as_mut() {
        handle.set(image, egui::TextureOptions::LINEAR);
    } else {
        *texture = Some(ctx.load_texture("video_frame", image, egui::TextureOptions::LINEAR));
    }
    *size = Some((frame.width, frame.height));
}

/// Files from a drop that should go to intake, if any.
///
/// Drops are ignored while a notice blocks the window.
fn accept_dropped_files(dropped: bool, blocked: bool, files: Vec<PathBuf>) -> Option<Vec<PathBuf>> {
    if !dropped {
        return None;
    }
    if blocked {
        log::debug!("Ignoring {} dropped file(s) while a notice is open", files.len());
        return None;
    }
    Some(files)
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown error".to_string()
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(ref message) = self.fatal {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "Something went wrong and the dashboard has stopped.\n\
                             Please restart the application.\n\n{}",
                            message
                        ))
                        .color(egui::Color32::from_rgb(230, 120, 120)),
                    );
                });
            });
            return;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.render(ctx)));
        if let Err(payload) = result {
            let message = panic_message(payload.as_ref());
            log::error!("Rendering panicked: {}", message);
            self.fatal = Some(message);
            ctx.request_repaint();
        }
    }
}
