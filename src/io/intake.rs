// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video file intake.
//!
//! Turns a dropped or picked file into a reference handle the player can
//! resolve. Despite the "compression" wording used in the UI, the file is
//! never transcoded: the handle stands in for the file's bytes unchanged.

use crate::config::DashboardConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Default file name offered when saving the loaded video.
pub const VIDEO_DOWNLOAD_NAME: &str = "compressed_video.mp4";

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("No file selected")]
    NoFile,

    #[error("Not a video file: {0}")]
    NotVideo(PathBuf),

    #[error("File is empty: {0}")]
    EmptyFile(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Video is not a local handle, download not possible.")]
    NotLocal,

    #[error("Failed to save video to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Tracks which reference handles are currently alive.
#[derive(Debug, Clone, Default)]
pub struct HandleRegistry {
    live: Arc<Mutex<HashMap<Uuid, PathBuf>>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a handle for a file on disk.
    pub fn create_object_handle(&self, path: &Path) -> Result<ObjectHandle, IntakeError> {
        let metadata = std::fs::metadata(path).map_err(|source| IntakeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if metadata.len() == 0 {
            return Err(IntakeError::EmptyFile(path.to_path_buf()));
        }

        let id = Uuid::new_v4();
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, path.to_path_buf());

        Ok(ObjectHandle {
            id,
            path: path.to_path_buf(),
            len: metadata.len(),
            registry: self.clone(),
        })
    }

    /// Number of handles acquired and not yet released.
    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn release(&self, id: Uuid) {
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        if live.remove(&id).is_some() {
            log::debug!("Released reference handle {} ({} still live)", id, live.len());
        }
    }
}

/// A locally created reference to an uploaded file.
///
/// Released from its registry exactly once, when dropped.
#[derive(Debug)]
pub struct ObjectHandle {
    id: Uuid,
    path: PathBuf,
    len: u64,
    registry: HandleRegistry,
}

impl ObjectHandle {
    const URL_PREFIX: &'static str = "blob:vidash/";

    pub fn url(&self) -> String {
        format!("{}{}", Self::URL_PREFIX, self.id)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.len
    }
}

impl Drop for ObjectHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

/// A playable media reference.
#[derive(Debug)]
pub enum MediaReference {
    /// Created by intake from a local file
    Local(ObjectHandle),
    /// Remote URL passed on the command line
    Remote(String),
}

impl MediaReference {
    /// Interpret a command-line argument: URLs stay remote, anything else is
    /// taken through intake as a local file.
    pub fn from_arg(
        arg: &str,
        registry: &HandleRegistry,
        config: &DashboardConfig,
    ) -> Result<Self, IntakeError> {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            return Ok(Self::Remote(arg.to_string()));
        }
        compress_video(registry, vec![PathBuf::from(arg)], config)
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Reference identifier shown to the user.
    pub fn url(&self) -> String {
        match self {
            Self::Local(handle) => handle.url(),
            Self::Remote(url) => url.clone(),
        }
    }

    /// Location a decoder can open.
    pub fn location(&self) -> String {
        match self {
            Self::Local(handle) => handle.path().to_string_lossy().to_string(),
            Self::Remote(url) => url.clone(),
        }
    }
}

/// Accept the first of the offered files and create a reference handle for it.
///
/// Additional files are ignored. No data transformation takes place.
pub fn compress_video(
    registry: &HandleRegistry,
    files: Vec<PathBuf>,
    config: &DashboardConfig,
) -> Result<MediaReference, IntakeError> {
    let mut files = files.into_iter();
    let file = files.next().ok_or(IntakeError::NoFile)?;
    let ignored = files.count();
    if ignored > 0 {
        log::warn!("Ignoring {} additional file(s), only one video is accepted", ignored);
    }

    log::info!("Video dropped, creating reference for {}", file.display());

    if !config.accepts_extension(&file) {
        return Err(IntakeError::NotVideo(file));
    }

    let handle = registry.create_object_handle(&file)?;
    log::info!("Video reference ready: {} ({} bytes)", handle.url(), handle.size_bytes());
    Ok(MediaReference::Local(handle))
}

/// Save the bytes behind a local reference to `dest`, unchanged.
pub fn save_video(reference: &MediaReference, dest: &Path) -> Result<u64, DownloadError> {
    let MediaReference::Local(handle) = reference else {
        return Err(DownloadError::NotLocal);
    };

    let written = std::fs::copy(handle.path(), dest).map_err(|source| DownloadError::Io {
        path: dest.to_path_buf(),
        source,
    })?;
    log::info!("Saved video to {} ({} bytes)", dest.display(), written);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn video_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_first_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let first = video_file(dir.path(), "a.mp4", b"first");
        let second = video_file(dir.path(), "b.mp4", b"second");
        let registry = HandleRegistry::new();

        let reference =
            compress_video(&registry, vec![first.clone(), second], &DashboardConfig::default()).unwrap();

        match &reference {
            MediaReference::Local(handle) => assert_eq!(handle.path(), first.as_path()),
            MediaReference::Remote(_) => panic!("expected a local handle"),
        }
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_no_file_is_an_error() {
        let registry = HandleRegistry::new();
        let err = compress_video(&registry, Vec::new(), &DashboardConfig::default()).unwrap_err();
        assert!(matches!(err, IntakeError::NoFile));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_empty_and_non_video_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let empty = video_file(dir.path(), "empty.mp4", b"");
        let text = video_file(dir.path(), "notes.txt", b"hello");
        let registry = HandleRegistry::new();
        let config = DashboardConfig::default();

        assert!(matches!(
            compress_video(&registry, vec![empty], &config),
            Err(IntakeError::EmptyFile(_))
        ));
        assert!(matches!(
            compress_video(&registry, vec![text], &config),
            Err(IntakeError::NotVideo(_))
        ));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_handle_released_exactly_once_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = video_file(dir.path(), "clip.webm", b"data");
        let registry = HandleRegistry::new();

        let first = registry.create_object_handle(&path).unwrap();
        let second = registry.create_object_handle(&path).unwrap();
        assert_ne!(first.url(), second.url());
        assert_eq!(registry.live_count(), 2);

        drop(first);
        assert_eq!(registry.live_count(), 1);

        drop(second);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_poisoned_registry_keeps_counting() {
        let dir = tempfile::tempdir().unwrap();
        let path = video_file(dir.path(), "clip.mkv", b"data");
        let registry = HandleRegistry::new();
        let handle = registry.create_object_handle(&path).unwrap();

        let poisoner = registry.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.live.lock().unwrap();
            panic!("poison the registry");
        })
        .join();
        assert!(registry.live.is_poisoned());

        let second = registry.create_object_handle(&path).unwrap();
        assert_eq!(registry.live_count(), 2);
        drop(handle);
        drop(second);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_compression_does_not_transform_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let path = video_file(dir.path(), "clip.mov", &payload);
        let registry = HandleRegistry::new();

        let reference = compress_video(&registry, vec![path], &DashboardConfig::default()).unwrap();
        let dest = dir.path().join(VIDEO_DOWNLOAD_NAME);
        let written = save_video(&reference, &dest).unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), payload);
    }

    #[test]
    fn test_remote_reference_cannot_be_saved() {
        let registry = HandleRegistry::new();
        let reference = MediaReference::from_arg(
            "https://example.com/video.mp4",
            &registry,
            &DashboardConfig::default(),
        )
        .unwrap();

        assert!(!reference.is_local());
        assert_eq!(reference.location(), "https://example.com/video.mp4");
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            save_video(&reference, &dir.path().join("out.mp4")),
            Err(DownloadError::NotLocal)
        ));
        assert_eq!(registry.live_count(), 0);
    }
}
