// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the video dashboard.

pub mod analytics;
pub mod button;
pub mod canvas;
pub mod timeline;
pub mod toolbar;
pub mod upload;
