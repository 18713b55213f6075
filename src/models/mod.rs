// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Analytics and playback state.

pub mod analytics;
pub mod playback;
