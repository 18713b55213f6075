// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: intake, decoding, frame export, and analytics export.

pub mod frame;
pub mod intake;
pub mod media;
pub mod serialization;
