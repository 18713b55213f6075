// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Analytics snapshot export.
//!
//! This module writes the current analytics summary to YAML or JSON.
//! Nothing is ever read back; a new session always starts from zero.

use crate::models::analytics::AnalyticsSummary;
use anyhow::{bail, Result};
use std::path::Path;

/// Export an analytics summary to YAML format.
pub fn export_yaml(summary: &AnalyticsSummary, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(summary)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export an analytics summary to JSON format.
pub fn export_json(summary: &AnalyticsSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Export using the format implied by the file extension.
pub fn export_summary(summary: &AnalyticsSummary, path: &Path) -> Result<()> {
    let extension = path.extension().and_then(|s| s.to_str());
    match extension {
        Some("yaml") | Some("yml") => export_yaml(summary, path),
        Some("json") => export_json(summary, path),
        _ => bail!("Unsupported file extension: {:?}", extension),
    }
}
