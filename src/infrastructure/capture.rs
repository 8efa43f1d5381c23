//! Capture snapshot loading.
//!
//! Stack capture itself happens in an external collaborator; it serializes
//! the stack as a JSON array of frame records ordered as captured, innermost
//! frame first. This module is the input-contract boundary.

use crate::domain::frame::FrameRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read a captured stack snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<Vec<FrameRecord>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let frames: Vec<FrameRecord> = serde_json::from_str(&data)
        .with_context(|| format!("Invalid frame snapshot {}", path.display()))?;
    Ok(frames)
}
