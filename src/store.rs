//! Flat-file profile and plan storage used by the CLI.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::plan::{PlanHistoryEntry, Profile};

/// Load the kitchen profile. A missing file is an empty profile.
pub fn load_profile(path: &Path) -> Result<Profile> {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse profile {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Profile::default()),
        Err(e) => Err(e).with_context(|| format!("Failed to read profile {}", path.display())),
    }
}

/// Load the raw plans document for the history reader. Errors are logged
/// and produce `Value::Null`.
pub fn load_history(path: &Path) -> Value {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Value::Array(Vec::new()),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read plans file");
            return Value::Null;
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "plans file is not valid JSON");
        Value::Null
    })
}

/// Put `entry` at the front of the plans file, newest first.
///
/// The file is rewritten through a temporary sibling and a rename. A plans
/// file that exists but is not a JSON array is left untouched and reported.
pub fn prepend_entry(path: &Path, entry: &PlanHistoryEntry) -> Result<()> {
    let mut plans: Vec<Value> = match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Vec::new(),
        Ok(content) => serde_json::from_str(&content).with_context(|| {
            format!("Refusing to overwrite malformed plans file {}", path.display())
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    plans.insert(
        0,
        serde_json::to_value(entry).context("Failed to serialize plan entry")?,
    );

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create data directory")?;
    }

    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(&plans).context("Failed to serialize plans")?;
    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}
