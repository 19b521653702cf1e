//! Settings persistence using toml_edit to preserve formatting and comments.

use anyhow::{Context, Result};
use std::path::Path;
use toml_edit::DocumentMut;

/// Values entered by the user in a settings save.
///
/// Blank values mean "keep what is stored", matching the settings form where
/// an untouched field must not wipe a saved key.
#[derive(Debug, Clone, Default)]
pub struct CredentialUpdate {
    pub gemini_api_key: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
}

impl CredentialUpdate {
    fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("gemini_api_key", self.gemini_api_key.as_deref()),
            ("supabase_url", self.supabase_url.as_deref()),
            ("supabase_key", self.supabase_key.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        })
    }
}

/// Write non-blank credentials into the `[credentials]` table of `path`,
/// creating the file if needed. Returns the names of the keys written.
pub fn save_credentials(path: &Path, update: &CredentialUpdate) -> Result<Vec<&'static str>> {
    let mut doc: DocumentMut = if path.exists() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?
            .parse()
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    } else {
        DocumentMut::new()
    };

    if !doc.contains_key("credentials") {
        doc["credentials"] = toml_edit::table();
    }
    let table = doc["credentials"]
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("[credentials] in {:?} is not a table", path))?;

    let mut written = Vec::new();
    for (key, value) in update.entries() {
        table[key] = toml_edit::value(value);
        written.push(key);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    std::fs::write(path, doc.to_string())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    tracing::info!(path = ?path, keys = ?written, "Saved credentials");
    Ok(written)
}
