use serde::{Deserialize, Serialize};
use wardrobe_common::{Error, Result};

/// Storage URL shipped before the user has configured a project.
pub const PLACEHOLDER_SUPABASE_URL: &str = "https://[YOUR-PROJECT-ID].supabase.co";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub credentials: Credentials,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub compression: CompressionConfig,
}

/// The three user-supplied secrets. Any of them may be unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Credentials {
    /// Key for the hosted generation endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,

    /// Project URL of the storage service
    #[serde(default = "default_supabase_url")]
    pub supabase_url: String,

    /// Anon key of the storage service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_key: Option<String>,
}

fn default_supabase_url() -> String {
    PLACEHOLDER_SUPABASE_URL.to_string()
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            supabase_url: default_supabase_url(),
            supabase_key: None,
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Reported by every action that needs the generation endpoint.
pub const MISSING_GEMINI_KEY: &str = "gemini_api_key is not set";

impl Credentials {
    /// Storage URL and key, or a config error naming what is missing.
    pub fn require_storage(&self) -> Result<(&str, &str)> {
        let url = present(Some(self.supabase_url.as_str()))
            .filter(|u| *u != PLACEHOLDER_SUPABASE_URL)
            .ok_or_else(|| Error::config("supabase_url is not set"))?;
        let key = present(self.supabase_key.as_deref())
            .ok_or_else(|| Error::config("supabase_key is not set"))?;
        Ok((url, key))
    }

    /// Generation endpoint key, or a config error.
    pub fn require_vision(&self) -> Result<&str> {
        present(self.gemini_api_key.as_deref())
            .ok_or_else(|| Error::config(MISSING_GEMINI_KEY))
    }
}

/// Show only the tail of a secret.
pub fn masked(secret: Option<&str>) -> String {
    match present(secret) {
        None => "(not set)".to_string(),
        Some(s) if s.chars().count() <= 4 => "****".to_string(),
        Some(s) => {
            let tail: String = s.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("****{tail}")
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_gemini_model() -> String {
    "gemini-flash-latest".to_string()
}
fn default_gemini_timeout() -> u64 {
    60
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            timeout_secs: default_gemini_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Public bucket holding the compressed images
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Table holding catalog records
    #[serde(default = "default_table")]
    pub table: String,

    /// Cache-Control max-age (seconds) attached to uploaded objects
    #[serde(default = "default_cache_control")]
    pub cache_control: String,

    /// Number of items shown in the catalog view
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,
}

fn default_bucket() -> String {
    "wardrobe_images".to_string()
}
fn default_table() -> String {
    "items".to_string()
}
fn default_cache_control() -> String {
    "3600".to_string()
}
fn default_recent_limit() -> usize {
    50
}
fn default_storage_timeout() -> u64 {
    30
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            table: default_table(),
            cache_control: default_cache_control(),
            recent_limit: default_recent_limit(),
            timeout_secs: default_storage_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompressionConfig {
    /// Images wider than this are scaled down to it
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    /// Lossy quality in (0, 1]
    #[serde(default = "default_quality")]
    pub quality: f32,
}

fn default_max_width() -> u32 {
    1000
}
fn default_quality() -> f32 {
    0.8
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            quality: default_quality(),
        }
    }
}
