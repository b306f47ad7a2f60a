use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{Activity, Appointment, Client, Message, Property, ThemeSettings, User};

// ─── Cached payload ──────────────────────────────────────────────────────────

/// Snapshot of the last successful sync, shown instantly at startup
/// while a fresh fetch runs in the background.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheData {
    pub cached_at: DateTime<Utc>,
    pub user: Option<User>,
    pub properties: Vec<Property>,
    pub appointments: Vec<Appointment>,
    pub clients: Vec<Client>,
    pub messages: Vec<Message>,
    pub activities: Vec<Activity>,
    pub theme_settings: Option<ThemeSettings>,
}

// ─── Path ────────────────────────────────────────────────────────────────────

fn cache_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("realty-tui").join("cache.json"))
}

/// Log file lives next to the cache so the TUI never fights tracing
/// for the terminal.
pub fn log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("realty-tui").join("realty-tui.log"))
}

// ─── I/O ─────────────────────────────────────────────────────────────────────

pub fn load_cache() -> Option<CacheData> {
    let path = cache_path()?;
    let contents = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&contents).ok()
}

pub fn save_cache(data: &CacheData) -> Result<()> {
    let path = cache_path().ok_or_else(|| anyhow!("Could not determine cache directory"))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(&path, json)?;
    Ok(())
}
