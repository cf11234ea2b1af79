use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, ShellError};
use crate::layout::ChromeGeometry;

pub const DEFAULT_HOME_URL: &str = "https://google.com";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://google.com/search?q=";
pub const DEFAULT_AGENT_ENDPOINT: &str = "ws://localhost:8000/ws/agent";
/// Port Agent Core probes for the content view's DevTools endpoint.
pub const DEFAULT_CDP_PORT: u16 = 9333;

const SETTINGS_DIR: &str = ".aeternus";
const SETTINGS_FILE: &str = "shell-settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub endpoint: String,
    /// Send `{ "cancel": true }` when the user stops a running turn.
    pub cancel_on_stop: bool,
    /// Remote debugging port exposed by the content webview.
    pub cdp_port: u16,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_AGENT_ENDPOINT.to_string(),
            cancel_on_stop: true,
            cdp_port: DEFAULT_CDP_PORT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: f64,
    pub height: f64,
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            min_width: 800.0,
            min_height: 600.0,
        }
    }
}

impl AgentSettings {
    /// Browser argument that opens the DevTools protocol on `cdp_port`.
    pub fn remote_debugging_arg(&self) -> String {
        format!("--remote-debugging-port={}", self.cdp_port)
    }
}

// Settings management

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    pub home_url: String,
    pub search_endpoint: String,
    pub agent: AgentSettings,
    pub geometry: ChromeGeometry,
    pub window: WindowSettings,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            home_url: DEFAULT_HOME_URL.to_string(),
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            agent: AgentSettings::default(),
            geometry: ChromeGeometry::default(),
            window: WindowSettings::default(),
        }
    }
}

impl ShellSettings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }

    /// Settings from the user's settings file, falling back to defaults when
    /// the file cannot be read or decoded.
    pub fn load_or_default() -> Self {
        let loaded = settings_storage_path().and_then(|path| Self::load_from(&path));
        loaded.unwrap_or_else(|err| {
            warn!("failed to load shell settings, using defaults: {err}");
            Self::default()
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&settings_storage_path()?)
    }
}

pub fn settings_storage_path() -> Result<PathBuf> {
    let base = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .ok_or(ShellError::SettingsDir)?;

    Ok(base.join(SETTINGS_DIR).join(SETTINGS_FILE))
}
