// Keypipe Settings Module
// Optional operator overrides loaded from a TOML file

use std::path::{Path, PathBuf};

/// Settings for keypipe loaded from a TOML file (default:
/// ~/.config/keypipe/settings.toml).
///
/// Every field is optional; the daemon resolves CLI flag > settings file
/// > built-in default.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    socket_path: Option<PathBuf>,
    device_name: Option<String>,

    /// Path the settings were loaded from, if any.
    source_path: Option<PathBuf>,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

/// TOML representation for deserializing settings
#[derive(Debug, Clone, serde::Deserialize, Default)]
struct SettingsToml {
    #[serde(default)]
    socket: Option<SocketSettings>,

    #[serde(default)]
    device: Option<DeviceSettings>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct SocketSettings {
    #[serde(default)]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct DeviceSettings {
    #[serde(default)]
    name: Option<String>,
}

impl Settings {
    /// Create a settings object with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();
        if let Some(socket) = toml_settings.socket {
            settings.socket_path = socket.path;
        }
        if let Some(device) = toml_settings.device {
            settings.device_name = device.name;
        }
        Ok(settings)
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keypipe").join("settings.toml"))
    }

    /// Load from the default location; a missing file means defaults, a
    /// present-but-broken file is an error.
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Ok(Self::new())
    }

    /// Socket path override, if configured.
    pub fn socket_path(&self) -> Option<&Path> {
        self.socket_path.as_deref()
    }

    /// Virtual device name override, if configured.
    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    /// Path the settings were loaded from.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}
