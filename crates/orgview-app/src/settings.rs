use orgview_graph::DiagramConfig;
use orgview_search::DEFAULT_AUTOCOMPLETE_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
    pub diagram: DiagramConfig,
    /// Talk to a running server instead of the in-process directory.
    pub server_url: Option<String>,
    /// Directory file used when no server is configured.
    pub data_file: Option<PathBuf>,
    pub autocomplete_limit: usize,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            diagram: DiagramConfig::default(),
            server_url: None,
            data_file: None,
            autocomplete_limit: DEFAULT_AUTOCOMPLETE_LIMIT,
        }
    }
}

impl ExplorerSettings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("orgview").join("settings.json"))
    }

    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Read settings from `path`, falling back to defaults on any problem.
    pub fn load_from(path: &Path) -> Self {
        tracing::info!("Loading settings from {:?}", path);
        if !path.exists() {
            tracing::info!("Settings file not found, using defaults");
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => return settings,
                Err(e) => tracing::error!("Failed to parse settings: {}", e),
            },
            Err(e) => tracing::error!("Failed to read settings file: {}", e),
        }
        Self::default()
    }

    pub fn save(&self) -> std::io::Result<()> {
        match Self::default_path() {
            Some(path) => self.save_to(&path),
            None => {
                tracing::warn!("No config directory, settings not saved");
                Ok(())
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, content).inspect_err(|e| {
            tracing::error!("Failed to write settings to {:?}: {}", path, e);
        })
    }
}
