use crate::errors::SyncError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub freshdesk_domain: String,
    pub freshdesk_api_key: String,
    pub todoist_api_key: String,
    pub todoist_list: String,
    pub custom_domain: Option<String>,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub freshdesk_domain: Option<String>,
    pub freshdesk_api_key: Option<String>,
    pub todoist_api_key: Option<String>,
    pub todoist_list: Option<String>,
    pub custom_domain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub freshdesk: FreshdeskFile,
    #[serde(default)]
    pub todoist: TodoistFile,
}

#[derive(Debug, Default, Deserialize)]
pub struct FreshdeskFile {
    pub domain: Option<String>,
    pub api_key: Option<String>,
    pub custom_domain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TodoistFile {
    pub api_key: Option<String>,
    pub list: Option<String>,
}

impl FileSettings {
    /// A missing file is an empty config; a broken one is an error.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_str = std::fs::read_to_string(path).map_err(|e| {
            SyncError::ConfigInvalid(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&config_str).map_err(|e| {
            SyncError::ConfigInvalid(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

impl Settings {
    /// Flags and environment win over the config file.
    pub fn resolve(overrides: Overrides, file: FileSettings) -> Result<Self, SyncError> {
        Ok(Self {
            freshdesk_domain: require(
                overrides.freshdesk_domain,
                file.freshdesk.domain,
                "fd-domain",
                "FRESHDESK_DOMAIN",
            )?,
            freshdesk_api_key: require(
                overrides.freshdesk_api_key,
                file.freshdesk.api_key,
                "fd-apikey",
                "FRESHDESK_APIKEY",
            )?,
            todoist_api_key: require(
                overrides.todoist_api_key,
                file.todoist.api_key,
                "todoist-apikey",
                "TODOIST_APIKEY",
            )?,
            todoist_list: require(
                overrides.todoist_list,
                file.todoist.list,
                "todoist-freshdesk-list",
                "TODOIST_FRESHDESK_LIST",
            )?,
            custom_domain: pick(overrides.custom_domain, file.freshdesk.custom_domain),
        })
    }

    /// Host used in ticket links inside task content.
    pub fn link_domain(&self) -> String {
        match &self.custom_domain {
            Some(domain) => domain.clone(),
            None => format!("{}.freshdesk.com", self.freshdesk_domain),
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(PathBuf::from(home).join(".ttsync").join("config.toml"))
    }
}

fn pick(first: Option<String>, second: Option<String>) -> Option<String> {
    let present = |v: &String| !v.trim().is_empty();
    first.filter(present).or(second.filter(present))
}

fn require(
    first: Option<String>,
    second: Option<String>,
    flag: &'static str,
    env: &'static str,
) -> Result<String, SyncError> {
    pick(first, second).ok_or(SyncError::ConfigMissing { flag, env })
}
