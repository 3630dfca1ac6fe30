use crate::logbook::MoveLog;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub destination: DestinationConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub rules: RuleConfig,
    #[serde(default)]
    pub safety: SafetyConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Folder to organize. Defaults to the user's Downloads directory.
    pub root: Option<String>,
    /// Glob patterns for files the scanner should never touch.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Root under which category/date subfolders are created. Defaults to
    /// the source root itself.
    pub root: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Move log location. Defaults to `_downsort.log` under the destination.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Directory of TOML category rules overriding the built-in table.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafetyConfig {
    #[serde(default)]
    pub dry_run: bool,
}

impl AppConfig {
    pub fn source_root(&self) -> anyhow::Result<PathBuf> {
        if let Some(root) = &self.source.root {
            return Ok(PathBuf::from(root));
        }
        dirs_next::download_dir()
            .or_else(|| dirs_next::home_dir().map(|home| home.join("Downloads")))
            .context("could not determine the downloads directory")
    }

    pub fn destination_root(&self, source: &Path) -> PathBuf {
        self.destination
            .root
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| source.to_path_buf())
    }

    pub fn log_path(&self, dest_root: &Path) -> PathBuf {
        self.log
            .path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| MoveLog::default_path(dest_root))
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
