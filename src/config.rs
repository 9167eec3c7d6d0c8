use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How hard the store tries to survive an OS crash mid-write.
///
/// The store is a cache in front of a regenerable rendering pipeline, so
/// the default trades durability for speed: `Relaxed` runs SQLite with
/// `synchronous = OFF`, which is fast but can corrupt the file if the OS
/// dies during a write. If losing the cache is not acceptable, `Strict`
/// keeps `synchronous = FULL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Durability {
    Strict,
    #[default]
    Relaxed,
}

impl Durability {
    pub(crate) fn synchronous_pragma(self) -> &'static str {
        match self {
            Durability::Strict => "FULL",
            Durability::Relaxed => "OFF",
        }
    }
}

/// Where the store lives and how durable it is.
///
/// `database: None` means a pure in-memory store.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub durability: Durability,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("pagestore.toml")
}

pub fn load_config(path: Option<&Path>) -> Result<Option<StoreConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: StoreConfig = toml::from_str(&contents).map_err(|e| Error::Config(e.to_string()))?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &StoreConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "config already exists at {} (use force to overwrite)",
            path.display()
        )));
    }

    let contents = toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
