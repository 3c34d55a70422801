// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted wire settings: storage port, filesystem adapter, and service.

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sketch_wire::WireConfig;
use thiserror::Error;

/// Key the wire config is stored under.
pub const WIRE_KEY: &str = "wire";

/// Where `sketchwire` keeps its settings files, addressed by setting group.
pub trait ConfigStore {
    /// Bytes stored for `key`; [`ConfigError::NotFound`] if nothing was saved yet.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Replace whatever is stored for `key` with `data`.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Failures while reading, editing or writing the wire settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing saved under the requested group.
    #[error("not found")]
    NotFound,
    /// Setting name the config does not have.
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
    /// The settings file could not be read or written.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not a valid wire config.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// No usable config directory on this platform.
    #[error("other: {0}")]
    Other(String),
}

/// JSON files under a config directory, one per key.
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// Store rooted at the platform config directory (e.g. `~/.config/sketchwire`).
    pub fn new() -> Result<Self, ConfigError> {
        let proj = ProjectDirs::from("dev", "flyingrobots", "sketchwire")
            .ok_or_else(|| ConfigError::Other("could not resolve config dir".into()))?;
        Ok(Self::at(proj.config_dir()))
    }

    /// Store rooted at `base`. The directory is created on first save.
    pub fn at(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::NotFound),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.base)?;
        fs::write(self.path_for(key), data)?;
        Ok(())
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryConfigStore {
    blobs: RefCell<HashMap<String, Vec<u8>>>,
}

#[cfg(test)]
impl ConfigStore for MemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        self.blobs
            .borrow()
            .get(key)
            .cloned()
            .ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        self.blobs.borrow_mut().insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}

/// Serializes config values and delegates storage to a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S: ConfigStore> ConfigService<S> {
    /// Service over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Parsed settings for `key`; `Ok(None)` for a missing or empty file.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.store.load_raw(key) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write `value` for `key` as indented JSON.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }

    /// Stored wire config, or the defaults.
    pub fn wire(&self) -> Result<WireConfig, ConfigError> {
        Ok(self.load(WIRE_KEY)?.unwrap_or_default())
    }

    /// Persist the wire config.
    pub fn save_wire(&self, config: &WireConfig) -> Result<(), ConfigError> {
        self.save(WIRE_KEY, config)
    }
}

/// Change one setting by its JSON name (`endian`, `maxStringLen`, …).
///
/// `value` is parsed as JSON when it can be (`true`, `4096`) and taken as a
/// bare string otherwise (`big`, `lengthPrefixed`). The result must still
/// deserialize as a [`WireConfig`].
pub fn set_key(config: &WireConfig, key: &str, value: &str) -> Result<WireConfig, ConfigError> {
    let mut tree = serde_json::to_value(config)?;
    let slot = tree
        .get_mut(key)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_owned()))?;
    *slot = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok(serde_json::from_value(tree)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_wire::{Endian, Framing};

    #[test]
    fn test_missing_config_loads_defaults() {
        let service = ConfigService::new(MemoryConfigStore::default());
        assert_eq!(service.wire().unwrap(), WireConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let service = ConfigService::new(MemoryConfigStore::default());
        let cfg = WireConfig::default()
            .with_endian(Endian::Big)
            .with_prologue(false);
        service.save_wire(&cfg).unwrap();
        assert_eq!(service.wire().unwrap(), cfg);
    }

    #[test]
    fn test_corrupt_config_is_reported_and_overwritable() {
        let service = ConfigService::new(MemoryConfigStore::default());
        service.store.save_raw(WIRE_KEY, b"{not json").unwrap();
        assert!(matches!(service.wire(), Err(ConfigError::Serde(_))));
        service.save_wire(&WireConfig::default()).unwrap();
        assert_eq!(service.wire().unwrap(), WireConfig::default());
    }

    #[test]
    fn test_set_key_parses_values() {
        let cfg = WireConfig::default();
        let cfg = set_key(&cfg, "endian", "big").unwrap();
        let cfg = set_key(&cfg, "framing", "lengthPrefixed").unwrap();
        let cfg = set_key(&cfg, "maxStringLen", "64").unwrap();
        let cfg = set_key(&cfg, "prologue", "false").unwrap();
        assert_eq!(cfg.endian, Endian::Big);
        assert_eq!(cfg.framing, Framing::LengthPrefixed);
        assert_eq!(cfg.max_string_len, 64);
        assert!(!cfg.prologue);
    }

    #[test]
    fn test_set_key_rejects_bad_input() {
        let cfg = WireConfig::default();
        assert!(matches!(
            set_key(&cfg, "colour", "red"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            set_key(&cfg, "endian", "middle"),
            Err(ConfigError::Serde(_))
        ));
        assert!(matches!(
            set_key(&cfg, "maxPoints", "-1"),
            Err(ConfigError::Serde(_))
        ));
    }

    #[test]
    fn test_fs_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsConfigStore::at(dir.path().join("nested"));
        assert!(matches!(store.load_raw("wire"), Err(ConfigError::NotFound)));
        store.save_raw("wire", b"{}").unwrap();
        assert_eq!(store.load_raw("wire").unwrap(), b"{}");
        let service = ConfigService::new(store);
        assert_eq!(service.wire().unwrap(), WireConfig::default());
    }
}
