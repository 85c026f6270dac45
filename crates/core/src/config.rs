//! Configuration file discovery
//!
//! Settings are layered, highest priority first:
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Config file (first one found in the locations below)
//! 4. Built-in defaults

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;

use crate::{Error, APP_NAME};

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Path given with `--config` or the config environment variable
    Explicit(PathBuf),
    /// Found in the current working directory
    CurrentDir(PathBuf),
    /// Found under `$XDG_CONFIG_HOME/metar-report/` or `~/.config/metar-report/`
    XdgConfig(PathBuf),
    /// Found under `/etc/metar-report/`
    System(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigSource::Explicit(p)
            | ConfigSource::CurrentDir(p)
            | ConfigSource::XdgConfig(p)
            | ConfigSource::System(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path() {
            Some(p) => write!(f, "{}", p.display()),
            None => write!(f, "(defaults)"),
        }
    }
}

/// Finds the first existing config file, checking `env_var`, the working directory,
/// the XDG config home and finally `/etc/metar-report/`.
pub fn find_config_file(env_var: &str, filename: &str) -> ConfigSource {
    if let Ok(path) = env::var(env_var) {
        let p = PathBuf::from(path);
        if p.exists() {
            return ConfigSource::Explicit(p);
        }
    }

    let candidates = [
        ConfigSource::CurrentDir(PathBuf::from(filename)),
        ConfigSource::XdgConfig(xdg_config_dir().join(filename)),
        ConfigSource::System(PathBuf::from("/etc").join(APP_NAME).join(filename)),
    ];
    candidates
        .into_iter()
        .find(|source| source.path().is_some_and(|p| p.exists()))
        .unwrap_or(ConfigSource::Defaults)
}

fn xdg_config_dir() -> PathBuf {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join(APP_NAME)
    } else if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".config").join(APP_NAME)
    } else {
        PathBuf::from(".config").join(APP_NAME)
    }
}

/// Reads and parses a TOML config, `ConfigSource::Defaults` yields `T::default()`.
pub fn load_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> Result<T, Error> {
    let Some(path) = source.path() else {
        return Ok(T::default());
    };
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Sample {
        stations: Option<Vec<String>>,
        level: Option<String>,
    }

    #[test]
    fn test_config_source_display() {
        let source = ConfigSource::CurrentDir(PathBuf::from("metar-report.toml"));
        assert_eq!(format!("{}", source), "metar-report.toml");

        let source = ConfigSource::Defaults;
        assert_eq!(format!("{}", source), "(defaults)");
    }

    #[test]
    fn test_defaults_without_file() {
        let sample: Sample = load_config(&ConfigSource::Defaults).unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_load_toml_file() {
        let path = env::temp_dir().join(format!("metar-report-test-{}.toml", std::process::id()));
        fs::write(&path, "stations = [\"KSEA\", \"KPDX\"]\nlevel = \"debug\"\n").unwrap();
        let sample: Sample = load_config(&ConfigSource::Explicit(path.clone())).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(
            sample.stations,
            Some(vec![String::from("KSEA"), String::from("KPDX")])
        );
        assert_eq!(sample.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_unreadable_file_is_config_error() {
        let source = ConfigSource::Explicit(PathBuf::from("/nonexistent/metar-report.toml"));
        assert!(matches!(
            load_config::<Sample>(&source),
            Err(Error::Config(_))
        ));
    }
}
