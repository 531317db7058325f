// Configuration loading and parsing (config/draftgap.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_FILE: &str = "draftgap.toml";
const DEFAULT_DB_FILE: &str = "draftgap.db";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub client: ClientConfig,
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Where the League client is installed and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub install_dir: PathBuf,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Champion dataset JSON, relative to the working directory.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file. Defaults to `draftgap.db` in the platform data directory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Start the League client integration at launch.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Show teammates' hovered champions before they lock in.
    #[serde(default = "default_true")]
    pub show_hovers: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            enabled: true,
            show_hovers: true,
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

impl Config {
    /// The configured database path, or the platform data directory.
    pub fn db_path(&self) -> PathBuf {
        if let Some(path) = &self.database.path {
            return path.clone();
        }
        match directories::ProjectDirs::from("", "", "draftgap") {
            Some(dirs) => dirs.data_dir().join(DEFAULT_DB_FILE),
            None => PathBuf::from(DEFAULT_DB_FILE),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/draftgap.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()`.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        // A packaged install may ship config/ alone; with neither there is
        // nothing to load.
        if config_dir.exists() {
            return Ok(vec![]);
        }
        return Err(copy_error(format!(
            "neither defaults/ nor config/ directory found in {}; \
             run from the project root or ensure defaults/ is present",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("failed to create config directory: {e}")))?;
    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("failed to read defaults directory: {e}")))?;

    let mut copied = Vec::new();
    for entry in entries {
        let source = entry
            .map_err(|e| copy_error(format!("failed to read defaults entry: {e}")))?
            .path();
        let Some(name) = source.file_name().filter(|_| source.is_file()) else {
            continue;
        };
        // Templates such as `draftgap.toml.example` stay in defaults/.
        if name.to_string_lossy().ends_with(".example") {
            continue;
        }

        // Never overwrite a file the user may have edited.
        let target = config_dir.join(name);
        let mut dest = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(dest) => dest,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(copy_error(format!(
                    "failed to create {}: {e}",
                    target.display()
                )))
            }
        };
        let content = std::fs::read(&source)
            .map_err(|e| copy_error(format!("failed to read {}: {e}", source.display())))?;
        std::io::Write::write_all(&mut dest, &content)
            .map_err(|e| copy_error(format!("failed to write {}: {e}", target.display())))?;
        copied.push(target);
    }

    Ok(copied)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.client.install_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "client.install_dir".into(),
            message: "must not be empty".into(),
        });
    }

    let timeout = config.client.request_timeout_ms;
    if !(100..=60_000).contains(&timeout) {
        return Err(ConfigError::ValidationError {
            field: "client.request_timeout_ms".into(),
            message: format!("must be between 100 and 60000, got {timeout}"),
        });
    }

    if config.dataset.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "dataset.path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// The crate root holding `defaults/`, whether tests run from the crate
    /// or the workspace root.
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("draftgap/defaults").exists() {
            cwd.join("draftgap")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    fn write_config(name: &str, content: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), content).unwrap();
        tmp
    }

    #[test]
    fn default_config_is_valid() {
        let tmp = std::env::temp_dir().join("draftgap_config_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::copy(
            project_root().join("defaults").join(CONFIG_FILE),
            tmp.join("config").join(CONFIG_FILE),
        )
        .unwrap();

        let config = load_config_from(&tmp).expect("defaults should load");
        assert_eq!(config.client.request_timeout(), Duration::from_millis(2000));
        assert_eq!(config.dataset.path, PathBuf::from("data/dataset.json"));
        assert!(config.sync.enabled);
        assert!(config.sync.show_hovers);
        assert!(config.database.path.is_none());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn optional_sections_default() {
        let tmp = write_config(
            "draftgap_config_minimal",
            r#"
            [client]
            install_dir = "/games/league"

            [dataset]
            path = "dataset.json"
            "#,
        );
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.client.request_timeout_ms, 2000);
        assert!(config.sync.show_hovers);
        assert!(config.db_path().ends_with(DEFAULT_DB_FILE));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn explicit_database_path_wins() {
        let tmp = write_config(
            "draftgap_config_db",
            r#"
            [client]
            install_dir = "/games/league"
            [dataset]
            path = "dataset.json"
            [database]
            path = "custom.db"
            [sync]
            show_hovers = false
            "#,
        );
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.db_path(), PathBuf::from("custom.db"));
        assert!(!config.sync.show_hovers);
        assert!(config.sync.enabled);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_tiny_timeout() {
        let tmp = write_config(
            "draftgap_config_timeout",
            r#"
            [client]
            install_dir = "/games/league"
            request_timeout_ms = 5
            [dataset]
            path = "dataset.json"
            "#,
        );
        let err = load_config_from(&tmp).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { ref field, .. } if field == "client.request_timeout_ms")
        );
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_install_dir() {
        let tmp = write_config(
            "draftgap_config_install_dir",
            r#"
            [client]
            install_dir = ""
            [dataset]
            path = "dataset.json"
            "#,
        );
        let err = load_config_from(&tmp).unwrap_err();
        assert!(err.to_string().contains("client.install_dir"));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_file_is_reported() {
        let tmp = std::env::temp_dir().join("draftgap_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let tmp = write_config("draftgap_config_garbage", "[client\ninstall_dir = ");
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_once() {
        let tmp = std::env::temp_dir().join("draftgap_config_copy");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), "x = 1").unwrap();
        fs::write(tmp.join("defaults/notes.toml.example"), "y = 2").unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(copied, vec![tmp.join("config").join(CONFIG_FILE)]);
        assert!(!tmp.join("config/notes.toml.example").exists());

        fs::write(tmp.join("config").join(CONFIG_FILE), "x = 2").unwrap();
        assert!(ensure_config_files(&tmp).unwrap().is_empty());
        assert_eq!(
            fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap(),
            "x = 2"
        );
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_without_any_directory_fails() {
        let tmp = std::env::temp_dir().join("draftgap_config_nothing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let err = ensure_config_files(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsCopyError { .. }));
    }
}
