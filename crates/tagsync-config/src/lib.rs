use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

const APP_DIR: &str = "tagsync";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_BASE_URL: &str = "https://e621.net";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MAX_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_RETENTION_DAYS: i64 = 30;
pub const MIN_RETENTION_DAYS: i64 = 1;
pub const MAX_RETENTION_DAYS: i64 = 3650;
pub const DEFAULT_ACTOR: &str = "tagsync";
pub const DEFAULT_EDIT_REASON: &str = "automatic tag replacement";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub maintenance: MaintenanceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub login: Option<String>,
    pub api_key: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceConfig {
    pub history_retention_days: i64,
    pub actor: String,
    pub edit_reason: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                login: None,
                api_key: None,
                user_agent: default_user_agent(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            maintenance: MaintenanceConfig {
                history_retention_days: DEFAULT_RETENTION_DAYS,
                actor: DEFAULT_ACTOR.to_string(),
                edit_reason: DEFAULT_EDIT_REASON.to_string(),
            },
        }
    }
}

impl ApiConfig {
    pub fn has_credentials(&self) -> bool {
        self.login.is_some() && self.api_key.is_some()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid api.base_url: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid api.timeout_secs value: {0}")]
    InvalidTimeout(u64),
    #[error("invalid maintenance.history_retention_days value: {0}")]
    InvalidRetentionDays(i64),
    #[error("invalid {field}: value cannot be empty")]
    EmptyField { field: &'static str },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api: Option<ApiFile>,
    maintenance: Option<MaintenanceFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApiFile {
    base_url: Option<String>,
    login: Option<String>,
    api_key: Option<String>,
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MaintenanceFile {
    history_retention_days: Option<i64>,
    actor: Option<String>,
    edit_reason: Option<String>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(api) = parsed.api {
        if let Some(base_url) = api.base_url {
            config.api.base_url = validate_base_url(&base_url)?;
        }
        if let Some(timeout) = api.timeout_secs {
            if timeout == 0 || timeout > MAX_TIMEOUT_SECS {
                return Err(ConfigError::InvalidTimeout(timeout));
            }
            config.api.timeout_secs = timeout;
        }
        config.api.login = optional_field(api.login, "api.login")?;
        config.api.api_key = optional_field(api.api_key, "api.api_key")?;
        if let Some(agent) = optional_field(api.user_agent, "api.user_agent")? {
            config.api.user_agent = agent;
        }
    }

    if let Some(maintenance) = parsed.maintenance {
        if let Some(days) = maintenance.history_retention_days {
            if !(MIN_RETENTION_DAYS..=MAX_RETENTION_DAYS).contains(&days) {
                return Err(ConfigError::InvalidRetentionDays(days));
            }
            config.maintenance.history_retention_days = days;
        }
        if let Some(actor) = optional_field(maintenance.actor, "maintenance.actor")? {
            config.maintenance.actor = actor;
        }
        if let Some(reason) = optional_field(maintenance.edit_reason, "maintenance.edit_reason")? {
            config.maintenance.edit_reason = reason;
        }
    }

    Ok(config)
}

fn validate_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidBaseUrl(raw.to_string()))?;
    if url.scheme() != "https" {
        return Err(ConfigError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn optional_field(value: Option<String>, field: &'static str) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::EmptyField { field });
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn default_user_agent() -> String {
    format!("tagsync/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        load_at_path, merge_config, ApiFile, AppConfig, ConfigError, ConfigFile, MaintenanceFile,
        DEFAULT_RETENTION_DAYS,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            api: Some(ApiFile {
                base_url: Some("https://example.net/".to_string()),
                login: Some("mod".to_string()),
                api_key: Some("secret".to_string()),
                user_agent: None,
                timeout_secs: Some(10),
            }),
            maintenance: Some(MaintenanceFile {
                history_retention_days: Some(7),
                actor: Some("nightly".to_string()),
                edit_reason: None,
            }),
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.api.base_url, "https://example.net");
        assert!(merged.api.has_credentials());
        assert_eq!(merged.api.timeout_secs, 10);
        assert_eq!(merged.maintenance.history_retention_days, 7);
        assert_eq!(merged.maintenance.actor, "nightly");
        assert_eq!(
            merged.maintenance.edit_reason,
            AppConfig::default().maintenance.edit_reason
        );
    }

    #[test]
    fn merge_config_defaults() {
        let merged = merge_config(ConfigFile::default()).expect("merge");
        assert_eq!(merged, AppConfig::default());
        assert_eq!(
            merged.maintenance.history_retention_days,
            DEFAULT_RETENTION_DAYS
        );
        assert!(!merged.api.has_credentials());
    }

    #[test]
    fn merge_config_rejects_plain_http() {
        let parsed = ConfigFile {
            api: Some(ApiFile {
                base_url: Some("http://example.net".to_string()),
                ..ApiFile::default()
            }),
            maintenance: None,
        };
        assert!(matches!(
            merge_config(parsed),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn merge_config_rejects_zero_retention() {
        let parsed = ConfigFile {
            api: None,
            maintenance: Some(MaintenanceFile {
                history_retention_days: Some(0),
                ..MaintenanceFile::default()
            }),
        };
        assert!(matches!(
            merge_config(parsed),
            Err(ConfigError::InvalidRetentionDays(0))
        ));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[api]\nlogin = \"mod\"\napi_key = \"k\"\n[maintenance]\nhistory_retention_days = 14\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.api.login.as_deref(), Some("mod"));
        assert_eq!(config.maintenance.history_retention_days, 14);
    }

    #[test]
    fn load_at_path_rejects_unknown_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "[api]\nbogus = 1\n").expect("write config");
        restrict_permissions(&path);
        assert!(matches!(
            load_at_path(&path, true),
            Err(ConfigError::Parse { .. })
        ));
    }
}
