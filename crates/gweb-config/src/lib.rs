//! Configuration management for GWeb.
//!
//! Parses `gweb.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `server.host` supports `${VAR}` and `${VAR:-default}`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override static files directory.
    pub static_dir: Option<PathBuf>,
    /// Override HMR enabled flag.
    pub hmr_enabled: Option<bool>,
    /// Override HMR stream endpoint.
    pub hmr_endpoint: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "gweb.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Static files configuration (directory is a relative string from TOML).
    #[serde(rename = "static")]
    static_files: StaticConfigRaw,
    /// Hot module reload configuration.
    pub hmr: HmrConfig,

    /// Resolved static files configuration (set after loading).
    #[serde(skip)]
    pub static_resolved: StaticConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StaticConfigRaw {
    dir: Option<String>,
    mount: Option<String>,
}

/// Resolved static files configuration.
#[derive(Debug)]
pub struct StaticConfig {
    /// Directory served under `mount`.
    pub dir: PathBuf,
    /// URL prefix for static files.
    pub mount: String,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("public"),
            mount: "/static".to_owned(),
        }
    }
}

/// Hot module reload configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HmrConfig {
    /// Whether the HMR endpoints are mounted.
    pub enabled: bool,
    /// Path of the event stream.
    pub endpoint: String,
    /// Interval between keep-alive comments (0 disables them).
    pub keep_alive_secs: u64,
    /// Coalescing window for published messages (0 publishes immediately).
    pub debounce_ms: u64,
    /// Number of messages buffered per subscriber before it lags.
    pub channel_capacity: usize,
}

impl Default for HmrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/__hmr".to_owned(),
            keep_alive_secs: 15,
            debounce_ms: 0,
            channel_capacity: 16,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`GWEB_HOST`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL path: leading slash, no trailing slash, not the root.
fn require_url_path(value: &str, field: &str) -> Result<(), ConfigError> {
    if !value.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "{field} must start with '/'"
        )));
    }
    if value.len() < 2 || value.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "{field} must name a path below '/' without a trailing slash"
        )));
    }
    Ok(())
}

/// Whether `path` is `prefix` or a path below it.
fn path_within(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `gweb.toml` in current directory and parents.
    /// CLI settings are applied after path resolution, then the result is
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(static_dir) = &settings.static_dir {
            self.static_resolved.dir.clone_from(static_dir);
        }
        if let Some(enabled) = settings.hmr_enabled {
            self.hmr.enabled = enabled;
        }
        if let Some(endpoint) = &settings.hmr_endpoint {
            self.hmr.endpoint.clone_from(endpoint);
        }
    }

    /// URL of the HMR event stream as seen from the local machine.
    ///
    /// Wildcard bind addresses are replaced with the loopback address and
    /// IPv6 literals are bracketed.
    #[must_use]
    pub fn hmr_url(&self) -> String {
        let host = match self.server.host.as_str() {
            "0.0.0.0" => "127.0.0.1".to_owned(),
            "::" | "[::]" => "[::1]".to_owned(),
            other if other.contains(':') && !other.starts_with('[') => format!("[{other}]"),
            other => other.to_owned(),
        };
        format!("http://{host}:{}{}", self.server.port, self.hmr.endpoint)
    }

    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            static_files: StaticConfigRaw::default(),
            hmr: HmrConfig::default(),
            static_resolved: StaticConfig {
                dir: base.join("public"),
                mount: "/static".to_owned(),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_static()?;
        self.validate_hmr()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 lets the OS pick a port, which clients could never find
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_static(&self) -> Result<(), ConfigError> {
        require_url_path(&self.static_resolved.mount, "static.mount")
    }

    fn validate_hmr(&self) -> Result<(), ConfigError> {
        require_url_path(&self.hmr.endpoint, "hmr.endpoint")?;

        if self.hmr.channel_capacity == 0 {
            return Err(ConfigError::Validation(
                "hmr.channel_capacity must be greater than 0".to_owned(),
            ));
        }

        // Stream, notify and client.js routes all live at or below the endpoint
        let mount = self.static_resolved.mount.as_str();
        let endpoint = self.hmr.endpoint.as_str();
        if path_within(endpoint, mount) || path_within(mount, endpoint) {
            return Err(ConfigError::Validation(format!(
                "hmr.endpoint {endpoint} overlaps static.mount {mount}"
            )));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.static_resolved = StaticConfig {
            dir: config_dir.join(self.static_files.dir.as_deref().unwrap_or("public")),
            mount: self
                .static_files
                .mount
                .clone()
                .unwrap_or_else(|| "/static".to_owned()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.static_resolved.dir, PathBuf::from("/test/public"));
        assert_eq!(config.static_resolved.mount, "/static");
        assert!(config.hmr.enabled);
        assert_eq!(config.hmr.endpoint, "/__hmr");
        assert_eq!(config.hmr.keep_alive_secs, 15);
        assert_eq!(config.hmr.debounce_ms, 0);
        assert_eq!(config.hmr.channel_capacity, 16);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.hmr.endpoint, "/__hmr");
    }

    #[test]
    fn test_parse_hmr_config() {
        let toml = r#"
[hmr]
enabled = false
endpoint = "/events"
keep_alive_secs = 0
debounce_ms = 50
channel_capacity = 4
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.hmr.enabled);
        assert_eq!(config.hmr.endpoint, "/events");
        assert_eq!(config.hmr.keep_alive_secs, 0);
        assert_eq!(config.hmr.debounce_ms, 50);
        assert_eq!(config.hmr.channel_capacity, 4);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[static]
dir = "dist"
mount = "/assets"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.static_resolved.dir, PathBuf::from("/project/dist"));
        assert_eq!(config.static_resolved.mount, "/assets");
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[server]\nport = 9000\n\n[static]\ndir = \"web\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.static_resolved.dir, dir.path().join("web"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/gweb.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[hmr]\nendpoint = \"events\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("hmr.endpoint"));
    }

    #[test]
    fn test_apply_cli_settings_multiple() {
        let mut config = Config::default_with_base(Path::new("/test"));

        let overrides = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(9000),
            static_dir: Some(PathBuf::from("/srv/www")),
            hmr_enabled: Some(false),
            hmr_endpoint: Some("/events".to_owned()),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.static_resolved.dir, PathBuf::from("/srv/www"));
        assert!(!config.hmr.enabled);
        assert_eq!(config.hmr.endpoint, "/events");
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.static_resolved.dir, PathBuf::from("/test/public"));
        assert!(config.hmr.enabled);
    }

    #[test]
    fn test_expand_env_vars_server_host() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("GWEB_CONFIG_TEST_HOST", "0.0.0.0");
        }

        let toml = r#"
[server]
host = "${GWEB_CONFIG_TEST_HOST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.server.host, "0.0.0.0");

        unsafe {
            std::env::remove_var("GWEB_CONFIG_TEST_HOST");
        }
    }

    #[test]
    fn test_hmr_url_default() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.hmr_url(), "http://127.0.0.1:8080/__hmr");
    }

    #[test]
    fn test_hmr_url_wildcard_host() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.host = "0.0.0.0".to_owned();
        config.server.port = 3000;
        config.hmr.endpoint = "/events".to_owned();
        assert_eq!(config.hmr_url(), "http://127.0.0.1:3000/events");
    }

    #[test]
    fn test_hmr_url_ipv6_host() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.host = "::1".to_owned();
        assert_eq!(config.hmr_url(), "http://[::1]:8080/__hmr");

        config.server.host = "[::1]".to_owned();
        assert_eq!(config.hmr_url(), "http://[::1]:8080/__hmr");

        config.server.host = "::".to_owned();
        assert_eq!(config.hmr_url(), "http://[::1]:8080/__hmr");
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.host = String::new();
        assert_validation_error(&config, &["server.host", "empty"]);
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;
        assert_validation_error(&config, &["server.port"]);
    }

    #[test]
    fn test_validate_endpoint_without_slash() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.hmr.endpoint = "__hmr".to_owned();
        assert_validation_error(&config, &["hmr.endpoint", "start with '/'"]);
    }

    #[test]
    fn test_validate_endpoint_root() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.hmr.endpoint = "/".to_owned();
        assert_validation_error(&config, &["hmr.endpoint"]);
    }

    #[test]
    fn test_validate_endpoint_trailing_slash() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.hmr.endpoint = "/__hmr/".to_owned();
        assert_validation_error(&config, &["hmr.endpoint", "trailing slash"]);
    }

    #[test]
    fn test_validate_channel_capacity_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.hmr.channel_capacity = 0;
        assert_validation_error(&config, &["channel_capacity"]);
    }

    #[test]
    fn test_validate_endpoint_inside_static_mount() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.hmr.endpoint = "/static/hmr".to_owned();
        assert_validation_error(&config, &["overlaps", "/static"]);
    }

    #[test]
    fn test_validate_static_mount_inside_endpoint() {
        for mount in ["/__hmr", "/__hmr/notify", "/__hmr/client.js", "/__hmr/assets"] {
            let mut config = Config::default_with_base(Path::new("/test"));
            config.static_resolved.mount = mount.to_owned();
            assert_validation_error(&config, &["overlaps", mount]);
        }
    }

    #[test]
    fn test_validate_sibling_prefix_is_not_overlap() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.static_resolved.mount = "/__hmr-assets".to_owned();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_static_mount_invalid() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.static_resolved.mount = "static".to_owned();
        assert_validation_error(&config, &["static.mount"]);
    }
}
