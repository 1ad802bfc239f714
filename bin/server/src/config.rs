//! Centralized server configuration.
//!
//! Loaded via the `config` crate from an optional file named by
//! `CLOUDGATE_CONFIG`, then from environment variables. Nested keys use a
//! double underscore, e.g. `SESSION__COOKIE_NAME`.

use cloudgate_platform_access::{AuthProviderConfig, AuthSettings};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable naming an optional configuration file.
pub const CONFIG_FILE_ENV: &str = "CLOUDGATE_CONFIG";

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Public path prefix of the application, substituted for `{ROOT_URI}`
    /// in entry pages.
    #[serde(default)]
    pub root_uri: String,

    /// Directory the web client is served from.
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,

    /// True during initial setup. Single sign-on is disabled in this mode.
    #[serde(default)]
    pub configuration_mode: bool,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Sessions idle for longer than this are discarded.
    #[serde(default = "default_idle_timeout_minutes")]
    pub idle_timeout_minutes: i64,

    /// Interval between session cleanup runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Name of the cookie carrying the session id.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

/// Authentication providers users may sign in with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub enabled_providers: Vec<String>,

    /// Named provider configurations, keyed by configuration id.
    #[serde(default)]
    pub configurations: BTreeMap<String, AuthProviderConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Permission ids added to the built-in catalog.
    #[serde(default)]
    pub permissions: Vec<String>,
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8978))
}

fn default_content_root() -> PathBuf {
    PathBuf::from("web")
}

fn default_idle_timeout_minutes() -> i64 {
    30
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_cookie_name() -> String {
    "cb-session-id".to_string()
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            cookie_name: default_cookie_name(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

impl SessionConfig {
    /// Returns the idle timeout as a duration.
    ///
    /// Values rejected by [`SessionConfig::validate`] fall back to the
    /// default of 30 minutes.
    #[must_use]
    pub fn idle_timeout(&self) -> chrono::Duration {
        checked_minutes(self.idle_timeout_minutes)
            .unwrap_or_else(|| chrono::Duration::minutes(default_idle_timeout_minutes()))
    }

    /// Rejects values the session manager and cleanup task cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error if the idle timeout is not a positive number of
    /// minutes within range, or the cleanup interval is zero.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if checked_minutes(self.idle_timeout_minutes).is_none() {
            return Err(config::ConfigError::Message(format!(
                "session.idle_timeout_minutes must be a positive number of minutes, got {}",
                self.idle_timeout_minutes
            )));
        }
        if self.cleanup_interval_seconds == 0 {
            return Err(config::ConfigError::Message(
                "session.cleanup_interval_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn checked_minutes(minutes: i64) -> Option<chrono::Duration> {
    if minutes <= 0 {
        return None;
    }
    chrono::Duration::try_minutes(minutes)
}

impl ServerConfig {
    /// Loads configuration from the optional config file and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value is invalid.
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.add_source(config::File::with_name(&path));
        }
        Self::from_builder(
            builder.add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("auth.enabled_providers")
                    .with_list_parse_key("admin.permissions"),
            ),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        let mut config: Self = builder.build()?.try_deserialize()?;
        config.session.validate()?;
        config.root_uri = normalize_root_uri(&config.root_uri);
        Ok(config)
    }

    /// Returns the authentication settings snapshot used by single sign-on.
    #[must_use]
    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            configuration_mode: self.configuration_mode,
            enabled_providers: self.auth.enabled_providers.clone(),
            configurations: self.auth.configurations.clone(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            root_uri: String::new(),
            content_root: default_content_root(),
            configuration_mode: false,
            session: SessionConfig::default(),
            auth: AuthConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

/// Strips trailing slashes and ensures a leading one, so `app/` and `/app`
/// both become `/app`. The site root is the empty string.
#[must_use]
pub fn normalize_root_uri(root_uri: &str) -> String {
    let trimmed = root_uri.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
