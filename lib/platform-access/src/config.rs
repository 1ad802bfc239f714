//! Authentication settings read from the application configuration.
//!
//! Each named provider configuration binds a provider id to the parameters
//! one deployment of that provider needs (client ids, endpoints, and so on).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A named configuration of an authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthProviderConfig {
    /// The id of the provider this configuration belongs to.
    provider: String,
    /// Disabled configurations are ignored.
    #[serde(default)]
    disabled: bool,
    /// Name shown on the sign-in screen.
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    /// Provider-specific settings.
    #[serde(default)]
    parameters: HashMap<String, String>,
}

impl AuthProviderConfig {
    /// Creates an enabled configuration for the given provider.
    #[must_use]
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            disabled: false,
            display_name: None,
            description: None,
            parameters: HashMap::new(),
        }
    }

    /// Sets the disabled flag.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a provider-specific parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Returns the provider id.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Returns true if this configuration is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the display name, if set.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the description, if set.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns a provider-specific parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Returns all provider-specific parameters.
    #[must_use]
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }
}

/// Snapshot of the authentication part of the application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    /// True while the application is in initial setup.
    #[serde(default)]
    pub configuration_mode: bool,
    /// Ids of the providers users may sign in with.
    #[serde(default)]
    pub enabled_providers: Vec<String>,
    /// Named provider configurations, keyed by configuration id.
    #[serde(default)]
    pub configurations: BTreeMap<String, AuthProviderConfig>,
}

impl AuthSettings {
    /// Returns the configurations bound to `provider_id` that are not
    /// disabled, with their ids.
    pub fn active_configurations<'a>(
        &'a self,
        provider_id: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a AuthProviderConfig)> + 'a {
        self.configurations
            .iter()
            .filter(move |(_, config)| !config.is_disabled() && config.provider() == provider_id)
            .map(|(id, config)| (id.as_str(), config))
    }
}
