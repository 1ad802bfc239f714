//! Authentication provider descriptors and registry.
//!
//! A descriptor is the static registry entry for a provider: its id, whether
//! it supports named configurations, and a factory for the runtime instance.
//! Instances are created on first use and shared afterwards.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::config::AuthProviderConfig;
use crate::error::AuthenticationError;

/// A runtime authentication provider.
pub trait AuthProvider: Send + Sync {
    /// Returns the federated capability if sign-in for this provider is
    /// hosted by an external identity provider.
    fn federated(&self) -> Option<&dyn FederatedAuthProvider> {
        None
    }
}

/// An external sign-in URL and the anti-forgery state it carries.
///
/// The state must be kept with the visitor's session so the provider's
/// callback can be matched to the redirect that started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInLink {
    url: String,
    state: Option<String>,
}

impl SignInLink {
    /// Creates a link that carries no state.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: None,
        }
    }

    /// Attaches the anti-forgery state sent along with the link.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Returns the URL to redirect to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the anti-forgery state, if the provider uses one.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// Splits the link into its URL and state.
    #[must_use]
    pub fn into_parts(self) -> (String, Option<String>) {
        (self.url, self.state)
    }
}

/// A provider whose sign-in flow is hosted externally.
#[async_trait]
pub trait FederatedAuthProvider: Send + Sync {
    /// Returns the external sign-in URL for one configuration of this
    /// provider, or `None` if the configuration offers no link.
    ///
    /// `params` are extra query parameters to forward to the identity
    /// provider.
    async fn sign_in_link(
        &self,
        config_id: &str,
        config: &AuthProviderConfig,
        params: &HashMap<String, String>,
    ) -> cloudgate_core::Result<Option<SignInLink>, AuthenticationError>;
}

type ProviderFactory = Box<dyn Fn() -> Arc<dyn AuthProvider> + Send + Sync>;

/// Static description of an authentication provider.
pub struct AuthProviderDescriptor {
    id: String,
    label: String,
    description: Option<String>,
    configurable: bool,
    factory: ProviderFactory,
    instance: OnceLock<Arc<dyn AuthProvider>>,
}

impl AuthProviderDescriptor {
    /// Creates a non-configurable descriptor.
    pub fn new<F>(id: impl Into<String>, label: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn AuthProvider> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            configurable: false,
            factory: Box::new(factory),
            instance: OnceLock::new(),
        }
    }

    /// Marks whether the provider supports named configurations.
    #[must_use]
    pub fn configurable(mut self, configurable: bool) -> Self {
        self.configurable = configurable;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the provider id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the description, if set.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns true if the provider supports named configurations.
    #[must_use]
    pub fn is_configurable(&self) -> bool {
        self.configurable
    }

    /// Returns the provider instance, creating it on first use.
    #[must_use]
    pub fn instance(&self) -> Arc<dyn AuthProvider> {
        Arc::clone(self.instance.get_or_init(|| (self.factory)()))
    }
}

impl fmt::Debug for AuthProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthProviderDescriptor")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("configurable", &self.configurable)
            .field("instantiated", &self.instance.get().is_some())
            .finish_non_exhaustive()
    }
}

/// Registry of known authentication providers, keyed by id.
#[derive(Debug, Default)]
pub struct AuthProviderRegistry {
    providers: BTreeMap<String, AuthProviderDescriptor>,
}

impl AuthProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider, replacing any provider with the same id.
    pub fn register(&mut self, descriptor: AuthProviderDescriptor) {
        self.providers.insert(descriptor.id().to_string(), descriptor);
    }

    /// Registers a provider and returns the registry.
    #[must_use]
    pub fn with(mut self, descriptor: AuthProviderDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Looks up a provider by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AuthProviderDescriptor> {
        self.providers.get(id)
    }

    /// Returns all registered provider ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}
