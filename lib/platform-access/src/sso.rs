//! Single sign-on short-circuit decision.
//!
//! When a deployment has exactly one usable federated provider, anonymous
//! visitors of the entry page are sent straight to that provider's sign-in
//! page instead of the provider selection screen. The decision only reads the
//! settings snapshot and the provider registry; the session and HTTP side
//! effects belong to the caller.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

use crate::config::{AuthProviderConfig, AuthSettings};
use crate::error::AuthenticationError;
use crate::provider::{AuthProvider, AuthProviderRegistry, SignInLink};
use crate::session::Session;

/// Why the short-circuit does not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsoSkip {
    /// The application is still in initial setup.
    ConfigurationMode,
    /// Not exactly one provider is enabled.
    ProviderCount(usize),
    /// The enabled provider is not in the registry.
    UnknownProvider(String),
    /// The enabled provider has no named configurations.
    NotConfigurable(String),
    /// No enabled configuration is bound to the provider.
    NoActiveConfiguration(String),
    /// More than one enabled configuration is bound to the provider.
    AmbiguousConfiguration(String),
    /// The provider signs users in locally.
    NotFederated(String),
}

impl fmt::Display for SsoSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationMode => write!(f, "application is in configuration mode"),
            Self::ProviderCount(count) => write!(f, "{count} auth providers enabled"),
            Self::UnknownProvider(id) => write!(f, "auth provider '{id}' is not registered"),
            Self::NotConfigurable(id) => write!(f, "auth provider '{id}' is not configurable"),
            Self::NoActiveConfiguration(id) => {
                write!(f, "auth provider '{id}' has no active configuration")
            }
            Self::AmbiguousConfiguration(id) => {
                write!(f, "auth provider '{id}' has several active configurations")
            }
            Self::NotFederated(id) => write!(f, "auth provider '{id}' is not federated"),
        }
    }
}

/// The provider configuration a visitor should be redirected to.
#[derive(Clone)]
pub struct SsoTarget {
    provider_id: String,
    config_id: String,
    config: AuthProviderConfig,
    provider: Arc<dyn AuthProvider>,
}

impl SsoTarget {
    /// Returns the provider id.
    #[must_use]
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Returns the configuration id.
    #[must_use]
    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &AuthProviderConfig {
        &self.config
    }

    /// Requests the sign-in link for `session`.
    ///
    /// Returns `None` if the session already has a user or the provider
    /// returned no link or one with an empty URL.
    pub async fn sign_in_link(
        &self,
        session: &Session,
    ) -> cloudgate_core::Result<Option<SignInLink>, AuthenticationError> {
        if session.is_authenticated() {
            return Ok(None);
        }
        let Some(federated) = self.provider.federated() else {
            return Ok(None);
        };
        let link = federated
            .sign_in_link(&self.config_id, &self.config, &HashMap::new())
            .await?;
        Ok(link.filter(|link| !link.url().is_empty()))
    }
}

impl fmt::Debug for SsoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsoTarget")
            .field("provider_id", &self.provider_id)
            .field("config_id", &self.config_id)
            .finish_non_exhaustive()
    }
}

/// Outcome of the single sign-on decision.
#[derive(Debug, Clone)]
pub enum SsoDecision {
    /// Redirect anonymous visitors to this target.
    Redirect(SsoTarget),
    /// Serve the entry page normally.
    Skip(SsoSkip),
}

/// Decides whether the entry page should short-circuit to a single federated
/// provider.
#[instrument(skip_all, level = "debug")]
pub fn resolve_sso_target(settings: &AuthSettings, registry: &AuthProviderRegistry) -> SsoDecision {
    if settings.configuration_mode {
        return SsoDecision::Skip(SsoSkip::ConfigurationMode);
    }

    let [provider_id] = settings.enabled_providers.as_slice() else {
        return SsoDecision::Skip(SsoSkip::ProviderCount(settings.enabled_providers.len()));
    };

    let Some(descriptor) = registry.get(provider_id) else {
        return SsoDecision::Skip(SsoSkip::UnknownProvider(provider_id.clone()));
    };
    if !descriptor.is_configurable() {
        return SsoDecision::Skip(SsoSkip::NotConfigurable(provider_id.clone()));
    }

    let mut active = settings.active_configurations(provider_id);
    let Some((config_id, config)) = active.next() else {
        return SsoDecision::Skip(SsoSkip::NoActiveConfiguration(provider_id.clone()));
    };
    if active.next().is_some() {
        return SsoDecision::Skip(SsoSkip::AmbiguousConfiguration(provider_id.clone()));
    }

    let provider = descriptor.instance();
    if provider.federated().is_none() {
        return SsoDecision::Skip(SsoSkip::NotFederated(provider_id.clone()));
    }

    SsoDecision::Redirect(SsoTarget {
        provider_id: provider_id.clone(),
        config_id: config_id.to_string(),
        config: config.clone(),
        provider,
    })
}
