//! Built-in authentication providers.
//!
//! - `local`: credentials checked in-process; not configurable, not federated.
//! - `oauth2`: sign-in hosted by an external OAuth2/OIDC authorization server;
//!   configurable and federated.

mod local;
mod oauth;

pub use local::{LOCAL_PROVIDER_ID, LocalAuthProvider};
pub use oauth::{OAUTH2_PROVIDER_ID, OAuth2AuthProvider, OAuth2Settings};

use crate::provider::{AuthProviderDescriptor, AuthProviderRegistry};
use std::sync::Arc;

/// Creates a registry containing every built-in provider.
#[must_use]
pub fn builtin_registry() -> AuthProviderRegistry {
    AuthProviderRegistry::new()
        .with(
            AuthProviderDescriptor::new(LOCAL_PROVIDER_ID, "Local", || {
                Arc::new(LocalAuthProvider)
            })
            .with_description("User name and password stored by cloudgate"),
        )
        .with(
            AuthProviderDescriptor::new(OAUTH2_PROVIDER_ID, "OAuth 2.0", || {
                Arc::new(OAuth2AuthProvider)
            })
            .configurable(true)
            .with_description("Sign in through an external OAuth 2.0 / OpenID Connect server"),
        )
}
