//! OAuth 2.0 federated provider.
//!
//! Each named configuration of this provider describes one authorization
//! server. The sign-in link is the server's authorization URL for the
//! authorization-code flow, built with the `oauth2` crate.

use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, CsrfToken, RedirectUrl, Scope};
use std::collections::HashMap;
use tracing::debug;

use crate::config::AuthProviderConfig;
use crate::error::AuthenticationError;
use crate::provider::{AuthProvider, FederatedAuthProvider, SignInLink};

/// Registry id of the OAuth 2.0 provider.
pub const OAUTH2_PROVIDER_ID: &str = "oauth2";

const PARAM_AUTHORIZATION_URL: &str = "authorization_url";
const PARAM_CLIENT_ID: &str = "client_id";
const PARAM_REDIRECT_URI: &str = "redirect_uri";
const PARAM_SCOPES: &str = "scopes";

const DEFAULT_SCOPES: &str = "openid,email,profile";

/// Settings of one OAuth 2.0 configuration, read from its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth2Settings {
    authorization_url: String,
    client_id: String,
    redirect_uri: String,
    /// Comma-separated scopes.
    scopes: String,
}

impl OAuth2Settings {
    /// Reads and validates the settings of configuration `config_id`.
    pub fn from_config(
        config_id: &str,
        config: &AuthProviderConfig,
    ) -> Result<Self, AuthenticationError> {
        let required = |parameter: &str| {
            config
                .parameter(parameter)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or_else(|| AuthenticationError::MissingParameter {
                    config_id: config_id.to_string(),
                    parameter: parameter.to_string(),
                })
        };

        let authorization_url = required(PARAM_AUTHORIZATION_URL)?;
        let client_id = required(PARAM_CLIENT_ID)?;
        let redirect_uri = required(PARAM_REDIRECT_URI)?;
        let scopes = config
            .parameter(PARAM_SCOPES)
            .unwrap_or(DEFAULT_SCOPES)
            .to_string();

        let invalid = |parameter: &str, reason: String| AuthenticationError::InvalidParameter {
            config_id: config_id.to_string(),
            parameter: parameter.to_string(),
            reason,
        };
        AuthUrl::new(authorization_url.clone())
            .map_err(|e| invalid(PARAM_AUTHORIZATION_URL, e.to_string()))?;
        RedirectUrl::new(redirect_uri.clone())
            .map_err(|e| invalid(PARAM_REDIRECT_URI, e.to_string()))?;

        Ok(Self {
            authorization_url,
            client_id,
            redirect_uri,
            scopes,
        })
    }

    /// Returns the authorization endpoint.
    #[must_use]
    pub fn authorization_url(&self) -> &str {
        &self.authorization_url
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the redirect URI registered with the authorization server.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the scopes to request.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|scope| !scope.is_empty())
            .collect()
    }

    /// Builds the authorization URL, forwarding `params` as extra query
    /// parameters. The link carries the random `state` sent to the
    /// authorization server.
    pub fn sign_in_url(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<SignInLink, AuthenticationError> {
        let provider_error = |reason: String| AuthenticationError::ProviderError {
            provider: OAUTH2_PROVIDER_ID.to_string(),
            reason,
        };

        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_auth_uri(
                AuthUrl::new(self.authorization_url.clone())
                    .map_err(|e| provider_error(e.to_string()))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_uri.clone())
                    .map_err(|e| provider_error(e.to_string()))?,
            );

        let mut request = client.authorize_url(CsrfToken::new_random);
        for scope in self.scopes() {
            request = request.add_scope(Scope::new(scope.to_string()));
        }
        for (name, value) in params {
            request = request.add_extra_param(name.as_str(), value.as_str());
        }

        let (url, csrf_token) = request.url();
        Ok(SignInLink::new(url.to_string()).with_state(csrf_token.secret().clone()))
    }
}

/// Provider that hands sign-in off to an OAuth 2.0 authorization server.
#[derive(Debug, Clone, Copy, Default)]
pub struct OAuth2AuthProvider;

impl AuthProvider for OAuth2AuthProvider {
    fn federated(&self) -> Option<&dyn FederatedAuthProvider> {
        Some(self)
    }
}

#[async_trait]
impl FederatedAuthProvider for OAuth2AuthProvider {
    async fn sign_in_link(
        &self,
        config_id: &str,
        config: &AuthProviderConfig,
        params: &HashMap<String, String>,
    ) -> cloudgate_core::Result<Option<SignInLink>, AuthenticationError> {
        let settings = OAuth2Settings::from_config(config_id, config)?;
        let link = settings.sign_in_url(params)?;
        debug!(
            config_id,
            client_id = settings.client_id(),
            "built OAuth2 sign-in link"
        );
        Ok(Some(link))
    }
}
