//! Single sign-on short-circuit for the root page.
//!
//! The decision itself is [`resolve_sso_target`]; this module applies it to
//! a request: it finds the visitor's session, asks the provider for a
//! sign-in link, marks the session and answers with a redirect. Any failure
//! means "no redirect" and the page is served normally.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use cloudgate_platform_access::{
    Session, SignInState, SsoDecision, SsoTarget, resolve_sso_target,
};
use tracing::debug;

use crate::session_cookie;
use crate::state::AppState;

/// Returns a redirect to the single sign-on provider, or `None` if the
/// visitor should get the page instead.
pub async fn attempt_sso_redirect(state: &AppState, jar: &CookieJar) -> Option<Response> {
    let target = match resolve_sso_target(&state.auth, &state.registry) {
        SsoDecision::Redirect(target) => target,
        SsoDecision::Skip(reason) => {
            debug!(%reason, "single sign-on skipped");
            return None;
        }
    };

    let cookie_id = session_cookie::session_id(jar, &state.config.session);
    let (session, created) = state.sessions.get_or_create(cookie_id.as_ref()).await;

    let Some((location, csrf)) = redirect_location(&target, &session).await else {
        // The visitor never receives the cookie of a session created here.
        if created {
            state.sessions.remove(&session.id()).await;
        }
        return None;
    };

    state
        .sessions
        .update(&session.id(), |session| {
            session.begin_sign_in(SignInState::Global, csrf);
        })
        .await;
    debug!(
        session_id = %session.id(),
        config_id = target.config_id(),
        "redirecting to single sign-on"
    );

    let redirect = (StatusCode::FOUND, [(header::LOCATION, location)]);
    if created {
        let jar = jar
            .clone()
            .add(session_cookie::build(session.id(), &state.config.session));
        Some((jar, redirect).into_response())
    } else {
        Some(redirect.into_response())
    }
}

async fn redirect_location(
    target: &SsoTarget,
    session: &Session,
) -> Option<(HeaderValue, Option<String>)> {
    let link = match target.sign_in_link(session).await {
        Ok(Some(link)) => link,
        Ok(None) => {
            debug!(
                config_id = target.config_id(),
                authenticated = session.is_authenticated(),
                "no single sign-on link"
            );
            return None;
        }
        Err(e) => {
            debug!(
                error = %e,
                provider = target.provider_id(),
                config_id = target.config_id(),
                "failed to get single sign-on link"
            );
            return None;
        }
    };

    let (url, csrf) = link.into_parts();
    match HeaderValue::try_from(url) {
        Ok(location) => Some((location, csrf)),
        Err(e) => {
            debug!(error = %e, "single sign-on link is not a valid header value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use async_trait::async_trait;
    use axum_extra::extract::cookie::Cookie;
    use cloudgate_platform_access::{
        AuthProvider, AuthProviderConfig, AuthProviderDescriptor, AuthProviderRegistry,
        AuthenticationError, FederatedAuthProvider, SignInLink, providers,
    };
    use std::collections::HashMap;
    use std::sync::Arc;

    const LINK: &str = "https://idp.example/sso";

    struct Idp {
        link: Option<String>,
        fail: bool,
    }

    impl AuthProvider for Idp {
        fn federated(&self) -> Option<&dyn FederatedAuthProvider> {
            Some(self)
        }
    }

    #[async_trait]
    impl FederatedAuthProvider for Idp {
        async fn sign_in_link(
            &self,
            _config_id: &str,
            _config: &AuthProviderConfig,
            _params: &HashMap<String, String>,
        ) -> cloudgate_core::Result<Option<SignInLink>, AuthenticationError> {
            if self.fail {
                return Err(AuthenticationError::ProviderError {
                    provider: "idp".to_string(),
                    reason: "unreachable".to_string(),
                }
                .into());
            }
            Ok(self.link.clone().map(SignInLink::new))
        }
    }

    fn state_with(link: Option<&str>, fail: bool) -> AppState {
        let link = link.map(str::to_string);
        let registry = AuthProviderRegistry::new().with(
            AuthProviderDescriptor::new("idp", "Identity provider", move || {
                Arc::new(Idp {
                    link: link.clone(),
                    fail,
                })
            })
            .configurable(true),
        );
        let mut config = ServerConfig::default();
        config.auth.enabled_providers = vec!["idp".to_string()];
        config
            .auth
            .configurations
            .insert("corp".to_string(), AuthProviderConfig::new("idp"));
        AppState::new(config, registry)
    }

    #[tokio::test]
    async fn redirects_anonymous_visitor() {
        let state = state_with(Some(LINK), false);
        let response = attempt_sso_redirect(&state, &CookieJar::new())
            .await
            .expect("redirect");

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], LINK);

        let set_cookie = response.headers()[header::SET_COOKIE]
            .to_str()
            .expect("ascii")
            .to_string();
        let cookie = Cookie::parse(set_cookie).expect("cookie");
        assert_eq!(cookie.name(), "cb-session-id");

        let id = cookie.value().parse().expect("session id");
        let session = state.sessions.find(&id).await.expect("session stored");
        assert_eq!(session.sign_in_state(), Some(SignInState::Global));
    }

    #[tokio::test]
    async fn existing_session_gets_no_new_cookie() {
        let state = state_with(Some(LINK), false);
        let (session, _) = state.sessions.get_or_create(None).await;
        let jar = CookieJar::new().add(session_cookie::build(session.id(), &state.config.session));

        let response = attempt_sso_redirect(&state, &jar).await.expect("redirect");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(response.headers().get(header::SET_COOKIE).is_none());

        let stored = state.sessions.find(&session.id()).await.expect("session");
        assert_eq!(stored.sign_in_state(), Some(SignInState::Global));
    }

    #[tokio::test]
    async fn authenticated_visitor_is_not_redirected() {
        let state = state_with(Some(LINK), false);
        let session = Session::authenticated(cloudgate_core::SessionId::new(), "alice", ["public"]);
        let id = session.id();
        state.sessions.insert(session).await;
        let jar = CookieJar::new().add(session_cookie::build(id, &state.config.session));

        assert!(attempt_sso_redirect(&state, &jar).await.is_none());
        let stored = state.sessions.find(&id).await.expect("session");
        assert_eq!(stored.sign_in_state(), None);
    }

    #[tokio::test]
    async fn provider_failure_falls_through() {
        let state = state_with(Some(LINK), true);
        assert!(attempt_sso_redirect(&state, &CookieJar::new()).await.is_none());
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn empty_link_falls_through() {
        let state = state_with(Some(""), false);
        assert!(attempt_sso_redirect(&state, &CookieJar::new()).await.is_none());
        assert!(state.sessions.is_empty().await);

        let state = state_with(None, false);
        assert!(attempt_sso_redirect(&state, &CookieJar::new()).await.is_none());
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn unusable_link_falls_through() {
        let state = state_with(Some("https://idp.example/sso\n"), false);
        assert!(attempt_sso_redirect(&state, &CookieJar::new()).await.is_none());
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn fall_through_keeps_existing_session() {
        let state = state_with(Some(LINK), true);
        let (session, _) = state.sessions.get_or_create(None).await;
        let jar = CookieJar::new().add(session_cookie::build(session.id(), &state.config.session));

        assert!(attempt_sso_redirect(&state, &jar).await.is_none());
        assert!(state.sessions.find(&session.id()).await.is_some());
    }

    fn oauth2_state(config: AuthProviderConfig) -> AppState {
        let mut server_config = ServerConfig::default();
        server_config.auth.enabled_providers = vec!["oauth2".to_string()];
        server_config
            .auth
            .configurations
            .insert("corp".to_string(), config);
        AppState::new(server_config, providers::builtin_registry())
    }

    #[tokio::test]
    async fn incomplete_oauth2_config_leaves_no_session() {
        let state = oauth2_state(AuthProviderConfig::new("oauth2"));
        for _ in 0..3 {
            assert!(attempt_sso_redirect(&state, &CookieJar::new()).await.is_none());
        }
        assert_eq!(state.sessions.len().await, 0);
    }

    #[tokio::test]
    async fn oauth2_state_is_kept_on_session() {
        let state = oauth2_state(
            AuthProviderConfig::new("oauth2")
                .with_parameter("authorization_url", "https://idp.example/authorize")
                .with_parameter("client_id", "cloudgate")
                .with_parameter("redirect_uri", "https://app.example/auth/callback"),
        );
        let response = attempt_sso_redirect(&state, &CookieJar::new())
            .await
            .expect("redirect");

        let location = response.headers()[header::LOCATION]
            .to_str()
            .expect("ascii")
            .to_string();
        let sent_state = location
            .split_once('?')
            .map(|(_, query)| query)
            .into_iter()
            .flat_map(|query| query.split('&'))
            .find_map(|pair| pair.strip_prefix("state="))
            .expect("state parameter");

        let set_cookie = response.headers()[header::SET_COOKIE]
            .to_str()
            .expect("ascii")
            .to_string();
        let id = Cookie::parse(set_cookie)
            .expect("cookie")
            .value()
            .parse()
            .expect("session id");
        let session = state.sessions.find(&id).await.expect("session stored");
        assert_eq!(session.sign_in_state(), Some(SignInState::Global));
        assert_eq!(session.sign_in_csrf(), Some(sent_state));
    }

    #[tokio::test]
    async fn configuration_mode_disables_redirect() {
        let mut state = state_with(Some(LINK), false);
        state.auth.configuration_mode = true;
        assert!(attempt_sso_redirect(&state, &CookieJar::new()).await.is_none());
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn skip_creates_no_session() {
        let mut state = state_with(Some(LINK), false);
        state.auth.enabled_providers.push("local".to_string());
        assert!(attempt_sso_redirect(&state, &CookieJar::new()).await.is_none());
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn root_page_redirects_only_without_query() {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::write(root.path().join("index.html"), "{ROOT_URI}").expect("write index");
        let mut state = state_with(Some(LINK), false);
        state.config.content_root = root.path().to_path_buf();
        let server =
            axum_test::TestServer::new(crate::router(Arc::new(state))).expect("test server");

        let redirected = server.get("/").await;
        redirected.assert_status(StatusCode::FOUND);
        assert_eq!(redirected.header(header::LOCATION), LINK);
        assert!(redirected.maybe_header(header::SET_COOKIE).is_some());

        let served = server.get("/").add_query_param("lang", "en").await;
        served.assert_status_ok();
    }
}
