//! HTTP surface of the admin service.

use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use cloudgate_admin::{AdminDispatcher, AdminRequest, AdminResponse, OperationInfo};
use std::sync::Arc;
use tracing::instrument;

use crate::error::AdminApiError;
use crate::session_cookie;
use crate::state::AppState;

/// Runs one admin operation on behalf of the caller's session.
///
/// No session is created here; a request without a live session is
/// rejected by the dispatcher.
#[instrument(skip_all, fields(operation = %request.operation()))]
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<AdminRequest>,
) -> Result<Json<AdminResponse>, AdminApiError> {
    let session = match session_cookie::session_id(&jar, &state.config.session) {
        Some(id) => state.sessions.find(&id).await,
        None => None,
    };
    let response = state.admin.dispatch(session.as_ref(), request).await?;
    Ok(Json(response))
}

/// Lists every admin operation with the permissions it requires.
pub async fn operations() -> Json<Vec<OperationInfo>> {
    Json(AdminDispatcher::operations())
}

#[cfg(test)]
mod tests {
    use crate::config::ServerConfig;
    use crate::router;
    use crate::session_cookie;
    use crate::state::AppState;
    use axum::http::StatusCode;
    use axum_test::{TestResponse, TestServer};
    use cloudgate_admin::PERMISSION_ADMIN;
    use cloudgate_core::SessionId;
    use cloudgate_platform_access::Session;
    use cloudgate_platform_access::providers::builtin_registry;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(ServerConfig::default(), builtin_registry()))
    }

    fn server(state: &Arc<AppState>) -> TestServer {
        TestServer::new(router(Arc::clone(state))).expect("test server")
    }

    async fn signed_in(state: &AppState, permissions: &[&str]) -> String {
        let session = Session::authenticated(SessionId::new(), "root", permissions.iter().copied());
        let cookie = session_cookie::build(session.id(), &state.config.session);
        state.sessions.insert(session).await;
        cookie.stripped().to_string()
    }

    async fn post(server: &TestServer, cookie: Option<&str>, body: Value) -> TestResponse {
        let mut request = server.post("/api/admin").json(&body);
        if let Some(cookie) = cookie {
            request = request.add_header("cookie", cookie);
        }
        request.await
    }

    #[tokio::test]
    async fn operations_lists_permission_table() {
        let response = server(&state()).get("/api/admin/operations").await;
        response.assert_status_ok();

        let json: Value = response.json();
        let table = json.as_array().expect("array");
        assert_eq!(table.len(), 10);
        assert_eq!(table[0]["operation"], "listUsers");
        assert_eq!(table[0]["requiredPermissions"], json!(["admin"]));
    }

    #[tokio::test]
    async fn request_without_session_is_unauthorized() {
        let response = post(&server(&state()), None, json!({ "operation": "listPermissions" })).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"], "unauthenticated");
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let state = state();
        let cookie = signed_in(&state, &["public"]).await;
        let response = post(
            &server(&state),
            Some(&cookie),
            json!({ "operation": "createUser", "params": { "userId": "bob" } }),
        )
        .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_creates_and_lists_users() {
        let state = state();
        let cookie = signed_in(&state, &[PERMISSION_ADMIN]).await;
        let server = server(&state);

        let created = post(
            &server,
            Some(&cookie),
            json!({ "operation": "createUser", "params": { "userId": "bob" } }),
        )
        .await;
        created.assert_status_ok();
        assert_eq!(created.json::<Value>()["userId"], "bob");

        let listed = post(
            &server,
            Some(&cookie),
            json!({ "operation": "listUsers", "params": {} }),
        )
        .await;
        let users: Value = listed.json();
        assert_eq!(users.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn deleting_unknown_user_is_not_found() {
        let state = state();
        let cookie = signed_in(&state, &[PERMISSION_ADMIN]).await;
        let response = post(
            &server(&state),
            Some(&cookie),
            json!({ "operation": "deleteUser", "params": { "userId": "ghost" } }),
        )
        .await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "user 'ghost' not found");
    }

    #[tokio::test]
    async fn admin_request_creates_no_session() {
        let state = state();
        post(
            &server(&state),
            None,
            json!({ "operation": "listRoles", "params": {} }),
        )
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
        assert!(state.sessions.is_empty().await);
    }
}
