//! cloudgate web server.
//!
//! Serves the web client from a content root, redirects first-time visitors
//! to a single sign-on provider when exactly one is configured, and exposes
//! the admin service over JSON.

pub mod admin_api;
pub mod config;
pub mod error;
pub mod session_cookie;
pub mod sso;
pub mod state;
pub mod static_content;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/admin", post(admin_api::dispatch))
        .route("/api/admin/operations", get(admin_api::operations))
        .fallback(static_content::serve)
        .with_state(state)
}
