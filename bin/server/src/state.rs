//! Shared application state.

use cloudgate_admin::{AdminDispatcher, InMemoryAdminService};
use cloudgate_platform_access::{AuthProviderRegistry, AuthSettings, SessionManager};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::static_content::EntryPageCache;

/// State shared by all request handlers.
pub struct AppState {
    pub config: ServerConfig,
    /// Authentication snapshot taken from `config` at startup.
    pub auth: AuthSettings,
    pub registry: AuthProviderRegistry,
    pub sessions: SessionManager,
    pub admin: AdminDispatcher,
    pub entry_pages: EntryPageCache,
}

impl AppState {
    /// Creates the state with an in-memory admin store.
    pub fn new(config: ServerConfig, registry: AuthProviderRegistry) -> Self {
        let service =
            InMemoryAdminService::new().with_permissions(config.admin.permissions.clone());
        Self {
            auth: config.auth_settings(),
            sessions: SessionManager::new(config.session.idle_timeout()),
            admin: AdminDispatcher::new(Arc::new(service)),
            entry_pages: EntryPageCache::default(),
            config,
            registry,
        }
    }
}
