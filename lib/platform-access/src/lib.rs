//! Sessions, authentication providers, and single sign-on for cloudgate.
//!
//! This crate provides:
//! - Client sessions (`Session`, `SignInState`) and the in-process
//!   `SessionManager` that owns them
//! - Authentication provider configuration (`AuthProviderConfig`,
//!   `AuthSettings`)
//! - The provider registry (`AuthProviderDescriptor`, `AuthProviderRegistry`)
//!   and the built-in `local` and `oauth2` providers
//! - The single sign-on short-circuit decision (`resolve_sso_target`)
//!
//! # Signing users in
//!
//! Sessions start anonymous. This crate does not complete a sign-in itself:
//! the component that handles a provider's callback verifies the
//! [`Session::sign_in_csrf`] state left by the redirect, then calls
//! [`Session::sign_in`] through [`SessionManager::update`], or stores a
//! session built with [`Session::authenticated`] via
//! [`SessionManager::insert`]. Those calls are the integration seam for an
//! identity backend; admin operations reject sessions without a user.
//!
//! # Example
//!
//! ```
//! use cloudgate_platform_access::{
//!     AuthProviderConfig, AuthSettings, SsoDecision, providers, resolve_sso_target,
//! };
//!
//! let registry = providers::builtin_registry();
//!
//! let mut settings = AuthSettings::default();
//! settings.enabled_providers.push("oauth2".to_string());
//! settings.configurations.insert(
//!     "corp".to_string(),
//!     AuthProviderConfig::new("oauth2")
//!         .with_parameter("authorization_url", "https://idp.example/authorize")
//!         .with_parameter("client_id", "cloudgate")
//!         .with_parameter("redirect_uri", "https://app.example/auth/callback"),
//! );
//!
//! match resolve_sso_target(&settings, &registry) {
//!     SsoDecision::Redirect(target) => assert_eq!(target.config_id(), "corp"),
//!     SsoDecision::Skip(reason) => panic!("unexpected skip: {reason}"),
//! }
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod provider;
pub mod providers;
pub mod session;
pub mod sso;

// Re-export main types at crate root
pub use config::{AuthProviderConfig, AuthSettings};
pub use error::AuthenticationError;
pub use manager::SessionManager;
pub use provider::{
    AuthProvider, AuthProviderDescriptor, AuthProviderRegistry, FederatedAuthProvider, SignInLink,
};
pub use session::{Session, SignInState};
pub use sso::{SsoDecision, SsoSkip, SsoTarget, resolve_sso_target};
