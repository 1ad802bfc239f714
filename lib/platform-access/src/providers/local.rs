//! Local (in-process) authentication provider.

use crate::provider::AuthProvider;

/// Registry id of the local provider.
pub const LOCAL_PROVIDER_ID: &str = "local";

/// Provider for users whose credentials are checked by cloudgate itself.
///
/// It has no external sign-in page, so it never takes part in the single
/// sign-on redirect.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAuthProvider;

impl AuthProvider for LocalAuthProvider {}
