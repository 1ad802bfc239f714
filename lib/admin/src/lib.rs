//! User, role, and permission administration.
//!
//! [`AdminService`] is the contract, [`InMemoryAdminService`] the
//! process-local implementation, and [`AdminDispatcher`] the entry point
//! that enforces each [`AdminOperation`]'s permission requirement before
//! the service runs.

pub mod dispatch;
pub mod error;
pub mod model;
pub mod permission;
pub mod service;
pub mod store;

pub use dispatch::{AdminDispatcher, AdminRequest, AdminResponse, OperationInfo};
pub use error::{AdminError, AdminErrorKind};
pub use model::{AdminPermissionInfo, AdminRoleInfo, AdminUserInfo};
pub use permission::{AdminOperation, PERMISSION_ADMIN};
pub use service::AdminService;
pub use store::{InMemoryAdminService, PERMISSION_PUBLIC};
