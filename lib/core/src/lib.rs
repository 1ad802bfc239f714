//! Core types and utilities shared by the cloudgate crates.
//!
//! This crate provides the error-handling foundation and the identifier
//! types used across the static content responder and the admin service.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ParseIdError, SessionId};
