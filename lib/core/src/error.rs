//! Error handling foundation for cloudgate.
//!
//! This module provides only the `Result` type alias using rootcause.
//! Each crate defines its own domain error types and wraps them in a
//! `Report` at the points where they cross a crate boundary.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
