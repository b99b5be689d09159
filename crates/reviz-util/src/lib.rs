//! Shared utilities for reviz.
//!
//! This crate provides common utilities used across the reviz workspace:
//! - ULID-based identifier generation with prefixes
//! - Logging setup with tracing
//! - Path and resource-URI helpers

pub mod id;
pub mod log;
pub mod path;

pub use id::Identifier;
