//! Infrastructure layer for cross-cutting concerns.
//!
//! Provides foundational infrastructure including:
//! - Configuration management and validation
//! - Error handling and result types
//! - PEM loading of keys and certificates

pub mod config;
pub mod error;
pub mod pem;
