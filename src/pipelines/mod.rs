//! Workflow pipelines orchestrating stateless services.

pub mod oauth;

pub use oauth::{AuthorizationParams, EsiaOAuthFlow, TokenParams};
