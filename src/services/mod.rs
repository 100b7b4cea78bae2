//! Service layer module root.
//! Contains the crypto engines plus the signing, inspection and verification services.

pub mod codec;
pub mod crypto_engine;
pub mod message_inspector;
pub mod signed_message_builder;
pub mod token_verifier;

pub use crypto_engine::{engine_for, CryptoEngine, SignatureParameters, SuiteAlgorithms};
pub use message_inspector::{SignedMessageInspector, SignedMessageSummary};
pub use signed_message_builder::ClientSecretBuilder;
pub use token_verifier::TokenVerifier;
