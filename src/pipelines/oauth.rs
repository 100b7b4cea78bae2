//! `EsiaOAuthFlow`: per-request parameters for the provider's OAuth2 flow.
//!
//! Composes the client-secret builder and the token verifier; the HTTP
//! exchange itself belongs to whatever OAuth2 client the caller uses. Every
//! call carries its own suite through the builder, so concurrent requests
//! with different suites cannot interfere.

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::domain::crypto::{CertificateChain, SignatureSuite};
use crate::domain::verification::VerificationOutcome;
use crate::infra::config::EsiaConfiguration;
use crate::infra::error::{EsiaError, EsiaResult};
use crate::infra::pem;
use crate::services::codec;
use crate::services::signed_message_builder::ClientSecretBuilder;
use crate::services::token_verifier::TokenVerifier;

/// Extra parameters for the authorization redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationParams {
    pub timestamp: String,
    pub access_type: String,
    pub client_secret: String,
}

/// Extra parameters for the token endpoint request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenParams {
    pub timestamp: String,
    pub scope: String,
    pub state: String,
    pub token_type: String,
    pub client_secret: String,
}

/// Client-side OAuth2 parameter flow for one registered client.
#[derive(Clone)]
pub struct EsiaOAuthFlow {
    client_id: String,
    scope: String,
    callback_url: String,
    access_type: String,
    authorization_url: Url,
    token_url: Url,
    builder: ClientSecretBuilder,
    private_key: Vec<u8>,
    provider_public_key: Option<Vec<u8>>,
}

fn parse_url(field: &str, value: &str) -> EsiaResult<Url> {
    Url::parse(value)
        .map_err(|e| EsiaError::ConfigurationError(format!("Invalid {field} '{value}': {e}")))
}

impl EsiaOAuthFlow {
    /// Build from configuration plus already decoded key material.
    pub fn new(
        config: &EsiaConfiguration,
        certificates: Vec<Vec<u8>>,
        private_key_pkcs8: Vec<u8>,
        provider_public_key: Option<Vec<u8>>,
    ) -> EsiaResult<Self> {
        if config.client_id.trim().is_empty() {
            return Err(EsiaError::ConfigurationError(
                "client_id is not set".to_string(),
            ));
        }
        if config.callback_url.trim().is_empty() {
            return Err(EsiaError::ConfigurationError(
                "callback_url is not set".to_string(),
            ));
        }
        if private_key_pkcs8.is_empty() {
            return Err(EsiaError::ConfigurationError(
                "Private key is empty".to_string(),
            ));
        }
        let chain = CertificateChain::new(certificates)?;

        Ok(Self {
            client_id: config.client_id.clone(),
            scope: config.scope.clone(),
            callback_url: config.callback_url.clone(),
            access_type: config.access_type.clone(),
            authorization_url: parse_url("authorization_url", &config.authorization_url)?,
            token_url: parse_url("token_url", &config.token_url)?,
            builder: ClientSecretBuilder::new(chain, config.suite),
            private_key: private_key_pkcs8,
            provider_public_key,
        })
    }

    /// Build from configuration, reading the PEM files it points to.
    pub fn from_config(config: &EsiaConfiguration) -> EsiaResult<Self> {
        config.require_client_registration()?;
        let certificates = pem::load_certificates(&config.certificate_path)?;
        let private_key = pem::load_private_key(&config.private_key_path)?;
        let provider_public_key = config
            .provider_public_key_path
            .as_deref()
            .map(pem::load_public_key)
            .transpose()?;
        Self::new(config, certificates, private_key, provider_public_key)
    }

    /// Fresh random state for requests that do not bring their own.
    #[must_use]
    pub fn new_state() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    #[must_use]
    pub fn suite(&self) -> SignatureSuite {
        self.builder.suite()
    }

    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Signed secret for `timestamp` and `state`.
    pub fn client_secret(&self, timestamp: &str, state: &str) -> EsiaResult<String> {
        let secret = self.builder.build_client_secret(
            &self.scope,
            timestamp,
            &self.client_id,
            state,
            &self.private_key,
        )?;
        log::info!(
            "Client secret built for client {} ({})",
            self.client_id,
            self.suite()
        );
        Ok(secret)
    }

    pub fn authorization_params(
        &self,
        state: &str,
        access_type: Option<&str>,
    ) -> EsiaResult<AuthorizationParams> {
        let timestamp = codec::timestamp_now();
        let client_secret = self.client_secret(&timestamp, state)?;
        Ok(AuthorizationParams {
            timestamp,
            access_type: access_type.unwrap_or(&self.access_type).to_string(),
            client_secret,
        })
    }

    pub fn token_params(&self, state: &str) -> EsiaResult<TokenParams> {
        let timestamp = codec::timestamp_now();
        let client_secret = self.client_secret(&timestamp, state)?;
        Ok(TokenParams {
            timestamp,
            scope: self.scope.clone(),
            state: state.to_string(),
            token_type: "Bearer".to_string(),
            client_secret,
        })
    }

    /// Authorization redirect URL with the standard OAuth2 parameters and a
    /// freshly signed secret.
    pub fn authorization_url(&self, state: &str, access_type: Option<&str>) -> EsiaResult<Url> {
        let params = self.authorization_params(state, access_type)?;
        let mut url = self.authorization_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.callback_url)
            .append_pair("scope", &self.scope)
            .append_pair("state", state)
            .append_pair("timestamp", &params.timestamp)
            .append_pair("access_type", &params.access_type)
            .append_pair("client_secret", &params.client_secret);
        Ok(url)
    }

    /// Claims of an access token, verified against the provider key when one
    /// is configured.
    pub fn user_profile(&self, access_token: &str) -> EsiaResult<Map<String, Value>> {
        if access_token.trim().is_empty() {
            return Err(EsiaError::MalformedTokenError(
                "Got empty access token from provider".to_string(),
            ));
        }
        let verified = TokenVerifier::new().verify(access_token, self.provider_public_key.as_deref())?;
        match verified.outcome {
            VerificationOutcome::SignatureMismatch => {
                log::debug!("Rejected token claims: {:?}", verified.claims);
                Err(EsiaError::SignatureMismatch)
            }
            _ => Ok(verified.claims),
        }
    }

    /// [`Self::authorization_params`] on the blocking pool.
    pub async fn authorization_params_async(
        &self,
        state: String,
        access_type: Option<String>,
    ) -> EsiaResult<AuthorizationParams> {
        let flow = self.clone();
        run_blocking(move || flow.authorization_params(&state, access_type.as_deref())).await
    }

    /// [`Self::token_params`] on the blocking pool.
    pub async fn token_params_async(&self, state: String) -> EsiaResult<TokenParams> {
        let flow = self.clone();
        run_blocking(move || flow.token_params(&state)).await
    }

    /// [`Self::user_profile`] on the blocking pool.
    pub async fn user_profile_async(&self, access_token: String) -> EsiaResult<Map<String, Value>> {
        let flow = self.clone();
        run_blocking(move || flow.user_profile(&access_token)).await
    }
}

async fn run_blocking<T, F>(task: F) -> EsiaResult<T>
where
    F: FnOnce() -> EsiaResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| EsiaError::SigningError(format!("Signing task failed: {e}")))?
}

impl std::fmt::Debug for EsiaOAuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsiaOAuthFlow")
            .field("client_id", &self.client_id)
            .field("suite", &self.suite())
            .field("authorization_url", &self.authorization_url.as_str())
            .field("has_provider_key", &self.provider_public_key.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EsiaConfiguration {
        EsiaConfiguration {
            client_id: "ABC123".to_string(),
            callback_url: "https://client.example/callback".to_string(),
            ..EsiaConfiguration::default()
        }
    }

    #[test]
    fn test_new_rejects_missing_material() {
        let cert = vec![vec![0x30, 0x00]];
        assert!(matches!(
            EsiaOAuthFlow::new(&config(), Vec::new(), vec![1], None),
            Err(EsiaError::ConfigurationError(_))
        ));
        assert!(matches!(
            EsiaOAuthFlow::new(&config(), cert.clone(), Vec::new(), None),
            Err(EsiaError::ConfigurationError(_))
        ));
        let no_client = EsiaConfiguration {
            client_id: String::new(),
            ..config()
        };
        assert!(EsiaOAuthFlow::new(&no_client, cert, vec![1], None).is_err());
    }

    #[test]
    fn test_new_state_is_uuid_v4() {
        let state = EsiaOAuthFlow::new_state();
        let parsed = uuid::Uuid::parse_str(&state).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_ne!(state, EsiaOAuthFlow::new_state());
    }

    #[test]
    fn test_empty_access_token_is_malformed() {
        let flow = EsiaOAuthFlow::new(&config(), vec![vec![0x30, 0x00]], vec![1], None).unwrap();
        assert!(matches!(
            flow.user_profile("  "),
            Err(EsiaError::MalformedTokenError(_))
        ));
    }
}
