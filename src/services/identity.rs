//! Identity verification against the external identity provider.
//!
//! Every private request carries a bearer ID token. The token is sent to the
//! provider's account lookup endpoint and the principal is built from what
//! the provider returns. Nothing about the caller's identity is taken from
//! the request itself. No session state is kept between requests.

use crate::{config::IdentityConfig, models::principal::Principal};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingCredential,
    #[error("credential rejected: {0}")]
    Rejected(String),
    #[error("identity provider is not configured")]
    NotConfigured,
    #[error("identity provider request failed: {0}")]
    Provider(String),
}

/// Turns a bearer token into a verified principal.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Verifier backed by the provider's `accounts:lookup` REST endpoint.
pub struct ProviderVerifier {
    client: reqwest::Client,
    lookup_url: String,
    api_key: String,
    project_id: String,
}

impl ProviderVerifier {
    pub fn new(cfg: &IdentityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            lookup_url: format!("{}/v1/accounts:lookup", cfg.endpoint.trim_end_matches('/')),
            api_key: cfg.api_key.clone(),
            project_id: cfg.project_id.clone(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for ProviderVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let response = self
            .client
            .post(&self.lookup_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&LookupRequest { id_token: token })
            .send()
            .await
            .map_err(|err| AuthError::Provider(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            let reason = response
                .json::<ProviderErrorBody>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| "undecodable error body".into());
            tracing::debug!(project = %self.project_id, %reason, "provider refused lookup");
            return Err(classify_refusal(reason));
        }
        if !status.is_success() {
            return Err(AuthError::Provider(format!(
                "unexpected status {} from {}",
                status, self.lookup_url
            )));
        }

        let body = response
            .json::<LookupResponse>()
            .await
            .map_err(|err| AuthError::Provider(format!("undecodable lookup response: {}", err)))?;
        principal_from_lookup(body)
    }
}

/// Stand-in used when no provider credentials are configured. Public routes
/// keep working; private routes fail as a server misconfiguration.
pub struct UnconfiguredVerifier;

#[async_trait]
impl IdentityVerifier for UnconfiguredVerifier {
    async fn verify(&self, _token: &str) -> Result<Principal, AuthError> {
        Err(AuthError::NotConfigured)
    }
}

#[derive(serde::Serialize)]
struct LookupRequest<'a> {
    #[serde(rename = "idToken")]
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<ProviderUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    #[serde(default)]
    disabled: bool,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// Refusal reasons that concern the presented token or its account. Any other
/// 400 (bad or disabled API key, malformed request) is a misconfiguration.
const TOKEN_REASONS: &[&str] = &[
    "INVALID_ID_TOKEN",
    "TOKEN_EXPIRED",
    "USER_NOT_FOUND",
    "USER_DISABLED",
    "CREDENTIAL_TOO_OLD_LOGIN_AGAIN",
];

/// Provider messages look like `TOKEN_EXPIRED` or `INVALID_ID_TOKEN : detail`.
fn classify_refusal(reason: String) -> AuthError {
    let code = reason.split([' ', ':']).next().unwrap_or_default();
    if TOKEN_REASONS.contains(&code) {
        AuthError::Rejected(reason)
    } else {
        AuthError::Provider(format!("lookup refused: {}", reason))
    }
}

fn principal_from_lookup(body: LookupResponse) -> Result<Principal, AuthError> {
    let user = body
        .users
        .into_iter()
        .next()
        .ok_or_else(|| AuthError::Rejected("no account for token".into()))?;

    if user.disabled {
        return Err(AuthError::Rejected("account disabled".into()));
    }

    let email = user
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AuthError::Rejected("account has no email".into()))?;

    let display_name = user
        .display_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.clone());

    Ok(Principal {
        subject_id: user.local_id,
        email,
        display_name,
        avatar_url: user.photo_url.filter(|u| !u.is_empty()),
    })
}

/// Token-to-principal table for tests.
#[cfg(test)]
pub struct StaticVerifier {
    tokens: std::collections::HashMap<String, Principal>,
}

#[cfg(test)]
impl StaticVerifier {
    pub fn new(entries: impl IntoIterator<Item = (&'static str, Principal)>) -> Self {
        Self {
            tokens: entries
                .into_iter()
                .map(|(token, principal)| (token.to_string(), principal))
                .collect(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::Rejected("unknown token".into()))
    }
}
