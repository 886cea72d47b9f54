//! CSP token exchange for VMware Cloud Services.
//!
//! Exchanges a long-lived API refresh token for a short-lived access token.

use crate::config::ApiToken;
use crate::error::AuthError;
use anyhow::{Context, Result};
use std::time::Duration;

/// CSP endpoint that authorizes API refresh tokens.
const AUTHORIZE_PATH: &str = "/csp/gateway/am/api/auth/api-tokens/authorize";

/// HTTP request timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the CSP authorization service.
pub struct CspClient {
    http_client: reqwest::Client,
}

impl CspClient {
    /// Create a new CSP client.
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http_client })
    }

    /// Exchange an API refresh token for an access token.
    ///
    /// The refresh token travels only in the form body and is never logged.
    pub async fn exchange_api_token(
        &self,
        csp_base_url: &str,
        refresh_token: &ApiToken,
    ) -> Result<TokenResponse, AuthError> {
        let token_endpoint = format!("{}{}", csp_base_url, AUTHORIZE_PATH);

        let params = [("refresh_token", refresh_token.expose())];

        tracing::debug!("Requesting access token from {}", token_endpoint);

        let response = self
            .http_client
            .post(&token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::TokenExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            // Log error details for debugging (doesn't expose to user)
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!("Token exchange failed: HTTP {} - {}", status, error_body);
            return Err(AuthError::TokenExchangeFailed(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::TokenExchangeFailed(e.to_string()))?;

        tracing::info!(
            "Acquired access token, expires in {}s",
            token_response.expires_in
        );

        Ok(token_response)
    }
}

/// Token response from the CSP authorization service.
#[derive(Debug, serde::Deserialize)]
#[allow(dead_code)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
}
