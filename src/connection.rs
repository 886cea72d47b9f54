//! Process-wide VMware Cloud connection state.
//!
//! [`connect`] exchanges the refresh token once and stores the resulting
//! connection globally; both reporters read it back with [`get_connection`].

use crate::auth::csp::CspClient;
use crate::config::Config;
use crate::error::{AppError, AuthError};
use once_cell::sync::OnceCell;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use std::sync::Arc;

/// Request header carrying the short-lived CSP access token.
const CSP_AUTH_TOKEN_HEADER: &str = "csp-auth-token";

/// Global connection, set once per process.
static CONNECTION: OnceCell<Arc<VmcConnection>> = OnceCell::new();

/// An authenticated connection to VMware Cloud on AWS.
///
/// Lives for the whole process; there is no teardown.
#[derive(Debug, Clone)]
pub struct VmcConnection {
    /// CSP base URL the token was issued by.
    pub csp_server: String,
    /// VMware Cloud API base URL.
    pub vmc_server: String,
    /// Organization the reports run against.
    pub org_id: String,
    /// Headers bag sent with every API request.
    pub headers: HeaderMap,
}

/// Authenticate against CSP and store the connection globally.
pub async fn connect(config: &Config) -> Result<Arc<VmcConnection>, AppError> {
    let csp_client = CspClient::new().map_err(|e| AppError::Config(e.to_string()))?;
    let csp_base_url = config.auth.csp_base_url();

    let token_response = csp_client
        .exchange_api_token(&csp_base_url, &config.auth.refresh_token)
        .await?;

    let connection = Arc::new(VmcConnection {
        csp_server: csp_base_url,
        vmc_server: config.vmc.base_url(),
        org_id: config.vmc.org_id.clone(),
        headers: build_headers(&token_response.access_token)?,
    });

    CONNECTION
        .set(Arc::clone(&connection))
        .map_err(|_| AppError::Config("Already connected".to_string()))?;

    tracing::info!(
        "Connected to VMware Cloud via {}, org {}",
        connection.csp_server,
        connection.org_id
    );

    Ok(connection)
}

/// Get the global connection, if [`connect`] has run.
pub fn get_connection() -> Result<Arc<VmcConnection>, AuthError> {
    CONNECTION.get().cloned().ok_or(AuthError::NotConnected)
}

/// Build the headers bag carried by every authenticated request.
fn build_headers(access_token: &str) -> Result<HeaderMap, AuthError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        CSP_AUTH_TOKEN_HEADER,
        HeaderValue::from_str(access_token)
            .map_err(|e| AuthError::TokenExchangeFailed(format!("Invalid access token: {e}")))?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}
