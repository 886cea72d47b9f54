//! Error types for the vmcusage application.
//!
//! Uses `thiserror` for library-style errors with automatic `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Authentication-related errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("Not connected to VMware Cloud")]
    NotConnected,
}

/// VMware Cloud API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseFailed(String),

    #[error("Unauthorized (401): Token may be expired")]
    Unauthorized,

    #[error("Forbidden (403): Insufficient permissions")]
    Forbidden,

    #[error("Rate limited (429): Too many requests")]
    RateLimited,
}

impl AppError {
    /// Returns a user-friendly message for terminal display.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Auth(AuthError::TokenExchangeFailed(_)) => {
                "Sign-in failed. Check your API refresh token."
            }
            Self::Auth(AuthError::NotConnected) => "Not connected. Authenticate first.",
            Self::Api(ApiError::Unauthorized) => "Access token expired. Connect again.",
            Self::Api(ApiError::Forbidden) => "Insufficient permissions for this organization.",
            Self::Api(ApiError::RateLimited) => "Too many requests. Please wait a moment.",
            Self::Api(ApiError::ParseFailed(_)) => "Unexpected response from VMware Cloud.",
            Self::Api(ApiError::RequestFailed(_)) => "VMware Cloud request failed.",
            Self::Api(ApiError::Network(_)) | Self::Network(_) => {
                "Network error. Check your connection."
            }
            Self::Config(_) => "Configuration error. Please check settings.",
            Self::Io(_) => "An IO error occurred.",
        }
    }

    /// Returns true if this error means the credential needs to be re-issued.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::TokenExchangeFailed(_)) | Self::Api(ApiError::Unauthorized)
        )
    }
}
