//! VMware Cloud on AWS usage API client.
//!
//! Issues authenticated GETs against the org's deployment-usage and
//! subscription collections.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::models::{DeploymentUsage, Subscription};
use crate::connection::VmcConnection;
use crate::error::ApiError;

/// HTTP request timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// VMware Cloud usage API client.
pub struct VmcClient {
    http_client: Client,
}

impl VmcClient {
    /// Create a new usage API client.
    pub fn new() -> Result<Self, ApiError> {
        let http_client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self { http_client })
    }

    /// Fetch per-deployment usage for the connected org.
    pub async fn get_deployment_usage(
        &self,
        connection: &VmcConnection,
    ) -> Result<Vec<DeploymentUsage>, ApiError> {
        let url = format!(
            "{}/api/usage/v1/orgs/{}/deployment-usages",
            connection.vmc_server, connection.org_id
        );

        debug!("Fetching deployment usage from {}", url);

        let response = self
            .http_client
            .get(&url)
            .headers(connection.headers.clone())
            .send()
            .await
            .map_err(ApiError::Network)?;

        let status = response.status();
        match status.as_u16() {
            200 => {
                let body: DeploymentUsageListResponse = response
                    .json()
                    .await
                    .map_err(|e| ApiError::ParseFailed(e.to_string()))?;

                info!("Found {} deployments", body.deployment_usages.len());
                Ok(body.deployment_usages)
            }
            401 => Err(ApiError::Unauthorized),
            403 => Err(ApiError::Forbidden),
            429 => Err(ApiError::RateLimited),
            _ => {
                let body = response.text().await.unwrap_or_default();
                error!("Failed to fetch deployment usage: HTTP {} - {}", status, body);
                Err(ApiError::RequestFailed(format!("HTTP {}", status)))
            }
        }
    }

    /// Fetch the subscription collection for the connected org.
    pub async fn get_subscriptions(
        &self,
        connection: &VmcConnection,
    ) -> Result<Vec<Subscription>, ApiError> {
        let url = format!(
            "{}/api/usage/v1/orgs/{}/subscriptions",
            connection.vmc_server, connection.org_id
        );

        debug!("Fetching subscriptions from {}", url);

        let response = self
            .http_client
            .get(&url)
            .headers(connection.headers.clone())
            .send()
            .await
            .map_err(ApiError::Network)?;

        let status = response.status();
        match status.as_u16() {
            200 => {
                let body: SubscriptionListResponse = response
                    .json()
                    .await
                    .map_err(|e| ApiError::ParseFailed(e.to_string()))?;

                info!("Found {} subscriptions", body.subscriptions.len());
                Ok(body.subscriptions)
            }
            401 => Err(ApiError::Unauthorized),
            403 => Err(ApiError::Forbidden),
            429 => Err(ApiError::RateLimited),
            _ => {
                let body = response.text().await.unwrap_or_default();
                error!("Failed to fetch subscriptions: HTTP {} - {}", status, body);
                Err(ApiError::RequestFailed(format!("HTTP {}", status)))
            }
        }
    }
}

// --- API Response Types ---

#[derive(Debug, Deserialize)]
struct DeploymentUsageListResponse {
    #[serde(default)]
    deployment_usages: Vec<DeploymentUsage>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionListResponse {
    #[serde(default)]
    subscriptions: Vec<Subscription>,
}
