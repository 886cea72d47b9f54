//! Configuration loading and management.
//!
//! Loads configuration from an optional TOML file with environment variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Default CSP (Cloud Services Platform) host.
const DEFAULT_CSP_SERVER: &str = "console.cloud.vmware.com";

/// Default VMware Cloud on AWS host.
const DEFAULT_VMC_SERVER: &str = "vmc.vmware.com";

/// Long-lived CSP API refresh token.
///
/// Zeroized on drop and redacted in `Debug` output so the credential never
/// lands in logs or error chains.
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Access the raw token for the exchange request body.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth: AuthConfig,
    pub vmc: VmcConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// CSP host used for the token exchange.
    pub csp_server: String,
    /// Long-lived API refresh token.
    pub refresh_token: ApiToken,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            csp_server: DEFAULT_CSP_SERVER.to_string(),
            refresh_token: ApiToken::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VmcConfig {
    /// VMware Cloud on AWS API host.
    pub server: String,
    /// Organization ID the reports run against.
    pub org_id: String,
}

impl Default for VmcConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_VMC_SERVER.to_string(),
            org_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file with environment variable overrides.
    ///
    /// An explicit `path` must exist; the default per-user path is optional and
    /// silently skipped when absent. Validation is deferred to [`Config::validate`]
    /// so command-line overrides can be applied first.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(explicit) => Self::from_file(explicit)?,
            None => match default_config_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Config::default(),
            },
        };

        // Apply environment variable overrides
        if let Ok(csp_server) = env::var("VMC_CSP_SERVER") {
            config.auth.csp_server = csp_server;
        }

        if let Ok(refresh_token) = env::var("VMC_REFRESH_TOKEN") {
            config.auth.refresh_token = ApiToken::new(refresh_token);
        }

        if let Ok(server) = env::var("VMC_SERVER") {
            config.vmc.server = server;
        }

        if let Ok(org_id) = env::var("VMC_ORG_ID") {
            config.vmc.org_id = org_id;
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            config.logging.level = log_level;
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        if self.auth.refresh_token.is_empty() {
            anyhow::bail!(
                "API refresh token not configured. Set VMC_REFRESH_TOKEN, pass \
                 --refresh-token, or add it to the config file"
            );
        }

        if self.vmc.org_id.is_empty() {
            anyhow::bail!(
                "Organization ID not configured. Set VMC_ORG_ID, pass --org-id, \
                 or add it to the config file"
            );
        }

        Ok(())
    }
}

impl AuthConfig {
    /// Base URL of the CSP service.
    pub fn csp_base_url(&self) -> String {
        normalize_server_url(&self.csp_server)
    }
}

impl VmcConfig {
    /// Base URL of the VMware Cloud on AWS API.
    pub fn base_url(&self) -> String {
        normalize_server_url(&self.server)
    }
}

/// Accept both bare hostnames and full URLs; bare hostnames get `https://`.
fn normalize_server_url(server: &str) -> String {
    let trimmed = server.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Per-user config file location (`~/.config/vmcusage/config.toml` on Linux).
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vmcusage").join("config.toml"))
}
