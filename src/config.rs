use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::persistence::workflow_store::DEFAULT_STORE_DIR;
use crate::error::{Error, Result};

pub const DEFAULT_MISTRAL_MODEL: &str = "mistral-large-latest";
pub const DEFAULT_MISTRAL_BASE_URL: &str = "https://api.mistral.ai";
pub const DEFAULT_TEMPLATE_CATALOG_PATH: &str = "workflow_metadata.json";
pub const DEFAULT_DEPLOY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DOMAINS: [&str; 5] = ["HR", "Marketing", "CRM", "Sales", "IT"];

/// Runtime settings, read from the process environment (and an optional `.env` file).
#[derive(Clone)]
pub struct AppConfig {
    pub mistral_api_key: Option<String>,
    pub mistral_model: String,
    pub mistral_base_url: String,
    pub n8n_base_url: Option<String>,
    pub n8n_api_key: Option<String>,
    pub store_dir: String,
    pub template_catalog_path: String,
    pub deploy_timeout: Duration,
    pub domains: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment overrides from '{}'.", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());

        let deploy_timeout_secs = match get("DEPLOY_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("DEPLOY_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_DEPLOY_TIMEOUT_SECS,
        };

        Ok(AppConfig {
            mistral_api_key: get("MISTRAL_API_KEY"),
            mistral_model: get("MISTRAL_MODEL").unwrap_or_else(|| DEFAULT_MISTRAL_MODEL.to_string()),
            mistral_base_url: get("MISTRAL_BASE_URL").unwrap_or_else(|| DEFAULT_MISTRAL_BASE_URL.to_string()),
            n8n_base_url: get("N8N_BASE_URL"),
            n8n_api_key: get("N8N_API_KEY"),
            store_dir: get("WORKFLOW_STORE_DIR").unwrap_or_else(|| DEFAULT_STORE_DIR.to_string()),
            template_catalog_path: get("TEMPLATE_CATALOG_PATH").unwrap_or_else(|| DEFAULT_TEMPLATE_CATALOG_PATH.to_string()),
            deploy_timeout: Duration::from_secs(deploy_timeout_secs),
            domains: DEFAULT_DOMAINS.iter().map(|domain| domain.to_string()).collect(),
        })
    }

    /// Model-assisted generation is only attempted with an API key.
    pub fn completion_enabled(&self) -> bool {
        self.mistral_api_key.is_some()
    }

    /// Fails with every missing deployment variable listed in one error.
    pub fn validate_for_deployment(&self) -> Result<()> {
        let missing: Vec<&str> = [("N8N_BASE_URL", &self.n8n_base_url), ("N8N_API_KEY", &self.n8n_api_key)]
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| key)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigError(missing.join(", ")))
        }
    }
}

// Keys never reach the log in clear text.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("mistral_api_key", &self.mistral_api_key.as_deref().map(mask_secret))
            .field("mistral_model", &self.mistral_model)
            .field("mistral_base_url", &self.mistral_base_url)
            .field("n8n_base_url", &self.n8n_base_url)
            .field("n8n_api_key", &self.n8n_api_key.as_deref().map(mask_secret))
            .field("store_dir", &self.store_dir)
            .field("template_catalog_path", &self.template_catalog_path)
            .field("deploy_timeout", &self.deploy_timeout)
            .field("domains", &self.domains)
            .finish()
    }
}

/// Keeps the first four characters of a secret and masks the rest.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}****", visible)
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    raw.parse::<T>().map_err(|e| Error::ConfigError(format!("{} must be a number, got '{}': {}", key, raw, e)))
}
