#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::core::provisioner::{
    DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_SECONDS, DEFAULT_TIMEOUT_SECONDS,
};
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_positive_number, validate_url, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ARTIFACT_PATH: &str = "breastcancer.model.json";
pub const DEFAULT_ARTIFACT_URL: &str = "https://your-model-storage.com/breastcancer.model.json";
pub const DEFAULT_CONFIG_FILE: &str = "risk-predictor.toml";

/// Where the model lives and how to fetch it, after merging file and flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSettings {
    pub path: String,
    pub url: String,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
    pub refresh: bool,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            path: DEFAULT_ARTIFACT_PATH.to_string(),
            url: DEFAULT_ARTIFACT_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_seconds: DEFAULT_RETRY_DELAY_SECONDS,
            refresh: false,
        }
    }
}

impl ConfigProvider for ArtifactSettings {
    fn artifact_path(&self) -> &str {
        &self.path
    }

    fn artifact_url(&self) -> &str {
        &self.url
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn retry_delay_seconds(&self) -> u64 {
        self.retry_delay_seconds
    }

    fn force_refresh(&self) -> bool {
        self.refresh
    }
}

impl Validate for ArtifactSettings {
    fn validate(&self) -> Result<()> {
        validate_path("artifact.path", &self.path)?;
        validate_url("artifact.url", &self.url)?;
        validate_positive_number("artifact.timeout_seconds", self.timeout_seconds, 1)?;
        validate_positive_number("artifact.retry_attempts", u64::from(self.retry_attempts), 1)?;
        Ok(())
    }
}
