use crate::adapters::storage::LocalStorage;
use crate::core::artifact::ModelArtifact;
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{Result, RiskError};
use crate::utils::retry::retry_async;
use crate::utils::validation::validate_url;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECONDS: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPolicy {
    pub timeout: Duration,
    pub attempts: u32,
    pub retry_delay: Duration,
}

impl Default for DownloadPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECONDS),
        }
    }
}

impl DownloadPolicy {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_seconds()),
            attempts: config.retry_attempts().max(1),
            retry_delay: Duration::from_secs(config.retry_delay_seconds()),
        }
    }
}

/// Why a single fetch attempt failed.
#[derive(Debug)]
enum FetchFailure {
    /// Network errors and 5xx/429 responses; worth another attempt.
    Transient(String),
    /// Any other non-2xx response.
    Permanent(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Transient(reason) | FetchFailure::Permanent(reason) => {
                f.write_str(reason)
            }
        }
    }
}

/// Keeps a local copy of the model artifact and loads it.
pub struct ArtifactProvisioner<S: Storage> {
    storage: S,
    client: Client,
    policy: DownloadPolicy,
}

impl<S: Storage> ArtifactProvisioner<S> {
    pub fn new(storage: S, policy: DownloadPolicy) -> Result<Self> {
        let client = Client::builder().timeout(policy.timeout).build()?;
        Ok(Self {
            storage,
            client,
            policy,
        })
    }

    pub fn from_config<C: ConfigProvider>(storage: S, config: &C) -> Result<Self> {
        Self::new(storage, DownloadPolicy::from_config(config))
    }

    /// Downloads `remote_url` to `local_path` if no cached copy exists, then loads it.
    pub async fn ensure_artifact(
        &self,
        local_path: &str,
        remote_url: &str,
    ) -> Result<ModelArtifact> {
        self.ensure_cached(local_path, remote_url, false).await?;
        self.load(local_path).await
    }

    /// Same as [`Self::ensure_artifact`] but driven by configuration, honouring `force_refresh`.
    pub async fn provision<C: ConfigProvider>(&self, config: &C) -> Result<ModelArtifact> {
        self.ensure_cached(config.artifact_path(), config.artifact_url(), config.force_refresh())
            .await?;
        self.load(config.artifact_path()).await
    }

    /// Makes sure the artifact file is present. Returns `true` when it was downloaded.
    pub async fn ensure_cached(
        &self,
        local_path: &str,
        remote_url: &str,
        refresh: bool,
    ) -> Result<bool> {
        if !refresh && self.storage.exists(local_path).await? {
            tracing::debug!("Using cached model artifact at {}", local_path);
            return Ok(false);
        }

        if refresh {
            tracing::info!("Refreshing model artifact from {}", remote_url);
        } else {
            tracing::info!("Model artifact not found at {}, downloading", local_path);
        }

        let bytes = self.download(remote_url).await?;
        self.storage.write_file(local_path, &bytes).await?;

        tracing::info!(
            "Model downloaded successfully ({} bytes) to {}",
            bytes.len(),
            local_path
        );
        Ok(true)
    }

    pub async fn load(&self, local_path: &str) -> Result<ModelArtifact> {
        let bytes = self
            .storage
            .read_file(local_path)
            .await
            .map_err(|e| RiskError::ArtifactLoadError {
                path: local_path.to_string(),
                reason: e.to_string(),
            })?;

        ModelArtifact::from_bytes(local_path, &bytes)
    }

    async fn download(&self, remote_url: &str) -> Result<Vec<u8>> {
        validate_url("artifact.url", remote_url).map_err(|e| RiskError::DownloadError {
            url: remote_url.to_string(),
            reason: e.to_string(),
        })?;

        retry_async(
            |attempt| self.fetch_once(remote_url, attempt),
            self.policy.attempts,
            self.policy.retry_delay,
            |failure| matches!(failure, FetchFailure::Transient(_)),
        )
        .await
        .map_err(|failure| RiskError::DownloadError {
            url: remote_url.to_string(),
            reason: failure.to_string(),
        })
    }

    async fn fetch_once(
        &self,
        remote_url: &str,
        attempt: u32,
    ) -> std::result::Result<Vec<u8>, FetchFailure> {
        tracing::debug!("GET {} (attempt {}/{})", remote_url, attempt, self.policy.attempts);

        let response = self
            .client
            .get(remote_url)
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        let status = response.status();
        tracing::debug!("Artifact response status: {}", status);

        if !status.is_success() {
            let reason = format!("server responded with HTTP {}", status);
            return Err(if status.is_server_error() || status.as_u16() == 429 {
                FetchFailure::Transient(reason)
            } else {
                FetchFailure::Permanent(reason)
            });
        }

        let body = response.bytes().await.map_err(|e| self.transport_failure(e))?;

        Ok(body.to_vec())
    }

    fn transport_failure(&self, error: reqwest::Error) -> FetchFailure {
        if error.is_timeout() {
            FetchFailure::Transient(format!("request timed out after {:?}", self.policy.timeout))
        } else if error.is_body() || error.is_decode() {
            FetchFailure::Transient(format!("failed to read response body: {}", error))
        } else {
            FetchFailure::Transient(error.to_string())
        }
    }
}

/// Provisions `local_path` from `remote_url` on the local filesystem with the default policy.
pub async fn ensure_artifact(local_path: &str, remote_url: &str) -> Result<ModelArtifact> {
    let provisioner = ArtifactProvisioner::new(LocalStorage::new("."), DownloadPolicy::default())?;
    provisioner.ensure_artifact(local_path, remote_url).await
}
