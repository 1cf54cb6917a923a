pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::storage::LocalStorage;
pub use config::{toml_config::TomlConfig, ArtifactSettings};
pub use core::artifact::ModelArtifact;
pub use core::encoder::{decode, encode};
pub use core::inference::predict_risk;
pub use core::provisioner::{ensure_artifact, ArtifactProvisioner, DownloadPolicy};
pub use core::session::RiskSession;
pub use domain::model::{FeatureVector, Prediction, RawInputs, RiskLabel, FEATURE_COLUMNS};
pub use domain::ports::Predictor;
pub use utils::error::{Result, RiskError};
