pub mod artifact;
pub mod encoder;
pub mod inference;
pub mod provisioner;
pub mod session;

pub use crate::domain::model::{FeatureVector, Prediction, RawInputs, RiskLabel};
pub use crate::domain::ports::{ConfigProvider, Predictor, Storage};
pub use crate::utils::error::Result;
