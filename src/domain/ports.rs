use crate::domain::model::FeatureVector;
use crate::utils::error::Result;
use std::sync::Arc;

pub trait Storage: Send + Sync {
    fn exists(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    /// Must leave no partial file behind when it fails.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn artifact_path(&self) -> &str;
    fn artifact_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn retry_attempts(&self) -> u32;
    fn retry_delay_seconds(&self) -> u64;
    fn force_refresh(&self) -> bool;
}

/// The classifier's single capability: one row in, one class out.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<i64>;
}

impl<P: Predictor + ?Sized> Predictor for Arc<P> {
    fn predict(&self, features: &FeatureVector) -> Result<i64> {
        (**self).predict(features)
    }
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn predict(&self, features: &FeatureVector) -> Result<i64> {
        (**self).predict(features)
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn predict(&self, features: &FeatureVector) -> Result<i64> {
        (**self).predict(features)
    }
}
