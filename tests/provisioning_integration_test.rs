use anyhow::Result;
use httpmock::prelude::*;
use risk_predictor::{
    ArtifactProvisioner, ArtifactSettings, DownloadPolicy, LocalStorage, RawInputs, RiskError,
    RiskLabel, RiskSession, FEATURE_COLUMNS,
};
use std::time::Duration;
use tempfile::TempDir;

/// Positive class when the patient reports multiple relatives with breast
/// cancer, negative otherwise.
fn family_history_model() -> String {
    serde_json::json!({
        "format_version": 1,
        "feature_names": FEATURE_COLUMNS,
        "estimator": {
            "type": "tree_ensemble",
            "trees": [{ "nodes": [
                { "kind": "split", "feature": 6, "threshold": 1.5, "left": 1, "right": 2 },
                { "kind": "leaf", "class": 0 },
                { "kind": "leaf", "class": 1 }
            ]}]
        }
    })
    .to_string()
}

fn settings(temp_dir: &TempDir, url: String) -> ArtifactSettings {
    ArtifactSettings {
        path: temp_dir
            .path()
            .join("breastcancer.model.json")
            .to_str()
            .unwrap()
            .to_string(),
        url,
        timeout_seconds: 5,
        retry_attempts: 2,
        retry_delay_seconds: 0,
        refresh: false,
    }
}

#[tokio::test]
async fn test_first_run_downloads_and_predicts() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let model_mock = server.mock(|when, then| {
        when.method(GET).path("/breastcancer.model.json");
        then.status(200)
            .header("Content-Type", "application/octet-stream")
            .body(family_history_model());
    });

    let settings = settings(&temp_dir, server.url("/breastcancer.model.json"));
    let provisioner = ArtifactProvisioner::from_config(LocalStorage::new("."), &settings)?;

    let session = RiskSession::provision(&provisioner, &settings).await?;
    model_mock.assert();

    let cached = std::fs::read_to_string(&settings.path)?;
    assert_eq!(cached, family_history_model());

    let low = session.predict(&RawInputs::default())?;
    assert_eq!(low.features.to_row(), [45.0, 12.0, 1.0, 0.0, 0.0, 3.0, 1.0]);
    assert_eq!(low.label, RiskLabel::Low);

    let high = session.predict(&RawInputs {
        family_history: "Multiple".to_string(),
        ..RawInputs::default()
    })?;
    assert_eq!(high.label, RiskLabel::High);
    assert_eq!(high.model_output, 1);

    Ok(())
}

#[tokio::test]
async fn test_second_run_reads_cache_only() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let model_mock = server.mock(|when, then| {
        when.method(GET).path("/model.json");
        then.status(200).body(family_history_model());
    });

    let settings = settings(&temp_dir, server.url("/model.json"));
    let provisioner = ArtifactProvisioner::from_config(LocalStorage::new("."), &settings)?;

    RiskSession::provision(&provisioner, &settings).await?;
    RiskSession::provision(&provisioner, &settings).await?;

    model_mock.assert_hits(1);
    Ok(())
}

#[tokio::test]
async fn test_network_failure_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let model_mock = server.mock(|when, then| {
        when.method(GET).path("/model.json");
        then.status(500);
    });

    let settings = settings(&temp_dir, server.url("/model.json"));
    let provisioner = ArtifactProvisioner::from_config(LocalStorage::new("."), &settings)?;

    let err = match RiskSession::provision(&provisioner, &settings).await {
        Ok(_) => panic!("provisioning should fail"),
        Err(e) => e,
    };

    assert!(matches!(err, RiskError::DownloadError { .. }));
    assert!(err.is_session_fatal());
    model_mock.assert_hits(2);
    assert!(!std::path::Path::new(&settings.path).exists());
    assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_download_timeout_leaves_cache_empty() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let model_mock = server.mock(|when, then| {
        when.method(GET).path("/model.json");
        then.status(200)
            .body(family_history_model())
            .delay(Duration::from_secs(4));
    });

    let mut settings = settings(&temp_dir, server.url("/model.json"));
    settings.timeout_seconds = 1;
    let provisioner = ArtifactProvisioner::from_config(LocalStorage::new("."), &settings)?;

    let started = std::time::Instant::now();
    let err = match RiskSession::provision(&provisioner, &settings).await {
        Ok(_) => panic!("provisioning should time out"),
        Err(e) => e,
    };

    assert!(matches!(err, RiskError::DownloadError { .. }));
    assert!(err.to_string().contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(4));
    model_mock.assert_hits(settings.retry_attempts as usize);
    assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_host_is_a_download_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let provisioner = ArtifactProvisioner::new(
        LocalStorage::new(temp_dir.path()),
        DownloadPolicy {
            timeout: Duration::from_secs(2),
            attempts: 1,
            retry_delay: Duration::from_millis(1),
        },
    )?;

    // Port 9 (discard) is not expected to be listening locally.
    let err = provisioner
        .ensure_artifact("model.json", "http://127.0.0.1:9/model.json")
        .await
        .unwrap_err();

    assert!(matches!(err, RiskError::DownloadError { .. }));
    assert!(!temp_dir.path().join("model.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_malformed_cached_artifact_fails_to_load() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let model_mock = server.mock(|when, then| {
        when.method(GET).path("/model.json");
        then.status(200).body(family_history_model());
    });

    let settings = settings(&temp_dir, server.url("/model.json"));
    std::fs::write(&settings.path, b"\x80\x04\x95joblib pickle bytes")?;

    let provisioner = ArtifactProvisioner::from_config(LocalStorage::new("."), &settings)?;
    let err = match RiskSession::provision(&provisioner, &settings).await {
        Ok(_) => panic!("loading should fail"),
        Err(e) => e,
    };

    assert!(matches!(err, RiskError::ArtifactLoadError { .. }));
    model_mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_refresh_replaces_cached_artifact() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let model_mock = server.mock(|when, then| {
        when.method(GET).path("/model.json");
        then.status(200).body(family_history_model());
    });

    let mut settings = settings(&temp_dir, server.url("/model.json"));
    std::fs::write(&settings.path, b"corrupt")?;
    settings.refresh = true;

    let provisioner = ArtifactProvisioner::from_config(LocalStorage::new("."), &settings)?;
    let session = RiskSession::provision(&provisioner, &settings).await?;

    model_mock.assert();
    assert_eq!(
        session.predict(&RawInputs::default())?.label,
        RiskLabel::Low
    );
    Ok(())
}
