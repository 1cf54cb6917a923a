use clap::Parser;
use risk_predictor::app::batch::run_batch;
use risk_predictor::config::cli::Command;
use risk_predictor::utils::{logger, validation::Validate};
use risk_predictor::{
    ArtifactProvisioner, CliConfig, LocalStorage, Prediction, RiskError, RiskSession,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // Load the config file first; it may choose the log format.
    let file_config = match cli.load_file() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.severity().exit_code());
        }
    };

    if cli.log_json || file_config.json_logs() {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    let settings = cli.artifact_settings(&file_config);
    if let Err(e) = settings.validate() {
        exit_with(e);
    }

    let storage = LocalStorage::new(".");
    let provisioner = match ArtifactProvisioner::from_config(storage.clone(), &settings) {
        Ok(provisioner) => provisioner,
        Err(e) => exit_with(e),
    };

    let outcome = match &cli.command {
        Command::Fetch => provisioner.provision(&settings).await.map(|artifact| {
            println!(
                "✅ Model artifact ready at {} ({})",
                artifact.source(),
                artifact.estimator().kind()
            );
        }),
        Command::Predict(args) => {
            let json = args.json || file_config.json_output();
            match RiskSession::provision(&provisioner, &settings).await {
                Ok(session) => session
                    .predict(&args.to_inputs())
                    .and_then(|prediction| render_prediction(&prediction, json)),
                Err(e) => Err(e),
            }
        }
        Command::Batch(args) => {
            if let Err(e) = args.validate() {
                exit_with(e);
            }
            let output_path = args.output_path();
            match RiskSession::provision(&provisioner, &settings).await {
                Ok(session) => run_batch(&storage, &session, &args.input, &output_path)
                    .await
                    .map(|summary| {
                        println!(
                            "✅ {} patients processed: {} high risk, {} low risk, {} failed",
                            summary.total, summary.high_risk, summary.low_risk, summary.failed
                        );
                        println!("📁 Predictions saved to: {}", output_path);
                    }),
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = outcome {
        exit_with(e);
    }

    Ok(())
}

fn render_prediction(prediction: &Prediction, json: bool) -> risk_predictor::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(prediction)?);
    } else {
        println!("🎗️ {}", prediction.label.headline());
    }
    Ok(())
}

fn exit_with(e: RiskError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.severity().exit_code());
}
