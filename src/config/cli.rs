use crate::config::toml_config::TomlConfig;
use crate::config::{ArtifactSettings, DEFAULT_CONFIG_FILE};
use crate::domain::choices::{FamilyHistory, YesNo};
use crate::domain::model::{
    RawInputs, AGE_RANGE, BIOPSIES_RANGE, EXERCISE_HOURS_RANGE, MENARCHE_RANGE,
};
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extensions, validate_path, Validate};
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "risk-predictor", version)]
#[command(about = "Breast cancer risk predictor backed by a pre-trained classifier")]
pub struct CliConfig {
    /// Path to a TOML configuration file (defaults to ./risk-predictor.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Local path of the cached model artifact
    #[arg(long, global = true)]
    pub model_path: Option<String>,

    /// URL the model artifact is downloaded from when not cached
    #[arg(long, global = true)]
    pub model_url: Option<String>,

    /// Download timeout in seconds
    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    /// Download the artifact again even if a cached copy exists
    #[arg(long, global = true)]
    pub refresh: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Predict the risk label for one patient
    Predict(PredictArgs),
    /// Predict every patient row of a CSV file
    Batch(BatchArgs),
    /// Only make sure the model artifact is cached locally
    Fetch,
}

#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    /// Age in years
    #[arg(long, default_value_t = 45, value_parser = clap::value_parser!(i64).range(AGE_RANGE))]
    pub age: i64,

    /// Age at first menstruation (menarche)
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(i64).range(MENARCHE_RANGE))]
    pub menarche: i64,

    /// Number of prior biopsies
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(i64).range(BIOPSIES_RANGE))]
    pub biopsies: i64,

    /// Do you consume alcohol?
    #[arg(long, default_value = "No", value_parser = PossibleValuesParser::new(YesNo::LABELS.iter().copied()))]
    pub alcohol: String,

    /// Do you use tobacco?
    #[arg(long, default_value = "No", value_parser = PossibleValuesParser::new(YesNo::LABELS.iter().copied()))]
    pub tobacco: String,

    /// Weekly exercise in hours
    #[arg(long, default_value_t = 3.0, value_parser = parse_exercise_hours)]
    pub exercise: f64,

    /// Family history of breast cancer
    #[arg(long, default_value = "None", value_parser = PossibleValuesParser::new(FamilyHistory::LABELS.iter().copied()))]
    pub family_history: String,

    /// Print the prediction as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// CSV file with one patient per row
    #[arg(short, long)]
    pub input: String,

    /// Where to write the predictions (defaults to <input>.predictions.csv)
    #[arg(short, long)]
    pub output: Option<String>,
}

fn parse_exercise_hours(value: &str) -> std::result::Result<f64, String> {
    let hours: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if !EXERCISE_HOURS_RANGE.contains(&hours) {
        return Err(format!(
            "{} is not in {}..={}",
            hours,
            EXERCISE_HOURS_RANGE.start(),
            EXERCISE_HOURS_RANGE.end()
        ));
    }
    Ok(hours)
}

impl PredictArgs {
    pub fn to_inputs(&self) -> RawInputs {
        RawInputs {
            age: self.age,
            menarche: self.menarche,
            biopsies: self.biopsies,
            alcohol: self.alcohol.clone(),
            tobacco: self.tobacco.clone(),
            exercise_hours: self.exercise,
            family_history: self.family_history.clone(),
        }
    }
}

impl BatchArgs {
    pub fn output_path(&self) -> String {
        self.output.clone().unwrap_or_else(|| {
            let input = Path::new(&self.input);
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("patients");
            input
                .with_file_name(format!("{}.predictions.csv", stem))
                .to_string_lossy()
                .into_owned()
        })
    }
}

impl Validate for BatchArgs {
    fn validate(&self) -> Result<()> {
        validate_file_extensions("batch.input", std::slice::from_ref(&self.input), &["csv"])?;
        validate_path("batch.output", &self.output_path())
    }
}

impl CliConfig {
    /// Loads the TOML file named by `--config`, or the default file if present.
    pub fn load_file(&self) -> Result<TomlConfig> {
        match &self.config {
            Some(path) => TomlConfig::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                TomlConfig::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(TomlConfig::default()),
        }
    }

    /// Command line flags layered over the file settings.
    pub fn artifact_settings(&self, file: &TomlConfig) -> ArtifactSettings {
        let mut settings = file.artifact_settings();
        if let Some(path) = &self.model_path {
            settings.path = path.clone();
        }
        if let Some(url) = &self.model_url {
            settings.url = url.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = timeout;
        }
        settings.refresh = self.refresh;
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ConfigProvider;

    #[test]
    fn test_predict_defaults_match_reference_form() {
        let cli = CliConfig::try_parse_from(["risk-predictor", "predict"]).unwrap();
        match cli.command {
            Command::Predict(args) => {
                assert_eq!(args.to_inputs(), RawInputs::default());
                assert!(!args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_predict_flags() {
        let cli = CliConfig::try_parse_from([
            "risk-predictor",
            "predict",
            "--age",
            "100",
            "--alcohol",
            "Yes",
            "--family-history",
            "Multiple",
            "--exercise",
            "0",
        ])
        .unwrap();
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        let inputs = args.to_inputs();
        assert_eq!(inputs.age, 100);
        assert_eq!(inputs.alcohol, "Yes");
        assert_eq!(inputs.family_history, "Multiple");
        assert_eq!(inputs.exercise_hours, 0.0);
    }

    #[test]
    fn test_out_of_range_flags_are_rejected() {
        for args in [
            vec!["risk-predictor", "predict", "--age", "19"],
            vec!["risk-predictor", "predict", "--age", "101"],
            vec!["risk-predictor", "predict", "--menarche", "21"],
            vec!["risk-predictor", "predict", "--biopsies", "-1"],
            vec!["risk-predictor", "predict", "--exercise", "50.5"],
            vec!["risk-predictor", "predict", "--tobacco", "yes"],
            vec!["risk-predictor", "predict", "--family-history", "Unknown"],
        ] {
            assert!(
                CliConfig::try_parse_from(args.iter().copied()).is_err(),
                "{args:?} should fail"
            );
        }
    }

    #[test]
    fn test_flags_override_file_settings() {
        let file = TomlConfig::from_toml_str(
            "[artifact]\npath = \"file.json\"\nurl = \"https://file.example.com/m.json\"\nretry_attempts = 4\n",
        )
        .unwrap();
        let cli = CliConfig::try_parse_from([
            "risk-predictor",
            "--model-path",
            "flag.json",
            "--refresh",
            "fetch",
        ])
        .unwrap();

        let settings = cli.artifact_settings(&file);
        assert_eq!(settings.artifact_path(), "flag.json");
        assert_eq!(settings.artifact_url(), "https://file.example.com/m.json");
        assert_eq!(settings.retry_attempts(), 4);
        assert!(settings.force_refresh());
    }

    #[test]
    fn test_batch_output_defaults_next_to_input() {
        let cli =
            CliConfig::try_parse_from(["risk-predictor", "batch", "--input", "data/patients.csv"])
                .unwrap();
        let Command::Batch(args) = cli.command else {
            panic!("expected batch");
        };
        assert_eq!(args.output_path(), "data/patients.predictions.csv");
        assert!(args.validate().is_ok());

        let bad = BatchArgs {
            input: "patients.xlsx".to_string(),
            output: None,
        };
        assert!(bad.validate().is_err());
    }
}
