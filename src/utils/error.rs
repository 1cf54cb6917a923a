use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Failed to download model artifact from {url}: {reason}")]
    DownloadError { url: String, reason: String },

    #[error("Failed to load model artifact '{path}': {reason}")]
    ArtifactLoadError { path: String, reason: String },

    #[error("Unrecognized value '{value}' for {field}; expected one of: {expected}")]
    EncodingError {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Prediction failed: {message}")]
    InferenceError { message: String },

    #[error("Invalid input for {field}: '{value}' ({reason})")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Artifact,
    Input,
    Inference,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code the binary reports for an error of this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl RiskError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RiskError::DownloadError { .. } | RiskError::HttpError(_) => ErrorCategory::Network,
            RiskError::ArtifactLoadError { .. } => ErrorCategory::Artifact,
            RiskError::EncodingError { .. }
            | RiskError::InvalidInput { .. }
            | RiskError::CsvError(_) => ErrorCategory::Input,
            RiskError::InferenceError { .. } => ErrorCategory::Inference,
            RiskError::ConfigError { .. }
            | RiskError::ConfigValidationError { .. }
            | RiskError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            RiskError::IoError(_) | RiskError::SerializationError(_) => ErrorCategory::System,
        }
    }

    /// Severity drives the process exit code of the binary.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Inference => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Artifact | ErrorCategory::Configuration | ErrorCategory::System => {
                ErrorSeverity::Critical
            }
        }
    }

    /// Whether the session can keep serving predictions after this error.
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Artifact | ErrorCategory::Configuration
        )
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RiskError::DownloadError { url, .. } => format!(
                "Check your network connection and that {} is reachable, then run the command again",
                url
            ),
            RiskError::HttpError(_) => {
                "Check your network connection and run the command again".to_string()
            }
            RiskError::ArtifactLoadError { path, .. } => format!(
                "Delete '{}' and run again with --refresh to download a fresh copy",
                path
            ),
            RiskError::EncodingError { expected, .. } => {
                format!("Use one of the accepted values: {}", expected)
            }
            RiskError::InvalidInput { reason, .. } => format!("Correct the value: {}", reason),
            RiskError::InferenceError { .. } => {
                "Retry the prediction; if it keeps failing the model artifact may not match this tool"
                    .to_string()
            }
            RiskError::CsvError(_) => {
                "Make sure the input file is a CSV with the expected header row".to_string()
            }
            RiskError::ConfigError { .. }
            | RiskError::ConfigValidationError { .. }
            | RiskError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line flags".to_string()
            }
            RiskError::IoError(_) => {
                "Check file permissions and available disk space".to_string()
            }
            RiskError::SerializationError(_) => {
                "Report this problem together with the command you ran".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RiskError::DownloadError { .. } | RiskError::HttpError(_) => {
                format!("Could not download the prediction model: {}", self)
            }
            RiskError::ArtifactLoadError { .. } => {
                format!("Error loading model: {}", self)
            }
            RiskError::EncodingError { .. } | RiskError::InvalidInput { .. } => {
                format!("Invalid patient data: {}", self)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RiskError>;
