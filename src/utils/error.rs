use thiserror::Error;

#[derive(Error, Debug)]
pub enum RectifyError {
    #[error("Invalid input for '{field}' ({value}): {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Evidence combiner requires at least one candidate estimate")]
    NoCandidates,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit status for a run that failed at this severity. Never zero.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl RectifyError {
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        RectifyError::InvalidInput {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Re-labels a failed field check as a calibration problem.
    pub fn into_config_error(self) -> Self {
        match self {
            RectifyError::InvalidInput {
                field,
                value,
                reason,
            } => RectifyError::ConfigValidationError {
                field,
                message: format!("{} (got {})", reason, value),
            },
            other => other,
        }
    }

    /// True for the caller errors an API layer should report as a bad request.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            RectifyError::InvalidInput { .. } | RectifyError::NoCandidates
        )
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RectifyError::InvalidInput { .. } | RectifyError::NoCandidates => ErrorCategory::Input,
            RectifyError::TomlError(_) | RectifyError::ConfigValidationError { .. } => {
                ErrorCategory::Configuration
            }
            RectifyError::IoError(_) | RectifyError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RectifyError::InvalidInput { field, .. } => {
                format!("Correct the value of '{}' and submit the request again", field)
            }
            RectifyError::NoCandidates => {
                "Evaluate at least one evidence track before combining".to_string()
            }
            RectifyError::IoError(_) => "Check that the file exists and is readable".to_string(),
            RectifyError::SerializationError(_) => {
                "Check that the JSON document is well formed".to_string()
            }
            RectifyError::TomlError(_) => "Check the TOML syntax of the file".to_string(),
            RectifyError::ConfigValidationError { field, .. } => {
                format!("Adjust '{}' in the calibration file", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RectifyError::InvalidInput { field, reason, .. } => {
                format!("The birth data is invalid ({}): {}", field, reason)
            }
            RectifyError::NoCandidates => "No evidence was evaluated".to_string(),
            RectifyError::ConfigValidationError { field, message } => {
                format!("The calibration is invalid ({}): {}", field, message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RectifyError>;
