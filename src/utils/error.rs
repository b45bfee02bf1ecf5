use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Checkpoint not found: {path}")]
    CheckpointNotFound { path: String },

    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Data validation error: {message}")]
    ValidationError { message: String },

    #[error("Empty input: {message}")]
    EmptyData { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EvalError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EvalError::ConfigValidationError { .. }
            | EvalError::InvalidConfigValueError { .. }
            | EvalError::MissingConfigError { .. }
            | EvalError::TomlError(_) => ErrorCategory::Configuration,
            EvalError::CsvError(_)
            | EvalError::CheckpointNotFound { .. }
            | EvalError::ValidationError { .. }
            | EvalError::EmptyData { .. } => ErrorCategory::Input,
            EvalError::ShapeMismatch { .. } | EvalError::SerializationError(_) => {
                ErrorCategory::Processing
            }
            EvalError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EvalError::CheckpointNotFound { .. } => {
                "Check --save-path, --save-file-name and --epoch; the file must be named <name>.<epoch>.csv".to_string()
            }
            EvalError::ShapeMismatch { .. } => {
                "Make sure the recorded outputs were produced against the same candidate point set".to_string()
            }
            EvalError::CsvError(_) => "Verify the CSV headers and that every row has the same number of columns".to_string(),
            EvalError::EmptyData { .. } => "Provide a non-empty split file and candidate set".to_string(),
            EvalError::IoError(_) => "Check that the path exists and is readable".to_string(),
            EvalError::ConfigValidationError { .. }
            | EvalError::InvalidConfigValueError { .. }
            | EvalError::MissingConfigError { .. } => "Fix the configuration value and run again".to_string(),
            EvalError::TomlError(_) => "Check the TOML syntax and the table and field names".to_string(),
            EvalError::ValidationError { .. } => "Inspect the offending rows in the input files".to_string(),
            EvalError::SerializationError(_) => "Check that the report path is writable".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Could not read evaluation inputs: {}", self),
            ErrorCategory::Processing => format!("Evaluation failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.severity().exit_code()
    }
}

impl ErrorSeverity {
    /// Process exit status for a run that stopped at this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

/// Most severe of several failures, for runs that keep going after an error.
pub fn worst_severity<'a, I>(errors: I) -> Option<ErrorSeverity>
where
    I: IntoIterator<Item = &'a EvalError>,
{
    errors.into_iter().map(EvalError::severity).max()
}

pub type Result<T> = std::result::Result<T, EvalError>;
