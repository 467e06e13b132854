use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Inference request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Input file '{path}' has no '{column}' column")]
    MissingColumnError { path: String, column: String },

    #[error("Inference service returned {status}: {message}")]
    InferenceError { status: u16, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Inference,
    Output,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigValidationError { .. } | EtlError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            EtlError::CsvError(_) | EtlError::MissingColumnError { .. } => ErrorCategory::Input,
            EtlError::ApiError(_) | EtlError::InferenceError { .. } => ErrorCategory::Inference,
            EtlError::IoError(_) | EtlError::SerializationError(_) => ErrorCategory::Output,
            EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 推論服務可能只是尚未啟動，重跑即可
            EtlError::ApiError(_) | EtlError::InferenceError { .. } => ErrorSeverity::Medium,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingColumnError { .. }
            | EtlError::CsvError(_)
            | EtlError::ProcessingError { .. } => ErrorSeverity::High,
            EtlError::IoError(_) | EtlError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ApiError(_) => {
                "Make sure Ollama is running (`ollama serve`) and reachable at the configured endpoint".to_string()
            }
            EtlError::InferenceError { status: 404, .. } => {
                "The model is not available locally, run `ollama pull <model>` first".to_string()
            }
            EtlError::InferenceError { .. } => {
                "Check the Ollama server logs for the failing request".to_string()
            }
            EtlError::MissingColumnError { column, .. } => {
                format!("Add a '{}' column to the input file or pass --note-column", column)
            }
            EtlError::CsvError(_) => "Check that the input file is valid UTF-8 CSV".to_string(),
            EtlError::ConfigValidationError { field, .. }
            | EtlError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting and try again", field)
            }
            EtlError::IoError(_) => {
                "Check that the input file exists and the output directory is writable".to_string()
            }
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                "Re-run with --verbose to see the failing step".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Could not read the notes dataset: {}", self),
            ErrorCategory::Inference => format!("The model service failed: {}", self),
            ErrorCategory::Output => format!("Could not write results: {}", self),
            ErrorCategory::Processing => format!("Processing stopped: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
