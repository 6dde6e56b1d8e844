use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrinityError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Session is missing, expired or was rejected by the API")]
    Unauthorized,

    #[error("{entity} #{id} not found")]
    NotFound { entity: String, id: i64 },

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

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TrinityError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::HttpStatus { .. } => ErrorCategory::Network,
            Self::Unauthorized => ErrorCategory::Authentication,
            Self::NotFound { .. }
            | Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::ValidationError { .. } => ErrorCategory::Data,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::ZipError(_) | Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. } => ErrorSeverity::Low,
            Self::ApiError(_) | Self::HttpStatus { .. } | Self::Unauthorized => {
                ErrorSeverity::Medium
            }
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::ValidationError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::High,
            Self::ZipError(_) | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ApiError(_) => "Check that the API server is reachable and the --api-url is correct",
            Self::HttpStatus { status, .. } if *status >= 500 => {
                "The API server failed; retry later or check the server logs"
            }
            Self::HttpStatus { .. } => "Check the request values against what the API accepts",
            Self::Unauthorized => "Run `trinity login` to obtain a new session",
            Self::NotFound { .. } => "List the entities to find a valid id",
            Self::CsvError(_) | Self::SerializationError(_) => {
                "The API returned data in an unexpected shape; re-run with --verbose"
            }
            Self::ValidationError { .. } => "Fix the highlighted field and try again",
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Check the configuration file and command-line flags"
            }
            Self::ZipError(_) | Self::IoError(_) => {
                "Check that the output directory exists and is writable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(e) if e.is_timeout() => "The API did not answer in time".to_string(),
            Self::ApiError(e) if e.is_connect() => "Could not connect to the API".to_string(),
            Self::Unauthorized => "You are not logged in, or your session expired".to_string(),
            Self::HttpStatus { status, .. } => format!("The API rejected the request (HTTP {})", status),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrinityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_is_retryable_auth_error() {
        let err = TrinityError::Unauthorized;
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.recovery_suggestion().contains("login"));
    }

    #[test]
    fn test_http_status_message() {
        let err = TrinityError::HttpStatus {
            status: 400,
            body: "{\"price\":[\"required\"]}".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.user_friendly_message(), "The API rejected the request (HTTP 400)");
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = TrinityError::InvalidConfigValueError {
            field: "backfill.delay_seconds".to_string(),
            value: "1e30".to_string(),
            reason: "out of range".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
