use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Invalid state: {message}")]
    InvalidState { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Server,
    Configuration,
    Input,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ClientError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ClientError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        ClientError::InvalidState {
            message: message.into(),
        }
    }

    /// Status code returned by the server, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::ApiError { status, .. } => Some(*status),
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the caller has to log in again before retrying.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized { .. } | ClientError::NotAuthenticated
        )
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::HttpError(_) => ErrorCategory::Network,
            ClientError::Unauthorized { .. } | ClientError::NotAuthenticated => {
                ErrorCategory::Authentication
            }
            ClientError::ApiError { status, .. } if *status >= 500 => ErrorCategory::Server,
            ClientError::ApiError { .. } => ErrorCategory::Input,
            ClientError::SerializationError(_) => ErrorCategory::Server,
            ClientError::ConfigError { .. }
            | ClientError::InvalidConfigValueError { .. }
            | ClientError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ClientError::ValidationError { .. } | ClientError::InvalidState { .. } => {
                ErrorCategory::Input
            }
            ClientError::IoError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Server => ErrorSeverity::Medium,
            ErrorCategory::Authentication | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ClientError::HttpError(_) => "Could not reach the time tracking server".to_string(),
            ClientError::ApiError { message, .. } => message.clone(),
            ClientError::Unauthorized { message } => message.clone(),
            ClientError::NotAuthenticated => "You are not logged in".to_string(),
            ClientError::ValidationError { message, .. } => message.clone(),
            ClientError::InvalidState { message } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection and the configured API URL",
            ErrorCategory::Authentication => "Run `timeclock login` to sign in again",
            ErrorCategory::Server => "Try again later or contact your administrator",
            ErrorCategory::Configuration => "Check the config file and TIMECLOCK_API_URL",
            ErrorCategory::Input => "Check the command arguments and try again",
            ErrorCategory::Storage => "Check that the token file location is writable",
        }
    }
}

/// Request payload checks report the first failing field, in field-name order.
impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.first() {
            Some((field, field_errors)) => {
                let message = field_errors
                    .first()
                    .and_then(|error| error.message.as_ref())
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                ClientError::ValidationError {
                    field: field.to_string(),
                    message,
                }
            }
            None => ClientError::validation("request", errors.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_requires_login() {
        let err = ClientError::Unauthorized {
            message: "Token expired".to_string(),
        };
        assert!(err.requires_login());
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.category(), ErrorCategory::Authentication);
    }

    #[test]
    fn server_errors_are_retryable_severity() {
        let err = ClientError::ApiError {
            status: 503,
            message: "Service unavailable".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Server);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.user_friendly_message(), "Service unavailable");
    }

    #[test]
    fn client_side_api_errors_are_input_errors() {
        let err = ClientError::ApiError {
            status: 409,
            message: "Already checked in".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(!err.requires_login());
    }

    #[test]
    fn validation_errors_keep_field_and_message() {
        let mut errors = validator::ValidationErrors::new();
        let mut error = validator::ValidationError::new("email");
        error.message = Some("Please enter a valid email address".into());
        errors.add("email", error);

        match ClientError::from(errors) {
            ClientError::ValidationError { field, message } => {
                assert_eq!(field, "email");
                assert_eq!(message, "Please enter a valid email address");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
