use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum WorkshopError {
    DatabaseError(String),
    ConfigurationError(String),
    SetupError(String),
}

impl fmt::Display for WorkshopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkshopError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            WorkshopError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            WorkshopError::SetupError(msg) => write!(f, "Setup error: {msg}"),
        }
    }
}

impl std::error::Error for WorkshopError {}

impl From<sqlx::Error> for WorkshopError {
    fn from(err: sqlx::Error) -> Self {
        WorkshopError::DatabaseError(err.to_string())
    }
}

impl From<config::ConfigError> for WorkshopError {
    fn from(err: config::ConfigError) -> Self {
        WorkshopError::ConfigurationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WorkshopError>;
