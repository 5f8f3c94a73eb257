//! Error types for PMS

use thiserror::Error;

/// Result type alias using PMS's Error
pub type Result<T> = std::result::Result<T, Error>;

/// PMS error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Entity errors (E001-E099)
    #[error("Project {0} not found. Run `pms incomplete` to see open projects.")]
    ProjectNotFound(i64),

    #[error("Customer {0} not found. Run `pms customers list` to see all customers.")]
    CustomerNotFound(i64),

    #[error("Architect {0} not found. Run `pms architects list` to see all architects.")]
    ArchitectNotFound(i64),

    #[error("Contractor {0} not found. Run `pms contractors list` to see all contractors.")]
    ContractorNotFound(i64),

    // Validation errors (E100-E199)
    #[error("Invalid input: {0}")]
    Validation(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored value could not be read: {0}")]
    Parse(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::ProjectNotFound(_) => "E001",
            Self::CustomerNotFound(_) => "E002",
            Self::ArchitectNotFound(_) => "E003",
            Self::ContractorNotFound(_) => "E004",
            Self::Validation(_) => "E100",
            Self::Database(_) => "E400",
            Self::Parse(_) => "E401",
            Self::Config(_) => "E600",
            Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ProjectNotFound(_) => Some("pms incomplete".to_string()),
            Self::CustomerNotFound(_) => Some("pms customers list".to_string()),
            Self::ArchitectNotFound(_) => Some("pms architects list".to_string()),
            Self::ContractorNotFound(_) => Some("pms contractors list".to_string()),
            Self::Config(_) => Some("pms config list".to_string()),
            _ => None,
        }
    }
}
