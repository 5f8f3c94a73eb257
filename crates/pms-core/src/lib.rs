//! PMS Core Library
//!
//! This crate provides the core functionality for PMS, a project
//! management system for a small structural engineering firm, including:
//! - Project records (creation, patch updates, finalisation, listings)
//! - Partner directory (architects, contractors, customers)
//! - Storage (SQLite with versioned migrations)
//! - Configuration with file persistence

pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::directory::{DirectoryRepository, NewParty, Party, PartyKind};
    pub use crate::domain::project::{
        NewProject, Project, ProjectDetails, ProjectPatch, ProjectRepository,
    };
    pub use crate::error::{Error, Result};
    pub use crate::storage::{Database, DatabaseConfig};
}
