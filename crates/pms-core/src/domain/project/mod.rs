//! Project domain module
//!
//! The heart of the system: the project record lifecycle and its
//! persistence contract.
//!
//! # Architecture
//!
//! - **Entities**: `Project`, `NewProject`, `ProjectPatch`, `ProjectDetails`
//! - **Repository**: `ProjectRepository` for database operations
//!
//! # Lifecycle
//!
//! A project is created (name optionally derived from the building type
//! and the customer's surname), patched zero or more times, optionally
//! finalised with a completion date, and may be deleted at any point.
//!
//! # Example
//!
//! ```ignore
//! use pms_core::domain::project::{NewProject, ProjectRepository};
//!
//! let repo = ProjectRepository::new(db.pool().clone());
//!
//! let project = repo.create(&new_project).await?;
//! let details = repo.find_by_number(project.project_no).await?;
//!
//! repo.finalize(project.project_no, completion_date).await?;
//! ```

pub mod entity;
pub mod repository;

// Re-export main types
pub use entity::{NewProject, Project, ProjectDetails, ProjectPatch};
pub use repository::ProjectRepository;
