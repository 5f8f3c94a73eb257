//! Partner directory domain module
//!
//! Projects reference three kinds of people: architects, contractors, and
//! customers. This module manages those directory entries.
//!
//! # Architecture
//!
//! - **Entities**: `Party`, `NewParty`, `PartyKind`
//! - **Repository**: `DirectoryRepository` for database operations

pub mod entity;
pub mod repository;

// Re-export main types
pub use entity::{NewParty, Party, PartyKind};
pub use repository::DirectoryRepository;
