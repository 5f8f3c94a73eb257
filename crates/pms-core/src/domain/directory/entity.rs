//! Partner entities and related types
//!
//! Defines the three kinds of people a project references: the architect
//! who designed it, the contractor building it, and the customer paying
//! for it. All three share the same shape and are routed by `PartyKind`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// The three partner roles a project references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyKind {
    Architect,
    Contractor,
    Customer,
}

impl PartyKind {
    /// Create from string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "architect" => Some(Self::Architect),
            "contractor" => Some(Self::Contractor),
            "customer" => Some(Self::Customer),
            _ => None,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Architect => "architect",
            Self::Contractor => "contractor",
            Self::Customer => "customer",
        }
    }

    /// Table holding this kind of partner.
    ///
    /// Queries interpolate this into SQL, so it must stay a closed set of
    /// fixed identifiers, never caller input.
    pub(crate) fn table(&self) -> &'static str {
        match self {
            Self::Architect => "architects",
            Self::Contractor => "contractors",
            Self::Customer => "customers",
        }
    }

    /// Error for a missing partner of this kind
    pub(crate) fn not_found(&self, id: i64) -> Error {
        match self {
            Self::Architect => Error::ArchitectNotFound(id),
            Self::Contractor => Error::ContractorNotFound(id),
            Self::Customer => Error::CustomerNotFound(id),
        }
    }
}

impl fmt::Display for PartyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A person in the partner directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Identifier assigned by the persistence layer
    pub id: i64,

    pub first_name: String,

    pub last_name: String,
}

impl Party {
    /// Full display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Fields for adding a person to the directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewParty {
    pub first_name: String,
    pub last_name: String,
}

impl NewParty {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Check field-level constraints
    pub fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(Error::Validation("first name must not be empty".to_string()));
        }
        if self.last_name.trim().is_empty() {
            return Err(Error::Validation("last name must not be empty".to_string()));
        }
        Ok(())
    }
}
