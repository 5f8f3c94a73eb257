//! Project entity and related types
//!
//! Defines the core Project record, the creation and patch shapes consumed
//! by the repository, and the display-joined form carrying partner names.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::directory::Party;
use crate::error::{Error, Result};

/// A construction or renovation project tracked by the office
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Identity assigned by the persistence layer; stable and never reused
    pub project_no: i64,

    /// Display name; derived from building type and customer surname when
    /// not supplied at creation
    pub name: String,

    /// Building category, free form ("House", "Warehouse", ...)
    pub building_type: String,

    /// Physical address of the site
    pub address: String,

    /// ERF (land registration) number of the site
    pub erf_no: String,

    /// Total fee charged for the project
    pub total_fee: Decimal,

    /// Amount the customer has paid to date
    pub amount_paid: Decimal,

    /// Date the work is due
    pub deadline: NaiveDate,

    /// Whether the project has been finalised
    pub finalised: bool,

    /// Date the work was completed; present exactly when finalised
    pub completion_date: Option<NaiveDate>,

    /// Architect responsible for the design
    pub architect_id: i64,

    /// Contractor doing the work
    pub contractor_id: i64,

    /// Customer the work is done for
    pub customer_id: i64,
}

impl Project {
    /// Amount still owed by the customer
    pub fn outstanding(&self) -> Decimal {
        self.total_fee - self.amount_paid
    }

    /// Whether the project is past its deadline and still unfinalised.
    ///
    /// A project due on `as_of` itself is not overdue yet.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        !self.finalised && self.deadline < as_of
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let completion = self
            .completion_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());

        writeln!(f, "Project Number:   {}", self.project_no)?;
        writeln!(f, "Project Name:     {}", self.name)?;
        writeln!(f, "Building Type:    {}", self.building_type)?;
        writeln!(f, "Address:          {}", self.address)?;
        writeln!(f, "ERF Number:       {}", self.erf_no)?;
        writeln!(f, "Total Fee:        {}", self.total_fee)?;
        writeln!(f, "Amount Paid:      {}", self.amount_paid)?;
        writeln!(f, "Deadline:         {}", self.deadline)?;
        writeln!(f, "Finalised:        {}", if self.finalised { "yes" } else { "no" })?;
        writeln!(f, "Completion Date:  {}", completion)?;
        writeln!(f, "Architect ID:     {}", self.architect_id)?;
        writeln!(f, "Contractor ID:    {}", self.contractor_id)?;
        write!(f, "Customer ID:      {}", self.customer_id)
    }
}

/// Fields for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    /// Explicit name; when `None` or blank the repository derives
    /// `"<building_type> <customer surname>"`
    pub name: Option<String>,
    pub building_type: String,
    pub address: String,
    pub erf_no: String,
    pub total_fee: Decimal,
    pub amount_paid: Decimal,
    pub deadline: NaiveDate,
    /// Almost always false at creation; a caller importing historical
    /// records may set it, paired with a completion date
    pub finalised: bool,
    pub completion_date: Option<NaiveDate>,
    pub architect_id: i64,
    pub contractor_id: i64,
    pub customer_id: i64,
}

impl NewProject {
    /// Check field-level constraints before the row is written
    pub fn validate(&self) -> Result<()> {
        validate_amount("total fee", self.total_fee)?;
        validate_amount("amount paid", self.amount_paid)?;
        match (self.finalised, self.completion_date) {
            (true, None) => Err(Error::Validation(
                "a finalised project must carry a completion date".to_string(),
            )),
            (false, Some(_)) => Err(Error::Validation(
                "a completion date requires the project to be finalised".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Optional-field delta for updating a project.
///
/// Unset fields keep their stored values. Finalisation state is not
/// patchable here; `finalize` is the only path that flips it, which keeps
/// the finalised/completion-date pairing in one place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub building_type: Option<String>,
    pub address: Option<String>,
    pub erf_no: Option<String>,
    pub total_fee: Option<Decimal>,
    pub amount_paid: Option<Decimal>,
    pub deadline: Option<NaiveDate>,
    pub architect_id: Option<i64>,
    pub contractor_id: Option<i64>,
    pub customer_id: Option<i64>,
}

impl ProjectPatch {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.building_type.is_none()
            && self.address.is_none()
            && self.erf_no.is_none()
            && self.total_fee.is_none()
            && self.amount_paid.is_none()
            && self.deadline.is_none()
            && self.architect_id.is_none()
            && self.contractor_id.is_none()
            && self.customer_id.is_none()
    }

    /// Check field-level constraints on the fields that are set
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::Validation("project name must not be blank".to_string()));
            }
        }
        if let Some(fee) = self.total_fee {
            validate_amount("total fee", fee)?;
        }
        if let Some(paid) = self.amount_paid {
            validate_amount("amount paid", paid)?;
        }
        Ok(())
    }
}

/// A project joined with the names of its three partners, the shape every
/// display read returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    pub project: Project,
    pub architect: Party,
    pub contractor: Party,
    pub customer: Party,
}

impl fmt::Display for ProjectDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.project)?;
        writeln!(f, "Architect:        {}", self.architect)?;
        writeln!(f, "Contractor:       {}", self.contractor)?;
        write!(f, "Customer:         {}", self.customer)
    }
}

/// Reject negative monetary amounts.
///
/// Overpayment is deliberately allowed: `amount_paid` may exceed
/// `total_fee` (deposits and staged billing make that a legitimate state).
pub fn validate_amount(label: &str, amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(Error::Validation(format!("{} must not be negative", label)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_new_project() -> NewProject {
        NewProject {
            name: Some("Riverside Warehouse".to_string()),
            building_type: "Warehouse".to_string(),
            address: "12 Rail Yard Rd, Durban".to_string(),
            erf_no: "ERF-2041".to_string(),
            total_fee: Decimal::new(100_000, 0),
            amount_paid: Decimal::ZERO,
            deadline: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            finalised: false,
            completion_date: None,
            architect_id: 1,
            contractor_id: 1,
            customer_id: 1,
        }
    }

    #[test]
    fn test_new_project_validation() {
        assert!(sample_new_project().validate().is_ok());

        let mut negative = sample_new_project();
        negative.total_fee = Decimal::new(-1, 0);
        assert!(negative.validate().is_err());

        let mut negative = sample_new_project();
        negative.amount_paid = Decimal::new(-50, 2);
        assert!(negative.validate().is_err());

        // Overpayment is allowed
        let mut overpaid = sample_new_project();
        overpaid.amount_paid = Decimal::new(200_000, 0);
        assert!(overpaid.validate().is_ok());
    }

    #[test]
    fn test_new_project_completion_pairing() {
        let mut finalised = sample_new_project();
        finalised.finalised = true;
        assert!(finalised.validate().is_err());

        finalised.completion_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert!(finalised.validate().is_ok());

        let mut dangling_date = sample_new_project();
        dangling_date.completion_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert!(dangling_date.validate().is_err());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ProjectPatch::default().is_empty());

        let patch = ProjectPatch {
            address: Some("7 Harbour View".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_validation() {
        let patch = ProjectPatch {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = ProjectPatch {
            total_fee: Some(Decimal::new(-1, 0)),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = ProjectPatch {
            total_fee: Some(Decimal::new(5_000, 0)),
            deadline: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_outstanding_and_overdue() {
        let project = Project {
            project_no: 1,
            name: "Riverside Warehouse".to_string(),
            building_type: "Warehouse".to_string(),
            address: "12 Rail Yard Rd, Durban".to_string(),
            erf_no: "ERF-2041".to_string(),
            total_fee: Decimal::new(100_000, 0),
            amount_paid: Decimal::new(25_000, 0),
            deadline: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            finalised: false,
            completion_date: None,
            architect_id: 1,
            contractor_id: 1,
            customer_id: 1,
        };

        assert_eq!(project.outstanding(), Decimal::new(75_000, 0));

        // Due today is not overdue; due yesterday is
        assert!(!project.is_overdue(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(project.is_overdue(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));

        let mut finalised = project.clone();
        finalised.finalised = true;
        finalised.completion_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert!(!finalised.is_overdue(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
    }

    #[test]
    fn test_display_names_every_field() {
        let project = Project {
            project_no: 7,
            name: "Warehouse Dlamini".to_string(),
            building_type: "Warehouse".to_string(),
            address: "12 Rail Yard Rd, Durban".to_string(),
            erf_no: "ERF-2041".to_string(),
            total_fee: Decimal::new(100_000, 0),
            amount_paid: Decimal::ZERO,
            deadline: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            finalised: false,
            completion_date: None,
            architect_id: 1,
            contractor_id: 2,
            customer_id: 3,
        };

        let rendered = project.to_string();
        for label in [
            "Project Number",
            "Project Name",
            "Building Type",
            "Address",
            "ERF Number",
            "Total Fee",
            "Amount Paid",
            "Deadline",
            "Finalised",
            "Completion Date",
            "Architect ID",
            "Contractor ID",
            "Customer ID",
        ] {
            assert!(rendered.contains(label), "missing label: {}", label);
        }
        assert!(rendered.contains("Warehouse Dlamini"));
        // Absent completion date renders as a placeholder, not as empty
        assert!(rendered.contains("Completion Date:  -"));
    }
}
