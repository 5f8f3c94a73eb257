//! Project repository for database operations
//!
//! Handles all reads and writes of persisted project state, including the
//! lifecycle rules (creation with derived names, patch updates,
//! finalisation) and the joined reads that attach partner names.

use super::entity::{NewProject, Project, ProjectDetails, ProjectPatch};
use crate::domain::directory::{DirectoryRepository, Party, PartyKind};
use crate::error::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::SqlitePool;

/// Column list shared by the plain project queries
const PROJECT_COLUMNS: &str = "project_no, name, building_type, address, erf_no, \
     total_fee, amount_paid, deadline, finalised, completion_date, \
     architect_id, contractor_id, customer_id";

/// Joined SELECT used by every display read.
///
/// Inner joins mean a project whose architect, contractor, or customer row
/// has been removed is invisible here even though its row still exists;
/// `list_orphaned` is the audit path for those.
const DETAILS_SELECT: &str = "SELECT project_no, name, building_type, address, erf_no, \
            total_fee, amount_paid, deadline, finalised, completion_date, \
            architect_id, contractor_id, customer_id, \
            a.first_name AS architect_first_name, a.last_name AS architect_last_name, \
            b.first_name AS contractor_first_name, b.last_name AS contractor_last_name, \
            c.first_name AS customer_first_name, c.last_name AS customer_last_name \
     FROM projects \
     INNER JOIN architects a ON a.id = architect_id \
     INNER JOIN contractors b ON b.id = contractor_id \
     INNER JOIN customers c ON c.id = customer_id";

/// Repository for project database operations
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: SqlitePool,
}

impl ProjectRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn directory(&self) -> DirectoryRepository {
        DirectoryRepository::new(self.pool.clone())
    }

    /// Create a new project, returning the stored row with its assigned
    /// project number.
    ///
    /// The referenced architect, contractor, and customer must exist. When
    /// the name is absent or blank it is derived as
    /// `"<building_type> <customer surname>"`.
    pub async fn create(&self, project: &NewProject) -> Result<Project> {
        project.validate()?;

        let directory = self.directory();
        directory
            .require(PartyKind::Architect, project.architect_id)
            .await?;
        directory
            .require(PartyKind::Contractor, project.contractor_id)
            .await?;
        directory
            .require(PartyKind::Customer, project.customer_id)
            .await?;

        let name = match &project.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => {
                let surname = self.customer_surname(project.customer_id).await?;
                format!("{} {}", project.building_type, surname)
            }
        };

        let row: ProjectRow = sqlx::query_as(&format!(
            "INSERT INTO projects \
             (name, building_type, address, erf_no, total_fee, amount_paid, deadline, \
              finalised, completion_date, architect_id, contractor_id, customer_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(&name)
        .bind(&project.building_type)
        .bind(&project.address)
        .bind(&project.erf_no)
        .bind(project.total_fee.to_string())
        .bind(project.amount_paid.to_string())
        .bind(project.deadline)
        .bind(project.finalised)
        .bind(project.completion_date)
        .bind(project.architect_id)
        .bind(project.contractor_id)
        .bind(project.customer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.into_project()
    }

    /// Look a project up by its number, joined with partner names.
    ///
    /// `None` means no visible row: either the number does not exist or
    /// the project has lost a partner to deletion.
    pub async fn find_by_number(&self, project_no: i64) -> Result<Option<ProjectDetails>> {
        let row: Option<DetailsRow> =
            sqlx::query_as(&format!("{} WHERE project_no = ?", DETAILS_SELECT))
                .bind(project_no)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;

        row.map(DetailsRow::into_details).transpose()
    }

    /// Look a project up by exact name, joined with partner names.
    ///
    /// Matching is exact under the backend's collation (case sensitive for
    /// SQLite's default). Names are not unique; when several projects share
    /// one, an arbitrary match is returned.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<ProjectDetails>> {
        let row: Option<DetailsRow> =
            sqlx::query_as(&format!("{} WHERE name = ? LIMIT 1", DETAILS_SELECT))
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;

        row.map(DetailsRow::into_details).transpose()
    }

    /// Apply a patch to a project, returning the updated row.
    ///
    /// Unset patch fields keep their stored values. A missing project
    /// number is an error, not a silent no-op.
    pub async fn update(&self, project_no: i64, patch: &ProjectPatch) -> Result<Project> {
        patch.validate()?;

        let directory = self.directory();
        if let Some(id) = patch.architect_id {
            directory.require(PartyKind::Architect, id).await?;
        }
        if let Some(id) = patch.contractor_id {
            directory.require(PartyKind::Contractor, id).await?;
        }
        if let Some(id) = patch.customer_id {
            directory.require(PartyKind::Customer, id).await?;
        }

        let row: Option<ProjectRow> = sqlx::query_as(&format!(
            "UPDATE projects SET \
                name = COALESCE(?, name), \
                building_type = COALESCE(?, building_type), \
                address = COALESCE(?, address), \
                erf_no = COALESCE(?, erf_no), \
                total_fee = COALESCE(?, total_fee), \
                amount_paid = COALESCE(?, amount_paid), \
                deadline = COALESCE(?, deadline), \
                architect_id = COALESCE(?, architect_id), \
                contractor_id = COALESCE(?, contractor_id), \
                customer_id = COALESCE(?, customer_id) \
             WHERE project_no = ? \
             RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(&patch.name)
        .bind(&patch.building_type)
        .bind(&patch.address)
        .bind(&patch.erf_no)
        .bind(patch.total_fee.map(|f| f.to_string()))
        .bind(patch.amount_paid.map(|f| f.to_string()))
        .bind(patch.deadline)
        .bind(patch.architect_id)
        .bind(patch.contractor_id)
        .bind(patch.customer_id)
        .bind(project_no)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => row.into_project(),
            None => Err(Error::ProjectNotFound(project_no)),
        }
    }

    /// Mark a project finalised with the given completion date.
    ///
    /// Applied unconditionally: finalising an already-finalised project
    /// simply overwrites the completion date, and the date is not checked
    /// against the deadline. A missing project number is an error.
    pub async fn finalize(&self, project_no: i64, completion_date: NaiveDate) -> Result<Project> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!(
            "UPDATE projects SET finalised = 1, completion_date = ? \
             WHERE project_no = ? \
             RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(completion_date)
        .bind(project_no)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => row.into_project(),
            None => Err(Error::ProjectNotFound(project_no)),
        }
    }

    /// List every unfinalised project, joined with partner names.
    ///
    /// Rows come back ordered by project number, but callers should treat
    /// the order as unspecified.
    pub async fn list_incomplete(&self) -> Result<Vec<ProjectDetails>> {
        let rows: Vec<DetailsRow> = sqlx::query_as(&format!(
            "{} WHERE finalised = 0 ORDER BY project_no",
            DETAILS_SELECT
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(DetailsRow::into_details).collect()
    }

    /// List every unfinalised project whose deadline is strictly before
    /// `as_of`, joined with partner names.
    ///
    /// The evaluation date is a parameter so the comparison is
    /// deterministic; a project due on `as_of` itself is not overdue.
    pub async fn list_overdue(&self, as_of: NaiveDate) -> Result<Vec<ProjectDetails>> {
        let rows: Vec<DetailsRow> = sqlx::query_as(&format!(
            "{} WHERE finalised = 0 AND deadline < ? ORDER BY project_no",
            DETAILS_SELECT
        ))
        .bind(as_of)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(DetailsRow::into_details).collect()
    }

    /// List projects that have lost their architect, contractor, or
    /// customer to deletion and are therefore invisible to the joined
    /// reads.
    pub async fn list_orphaned(&self) -> Result<Vec<Project>> {
        let rows: Vec<ProjectRow> = sqlx::query_as(&format!(
            "SELECT {} FROM projects \
             LEFT JOIN architects a ON a.id = architect_id \
             LEFT JOIN contractors b ON b.id = contractor_id \
             LEFT JOIN customers c ON c.id = customer_id \
             WHERE a.id IS NULL OR b.id IS NULL OR c.id IS NULL \
             ORDER BY project_no",
            PROJECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(ProjectRow::into_project).collect()
    }

    /// Delete a project permanently.
    ///
    /// Deleting a number that does not exist is a quiet no-op; the return
    /// value says whether a row was actually removed.
    pub async fn delete(&self, project_no: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE project_no = ?")
            .bind(project_no)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Resolve a customer's surname, used to derive project names
    pub async fn customer_surname(&self, customer_id: i64) -> Result<String> {
        let row: Option<(String,)> = sqlx::query_as("SELECT last_name FROM customers WHERE id = ?")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        match row {
            Some((surname,)) => Ok(surname),
            None => Err(Error::CustomerNotFound(customer_id)),
        }
    }
}

// ========== Database Row Types ==========

/// Database row for a bare project
#[derive(sqlx::FromRow)]
struct ProjectRow {
    project_no: i64,
    name: String,
    building_type: String,
    address: String,
    erf_no: String,
    total_fee: String,
    amount_paid: String,
    deadline: NaiveDate,
    finalised: bool,
    completion_date: Option<NaiveDate>,
    architect_id: i64,
    contractor_id: i64,
    customer_id: i64,
}

impl ProjectRow {
    fn into_project(self) -> Result<Project> {
        let total_fee = parse_amount("total_fee", &self.total_fee)?;
        let amount_paid = parse_amount("amount_paid", &self.amount_paid)?;

        Ok(Project {
            project_no: self.project_no,
            name: self.name,
            building_type: self.building_type,
            address: self.address,
            erf_no: self.erf_no,
            total_fee,
            amount_paid,
            deadline: self.deadline,
            finalised: self.finalised,
            completion_date: self.completion_date,
            architect_id: self.architect_id,
            contractor_id: self.contractor_id,
            customer_id: self.customer_id,
        })
    }
}

/// Database row for a project joined with partner names
#[derive(sqlx::FromRow)]
struct DetailsRow {
    project_no: i64,
    name: String,
    building_type: String,
    address: String,
    erf_no: String,
    total_fee: String,
    amount_paid: String,
    deadline: NaiveDate,
    finalised: bool,
    completion_date: Option<NaiveDate>,
    architect_id: i64,
    contractor_id: i64,
    customer_id: i64,
    architect_first_name: String,
    architect_last_name: String,
    contractor_first_name: String,
    contractor_last_name: String,
    customer_first_name: String,
    customer_last_name: String,
}

impl DetailsRow {
    fn into_details(self) -> Result<ProjectDetails> {
        let total_fee = parse_amount("total_fee", &self.total_fee)?;
        let amount_paid = parse_amount("amount_paid", &self.amount_paid)?;

        Ok(ProjectDetails {
            project: Project {
                project_no: self.project_no,
                name: self.name,
                building_type: self.building_type,
                address: self.address,
                erf_no: self.erf_no,
                total_fee,
                amount_paid,
                deadline: self.deadline,
                finalised: self.finalised,
                completion_date: self.completion_date,
                architect_id: self.architect_id,
                contractor_id: self.contractor_id,
                customer_id: self.customer_id,
            },
            architect: Party {
                id: self.architect_id,
                first_name: self.architect_first_name,
                last_name: self.architect_last_name,
            },
            contractor: Party {
                id: self.contractor_id,
                first_name: self.contractor_first_name,
                last_name: self.contractor_last_name,
            },
            customer: Party {
                id: self.customer_id,
                first_name: self.customer_first_name,
                last_name: self.customer_last_name,
            },
        })
    }
}

/// Fees persist as TEXT so they round-trip exactly; a cell that does not
/// parse as a decimal is data corruption, surfaced as a parse error.
fn parse_amount(column: &str, raw: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .map_err(|e| Error::Parse(format!("Invalid {} amount '{}': {}", column, raw, e)))
}
