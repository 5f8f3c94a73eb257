//! Partner directory repository for database operations
//!
//! Handles all database interactions for architects, contractors, and
//! customers. The three tables share one shape, so one repository serves
//! all of them, routed by `PartyKind`.

use super::entity::{NewParty, Party, PartyKind};
use crate::error::{Error, Result};
use sqlx::SqlitePool;

/// Repository for partner directory operations
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: SqlitePool,
}

impl DirectoryRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a person to the directory, returning the stored row
    pub async fn create(&self, kind: PartyKind, party: &NewParty) -> Result<Party> {
        party.validate()?;

        let row: PartyRow = sqlx::query_as(&format!(
            "INSERT INTO {} (first_name, last_name) VALUES (?, ?) \
             RETURNING id, first_name, last_name",
            kind.table()
        ))
        .bind(&party.first_name)
        .bind(&party.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.into_party())
    }

    /// Get a person by identifier
    pub async fn get(&self, kind: PartyKind, id: i64) -> Result<Option<Party>> {
        let row: Option<PartyRow> = sqlx::query_as(&format!(
            "SELECT id, first_name, last_name FROM {} WHERE id = ?",
            kind.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(PartyRow::into_party))
    }

    /// List everyone of one kind, ordered by name
    pub async fn list(&self, kind: PartyKind) -> Result<Vec<Party>> {
        let rows: Vec<PartyRow> = sqlx::query_as(&format!(
            "SELECT id, first_name, last_name FROM {} \
             ORDER BY last_name, first_name",
            kind.table()
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(PartyRow::into_party).collect())
    }

    /// Remove a person by identifier.
    ///
    /// Projects referencing the removed person are not touched; they stay
    /// in the table but drop out of joined reads until repointed. Removing
    /// an unknown identifier is a no-op.
    pub async fn delete(&self, kind: PartyKind, id: i64) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", kind.table()))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Check that a person exists, mapping absence to the kind's error
    pub(crate) async fn require(&self, kind: PartyKind, id: i64) -> Result<()> {
        let row: Option<(i64,)> =
            sqlx::query_as(&format!("SELECT id FROM {} WHERE id = ?", kind.table()))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;

        match row {
            Some(_) => Ok(()),
            None => Err(kind.not_found(id)),
        }
    }
}

// ========== Database Row Types ==========

#[derive(sqlx::FromRow)]
struct PartyRow {
    id: i64,
    first_name: String,
    last_name: String,
}

impl PartyRow {
    fn into_party(self) -> Party {
        Party {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    async fn create_test_db() -> SqlitePool {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        db.pool().clone()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = create_test_db().await;
        let repo = DirectoryRepository::new(pool);

        let customer = repo
            .create(PartyKind::Customer, &NewParty::new("Thandi", "Dlamini"))
            .await
            .expect("Failed to create");

        assert!(customer.id > 0);
        assert_eq!(customer.full_name(), "Thandi Dlamini");

        let retrieved = repo
            .get(PartyKind::Customer, customer.id)
            .await
            .expect("Failed to get")
            .expect("Customer not found");
        assert_eq!(retrieved, customer);

        // Same id in another table is a different person
        let missing = repo
            .get(PartyKind::Architect, customer.id)
            .await
            .expect("Failed to get");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_names() {
        let pool = create_test_db().await;
        let repo = DirectoryRepository::new(pool);

        let result = repo
            .create(PartyKind::Architect, &NewParty::new("  ", "Ndlovu"))
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        let pool = create_test_db().await;
        let repo = DirectoryRepository::new(pool);

        repo.create(PartyKind::Architect, &NewParty::new("Pieter", "van Wyk"))
            .await
            .unwrap();
        repo.create(PartyKind::Architect, &NewParty::new("Lerato", "Mokoena"))
            .await
            .unwrap();
        repo.create(PartyKind::Architect, &NewParty::new("Anele", "Mokoena"))
            .await
            .unwrap();

        let architects = repo.list(PartyKind::Architect).await.expect("Failed to list");
        let names: Vec<String> = architects.iter().map(Party::full_name).collect();
        assert_eq!(names, vec!["Anele Mokoena", "Lerato Mokoena", "Pieter van Wyk"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = create_test_db().await;
        let repo = DirectoryRepository::new(pool);

        let contractor = repo
            .create(PartyKind::Contractor, &NewParty::new("Sipho", "Ndlovu"))
            .await
            .unwrap();

        let deleted = repo
            .delete(PartyKind::Contractor, contractor.id)
            .await
            .expect("Failed to delete");
        assert!(deleted);

        let retrieved = repo.get(PartyKind::Contractor, contractor.id).await.unwrap();
        assert!(retrieved.is_none());

        // Deleting again is a quiet no-op
        let deleted = repo.delete(PartyKind::Contractor, contractor.id).await.unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_require() {
        let pool = create_test_db().await;
        let repo = DirectoryRepository::new(pool);

        let customer = repo
            .create(PartyKind::Customer, &NewParty::new("Thandi", "Dlamini"))
            .await
            .unwrap();

        repo.require(PartyKind::Customer, customer.id)
            .await
            .expect("Existing customer should pass");

        let err = repo.require(PartyKind::Customer, 999).await.unwrap_err();
        assert!(matches!(err, Error::CustomerNotFound(999)));

        let err = repo.require(PartyKind::Architect, 999).await.unwrap_err();
        assert!(matches!(err, Error::ArchitectNotFound(999)));
    }
}
