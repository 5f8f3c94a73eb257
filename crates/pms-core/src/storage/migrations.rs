//! Versioned schema migrations, applied when a database is opened.
//!
//! Applied versions are recorded in a `_migrations` table so partially
//! upgraded files resume where they left off.

use sqlx::SqlitePool;

/// Schema version a fully migrated database is at.
pub const CURRENT_VERSION: i32 = 2;

const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Initial register schema.
///
/// Partner tables carry no reverse constraints and projects declare no
/// foreign keys: a partner row may be deleted while projects still point at
/// it. Referential checks live in the repositories, where they can produce
/// precise errors.
const V1_REGISTER_SCHEMA: &str = r#"
    -- Partner tables
    CREATE TABLE IF NOT EXISTS architects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS contractors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS customers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL
    );

    -- Projects table
    -- Fees are stored as TEXT: decimal amounts must round-trip exactly,
    -- and SQLite REAL would not guarantee that.
    CREATE TABLE IF NOT EXISTS projects (
        project_no INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        building_type TEXT NOT NULL,
        address TEXT NOT NULL,
        erf_no TEXT NOT NULL,
        total_fee TEXT NOT NULL,
        amount_paid TEXT NOT NULL,
        deadline TEXT NOT NULL,
        finalised INTEGER NOT NULL DEFAULT 0 CHECK (finalised IN (0, 1)),
        completion_date TEXT,
        architect_id INTEGER NOT NULL,
        contractor_id INTEGER NOT NULL,
        customer_id INTEGER NOT NULL,
        CHECK (
            (finalised = 0 AND completion_date IS NULL)
            OR (finalised = 1 AND completion_date IS NOT NULL)
        )
    );

    CREATE INDEX IF NOT EXISTS idx_projects_name ON projects(name);
    CREATE INDEX IF NOT EXISTS idx_projects_finalised ON projects(finalised);
"#;

/// Deadline index for overdue listings.
const V2_DEADLINE_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_projects_deadline ON projects(deadline);
"#;

struct Migration {
    version: i32,
    label: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        label: "register schema",
        sql: V1_REGISTER_SCHEMA,
    },
    Migration {
        version: 2,
        label: "deadline index",
        sql: V2_DEADLINE_INDEX,
    },
];

async fn schema_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    // MAX on an empty table yields a single NULL row, which decodes as 0
    let row: Option<(i32,)> = sqlx::query_as("SELECT MAX(version) FROM _migrations")
        .fetch_optional(pool)
        .await?;
    Ok(row.map_or(0, |(v,)| v))
}

/// Apply every migration newer than the database's recorded version.
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let applied = schema_version(pool).await?;
    if applied >= CURRENT_VERSION {
        tracing::debug!(version = applied, "Schema is current");
        return Ok(());
    }

    for migration in MIGRATIONS {
        if applied >= migration.version {
            continue;
        }
        tracing::info!(
            version = migration.version,
            label = migration.label,
            "Applying migration"
        );
        sqlx::raw_sql(migration.sql).execute(pool).await?;
        sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
            .bind(migration.version)
            .execute(pool)
            .await?;
    }

    tracing::info!(from = applied, to = CURRENT_VERSION, "Schema migrated");
    Ok(())
}

/// Where a database stands relative to [`CURRENT_VERSION`].
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let current_version = schema_version(pool).await?;
    Ok(MigrationStatus {
        current_version,
        target_version: CURRENT_VERSION,
        needs_migration: current_version < CURRENT_VERSION,
    })
}

#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Version recorded in the database.
    pub current_version: i32,
    /// Version this build migrates to.
    pub target_version: i32,
    pub needs_migration: bool,
}
