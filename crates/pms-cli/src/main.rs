//! PMS command-line interface.
//!
//! A thin shell over `pms-core`: every subcommand resolves the database,
//! calls one repository operation and renders the result as text or JSON.

use std::path::PathBuf;

use anyhow::anyhow;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use pms_core::Error;
use pms_core::config::Config;
use pms_core::domain::directory::{DirectoryRepository, NewParty, PartyKind};
use pms_core::domain::project::{NewProject, ProjectDetails, ProjectPatch, ProjectRepository};
use pms_core::storage::{Database, DatabaseConfig, default_database_path};

#[derive(Parser)]
#[command(
    name = "pms",
    version,
    about = "Project register for a structural engineering practice",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a new project
    Add {
        /// Project name; when omitted it becomes "<type> <customer surname>"
        #[arg(long)]
        name: Option<String>,

        /// Kind of building, e.g. "House" or "Warehouse"
        #[arg(long = "type", value_name = "TYPE")]
        building_type: String,

        /// Physical address of the site
        #[arg(long)]
        address: String,

        /// ERF number of the site
        #[arg(long)]
        erf: String,

        /// Total fee charged for the project
        #[arg(long)]
        fee: Decimal,

        /// Amount the customer has paid so far
        #[arg(long, default_value = "0")]
        paid: Decimal,

        /// Deadline in ISO format, e.g. 2026-03-31
        #[arg(long)]
        deadline: NaiveDate,

        /// Id of the architect in the directory
        #[arg(long)]
        architect: i64,

        /// Id of the contractor in the directory
        #[arg(long)]
        contractor: i64,

        /// Id of the customer in the directory
        #[arg(long)]
        customer: i64,
    },

    /// Amend fields of an existing project
    Update {
        /// Project number
        project_no: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long = "type", value_name = "TYPE")]
        building_type: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        erf: Option<String>,

        #[arg(long)]
        fee: Option<Decimal>,

        #[arg(long)]
        paid: Option<Decimal>,

        #[arg(long)]
        deadline: Option<NaiveDate>,

        #[arg(long)]
        architect: Option<i64>,

        #[arg(long)]
        contractor: Option<i64>,

        #[arg(long)]
        customer: Option<i64>,
    },

    /// Mark a project finalised on the given completion date
    Finalize {
        /// Project number
        project_no: i64,

        /// Completion date in ISO format
        completion_date: NaiveDate,
    },

    /// List projects that still need to be completed
    Incomplete,

    /// List unfinalised projects whose deadline has passed
    Overdue {
        /// Judge deadlines against this date instead of today
        #[arg(long = "as-of", value_name = "DATE")]
        as_of: Option<NaiveDate>,
    },

    /// Look a project up by number or by exact name
    Find {
        /// Project number or full project name
        query: String,
    },

    /// Delete a project permanently
    Delete {
        /// Project number
        project_no: i64,

        /// Delete without the confirmation warning
        #[arg(long)]
        force: bool,
    },

    /// List projects that reference a deleted architect, contractor or customer
    Orphaned,

    /// Manage the architect directory
    Architects {
        #[command(subcommand)]
        action: PartyAction,
    },

    /// Manage the contractor directory
    Contractors {
        #[command(subcommand)]
        action: PartyAction,
    },

    /// Manage the customer directory
    Customers {
        #[command(subcommand)]
        action: PartyAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check the health of the installation
    Doctor,
}

#[derive(Subcommand)]
enum PartyAction {
    /// Add a person to the directory
    Add {
        first_name: String,
        last_name: String,
    },

    /// List everyone in the directory
    List,

    /// Remove a person; their projects stay behind and show up under `pms orphaned`
    Remove {
        /// Directory id
        id: i64,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },

    /// Set a configuration value
    Set { key: String, value: String },

    /// List all configuration values
    List,

    /// Reset configuration to defaults
    Reset,

    /// Show the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pms=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        report(&e);
        std::process::exit(1);
    }
    Ok(())
}

/// Print an error with its stable code, plus a follow-up hint when one exists.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<Error>() {
        Some(e) => {
            eprintln!("error[{}]: {}", e.code(), e);
            if let Some(hint) = e.suggestion() {
                eprintln!("hint: {}", hint);
            }
        }
        None => eprintln!("error: {:#}", err),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        db,
        format,
        quiet,
    } = cli;

    match command {
        Commands::Add {
            name,
            building_type,
            address,
            erf,
            fee,
            paid,
            deadline,
            architect,
            contractor,
            customer,
        } => {
            let new_project = NewProject {
                name,
                building_type,
                address,
                erf_no: erf,
                total_fee: fee,
                amount_paid: paid,
                deadline,
                finalised: false,
                completion_date: None,
                architect_id: architect,
                contractor_id: contractor,
                customer_id: customer,
            };
            cmd_add(db, new_project, format, quiet).await
        }
        Commands::Update {
            project_no,
            name,
            building_type,
            address,
            erf,
            fee,
            paid,
            deadline,
            architect,
            contractor,
            customer,
        } => {
            let patch = ProjectPatch {
                name,
                building_type,
                address,
                erf_no: erf,
                total_fee: fee,
                amount_paid: paid,
                deadline,
                architect_id: architect,
                contractor_id: contractor,
                customer_id: customer,
            };
            cmd_update(db, project_no, patch, format, quiet).await
        }
        Commands::Finalize {
            project_no,
            completion_date,
        } => cmd_finalize(db, project_no, completion_date, format, quiet).await,
        Commands::Incomplete => cmd_incomplete(db, format, quiet).await,
        Commands::Overdue { as_of } => {
            let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
            cmd_overdue(db, as_of, format, quiet).await
        }
        Commands::Find { query } => cmd_find(db, &query, format).await,
        Commands::Delete { project_no, force } => cmd_delete(db, project_no, force, quiet).await,
        Commands::Orphaned => cmd_orphaned(db, format, quiet).await,
        Commands::Architects { action } => {
            cmd_party(db, PartyKind::Architect, action, format, quiet).await
        }
        Commands::Contractors { action } => {
            cmd_party(db, PartyKind::Contractor, action, format, quiet).await
        }
        Commands::Customers { action } => {
            cmd_party(db, PartyKind::Customer, action, format, quiet).await
        }
        Commands::Config { action } => cmd_config(action, quiet),
        Commands::Doctor => cmd_doctor(db).await,
    }
}

/// Open the database a command should operate on.
///
/// Precedence: the `--db` flag, then `database.path` from the config file,
/// then the per-user default location.
async fn open_database(db_override: Option<PathBuf>) -> anyhow::Result<Database> {
    let config = Config::load()?;
    let max_connections = config.database.max_connections;
    let path = db_override
        .or(config.database.path)
        .unwrap_or_else(default_database_path);
    Database::new(DatabaseConfig::with_path(path).max_connections(max_connections)).await
}

async fn cmd_add(
    db: Option<PathBuf>,
    new_project: NewProject,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let database = open_database(db).await?;
    let repo = ProjectRepository::new(database.pool().clone());
    let project = repo.create(&new_project).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&project)?),
        OutputFormat::Text => {
            if !quiet {
                println!("Project {} created:", project.project_no);
                println!();
            }
            println!("{}", project);
        }
    }
    Ok(())
}

async fn cmd_update(
    db: Option<PathBuf>,
    project_no: i64,
    patch: ProjectPatch,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    if patch.is_empty() {
        if !quiet {
            println!("Nothing to change.");
        }
        return Ok(());
    }

    let database = open_database(db).await?;
    let repo = ProjectRepository::new(database.pool().clone());
    let project = repo.update(project_no, &patch).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&project)?),
        OutputFormat::Text => {
            if !quiet {
                println!("Project {} updated:", project.project_no);
                println!();
            }
            println!("{}", project);
        }
    }
    Ok(())
}

async fn cmd_finalize(
    db: Option<PathBuf>,
    project_no: i64,
    completion_date: NaiveDate,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let database = open_database(db).await?;
    let repo = ProjectRepository::new(database.pool().clone());
    let project = repo.finalize(project_no, completion_date).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&project)?),
        OutputFormat::Text => {
            if !quiet {
                println!(
                    "Project {} finalised on {}.",
                    project.project_no, completion_date
                );
                println!();
            }
            println!("{}", project);
        }
    }
    Ok(())
}

async fn cmd_incomplete(
    db: Option<PathBuf>,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let database = open_database(db).await?;
    let repo = ProjectRepository::new(database.pool().clone());
    let projects = repo.list_incomplete().await?;
    render_listing(
        "Incomplete projects:",
        "No incomplete projects.",
        &projects,
        format,
        quiet,
    )
}

async fn cmd_overdue(
    db: Option<PathBuf>,
    as_of: NaiveDate,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let database = open_database(db).await?;
    let repo = ProjectRepository::new(database.pool().clone());
    let projects = repo.list_overdue(as_of).await?;
    render_listing(
        &format!("Overdue projects as of {}:", as_of),
        &format!("No overdue projects as of {}.", as_of),
        &projects,
        format,
        quiet,
    )
}

fn render_listing(
    header: &str,
    empty: &str,
    projects: &[ProjectDetails],
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        if !quiet {
            println!("{}", empty);
        }
        return Ok(());
    }

    if !quiet {
        println!("{}", header);
    }
    let currency = Config::load()?.display.currency;
    for details in projects {
        let p = &details.project;
        println!(
            "  {} - {} (due {}, {}{} outstanding)",
            p.project_no,
            p.name,
            p.deadline,
            currency,
            p.outstanding()
        );
    }
    Ok(())
}

async fn cmd_find(db: Option<PathBuf>, query: &str, format: OutputFormat) -> anyhow::Result<()> {
    let database = open_database(db).await?;
    let repo = ProjectRepository::new(database.pool().clone());

    // A numeric query is a project number, anything else an exact name.
    let details = match query.parse::<i64>() {
        Ok(project_no) => repo
            .find_by_number(project_no)
            .await?
            .ok_or(Error::ProjectNotFound(project_no))?,
        Err(_) => repo
            .find_by_name(query)
            .await?
            .ok_or_else(|| anyhow!("No project named '{}' on file", query))?,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&details)?),
        OutputFormat::Text => println!("{}", details),
    }
    Ok(())
}

async fn cmd_delete(
    db: Option<PathBuf>,
    project_no: i64,
    force: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    if !force {
        if !quiet {
            println!(
                "Warning: this will permanently delete project {}.",
                project_no
            );
            println!("Use --force to confirm deletion.");
        }
        return Ok(());
    }

    let database = open_database(db).await?;
    let repo = ProjectRepository::new(database.pool().clone());
    let deleted = repo.delete(project_no).await?;

    if !quiet {
        if deleted {
            println!("Project {} deleted.", project_no);
        } else {
            println!("No project {} on file; nothing deleted.", project_no);
        }
    }
    Ok(())
}

async fn cmd_orphaned(
    db: Option<PathBuf>,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let database = open_database(db).await?;
    let repo = ProjectRepository::new(database.pool().clone());
    let projects = repo.list_orphaned().await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        if !quiet {
            println!("No orphaned projects.");
        }
        return Ok(());
    }

    if !quiet {
        println!("Projects referencing a deleted architect, contractor or customer:");
    }
    for p in &projects {
        println!(
            "  {} - {} (architect {}, contractor {}, customer {})",
            p.project_no, p.name, p.architect_id, p.contractor_id, p.customer_id
        );
    }
    Ok(())
}

async fn cmd_party(
    db: Option<PathBuf>,
    kind: PartyKind,
    action: PartyAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let database = open_database(db).await?;
    let repo = DirectoryRepository::new(database.pool().clone());

    match action {
        PartyAction::Add {
            first_name,
            last_name,
        } => {
            let party = repo
                .create(kind, &NewParty::new(first_name, last_name))
                .await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&party)?),
                OutputFormat::Text => println!("Added {} {}: {}", kind, party.id, party),
            }
        }
        PartyAction::List => {
            let parties = repo.list(kind).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&parties)?),
                OutputFormat::Text => {
                    if parties.is_empty() {
                        if !quiet {
                            println!("No {}s on file.", kind);
                        }
                    } else {
                        if !quiet {
                            let heading = match kind {
                                PartyKind::Architect => "Architects:",
                                PartyKind::Contractor => "Contractors:",
                                PartyKind::Customer => "Customers:",
                            };
                            println!("{}", heading);
                        }
                        for party in &parties {
                            println!("  {} - {}", party.id, party);
                        }
                    }
                }
            }
        }
        PartyAction::Remove { id } => {
            let removed = repo.delete(kind, id).await?;
            if !quiet {
                if removed {
                    println!("Removed {} {}.", kind, id);
                    println!("Projects referencing them remain; see `pms orphaned`.");
                } else {
                    println!("No {} {} on file; nothing removed.", kind, id);
                }
            }
        }
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(db: Option<PathBuf>) -> anyhow::Result<()> {
    println!("PMS health check");
    println!("================");
    println!();

    let mut all_ok = true;

    match Config::load() {
        Ok(config) => match config.validate() {
            Ok(()) => println!("[OK] Configuration valid"),
            Err(e) => {
                all_ok = false;
                println!("[!!] Configuration invalid: {}", e);
            }
        },
        Err(e) => {
            all_ok = false;
            println!("[!!] Configuration could not be loaded: {}", e);
        }
    }

    match Config::config_path() {
        Ok(path) if path.exists() => println!("[OK] Config file: {}", path.display()),
        Ok(path) => println!(
            "[--] Config file not written yet, defaults in use: {}",
            path.display()
        ),
        Err(e) => {
            all_ok = false;
            println!("[!!] Config directory unavailable: {}", e);
        }
    }

    match open_database(db).await {
        Ok(database) => {
            println!("[OK] Database: {}", database.path().display());

            match database.health_check().await {
                Ok(()) => println!("[OK] Database reachable"),
                Err(e) => {
                    all_ok = false;
                    println!("[!!] Database health check failed: {}", e);
                }
            }

            match database.migration_status().await {
                Ok(status) if !status.needs_migration => {
                    println!("[OK] Schema version {}", status.current_version);
                }
                Ok(status) => {
                    all_ok = false;
                    println!(
                        "[!!] Schema at version {}, expected {}",
                        status.current_version, status.target_version
                    );
                }
                Err(e) => {
                    all_ok = false;
                    println!("[!!] Migration status unavailable: {}", e);
                }
            }

            let repo = ProjectRepository::new(database.pool().clone());
            match repo.list_incomplete().await {
                Ok(projects) => println!("[OK] Incomplete projects: {}", projects.len()),
                Err(e) => {
                    all_ok = false;
                    println!("[!!] Could not count projects: {}", e);
                }
            }
            match repo.list_orphaned().await {
                Ok(orphans) if orphans.is_empty() => println!("[OK] No orphaned projects"),
                Ok(orphans) => println!(
                    "[--] {} orphaned project(s), run `pms orphaned` to review",
                    orphans.len()
                ),
                Err(e) => {
                    all_ok = false;
                    println!("[!!] Could not check for orphans: {}", e);
                }
            }
        }
        Err(e) => {
            all_ok = false;
            println!("[!!] Database could not be opened: {}", e);
        }
    }

    println!();
    if all_ok {
        println!("All checks passed.");
    } else {
        println!("Some checks failed.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "pms",
            "add",
            "--type",
            "Warehouse",
            "--address",
            "12 Rail Yard Rd",
            "--erf",
            "ERF-2041",
            "--fee",
            "100000",
            "--deadline",
            "2024-01-01",
            "--architect",
            "1",
            "--contractor",
            "2",
            "--customer",
            "3",
        ])
        .expect("add should parse");

        match cli.command {
            Commands::Add {
                name,
                building_type,
                fee,
                paid,
                deadline,
                customer,
                ..
            } => {
                assert!(name.is_none());
                assert_eq!(building_type, "Warehouse");
                assert_eq!(fee, Decimal::new(100_000, 0));
                assert_eq!(paid, Decimal::ZERO);
                assert_eq!(deadline, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
                assert_eq!(customer, 3);
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        let result = Cli::try_parse_from(["pms", "finalize", "1", "not-a-date"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pms", "incomplete", "--format", "json", "--quiet"])
            .expect("global flags should parse after the subcommand");
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.quiet);
    }
}
