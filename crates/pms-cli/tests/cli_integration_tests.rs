//! CLI integration tests for pms
//!
//! Drives the `pms` binary end to end with assert_cmd. Every test gets its
//! own temporary directory holding both the config dir and the database
//! file, so tests are independent and ids always start at 1.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `pms` command wired to a throwaway config dir and database file.
fn pms(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pms").unwrap();
    cmd.env("PMS_CONFIG_DIR", dir.path().join("config"));
    cmd.arg("--db");
    cmd.arg(dir.path().join("pms.db"));
    cmd
}

/// Register one architect, one contractor and one customer.
///
/// On a fresh database each ends up with id 1.
fn seed_partners(dir: &TempDir) {
    pms(dir)
        .args(["architects", "add", "Pieter", "van Wyk"])
        .assert()
        .success();
    pms(dir)
        .args(["contractors", "add", "Sipho", "Ndlovu"])
        .assert()
        .success();
    pms(dir)
        .args(["customers", "add", "Thandi", "Dlamini"])
        .assert()
        .success();
}

/// Capture project 1: a warehouse for customer Dlamini, due 2024-01-01,
/// with no explicit name so the register derives "Warehouse Dlamini".
fn add_warehouse(dir: &TempDir) {
    pms(dir)
        .args([
            "add",
            "--type",
            "Warehouse",
            "--address",
            "12 Rail Yard Rd, Durban",
            "--erf",
            "ERF-2041",
            "--fee",
            "100000",
            "--deadline",
            "2024-01-01",
            "--architect",
            "1",
            "--contractor",
            "1",
            "--customer",
            "1",
        ])
        .assert()
        .success();
}

#[test]
fn test_add_derives_project_name() {
    let dir = TempDir::new().unwrap();
    seed_partners(&dir);

    pms(&dir)
        .args([
            "add",
            "--type",
            "Warehouse",
            "--address",
            "12 Rail Yard Rd, Durban",
            "--erf",
            "ERF-2041",
            "--fee",
            "100000",
            "--deadline",
            "2024-01-01",
            "--architect",
            "1",
            "--contractor",
            "1",
            "--customer",
            "1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project Number:   1"))
        .stdout(predicate::str::contains("Warehouse Dlamini"));
}

#[test]
fn test_add_rejects_unknown_customer() {
    let dir = TempDir::new().unwrap();
    seed_partners(&dir);

    pms(&dir)
        .args([
            "add",
            "--type",
            "House",
            "--address",
            "1 Hill St",
            "--erf",
            "ERF-1",
            "--fee",
            "5000",
            "--deadline",
            "2026-06-01",
            "--architect",
            "1",
            "--contractor",
            "1",
            "--customer",
            "99",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E002]"))
        .stderr(predicate::str::contains("Customer 99 not found"))
        .stderr(predicate::str::contains("hint: pms customers list"));
}

#[test]
fn test_find_by_number_and_by_name() {
    let dir = TempDir::new().unwrap();
    seed_partners(&dir);
    add_warehouse(&dir);

    pms(&dir)
        .args(["find", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warehouse Dlamini"))
        .stdout(predicate::str::contains("Customer:         Thandi Dlamini"));

    pms(&dir)
        .args(["find", "Warehouse Dlamini"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project Number:   1"));
}

#[test]
fn test_find_missing_project_fails() {
    let dir = TempDir::new().unwrap();
    seed_partners(&dir);

    pms(&dir)
        .args(["find", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E001]"))
        .stderr(predicate::str::contains("Project 42 not found"));
}

#[test]
fn test_update_patches_single_field() {
    let dir = TempDir::new().unwrap();
    seed_partners(&dir);
    add_warehouse(&dir);

    pms(&dir)
        .args(["update", "1", "--paid", "25000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Amount Paid:      25000"))
        .stdout(predicate::str::contains("Warehouse Dlamini"));
}

#[test]
fn test_update_missing_project_fails() {
    let dir = TempDir::new().unwrap();
    seed_partners(&dir);

    pms(&dir)
        .args(["update", "42", "--paid", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E001]"));
}

#[test]
fn test_finalize_clears_overdue_and_incomplete() {
    let dir = TempDir::new().unwrap();
    seed_partners(&dir);
    add_warehouse(&dir);

    // Past its 2024 deadline when judged from 2025.
    pms(&dir)
        .args(["overdue", "--as-of", "2025-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warehouse Dlamini"))
        .stdout(predicate::str::contains("R100000 outstanding"));

    pms(&dir)
        .args(["finalize", "1", "2025-02-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Finalised:        yes"))
        .stdout(predicate::str::contains("Completion Date:  2025-02-01"));

    pms(&dir)
        .args(["overdue", "--as-of", "2025-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No overdue projects as of 2025-01-01."));

    pms(&dir)
        .args(["incomplete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No incomplete projects."));
}

#[test]
fn test_overdue_excludes_deadline_day() {
    let dir = TempDir::new().unwrap();
    seed_partners(&dir);
    add_warehouse(&dir);

    // Due exactly on the reference date counts as on time.
    pms(&dir)
        .args(["overdue", "--as-of", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No overdue projects as of 2024-01-01."));

    pms(&dir)
        .args(["overdue", "--as-of", "2024-01-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warehouse Dlamini"));
}

#[test]
fn test_delete_requires_force() {
    let dir = TempDir::new().unwrap();
    seed_partners(&dir);
    add_warehouse(&dir);

    pms(&dir)
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Use --force to confirm deletion."));

    // Still on file.
    pms(&dir).args(["find", "1"]).assert().success();

    pms(&dir)
        .args(["delete", "1", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project 1 deleted."));

    pms(&dir).args(["find", "1"]).assert().failure();
}

#[test]
fn test_delete_missing_project_is_quiet() {
    let dir = TempDir::new().unwrap();
    seed_partners(&dir);

    pms(&dir)
        .args(["delete", "42", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing deleted"));
}

#[test]
fn test_removed_customer_orphans_project() {
    let dir = TempDir::new().unwrap();
    seed_partners(&dir);
    add_warehouse(&dir);

    pms(&dir)
        .args(["customers", "remove", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed customer 1."));

    // The joined reads no longer see the project.
    pms(&dir).args(["find", "1"]).assert().failure();
    pms(&dir)
        .args(["incomplete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No incomplete projects."));

    // The audit listing still does.
    pms(&dir)
        .args(["orphaned"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warehouse Dlamini"));
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().unwrap();
    seed_partners(&dir);
    add_warehouse(&dir);

    pms(&dir)
        .args(["find", "1", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"project_no\": 1"))
        .stdout(predicate::str::contains("\"last_name\": \"Dlamini\""));
}

#[test]
fn test_config_set_get_round_trip() {
    let dir = TempDir::new().unwrap();

    pms(&dir)
        .args(["config", "set", "display.currency", "ZAR"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set display.currency = ZAR"));

    pms(&dir)
        .args(["config", "get", "display.currency"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ZAR"));

    pms(&dir)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("database.max_connections = 5"));
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = TempDir::new().unwrap();

    pms(&dir)
        .args(["config", "get", "no.such.key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_doctor_passes_on_fresh_database() {
    let dir = TempDir::new().unwrap();

    pms(&dir)
        .args(["doctor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] Database reachable"))
        .stdout(predicate::str::contains("All checks passed."));
}

#[test]
fn test_quiet_suppresses_informational_output() {
    let dir = TempDir::new().unwrap();

    pms(&dir)
        .args(["--quiet", "incomplete"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
