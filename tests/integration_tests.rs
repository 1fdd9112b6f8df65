//! Integration tests for the HSP CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get an hsp command
fn hsp() -> Command {
    let mut cmd = Command::cargo_bin("hsp").unwrap();
    cmd.env("HSP_AUTHOR", "Test Author");
    cmd
}

/// Helper to create a portal in a temp directory
fn setup_portal() -> TempDir {
    let tmp = TempDir::new().unwrap();
    hsp().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Extract the first entity ID with the given prefix from command output
fn extract_id(output: &[u8], prefix: &str) -> String {
    let stdout = String::from_utf8_lossy(output);
    stdout
        .split_whitespace()
        .find(|w| w.starts_with(&format!("{}-", prefix)))
        .map(|s| s.trim_end_matches("...").to_string())
        .unwrap_or_default()
}

/// Helper to create a test patient, returning an ID query string
fn create_test_patient(tmp: &TempDir, mrn: &str, first: &str, last: &str) -> String {
    let output = hsp()
        .current_dir(tmp.path())
        .args([
            "patient",
            "new",
            "--mrn",
            mrn,
            "--first-name",
            first,
            "--last-name",
            last,
            "--dob",
            "1984-05-12",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "patient new failed: {:?}", output);
    extract_id(&output.stdout, "PAT")
}

/// Register a hospital non-interactively with valid data
fn register_hospital(tmp: &TempDir, email: &str) -> std::process::Output {
    hsp()
        .current_dir(tmp.path())
        .args([
            "register",
            "--name",
            "Acme Clinic",
            "--type",
            "clinic",
            "--email",
            email,
            "--phone",
            "555-0100",
            "--address",
            "1 Main St",
            "--city",
            "Springfield",
            "--state",
            "IL",
            "--postal-code",
            "62701",
            "--country",
            "US",
            "--license-number",
            "LIC-44",
            "--admin-name",
            "Pat Admin",
            "--admin-email",
            "pat@acme.org",
            "--admin-password",
            "Abcd123!",
            "--admin-confirm-password",
            "Abcd123!",
        ])
        .output()
        .unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    hsp()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hospital records"));
}

#[test]
fn test_version_displays() {
    hsp()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hsp"));
}

#[test]
fn test_unknown_command_fails() {
    hsp()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_portal_structure() {
    let tmp = TempDir::new().unwrap();

    hsp()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".hsp").exists());
    assert!(tmp.path().join(".hsp/config.yaml").exists());
    assert!(tmp.path().join("hospital").is_dir());
    assert!(tmp.path().join("patients").is_dir());
    assert!(tmp.path().join("staff/directory").is_dir());
    assert!(tmp.path().join("staff/credentials").is_dir());
    assert!(tmp.path().join("billing/claims").is_dir());
    assert!(tmp.path().join("billing/invoices").is_dir());
    assert!(tmp.path().join("records/notes").is_dir());
}

#[test]
fn test_init_warns_if_portal_exists() {
    let tmp = setup_portal();

    hsp()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

// ============================================================================
// Registration Wizard Tests (flag mode)
// ============================================================================

#[test]
fn test_register_succeeds_with_valid_fields() {
    let tmp = setup_portal();

    let output = register_hospital(&tmp, "front-desk@acme.org");
    assert!(output.status.success(), "register failed: {:?}", output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Registered"));
    assert!(stdout.contains("pat@acme.org"));

    // Exactly one hospital record was persisted
    let files: Vec<_> = fs::read_dir(tmp.path().join("hospital"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(files.len(), 1);

    // The stored record carries the timezone but never the password
    let raw = fs::read_to_string(files[0].path()).unwrap();
    assert!(raw.contains("timezone: UTC"));
    assert!(!raw.contains("Abcd123!"));
    assert!(!raw.contains("admin_confirm_password"));
}

#[test]
fn test_register_blocks_on_missing_first_step_field() {
    let tmp = setup_portal();

    hsp()
        .current_dir(tmp.path())
        .args(["register", "--name", "Acme Clinic", "--type", "clinic"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Hospital email is required"));

    // Nothing was persisted
    let files: Vec<_> = fs::read_dir(tmp.path().join("hospital"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert!(files.is_empty());
}

#[test]
fn test_register_blocks_on_password_mismatch() {
    let tmp = setup_portal();

    hsp()
        .current_dir(tmp.path())
        .args([
            "register",
            "--name",
            "Acme Clinic",
            "--type",
            "clinic",
            "--email",
            "a@b.com",
            "--phone",
            "555-0100",
            "--address",
            "1 Main St",
            "--city",
            "Springfield",
            "--state",
            "IL",
            "--postal-code",
            "62701",
            "--country",
            "US",
            "--license-number",
            "LIC-44",
            "--admin-name",
            "Pat Admin",
            "--admin-email",
            "pat@acme.org",
            "--admin-password",
            "Abcd123!",
            "--admin-confirm-password",
            "Different1!",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Passwords do not match"));
}

#[test]
fn test_register_rejects_duplicate_hospital_email() {
    let tmp = setup_portal();

    let first = register_hospital(&tmp, "a@b.com");
    assert!(first.status.success());

    let second = register_hospital(&tmp, "a@b.com");
    assert!(!second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("already registered"));
}

#[test]
fn test_register_weak_password_reports_composition() {
    let tmp = setup_portal();

    hsp()
        .current_dir(tmp.path())
        .args([
            "register",
            "--name",
            "Acme Clinic",
            "--type",
            "clinic",
            "--email",
            "a@b.com",
            "--phone",
            "555-0100",
            "--address",
            "1 Main St",
            "--city",
            "Springfield",
            "--state",
            "IL",
            "--postal-code",
            "62701",
            "--country",
            "US",
            "--license-number",
            "LIC-44",
            "--admin-name",
            "Pat Admin",
            "--admin-email",
            "pat@acme.org",
            "--admin-password",
            "weakpass",
            "--admin-confirm-password",
            "weakpass",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Password needs"));
}

// ============================================================================
// Patient Command Tests
// ============================================================================

#[test]
fn test_patient_new_and_list() {
    let tmp = setup_portal();
    let id = create_test_patient(&tmp, "MRN-1001", "Ada", "Nguyen");
    assert!(id.starts_with("PAT-"));

    hsp()
        .current_dir(tmp.path())
        .args(["patient", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nguyen, Ada"))
        .stdout(predicate::str::contains("1 patient(s) found"));
}

#[test]
fn test_patient_new_requires_flags() {
    let tmp = setup_portal();

    hsp()
        .current_dir(tmp.path())
        .args(["patient", "new", "--mrn", "MRN-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--first-name"));
}

#[test]
fn test_patient_show_by_fuzzy_name() {
    let tmp = setup_portal();
    create_test_patient(&tmp, "MRN-1001", "Ada", "Nguyen");

    hsp()
        .current_dir(tmp.path())
        .args(["patient", "show", "nguyen"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mrn: MRN-1001"));
}

#[test]
fn test_patient_list_count_and_json() {
    let tmp = setup_portal();
    create_test_patient(&tmp, "MRN-1", "Ada", "Nguyen");
    create_test_patient(&tmp, "MRN-2", "Ben", "Okafor");

    hsp()
        .current_dir(tmp.path())
        .args(["patient", "list", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2"));

    hsp()
        .current_dir(tmp.path())
        .args(["patient", "list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mrn\": \"MRN-1\""));
}

#[test]
fn test_patient_search_filter() {
    let tmp = setup_portal();
    create_test_patient(&tmp, "MRN-1", "Ada", "Nguyen");
    create_test_patient(&tmp, "MRN-2", "Ben", "Okafor");

    hsp()
        .current_dir(tmp.path())
        .args(["patient", "list", "--search", "okafor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Okafor"))
        .stdout(predicate::str::contains("1 patient(s) found"));
}

// ============================================================================
// Claim Pipeline Tests
// ============================================================================

#[test]
fn test_claim_pipeline_submit_review_approve_pay() {
    let tmp = setup_portal();
    let patient_id = create_test_patient(&tmp, "MRN-1", "Ada", "Nguyen");

    let output = hsp()
        .current_dir(tmp.path())
        .args([
            "claim",
            "new",
            "--patient",
            &patient_id,
            "--payer",
            "Blue Harbor Mutual",
            "--amount",
            "1250.00",
            "--service-date",
            "2025-03-04",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "claim new failed: {:?}", output);
    let claim_id = extract_id(&output.stdout, "CLM");

    for (verb, expected) in [
        ("submit", "submitted"),
        ("review", "in-review"),
        ("approve", "approved"),
        ("pay", "paid"),
    ] {
        hsp()
            .current_dir(tmp.path())
            .args(["claim", verb, &claim_id])
            .assert()
            .success()
            .stdout(predicate::str::contains(expected));
    }

    // A paid claim accepts no further transitions
    hsp()
        .current_dir(tmp.path())
        .args(["claim", "submit", &claim_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid claim transition"));
}

#[test]
fn test_claim_deny_records_reason() {
    let tmp = setup_portal();
    let patient_id = create_test_patient(&tmp, "MRN-1", "Ada", "Nguyen");

    let output = hsp()
        .current_dir(tmp.path())
        .args([
            "claim",
            "new",
            "--patient",
            &patient_id,
            "--payer",
            "Blue Harbor Mutual",
            "--amount",
            "400",
            "--service-date",
            "2025-03-04",
        ])
        .output()
        .unwrap();
    let claim_id = extract_id(&output.stdout, "CLM");

    for verb in ["submit", "review"] {
        hsp()
            .current_dir(tmp.path())
            .args(["claim", verb, &claim_id])
            .assert()
            .success();
    }

    hsp()
        .current_dir(tmp.path())
        .args([
            "claim",
            "deny",
            &claim_id,
            "--reason",
            "missing policy number",
        ])
        .assert()
        .success();

    hsp()
        .current_dir(tmp.path())
        .args(["claim", "show", &claim_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("denial_reason: missing policy number"));
}

// ============================================================================
// Note Command Tests
// ============================================================================

#[test]
fn test_note_new_and_sign() {
    let tmp = setup_portal();
    let patient_id = create_test_patient(&tmp, "MRN-1", "Ada", "Nguyen");

    let output = hsp()
        .current_dir(tmp.path())
        .args([
            "note",
            "new",
            "--patient",
            &patient_id,
            "--title",
            "Day 2 rounds",
            "--text",
            "Afebrile, tolerating diet.",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let note_id = extract_id(&output.stdout, "NOTE");

    hsp()
        .current_dir(tmp.path())
        .args(["note", "sign", &note_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("signed by"));

    // Signing twice fails
    hsp()
        .current_dir(tmp.path())
        .args(["note", "sign", &note_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only draft notes"));
}

// ============================================================================
// Validate / Status Tests
// ============================================================================

#[test]
fn test_validate_passes_on_generated_records() {
    let tmp = setup_portal();
    create_test_patient(&tmp, "MRN-1", "Ada", "Nguyen");
    register_hospital(&tmp, "a@b.com");

    hsp()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("no errors"));
}

#[test]
fn test_validate_flags_bad_file() {
    let tmp = setup_portal();

    // A hand-written patient file with an invalid status
    fs::write(
        tmp.path()
            .join("patients/PAT-01HC2JB7SMQX7RS1Y0GFKBHPTD.hsp.yaml"),
        r#"
id: PAT-01HC2JB7SMQX7RS1Y0GFKBHPTD
mrn: "MRN-9"
first_name: "Bad"
last_name: "Status"
date_of_birth: "1990-01-01"
status: inpatient
created: 2024-01-01T00:00:00Z
author: Test
"#,
    )
    .unwrap();

    hsp()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗"));
}

#[test]
fn test_status_dashboard_runs() {
    let tmp = setup_portal();
    create_test_patient(&tmp, "MRN-1", "Ada", "Nguyen");

    hsp()
        .current_dir(tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Portal Status"))
        .stdout(predicate::str::contains("Patients"));
}

// ============================================================================
// Import Tests
// ============================================================================

#[test]
fn test_import_patients_from_csv() {
    let tmp = setup_portal();

    let csv_path = tmp.path().join("roster.csv");
    fs::write(
        &csv_path,
        "mrn,first_name,last_name,date_of_birth\n\
         MRN-10,Ada,Nguyen,1984-05-12\n\
         MRN-11,Ben,Okafor,1979-11-02\n",
    )
    .unwrap();

    hsp()
        .current_dir(tmp.path())
        .args(["import", "patients", "--csv", csv_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 of 2"));

    hsp()
        .current_dir(tmp.path())
        .args(["patient", "list", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2"));
}

#[test]
fn test_import_dry_run_writes_nothing() {
    let tmp = setup_portal();

    let csv_path = tmp.path().join("roster.csv");
    fs::write(
        &csv_path,
        "mrn,first_name,last_name,date_of_birth\nMRN-10,Ada,Nguyen,1984-05-12\n",
    )
    .unwrap();

    hsp()
        .current_dir(tmp.path())
        .args([
            "import",
            "patients",
            "--csv",
            csv_path.to_str().unwrap(),
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    hsp()
        .current_dir(tmp.path())
        .args(["patient", "list", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0"));
}
