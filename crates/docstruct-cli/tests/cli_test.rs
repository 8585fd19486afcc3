//! Smoke tests for the docstruct binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn docstruct() -> Command {
    Command::cargo_bin("docstruct").unwrap()
}

#[test]
fn extract_pipe_invoice_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("invoice.txt");
    std::fs::write(
        &input,
        "Product | Qty | Rate | Amount\nPARACIP 650MG TAB | 10 | 22.84 | 228.40\n",
    )
    .unwrap();

    docstruct()
        .arg("extract")
        .arg(&input)
        .args(["--kind", "invoice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PARACIP 650MG TAB"))
        .stdout(predicate::str::contains("line-tokenized"));
}

#[test]
fn extract_medical_bill_fields() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bill.txt");
    std::fs::write(&input, "Patient Name: JOHN SMITH Ph.No. 9876543210\n").unwrap();

    docstruct()
        .arg("extract")
        .arg(&input)
        .args(["--kind", "medical", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("JOHN SMITH"))
        .stdout(predicate::str::contains("9876543210"));
}

#[test]
fn missing_input_fails() {
    docstruct()
        .arg("extract")
        .arg("no-such-file.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn config_show_prints_defaults() {
    docstruct()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("row_tolerance"));
}
