//! Binary-level tests against a throwaway data directory

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STATEMENT: &str = "\
id,account,date,amount,type,memo,payee
FIT-1,1234,2024-03-05,-54.32,POS,POS PURCHASE,KROGER #123
FIT-2,1234,2024-03-01,2500.00,DIRECTDEP,,ACME PAYROLL
FIT-3,1234,2024-02-14,-18.75,POS,,CORNER CAFE
";

fn labelbook(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("labelbook").unwrap();
    cmd.env("LABELBOOK_DATA_DIR", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn imported() -> TempDir {
    let dir = TempDir::new().unwrap();
    let statement = dir.path().join("statement.csv");
    fs::write(&statement, STATEMENT).unwrap();

    labelbook(&dir)
        .args(["tx", "import"])
        .arg(&statement)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 transactions"));
    dir
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    labelbook(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("label"))
        .stdout(predicate::str::contains("trend"));
}

#[test]
fn reimport_skips_known_transactions() {
    let dir = imported();
    let statement = dir.path().join("statement.csv");

    labelbook(&dir)
        .args(["tx", "import"])
        .arg(&statement)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 0 transactions"))
        .stdout(predicate::str::contains("Skipped 3 already imported"));
}

#[test]
fn rule_labels_split_and_budget() {
    let dir = imported();

    labelbook(&dir)
        .args(["label", "create", "Groceries", "--type", "expense"])
        .assert()
        .success();
    labelbook(&dir)
        .args(["rule", "add", "Groceries", "--payee", "kroger"])
        .assert()
        .success()
        .stdout(predicate::str::contains("now covers 1 transactions"));

    labelbook(&dir)
        .args(["tx", "show", "FIT-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Groceries (rule)"));

    labelbook(&dir)
        .args(["split", "add", "FIT-1", "Groceries", "54.32"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unallocated: $0.00"));
    labelbook(&dir)
        .args(["split", "add", "FIT-1", "Groceries", "0.01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds transaction FIT-1"));

    labelbook(&dir)
        .args(["budget", "set", "Groceries", "400"])
        .assert()
        .success();
    labelbook(&dir)
        .args(["budget", "status", "Groceries", "--month", "2024-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remaining: $345.68"));
}

#[test]
fn budget_on_income_label_is_rejected() {
    let dir = imported();

    labelbook(&dir)
        .args(["label", "create", "Salary", "--type", "income"])
        .assert()
        .success();
    labelbook(&dir)
        .args(["budget", "set", "Salary", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid label type"));
}

#[test]
fn duplicate_label_names_are_rejected() {
    let dir = TempDir::new().unwrap();

    labelbook(&dir)
        .args(["label", "create", "Dining"])
        .assert()
        .success();
    labelbook(&dir)
        .args(["label", "create", "dining"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn manual_assignment_and_trend() {
    let dir = imported();

    labelbook(&dir)
        .args(["label", "create", "Dining"])
        .assert()
        .success();
    labelbook(&dir)
        .args(["tx", "assign", "FIT-3", "Dining"])
        .assert()
        .success();

    labelbook(&dir)
        .args(["trend", "Dining", "--from", "2024-01", "--to", "2024-03", "--csv", "-"])
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "period,amount\n2024-01,0.00\n2024-02,18.75\n2024-03,0.00\n",
        ));

    labelbook(&dir)
        .args(["tx", "unassign", "FIT-3", "Dining"])
        .assert()
        .success();
    labelbook(&dir)
        .args(["tx", "unassign", "FIT-3", "Dining"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not assigned"));
}

#[test]
fn overview_shows_income() {
    let dir = imported();

    labelbook(&dir)
        .args(["label", "create", "Salary", "--type", "income"])
        .assert()
        .success();
    labelbook(&dir)
        .args(["rule", "add", "Salary", "--payee", "acme"])
        .assert()
        .success();

    labelbook(&dir)
        .args(["overview", "2024", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Salary"))
        .stdout(predicate::str::contains("$2500.00"));
}

#[test]
fn changes_are_audited() {
    let dir = imported();

    labelbook(&dir)
        .args(["label", "create", "Grocery"])
        .assert()
        .success();
    labelbook(&dir)
        .args(["label", "rename", "Grocery", "Groceries"])
        .assert()
        .success();

    labelbook(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE Label"))
        .stdout(predicate::str::contains("name: \"Grocery\" -> \"Groceries\""));
}

#[test]
fn history_can_be_scoped_to_a_label() {
    let dir = imported();

    for name in ["Groceries", "Dining"] {
        labelbook(&dir)
            .args(["label", "create", name])
            .assert()
            .success();
    }
    labelbook(&dir)
        .args(["tx", "assign", "FIT-3", "Dining"])
        .assert()
        .success();
    labelbook(&dir)
        .args(["split", "add", "FIT-3", "Dining", "10.00"])
        .assert()
        .success();

    labelbook(&dir)
        .args(["history", "--label", "Dining"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE Assignment"))
        .stdout(predicate::str::contains("CREATE Split"))
        .stdout(predicate::str::contains("Groceries").not())
        .stdout(predicate::str::contains("Import").not());
}

#[test]
fn unassigning_a_rule_match_is_rejected() {
    let dir = imported();

    labelbook(&dir)
        .args(["label", "create", "Groceries"])
        .assert()
        .success();
    labelbook(&dir)
        .args(["rule", "add", "Groceries", "--payee", "kroger"])
        .assert()
        .success();
    labelbook(&dir)
        .args(["tx", "unassign", "FIT-1", "Groceries"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("by a rule"));
}

#[test]
fn config_alias_is_shown_in_register() {
    let dir = imported();

    labelbook(&dir)
        .args(["config", "alias", "1234", "Checking"])
        .assert()
        .success();
    labelbook(&dir)
        .args(["tx", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checking"));
}
