#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::io::Write;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env_remove("TIDP_ENGINE_CONFIG")
        .write_stdin(script.to_string())
        .assert()
}

fn project_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(json.as_bytes()).expect("write project");
    file
}

const DIAMOND: &str = r#"{
    "projectId": "diamond",
    "tidps": [
        { "id": "t1", "teamName": "Architecture", "discipline": "architecture",
          "containers": [
            { "id": "A", "name": "Survey", "estimatedTime": "8 hours" },
            { "id": "B", "name": "Model", "estimatedTime": "2 days", "dependencies": ["A"] }
          ] },
        { "id": "t2", "teamName": "Structures", "discipline": "structural",
          "containers": [
            { "id": "C", "name": "Report", "estimatedTime": "1 day", "dependencies": ["A"] },
            { "id": "D", "name": "Issue", "estimatedTime": "8 hours", "dependencies": ["B", "C"] }
          ] }
    ]
}"#;

fn path_of(file: &NamedTempFile) -> String {
    file.path().to_string_lossy().replace('\\', "\\\\")
}

#[test]
fn cli_requires_a_project() {
    run_cli("critical\nquit\n")
        .success()
        .stdout(str_contains("No project loaded."));
}

#[test]
fn cli_prints_critical_path_and_summary() {
    let file = project_file(DIAMOND);
    let script = format!("load json {}\ncritical\nsummary\nquit\n", path_of(&file));
    run_cli(&script)
        .success()
        .stdout(str_contains("Loaded project diamond (2 TIDPs, 4 containers)."))
        .stdout(str_contains("Project duration: 32h"))
        .stdout(str_contains("crit_path=A->B->D"));
}

#[test]
fn cli_reports_cycles() {
    let cyclic = DIAMOND.replace(
        r#""estimatedTime": "8 hours" }"#,
        r#""estimatedTime": "8 hours", "dependencies": ["D"] }"#,
    );
    let file = project_file(&cyclic);
    let script = format!("load json {}\ncycle\ncritical\nquit\n", path_of(&file));
    run_cli(&script)
        .success()
        .stdout(str_contains("Circular dependency detected: A -> B -> D"))
        .stdout(str_contains("Analysis error: circular dependency detected"));
}

#[test]
fn cli_order_and_matrix() {
    let file = project_file(DIAMOND);
    let script = format!("load json {}\norder\nmatrix\nquit\n", path_of(&file));
    run_cli(&script)
        .success()
        .stdout(str_contains("A -> B -> C -> D"))
        .stdout(str_contains("dependencies=4, critical=4, teams=2"));
}

#[test]
fn cli_imports_csv_and_saves_json() {
    let mut csv = NamedTempFile::new().unwrap();
    writeln!(csv, "Team Name,Discipline,Container Name,Est. Time,Due Date").unwrap();
    writeln!(csv, "Civils,civil,Survey,1 week,2025-01-31").unwrap();
    writeln!(csv, "Civils,civil,Drainage,not-a-date-est,2025-13-01").unwrap();
    let out = NamedTempFile::new().unwrap();

    let script = format!(
        "load csv {} site-b\nsave json {}\nload json {}\ntidps\nquit\n",
        path_of(&csv),
        path_of(&out),
        path_of(&out)
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Imported 1 TIDPs from 2 rows (1 failed)."))
        .stdout(str_contains("row 3:"))
        .stdout(str_contains("Saved."))
        .stdout(str_contains("Loaded project site-b (1 TIDPs, 1 containers)."));
}

#[test]
fn cli_validate_flags_late_dependencies() {
    let json = r#"{
        "projectId": "p",
        "tidps": [{
            "id": "t1", "teamName": "Civils", "discipline": "civil",
            "dependencies": [{ "predecessorId": "t9", "requiredDate": "2025-01-01", "availableDate": "2025-02-01" }]
        }]
    }"#;
    let file = project_file(json);
    let script = format!("load json {}\nvalidate\nquit\n", path_of(&file));
    run_cli(&script)
        .success()
        .stdout(str_contains(
            "t1: dependency 1 is available 2025-02-01 after it is required 2025-01-01",
        ))
        .stdout(str_contains("t1 (warning): dependency 1 references unknown tidp t9"));
}
