mod test_support;

use serde_json::json;
use test_support::{request, request_err, request_ok, seed_school, spawn_sidecar, temp_dir};

#[test]
fn requests_before_workspace_select_are_refused() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health.get("version").and_then(|v| v.as_str()).is_some());
    assert!(health.get("workspacePath").map(|v| v.is_null()).unwrap_or(false));

    let error = request_err(&mut stdin, &mut reader, "2", "scales.list", json!({}));
    assert_eq!(error["code"], "no_workspace");

    let error = request_err(&mut stdin, &mut reader, "3", "workspace.select", json!({}));
    assert_eq!(error["code"], "bad_params");
}

#[test]
fn unknown_methods_and_bad_params_have_stable_codes() {
    let workspace = temp_dir("gradebook-router-codes");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    seed_school(&mut stdin, &mut reader, &workspace);

    let error = request_err(&mut stdin, &mut reader, "1", "grades.explode", json!({}));
    assert_eq!(error["code"], "not_implemented");

    let error = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "grades.updateComponent",
        json!({ "studentId": "s-1", "subjectId": "math", "component": "exam" }),
    );
    assert_eq!(error["code"], "bad_params");

    let error = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "grades.get",
        json!({ "studentId": "s-1", "subjectId": "history" }),
    );
    assert_eq!(error["code"], "not_found");
    assert_eq!(error["details"]["entity"], "subject");

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("gradebook-router-smoke");
    let bundle_out = workspace.join("smoke-backup.zip");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    seed_school(&mut stdin, &mut reader, &workspace);

    let methods = [
        ("1", "scales.list", json!({})),
        ("2", "configs.list", json!({})),
        ("3", "configs.forSession", json!({ "academicYear": "2024/2025", "term": 1 })),
        ("4", "grades.listForSubject", json!({ "subjectId": "math" })),
        ("5", "grades.incompleteComponents", json!({ "studentId": "s-1", "subjectId": "math" })),
        ("6", "grades.releasedScores", json!({ "studentId": "s-1", "subjectId": "math" })),
        ("7", "assessments.list", json!({ "subjectId": "math" })),
        ("8", "assessments.unlockAll", json!({ "subjectId": "math" })),
        ("9", "attendance.sync", json!({ "academicYear": "2024/2025", "term": 1 })),
        ("10", "workspace.exportBundle", json!({ "outPath": bundle_out.to_string_lossy() })),
    ];
    for (id, method, params) in methods {
        let value = request(&mut stdin, &mut reader, id, method, params);
        assert_eq!(value["ok"], true, "{} failed: {}", method, value);
    }

    let _ = std::fs::remove_dir_all(workspace);
}
