mod test_support;

use serde_json::json;
use test_support::{request_ok, seed_school, spawn_sidecar, temp_dir};

#[test]
fn exported_workspace_restores_grades_elsewhere() {
    let workspace = temp_dir("gradebook-bundle-src");
    let restored = temp_dir("gradebook-bundle-dst");
    let bundle = workspace.join("export.zip");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    seed_school(&mut stdin, &mut reader, &workspace);

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "grades.updateComponent",
        json!({ "studentId": "s-1", "subjectId": "math", "component": "assignment", "value": 7.5 }),
    );
    let export = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.exportBundle",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(export["bundleFormat"], "gradebook-workspace-v1");

    let import = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "workspace.importBundle",
        json!({ "inPath": bundle.to_string_lossy(), "workspacePath": restored.to_string_lossy() }),
    );
    assert_eq!(import["dbSha256"], export["dbSha256"]);

    let health = request_ok(&mut stdin, &mut reader, "4", "health", json!({}));
    assert_eq!(health["workspacePath"], restored.to_string_lossy().to_string());
    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "grades.get",
        json!({ "studentId": "s-1", "subjectId": "math" }),
    );
    assert_eq!(summary["assignmentScore"], 7.5);

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(restored);
}
