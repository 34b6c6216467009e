mod test_support;

use serde_json::json;
use test_support::{
    error_fields, request_err, request_ok, spawn_sidecar, str_field, temp_dir, TERM, YEAR,
};

fn config(scale_id: &str, attendance: i64, assignment: i64, test: i64, exam: i64) -> serde_json::Value {
    json!({
        "academicYear": YEAR,
        "term": TERM,
        "attendancePercentage": attendance,
        "assignmentPercentage": assignment,
        "testPercentage": test,
        "examPercentage": exam,
        "gradingScaleId": scale_id,
    })
}

#[test]
fn configuration_percentages_are_validated_together() {
    let workspace = temp_dir("gradebook-config-validation");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let scale = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "scales.create",
        json!({ "name": "Standard", "aMin": 90, "bMin": 80, "cMin": 70, "dMin": 60 }),
    );
    let scale_id = str_field(&scale, "id");

    // Sum of 99 reports what is missing.
    let error = request_err(&mut stdin, &mut reader, "3", "configs.create", config(&scale_id, 10, 10, 30, 49));
    assert_eq!(error["code"], "validation_failed");
    assert_eq!(error_fields(&error), vec!["total"]);
    assert!(error.to_string().contains("remaining: 1"), "{}", error);

    let error = request_err(&mut stdin, &mut reader, "4", "configs.create", config(&scale_id, 10, 10, 30, 60));
    assert!(error.to_string().contains("exceeds by: 10"), "{}", error);

    // Every failing field is listed, not just the first.
    let error = request_err(&mut stdin, &mut reader, "5", "configs.create", config("nope", 2, 25, 30, 43));
    let fields = error_fields(&error);
    for expected in ["attendancePercentage", "assignmentPercentage", "gradingScaleId"] {
        assert!(fields.iter().any(|f| f == expected), "missing {} in {:?}", expected, fields);
    }

    // Out-of-range input is a field error and the sidecar keeps serving.
    let error = request_err(&mut stdin, &mut reader, "5b", "configs.create", config(&scale_id, 10, 10, i64::MAX, 50));
    assert_eq!(error["code"], "validation_failed");
    assert_eq!(error_fields(&error), vec!["testPercentage", "total"]);

    let created = request_ok(&mut stdin, &mut reader, "6", "configs.create", config(&scale_id, 10, 10, 30, 50));
    assert_eq!(created["attendancePercentage"], 10);
    assert_eq!(created["examPercentage"], 50);

    let error = request_err(&mut stdin, &mut reader, "7", "configs.create", config(&scale_id, 15, 15, 30, 40));
    assert_eq!(error["code"], "conflict");

    let found = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "configs.forSession",
        json!({ "academicYear": YEAR, "term": TERM }),
    );
    assert_eq!(found["id"], created["id"]);

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn scales_must_descend_and_cannot_be_deleted_while_in_use() {
    let workspace = temp_dir("gradebook-scale-validation");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let error = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "scales.create",
        json!({ "name": "Backwards", "aMin": 60, "bMin": 70, "cMin": 80, "dMin": 90 }),
    );
    assert_eq!(error["code"], "validation_failed");
    assert_eq!(error_fields(&error), vec!["thresholds"]);

    let scale = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "scales.create",
        json!({ "name": "Standard", "aMin": 90, "bMin": 80, "cMin": 70, "dMin": 60 }),
    );
    let scale_id = str_field(&scale, "id");
    let created = request_ok(&mut stdin, &mut reader, "4", "configs.create", config(&scale_id, 10, 10, 30, 50));

    let error = request_err(&mut stdin, &mut reader, "5", "scales.delete", json!({ "scaleId": scale_id }));
    assert_eq!(error["code"], "conflict");

    request_ok(&mut stdin, &mut reader, "6", "configs.delete", json!({ "configId": created["id"] }));
    request_ok(&mut stdin, &mut reader, "7", "scales.delete", json!({ "scaleId": scale_id }));
    let error = request_err(&mut stdin, &mut reader, "8", "scales.get", json!({ "scaleId": scale_id }));
    assert_eq!(error["code"], "not_found");

    let _ = std::fs::remove_dir_all(workspace);
}
