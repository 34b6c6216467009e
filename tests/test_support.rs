#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub const YEAR: &str = "2024/2025";
pub const TERM: i64 = 1;

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
        "actor": "registrar",
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or(serde_json::Value::Null)
}

/// Returns the `error` object of a failed response.
pub fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value.get("error").cloned().expect("error object")
}

pub fn error_fields(error: &serde_json::Value) -> Vec<String> {
    error
        .pointer("/details/errors")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|e| e.get("field").and_then(|f| f.as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn str_field(value: &serde_json::Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("missing {} in {}", key, value))
        .to_string()
}

/// Select `workspace`, then seed a 90/80/70/60 scale, a 10/10/30/50 config for
/// the session, subject `math`, and enrolled students `s-1` and `s-2`.
/// Uses request ids prefixed with `seed-`.
pub fn seed_school(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    workspace: &std::path::Path,
) -> String {
    request_ok(
        stdin,
        reader,
        "seed-ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let scale = request_ok(
        stdin,
        reader,
        "seed-scale",
        "scales.create",
        json!({ "name": "Standard", "aMin": 90, "bMin": 80, "cMin": 70, "dMin": 60 }),
    );
    let scale_id = str_field(&scale, "id");
    request_ok(
        stdin,
        reader,
        "seed-config",
        "configs.create",
        json!({
            "academicYear": YEAR,
            "term": TERM,
            "attendancePercentage": 10,
            "assignmentPercentage": 10,
            "testPercentage": 30,
            "examPercentage": 50,
            "gradingScaleId": scale_id,
        }),
    );
    request_ok(
        stdin,
        reader,
        "seed-subject",
        "registry.upsertSubject",
        json!({ "subjectId": "math", "name": "Mathematics", "academicYear": YEAR, "term": TERM }),
    );
    for student in ["s-1", "s-2"] {
        request_ok(
            stdin,
            reader,
            &format!("seed-student-{}", student),
            "registry.upsertStudent",
            json!({ "studentId": student, "displayName": format!("Student {}", student) }),
        );
        request_ok(
            stdin,
            reader,
            &format!("seed-enroll-{}", student),
            "registry.enroll",
            json!({ "studentId": student, "subjectId": "math" }),
        );
    }
    scale_id
}
