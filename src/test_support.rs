//! Fixtures shared by the unit tests.

use crate::config::DbSettings;
use crate::context::RequestContext;
use crate::db::open_db;
use crate::grading_config::{self, NewGradingConfig, PercentagesInput};
use crate::registry::{self, Subject};
use crate::scale::{self, NewGradingScale};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

pub const YEAR: &str = "2024/2025";
pub const TERM: i64 = 1;

pub fn ctx() -> RequestContext {
    RequestContext::new("test", Some("tester"))
}

pub fn open(workspace: &Path) -> Connection {
    open_db(
        workspace,
        DbSettings {
            busy_timeout: Duration::from_secs(10),
        },
    )
    .expect("open db")
}

pub fn scratch_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().expect("tempdir");
    let conn = open(dir.path());
    (dir, conn)
}

/// A 90/80/70/60 scale.
pub fn create_standard_scale(conn: &Connection) -> String {
    scale::create(
        conn,
        &ctx(),
        NewGradingScale {
            name: "Standard".into(),
            academic_year: None,
            term: None,
            a_min: 90.0,
            b_min: 80.0,
            c_min: 70.0,
            d_min: 60.0,
        },
    )
    .expect("create scale")
    .id
}

pub fn seed_subject(conn: &Connection, subject_id: &str, academic_year: &str, term: i64) {
    registry::upsert_subject(
        conn,
        &ctx(),
        &Subject {
            id: subject_id.to_string(),
            name: subject_id.to_uppercase(),
            academic_year: academic_year.to_string(),
            term,
        },
    )
    .expect("seed subject");
}

/// Make every `event` (INSERT or UPDATE) on `table` whose `column` equals
/// `value` abort, so one row of a sweep fails.
pub fn reject_writes(conn: &Connection, table: &str, event: &str, column: &str, value: &str) {
    conn.execute_batch(&format!(
        "CREATE TRIGGER reject_{table}_{event} BEFORE {event} ON {table}
         WHEN NEW.{column} = '{value}'
         BEGIN SELECT RAISE(ABORT, 'write rejected'); END;"
    ))
    .expect("create trigger");
}

pub struct School {
    pub subject_id: String,
    pub student_ids: Vec<String>,
}

/// One session with a 10/10/30/50 config, subject `math`, and two enrolled
/// students `s-1`, `s-2`.
pub fn seed_school(conn: &Connection) -> School {
    let scale_id = create_standard_scale(conn);
    grading_config::create(
        conn,
        &ctx(),
        NewGradingConfig {
            academic_year: YEAR.into(),
            term: TERM,
            percentages: PercentagesInput {
                attendance: 10,
                assignment: 10,
                test: 30,
                exam: 50,
            },
            grading_scale_id: scale_id,
        },
    )
    .expect("create config");
    seed_subject(conn, "math", YEAR, TERM);
    let student_ids: Vec<String> = ["s-1", "s-2"].iter().map(|s| s.to_string()).collect();
    for (i, id) in student_ids.iter().enumerate() {
        registry::upsert_student(conn, &ctx(), id, &format!("Student {}", i + 1), true)
            .expect("seed student");
        registry::enroll(conn, &ctx(), id, "math", true).expect("enroll");
    }
    School {
        subject_id: "math".into(),
        student_ids,
    }
}
