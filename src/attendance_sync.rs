//! Rolls raw attendance marks into the attendance component of every active
//! enrollment in a session.

use crate::calc::{attendance_score, Component};
use crate::context::RequestContext;
use crate::db;
use crate::error::EngineResult;
use crate::ledger::{self, Grading, Writer};
use crate::registry::Subject;
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub updated_count: u32,
    pub skipped_count: u32,
    pub failed_count: u32,
    pub message: String,
}

enum RowOutcome {
    Updated(f64),
    Skipped,
}

struct Enrolled {
    student_id: String,
    subject: Subject,
}

fn school_days(conn: &Connection, academic_year: &str, term: i64) -> EngineResult<u32> {
    let days: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT school_day) FROM attendance_records
         WHERE academic_year = ? AND term = ?",
        (academic_year, term),
        |r| r.get(0),
    )?;
    Ok(days.max(0) as u32)
}

fn present_days(
    conn: &Connection,
    student_id: &str,
    academic_year: &str,
    term: i64,
) -> EngineResult<u32> {
    let days: i64 = conn.query_row(
        "SELECT COUNT(*) FROM attendance_records
         WHERE student_id = ? AND academic_year = ? AND term = ? AND present = 1",
        (student_id, academic_year, term),
        |r| r.get(0),
    )?;
    Ok(days.max(0) as u32)
}

fn active_enrollments(
    conn: &Connection,
    academic_year: &str,
    term: i64,
) -> EngineResult<Vec<Enrolled>> {
    let mut stmt = conn.prepare(
        "SELECT e.student_id, s.id, s.name, s.academic_year, s.term
         FROM enrollments e
         JOIN subjects s ON s.id = e.subject_id
         JOIN students st ON st.id = e.student_id
         WHERE e.active = 1 AND st.active = 1 AND s.academic_year = ? AND s.term = ?
         ORDER BY s.id, e.student_id",
    )?;
    let rows = stmt
        .query_map((academic_year, term), |r| {
            Ok(Enrolled {
                student_id: r.get(0)?,
                subject: Subject {
                    id: r.get(1)?,
                    name: r.get(2)?,
                    academic_year: r.get(3)?,
                    term: r.get(4)?,
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn sync_one(
    conn: &Connection,
    ctx: &RequestContext,
    grading: &Grading,
    row: &Enrolled,
    total_days: u32,
) -> EngineResult<RowOutcome> {
    let tx = db::begin_write(conn)?;
    let existing = ledger::find_summary(&tx, &row.student_id, &row.subject.id)?;
    if existing.is_some_and(|s| s.attendance_state.is_finalized()) {
        return Ok(RowOutcome::Skipped);
    }
    let present = present_days(
        &tx,
        &row.student_id,
        &row.subject.academic_year,
        row.subject.term,
    )?;
    let score = attendance_score(
        present,
        total_days,
        grading.weights.percentage(Component::Attendance),
    );
    ledger::write_component_tx(
        &tx,
        ctx,
        &row.subject,
        grading,
        &row.student_id,
        Component::Attendance,
        score,
        Writer::AttendanceSync,
    )?;
    tx.commit()?;
    Ok(RowOutcome::Updated(score))
}

/// Sweep every active enrollment in the session. Rows already finalized are
/// skipped; a failing row is counted and the sweep moves on.
pub fn sync(
    conn: &Connection,
    ctx: &RequestContext,
    academic_year: &str,
    term: i64,
) -> EngineResult<SyncReport> {
    let grading = ledger::grading_for_session(conn, academic_year, term)?;
    let total_days = school_days(conn, academic_year, term)?;
    if total_days == 0 {
        let message = format!(
            "No school days recorded for {} term {}; nothing synced",
            academic_year, term
        );
        info!(academic_year, term, "attendance sync found no school days");
        return Ok(SyncReport {
            message,
            ..SyncReport::default()
        });
    }

    let mut report = SyncReport::default();
    for row in active_enrollments(conn, academic_year, term)? {
        match sync_one(conn, ctx, &grading, &row, total_days) {
            Ok(RowOutcome::Updated(score)) => {
                report.updated_count += 1;
                debug!(student_id = %row.student_id, subject_id = %row.subject.id, score, "attendance synced");
            }
            Ok(RowOutcome::Skipped) => {
                report.skipped_count += 1;
                debug!(student_id = %row.student_id, subject_id = %row.subject.id, "attendance already finalized");
            }
            Err(e) => {
                report.failed_count += 1;
                warn!(
                    student_id = %row.student_id,
                    subject_id = %row.subject.id,
                    error = %e,
                    "attendance sync failed for row"
                );
            }
        }
    }
    report.message = format!(
        "Attendance synced for {} term {} over {} school days: {} updated, {} skipped, {} failed",
        academic_year,
        term,
        total_days,
        report.updated_count,
        report.skipped_count,
        report.failed_count
    );
    info!(
        academic_year,
        term,
        updated = report.updated_count,
        skipped = report.skipped_count,
        failed = report.failed_count,
        actor = %ctx.actor,
        "attendance sync finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::ledger::{reopen_attendance, set_component, summary, ScoreSource};
    use crate::registry::{enroll, record_attendance, AttendanceMark};
    use crate::test_support::{ctx, reject_writes, scratch_db, seed_school, School, TERM, YEAR};
    use chrono::NaiveDate;

    /// Ten school days; `s-1` present on 8, `s-2` on 5.
    fn record_ten_days(conn: &Connection, school: &School) {
        for day in 0..10u32 {
            let school_day = NaiveDate::from_ymd_opt(2024, 9, 2 + day).expect("date");
            for (student_id, attended) in school.student_ids.iter().zip([8u32, 5]) {
                record_attendance(
                    conn,
                    &ctx(),
                    &AttendanceMark {
                        student_id: student_id.clone(),
                        school_day,
                        academic_year: YEAR.into(),
                        term: TERM,
                        present: day < attended,
                    },
                )
                .expect("mark");
            }
        }
    }

    #[test]
    fn sync_scores_and_finalizes_then_skips() {
        let (_dir, conn) = scratch_db();
        let school = seed_school(&conn);
        record_ten_days(&conn, &school);

        let first = sync(&conn, &ctx(), YEAR, TERM).expect("first sync");
        assert_eq!((first.updated_count, first.skipped_count, first.failed_count), (2, 0, 0));

        let s1 = summary(&conn, "s-1", &school.subject_id).expect("s-1");
        let s2 = summary(&conn, "s-2", &school.subject_id).expect("s-2");
        assert_eq!(s1.attendance_score, 8.0);
        assert_eq!(s2.attendance_score, 5.0);
        assert!(s1.attendance_finalized && s2.attendance_finalized);
        assert_eq!(s1.total_score, 8.0);

        let second = sync(&conn, &ctx(), YEAR, TERM).expect("second sync");
        assert_eq!((second.updated_count, second.skipped_count, second.failed_count), (0, 2, 0));
    }

    #[test]
    fn failing_row_is_counted_and_the_sweep_continues() {
        let (_dir, conn) = scratch_db();
        let school = seed_school(&conn);
        record_ten_days(&conn, &school);
        reject_writes(&conn, "grade_summaries", "INSERT", "student_id", "s-1");

        let report = sync(&conn, &ctx(), YEAR, TERM).expect("sync");
        assert_eq!((report.updated_count, report.skipped_count, report.failed_count), (1, 0, 1));
        assert!(report.message.contains("1 failed"), "{}", report.message);
        assert!(matches!(
            summary(&conn, "s-1", &school.subject_id),
            Err(EngineError::NotFound { .. })
        ));
        let s2 = summary(&conn, "s-2", &school.subject_id).expect("s-2");
        assert_eq!(s2.attendance_score, 5.0);
        assert!(s2.attendance_finalized);

        conn.execute_batch("DROP TRIGGER reject_grade_summaries_INSERT")
            .expect("drop trigger");
        let retry = sync(&conn, &ctx(), YEAR, TERM).expect("retry");
        assert_eq!((retry.updated_count, retry.skipped_count, retry.failed_count), (1, 1, 0));
        assert_eq!(summary(&conn, "s-1", &school.subject_id).expect("s-1").attendance_score, 8.0);
    }

    #[test]
    fn sync_overwrites_open_manual_attendance() {
        let (_dir, conn) = scratch_db();
        let school = seed_school(&conn);
        record_ten_days(&conn, &school);
        set_component(&conn, &ctx(), "s-2", &school.subject_id, Component::Attendance, 9.5, ScoreSource::Manual)
            .expect("manual");
        assert!(!summary(&conn, "s-2", &school.subject_id).expect("s-2").attendance_finalized);

        sync(&conn, &ctx(), YEAR, TERM).expect("sync");
        assert_eq!(summary(&conn, "s-2", &school.subject_id).expect("s-2").attendance_score, 5.0);
    }

    #[test]
    fn reopened_row_is_synced_again() {
        let (_dir, conn) = scratch_db();
        let school = seed_school(&conn);
        record_ten_days(&conn, &school);
        sync(&conn, &ctx(), YEAR, TERM).expect("sync");

        reopen_attendance(&conn, &ctx(), "s-1", &school.subject_id).expect("reopen");
        let report = sync(&conn, &ctx(), YEAR, TERM).expect("resync");
        assert_eq!((report.updated_count, report.skipped_count), (1, 1));
    }

    #[test]
    fn inactive_enrollment_is_left_alone() {
        let (_dir, conn) = scratch_db();
        let school = seed_school(&conn);
        record_ten_days(&conn, &school);
        enroll(&conn, &ctx(), "s-2", &school.subject_id, false).expect("deactivate");

        let report = sync(&conn, &ctx(), YEAR, TERM).expect("sync");
        assert_eq!(report.updated_count, 1);
        assert!(matches!(
            summary(&conn, "s-2", &school.subject_id),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn no_school_days_touches_nothing() {
        let (_dir, conn) = scratch_db();
        let school = seed_school(&conn);
        let report = sync(&conn, &ctx(), YEAR, TERM).expect("sync");
        assert_eq!((report.updated_count, report.skipped_count, report.failed_count), (0, 0, 0));
        assert!(report.message.contains("No school days"));
        assert!(ledger::find_summary(&conn, "s-1", &school.subject_id).expect("find").is_none());
    }

    #[test]
    fn missing_configuration_fails_the_whole_call() {
        let (_dir, conn) = scratch_db();
        seed_school(&conn);
        let err = sync(&conn, &ctx(), "2030/2031", 3).expect_err("no config");
        assert!(matches!(err, EngineError::NotFound { entity: "grading configuration", .. }));
    }
}
