//! Mirrors of records owned by other systems: students, subjects with their
//! session, enrollments, and raw attendance marks. The engine reads these and
//! accepts them as a feed; it never derives them.

use crate::context::RequestContext;
use crate::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub academic_year: String,
    pub term: i64,
}

#[derive(Debug, Clone)]
pub struct AttendanceMark {
    pub student_id: String,
    pub school_day: NaiveDate,
    pub academic_year: String,
    pub term: i64,
    pub present: bool,
}

pub fn upsert_student(
    conn: &Connection,
    ctx: &RequestContext,
    student_id: &str,
    display_name: &str,
    active: bool,
) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO students(id, display_name, active) VALUES(?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
           display_name = excluded.display_name,
           active = excluded.active",
        (student_id, display_name, active),
    )?;
    debug!(student_id, actor = %ctx.actor, "student upserted");
    Ok(())
}

pub fn upsert_subject(
    conn: &Connection,
    ctx: &RequestContext,
    subject: &Subject,
) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO subjects(id, name, academic_year, term) VALUES(?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           academic_year = excluded.academic_year,
           term = excluded.term",
        (&subject.id, &subject.name, &subject.academic_year, subject.term),
    )?;
    debug!(subject_id = %subject.id, actor = %ctx.actor, "subject upserted");
    Ok(())
}

pub fn enroll(
    conn: &Connection,
    ctx: &RequestContext,
    student_id: &str,
    subject_id: &str,
    active: bool,
) -> EngineResult<()> {
    require_student(conn, student_id)?;
    subject(conn, subject_id)?;
    conn.execute(
        "INSERT INTO enrollments(student_id, subject_id, active) VALUES(?, ?, ?)
         ON CONFLICT(student_id, subject_id) DO UPDATE SET active = excluded.active",
        (student_id, subject_id, active),
    )?;
    debug!(student_id, subject_id, active, actor = %ctx.actor, "enrollment set");
    Ok(())
}

/// One presence mark per student per school day; a later mark for the same day
/// replaces the earlier one.
pub fn record_attendance(
    conn: &Connection,
    ctx: &RequestContext,
    mark: &AttendanceMark,
) -> EngineResult<()> {
    require_student(conn, &mark.student_id)?;
    conn.execute(
        "INSERT INTO attendance_records(student_id, school_day, academic_year, term, present)
         VALUES(?, ?, ?, ?, ?)
         ON CONFLICT(student_id, school_day) DO UPDATE SET
           academic_year = excluded.academic_year,
           term = excluded.term,
           present = excluded.present",
        (
            &mark.student_id,
            mark.school_day.format("%Y-%m-%d").to_string(),
            &mark.academic_year,
            mark.term,
            mark.present,
        ),
    )?;
    debug!(student_id = %mark.student_id, day = %mark.school_day, actor = %ctx.actor, "attendance recorded");
    Ok(())
}

pub fn subject(conn: &Connection, subject_id: &str) -> EngineResult<Subject> {
    conn.query_row(
        "SELECT id, name, academic_year, term FROM subjects WHERE id = ?",
        [subject_id],
        |r| {
            Ok(Subject {
                id: r.get(0)?,
                name: r.get(1)?,
                academic_year: r.get(2)?,
                term: r.get(3)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| EngineError::not_found("subject", subject_id))
}

pub fn require_student(conn: &Connection, student_id: &str) -> EngineResult<()> {
    let found = conn
        .query_row("SELECT 1 FROM students WHERE id = ?", [student_id], |r| {
            r.get::<_, i64>(0)
        })
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(EngineError::not_found("student", student_id)),
    }
}
