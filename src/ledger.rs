//! Per-student, per-subject grade summaries and the submissions feeding them.
//!
//! Every write validates first, then updates the component and recomputes the
//! total and letter grade inside one write transaction, so a reader never sees
//! a total that disagrees with its components.

use crate::calc::{round_off_1_decimal, total_of, Component, LetterGrade};
use crate::context::RequestContext;
use crate::db;
use crate::error::{is_unique_violation, EngineError, EngineResult};
use crate::grading_config::{self, GradingWeights};
use crate::registry::{self, Subject};
use crate::release::{self, Assessment, AssessmentType};
use crate::scale::{self, Thresholds};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Where a component value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreSource {
    /// Typed in directly.
    Manual,
    /// Score of a submission for the given assessment.
    OnlineSubmission(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    Open,
    Finalized,
}

impl AttendanceState {
    pub fn finalize(self) -> Self {
        Self::Finalized
    }

    pub fn reopen(self) -> Self {
        Self::Open
    }

    pub fn is_finalized(self) -> bool {
        self == Self::Finalized
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Finalized => "finalized",
        }
    }

    fn from_column(s: &str) -> Self {
        if s == "finalized" {
            Self::Finalized
        } else {
            Self::Open
        }
    }
}

/// Who is writing. Only the sync writer may set a finalized attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Writer {
    Request,
    AttendanceSync,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    pub id: String,
    pub student_id: String,
    pub subject_id: String,
    pub academic_year: String,
    pub term: i64,
    pub attendance_score: f64,
    pub assignment_score: f64,
    pub test_score: f64,
    pub exam_score: f64,
    pub total_score: f64,
    pub letter_grade: LetterGrade,
    pub attendance_state: AttendanceState,
    pub attendance_finalized: bool,
    pub updated_by: String,
    pub updated_at: String,
}

impl GradeSummary {
    fn blank(student_id: &str, subject: &Subject) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            subject_id: subject.id.clone(),
            academic_year: subject.academic_year.clone(),
            term: subject.term,
            attendance_score: 0.0,
            assignment_score: 0.0,
            test_score: 0.0,
            exam_score: 0.0,
            total_score: 0.0,
            letter_grade: LetterGrade::F,
            attendance_state: AttendanceState::Open,
            attendance_finalized: false,
            updated_by: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn component(&self, component: Component) -> f64 {
        match component {
            Component::Attendance => self.attendance_score,
            Component::Assignment => self.assignment_score,
            Component::Test => self.test_score,
            Component::Exam => self.exam_score,
        }
    }

    fn set_component(&mut self, component: Component, value: f64) {
        let slot = match component {
            Component::Attendance => &mut self.attendance_score,
            Component::Assignment => &mut self.assignment_score,
            Component::Test => &mut self.test_score,
            Component::Exam => &mut self.exam_score,
        };
        *slot = value;
    }

    fn set_attendance_state(&mut self, state: AttendanceState) {
        self.attendance_state = state;
        self.attendance_finalized = state.is_finalized();
    }

    fn recompute(&mut self, thresholds: &Thresholds) {
        self.total_score = total_of(
            self.attendance_score,
            self.assignment_score,
            self.test_score,
            self.exam_score,
        );
        self.letter_grade = thresholds.letter_for(self.total_score);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub student_id: String,
    pub assessment_id: String,
    pub score: f64,
    pub is_submitted: bool,
    pub is_manual: bool,
    pub updated_by: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerUpdate {
    pub summary: GradeSummary,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionUpdate {
    pub submission: Submission,
    pub summary: GradeSummary,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum SubmissionTarget {
    Pair {
        student_id: String,
        assessment_id: String,
    },
    Id(String),
}

/// A submission score a student may see: its assessment has been released.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasedScore {
    pub assessment_id: String,
    pub assessment_type: AssessmentType,
    pub title: String,
    pub total_marks: f64,
    pub score: f64,
    pub is_submitted: bool,
}

/// Weights and letter thresholds in force for one session.
pub(crate) struct Grading {
    pub weights: GradingWeights,
    pub thresholds: Thresholds,
}

pub(crate) fn grading_for_session(
    conn: &Connection,
    academic_year: &str,
    term: i64,
) -> EngineResult<Grading> {
    let config = grading_config::for_session(conn, academic_year, term)?;
    let scale = scale::get(conn, &config.grading_scale_id)?;
    Ok(Grading {
        weights: config.weights,
        thresholds: scale.thresholds,
    })
}

fn check_component_value(
    component: Component,
    value: f64,
    weights: &GradingWeights,
) -> EngineResult<()> {
    let field = format!("{}Score", component.as_str());
    let cap = weights.percentage(component);
    if !value.is_finite() {
        return Err(EngineError::field(&field, "must be a number"));
    }
    if value < 0.0 {
        return Err(EngineError::field(&field, "cannot be negative"));
    }
    if value > weights.cap(component) {
        return Err(EngineError::field(
            &field,
            format!("{} score cannot exceed {}", component.label(), cap),
        ));
    }
    Ok(())
}

const SUMMARY_SELECT: &str = "SELECT g.id, g.student_id, g.subject_id, s.academic_year, s.term,
        g.attendance_score, g.assignment_score, g.test_score, g.exam_score,
        g.total_score, g.letter_grade, g.attendance_state, g.updated_by, g.updated_at
     FROM grade_summaries g
     JOIN subjects s ON s.id = g.subject_id";

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<GradeSummary> {
    let letter: String = row.get(10)?;
    let letter_grade = LetterGrade::parse(&letter).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            10,
            rusqlite::types::Type::Text,
            format!("unknown letter grade {letter}").into(),
        )
    })?;
    let attendance_state = AttendanceState::from_column(&row.get::<_, String>(11)?);
    Ok(GradeSummary {
        id: row.get(0)?,
        student_id: row.get(1)?,
        subject_id: row.get(2)?,
        academic_year: row.get(3)?,
        term: row.get(4)?,
        attendance_score: row.get(5)?,
        assignment_score: row.get(6)?,
        test_score: row.get(7)?,
        exam_score: row.get(8)?,
        total_score: row.get(9)?,
        letter_grade,
        attendance_state,
        attendance_finalized: attendance_state.is_finalized(),
        updated_by: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

pub(crate) fn find_summary(
    conn: &Connection,
    student_id: &str,
    subject_id: &str,
) -> EngineResult<Option<GradeSummary>> {
    let found = conn
        .query_row(
            &format!(
                "{} WHERE g.student_id = ? AND g.subject_id = ?",
                SUMMARY_SELECT
            ),
            (student_id, subject_id),
            summary_from_row,
        )
        .optional()?;
    Ok(found)
}

fn persist_summary(
    conn: &Connection,
    ctx: &RequestContext,
    summary: &mut GradeSummary,
    is_new: bool,
) -> EngineResult<()> {
    summary.updated_by = ctx.actor.clone();
    summary.updated_at = db::now_ts();
    if is_new {
        conn.execute(
            "INSERT INTO grade_summaries(
               id, student_id, subject_id, attendance_score, assignment_score, test_score,
               exam_score, total_score, letter_grade, attendance_state, updated_by, updated_at
             ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                &summary.id,
                &summary.student_id,
                &summary.subject_id,
                summary.attendance_score,
                summary.assignment_score,
                summary.test_score,
                summary.exam_score,
                summary.total_score,
                summary.letter_grade.as_str(),
                summary.attendance_state.as_str(),
                &summary.updated_by,
                &summary.updated_at,
            ),
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                EngineError::conflict("grade summary was created concurrently")
            } else {
                EngineError::from(e)
            }
        })?;
    } else {
        conn.execute(
            "UPDATE grade_summaries
             SET attendance_score = ?, assignment_score = ?, test_score = ?, exam_score = ?,
                 total_score = ?, letter_grade = ?, attendance_state = ?,
                 updated_by = ?, updated_at = ?
             WHERE id = ?",
            (
                summary.attendance_score,
                summary.assignment_score,
                summary.test_score,
                summary.exam_score,
                summary.total_score,
                summary.letter_grade.as_str(),
                summary.attendance_state.as_str(),
                &summary.updated_by,
                &summary.updated_at,
                &summary.id,
            ),
        )?;
    }
    Ok(())
}

/// Write one component and recompute total/grade. Caller owns the transaction.
pub(crate) fn write_component_tx(
    conn: &Connection,
    ctx: &RequestContext,
    subject: &Subject,
    grading: &Grading,
    student_id: &str,
    component: Component,
    value: f64,
    writer: Writer,
) -> EngineResult<GradeSummary> {
    check_component_value(component, value, &grading.weights)?;

    let existing = find_summary(conn, student_id, &subject.id)?;
    let is_new = existing.is_none();
    let mut summary = existing.unwrap_or_else(|| GradeSummary::blank(student_id, subject));

    if component == Component::Attendance {
        if summary.attendance_state.is_finalized() && writer != Writer::AttendanceSync {
            return Err(EngineError::field(
                "attendanceScore",
                "attendance is finalized; reopen it before editing",
            ));
        }
        if writer == Writer::AttendanceSync {
            summary.set_attendance_state(summary.attendance_state.finalize());
        }
    }

    summary.set_component(component, round_off_1_decimal(value));
    summary.recompute(&grading.thresholds);
    persist_summary(conn, ctx, &mut summary, is_new)?;
    Ok(summary)
}

/// Test and exam are the sum of the subject's submissions once any assessment
/// feeds them; a typed value would be overwritten by the next submission.
fn reject_manual_over_submissions(
    conn: &Connection,
    subject: &Subject,
    component: Component,
) -> EngineResult<()> {
    if !matches!(component, Component::Test | Component::Exam) {
        return Ok(());
    }
    let feeding = release::list_for_subject(conn, &subject.id)?
        .into_iter()
        .filter(|a| a.assessment_type.component() == component)
        .count();
    if feeding > 0 {
        return Err(EngineError::field(
            &format!("{}Score", component.as_str()),
            format!(
                "{} score in {} is computed from {} assessment(s); update their submission scores instead",
                component.label(),
                subject.name,
                feeding
            ),
        ));
    }
    Ok(())
}

/// Set one component of a student's summary for a subject.
pub fn set_component(
    conn: &Connection,
    ctx: &RequestContext,
    student_id: &str,
    subject_id: &str,
    component: Component,
    value: f64,
    source: ScoreSource,
) -> EngineResult<LedgerUpdate> {
    let tx = db::begin_write(conn)?;
    registry::require_student(&tx, student_id)?;
    let subject = registry::subject(&tx, subject_id)?;

    let update = match source {
        ScoreSource::Manual => {
            let grading = grading_for_session(&tx, &subject.academic_year, subject.term)?;
            reject_manual_over_submissions(&tx, &subject, component)?;
            let summary = write_component_tx(
                &tx,
                ctx,
                &subject,
                &grading,
                student_id,
                component,
                value,
                Writer::Request,
            )?;
            let message = format!(
                "{} score for {} in {} set to {:.1}",
                component.label(),
                student_id,
                subject.name,
                summary.component(component)
            );
            LedgerUpdate { summary, message }
        }
        ScoreSource::OnlineSubmission(assessment_id) => {
            if !matches!(component, Component::Test | Component::Exam) {
                return Err(EngineError::field(
                    "source",
                    "online submissions only feed the test and exam components",
                ));
            }
            let assessment = release::get(&tx, &assessment_id)?;
            let mut errors = Vec::new();
            if assessment.subject_id != subject.id {
                errors.push(crate::error::FieldError::new(
                    "assessmentId",
                    format!("assessment {} belongs to another subject", assessment.id),
                ));
            }
            if assessment.assessment_type.component() != component {
                errors.push(crate::error::FieldError::new(
                    "component",
                    format!(
                        "{} assessments feed the {} component",
                        assessment.assessment_type.as_str(),
                        assessment.assessment_type.component()
                    ),
                ));
            }
            if !errors.is_empty() {
                return Err(EngineError::validation(errors));
            }
            let applied = apply_submission(&tx, ctx, student_id, &assessment, value, false)?;
            LedgerUpdate {
                summary: applied.summary,
                message: applied.message,
            }
        }
    };

    tx.commit()?;
    info!(
        student_id,
        subject_id,
        component = component.as_str(),
        total = update.summary.total_score,
        request_id = %ctx.request_id,
        actor = %ctx.actor,
        "grade component updated"
    );
    Ok(update)
}

fn find_submission(
    conn: &Connection,
    student_id: &str,
    assessment_id: &str,
) -> EngineResult<Option<Submission>> {
    let found = conn
        .query_row(
            "SELECT id, student_id, assessment_id, score, is_submitted, is_manual,
                    updated_by, updated_at
             FROM submissions WHERE student_id = ? AND assessment_id = ?",
            (student_id, assessment_id),
            |r| {
                Ok(Submission {
                    id: r.get(0)?,
                    student_id: r.get(1)?,
                    assessment_id: r.get(2)?,
                    score: r.get(3)?,
                    is_submitted: r.get(4)?,
                    is_manual: r.get(5)?,
                    updated_by: r.get(6)?,
                    updated_at: r.get(7)?,
                })
            },
        )
        .optional()?;
    Ok(found)
}

/// Plain insert; a second row for the same (student, assessment) is refused by
/// the unique constraint and reported as a conflict.
pub(crate) fn insert_submission(conn: &Connection, submission: &Submission) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO submissions(
           id, student_id, assessment_id, score, is_submitted, is_manual, updated_by, updated_at
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &submission.id,
            &submission.student_id,
            &submission.assessment_id,
            submission.score,
            submission.is_submitted,
            submission.is_manual,
            &submission.updated_by,
            &submission.updated_at,
        ),
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            EngineError::conflict(format!(
                "submission already exists for student {} on assessment {}",
                submission.student_id, submission.assessment_id
            ))
        } else {
            EngineError::from(e)
        }
    })?;
    Ok(())
}

fn write_submission_row(
    conn: &Connection,
    ctx: &RequestContext,
    student_id: &str,
    assessment_id: &str,
    score: f64,
    is_manual: bool,
) -> EngineResult<Submission> {
    let now = db::now_ts();
    match find_submission(conn, student_id, assessment_id)? {
        Some(mut existing) => {
            existing.score = score;
            existing.is_manual = is_manual;
            // A manual edit keeps whatever the original attempt recorded.
            if !is_manual {
                existing.is_submitted = true;
            }
            existing.updated_by = ctx.actor.clone();
            existing.updated_at = now;
            conn.execute(
                "UPDATE submissions
                 SET score = ?, is_manual = ?, is_submitted = ?, updated_by = ?, updated_at = ?
                 WHERE id = ?",
                (
                    existing.score,
                    existing.is_manual,
                    existing.is_submitted,
                    &existing.updated_by,
                    &existing.updated_at,
                    &existing.id,
                ),
            )?;
            Ok(existing)
        }
        None => {
            let submission = Submission {
                id: Uuid::new_v4().to_string(),
                student_id: student_id.to_string(),
                assessment_id: assessment_id.to_string(),
                score,
                is_submitted: !is_manual,
                is_manual,
                updated_by: ctx.actor.clone(),
                updated_at: now,
            };
            insert_submission(conn, &submission)?;
            Ok(submission)
        }
    }
}

/// Find-or-create the submission row. An insert that loses a race to another
/// writer is retried once, which re-reads the row and updates it instead.
fn upsert_submission(
    conn: &Connection,
    ctx: &RequestContext,
    student_id: &str,
    assessment_id: &str,
    score: f64,
    is_manual: bool,
) -> EngineResult<Submission> {
    match write_submission_row(conn, ctx, student_id, assessment_id, score, is_manual) {
        Err(EngineError::Conflict { message }) => {
            warn!(student_id, assessment_id, %message, "submission insert collided, retrying as update");
            write_submission_row(conn, ctx, student_id, assessment_id, score, is_manual)
        }
        other => other,
    }
}

/// Sum of the student's other submissions feeding `component` in the subject.
fn other_submissions_total(
    conn: &Connection,
    student_id: &str,
    subject_id: &str,
    component: Component,
    excluding_assessment_id: &str,
) -> EngineResult<f64> {
    let mut stmt = conn.prepare(
        "SELECT a.assessment_type, sub.score
         FROM submissions sub
         JOIN assessments a ON a.id = sub.assessment_id
         WHERE sub.student_id = ? AND a.subject_id = ? AND sub.assessment_id <> ?",
    )?;
    let rows = stmt
        .query_map((student_id, subject_id, excluding_assessment_id), |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, f64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows
        .into_iter()
        .filter(|(kind, _)| AssessmentType::parse(kind).map(|t| t.component()) == Some(component))
        .map(|(_, score)| score)
        .sum())
}

fn apply_submission(
    conn: &Connection,
    ctx: &RequestContext,
    student_id: &str,
    assessment: &Assessment,
    score: f64,
    is_manual: bool,
) -> EngineResult<SubmissionUpdate> {
    if !score.is_finite() {
        return Err(EngineError::field("score", "must be a number"));
    }
    if score < 0.0 {
        return Err(EngineError::field("score", "cannot be negative"));
    }
    if score > assessment.total_marks {
        return Err(EngineError::field(
            "score",
            format!("cannot exceed total marks {}", assessment.total_marks),
        ));
    }

    let subject = registry::subject(conn, &assessment.subject_id)?;
    let grading = grading_for_session(conn, &subject.academic_year, subject.term)?;
    let component = assessment.assessment_type.component();
    let others = other_submissions_total(conn, student_id, &subject.id, component, &assessment.id)?;
    let component_value = round_off_1_decimal(others + score);
    check_component_value(component, component_value, &grading.weights)?;

    let submission = upsert_submission(conn, ctx, student_id, &assessment.id, score, is_manual)?;
    let summary = write_component_tx(
        conn,
        ctx,
        &subject,
        &grading,
        student_id,
        component,
        component_value,
        Writer::Request,
    )?;
    let message = format!(
        "Score for {} on {} set to {} / {}; {} component now {:.1}",
        student_id,
        assessment.title,
        score,
        assessment.total_marks,
        component,
        summary.component(component)
    );
    Ok(SubmissionUpdate {
        submission,
        summary,
        message,
    })
}

/// Record a score against one assessment and roll it into the summary.
/// `is_manual` defaults to true; a non-manual write counts as an online attempt.
pub fn update_submission_score(
    conn: &Connection,
    ctx: &RequestContext,
    target: SubmissionTarget,
    score: f64,
    is_manual: Option<bool>,
) -> EngineResult<SubmissionUpdate> {
    let tx = db::begin_write(conn)?;
    let (student_id, assessment_id) = match target {
        SubmissionTarget::Pair {
            student_id,
            assessment_id,
        } => (student_id, assessment_id),
        SubmissionTarget::Id(submission_id) => tx
            .query_row(
                "SELECT student_id, assessment_id FROM submissions WHERE id = ?",
                [&submission_id],
                |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)),
            )
            .optional()?
            .ok_or_else(|| EngineError::not_found("submission", submission_id))?,
    };
    registry::require_student(&tx, &student_id)?;
    let assessment = release::get(&tx, &assessment_id)?;

    let update = apply_submission(
        &tx,
        ctx,
        &student_id,
        &assessment,
        score,
        is_manual.unwrap_or(true),
    )?;
    tx.commit()?;
    info!(
        student_id = %student_id,
        assessment_id = %assessment_id,
        manual = update.submission.is_manual,
        request_id = %ctx.request_id,
        actor = %ctx.actor,
        "submission score updated"
    );
    Ok(update)
}

pub fn summary(conn: &Connection, student_id: &str, subject_id: &str) -> EngineResult<GradeSummary> {
    registry::subject(conn, subject_id)?;
    find_summary(conn, student_id, subject_id)?.ok_or_else(|| {
        EngineError::not_found("grade summary", format!("{}/{}", student_id, subject_id))
    })
}

pub fn summaries_for_subject(conn: &Connection, subject_id: &str) -> EngineResult<Vec<GradeSummary>> {
    registry::subject(conn, subject_id)?;
    let mut stmt = conn.prepare(&format!(
        "{} WHERE g.subject_id = ? ORDER BY g.student_id",
        SUMMARY_SELECT
    ))?;
    let rows = stmt
        .query_map([subject_id], summary_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Components still at zero. With no summary yet, all four are incomplete.
pub fn incomplete_components(
    conn: &Connection,
    student_id: &str,
    subject_id: &str,
) -> EngineResult<Vec<Component>> {
    registry::require_student(conn, student_id)?;
    registry::subject(conn, subject_id)?;
    let Some(summary) = find_summary(conn, student_id, subject_id)? else {
        return Ok(Component::ALL.to_vec());
    };
    Ok(Component::ALL
        .into_iter()
        .filter(|c| summary.component(*c) <= 0.0)
        .collect())
}

/// Finalized -> Open, allowing manual attendance edits again.
pub fn reopen_attendance(
    conn: &Connection,
    ctx: &RequestContext,
    student_id: &str,
    subject_id: &str,
) -> EngineResult<GradeSummary> {
    let tx = db::begin_write(conn)?;
    let mut summary = find_summary(&tx, student_id, subject_id)?.ok_or_else(|| {
        EngineError::not_found("grade summary", format!("{}/{}", student_id, subject_id))
    })?;
    summary.set_attendance_state(summary.attendance_state.reopen());
    persist_summary(&tx, ctx, &mut summary, false)?;
    tx.commit()?;
    info!(student_id, subject_id, actor = %ctx.actor, "attendance reopened");
    Ok(summary)
}

/// Student-facing read: submission scores on released assessments only.
pub fn released_scores(
    conn: &Connection,
    student_id: &str,
    subject_id: &str,
) -> EngineResult<Vec<ReleasedScore>> {
    registry::require_student(conn, student_id)?;
    registry::subject(conn, subject_id)?;
    let mut stmt = conn.prepare(
        "SELECT a.id, a.assessment_type, a.title, a.total_marks, sub.score, sub.is_submitted
         FROM submissions sub
         JOIN assessments a ON a.id = sub.assessment_id
         WHERE sub.student_id = ? AND a.subject_id = ? AND a.release_state = 'released'
         ORDER BY a.assessment_type, a.title",
    )?;
    let rows = stmt
        .query_map((student_id, subject_id), |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, f64>(3)?,
                r.get::<_, f64>(4)?,
                r.get::<_, bool>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows
        .into_iter()
        .filter_map(|(id, kind, title, total_marks, score, is_submitted)| {
            Some(ReleasedScore {
                assessment_id: id,
                assessment_type: AssessmentType::parse(&kind)?,
                title,
                total_marks,
                score,
                is_submitted,
            })
        })
        .collect())
}
