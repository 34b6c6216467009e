//! Assessment release gate.
//!
//! Each assessment is either `Locked` (the initial state) or `Released`, and
//! only released assessments may have their scores shown to students. The
//! gate never touches scores.

use crate::calc::Component;
use crate::context::RequestContext;
use crate::db;
use crate::error::{EngineError, EngineResult};
use crate::registry;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    FirstTest,
    SecondTest,
    MidTerm,
    FinalExam,
}

impl AssessmentType {
    pub const ALL: [AssessmentType; 4] = [
        AssessmentType::FirstTest,
        AssessmentType::SecondTest,
        AssessmentType::MidTerm,
        AssessmentType::FinalExam,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_test" => Some(Self::FirstTest),
            "second_test" => Some(Self::SecondTest),
            "mid_term" | "midterm" => Some(Self::MidTerm),
            "final_exam" => Some(Self::FinalExam),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstTest => "first_test",
            Self::SecondTest => "second_test",
            Self::MidTerm => "mid_term",
            Self::FinalExam => "final_exam",
        }
    }

    /// Grade component this assessment's scores feed.
    pub fn component(self) -> Component {
        match self {
            Self::FirstTest | Self::SecondTest | Self::MidTerm => Component::Test,
            Self::FinalExam => Component::Exam,
        }
    }

    pub fn feeding(component: Component) -> Vec<AssessmentType> {
        Self::ALL
            .into_iter()
            .filter(|t| t.component() == component)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseState {
    Locked,
    Released,
}

impl ReleaseState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Locked => Self::Released,
            Self::Released => Self::Locked,
        }
    }

    /// Locked -> Released; releasing a released assessment is a no-op.
    pub fn release(self) -> Self {
        Self::Released
    }

    pub fn is_released(self) -> bool {
        self == Self::Released
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Released => "released",
        }
    }

    fn from_column(s: &str) -> Self {
        if s == "released" {
            Self::Released
        } else {
            Self::Locked
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub subject_id: String,
    pub assessment_type: AssessmentType,
    pub title: String,
    pub total_marks: f64,
    pub state: ReleaseState,
    pub is_released: bool,
}

#[derive(Debug, Clone)]
pub struct NewAssessment {
    pub subject_id: String,
    pub assessment_type: AssessmentType,
    pub title: String,
    pub total_marks: f64,
}

/// Conjunction of optional criteria; an empty filter matches every assessment.
#[derive(Debug, Clone, Default)]
pub struct UnlockFilter {
    pub assessment_type: Option<AssessmentType>,
    pub component: Option<Component>,
    pub academic_year: Option<String>,
    pub term: Option<i64>,
    pub subject_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockReport {
    pub unlocked_count: usize,
    pub failed_count: usize,
    pub message: String,
}

const ASSESSMENT_COLUMNS: &str =
    "a.id, a.subject_id, a.assessment_type, a.title, a.total_marks, a.release_state";

fn assessment_from_row(row: &Row<'_>) -> rusqlite::Result<Assessment> {
    let raw_type: String = row.get(2)?;
    let assessment_type = AssessmentType::parse(&raw_type).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown assessment type {raw_type}").into(),
        )
    })?;
    let state = ReleaseState::from_column(&row.get::<_, String>(5)?);
    Ok(Assessment {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        assessment_type,
        title: row.get(3)?,
        total_marks: row.get(4)?,
        state,
        is_released: state.is_released(),
    })
}

/// Feed an authored assessment in. New assessments start locked.
pub fn create_assessment(
    conn: &Connection,
    ctx: &RequestContext,
    input: NewAssessment,
) -> EngineResult<Assessment> {
    if !(input.total_marks.is_finite() && input.total_marks > 0.0) {
        return Err(EngineError::field("totalMarks", "must be greater than 0"));
    }
    registry::subject(conn, &input.subject_id)?;
    let assessment = Assessment {
        id: Uuid::new_v4().to_string(),
        subject_id: input.subject_id,
        assessment_type: input.assessment_type,
        title: input.title,
        total_marks: input.total_marks,
        state: ReleaseState::Locked,
        is_released: false,
    };
    conn.execute(
        "INSERT INTO assessments(
           id, subject_id, assessment_type, title, total_marks, release_state, updated_by, updated_at
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &assessment.id,
            &assessment.subject_id,
            assessment.assessment_type.as_str(),
            &assessment.title,
            assessment.total_marks,
            assessment.state.as_str(),
            &ctx.actor,
            db::now_ts(),
        ),
    )?;
    info!(
        assessment_id = %assessment.id,
        subject_id = %assessment.subject_id,
        kind = assessment.assessment_type.as_str(),
        "assessment created"
    );
    Ok(assessment)
}

pub fn get(conn: &Connection, assessment_id: &str) -> EngineResult<Assessment> {
    conn.query_row(
        &format!("SELECT {} FROM assessments a WHERE a.id = ?", ASSESSMENT_COLUMNS),
        [assessment_id],
        assessment_from_row,
    )
    .optional()?
    .ok_or_else(|| EngineError::not_found("assessment", assessment_id))
}

pub fn list_for_subject(conn: &Connection, subject_id: &str) -> EngineResult<Vec<Assessment>> {
    registry::subject(conn, subject_id)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM assessments a WHERE a.subject_id = ? ORDER BY a.assessment_type, a.title",
        ASSESSMENT_COLUMNS
    ))?;
    let rows = stmt
        .query_map([subject_id], assessment_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Flip Locked <-> Released. Two calls restore the original state.
pub fn toggle_release(
    conn: &Connection,
    ctx: &RequestContext,
    assessment_id: &str,
) -> EngineResult<Assessment> {
    let tx = db::begin_write(conn)?;
    let mut assessment = get(&tx, assessment_id)?;
    let next = assessment.state.toggled();
    tx.execute(
        "UPDATE assessments SET release_state = ?, updated_by = ?, updated_at = ? WHERE id = ?",
        (next.as_str(), &ctx.actor, db::now_ts(), assessment_id),
    )?;
    tx.commit()?;

    assessment.state = next;
    assessment.is_released = next.is_released();
    info!(
        assessment_id,
        released = assessment.is_released,
        actor = %ctx.actor,
        "assessment release toggled"
    );
    Ok(assessment)
}

fn locked_matching(conn: &Connection, filter: &UnlockFilter) -> EngineResult<Vec<String>> {
    let mut sql = String::from(
        "SELECT a.id FROM assessments a
         JOIN subjects s ON s.id = a.subject_id
         WHERE a.release_state = 'locked'",
    );
    let mut binds: Vec<Value> = Vec::new();

    if let Some(t) = filter.assessment_type {
        sql.push_str(" AND a.assessment_type = ?");
        binds.push(Value::Text(t.as_str().to_string()));
    }
    if let Some(component) = filter.component {
        let types = AssessmentType::feeding(component);
        if types.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; types.len()].join(",");
        sql.push_str(&format!(" AND a.assessment_type IN ({})", placeholders));
        for t in types {
            binds.push(Value::Text(t.as_str().to_string()));
        }
    }
    if let Some(year) = &filter.academic_year {
        sql.push_str(" AND s.academic_year = ?");
        binds.push(Value::Text(year.clone()));
    }
    if let Some(term) = filter.term {
        sql.push_str(" AND s.term = ?");
        binds.push(Value::Integer(term));
    }
    if let Some(subject_id) = &filter.subject_id {
        sql.push_str(" AND a.subject_id = ?");
        binds.push(Value::Text(subject_id.clone()));
    }
    sql.push_str(" ORDER BY a.id");

    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map(params_from_iter(binds), |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

fn release_one(conn: &Connection, ctx: &RequestContext, assessment_id: &str) -> EngineResult<bool> {
    let tx = db::begin_write(conn)?;
    let changed = tx.execute(
        "UPDATE assessments SET release_state = ?, updated_by = ?, updated_at = ?
         WHERE id = ? AND release_state = ?",
        (
            ReleaseState::Locked.release().as_str(),
            &ctx.actor,
            db::now_ts(),
            assessment_id,
            ReleaseState::Locked.as_str(),
        ),
    )?;
    tx.commit()?;
    Ok(changed == 1)
}

/// Release every locked assessment matching `filter`, one transaction per
/// assessment. Already-released assessments are neither touched nor counted,
/// so repeating the call reports zero.
pub fn unlock_all(
    conn: &Connection,
    ctx: &RequestContext,
    filter: &UnlockFilter,
) -> EngineResult<UnlockReport> {
    let candidates = locked_matching(conn, filter)?;
    let mut unlocked_count = 0;
    let mut failed_count = 0;

    for assessment_id in &candidates {
        match release_one(conn, ctx, assessment_id) {
            Ok(true) => unlocked_count += 1,
            // Released by someone else between the scan and the update.
            Ok(false) => {}
            Err(e) => {
                failed_count += 1;
                warn!(assessment_id = %assessment_id, error = %e, "failed to release assessment");
            }
        }
    }

    let message = if failed_count == 0 {
        format!("{} assessment(s) unlocked", unlocked_count)
    } else {
        format!(
            "{} assessment(s) unlocked, {} failed",
            unlocked_count, failed_count
        )
    };
    info!(
        unlocked = unlocked_count,
        failed = failed_count,
        actor = %ctx.actor,
        "unlock sweep finished"
    );
    Ok(UnlockReport {
        unlocked_count,
        failed_count,
        message,
    })
}
