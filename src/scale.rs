//! Letter-grade threshold sets.

use crate::calc::LetterGrade;
use crate::context::RequestContext;
use crate::db;
use crate::error::{is_foreign_key_violation, EngineError, EngineResult};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Minimum totals for A through D. Anything below `d_min` is an F.
///
/// Only constructible through [`Thresholds::new`], which enforces
/// `a_min > b_min > c_min > d_min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    a_min: f64,
    b_min: f64,
    c_min: f64,
    d_min: f64,
}

impl Thresholds {
    pub fn new(a_min: f64, b_min: f64, c_min: f64, d_min: f64) -> EngineResult<Self> {
        let all_finite = [a_min, b_min, c_min, d_min].iter().all(|v| v.is_finite());
        if !all_finite || !(a_min > b_min && b_min > c_min && c_min > d_min) {
            return Err(EngineError::field(
                "thresholds",
                format!(
                    "thresholds must be strictly descending (A > B > C > D), got {} / {} / {} / {}",
                    a_min, b_min, c_min, d_min
                ),
            ));
        }
        Ok(Self {
            a_min,
            b_min,
            c_min,
            d_min,
        })
    }

    /// Descending scan; each minimum is inclusive.
    pub fn letter_for(&self, total_score: f64) -> LetterGrade {
        if total_score >= self.a_min {
            LetterGrade::A
        } else if total_score >= self.b_min {
            LetterGrade::B
        } else if total_score >= self.c_min {
            LetterGrade::C
        } else if total_score >= self.d_min {
            LetterGrade::D
        } else {
            LetterGrade::F
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingScale {
    pub id: String,
    pub name: String,
    pub academic_year: Option<String>,
    pub term: Option<i64>,
    #[serde(flatten)]
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone)]
pub struct NewGradingScale {
    pub name: String,
    pub academic_year: Option<String>,
    pub term: Option<i64>,
    pub a_min: f64,
    pub b_min: f64,
    pub c_min: f64,
    pub d_min: f64,
}

const SCALE_COLUMNS: &str = "id, name, academic_year, term, a_min, b_min, c_min, d_min";

fn scale_from_row(row: &Row<'_>) -> rusqlite::Result<GradingScale> {
    Ok(GradingScale {
        id: row.get(0)?,
        name: row.get(1)?,
        academic_year: row.get(2)?,
        term: row.get(3)?,
        thresholds: Thresholds {
            a_min: row.get(4)?,
            b_min: row.get(5)?,
            c_min: row.get(6)?,
            d_min: row.get(7)?,
        },
    })
}

pub fn create(
    conn: &Connection,
    ctx: &RequestContext,
    input: NewGradingScale,
) -> EngineResult<GradingScale> {
    let thresholds = Thresholds::new(input.a_min, input.b_min, input.c_min, input.d_min)?;
    let scale = GradingScale {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        academic_year: input.academic_year,
        term: input.term,
        thresholds,
    };
    conn.execute(
        "INSERT INTO grading_scales(
           id, name, academic_year, term, a_min, b_min, c_min, d_min, created_by, created_at
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &scale.id,
            &scale.name,
            scale.academic_year.as_deref(),
            scale.term,
            thresholds.a_min,
            thresholds.b_min,
            thresholds.c_min,
            thresholds.d_min,
            &ctx.actor,
            db::now_ts(),
        ),
    )?;
    info!(scale_id = %scale.id, name = %scale.name, actor = %ctx.actor, "grading scale created");
    Ok(scale)
}

pub fn get(conn: &Connection, scale_id: &str) -> EngineResult<GradingScale> {
    let found = conn
        .query_row(
            &format!("SELECT {} FROM grading_scales WHERE id = ?", SCALE_COLUMNS),
            [scale_id],
            scale_from_row,
        )
        .optional()?;
    found.ok_or_else(|| EngineError::not_found("grading scale", scale_id))
}

pub fn exists(conn: &Connection, scale_id: &str) -> EngineResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM grading_scales WHERE id = ?", [scale_id], |r| {
            r.get::<_, i64>(0)
        })
        .optional()?;
    Ok(found.is_some())
}

pub fn list(conn: &Connection) -> EngineResult<Vec<GradingScale>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM grading_scales ORDER BY academic_year, term, name",
        SCALE_COLUMNS
    ))?;
    let rows = stmt
        .query_map([], scale_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn delete(conn: &Connection, ctx: &RequestContext, scale_id: &str) -> EngineResult<()> {
    let changed = conn
        .execute("DELETE FROM grading_scales WHERE id = ?", [scale_id])
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                EngineError::conflict("grading scale is referenced by a grading configuration")
            } else {
                EngineError::from(e)
            }
        })?;
    if changed == 0 {
        return Err(EngineError::not_found("grading scale", scale_id));
    }
    info!(scale_id, actor = %ctx.actor, "grading scale deleted");
    Ok(())
}
