//! Component weights per (academic_year, term).

use crate::calc::Component;
use crate::context::RequestContext;
use crate::db;
use crate::error::{is_unique_violation, EngineError, EngineResult, FieldError};
use crate::scale;
use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

const ATTENDANCE_RANGE: (i64, i64) = (5, 20);
const ASSIGNMENT_RANGE: (i64, i64) = (5, 20);

/// Raw percentages as submitted, before validation.
#[derive(Debug, Clone, Copy)]
pub struct PercentagesInput {
    pub attendance: i64,
    pub assignment: i64,
    pub test: i64,
    pub exam: i64,
}

/// Validated component weights. The four percentages always sum to 100 and
/// attendance/assignment sit in [5, 20].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingWeights {
    attendance_percentage: u32,
    assignment_percentage: u32,
    test_percentage: u32,
    exam_percentage: u32,
}

impl GradingWeights {
    /// Checks every rule and reports all failures together.
    pub fn new(input: PercentagesInput) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        check_range(
            &mut errors,
            "attendancePercentage",
            input.attendance,
            ATTENDANCE_RANGE,
        );
        check_range(
            &mut errors,
            "assignmentPercentage",
            input.assignment,
            ASSIGNMENT_RANGE,
        );
        check_share(&mut errors, "testPercentage", input.test);
        check_share(&mut errors, "examPercentage", input.exam);

        let sum = [input.attendance, input.assignment, input.test, input.exam]
            .into_iter()
            .try_fold(0i64, i64::checked_add);
        let Some(sum) = sum else {
            errors.push(FieldError::new("total", "percentages must sum to 100"));
            return Err(errors);
        };
        if sum < 100 {
            errors.push(FieldError::new(
                "total",
                format!("percentages must sum to 100 (remaining: {})", 100 - sum),
            ));
        } else if sum > 100 {
            errors.push(FieldError::new(
                "total",
                format!("percentages must sum to 100 (exceeds by: {})", sum - 100),
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            attendance_percentage: input.attendance as u32,
            assignment_percentage: input.assignment as u32,
            test_percentage: input.test as u32,
            exam_percentage: input.exam as u32,
        })
    }

    pub fn percentage(&self, component: Component) -> u32 {
        match component {
            Component::Attendance => self.attendance_percentage,
            Component::Assignment => self.assignment_percentage,
            Component::Test => self.test_percentage,
            Component::Exam => self.exam_percentage,
        }
    }

    /// Maximum value the component may hold.
    pub fn cap(&self, component: Component) -> f64 {
        self.percentage(component) as f64
    }
}

fn check_share(errors: &mut Vec<FieldError>, field: &str, value: i64) {
    if value < 0 {
        errors.push(FieldError::new(field, "cannot be negative"));
    } else if value > 100 {
        errors.push(FieldError::new(field, format!("cannot exceed 100 (got {})", value)));
    }
}

fn check_range(errors: &mut Vec<FieldError>, field: &str, value: i64, (min, max): (i64, i64)) {
    if value < min || value > max {
        errors.push(FieldError::new(
            field,
            format!("must be between {} and {} (got {})", min, max, value),
        ));
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingConfiguration {
    pub id: String,
    pub academic_year: String,
    pub term: i64,
    #[serde(flatten)]
    pub weights: GradingWeights,
    pub grading_scale_id: String,
}

#[derive(Debug, Clone)]
pub struct NewGradingConfig {
    pub academic_year: String,
    pub term: i64,
    pub percentages: PercentagesInput,
    pub grading_scale_id: String,
}

const CONFIG_COLUMNS: &str =
    "id, academic_year, term, attendance_pct, assignment_pct, test_pct, exam_pct, scale_id";

fn config_from_row(row: &Row<'_>) -> rusqlite::Result<GradingConfiguration> {
    Ok(GradingConfiguration {
        id: row.get(0)?,
        academic_year: row.get(1)?,
        term: row.get(2)?,
        weights: GradingWeights {
            attendance_percentage: row.get(3)?,
            assignment_percentage: row.get(4)?,
            test_percentage: row.get(5)?,
            exam_percentage: row.get(6)?,
        },
        grading_scale_id: row.get(7)?,
    })
}

fn validate(
    conn: &Connection,
    percentages: PercentagesInput,
    grading_scale_id: &str,
) -> EngineResult<GradingWeights> {
    let mut errors = Vec::new();
    let weights = match GradingWeights::new(percentages) {
        Ok(w) => Some(w),
        Err(mut e) => {
            errors.append(&mut e);
            None
        }
    };
    if !scale::exists(conn, grading_scale_id)? {
        errors.push(FieldError::new(
            "gradingScaleId",
            format!("grading scale {} does not exist", grading_scale_id),
        ));
    }
    match weights {
        Some(w) if errors.is_empty() => Ok(w),
        _ => Err(EngineError::validation(errors)),
    }
}

pub fn create(
    conn: &Connection,
    ctx: &RequestContext,
    input: NewGradingConfig,
) -> EngineResult<GradingConfiguration> {
    let weights = validate(conn, input.percentages, &input.grading_scale_id)?;
    let config = GradingConfiguration {
        id: Uuid::new_v4().to_string(),
        academic_year: input.academic_year,
        term: input.term,
        weights,
        grading_scale_id: input.grading_scale_id,
    };
    conn.execute(
        "INSERT INTO grading_configs(
           id, academic_year, term, attendance_pct, assignment_pct, test_pct, exam_pct,
           scale_id, updated_by, updated_at
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &config.id,
            &config.academic_year,
            config.term,
            weights.attendance_percentage,
            weights.assignment_percentage,
            weights.test_percentage,
            weights.exam_percentage,
            &config.grading_scale_id,
            &ctx.actor,
            db::now_ts(),
        ),
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            EngineError::conflict(format!(
                "a grading configuration already exists for {} term {}",
                config.academic_year, config.term
            ))
        } else {
            EngineError::from(e)
        }
    })?;
    info!(
        config_id = %config.id,
        academic_year = %config.academic_year,
        term = config.term,
        actor = %ctx.actor,
        "grading configuration created"
    );
    Ok(config)
}

/// Replace the weights and scale of an existing configuration. Stored scores
/// are not rescaled; the new caps apply from the next write.
pub fn update(
    conn: &Connection,
    ctx: &RequestContext,
    config_id: &str,
    percentages: PercentagesInput,
    grading_scale_id: &str,
) -> EngineResult<GradingConfiguration> {
    let weights = validate(conn, percentages, grading_scale_id)?;
    let changed = conn.execute(
        "UPDATE grading_configs
         SET attendance_pct = ?, assignment_pct = ?, test_pct = ?, exam_pct = ?,
             scale_id = ?, updated_by = ?, updated_at = ?
         WHERE id = ?",
        (
            weights.attendance_percentage,
            weights.assignment_percentage,
            weights.test_percentage,
            weights.exam_percentage,
            grading_scale_id,
            &ctx.actor,
            db::now_ts(),
            config_id,
        ),
    )?;
    if changed == 0 {
        return Err(EngineError::not_found("grading configuration", config_id));
    }
    info!(config_id, actor = %ctx.actor, "grading configuration updated");
    get(conn, config_id)
}

pub fn get(conn: &Connection, config_id: &str) -> EngineResult<GradingConfiguration> {
    conn.query_row(
        &format!("SELECT {} FROM grading_configs WHERE id = ?", CONFIG_COLUMNS),
        [config_id],
        config_from_row,
    )
    .optional()?
    .ok_or_else(|| EngineError::not_found("grading configuration", config_id))
}

pub fn for_session(
    conn: &Connection,
    academic_year: &str,
    term: i64,
) -> EngineResult<GradingConfiguration> {
    conn.query_row(
        &format!(
            "SELECT {} FROM grading_configs WHERE academic_year = ? AND term = ?",
            CONFIG_COLUMNS
        ),
        (academic_year, term),
        config_from_row,
    )
    .optional()?
    .ok_or_else(|| {
        EngineError::not_found(
            "grading configuration",
            format!("{} term {}", academic_year, term),
        )
    })
}

pub fn list(conn: &Connection) -> EngineResult<Vec<GradingConfiguration>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM grading_configs ORDER BY academic_year, term",
        CONFIG_COLUMNS
    ))?;
    let rows = stmt
        .query_map([], config_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Whether summaries still depend on this configuration is the caller's call;
/// nothing here prevents the delete.
pub fn delete(conn: &Connection, ctx: &RequestContext, config_id: &str) -> EngineResult<()> {
    let changed = conn.execute("DELETE FROM grading_configs WHERE id = ?", [config_id])?;
    if changed == 0 {
        return Err(EngineError::not_found("grading configuration", config_id));
    }
    info!(config_id, actor = %ctx.actor, "grading configuration deleted");
    Ok(())
}
