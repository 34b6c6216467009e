use super::assessments::assessment_type_param;
use crate::ipc::helpers::{get_optional_str, get_required_i64, get_required_str, with_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::registry::{self, AttendanceMark, Subject};
use crate::release::{self, NewAssessment};
use chrono::NaiveDate;
use serde_json::json;

fn bool_param(params: &serde_json::Value, key: &str, default: bool) -> Result<bool, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(default),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a boolean", key))),
    }
}

fn handle_upsert_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let student_id = get_required_str(&req.params, "studentId")?;
        let display_name = get_required_str(&req.params, "displayName")?;
        let active = bool_param(&req.params, "active", true)?;
        registry::upsert_student(conn, ctx, &student_id, &display_name, active)?;
        Ok(json!({ "studentId": student_id }))
    })
}

fn handle_upsert_subject(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let subject = Subject {
            id: get_required_str(&req.params, "subjectId")?,
            name: get_required_str(&req.params, "name")?,
            academic_year: get_required_str(&req.params, "academicYear")?,
            term: get_required_i64(&req.params, "term")?,
        };
        registry::upsert_subject(conn, ctx, &subject)?;
        Ok(json!(subject))
    })
}

fn handle_enroll(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let student_id = get_required_str(&req.params, "studentId")?;
        let subject_id = get_required_str(&req.params, "subjectId")?;
        let active = bool_param(&req.params, "active", true)?;
        registry::enroll(conn, ctx, &student_id, &subject_id, active)?;
        Ok(json!({ "studentId": student_id, "subjectId": subject_id, "active": active }))
    })
}

fn handle_record_attendance(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let raw_day = get_required_str(&req.params, "schoolDay")?;
        let school_day = NaiveDate::parse_from_str(&raw_day, "%Y-%m-%d")
            .map_err(|_| HandlerErr::bad_params("schoolDay must be YYYY-MM-DD"))?;
        let mark = AttendanceMark {
            student_id: get_required_str(&req.params, "studentId")?,
            school_day,
            academic_year: get_required_str(&req.params, "academicYear")?,
            term: get_required_i64(&req.params, "term")?,
            present: bool_param(&req.params, "present", false)?,
        };
        registry::record_attendance(conn, ctx, &mark)?;
        Ok(json!({ "recorded": true }))
    })
}

fn handle_create_assessment(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let assessment_type =
            assessment_type_param(&get_required_str(&req.params, "assessmentType")?)?;
        let total_marks = req
            .params
            .get("totalMarks")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| HandlerErr::bad_params("missing or non-numeric totalMarks"))?;
        let title = get_optional_str(&req.params, "title")
            .unwrap_or_else(|| assessment_type.as_str().to_string());
        let created = release::create_assessment(
            conn,
            ctx,
            NewAssessment {
                subject_id: get_required_str(&req.params, "subjectId")?,
                assessment_type,
                title,
                total_marks,
            },
        )?;
        Ok(json!(created))
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "registry.upsertStudent" => Some(handle_upsert_student(state, req)),
        "registry.upsertSubject" => Some(handle_upsert_subject(state, req)),
        "registry.enroll" => Some(handle_enroll(state, req)),
        "registry.recordAttendance" => Some(handle_record_attendance(state, req)),
        "registry.createAssessment" => Some(handle_create_assessment(state, req)),
        _ => None,
    }
}
