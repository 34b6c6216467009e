use crate::calc::Component;
use crate::error::EngineError;
use crate::ipc::helpers::{get_optional_str, get_required_str, with_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::release::{self, AssessmentType, UnlockFilter};
use serde_json::json;

pub(super) fn assessment_type_param(raw: &str) -> Result<AssessmentType, HandlerErr> {
    AssessmentType::parse(raw).ok_or_else(|| {
        EngineError::field(
            "assessmentType",
            format!("unknown assessment type {raw}; expected first_test, second_test, mid_term or final_exam"),
        )
        .into()
    })
}

/// `assessmentType` names one type, or `test`/`exam` for every type feeding
/// that component.
enum TypeFilter {
    Exact(AssessmentType),
    Component(Component),
}

fn type_filter_param(raw: &str) -> Result<TypeFilter, HandlerErr> {
    if let Some(t) = AssessmentType::parse(raw) {
        return Ok(TypeFilter::Exact(t));
    }
    match Component::parse(raw) {
        Some(c @ (Component::Test | Component::Exam)) => Ok(TypeFilter::Component(c)),
        _ => Err(EngineError::field(
            "assessmentType",
            format!(
                "unknown assessment type {raw}; expected first_test, second_test, mid_term, final_exam, test or exam"
            ),
        )
        .into()),
    }
}

fn unlock_filter(params: &serde_json::Value) -> Result<UnlockFilter, HandlerErr> {
    let type_filter = get_optional_str(params, "assessmentType")
        .map(|raw| type_filter_param(&raw))
        .transpose()?;
    let mut component = get_optional_str(params, "component")
        .map(|raw| {
            Component::parse(&raw).ok_or_else(|| {
                HandlerErr::from(EngineError::field(
                    "component",
                    format!("unknown component {raw}"),
                ))
            })
        })
        .transpose()?;
    let assessment_type = match type_filter {
        None => None,
        Some(TypeFilter::Exact(t)) => Some(t),
        Some(TypeFilter::Component(c)) => {
            if component.is_some_and(|given| given != c) {
                return Err(EngineError::field(
                    "component",
                    format!("conflicts with assessmentType {}", c),
                )
                .into());
            }
            component = Some(c);
            None
        }
    };
    let term = match params.get("term") {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => Some(
            v.as_i64()
                .ok_or_else(|| HandlerErr::bad_params("term must be an integer"))?,
        ),
    };
    Ok(UnlockFilter {
        assessment_type,
        component,
        academic_year: get_optional_str(params, "academicYear"),
        term,
        subject_id: get_optional_str(params, "subjectId"),
    })
}

fn handle_toggle_release(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let assessment_id = get_required_str(&req.params, "assessmentId")?;
        let assessment = release::toggle_release(conn, ctx, &assessment_id)?;
        Ok(json!({
            "assessment": assessment,
            "isReleased": assessment.is_released,
        }))
    })
}

fn handle_unlock_all(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let filter = unlock_filter(&req.params)?;
        Ok(json!(release::unlock_all(conn, ctx, &filter)?))
    })
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, _| {
        let assessment_id = get_required_str(&req.params, "assessmentId")?;
        Ok(json!(release::get(conn, &assessment_id)?))
    })
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, _| {
        let subject_id = get_required_str(&req.params, "subjectId")?;
        let assessments = release::list_for_subject(conn, &subject_id)?;
        Ok(json!({ "assessments": assessments }))
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assessments.toggleRelease" => Some(handle_toggle_release(state, req)),
        "assessments.unlockAll" => Some(handle_unlock_all(state, req)),
        "assessments.get" => Some(handle_get(state, req)),
        "assessments.list" => Some(handle_list(state, req)),
        _ => None,
    }
}
