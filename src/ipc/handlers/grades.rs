use crate::calc::Component;
use crate::error::EngineError;
use crate::ipc::helpers::{get_optional_str, get_required_str, with_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::ledger::{self, ScoreSource, SubmissionTarget};
use serde_json::json;

fn component_param(params: &serde_json::Value) -> Result<Component, HandlerErr> {
    let raw = get_required_str(params, "component")?;
    Component::parse(&raw).ok_or_else(|| {
        EngineError::field(
            "component",
            format!("unknown component {raw}; expected attendance, assignment, test or exam"),
        )
        .into()
    })
}

fn number_param(params: &serde_json::Value, key: &str) -> Result<f64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing or non-numeric {}", key)))
}

fn pair_params(params: &serde_json::Value) -> Result<(String, String), HandlerErr> {
    Ok((
        get_required_str(params, "studentId")?,
        get_required_str(params, "subjectId")?,
    ))
}

fn handle_update_component(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let (student_id, subject_id) = pair_params(&req.params)?;
        let component = component_param(&req.params)?;
        let value = number_param(&req.params, "value")?;
        let source = match get_optional_str(&req.params, "assessmentId") {
            Some(assessment_id) => ScoreSource::OnlineSubmission(assessment_id),
            None => ScoreSource::Manual,
        };
        let update = ledger::set_component(
            conn,
            ctx,
            &student_id,
            &subject_id,
            component,
            value,
            source,
        )?;
        Ok(json!(update))
    })
}

fn handle_update_submission_score(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let target = match get_optional_str(&req.params, "submissionId") {
            Some(id) => SubmissionTarget::Id(id),
            None => SubmissionTarget::Pair {
                student_id: get_required_str(&req.params, "studentId")?,
                assessment_id: get_required_str(&req.params, "assessmentId")?,
            },
        };
        let score = number_param(&req.params, "score")?;
        let is_manual = req.params.get("isManual").and_then(|v| v.as_bool());
        let update = ledger::update_submission_score(conn, ctx, target, score, is_manual)?;
        Ok(json!(update))
    })
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, _| {
        let (student_id, subject_id) = pair_params(&req.params)?;
        Ok(json!(ledger::summary(conn, &student_id, &subject_id)?))
    })
}

fn handle_list_for_subject(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, _| {
        let subject_id = get_required_str(&req.params, "subjectId")?;
        let summaries = ledger::summaries_for_subject(conn, &subject_id)?;
        Ok(json!({ "summaries": summaries }))
    })
}

fn handle_incomplete_components(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, _| {
        let (student_id, subject_id) = pair_params(&req.params)?;
        let components = ledger::incomplete_components(conn, &student_id, &subject_id)?;
        Ok(json!({ "components": components }))
    })
}

fn handle_reopen_attendance(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let (student_id, subject_id) = pair_params(&req.params)?;
        Ok(json!(ledger::reopen_attendance(conn, ctx, &student_id, &subject_id)?))
    })
}

fn handle_released_scores(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, _| {
        let (student_id, subject_id) = pair_params(&req.params)?;
        let scores = ledger::released_scores(conn, &student_id, &subject_id)?;
        Ok(json!({ "scores": scores }))
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.updateComponent" => Some(handle_update_component(state, req)),
        "grades.get" => Some(handle_get(state, req)),
        "grades.listForSubject" => Some(handle_list_for_subject(state, req)),
        "grades.incompleteComponents" => Some(handle_incomplete_components(state, req)),
        "grades.reopenAttendance" => Some(handle_reopen_attendance(state, req)),
        "grades.releasedScores" => Some(handle_released_scores(state, req)),
        "submissions.updateScore" => Some(handle_update_submission_score(state, req)),
        _ => None,
    }
}
