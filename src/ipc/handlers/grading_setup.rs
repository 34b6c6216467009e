use crate::grading_config::{self, NewGradingConfig, PercentagesInput};
use crate::ipc::helpers::{get_required_i64, get_required_str, parse_params, with_db};
use crate::ipc::types::{AppState, Request};
use crate::scale::{self, NewGradingScale};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScaleParams {
    name: String,
    #[serde(default)]
    academic_year: Option<String>,
    #[serde(default)]
    term: Option<i64>,
    a_min: f64,
    b_min: f64,
    c_min: f64,
    d_min: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PercentageParams {
    attendance_percentage: i64,
    assignment_percentage: i64,
    test_percentage: i64,
    exam_percentage: i64,
    grading_scale_id: String,
}

impl PercentageParams {
    fn percentages(&self) -> PercentagesInput {
        PercentagesInput {
            attendance: self.attendance_percentage,
            assignment: self.assignment_percentage,
            test: self.test_percentage,
            exam: self.exam_percentage,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigParams {
    academic_year: String,
    term: i64,
    #[serde(flatten)]
    weights: PercentageParams,
}

fn handle_scales_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let p: ScaleParams = parse_params(&req.params)?;
        let created = scale::create(
            conn,
            ctx,
            NewGradingScale {
                name: p.name,
                academic_year: p.academic_year,
                term: p.term,
                a_min: p.a_min,
                b_min: p.b_min,
                c_min: p.c_min,
                d_min: p.d_min,
            },
        )?;
        Ok(json!(created))
    })
}

fn handle_scales_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, _| {
        let scale_id = get_required_str(&req.params, "scaleId")?;
        Ok(json!(scale::get(conn, &scale_id)?))
    })
}

fn handle_scales_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, _| {
        Ok(json!({ "scales": scale::list(conn)? }))
    })
}

fn handle_scales_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let scale_id = get_required_str(&req.params, "scaleId")?;
        scale::delete(conn, ctx, &scale_id)?;
        Ok(json!({ "deleted": true }))
    })
}

fn handle_configs_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let p: ConfigParams = parse_params(&req.params)?;
        let created = grading_config::create(
            conn,
            ctx,
            NewGradingConfig {
                academic_year: p.academic_year,
                term: p.term,
                percentages: p.weights.percentages(),
                grading_scale_id: p.weights.grading_scale_id,
            },
        )?;
        Ok(json!(created))
    })
}

fn handle_configs_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let config_id = get_required_str(&req.params, "configId")?;
        let p: PercentageParams = parse_params(&req.params)?;
        let updated = grading_config::update(
            conn,
            ctx,
            &config_id,
            p.percentages(),
            &p.grading_scale_id,
        )?;
        Ok(json!(updated))
    })
}

fn handle_configs_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, _| {
        let config_id = get_required_str(&req.params, "configId")?;
        Ok(json!(grading_config::get(conn, &config_id)?))
    })
}

fn handle_configs_for_session(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, _| {
        let academic_year = get_required_str(&req.params, "academicYear")?;
        let term = get_required_i64(&req.params, "term")?;
        Ok(json!(grading_config::for_session(conn, &academic_year, term)?))
    })
}

fn handle_configs_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, _| {
        Ok(json!({ "configs": grading_config::list(conn)? }))
    })
}

fn handle_configs_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let config_id = get_required_str(&req.params, "configId")?;
        grading_config::delete(conn, ctx, &config_id)?;
        Ok(json!({ "deleted": true }))
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "scales.create" => Some(handle_scales_create(state, req)),
        "scales.get" => Some(handle_scales_get(state, req)),
        "scales.list" => Some(handle_scales_list(state, req)),
        "scales.delete" => Some(handle_scales_delete(state, req)),
        "configs.create" => Some(handle_configs_create(state, req)),
        "configs.update" => Some(handle_configs_update(state, req)),
        "configs.get" => Some(handle_configs_get(state, req)),
        "configs.forSession" => Some(handle_configs_for_session(state, req)),
        "configs.list" => Some(handle_configs_list(state, req)),
        "configs.delete" => Some(handle_configs_delete(state, req)),
        _ => None,
    }
}
