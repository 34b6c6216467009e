use crate::attendance_sync;
use crate::ipc::helpers::{get_required_i64, get_required_str, with_db};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_attendance_sync(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_db(state, req, |conn, ctx| {
        let academic_year = get_required_str(&req.params, "academicYear")?;
        let term = get_required_i64(&req.params, "term")?;
        Ok(json!(attendance_sync::sync(conn, ctx, &academic_year, term)?))
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.sync" => Some(handle_attendance_sync(state, req)),
        _ => None,
    }
}
