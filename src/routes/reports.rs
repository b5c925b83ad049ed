use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::{Report, ReportDetail};
use crate::db::reports;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

const REPORT_NOT_FOUND: &str = "Report with this ID does not exist";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports))
        .route("/reports/", get(list_reports))
        .route("/reports/{report_id}", get(get_report).delete(delete_report))
}

async fn list_reports(State(state): State<AppState>) -> AppResult<Json<Vec<Report>>> {
    let conn = state.db.get()?;
    Ok(Json(reports::list_reports(&conn)?))
}

async fn get_report(
    State(state): State<AppState>,
    Path(report_id): Path<i64>,
) -> AppResult<Json<ReportDetail>> {
    let conn = state.db.get()?;
    reports::get_report(&conn, report_id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(REPORT_NOT_FOUND.to_string()))
}

async fn delete_report(
    State(state): State<AppState>,
    Path(report_id): Path<i64>,
) -> AppResult<StatusCode> {
    let conn = state.db.get()?;
    if !reports::delete_report(&conn, report_id)? {
        return Err(AppError::NotFound(REPORT_NOT_FOUND.to_string()));
    }
    tracing::info!(report_id, "deleted report");
    Ok(StatusCode::NO_CONTENT)
}
