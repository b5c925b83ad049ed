use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rusqlite::Connection;

use crate::db::boards::{self, NAME_TAKEN};
use crate::db::models::{Board, BoardPatch, NewBoard};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const BOARD_NOT_FOUND: &str = "Board with this ID does not exist";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/boards", get(list_boards).post(create_board))
        .route("/boards/", get(list_boards).post(create_board))
        .route(
            "/boards/{board_id}",
            get(get_board).patch(update_board).delete(delete_board),
        )
}

/// Look up a board or fail with the not-found detail handlers share.
pub fn require_board(conn: &Connection, board_id: i64) -> AppResult<Board> {
    boards::get_board_by_id(conn, board_id)?
        .ok_or_else(|| AppError::NotFound(BOARD_NOT_FOUND.to_string()))
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Board name cannot be empty".into()));
    }
    Ok(())
}

async fn create_board(
    State(state): State<AppState>,
    Json(body): Json<NewBoard>,
) -> AppResult<(StatusCode, Json<Board>)> {
    validate_name(&body.name)?;

    let conn = state.db.get()?;
    if boards::get_board_by_name(&conn, &body.name)?.is_some() {
        return Err(AppError::Conflict(NAME_TAKEN.to_string()));
    }
    let board = boards::create_board(&conn, &body.name, body.description.as_deref())?;
    tracing::info!(board_id = board.id, name = %board.name, "created board");

    Ok((StatusCode::CREATED, Json(board)))
}

async fn get_board(
    State(state): State<AppState>,
    Path(board_id): Path<i64>,
) -> AppResult<Json<Board>> {
    let conn = state.db.get()?;
    Ok(Json(require_board(&conn, board_id)?))
}

async fn list_boards(State(state): State<AppState>) -> AppResult<Json<Vec<Board>>> {
    let conn = state.db.get()?;
    Ok(Json(boards::list_boards(&conn)?))
}

async fn update_board(
    State(state): State<AppState>,
    Path(board_id): Path<i64>,
    Json(patch): Json<BoardPatch>,
) -> AppResult<Json<Board>> {
    let conn = state.db.get()?;
    let existing = require_board(&conn, board_id)?;

    if let Some(ref name) = patch.name {
        validate_name(name)?;
        if *name != existing.name && boards::get_board_by_name(&conn, name)?.is_some() {
            return Err(AppError::Conflict(NAME_TAKEN.to_string()));
        }
    }

    let board = boards::update_board(&conn, &existing, &patch)?;
    Ok(Json(board))
}

async fn delete_board(
    State(state): State<AppState>,
    Path(board_id): Path<i64>,
) -> AppResult<StatusCode> {
    let conn = state.db.get()?;
    if !boards::delete_board(&conn, board_id)? {
        return Err(AppError::NotFound(BOARD_NOT_FOUND.to_string()));
    }
    tracing::info!(board_id, "deleted board");
    Ok(StatusCode::NO_CONTENT)
}
