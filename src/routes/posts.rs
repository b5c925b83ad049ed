use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rusqlite::Connection;
use serde::Deserialize;

use crate::db::models::{NewPost, Post, PostPatch};
use crate::db::posts;
use crate::error::{AppError, AppResult};
use crate::routes::boards::require_board;
use crate::state::AppState;

const POST_NOT_FOUND: &str = "Post with this ID does not exist";

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    10
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/boards/{board_id}/posts",
            get(list_posts).post(create_post),
        )
        .route(
            "/boards/{board_id}/posts/",
            get(list_posts).post(create_post),
        )
        .route(
            "/boards/{board_id}/posts/{post_id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
}

/// The board is checked first so a missing board and a missing post answer
/// with different details.
fn require_post(conn: &Connection, board_id: i64, post_id: i64) -> AppResult<Post> {
    require_board(conn, board_id)?;
    posts::get_post(conn, board_id, post_id)?
        .ok_or_else(|| AppError::NotFound(POST_NOT_FOUND.to_string()))
}

async fn create_post(
    State(state): State<AppState>,
    Path(board_id): Path<i64>,
    Json(body): Json<NewPost>,
) -> AppResult<(StatusCode, Json<Post>)> {
    let conn = state.db.get()?;
    require_board(&conn, board_id)?;

    let post = posts::create_post(&conn, board_id, &body)?;
    tracing::info!(board_id, post_id = post.id, "created post");
    Ok((StatusCode::CREATED, Json(post)))
}

async fn get_post(
    State(state): State<AppState>,
    Path((board_id, post_id)): Path<(i64, i64)>,
) -> AppResult<Json<Post>> {
    let conn = state.db.get()?;
    Ok(Json(require_post(&conn, board_id, post_id)?))
}

async fn list_posts(
    State(state): State<AppState>,
    Path(board_id): Path<i64>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<Post>>> {
    let conn = state.db.get()?;
    require_board(&conn, board_id)?;

    let posts = posts::list_posts(&conn, board_id, page.offset, page.limit)?;
    if posts.is_empty() {
        return Err(AppError::NotFound("No posts found".into()));
    }
    Ok(Json(posts))
}

async fn update_post(
    State(state): State<AppState>,
    Path((board_id, post_id)): Path<(i64, i64)>,
    Json(patch): Json<PostPatch>,
) -> AppResult<Json<Post>> {
    let conn = state.db.get()?;
    let existing = require_post(&conn, board_id, post_id)?;
    Ok(Json(posts::update_post(&conn, &existing, &patch)?))
}

async fn delete_post(
    State(state): State<AppState>,
    Path((board_id, post_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    let conn = state.db.get()?;
    let post = require_post(&conn, board_id, post_id)?;
    posts::delete_post(&conn, &post)?;
    tracing::info!(board_id, post_id, "deleted post");
    Ok(StatusCode::NO_CONTENT)
}
