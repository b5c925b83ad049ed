use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Greeting {
    pub message: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

pub async fn index() -> Json<Greeting> {
    Json(Greeting {
        message: "Hello World",
    })
}
