use std::path::Path as FsPath;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::db::jobs;
use crate::db::models::ImportJob;
use crate::error::{AppError, AppResult};
use crate::import::job::{self, ImportTask};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadAccepted {
    pub message: &'static str,
    pub job_id: String,
}

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    let upload = post(upload_file).layer(DefaultBodyLimit::max(max_upload_bytes));
    Router::new()
        .route("/uploadfile", upload.clone())
        .route("/uploadfile/", upload)
        .route("/imports/{job_id}", get(get_import))
}

fn bad_multipart(e: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid upload: {}", e.body_text()))
}

/// Accept a score sheet and import it in the background. The response only
/// acknowledges receipt; progress is at `/imports/{job_id}`.
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadAccepted>> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() == Some("file") {
            let filename = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(bad_multipart)?;
            upload = Some((filename, bytes));
            break;
        }
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("Missing file field".into()))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }

    let job = {
        let conn = state.db.get()?;
        jobs::create_job(&conn, filename.as_deref())?
    };
    tracing::info!(job_id = %job.id, filename = ?job.filename, size = bytes.len(), "upload accepted");

    job::spawn(
        state.db.clone(),
        ImportTask {
            job_id: job.id.clone(),
            bytes,
            dump_path: state.config.dump_path().map(FsPath::to_path_buf),
        },
    );

    Ok(Json(UploadAccepted {
        message: "File received. Processing in background.",
        job_id: job.id,
    }))
}

async fn get_import(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<ImportJob>> {
    let conn = state.db.get()?;
    jobs::get_job(&conn, &job_id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Import job does not exist".into()))
}
