use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{ImportJob, JobStatus};
use super::StoreResult;

/// Register a new import job in `pending` state and return it.
pub fn create_job(conn: &Connection, filename: Option<&str>) -> StoreResult<ImportJob> {
    let job = ImportJob {
        id: uuid::Uuid::now_v7().to_string(),
        filename: filename.map(str::to_string),
        status: JobStatus::Pending,
        report_id: None,
        player_stats: None,
        skipped_rows: None,
        error: None,
        created_at: Utc::now(),
        finished_at: None,
    };

    conn.execute(
        "INSERT INTO import_jobs (id, filename, status, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![job.id, job.filename, job.status.as_str(), job.created_at],
    )?;

    Ok(job)
}

pub fn mark_running(conn: &Connection, id: &str) -> StoreResult<()> {
    conn.execute(
        "UPDATE import_jobs SET status = ?1 WHERE id = ?2",
        params![JobStatus::Running.as_str(), id],
    )?;
    Ok(())
}

pub fn mark_succeeded(
    conn: &Connection,
    id: &str,
    report_id: i64,
    player_stats: usize,
    skipped_rows: usize,
) -> StoreResult<()> {
    conn.execute(
        "UPDATE import_jobs
         SET status = ?1, report_id = ?2, player_stats = ?3, skipped_rows = ?4, finished_at = ?5
         WHERE id = ?6",
        params![
            JobStatus::Succeeded.as_str(),
            report_id,
            player_stats as i64,
            skipped_rows as i64,
            Utc::now(),
            id
        ],
    )?;
    Ok(())
}

/// `report_id` is whatever the import managed to commit before failing.
pub fn mark_failed(
    conn: &Connection,
    id: &str,
    report_id: Option<i64>,
    error: &str,
) -> StoreResult<()> {
    conn.execute(
        "UPDATE import_jobs SET status = ?1, report_id = ?2, error = ?3, finished_at = ?4
         WHERE id = ?5",
        params![JobStatus::Failed.as_str(), report_id, error, Utc::now(), id],
    )?;
    Ok(())
}

pub fn get_job(conn: &Connection, id: &str) -> StoreResult<Option<ImportJob>> {
    let job = conn
        .query_row(
            "SELECT id, filename, status, report_id, player_stats, skipped_rows, error,
                    created_at, finished_at
             FROM import_jobs WHERE id = ?1",
            params![id],
            |row| {
                let status: String = row.get(2)?;
                let status = JobStatus::parse(&status).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        format!("unknown job status {status:?}").into(),
                    )
                })?;
                Ok(ImportJob {
                    id: row.get(0)?,
                    filename: row.get(1)?,
                    status,
                    report_id: row.get(3)?,
                    player_stats: row.get(4)?,
                    skipped_rows: row.get(5)?,
                    error: row.get(6)?,
                    created_at: row.get(7)?,
                    finished_at: row.get(8)?,
                })
            },
        )
        .optional()?;
    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::migrated_pool;

    #[test]
    fn job_lifecycle_success() {
        let (pool, _tmp) = migrated_pool();
        let conn = pool.get().unwrap();

        let job = create_job(&conn, Some("game.xlsx")).unwrap();
        let loaded = get_job(&conn, &job.id).unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::Pending);
        assert_eq!(loaded.filename.as_deref(), Some("game.xlsx"));

        mark_running(&conn, &job.id).unwrap();
        assert_eq!(
            get_job(&conn, &job.id).unwrap().unwrap().status,
            JobStatus::Running
        );

        mark_succeeded(&conn, &job.id, 3, 21, 3).unwrap();
        let done = get_job(&conn, &job.id).unwrap().unwrap();
        assert_eq!(done.status, JobStatus::Succeeded);
        assert_eq!(done.report_id, Some(3));
        assert_eq!(done.player_stats, Some(21));
        assert_eq!(done.skipped_rows, Some(3));
        assert!(done.finished_at.is_some());
        assert!(done.error.is_none());
    }

    #[test]
    fn job_lifecycle_failure() {
        let (pool, _tmp) = migrated_pool();
        let conn = pool.get().unwrap();

        let job = create_job(&conn, None).unwrap();
        mark_failed(&conn, &job.id, None, "workbook has no sheets").unwrap();

        let failed = get_job(&conn, &job.id).unwrap().unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("workbook has no sheets"));
        assert!(failed.report_id.is_none());
    }

    #[test]
    fn unknown_job_is_none() {
        let (pool, _tmp) = migrated_pool();
        let conn = pool.get().unwrap();
        assert!(get_job(&conn, "does-not-exist").unwrap().is_none());
    }
}
