//! Background execution of uploaded score sheets.
//!
//! The upload handler records a job and hands the bytes over; the import
//! runs on the blocking pool after the response has gone out. The outcome
//! is only visible through the job record and the log.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use super::sheet::Sheet;
use super::{ImportError, Importer};
use crate::db::jobs;
use crate::state::DbPool;

/// Everything a detached import needs.
pub struct ImportTask {
    pub job_id: String,
    pub bytes: Bytes,
    pub dump_path: Option<PathBuf>,
}

/// Fire and forget. Nothing awaits the returned handle.
pub fn spawn(pool: DbPool, task: ImportTask) {
    tokio::task::spawn_blocking(move || {
        if let Err(e) = run(&pool, &task.job_id, &task.bytes, task.dump_path.as_deref()) {
            tracing::error!(job_id = %task.job_id, "import job could not be recorded: {}", e);
        }
    });
}

/// Run one import to completion and record its outcome. The error return is
/// reserved for failures to update the job record itself.
pub fn run(
    pool: &DbPool,
    job_id: &str,
    bytes: &[u8],
    dump_path: Option<&Path>,
) -> Result<(), ImportError> {
    let conn = pool.get()?;
    jobs::mark_running(&conn, job_id)?;
    tracing::info!(job_id, size = bytes.len(), "import started");

    let mut importer = Importer::new(&conn);
    let outcome = Sheet::from_bytes(bytes).and_then(|sheet| {
        let report_id = importer.import(&sheet)?;
        if let Some(path) = dump_path {
            sheet.write_dump(path)?;
        }
        Ok(report_id)
    });
    let summary = importer.into_summary();

    match outcome {
        Ok(report_id) => {
            jobs::mark_succeeded(
                &conn,
                job_id,
                report_id,
                summary.player_stats,
                summary.skipped_rows,
            )?;
            tracing::info!(
                job_id,
                report_id,
                player_stats = summary.player_stats,
                skipped_rows = summary.skipped_rows,
                "import finished"
            );
        }
        Err(e) => {
            tracing::error!(job_id, report_id = ?summary.report_id, "import failed: {}", e);
            jobs::mark_failed(&conn, job_id, summary.report_id, &e.to_string())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::JobStatus;
    use crate::db::testing::migrated_pool;
    use crate::import::fixtures::match_rows;
    use crate::import::sheet::Cell;
    use rust_xlsxwriter::Workbook;

    fn xlsx(rows: &[Vec<Cell>]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "KBL score sheet").unwrap();
        for (index, row) in rows.iter().enumerate() {
            let sheet_row = index as u32 + 1;
            for (column, cell) in row.iter().enumerate() {
                let column = column as u16;
                match cell {
                    Cell::Float(f) => {
                        worksheet.write_number(sheet_row, column, *f).unwrap();
                    }
                    Cell::Int(n) => {
                        worksheet.write_number(sheet_row, column, *n as f64).unwrap();
                    }
                    Cell::Text(s) => {
                        worksheet.write_string(sheet_row, column, s).unwrap();
                    }
                    Cell::Bool(_) | Cell::Empty => {}
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn successful_run_records_report_and_dump() {
        let (pool, tmp) = migrated_pool();
        let dump = tmp.path().join("log.txt");
        let job = jobs::create_job(&pool.get().unwrap(), Some("game.xlsx")).unwrap();

        run(&pool, &job.id, &xlsx(&match_rows(10)), Some(&dump)).unwrap();

        let conn = pool.get().unwrap();
        let done = jobs::get_job(&conn, &job.id).unwrap().unwrap();
        assert_eq!(done.status, JobStatus::Succeeded);
        assert_eq!(done.player_stats, Some(22));
        assert_eq!(done.skipped_rows, Some(2));

        let report_id = done.report_id.unwrap();
        let detail = crate::db::reports::get_report(&conn, report_id)
            .unwrap()
            .unwrap();
        assert_eq!(detail.team_results.len(), 2);

        let dumped: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&dump).unwrap()).unwrap();
        assert_eq!(dumped.as_array().unwrap().len(), 36);
        assert_eq!(dumped[2]["Unnamed: 3"], "Hawks");
    }

    #[test]
    fn unreadable_upload_marks_job_failed() {
        let (pool, tmp) = migrated_pool();
        let dump = tmp.path().join("log.txt");
        let job = jobs::create_job(&pool.get().unwrap(), None).unwrap();

        run(&pool, &job.id, b"not a workbook", Some(&dump)).unwrap();

        let failed = jobs::get_job(&pool.get().unwrap(), &job.id)
            .unwrap()
            .unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert!(failed.error.unwrap().contains("could not read workbook"));
        assert!(failed.report_id.is_none());
        assert!(!dump.exists());
    }

    #[test]
    fn failure_mid_sheet_keeps_partial_report_id() {
        let (pool, _tmp) = migrated_pool();
        let job = jobs::create_job(&pool.get().unwrap(), None).unwrap();

        let mut rows = match_rows(12);
        rows[25][9] = Cell::Text("n/a".into());
        run(&pool, &job.id, &xlsx(&rows), None).unwrap();

        let failed = jobs::get_job(&pool.get().unwrap(), &job.id)
            .unwrap()
            .unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert!(failed.report_id.is_some());
        assert!(failed.error.unwrap().contains("row 25"));
    }
}
