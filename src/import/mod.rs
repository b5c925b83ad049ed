pub mod job;
pub mod layout;
pub mod sheet;

use rusqlite::Connection;

use crate::db::models::PlayerLine;
use crate::db::{reports, StoreError};
use layout::{columns, RowAction, Side};
use sheet::{Cell, Sheet, SheetRow};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook has no worksheets")]
    EmptyWorkbook,

    #[error("sheet has no report row")]
    EmptySheet,

    #[error("row {row}: missing column {column}")]
    MissingColumn { row: usize, column: usize },

    #[error("row {row}, column {column}: expected an integer, found {found:?}")]
    InvalidCell {
        row: usize,
        column: usize,
        found: String,
    },

    #[error("row {row}: no parent record to attach to")]
    MissingParent { row: usize },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Store(err.into())
    }
}

/// What an import run has committed so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub report_id: Option<i64>,
    pub team_result_ids: Vec<i64>,
    pub player_stats: usize,
    pub skipped_rows: usize,
}

/// Walks a decoded score sheet and writes one report, its two team results
/// and their player lines. Every insert commits on its own, so a failure
/// part-way leaves earlier rows in place; `summary()` says what they were.
pub struct Importer<'c> {
    conn: &'c Connection,
    teams: [Option<i64>; 2],
    summary: ImportSummary,
}

impl<'c> Importer<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            teams: [None, None],
            summary: ImportSummary::default(),
        }
    }

    pub fn summary(&self) -> &ImportSummary {
        &self.summary
    }

    pub fn into_summary(self) -> ImportSummary {
        self.summary
    }

    /// Import every row of `sheet`, returning the new report's id.
    pub fn import(&mut self, sheet: &Sheet) -> Result<i64, ImportError> {
        for (index, row) in sheet.rows().iter().enumerate() {
            match layout::action_for(index) {
                RowAction::Report => self.report(index, row)?,
                RowAction::TeamResult(side) => self.team_result(index, row, side)?,
                RowAction::PlayerStat(side) => self.player_stat(index, row, side)?,
                RowAction::Ignore => {}
            }
        }
        self.summary.report_id.ok_or(ImportError::EmptySheet)
    }

    fn report(&mut self, index: usize, row: &SheetRow) -> Result<(), ImportError> {
        let text = cell(row, index, columns::REPORT)?.to_text();
        let report = reports::create_report(self.conn, &text)?;
        tracing::debug!(report_id = report.id, "created report");
        self.summary.report_id = Some(report.id);
        Ok(())
    }

    fn team_result(&mut self, index: usize, row: &SheetRow, side: Side) -> Result<(), ImportError> {
        let report_id = self
            .summary
            .report_id
            .ok_or(ImportError::MissingParent { row: index })?;
        let team = cell(row, index, columns::TEAM)?.to_text();
        let result = cell(row, index, columns::RESULT)?.to_text();

        let team_result = reports::create_team_result(self.conn, report_id, &team, &result)?;
        tracing::debug!(team_result_id = team_result.id, ?side, %team, "created team result");
        self.teams[side.index()] = Some(team_result.id);
        self.summary.team_result_ids.push(team_result.id);
        Ok(())
    }

    fn player_stat(&mut self, index: usize, row: &SheetRow, side: Side) -> Result<(), ImportError> {
        // Blank lines on the sheet carry a placeholder instead of a number
        let Some(backnumber) = cell(row, index, columns::BACKNUMBER)?.as_int() else {
            self.summary.skipped_rows += 1;
            return Ok(());
        };
        let team_result_id =
            self.teams[side.index()].ok_or(ImportError::MissingParent { row: index })?;

        let line = PlayerLine {
            backnumber,
            player: cell(row, index, columns::PLAYER)?.to_text(),
            offense_rebound: stat(row, index, columns::OFFENSE_REBOUND)?,
            defense_rebound: stat(row, index, columns::DEFENSE_REBOUND)?,
            total_rebound: stat(row, index, columns::TOTAL_REBOUND)?,
            assist: stat(row, index, columns::ASSIST)?,
            steal: stat(row, index, columns::STEAL)?,
            block: stat(row, index, columns::BLOCK)?,
            score_1q: stat(row, index, columns::SCORE_1Q)?,
            score_2q: stat(row, index, columns::SCORE_2Q)?,
            score_3q: stat(row, index, columns::SCORE_3Q)?,
            score_4q: stat(row, index, columns::SCORE_4Q)?,
            score_ot: stat(row, index, columns::SCORE_OT)?,
            score_total: stat(row, index, columns::SCORE_TOTAL)?,
        };
        reports::create_player_stat(self.conn, team_result_id, &line)?;
        self.summary.player_stats += 1;
        Ok(())
    }
}

fn cell(row: &SheetRow, index: usize, column: usize) -> Result<&Cell, ImportError> {
    row.cell(column)
        .ok_or(ImportError::MissingColumn { row: index, column })
}

/// Blank stat cells are stored as NULL; anything else must be integral.
fn stat(row: &SheetRow, index: usize, column: usize) -> Result<Option<i64>, ImportError> {
    let value = cell(row, index, column)?;
    if value.is_empty() {
        return Ok(None);
    }
    value
        .as_int()
        .map(Some)
        .ok_or_else(|| ImportError::InvalidCell {
            row: index,
            column,
            found: value.to_text(),
        })
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Score-sheet rows laid out the way the printed sheet is.

    use super::sheet::{Cell, Sheet, SheetRow};

    pub const WIDTH: usize = 18;

    pub fn blank() -> Vec<Cell> {
        vec![Cell::Empty; WIDTH]
    }

    pub fn report_row(text: &str) -> Vec<Cell> {
        let mut cells = blank();
        cells[17] = Cell::Text(text.to_string());
        cells
    }

    pub fn team_row(team: &str, result: &str) -> Vec<Cell> {
        let mut cells = blank();
        cells[3] = Cell::Text(team.to_string());
        cells[12] = Cell::Text(result.to_string());
        cells
    }

    pub fn player_row(backnumber: i64, player: &str, points: i64) -> Vec<Cell> {
        let mut cells = blank();
        cells[1] = Cell::Float(backnumber as f64);
        cells[2] = Cell::Text(player.to_string());
        cells[3..13].fill(Cell::Float(1.0));
        cells[14] = Cell::Float(points as f64);
        cells
    }

    /// 36 data rows: `home_players` filled lines for the home team (the rest
    /// blank) and a full twelve for the away team.
    pub fn match_rows(home_players: usize) -> Vec<Vec<Cell>> {
        let mut rows = vec![blank(); 36];
        rows[0] = report_row("Spring league, round 3");
        rows[2] = team_row("Hawks", "W");
        for (slot, index) in (6..=17).enumerate() {
            if slot < home_players {
                rows[index] = player_row(slot as i64 + 4, &format!("home{slot}"), 10);
            }
        }
        rows[18] = team_row("TOTAL", "99");
        rows[20] = team_row("Owls", "L");
        for (slot, index) in (24..=35).enumerate() {
            rows[index] = player_row(slot as i64 + 4, &format!("away{slot}"), 5);
        }
        rows
    }

    pub fn match_sheet(home_players: usize) -> Sheet {
        Sheet::new(
            &blank(),
            match_rows(home_players).into_iter().map(SheetRow::new).collect(),
        )
    }
}
