use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{Board, BoardPatch};
use super::{is_unique_violation, StoreError, StoreResult};

pub const NAME_TAKEN: &str = "Board with this name already exist";

fn board_from_row(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn map_unique(err: rusqlite::Error) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Conflict(NAME_TAKEN.to_string())
    } else {
        err.into()
    }
}

/// Insert a board. The UNIQUE constraint on `name` is the final arbiter, so
/// two racing creators cannot both succeed.
pub fn create_board(
    conn: &Connection,
    name: &str,
    description: Option<&str>,
) -> StoreResult<Board> {
    conn.execute(
        "INSERT INTO boards (name, description) VALUES (?1, ?2)",
        params![name, description],
    )
    .map_err(map_unique)?;

    Ok(Board {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        description: description.map(str::to_string),
    })
}

pub fn get_board_by_id(conn: &Connection, id: i64) -> StoreResult<Option<Board>> {
    let board = conn
        .query_row(
            "SELECT id, name, description FROM boards WHERE id = ?1",
            params![id],
            board_from_row,
        )
        .optional()?;
    Ok(board)
}

pub fn get_board_by_name(conn: &Connection, name: &str) -> StoreResult<Option<Board>> {
    let board = conn
        .query_row(
            "SELECT id, name, description FROM boards WHERE name = ?1",
            params![name],
            board_from_row,
        )
        .optional()?;
    Ok(board)
}

pub fn list_boards(conn: &Connection) -> StoreResult<Vec<Board>> {
    let mut stmt = conn.prepare("SELECT id, name, description FROM boards ORDER BY id")?;
    let boards = stmt
        .query_map([], board_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(boards)
}

/// Apply the fields present in `patch` and return the stored result.
pub fn update_board(conn: &Connection, existing: &Board, patch: &BoardPatch) -> StoreResult<Board> {
    let mut board = existing.clone();
    if let Some(ref name) = patch.name {
        board.name = name.clone();
    }
    if let Some(ref description) = patch.description {
        board.description = Some(description.clone());
    }

    conn.execute(
        "UPDATE boards SET name = ?1, description = ?2 WHERE id = ?3",
        params![board.name, board.description, board.id],
    )
    .map_err(map_unique)?;

    Ok(board)
}

/// Returns whether a row existed and was removed. Posts go with it.
pub fn delete_board(conn: &Connection, id: i64) -> StoreResult<bool> {
    let rows = conn.execute("DELETE FROM boards WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}
