use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{NewPost, Post, PostPatch};
use super::StoreResult;

const POST_COLUMNS: &str = "id, title, content, author, timestamp, board_id";

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        author: row.get(3)?,
        timestamp: row.get(4)?,
        board_id: row.get(5)?,
    })
}

/// Insert a post under `board_id`, stamped with the current time.
pub fn create_post(conn: &Connection, board_id: i64, post: &NewPost) -> StoreResult<Post> {
    let timestamp = Utc::now();
    conn.execute(
        "INSERT INTO posts (board_id, title, content, author, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![board_id, post.title, post.content, post.author, timestamp],
    )?;

    Ok(Post {
        id: conn.last_insert_rowid(),
        title: post.title.clone(),
        content: post.content.clone(),
        author: post.author.clone(),
        timestamp,
        board_id,
    })
}

/// A post is only found through the board it belongs to.
pub fn get_post(conn: &Connection, board_id: i64, post_id: i64) -> StoreResult<Option<Post>> {
    let post = conn
        .query_row(
            &format!("SELECT {POST_COLUMNS} FROM posts WHERE board_id = ?1 AND id = ?2"),
            params![board_id, post_id],
            post_from_row,
        )
        .optional()?;
    Ok(post)
}

/// Page through a board's posts in insertion order. A window past the end is
/// empty, and a limit longer than what remains is clamped.
pub fn list_posts(
    conn: &Connection,
    board_id: i64,
    offset: u32,
    limit: u32,
) -> StoreResult<Vec<Post>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE board_id = ?1
         ORDER BY id ASC LIMIT ?2 OFFSET ?3"
    ))?;
    let posts = stmt
        .query_map(params![board_id, limit, offset], post_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

pub fn update_post(conn: &Connection, existing: &Post, patch: &PostPatch) -> StoreResult<Post> {
    let mut post = existing.clone();
    if let Some(ref title) = patch.title {
        post.title = title.clone();
    }
    if let Some(ref content) = patch.content {
        post.content = content.clone();
    }
    if let Some(ref author) = patch.author {
        post.author = author.clone();
    }

    conn.execute(
        "UPDATE posts SET title = ?1, content = ?2, author = ?3 WHERE id = ?4",
        params![post.title, post.content, post.author, post.id],
    )?;

    Ok(post)
}

pub fn delete_post(conn: &Connection, post: &Post) -> StoreResult<()> {
    conn.execute("DELETE FROM posts WHERE id = ?1", params![post.id])?;
    Ok(())
}
