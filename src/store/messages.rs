use sqlx::SqliteExecutor;

use crate::{
    error::{ChatError, ChatResult},
    model::{Message, Timestamp},
};

const MESSAGE_COLUMNS: &str = "id,content,created_at,user_id,room_id";

pub(crate) async fn append(db: impl SqliteExecutor<'_>, room_id: i64, user_id: i64, content: &str) -> ChatResult<Message> {
    if content.trim().is_empty() {
        return Err(ChatError::validation("message content must not be empty"));
    }

    Ok(
        sqlx::query_as(&format!(
            "INSERT INTO messages (content,created_at,user_id,room_id) VALUES (?,?,?,?) RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(content)
        .bind(Timestamp::now())
        .bind(user_id)
        .bind(room_id)
        .fetch_one(db)
        .await?,
    )
}

/// Room history, oldest first. Messages stamped in the same millisecond keep
/// their insertion order.
pub(crate) async fn list_for_room(db: impl SqliteExecutor<'_>, room_id: i64) -> ChatResult<Vec<Message>> {
    Ok(
        sqlx::query_as(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE room_id=? ORDER BY created_at, id"
        ))
        .bind(room_id)
        .fetch_all(db)
        .await?,
    )
}

pub(crate) async fn find(db: impl SqliteExecutor<'_>, id: i64) -> ChatResult<Option<Message>> {
    Ok(
        sqlx::query_as(&format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id=?"))
            .bind(id)
            .fetch_optional(db)
            .await?,
    )
}

pub(crate) async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> ChatResult<()> {
    let deleted = sqlx::query("DELETE FROM messages WHERE id=?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(ChatError::MessageNotFound);
    }
    Ok(())
}
