use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::{
    db,
    error::{ChatError, ChatResult, is_unique_violation},
    model::{Role, Room, Timestamp},
};

use super::{
    codes::{self, CodeGenerator},
    members,
};

const ROOM_COLUMNS: &str = "id,name,code,owner_id,created_at";

/// Creates a room under a fresh code and makes `owner_id` its owner, in one
/// transaction.
///
/// Codes are not checked up front. The insert itself is the check: a
/// `rooms.code` unique violation means the candidate is taken (possibly by a
/// concurrent creation) and another one is drawn, for as long as it takes.
pub(crate) async fn create_room(
    db_pool: &SqlitePool,
    codes: &dyn CodeGenerator,
    name: &str,
    owner_id: i64,
) -> ChatResult<Room> {
    let mut tx = db::begin_write(db_pool).await?;
    let created_at = Timestamp::now();

    let mut collisions = 0u64;
    let room = loop {
        let code = codes.generate();
        let inserted = sqlx::query_as::<_, Room>(&format!(
            "INSERT INTO rooms (name,code,owner_id,created_at) VALUES (?,?,?,?) RETURNING {ROOM_COLUMNS}"
        ))
        .bind(name)
        .bind(&code)
        .bind(owner_id)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(room) => break room,
            Err(e) if is_unique_violation(&e, "rooms.code") => {
                collisions += 1;
                debug!(%code, collisions, "room code taken, drawing another");
            }
            Err(e) => return Err(e.into()),
        }
    };

    members::join(&mut *tx, owner_id, room.id, Role::Owner).await?;
    tx.commit().await?;

    info!(room_id = room.id, code = %room.code, owner_id, "room created");
    Ok(room)
}

pub(crate) async fn find_by_code(db: impl SqliteExecutor<'_>, code: &str) -> ChatResult<Option<Room>> {
    Ok(
        sqlx::query_as(&format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE code=?"))
            .bind(codes::normalize(code))
            .fetch_optional(db)
            .await?,
    )
}

pub(crate) async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> ChatResult<Option<Room>> {
    Ok(
        sqlx::query_as(&format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id=?"))
            .bind(id)
            .fetch_optional(db)
            .await?,
    )
}

/// Removes a room's messages, then its memberships, then the room, all or
/// nothing.
pub(crate) async fn delete_room(db_pool: &SqlitePool, id: i64) -> ChatResult<()> {
    let mut tx = db::begin_write(db_pool).await?;

    if find_by_id(&mut *tx, id).await?.is_none() {
        return Err(ChatError::RoomNotFound);
    }

    let messages = sqlx::query("DELETE FROM messages WHERE room_id=?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let memberships = sqlx::query("DELETE FROM memberships WHERE room_id=?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    sqlx::query("DELETE FROM rooms WHERE id=?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(room_id = id, messages, memberships, "room deleted");
    Ok(())
}
