use sqlx::{SqliteConnection, SqliteExecutor};

use crate::{
    error::ChatResult,
    model::{Membership, Role, Room, Timestamp},
};

const MEMBERSHIP_COLUMNS: &str = "id,user_id,room_id,role,joined_at";

/// Links a user to a room. Joining twice is not an error: the existing link
/// comes back untouched, role included. The unique (user_id, room_id)
/// constraint settles concurrent joins.
pub(crate) async fn join(conn: &mut SqliteConnection, user_id: i64, room_id: i64, role: Role) -> ChatResult<Membership> {
    sqlx::query(
        "INSERT INTO memberships (user_id,room_id,role,joined_at) VALUES (?,?,?,?)
         ON CONFLICT (user_id,room_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(room_id)
    .bind(role)
    .bind(Timestamp::now())
    .execute(&mut *conn)
    .await?;

    Ok(
        sqlx::query_as(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships WHERE user_id=? AND room_id=?"
        ))
        .bind(user_id)
        .bind(room_id)
        .fetch_one(&mut *conn)
        .await?,
    )
}

pub(crate) async fn find(db: impl SqliteExecutor<'_>, user_id: i64, room_id: i64) -> ChatResult<Option<Membership>> {
    Ok(
        sqlx::query_as(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships WHERE user_id=? AND room_id=?"
        ))
        .bind(user_id)
        .bind(room_id)
        .fetch_optional(db)
        .await?,
    )
}

pub(crate) async fn is_member(db: impl SqliteExecutor<'_>, user_id: i64, room_id: i64) -> ChatResult<bool> {
    Ok(find(db, user_id, room_id).await?.is_some())
}

/// Rooms the user belongs to, in the order the rooms were created.
pub(crate) async fn list_rooms_for_user(db: impl SqliteExecutor<'_>, user_id: i64) -> ChatResult<Vec<Room>> {
    Ok(sqlx::query_as(
        "SELECT r.id,r.name,r.code,r.owner_id,r.created_at
         FROM memberships m JOIN rooms r ON r.id = m.room_id
         WHERE m.user_id=?
         ORDER BY r.id",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?)
}

pub(crate) async fn list_members(db: impl SqliteExecutor<'_>, room_id: i64) -> ChatResult<Vec<Membership>> {
    Ok(
        sqlx::query_as(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships WHERE room_id=? ORDER BY id"
        ))
        .bind(room_id)
        .fetch_all(db)
        .await?,
    )
}
