use sqlx::{SqliteExecutor, SqlitePool};

use crate::{
    error::{ChatError, ChatResult, is_unique_violation},
    model::{Timestamp, User},
};

const USER_COLUMNS: &str = "id,username,email,password_hash,created_at";

/// Inserts a user. A clash on username or email is the same error either way.
pub(crate) async fn create(
    db_pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> ChatResult<User> {
    let taken = sqlx::query("SELECT 1 FROM users WHERE username=? OR email=?")
        .bind(username)
        .bind(email)
        .fetch_optional(db_pool)
        .await?;
    if taken.is_some() {
        return Err(ChatError::DuplicateIdentity);
    }

    let inserted = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username,email,password_hash,created_at) VALUES (?,?,?,?) RETURNING {USER_COLUMNS}"
    ))
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(Timestamp::now())
    .fetch_one(db_pool)
    .await;

    // someone may have registered the same name between the check and the insert
    match inserted {
        Ok(user) => Ok(user),
        Err(e) if is_unique_violation(&e, "users.username") || is_unique_violation(&e, "users.email") => {
            Err(ChatError::DuplicateIdentity)
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) async fn find_by_username(db: impl SqliteExecutor<'_>, username: &str) -> ChatResult<Option<User>> {
    Ok(
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username=?"))
            .bind(username)
            .fetch_optional(db)
            .await?,
    )
}

pub(crate) async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> ChatResult<Option<User>> {
    Ok(
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id=?"))
            .bind(id)
            .fetch_optional(db)
            .await?,
    )
}
