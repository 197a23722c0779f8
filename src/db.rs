use std::str::FromStr;

use sqlx::{
    Sqlite, SqlitePool, Transaction,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT    NOT NULL UNIQUE,
    email         TEXT    NOT NULL UNIQUE,
    password_hash TEXT    NOT NULL,
    created_at    INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS rooms (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT    NOT NULL,
    code       TEXT    NOT NULL UNIQUE,
    owner_id   INTEGER NOT NULL REFERENCES users(id),
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS memberships (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id   INTEGER NOT NULL REFERENCES users(id),
    room_id   INTEGER NOT NULL REFERENCES rooms(id),
    role      TEXT    NOT NULL CHECK (role IN ('owner', 'member')),
    joined_at INTEGER NOT NULL,
    UNIQUE (user_id, room_id)
);

CREATE TABLE IF NOT EXISTS messages (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    content    TEXT    NOT NULL,
    created_at INTEGER NOT NULL,
    user_id    INTEGER NOT NULL REFERENCES users(id),
    room_id    INTEGER NOT NULL REFERENCES rooms(id)
);

CREATE INDEX IF NOT EXISTS messages_by_room ON messages (room_id, created_at, id);
CREATE INDEX IF NOT EXISTS memberships_by_room ON memberships (room_id);
"#;

pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Starts a transaction that holds the write lock from its first statement.
///
/// A deferred transaction that reads before it writes cannot wait out a
/// concurrent writer: sqlite fails the upgrade with `SQLITE_BUSY` straight
/// away. Taking the lock up front lets the busy timeout queue writers instead.
pub(crate) async fn begin_write(db_pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    db_pool.begin_with("BEGIN IMMEDIATE").await
}

/// Creates any missing tables. Safe to run on every startup.
pub async fn migrate(db_pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(db_pool).await?;
    Ok(())
}

/// Fresh in-memory database with the schema applied. Held on a single
/// connection that never expires, since each sqlite memory connection is its
/// own database.
pub async fn memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    migrate(&db_pool).await?;
    Ok(db_pool)
}
