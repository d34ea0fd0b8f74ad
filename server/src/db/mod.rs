pub mod accounts;
pub mod schema;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

pub use accounts::AccountStore;

pub type DB = Pool<Sqlite>;

/// Opens (creating if needed) the SQLite database and makes sure the schema exists.
///
/// Every handler borrows a connection from this pool for the duration of a single
/// query, and the pool takes it back on every exit path, error or not.
pub async fn connect(url: &str) -> Result<DB> {
    // 1. Parse the URL and add the options we always want.
    // WAL lets readers proceed while a registration is being written, and the busy
    // timeout makes concurrent writers queue instead of failing with SQLITE_BUSY.
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("Invalid DATABASE_URL: {}", url))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    // 2. Build the pool.
    let db = SqlitePoolOptions::new()
        .max_connections(8)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .context("Could not open the SQLite database")?;

    // 3. Create tables.
    init_schema(&db).await?;

    Ok(db)
}

async fn init_schema(db: &DB) -> Result<()> {
    // sqlx::query only runs one statement at a time.
    for stmt in schema::SQLITE_INIT.split(';') {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        sqlx::query(stmt)
            .execute(db)
            .await
            .context("Failed to initialise the schema")?;
    }
    Ok(())
}
