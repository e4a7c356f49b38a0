// SQLite connection pool, created on demand with the schema applied

use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};
use tracing::debug;
use crate::db::INIT_SCHEMA;

pub async fn establish_connection(database_url: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    let in_memory = database_url.contains(":memory:");

    // Create database if it doesn't exist
    if !in_memory && !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        Sqlite::create_database(database_url).await?;
    }

    // Every pooled connection to an in-memory database would see its own
    // empty database, so those get a single connection that never idles out.
    let options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };
    let pool = options.connect(database_url).await?;

    if !in_memory {
        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
    }

    sqlx::query(INIT_SCHEMA).execute(&pool).await?;
    debug!("Database schema ready at {}", database_url);

    Ok(pool)
}
