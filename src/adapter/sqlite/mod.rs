//! SQLite persistence adapter using Diesel.

mod model;
mod schema;
mod store;

pub use store::{SqliteStore, StoreDefaults};

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::{RunQueryDsl, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::StoreError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database connection pool type alias.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Create a connection pool for the given database URL.
pub fn create_pool(database_url: &str) -> Result<DbPool, StoreError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(5)
        .build(manager)
        .map_err(|e| StoreError::Connection(e.to_string()))
}

/// Run pending migrations and set pragmas suited to a multi-tasked bot.
pub fn prepare_database(pool: &DbPool) -> Result<(), StoreError> {
    let mut conn = pool.get().map_err(|e| StoreError::Connection(e.to_string()))?;

    diesel::sql_query("PRAGMA busy_timeout=5000")
        .execute(&mut conn)
        .map_err(|e| StoreError::Database(e.to_string()))?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Database(e.to_string()))?;

    Ok(())
}
