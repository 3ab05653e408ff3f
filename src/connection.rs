use deadpool_diesel::postgres::{Manager, Pool, Runtime};
use deadpool_diesel::InteractError;
use diesel::{Connection, ConnectionResult, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

use crate::error::ServiceError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type DbPool = Pool;

pub fn establish_connection(database_url: &str) -> ConnectionResult<PgConnection> {
    PgConnection::establish(database_url)
}

pub fn open_db_pool(database_url: &str, max_size: usize) -> Result<DbPool, ServiceError> {
    let manager = Manager::new(database_url, Runtime::Tokio1);
    Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|err| ServiceError::Pool(err.to_string()))
}

/// Checks out a connection for the duration of `f`. The connection goes back
/// to the pool when `f` returns, whatever the outcome.
pub async fn interact<R, F>(pool: &DbPool, f: F) -> Result<R, ServiceError>
where
    F: FnOnce(&mut PgConnection) -> Result<R, ServiceError> + Send + 'static,
    R: Send + 'static,
{
    let conn = pool
        .get()
        .await
        .map_err(|err| ServiceError::Pool(err.to_string()))?;

    conn.interact(f).await.map_err(|err| match err {
        InteractError::Panic(_) => ServiceError::Pool("database interaction panicked".into()),
        InteractError::Aborted => ServiceError::Pool("database interaction was aborted".into()),
    })?
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    let applied = interact(pool, |conn| {
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(|err| ServiceError::Migration(err.to_string()))
    })
    .await?;

    if applied > 0 {
        info!(applied, "applied pending migrations");
    }
    Ok(())
}
