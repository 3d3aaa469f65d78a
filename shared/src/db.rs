use anyhow::Result;
use diesel::{Connection, PgConnection};
use diesel_async::pooled_connection::{bb8::Pool, AsyncDieselConnectionManager};
use diesel_async::AsyncPgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};
use tracing::info;

pub type DbPool = Pool<AsyncPgConnection>;

pub async fn build_pool(database_url: &str) -> Result<DbPool> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder().build(config).await?;
    Ok(pool)
}

/// Applies every pending migration and returns the versions that ran.
///
/// Migrations run over a blocking `PgConnection`, so the work is moved off the
/// async executor.
pub async fn run_migrations(
    database_url: String,
    migrations: EmbeddedMigrations,
) -> Result<Vec<String>> {
    tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
        let mut conn = PgConnection::establish(&database_url)?;
        let applied = conn
            .run_pending_migrations(migrations)
            .map_err(|e| anyhow::anyhow!("Migration error: {}", e))?;
        let versions: Vec<String> = applied.iter().map(|v| v.to_string()).collect();
        info!("Applied {} pending migration(s)", versions.len());
        Ok(versions)
    })
    .await?
}
