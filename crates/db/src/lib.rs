//! Database layer for Learnboard

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

pub mod badges;
pub mod courses;
pub mod group_scores;
pub mod groups;
pub mod leaderboard;
pub mod projects;
pub mod scores;
pub mod snapshots;
pub mod users;

#[cfg(test)]
mod courses_test;

/// Create a database connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    info!("Database connected");
    Ok(pool)
}

/// Run database migrations from SQL files
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("Running migrations...");

    let migration_sql = include_str!("../../../migrations/001_initial.sql");
    sqlx::raw_sql(migration_sql).execute(pool).await?;

    info!("Migrations complete");
    Ok(())
}

/// Wrap a domain parse failure as a column decode error
pub(crate) fn decode_err(e: common::Error) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}
