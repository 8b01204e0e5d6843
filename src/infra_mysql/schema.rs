use anyhow::Result;
use sqlx::MySqlPool;

const SCHEMA: &str = include_str!("../../schema/mysql.sql");

/// Create the tables if they do not exist yet.
pub async fn apply_schema(pool: &MySqlPool) -> Result<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
