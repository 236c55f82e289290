//! PostgreSQL connector: one JSONB document per entity in `<CMS_SCHEMA>._cms_entities`.

use crate::connector::Connector;
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

const ENTITIES_TABLE: &str = "_cms_entities";

/// Schema holding the entity table. From env `CMS_SCHEMA`, default `cms`.
pub fn cms_schema() -> String {
    std::env::var("CMS_SCHEMA").unwrap_or_else(|_| "cms".into())
}

#[derive(Clone, Debug)]
pub struct PgConnector {
    pool: PgPool,
    schema: String,
}

impl PgConnector {
    pub fn new(pool: PgPool) -> Self {
        Self::with_schema(pool, cms_schema())
    }

    pub fn with_schema(pool: PgPool, schema: impl Into<String>) -> Self {
        PgConnector {
            pool,
            schema: schema.into(),
        }
    }

    /// Schema-qualified entity table (e.g. `"cms"._cms_entities`).
    pub fn table(&self) -> String {
        qualified_table(&self.schema)
    }

    /// Create the schema and entity table if missing.
    pub async fn ensure_table(&self) -> Result<(), AppError> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(&self.schema)))
            .execute(&self.pool)
            .await?;
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                key TEXT PRIMARY KEY,
                payload JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table()
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }
}

fn qualified_table(schema: &str) -> String {
    format!("{}.{}", quote_ident(schema), ENTITIES_TABLE)
}

#[async_trait]
impl Connector for PgConnector {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn load(&self, entity: &str) -> Result<Option<Value>, AppError> {
        let row: Option<(Value,)> = sqlx::query_as(&format!("SELECT payload FROM {} WHERE key = $1", self.table()))
            .bind(entity)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(payload,)| payload))
    }

    async fn store(&self, entity: &str, value: Value) -> Result<(), AppError> {
        sqlx::query(&format!(
            "INSERT INTO {} (key, payload, updated_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (key) DO UPDATE SET payload = EXCLUDED.payload, updated_at = NOW()",
            self.table()
        ))
        .bind(entity)
        .bind(&value)
        .execute(&self.pool)
        .await?;
        tracing::debug!(entity, table = %self.table(), "stored entity document");
        Ok(())
    }
}

/// Make sure the database named in `database_url` exists before the CMS pool connects.
/// Runs `CREATE DATABASE` through the `postgres` maintenance database when it is missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = split_database_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        tracing::debug!("CMS data lives in the maintenance database, nothing to create");
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("DATABASE_URL for CMS store is invalid: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if exists {
        tracing::debug!(database = %db_name, "CMS database present");
        return Ok(());
    }
    sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
        .execute(&mut conn)
        .await?;
    tracing::info!(database = %db_name, "created CMS database");
    Ok(())
}

/// `(maintenance url, database name)`: the url with its path swapped for `postgres`.
fn split_database_url(url: &str) -> Result<(String, String), AppError> {
    let (base, path) = url
        .rsplit_once('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL for CMS store names no database".into()))?;
    let db_name = path.split('?').next().unwrap_or_default().trim();
    Ok((format!("{}/postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name_from_url() {
        let (admin, name) = split_database_url("postgres://u:p@localhost:5432/cms_dev?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "cms_dev");
    }

    #[test]
    fn url_without_path_is_rejected() {
        assert!(split_database_url("localhost").is_err());
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
        assert_eq!(qualified_table("cms"), r#""cms"._cms_entities"#);
        assert_eq!(qualified_table("a;drop"), r#""a;drop"._cms_entities"#);
    }
}
