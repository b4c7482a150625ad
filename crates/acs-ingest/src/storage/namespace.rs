//! Release namespace management

use sqlx::PgPool;
use tracing::info;

use super::sql::quote_ident;
use crate::error::{IngestError, Result};

/// Schema name for a release, e.g. `acs2015_5yr`
pub fn namespace_for(year: u16, span: u8) -> String {
    format!("acs{}_{}yr", year, span)
}

/// Drop the release schema with everything in it and create it empty
///
/// Run before a load: table creation never replaces existing tables.
pub async fn drop_and_create_namespace(db: &PgPool, namespace: &str) -> Result<()> {
    if namespace.trim().is_empty() {
        return Err(IngestError::Common(acs_common::AcsError::config(
            "Schema name cannot be empty",
        )));
    }

    let ident = quote_ident(namespace);
    let script = format!(
        "DROP SCHEMA IF EXISTS {ident} CASCADE;\nCREATE SCHEMA {ident};"
    );

    sqlx::raw_sql(&script).execute(db).await?;

    info!(schema = %namespace, "Recreated schema");
    Ok(())
}
