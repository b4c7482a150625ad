//! Relational loader
//!
//! Each table variant is committed in a single transaction: create the table,
//! insert the whole extracted batch, attach comments. A failure anywhere rolls
//! the table back entirely.

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use super::comments::CommentAnnotator;
use super::sql::{create_table_sql, insert_prefix, qualified_name};
use crate::error::{IngestError, Result, DUPLICATE_TABLE_SQLSTATE};
use crate::sequence::ExtractedRecord;
use crate::variant::VariantSchema;

/// PostgreSQL accepts at most this many bind parameters per statement
const MAX_BIND_PARAMS: usize = 65_535;

/// Creates and fills one physical table per variant inside a namespace
pub struct RelationalLoader {
    db: PgPool,
    namespace: String,
}

impl RelationalLoader {
    pub fn new(db: PgPool, namespace: impl Into<String>) -> Self {
        Self {
            db,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Rows per `INSERT` so a statement stays under the bind limit
    pub fn rows_per_statement(column_count: usize) -> usize {
        (MAX_BIND_PARAMS / column_count.max(1)).max(1)
    }

    /// Create the variant's table, insert its batch, and comment it
    ///
    /// Returns the number of rows inserted.
    pub async fn load(&self, variant: &VariantSchema, batch: &[ExtractedRecord]) -> Result<u64> {
        let schema = &variant.schema;
        let table = qualified_name(&self.namespace, &schema.name);

        let mut tx = self.db.begin().await?;

        sqlx::raw_sql(&create_table_sql(&self.namespace, schema))
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err)
                    if db_err.code().as_deref() == Some(DUPLICATE_TABLE_SQLSTATE) =>
                {
                    IngestError::DuplicateTable(table.clone())
                },
                other => IngestError::Database(other),
            })?;

        let prefix = insert_prefix(&self.namespace, schema);
        let chunk_size = Self::rows_per_statement(schema.columns.len());
        let mut inserted = 0u64;

        for chunk in batch.chunks(chunk_size) {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(prefix.as_str());

            query_builder.push_values(chunk, |mut b, record| {
                for (value, column) in record.values().iter().zip(&schema.columns) {
                    b.push_bind(value.as_sql_text());
                    if column.is_numeric() {
                        b.push_unseparated("::numeric");
                    }
                }
            });

            let result = query_builder.build().execute(&mut *tx).await?;
            inserted += result.rows_affected();
            debug!(table = %schema.name, rows = chunk.len(), "Inserted chunk");
        }

        CommentAnnotator::new(&self.namespace)
            .annotate(&mut *tx, schema)
            .await?;

        tx.commit().await?;

        info!(
            table = %schema.name,
            variant = %variant.variant,
            rows = inserted,
            "Loaded table"
        );

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_per_statement() {
        assert_eq!(RelationalLoader::rows_per_statement(4), 16_383);
        assert_eq!(RelationalLoader::rows_per_statement(0), 65_535);
        assert_eq!(RelationalLoader::rows_per_statement(100_000), 1);
    }
}
