//! Table and column comments
//!
//! ACS table and cell titles are hard to interpret on their own, so every
//! loaded table carries its title/universe as a table comment and each cell's
//! title as a column comment.
//!
//! `COMMENT ON` takes no bind parameters, so the text is inlined as a
//! dollar-quoted literal. Titles routinely contain single quotes and
//! percent signs; dollar quoting passes both through untouched. The tag is
//! chosen so it cannot occur inside the text, and NUL bytes (which PostgreSQL
//! rejects in any text) fail the load.

use sqlx::PgConnection;
use tracing::debug;

use super::sql::{qualified_name, quote_ident};
use crate::catalog::TableSchema;
use crate::error::{IngestError, Result};

const MAX_TAG_ATTEMPTS: usize = 64;

/// Wrap `text` in a dollar-quote tag that does not occur in it
pub fn dollar_quote(text: &str, target: &str) -> Result<String> {
    if text.contains('\0') {
        return Err(IngestError::Comment {
            target: target.to_string(),
            reason: "text contains a NUL character".to_string(),
        });
    }

    for attempt in 0..MAX_TAG_ATTEMPTS {
        let tag = if attempt == 0 {
            "$c$".to_string()
        } else {
            format!("$c{}$", attempt)
        };

        // The closing tag must first appear right after the text, so a text
        // ending in "$c" cannot swallow part of it.
        let body = format!("{}{}", text, tag);
        if body.find(&tag) == Some(text.len()) {
            return Ok(format!("{}{}", tag, body));
        }
    }

    Err(IngestError::Comment {
        target: target.to_string(),
        reason: "no dollar-quote tag is free of collisions".to_string(),
    })
}

/// Builds and issues the comment statements for a table
pub struct CommentAnnotator<'a> {
    namespace: &'a str,
}

impl<'a> CommentAnnotator<'a> {
    pub fn new(namespace: &'a str) -> Self {
        Self { namespace }
    }

    /// One `COMMENT ON TABLE` followed by a `COMMENT ON COLUMN` per column
    pub fn statements(&self, schema: &TableSchema) -> Result<Vec<String>> {
        let table = qualified_name(self.namespace, &schema.name);
        let mut statements = Vec::with_capacity(schema.columns.len() + 1);

        statements.push(format!(
            "COMMENT ON TABLE {} IS {};",
            table,
            dollar_quote(&schema.comment, &schema.name)?
        ));

        for column in &schema.columns {
            let target = format!("{}.{}", schema.name, column.name);
            statements.push(format!(
                "COMMENT ON COLUMN {}.{} IS {};",
                table,
                quote_ident(&column.name),
                dollar_quote(&column.documentation, &target)?
            ));
        }

        Ok(statements)
    }

    /// Attach all comments for `schema` on the given connection
    pub async fn annotate(&self, conn: &mut PgConnection, schema: &TableSchema) -> Result<()> {
        let statements = self.statements(schema)?;
        let script = statements.join("\n");

        sqlx::raw_sql(&script).execute(&mut *conn).await?;

        debug!(table = %schema.name, comments = statements.len(), "Attached comments");
        Ok(())
    }
}
