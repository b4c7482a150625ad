//! SQL text builders for the load statements

use crate::catalog::TableSchema;

/// Quote an identifier for PostgreSQL, doubling embedded quotes
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// `"namespace"."table"`
pub fn qualified_name(namespace: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(namespace), quote_ident(table))
}

/// `CREATE TABLE` for a schema, keyed on its primary-key columns
///
/// No `IF NOT EXISTS`: an existing table must fail the load.
pub fn create_table_sql(namespace: &str, schema: &TableSchema) -> String {
    let mut definitions: Vec<String> = schema
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.column_type.sql_type()))
        .collect();

    let keys: Vec<String> = schema
        .columns
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| quote_ident(&c.name))
        .collect();
    if !keys.is_empty() {
        definitions.push(format!("PRIMARY KEY ({})", keys.join(", ")));
    }

    format!(
        "CREATE TABLE {} ({})",
        qualified_name(namespace, &schema.name),
        definitions.join(", ")
    )
}

/// `INSERT INTO ... (cols) ` prefix for a bulk `VALUES` list
pub fn insert_prefix(namespace: &str, schema: &TableSchema) -> String {
    let columns: Vec<String> = schema.columns.iter().map(|c| quote_ident(&c.name)).collect();
    format!(
        "INSERT INTO {} ({}) ",
        qualified_name(namespace, &schema.name),
        columns.join(", ")
    )
}
