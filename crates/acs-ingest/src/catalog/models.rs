// Catalog Data Models

use serde::Deserialize;
use std::collections::BTreeMap;

/// Positions of the key fields inside every sequence file row (zero-based)
pub const STUSAB_FIELD_INDEX: usize = 2;
pub const LOGRECNO_FIELD_INDEX: usize = 5;

/// Number of key columns leading every table
pub const KEY_COLUMN_COUNT: usize = 2;

// ============================================================================
// Catalog Row
// ============================================================================

/// One line of the sequence/table number lookup file
///
/// Fields the loader does not use (`File ID`, `Subject Area`, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogRow {
    #[serde(rename = "Table ID")]
    pub table_id: String,

    #[serde(rename = "Sequence Number", default)]
    pub sequence_number: String,

    #[serde(rename = "Line Number", default)]
    pub line_number: String,

    #[serde(rename = "Start Position", default)]
    pub start_position: String,

    #[serde(rename = "Total Cells in Table", default)]
    pub total_cells_text: String,

    #[serde(rename = "Table Title", default)]
    pub table_title: String,
}

// ============================================================================
// Column Definitions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Numeric,
}

impl ColumnType {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Numeric => "NUMERIC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub documentation: String,
    pub primary_key: bool,
}

impl ColumnDef {
    fn key(name: &str, documentation: &str) -> Self {
        Self {
            name: name.to_string(),
            column_type: ColumnType::Text,
            documentation: documentation.to_string(),
            primary_key: true,
        }
    }

    /// State postal abbreviation, first half of every table's primary key
    pub fn stusab() -> Self {
        Self::key("stusab", "State Postal Abbreviation")
    }

    /// Logical record number, second half of every table's primary key
    pub fn logrecno() -> Self {
        Self::key("logrecno", "Logical Record Number")
    }

    /// Numeric data cell named after its catalog line number ("_12")
    pub fn data(line_number: &str, documentation: impl Into<String>) -> Self {
        Self {
            name: format!("_{}", line_number),
            column_type: ColumnType::Numeric,
            documentation: documentation.into(),
            primary_key: false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.column_type == ColumnType::Numeric
    }
}

// ============================================================================
// Table Schema
// ============================================================================

/// Column layout of one logical ACS table, synthesized from the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Table id as it appears in the catalog (e.g. "B01001")
    pub table_id: String,

    /// Lowercased table name used in the database
    pub name: String,

    /// Sequence file holding this table's cells (e.g. "0002")
    pub sequence_number: String,

    /// Zero-based position of the first cell in sequence file rows
    pub start_index: usize,

    pub cell_count: usize,

    /// Table title, followed by its universe when the catalog provides one
    pub comment: String,

    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(
        table_id: impl Into<String>,
        sequence_number: impl Into<String>,
        start_index: usize,
        cell_count: usize,
        title: impl Into<String>,
    ) -> Self {
        let table_id = table_id.into();
        // Sized by the catalog lines actually pushed, never by the announced count
        let columns = vec![ColumnDef::stusab(), ColumnDef::logrecno()];

        Self {
            name: table_id.to_lowercase(),
            table_id,
            sequence_number: sequence_number.into(),
            start_index,
            cell_count,
            comment: title.into(),
            columns,
        }
    }

    pub fn append_comment(&mut self, text: &str) {
        self.comment.push_str(", ");
        self.comment.push_str(text);
    }

    pub fn push_data_column(&mut self, column: ColumnDef) {
        self.columns.push(column);
    }

    /// Data columns only, without the two key columns
    pub fn data_columns(&self) -> &[ColumnDef] {
        self.columns.get(KEY_COLUMN_COUNT..).unwrap_or(&[])
    }

    /// Whether the catalog supplied exactly one line per announced cell
    pub fn is_complete(&self) -> bool {
        self.cell_count.checked_add(KEY_COLUMN_COUNT) == Some(self.columns.len())
    }
}

// ============================================================================
// Parsed Catalog
// ============================================================================

/// Every table described by a lookup file, keyed by catalog table id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub tables: BTreeMap<String, TableSchema>,

    /// Rows that matched no shape (e.g. line number "0.5")
    pub excluded_rows: usize,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, table_id: &str) -> Option<&TableSchema> {
        self.tables.get(table_id)
    }

    pub fn total_columns(&self) -> usize {
        self.tables.values().map(|t| t.columns.len()).sum()
    }

    pub fn into_tables(self) -> impl Iterator<Item = TableSchema> {
        self.tables.into_values()
    }
}
