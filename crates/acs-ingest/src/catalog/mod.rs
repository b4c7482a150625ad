// Table Lookup Catalog
//
// The Census Bureau ships ACS summary file data as "sequences": wide delimited
// files that pack the cells of several tables side by side. The lookup catalog
// says which sequence holds each table, where its cells start, and what each
// cell means. This module turns it into one TableSchema per table:
// - models: catalog rows, column and table schemas
// - parser: row classification and schema synthesis

pub mod models;
pub mod parser;

pub use models::{
    Catalog, CatalogRow, ColumnDef, ColumnType, TableSchema, KEY_COLUMN_COUNT,
    LOGRECNO_FIELD_INDEX, STUSAB_FIELD_INDEX,
};
pub use parser::{CatalogEntry, CatalogParser};
