//! Standard / margin-of-error table variants and their field positions

use crate::catalog::{TableSchema, KEY_COLUMN_COUNT, LOGRECNO_FIELD_INDEX, STUSAB_FIELD_INDEX};
use crate::error::{IngestError, Result};

/// The two parallel representations of every ACS table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Estimates, read from `e*` sequence files
    Standard,
    /// Margins of error, read from `m*` sequence files
    MarginOfError,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Standard, Variant::MarginOfError];

    /// Suffix appended to the table name
    pub fn suffix(self) -> &'static str {
        match self {
            Variant::Standard => "",
            Variant::MarginOfError => "_moe",
        }
    }

    /// Leading character of the sequence file names holding this variant
    pub fn file_char(self) -> char {
        match self {
            Variant::Standard => 'e',
            Variant::MarginOfError => 'm',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Standard => "standard",
            Variant::MarginOfError => "margin of error",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical table: an owned copy of the logical schema renamed for its variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSchema {
    pub variant: Variant,
    pub schema: TableSchema,
}

impl VariantSchema {
    pub fn new(variant: Variant, mut schema: TableSchema) -> Self {
        schema.name.push_str(variant.suffix());
        Self { variant, schema }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn file_char(&self) -> char {
        self.variant.file_char()
    }

    /// Field positions to pull from each sequence row, aligned with `schema.columns`
    ///
    /// Fails when the catalog listed a different number of cells than it announced.
    pub fn field_indices(&self) -> Result<Vec<usize>> {
        let schema = &self.schema;
        let mismatch = || IngestError::SchemaMismatch {
            table: self.name().to_string(),
            columns: schema.columns.len(),
            indices: schema.cell_count.saturating_add(KEY_COLUMN_COUNT),
        };

        if !schema.is_complete() {
            return Err(mismatch());
        }
        resolve_field_indices(schema.start_index, schema.cell_count).ok_or_else(mismatch)
    }
}

/// Split a table into its standard and margin-of-error variants
///
/// Each variant owns its own column list; nothing is shared between them.
pub fn expand(schema: TableSchema) -> [VariantSchema; 2] {
    let standard = VariantSchema::new(Variant::Standard, schema.clone());
    let moe = VariantSchema::new(Variant::MarginOfError, schema);
    [standard, moe]
}

/// `[2, 5, start, start + 1, ..., start + cells - 1]`
///
/// The two key fields sit at the same positions in every sequence file;
/// the table's cells follow wherever the catalog placed them. `None` when
/// the range runs past `usize::MAX`.
pub fn resolve_field_indices(start_index: usize, cell_count: usize) -> Option<Vec<usize>> {
    let end = start_index.checked_add(cell_count)?;
    let mut indices = vec![STUSAB_FIELD_INDEX, LOGRECNO_FIELD_INDEX];
    indices.extend(start_index..end);
    Some(indices)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::catalog::ColumnDef;

    fn schema() -> TableSchema {
        let mut schema = TableSchema::new("B01001", "0002", 6, 2, "Sex by Age");
        schema.push_data_column(ColumnDef::data("1", "Total:"));
        schema.push_data_column(ColumnDef::data("2", "Male:"));
        schema
    }

    #[test]
    fn test_expand_names_and_chars() {
        let [standard, moe] = expand(schema());

        assert_eq!(standard.name(), "b01001");
        assert_eq!(standard.file_char(), 'e');
        assert_eq!(moe.name(), "b01001_moe");
        assert_eq!(moe.file_char(), 'm');
        assert_eq!(standard.schema.columns, moe.schema.columns);
    }

    #[test]
    fn test_variants_do_not_share_columns() {
        let [mut standard, moe] = expand(schema());

        standard.schema.columns[2].name = "_renamed".to_string();
        standard.schema.columns.push(ColumnDef::data("3", "Female:"));

        assert_eq!(moe.schema.columns.len(), 4);
        assert_eq!(moe.schema.columns[2].name, "_1");
    }

    #[test]
    fn test_field_indices() {
        assert_eq!(resolve_field_indices(6, 3), Some(vec![2, 5, 6, 7, 8]));
        assert_eq!(resolve_field_indices(6, 0), Some(vec![2, 5]));
        assert_eq!(resolve_field_indices(usize::MAX - 1, 2), None);

        let [standard, _] = expand(schema());
        let indices = standard.field_indices().unwrap();
        assert_eq!(indices.len(), standard.schema.cell_count + 2);
        assert_eq!(&indices[..2], &[2, 5]);
        assert_eq!(indices.len(), standard.schema.columns.len());
    }

    #[test]
    fn test_field_indices_reject_unlisted_cells() {
        // Announces four billion cells but lists two
        let mut schema = TableSchema::new("B01001", "0002", 6, 4_000_000_000, "Sex by Age");
        schema.push_data_column(ColumnDef::data("1", "Total:"));
        schema.push_data_column(ColumnDef::data("2", "Male:"));

        let [standard, _] = expand(schema);
        assert!(matches!(
            standard.field_indices(),
            Err(IngestError::SchemaMismatch { columns: 4, indices: 4_000_000_002, .. })
        ));
    }
}
