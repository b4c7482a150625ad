//! Sequence/table number lookup parser
//!
//! The lookup file lists every ACS table as a run of rows sharing a `Table ID`:
//!
//! ```text
//! Table ID,Sequence Number,Line Number,Start Position,Total Cells in Table,Table Title
//! B01001,0002,,7,49 CELLS,SEX BY AGE
//! B01001,0002,,,,Universe:  Total population
//! B01001,0002,1,,,Total:
//! B01001,0002,2,,,Male:
//! ```
//!
//! Each row is classified once into a [`CatalogEntry`]; the parser then folds
//! entries into [`TableSchema`]s. Rows are expected in file order, with a
//! table's header row ahead of its body.

use std::path::Path;

use acs_common::encoding::decode_bytes;
use encoding_rs::Encoding;
use tracing::{debug, info};

use super::models::{Catalog, CatalogRow, ColumnDef, TableSchema, KEY_COLUMN_COUNT};
use crate::error::{IngestError, Result};

/// Shape of a single catalog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntry {
    /// Starts a table: where its cells live and how many there are
    Header {
        table_id: String,
        sequence_number: String,
        start_index: usize,
        cell_count: usize,
        title: String,
    },
    /// Subject-matter universe appended to the table comment
    Universe { table_id: String, title: String },
    /// One numeric cell of the table
    Data {
        table_id: String,
        line_number: String,
        title: String,
    },
    /// Sub-items such as line "0.5" that are not materialized
    Excluded,
}

impl CatalogRow {
    /// Classify the row by which of its fields are blank or integral
    ///
    /// Fails only on a header row whose cell count has no digits, or whose
    /// cell range does not fit in a `usize`.
    pub fn classify(self) -> std::result::Result<CatalogEntry, String> {
        if let Some(start) = positive_integer(&self.start_position) {
            let cell_count = parse_cell_count(&self.total_cells_text)?;
            let start_index = start - 1;
            if start_index.checked_add(cell_count).is_none()
                || cell_count.checked_add(KEY_COLUMN_COUNT).is_none()
            {
                return Err(format!(
                    "Cell range overflows: start position {}, {} cells",
                    self.start_position, cell_count
                ));
            }
            return Ok(CatalogEntry::Header {
                table_id: self.table_id,
                sequence_number: self.sequence_number,
                start_index,
                cell_count,
                title: self.table_title,
            });
        }

        if is_blank(&self.line_number) && is_blank(&self.start_position) {
            return Ok(CatalogEntry::Universe {
                table_id: self.table_id,
                title: self.table_title,
            });
        }

        if is_digits(&self.line_number) {
            return Ok(CatalogEntry::Data {
                table_id: self.table_id,
                line_number: self.line_number,
                title: self.table_title,
            });
        }

        Ok(CatalogEntry::Excluded)
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn positive_integer(value: &str) -> Option<usize> {
    if !is_digits(value) {
        return None;
    }
    value.parse::<usize>().ok().filter(|n| *n > 0)
}

/// "49 CELLS" -> 49. Every digit in the field is kept, in order.
fn parse_cell_count(text: &str) -> std::result::Result<usize, String> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits
        .parse()
        .map_err(|_| format!("Invalid cell count: '{}'", text))
}

/// Parser for the ACS sequence/table number lookup catalog
pub struct CatalogParser {
    encoding: &'static Encoding,
}

impl CatalogParser {
    /// Create a parser decoding catalog files with the given encoding
    pub fn new(encoding: &'static Encoding) -> Self {
        Self { encoding }
    }

    /// Read, decode, and parse a catalog file
    pub fn parse_path(&self, path: &Path) -> Result<Catalog> {
        let bytes = std::fs::read(path).map_err(|e| IngestError::io(path, e))?;
        let content = decode_bytes(&bytes, self.encoding)?;

        info!(
            path = %path.display(),
            encoding = self.encoding.name(),
            "Parsing table lookup catalog"
        );

        self.parse_str(&content)
            .map_err(|e| match e {
                IngestError::Csv { source, .. } => IngestError::csv(path, source),
                other => other,
            })
    }

    /// Parse already decoded catalog text (header row included)
    pub fn parse_str(&self, content: &str) -> Result<Catalog> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| IngestError::csv("<catalog>", e))?
            .clone();
        let mut record = csv::StringRecord::new();
        let mut catalog = Catalog::default();

        while reader
            .read_record(&mut record)
            .map_err(|e| IngestError::csv("<catalog>", e))?
        {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let row: CatalogRow = record
                .deserialize(Some(&headers))
                .map_err(|e| IngestError::csv("<catalog>", e))?;
            let entry = row
                .classify()
                .map_err(|message| IngestError::Catalog { line, message })?;
            apply_entry(&mut catalog, entry, line)?;
        }

        debug!(
            tables = catalog.len(),
            columns = catalog.total_columns(),
            excluded = catalog.excluded_rows,
            "Catalog parsed"
        );

        Ok(catalog)
    }
}

fn apply_entry(catalog: &mut Catalog, entry: CatalogEntry, line: u64) -> Result<()> {
    match entry {
        CatalogEntry::Header {
            table_id,
            sequence_number,
            start_index,
            cell_count,
            title,
        } => {
            let schema = TableSchema::new(
                table_id.clone(),
                sequence_number,
                start_index,
                cell_count,
                title,
            );
            catalog.tables.insert(table_id, schema);
        },
        CatalogEntry::Universe { table_id, title } => {
            table_mut(catalog, &table_id, line)?.append_comment(&title);
        },
        CatalogEntry::Data {
            table_id,
            line_number,
            title,
        } => {
            table_mut(catalog, &table_id, line)?
                .push_data_column(ColumnDef::data(&line_number, title));
        },
        CatalogEntry::Excluded => catalog.excluded_rows += 1,
    }

    Ok(())
}

fn table_mut<'a>(catalog: &'a mut Catalog, table_id: &str, line: u64) -> Result<&'a mut TableSchema> {
    catalog
        .tables
        .get_mut(table_id)
        .ok_or_else(|| IngestError::CatalogOrdering {
            table_id: table_id.to_string(),
            line,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;

    fn row(table_id: &str, line_number: &str, start: &str, cells: &str, title: &str) -> CatalogRow {
        CatalogRow {
            table_id: table_id.to_string(),
            sequence_number: "0002".to_string(),
            line_number: line_number.to_string(),
            start_position: start.to_string(),
            total_cells_text: cells.to_string(),
            table_title: title.to_string(),
        }
    }

    #[test]
    fn test_classify_header() {
        let entry = row("B01001", "", "7", "49 CELLS", "SEX BY AGE").classify().unwrap();
        assert_eq!(
            entry,
            CatalogEntry::Header {
                table_id: "B01001".to_string(),
                sequence_number: "0002".to_string(),
                start_index: 6,
                cell_count: 49,
                title: "SEX BY AGE".to_string(),
            }
        );
    }

    #[test]
    fn test_classify_universe_and_data() {
        let universe = row("B01001", " ", "", "", "Universe: Total population").classify();
        assert!(matches!(universe, Ok(CatalogEntry::Universe { .. })));

        let data = row("B01001", "3", "", "", "Under 5 years").classify();
        assert!(matches!(
            data,
            Ok(CatalogEntry::Data { ref line_number, .. }) if line_number == "3"
        ));
    }

    #[test]
    fn test_classify_half_line_is_excluded() {
        let entry = row("B08126", "0.5", "", "", "Universe subtotal").classify().unwrap();
        assert_eq!(entry, CatalogEntry::Excluded);
    }

    #[test]
    fn test_zero_start_position_is_not_a_header() {
        let entry = row("B01001", "", "0", "1 CELL", "Odd").classify().unwrap();
        assert_eq!(entry, CatalogEntry::Excluded);
    }

    #[test]
    fn test_header_without_cell_digits_fails() {
        let err = row("B01001", "", "7", "CELLS", "SEX BY AGE").classify().unwrap_err();
        assert!(err.contains("CELLS"));
    }

    #[test]
    fn test_header_with_overflowing_range_fails() {
        let start = usize::MAX.to_string();
        let err = row("B01001", "", &start, "2 CELLS", "X").classify().unwrap_err();
        assert!(err.contains("overflows"));

        let content = format!(
            "Table ID,Sequence Number,Line Number,Start Position,Total Cells in Table,Table Title\n\
             B01001,0002,,{},2 CELLS,X\n",
            start
        );
        let err = CatalogParser::new(UTF_8).parse_str(&content).unwrap_err();
        assert!(matches!(err, IngestError::Catalog { line: 2, .. }));
    }

    #[test]
    fn test_huge_cell_count_is_not_preallocated() {
        let catalog = CatalogParser::new(UTF_8)
            .parse_str(
                "Table ID,Sequence Number,Line Number,Start Position,Total Cells in Table,Table Title\n\
                 B01001,0002,,7,4000000000 CELLS,X\n\
                 B01001,0002,1,,,Total:\n",
            )
            .unwrap();
        let schema = catalog.get("B01001").unwrap();
        assert_eq!(schema.cell_count, 4_000_000_000);
        assert_eq!(schema.columns.len(), 3);
        assert!(!schema.is_complete());
    }

    #[test]
    fn test_cell_count_digits_only() {
        assert_eq!(parse_cell_count("2 Cells").unwrap(), 2);
        assert_eq!(parse_cell_count(" 1 0 CELLS").unwrap(), 10);
    }

    #[test]
    fn test_body_before_header_is_fatal() {
        let content = "Table ID,Sequence Number,Line Number,Start Position,Total Cells in Table,Table Title\n\
                       B01001,0002,1,,,Total:\n";
        let err = CatalogParser::new(UTF_8).parse_str(content).unwrap_err();
        match err {
            IngestError::CatalogOrdering { table_id, line } => {
                assert_eq!(table_id, "B01001");
                assert_eq!(line, 2);
            },
            other => panic!("unexpected error: {other}"),
        }
    }
}
