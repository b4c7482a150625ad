//! Sequence file extraction
//!
//! A release ships every sequence once per region and geography partition,
//! e.g. `e20155ca0002000.txt` under `tracts_block_groups_only/`. Rows carry
//! no header; fields 2 and 5 are the state abbreviation and logical record
//! number, the remaining fields are the cells of every table in the sequence.
//!
//! [`SequenceExtractor`] walks every region × partition file for one table
//! variant, picks the table's fields, scrubs sentinels, and accumulates the
//! whole batch in memory for a single bulk insert.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::KEY_COLUMN_COUNT;
use crate::error::{IngestError, Result};
use crate::scrub::{CellValue, ScrubMap};
use crate::variant::{Variant, VariantSchema};

/// Geography groupings the Census Bureau publishes sequence files under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    TractsBlockGroups,
    AllOtherGeographies,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::TractsBlockGroups, Partition::AllOtherGeographies];

    /// Name used in the release archives
    pub fn archive_name(self) -> &'static str {
        match self {
            Partition::TractsBlockGroups => "Tracts_Block_Groups_Only",
            Partition::AllOtherGeographies => "All_Geographies_Not_Tracts_Block_Groups",
        }
    }

    /// Directory the archive is unpacked into, below the data directory
    pub fn dir_name(self) -> String {
        self.archive_name().to_lowercase()
    }
}

/// Resolves where the sequence file for a variant/region/sequence lives
pub trait SequenceLocator: Send + Sync {
    fn locate(&self, variant: Variant, region: &str, sequence: &str, partition: Partition) -> PathBuf;
}

/// On-disk layout of an unpacked release
#[derive(Debug, Clone)]
pub struct ReleaseLayout {
    pub data_dir: PathBuf,
    pub year: u16,
    pub span: u8,
}

impl ReleaseLayout {
    pub fn new(data_dir: impl Into<PathBuf>, year: u16, span: u8) -> Self {
        Self {
            data_dir: data_dir.into(),
            year,
            span,
        }
    }

    /// `{e|m}{year}{span}{region}{sequence}000.txt`
    pub fn file_name(&self, variant: Variant, region: &str, sequence: &str) -> String {
        format!(
            "{}{}{}{}{}000.txt",
            variant.file_char(),
            self.year,
            self.span,
            region.to_lowercase(),
            sequence
        )
    }
}

impl SequenceLocator for ReleaseLayout {
    fn locate(&self, variant: Variant, region: &str, sequence: &str, partition: Partition) -> PathBuf {
        self.data_dir
            .join(partition.dir_name())
            .join(self.file_name(variant, region, sequence))
    }
}

/// One sequence row reduced to a table's fields, in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    values: Vec<CellValue>,
}

impl ExtractedRecord {
    pub fn new(values: Vec<CellValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    /// Pair values with their column names
    pub fn fields<'a>(
        &'a self,
        schema: &'a VariantSchema,
    ) -> impl Iterator<Item = (&'a str, &'a CellValue)> + 'a {
        schema
            .schema
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .zip(self.values.iter())
    }

    pub fn get<'a>(&'a self, schema: &'a VariantSchema, column: &str) -> Option<&'a CellValue> {
        self.fields(schema)
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }
}

/// Reads and scrubs every shard of a table variant into memory
pub struct SequenceExtractor<'a> {
    regions: &'a [String],
    partitions: &'a [Partition],
    scrub: &'a ScrubMap,
    locator: &'a dyn SequenceLocator,
    strict_tokens: bool,
}

impl<'a> SequenceExtractor<'a> {
    pub fn new(
        regions: &'a [String],
        partitions: &'a [Partition],
        scrub: &'a ScrubMap,
        locator: &'a dyn SequenceLocator,
    ) -> Self {
        Self {
            regions,
            partitions,
            scrub,
            locator,
            strict_tokens: false,
        }
    }

    /// Reject data tokens that neither scrub nor parse as a number
    pub fn with_strict_tokens(mut self, strict: bool) -> Self {
        self.strict_tokens = strict;
        self
    }

    /// Extract the full batch for a variant
    ///
    /// `indices` must line up with the variant's columns (see
    /// [`VariantSchema::field_indices`]). Records come back in read order:
    /// regions in the order given, partitions within each region.
    pub fn extract(&self, variant: &VariantSchema, indices: &[usize]) -> Result<Vec<ExtractedRecord>> {
        let columns = &variant.schema.columns;
        if columns.len() != indices.len() {
            return Err(IngestError::SchemaMismatch {
                table: variant.name().to_string(),
                columns: columns.len(),
                indices: indices.len(),
            });
        }

        let mut batch = Vec::new();
        let mut passed_through = 0usize;

        for region in self.regions {
            for &partition in self.partitions {
                let path = self.locator.locate(
                    variant.variant,
                    region,
                    &variant.schema.sequence_number,
                    partition,
                );
                let before = batch.len();
                passed_through += self.read_file(&path, variant, indices, &mut batch)?;
                debug!(
                    table = %variant.name(),
                    region = %region,
                    path = %path.display(),
                    rows = batch.len() - before,
                    "Read sequence file"
                );
            }
        }

        if passed_through > 0 {
            debug!(
                table = %variant.name(),
                tokens = passed_through,
                "Non-numeric data tokens passed through unscrubbed"
            );
        }

        info!(table = %variant.name(), rows = batch.len(), "Extracted table variant");
        Ok(batch)
    }

    /// Append every row of one file to `batch`, returning the pass-through count
    fn read_file(
        &self,
        path: &Path,
        variant: &VariantSchema,
        indices: &[usize],
        batch: &mut Vec<ExtractedRecord>,
    ) -> Result<usize> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => IngestError::MissingSequenceFile(path.to_path_buf()),
            _ => IngestError::io(path, e),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut record = csv::StringRecord::new();
        let mut passed_through = 0;

        while reader
            .read_record(&mut record)
            .map_err(|e| IngestError::csv(path, e))?
        {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let mut values = Vec::with_capacity(indices.len());

            for (ordinal, &index) in indices.iter().enumerate() {
                let token = record.get(index).ok_or_else(|| IngestError::ShortRow {
                    path: path.to_path_buf(),
                    line,
                    index,
                    found: record.len(),
                })?;

                let value = match self.scrub.lookup(token) {
                    Some(value) => value.clone(),
                    None => {
                        if ordinal >= KEY_COLUMN_COUNT && !is_numeric(token) {
                            if self.strict_tokens {
                                return Err(IngestError::UnexpectedToken {
                                    path: path.to_path_buf(),
                                    line,
                                    column: variant.schema.columns[ordinal].name.clone(),
                                    token: token.to_string(),
                                });
                            }
                            passed_through += 1;
                        }
                        CellValue::Text(token.to_string())
                    },
                };
                values.push(value);
            }

            batch.push(ExtractedRecord::new(values));
        }

        Ok(passed_through)
    }
}

fn is_numeric(token: &str) -> bool {
    token.trim().parse::<f64>().is_ok()
}
