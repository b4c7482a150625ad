//! Shared fixtures: a miniature unpacked release on disk

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use acs_ingest::sequence::{Partition, ReleaseLayout};
use acs_ingest::variant::Variant;
use acs_ingest::IngestConfig;
use encoding_rs::WINDOWS_1252;
use tempfile::TempDir;

pub const YEAR: u16 = 2015;
pub const SPAN: u8 = 5;
pub const SEQUENCE: &str = "0002";
pub const ROWS_PER_FILE: usize = 3;

/// Two tables sharing sequence 0002: B01001 at fields 6..8, B01002 at field 8
pub const LOOKUP: &str = "\
Table ID,Sequence Number,Line Number,Start Position,Total Cells in Table,Table Title
B01001,0002,,7,2 CELLS,SEX BY AGE
B01001,0002,,,,Universe:  Total population
B01001,0002,0.5,,,Not materialized
B01001,0002,1,,,Total:
B01001,0002,2,,,Householder\u{2019}s 50% share
B01002,0002,,9,1 CELL,MEDIAN AGE BY SEX
B01002,0002,,,,Universe:  Total population
B01002,0002,1,,,Median age --
";

pub const REGIONS: &str = "\
Abbreviation,State,FIPS Code
CA,California,06
NY,New York,36
";

pub struct Release {
    pub dir: TempDir,
}

impl Release {
    /// Lookup catalog, region catalog and sequence files for `regions`
    pub fn new(regions: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();

        let (lookup, _, unmappable) = WINDOWS_1252.encode(LOOKUP);
        assert!(!unmappable);
        fs::write(dir.path().join("lookup.txt"), lookup).unwrap();
        fs::write(dir.path().join("census_states.csv"), REGIONS).unwrap();

        let release = Self { dir };
        for region in regions {
            for (p, partition) in Partition::ALL.iter().enumerate() {
                for variant in Variant::ALL {
                    let rows: Vec<String> = (0..ROWS_PER_FILE)
                        .map(|i| sequence_row(variant, region, p * 100 + i + 1, i))
                        .collect();
                    release.write_sequence(variant, region, *partition, &rows);
                }
            }
        }
        release
    }

    pub fn data_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> ReleaseLayout {
        ReleaseLayout::new(self.data_dir(), YEAR, SPAN)
    }

    pub fn sequence_path(&self, variant: Variant, region: &str, partition: Partition) -> PathBuf {
        use acs_ingest::sequence::SequenceLocator;
        self.layout().locate(variant, region, SEQUENCE, partition)
    }

    pub fn write_sequence(&self, variant: Variant, region: &str, partition: Partition, rows: &[String]) {
        let path = self.sequence_path(variant, region, partition);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut content = rows.join("\n");
        content.push('\n');
        fs::write(path, content).unwrap();
    }

    pub fn config(&self, regions: &[&str]) -> IngestConfig {
        IngestConfig::new(YEAR, SPAN, regions.iter().map(|r| r.to_string()).collect())
            .with_data_dir(self.data_dir())
            .with_lookup_file(self.data_dir().join("lookup.txt"))
            .with_region_catalog(self.data_dir().join("census_states.csv"))
    }
}

/// `FILEID,FILETYPE,STUSAB,CHARITER,SEQUENCE,LOGRECNO,cell,cell,cell`
///
/// Row 0 suppresses its second cell ("."), row 1 leaves its third cell empty.
pub fn sequence_row(variant: Variant, region: &str, logrecno: usize, row: usize) -> String {
    let first = match variant {
        Variant::Standard => ((row + 1) * 10).to_string(),
        Variant::MarginOfError => "-222222222".to_string(),
    };
    let second = if row == 0 { "." } else { "5" };
    let third = if row == 1 { "" } else { "7" };

    format!(
        "ACSSF,{}{}{},{},000,{},{:07},{},{},{}",
        YEAR,
        variant.file_char(),
        SPAN,
        region.to_lowercase(),
        SEQUENCE,
        logrecno,
        first,
        second,
        third
    )
}
