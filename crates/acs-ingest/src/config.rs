//! Run configuration
//!
//! Everything a load needs is carried in explicit values handed to the
//! pipeline: which release, which regions, where the files are, and how to
//! reach PostgreSQL.

use std::path::PathBuf;
use std::time::Duration;

use acs_common::encoding::{resolve_encoding, CATALOG_ENCODING_LABEL};
use acs_common::AcsError;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::Result;
use crate::sequence::ReleaseLayout;
use crate::storage::namespace_for;

// ============================================================================
// Defaults
// ============================================================================

/// Default data directory for unpacked releases
pub const DEFAULT_DATA_DIR: &str = "./data/ACS";

/// Default region catalog file
pub const DEFAULT_REGION_CATALOG: &str = "census_states.csv";

/// Default release span in years
pub const DEFAULT_SPAN: u8 = 5;

/// Spans the ACS is published in
pub const VALID_SPANS: [u8; 3] = [1, 3, 5];

/// First ACS release year
pub const FIRST_RELEASE_YEAR: u16 = 2005;

pub const DEFAULT_DATABASE_HOST: &str = "localhost";
pub const DEFAULT_DATABASE_USER: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "census";

/// The load is sequential, one connection is busy at a time
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 2;

pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Lookup file name the Census Bureau uses for a span
pub fn default_lookup_file_name(span: u8) -> String {
    format!("ACS_{}yr_Seq_Table_Number_Lookup.txt", span)
}

// ============================================================================
// Ingest Configuration
// ============================================================================

/// What to load and where the release files are
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Final year of the release (e.g. 2015)
    pub year: u16,

    /// Years covered: 1, 3 or 5
    pub span: u8,

    /// Region abbreviations to load
    pub regions: Vec<String>,

    /// Root holding the partition directories and the lookup file
    pub data_dir: PathBuf,

    /// Lookup catalog; defaults to the Census file name inside `data_dir`
    pub lookup_file: Option<PathBuf>,

    /// Region name/FIPS catalog
    pub region_catalog: PathBuf,

    /// Encoding label of the lookup catalog
    pub catalog_encoding: String,

    /// Fail on unscrubbed, non-numeric data tokens instead of storing them
    pub strict_tokens: bool,
}

impl IngestConfig {
    pub fn new(year: u16, span: u8, regions: Vec<String>) -> Self {
        Self {
            year,
            span,
            regions,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            lookup_file: None,
            region_catalog: PathBuf::from(DEFAULT_REGION_CATALOG),
            catalog_encoding: CATALOG_ENCODING_LABEL.to_string(),
            strict_tokens: false,
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_lookup_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.lookup_file = Some(path.into());
        self
    }

    pub fn with_region_catalog(mut self, path: impl Into<PathBuf>) -> Self {
        self.region_catalog = path.into();
        self
    }

    pub fn with_catalog_encoding(mut self, label: impl Into<String>) -> Self {
        self.catalog_encoding = label.into();
        self
    }

    pub fn with_strict_tokens(mut self, strict: bool) -> Self {
        self.strict_tokens = strict;
        self
    }

    /// Database schema the release is loaded into
    pub fn namespace(&self) -> String {
        namespace_for(self.year, self.span)
    }

    pub fn lookup_path(&self) -> PathBuf {
        self.lookup_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(default_lookup_file_name(self.span)))
    }

    pub fn catalog_encoding(&self) -> Result<&'static Encoding> {
        Ok(resolve_encoding(Some(self.catalog_encoding.as_str()))?)
    }

    pub fn layout(&self) -> ReleaseLayout {
        ReleaseLayout::new(self.data_dir.clone(), self.year, self.span)
    }

    /// Validate everything a load needs (regions are checked against the catalog later)
    pub fn validate(&self) -> Result<()> {
        self.validate_release()?;

        if self.regions.is_empty() {
            return Err(AcsError::config("At least one region is required").into());
        }

        Ok(())
    }

    /// Validate the release description alone, enough to read the lookup catalog
    pub fn validate_release(&self) -> Result<()> {
        if !VALID_SPANS.contains(&self.span) {
            return Err(AcsError::config(format!(
                "Span must be one of {:?}, got {}",
                VALID_SPANS, self.span
            ))
            .into());
        }

        if self.year < FIRST_RELEASE_YEAR {
            return Err(AcsError::config(format!(
                "Year {} predates the first ACS release ({})",
                self.year, FIRST_RELEASE_YEAR
            ))
            .into());
        }

        self.catalog_encoding()?;

        Ok(())
    }
}

// ============================================================================
// Database Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
        }
    }

    /// Build a URL from connection parts
    pub fn from_parts(host: &str, user: &str, password: &str, dbname: &str) -> Self {
        Self::new(format!("postgres://{}:{}@{}/{}", user, password, host, dbname))
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(AcsError::config("Database URL cannot be empty").into());
        }
        if self.max_connections == 0 {
            return Err(AcsError::config("Database max_connections must be greater than 0").into());
        }
        Ok(())
    }

    pub async fn connect(&self) -> Result<PgPool> {
        self.validate()?;

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .connect(&self.url)
            .await?;

        Ok(pool)
    }
}
