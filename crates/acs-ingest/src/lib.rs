//! ACS Summary File Loader
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Loads an American Community Survey summary file release into PostgreSQL:
//! one schema per release, one table per catalog table and variant, every
//! table and column commented with its Census title.
//!
//! # Stages
//!
//! - [`catalog`]: parse the sequence/table number lookup into [`catalog::TableSchema`]s
//! - [`variant`]: expand each schema into its estimate and margin-of-error tables
//! - [`sequence`]: pull a table's fields out of every region/partition sequence file
//! - [`storage`]: create, bulk insert and comment each table
//!
//! # Example
//!
//! ```no_run
//! use acs_ingest::{AcsPipeline, DatabaseConfig, IngestConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::new(2015, 5, vec!["CA".to_string()]).with_data_dir("./data/ACS");
//!     let db = DatabaseConfig::new("postgres://postgres@localhost/census").connect().await?;
//!
//!     let stats = AcsPipeline::new(config, db).run().await?;
//!     println!("{} rows", stats.rows);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod regions;
pub mod scrub;
pub mod sequence;
pub mod storage;
pub mod variant;

pub use config::{DatabaseConfig, IngestConfig};
pub use error::{IngestError, Result};
pub use pipeline::{load_catalog, AcsPipeline, PipelineStats};
