// ACS Load Pipeline
//
// Orchestrates one full load of a release:
// 1. Region catalog -> validated region selection + ScrubMap
// 2. Lookup catalog -> one TableSchema per table
// 3. Per table, per variant: extract every region/partition shard into memory,
//    then create + bulk insert + comment in one transaction
//
// Tables are processed strictly one after another; nothing is spawned.

use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, info_span, Instrument};

use crate::catalog::{Catalog, CatalogParser};
use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::regions::RegionCatalog;
use crate::scrub::ScrubMap;
use crate::sequence::{Partition, SequenceExtractor};
use crate::storage::{drop_and_create_namespace, RelationalLoader};
use crate::variant::expand;

/// Totals for a completed load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub tables: usize,
    pub variants: usize,
    pub rows: u64,
}

/// Parse the lookup catalog named by the configuration
pub fn load_catalog(config: &IngestConfig) -> Result<Catalog> {
    CatalogParser::new(config.catalog_encoding()?).parse_path(&config.lookup_path())
}

pub struct AcsPipeline {
    config: IngestConfig,
    db: PgPool,
}

impl AcsPipeline {
    pub fn new(config: IngestConfig, db: PgPool) -> Self {
        Self { config, db }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Recreate the release schema, then load every table into it
    pub async fn run(&self) -> Result<PipelineStats> {
        self.config.validate()?;
        drop_and_create_namespace(&self.db, &self.config.namespace()).await?;
        self.load_tables().await
    }

    /// Load every table into the existing (freshly created) release schema
    ///
    /// Fails with a duplicate-table error if any table is already present.
    pub async fn load_tables(&self) -> Result<PipelineStats> {
        self.config.validate()?;

        let regions = RegionCatalog::from_path(&self.config.region_catalog)?;
        let selected = regions.select(&self.config.regions)?;
        let scrub = ScrubMap::from_regions(&regions);
        let catalog = load_catalog(&self.config)?;

        info!(
            schema = %self.config.namespace(),
            tables = catalog.len(),
            regions = ?selected,
            "Building ACS tables, this will take a while"
        );

        let layout = self.config.layout();
        let extractor = SequenceExtractor::new(&selected, &Partition::ALL, &scrub, &layout)
            .with_strict_tokens(self.config.strict_tokens);
        let loader = RelationalLoader::new(self.db.clone(), self.config.namespace());

        let mut stats = PipelineStats::default();

        for schema in catalog.into_tables() {
            let span = info_span!("table", id = %schema.table_id);

            async {
                for variant in expand(schema) {
                    let indices = variant.field_indices()?;
                    let batch = extractor.extract(&variant, &indices)?;
                    stats.rows += loader.load(&variant, &batch).await?;
                    stats.variants += 1;
                }
                Ok::<_, IngestError>(())
            }
            .instrument(span)
            .await?;

            stats.tables += 1;
        }

        info!(
            tables = stats.tables,
            variants = stats.variants,
            rows = stats.rows,
            "Load complete"
        );

        Ok(stats)
    }
}
