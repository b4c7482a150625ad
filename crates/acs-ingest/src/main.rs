//! ACS Ingest - Main entry point

use std::path::PathBuf;
use std::process;

use acs_common::logging::{init_logging, LogConfig, LogLevel};
use acs_ingest::config::{
    DEFAULT_DATABASE_HOST, DEFAULT_DATABASE_NAME, DEFAULT_DATABASE_USER, DEFAULT_DATA_DIR,
    DEFAULT_REGION_CATALOG, DEFAULT_SPAN,
};
use acs_ingest::{load_catalog, AcsPipeline, DatabaseConfig, IngestConfig};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "acs-ingest")]
#[command(about = "Load American Community Survey summary files into PostgreSQL")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recreate the release schema and load every table into it
    Load {
        /// Region abbreviations to load
        #[arg(short, long = "states", num_args = 1.., required = true)]
        states: Vec<String>,

        #[command(flatten)]
        release: ReleaseArgs,

        #[command(flatten)]
        database: DatabaseArgs,
    },

    /// Parse the lookup catalog and report what would be loaded
    Inspect {
        #[command(flatten)]
        release: ReleaseArgs,

        /// Show the columns of one table (e.g. B01001)
        #[arg(long)]
        table: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ReleaseArgs {
    /// Final year of the release
    #[arg(long, env = "ACS_YEAR")]
    year: u16,

    /// Years covered by the release (1, 3 or 5)
    #[arg(long, env = "ACS_SPAN", default_value_t = DEFAULT_SPAN)]
    span: u8,

    /// Directory holding the unpacked release
    #[arg(long, env = "ACS_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Lookup catalog (defaults to the Census file name inside the data directory)
    #[arg(long)]
    lookup_file: Option<PathBuf>,

    /// Region name/FIPS catalog
    #[arg(long, env = "ACS_REGION_CATALOG", default_value = DEFAULT_REGION_CATALOG)]
    region_catalog: PathBuf,

    /// Encoding of the lookup catalog
    #[arg(long)]
    catalog_encoding: Option<String>,

    /// Fail on non-numeric data tokens instead of storing them as text
    #[arg(long)]
    strict_tokens: bool,
}

impl ReleaseArgs {
    fn into_config(self, regions: Vec<String>) -> IngestConfig {
        let mut config = IngestConfig::new(self.year, self.span, regions)
            .with_data_dir(self.data_dir)
            .with_region_catalog(self.region_catalog)
            .with_strict_tokens(self.strict_tokens);

        if let Some(path) = self.lookup_file {
            config = config.with_lookup_file(path);
        }
        if let Some(label) = self.catalog_encoding {
            config = config.with_catalog_encoding(label);
        }
        config
    }
}

#[derive(Args, Debug)]
struct DatabaseArgs {
    /// Full connection URL, overrides the individual parts below
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "PGHOST", default_value = DEFAULT_DATABASE_HOST)]
    host: String,

    #[arg(long, env = "PGUSER", default_value = DEFAULT_DATABASE_USER)]
    user: String,

    #[arg(long, env = "PGPASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    #[arg(long, env = "PGDATABASE", default_value = DEFAULT_DATABASE_NAME)]
    dbname: String,
}

impl DatabaseArgs {
    fn into_config(self) -> DatabaseConfig {
        match self.database_url {
            Some(url) => DatabaseConfig::new(url),
            None => DatabaseConfig::from_parts(&self.host, &self.user, &self.password, &self.dbname),
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_config = log_config(cli.verbose);
    let _guard = match init_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            None
        },
    };

    if let Err(e) = execute_command(cli.command).await {
        error!(error = %format!("{:#}", e), "Command failed");
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Logging for the flags given, with `LOG_*` variables taking precedence
fn log_config(verbose: bool) -> LogConfig {
    let level = if verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let config = LogConfig::builder()
        .level(level)
        .log_file_prefix("acs-ingest")
        .build();

    config.clone().merge_env().unwrap_or_else(|e| {
        eprintln!("Ignoring invalid logging environment: {:#}", e);
        config
    })
}

async fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Load {
            states,
            release,
            database,
        } => load(release.into_config(states), database).await,
        Commands::Inspect { release, table } => {
            inspect(release.into_config(Vec::new()), table.as_deref())
        },
    }
}

async fn load(config: IngestConfig, database: DatabaseArgs) -> Result<()> {
    config.validate()?;

    let db = database
        .into_config()
        .connect()
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!(schema = %config.namespace(), "Connected to database");

    let stats = AcsPipeline::new(config, db).run().await?;
    info!(stats = %serde_json::to_string(&stats)?, "Finished");

    Ok(())
}

fn inspect(config: IngestConfig, table: Option<&str>) -> Result<()> {
    config.validate_release()?;

    let catalog = load_catalog(&config)
        .with_context(|| format!("Failed to read {}", config.lookup_path().display()))?;

    info!(
        schema = %config.namespace(),
        tables = catalog.len(),
        physical_tables = catalog.len() * 2,
        columns = catalog.total_columns(),
        excluded_rows = catalog.excluded_rows,
        "Parsed lookup catalog"
    );

    for schema in catalog.tables.values().filter(|s| !s.is_complete()) {
        info!(
            table = %schema.table_id,
            announced = schema.cell_count,
            found = schema.data_columns().len(),
            "Cell count does not match catalog lines"
        );
    }

    if let Some(table_id) = table {
        let schema = catalog
            .get(&table_id.to_uppercase())
            .with_context(|| format!("Table {} is not in the catalog", table_id))?;

        info!(
            table = %schema.table_id,
            sequence = %schema.sequence_number,
            start = schema.start_index,
            cells = schema.cell_count,
            comment = %schema.comment,
            "Table"
        );
        for column in &schema.columns {
            info!(
                column = %column.name,
                sql_type = column.column_type.sql_type(),
                documentation = %column.documentation,
                "Column"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_inspect_needs_no_states() {
        let cli = Cli::try_parse_from(["acs-ingest", "inspect", "--year", "2015"]).unwrap();
        match cli.command {
            Commands::Inspect { release, table } => {
                assert!(table.is_none());
                let config = release.into_config(Vec::new());
                assert!(config.regions.is_empty());
                assert!(config.validate_release().is_ok());
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_load_requires_states() {
        assert!(Cli::try_parse_from(["acs-ingest", "load", "--year", "2015"]).is_err());

        let cli = Cli::try_parse_from(["acs-ingest", "load", "--year", "2015", "-s", "CA", "ny"])
            .unwrap();
        match cli.command {
            Commands::Load { states, .. } => assert_eq!(states, vec!["CA", "ny"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_bad_logging_environment_keeps_flags() {
        std::env::set_var("LOG_OUTPUT", "syslog");
        let config = log_config(true);
        std::env::remove_var("LOG_OUTPUT");

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.log_file_prefix, "acs-ingest");
    }
}
