//! Region catalog
//!
//! Maps state postal abbreviations to their full names and FIPS codes, read
//! from a small delimited file:
//!
//! ```text
//! Abbreviation,State,FIPS Code
//! AL,Alabama,01
//! DC,District of Columbia,11
//! ```

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Region {
    #[serde(rename = "Abbreviation")]
    pub abbreviation: String,

    #[serde(rename = "State")]
    pub name: String,

    #[serde(rename = "FIPS Code")]
    pub fips: String,
}

impl Region {
    /// Full name as the Census Bureau spells it in file names ("New_York")
    pub fn file_name(&self) -> String {
        self.name.replace(' ', "_")
    }
}

/// All known regions keyed by upper-case abbreviation
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: BTreeMap<String, Region>,
}

impl RegionCatalog {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| IngestError::io(path, e))?;
        Self::from_reader(file).map_err(|e| match e {
            IngestError::Csv { source, .. } => IngestError::csv(path, source),
            other => other,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut regions = BTreeMap::new();
        for result in reader.deserialize::<Region>() {
            let mut region = result.map_err(|e| IngestError::csv("<regions>", e))?;
            region.abbreviation = region.abbreviation.to_uppercase();
            regions.insert(region.abbreviation.clone(), region);
        }

        debug!(regions = regions.len(), "Loaded region catalog");
        Ok(Self { regions })
    }

    pub fn from_regions(regions: impl IntoIterator<Item = Region>) -> Self {
        Self {
            regions: regions
                .into_iter()
                .map(|r| (r.abbreviation.to_uppercase(), r))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, abbreviation: &str) -> Option<&Region> {
        self.regions.get(&abbreviation.to_uppercase())
    }

    /// Full name with spaces replaced by underscores
    pub fn name(&self, abbreviation: &str) -> Option<String> {
        self.get(abbreviation).map(Region::file_name)
    }

    pub fn fips(&self, abbreviation: &str) -> Option<&str> {
        self.get(abbreviation).map(|r| r.fips.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Normalize requested abbreviations, rejecting any the catalog does not know
    pub fn select(&self, requested: &[String]) -> Result<Vec<String>> {
        requested
            .iter()
            .map(|abbreviation| {
                self.get(abbreviation)
                    .map(|r| r.abbreviation.clone())
                    .ok_or_else(|| IngestError::UnknownRegion(abbreviation.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const REGIONS: &str = "Abbreviation,State,FIPS Code\n\
                           AL,Alabama,01\n\
                           NY,New York,36\n\
                           dc, District of Columbia ,11\n";

    #[test]
    fn test_lookup_by_abbreviation() {
        let catalog = RegionCatalog::from_reader(REGIONS.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.name("ny").as_deref(), Some("New_York"));
        assert_eq!(catalog.fips("AL"), Some("01"));
        assert_eq!(catalog.name("DC").as_deref(), Some("District_of_Columbia"));
        assert!(catalog.get("ZZ").is_none());
    }

    #[test]
    fn test_select_normalizes_case() {
        let catalog = RegionCatalog::from_reader(REGIONS.as_bytes()).unwrap();
        let selected = catalog.select(&["al".to_string(), "NY".to_string()]).unwrap();
        assert_eq!(selected, vec!["AL", "NY"]);
    }

    #[test]
    fn test_select_unknown_region() {
        let catalog = RegionCatalog::from_reader(REGIONS.as_bytes()).unwrap();
        let err = catalog.select(&["PR".to_string()]).unwrap_err();
        assert!(matches!(err, IngestError::UnknownRegion(ref r) if r == "PR"));
    }
}
