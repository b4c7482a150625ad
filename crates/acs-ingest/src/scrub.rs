//! Sentinel normalization for sequence file tokens

use std::collections::HashMap;

use crate::regions::RegionCatalog;

/// A normalized cell as it will be bound into the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Raw or translated text
    Text(String),
    /// Empty field, stored as NULL
    Null,
    /// Suppressed value ("."), stored as 0
    Zero,
}

impl CellValue {
    /// Text handed to PostgreSQL, `None` meaning NULL
    pub fn as_sql_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text.as_str()),
            CellValue::Null => None,
            CellValue::Zero => Some("0"),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// Raw token -> normalized value lookup, built once per run and shared read-only
///
/// Region names (lowercased, underscores for spaces) and lowercase
/// abbreviations map to the upper-case abbreviation, `""` maps to NULL and
/// `"."` to zero. Tokens with no entry are not touched.
#[derive(Debug, Clone)]
pub struct ScrubMap {
    tokens: HashMap<String, CellValue>,
}

impl ScrubMap {
    /// Only the two sentinel tokens, no regions
    pub fn new() -> Self {
        let mut tokens = HashMap::new();
        tokens.insert(String::new(), CellValue::Null);
        tokens.insert(".".to_string(), CellValue::Zero);
        Self { tokens }
    }

    pub fn from_regions(regions: &RegionCatalog) -> Self {
        let mut map = Self::new();
        for region in regions.iter() {
            map.insert_region(&region.abbreviation, &region.file_name());
        }
        map
    }

    pub fn insert_region(&mut self, abbreviation: &str, name: &str) {
        let value = CellValue::Text(abbreviation.to_uppercase());
        self.tokens
            .insert(name.replace(' ', "_").to_lowercase(), value.clone());
        self.tokens.insert(abbreviation.to_lowercase(), value);
    }

    /// Translation for a token, if it has one
    ///
    /// Matching is exact first, then case-insensitive for tokens that carry
    /// upper-case letters.
    pub fn lookup(&self, token: &str) -> Option<&CellValue> {
        self.tokens.get(token).or_else(|| {
            if token.bytes().any(|b| b.is_ascii_uppercase()) {
                self.tokens.get(&token.to_ascii_lowercase())
            } else {
                None
            }
        })
    }

    /// Translate a token, passing unknown tokens through verbatim
    pub fn scrub(&self, token: &str) -> CellValue {
        self.lookup(token)
            .cloned()
            .unwrap_or_else(|| CellValue::Text(token.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for ScrubMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::regions::Region;

    fn regions() -> RegionCatalog {
        RegionCatalog::from_regions(vec![
            Region {
                abbreviation: "NY".to_string(),
                name: "New York".to_string(),
                fips: "36".to_string(),
            },
            Region {
                abbreviation: "CA".to_string(),
                name: "California".to_string(),
                fips: "06".to_string(),
            },
        ])
    }

    #[test]
    fn test_sentinels() {
        let map = ScrubMap::new();
        assert_eq!(map.scrub(""), CellValue::Null);
        assert_eq!(map.scrub("."), CellValue::Zero);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_region_names_map_to_abbreviation() {
        let map = ScrubMap::from_regions(&regions());

        for token in ["new_york", "New_York", "NEW_YORK"] {
            assert_eq!(map.scrub(token), CellValue::Text("NY".to_string()));
        }
        assert_eq!(map.scrub("california"), CellValue::Text("CA".to_string()));
        assert_eq!(map.scrub("ca"), CellValue::Text("CA".to_string()));
    }

    #[test]
    fn test_unknown_tokens_pass_through() {
        let map = ScrubMap::from_regions(&regions());
        assert_eq!(map.scrub("1234"), CellValue::Text("1234".to_string()));
        assert_eq!(map.scrub("*****"), CellValue::Text("*****".to_string()));
        assert!(map.lookup("Texas").is_none());
    }

    #[test]
    fn test_sql_text() {
        assert_eq!(CellValue::Zero.as_sql_text(), Some("0"));
        assert_eq!(CellValue::Null.as_sql_text(), None);
        assert!(CellValue::Null.is_null());
        assert_eq!(CellValue::Text("7".to_string()).as_sql_text(), Some("7"));
    }
}
