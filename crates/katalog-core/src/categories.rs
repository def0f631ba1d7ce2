//! The closed set of canonical category labels.
//!
//! Anything outside this set (and non-empty) lands in the catch-all
//! [`CATCH_ALL_CATEGORY`] bucket when filtering.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Filter keyword selecting every category outside the known set.
pub const CATCH_ALL_CATEGORY: &str = "ostalo";

/// Category whose products are repriced during normalization.
pub const MONITOR_CATEGORY: &str = "Monitori";

const BUILTIN_CATEGORIES: [&str; 7] = [
    MONITOR_CATEGORY,
    "Toneri i potrošni materijal",
    "Mobilni/Fiksni telefoni i tableti",
    "Slušalice",
    "Torbe i rančevi",
    "Štampači",
    "Električni trotineti",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    labels: Vec<String>,
    folded: HashSet<String>,
}

impl CategorySet {
    /// Builds a validated set from canonical labels.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for blank labels, case-insensitive
    /// duplicates, or the catch-all keyword itself.
    pub fn new<I, S>(labels: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self {
            labels: Vec::new(),
            folded: HashSet::new(),
        };

        for label in labels {
            let label: String = label.into();
            let trimmed = label.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Validation(
                    "category label must be non-empty".to_string(),
                ));
            }

            let folded = trimmed.to_lowercase();
            if folded == CATCH_ALL_CATEGORY {
                return Err(ConfigError::Validation(format!(
                    "'{trimmed}' is reserved for the catch-all filter"
                )));
            }
            if !set.folded.insert(folded) {
                return Err(ConfigError::Validation(format!(
                    "duplicate category label: '{trimmed}'"
                )));
            }
            set.labels.push(trimmed.to_string());
        }

        Ok(set)
    }

    /// The built-in category list used when no override file is configured.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            labels: BUILTIN_CATEGORIES.iter().map(|s| (*s).to_string()).collect(),
            folded: BUILTIN_CATEGORIES.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Case-insensitive membership test.
    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.folded.contains(&category.to_lowercase())
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Returns `true` when a filter value names the catch-all bucket.
#[must_use]
pub fn is_catch_all(filter: &str) -> bool {
    filter.trim().eq_ignore_ascii_case(CATCH_ALL_CATEGORY)
}

#[derive(Debug, Deserialize)]
struct CategoriesFile {
    categories: Vec<String>,
}

/// Load and validate a category override file.
///
/// The file is YAML with a single `categories` list.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<CategorySet, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_categories(&content)
}

fn parse_categories(content: &str) -> Result<CategorySet, ConfigError> {
    let file: CategoriesFile = serde_yaml::from_str(content)?;
    if file.categories.is_empty() {
        return Err(ConfigError::Validation(
            "categories file must list at least one category".to_string(),
        ));
    }
    CategorySet::new(file.categories)
}
