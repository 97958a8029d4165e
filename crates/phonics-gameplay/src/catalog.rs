//! Problem catalog.
//!
//! A static table keyed by category. Scorable categories hold a pool of
//! problems; tutorial categories hold a fixed pairing of exactly two. The table
//! is usually loaded from a TOML document:
//!
//! ```toml
//! schema = { major = 1, minor = 0, patch = 0 }
//!
//! [[categories]]
//! category = "INITIAL_BLENDING"
//!
//! [[categories.problems]]
//! id = "ib-cat"
//! correct = "cat"
//! variant = { type = "blending", sounds = ["sounds/k.mp3", "sounds/a.mp3", "sounds/t.mp3"] }
//! choices = [
//!     { answer = "cat", audio = "words/cat.mp3", image = "images/cat.png" },
//!     { answer = "hat", audio = "words/hat.mp3", image = "images/hat.png" },
//! ]
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use phonics_common::{ConfigurationError, ConfigurationResult, ProblemId, SchemaVersion};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::problem::{Category, Problem, ProblemDefinition};

/// Catalog document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Document schema version.
    #[serde(default)]
    pub schema: SchemaVersion,
    /// One record per category.
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

/// Problems of one category in the catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Category the problems belong to.
    pub category: Category,
    /// Problem records.
    #[serde(default)]
    pub problems: Vec<ProblemDefinition>,
}

/// Problems available for a category.
#[derive(Debug, Clone)]
pub enum CatalogEntry {
    /// Scorable pool, drawn without repeats.
    Pool(Vec<Arc<Problem>>),
    /// Tutorial walkthrough, always played in this order.
    TutorialPairing([Arc<Problem>; 2]),
}

impl CatalogEntry {
    /// All problems of the entry.
    #[must_use]
    pub fn problems(&self) -> &[Arc<Problem>] {
        match self {
            Self::Pool(pool) => pool,
            Self::TutorialPairing(pair) => pair,
        }
    }

    /// Number of problems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.problems().len()
    }

    /// Whether the entry holds no problems (never true for a loaded catalog).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems().is_empty()
    }
}

/// Validated category table.
#[derive(Debug, Clone, Default)]
pub struct ProblemCatalog {
    entries: HashMap<Category, CatalogEntry>,
}

impl ProblemCatalog {
    /// Build a catalog from built problems.
    pub fn from_entries(entries: Vec<(Category, Vec<Problem>)>) -> ConfigurationResult<Self> {
        let mut catalog = Self::default();
        for (category, problems) in entries {
            if catalog.entries.contains_key(&category) {
                return Err(ConfigurationError::Invalid(format!(
                    "category '{category}' listed twice"
                )));
            }
            catalog = catalog.with_problems(category, problems)?;
        }
        Ok(catalog)
    }

    /// Validate and build a catalog document.
    pub fn from_config(config: CatalogConfig) -> ConfigurationResult<Self> {
        if !SchemaVersion::CATALOG.can_read(&config.schema) {
            return Err(ConfigurationError::VersionMismatch {
                expected: SchemaVersion::CATALOG.to_string(),
                actual: config.schema.to_string(),
            });
        }

        let entries = config
            .categories
            .into_iter()
            .map(|record| {
                let problems = record
                    .problems
                    .into_iter()
                    .map(Problem::from_definition)
                    .collect::<ConfigurationResult<Vec<_>>>()?;
                Ok((record.category, problems))
            })
            .collect::<ConfigurationResult<Vec<_>>>()?;

        Self::from_entries(entries)
    }

    /// Parse a TOML catalog document.
    pub fn from_toml_str(source: &str) -> ConfigurationResult<Self> {
        let config: CatalogConfig =
            toml::from_str(source).map_err(|e| ConfigurationError::Invalid(e.to_string()))?;
        Self::from_config(config)
    }

    /// Load a TOML catalog document from disk.
    pub fn load_from<P: AsRef<Path>>(path: P) -> ConfigurationResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            ConfigurationError::Invalid(format!("cannot read {}: {e}", path.display()))
        })?;
        let catalog = Self::from_toml_str(&source)?;
        info!(
            "Loaded catalog from {} ({} categories)",
            path.display(),
            catalog.entries.len()
        );
        Ok(catalog)
    }

    /// Add or replace a category's problems.
    pub fn with_problems(
        mut self,
        category: Category,
        problems: Vec<Problem>,
    ) -> ConfigurationResult<Self> {
        if problems.is_empty() {
            return Err(ConfigurationError::EmptyPool(category.to_string()));
        }

        let mut seen: HashSet<ProblemId> = self
            .entries
            .iter()
            .filter(|(c, _)| **c != category)
            .flat_map(|(_, entry)| entry.problems().iter().map(|p| p.id().clone()))
            .collect();
        for problem in &problems {
            if problem.skill() != category.skill() {
                return Err(ConfigurationError::SkillMismatch {
                    problem: problem.id().clone(),
                    category: category.to_string(),
                });
            }
            if !seen.insert(problem.id().clone()) {
                return Err(ConfigurationError::DuplicateProblem(problem.id().clone()));
            }
        }

        let problems: Vec<Arc<Problem>> = problems.into_iter().map(Arc::new).collect();
        let entry = if category.is_tutorial() {
            let found = problems.len();
            let pair: [Arc<Problem>; 2] =
                problems
                    .try_into()
                    .map_err(|_| ConfigurationError::InvalidPairing {
                        category: category.to_string(),
                        found,
                    })?;
            CatalogEntry::TutorialPairing(pair)
        } else {
            CatalogEntry::Pool(problems)
        };

        debug!("Catalog entry {} with {} problems", category, entry.len());
        self.entries.insert(category, entry);
        Ok(self)
    }

    /// Entry for a category.
    pub fn entry(&self, category: Category) -> ConfigurationResult<&CatalogEntry> {
        self.entries
            .get(&category)
            .ok_or_else(|| ConfigurationError::MissingCategory(category.to_string()))
    }

    /// Whether the catalog has the category.
    #[must_use]
    pub fn contains(&self, category: Category) -> bool {
        self.entries.contains_key(&category)
    }

    /// Categories present, in master order.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        Category::MASTER_SEQUENCE
            .into_iter()
            .filter(|c| self.entries.contains_key(c))
            .collect()
    }

    /// Look a problem up by id.
    #[must_use]
    pub fn find(&self, id: &ProblemId) -> Option<Arc<Problem>> {
        self.entries
            .values()
            .flat_map(CatalogEntry::problems)
            .find(|p| p.id() == id)
            .cloned()
    }
}
