//! Error taxonomy shared by the audio and gameplay crates.

use thiserror::Error;

use crate::ids::{ProblemId, ResourceId};

/// Why an audio resource could not be played.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceFailure {
    /// The resource does not exist under the asset root.
    #[error("resource not found")]
    NotFound,

    /// The resource exists but could not be decoded.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// No output device was available to play on.
    #[error("output device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Any other backend failure.
    #[error("{0}")]
    Other(String),
}

/// An audio resource failed to load or decode.
///
/// Recovered locally: sequences skip past the failing step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("audio resource '{resource}' failed: {failure}")]
pub struct ResourceError {
    /// The resource that failed.
    pub resource: ResourceId,
    /// What went wrong.
    pub failure: ResourceFailure,
}

impl ResourceError {
    /// Creates a resource error.
    #[must_use]
    pub fn new(resource: ResourceId, failure: ResourceFailure) -> Self {
        Self { resource, failure }
    }
}

/// Catalog or session configuration is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A requested category has no catalog entry.
    #[error("category '{0}' has no catalog entry")]
    MissingCategory(String),

    /// A category's problem pool is empty.
    #[error("category '{0}' has an empty problem pool")]
    EmptyPool(String),

    /// A tutorial pairing does not hold exactly two problems.
    #[error("tutorial category '{category}' must pair exactly two problems, found {found}")]
    InvalidPairing {
        /// Tutorial category name
        category: String,
        /// Number of problems found
        found: usize,
    },

    /// A problem offers the same answer twice.
    #[error("problem '{0}' has identical correct and distractor answers")]
    AmbiguousChoices(ProblemId),

    /// Two problems share an ID.
    #[error("duplicate problem id '{0}'")]
    DuplicateProblem(ProblemId),

    /// A problem is filed under a category that trains another skill.
    #[error("problem '{problem}' does not train the skill of category '{category}'")]
    SkillMismatch {
        /// Offending problem
        problem: ProblemId,
        /// Category it was filed under
        category: String,
    },

    /// No categories were requested.
    #[error("no categories requested")]
    NoCategories,

    /// Catalog document version mismatch.
    #[error("catalog schema mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Actual version found
        actual: String,
    },

    /// The configuration document could not be read or parsed.
    #[error("invalid configuration document: {0}")]
    Invalid(String),
}

/// Result type alias for configuration checks.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
