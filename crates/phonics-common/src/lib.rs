//! # Phonics Common
//!
//! Common types shared by the phonics progression engine.
//!
//! This crate provides foundational types used across all subsystems:
//! - ID types (ResourceId, AnswerId, ProblemId, OwnerId, UserId)
//! - Schema versions for configuration documents
//! - The error taxonomy (resource and configuration errors)
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;
