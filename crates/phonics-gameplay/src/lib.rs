//! # Phonics Gameplay
//!
//! Game progression systems for the phonics engine.
//!
//! This crate provides everything between the problem catalog and the UI shell:
//! - Problem model (blending and segmenting variants, tutorial narration)
//! - Problem catalog loaded from TOML, with non-repeating selection
//! - Randomized problem generation from an asset listing
//! - Tutorial interaction state machine (narration, rehearsal, feedback, retry)
//! - Session state machine (ordering, scoring, completion)
//! - Finalize reports and sinks
//! - Game configuration
//! - `GameRuntime`, which drives all of the above from shell input and
//!   playback events

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod finalize;
pub mod generator;
pub mod narration;
pub mod problem;
pub mod runtime;
pub mod selector;
pub mod session;
pub mod tutorial;

#[cfg(test)]
mod testing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::catalog::*;
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::finalize::*;
    pub use crate::generator::*;
    pub use crate::narration::*;
    pub use crate::problem::*;
    pub use crate::runtime::*;
    pub use crate::selector::*;
    pub use crate::session::*;
    pub use crate::tutorial::*;
}

pub use prelude::*;
