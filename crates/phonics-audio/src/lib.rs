//! # Phonics Audio
//!
//! Audio layer of the phonics progression engine.
//!
//! - [`AudioService`]: playback primitive and live-instance registry
//! - [`AudioSequencePlayer`]: ordered steps with delays, looping and cancellation
//! - [`AudioBackend`] implementations: [`ManualBackend`] and, with the `rodio`
//!   feature, `RodioBackend`
//!
//! Everything here is single-threaded and event-driven: the shell polls the
//! service for playback outcomes and forwards elapsed time as ticks.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod handle;
#[cfg(feature = "rodio")]
pub mod rodio_backend;
pub mod sequence;
pub mod service;

pub use backend::{AudioBackend, AudioError, AudioResult, BackendEvent, ManualBackend};
pub use handle::{AudioHandle, HandleGenerator};
#[cfg(feature = "rodio")]
pub use rodio_backend::RodioBackend;
pub use sequence::{
    AudioSequencePlayer, AudioStep, SequenceEvent, SequenceNotification, SequenceOptions,
    SequenceStatus,
};
pub use service::{AudioService, PlaybackEvent, PlaybackEventKind};
