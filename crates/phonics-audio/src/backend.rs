//! Audio backends.
//!
//! A backend turns "start this resource under this handle" into sound and
//! reports back, on `poll`, which handles have finished or failed. The
//! `AudioService` sits on top and owns the bookkeeping that guarantees each
//! handle produces at most one event.
//!
//! - `ManualBackend`: in-memory backend driven explicitly (tests, headless shells)
//! - `RodioBackend`: plays files through the default output device (feature `rodio`)

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use phonics_common::{ResourceFailure, ResourceId};
use thiserror::Error;

use crate::handle::AudioHandle;

/// Audio backend error types.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Failed to initialize audio device.
    #[error("Failed to initialize audio device: {0}")]
    DeviceInitFailed(String),

    /// The asset root directory does not exist.
    #[error("Asset root not found: {}", .0.display())]
    AssetRootMissing(PathBuf),
}

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Asynchronous outcome of a started sound, reported by `AudioBackend::poll`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// The sound played to its natural end.
    Finished(AudioHandle),
    /// The sound failed while loading or playing.
    Failed {
        /// Handle of the failed sound.
        handle: AudioHandle,
        /// What went wrong.
        failure: ResourceFailure,
    },
}

impl BackendEvent {
    /// Handle the event refers to.
    #[must_use]
    pub fn handle(&self) -> AudioHandle {
        match self {
            Self::Finished(handle) | Self::Failed { handle, .. } => *handle,
        }
    }
}

/// A device (real or simulated) that can play audio resources.
pub trait AudioBackend {
    /// Begin playing `resource` under `handle`.
    ///
    /// Failures detected while opening the resource are returned here; the
    /// service converts them into asynchronous error events.
    fn start(&mut self, handle: AudioHandle, resource: &ResourceId) -> Result<(), ResourceFailure>;

    /// Stop a sound. Unknown handles are ignored.
    fn stop(&mut self, handle: AudioHandle);

    /// Collect completions and failures since the last poll.
    fn poll(&mut self) -> Vec<BackendEvent>;
}

#[derive(Debug, Default)]
struct ManualState {
    playing: Vec<(AudioHandle, ResourceId)>,
    started: Vec<ResourceId>,
    stopped: Vec<AudioHandle>,
    missing: HashSet<ResourceId>,
    ready: Vec<BackendEvent>,
}

/// Backend whose sounds only finish when told to.
///
/// Clones share state, so a test keeps one clone to drive completions while
/// the `AudioService` owns the other.
#[derive(Debug, Clone, Default)]
pub struct ManualBackend {
    inner: Arc<Mutex<ManualState>>,
}

impl ManualBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future `start` of `resource` fail with `NotFound`.
    pub fn mark_missing(&self, resource: impl Into<ResourceId>) {
        self.inner.lock().missing.insert(resource.into());
    }

    /// Sounds currently playing, oldest first.
    #[must_use]
    pub fn playing(&self) -> Vec<(AudioHandle, ResourceId)> {
        self.inner.lock().playing.clone()
    }

    /// Resource of the most recently started, still playing sound.
    #[must_use]
    pub fn current(&self) -> Option<ResourceId> {
        self.inner.lock().playing.last().map(|(_, r)| r.clone())
    }

    /// Every resource ever started, in start order (including failed starts).
    #[must_use]
    pub fn started(&self) -> Vec<ResourceId> {
        self.inner.lock().started.clone()
    }

    /// Handles stopped through the backend.
    #[must_use]
    pub fn stopped(&self) -> Vec<AudioHandle> {
        self.inner.lock().stopped.clone()
    }

    /// Let a playing sound reach its natural end. Returns false if not playing.
    pub fn finish(&self, handle: AudioHandle) -> bool {
        let mut state = self.inner.lock();
        let Some(pos) = state.playing.iter().position(|(h, _)| *h == handle) else {
            return false;
        };
        state.playing.remove(pos);
        state.ready.push(BackendEvent::Finished(handle));
        true
    }

    /// Finish every playing sound. Returns how many finished.
    pub fn finish_all(&self) -> usize {
        let mut state = self.inner.lock();
        let finished: Vec<_> = state.playing.drain(..).map(|(h, _)| h).collect();
        let count = finished.len();
        state
            .ready
            .extend(finished.into_iter().map(BackendEvent::Finished));
        count
    }

    /// Fail a playing sound mid-playback. Returns false if not playing.
    pub fn fail(&self, handle: AudioHandle, failure: ResourceFailure) -> bool {
        let mut state = self.inner.lock();
        let Some(pos) = state.playing.iter().position(|(h, _)| *h == handle) else {
            return false;
        };
        state.playing.remove(pos);
        state.ready.push(BackendEvent::Failed { handle, failure });
        true
    }
}

impl AudioBackend for ManualBackend {
    fn start(&mut self, handle: AudioHandle, resource: &ResourceId) -> Result<(), ResourceFailure> {
        let mut state = self.inner.lock();
        state.started.push(resource.clone());
        if state.missing.contains(resource) {
            return Err(ResourceFailure::NotFound);
        }
        state.playing.push((handle, resource.clone()));
        Ok(())
    }

    fn stop(&mut self, handle: AudioHandle) {
        let mut state = self.inner.lock();
        state.playing.retain(|(h, _)| *h != handle);
        state.stopped.push(handle);
    }

    fn poll(&mut self) -> Vec<BackendEvent> {
        std::mem::take(&mut self.inner.lock().ready)
    }
}
