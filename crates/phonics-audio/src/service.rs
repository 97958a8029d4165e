//! The audio service: playback primitive plus live-instance registry.
//!
//! `AudioService` is the one shared audio object of the application shell. It
//! is passed by `&mut` to every component that makes sound. Each started sound
//! is registered under its owner until it finishes, fails or is stopped, which
//! gives three guarantees:
//!
//! - a handle yields at most one event (completion *or* failure, never both)
//! - stopping a handle before it ends suppresses its completion
//! - `stop_all` / `stop_owner` silence everything that is still registered
//!
//! Failures are never returned from `play`; they arrive from `poll` like any
//! other outcome, carrying the resource id.

use std::collections::{HashMap, VecDeque};

use phonics_common::{OwnerId, ResourceError, ResourceId};
use tracing::{debug, warn};

use crate::backend::{AudioBackend, BackendEvent, ManualBackend};
use crate::handle::{AudioHandle, HandleGenerator};

/// Outcome of a registered sound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEventKind {
    /// Natural end of playback.
    Completed,
    /// Loading or playback failed.
    Failed(ResourceError),
}

/// Event delivered to the owner of a sound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackEvent {
    /// Sound the event belongs to.
    pub handle: AudioHandle,
    /// Owner that started the sound.
    pub owner: OwnerId,
    /// What happened.
    pub kind: PlaybackEventKind,
}

#[derive(Debug, Clone)]
struct LiveSound {
    owner: OwnerId,
    resource: ResourceId,
}

/// Playback primitive and process-wide registry of live sounds.
pub struct AudioService {
    backend: Box<dyn AudioBackend>,
    handles: HandleGenerator,
    live: HashMap<AudioHandle, LiveSound>,
    /// Failures detected at start, delivered on the next poll.
    pending: VecDeque<PlaybackEvent>,
}

impl std::fmt::Debug for AudioService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioService")
            .field("live", &self.live.len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl AudioService {
    /// Create a service on top of a backend.
    #[must_use]
    pub fn new(backend: impl AudioBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            handles: HandleGenerator::new(),
            live: HashMap::new(),
            pending: VecDeque::new(),
        }
    }

    /// Create a service with a fresh `ManualBackend`, returning a driver clone.
    #[must_use]
    pub fn manual() -> (Self, ManualBackend) {
        let driver = ManualBackend::new();
        (Self::new(driver.clone()), driver)
    }

    /// Start playing `resource` for `owner`.
    ///
    /// Always returns a handle; a resource that cannot be opened produces a
    /// `Failed` event on the next `poll`.
    pub fn play(&mut self, owner: OwnerId, resource: &ResourceId) -> AudioHandle {
        let handle = self.handles.next();

        match self.backend.start(handle, resource) {
            Ok(()) => {
                debug!("Started {} as {} for owner {}", resource, handle, owner.raw());
                self.live.insert(
                    handle,
                    LiveSound {
                        owner,
                        resource: resource.clone(),
                    },
                );
            },
            Err(failure) => {
                let error = ResourceError::new(resource.clone(), failure);
                warn!("{error}");
                self.pending.push_back(PlaybackEvent {
                    handle,
                    owner,
                    kind: PlaybackEventKind::Failed(error),
                });
            },
        }

        handle
    }

    /// Stop a sound. Idempotent; stopping an unknown or ended handle does nothing.
    pub fn stop(&mut self, handle: AudioHandle) {
        self.pending.retain(|event| event.handle != handle);
        if let Some(sound) = self.live.remove(&handle) {
            debug!("Stopped {} ({})", handle, sound.resource);
            self.backend.stop(handle);
        }
    }

    /// Stop every sound started by `owner`.
    pub fn stop_owner(&mut self, owner: OwnerId) {
        let handles: Vec<AudioHandle> = self
            .live
            .iter()
            .filter(|(_, sound)| sound.owner == owner)
            .map(|(handle, _)| *handle)
            .collect();
        for handle in handles {
            self.stop(handle);
        }
        self.pending.retain(|event| event.owner != owner);
    }

    /// Stop everything. Safe to call when nothing is playing.
    pub fn stop_all(&mut self) {
        let handles: Vec<AudioHandle> = self.live.keys().copied().collect();
        for handle in handles {
            self.stop(handle);
        }
        self.pending.clear();
    }

    /// Collect outcomes of registered sounds.
    ///
    /// Backend events for handles that were stopped (or already reported) are
    /// dropped here.
    pub fn poll(&mut self) -> Vec<PlaybackEvent> {
        let mut events: Vec<PlaybackEvent> = self.pending.drain(..).collect();

        for event in self.backend.poll() {
            let handle = event.handle();
            let Some(sound) = self.live.remove(&handle) else {
                continue;
            };
            let kind = match event {
                BackendEvent::Finished(_) => PlaybackEventKind::Completed,
                BackendEvent::Failed { failure, .. } => {
                    let error = ResourceError::new(sound.resource, failure);
                    warn!("{error}");
                    PlaybackEventKind::Failed(error)
                },
            };
            events.push(PlaybackEvent {
                handle,
                owner: sound.owner,
                kind,
            });
        }

        events
    }

    /// Whether a handle is still registered as playing.
    #[must_use]
    pub fn is_live(&self, handle: AudioHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Number of live sounds.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of live sounds started by `owner`.
    #[must_use]
    pub fn live_count_for(&self, owner: OwnerId) -> usize {
        self.live.values().filter(|s| s.owner == owner).count()
    }
}
