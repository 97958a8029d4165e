//! Rodio output backend.
//!
//! Streams each resource from `<asset root>/<resource id>` into its own sink.
//! Completion is detected on `poll` by checking for drained sinks, so the
//! shell must keep polling the `AudioService` (once per frame is plenty).

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use phonics_common::{ResourceFailure, ResourceId};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, info};

use crate::backend::{AudioBackend, AudioError, AudioResult, BackendEvent};
use crate::handle::AudioHandle;

/// Plays audio files through the default output device.
pub struct RodioBackend {
    /// The output stream (must be kept alive).
    _stream: OutputStream,
    /// Handle for creating sinks.
    stream_handle: OutputStreamHandle,
    /// Directory resource ids are resolved against.
    root: PathBuf,
    /// One sink per playing sound.
    sinks: HashMap<AudioHandle, Sink>,
    /// Volume applied to new sinks.
    volume: f32,
}

impl std::fmt::Debug for RodioBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioBackend")
            .field("root", &self.root)
            .field("playing", &self.sinks.len())
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}

impl RodioBackend {
    /// Open the default output device, resolving resources under `root`.
    pub fn new(root: impl Into<PathBuf>) -> AudioResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(AudioError::AssetRootMissing(root));
        }

        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::DeviceInitFailed(e.to_string()))?;

        info!("Audio device initialized (assets: {})", root.display());

        Ok(Self {
            _stream: stream,
            stream_handle,
            root,
            sinks: HashMap::new(),
            volume: 1.0,
        })
    }

    /// Asset root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Set the volume for sounds started from now on (0.0-1.0).
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}

impl AudioBackend for RodioBackend {
    fn start(&mut self, handle: AudioHandle, resource: &ResourceId) -> Result<(), ResourceFailure> {
        let path = self.root.join(resource.as_str());
        let file = File::open(&path).map_err(|_| ResourceFailure::NotFound)?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| ResourceFailure::DecodeFailed(e.to_string()))?;
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| ResourceFailure::DeviceUnavailable(e.to_string()))?;

        sink.set_volume(self.volume);
        sink.append(source);
        debug!("Playing {} as {}", path.display(), handle);
        self.sinks.insert(handle, sink);
        Ok(())
    }

    fn stop(&mut self, handle: AudioHandle) {
        if let Some(sink) = self.sinks.remove(&handle) {
            sink.stop();
        }
    }

    fn poll(&mut self) -> Vec<BackendEvent> {
        let drained: Vec<AudioHandle> = self
            .sinks
            .iter()
            .filter(|(_, sink)| sink.empty())
            .map(|(handle, _)| *handle)
            .collect();

        drained
            .into_iter()
            .map(|handle| {
                self.sinks.remove(&handle);
                BackendEvent::Finished(handle)
            })
            .collect()
    }
}
