//! Audio sequence player.
//!
//! Plays an ordered list of `AudioStep`s, each with an optional pause before
//! and after it:
//!
//! ```text
//! Idle ──play──▶ Delaying(pre) ──▶ Playing ──completed──▶ Delaying(post) ──▶ next step
//!                                     │                                        │
//!                                     └──errored──▶ Error(post) ───────────────┘
//! last step done ──▶ Finished (or step 0 again when looping)
//! stop from any active state ──▶ Stopped
//! ```
//!
//! All transitions go through [`AudioSequencePlayer::handle_event`], fed with
//! [`SequenceEvent`]s: playback outcomes from the `AudioService`, explicit
//! stops, and `Tick`s that advance the delay timers. Nothing blocks; a delay is
//! just a countdown that a stop discards.

use std::time::Duration;

use phonics_common::{OwnerId, ResourceError, ResourceId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::handle::AudioHandle;
use crate::service::{AudioService, PlaybackEvent, PlaybackEventKind};

/// One element of an audio sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioStep {
    /// Resource to play.
    pub resource: ResourceId,
    /// Pause before the resource starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_delay_ms: Option<u64>,
    /// Pause after the resource ends (or fails).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_delay_ms: Option<u64>,
}

impl AudioStep {
    /// A step with no delays.
    #[must_use]
    pub fn new(resource: impl Into<ResourceId>) -> Self {
        Self {
            resource: resource.into(),
            pre_delay_ms: None,
            post_delay_ms: None,
        }
    }

    /// Set the pause before this step.
    #[must_use]
    pub const fn with_pre_delay(mut self, ms: u64) -> Self {
        self.pre_delay_ms = Some(ms);
        self
    }

    /// Set the pause after this step.
    #[must_use]
    pub const fn with_post_delay(mut self, ms: u64) -> Self {
        self.post_delay_ms = Some(ms);
        self
    }

    fn pre_delay(&self) -> Duration {
        Duration::from_millis(self.pre_delay_ms.unwrap_or(0))
    }

    fn post_delay(&self) -> Duration {
        Duration::from_millis(self.post_delay_ms.unwrap_or(0))
    }
}

/// Playback options for one `play` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceOptions {
    /// Restart at step 0 after the last step instead of finishing.
    pub looping: bool,
}

impl SequenceOptions {
    /// Options for a looping sequence.
    #[must_use]
    pub const fn looping() -> Self {
        Self { looping: true }
    }
}

/// Observable status of a sequence player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SequenceStatus {
    /// Never played.
    #[default]
    Idle,
    /// Waiting out a pre- or post-step pause.
    Delaying,
    /// A step's audio is playing.
    Playing,
    /// All steps ran.
    Finished,
    /// Stopped before finishing.
    Stopped,
    /// The current step failed; waiting out its post-step pause.
    Error,
}

impl SequenceStatus {
    /// Whether the player is in the middle of a sequence.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Delaying | Self::Playing | Self::Error)
    }
}

/// Input to the player's transition function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceEvent {
    /// A step's audio reached its end.
    StepCompleted(AudioHandle),
    /// A step's audio failed.
    StepErrored {
        /// Failed handle.
        handle: AudioHandle,
        /// Failure detail.
        error: ResourceError,
    },
    /// Cancel the sequence.
    Stopped,
    /// Time passed.
    Tick(Duration),
}

impl SequenceEvent {
    /// Convert a service event into a player event.
    #[must_use]
    pub fn from_playback(event: &PlaybackEvent) -> Self {
        match &event.kind {
            PlaybackEventKind::Completed => Self::StepCompleted(event.handle),
            PlaybackEventKind::Failed(error) => Self::StepErrored {
                handle: event.handle,
                error: error.clone(),
            },
        }
    }
}

/// Things the player reports to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceNotification {
    /// Step `index` began playing.
    StepStarted {
        /// Step index.
        index: usize,
    },
    /// Step `index` failed; the sequence continues.
    StepFailed {
        /// Step index.
        index: usize,
        /// Failure detail.
        error: ResourceError,
    },
    /// A looping sequence wrapped to step 0.
    Looped,
    /// The sequence ran to its end.
    Finished,
    /// The sequence was stopped.
    Stopped,
}

/// Plays one audio sequence at a time.
#[derive(Debug)]
pub struct AudioSequencePlayer {
    owner: OwnerId,
    steps: Vec<AudioStep>,
    options: SequenceOptions,
    status: SequenceStatus,
    step_index: usize,
    handle: Option<AudioHandle>,
    /// Remaining pause, and whether it precedes the current step.
    timer: Option<(Duration, bool)>,
    notifications: Vec<SequenceNotification>,
}

impl Default for AudioSequencePlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSequencePlayer {
    /// Create an idle player with its own owner id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_owner(OwnerId::new())
    }

    /// Create an idle player that registers sounds under `owner`.
    #[must_use]
    pub fn with_owner(owner: OwnerId) -> Self {
        Self {
            owner,
            steps: Vec::new(),
            options: SequenceOptions::default(),
            status: SequenceStatus::Idle,
            step_index: 0,
            handle: None,
            timer: None,
            notifications: Vec::new(),
        }
    }

    /// Owner id used for this player's sounds.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> SequenceStatus {
        self.status
    }

    /// Index of the current (or last) step.
    #[must_use]
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Whether a sequence is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Handle of the step currently playing.
    #[must_use]
    pub fn current_handle(&self) -> Option<AudioHandle> {
        self.handle
    }

    /// Steps of the current (or last) sequence.
    #[must_use]
    pub fn steps(&self) -> &[AudioStep] {
        &self.steps
    }

    /// Drain notifications recorded since the last call.
    pub fn take_notifications(&mut self) -> Vec<SequenceNotification> {
        std::mem::take(&mut self.notifications)
    }

    /// Play `steps` once.
    ///
    /// Returns false (and changes nothing) if a sequence is already active.
    pub fn play(&mut self, audio: &mut AudioService, steps: Vec<AudioStep>) -> bool {
        self.play_with(audio, steps, SequenceOptions::default())
    }

    /// Play `steps` with options.
    pub fn play_with(
        &mut self,
        audio: &mut AudioService,
        steps: Vec<AudioStep>,
        options: SequenceOptions,
    ) -> bool {
        if self.status.is_active() {
            debug!("Sequence already active for owner {}, ignoring play", self.owner.raw());
            return false;
        }

        self.steps = steps;
        self.options = options;
        self.step_index = 0;
        self.handle = None;
        self.timer = None;

        if self.steps.is_empty() {
            self.status = SequenceStatus::Finished;
            self.notifications.push(SequenceNotification::Finished);
        } else {
            self.enter_step(audio, 0);
        }
        true
    }

    /// Cancel the sequence. No-op unless active.
    pub fn stop(&mut self, audio: &mut AudioService) {
        self.handle_event(audio, SequenceEvent::Stopped);
    }

    /// Advance delay timers.
    pub fn tick(&mut self, audio: &mut AudioService, elapsed: Duration) {
        self.handle_event(audio, SequenceEvent::Tick(elapsed));
    }

    /// Feed a service event. Events for other owners are ignored.
    pub fn on_playback(&mut self, audio: &mut AudioService, event: &PlaybackEvent) {
        if event.owner == self.owner {
            self.handle_event(audio, SequenceEvent::from_playback(event));
        }
    }

    /// The transition function.
    pub fn handle_event(&mut self, audio: &mut AudioService, event: SequenceEvent) {
        match (self.status, event) {
            (SequenceStatus::Playing, SequenceEvent::StepCompleted(handle))
                if self.handle == Some(handle) =>
            {
                self.handle = None;
                self.after_step(audio);
            },
            (SequenceStatus::Playing, SequenceEvent::StepErrored { handle, error })
                if self.handle == Some(handle) =>
            {
                self.handle = None;
                self.status = SequenceStatus::Error;
                self.notifications.push(SequenceNotification::StepFailed {
                    index: self.step_index,
                    error,
                });
                self.after_step(audio);
            },
            (status, SequenceEvent::Stopped) if status.is_active() => {
                if let Some(handle) = self.handle.take() {
                    audio.stop(handle);
                }
                self.timer = None;
                self.status = SequenceStatus::Stopped;
                self.notifications.push(SequenceNotification::Stopped);
                debug!("Sequence stopped at step {}", self.step_index);
            },
            (SequenceStatus::Delaying | SequenceStatus::Error, SequenceEvent::Tick(elapsed)) => {
                let Some((remaining, before_step)) = self.timer else {
                    return;
                };
                if elapsed < remaining {
                    self.timer = Some((remaining - elapsed, before_step));
                    return;
                }
                self.timer = None;
                if before_step {
                    self.start_audio(audio);
                } else {
                    self.advance(audio);
                }
                // Time left over runs down the next delay, if one started.
                let surplus = elapsed - remaining;
                if self.timer.is_some() && !surplus.is_zero() {
                    self.handle_event(audio, SequenceEvent::Tick(surplus));
                }
            },
            // Stale completions, ticks while playing, stops while inactive.
            _ => {},
        }
    }

    fn enter_step(&mut self, audio: &mut AudioService, index: usize) {
        self.step_index = index;
        let pre = self.steps[index].pre_delay();
        if pre.is_zero() {
            self.start_audio(audio);
        } else {
            self.status = SequenceStatus::Delaying;
            self.timer = Some((pre, true));
        }
    }

    fn start_audio(&mut self, audio: &mut AudioService) {
        let resource = self.steps[self.step_index].resource.clone();
        self.handle = Some(audio.play(self.owner, &resource));
        self.status = SequenceStatus::Playing;
        self.notifications.push(SequenceNotification::StepStarted {
            index: self.step_index,
        });
    }

    /// Wait out the post-step pause, keeping `Error` status after a failure.
    fn after_step(&mut self, audio: &mut AudioService) {
        let post = self.steps[self.step_index].post_delay();
        if post.is_zero() {
            self.advance(audio);
        } else {
            if self.status != SequenceStatus::Error {
                self.status = SequenceStatus::Delaying;
            }
            self.timer = Some((post, false));
        }
    }

    fn advance(&mut self, audio: &mut AudioService) {
        let next = self.step_index + 1;
        if next < self.steps.len() {
            self.enter_step(audio, next);
        } else if self.options.looping {
            self.notifications.push(SequenceNotification::Looped);
            self.enter_step(audio, 0);
        } else {
            self.status = SequenceStatus::Finished;
            self.notifications.push(SequenceNotification::Finished);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ManualBackend;
    use phonics_common::ResourceFailure;
    use proptest::prelude::*;

    fn steps(n: usize) -> Vec<AudioStep> {
        (0..n).map(|i| AudioStep::new(format!("step{i}.mp3").as_str())).collect()
    }

    /// Route every pending service event to the player.
    fn pump(audio: &mut AudioService, player: &mut AudioSequencePlayer) {
        for event in audio.poll() {
            player.on_playback(audio, &event);
        }
    }

    fn finish_current(
        audio: &mut AudioService,
        driver: &ManualBackend,
        player: &mut AudioSequencePlayer,
    ) {
        let handle = player.current_handle().expect("a step should be playing");
        assert!(driver.finish(handle));
        pump(audio, player);
    }

    fn started_count(notes: &[SequenceNotification]) -> usize {
        notes
            .iter()
            .filter(|n| matches!(n, SequenceNotification::StepStarted { .. }))
            .count()
    }

    #[test]
    fn test_n_steps_start_exactly_once_before_finish() {
        let (mut audio, driver) = AudioService::manual();
        let mut player = AudioSequencePlayer::new();
        player.play(&mut audio, steps(3));

        for _ in 0..3 {
            finish_current(&mut audio, &driver, &mut player);
        }

        let notes = player.take_notifications();
        assert_eq!(started_count(&notes), 3);
        assert_eq!(notes.last(), Some(&SequenceNotification::Finished));
        let order: Vec<usize> = notes
            .iter()
            .filter_map(|n| match n {
                SequenceNotification::StepStarted { index } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(player.status(), SequenceStatus::Finished);
    }

    #[test]
    fn test_stop_during_second_step() {
        let (mut audio, driver) = AudioService::manual();
        let mut player = AudioSequencePlayer::new();
        player.play(&mut audio, steps(4));

        finish_current(&mut audio, &driver, &mut player);
        assert_eq!(player.step_index(), 1);
        let second = player.current_handle().unwrap();

        player.stop(&mut audio);
        assert_eq!(player.status(), SequenceStatus::Stopped);
        assert!(!audio.is_live(second));

        // Late completion of the stopped step changes nothing.
        driver.finish(second);
        pump(&mut audio, &mut player);
        player.tick(&mut audio, Duration::from_secs(10));

        let notes = player.take_notifications();
        assert_eq!(started_count(&notes), 2);
        assert!(!notes.contains(&SequenceNotification::Finished));
        assert_eq!(notes.last(), Some(&SequenceNotification::Stopped));
        assert_eq!(driver.started().len(), 2);
    }

    #[test]
    fn test_stop_when_idle_or_stopped_is_silent() {
        let (mut audio, _driver) = AudioService::manual();
        let mut player = AudioSequencePlayer::new();

        player.stop(&mut audio);
        assert_eq!(player.status(), SequenceStatus::Idle);
        assert!(player.take_notifications().is_empty());

        player.play(&mut audio, steps(1));
        player.stop(&mut audio);
        player.take_notifications();
        player.stop(&mut audio);
        assert_eq!(player.status(), SequenceStatus::Stopped);
        assert!(player.take_notifications().is_empty());
    }

    #[test]
    fn test_play_while_active_is_ignored() {
        let (mut audio, driver) = AudioService::manual();
        let mut player = AudioSequencePlayer::new();
        assert!(player.play(&mut audio, steps(2)));
        assert!(!player.play(&mut audio, steps(5)));

        assert_eq!(player.steps().len(), 2);
        assert_eq!(driver.playing().len(), 1);
    }

    #[test]
    fn test_pre_and_post_delays() {
        let (mut audio, driver) = AudioService::manual();
        let mut player = AudioSequencePlayer::new();
        player.play(
            &mut audio,
            vec![
                AudioStep::new("a.mp3").with_pre_delay(100).with_post_delay(200),
                AudioStep::new("b.mp3"),
            ],
        );

        assert_eq!(player.status(), SequenceStatus::Delaying);
        assert!(driver.playing().is_empty());

        player.tick(&mut audio, Duration::from_millis(60));
        assert!(driver.playing().is_empty());
        player.tick(&mut audio, Duration::from_millis(40));
        assert_eq!(player.status(), SequenceStatus::Playing);

        finish_current(&mut audio, &driver, &mut player);
        assert_eq!(player.status(), SequenceStatus::Delaying);
        assert_eq!(player.step_index(), 0);

        player.tick(&mut audio, Duration::from_millis(199));
        assert_eq!(player.step_index(), 0);
        player.tick(&mut audio, Duration::from_millis(1));
        assert_eq!(player.step_index(), 1);
        assert_eq!(driver.current(), Some(ResourceId::new("b.mp3")));
    }

    #[test]
    fn test_long_tick_carries_into_next_delay() {
        let (mut audio, driver) = AudioService::manual();
        let mut player = AudioSequencePlayer::new();
        player.play(
            &mut audio,
            vec![
                AudioStep::new("a.mp3").with_post_delay(100),
                AudioStep::new("b.mp3").with_pre_delay(250),
                AudioStep::new("c.mp3").with_pre_delay(500),
            ],
        );
        finish_current(&mut audio, &driver, &mut player);

        // One second covers both delays; the surplus stops at the playing step.
        player.tick(&mut audio, Duration::from_secs(1));
        assert_eq!(player.step_index(), 1);
        assert_eq!(player.status(), SequenceStatus::Playing);
        assert_eq!(driver.current(), Some(ResourceId::new("b.mp3")));

        finish_current(&mut audio, &driver, &mut player);
        player.tick(&mut audio, Duration::from_millis(499));
        assert_eq!(player.status(), SequenceStatus::Delaying);
        player.tick(&mut audio, Duration::from_millis(1));
        assert_eq!(driver.current(), Some(ResourceId::new("c.mp3")));
    }

    #[test]
    fn test_failed_step_does_not_block_sequence() {
        let (mut audio, driver) = AudioService::manual();
        driver.mark_missing("step1.mp3");
        let mut player = AudioSequencePlayer::new();
        let mut list = steps(3);
        list[1].post_delay_ms = Some(50);
        player.play(&mut audio, list);

        finish_current(&mut audio, &driver, &mut player);
        // step1 failed at start; its error arrives on poll.
        pump(&mut audio, &mut player);
        assert_eq!(player.status(), SequenceStatus::Error);
        player.tick(&mut audio, Duration::from_millis(50));
        assert_eq!(player.step_index(), 2);
        finish_current(&mut audio, &driver, &mut player);

        let notes = player.take_notifications();
        assert!(notes.iter().any(|n| matches!(
            n,
            SequenceNotification::StepFailed { index: 1, error }
                if error.failure == ResourceFailure::NotFound
        )));
        assert_eq!(notes.last(), Some(&SequenceNotification::Finished));
    }

    #[test]
    fn test_looping_wraps_to_first_step() {
        let (mut audio, driver) = AudioService::manual();
        let mut player = AudioSequencePlayer::new();
        player.play_with(&mut audio, steps(2), SequenceOptions::looping());

        finish_current(&mut audio, &driver, &mut player);
        finish_current(&mut audio, &driver, &mut player);
        assert_eq!(player.step_index(), 0);
        assert!(player.is_active());
        assert!(player.take_notifications().contains(&SequenceNotification::Looped));

        player.stop(&mut audio);
        assert_eq!(player.status(), SequenceStatus::Stopped);
    }

    #[test]
    fn test_empty_sequence_finishes_immediately() {
        let (mut audio, _driver) = AudioService::manual();
        let mut player = AudioSequencePlayer::new();
        player.play(&mut audio, Vec::new());
        assert_eq!(player.status(), SequenceStatus::Finished);
        assert_eq!(player.take_notifications(), vec![SequenceNotification::Finished]);
    }

    #[test]
    fn test_replay_after_finish_resets_state() {
        let (mut audio, driver) = AudioService::manual();
        let mut player = AudioSequencePlayer::new();
        player.play(&mut audio, steps(1));
        finish_current(&mut audio, &driver, &mut player);
        assert_eq!(player.status(), SequenceStatus::Finished);

        assert!(player.play(&mut audio, steps(2)));
        assert_eq!(player.step_index(), 0);
        assert_eq!(player.status(), SequenceStatus::Playing);
    }

    #[test]
    fn test_events_of_other_owners_ignored() {
        let (mut audio, driver) = AudioService::manual();
        let mut player = AudioSequencePlayer::new();
        player.play(&mut audio, steps(2));

        let stranger = audio.play(OwnerId::new(), &ResourceId::new("other.mp3"));
        driver.finish(stranger);
        pump(&mut audio, &mut player);

        assert_eq!(player.step_index(), 0);
        assert_eq!(player.status(), SequenceStatus::Playing);
    }

    proptest! {
        #[test]
        fn prop_every_step_starts_exactly_once(n in 1usize..12, post in 0u64..30) {
            let (mut audio, driver) = AudioService::manual();
            let mut player = AudioSequencePlayer::new();
            let list: Vec<AudioStep> = steps(n)
                .into_iter()
                .map(|s| s.with_post_delay(post))
                .collect();
            player.play(&mut audio, list);

            while player.is_active() {
                if let Some(handle) = player.current_handle() {
                    driver.finish(handle);
                    pump(&mut audio, &mut player);
                } else {
                    player.tick(&mut audio, Duration::from_millis(post));
                }
            }

            let notes = player.take_notifications();
            prop_assert_eq!(started_count(&notes), n);
            prop_assert_eq!(notes.last(), Some(&SequenceNotification::Finished));
        }
    }
}
