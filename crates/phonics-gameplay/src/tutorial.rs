//! Per-problem interaction choreography.
//!
//! Tutorial problems walk through
//!
//! ```text
//! Intro ──▶ Highlight ──▶ Choice ──submit──▶ Feedback ──success──▶ Complete
//!   ▲                                            │
//!   └─────────────── retry (below threshold) ────┤
//!                                                └─ retry (threshold hit) ──▶ Complete
//! ```
//!
//! while regular problems collapse to `Intro ──▶ Choice ──submit──▶ Complete`
//! with a single attempt. Each phase entry stops the sequence player and plays
//! that phase's narration; the phase advances when the narration finishes.

use std::sync::Arc;
use std::time::Duration;

use phonics_audio::{
    AudioSequencePlayer, AudioService, AudioStep, PlaybackEvent, SequenceNotification,
};
use phonics_common::{AnswerId, OwnerId, ResourceError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::narration::{Feedback, NarrationScript, NarrationTiming};
use crate::problem::{Category, Problem, RehearsalMode};

/// Whether a problem runs with tutorial choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionMode {
    /// Full walkthrough with rehearsal, feedback and retries.
    Tutorial,
    /// Intro, then a single scored answer.
    Regular,
}

impl InteractionMode {
    /// Mode used for problems of a category.
    #[must_use]
    pub const fn for_category(category: Category) -> Self {
        if category.is_tutorial() {
            Self::Tutorial
        } else {
            Self::Regular
        }
    }
}

/// Interaction phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TutorialPhase {
    /// Intro narration and prompt media.
    #[default]
    Intro,
    /// Rehearsal of the two cards (tutorial only).
    Highlight,
    /// Waiting for an answer.
    Choice,
    /// Outcome narration (tutorial only).
    Feedback,
    /// Terminal; the outcome is available.
    Complete,
}

impl TutorialPhase {
    /// Whether the phase is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// How an interaction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// A tutorial problem was answered correctly.
    Correct,
    /// Too many tutorial misses; advanced with the last wrong answer.
    EscapeValve,
    /// A regular problem was answered.
    Answered,
}

/// Result handed to the session when an interaction completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionOutcome {
    /// Answer forwarded to the session.
    pub answer: AnswerId,
    /// How the interaction ended.
    pub resolution: Resolution,
}

/// Events emitted by an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    /// Phase changed.
    PhaseChanged {
        /// Previous phase.
        from: TutorialPhase,
        /// New phase.
        to: TutorialPhase,
    },
    /// Answers are now accepted.
    SubmissionEnabled,
    /// A card was tapped and highlighted.
    Highlighted {
        /// Card slot.
        slot: usize,
    },
    /// Feedback was given for a submission.
    FeedbackGiven {
        /// Kind of feedback.
        feedback: Feedback,
        /// Misses counted so far.
        attempts: u32,
    },
    /// A narration step could not be played; the phase continued.
    NarrationFailed {
        /// The failure.
        error: ResourceError,
    },
    /// The interaction reached its terminal phase.
    Completed(InteractionOutcome),
}

/// Tunables of the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionSettings {
    /// Narration pauses.
    pub timing: NarrationTiming,
    /// Tutorial misses after which the problem advances anyway.
    pub escape_after_misses: u32,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            timing: NarrationTiming::default(),
            escape_after_misses: 2,
        }
    }
}

/// Observable interaction state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialState {
    /// Current phase.
    pub phase: TutorialPhase,
    /// Highlighted card slot.
    pub highlighted: Option<usize>,
    /// Misses since the last correct answer.
    pub attempts: u32,
    /// Feedback being narrated.
    pub feedback: Option<Feedback>,
    /// Whether answers are accepted.
    pub submission_enabled: bool,
}

/// Interaction state machine for one problem.
#[derive(Debug)]
pub struct TutorialInteraction {
    problem: Arc<Problem>,
    mode: InteractionMode,
    settings: InteractionSettings,
    player: AudioSequencePlayer,
    phase: TutorialPhase,
    started: bool,
    highlighted: Option<usize>,
    tapped: [bool; 2],
    attempts: u32,
    feedback: Option<Feedback>,
    submission_enabled: bool,
    last_answer: Option<AnswerId>,
    outcome: Option<InteractionOutcome>,
    events: Vec<InteractionEvent>,
}

impl TutorialInteraction {
    /// Create an interaction. Nothing plays until `start`.
    #[must_use]
    pub fn new(
        problem: Arc<Problem>,
        mode: InteractionMode,
        settings: InteractionSettings,
    ) -> Self {
        Self {
            problem,
            mode,
            settings,
            player: AudioSequencePlayer::new(),
            phase: TutorialPhase::Intro,
            started: false,
            highlighted: None,
            tapped: [false; 2],
            attempts: 0,
            feedback: None,
            submission_enabled: false,
            last_answer: None,
            outcome: None,
            events: Vec::new(),
        }
    }

    /// The problem being played.
    #[must_use]
    pub fn problem(&self) -> &Arc<Problem> {
        &self.problem
    }

    /// Interaction mode.
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> TutorialPhase {
        self.phase
    }

    /// Misses since the last correct answer.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether answers are accepted.
    #[must_use]
    pub fn is_submission_enabled(&self) -> bool {
        self.submission_enabled
    }

    /// Owner id of this interaction's sounds.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.player.owner()
    }

    /// Outcome, once complete.
    #[must_use]
    pub fn outcome(&self) -> Option<&InteractionOutcome> {
        self.outcome.as_ref()
    }

    /// Snapshot of the observable state.
    #[must_use]
    pub fn state(&self) -> TutorialState {
        TutorialState {
            phase: self.phase,
            highlighted: self.highlighted,
            attempts: self.attempts,
            feedback: self.feedback,
            submission_enabled: self.submission_enabled,
        }
    }

    /// Drain events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin the intro. Ignored after the first call.
    pub fn start(&mut self, audio: &mut AudioService) {
        if self.started {
            debug!("Interaction for {} already started", self.problem.id());
            return;
        }
        self.started = true;
        self.enter_phase(audio, TutorialPhase::Intro);
        self.pump(audio);
    }

    /// Tap the card at `slot` during tap-both rehearsal.
    pub fn tap(&mut self, audio: &mut AudioService, slot: usize) {
        let rehearsing = self.phase == TutorialPhase::Highlight
            && self.problem.rehearsal_mode() == RehearsalMode::TapBoth;
        if !rehearsing || slot >= self.tapped.len() {
            debug!("Ignoring tap on slot {} in {:?}", slot, self.phase);
            return;
        }

        self.highlighted = Some(slot);
        self.tapped[slot] = true;
        self.events.push(InteractionEvent::Highlighted { slot });

        let steps = self.script().tap(slot);
        self.play(audio, steps);
        self.pump(audio);
    }

    /// Submit an answer. Returns whether it was accepted.
    pub fn submit(&mut self, audio: &mut AudioService, answer: AnswerId) -> bool {
        if !self.submission_enabled || self.phase != TutorialPhase::Choice {
            debug!("Ignoring submission of {} in {:?}", answer, self.phase);
            return false;
        }
        self.submission_enabled = false;
        self.last_answer = Some(answer.clone());

        match self.mode {
            InteractionMode::Regular => {
                self.complete(audio, answer, Resolution::Answered);
            },
            InteractionMode::Tutorial => {
                let feedback = if self.problem.is_correct(&answer) {
                    self.attempts = 0;
                    Feedback::Success
                } else {
                    self.attempts += 1;
                    Feedback::Retry
                };
                self.feedback = Some(feedback);
                self.events.push(InteractionEvent::FeedbackGiven {
                    feedback,
                    attempts: self.attempts,
                });
                self.enter_phase(audio, TutorialPhase::Feedback);
                self.pump(audio);
            },
        }
        true
    }

    /// Feed a playback event from the audio service.
    pub fn on_playback(&mut self, audio: &mut AudioService, event: &PlaybackEvent) {
        self.player.on_playback(audio, event);
        self.pump(audio);
    }

    /// Advance narration timers.
    pub fn tick(&mut self, audio: &mut AudioService, elapsed: Duration) {
        self.player.tick(audio, elapsed);
        self.pump(audio);
    }

    /// Replay the current phase's narration. Keeps the phase and its progress.
    pub fn replay(&mut self, audio: &mut AudioService) {
        if !self.started || self.phase.is_terminal() {
            return;
        }
        debug!("Replaying {:?} narration", self.phase);
        let steps = self.phase_steps();
        self.play(audio, steps);
        self.pump(audio);
    }

    /// Skip the current phase's narration and apply its completion transition.
    pub fn skip(&mut self, audio: &mut AudioService) {
        if !self.started || self.phase.is_terminal() {
            return;
        }
        debug!("Skipping {:?} narration", self.phase);
        self.player.stop(audio);
        self.player.take_notifications();
        self.finish_phase(audio, true);
        self.pump(audio);
    }

    /// Stop all audio owned by the interaction and refuse further input.
    pub fn teardown(&mut self, audio: &mut AudioService) {
        self.player.stop(audio);
        self.player.take_notifications();
        audio.stop_owner(self.player.owner());
        self.submission_enabled = false;
        self.started = true;
        debug!("Interaction for {} torn down in {:?}", self.problem.id(), self.phase);
        self.phase = TutorialPhase::Complete;
    }

    fn script(&self) -> NarrationScript<'_> {
        let narration = match self.mode {
            InteractionMode::Tutorial => self.problem.tutorial(),
            InteractionMode::Regular => None,
        };
        NarrationScript::new(&self.problem, narration, self.settings.timing)
    }

    fn phase_steps(&self) -> Vec<AudioStep> {
        let script = self.script();
        match self.phase {
            TutorialPhase::Intro => script.intro(),
            TutorialPhase::Highlight => match self.problem.rehearsal_mode() {
                RehearsalMode::Single => script.rehearsal(),
                RehearsalMode::TapBoth => {
                    self.highlighted.map(|s| script.tap(s)).unwrap_or_default()
                },
            },
            TutorialPhase::Choice => script.choice_prompt(),
            TutorialPhase::Feedback => {
                self.feedback.map(|f| script.feedback(f)).unwrap_or_default()
            },
            TutorialPhase::Complete => Vec::new(),
        }
    }

    /// Stop whatever plays and start `steps`.
    fn play(&mut self, audio: &mut AudioService, steps: Vec<AudioStep>) {
        self.player.stop(audio);
        self.player.play(audio, steps);
    }

    fn enter_phase(&mut self, audio: &mut AudioService, phase: TutorialPhase) {
        let from = self.phase;
        self.phase = phase;
        self.submission_enabled = false;
        if phase == TutorialPhase::Highlight {
            self.highlighted = None;
            self.tapped = [false; 2];
        }
        if from != phase {
            debug!("Interaction {}: {:?} -> {:?}", self.problem.id(), from, phase);
            self.events.push(InteractionEvent::PhaseChanged { from, to: phase });
        }

        let steps = self.phase_steps();
        self.play(audio, steps);
    }

    /// Route player notifications until no new ones appear.
    fn pump(&mut self, audio: &mut AudioService) {
        loop {
            let notes = self.player.take_notifications();
            if notes.is_empty() {
                break;
            }
            for note in notes {
                match note {
                    SequenceNotification::StepFailed { index, error } => {
                        warn!("Narration step {} failed: {}", index, error);
                        self.events.push(InteractionEvent::NarrationFailed { error });
                    },
                    SequenceNotification::Finished => self.finish_phase(audio, false),
                    SequenceNotification::StepStarted { .. }
                    | SequenceNotification::Looped
                    | SequenceNotification::Stopped => {},
                }
            }
        }
    }

    /// The current phase's narration ended (or was skipped).
    fn finish_phase(&mut self, audio: &mut AudioService, skipped: bool) {
        match self.phase {
            TutorialPhase::Intro => {
                let next = match self.mode {
                    InteractionMode::Tutorial => TutorialPhase::Highlight,
                    InteractionMode::Regular => TutorialPhase::Choice,
                };
                self.enter_phase(audio, next);
            },
            TutorialPhase::Highlight => {
                let rehearsed = match self.problem.rehearsal_mode() {
                    RehearsalMode::Single => true,
                    RehearsalMode::TapBoth => self.tapped.iter().all(|t| *t),
                };
                if rehearsed || skipped {
                    self.enter_phase(audio, TutorialPhase::Choice);
                }
            },
            TutorialPhase::Choice => {
                if !self.submission_enabled {
                    self.submission_enabled = true;
                    self.events.push(InteractionEvent::SubmissionEnabled);
                }
            },
            TutorialPhase::Feedback => match self.feedback {
                Some(Feedback::Success) => {
                    let answer = self.problem.correct().answer.clone();
                    self.complete(audio, answer, Resolution::Correct);
                },
                Some(Feedback::Retry) if self.attempts >= self.settings.escape_after_misses => {
                    let answer = self
                        .last_answer
                        .clone()
                        .unwrap_or_else(|| self.problem.distractor().answer.clone());
                    debug!(
                        "Escape valve after {} misses on {}",
                        self.attempts,
                        self.problem.id()
                    );
                    self.complete(audio, answer, Resolution::EscapeValve);
                },
                Some(Feedback::Retry) | None => {
                    self.feedback = None;
                    self.enter_phase(audio, TutorialPhase::Intro);
                },
            },
            TutorialPhase::Complete => {},
        }
    }

    fn complete(&mut self, audio: &mut AudioService, answer: AnswerId, resolution: Resolution) {
        self.player.stop(audio);
        let from = self.phase;
        self.phase = TutorialPhase::Complete;
        self.submission_enabled = false;
        self.events.push(InteractionEvent::PhaseChanged {
            from,
            to: TutorialPhase::Complete,
        });
        let outcome = InteractionOutcome { answer, resolution };
        self.outcome = Some(outcome.clone());
        self.events.push(InteractionEvent::Completed(outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::fixtures::{blending, narration, segmenting, with_tutorial};
    use phonics_audio::ManualBackend;
    use phonics_common::ResourceId;

    struct Rig {
        audio: AudioService,
        driver: ManualBackend,
        interaction: TutorialInteraction,
    }

    impl Rig {
        fn new(problem: Problem, mode: InteractionMode) -> Self {
            let (audio, driver) = AudioService::manual();
            let settings = InteractionSettings {
                timing: NarrationTiming {
                    phoneme_gap_ms: 0,
                    narration_pause_ms: 0,
                    feedback_pause_ms: 0,
                },
                escape_after_misses: 2,
            };
            let mut rig = Self {
                audio,
                driver,
                interaction: TutorialInteraction::new(Arc::new(problem), mode, settings),
            };
            rig.interaction.start(&mut rig.audio);
            rig
        }

        fn blending_tutorial() -> Self {
            Self::new(
                with_tutorial(blending("bt", "cat", "hat"), narration("bt")),
                InteractionMode::Tutorial,
            )
        }

        /// Finish whatever plays and route the outcome.
        fn finish(&mut self) -> Option<ResourceId> {
            let current = self.driver.current();
            self.driver.finish_all();
            for event in self.audio.poll() {
                self.interaction.on_playback(&mut self.audio, &event);
            }
            current
        }

        /// Finish sounds until the phase changes or nothing plays.
        fn run_phase(&mut self) -> Vec<ResourceId> {
            let phase = self.interaction.phase();
            let mut heard = Vec::new();
            while self.interaction.phase() == phase {
                match self.finish() {
                    Some(resource) => heard.push(resource),
                    None => break,
                }
            }
            heard
        }

        fn submit(&mut self, answer: &str) -> bool {
            self.interaction.submit(&mut self.audio, AnswerId::new(answer))
        }

        fn tap(&mut self, slot: usize) {
            self.interaction.tap(&mut self.audio, slot);
        }

        fn ready_to_answer(&mut self) {
            self.run_phase();
            assert_eq!(self.interaction.phase(), TutorialPhase::Highlight);
            self.tap(0);
            self.finish();
            self.tap(1);
            self.finish();
            assert_eq!(self.interaction.phase(), TutorialPhase::Choice);
            self.run_phase();
            assert!(self.interaction.is_submission_enabled());
        }
    }

    fn res(path: &str) -> ResourceId {
        ResourceId::new(path)
    }

    #[test]
    fn test_intro_plays_narration_then_prompt() {
        let mut rig = Rig::blending_tutorial();
        let heard = rig.run_phase();
        assert_eq!(
            heard,
            vec![
                res("tutorial/bt/intro.mp3"),
                res("sounds/c.mp3"),
                res("sounds/a.mp3"),
                res("sounds/t.mp3"),
            ]
        );
        assert_eq!(rig.interaction.phase(), TutorialPhase::Highlight);
    }

    #[test]
    fn test_tap_both_rehearsal_gates_choice() {
        let mut rig = Rig::blending_tutorial();
        rig.run_phase();

        rig.tap(0);
        assert_eq!(rig.interaction.state().highlighted, Some(0));
        rig.finish();
        assert_eq!(rig.interaction.phase(), TutorialPhase::Highlight);

        rig.tap(1);
        assert_eq!(rig.driver.current(), Some(res("words/hat.mp3")));
        // Choice waits for the last tap's audio.
        assert_eq!(rig.interaction.phase(), TutorialPhase::Highlight);
        rig.finish();
        assert_eq!(rig.interaction.phase(), TutorialPhase::Choice);
        assert_eq!(rig.driver.current(), Some(res("tutorial/bt/prompt.mp3")));
    }

    #[test]
    fn test_submission_ignored_until_prompt_finishes() {
        let mut rig = Rig::blending_tutorial();
        assert!(!rig.submit("cat"));
        rig.run_phase();
        rig.tap(0);
        rig.finish();
        rig.tap(1);
        rig.finish();

        assert!(!rig.submit("cat"));
        rig.run_phase();
        assert!(rig.submit("cat"));
        assert!(!rig.submit("cat"));
    }

    #[test]
    fn test_first_miss_returns_to_intro() {
        let mut rig = Rig::blending_tutorial();
        rig.ready_to_answer();

        assert!(rig.submit("hat"));
        let state = rig.interaction.state();
        assert_eq!(state.phase, TutorialPhase::Feedback);
        assert_eq!(state.feedback, Some(Feedback::Retry));
        assert_eq!(state.attempts, 1);

        let heard = rig.run_phase();
        assert_eq!(heard, vec![res("tutorial/bt/retry.mp3")]);
        let state = rig.interaction.state();
        assert_eq!(state.phase, TutorialPhase::Intro);
        assert_eq!(state.feedback, None);
        assert_eq!(rig.driver.current(), Some(res("tutorial/bt/intro.mp3")));
    }

    #[test]
    fn test_correct_after_miss_resets_attempts() {
        let mut rig = Rig::blending_tutorial();
        rig.ready_to_answer();
        rig.submit("hat");
        rig.run_phase();

        rig.ready_to_answer();
        rig.submit("cat");
        assert_eq!(rig.interaction.attempts(), 0);
        let heard = rig.run_phase();
        assert_eq!(
            heard,
            vec![res("tutorial/bt/success.mp3"), res("tutorial/bt/transition.mp3")]
        );
        assert_eq!(
            rig.interaction.outcome(),
            Some(&InteractionOutcome {
                answer: AnswerId::new("cat"),
                resolution: Resolution::Correct,
            })
        );
    }

    #[test]
    fn test_escape_valve_forwards_last_wrong_answer() {
        let mut rig = Rig::blending_tutorial();
        rig.ready_to_answer();
        rig.submit("hat");
        rig.run_phase();
        rig.ready_to_answer();
        rig.submit("hat");
        assert_eq!(rig.interaction.attempts(), 2);
        rig.run_phase();

        assert_eq!(rig.interaction.phase(), TutorialPhase::Complete);
        assert_eq!(
            rig.interaction.outcome(),
            Some(&InteractionOutcome {
                answer: AnswerId::new("hat"),
                resolution: Resolution::EscapeValve,
            })
        );
        assert_eq!(rig.audio.live_count(), 0);
    }

    #[test]
    fn test_single_rehearsal_plays_automatically() {
        let mut rig = Rig::new(
            with_tutorial(segmenting("st", "dog", "dig"), narration("st")),
            InteractionMode::Tutorial,
        );
        rig.run_phase();
        assert_eq!(rig.interaction.phase(), TutorialPhase::Highlight);
        assert_eq!(rig.driver.current(), Some(res("tutorial/st/rehearsal.mp3")));

        // Taps do nothing in single rehearsal.
        rig.tap(0);
        assert_eq!(rig.interaction.state().highlighted, None);

        rig.finish();
        assert_eq!(rig.interaction.phase(), TutorialPhase::Choice);
    }

    #[test]
    fn test_regular_flow_single_attempt() {
        let mut rig = Rig::new(blending("r1", "sun", "bun"), InteractionMode::Regular);
        let heard = rig.run_phase();
        assert_eq!(heard.len(), 3);
        assert_eq!(rig.interaction.phase(), TutorialPhase::Choice);
        assert!(rig.interaction.is_submission_enabled());

        assert!(rig.submit("bun"));
        assert_eq!(rig.interaction.phase(), TutorialPhase::Complete);
        assert_eq!(
            rig.interaction.outcome().map(|o| o.resolution),
            Some(Resolution::Answered)
        );
        assert!(!rig.submit("sun"));
    }

    #[test]
    fn test_regular_mode_ignores_tutorial_narration() {
        let mut rig = Rig::new(
            with_tutorial(blending("r1", "at", "it"), narration("r1")),
            InteractionMode::Regular,
        );
        let heard = rig.run_phase();
        assert_eq!(heard, vec![res("sounds/a.mp3"), res("sounds/t.mp3")]);
    }

    #[test]
    fn test_missing_narration_clip_does_not_block() {
        let mut rig = Rig::blending_tutorial();
        rig.driver.mark_missing("tutorial/bt/intro.mp3");
        // Already started: restart the intro with the clip missing.
        rig.interaction.replay(&mut rig.audio);
        for event in rig.audio.poll() {
            rig.interaction.on_playback(&mut rig.audio, &event);
        }
        assert!(rig
            .interaction
            .take_events()
            .iter()
            .any(|e| matches!(e, InteractionEvent::NarrationFailed { .. })));
        assert_eq!(rig.driver.current(), Some(res("sounds/c.mp3")));
    }

    #[test]
    fn test_replay_restarts_phase_narration() {
        let mut rig = Rig::blending_tutorial();
        rig.finish();
        assert_eq!(rig.driver.current(), Some(res("sounds/c.mp3")));

        rig.interaction.replay(&mut rig.audio);
        assert_eq!(rig.driver.current(), Some(res("tutorial/bt/intro.mp3")));
        assert_eq!(rig.audio.live_count(), 1);
        assert_eq!(rig.interaction.phase(), TutorialPhase::Intro);
    }

    #[test]
    fn test_skip_applies_phase_transition() {
        let mut rig = Rig::blending_tutorial();
        rig.interaction.skip(&mut rig.audio);
        assert_eq!(rig.interaction.phase(), TutorialPhase::Highlight);

        rig.interaction.skip(&mut rig.audio);
        assert_eq!(rig.interaction.phase(), TutorialPhase::Choice);

        rig.interaction.skip(&mut rig.audio);
        assert!(rig.interaction.is_submission_enabled());
        assert_eq!(rig.audio.live_count(), 0);
    }

    #[test]
    fn test_teardown_silences_everything() {
        let mut rig = Rig::blending_tutorial();
        assert_eq!(rig.audio.live_count(), 1);

        rig.interaction.teardown(&mut rig.audio);
        assert_eq!(rig.audio.live_count(), 0);
        assert!(rig.audio.poll().is_empty());
        assert!(!rig.submit("cat"));
        assert!(rig.interaction.outcome().is_none());
    }
}
