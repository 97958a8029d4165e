//! Game runtime.
//!
//! Wires the session machine, the per-problem interaction and the audio
//! service together behind the handful of calls a UI shell makes: start,
//! tap, submit, replay, skip, leave, and a periodic `update` that forwards
//! playback outcomes and elapsed time.

use std::time::Duration;

use phonics_audio::AudioService;
use phonics_common::{AnswerId, ProblemId, UserId};
use tracing::{debug, info, warn};

use crate::catalog::ProblemCatalog;
use crate::config::GameConfig;
use crate::error::GameResult;
use crate::finalize::{FinalizeReport, FinalizeSink};
use crate::problem::Category;
use crate::selector::ProblemSelector;
use crate::session::{GameSession, SessionEvent, SessionProgress, SubmitOutcome};
use crate::tutorial::{
    InteractionEvent, InteractionMode, InteractionSettings, TutorialInteraction,
};

/// Events surfaced to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// Session machine event.
    Session(SessionEvent),
    /// Interaction machine event.
    Interaction(InteractionEvent),
    /// A problem's interaction began.
    ProblemStarted {
        /// Index in the session.
        index: usize,
        /// Category of the problem.
        category: Category,
        /// Problem id.
        problem: ProblemId,
    },
    /// The finalize collaborator failed; completion stands.
    FinalizeFailed(String),
}

/// Runs sessions for a UI shell.
pub struct GameRuntime {
    audio: AudioService,
    catalog: ProblemCatalog,
    selector: ProblemSelector,
    session: GameSession,
    interaction: Option<TutorialInteraction>,
    settings: InteractionSettings,
    sink: Box<dyn FinalizeSink>,
    events: Vec<RuntimeEvent>,
}

impl std::fmt::Debug for GameRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameRuntime")
            .field("session", &self.session)
            .field("interaction", &self.interaction)
            .field("audio", &self.audio)
            .finish_non_exhaustive()
    }
}

impl GameRuntime {
    /// Create a runtime over a loaded catalog.
    pub fn new(
        audio: AudioService,
        catalog: ProblemCatalog,
        config: &GameConfig,
        sink: impl FinalizeSink + 'static,
    ) -> Self {
        Self {
            audio,
            catalog,
            selector: ProblemSelector::new(config.rng_seed),
            session: GameSession::new(),
            interaction: None,
            settings: config.interaction_settings(),
            sink: Box::new(sink),
            events: Vec::new(),
        }
    }

    /// Create a runtime, loading the catalog named by the configuration.
    pub fn from_config(
        audio: AudioService,
        config: &GameConfig,
        sink: impl FinalizeSink + 'static,
    ) -> GameResult<Self> {
        let catalog = ProblemCatalog::load_from(&config.catalog_path)?;
        Ok(Self::new(audio, catalog, config, sink))
    }

    /// The audio service.
    #[must_use]
    pub fn audio(&self) -> &AudioService {
        &self.audio
    }

    /// The catalog.
    #[must_use]
    pub fn catalog(&self) -> &ProblemCatalog {
        &self.catalog
    }

    /// The session machine.
    #[must_use]
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Interaction of the current problem.
    #[must_use]
    pub fn interaction(&self) -> Option<&TutorialInteraction> {
        self.interaction.as_ref()
    }

    /// Progress snapshot.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.session.progress()
    }

    /// Set the user reported on completion.
    pub fn set_user(&mut self, user: Option<UserId>) {
        self.session.set_owner(user);
    }

    /// Drain events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<RuntimeEvent> {
        self.collect();
        std::mem::take(&mut self.events)
    }

    /// Start a session and its first problem.
    pub fn start_session(&mut self, categories: &[Category]) -> GameResult<()> {
        self.session
            .start(&self.catalog, &mut self.selector, categories)?;
        if let Some(mut interaction) = self.interaction.take() {
            interaction.teardown(&mut self.audio);
        }
        self.begin_current();
        Ok(())
    }

    /// Tap a card of the current problem.
    pub fn tap(&mut self, slot: usize) {
        if let Some(interaction) = self.interaction.as_mut() {
            interaction.tap(&mut self.audio, slot);
        }
        self.settle();
    }

    /// Submit an answer for the current problem. Returns whether it was taken.
    pub fn submit(&mut self, answer: AnswerId) -> bool {
        let Some(interaction) = self.interaction.as_mut() else {
            debug!("Ignoring submission of {} with no problem active", answer);
            return false;
        };
        let accepted = interaction.submit(&mut self.audio, answer);
        self.settle();
        accepted
    }

    /// Replay the current phase's narration.
    pub fn replay(&mut self) {
        if let Some(interaction) = self.interaction.as_mut() {
            interaction.replay(&mut self.audio);
        }
        self.settle();
    }

    /// Skip the current phase's narration.
    pub fn skip(&mut self) {
        if let Some(interaction) = self.interaction.as_mut() {
            interaction.skip(&mut self.audio);
        }
        self.settle();
    }

    /// Forward playback outcomes and elapsed time.
    pub fn update(&mut self, elapsed: Duration) {
        let playback = self.audio.poll();
        if let Some(interaction) = self.interaction.as_mut() {
            for event in &playback {
                interaction.on_playback(&mut self.audio, event);
            }
            interaction.tick(&mut self.audio, elapsed);
        }
        self.settle();
    }

    /// Leave the game screen: silence everything and drop the session.
    pub fn leave(&mut self) {
        if let Some(mut interaction) = self.interaction.take() {
            interaction.teardown(&mut self.audio);
            self.forward_interaction_events(&mut interaction);
        }
        self.audio.stop_all();
        self.session.abandon();
        self.collect();
        debug!("Left game screen");
    }

    /// Create the interaction for the session's current problem.
    fn begin_current(&mut self) {
        self.collect();
        let Some(entry) = self.session.current() else {
            return;
        };
        let index = self.session.index();
        let category = entry.category;
        let problem = entry.problem.clone();
        self.events.push(RuntimeEvent::ProblemStarted {
            index,
            category,
            problem: problem.id().clone(),
        });

        let mut interaction = TutorialInteraction::new(
            problem,
            InteractionMode::for_category(category),
            self.settings,
        );
        interaction.start(&mut self.audio);
        self.interaction = Some(interaction);
    }

    /// Hand finished interactions to the session until one is still running.
    fn settle(&mut self) {
        loop {
            self.collect();
            let Some(outcome) = self
                .interaction
                .as_ref()
                .and_then(|i| i.outcome().cloned())
            else {
                return;
            };
            self.interaction = None;

            match self.session.submit_interaction(&outcome) {
                SubmitOutcome::Advanced { .. } => self.begin_current(),
                SubmitOutcome::Completed(report) => {
                    self.collect();
                    self.deliver(&report);
                    return;
                },
                SubmitOutcome::Ignored => return,
            }
        }
    }

    fn deliver(&mut self, report: &FinalizeReport) {
        match self.sink.deliver(report) {
            Ok(()) => info!("Finalize report delivered"),
            Err(e) => {
                warn!("Finalize delivery failed: {e}");
                self.events.push(RuntimeEvent::FinalizeFailed(e.to_string()));
            },
        }
    }

    fn collect(&mut self) {
        if let Some(mut interaction) = self.interaction.take() {
            self.forward_interaction_events(&mut interaction);
            self.interaction = Some(interaction);
        }
        self.events
            .extend(self.session.take_events().into_iter().map(RuntimeEvent::Session));
    }

    fn forward_interaction_events(&mut self, interaction: &mut TutorialInteraction) {
        self.events.extend(
            interaction
                .take_events()
                .into_iter()
                .map(RuntimeEvent::Interaction),
        );
    }
}
