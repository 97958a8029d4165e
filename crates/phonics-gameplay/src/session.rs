//! Game session management.
//!
//! This module handles the progression through one play session:
//! - Expanding requested categories into an ordered problem list
//! - Scoring submitted answers per skill bucket
//! - Advancing, completing and abandoning the session
//! - Producing the finalize report on completion

use std::sync::Arc;

use phonics_common::{AnswerId, ConfigurationError, SchemaVersion, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::ProblemCatalog;
use crate::finalize::FinalizeReport;
use crate::problem::{Category, Problem, Skill};
use crate::selector::ProblemSelector;
use crate::tutorial::{InteractionOutcome, Resolution};

// ============================================================================
// Session State
// ============================================================================

/// Current session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// No session running.
    #[default]
    NotStarted,
    /// Problems are being played.
    InProgress,
    /// Every problem was played; the report was produced.
    Complete,
}

impl SessionState {
    /// Check if answers are accepted.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Check if a new session may start.
    #[must_use]
    pub fn can_start(&self) -> bool {
        matches!(self, Self::NotStarted | Self::Complete)
    }
}

// ============================================================================
// Scores
// ============================================================================

/// Correct answers out of scorable problems in one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    /// Correct answers.
    pub correct: u32,
    /// Scorable problems in the session.
    pub total: u32,
}

/// Per-skill scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    /// All blending categories.
    pub blending: Score,
    /// All segmenting categories.
    pub segmenting: Score,
}

impl ScoreBoard {
    /// Bucket of a skill.
    #[must_use]
    pub fn bucket(&self, skill: Skill) -> Score {
        match skill {
            Skill::Blending => self.blending,
            Skill::Segmenting => self.segmenting,
        }
    }

    fn bucket_mut(&mut self, skill: Skill) -> &mut Score {
        match skill {
            Skill::Blending => &mut self.blending,
            Skill::Segmenting => &mut self.segmenting,
        }
    }
}

// ============================================================================
// Entries, Progress and Events
// ============================================================================

/// One planned problem of the session.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    /// Category the problem was drawn from.
    pub category: Category,
    /// The problem.
    pub problem: Arc<Problem>,
}

/// Snapshot for progress displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    /// Session state.
    pub state: SessionState,
    /// Index of the current problem.
    pub index: usize,
    /// Number of problems in the session.
    pub total: usize,
    /// Category of the current problem.
    pub category: Option<Category>,
    /// Scores so far.
    pub scores: ScoreBoard,
}

/// Events emitted by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Session state changed.
    StateChanged {
        /// Previous state.
        from: SessionState,
        /// New state.
        to: SessionState,
    },
    /// A session started.
    Started {
        /// Number of planned problems.
        problem_count: usize,
    },
    /// A problem was answered and the session moved on.
    Advanced {
        /// Index of the answered problem.
        index: usize,
        /// Whether the answer was correct; None for unscored tutorials.
        scored: Option<bool>,
    },
    /// The session completed.
    Finalized(FinalizeReport),
    /// The session was abandoned before completing.
    Abandoned,
}

/// What a submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No session in progress.
    Ignored,
    /// Moved to the next problem.
    Advanced {
        /// Whether the answer was correct; None for unscored tutorials.
        scored: Option<bool>,
    },
    /// That was the last problem.
    Completed(FinalizeReport),
}

// ============================================================================
// Session Result
// ============================================================================

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session operation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Invalid state transition.
    #[error("invalid session transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// Current state.
        from: SessionState,
        /// Attempted state.
        to: SessionState,
    },
    /// The catalog cannot serve the requested categories.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

// ============================================================================
// Game Session
// ============================================================================

/// Plans, scores and advances one play session.
#[derive(Debug, Default)]
pub struct GameSession {
    /// Current session state.
    state: SessionState,
    /// Planned problems, cleared on completion.
    entries: Vec<SessionEntry>,
    /// Index of the current problem.
    index: usize,
    /// Scores of the running (or last completed) session.
    scores: ScoreBoard,
    /// Escape-valve advances in the running session.
    forced_advances: u32,
    /// User the session runs for.
    owner: Option<UserId>,
    /// Pending events.
    events: Vec<SessionEvent>,
}

impl GameSession {
    /// Create an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Scores of the running (or last completed) session.
    #[must_use]
    pub fn scores(&self) -> ScoreBoard {
        self.scores
    }

    /// Escape-valve advances so far.
    #[must_use]
    pub fn forced_advances(&self) -> u32 {
        self.forced_advances
    }

    /// Index of the current problem.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of planned problems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no problems are planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// User the session runs for.
    #[must_use]
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    /// Set the user reported in finalize reports.
    pub fn set_owner(&mut self, owner: Option<UserId>) {
        self.owner = owner;
    }

    /// Take pending events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// The problem being played.
    #[must_use]
    pub fn current(&self) -> Option<&SessionEntry> {
        if self.state.is_in_progress() {
            self.entries.get(self.index)
        } else {
            None
        }
    }

    /// Progress snapshot.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            state: self.state,
            index: self.index,
            total: self.entries.len(),
            category: self.current().map(|e| e.category),
            scores: self.scores,
        }
    }

    /// Start a session over the requested categories.
    ///
    /// Categories are played in master order whatever order they are requested
    /// in. Nothing changes if the catalog cannot serve every category.
    pub fn start(
        &mut self,
        catalog: &ProblemCatalog,
        selector: &mut ProblemSelector,
        categories: &[Category],
    ) -> SessionResult<()> {
        if !self.state.can_start() {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: SessionState::InProgress,
            });
        }
        if categories.is_empty() {
            return Err(ConfigurationError::NoCategories.into());
        }

        let mut entries = Vec::new();
        let mut scores = ScoreBoard::default();
        for category in Category::MASTER_SEQUENCE {
            if !categories.contains(&category) {
                continue;
            }
            let problems = if category.is_tutorial() {
                catalog.entry(category)?.problems().to_vec()
            } else {
                let drawn = selector.draw_cycle(catalog, category)?;
                let bucket = scores.bucket_mut(category.skill());
                bucket.total += u32::try_from(drawn.len()).unwrap_or(u32::MAX);
                drawn
            };
            entries.extend(
                problems
                    .into_iter()
                    .map(|problem| SessionEntry { category, problem }),
            );
        }

        self.entries = entries;
        self.index = 0;
        self.scores = scores;
        self.forced_advances = 0;
        self.transition_to(SessionState::InProgress)?;
        self.events.push(SessionEvent::Started {
            problem_count: self.entries.len(),
        });
        info!(
            "Session started with {} problems (blending {}, segmenting {})",
            self.entries.len(),
            scores.blending.total,
            scores.segmenting.total
        );
        Ok(())
    }

    /// Submit the answer for the current problem and advance.
    pub fn submit_outcome(&mut self, answer: &AnswerId) -> SubmitOutcome {
        self.advance(answer, false)
    }

    /// Submit a finished interaction's outcome and advance.
    pub fn submit_interaction(&mut self, outcome: &InteractionOutcome) -> SubmitOutcome {
        self.advance(
            &outcome.answer,
            outcome.resolution == Resolution::EscapeValve,
        )
    }

    /// Drop the session without producing a report.
    pub fn abandon(&mut self) {
        if !self.state.is_in_progress() {
            return;
        }
        self.entries.clear();
        self.index = 0;
        self.scores = ScoreBoard::default();
        self.forced_advances = 0;
        // InProgress -> NotStarted is always valid.
        let _ = self.transition_to(SessionState::NotStarted);
        self.events.push(SessionEvent::Abandoned);
        info!("Session abandoned");
    }

    fn advance(&mut self, answer: &AnswerId, forced: bool) -> SubmitOutcome {
        let Some(entry) = self.current() else {
            debug!("Ignoring submission of {} in {:?}", answer, self.state);
            return SubmitOutcome::Ignored;
        };
        let category = entry.category;
        let scored = if category.is_tutorial() {
            None
        } else {
            Some(entry.problem.is_correct(answer))
        };

        if scored == Some(true) {
            self.scores.bucket_mut(category.skill()).correct += 1;
        }
        if forced {
            self.forced_advances += 1;
        }

        let index = self.index;
        self.index += 1;
        self.events.push(SessionEvent::Advanced { index, scored });
        debug!("Problem {} ({}) answered, scored {:?}", index, category, scored);

        if self.index < self.entries.len() {
            return SubmitOutcome::Advanced { scored };
        }

        let report = self.report();
        self.entries.clear();
        self.index = 0;
        // InProgress -> Complete is always valid.
        let _ = self.transition_to(SessionState::Complete);
        self.events.push(SessionEvent::Finalized(report.clone()));
        info!(
            "Session complete: blending {}/{}, segmenting {}/{}",
            report.blending.correct,
            report.blending.total,
            report.segmenting.correct,
            report.segmenting.total
        );
        SubmitOutcome::Completed(report)
    }

    fn report(&self) -> FinalizeReport {
        FinalizeReport {
            schema: SchemaVersion::FINALIZE_REPORT,
            owner: self.owner.clone(),
            blending: self.scores.blending,
            segmenting: self.scores.segmenting,
            forced_advances: self.forced_advances,
        }
    }

    /// Transition to a new state.
    fn transition_to(&mut self, new_state: SessionState) -> SessionResult<()> {
        let old_state = self.state;

        if !Self::is_valid_transition(old_state, new_state) {
            return Err(SessionError::InvalidTransition {
                from: old_state,
                to: new_state,
            });
        }

        self.state = new_state;

        self.events.push(SessionEvent::StateChanged {
            from: old_state,
            to: new_state,
        });

        Ok(())
    }

    /// Check if a state transition is valid.
    #[must_use]
    fn is_valid_transition(from: SessionState, to: SessionState) -> bool {
        matches!(
            (from, to),
            (
                SessionState::NotStarted | SessionState::Complete,
                SessionState::InProgress
            ) | (
                SessionState::InProgress,
                SessionState::Complete | SessionState::NotStarted
            )
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
