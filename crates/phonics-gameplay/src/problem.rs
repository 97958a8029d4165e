//! Problem model.
//!
//! A `Problem` is one exercise: the child hears prompt audio and picks one of
//! two cards. Blending problems play separated sounds ("k", "a", "t") and ask
//! for the picture of the blended word; segmenting problems play a whole word
//! and ask for the card with its separated sounds. Tutorial problems carry an
//! extra narration payload used by the tutorial choreography.
//!
//! Problems are built once from `ProblemDefinition`s when the catalog loads and
//! are immutable afterwards.

use phonics_common::{AnswerId, ConfigurationError, ConfigurationResult, ProblemId, ResourceId};
use serde::{Deserialize, Serialize};

/// Pedagogical skill. Also the scoring bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    /// Merging separated sounds into a word.
    Blending,
    /// Splitting a word into its sounds.
    Segmenting,
}

/// Named group of problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Two-problem walkthrough of the blending mechanic.
    BlendingTutorial,
    /// Blending words that differ in their first sound.
    InitialBlending,
    /// Blending words that differ in their last sound.
    FinalBlending,
    /// Two-problem walkthrough of the segmenting mechanic.
    SegmentingTutorial,
    /// Segmenting words that differ in their first sound.
    InitialSegmenting,
    /// Segmenting words that differ in their last sound.
    FinalSegmenting,
}

impl Category {
    /// Fixed order in which categories are played.
    pub const MASTER_SEQUENCE: [Self; 6] = [
        Self::BlendingTutorial,
        Self::InitialBlending,
        Self::FinalBlending,
        Self::SegmentingTutorial,
        Self::InitialSegmenting,
        Self::FinalSegmenting,
    ];

    /// Skill the category trains.
    #[must_use]
    pub const fn skill(self) -> Skill {
        match self {
            Self::BlendingTutorial | Self::InitialBlending | Self::FinalBlending => Skill::Blending,
            Self::SegmentingTutorial | Self::InitialSegmenting | Self::FinalSegmenting => {
                Skill::Segmenting
            },
        }
    }

    /// Whether the category is an unscored tutorial pairing.
    #[must_use]
    pub const fn is_tutorial(self) -> bool {
        matches!(self, Self::BlendingTutorial | Self::SegmentingTutorial)
    }

    /// Configuration name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BlendingTutorial => "BLENDING_TUTORIAL",
            Self::InitialBlending => "INITIAL_BLENDING",
            Self::FinalBlending => "FINAL_BLENDING",
            Self::SegmentingTutorial => "SEGMENTING_TUTORIAL",
            Self::InitialSegmenting => "INITIAL_SEGMENTING",
            Self::FinalSegmenting => "FINAL_SEGMENTING",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exercise-specific prompt media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProblemVariant {
    /// Separated sounds to be blended, played in order.
    Blending {
        /// One resource per sound.
        sounds: Vec<ResourceId>,
    },
    /// A whole word to be segmented.
    Segmenting {
        /// The spoken word.
        word: ResourceId,
    },
}

/// How the tutorial rehearsal phase works for a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RehearsalMode {
    /// Both cards must be tapped (and heard) before choosing.
    TapBoth,
    /// One rehearsal clip plays by itself.
    Single,
}

/// A selectable card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Answer reference submitted when the card is picked.
    pub answer: AnswerId,
    /// What the card says when tapped.
    pub audio: ResourceId,
    /// Picture shown on the card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ResourceId>,
}

/// Phase narration for tutorial problems. Every clip is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorialNarration {
    /// Played before the prompt media.
    pub intro: Option<ResourceId>,
    /// "Which one is it?" before answers are accepted.
    pub prompt: Option<ResourceId>,
    /// Praise after a correct answer.
    pub success: Option<ResourceId>,
    /// Encouragement after a wrong answer.
    pub retry: Option<ResourceId>,
    /// Bridge to the next problem, after `success`.
    pub transition: Option<ResourceId>,
    /// Single-rehearsal clip (segmenting tutorials).
    pub rehearsal: Option<ResourceId>,
}

/// Catalog record a `Problem` is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDefinition {
    /// Unique problem id.
    pub id: ProblemId,
    /// Prompt media.
    pub variant: ProblemVariant,
    /// Answer of the correct card.
    pub correct: AnswerId,
    /// The two cards, in presentation order.
    pub choices: Vec<Choice>,
    /// Tutorial narration, for tutorial pairings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutorial: Option<TutorialNarration>,
}

/// One immutable exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    id: ProblemId,
    variant: ProblemVariant,
    choices: [Choice; 2],
    correct_slot: usize,
    tutorial: Option<TutorialNarration>,
}

impl Problem {
    /// Validate a definition and build the problem.
    pub fn from_definition(def: ProblemDefinition) -> ConfigurationResult<Self> {
        let ProblemDefinition {
            id,
            variant,
            correct,
            choices,
            tutorial,
        } = def;

        let choices: [Choice; 2] = choices.try_into().map_err(|found: Vec<Choice>| {
            ConfigurationError::Invalid(format!(
                "problem '{id}' must offer exactly two choices, found {}",
                found.len()
            ))
        })?;

        if choices[0].answer == choices[1].answer {
            return Err(ConfigurationError::AmbiguousChoices(id));
        }

        let correct_slot = choices
            .iter()
            .position(|c| c.answer == correct)
            .ok_or_else(|| {
                ConfigurationError::Invalid(format!(
                    "problem '{id}': correct answer '{correct}' is not one of its choices"
                ))
            })?;

        if let ProblemVariant::Blending { sounds } = &variant {
            if sounds.is_empty() {
                return Err(ConfigurationError::Invalid(format!(
                    "blending problem '{id}' has no sounds"
                )));
            }
        }

        Ok(Self {
            id,
            variant,
            choices,
            correct_slot,
            tutorial,
        })
    }

    /// Problem id.
    #[must_use]
    pub fn id(&self) -> &ProblemId {
        &self.id
    }

    /// Prompt media.
    #[must_use]
    pub fn variant(&self) -> &ProblemVariant {
        &self.variant
    }

    /// Skill (and scoring bucket) of the problem.
    #[must_use]
    pub fn skill(&self) -> Skill {
        match self.variant {
            ProblemVariant::Blending { .. } => Skill::Blending,
            ProblemVariant::Segmenting { .. } => Skill::Segmenting,
        }
    }

    /// The two cards, in presentation order.
    #[must_use]
    pub fn choices(&self) -> &[Choice; 2] {
        &self.choices
    }

    /// Card at a presentation slot.
    #[must_use]
    pub fn choice(&self, slot: usize) -> Option<&Choice> {
        self.choices.get(slot)
    }

    /// The correct card.
    #[must_use]
    pub fn correct(&self) -> &Choice {
        &self.choices[self.correct_slot]
    }

    /// The distractor card.
    #[must_use]
    pub fn distractor(&self) -> &Choice {
        &self.choices[1 - self.correct_slot]
    }

    /// Exact-identity check against the correct answer.
    #[must_use]
    pub fn is_correct(&self, answer: &AnswerId) -> bool {
        self.correct().answer == *answer
    }

    /// Tutorial narration, if any.
    #[must_use]
    pub fn tutorial(&self) -> Option<&TutorialNarration> {
        self.tutorial.as_ref()
    }

    /// Rehearsal flavour used when this problem runs as a tutorial.
    #[must_use]
    pub fn rehearsal_mode(&self) -> RehearsalMode {
        match self.variant {
            ProblemVariant::Blending { .. } => RehearsalMode::TapBoth,
            ProblemVariant::Segmenting { .. } => RehearsalMode::Single,
        }
    }

    /// Prompt resources in playback order.
    #[must_use]
    pub fn prompt_media(&self) -> Vec<ResourceId> {
        match &self.variant {
            ProblemVariant::Blending { sounds } => sounds.clone(),
            ProblemVariant::Segmenting { word } => vec![word.clone()],
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_is_correct_identity() {
        let problem = blending("b1", "cat", "hat");
        assert!(problem.is_correct(&AnswerId::new("cat")));
        assert!(!problem.is_correct(&AnswerId::new("hat")));
        assert!(!problem.is_correct(&AnswerId::new("Cat")));
        assert_eq!(problem.distractor().answer, AnswerId::new("hat"));
    }

    #[test]
    fn test_correct_slot_follows_definition() {
        let problem = segmenting("s1", "dog", "dig");
        assert_eq!(problem.choices()[1].answer, AnswerId::new("dog"));
        assert_eq!(problem.correct().answer, AnswerId::new("dog"));
        assert_eq!(problem.skill(), Skill::Segmenting);
        assert_eq!(problem.rehearsal_mode(), RehearsalMode::Single);
    }

    #[test]
    fn test_identical_choices_rejected() {
        let def = ProblemDefinition {
            id: ProblemId::new("dup"),
            variant: ProblemVariant::Segmenting {
                word: ResourceId::new("words/cat.mp3"),
            },
            correct: AnswerId::new("cat"),
            choices: vec![
                Choice {
                    answer: AnswerId::new("cat"),
                    audio: ResourceId::new("a.mp3"),
                    image: None,
                },
                Choice {
                    answer: AnswerId::new("cat"),
                    audio: ResourceId::new("b.mp3"),
                    image: None,
                },
            ],
            tutorial: None,
        };
        assert_eq!(
            Problem::from_definition(def),
            Err(ConfigurationError::AmbiguousChoices(ProblemId::new("dup")))
        );
    }

    #[test]
    fn test_correct_must_be_a_choice() {
        let mut def = ProblemDefinition {
            id: ProblemId::new("x"),
            variant: ProblemVariant::Segmenting {
                word: ResourceId::new("w.mp3"),
            },
            correct: AnswerId::new("zebra"),
            choices: vec![
                Choice {
                    answer: AnswerId::new("cat"),
                    audio: ResourceId::new("a.mp3"),
                    image: None,
                },
                Choice {
                    answer: AnswerId::new("hat"),
                    audio: ResourceId::new("b.mp3"),
                    image: None,
                },
            ],
            tutorial: None,
        };
        assert!(Problem::from_definition(def.clone()).is_err());

        def.choices.pop();
        def.correct = AnswerId::new("cat");
        assert!(Problem::from_definition(def).is_err());
    }

    #[test]
    fn test_category_skills_and_order() {
        assert_eq!(Category::InitialBlending.skill(), Skill::Blending);
        assert_eq!(Category::FinalSegmenting.skill(), Skill::Segmenting);
        assert!(Category::BlendingTutorial.is_tutorial());
        assert!(!Category::InitialSegmenting.is_tutorial());
        assert_eq!(Category::MASTER_SEQUENCE[0], Category::BlendingTutorial);
        assert_eq!(Category::InitialBlending.to_string(), "INITIAL_BLENDING");
    }

    #[test]
    fn test_blending_prompt_plays_sounds_in_order() {
        let problem = blending("b1", "sun", "bun");
        assert_eq!(
            problem.prompt_media(),
            vec![
                ResourceId::new("sounds/s.mp3"),
                ResourceId::new("sounds/u.mp3"),
                ResourceId::new("sounds/n.mp3"),
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_only_correct_answer_is_correct(
            correct in "[a-z]{2,6}",
            distractor in "[a-z]{2,6}",
            other in "[a-z]{1,7}",
        ) {
            prop_assume!(correct != distractor);
            let problem = blending("p", &correct, &distractor);
            prop_assert!(problem.is_correct(&AnswerId::new(correct.clone())));
            prop_assert!(!problem.is_correct(&AnswerId::new(distractor)));
            prop_assert_eq!(problem.is_correct(&AnswerId::new(other.clone())), other == correct);
        }
    }
}
