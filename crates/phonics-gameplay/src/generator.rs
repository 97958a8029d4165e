//! Randomized problem generation from an asset listing.
//!
//! Builds blending or segmenting pools from whatever word assets the shell
//! reports. Each generated problem targets one listed word and draws its
//! distractor from the same listing.

use phonics_common::{AnswerId, ConfigurationError, ConfigurationResult, ProblemId, ResourceId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::problem::{Choice, Problem, ProblemDefinition, ProblemVariant, Skill};
use crate::selector::ShuffledQueue;

/// Kind of word asset a listing is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Words with a pre-sliced sounds clip.
    BlendingWord,
    /// Words with a segmented-sounds clip.
    SegmentingWord,
}

impl AssetKind {
    /// Asset kind that feeds a skill.
    #[must_use]
    pub const fn for_skill(skill: Skill) -> Self {
        match skill {
            Skill::Blending => Self::BlendingWord,
            Skill::Segmenting => Self::SegmentingWord,
        }
    }

    /// Short name used in generated ids.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BlendingWord => "blending",
            Self::SegmentingWord => "segmenting",
        }
    }
}

/// Reports available word assets.
pub trait AssetListing {
    /// Word ids available for `kind`.
    fn list(&self, kind: AssetKind) -> Vec<String>;
}

/// Fixed in-memory listing.
#[derive(Debug, Clone, Default)]
pub struct StaticListing {
    blending: Vec<String>,
    segmenting: Vec<String>,
}

impl StaticListing {
    /// Empty listing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the words listed for `kind`.
    #[must_use]
    pub fn with<I, S>(mut self, kind: AssetKind, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = words.into_iter().map(Into::into).collect();
        match kind {
            AssetKind::BlendingWord => self.blending = words,
            AssetKind::SegmentingWord => self.segmenting = words,
        }
        self
    }
}

impl AssetListing for StaticListing {
    fn list(&self, kind: AssetKind) -> Vec<String> {
        match kind {
            AssetKind::BlendingWord => self.blending.clone(),
            AssetKind::SegmentingWord => self.segmenting.clone(),
        }
    }
}

/// Resource path templates. `{word}` is replaced by the word id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetLayout {
    /// Sliced sounds of a word, the blending prompt.
    pub blending_sounds: String,
    /// Whole spoken word.
    pub word_audio: String,
    /// Segmented sounds of a word, the segmenting card audio.
    pub segmented_audio: String,
    /// Card picture.
    pub image: Option<String>,
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self {
            blending_sounds: "blending/{word}_sounds.mp3".to_string(),
            word_audio: "words/{word}.mp3".to_string(),
            segmented_audio: "segments/{word}.mp3".to_string(),
            image: Some("images/{word}.png".to_string()),
        }
    }
}

impl AssetLayout {
    fn resolve(template: &str, word: &str) -> ResourceId {
        ResourceId::new(template.replace("{word}", word))
    }

    fn choice(&self, kind: AssetKind, word: &str) -> Choice {
        let audio = match kind {
            AssetKind::BlendingWord => &self.word_audio,
            AssetKind::SegmentingWord => &self.segmented_audio,
        };
        Choice {
            answer: AnswerId::new(word),
            audio: Self::resolve(audio, word),
            image: self.image.as_deref().map(|t| Self::resolve(t, word)),
        }
    }

    fn variant(&self, kind: AssetKind, word: &str) -> ProblemVariant {
        match kind {
            AssetKind::BlendingWord => ProblemVariant::Blending {
                sounds: vec![Self::resolve(&self.blending_sounds, word)],
            },
            AssetKind::SegmentingWord => ProblemVariant::Segmenting {
                word: Self::resolve(&self.word_audio, word),
            },
        }
    }
}

/// Generates problems from listed word assets.
#[derive(Debug)]
pub struct RandomizedGenerator {
    layout: AssetLayout,
    rng: fastrand::Rng,
    /// Number of `generate` calls so far; keeps ids unique across batches.
    batch: u32,
}

impl Default for RandomizedGenerator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RandomizedGenerator {
    /// Create a generator with the default layout.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            layout: AssetLayout::default(),
            rng,
            batch: 0,
        }
    }

    /// Use a custom resource layout.
    #[must_use]
    pub fn with_layout(mut self, layout: AssetLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Generate up to `count` problems, one per distinct listed word.
    ///
    /// Needs at least two distinct words so every problem has a distractor.
    /// Ids carry the batch number, so pools generated from the same listing
    /// for several categories can share one catalog.
    pub fn generate(
        &mut self,
        listing: &dyn AssetListing,
        kind: AssetKind,
        count: usize,
    ) -> ConfigurationResult<Vec<Problem>> {
        let mut words = listing.list(kind);
        words.sort_unstable();
        words.dedup();
        if words.len() < 2 {
            return Err(ConfigurationError::Invalid(format!(
                "{} generation needs at least two words, found {}",
                kind.as_str(),
                words.len()
            )));
        }

        let batch = self.batch;
        self.batch += 1;
        let count = count.min(words.len());
        let mut targets = ShuffledQueue::new(words.len());
        let mut problems = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(target) = targets.draw_index(&mut self.rng) else {
                break;
            };
            let mut other = self.rng.usize(0..words.len() - 1);
            if other >= target {
                other += 1;
            }
            problems.push(self.build(kind, batch, &words[target], &words[other])?);
        }

        debug!("Generated {} {} problems", problems.len(), kind.as_str());
        Ok(problems)
    }

    fn build(
        &mut self,
        kind: AssetKind,
        batch: u32,
        word: &str,
        distractor: &str,
    ) -> ConfigurationResult<Problem> {
        let correct = self.layout.choice(kind, word);
        let other = self.layout.choice(kind, distractor);
        let choices = if self.rng.bool() {
            vec![correct, other]
        } else {
            vec![other, correct]
        };
        Problem::from_definition(ProblemDefinition {
            id: ProblemId::new(format!("gen-{}-{batch}-{word}", kind.as_str())),
            variant: self.layout.variant(kind, word),
            correct: AnswerId::new(word),
            choices,
            tutorial: None,
        })
    }
}
