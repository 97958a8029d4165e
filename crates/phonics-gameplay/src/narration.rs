//! Phase narration scripts.
//!
//! Turns a problem and its optional tutorial narration into the `AudioStep`
//! lists the interaction plays in each phase. An absent narration clip simply
//! omits its step.

use phonics_audio::AudioStep;
use phonics_common::ResourceId;
use serde::{Deserialize, Serialize};

use crate::problem::{Problem, TutorialNarration};

/// Pauses inserted between narration beats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationTiming {
    /// Gap before each separated sound after the first.
    pub phoneme_gap_ms: u64,
    /// Pause after a tutorial narration clip.
    pub narration_pause_ms: u64,
    /// Pause after feedback narration.
    pub feedback_pause_ms: u64,
}

impl Default for NarrationTiming {
    fn default() -> Self {
        Self {
            phoneme_gap_ms: 250,
            narration_pause_ms: 400,
            feedback_pause_ms: 600,
        }
    }
}

/// Kind of feedback given after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feedback {
    /// The answer was correct.
    Success,
    /// The answer was wrong; try again.
    Retry,
}

/// Builds phase step lists for one problem.
#[derive(Debug, Clone, Copy)]
pub struct NarrationScript<'a> {
    problem: &'a Problem,
    narration: Option<&'a TutorialNarration>,
    timing: NarrationTiming,
}

impl<'a> NarrationScript<'a> {
    /// Script for `problem`. Pass `narration` only when running as a tutorial.
    #[must_use]
    pub fn new(
        problem: &'a Problem,
        narration: Option<&'a TutorialNarration>,
        timing: NarrationTiming,
    ) -> Self {
        Self {
            problem,
            narration,
            timing,
        }
    }

    fn clip(&self, pick: fn(&TutorialNarration) -> &Option<ResourceId>) -> Option<ResourceId> {
        self.narration.and_then(|n| pick(n).clone())
    }

    /// Tutorial intro, then the prompt media.
    #[must_use]
    pub fn intro(&self) -> Vec<AudioStep> {
        let mut steps: Vec<AudioStep> = self
            .clip(|n| &n.intro)
            .map(|intro| AudioStep::new(intro).with_post_delay(self.timing.narration_pause_ms))
            .into_iter()
            .collect();

        for (i, resource) in self.problem.prompt_media().into_iter().enumerate() {
            let step = AudioStep::new(resource);
            steps.push(if i == 0 {
                step
            } else {
                step.with_pre_delay(self.timing.phoneme_gap_ms)
            });
        }
        steps
    }

    /// Single rehearsal: the rehearsal clip, or the correct card's audio.
    #[must_use]
    pub fn rehearsal(&self) -> Vec<AudioStep> {
        let resource = self
            .clip(|n| &n.rehearsal)
            .unwrap_or_else(|| self.problem.correct().audio.clone());
        vec![AudioStep::new(resource)]
    }

    /// Audio of the card at `slot`.
    #[must_use]
    pub fn tap(&self, slot: usize) -> Vec<AudioStep> {
        self.problem
            .choice(slot)
            .map(|choice| vec![AudioStep::new(choice.audio.clone())])
            .unwrap_or_default()
    }

    /// "Which one is it?" prompt.
    #[must_use]
    pub fn choice_prompt(&self) -> Vec<AudioStep> {
        self.clip(|n| &n.prompt)
            .map(AudioStep::new)
            .into_iter()
            .collect()
    }

    /// Outcome narration. Success is followed by the transition clip.
    #[must_use]
    pub fn feedback(&self, feedback: Feedback) -> Vec<AudioStep> {
        let clips = match feedback {
            Feedback::Success => vec![self.clip(|n| &n.success), self.clip(|n| &n.transition)],
            Feedback::Retry => vec![self.clip(|n| &n.retry)],
        };
        let mut steps: Vec<AudioStep> = clips.into_iter().flatten().map(AudioStep::new).collect();
        if let Some(last) = steps.pop() {
            steps.push(last.with_post_delay(self.timing.feedback_pause_ms));
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::fixtures::{blending, narration, segmenting};

    fn resources(steps: &[AudioStep]) -> Vec<&str> {
        steps.iter().map(|s| s.resource.as_str()).collect()
    }

    #[test]
    fn test_intro_gaps_between_sounds() {
        let problem = blending("b1", "cat", "hat");
        let tutorial = narration("b1");
        let script = NarrationScript::new(&problem, Some(&tutorial), NarrationTiming::default());
        let steps = script.intro();

        assert_eq!(
            resources(&steps),
            vec![
                "tutorial/b1/intro.mp3",
                "sounds/c.mp3",
                "sounds/a.mp3",
                "sounds/t.mp3"
            ]
        );
        assert_eq!(steps[0].post_delay_ms, Some(400));
        assert_eq!(steps[1].pre_delay_ms, None);
        assert_eq!(steps[2].pre_delay_ms, Some(250));
        assert_eq!(steps[3].pre_delay_ms, Some(250));
    }

    #[test]
    fn test_absent_narration_omits_steps() {
        let problem = segmenting("s1", "dog", "dig");
        let script = NarrationScript::new(&problem, None, NarrationTiming::default());

        assert_eq!(resources(&script.intro()), vec!["words/dog.mp3"]);
        assert!(script.choice_prompt().is_empty());
        assert!(script.feedback(Feedback::Success).is_empty());
        assert_eq!(resources(&script.rehearsal()), vec!["words/dog.mp3"]);
    }

    #[test]
    fn test_success_feedback_ends_with_transition() {
        let problem = segmenting("s1", "dog", "dig");
        let mut tutorial = narration("s1");
        tutorial.success = None;
        let script = NarrationScript::new(&problem, Some(&tutorial), NarrationTiming::default());

        let steps = script.feedback(Feedback::Success);
        assert_eq!(resources(&steps), vec!["tutorial/s1/transition.mp3"]);
        assert_eq!(steps[0].post_delay_ms, Some(600));

        let retry = script.feedback(Feedback::Retry);
        assert_eq!(resources(&retry), vec!["tutorial/s1/retry.mp3"]);
    }

    #[test]
    fn test_tap_out_of_range_is_empty() {
        let problem = blending("b1", "cat", "hat");
        let script = NarrationScript::new(&problem, None, NarrationTiming::default());
        assert_eq!(resources(&script.tap(1)), vec!["words/hat.mp3"]);
        assert!(script.tap(2).is_empty());
    }
}
