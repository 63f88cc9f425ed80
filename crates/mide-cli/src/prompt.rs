use std::collections::VecDeque;

use anyhow::{Result, anyhow};
use inquire::{Confirm, Select};
use mide_core::guard::ExitResolution;
use mide_core::step::Step;

/// The two questions the form asks interactively.
pub trait PromptDriver {
    fn confirm_reset(&mut self) -> Result<bool>;
    fn choose_exit(&mut self, unsaved: &[Step]) -> Result<ExitResolution>;
}

const EXIT_CHOICES: [(&str, ExitResolution); 3] = [
    ("Keep editing", ExitResolution::Continue),
    ("Save and leave", ExitResolution::Save),
    ("Discard changes and leave", ExitResolution::Discard),
];

fn exit_question(unsaved: &[Step]) -> String {
    format!(
        "Step(s) {} have unsaved changes. What now?",
        Step::join(unsaved)
    )
}

#[derive(Debug, Default)]
pub struct InquirePromptDriver;

impl InquirePromptDriver {
    pub fn new() -> Self {
        Self
    }
}

impl PromptDriver for InquirePromptDriver {
    fn confirm_reset(&mut self) -> Result<bool> {
        Ok(Confirm::new("Discard the reservation in progress?")
            .with_default(false)
            .prompt()?)
    }

    fn choose_exit(&mut self, unsaved: &[Step]) -> Result<ExitResolution> {
        let labels = EXIT_CHOICES
            .iter()
            .map(|(label, _)| *label)
            .collect::<Vec<_>>();
        let selected = Select::new(&exit_question(unsaved), labels).prompt()?;

        EXIT_CHOICES
            .iter()
            .find(|(label, _)| *label == selected)
            .map(|(_, resolution)| *resolution)
            .ok_or_else(|| anyhow!("exit choice {selected:?} is not available"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedAnswer {
    Reset(bool),
    Exit(ExitResolution),
}

/// Replays fixed answers, recording each exit question it was asked.
#[derive(Debug, Default)]
pub struct ScriptedPromptDriver {
    answers: VecDeque<ScriptedAnswer>,
    pub exit_questions: Vec<String>,
}

impl ScriptedPromptDriver {
    pub fn new(answers: Vec<ScriptedAnswer>) -> Self {
        Self {
            answers: answers.into(),
            exit_questions: Vec::new(),
        }
    }

    fn next_answer(&mut self) -> Result<ScriptedAnswer> {
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("prompt answer queue is empty"))
    }
}

impl PromptDriver for ScriptedPromptDriver {
    fn confirm_reset(&mut self) -> Result<bool> {
        match self.next_answer()? {
            ScriptedAnswer::Reset(value) => Ok(value),
            unexpected => Err(anyhow!("expected a reset answer, got {unexpected:?}")),
        }
    }

    fn choose_exit(&mut self, unsaved: &[Step]) -> Result<ExitResolution> {
        self.exit_questions.push(exit_question(unsaved));
        match self.next_answer()? {
            ScriptedAnswer::Exit(resolution) => Ok(resolution),
            unexpected => Err(anyhow!("expected an exit answer, got {unexpected:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_prompt_returns_answers_in_order() {
        let mut prompt = ScriptedPromptDriver::new(vec![
            ScriptedAnswer::Reset(true),
            ScriptedAnswer::Exit(ExitResolution::Discard),
        ]);

        assert!(prompt.confirm_reset().expect("reset"));
        assert_eq!(
            prompt
                .choose_exit(&[Step::FIRST, Step::LAST])
                .expect("exit"),
            ExitResolution::Discard
        );
        assert_eq!(
            prompt.exit_questions,
            vec!["Step(s) 1, 3 have unsaved changes. What now?".to_string()]
        );
    }

    #[test]
    fn scripted_prompt_errors_on_answer_mismatch() {
        let mut prompt =
            ScriptedPromptDriver::new(vec![ScriptedAnswer::Exit(ExitResolution::Save)]);
        let error = prompt.confirm_reset().expect_err("should fail");
        assert!(error.to_string().contains("expected a reset answer"));
    }

    #[test]
    fn scripted_prompt_errors_when_exhausted() {
        let mut prompt = ScriptedPromptDriver::new(vec![]);
        let error = prompt.choose_exit(&[Step::FIRST]).expect_err("should fail");
        assert!(error.to_string().contains("queue is empty"));
    }

    #[test]
    fn exit_choices_cover_every_resolution() {
        let resolutions = EXIT_CHOICES
            .iter()
            .map(|(_, resolution)| *resolution)
            .collect::<Vec<_>>();
        assert_eq!(
            resolutions,
            vec![
                ExitResolution::Continue,
                ExitResolution::Save,
                ExitResolution::Discard,
            ]
        );
    }
}
