//! Interactive input collaborators
//!
//! The resolver asks questions through the [`Prompter`] trait, one method
//! per field kind. Returning `Ok(None)` means "not asked": the resolver then
//! falls back to the field's default or reports the field as missing.
//!
//! - [`TerminalPrompter`] asks on the terminal with `dialoguer` and re-asks
//!   until [`FieldSpec::check_answer`] accepts the answer.
//! - [`NoPrompt`] never asks; it is used for unattended runs.

use crate::error::{ProvisionError, Result};
use crate::questions::FieldSpec;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect, Input, Password};

/// Source of interactive answers
pub trait Prompter {
    /// Ask a yes/no question.
    fn confirm(&mut self, field: &FieldSpec, default: Option<bool>) -> Result<Option<bool>>;

    /// Ask for visible text.
    fn text(&mut self, field: &FieldSpec, default: Option<&str>) -> Result<Option<String>>;

    /// Ask for text that must not be echoed.
    fn secret(&mut self, field: &FieldSpec, default: Option<&str>) -> Result<Option<String>>;

    /// Ask the user to pick one of `choices`.
    fn select(
        &mut self,
        field: &FieldSpec,
        choices: &[&'static str],
        default: Option<&str>,
    ) -> Result<Option<String>>;
}

/// Never answers. Every field falls through to its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl Prompter for NoPrompt {
    fn confirm(&mut self, _field: &FieldSpec, _default: Option<bool>) -> Result<Option<bool>> {
        Ok(None)
    }

    fn text(&mut self, _field: &FieldSpec, _default: Option<&str>) -> Result<Option<String>> {
        Ok(None)
    }

    fn secret(&mut self, _field: &FieldSpec, _default: Option<&str>) -> Result<Option<String>> {
        Ok(None)
    }

    fn select(
        &mut self,
        _field: &FieldSpec,
        _choices: &[&'static str],
        _default: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Asks questions on the controlling terminal
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

fn prompt_error(err: dialoguer::Error) -> ProvisionError {
    match err {
        dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
            ProvisionError::Cancelled
        }
        other => ProvisionError::prompt(other.to_string()),
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, field: &FieldSpec, default: Option<bool>) -> Result<Option<bool>> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(field.prompt)
            .default(default.unwrap_or(false))
            .interact()
            .map_err(prompt_error)?;
        Ok(Some(answer))
    }

    fn text(&mut self, field: &FieldSpec, default: Option<&str>) -> Result<Option<String>> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(field.prompt)
            .allow_empty(default.is_some_and(str::is_empty))
            .validate_with(|value: &String| field.check_answer(value));
        if let Some(default) = default.filter(|d| !d.is_empty()) {
            input = input.default(default.to_string());
        }
        let answer = input.interact_text().map_err(prompt_error)?;
        Ok(Some(answer))
    }

    fn secret(&mut self, field: &FieldSpec, default: Option<&str>) -> Result<Option<String>> {
        let allow_empty = default.is_some_and(str::is_empty);
        loop {
            let answer = Password::with_theme(&self.theme)
                .with_prompt(field.prompt)
                .allow_empty_password(allow_empty)
                .interact()
                .map_err(prompt_error)?;
            if allow_empty && answer.is_empty() {
                return Ok(Some(answer));
            }
            match field.check_answer(&answer) {
                Ok(()) => return Ok(Some(answer)),
                Err(reason) => eprintln!("{reason}"),
            }
        }
    }

    fn select(
        &mut self,
        field: &FieldSpec,
        choices: &[&'static str],
        default: Option<&str>,
    ) -> Result<Option<String>> {
        let default_index = default
            .and_then(|d| choices.iter().position(|c| *c == d))
            .unwrap_or(0);
        let picked = FuzzySelect::with_theme(&self.theme)
            .with_prompt(field.prompt)
            .items(choices)
            .default(default_index)
            .interact_opt()
            .map_err(prompt_error)?;
        match picked.and_then(|i| choices.get(i)) {
            Some(choice) => Ok(Some((*choice).to_string())),
            None => Err(ProvisionError::Cancelled),
        }
    }
}
