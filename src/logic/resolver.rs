//! Answer resolver
//!
//! Walks the question graph once, in declaration order, and produces a
//! [`ResolvedConfiguration`].
//!
//! # Precedence
//!
//! | Order | Source               | Notes                                        |
//! |-------|----------------------|----------------------------------------------|
//! | 1     | command-line flag    | `FieldSpec::cli_binding`                     |
//! | 2     | environment variable | `FieldSpec::env_binding`, empty means unset  |
//! | 3     | interactive answer   | skipped entirely when the prompter declines  |
//! | 4     | default              | missing default on a required field is fatal |
//!
//! Fields whose activation predicate is false are left out of the result
//! and no source is consulted for them.
//!
//! # Wireless normalization
//!
//! Giving `--ssid` or `--ssid-password` implies `--wireless true`, whatever
//! the wireless toggle flag said. This happens on the flag map before the
//! main pass.

use crate::config::ResolvedConfiguration;
use crate::error::{ProvisionError, Result};
use crate::input::Prompter;
use crate::logic::sources::{EnvMap, FlagMap};
use crate::questions::{FieldSpec, QuestionGraph, fields};
use crate::types::{FieldKind, Source, Value};

/// Resolves a [`QuestionGraph`] against captured sources
#[derive(Debug, Clone, Copy)]
pub struct AnswerResolver<'g> {
    graph: &'g QuestionGraph,
}

impl<'g> AnswerResolver<'g> {
    pub fn new(graph: &'g QuestionGraph) -> Self {
        Self { graph }
    }

    /// Resolve every active field.
    ///
    /// # Errors
    ///
    /// - [`ProvisionError::Validation`] when a flag, environment value, or
    ///   prompt answer fails its field's validator.
    /// - [`ProvisionError::MissingRequiredValue`] when an active field gets
    ///   no value from any source and has no default.
    /// - Prompt failures and cancellation from the prompter.
    pub fn resolve(
        &self,
        flags: &FlagMap,
        env: &EnvMap,
        prompter: &mut dyn Prompter,
    ) -> Result<ResolvedConfiguration> {
        let flags = self.normalize_flags(flags);
        let mut resolved = ResolvedConfiguration::new();

        for field in self.graph.iter() {
            if !field.is_active(&resolved) {
                tracing::debug!(field = field.name, "Field inactive, skipped");
                continue;
            }

            let (value, source) = self.resolve_field(field, &flags, env, prompter)?;

            if field.kind.is_secret() {
                tracing::debug!(field = field.name, %source, "Resolved field");
            } else {
                tracing::debug!(field = field.name, %source, %value, "Resolved field");
            }
            resolved.insert(field.name.to_string(), value, source);
        }

        Ok(resolved)
    }

    fn resolve_field(
        &self,
        field: &FieldSpec,
        flags: &FlagMap,
        env: &EnvMap,
        prompter: &mut dyn Prompter,
    ) -> Result<(Value, Source)> {
        if let Some(raw) = field.cli_binding.and_then(|flag| flags.get(flag)) {
            return Ok((accept_raw(field, raw)?, Source::Flag));
        }

        if let Some(raw) = field.env_binding.and_then(|var| env.get(var)) {
            return Ok((accept_raw(field, raw)?, Source::Environment));
        }

        if let Some(answer) = ask(field, prompter)? {
            field
                .check(&answer)
                .map_err(|reason| ProvisionError::validation(field.name, reason))?;
            return Ok((answer, Source::Prompt));
        }

        match &field.default {
            Some(default) => Ok((default.clone(), Source::Default)),
            None => Err(ProvisionError::missing(field.name)),
        }
    }

    /// Apply the wireless-credential rule to a copy of `flags`.
    pub fn normalize_flags(&self, flags: &FlagMap) -> FlagMap {
        let binding = |name: &str| self.graph.get(name).and_then(|f| f.cli_binding);

        let credential_given = [fields::SSID, fields::SSID_PASSWORD]
            .into_iter()
            .filter_map(|name| binding(name))
            .any(|flag| flags.contains(flag));

        let mut normalized = flags.clone();
        if credential_given {
            if let Some(toggle) = binding(fields::USE_WIRELESS) {
                tracing::debug!("Wireless credentials given, enabling wireless");
                normalized.insert(toggle, "true");
            }
        }
        normalized
    }
}

fn accept_raw(field: &FieldSpec, raw: &str) -> Result<Value> {
    let value = field
        .parse(raw)
        .map_err(|reason| ProvisionError::validation(field.name, reason))?;
    field
        .check(&value)
        .map_err(|reason| ProvisionError::validation(field.name, reason))?;
    Ok(value)
}

fn ask(field: &FieldSpec, prompter: &mut dyn Prompter) -> Result<Option<Value>> {
    let default = field.default.as_ref();
    let default_text = default.and_then(Value::as_str);

    let answer = match field.kind {
        FieldKind::Boolean => prompter
            .confirm(field, default.and_then(Value::as_bool))?
            .map(Value::Bool),
        FieldKind::ShortText | FieldKind::FreeText => {
            prompter.text(field, default_text)?.map(Value::Text)
        }
        FieldKind::SecretText => prompter.secret(field, default_text)?.map(Value::Text),
        FieldKind::EnumerableText => {
            let choices = field.choices.map(|c| c()).unwrap_or_default();
            prompter
                .select(field, &choices, default_text)?
                .map(Value::Text)
        }
    };
    Ok(answer)
}
