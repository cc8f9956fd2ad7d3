//! pi-cloud-init library
//!
//! Builds the two cloud-init documents a single-board computer reads on
//! first boot (`user-data` and `network-config`) from flags, the
//! environment, and interactive answers.
//!
//! The flow is:
//!
//! ```text
//! QuestionGraph ─► AnswerResolver ─► ResolvedConfiguration ─► DocumentRenderer ─► output
//!                  (flags, env, prompts)                       (SecretMaterializer)
//! ```
//!
//! Resolution finishes before rendering starts, and rendering finishes
//! before anything is written, so a failure at any stage leaves no files.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod logic;
pub mod output;
pub mod questions;
pub mod render;
pub mod secrets;
pub mod types;
pub mod validation;

pub use config::ResolvedConfiguration;
pub use error::{ProvisionError, Result};
pub use input::{NoPrompt, Prompter, TerminalPrompter};
pub use logic::resolver::AnswerResolver;
pub use logic::sources::{EnvMap, FlagMap};
pub use output::OutputTarget;
pub use questions::{FieldSpec, QuestionGraph};
pub use render::{DocumentRenderer, RenderedDocuments};
pub use secrets::SecretMaterializer;
pub use types::{FieldKind, Value};

/// Resolve the standard question graph and render both documents.
pub fn generate(
    flags: &FlagMap,
    env: &EnvMap,
    prompter: &mut dyn Prompter,
    secrets: SecretMaterializer,
) -> Result<(ResolvedConfiguration, RenderedDocuments)> {
    let graph = QuestionGraph::standard();
    let config = AnswerResolver::new(&graph).resolve(flags, env, prompter)?;
    let documents = DocumentRenderer::new(secrets).render(&config)?;
    Ok((config, documents))
}
