//! Document rendering
//!
//! Turns a [`ResolvedConfiguration`] into the two cloud-init documents:
//!
//! - `user-data` ([`user_data`]): hostname, time zone, the user account,
//!   SSH policy, and the optional Tailscale enrollment commands.
//! - `network-config` ([`network`]): netplan v2 with an optional `wifis`
//!   section and the `ethernets` section.
//!
//! Each document is a fixed sequence of [`DocumentBlock`]s joined by
//! newlines. A block whose governing field is absent renders as empty text,
//! and [`compose`] drops every blank line afterwards, so omitted features
//! leave no trace in the output.
//!
//! Rendering never decides activation itself. It only asks whether a field
//! is present in the configuration it was given.

pub mod network;
pub mod user_data;

use crate::config::ResolvedConfiguration;
use crate::error::{ProvisionError, Result};
use crate::secrets::SecretMaterializer;

/// A named fragment of document text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlock {
    name: &'static str,
    text: String,
}

impl DocumentBlock {
    pub fn new(name: &'static str, text: impl Into<String>) -> Self {
        Self {
            name,
            text: text.into(),
        }
    }

    /// Block that contributes nothing to the document
    pub fn empty(name: &'static str) -> Self {
        Self::new(name, String::new())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// The two generated documents, without trailing newlines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocuments {
    pub user_data: String,
    pub network_config: String,
}

/// Renders both documents from a resolved configuration
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    secrets: SecretMaterializer,
}

impl DocumentRenderer {
    pub fn new(secrets: SecretMaterializer) -> Self {
        Self { secrets }
    }

    /// Render `user-data` and `network-config`.
    ///
    /// Both documents are fully built before this returns, so a failure
    /// (unreadable key, hashing error) leaves nothing half-written.
    pub fn render(&self, config: &ResolvedConfiguration) -> Result<RenderedDocuments> {
        let user_data = user_data::render(config, &self.secrets)?;
        let network_config = network::render(config);
        tracing::debug!(
            user_data_lines = user_data.lines().count(),
            network_config_lines = network_config.lines().count(),
            "Rendered documents"
        );
        Ok(RenderedDocuments {
            user_data,
            network_config,
        })
    }
}

/// Join blocks in order and drop every blank line.
pub fn compose(blocks: &[DocumentBlock]) -> String {
    let joined = blocks
        .iter()
        .map(DocumentBlock::text)
        .collect::<Vec<_>>()
        .join("\n");
    strip_blank_lines(&joined)
}

/// Remove lines that are empty or whitespace-only.
pub fn strip_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Double-quoted YAML scalar with `\`, `"`, and control characters escaped.
pub fn yaml_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Text of a field the document cannot do without.
pub(crate) fn require<'c>(config: &'c ResolvedConfiguration, name: &str) -> Result<&'c str> {
    config
        .non_empty_text(name)
        .ok_or_else(|| ProvisionError::missing(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_blank_lines() {
        let text = "a:\n\n  b: 1\n   \n\t\nc: 2\n";
        assert_eq!(strip_blank_lines(text), "a:\n  b: 1\nc: 2");
    }

    #[test]
    fn test_compose_skips_empty_blocks() {
        let blocks = [
            DocumentBlock::new("head", "network:\n  version: 2"),
            DocumentBlock::empty("wifis"),
            DocumentBlock::new("ethernets", "  ethernets:\n"),
        ];
        assert_eq!(compose(&blocks), "network:\n  version: 2\n  ethernets:");
        assert!(blocks[1].is_empty());
        assert_eq!(blocks[1].name(), "wifis");
    }

    #[test]
    fn test_yaml_quote() {
        assert_eq!(yaml_quote("HomeNet"), "\"HomeNet\"");
        assert_eq!(yaml_quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(yaml_quote("back\\slash"), "\"back\\\\slash\"");
        assert_eq!(yaml_quote("a\nb"), "\"a\\nb\"");
        assert_eq!(yaml_quote("bell\u{7}"), "\"bell\\u0007\"");
    }
}
