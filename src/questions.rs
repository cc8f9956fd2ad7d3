//! Question graph
//!
//! Declares every configurable field in resolution order. Each
//! [`FieldSpec`] carries its kind, default, flag and environment bindings,
//! an activation predicate over the fields resolved before it, and a
//! validator.
//!
//! # Ordering rule
//!
//! A field's activation may only read fields declared earlier. Every field
//! lists those fields in `depends_on`, and [`QuestionGraph::new`] rejects a
//! graph that names a later or unknown field. One linear pass over the
//! graph is therefore always enough to resolve it.
//!
//! | Field group            | Active when                      |
//! |------------------------|----------------------------------|
//! | `output_dir`           | not a dry run                    |
//! | `exit_node`            | a Tailscale key was supplied     |
//! | static wired addresses | `use_static`                     |
//! | wireless credentials   | `use_wireless`                   |
//! | `wireless_ip`          | `use_wireless` and `use_static`  |

use crate::config::ResolvedConfiguration;
use crate::types::{FieldKind, Value, parse_bool};
use crate::validation::{self, Validator};
use std::collections::HashSet;
use thiserror::Error;

/// Stable field names
pub mod fields {
    pub const DRY_RUN: &str = "dry_run";
    pub const OUTPUT_DIR: &str = "output_dir";
    pub const HOSTNAME: &str = "hostname";
    pub const TIME_ZONE: &str = "time_zone";
    pub const USER: &str = "user";
    pub const USER_PASSWORD: &str = "user_password";
    pub const SSH_KEY: &str = "ssh_key";
    pub const TAILSCALE_KEY: &str = "tailscale_key";
    pub const EXIT_NODE: &str = "exit_node";
    pub const USE_STATIC: &str = "use_static";
    pub const ETHERNET_IP: &str = "ethernet_ip";
    pub const ROUTER: &str = "router";
    pub const NAMESERVERS: &str = "nameservers";
    pub const USE_WIRELESS: &str = "use_wireless";
    pub const SSID: &str = "ssid";
    pub const SSID_PASSWORD: &str = "ssid_password";
    pub const COUNTRY: &str = "country";
    pub const WIRELESS_IP: &str = "wireless_ip";
}

/// Environment variable that can supply the Tailscale auth key.
pub const TAILSCALE_KEY_ENV: &str = "TAILSCALE_AUTHKEY";

/// Predicate over the fields resolved so far.
pub type Activation = fn(&ResolvedConfiguration) -> bool;

/// Produces the allowed values of an enumerable field.
pub type Choices = fn() -> Vec<&'static str>;

/// Errors in a graph declaration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Field '{name}' is declared twice")]
    DuplicateField { name: String },

    #[error("Field '{field}' depends on unknown field '{dependency}'")]
    UnknownDependency { field: String, dependency: String },

    #[error("Field '{field}' depends on '{dependency}', which is declared after it")]
    ForwardDependency { field: String, dependency: String },

    #[error("Default for field '{field}' fails its own validator: {reason}")]
    InvalidDefault { field: String, reason: String },

    #[error("Enumerable field '{field}' has no choices")]
    MissingChoices { field: String },
}

fn always(_: &ResolvedConfiguration) -> bool {
    true
}

/// Declaration of one configurable setting
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Unique, stable identifier
    pub name: &'static str,
    pub kind: FieldKind,
    /// Question shown by interactive prompts
    pub prompt: &'static str,
    /// Used when no source supplies a value; `None` makes the field required
    pub default: Option<Value>,
    /// Long flag name, without the leading dashes
    pub cli_binding: Option<&'static str>,
    /// Environment variable consulted after the flag
    pub env_binding: Option<&'static str>,
    /// Earlier fields read by `activation`
    pub depends_on: &'static [&'static str],
    pub activation: Activation,
    pub validator: Validator,
    /// Extra check applied to interactive answers only, so a bad answer is
    /// asked again instead of failing later
    pub prompt_check: Option<Validator>,
    /// Allowed values, for enumerable fields
    pub choices: Option<Choices>,
}

impl FieldSpec {
    /// Field that is always active, required, and bound to nothing.
    pub fn new(name: &'static str, kind: FieldKind, prompt: &'static str) -> Self {
        Self {
            name,
            kind,
            prompt,
            default: None,
            cli_binding: None,
            env_binding: None,
            depends_on: &[],
            activation: always,
            validator: if kind.is_boolean() {
                validation::boolean
            } else {
                validation::any
            },
            prompt_check: None,
            choices: None,
        }
    }

    pub fn flag(mut self, long: &'static str) -> Self {
        self.cli_binding = Some(long);
        self
    }

    pub fn env(mut self, var: &'static str) -> Self {
        self.env_binding = Some(var);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Only ask for this field when `activation` holds for the fields in
    /// `depends_on`.
    pub fn when(mut self, depends_on: &'static [&'static str], activation: Activation) -> Self {
        self.depends_on = depends_on;
        self.activation = activation;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn check_when_prompted(mut self, check: Validator) -> Self {
        self.prompt_check = Some(check);
        self
    }

    pub fn choices(mut self, choices: Choices) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn is_active(&self, resolved: &ResolvedConfiguration) -> bool {
        (self.activation)(resolved)
    }

    /// Turn raw flag or environment text into a value of this field's kind.
    /// The value is not validated.
    pub fn parse(&self, raw: &str) -> Result<Value, String> {
        if self.kind.is_boolean() {
            parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| format!("'{raw}' is not a yes/no value"))
        } else {
            Ok(Value::Text(raw.to_string()))
        }
    }

    /// Check typed interactive text: the validator, then the prompt-only check.
    pub fn check_answer(&self, text: &str) -> Result<(), String> {
        (self.validator)(text)?;
        match self.prompt_check {
            Some(check) => check(text),
            None => Ok(()),
        }
    }

    /// Check a value against this field's kind and validator.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match (self.kind.is_boolean(), value) {
            (true, Value::Bool(_)) => Ok(()),
            (true, Value::Text(t)) => Err(format!("expected yes/no, got '{t}'")),
            (false, Value::Bool(_)) => Err("expected text, got a yes/no value".to_string()),
            (false, Value::Text(t)) => (self.validator)(t),
        }
    }
}

/// Ordered, checked set of [`FieldSpec`]s
#[derive(Debug, Clone)]
pub struct QuestionGraph {
    fields: Vec<FieldSpec>,
}

impl QuestionGraph {
    /// Build a graph, rejecting duplicates, forward or unknown
    /// dependencies, invalid defaults, and enumerable fields without choices.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, GraphError> {
        let all: HashSet<&str> = fields.iter().map(|f| f.name).collect();
        let mut seen: HashSet<&str> = HashSet::new();

        for field in &fields {
            for dependency in field.depends_on {
                if seen.contains(dependency) {
                    continue;
                }
                let field = field.name.to_string();
                let dependency = dependency.to_string();
                // a field naming itself counts as a forward reference
                return Err(if all.contains(dependency.as_str()) {
                    GraphError::ForwardDependency { field, dependency }
                } else {
                    GraphError::UnknownDependency { field, dependency }
                });
            }

            if let Some(default) = &field.default {
                field
                    .check(default)
                    .map_err(|reason| GraphError::InvalidDefault {
                        field: field.name.to_string(),
                        reason,
                    })?;
            }

            if field.kind == FieldKind::EnumerableText && field.choices.is_none() {
                return Err(GraphError::MissingChoices {
                    field: field.name.to_string(),
                });
            }

            if !seen.insert(field.name) {
                return Err(GraphError::DuplicateField {
                    name: field.name.to_string(),
                });
            }
        }

        Ok(Self { fields })
    }

    /// The question set for a first-boot cloud-init document pair.
    pub fn standard() -> Self {
        Self {
            fields: standard_fields(),
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }
}

fn standard_fields() -> Vec<FieldSpec> {
    use fields::*;

    vec![
        FieldSpec::new(DRY_RUN, FieldKind::Boolean, "Perform a dry run?")
            .flag("dry-run")
            .default_value(false),
        FieldSpec::new(OUTPUT_DIR, FieldKind::FreeText, "Directory to write files to:")
            .flag("file")
            .default_value(".")
            .when(&[DRY_RUN], |c| !c.flag(DRY_RUN))
            .validate(validation::existing_directory),
        FieldSpec::new(HOSTNAME, FieldKind::ShortText, "Enter hostname:")
            .flag("hostname")
            .validate(validation::hostname),
        FieldSpec::new(TIME_ZONE, FieldKind::EnumerableText, "Select time zone:")
            .flag("time-zone")
            .default_value("UTC")
            .validate(validation::time_zone)
            .choices(validation::time_zone_names),
        FieldSpec::new(USER, FieldKind::ShortText, "Enter unprivileged user:")
            .flag("user")
            .validate(validation::username),
        FieldSpec::new(
            USER_PASSWORD,
            FieldKind::SecretText,
            "Enter password for unprivileged user (empty locks password login):",
        )
        .flag("password")
        .default_value(""),
        FieldSpec::new(SSH_KEY, FieldKind::FreeText, "Path to SSH public key (empty for none):")
            .flag("ssh-key")
            .default_value("")
            .check_when_prompted(validation::optional_existing_file),
        FieldSpec::new(
            TAILSCALE_KEY,
            FieldKind::SecretText,
            "Tailscale auth key (empty to skip enrollment):",
        )
        .flag("tailscale-key")
        .env(TAILSCALE_KEY_ENV)
        .default_value(""),
        FieldSpec::new(EXIT_NODE, FieldKind::Boolean, "Advertise as a Tailscale exit node?")
            .flag("exit-node")
            .default_value(false)
            .when(&[TAILSCALE_KEY], |c| c.non_empty_text(TAILSCALE_KEY).is_some()),
        FieldSpec::new(USE_STATIC, FieldKind::Boolean, "Use static addressing?")
            .flag("static")
            .default_value(false),
        FieldSpec::new(ETHERNET_IP, FieldKind::ShortText, "Wired address (CIDR, e.g. 192.168.1.20/24):")
            .flag("ethernet-ip")
            .when(&[USE_STATIC], |c| c.flag(USE_STATIC))
            .validate(validation::ipv4_cidr),
        FieldSpec::new(ROUTER, FieldKind::ShortText, "Gateway address:")
            .flag("router")
            .when(&[USE_STATIC], |c| c.flag(USE_STATIC))
            .validate(validation::ipv4),
        FieldSpec::new(NAMESERVERS, FieldKind::ShortText, "Nameservers (comma separated):")
            .flag("nameservers")
            .when(&[USE_STATIC], |c| c.flag(USE_STATIC))
            .validate(validation::ipv4_list),
        FieldSpec::new(USE_WIRELESS, FieldKind::Boolean, "Connect to a wireless network?")
            .flag("wireless")
            .default_value(false),
        FieldSpec::new(SSID, FieldKind::ShortText, "Connect to which wireless network?")
            .flag("ssid")
            .when(&[USE_WIRELESS], |c| c.flag(USE_WIRELESS))
            .validate(validation::non_empty),
        FieldSpec::new(SSID_PASSWORD, FieldKind::SecretText, "Password for wireless network:")
            .flag("ssid-password")
            .when(&[USE_WIRELESS], |c| c.flag(USE_WIRELESS))
            .validate(validation::non_empty),
        FieldSpec::new(COUNTRY, FieldKind::ShortText, "Wireless regulatory domain:")
            .flag("country")
            .default_value("US")
            .when(&[USE_WIRELESS], |c| c.flag(USE_WIRELESS))
            .validate(validation::country_code),
        FieldSpec::new(WIRELESS_IP, FieldKind::ShortText, "Wireless address (CIDR):")
            .flag("wireless-ip")
            .when(&[USE_WIRELESS, USE_STATIC], |c| {
                c.flag(USE_WIRELESS) && c.flag(USE_STATIC)
            })
            .validate(validation::ipv4_cidr),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_graph_is_well_formed() {
        let graph = QuestionGraph::standard();
        assert!(QuestionGraph::new(graph.fields().to_vec()).is_ok());
    }

    #[test]
    fn test_standard_graph_bindings() {
        let graph = QuestionGraph::standard();

        let with_env: Vec<&str> = graph
            .iter()
            .filter(|f| f.env_binding.is_some())
            .map(|f| f.name)
            .collect();
        assert_eq!(with_env, vec![fields::TAILSCALE_KEY]);

        let flags: Vec<&str> = graph.iter().filter_map(|f| f.cli_binding).collect();
        for expected in [
            "dry-run",
            "file",
            "hostname",
            "time-zone",
            "user",
            "password",
            "tailscale-key",
            "ssh-key",
            "ssid",
            "ssid-password",
        ] {
            assert!(flags.contains(&expected), "missing flag binding {expected}");
        }
    }

    #[test]
    fn test_ssh_key_checked_only_when_prompted() {
        let graph = QuestionGraph::standard();
        let ssh_key = graph.get(fields::SSH_KEY).unwrap();
        let missing = "/definitely/not/here.pub";

        // flag input passes through and fails later as an unreadable key
        assert!(ssh_key.check(&Value::from(missing)).is_ok());
        assert!(ssh_key.check_answer(missing).is_err());
        assert!(ssh_key.check_answer("").is_ok());

        let key = tempfile::NamedTempFile::new().unwrap();
        assert!(ssh_key.check_answer(key.path().to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_activation_rules() {
        let graph = QuestionGraph::standard();
        let active = |name: &str, config: &ResolvedConfiguration| {
            graph.get(name).unwrap().is_active(config)
        };

        let plain = ResolvedConfiguration::from_values([
            (fields::USE_STATIC, false),
            (fields::USE_WIRELESS, false),
        ]);
        for name in [fields::ETHERNET_IP, fields::ROUTER, fields::NAMESERVERS] {
            assert!(!active(name, &plain));
        }
        for name in [fields::SSID, fields::SSID_PASSWORD, fields::WIRELESS_IP] {
            assert!(!active(name, &plain));
        }

        let wireless_only = ResolvedConfiguration::from_values([
            (fields::USE_STATIC, false),
            (fields::USE_WIRELESS, true),
        ]);
        assert!(active(fields::SSID, &wireless_only));
        assert!(active(fields::SSID_PASSWORD, &wireless_only));
        assert!(!active(fields::WIRELESS_IP, &wireless_only));

        let both = ResolvedConfiguration::from_values([
            (fields::USE_STATIC, true),
            (fields::USE_WIRELESS, true),
        ]);
        assert!(active(fields::ETHERNET_IP, &both));
        assert!(active(fields::WIRELESS_IP, &both));
    }

    #[test]
    fn test_exit_node_needs_tailscale_key() {
        let graph = QuestionGraph::standard();
        let exit_node = graph.get(fields::EXIT_NODE).unwrap();

        let without = ResolvedConfiguration::from_values([(fields::TAILSCALE_KEY, "")]);
        let with = ResolvedConfiguration::from_values([(fields::TAILSCALE_KEY, "tskey-abc")]);
        assert!(!exit_node.is_active(&without));
        assert!(exit_node.is_active(&with));
    }

    #[test]
    fn test_forward_dependency_rejected() {
        let fields = vec![
            FieldSpec::new("a", FieldKind::ShortText, "a?").when(&["b"], |_| true),
            FieldSpec::new("b", FieldKind::Boolean, "b?"),
        ];
        assert_eq!(
            QuestionGraph::new(fields).unwrap_err(),
            GraphError::ForwardDependency {
                field: "a".into(),
                dependency: "b".into()
            }
        );
    }

    #[test]
    fn test_unknown_and_duplicate_rejected() {
        let unknown = vec![FieldSpec::new("a", FieldKind::ShortText, "a?").when(&["zzz"], |_| true)];
        assert!(matches!(
            QuestionGraph::new(unknown),
            Err(GraphError::UnknownDependency { .. })
        ));

        let duplicate = vec![
            FieldSpec::new("a", FieldKind::ShortText, "a?"),
            FieldSpec::new("a", FieldKind::ShortText, "again?"),
        ];
        assert!(matches!(
            QuestionGraph::new(duplicate),
            Err(GraphError::DuplicateField { .. })
        ));
    }

    #[test]
    fn test_bad_default_and_missing_choices_rejected() {
        let bad_default = vec![
            FieldSpec::new("host", FieldKind::ShortText, "host?")
                .default_value("-bad-")
                .validate(validation::hostname),
        ];
        assert!(matches!(
            QuestionGraph::new(bad_default),
            Err(GraphError::InvalidDefault { .. })
        ));

        let no_choices = vec![FieldSpec::new("tz", FieldKind::EnumerableText, "tz?")];
        assert!(matches!(
            QuestionGraph::new(no_choices),
            Err(GraphError::MissingChoices { .. })
        ));
    }

    #[test]
    fn test_parse_and_check() {
        let graph = QuestionGraph::standard();
        let use_static = graph.get(fields::USE_STATIC).unwrap();
        assert_eq!(use_static.parse("yes"), Ok(Value::Bool(true)));
        assert!(use_static.parse("perhaps").is_err());
        assert!(use_static.check(&Value::from("true")).is_err());

        let router = graph.get(fields::ROUTER).unwrap();
        assert!(router.check(&Value::from("192.168.1.1")).is_ok());
        assert!(router.check(&Value::from("192.168.1")).is_err());
        assert!(router.check(&Value::from(true)).is_err());
    }
}
