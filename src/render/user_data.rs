//! `user-data` rendering
//!
//! Block order:
//!
//! 1. `#cloud-config` header
//! 2. hostname and time zone
//! 3. the single user entry (boilerplate, password block, authorized keys)
//! 4. SSH and root-login policy
//! 5. Tailscale enrollment `runcmd`, only when a key was resolved

use super::{DocumentBlock, compose, require, yaml_quote};
use crate::config::ResolvedConfiguration;
use crate::error::Result;
use crate::questions::fields;
use crate::secrets::SecretMaterializer;

pub const HEADER: &str = "#cloud-config";

const TAILSCALE_INSTALL: &str = "curl -fsSL https://tailscale.com/install.sh | sh";
const TAILSCALE_SYSCTL: &str = "/etc/sysctl.d/99-tailscale.conf";

/// Render the complete `user-data` document.
pub fn render(config: &ResolvedConfiguration, secrets: &SecretMaterializer) -> Result<String> {
    let hostname = require(config, fields::HOSTNAME)?;
    let time_zone = require(config, fields::TIME_ZONE)?;
    let user = require(config, fields::USER)?;

    let blocks = [
        DocumentBlock::new("header", HEADER),
        DocumentBlock::new(
            "identity",
            format!(
                "hostname: {}\nmanage_etc_hosts: true\ntimezone: {}",
                yaml_quote(hostname),
                yaml_quote(time_zone)
            ),
        ),
        DocumentBlock::new(
            "user",
            format!(
                "users:\n  - name: {}\n    groups: users,sudo\n    shell: /bin/bash",
                yaml_quote(user)
            ),
        ),
        password_block(config, secrets)?,
        authorized_keys_block(config, secrets)?,
        DocumentBlock::new("sudo", "    sudo: ALL=(ALL) ALL"),
        DocumentBlock::new(
            "ssh",
            "enable_ssh: true\nssh_pwauth: false\ndisable_root: true",
        ),
        tailscale_block(config),
    ];

    Ok(compose(&blocks))
}

/// Hashed password, or a locked account when the password is empty.
pub fn password_block(
    config: &ResolvedConfiguration,
    secrets: &SecretMaterializer,
) -> Result<DocumentBlock> {
    // only the empty string locks; whitespace is a real password
    let password = config.text(fields::USER_PASSWORD).filter(|p| !p.is_empty());
    let text = match password {
        Some(password) => {
            let hash = secrets.hash_password(password)?;
            format!("    lock_passwd: false\n    hashed_passwd: {hash}")
        }
        None => "    lock_passwd: true".to_string(),
    };
    Ok(DocumentBlock::new("password", text))
}

/// `ssh_authorized_keys` with the key file's contents, when a key path was
/// given.
pub fn authorized_keys_block(
    config: &ResolvedConfiguration,
    secrets: &SecretMaterializer,
) -> Result<DocumentBlock> {
    let Some(path) = config.non_empty_text(fields::SSH_KEY) else {
        return Ok(DocumentBlock::empty("authorized_keys"));
    };
    let key = secrets.read_public_key(path)?;
    Ok(DocumentBlock::new(
        "authorized_keys",
        format!("    ssh_authorized_keys:\n      - {}", yaml_quote(&key)),
    ))
}

/// First-boot commands that install Tailscale and join the tailnet.
pub fn tailscale_block(config: &ResolvedConfiguration) -> DocumentBlock {
    let Some(key) = config.non_empty_text(fields::TAILSCALE_KEY) else {
        return DocumentBlock::empty("tailscale");
    };
    let hostname = config.text(fields::HOSTNAME).unwrap_or_default();

    let sysctl = format!(
        "echo 'net.ipv4.ip_forward = 1' | tee -a {TAILSCALE_SYSCTL} && \
         echo 'net.ipv6.conf.all.forwarding = 1' | tee -a {TAILSCALE_SYSCTL} && \
         sysctl -p {TAILSCALE_SYSCTL}"
    );

    let auth_key = format!("--auth-key={key}");
    let hostname_arg = format!("--hostname={hostname}");
    let mut up = vec!["tailscale", "up", auth_key.as_str()];
    if config.flag(fields::EXIT_NODE) {
        up.push("--advertise-exit-node");
    }
    up.push(hostname_arg.as_str());

    let commands = [
        flow_sequence(&["sh", "-c", TAILSCALE_INSTALL]),
        flow_sequence(&["sh", "-c", sysctl.as_str()]),
        flow_sequence(&up),
        flow_sequence(&["hostnamectl", "set-hostname", hostname]),
    ];

    let mut text = String::from("runcmd:");
    for command in commands {
        text.push_str("\n  - ");
        text.push_str(&command);
    }
    DocumentBlock::new("tailscale", text)
}

/// `["a", "b"]` with every element quoted.
fn flow_sequence(args: &[&str]) -> String {
    let quoted: Vec<String> = args.iter().map(|a| yaml_quote(a)).collect();
    format!("[{}]", quoted.join(", "))
}
