//! `network-config` rendering (netplan version 2)
//!
//! The wireless and wired sections each pick DHCP or static addressing from
//! the single `use_static` field. Static keys are written only for the
//! values present in the configuration.

use super::{DocumentBlock, compose, yaml_quote};
use crate::config::ResolvedConfiguration;
use crate::questions::fields;

pub const WIRELESS_INTERFACE: &str = "wlan0";
pub const WIRED_INTERFACE: &str = "eth0";
const RENDERER: &str = "NetworkManager";

/// Render the complete `network-config` document.
pub fn render(config: &ResolvedConfiguration) -> String {
    let blocks = [
        DocumentBlock::new("version", "network:\n  version: 2"),
        wireless_block(config),
        wired_block(config),
    ];
    compose(&blocks)
}

/// The `wifis` section, only when wireless was activated.
pub fn wireless_block(config: &ResolvedConfiguration) -> DocumentBlock {
    if !config.flag(fields::USE_WIRELESS) {
        return DocumentBlock::empty("wireless");
    }
    let use_static = config.flag(fields::USE_STATIC);

    let mut lines = vec![
        "  wifis:".to_string(),
        format!("    renderer: {RENDERER}"),
        format!("    {WIRELESS_INTERFACE}:"),
        format!("      dhcp4: {}", !use_static),
    ];
    if let Some(country) = config.non_empty_text(fields::COUNTRY) {
        lines.push(format!("      regulatory-domain: {}", yaml_quote(country)));
    }
    if let Some(ssid) = config.text(fields::SSID) {
        lines.push("      access-points:".to_string());
        lines.push(format!("        {}:", yaml_quote(ssid)));
        if let Some(password) = config.text(fields::SSID_PASSWORD) {
            lines.push(format!("          password: {}", yaml_quote(password)));
        }
    }
    lines.push("      optional: true".to_string());
    if use_static {
        lines.extend(static_lines(config, fields::WIRELESS_IP));
    }

    DocumentBlock::new("wireless", lines.join("\n"))
}

/// The `ethernets` section.
pub fn wired_block(config: &ResolvedConfiguration) -> DocumentBlock {
    let use_static = config.flag(fields::USE_STATIC);

    let mut lines = vec![
        "  ethernets:".to_string(),
        format!("    renderer: {RENDERER}"),
        format!("    {WIRED_INTERFACE}:"),
        format!("      dhcp4: {}", !use_static),
        "      optional: true".to_string(),
    ];
    if use_static {
        lines.extend(static_lines(config, fields::ETHERNET_IP));
    }

    DocumentBlock::new("wired", lines.join("\n"))
}

/// Address, gateway, and nameserver keys for one interface.
fn static_lines(config: &ResolvedConfiguration, address_field: &str) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(address) = config.non_empty_text(address_field) {
        lines.push(format!("      addresses: [{}]", address.trim()));
    }
    if let Some(router) = config.non_empty_text(fields::ROUTER) {
        lines.push(format!("      gateway4: {}", router.trim()));
    }
    if let Some(nameservers) = config.non_empty_text(fields::NAMESERVERS) {
        let list: Vec<&str> = nameservers
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        lines.push("      nameservers:".to_string());
        lines.push(format!("        addresses: [{}]", list.join(", ")));
    }
    lines
}
