//! Validation rules for configurable fields
//!
//! Every rule is a plain function from the proposed text to `Ok(())` or a
//! human-readable reason. The resolver attaches the field name when a rule
//! rejects a value; prompts show the reason and ask again.
//!
//! Addresses are checked strictly: octets are bounded to 0-255 and the
//! whole string must match, so `300.1.1.1/24` or `x10.0.0.1/24y` are
//! rejected rather than passed through into the network document.

use crate::secrets::expand_home;
use crate::types::parse_bool;
use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;

/// A validation rule. `Err` carries the reason shown to the user.
pub type Validator = fn(&str) -> Result<(), String>;

/// Accepts everything.
pub fn any(_value: &str) -> Result<(), String> {
    Ok(())
}

pub fn non_empty(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    Ok(())
}

/// Accepts the spellings understood by [`parse_bool`].
pub fn boolean(value: &str) -> Result<(), String> {
    parse_bool(value)
        .map(|_| ())
        .ok_or_else(|| format!("'{value}' is not a yes/no value"))
}

/// A single RFC 1123 host label: 1-63 letters, digits, or hyphens, not
/// starting or ending with a hyphen.
pub fn hostname(value: &str) -> Result<(), String> {
    if value.is_empty() || value.len() > 63 {
        return Err("must be 1-63 characters long".to_string());
    }
    if value.starts_with('-') || value.ends_with('-') {
        return Err("must not start or end with a hyphen".to_string());
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err("may only contain letters, digits, and hyphens".to_string());
    }
    Ok(())
}

/// A POSIX-style login name: starts with a lowercase letter or underscore,
/// continues with lowercase letters, digits, underscores, or hyphens.
pub fn username(value: &str) -> Result<(), String> {
    if value.is_empty() || value.len() > 32 {
        return Err("must be 1-32 characters long".to_string());
    }
    let mut chars = value.chars();
    if let Some(first) = chars.next() {
        if !(first.is_ascii_lowercase() || first == '_') {
            return Err("must start with a lowercase letter or underscore".to_string());
        }
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-') {
        return Err(
            "may only contain lowercase letters, digits, underscores, and hyphens".to_string(),
        );
    }
    Ok(())
}

/// Every IANA time zone name known to the tz database, in database order.
pub fn time_zone_names() -> Vec<&'static str> {
    chrono_tz::TZ_VARIANTS.iter().map(|tz| tz.name()).collect()
}

pub fn time_zone(value: &str) -> Result<(), String> {
    value
        .parse::<chrono_tz::Tz>()
        .map(|_| ())
        .map_err(|_| format!("'{value}' is not a known time zone"))
}

/// A dotted-quad address.
pub fn ipv4(value: &str) -> Result<(), String> {
    value
        .trim()
        .parse::<Ipv4Addr>()
        .map(|_| ())
        .map_err(|_| format!("'{value}' is not an IPv4 address"))
}

/// An address with a numeric prefix length, e.g. `192.168.1.20/24`.
pub fn ipv4_cidr(value: &str) -> Result<(), String> {
    let value = value.trim();
    let Some((_, prefix)) = value.split_once('/') else {
        return Err(format!("'{value}' needs a prefix length, e.g. /24"));
    };
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("'{value}' has an invalid prefix length"));
    }
    value
        .parse::<Ipv4Network>()
        .map(|_| ())
        .map_err(|e| format!("'{value}' is not an IPv4 network: {e}"))
}

/// One or more comma-separated IPv4 addresses.
pub fn ipv4_list(value: &str) -> Result<(), String> {
    let entries: Vec<&str> = value.split(',').map(str::trim).collect();
    if entries.iter().all(|e| e.is_empty()) {
        return Err("at least one address is required".to_string());
    }
    for entry in entries {
        ipv4(entry)?;
    }
    Ok(())
}

/// Two-letter ISO 3166 country code, used as the wireless regulatory domain.
pub fn country_code(value: &str) -> Result<(), String> {
    if value.len() == 2 && value.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(format!("'{value}' is not a two-letter country code such as US"))
    }
}

/// An existing directory; `~/` is expanded.
pub fn existing_directory(value: &str) -> Result<(), String> {
    let path = expand_home(value);
    if path.is_dir() {
        Ok(())
    } else {
        Err(format!("directory {} does not exist", path.display()))
    }
}

/// Empty (no file) or a path to an existing regular file; `~/` is expanded.
pub fn optional_existing_file(value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    let path = expand_home(value);
    if path.is_file() {
        Ok(())
    } else {
        Err(format!("{} is not a readable file", path.display()))
    }
}
