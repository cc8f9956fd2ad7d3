//! Captured input sources
//!
//! Flags and environment are read once at start-up into these read-only
//! maps and handed to the resolver explicitly. Nothing in the library reads
//! `std::env` after that point.

use std::collections::BTreeMap;
use std::ffi::OsString;

/// Command-line values keyed by long flag name (no leading dashes).
///
/// A flag that was not given is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagMap {
    values: BTreeMap<String, String>,
}

impl FlagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, flag: impl Into<String>, value: impl Into<String>) {
        self.values.insert(flag.into(), value.into());
    }

    pub fn get(&self, flag: &str) -> Option<&str> {
        self.values.get(flag).map(String::as_str)
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.values.contains_key(flag)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (flag, value) in iter {
            map.insert(flag, value);
        }
        map
    }
}

/// Snapshot of environment variables.
///
/// Variables set to an empty string are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
    values: BTreeMap<String, String>,
}

impl EnvMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment.
    pub fn capture() -> Self {
        Self::from_os(std::env::vars_os())
    }

    /// Build from raw OS pairs. Variables whose name or value is not valid
    /// UTF-8 are skipped; no field binding can name them.
    pub fn from_os<I: IntoIterator<Item = (OsString, OsString)>>(vars: I) -> Self {
        vars.into_iter()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, var: &str) -> Option<&str> {
        self.values
            .get(var)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_map() {
        let flags: FlagMap = [("hostname", "nodeA"), ("dry-run", "true")]
            .into_iter()
            .collect();
        assert_eq!(flags.get("hostname"), Some("nodeA"));
        assert!(flags.contains("dry-run"));
        assert!(!flags.contains("ssid"));
        assert_eq!(flags.len(), 2);
    }

    #[test]
    fn test_env_map_ignores_empty() {
        let env: EnvMap = [("TAILSCALE_AUTHKEY", ""), ("HOME", "/home/pi")]
            .into_iter()
            .collect();
        assert_eq!(env.get("TAILSCALE_AUTHKEY"), None);
        assert_eq!(env.get("HOME"), Some("/home/pi"));
        assert_eq!(env.get("MISSING"), None);
    }

    #[test]
    #[cfg(unix)]
    fn test_env_map_skips_non_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let env = EnvMap::from_os([
            (OsString::from("GARBLED"), OsString::from_vec(vec![0xff, 0xfe])),
            (OsString::from_vec(vec![0xc3, 0x28]), OsString::from("x")),
            (OsString::from("TAILSCALE_AUTHKEY"), OsString::from("tskey-abc")),
        ]);
        assert_eq!(env.get("GARBLED"), None);
        assert_eq!(env.get("TAILSCALE_AUTHKEY"), Some("tskey-abc"));
    }
}
