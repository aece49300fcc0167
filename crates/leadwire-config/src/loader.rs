// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/leadwire/leadwire.toml`, `~/.config/leadwire/leadwire.toml`,
//! `./leadwire.toml`, then `LEADWIRE_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LeadwireConfig;

/// Config sections, in the order their env prefixes are rewritten.
pub(crate) const SECTIONS: &[&str] = &[
    "agent",
    "relay",
    "responder",
    "brand",
    "admin",
    "intake",
    "storage",
    "sink",
    "broadcast",
];

/// TOML files consulted by [`load_config`], lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/leadwire/leadwire.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("leadwire/leadwire.toml"));
    }
    paths.push(PathBuf::from("leadwire.toml"));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
pub fn load_config() -> Result<LeadwireConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<LeadwireConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadwireConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LeadwireConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadwireConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for XDG config loading, before extraction.
pub fn build_figment() -> Figment {
    config_file_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(LeadwireConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Maps `LEADWIRE_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `LEADWIRE_RELAY_API_TOKEN` is `relay.api_token`.
fn env_provider() -> Env {
    Env::prefixed("LEADWIRE_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("relay_api_token"), "relay.api_token");
        assert_eq!(map_env_key("brand_price_file_url"), "brand.price_file_url");
        assert_eq!(map_env_key("intake_workers"), "intake.workers");
        assert_eq!(map_env_key("unknown_key"), "unknown_key");
    }

    #[test]
    fn local_file_has_highest_file_precedence() {
        let paths = config_file_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from("/etc/leadwire/leadwire.toml")));
        assert_eq!(paths.last(), Some(&PathBuf::from("leadwire.toml")));
    }
}
