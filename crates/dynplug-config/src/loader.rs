// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./dynplug.toml` > `~/.config/dynplug/dynplug.toml` >
//! `/etc/dynplug/dynplug.toml`, with `DYNPLUG_` environment overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::DynplugConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/dynplug/dynplug.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "dynplug.toml";

/// The user's XDG configuration file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dynplug/dynplug.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/dynplug/dynplug.toml`
/// 3. `~/.config/dynplug/dynplug.toml`
/// 4. `./dynplug.toml`
/// 5. `DYNPLUG_*` environment variables
pub fn load_config() -> Result<DynplugConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<DynplugConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DynplugConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DynplugConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DynplugConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Files of the standard hierarchy, lowest precedence first.
///
/// The local file is relative to the working directory. Missing files are
/// skipped when loading.
pub fn config_files() -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    files.extend(user_config_path());
    files.push(PathBuf::from(LOCAL_CONFIG_FILE));
    files
}

/// Build the Figment used for the standard hierarchy, before extraction.
pub fn build_figment() -> Figment {
    config_files()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(DynplugConfig::default())),
            |figment, file| figment.merge(Toml::file(file)),
        )
        .merge(env_provider())
}

/// Environment provider mapping `DYNPLUG_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because both section and
/// key names contain underscores. Variables outside the known sections, such
/// as `DYNPLUG_MODULE_PATH`, are not configuration and are filtered out.
fn env_provider() -> Env {
    Env::prefixed("DYNPLUG_")
        .filter(|key| {
            let key = key.as_str();
            key.starts_with("host_") || key.starts_with("dynamic_plugins_")
        })
        .map(|key| {
            key.as_str()
                .replacen("dynamic_plugins_", "dynamic_plugins.", 1)
                .replacen("host_", "host.", 1)
                .into()
        })
}
