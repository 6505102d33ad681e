// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role classification: declared role string to platform and plugin flag.

use std::str::FromStr;

use dynplug_core::{DynplugError, PackageRole, RoleInfo};

/// Classify a role string against the closed role table.
///
/// An unknown role means the host and the plugin disagree on the table, so
/// it is an error rather than a skip.
pub fn classify(role: &str) -> Result<RoleInfo, DynplugError> {
    PackageRole::from_str(role)
        .map(PackageRole::info)
        .map_err(|_| DynplugError::UnknownRole(role.to_string()))
}
