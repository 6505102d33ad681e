// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Example backend plugin library.
//!
//! Exports a legacy installer whose catalog hook registers a `github`
//! entity provider. Copy the built library into a package directory and
//! point the manifest's `main` at it.

use dynplug_core::types::CatalogBuilder;
use dynplug_core::{CatalogHook, InstallerExport, LegacyInstaller, PluginEnvironment};

/// Entity provider name this plugin registers.
pub const PROVIDER: &str = "github";

struct GithubEntityProvider;

impl CatalogHook for GithubEntityProvider {
    fn extend(&self, builder: &mut CatalogBuilder, _env: &PluginEnvironment) {
        builder.add_entity_provider(PROVIDER);
    }
}

fn installer() -> InstallerExport {
    InstallerExport::legacy(LegacyInstaller::new().with_catalog(GithubEntityProvider))
}

dynplug_core::export_installer!(installer);
