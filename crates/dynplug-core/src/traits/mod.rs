// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the seams between the host and dynamic plugins.
//!
//! Legacy installer hooks, the new-style feature installer, and the
//! host services a plugin environment exposes all live here.

pub mod hooks;
pub mod installer;
pub mod provider;

pub use hooks::{
    CatalogHook, EventsHook, PermissionPolicy, RouterHook, ScaffolderHook, SearchHook,
};
pub use installer::FeatureInstaller;
pub use provider::{BackendPluginProvider, PluginDiscovery};
