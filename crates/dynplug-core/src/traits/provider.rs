// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host services exposed to plugins through the plugin environment.

use std::sync::Arc;

use crate::plugin::BackendDynamicPlugin;

/// Query surface over the loaded backend plugins.
pub trait BackendPluginProvider: Send + Sync {
    /// All backend-capable plugins currently known to the host.
    fn backend_plugins(&self) -> Vec<Arc<BackendDynamicPlugin>>;
}

/// Resolves the URLs other plugins are served under.
pub trait PluginDiscovery: Send + Sync {
    /// Internal base URL for `plugin_id`.
    fn base_url(&self, plugin_id: &str) -> String;

    /// Externally reachable base URL for `plugin_id`.
    fn external_base_url(&self, plugin_id: &str) -> String {
        self.base_url(plugin_id)
    }
}

/// Discovery that serves every plugin under `<base>/api/<plugin_id>`.
#[derive(Debug, Clone)]
pub struct StaticDiscovery {
    base: String,
}

impl StaticDiscovery {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }
}

impl PluginDiscovery for StaticDiscovery {
    fn base_url(&self, plugin_id: &str) -> String {
        format!("{}/api/{plugin_id}", self.base)
    }
}
