// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dynplug scan` and `dynplug list` command implementations.

use std::path::PathBuf;
use std::sync::Arc;

use dynplug_config::DynplugConfig;
use dynplug_core::{DynamicPlugin, DynplugError};
use dynplug_plugin::{ModuleSearchPath, NativeModuleLoader, PluginManager, PluginScanner, ScannedPackage};

/// Host root from configuration, relative to the working directory.
pub fn resolve_host_root(config: &DynplugConfig) -> Result<PathBuf, DynplugError> {
    let cwd = std::env::current_dir()
        .map_err(|e| DynplugError::Config(format!("cannot resolve working directory: {e}")))?;
    Ok(config.host.resolve_root(&cwd))
}

/// Run the `dynplug scan` command: list packages without loading them.
pub async fn run_scan(config: &DynplugConfig) -> Result<(), DynplugError> {
    let scanner = PluginScanner::new(resolve_host_root(config)?, config.dynamic_plugins.clone());
    let Some(root) = scanner.root_path() else {
        println!("dynamic plugins are disabled (no root_directory configured)");
        return Ok(());
    };

    let packages = scanner.scan_root(&ModuleSearchPath::from_env()).await?;
    println!("{} package(s) under {}", packages.len(), root.display());
    for package in &packages {
        println!("  {}", format_package(package));
    }
    Ok(())
}

/// Run the `dynplug list` command: scan, load, and list what loaded.
pub async fn run_list(config: &DynplugConfig) -> Result<(), DynplugError> {
    let manager = PluginManager::from_config(config, Arc::new(NativeModuleLoader::new())).await?;
    let plugins = manager.plugins();
    println!(
        "{} plugin(s) loaded from {} package(s)",
        plugins.len(),
        manager.scanned_packages().len()
    );
    for plugin in &plugins {
        println!("  {}", format_plugin(plugin));
    }
    Ok(())
}

fn format_package(package: &ScannedPackage) -> String {
    let alpha = if package.alpha { " [alpha]" } else { "" };
    format!(
        "{:<30} {:<12} {:<24} {:<5} {}{alpha}",
        package.name(),
        package.version(),
        package.role.role,
        package.role.platform,
        package.location.display()
    )
}

fn format_plugin(plugin: &DynamicPlugin) -> String {
    let detail = match plugin {
        DynamicPlugin::Backend(backend) => format!("{} installer", backend.installer.kind()),
        DynamicPlugin::Frontend(_) => "frontend".to_string(),
    };
    format!(
        "{:<30} {:<12} {:<24} {detail}",
        plugin.name(),
        plugin.version(),
        plugin.role()
    )
}
