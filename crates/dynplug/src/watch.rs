// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dynplug watch` command implementation.
//!
//! Loads plugins once, then reloads the configuration whenever one of its
//! files changes and hands the new plugin settings to the registry. Without
//! `--config` every file of the standard hierarchy is watched. Runs until
//! Ctrl-C.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dynplug_config::{DynplugConfig, HostConfig};
use dynplug_core::DynplugError;
use dynplug_plugin::{NativeModuleLoader, PluginManager};
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEvent};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Quiet period before a burst of file events triggers a reload.
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Run the `dynplug watch` command.
pub async fn run_watch(
    config: DynplugConfig,
    config_path: Option<PathBuf>,
) -> Result<(), DynplugError> {
    let manager = PluginManager::from_config(&config, Arc::new(NativeModuleLoader::new())).await?;
    info!(
        plugins = manager.plugins().len(),
        generation = manager.generation(),
        "dynamic plugins loaded"
    );

    let cwd = std::env::current_dir()
        .map_err(|e| DynplugError::Config(format!("cannot resolve working directory: {e}")))?;
    let files = watched_files(config_path.as_deref(), &cwd);

    let (tx, mut rx) = mpsc::unbounded_channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
        // The receiver only goes away on shutdown.
        let _ = tx.send(result);
    })
    .map_err(|e| DynplugError::Internal(format!("cannot start file watcher: {e}")))?;

    // Watch directories: editors often replace the file rather than write it.
    let mut watching = 0;
    for dir in watch_dirs(&files) {
        match debouncer.watcher().watch(&dir, RecursiveMode::NonRecursive) {
            Ok(()) => watching += 1,
            Err(e) => debug!(dir = %dir.display(), error = %e, "not watching directory"),
        }
    }
    if watching == 0 {
        return Err(DynplugError::Internal(
            "no configuration directory can be watched".to_string(),
        ));
    }
    for file in &files {
        info!(path = %file.display(), "watching configuration");
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
            event = rx.recv() => {
                let Some(result) = event else {
                    return Ok(());
                };
                match result {
                    Ok(events) if touches(&events, &files) => {
                        reload(&manager, config_path.as_deref(), &config.host).await;
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "file watcher error"),
                }
            }
        }
    }
}

/// Absolute paths of the files the running configuration was built from.
fn watched_files(config_path: Option<&Path>, cwd: &Path) -> Vec<PathBuf> {
    match config_path {
        Some(path) => vec![cwd.join(path)],
        None => dynplug_config::loader::config_files()
            .into_iter()
            .map(|file| cwd.join(file))
            .collect(),
    }
}

/// Existing parent directories of `files`, without duplicates.
fn watch_dirs(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in files.iter().filter_map(|file| file.parent()) {
        if dir.is_dir() && !dirs.iter().any(|known| known == dir) {
            dirs.push(dir.to_path_buf());
        }
    }
    dirs
}

fn touches(events: &[DebouncedEvent], files: &[PathBuf]) -> bool {
    events
        .iter()
        .any(|event| files.iter().any(|file| event.path == *file))
}

/// Host settings that differ between two configurations.
fn host_changes(running: &HostConfig, reloaded: &HostConfig) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if running.root != reloaded.root {
        changed.push("host.root");
    }
    if running.log_level != reloaded.log_level {
        changed.push("host.log_level");
    }
    changed
}

/// Re-read the configuration the same way startup did and apply its plugin
/// settings.
async fn reload(manager: &PluginManager, config_path: Option<&Path>, running: &HostConfig) {
    let config = match crate::load_config(config_path) {
        Ok(config) => config,
        Err(errors) => {
            dynplug_config::render_errors(&errors);
            warn!(
                errors = errors.len(),
                "configuration invalid, keeping current plugins"
            );
            return;
        }
    };

    let changed = host_changes(running, &config.host);
    if !changed.is_empty() {
        warn!(settings = ?changed, "host settings changed, restart to apply them");
    }

    match manager.update_config(config.dynamic_plugins).await {
        Ok(snapshot) => info!(
            generation = snapshot.generation,
            plugins = snapshot.discovered.len() + snapshot.added.len(),
            "dynamic plugins reloaded"
        ),
        Err(e) => error!(error = %e, "reload failed, keeping current plugins"),
    }
}
