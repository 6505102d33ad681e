// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dynplug check` command implementation.
//!
//! Runs diagnostic checks against the configured plugin root without
//! activating any plugin module.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dynplug_config::DynplugConfig;
use dynplug_core::DynplugError;
use dynplug_plugin::loader::entry_point;
use dynplug_plugin::{check_isolation, ModuleSearchPath, PluginScanner, ScannedPackage};

use crate::inspect::resolve_host_root;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `dynplug check` command.
///
/// With `--plain`, disables colored output. Fails when any check fails.
pub async fn run_check(config: &DynplugConfig, plain: bool) -> Result<(), DynplugError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let host_root = resolve_host_root(config)?;
    let search_path = ModuleSearchPath::from_env();
    let results = run_checks(config, &host_root, &search_path).await;

    println!();
    println!("  dynplug check");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;
    for result in &results {
        match result.status {
            CheckStatus::Warn => warn_count += 1,
            CheckStatus::Fail => fail_count += 1,
            CheckStatus::Pass => {}
        }
        println!("{}", format_result(result, use_color));
    }

    println!();
    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    if fail_count > 0 {
        return Err(DynplugError::Config(format!("{fail_count} check(s) failed")));
    }
    Ok(())
}

/// Run every check in order. Later checks are skipped once the root is
/// known to be unusable.
pub async fn run_checks(
    config: &DynplugConfig,
    host_root: &Path,
    search_path: &ModuleSearchPath,
) -> Vec<CheckResult> {
    let scanner = PluginScanner::new(host_root, config.dynamic_plugins.clone());
    let mut results = Vec::new();

    let Some(root) = scanner.root_path() else {
        results.push(CheckResult::new(
            "Plugin root",
            CheckStatus::Warn,
            "dynamic plugins disabled (no root_directory configured)",
            Instant::now(),
        ));
        return results;
    };

    let root_check = check_root(&root).await;
    let root_ok = root_check.status == CheckStatus::Pass;
    results.push(root_check);

    let isolation_check = check_host_access(&root, host_root, search_path);
    let isolation_ok = isolation_check.status == CheckStatus::Pass;
    results.push(isolation_check);

    if !(root_ok && isolation_ok) {
        return results;
    }

    let start = Instant::now();
    match scanner.scan_root(search_path).await {
        Ok(packages) => {
            let backend = packages.iter().filter(|p| p.is_backend_plugin()).count();
            let status = if packages.is_empty() {
                CheckStatus::Warn
            } else {
                CheckStatus::Pass
            };
            results.push(CheckResult::new(
                "Packages",
                status,
                format!("{} found, {backend} backend plugin(s)", packages.len()),
                start,
            ));
            results.push(check_entry_points(&packages).await);
        }
        Err(e) => results.push(CheckResult::new("Packages", CheckStatus::Fail, e.to_string(), start)),
    }

    results
}

/// Check the plugin root exists and is a directory.
async fn check_root(root: &Path) -> CheckResult {
    let start = Instant::now();
    match tokio::fs::metadata(root).await {
        Ok(metadata) if metadata.is_dir() => CheckResult::new(
            "Plugin root",
            CheckStatus::Pass,
            root.display().to_string(),
            start,
        ),
        Ok(_) => CheckResult::new(
            "Plugin root",
            CheckStatus::Fail,
            format!("not a directory: {}", root.display()),
            start,
        ),
        Err(e) => CheckResult::new(
            "Plugin root",
            CheckStatus::Fail,
            format!("{}: {e}", root.display()),
            start,
        ),
    }
}

/// Check plugins under the root can resolve the host's own libraries.
fn check_host_access(root: &Path, host_root: &Path, search_path: &ModuleSearchPath) -> CheckResult {
    let start = Instant::now();
    match check_isolation(root, host_root, search_path) {
        Ok(()) => CheckResult::new("Host modules", CheckStatus::Pass, "reachable", start),
        Err(e) => CheckResult::new("Host modules", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Check every backend plugin's entry module is present on disk.
async fn check_entry_points(packages: &[ScannedPackage]) -> CheckResult {
    let start = Instant::now();
    let mut problems: Vec<String> = Vec::new();

    for package in packages.iter().filter(|p| p.is_backend_plugin()) {
        let entry: PathBuf = match entry_point(package) {
            Ok(entry) => entry,
            Err(e) => {
                problems.push(format!("{}: {e}", package.name()));
                continue;
            }
        };
        let is_file = tokio::fs::metadata(&entry)
            .await
            .is_ok_and(|m| m.is_file());
        if !is_file {
            problems.push(format!("{}: missing {}", package.name(), entry.display()));
        }
    }

    if problems.is_empty() {
        CheckResult::new("Entry points", CheckStatus::Pass, "all present", start)
    } else {
        CheckResult::new("Entry points", CheckStatus::Warn, problems.join("; "), start)
    }
}

fn format_result(result: &CheckResult, use_color: bool) -> String {
    use colored::Colorize;

    let duration_ms = result.duration.as_millis();
    match (&result.status, use_color) {
        (CheckStatus::Pass, true) => format!(
            "    {} {:<16} {} ({duration_ms}ms)",
            "✓".green(),
            result.name,
            result.message
        ),
        (CheckStatus::Warn, true) => format!(
            "    {} {:<16} {} ({duration_ms}ms)",
            "!".yellow(),
            result.name,
            result.message.yellow()
        ),
        (CheckStatus::Fail, true) => format!(
            "    {} {:<16} {} ({duration_ms}ms)",
            "✗".red(),
            result.name,
            result.message.red()
        ),
        (status, false) => {
            let tag = match status {
                CheckStatus::Pass => "[OK]  ",
                CheckStatus::Warn => "[WARN]",
                CheckStatus::Fail => "[FAIL]",
            };
            format!(
                "    {tag} {:<16} {} ({duration_ms}ms)",
                result.name, result.message
            )
        }
    }
}
