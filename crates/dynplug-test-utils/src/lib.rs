// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for dynplug integration tests.
//!
//! Provides a scripted module loader and an on-disk plugin tree builder so
//! the scanner and registry can be exercised without real plugin libraries.
//!
//! # Components
//!
//! - [`MockModuleLoader`] - Module loader with per-entry scripted behaviour
//! - [`PluginTree`] - Temporary host root with a dynamic plugin root inside

pub mod fixture;
pub mod mock_loader;

pub use fixture::{PluginTree, PLUGIN_ROOT_DIR};
pub use mock_loader::{MockModule, MockModuleLoader};
