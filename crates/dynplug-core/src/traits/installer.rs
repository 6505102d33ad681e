// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-entry-point installer contract.

use crate::types::BackendFeature;

/// The new installer shape: one `install()` returning backend features.
///
/// A plugin that contributes a single feature returns a one-element vector.
pub trait FeatureInstaller: Send + Sync + 'static {
    fn install(&self) -> Vec<BackendFeature>;
}

impl<F> FeatureInstaller for F
where
    F: Fn() -> Vec<BackendFeature> + Send + Sync + 'static,
{
    fn install(&self) -> Vec<BackendFeature> {
        self()
    }
}
