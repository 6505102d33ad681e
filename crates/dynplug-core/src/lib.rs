// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the dynplug plugin system.
//!
//! This crate provides the error type, the closed package-role table, the
//! installer contracts plugin modules export, and the plugin descriptors the
//! registry hands to the host. Plugin libraries depend on this crate to build
//! their installers.

pub mod environment;
pub mod error;
pub mod installer;
pub mod plugin;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use environment::PluginEnvironment;
pub use error::DynplugError;
pub use installer::{
    BackendInstaller, InstallerConstructor, InstallerExport, InstallerKind, LegacyInstaller,
    PermissionsHook, INSTALLER_SYMBOL,
};
pub use plugin::{BackendDynamicPlugin, DynamicPlugin, FrontendDynamicPlugin, ModuleHandle};
pub use traits::provider::StaticDiscovery;
pub use traits::{
    BackendPluginProvider, CatalogHook, EventsHook, FeatureInstaller, PermissionPolicy,
    PluginDiscovery, RouterHook, ScaffolderHook, SearchHook,
};
pub use types::{BackendFeature, FeatureKind, PackagePlatform, PackageRole, RoleInfo};

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn role_strings_round_trip_through_table() {
        for role in PackageRole::ALL {
            let s = role.to_string();
            let parsed = PackageRole::from_str(&s).expect("should parse back");
            assert_eq!(role, parsed);
        }
        assert_eq!(PackageRole::BackendPluginModule.to_string(), "backend-plugin-module");
    }

    #[test]
    fn unknown_role_does_not_parse() {
        assert!(PackageRole::from_str("backend-thing").is_err());
        assert!(PackageRole::from_str("Backend-Plugin").is_err());
    }

    #[test]
    fn plugin_roles_map_to_platforms() {
        let backend = PackageRole::BackendPlugin.info();
        assert_eq!(backend.platform, PackagePlatform::Node);
        assert!(backend.is_plugin);

        let module = PackageRole::BackendPluginModule.info();
        assert_eq!(module.platform, PackagePlatform::Node);
        assert!(module.is_plugin);

        let frontend = PackageRole::FrontendPlugin.info();
        assert_eq!(frontend.platform, PackagePlatform::Web);
        assert!(frontend.is_plugin);

        let library = PackageRole::NodeLibrary.info();
        assert_eq!(library.platform, PackagePlatform::Node);
        assert!(!library.is_plugin);
    }

    #[test]
    fn role_deserializes_from_kebab_case() {
        let role: PackageRole = serde_json::from_str("\"frontend-plugin-module\"").unwrap();
        assert_eq!(role, PackageRole::FrontendPluginModule);
    }

    #[test]
    fn fatal_errors_are_classified() {
        assert!(DynplugError::UnknownRole("x".into()).is_fatal());
        assert!(
            DynplugError::Scan {
                path: "/plugins".into(),
                message: "not a directory".into()
            }
            .is_fatal()
        );
        assert!(
            !DynplugError::Manifest {
                path: "/plugins/a/package.json".into(),
                message: "missing".into()
            }
            .is_fatal()
        );
    }

    #[test]
    fn isolation_error_names_required_directory() {
        let err = DynplugError::Isolation {
            plugin_root: "/opt/plugins".into(),
            required: "/srv/host/lib".into(),
            env_var: "DYNPLUG_MODULE_PATH".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/srv/host/lib"));
        assert!(msg.contains("DYNPLUG_MODULE_PATH"));
    }

    #[test]
    fn dynamic_plugin_accessors_cover_both_platforms() {
        let backend: DynamicPlugin = BackendDynamicPlugin::new(
            "todo-backend",
            "1.2.0",
            PackageRole::BackendPlugin,
            BackendInstaller::Legacy(LegacyInstaller::new()),
        )
        .into();
        assert_eq!(backend.name(), "todo-backend");
        assert_eq!(backend.platform(), PackagePlatform::Node);
        assert!(backend.as_backend().is_some());

        let frontend: DynamicPlugin = FrontendDynamicPlugin {
            name: "todo".into(),
            version: "1.2.0".into(),
            role: PackageRole::FrontendPlugin,
            location: "/plugins/todo".into(),
        }
        .into();
        assert_eq!(frontend.platform(), PackagePlatform::Web);
        assert_eq!(frontend.role(), PackageRole::FrontendPlugin);
        assert!(frontend.as_backend().is_none());
    }

    #[tokio::test]
    async fn legacy_router_hook_receives_environment() {
        struct TodoRouter;

        #[async_trait::async_trait]
        impl RouterHook for TodoRouter {
            fn plugin_id(&self) -> &str {
                "todo"
            }

            async fn create_router(
                &self,
                env: &PluginEnvironment,
            ) -> Result<types::Router, DynplugError> {
                Ok(types::Router::new(self.plugin_id()).route(env.base_url()))
            }
        }

        struct NoPlugins;

        impl BackendPluginProvider for NoPlugins {
            fn backend_plugins(&self) -> Vec<Arc<BackendDynamicPlugin>> {
                Vec::new()
            }
        }

        let env = PluginEnvironment::new(
            "todo",
            serde_json::json!({}),
            Arc::new(StaticDiscovery::new("http://localhost:7007")),
            Arc::new(NoPlugins),
        );
        let installer = LegacyInstaller::new().with_router(TodoRouter);
        let router = installer
            .router
            .as_ref()
            .expect("router hook")
            .create_router(&env)
            .await
            .unwrap();
        assert_eq!(router.plugin_id, "todo");
        assert_eq!(router.routes, vec!["http://localhost:7007/api/todo"]);
    }
}
