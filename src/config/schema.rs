//! Configuration schema definitions.
//!
//! This module defines the configuration structure for a router built from
//! a file. All types derive Serde traits for deserialization from TOML.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::routing::{PatternError, ResolverInput, RouteDescriptor, RouteInput};

/// Root configuration for a router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Router behavior (base path, duplicate suppression, polling).
    pub router: RouterSettings,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Route tree, in match order.
    pub routes: Vec<RouteConfig>,
}

impl RouterConfig {
    /// Compile the configured route tree. Views are the configured names.
    pub fn route_input(&self) -> Result<ResolverInput<String>, PatternError> {
        self.routes
            .iter()
            .map(RouteConfig::to_input)
            .collect::<Result<Vec<_>, _>>()
            .map(ResolverInput::Routes)
    }
}

/// Router behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Only paths under this prefix are routed (e.g. "/app").
    pub base_path: String,

    /// Drop consecutive identical paths.
    pub distinct: bool,

    /// Period of the location poller used by `watch --location-file`, in
    /// milliseconds. The stdin watcher waits four periods for in-flight
    /// navigations once its input ends.
    pub poll_interval_ms: u64,
}

impl RouterSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            distinct: true,
            poll_interval_ms: 50,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
        }
    }
}

/// One route of the tree.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Template, e.g. "users/:id" or "~^v[0-9]+$". Empty for an index route.
    #[serde(default)]
    pub path: String,

    /// View name. Omitted for grouping routes.
    #[serde(default)]
    pub view: Option<String>,

    /// Nested routes.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl RouteConfig {
    pub fn to_input(&self) -> Result<RouteInput<String>, PatternError> {
        let mut descriptor = RouteDescriptor::parse(&self.path)?;
        descriptor.view = self.view.clone();
        descriptor.routes = self
            .routes
            .iter()
            .map(RouteConfig::to_input)
            .collect::<Result<_, _>>()?;
        Ok(descriptor.into())
    }
}
