//! Service context bundling all port trait objects.

use crate::adapters::live::{LiveManifestSource, PromqlParser, PrometheusDurations, StaticScheme};
use crate::config::Config;
use crate::ports::{DurationParser, ManifestSource, QueryParser, Scheme};

/// Bundles the consumed capabilities and configuration.
///
/// Each port field provides access to one external boundary. The validator
/// and translator only borrow the context, so one instance can serve
/// concurrent callers.
pub struct ServiceContext {
    /// Parser for window and latency durations.
    pub durations: Box<dyn DurationParser>,
    /// Parser for indicator queries.
    pub queries: Box<dyn QueryParser>,
    /// Type registry used when snapshotting resources.
    pub scheme: Box<dyn Scheme>,
    /// Source of manifests for the CLI.
    pub manifests: Box<dyn ManifestSource>,
    /// Runtime settings.
    pub config: Config,
}

impl ServiceContext {
    /// Creates a context with the live adapters and default configuration.
    #[must_use]
    pub fn live() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a context with the live adapters and the given configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            durations: Box::new(PrometheusDurations),
            queries: Box::new(PromqlParser),
            scheme: Box::new(StaticScheme::default()),
            manifests: Box::new(LiveManifestSource),
            config,
        }
    }
}

impl Default for ServiceContext {
    fn default() -> Self {
        Self::live()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext").field("config", &self.config).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::KIND;

    #[test]
    fn live_context_wires_default_adapters() {
        let ctx = ServiceContext::live();
        assert!(ctx.durations.parse_duration("28d").is_ok());
        assert!(ctx.queries.parse_expr("up").is_ok());
        assert!(ctx.scheme.type_meta(KIND).is_some());
        assert_eq!(ctx.config, Config::default());
    }

    #[test]
    fn context_is_shareable_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<ServiceContext>();
    }
}
