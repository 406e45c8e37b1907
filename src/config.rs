//! Runtime configuration for validation and translation.

use std::env;

use crate::objective::PROPAGATION_LABELS_PREFIX;

/// Annotation `kubectl apply` stores the previous manifest in.
pub const LAST_APPLIED_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// Environment variable overriding [`Config::propagation_prefix`].
pub const ENV_PROPAGATION_PREFIX: &str = "PYRRA_PROPAGATION_PREFIX";
/// Environment variable overriding [`Config::last_applied_annotation`].
pub const ENV_LAST_APPLIED_ANNOTATION: &str = "PYRRA_LAST_APPLIED_ANNOTATION";
/// Environment variable overriding [`Config::strict_indicators`].
pub const ENV_STRICT_INDICATORS: &str = "PYRRA_STRICT_INDICATORS";

/// Settings shared by the validator and translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Source labels whose key starts with this prefix are copied onto the
    /// objective's labels.
    pub propagation_prefix: String,
    /// Annotation stripped from the audit snapshot.
    pub last_applied_annotation: String,
    /// Reject every combination of more than one populated indicator,
    /// instead of only ratio together with latency.
    pub strict_indicators: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            propagation_prefix: PROPAGATION_LABELS_PREFIX.to_string(),
            last_applied_annotation: LAST_APPLIED_ANNOTATION.to_string(),
            strict_indicators: false,
        }
    }
}

impl Config {
    /// Builds a config from the process environment, falling back to
    /// defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns an error string when a variable holds an unusable value.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error string when a variable holds an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(prefix) = lookup(ENV_PROPAGATION_PREFIX) {
            if prefix.is_empty() {
                return Err(format!("{ENV_PROPAGATION_PREFIX} must not be empty"));
            }
            config.propagation_prefix = prefix;
        }
        if let Some(annotation) = lookup(ENV_LAST_APPLIED_ANNOTATION) {
            config.last_applied_annotation = annotation;
        }
        if let Some(strict) = lookup(ENV_STRICT_INDICATORS) {
            config.strict_indicators = parse_bool(&strict)
                .ok_or_else(|| format!("{ENV_STRICT_INDICATORS} must be a boolean, got {strict:?}"))?;
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
