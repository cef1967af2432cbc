//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Adapter configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix for error message keys (default: "errors").
    pub i18n_prefix: String,

    /// Include error causes in JSON error bodies (default: false).
    pub debug_errors: bool,

    /// Locale used when a lookup does not name one.
    pub default_locale: Option<String>,

    /// Directory of `.properties` message bundles.
    pub i18n_dir: Option<PathBuf>,

    /// Directory of error page templates.
    pub templates_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            i18n_prefix: "errors".to_string(),
            debug_errors: false,
            default_locale: None,
            i18n_dir: None,
            templates_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let i18n_prefix = var("STAGEHAND_I18N_PREFIX").unwrap_or_else(|| "errors".to_string());

        let debug_errors = var("STAGEHAND_DEBUG_ERRORS")
            .map(|v| parse_bool(&v))
            .transpose()
            .context("STAGEHAND_DEBUG_ERRORS must be a boolean")?
            .unwrap_or(false);

        let default_locale = var("STAGEHAND_DEFAULT_LOCALE").filter(|v| !v.trim().is_empty());

        let i18n_dir = var("STAGEHAND_I18N_DIR").map(PathBuf::from);
        let templates_dir = var("STAGEHAND_TEMPLATES_DIR").map(PathBuf::from);

        Ok(Self {
            i18n_prefix,
            debug_errors,
            default_locale,
            i18n_dir,
            templates_dir,
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("invalid boolean: {other}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.i18n_prefix, "errors");
        assert!(!config.debug_errors);
        assert!(config.i18n_dir.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("STAGEHAND_I18N_PREFIX", "api.errors"),
            ("STAGEHAND_DEBUG_ERRORS", "yes"),
            ("STAGEHAND_DEFAULT_LOCALE", "nb_NO"),
            ("STAGEHAND_I18N_DIR", "/srv/i18n"),
        ]))
        .unwrap();
        assert_eq!(config.i18n_prefix, "api.errors");
        assert!(config.debug_errors);
        assert_eq!(config.default_locale.as_deref(), Some("nb_NO"));
        assert_eq!(config.i18n_dir, Some(PathBuf::from("/srv/i18n")));
    }

    #[test]
    fn rejects_bad_boolean() {
        assert!(Config::from_lookup(lookup(&[("STAGEHAND_DEBUG_ERRORS", "maybe")])).is_err());
    }
}
