//! In-memory message bundles.
//!
//! Messages are keyed by bundle, locale and message key. Lookups walk the
//! locale from most to least specific (`nb_NO`, `nb`, default) and substitute
//! positional `{n}` placeholders.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use tracing::{debug, info};

use super::properties::parse_properties;
use super::{LocalizeParams, Localizer};
use crate::config::Config;

/// Bundle searched when a lookup names none.
pub const DEFAULT_BUNDLE: &str = "phrases";

/// Message bundle store.
#[derive(Clone, Default)]
pub struct MessageBundles {
    /// key = "bundle\0locale\0key" → message; the default locale is "".
    messages: Arc<DashMap<String, String>>,
    default_locale: Option<String>,
}

impl MessageBundles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `locale` for lookups that do not name one.
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(normalize_locale(&locale.into()));
        self
    }

    /// Build bundles from configuration, loading `i18n_dir` when set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut bundles = Self::new();
        if let Some(locale) = &config.default_locale {
            bundles = bundles.with_default_locale(locale);
        }
        if let Some(dir) = &config.i18n_dir {
            bundles.load_dir(dir)?;
        }
        Ok(bundles)
    }

    /// Register one message. `locale = None` targets the default locale.
    pub fn insert(
        &self,
        bundle: &str,
        locale: Option<&str>,
        key: impl AsRef<str>,
        message: impl Into<String>,
    ) {
        let locale = locale.map(normalize_locale).unwrap_or_default();
        self.messages
            .insert(cache_key(bundle, &locale, key.as_ref()), message.into());
    }

    /// Register every entry of a `.properties` document.
    pub fn load_str(&self, bundle: &str, locale: Option<&str>, content: &str) -> usize {
        let entries = parse_properties(content);
        let count = entries.len();
        for (key, message) in entries {
            self.insert(bundle, locale, key, message);
        }
        debug!(bundle = %bundle, locale = ?locale, count = count, "loaded message bundle");
        count
    }

    /// Load every `*.properties` file in `dir`.
    ///
    /// `phrases.properties` fills the default locale of bundle `phrases`;
    /// `phrases_nb_NO.properties` fills locale `nb_NO`.
    pub fn load_dir(&self, dir: &Path) -> Result<usize> {
        let mut total = 0usize;
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read i18n directory {}", dir.display()))?;

        for entry in entries {
            let path = entry.context("failed to read i18n directory entry")?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("properties") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let (bundle, locale) = match stem.split_once('_') {
                Some((bundle, locale)) => (bundle, Some(locale)),
                None => (stem, None),
            };

            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read bundle {}", path.display()))?;
            total += self.load_str(bundle, locale, &content);
        }

        info!(dir = %dir.display(), count = total, "loaded message bundles");
        Ok(total)
    }

    /// Number of registered messages across all bundles and locales.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn lookup(&self, bundle: &str, locales: &[String], key: &str) -> Option<String> {
        locales.iter().find_map(|locale| {
            self.messages
                .get(&cache_key(bundle, locale, key))
                .map(|m| m.clone())
        })
    }
}

impl Localizer for MessageBundles {
    fn localize(&self, key: &str, params: &LocalizeParams) -> Option<String> {
        let locale = params
            .locale
            .as_deref()
            .map(normalize_locale)
            .or_else(|| self.default_locale.clone());
        let locales = locale_chain(locale.as_deref());

        let found = if params.bundles.is_empty() {
            self.lookup(DEFAULT_BUNDLE, &locales, key)
        } else {
            params
                .bundles
                .iter()
                .find_map(|bundle| self.lookup(bundle, &locales, key))
        };

        match found {
            Some(message) => Some(format_message(&message, &params.values)),
            None => {
                debug!(key = %key, locale = ?locale, "no translation");
                None
            }
        }
    }
}

/// Build a cache key from bundle, locale, and message key.
///
/// Null byte separators keep dotted keys from colliding across bundles.
fn cache_key(bundle: &str, locale: &str, key: &str) -> String {
    format!("{bundle}\0{locale}\0{key}")
}

fn normalize_locale(locale: &str) -> String {
    locale.trim().replace('-', "_")
}

/// `nb_NO_x` → [`nb_NO_x`, `nb_NO`, `nb`, ``].
fn locale_chain(locale: Option<&str>) -> Vec<String> {
    let mut chain = Vec::new();
    if let Some(locale) = locale.filter(|l| !l.is_empty()) {
        let mut current = locale.to_string();
        loop {
            chain.push(current.clone());
            match current.rfind('_') {
                Some(idx) => current.truncate(idx),
                None => break,
            }
        }
    }
    chain.push(String::new());
    chain
}

/// Replace `{0}`, `{1}`, ... with the matching value.
fn format_message(message: &str, values: &[String]) -> String {
    values
        .iter()
        .enumerate()
        .fold(message.to_string(), |acc, (i, value)| {
            acc.replace(&format!("{{{i}}}"), value)
        })
}

impl std::fmt::Debug for MessageBundles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBundles")
            .field("messages", &self.messages.len())
            .field("default_locale", &self.default_locale)
            .finish()
    }
}
