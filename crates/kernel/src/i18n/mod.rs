//! Localized message lookup.

pub mod bundle;
pub mod properties;

pub use bundle::{DEFAULT_BUNDLE, MessageBundles};
pub use properties::parse_properties;

/// Parameters forwarded with every lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizeParams {
    /// Locale such as `nb_NO`; `None` uses the localizer's default.
    pub locale: Option<String>,
    /// Positional values substituted into `{0}`, `{1}`, ...
    pub values: Vec<String>,
    /// Bundles to search, in order; empty means the default bundle.
    pub bundles: Vec<String>,
}

impl LocalizeParams {
    pub fn locale(locale: impl Into<String>) -> Self {
        Self {
            locale: Some(locale.into()),
            ..Self::default()
        }
    }
}

/// Resolves message keys to translated strings.
pub trait Localizer: Send + Sync {
    /// Translation of `key`, or `None` when nothing is registered for it.
    fn localize(&self, key: &str, params: &LocalizeParams) -> Option<String>;
}

/// First key in `keys` that resolves.
pub fn localize_first<I, S>(
    localizer: &(impl Localizer + ?Sized),
    keys: I,
    params: &LocalizeParams,
) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter()
        .find_map(|key| localizer.localize(key.as_ref(), params))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn first_resolving_key_wins() {
        let bundles = MessageBundles::new();
        bundles.insert(DEFAULT_BUNDLE, None, "b", "second");
        bundles.insert(DEFAULT_BUNDLE, None, "c", "third");

        let found = localize_first(&bundles, ["a", "b", "c"], &LocalizeParams::default());
        assert_eq!(found.as_deref(), Some("second"));
    }

    #[test]
    fn none_when_nothing_resolves() {
        let bundles = MessageBundles::new();
        assert!(localize_first(&bundles, ["a", "b"], &LocalizeParams::default()).is_none());
    }
}
