//! Locale set threaded through every build.
//!
//! The active locale is always an explicit parameter in this crate; this
//! type only carries the configured set and the default. There is no
//! process-wide "current locale" to save and restore.

/// The locales a site is built for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locales {
    /// Locale used when a node opts out of localization without naming one.
    pub default: String,
    /// Full set iterated when a node has `l10n` enabled.
    pub available: Vec<String>,
}

impl Locales {
    /// Create a locale set.
    #[must_use]
    pub fn new(default: impl Into<String>, available: Vec<String>) -> Self {
        Self {
            default: default.into(),
            available,
        }
    }

    /// A single-locale site.
    #[must_use]
    pub fn single(locale: impl Into<String>) -> Self {
        let locale = locale.into();
        Self {
            available: vec![locale.clone()],
            default: locale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_locale_set() {
        let locales = Locales::single("en");

        assert_eq!(locales.default, "en");
        assert_eq!(locales.available, vec!["en".to_owned()]);
    }
}
