//! The languages the site ships translations for.
//!
//! Enabled codes are the default supported set for locale detection and the
//! canonical language is the default fallback.

/// A shipped language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Tag used in query strings, cookies and `public/locales/{code}/`.
    pub code: &'static str,
    pub is_canonical: bool,
}

/// Norwegian Bokmål first; it is what visitors without a preference see.
const LANGUAGES: &[LanguageConfig] = &[
    LanguageConfig {
        code: "nb",
        is_canonical: true,
    },
    LanguageConfig {
        code: "en",
        is_canonical: false,
    },
];

static REGISTRY: LanguageRegistry = LanguageRegistry {
    languages: LANGUAGES,
};

pub struct LanguageRegistry {
    languages: &'static [LanguageConfig],
}

impl LanguageRegistry {
    pub fn get() -> &'static LanguageRegistry {
        &REGISTRY
    }

    /// Every shipped code, canonical first.
    pub fn enabled_codes(&self) -> Vec<String> {
        let mut languages: Vec<_> = self.languages.iter().collect();
        languages.sort_by_key(|lang| !lang.is_canonical);
        languages.into_iter().map(|lang| lang.code.to_string()).collect()
    }

    /// # Panics
    /// When `LANGUAGES` has no canonical entry.
    pub fn canonical(&self) -> &LanguageConfig {
        self.languages
            .iter()
            .find(|lang| lang.is_canonical)
            .unwrap_or_else(|| panic!("No canonical language in registry"))
    }
}
