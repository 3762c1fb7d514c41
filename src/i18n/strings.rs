use crate::i18n::LanguageRegistry;

/// Built-in user-facing strings for a language.
///
/// These back the error view when translation resources could not be
/// loaded, so the page can always say something in the visitor's language.
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    /// Language code these strings belong to
    pub code: &'static str,

    /// Heading for failures that carry no usable message
    pub error_generic_heading: &'static str,

    /// Heading for the development error view
    pub error_dev_heading: &'static str,

    /// Support contact line
    /// Placeholders: {{email}}
    pub error_contact: &'static str,

    /// Document title
    pub document_title: &'static str,
}

// ==================== Norwegian Strings ====================

/// Norwegian Bokmål strings (canonical)
pub const NORWEGIAN_STRINGS: LanguageStrings = LanguageStrings {
    code: "nb",
    error_generic_heading: "Opps, her skjedde det en feil!",
    error_dev_heading: "There was an error",
    error_contact: "Ta kontakt med {{email}} om feilen vedvarer.",
    document_title: "Alternativ transport",
};

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    code: "en",
    error_generic_heading: "Oops, something went wrong!",
    error_dev_heading: "There was an error",
    error_contact: "Contact {{email}} if the problem persists.",
    document_title: "Alternative transport",
};

impl LanguageStrings {
    /// Strings for `code`, trying its primary subtag next and the canonical
    /// language last.
    pub fn for_code(code: &str) -> &'static LanguageStrings {
        let base = code.split('-').next().unwrap_or(code);
        Self::lookup(code)
            .or_else(|| Self::lookup(base))
            .or_else(|| Self::lookup(LanguageRegistry::get().canonical().code))
            .unwrap_or(&NORWEGIAN_STRINGS)
    }

    fn lookup(code: &str) -> Option<&'static LanguageStrings> {
        match code {
            "nb" => Some(&NORWEGIAN_STRINGS),
            "en" => Some(&ENGLISH_STRINGS),
            _ => None,
        }
    }
}
