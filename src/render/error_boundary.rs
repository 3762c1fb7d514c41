//! Fallback view rendered when a page fails.

use crate::config::Environment;
use crate::i18n::instance::interpolate;
use crate::i18n::{FixedT, LanguageStrings};
use crate::render::escape_html;
use serde_json::Value;
use tracing::error;

/// Something a page render failed with.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderFailure {
    /// A real error with a message and, when available, a diagnostic trace.
    Error {
        message: String,
        stack: Option<String>,
    },
    /// Any other thrown value (a response status, a bare string, ...).
    Other(Value),
}

impl RenderFailure {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            stack: None,
        }
    }

    pub fn other(value: impl Into<Value>) -> Self {
        Self::Other(value.into())
    }
}

impl From<anyhow::Error> for RenderFailure {
    fn from(err: anyhow::Error) -> Self {
        Self::Error {
            message: err.to_string(),
            stack: Some(format!("{:?}", err)),
        }
    }
}

/// Localized text for the error view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorStrings {
    pub generic_heading: String,
    pub dev_heading: String,
    pub contact: String,
}

impl ErrorStrings {
    /// Prefer the loaded `common` translations; fall back to the built-in
    /// strings for `language`.
    pub fn resolve(t: Option<&FixedT>, language: &str, support_email: &str) -> Self {
        let builtin = LanguageStrings::for_code(language);
        let lookup = |key: &str| t.and_then(|t| t.try_t(key));

        let contact = lookup("common:error.contact").unwrap_or_else(|| builtin.error_contact.to_string());

        Self {
            generic_heading: lookup("common:error.generic")
                .unwrap_or_else(|| builtin.error_generic_heading.to_string()),
            dev_heading: builtin.error_dev_heading.to_string(),
            contact: interpolate(&contact, &[("email", support_email)]),
        }
    }
}

/// Render the error view for `failure`.
///
/// Only a development deployment shows the trace. Values that are not errors
/// never have their content shown.
pub fn render_error_boundary(
    failure: &RenderFailure,
    environment: Environment,
    strings: &ErrorStrings,
) -> String {
    match failure {
        RenderFailure::Error { message, stack } if environment.is_development() => {
            error!(stack = stack.as_deref().unwrap_or_default(), "Render failed: {}", message);
            format!(
                "<div class=\"error-boundary error-boundary--dev\">\
                 <h1>{}</h1><pre>{}</pre><p>{}</p></div>",
                escape_html(&strings.dev_heading),
                escape_html(&json_quote(message)),
                escape_html(&stack.as_deref().map(json_quote).unwrap_or_else(|| "null".to_string())),
            )
        }
        RenderFailure::Error { message, .. } => format!(
            "<div class=\"error-boundary\"><h1><pre>{}</pre></h1><p>{}</p></div>",
            escape_html(&json_quote(message)),
            escape_html(&strings.contact),
        ),
        RenderFailure::Other(_) => format!(
            "<div class=\"error-boundary\"><h1>{}</h1><p>{}</p></div>",
            escape_html(&strings.generic_heading),
            escape_html(&strings.contact),
        ),
    }
}

fn json_quote(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}
