//! Server-side rendering: routes, pages, the document shell and the error
//! view.

pub mod document;
pub mod error_boundary;
pub mod pages;
pub mod routes;
pub mod styles;

pub use document::{render_document, DocumentProps, DocumentShell};
pub use error_boundary::{render_error_boundary, ErrorStrings, RenderFailure};
pub use pages::{HomePage, PageContext, PageRenderer};
pub use routes::{Namespaces, RenderContext, RouteHandle, RouteModule, RouteTable};
pub use styles::{ClientStyleContext, ServerStyleContext, StyleCollector, StyleFragment, StyleSheet};

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
