//! The HTML document every page is rendered into.

use crate::render::escape_html;
use crate::render::styles::{ClientStyleContext, ServerStyleContext, SheetContainer, StyleSheet};
use std::fmt::Write;

/// What goes around the page body.
#[derive(Debug, Clone, Default)]
pub struct DocumentProps {
    pub lang: String,
    pub title: String,
    /// Stylesheet hrefs emitted as `<link rel="stylesheet">`
    pub links: Vec<String>,
    /// Module script srcs emitted at the end of `<body>`
    pub scripts: Vec<String>,
    /// Already rendered page markup
    pub children: String,
}

/// Render a complete HTML document with the server styles inlined.
pub fn render_document(props: &DocumentProps, server_styles: &ServerStyleContext) -> String {
    let mut html = String::with_capacity(props.children.len() + 512);

    html.push_str("<!DOCTYPE html>");
    let _ = write!(html, "<html lang=\"{}\">", escape_html(&props.lang));
    html.push_str("<head>");
    html.push_str("<meta charset=\"utf-8\">");
    let _ = write!(html, "<title>{}</title>", escape_html(&props.title));
    html.push_str("<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">");

    for href in &props.links {
        let _ = write!(html, "<link rel=\"stylesheet\" href=\"{}\">", escape_html(href));
    }

    // CSS is emitted raw; only the closing tag sequence is neutralized.
    for fragment in server_styles.fragments() {
        let _ = write!(
            html,
            "<style data-emotion=\"{}\">{}</style>",
            escape_html(&fragment.data_attribute()),
            fragment.css.replace("</style", "<\\/style")
        );
    }

    html.push_str("</head><body>");
    html.push_str(&props.children);

    for src in &props.scripts {
        let _ = write!(html, "<script type=\"module\" src=\"{}\"></script>", escape_html(src));
    }

    html.push_str("</body></html>");
    html
}

/// Client-side lifetime of a mounted document.
///
/// When an error boundary replaces the document, the head is rebuilt and the
/// style sheet loses its tags. On first mount the shell relinks the sheet to
/// the head, reinserts its tags and resets the client styles. Further calls
/// on the same mount are no-ops.
#[derive(Debug)]
pub struct DocumentShell {
    reinject_styles: bool,
}

impl DocumentShell {
    pub fn mount() -> Self {
        Self {
            reinject_styles: true,
        }
    }

    /// Returns `true` when styles were reinjected by this call.
    pub fn on_mount(&mut self, sheet: &mut StyleSheet, client: &ClientStyleContext) -> bool {
        if !self.reinject_styles {
            return false;
        }

        sheet.set_container(SheetContainer::DocumentHead);
        for tag in sheet.flush() {
            sheet.insert_tag(tag);
        }
        client.reset();

        self.reinject_styles = false;
        true
    }
}
