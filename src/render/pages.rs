//! Page renderers. The server treats these as opaque: given a context they
//! produce body markup or a [`RenderFailure`].

use crate::i18n::FixedT;
use crate::render::error_boundary::RenderFailure;
use crate::render::escape_html;
use crate::render::styles::StyleCollector;

/// Inputs available to a page while it renders.
pub struct PageContext<'a> {
    pub path: &'a str,
    pub t: &'a FixedT,
    pub styles: &'a mut StyleCollector,
}

pub trait PageRenderer: Send + Sync {
    fn render(&self, ctx: &mut PageContext<'_>) -> Result<String, RenderFailure>;
}

/// Landing page.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomePage;

impl PageRenderer for HomePage {
    fn render(&self, ctx: &mut PageContext<'_>) -> Result<String, RenderFailure> {
        ctx.styles
            .insert("css", "home-main", ".home-main{max-width:60rem;margin:0 auto;padding:2rem}");
        ctx.styles
            .insert("css", "home-title", ".home-title{font-size:2rem}");

        Ok(format!(
            "<main class=\"home-main\"><h1 class=\"home-title\">{}</h1><p>{}</p></main>",
            escape_html(&ctx.t.t("home:title")),
            escape_html(&ctx.t.t("home:description")),
        ))
    }
}
