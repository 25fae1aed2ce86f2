use std::path::Path;

use pulldown_cmark::{Options, Parser, html};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ConversionError(pub String);

/// Converts included lightweight-markup files to HTML.
pub trait MarkupConverter {
    /// Whether an include at `path` should be converted.
    fn handles(&self, path: &Path) -> bool;

    fn convert(&self, source: &str) -> Result<String, ConversionError>;
}

/// CommonMark (plus tables, strikethrough and footnotes) for `.md` and
/// `.markdown` includes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Markdown;

impl MarkupConverter for Markdown {
    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
    }

    fn convert(&self, source: &str) -> Result<String, ConversionError> {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES;
        let parser = Parser::new_ext(source, options);
        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}
