use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// A heading element with an `id` attribute: `<h2 id="intro">Intro</h2>`.
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<h[1-6]\b[^>]*?\bid\s*=\s*["']([a-zA-Z0-9_\-]+)["'][^>]*>(.+?)</h[1-6]\s*>"#,
    )
    .expect("valid heading pattern")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub id: String,
    /// Text content of the heading, nested tags removed.
    pub label: String,
    /// Byte range of the whole element within the searched text.
    pub span: Range<usize>,
}

impl Heading {
    /// In-page anchor for this heading.
    pub fn target(&self) -> String {
        format!("#{}", self.id)
    }
}

/// Every identified heading in `text` whose text content is not empty.
pub fn find_headings(text: &str) -> Vec<Heading> {
    HEADING
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let label = TAG.replace_all(caps.get(2)?.as_str(), "");
            let label = label.trim();
            if label.is_empty() {
                return None;
            }
            Some(Heading {
                id: caps.get(1)?.as_str().to_string(),
                label: label.to_string(),
                span: whole.range(),
            })
        })
        .collect()
}
