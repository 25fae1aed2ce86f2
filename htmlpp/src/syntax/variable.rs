use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// `#$(name)`
static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\$\(([a-zA-Z0-9_]+)\)").expect("valid variable reference pattern"));

/// A `#$(name)` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRef<'a> {
    pub name: &'a str,
    /// Byte range of the whole reference, `#$(` through `)`.
    pub span: Range<usize>,
}

/// All variable references in `text`, left to right.
pub fn find_references(text: &str) -> Vec<VariableRef<'_>> {
    REFERENCE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(VariableRef {
                name: name.as_str(),
                span: whole.range(),
            })
        })
        .collect()
}

/// Rewrite every reference in `text` with `value(name)`, in one left-to-right
/// pass over the original match positions. Values are inserted literally.
pub fn replace_references<F>(text: &str, mut value: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for reference in find_references(text) {
        out.push_str(&text[last..reference.span.start]);
        out.push_str(&value(reference.name));
        last = reference.span.end;
    }
    out.push_str(&text[last..]);
    out
}
