/// A directive found inside a comment: `#<name> <arguments>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveCall<'a> {
    pub name: &'a str,
    /// Arguments with tabs folded to spaces and surrounding spaces removed.
    pub args: String,
}

/// Parse a comment segment as a directive call.
///
/// The segment is trimmed first. It must start with `#` followed by an ASCII
/// alphabetic command name, which is either the whole segment or followed by
/// whitespace. Anything else (plain comment text, `#$(var)` references,
/// `#123`) is not a directive.
pub fn parse_directive(segment: &str) -> Option<DirectiveCall<'_>> {
    let body = segment.trim().strip_prefix('#')?;
    let name_len = body
        .bytes()
        .position(|b| !b.is_ascii_alphabetic())
        .unwrap_or(body.len());
    if name_len == 0 {
        return None;
    }
    let (name, rest) = body.split_at(name_len);
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let args = rest.replace('\t', " ").trim_matches(' ').to_string();
    Some(DirectiveCall { name, args })
}
