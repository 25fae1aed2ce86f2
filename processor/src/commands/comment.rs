use htmlpp::syntax::{COMMENT_CLOSE, COMMENT_OPEN};

use super::{Directive, Output};
use crate::context::Context;
use crate::error::ProcessError;

/// Wrap `text` in comment delimiters.
pub fn comment(text: &str) -> String {
    format!("{COMMENT_OPEN} {text} {COMMENT_CLOSE}")
}

/// Strip the delimiters [`comment`] adds. Text that is not wrapped in a
/// comment comes back verbatim.
pub fn uncomment(text: &str) -> &str {
    let Some(inner) = text
        .strip_prefix(COMMENT_OPEN)
        .and_then(|rest| rest.strip_suffix(COMMENT_CLOSE))
    else {
        return text;
    };
    let inner = inner.strip_prefix(' ').unwrap_or(inner);
    inner.strip_suffix(' ').unwrap_or(inner)
}

/// `#comment text` hides a block.
pub struct Comment;

/// `#uncomment text` reveals a block.
pub struct Uncomment;

impl Directive for Comment {
    fn name(&self) -> &str {
        "comment"
    }

    fn execute(&self, args: &str, _ctx: &mut Context) -> Result<Output, ProcessError> {
        Ok(Output::text(comment(args)))
    }
}

impl Directive for Uncomment {
    fn name(&self) -> &str {
        "uncomment"
    }

    fn execute(&self, args: &str, _ctx: &mut Context) -> Result<Output, ProcessError> {
        Ok(Output::text(uncomment(args)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_wraps() {
        assert_eq!(comment("<b>x</b>"), "<!-- <b>x</b> -->");
    }

    #[test]
    fn uncomment_inverts_comment() {
        for text in ["", "x", " padded ", "<p>a <!-- b</p>", "--"] {
            assert_eq!(uncomment(&comment(text)), text);
        }
    }

    #[test]
    fn uncomment_passes_plain_text_through() {
        assert_eq!(uncomment("<b>shown</b>"), "<b>shown</b>");
        assert_eq!(uncomment("<!--unclosed"), "<!--unclosed");
    }
}
