use std::fs;

use htmlpp::Condition;
use tracing::debug;

use super::{Directive, Output};
use crate::context::Context;
use crate::error::ProcessError;

/// `#include path` splices in a file, converting lightweight markup first.
pub struct Include;

impl Directive for Include {
    fn name(&self) -> &str {
        "include"
    }

    fn execute(&self, args: &str, ctx: &mut Context) -> Result<Output, ProcessError> {
        let path = ctx.resolve_path(args);
        debug!(path = %path.display(), "include");

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                ctx.report(
                    Condition::IncludeNotFound,
                    format!("could not open file '{args}': {e}"),
                )?;
                return Ok(Output::text(format!("<!-- Could not include '{args}' -->")));
            }
        };

        let content = if ctx.converter().handles(&path) {
            let converted = ctx.converter().convert(&content);
            match converted {
                Ok(html) => html,
                Err(e) => {
                    ctx.report(
                        Condition::MarkupConversion,
                        format!("could not convert '{args}' to html: {e}"),
                    )?;
                    return Ok(Output::text(format!(
                        "<!-- Could not convert to html: '{args}' -->"
                    )));
                }
            }
        } else {
            content
        };

        ctx.dependencies.push(args.to_string());
        Ok(Output::Text(content))
    }
}
