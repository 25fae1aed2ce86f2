use htmlpp::syntax::ConditionalMap;
use tracing::debug;

use super::{Directive, Output};
use crate::conditional;
use crate::context::Context;
use crate::error::ProcessError;

/// `#set name [value]`, always assigns.
pub struct Set;

/// `#default name [value]`, assigns only when `name` is unset.
pub struct SetDefault;

impl Directive for Set {
    fn name(&self) -> &str {
        "set"
    }

    fn execute(&self, args: &str, ctx: &mut Context) -> Result<Output, ProcessError> {
        assign(args, ctx);
        Ok(Output::empty())
    }
}

impl Directive for SetDefault {
    fn name(&self) -> &str {
        "default"
    }

    fn execute(&self, args: &str, ctx: &mut Context) -> Result<Output, ProcessError> {
        let name = args.split_once(' ').map_or(args, |(name, _)| name);
        if ctx.variables.contains(name) {
            debug!(name, "default ignored, variable already set");
        } else {
            assign(args, ctx);
        }
        Ok(Output::empty())
    }
}

/// Assign from `name value`. A missing value stores the empty string; a
/// conditional map resets `name` to empty and then applies the selected
/// branch, if any.
fn assign(args: &str, ctx: &mut Context) {
    let Some((name, value)) = args.split_once(' ') else {
        if args.is_empty() {
            debug!("set without a variable name ignored");
        } else {
            debug!(name = args, "setting to empty string");
            ctx.variables.set(args, "");
        }
        return;
    };
    let value = value.trim_matches(' ');
    ctx.variables.set(name, "");

    let Some(map) = ConditionalMap::parse(value) else {
        debug!(name, value, "assignment");
        ctx.variables.set(name, value);
        return;
    };
    match conditional::resolve(&map, &ctx.variables) {
        Some(selected) => {
            debug!(name, depends = %map.depends, selected, "assignment from map");
            ctx.variables.set(name, selected);
        }
        None => {
            debug!(name, depends = %map.depends, "map depends on an unset variable");
        }
    }
}
