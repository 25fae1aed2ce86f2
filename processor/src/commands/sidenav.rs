use htmlpp::Condition;
use htmlpp::syntax::{SidenavCommand, SidenavError};

use super::{Directive, Output};
use crate::context::Context;
use crate::error::ProcessError;

/// `#sidenav skip | section <label> | name <label> | custom <href> <label> | include`
pub struct Sidenav;

impl Directive for Sidenav {
    fn name(&self) -> &str {
        "sidenav"
    }

    fn execute(&self, args: &str, ctx: &mut Context) -> Result<Output, ProcessError> {
        let command = match SidenavCommand::parse(args) {
            Ok(command) => command,
            Err(e) => {
                let condition = match e {
                    SidenavError::UnknownSubcommand(_) => Condition::UnknownSidenavCommand,
                    SidenavError::MalformedCustom(_) => Condition::MalformedCustomEntry,
                };
                ctx.report(condition, e.to_string())?;
                return Ok(Output::empty());
            }
        };
        match command {
            SidenavCommand::Skip => ctx.sidebar.skip_next(),
            SidenavCommand::Section(label) => ctx.sidebar.add_section(&label),
            SidenavCommand::Name(label) => ctx.sidebar.set_custom_name(&label),
            SidenavCommand::Custom { href, label } => {
                ctx.sidebar.add_link(&label, &href);
            }
            SidenavCommand::Include => return Ok(Output::SidebarAnchor),
        }
        Ok(Output::empty())
    }
}
