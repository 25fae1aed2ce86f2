use std::sync::LazyLock;

use regex::Regex;

/// `href="target" name="Label"`
static KEYED_CUSTOM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^href=["']([^"' ]+)["'] +name=["'](.+)["']$"#).expect("valid custom entry pattern")
});

/// Sub-commands of the `sidenav` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidenavCommand {
    /// Drop the next auto-detected heading.
    Skip,
    /// Insert a section title.
    Section(String),
    /// Rename the next auto-detected heading.
    Name(String),
    /// Explicit link entry.
    Custom { href: String, label: String },
    /// Mark where the rendered sidebar goes.
    Include,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SidenavError {
    #[error("invalid sidenav command: '{0}'")]
    UnknownSubcommand(String),
    #[error("invalid argument for sidenav command 'custom': '{0}'")]
    MalformedCustom(String),
}

impl SidenavCommand {
    /// Parse the arguments of a `#sidenav` directive.
    pub fn parse(args: &str) -> Result<SidenavCommand, SidenavError> {
        let args = args.trim_matches(' ');
        let (command, rest) = match args.split_once(' ') {
            Some((command, rest)) => (command, rest.trim_matches(' ')),
            None => (args, ""),
        };
        match command {
            "skip" => Ok(SidenavCommand::Skip),
            "section" => Ok(SidenavCommand::Section(rest.to_string())),
            "name" => Ok(SidenavCommand::Name(rest.to_string())),
            "include" => Ok(SidenavCommand::Include),
            "custom" => parse_custom(rest),
            other => Err(SidenavError::UnknownSubcommand(other.to_string())),
        }
    }
}

/// Either `href="…" name="…"` or the bare `<href> <label…>`.
fn parse_custom(args: &str) -> Result<SidenavCommand, SidenavError> {
    let malformed = || SidenavError::MalformedCustom(args.to_string());
    if args.starts_with("href=") {
        let caps = KEYED_CUSTOM.captures(args).ok_or_else(malformed)?;
        return Ok(SidenavCommand::Custom {
            href: caps[1].to_string(),
            label: caps[2].to_string(),
        });
    }
    let (href, label) = args.split_once(char::is_whitespace).ok_or_else(malformed)?;
    let label = label.trim();
    if href.is_empty() || label.is_empty() {
        return Err(malformed());
    }
    Ok(SidenavCommand::Custom {
        href: href.to_string(),
        label: label.to_string(),
    })
}
