use std::collections::HashSet;

/// Line of the frame template replaced by the rendered entries.
pub const CONTENT_PLACEHOLDER: &str = "#sidenav-content";
/// Replaced by the entry label in link and section templates.
pub const NAME_PLACEHOLDER: &str = "#name";
/// Replaced by the link target in the link template.
pub const LINK_PLACEHOLDER: &str = "#link";

const DEFAULT_FRAME: &str = r#"<div class="sidenav">
<ul>
    <li class="menudrop">&#9776;</li>
    #sidenav-content
</ul>
</div>"#;
const DEFAULT_LINK: &str = r##"<li class="sidenav_link"><a href="#link">#name</a></li>"##;
const DEFAULT_SECTION: &str = r#"<li class="sidenav_section">#name</li>"#;

/// A sidebar navigation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEntry {
    Link { label: String, target: String },
    Section { label: String },
}

/// Markup used to render the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavTemplate {
    /// Outer markup. The first line containing [`CONTENT_PLACEHOLDER`] is
    /// replaced by one line per entry.
    pub frame: String,
    pub link: String,
    pub section: String,
}

impl Default for NavTemplate {
    fn default() -> Self {
        NavTemplate {
            frame: DEFAULT_FRAME.to_string(),
            link: DEFAULT_LINK.to_string(),
            section: DEFAULT_SECTION.to_string(),
        }
    }
}

impl NavTemplate {
    /// Render `entries` into the frame. Every output line ends with `\n`.
    ///
    /// Links sharing a target collapse to the one discovered last; the
    /// survivors keep their relative order. Sections are never collapsed.
    pub fn render(&self, entries: &[NavEntry]) -> String {
        let mut lines: Vec<String> = self.frame.split('\n').map(str::to_string).collect();
        if let Some(slot) = lines.iter().position(|line| line.contains(CONTENT_PLACEHOLDER)) {
            let rendered: Vec<String> = retain_latest_links(entries)
                .into_iter()
                .map(|entry| self.render_entry(entry))
                .collect();
            lines.splice(slot..=slot, rendered);
        }
        let mut out = String::new();
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    fn render_entry(&self, entry: &NavEntry) -> String {
        match entry {
            NavEntry::Link { label, target } => fill(
                &self.link,
                &[(NAME_PLACEHOLDER, label), (LINK_PLACEHOLDER, target)],
            ),
            NavEntry::Section { label } => fill(&self.section, &[(NAME_PLACEHOLDER, label)]),
        }
    }
}

/// Drop every link whose target reappears later in `entries`.
fn retain_latest_links(entries: &[NavEntry]) -> Vec<&NavEntry> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut kept: Vec<&NavEntry> = entries
        .iter()
        .rev()
        .filter(|entry| match entry {
            NavEntry::Link { target, .. } => seen.insert(target.as_str()),
            NavEntry::Section { .. } => true,
        })
        .collect();
    kept.reverse();
    kept
}

/// Replace placeholders in one left-to-right pass, so substituted values are
/// never scanned for further placeholders.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    'scan: while !rest.is_empty() {
        for (placeholder, value) in values {
            if let Some(after) = rest.strip_prefix(placeholder) {
                out.push_str(value);
                rest = after;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}
