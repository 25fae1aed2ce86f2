use htmlpp::{NavEntry, NavTemplate};

/// Navigation entries discovered during one run, plus the one-shot
/// modifiers that apply to the next link.
#[derive(Debug, Clone, Default)]
pub struct Sidebar {
    entries: Vec<NavEntry>,
    skip_next: bool,
    custom_name: Option<String>,
    template: NavTemplate,
}

impl Sidebar {
    pub fn new(template: NavTemplate) -> Self {
        Sidebar {
            template,
            ..Sidebar::default()
        }
    }

    /// Append a link unless a pending skip swallows it. A pending name
    /// override replaces `label`. Both modifiers are consumed here. Returns
    /// whether an entry was added.
    pub fn add_link(&mut self, label: &str, target: &str) -> bool {
        if std::mem::take(&mut self.skip_next) {
            tracing::debug!(label, target, "sidebar link skipped");
            return false;
        }
        let label = self.custom_name.take().unwrap_or_else(|| label.to_string());
        self.entries.push(NavEntry::Link {
            label,
            target: target.to_string(),
        });
        true
    }

    /// Append a section title. Never skipped or renamed.
    pub fn add_section(&mut self, label: &str) {
        self.entries.push(NavEntry::Section {
            label: label.to_string(),
        });
    }

    /// Rename the next link. An empty name clears the override.
    pub fn set_custom_name(&mut self, label: &str) {
        self.custom_name = (!label.is_empty()).then(|| label.to_string());
    }

    /// Drop the next link.
    pub fn skip_next(&mut self) {
        self.skip_next = true;
    }

    pub fn entries(&self) -> &[NavEntry] {
        &self.entries
    }

    pub fn render(&self) -> String {
        self.template.render(&self.entries)
    }
}
