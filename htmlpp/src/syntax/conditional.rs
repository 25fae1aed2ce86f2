use std::sync::LazyLock;

use regex::Regex;

/// Branch token that matches any value of the controlling variable.
pub const WILDCARD: &str = "*";

static COMMA_MAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([a-zA-Z0-9_]+) *\? *\{( *(?:[a-zA-Z0-9_*]+ *: *[^,]*, *)*[a-zA-Z0-9_*]+ *: *[^,]*) *,? *\}$",
    )
    .expect("valid comma map pattern")
});

static SEMICOLON_MAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([a-zA-Z0-9_]+) *\? *\{( *(?:[a-zA-Z0-9_*]+ *: *[^;]*; *)*[a-zA-Z0-9_*]+ *: *[^;]*) *;? *\}$",
    )
    .expect("valid semicolon map pattern")
});

/// `depends?{token:value, token:value, ...}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalMap {
    /// Variable whose current value selects the branch.
    pub depends: String,
    /// Branches in written order.
    pub branches: Vec<Branch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub token: String,
    pub value: String,
}

impl Branch {
    /// True if this branch applies when the controlling variable is `value`.
    pub fn matches(&self, value: &str) -> bool {
        self.token == value || self.token == WILDCARD
    }
}

impl ConditionalMap {
    /// Parse a conditional map. Comma-delimited branches are tried first,
    /// then semicolon-delimited ones. Text without any comma is only read
    /// as the semicolon form, so `a?{x:1;y:2}` is two branches. Returns
    /// `None` if `text` is not a map, in which case the caller treats it as
    /// a literal value.
    pub fn parse(text: &str) -> Option<ConditionalMap> {
        let text = text.trim_matches(' ');
        let comma = text.contains(',').then(|| COMMA_MAP.captures(text)).flatten();
        let (caps, separator) = match comma {
            Some(caps) => (caps, ','),
            None => (SEMICOLON_MAP.captures(text)?, ';'),
        };
        let depends = caps.get(1)?.as_str().to_string();
        let branches = caps
            .get(2)?
            .as_str()
            .split(separator)
            .filter_map(|option| {
                let (token, value) = option.split_once(':')?;
                Some(Branch {
                    token: token.trim_matches(' ').to_string(),
                    value: value.trim_matches(' ').to_string(),
                })
            })
            .collect();
        Some(ConditionalMap { depends, branches })
    }
}
