use std::ops::Range;

use htmlpp::syntax::find_references;

use crate::store::VariableStore;

/// Value inserted for `name`: its stored value trimmed of spaces, or empty.
pub fn value_of<'s>(name: &str, store: &'s VariableStore) -> &'s str {
    store.get(name).unwrap_or("").trim_matches(' ')
}

/// Every `#$(name)` in `text` with its replacement, in document order, as
/// (range in `text`, replacement) pairs. Apply them right to left; inserted
/// values are not scanned again.
pub fn substitutions(text: &str, store: &VariableStore) -> Vec<(Range<usize>, String)> {
    find_references(text)
        .into_iter()
        .map(|reference| (reference.span, value_of(reference.name, store).to_string()))
        .collect()
}
