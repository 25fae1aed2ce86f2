use htmlpp::syntax::ConditionalMap;

use crate::store::VariableStore;

/// Select a value from `map` using the current value of its controlling
/// variable.
///
/// Branches are walked in written order and every matching branch (exact
/// token or `*`) overrides the previous selection, so the last match wins.
/// No match selects the empty string. Returns `None` when the controlling
/// variable is unset, in which case no branch applies.
pub fn resolve<'m>(map: &'m ConditionalMap, store: &VariableStore) -> Option<&'m str> {
    let current = store.get(&map.depends)?;
    Some(
        map.branches
            .iter()
            .rev()
            .find(|branch| branch.matches(current))
            .map_or("", |branch| branch.value.as_str()),
    )
}
