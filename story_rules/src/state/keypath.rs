//! Keypath helpers - dot-delimited addresses into the state tree.

use serde_json::{Map, Value};

/// Separator between keypath segments.
pub const KEYPATH_SEPARATOR: char = '.';

/// Split a keypath into its segments.
pub fn split(keypath: &str) -> std::str::Split<'_, char> {
    keypath.split(KEYPATH_SEPARATOR)
}

/// Write `value` at `keypath` below `map`, creating mappings for missing or
/// non-mapping inner segments.
pub(crate) fn set_nested(map: &mut Map<String, Value>, keypath: &str, value: Value) {
    match keypath.split_once(KEYPATH_SEPARATOR) {
        None => {
            map.insert(keypath.to_string(), value);
        }
        Some((head, rest)) => with_child_table(map, head, |child| set_nested(child, rest, value)),
    }
}

/// Run `f` on the mapping stored under `key`.
///
/// A missing or non-mapping value is replaced by the mapping `f` leaves behind.
pub(crate) fn with_child_table<R>(
    map: &mut Map<String, Value>,
    key: &str,
    f: impl FnOnce(&mut Map<String, Value>) -> R,
) -> R {
    let slot = map.entry(key.to_string()).or_insert(Value::Null);
    if let Value::Object(table) = slot {
        return f(table);
    }

    let mut table = Map::new();
    let result = f(&mut table);
    *slot = Value::Object(table);
    result
}
