use genmap::{CheckMode, Map};

// ==========================
// CORE TEST FACTORIES
// ==========================

/// Mode under test, taken from GENMAP_CHECK_MODE.
///
/// Supported values:
/// - "checked" or unset: the build default (checked with default features)
/// - "unchecked": skip diagnostic bookkeeping
pub fn test_mode() -> CheckMode {
    CheckMode::from_env()
}

/// Creates an empty root map in the mode under test.
pub fn test_map() -> Map {
    Map::with_mode(test_mode())
}

/// Creates a map with the key layout used by the iteration tests:
/// `/`, `/dum`, `/tree`, `/tree/i`, `/tree/sub`, `/tree/value`.
pub fn setup_tree_map() -> Map {
    let map = test_map();
    map.update("/", String::from("root"));
    map.update("dum", 0_i32);
    map.update("tree", String::from("tree"));
    map.update("tree/i", 1_i32);
    map.update("tree/sub", 2.0_f64);
    map.update("tree/value", String::from("value"));
    map
}

/// Collects the keys an iteration yields, as strings.
pub fn collect_keys(iter: impl Iterator<Item = genmap::Entry>) -> Vec<String> {
    iter.map(|entry| entry.key().to_string()).collect()
}
