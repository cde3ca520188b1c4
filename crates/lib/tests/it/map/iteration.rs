//! Tests for iterating over maps and views

use crate::helpers::*;

#[test]
fn test_iteration_in_key_order() {
    let map = setup_tree_map();
    assert_eq!(
        collect_keys(map.iter()),
        vec!["/", "/dum", "/tree", "/tree/i", "/tree/sub", "/tree/value"]
    );
}

#[test]
fn test_submap_iteration_is_relative() {
    let map = setup_tree_map();
    let tree = map.submap("tree");
    assert_eq!(collect_keys(tree.iter()), vec!["/", "/i", "/sub", "/value"]);

    let full: Vec<String> = tree.iter().map(|e| e.full_key().to_string()).collect();
    assert_eq!(full, vec!["/tree", "/tree/i", "/tree/sub", "/tree/value"]);
}

#[test]
fn test_iteration_skips_lookalike_siblings() {
    let map = setup_tree_map();
    map.update("tree-x", 0_u8);
    map.update("treehouse", 0_u8);
    map.update("tree0", 0_u8);
    assert_eq!(collect_keys(map.submap("tree").iter()), vec!["/", "/i", "/sub", "/value"]);
}

#[test]
fn test_iter_at() {
    let map = setup_tree_map();
    assert_eq!(collect_keys(map.iter_at("tree/i")), vec!["/"]);
    assert!(map.iter_at("missing").next().is_none());
    assert_eq!(map.iter_at("tree").root().as_str(), "/tree");
}

#[test]
fn test_reverse_iteration() {
    let map = setup_tree_map();
    assert_eq!(
        collect_keys(map.iter().rev()),
        vec!["/tree/value", "/tree/sub", "/tree/i", "/tree", "/dum", "/"]
    );
}

#[test]
fn test_double_ended_iteration_meets_in_middle() {
    let map = setup_tree_map();
    let mut iter = map.iter();
    assert_eq!(iter.next().unwrap().key().as_str(), "/");
    assert_eq!(iter.next_back().unwrap().key().as_str(), "/tree/value");
    assert_eq!(iter.next_back().unwrap().key().as_str(), "/tree/sub");
    assert_eq!(collect_keys(&mut iter), vec!["/dum", "/tree", "/tree/i"]);
    assert!(iter.next().is_none());
    assert!(iter.next_back().is_none());
}

#[test]
fn test_entry_accessors() {
    let map = setup_tree_map();
    let entry = map.iter_at("tree/i").next().unwrap();
    assert!(entry.is::<i32>());
    assert!(!entry.is::<f64>());
    assert_eq!(entry.get::<i32>().unwrap(), 1);
    assert!(entry.get::<f64>().unwrap_err().is_type_error());

    entry.with_mut(|v: &mut i32| *v = 5).unwrap();
    assert_eq!(map.get::<i32>("tree/i").unwrap(), 5);
    assert_eq!(entry.with(|v: &i32| *v * 2).unwrap(), 10);
    assert_eq!(entry.ptr::<i32>().unwrap(), map.at_ptr::<i32>("tree/i").unwrap());
}

#[test]
fn test_entry_outlives_erase() {
    let map = setup_tree_map();
    let entry = map.iter_at("dum").next().unwrap();
    map.erase("dum");
    assert_eq!(entry.get::<i32>().unwrap(), 0);
}

#[test]
fn test_mutation_during_iteration() {
    let map = test_map();
    for key in ["a", "b", "c", "d"] {
        map.update(key, key.to_string());
    }

    let mut iter = map.iter();
    assert_eq!(iter.next().unwrap().key().as_str(), "/a");
    map.erase("b");
    map.update("e", String::from("e"));
    map.update("0", String::from("behind"));

    assert_eq!(collect_keys(iter), vec!["/c", "/d", "/e"]);
}

#[test]
fn test_erase_while_iterating_views() {
    let map = setup_tree_map();
    for entry in map.submap("tree").iter() {
        if entry.is::<i32>() {
            map.erase(entry.full_key());
        }
    }
    assert_eq!(collect_keys(map.submap("tree").iter()), vec!["/", "/sub", "/value"]);
}

#[test]
fn test_borrowed_map_into_iterator() {
    let map = setup_tree_map();
    let mut count = 0;
    for entry in &map {
        assert!(entry.storage().is_some());
        count += 1;
    }
    assert_eq!(count, map.len());
}
