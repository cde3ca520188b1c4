//! Tests for checked and unchecked behavior

use genmap::{CheckMode, Map, Tracked};

#[test]
fn test_views_and_copies_inherit_mode() {
    for mode in [CheckMode::Checked, CheckMode::Unchecked] {
        let map = Map::with_mode(mode);
        assert_eq!(map.submap("a").mode(), mode);
        assert_eq!(map.clone().mode(), mode);
        assert_eq!(map.iter_at("a").map(|e| e.key().len()).count(), 0);
    }
}

#[test]
fn test_type_names_only_recorded_when_checked() {
    let checked = Map::with_mode(CheckMode::Checked);
    let unchecked = Map::with_mode(CheckMode::Unchecked);
    for map in [&checked, &unchecked] {
        map.update("v", vec![1_u8]);
    }

    assert!(checked.type_name("v").unwrap().contains("Vec<u8>"));
    assert_eq!(unchecked.type_name("v").unwrap(), "<unchecked>");
    assert_eq!(unchecked.to_string(), "/v: <unchecked>\n");
}

#[test]
fn test_type_identity_checked_in_both_modes() {
    for mode in [CheckMode::Checked, CheckMode::Unchecked] {
        let map = Map::with_mode(mode);
        map.update("n", 1_i32);
        assert!(map.get::<f64>("n").unwrap_err().is_type_error());
    }
}

#[test]
fn test_borrowed_entry_promotion_per_mode() {
    let checked_owner = Tracked::with_mode(String::from("a"), CheckMode::Checked);
    let checked = Map::with_mode(CheckMode::Checked);
    checked.update_borrowed("s", &checked_owner);
    let err = checked.at_ptr::<String>("s").unwrap().into_shared().unwrap_err();
    assert!(err.is_disabled());

    let unchecked_owner = Tracked::with_mode(String::from("b"), CheckMode::Unchecked);
    let unchecked = Map::with_mode(CheckMode::Unchecked);
    unchecked.update_borrowed("s", &unchecked_owner);
    let copy = unchecked.at_ptr::<String>("s").unwrap().into_shared().unwrap();
    copy.write().unwrap().push('!');
    assert_eq!(*unchecked_owner.read(), "b");
}

#[test]
fn test_borrow_tracking_per_mode() {
    let checked_owner = Tracked::with_mode(0_i32, CheckMode::Checked);
    let unchecked_owner = Tracked::with_mode(0_i32, CheckMode::Unchecked);
    let map = Map::with_mode(CheckMode::Checked);
    map.update_borrowed("c", &checked_owner);
    map.update_borrowed("u", &unchecked_owner);

    assert_eq!(checked_owner.borrow_count(), 1);
    assert_eq!(unchecked_owner.borrow_count(), 0);
    assert!(checked_owner.release().unwrap_err().is_still_in_use());
    assert!(unchecked_owner.release().is_ok());
    assert!(map.get::<i32>("c").unwrap_err().is_invalid_pointer());
}

#[test]
fn test_parse_check_mode() {
    assert_eq!("checked".parse::<CheckMode>().unwrap(), CheckMode::Checked);
    assert_eq!("Unchecked".parse::<CheckMode>().unwrap(), CheckMode::Unchecked);
    assert!("sometimes".parse::<CheckMode>().is_err());
    assert_eq!(CheckMode::Unchecked.to_string(), "unchecked");
}

#[test]
fn test_borrowed_entry_follows_map_mode() {
    let unchecked_owner = Tracked::with_mode(1_i32, CheckMode::Unchecked);
    let checked = Map::with_mode(CheckMode::Checked);
    checked.update_borrowed("b", &unchecked_owner);
    assert_eq!(checked.type_name("b").unwrap(), "i32");
    let err = checked.at_ptr::<i32>("b").unwrap().into_shared().unwrap_err();
    assert!(err.is_disabled());

    let checked_owner = Tracked::with_mode(2_i32, CheckMode::Checked);
    let unchecked = Map::with_mode(CheckMode::Unchecked);
    unchecked.update_borrowed("b", &checked_owner);
    assert_eq!(unchecked.type_name("b").unwrap(), "<unchecked>");
    // Borrow registration belongs to the owner.
    assert_eq!(checked_owner.borrow_count(), 1);
}
