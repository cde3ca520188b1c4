//! Lifetime tracking integration tests

use genmap::{BorrowId, CheckMode, Error, Map, Tracked};

#[test]
fn test_release_without_borrows() {
    let owner = Tracked::with_mode(String::from("solver"), CheckMode::Checked);
    {
        let _a = owner.borrow();
        let _b = owner.borrow();
        assert_eq!(owner.borrow_count(), 2);
    }
    assert_eq!(owner.borrow_count(), 0);
    owner.release().unwrap();
}

#[test]
fn test_release_while_borrowed_is_still_in_use() {
    let owner = Tracked::with_mode(1_u32, CheckMode::Checked);
    let ptr = owner.borrow();

    let err: Error = owner.release().unwrap_err().into();
    assert!(err.is_still_in_use());
    assert!(err.is_lifetime_error());
    assert_eq!(err.module(), "lifetime");

    // The value is gone, the borrow observes it instead of dangling.
    assert!(ptr.get().unwrap_err().is_invalid_pointer());
}

#[test]
fn test_release_while_borrowed_in_unchecked_mode() {
    let owner = Tracked::with_mode(1_u32, CheckMode::Unchecked);
    let _ptr = owner.borrow();
    assert!(owner.release().is_ok());
}

#[test]
fn test_map_entries_count_as_borrows() {
    let owner = Tracked::with_mode(vec![0.0_f64; 4], CheckMode::Checked);
    let map = Map::with_mode(CheckMode::Checked);
    map.update_borrowed("field/u", &owner);
    map.update_borrowed("field/alias", &owner);
    assert_eq!(owner.borrow_count(), 2);

    // Copies share cells, and each share is a borrow of its own.
    let copy = map.clone();
    assert_eq!(owner.borrow_count(), 4);
    drop(copy);
    assert_eq!(owner.borrow_count(), 2);

    map.erase_recursive("field");
    assert_eq!(owner.borrow_count(), 0);
    owner.release().unwrap();
}

#[test]
fn test_manual_registration_blocks_release() {
    let owner = Tracked::with_mode((), CheckMode::Checked);
    let id = BorrowId::next();
    owner.register_borrow(id);
    assert_eq!(owner.borrow_count(), 1);
    owner.unregister_borrow(id);
    owner.release().unwrap();
}

#[test]
fn test_drop_with_borrows_does_not_panic() {
    let owner = Tracked::with_mode(5_u8, CheckMode::Checked);
    let ptr = owner.borrow();
    drop(owner);
    assert!(!ptr.is_valid());
}
