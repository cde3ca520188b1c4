//! Ownership wrapper integration tests

use std::sync::{Arc, RwLock};

use genmap::{CheckMode, Pointer, Tracked};

#[test]
fn test_shared_pointer_converts_without_copy() {
    let handle = Arc::new(RwLock::new(String::from("mesh")));
    let ptr = Pointer::from_shared(Arc::clone(&handle));
    assert!(ptr.is_shared_ptr());

    let back = ptr.into_shared().unwrap();
    assert!(Arc::ptr_eq(&back, &handle));
}

#[test]
fn test_borrowed_promotion_disabled_in_checked_mode() {
    let owner = Tracked::with_mode(vec![1_u8, 2, 3], CheckMode::Checked);
    let ptr = owner.borrow();
    let err = ptr.into_shared().unwrap_err();
    assert!(err.is_disabled());
    assert!(err.type_name().contains("Vec<u8>"));
}

#[test]
fn test_borrowed_promotion_copies_in_unchecked_mode() {
    let owner = Tracked::with_mode(vec![1_u8, 2, 3], CheckMode::Unchecked);
    let copy = owner.borrow().into_shared().unwrap();

    copy.write().unwrap().push(4);
    assert_eq!(owner.read().len(), 3);
    assert_eq!(copy.read().unwrap().len(), 4);
}

#[test]
fn test_explicit_copy_always_allowed() {
    let owner = Tracked::with_mode(7_i32, CheckMode::Checked);
    let ptr = owner.borrow();
    let copy = ptr.deep_copy().unwrap();
    assert_eq!(*copy.read().unwrap(), 7);
    assert_ne!(Arc::as_ptr(&copy).cast::<()>(), ptr.addr());
}

#[test]
fn test_downgrade_keeps_address() {
    let owned = Pointer::new(1.5_f64);
    let borrowed = owned.downgrade();
    assert!(!borrowed.is_shared_ptr());
    assert_eq!(owned, borrowed);

    let again = borrowed.downgrade();
    assert_eq!(again, owned);
}

#[test]
fn test_equality_is_by_address() {
    let a = Pointer::new(1_u32);
    let b = Pointer::new(1_u32);
    assert_ne!(a, b);
    assert_eq!(a, a.clone());

    let owner = Tracked::new(1_u32);
    assert_eq!(owner.borrow(), owner.borrow());
    assert_ne!(owner.borrow(), a);
}

#[test]
fn test_mutation_visible_through_all_pointers() {
    let owner = Tracked::with_mode(0_u64, CheckMode::Checked);
    let first = owner.borrow();
    let second = first.clone();

    first.with_mut(|v| *v += 5).unwrap();
    second.set(second.get().unwrap() * 2).unwrap();
    assert_eq!(*owner.read(), 10);
}

#[test]
fn test_empty_pointer_fails_on_access() {
    let ptr: Pointer<String> = Pointer::default();
    let err = ptr.with(|s| s.len()).unwrap_err();
    assert!(err.is_invalid_pointer());
    assert!(ptr.downgrade().is_null());
}

#[test]
fn test_borrowed_pointer_invalid_after_owner_dropped() {
    let owner = Tracked::with_mode(3_i16, CheckMode::Unchecked);
    let ptr = owner.borrow();
    assert!(ptr.is_valid());
    drop(owner);
    assert!(!ptr.is_valid());
    assert!(ptr.get().unwrap_err().is_invalid_pointer());
}
