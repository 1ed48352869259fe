//! End-to-end scenarios against a plain, never-failing element type.

use cow_vector::CowVec;

#[test]
fn s1_push_back_doubling() {
    let mut c: CowVec<i32> = CowVec::new();
    for i in 0..20i32 {
        c.push_back((42 + i) % 13).unwrap();
    }
    assert_eq!(c.len(), 20);
    for i in 0..20usize {
        assert_eq!(c[i], (42 + i as i32) % 13);
    }
}

#[test]
fn s2_insert_cascade() {
    let mut c: CowVec<i32> = CowVec::new();
    c.insert(0, 15).unwrap();
    c.insert(1, 42).unwrap();
    c.insert(1, 16).unwrap();
    c.insert(2, 23).unwrap();
    c.insert(0, 4).unwrap();
    c.insert(1, 8).unwrap();
    assert_eq!(c.as_slice(), [4, 8, 15, 16, 23, 42]);
}

#[test]
fn s3_middle_range_erase() {
    let mut c = CowVec::try_from_iter([4, 8, 15, 16, 23, 42]).unwrap();
    let len = c.len();
    c.erase_range(2, len - 1).unwrap();
    assert_eq!(c.as_slice(), [4, 8, 42]);
}

#[test]
fn s4_cow_independence() {
    let c = CowVec::try_from_iter([1, 2, 3]).unwrap();
    let mut d = c.clone();
    *d.get_mut(2).unwrap().unwrap() = 10;
    assert_eq!(c[2], 3);
    assert_eq!(d[2], 10);
    assert_eq!(c.len(), 3);
    assert_eq!(d.len(), 3);
    d.push_back(4).unwrap();
    assert_eq!(c.len(), 3);
    assert_eq!(d.len(), 4);
}

#[test]
fn s5_self_assign_is_noop() {
    let mut c = CowVec::try_from_iter([1, 2, 3]).unwrap();
    let snapshot = c.clone();
    let other = c.clone();
    c.assign_from(&other).unwrap();
    assert_eq!(c, snapshot);
}

#[test]
fn s6_push_back_of_own_element() {
    let mut c = CowVec::try_from_iter([0, 1]).unwrap();
    for _ in 0..20 {
        let len = c.len();
        let value = c[len - 2];
        c.push_back(value).unwrap();
    }
    for i in 0..22usize {
        assert_eq!(c[i], (i % 2) as i32);
    }
}

#[test]
fn self_swap_is_documented_noop() {
    let mut c: CowVec<i32> = CowVec::try_from_iter([1, 2, 3]).unwrap();
    let ptr: *mut CowVec<i32> = &mut c;
    // SAFETY: exercises the documented self-swap no-op, which the borrow
    // checker makes unreachable for two distinct `&mut` bindings.
    unsafe {
        (*ptr).swap(&mut *ptr).unwrap();
    }
    assert_eq!(c.as_slice(), [1, 2, 3]);
}
