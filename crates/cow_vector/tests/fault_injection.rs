//! The S1–S6 scenarios replayed through every possible injected-fault
//! countdown, checking that the live-element set is always restored (no
//! leaks, no double-frees) regardless of where construction fails.

use cow_vector::{CowVec, Error, TryCopy};
use testkit::{faulty_run, Counted, CountedError, NoNewInstancesGuard};

type E = Error<CountedError>;

fn counted(value: i64) -> Result<Counted, E> {
    Counted::try_new(value).map_err(Error::ElementConstruction)
}

fn s1_body() -> Result<(), E> {
    let guard = NoNewInstancesGuard::new();
    let result = (|| -> Result<(), E> {
        let mut c: CowVec<Counted> = CowVec::new();
        for i in 0..20i64 {
            c.push_back(counted((42 + i) % 13)?)?;
        }
        assert_eq!(c.len(), 20);
        for i in 0..20usize {
            assert_eq!(c[i].value(), (42 + i as i64) % 13);
        }
        Ok(())
    })();
    guard.expect_no_instances();
    result
}

fn s2_body() -> Result<(), E> {
    let guard = NoNewInstancesGuard::new();
    let result = (|| -> Result<(), E> {
        let mut c: CowVec<Counted> = CowVec::new();
        for (pos, v) in [(0usize, 15i64), (1, 42), (1, 16), (2, 23), (0, 4), (1, 8)] {
            c.insert(pos, counted(v)?)?;
        }
        let expected = [4i64, 8, 15, 16, 23, 42];
        assert_eq!(c.len(), expected.len());
        for (i, exp) in expected.iter().enumerate() {
            assert_eq!(c[i].value(), *exp);
        }
        Ok(())
    })();
    guard.expect_no_instances();
    result
}

fn s3_body() -> Result<(), E> {
    let guard = NoNewInstancesGuard::new();
    let result = (|| -> Result<(), E> {
        let mut items = Vec::new();
        for v in [4i64, 8, 15, 16, 23, 42] {
            items.push(counted(v)?);
        }
        let mut c = CowVec::try_from_iter(items)?;
        let len = c.len();
        c.erase_range(2, len - 1)?;
        let expected = [4i64, 8, 42];
        assert_eq!(c.len(), expected.len());
        for (i, exp) in expected.iter().enumerate() {
            assert_eq!(c[i].value(), *exp);
        }
        Ok(())
    })();
    guard.expect_no_instances();
    result
}

fn s4_body() -> Result<(), E> {
    let guard = NoNewInstancesGuard::new();
    let result = (|| -> Result<(), E> {
        let mut items = Vec::new();
        for v in [1i64, 2, 3] {
            items.push(counted(v)?);
        }
        let c = CowVec::try_from_iter(items)?;
        let mut d = c.clone();
        let slot = d.get_mut(2)?.expect("index 2 in bounds");
        *slot = counted(10)?;
        assert_eq!(c[2].value(), 3);
        assert_eq!(d[2].value(), 10);
        assert_eq!(c.len(), 3);
        assert_eq!(d.len(), 3);
        let four = counted(4)?;
        d.push_back(four)?;
        assert_eq!(c.len(), 3);
        assert_eq!(d.len(), 4);
        Ok(())
    })();
    guard.expect_no_instances();
    result
}

fn s5_body() -> Result<(), E> {
    let guard = NoNewInstancesGuard::new();
    let result = (|| -> Result<(), E> {
        let mut items = Vec::new();
        for v in [1i64, 2, 3] {
            items.push(counted(v)?);
        }
        let mut c = CowVec::try_from_iter(items)?;
        let snapshot = c.clone();
        let other = c.clone();
        c.assign_from(&other)?;
        assert_eq!(c.len(), snapshot.len());
        for i in 0..c.len() {
            assert_eq!(c[i].value(), snapshot[i].value());
        }
        Ok(())
    })();
    guard.expect_no_instances();
    result
}

fn s6_body() -> Result<(), E> {
    let guard = NoNewInstancesGuard::new();
    let result = (|| -> Result<(), E> {
        let mut items = Vec::new();
        for v in [0i64, 1] {
            items.push(counted(v)?);
        }
        let mut c = CowVec::try_from_iter(items)?;
        for _ in 0..20 {
            let len = c.len();
            let value = c[len - 2].try_copy().map_err(Error::ElementConstruction)?;
            c.push_back(value)?;
        }
        for i in 0..22usize {
            assert_eq!(c[i].value(), (i % 2) as i64);
        }
        Ok(())
    })();
    guard.expect_no_instances();
    result
}

#[test]
fn s1_push_back_doubling_under_fault_injection() {
    faulty_run(s1_body);
}

#[test]
fn s2_insert_cascade_under_fault_injection() {
    faulty_run(s2_body);
}

#[test]
fn s3_middle_range_erase_under_fault_injection() {
    faulty_run(s3_body);
}

#[test]
fn s4_cow_independence_under_fault_injection() {
    faulty_run(s4_body);
}

#[test]
fn s5_self_assign_is_noop_under_fault_injection() {
    faulty_run(s5_body);
}

#[test]
fn s6_push_back_of_own_element_under_fault_injection() {
    faulty_run(s6_body);
}
