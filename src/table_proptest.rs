#![cfg(test)]

// Property tests for Table kept inside the crate so they can check chain
// statistics alongside the public operations.

use crate::error::{InsertError, SetError};
use crate::table::Table;
use hashbrown::HashMap;
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

// Pool-indexed operations: indices shrink to earlier keys, the pool shrinks
// in length, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Add(usize),
    Set(usize),
    Remove(usize),
    Take(usize),
    Get(usize),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<Op>)> {
    (1usize..=8, proptest::collection::vec("[a-z]{0,3}", 1..=12)).prop_flat_map(
        |(initial, pool)| {
            let idx = 0..pool.len();
            let op = prop_oneof![
                3 => idx.clone().prop_map(Op::Add),
                1 => idx.clone().prop_map(Op::Set),
                2 => idx.clone().prop_map(Op::Remove),
                1 => idx.clone().prop_map(Op::Take),
                1 => idx.prop_map(Op::Get),
                1 => Just(Op::Iterate),
            ];
            proptest::collection::vec(op, 1..120)
                .prop_map(move |ops| (initial, pool.clone(), ops))
        },
    )
}

fn is_doubling_of(capacity: usize, initial: usize) -> bool {
    capacity % initial == 0 && (capacity / initial).is_power_of_two()
}

// Property: state-machine equivalence against a HashMap model.
// Invariants exercised across random operation sequences:
// - add rejects empty and duplicate keys and returns the value untouched.
// - set overwrites only existing keys; remove/take on absent keys are no-ops.
// - len matches the model; capacity is initial * 2^k and never below initial.
// - full iteration yields exactly the model's (key, value) pairs.
// - every accepted value is either taken out or destroyed exactly once.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_table_state_machine((initial, pool, ops) in arb_scenario()) {
        let destroyed = Rc::new(RefCell::new(Vec::new()));
        let sink = destroyed.clone();
        let mut sut: Table<u64> = Table::with_cleanup(initial, move |v: u64| sink.borrow_mut().push(v));
        let mut model: HashMap<String, u64> = HashMap::new();
        let mut accepted: Vec<u64> = Vec::new();
        let mut taken: Vec<u64> = Vec::new();
        let mut next_value = 0u64;

        for op in ops {
            match op {
                Op::Add(i) => {
                    let key = &pool[i];
                    let value = next_value;
                    next_value += 1;
                    match sut.add(key, value) {
                        Ok(()) => {
                            prop_assert!(!key.is_empty());
                            prop_assert!(model.insert(key.clone(), value).is_none());
                            accepted.push(value);
                        }
                        Err(InsertError::DuplicateKey(v)) => {
                            prop_assert_eq!(v, value);
                            prop_assert!(model.contains_key(key));
                        }
                        Err(InsertError::EmptyKey(v)) => {
                            prop_assert_eq!(v, value);
                            prop_assert!(key.is_empty());
                        }
                    }
                }
                Op::Set(i) => {
                    let key = &pool[i];
                    let value = next_value;
                    next_value += 1;
                    let capacity = sut.capacity();
                    match sut.set(key, value) {
                        Ok(()) => {
                            prop_assert!(model.insert(key.clone(), value).is_some());
                            accepted.push(value);
                        }
                        Err(SetError::MissingKey(v)) | Err(SetError::EmptyKey(v)) => {
                            prop_assert_eq!(v, value);
                            prop_assert!(!model.contains_key(key));
                        }
                    }
                    prop_assert_eq!(sut.capacity(), capacity, "set never resizes");
                }
                Op::Remove(i) => {
                    let key = &pool[i];
                    let removed = sut.remove(key);
                    prop_assert_eq!(removed, model.remove(key).is_some());
                }
                Op::Take(i) => {
                    let key = &pool[i];
                    let got = sut.take(key);
                    prop_assert_eq!(got, model.remove(key));
                    taken.extend(got);
                }
                Op::Get(i) => {
                    let key = &pool[i];
                    prop_assert_eq!(sut.get(key), model.get(key));
                    prop_assert_eq!(sut.contains_key(key), model.contains_key(key));
                }
                Op::Iterate => {
                    let seen: BTreeSet<(String, u64)> =
                        sut.iter().map(|(k, v)| (k.to_string(), *v)).collect();
                    let expected: BTreeSet<(String, u64)> =
                        model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(seen, expected);
                    prop_assert_eq!(sut.cursor().count(), model.len());
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert!(sut.capacity() >= initial);
            prop_assert!(is_doubling_of(sut.capacity(), initial));
            let stats = sut.chain_stats();
            prop_assert_eq!(stats.len, sut.len());
            prop_assert_eq!(stats.total_collisions, stats.len - stats.occupied_buckets);
        }

        drop(sut);
        let mut accounted: Vec<u64> = destroyed.borrow().clone();
        accounted.extend(taken);
        accounted.sort_unstable();
        accepted.sort_unstable();
        prop_assert_eq!(accounted, accepted);
    }
}

// Property: resizes triggered by a run of inserts then removals never change
// the observable contents, and the capacity returns to the floor.
proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_fill_then_drain(initial in 1usize..=16, n in 0usize..200) {
        let mut t: Table<usize> = Table::new(initial);
        for i in 0..n {
            let key = format!("k{i}");
            prop_assert!(t.add(&key, i).is_ok());
            prop_assert!(t.len() < t.capacity() * 3 / 4 || t.capacity() < 4);
        }
        prop_assert_eq!(t.len(), n);
        let values: BTreeSet<usize> = t.cursor().copied().collect();
        prop_assert_eq!(values, (0..n).collect::<BTreeSet<_>>());

        for i in 0..n {
            let key = format!("k{i}");
            prop_assert!(t.remove(&key));
            for j in (i + 1)..n.min(i + 4) {
                prop_assert_eq!(t.get(&format!("k{j}")), Some(&j));
            }
        }
        prop_assert!(t.is_empty());
        prop_assert_eq!(t.capacity(), initial);
    }
}
