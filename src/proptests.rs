use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

/// Small key space so that duplicates, transfers and fusions all show up.
#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "0u8..48")] u8, u32),
    #[proptest(weight = 3)]
    Remove(#[proptest(strategy = "0u8..48")] u8),
    #[proptest(weight = 2)]
    Get(#[proptest(strategy = "0u8..48")] u8),
}

/// Multiset oracle: every element ever inserted under a key and not yet removed.
type Oracle = BTreeMap<u8, Vec<u32>>;

fn apply(t: &mut TwoFourTree<u8, u32>, m: &mut Oracle, op: Op) -> std::result::Result<(), TestCaseError> {
    match op {
        Op::Insert(key, value) => {
            t.insert(key, value);
            m.entry(key).or_default().push(value);
        }
        Op::Remove(key) => match t.remove(&key) {
            Ok(value) => {
                let values = m.get_mut(&key);
                prop_assert!(values.is_some(), "removed absent key {}", key);
                let values = values.unwrap();
                let pos = values.iter().position(|&v| v == value);
                prop_assert!(pos.is_some(), "removed unknown element {} for {}", value, key);
                values.swap_remove(pos.unwrap());
                if values.is_empty() {
                    m.remove(&key);
                }
            }
            Err(e) => {
                prop_assert_eq!(e, Error::ElementNotFound);
                prop_assert!(!m.contains_key(&key));
            }
        },
        Op::Get(key) => match t.get(&key) {
            Some(v) => prop_assert!(m.get(&key).is_some_and(|vs| vs.contains(v))),
            None => prop_assert!(!m.contains_key(&key)),
        },
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_multiset_equivalence(ops in prop::collection::vec(any::<Op>(), 0..=1500)) {
        let mut t: TwoFourTree<u8, u32> = TwoFourTree::new();
        let mut m = Oracle::new();

        for op in ops {
            apply(&mut t, &mut m, op)?;
            prop_assert_eq!(t.len(), m.values().map(Vec::len).sum::<usize>());
            prop_assert_eq!(t.validate(), Ok(()));
        }

        let keys: Vec<u8> = t.keys().copied().collect();
        let expected: Vec<u8> = m
            .iter()
            .flat_map(|(k, vs)| std::iter::repeat(*k).take(vs.len()))
            .collect();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn prop_insert_then_find(keys in prop::collection::vec(any::<u16>(), 1..=400)) {
        let mut t: TwoFourTree<u16, usize> = TwoFourTree::new();
        for (i, &k) in keys.iter().enumerate() {
            t.insert(k, i);
            prop_assert!(t.get(&k).is_some());
        }
        for &k in &keys {
            let v = t.get(&k).copied();
            prop_assert!(v.is_some_and(|i| keys[i] == k));
        }
        prop_assert_eq!(t.validate(), Ok(()));
    }

    #[test]
    fn prop_duplicates_drain_exactly(key in any::<u16>(), n in 1usize..=300) {
        let mut t: TwoFourTree<u16, usize> = TwoFourTree::new();
        for i in 0..n {
            t.insert(key, i);
        }
        for _ in 0..n {
            prop_assert!(t.remove(&key).is_ok());
            prop_assert_eq!(t.validate(), Ok(()));
        }
        prop_assert_eq!(t.remove(&key), Err(Error::ElementNotFound));
        prop_assert!(t.is_empty());
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u32> = vec![1, 2, 3, 4, 5, 6, 7];

    for_each_permutation(&keys, |perm| {
        let mut t: TwoFourTree<u32, u32> = TwoFourTree::new();
        for k in perm {
            t.insert(k, k * 10);
            assert_eq!(t.validate(), Ok(()));
        }
        let got: Vec<(u32, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u32, u32)> = keys.iter().map(|&k| (k, k * 10)).collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    // Includes a duplicate so removal order over equal keys is covered too.
    let keys: Vec<u32> = vec![1, 2, 3, 3, 4, 5, 6];

    // Insert in a fixed order, then remove in all permutations.
    let base_tree: TwoFourTree<u32, u32> = keys.iter().map(|&k| (k, k)).collect();
    assert_eq!(base_tree.validate(), Ok(()));

    for_each_permutation(&keys, |perm| {
        let mut t = base_tree.clone();
        for k in perm {
            assert_eq!(t.remove(&k), Ok(k));
            assert_eq!(t.validate(), Ok(()));
        }
        assert_eq!(t.len(), 0);
        assert!(t.root.is_none());
    });
}
