use crate::error::SetError;
use crate::set::SetMut;
use crate::{OpenAddressingSet, OrderedTreeSet, Trie};

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use proptest_derive::Arbitrary;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

// =============================================================================
// Ordered tree
// =============================================================================

#[derive(Arbitrary, Clone, Debug)]
enum TreeOp {
    #[proptest(weight = 5)]
    Add(#[proptest(strategy = "0i32..64")] i32),
    #[proptest(weight = 3)]
    Remove(#[proptest(strategy = "0i32..64")] i32),
    #[proptest(weight = 2)]
    Contains(#[proptest(strategy = "0i32..64")] i32),
    Take(#[proptest(strategy = "0i32..64")] i32),
}

/// Mutations applied either straight to the tree or through a `[lo, hi)`
/// view of it.
#[derive(Arbitrary, Clone, Debug)]
enum ViewOp {
    TreeAdd(#[proptest(strategy = "0u8..48")] u8),
    TreeRemove(#[proptest(strategy = "0u8..48")] u8),
    #[proptest(weight = 2)]
    ViewAdd(#[proptest(strategy = "0u8..48")] u8),
    #[proptest(weight = 2)]
    ViewRemove(#[proptest(strategy = "0u8..48")] u8),
}

fn view_bounds() -> impl Strategy<Value = (u8, u8)> {
    (0u8..48, 0u8..48).prop_map(|(a, b)| (a.min(b), a.max(b)))
}

fn expected_narrowing(lo: u8, hi: u8, from: u8, to: u8, m: &BTreeSet<u8>) -> Result<Vec<u8>, SetError> {
    let admits = |v: u8| (lo..=hi).contains(&v);
    if !admits(from) || !admits(to) {
        return Err(SetError::BoundsExceeded);
    }
    if from > to {
        return Err(SetError::InvertedBounds);
    }
    Ok(m.range(from..to).copied().collect())
}

// =============================================================================
// Trie
// =============================================================================

#[derive(Clone, Debug)]
enum TrieOp {
    Add(String),
    Remove(String),
    Contains(String),
    Compact,
}

fn word_strategy() -> impl Strategy<Value = String> + Clone {
    "[a-c]{0,5}"
}

fn trie_ops_strategy() -> impl Strategy<Value = Vec<TrieOp>> {
    let word = word_strategy();
    let op = prop_oneof![
        50 => word.clone().prop_map(TrieOp::Add),
        25 => word.clone().prop_map(TrieOp::Remove),
        24 => word.clone().prop_map(TrieOp::Contains),
        1 => Just(TrieOp::Compact),
    ];
    prop::collection::vec(op, 0..=1000)
}

// =============================================================================
// Shared contract
// =============================================================================

/// Every value in `values` is distinct and absent from `set`.
fn check_add_remove_cycle<T, S>(set: &mut S, values: &[T]) -> Result<(), TestCaseError>
where
    T: Clone + fmt::Debug,
    S: SetMut<T>,
{
    let base = set.len();
    for (i, v) in values.iter().enumerate() {
        prop_assert!(!set.contains(v));
        prop_assert_eq!(set.add(v.clone()), Ok(true));
        prop_assert_eq!(set.add(v.clone()), Ok(false));
        prop_assert!(set.contains(v));
        prop_assert_eq!(set.len(), base + i + 1);
    }
    for v in values {
        prop_assert_eq!(set.remove(v), Ok(true));
        prop_assert_eq!(set.remove(v), Ok(false));
        prop_assert!(!set.contains(v));
    }
    prop_assert_eq!(set.len(), base);
    prop_assert_eq!(set.is_empty(), base == 0);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_tree_equivalence(ops in prop::collection::vec(any::<TreeOp>(), 0..=1000)) {
        let mut t = OrderedTreeSet::new();
        let mut m = BTreeSet::new();

        for op in ops {
            match op {
                TreeOp::Add(v) => prop_assert_eq!(t.add(v), m.insert(v)),
                TreeOp::Remove(v) => {
                    let height = t.height();
                    prop_assert_eq!(t.remove(&v), m.remove(&v));
                    prop_assert!(t.height() <= height);
                }
                TreeOp::Contains(v) => prop_assert_eq!(t.contains(&v), m.contains(&v)),
                TreeOp::Take(v) => prop_assert_eq!(t.take(&v), m.take(&v)),
            }

            prop_assert_eq!(t.len(), m.len());
        }

        prop_assert!(t.check_invariant());
        prop_assert_eq!(t.first().ok(), m.first());
        prop_assert_eq!(t.last().ok(), m.last());
        let got: Vec<i32> = t.iter().copied().collect();
        let expected: Vec<i32> = m.iter().copied().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_view_tracks_tree(
        (lo, hi) in view_bounds(),
        ops in prop::collection::vec(any::<ViewOp>(), 0..=300),
    ) {
        let mut t = OrderedTreeSet::new();
        let mut m = BTreeSet::new();

        for op in ops {
            match op {
                ViewOp::TreeAdd(v) => prop_assert_eq!(t.add(v), m.insert(v)),
                ViewOp::TreeRemove(v) => prop_assert_eq!(t.remove(&v), m.remove(&v)),
                ViewOp::ViewAdd(v) => {
                    let got = t.sub_set_mut(lo, hi).unwrap().add(v);
                    if (lo..hi).contains(&v) {
                        prop_assert_eq!(got, Ok(m.insert(v)));
                    } else {
                        prop_assert_eq!(got, Err(SetError::OutOfRange));
                    }
                }
                ViewOp::ViewRemove(v) => {
                    let got = t.sub_set_mut(lo, hi).unwrap().remove(&v);
                    if (lo..hi).contains(&v) {
                        prop_assert_eq!(got, Ok(m.remove(&v)));
                    } else {
                        prop_assert_eq!(got, Err(SetError::OutOfRange));
                    }
                }
            }

            let view = t.sub_set(lo, hi).unwrap();
            let expected: Vec<u8> = m.range(lo..hi).copied().collect();
            prop_assert_eq!(view.len(), expected.len());
            prop_assert_eq!(view.first().ok(), expected.first());
            prop_assert_eq!(view.last().ok(), expected.last());
            prop_assert_eq!(view.iter().copied().collect::<Vec<_>>(), expected);
        }

        prop_assert!(t.check_invariant());
        prop_assert_eq!(t.iter().copied().collect::<Vec<_>>(), m.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn prop_narrowing(
        values in prop::collection::btree_set(0u8..48, 0..40),
        (lo, hi) in view_bounds(),
        from in 0u8..48,
        to in 0u8..48,
    ) {
        let t: OrderedTreeSet<u8> = values.iter().copied().collect();
        let view = t.sub_set(lo, hi).unwrap();

        let got = view.sub_set(from, to).map(|v| v.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(got, expected_narrowing(lo, hi, from, to, &values));

        let head = view.head_set(to).map(|v| v.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(head, expected_narrowing(lo, hi, lo, to, &values));

        let tail = view.tail_set(from).map(|v| v.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(tail, expected_narrowing(lo, hi, from, hi, &values));
    }

    #[test]
    fn prop_range_cursor_removal(
        values in prop::collection::btree_set(0u16..500, 0..200),
        (lo, hi) in (0u16..500, 0u16..500).prop_map(|(a, b)| (a.min(b), a.max(b))),
        modulus in 1u16..5,
    ) {
        let mut t: OrderedTreeSet<u16> = values.iter().copied().collect();
        let mut seen = Vec::new();
        {
            let mut view = t.sub_set_mut(lo, hi).unwrap();
            let mut c = view.cursor();
            while c.has_next() {
                let v = *c.advance().unwrap();
                seen.push(v);
                if v % modulus == 0 {
                    prop_assert_eq!(c.remove(), Ok(v));
                }
            }
            prop_assert_eq!(c.advance().err(), Some(SetError::NoSuchElement));
        }

        prop_assert_eq!(seen, values.range(lo..hi).copied().collect::<Vec<_>>());
        let expected: Vec<u16> = values
            .iter()
            .copied()
            .filter(|v| !(lo..hi).contains(v) || v % modulus != 0)
            .collect();
        prop_assert!(t.check_invariant());
        prop_assert_eq!(t.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn prop_trie_equivalence(ops in trie_ops_strategy()) {
        let mut t = Trie::new();
        let mut m: BTreeSet<String> = BTreeSet::new();

        for op in ops {
            match op {
                TrieOp::Add(s) => prop_assert_eq!(t.add(&s), m.insert(s)),
                TrieOp::Remove(s) => prop_assert_eq!(t.remove(&s), m.remove(&s)),
                TrieOp::Contains(s) => prop_assert_eq!(t.contains(&s), m.contains(&s)),
                TrieOp::Compact => {
                    t.compact();
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        let got: Vec<String> = t.iter().collect();
        let expected: Vec<String> = m.iter().cloned().collect();
        prop_assert_eq!(got, expected);

        // Compacting twice reclaims nothing the second time.
        t.compact();
        prop_assert_eq!(t.compact(), 0);
        prop_assert_eq!(t.iter().collect::<Vec<_>>(), m.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn prop_open_addressing_equivalence(
        ops in prop::collection::vec((0u8..3, 0u32..12), 0..=1000),
    ) {
        // Never more than 12 live values in 16 slots, so the table cannot fill.
        let mut set = OpenAddressingSet::new(4).unwrap();
        let mut m = HashSet::new();

        for (kind, v) in ops {
            match kind {
                0 => prop_assert_eq!(set.add(v), Ok(m.insert(v))),
                1 => prop_assert_eq!(set.remove(&v), m.remove(&v)),
                _ => prop_assert_eq!(set.contains(&v), m.contains(&v)),
            }
            prop_assert_eq!(set.len(), m.len());
        }

        let got: BTreeSet<u32> = set.iter().copied().collect();
        let expected: BTreeSet<u32> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_add_remove_cycle(
        numbers in prop::collection::btree_set(any::<i64>(), 0..32),
        words in prop::collection::btree_set("[a-z]{0,6}", 0..32),
    ) {
        let numbers: Vec<i64> = numbers.into_iter().collect();
        let words: Vec<String> = words.into_iter().collect();

        check_add_remove_cycle(&mut OrderedTreeSet::new(), &numbers)?;
        check_add_remove_cycle(&mut OrderedTreeSet::new(), &words)?;
        check_add_remove_cycle(&mut Trie::new(), &words)?;
        check_add_remove_cycle(&mut OpenAddressingSet::new(6).unwrap(), &numbers)?;
        check_add_remove_cycle(&mut OpenAddressingSet::new(6).unwrap(), &words)?;

        // Through an unbounded view the contract is the tree's own.
        let mut t = OrderedTreeSet::new();
        check_add_remove_cycle(&mut t.view_mut(Default::default()), &numbers)?;
        prop_assert!(t.is_empty());
    }
}

// =============================================================================
// Exhaustive orderings
// =============================================================================

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
fn exhaustive_tree_insert_order() {
    let values = [1, 2, 3, 4, 5, 6];

    for_each_permutation(&values, |perm| {
        let t: OrderedTreeSet<i32> = perm.into_iter().collect();
        assert!(t.check_invariant());
        assert!(t.height() <= values.len());
        assert_eq!(t.iter().copied().collect::<Vec<_>>(), values);
    });
}

#[test]
fn exhaustive_tree_remove_order() {
    let values = [4, 2, 6, 1, 3, 5, 7];
    let base: OrderedTreeSet<i32> = values.iter().copied().collect();
    assert_eq!(base.height(), 3);

    for_each_permutation(&values, |perm| {
        let mut t = base.clone();
        let mut m: BTreeSet<i32> = values.iter().copied().collect();

        for v in perm {
            let height = t.height();
            assert_eq!(t.remove(&v), m.remove(&v));
            assert!(t.check_invariant());
            assert!(t.height() <= height);
            assert_eq!(t.iter().copied().collect::<Vec<_>>(), m.iter().copied().collect::<Vec<_>>());
        }
        assert!(t.is_empty());
        assert_eq!(t.height(), 0);
    });
}

#[test]
fn exhaustive_trie_remove_order() {
    let words = ["a", "ab", "abc", "b", "ba", "c"];
    let base: Trie = words.iter().collect();

    for_each_permutation(&words, |perm| {
        let mut t = base.clone();
        let mut m: BTreeSet<&str> = words.iter().copied().collect();

        for w in perm {
            assert!(t.remove(w));
            m.remove(w);
            assert_eq!(t.iter().collect::<Vec<_>>(), m.iter().copied().collect::<Vec<_>>());
        }
        assert!(t.is_empty());
        t.compact();
        assert_eq!(t.node_count(), 1);
    });
}
