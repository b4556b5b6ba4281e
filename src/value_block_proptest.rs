#![cfg(test)]

// Property tests for ValueBlock kept inside the crate so they do not
// require feature gates to access internal modules.

use crate::error::KvFifoError;
use crate::value_block::ValueBlock;
use proptest::prelude::*;
use std::collections::{BTreeSet, VecDeque};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Push(usize, i32),
    Pop,
    PopKey(usize),
    MoveToBack(usize),
    First(usize),
    Last(usize),
    Mutate(usize, i32),
    Keys,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,3}", 1..=6).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Push(i, v)),
            1 => Just(OpI::Pop),
            1 => idx.clone().prop_map(OpI::PopKey),
            1 => idx.clone().prop_map(OpI::MoveToBack),
            1 => idx.clone().prop_map(OpI::First),
            1 => idx.clone().prop_map(OpI::Last),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Keys),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: State-machine equivalence against a VecDeque<(K, V)> model.
// Invariants exercised across random operation sequences:
// - `push` appends at the back; `pop` removes the oldest entry.
// - `pop_key` removes the oldest entry for the key; absent keys fail with
//   KeyNotFound and change nothing.
// - `move_to_back` is a stable partition: the key's entries move last,
//   everything keeps its relative order.
// - `first`/`last` resolve to the oldest/newest entry for the key.
// - `keys` yields the model's distinct keys in ascending order.
// - `len`/`count` parity with the model and structural consistency after
//   every step.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ValueBlock<String, i32> = ValueBlock::new();
        let mut model: VecDeque<(String, i32)> = VecDeque::new();

        for op in ops {
            match op {
                OpI::Push(i, v) => {
                    let k = pool[i].clone();
                    prop_assert_eq!(sut.push(k.clone(), v), Ok(()));
                    model.push_back((k, v));
                }
                OpI::Pop => {
                    match model.pop_front() {
                        Some((_, v)) => {
                            prop_assert_eq!(sut.pop_front(), Ok(v));
                        }
                        None => {
                            prop_assert_eq!(sut.pop_front(), Err(KvFifoError::EmptyCollection));
                        }
                    }
                }
                OpI::PopKey(i) => {
                    let k = &pool[i];
                    match model.iter().position(|(mk, _)| mk == k) {
                        Some(at) => {
                            let (_, v) = model.remove(at).expect("position in range");
                            prop_assert_eq!(sut.pop_key(k), Ok(v));
                        }
                        None => {
                            prop_assert_eq!(sut.pop_key(k), Err(KvFifoError::KeyNotFound));
                        }
                    }
                }
                OpI::MoveToBack(i) => {
                    let k = &pool[i];
                    if model.iter().any(|(mk, _)| mk == k) {
                        let (moved, kept): (Vec<_>, Vec<_>) =
                            model.drain(..).partition(|(mk, _)| mk == k);
                        model.extend(kept);
                        model.extend(moved);
                        prop_assert_eq!(sut.move_to_back(k), Ok(()));
                    } else {
                        prop_assert_eq!(sut.move_to_back(k), Err(KvFifoError::KeyNotFound));
                    }
                }
                OpI::First(i) => {
                    let k = &pool[i];
                    let expected = model.iter().find(|(mk, _)| mk == k);
                    let got = sut.first(k).ok().and_then(|p| sut.get(p));
                    prop_assert_eq!(got, expected.map(|(mk, v)| (mk, v)));
                }
                OpI::Last(i) => {
                    let k = &pool[i];
                    let expected = model.iter().rev().find(|(mk, _)| mk == k);
                    let got = sut.last(k).ok().and_then(|p| sut.get(p));
                    prop_assert_eq!(got, expected.map(|(mk, v)| (mk, v)));
                }
                OpI::Mutate(i, d) => {
                    let k = &pool[i];
                    if let Some((_, mv)) = model.iter_mut().find(|(mk, _)| mk == k) {
                        *mv = mv.wrapping_add(d);
                        let p = sut.first(k).expect("key present in model");
                        let (_, v) = sut.get_mut(p).expect("live position");
                        *v = v.wrapping_add(d);
                    } else {
                        prop_assert!(sut.first(k).is_err());
                    }
                }
                OpI::Keys => {
                    let expected: BTreeSet<&String> = model.iter().map(|(k, _)| k).collect();
                    let got: Vec<&String> = sut.keys().map(|k| &**k).collect();
                    prop_assert_eq!(got, expected.into_iter().collect::<Vec<_>>());
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            for k in &pool {
                prop_assert_eq!(sut.count(k), model.iter().filter(|(mk, _)| mk == k).count());
            }
            let seen: Vec<(&String, &i32)> = sut.iter().collect();
            let expected: Vec<(&String, &i32)> = model.iter().map(|(k, v)| (k, v)).collect();
            prop_assert_eq!(seen, expected);
            sut.assert_consistent();
        }
    }
}
