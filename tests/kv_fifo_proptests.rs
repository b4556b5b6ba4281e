// KvFifo property tests.
//
// Property 1: copy independence.
//  - Model: one VecDeque<(K, V)> per handle.
//  - Operations: push/pop/pop_key/move_to_back/front_mut writes on either
//    handle, plus re-cloning one handle from the other.
//  - Invariant: after every step each handle's content equals its own
//    model; nothing one handle does is observed through the other.
//
// Property 2: key iteration.
//  - Invariant: keys() is strictly ascending, distinct, and equals the set
//    of keys with count(k) > 0; reversed iteration mirrors it.
//
// Property 3: counts.
//  - Invariant: len() == pushes - successful pops, and count(k) equals the
//    number of surviving pushes of k.
use kv_fifo::{KvFifo, KvFifoError};
use proptest::prelude::*;
use std::collections::VecDeque;

#[derive(Clone, Debug)]
enum Op {
    Push(bool, u8, i32),
    Pop(bool),
    PopKey(bool, u8),
    MoveToBack(bool, u8),
    WriteFront(bool, i32),
    Reclone(bool),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any::<bool>(), 0u8..4, any::<i32>()).prop_map(|(s, k, v)| Op::Push(s, k, v)),
        1 => any::<bool>().prop_map(Op::Pop),
        1 => (any::<bool>(), 0u8..4).prop_map(|(s, k)| Op::PopKey(s, k)),
        1 => (any::<bool>(), 0u8..4).prop_map(|(s, k)| Op::MoveToBack(s, k)),
        1 => (any::<bool>(), any::<i32>()).prop_map(|(s, v)| Op::WriteFront(s, v)),
        1 => any::<bool>().prop_map(Op::Reclone),
    ]
}

fn snapshot(q: &KvFifo<u8, i32>) -> Vec<(u8, i32)> {
    q.iter().map(|(k, v)| (*k, *v)).collect()
}

fn apply(q: &mut KvFifo<u8, i32>, model: &mut VecDeque<(u8, i32)>, op: &Op) {
    match *op {
        Op::Push(_, k, v) => {
            q.push(k, v).unwrap();
            model.push_back((k, v));
        }
        Op::Pop(_) => {
            let expected = model.pop_front().map(|(_, v)| v);
            assert_eq!(q.pop().ok(), expected);
        }
        Op::PopKey(_, k) => {
            let expected = model
                .iter()
                .position(|(mk, _)| *mk == k)
                .and_then(|at| model.remove(at))
                .map(|(_, v)| v);
            assert_eq!(q.pop_key(&k).ok(), expected);
        }
        Op::MoveToBack(_, k) => {
            let present = model.iter().any(|(mk, _)| *mk == k);
            let (moved, kept): (Vec<_>, Vec<_>) = model.drain(..).partition(|(mk, _)| *mk == k);
            model.extend(kept);
            model.extend(moved);
            let res = q.move_to_back(&k);
            if present {
                assert_eq!(res, Ok(()));
            } else {
                assert_eq!(res, Err(KvFifoError::KeyNotFound));
            }
        }
        Op::WriteFront(_, v) => match (q.front_mut(), model.front_mut()) {
            (Ok((_, slot)), Some((_, mslot))) => {
                *slot = v;
                *mslot = v;
            }
            (Err(KvFifoError::EmptyCollection), None) => {}
            (got, want) => panic!("front_mut mismatch: {:?} vs {:?}", got, want),
        },
        Op::Reclone(_) => unreachable!("handled by caller"),
    }
}

fn side(op: &Op) -> bool {
    match *op {
        Op::Push(s, ..)
        | Op::Pop(s)
        | Op::PopKey(s, _)
        | Op::MoveToBack(s, _)
        | Op::WriteFront(s, _)
        | Op::Reclone(s) => s,
    }
}

// Property 1: copy independence across interleaved mutations and re-clones.
proptest! {
    #[test]
    fn prop_clones_never_observe_each_other(ops in proptest::collection::vec(arb_op(), 1..80)) {
        let mut a: KvFifo<u8, i32> = KvFifo::new();
        let mut b = a.clone();
        let mut ma: VecDeque<(u8, i32)> = VecDeque::new();
        let mut mb: VecDeque<(u8, i32)> = VecDeque::new();

        for op in &ops {
            let left = side(op);
            if let Op::Reclone(_) = op {
                // Replace one handle with a fresh clone of the other.
                if left {
                    a = b.clone();
                    ma = mb.clone();
                } else {
                    b = a.clone();
                    mb = ma.clone();
                }
            } else if left {
                apply(&mut a, &mut ma, op);
            } else {
                apply(&mut b, &mut mb, op);
            }

            let sa = snapshot(&a);
            let sb = snapshot(&b);
            prop_assert_eq!(sa, ma.iter().copied().collect::<Vec<_>>());
            prop_assert_eq!(sb, mb.iter().copied().collect::<Vec<_>>());
        }
    }
}

// Property 2 and 3: key iteration and counts follow the surviving pushes.
proptest! {
    #[test]
    fn prop_keys_and_counts(ops in proptest::collection::vec((0u8..3, 0u8..16), 1..120)) {
        let mut q: KvFifo<u8, u32> = KvFifo::new();
        let mut pushes = 0usize;
        let mut pops = 0usize;

        for (i, (op, k)) in ops.into_iter().enumerate() {
            match op {
                0 | 1 => {
                    q.push(k, i as u32).unwrap();
                    pushes += 1;
                }
                _ => {
                    if q.pop_key(&k).is_ok() {
                        pops += 1;
                    }
                }
            }
            prop_assert_eq!(q.len(), pushes - pops);

            let keys: Vec<u8> = q.keys().copied().collect();
            prop_assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys not strictly ascending");
            let live: Vec<u8> = (0u8..16).filter(|k| q.count(k) > 0).collect();
            prop_assert_eq!(&keys, &live);
            let mut rev: Vec<u8> = q.keys().rev().copied().collect();
            rev.reverse();
            prop_assert_eq!(&rev, &keys);

            let total: usize = keys.iter().map(|k| q.count(k)).sum();
            prop_assert_eq!(total, q.len());
        }
    }
}
