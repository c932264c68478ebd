use proptest::prelude::*;
use std::ops::Range;

#[allow(dead_code)]
pub(super) fn assert_eq_iters<I: Iterator, J: Iterator<Item = I::Item>>(
    mut i: I,
    mut j: J,
) where
    I::Item: std::fmt::Debug + Eq, // same inferred for J::Item
{
    loop {
        match (i.next(), j.next()) {
            (None, None) => return,
            (a, b) => assert_eq!(a, b),
        }
    }
}

pub(super) type U16Pairs = Vec<(u16, u16)>;

#[allow(dead_code)]
pub(super) fn u16_pairs(
    keys: Range<u16>,
    len: Range<usize>,
) -> impl Strategy<Value = U16Pairs> {
    prop::collection::vec((keys, 0u16..1024u16), len)
}

#[allow(dead_code)]
pub(super) fn small_int_pairs() -> impl Strategy<Value = U16Pairs> {
    u16_pairs(0..1024, 0..512)
}

#[allow(dead_code)]
pub(super) fn string_u16_pairs() -> impl Strategy<Value = Vec<(String, u16)>> {
    prop::collection::vec(("[a-z]{0,2}", 0u16..1024u16), 0..512)
}

/// Interleaved inserts (`true`) and removals (`false`) over a small key
/// space, so removals often hit.
#[allow(dead_code)]
pub(super) fn small_ops() -> impl Strategy<Value = Vec<(bool, u16)>> {
    prop::collection::vec((any::<bool>(), 0u16..64), 0..512)
}
