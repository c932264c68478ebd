use std::iter::FusedIterator;

use super::node::{Node, END};
use super::RbTree;

/// In-order iterator over the entries of an [`RbTree`].
///
/// Each step follows parent links to the successor (or predecessor, from the
/// back), so a full traversal costs O(1) amortized per entry.
pub struct Iter<'a, T, C> {
    tree: &'a RbTree<T, C>,
    front: usize,
    // exclusive: the last node handed out from the back, or the sentinel
    back: usize,
    len: usize,
}

impl<'a, T, C> Iter<'a, T, C> {
    pub(super) fn new(tree: &'a RbTree<T, C>) -> Self {
        Iter {
            tree,
            front: tree.leftmost,
            back: END,
            len: tree.len,
        }
    }
}

impl<'a, T, C> Clone for Iter<'a, T, C> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<'a, T, C> Iterator for Iter<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let i = self.front;
        self.front = self.tree.successor(i);
        self.len -= 1;
        Some(self.tree.nodes[i].slot.get())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T, C> DoubleEndedIterator for Iter<'a, T, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        self.back = self.tree.predecessor(self.back);
        self.len -= 1;
        Some(self.tree.nodes[self.back].slot.get())
    }
}

impl<'a, T, C> ExactSizeIterator for Iter<'a, T, C> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, T, C> FusedIterator for Iter<'a, T, C> {}

/// In-order iterator over mutable references to the entries of an
/// [`RbTree`].
///
/// The visiting order is computed up front.  One pass over the arena then
/// splits off a disjoint mutable borrow for each entry, which is put in its
/// place in that order.
pub struct IterMut<'a, T> {
    entries: std::vec::IntoIter<&'a mut T>,
}

impl<'a, T> IterMut<'a, T> {
    pub(super) fn new(nodes: &'a mut [Node<T>], order: Vec<usize>) -> Self {
        // (arena index, rank), walked in arena order
        let mut ranks: Vec<(usize, usize)> = order
            .into_iter()
            .enumerate()
            .map(|(rank, i)| (i, rank))
            .collect();
        ranks.sort_unstable();

        let mut entries = Vec::with_capacity(ranks.len());
        let mut ranks = ranks.into_iter().peekable();
        for (i, node) in nodes.iter_mut().enumerate() {
            let Some(&(next, rank)) = ranks.peek() else {
                break;
            };
            if i == next {
                ranks.next();
                if let Some(v) = node.slot.as_mut() {
                    entries.push((rank, v));
                }
            }
        }
        entries.sort_unstable_by_key(|&(rank, _)| rank);

        IterMut {
            entries: entries
                .into_iter()
                .map(|(_, v)| v)
                .collect::<Vec<_>>()
                .into_iter(),
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<'a, T> ExactSizeIterator for IterMut<'a, T> {}

impl<'a, T> FusedIterator for IterMut<'a, T> {}

/// Owning in-order iterator over the entries of an [`RbTree`].
pub struct IntoIter<T> {
    nodes: Vec<Node<T>>,
    order: std::vec::IntoIter<usize>,
}

impl<T> IntoIter<T> {
    pub(super) fn new(nodes: Vec<Node<T>>, order: Vec<usize>) -> Self {
        IntoIter {
            nodes,
            order: order.into_iter(),
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.order.next()?;
        self.nodes[i].slot.take()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let i = self.order.next_back()?;
        self.nodes[i].slot.take()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}
