//! The red-black tree engine underneath [`RbMap`](crate::RbMap).
//!
//! Nodes live in an arena and refer to each other by index.  Child links are
//! the owning links; every node also records its parent so that in-order
//! stepping needs no auxiliary stack.  Slot 0 of the arena is the sentinel
//! ("end") node: it is always black, never holds an entry, and its left link
//! is the root.  Treating the sentinel as an ordinary node means the root has
//! a parent like every other node, which removes the root special cases from
//! rotation and splicing.
//!
//! Positions are exposed as [`Cursor`]s: small copyable handles that name a
//! node and the tree that owns it.  A cursor does not borrow the tree, so it
//! can be handed back to [`RbTree::erase`].  Every operation taking a cursor
//! validates it first; cursors from another tree, cursors to erased entries,
//! and stepping past either end are reported as
//! [`Error::InvalidIterator`](crate::Error::InvalidIterator).

use std::cmp::Ordering::{self, *};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use compare::Compare;

use crate::{Ascending, Error, Result};

mod iter;
mod node;

pub use iter::{IntoIter, Iter, IterMut};
use node::{Color, Dir, Node, END};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of one tree instance.  Clones and cleared trees get fresh ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct TreeId(u64);

impl TreeId {
    fn fresh() -> Self {
        TreeId(NEXT_TREE_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// A bidirectional position in an [`RbTree`].
///
/// Cursors compare equal exactly when they denote the same node of the same
/// tree; the entries stored there play no part.  The end cursor of a tree
/// denotes its sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cursor {
    tree: TreeId,
    index: usize,
    gen: u64,
}

/// An ordered collection of unique entries kept in a red-black tree.
///
/// Entries are ordered by the comparator `C`.  Two entries are equivalent when
/// neither precedes the other, and the tree never holds two equivalent
/// entries.
///
/// The behavior of the tree is unspecified if an entry's ordering relative to
/// the others changes while it is stored, e.g. through
/// [`get_mut`](RbTree::get_mut).
pub struct RbTree<T, C> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    leftmost: usize,
    len: usize,
    id: TreeId,
    cmp: C,
}

impl<T, C> RbTree<T, C> {
    /// Creates an empty tree ordered by `cmp`.
    pub fn with_cmp(cmp: C) -> Self {
        Self::with_capacity_and_cmp(0, cmp)
    }

    /// Creates an empty tree ordered by `cmp` with room for `capacity`
    /// entries before the arena reallocates.
    pub fn with_capacity_and_cmp(capacity: usize, cmp: C) -> Self {
        let mut nodes = Vec::with_capacity(capacity + 1);
        nodes.push(Node::sentinel());
        RbTree {
            nodes,
            free: Vec::new(),
            leftmost: END,
            len: 0,
            id: TreeId::fresh(),
            cmp,
        }
    }

    /// Returns the tree's comparator.
    pub fn cmp(&self) -> &C {
        &self.cmp
    }

    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Tests whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every entry and resets the tree.
    ///
    /// The tree takes a new identity, so every cursor obtained before the
    /// call (including the old end cursor) is rejected afterwards.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[END] = Node::sentinel();
        self.free.clear();
        self.leftmost = END;
        self.len = 0;
        self.id = TreeId::fresh();
    }

    /// Cursor to the least entry, or the end cursor if the tree is empty.
    pub fn begin(&self) -> Cursor {
        self.cursor(self.leftmost)
    }

    /// The past-the-end cursor.
    pub fn end(&self) -> Cursor {
        self.cursor(END)
    }

    /// The least entry.
    pub fn first(&self) -> Option<&T> {
        self.entry(self.leftmost)
    }

    /// The greatest entry.
    pub fn last(&self) -> Option<&T> {
        self.root().and_then(|r| self.entry(self.max(r)))
    }

    /// Borrows the entry at `pos`.
    ///
    /// Returns `None` for the end cursor and for cursors this tree rejects.
    pub fn get(&self, pos: Cursor) -> Option<&T> {
        self.resolve(pos).and_then(|i| self.entry(i))
    }

    /// Mutably borrows the entry at `pos`.
    ///
    /// The caller must not change how the entry orders against the others.
    pub fn get_mut(&mut self, pos: Cursor) -> Option<&mut T> {
        match self.resolve(pos) {
            Some(i) if i != END => Some(self.nodes[i].slot.get_mut()),
            _ => None,
        }
    }

    /// Steps `pos` to the following entry (or to the end).
    ///
    /// Fails with [`Error::InvalidIterator`] at the end position.
    pub fn next(&self, pos: Cursor) -> Result<Cursor> {
        match self.resolve(pos) {
            Some(i) if i != END => Ok(self.cursor(self.successor(i))),
            _ => {
                log::debug!("rejected forward step from {:?}", pos);
                Err(Error::InvalidIterator)
            }
        }
    }

    /// Steps `pos` to the preceding entry.  The predecessor of the end
    /// position is the greatest entry.
    ///
    /// Fails with [`Error::InvalidIterator`] at the least entry (which is
    /// also the end position of an empty tree).
    pub fn prev(&self, pos: Cursor) -> Result<Cursor> {
        match self.resolve(pos) {
            Some(i) if i != self.leftmost => {
                Ok(self.cursor(self.predecessor(i)))
            }
            _ => {
                log::debug!("rejected backward step from {:?}", pos);
                Err(Error::InvalidIterator)
            }
        }
    }

    /// Removes the entry at `pos` and returns it.
    ///
    /// Fails with [`Error::InvalidIterator`], leaving the tree untouched, if
    /// `pos` is the end position, belongs to another tree, or refers to an
    /// entry that was already erased.
    pub fn erase(&mut self, pos: Cursor) -> Result<T> {
        match self.resolve(pos) {
            Some(i) if i != END => Ok(self.unlink(i)),
            _ => {
                log::debug!("rejected erase through {:?}", pos);
                Err(Error::InvalidIterator)
            }
        }
    }

    /// Finds the entry for which `f` returns `Equal`.
    ///
    /// `f` is called with stored entries and must answer how the sought key
    /// orders relative to them, consistently with the tree's comparator.
    /// Returns the end cursor when nothing matches.
    pub fn find_with<F>(&self, f: F) -> Cursor
    where
        F: FnMut(&T) -> Ordering,
    {
        match self.search(f) {
            Some(i) => self.cursor(i),
            None => self.end(),
        }
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> Iter<'_, T, C> {
        Iter::new(self)
    }

    /// Iterates over mutable references to the entries in order.
    ///
    /// The caller must not change how the entries order against each other.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let order = self.in_order();
        IterMut::new(&mut self.nodes, order)
    }

    fn cursor(&self, index: usize) -> Cursor {
        Cursor {
            tree: self.id,
            index,
            gen: self.nodes[index].gen,
        }
    }

    // Maps a cursor to a live arena index (possibly END), or None if the
    // cursor is foreign or stale.
    fn resolve(&self, pos: Cursor) -> Option<usize> {
        if pos.tree != self.id {
            return None;
        }
        let n = self.nodes.get(pos.index)?;
        let live = pos.index == END || n.slot.is_occupied();
        (n.gen == pos.gen && live).then_some(pos.index)
    }

    fn entry(&self, i: usize) -> Option<&T> {
        (i != END).then(|| self.nodes[i].slot.get())
    }

    pub(crate) fn entry_mut(&mut self, i: usize) -> &mut T {
        debug_assert_ne!(i, END, "the sentinel holds no entry");
        self.nodes[i].slot.get_mut()
    }

    pub(crate) fn index_of(&self, pos: Cursor) -> Option<usize> {
        self.resolve(pos).filter(|&i| i != END)
    }

    fn root(&self) -> Option<usize> {
        self.nodes[END].left
    }

    fn parent(&self, i: usize) -> usize {
        self.nodes[i].parent
    }

    fn color(&self, i: usize) -> Color {
        self.nodes[i].color
    }

    fn set_color(&mut self, i: usize, color: Color) {
        debug_assert!(i != END || color == Color::Black, "sentinel turned red");
        self.nodes[i].color = color;
    }

    fn is_red(&self, i: usize) -> bool {
        self.color(i) == Color::Red
    }

    fn is_black_or_absent(&self, i: Option<usize>) -> bool {
        i.map_or(true, |i| !self.is_red(i))
    }

    fn is_left_child(&self, i: usize) -> bool {
        self.nodes[self.parent(i)].left == Some(i)
    }

    fn side(&self, i: usize) -> Dir {
        if self.is_left_child(i) {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    fn sibling(&self, i: usize) -> Option<usize> {
        self.nodes[self.parent(i)].child(self.side(i).flip())
    }

    // Puts `new_child` where `i` hangs from its parent.  `i` keeps its own
    // parent link; the caller relinks it.
    fn replace_in_parent(&mut self, i: usize, new_child: Option<usize>) {
        let side = self.side(i);
        let p = self.parent(i);
        *self.nodes[p].child_mut(side) = new_child;
        if let Some(c) = new_child {
            self.nodes[c].parent = p;
        }
    }

    fn min(&self, mut i: usize) -> usize {
        while let Some(l) = self.nodes[i].left {
            i = l;
        }
        i
    }

    fn max(&self, mut i: usize) -> usize {
        while let Some(r) = self.nodes[i].right {
            i = r;
        }
        i
    }

    // The successor of the greatest node is the sentinel, since the root is
    // the sentinel's left child.
    fn successor(&self, mut i: usize) -> usize {
        if let Some(r) = self.nodes[i].right {
            return self.min(r);
        }
        while !self.is_left_child(i) {
            i = self.parent(i);
        }
        self.parent(i)
    }

    // Must not be called on the least node.
    fn predecessor(&self, mut i: usize) -> usize {
        if let Some(l) = self.nodes[i].left {
            return self.max(l);
        }
        while self.is_left_child(i) {
            i = self.parent(i);
        }
        self.parent(i)
    }

    fn search<F>(&self, mut f: F) -> Option<usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut curr = self.root();
        while let Some(i) = curr {
            let n = &self.nodes[i];
            match f(n.slot.get()) {
                Less => curr = n.left,
                Equal => return Some(i),
                Greater => curr = n.right,
            }
        }
        None
    }

    fn in_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.len);
        let mut i = self.leftmost;
        while i != END {
            order.push(i);
            i = self.successor(i);
        }
        order
    }

    fn alloc(&mut self, value: T, parent: usize) -> usize {
        match self.free.pop() {
            // release() already unlinked the cell and bumped its generation
            Some(i) => {
                let n = &mut self.nodes[i];
                n.parent = parent;
                n.color = Color::Red;
                n.slot.set(value);
                i
            }
            None => {
                self.nodes.push(Node::leaf(value, parent, 0));
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, i: usize) -> T {
        let n = &mut self.nodes[i];
        n.left = None;
        n.right = None;
        n.gen = n.gen.wrapping_add(1);
        self.free.push(i);
        match n.slot.take() {
            Some(v) => v,
            None => panic!("released an empty node"),
        }
    }

    // Rotates the subtree at `x` toward `dir`:
    //    x(a, y(b, c))   =>   y(x(a, b), c)        (dir == Left)
    // and the mirror image for Right.  y takes x's place under x's parent,
    // which may be the sentinel.
    fn rotate(&mut self, x: usize, dir: Dir) {
        let y = match self.nodes[x].far(dir) {
            Some(y) => y,
            None => panic!("rotation without a far child"),
        };

        // move b from y to x
        let b = self.nodes[y].near(dir);
        *self.nodes[x].child_mut(dir.flip()) = b;
        if let Some(b) = b {
            self.nodes[b].parent = x;
        }

        // install y where x was, then hang x under y
        self.replace_in_parent(x, Some(y));
        *self.nodes[y].child_mut(dir) = Some(x);
        self.nodes[x].parent = y;
    }

    fn fix_after_insert(&mut self, mut n: usize) {
        loop {
            let p = self.parent(n);
            // n is the root, or its parent is black
            if p == END || !self.is_red(p) {
                break;
            }

            // a red parent is never the root, so the grandparent is a node
            let g = self.parent(p);
            let side = self.side(p);
            let uncle = self.nodes[g].child(side.flip());

            if let Some(u) = uncle.filter(|&u| self.is_red(u)) {
                log::trace!("insert fixup: recolor at {}", g);
                self.set_color(p, Color::Black);
                self.set_color(u, Color::Black);
                let g_color = if self.parent(g) == END {
                    Color::Black
                } else {
                    Color::Red
                };
                self.set_color(g, g_color);
                n = g;
                continue;
            }

            if self.side(n) != side {
                log::trace!("insert fixup: straighten zig-zag at {}", p);
                n = p;
                self.rotate(n, side);
            }

            log::trace!("insert fixup: rotate at {}", g);
            let p = self.parent(n);
            self.set_color(p, Color::Black);
            self.set_color(g, Color::Red);
            self.rotate(g, side.flip());
            break;
        }

        if let Some(r) = self.root() {
            self.set_color(r, Color::Black);
        }
    }

    // Detaches node z, rebalances, and frees its arena cell.
    fn unlink(&mut self, z: usize) -> T {
        if z == self.leftmost {
            self.leftmost = self.successor(z);
        }

        // y is the node leaving its structural position; it has at most one
        // child.  With two children, z's successor takes z's place.
        let y = match (self.nodes[z].left, self.nodes[z].right) {
            (Some(_), Some(r)) => self.min(r),
            _ => z,
        };
        let x = self.nodes[y].left.or(self.nodes[y].right);

        // becomes the sibling of the vacated slot
        let sibling = if self.parent(y) == END {
            None
        } else {
            self.sibling(y)
        };

        self.replace_in_parent(y, x);
        let removed_black = !self.is_red(y);

        if y != z {
            self.replace_in_parent(z, Some(y));
            let (zl, zr) = (self.nodes[z].left, self.nodes[z].right);
            self.nodes[y].left = zl;
            if let Some(l) = zl {
                self.nodes[l].parent = y;
            }
            self.nodes[y].right = zr;
            if let Some(r) = zr {
                self.nodes[r].parent = y;
            }
            self.nodes[y].color = self.nodes[z].color;
        }

        if removed_black {
            match (x, sibling) {
                // a lone child of a black node is red
                (Some(x), _) => self.set_color(x, Color::Black),
                (None, Some(s)) => self.fix_after_erase(s),
                (None, None) => (),
            }
        }

        if let Some(r) = self.root() {
            self.set_color(r, Color::Black);
        }

        self.len -= 1;
        self.release(z)
    }

    // `s` is the sibling of a slot one black node short.
    fn fix_after_erase(&mut self, mut s: usize) {
        loop {
            let short = self.side(s).flip();

            if self.is_red(s) {
                log::trace!("erase fixup: rotate red sibling {} up", s);
                let p = self.parent(s);
                self.set_color(s, Color::Black);
                self.set_color(p, Color::Red);
                self.rotate(p, short);
                s = match self.nodes[p].far(short) {
                    Some(s) => s,
                    None => panic!("black-height violated under {}", p),
                };
            }

            let near = self.nodes[s].near(short);
            let far = self.nodes[s].far(short);

            if self.is_black_or_absent(near) && self.is_black_or_absent(far) {
                self.set_color(s, Color::Red);
                let p = self.parent(s);
                if self.parent(p) == END || self.is_red(p) {
                    self.set_color(p, Color::Black);
                    return;
                }
                log::trace!("erase fixup: push deficiency up to {}", p);
                s = match self.sibling(p) {
                    Some(s) => s,
                    None => panic!("black-height violated beside {}", p),
                };
                continue;
            }

            if self.is_black_or_absent(far) {
                log::trace!("erase fixup: turn near child of {} outward", s);
                if let Some(near) = near {
                    self.set_color(near, Color::Black);
                }
                self.set_color(s, Color::Red);
                self.rotate(s, short.flip());
                s = self.parent(s);
            }

            log::trace!("erase fixup: rotate at {}", self.parent(s));
            let p = self.parent(s);
            self.set_color(s, self.color(p));
            self.set_color(p, Color::Black);
            if let Some(far) = self.nodes[s].far(short) {
                self.set_color(far, Color::Black);
            }
            self.rotate(p, short);
            return;
        }
    }

    fn clone_subtree(
        &self,
        src: usize,
        parent: usize,
        out: &mut Vec<Node<T>>,
    ) -> usize
    where
        T: Clone,
    {
        let n = &self.nodes[src];
        let i = out.len();
        out.push(Node {
            left: None,
            right: None,
            parent,
            color: n.color,
            gen: 0,
            slot: n.slot.clone(),
        });
        if let Some(l) = n.left {
            let l = self.clone_subtree(l, i, out);
            out[i].left = Some(l);
        }
        if let Some(r) = n.right {
            let r = self.clone_subtree(r, i, out);
            out[i].right = Some(r);
        }
        i
    }
}

impl<T, C> RbTree<T, C>
where
    C: Compare<T>,
{
    /// Inserts `value` unless an equivalent entry is already present.
    ///
    /// Returns a cursor to the entry now in the tree with that key and
    /// whether `value` was inserted.  When an equivalent entry exists it is
    /// left untouched and `value` is dropped.
    pub fn insert(&mut self, value: T) -> (Cursor, bool) {
        let (i, inserted) = self.insert_index(value);
        (self.cursor(i), inserted)
    }

    pub(crate) fn insert_index(&mut self, value: T) -> (usize, bool) {
        let mut parent = END;
        let mut dir = Dir::Left;
        let mut curr = self.root();
        while let Some(i) = curr {
            let n = &self.nodes[i];
            match self.cmp.compare(&value, n.slot.get()) {
                Less => dir = Dir::Left,
                Equal => return (i, false),
                Greater => dir = Dir::Right,
            }
            parent = i;
            curr = n.child(dir);
        }

        let n = self.alloc(value, parent);
        *self.nodes[parent].child_mut(dir) = Some(n);
        self.len += 1;

        // If the old minimum just gained a left child, the new node is the
        // minimum.  This also covers the first insertion, where the old
        // "minimum" is the sentinel and the new node becomes the root.
        if self.nodes[self.leftmost].left.is_some() {
            self.leftmost = n;
        }

        self.fix_after_insert(n);
        (n, true)
    }

    /// Finds the entry equivalent to `key`, or returns the end cursor.
    ///
    /// `key` may be of any type the comparator can order against stored
    /// entries.
    pub fn find<Q: ?Sized>(&self, key: &Q) -> Cursor
    where
        C: Compare<Q, T>,
    {
        self.find_with(|e| self.cmp.compare(key, e))
    }

    /// Tests whether an entry equivalent to `key` is present.
    pub fn contains<Q: ?Sized>(&self, key: &Q) -> bool
    where
        C: Compare<Q, T>,
    {
        self.search(|e| self.cmp.compare(key, e)).is_some()
    }

    /// Removes and returns the entry equivalent to `key`, if any.
    pub fn remove<Q: ?Sized>(&mut self, key: &Q) -> Option<T>
    where
        C: Compare<Q, T>,
    {
        let i = self.search(|e| self.cmp.compare(key, e))?;
        Some(self.unlink(i))
    }

    /// Verifies every structural invariant of the tree.
    ///
    /// Returns the number of entries reachable from the root, or a
    /// description of the first violation found.
    pub fn check(&self) -> std::result::Result<usize, String> {
        let sentinel = &self.nodes[END];
        if sentinel.color != Color::Black {
            return Err("sentinel is red".to_string());
        }
        if sentinel.slot.is_occupied() || sentinel.right.is_some() {
            return Err("sentinel holds more than the root".to_string());
        }

        let (count, _, _) = match self.root() {
            None => (0, 0, None),
            Some(r) => {
                if self.is_red(r) {
                    return Err("root is red".to_string());
                }
                if self.parent(r) != END {
                    let msg = "root is not linked to the sentinel";
                    return Err(msg.to_string());
                }
                self.chk(r, None)?
            }
        };

        if count != self.len {
            return Err(format!(
                "len is {} but {} nodes are linked",
                self.len, count
            ));
        }

        let min = self.root().map_or(END, |r| self.min(r));
        if min != self.leftmost {
            return Err(format!(
                "leftmost is {} but the minimum is {}",
                self.leftmost, min
            ));
        }

        if count + self.free.len() + 1 != self.nodes.len() {
            return Err("arena cells leaked".to_string());
        }

        Ok(count)
    }

    // Returns (node count, black height, greatest entry) of the subtree.
    fn chk<'a>(
        &'a self,
        i: usize,
        greatest: Option<&'a T>,
    ) -> std::result::Result<(usize, usize, Option<&'a T>), String> {
        let n = &self.nodes[i];
        let me = n.slot.get();

        for c in [n.left, n.right].into_iter().flatten() {
            if self.parent(c) != i {
                return Err(format!("{} has a stale parent link", c));
            }
            if n.color == Color::Red && self.is_red(c) {
                return Err(format!("red {} has red child {}", i, c));
            }
        }

        let (lf_len, lf_bh, lf_greatest) = match n.left {
            None => (0, 0, greatest),
            Some(l) => self.chk(l, greatest)?,
        };
        if let Some(g) = lf_greatest {
            if self.cmp.compare(g, me) != Less {
                return Err(format!("order violation at {}", i));
            }
        }

        let (rt_len, rt_bh, rt_greatest) = match n.right {
            None => (0, 0, Some(me)),
            Some(r) => self.chk(r, Some(me))?,
        };
        if lf_bh != rt_bh {
            return Err(format!("uneven black heights under {}", i));
        }

        let bh = lf_bh + (n.color == Color::Black) as usize;
        Ok((lf_len + rt_len + 1, bh, rt_greatest))
    }
}

impl<T: Ord> RbTree<T, Ascending<T>> {
    /// Creates an empty tree in ascending order of its entries.
    pub fn new() -> Self {
        Self::with_cmp(Ascending::new())
    }
}

impl<T: Ord> Default for RbTree<T, Ascending<T>> {
    fn default() -> Self {
        Self::new()
    }
}

// A clone is a structural copy: same shape, same colors, fresh identity.  The
// copy's arena is compacted, so no free cells carry over.
impl<T: Clone, C: Clone> Clone for RbTree<T, C> {
    fn clone(&self) -> Self {
        log::trace!("cloning a tree of {} entries", self.len);
        let mut nodes = Vec::with_capacity(self.len + 1);
        nodes.push(Node::sentinel());
        if let Some(r) = self.root() {
            let r = self.clone_subtree(r, END, &mut nodes);
            nodes[END].left = Some(r);
        }

        let mut leftmost = END;
        while let Some(l) = nodes[leftmost].left {
            leftmost = l;
        }

        RbTree {
            nodes,
            free: Vec::new(),
            leftmost,
            len: self.len,
            id: TreeId::fresh(),
            cmp: self.cmp.clone(),
        }
    }
}

impl<T: Debug, C> Debug for RbTree<T, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Compare<T>> Extend<T> for RbTree<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.insert(v);
        }
    }
}

impl<T: Ord> FromIterator<T> for RbTree<T, Ascending<T>> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, T, C> IntoIterator for &'a RbTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, C> IntoIterator for &'a mut RbTree<T, C> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, C> IntoIterator for RbTree<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let order = self.in_order();
        IntoIter::new(self.nodes, order)
    }
}

#[cfg(test)]
mod test {
    extern crate quickcheck;
    use super::*;
    use compare::natural;
    use quickcheck::quickcheck;

    type Tree = RbTree<i32, Ascending<i32>>;

    fn tree_of(vs: &[i32]) -> Tree {
        let mut t = Tree::new();
        for &v in vs {
            t.insert(v);
            t.check().unwrap();
        }
        t
    }

    fn keys(t: &Tree) -> Vec<i32> {
        t.iter().copied().collect()
    }

    fn root_key(t: &Tree) -> i32 {
        *t.nodes[t.root().unwrap()].slot.get()
    }

    #[test]
    fn empty_tree() {
        let t = Tree::new();
        assert_eq!(t.check(), Ok(0));
        assert!(t.is_empty());
        assert_eq!(t.begin(), t.end());
        assert_eq!(t.first(), None);
        assert_eq!(t.last(), None);
        assert_eq!(t.get(t.end()), None);
    }

    #[test]
    fn ascending_inserts() {
        let t = tree_of(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(t.check(), Ok(7));
        assert_eq!(keys(&t), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(t.get(t.begin()), Some(&1));
        assert_eq!(t.last(), Some(&7));
    }

    #[test]
    fn erase_root() {
        let mut t = tree_of(&[1, 2, 3, 4, 5, 6, 7]);
        let r = root_key(&t);
        let pos = t.find(&r);
        assert_eq!(t.erase(pos), Ok(r));
        assert_eq!(t.check(), Ok(6));
        let expected: Vec<i32> = (1..=7).filter(|&k| k != r).collect();
        assert_eq!(keys(&t), expected);
        assert_eq!(t.find(&r), t.end());
    }

    #[test]
    fn erase_end_is_rejected() {
        let mut t = tree_of(&[3, 1, 2]);
        let end = t.end();
        assert_eq!(t.erase(end), Err(Error::InvalidIterator));
        assert_eq!(t.check(), Ok(3));
        assert_eq!(keys(&t), vec![1, 2, 3]);
    }

    #[test]
    fn erase_foreign_cursor_is_rejected() {
        let mut t = tree_of(&[1, 2, 3]);
        let other = tree_of(&[1, 2, 3]);
        let pos = other.find(&2);
        assert_eq!(t.erase(pos), Err(Error::InvalidIterator));
        assert_eq!(t.len(), 3);
        assert_eq!(t.get(pos), None);
    }

    #[test]
    fn stale_cursor_is_rejected() {
        let mut t = tree_of(&[1, 2, 3]);
        let pos = t.find(&2);
        assert_eq!(t.erase(pos), Ok(2));
        assert_eq!(t.erase(pos), Err(Error::InvalidIterator));

        // the freed cell is recycled by the next insert
        let (pos2, inserted) = t.insert(10);
        assert!(inserted);
        assert_ne!(pos, pos2);
        assert_eq!(t.get(pos), None);
        assert_eq!(t.get(pos2), Some(&10));
        assert_eq!(t.check(), Ok(3));
    }

    #[test]
    fn clear_resets_identity() {
        let mut t = tree_of(&[1, 2, 3]);
        let old_end = t.end();
        let pos = t.find(&1);
        t.clear();
        assert_eq!(t.check(), Ok(0));
        assert_eq!(t.begin(), t.end());
        assert_ne!(t.end(), old_end);
        t.insert(1);
        assert_eq!(t.get(pos), None);
        assert_eq!(t.erase(pos), Err(Error::InvalidIterator));
    }

    #[test]
    fn duplicate_insert_keeps_original() {
        let mut t: RbTree<(u8, &str), _> =
            RbTree::with_cmp(|a: &(u8, &str), b: &(u8, &str)| a.0.cmp(&b.0));
        let (pos, inserted) = t.insert((4, "first"));
        assert!(inserted);
        let (dup, inserted) = t.insert((4, "second"));
        assert!(!inserted);
        assert_eq!(pos, dup);
        assert_eq!(t.get(dup), Some(&(4, "first")));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn heterogeneous_find() {
        let mut t = RbTree::with_cmp(natural::<String>());
        t.extend(["b", "d", "a"].map(String::from));
        let by_str = |q: &str, e: &String| q.cmp(e.as_str());
        let d = t.find_with(|e| by_str("d", e));
        assert_eq!(t.get(d), Some(&"d".to_string()));
        assert_eq!(t.find_with(|e| by_str("c", e)), t.end());
    }

    #[test]
    fn borrowed_probe_find() {
        let mut t: RbTree<String, _> = RbTree::new();
        t.extend(["pear", "fig", "kiwi"].map(String::from));
        let pos = t.find("fig");
        assert_eq!(t.get(pos).map(String::as_str), Some("fig"));
        assert!(t.contains("kiwi"));
        assert_eq!(t.find("plum"), t.end());
        assert_eq!(t.remove("pear"), Some("pear".to_string()));
        assert_eq!(t.check(), Ok(2));
    }

    #[test]
    fn generation_outlives_u32() {
        let mut t = tree_of(&[1]);
        let i = t.nodes[END].left.unwrap();
        t.nodes[i].gen = u32::MAX as u64;
        let old = t.find(&1);
        assert_eq!(t.erase(old), Ok(1));

        // the recycled cell must not wrap back to a generation seen before
        let (new, _) = t.insert(2);
        assert_eq!(t.nodes[i].gen, u32::MAX as u64 + 1);
        assert_ne!(old, new);
        assert_eq!(t.get(old), None);
        assert_eq!(t.erase(old), Err(Error::InvalidIterator));
        assert_eq!(t.get(new), Some(&2));
    }

    #[test]
    fn iter_mut_skips_free_cells() {
        let mut t: RbTree<(i32, i32), _> =
            RbTree::with_cmp(|a: &(i32, i32), b: &(i32, i32)| a.0.cmp(&b.0));
        t.extend((0..100).map(|k| (k, 0)));
        for k in 0..90 {
            let pos = t.find_with(|e| (3 * k % 100).cmp(&e.0));
            t.erase(pos).unwrap();
        }
        assert_eq!(t.free.len(), 90);

        let mut it = t.iter_mut();
        assert_eq!(it.len(), 10);
        it.next_back().unwrap().1 = -1;
        for e in it {
            e.1 = e.0;
        }
        let expected: Vec<_> = (0..100)
            .filter(|k| !(0..90).any(|j| 3 * j % 100 == *k))
            .map(|k| (k, k))
            .collect();
        let (last, init) = expected.split_last().unwrap();
        let got: Vec<_> = t.iter().copied().collect();
        assert_eq!(&got[..init.len()], init);
        assert_eq!(got[init.len()], (last.0, -1));
        assert_eq!(t.check(), Ok(10));
    }

    #[test]
    fn step_both_ways() {
        let t = tree_of(&[5, 3, 8, 1, 4]);
        let mut pos = t.begin();
        let mut seen = Vec::new();
        while pos != t.end() {
            seen.push(*t.get(pos).unwrap());
            pos = t.next(pos).unwrap();
        }
        assert_eq!(seen, vec![1, 3, 4, 5, 8]);
        assert_eq!(t.next(t.end()), Err(Error::InvalidIterator));

        let mut back = Vec::new();
        let mut pos = t.end();
        while pos != t.begin() {
            pos = t.prev(pos).unwrap();
            back.push(*t.get(pos).unwrap());
        }
        assert_eq!(back, vec![8, 5, 4, 3, 1]);
        assert_eq!(t.prev(t.begin()), Err(Error::InvalidIterator));
    }

    #[test]
    fn prev_of_empty_end_fails() {
        let t = Tree::new();
        assert_eq!(t.prev(t.end()), Err(Error::InvalidIterator));
        assert_eq!(t.next(t.end()), Err(Error::InvalidIterator));
    }

    #[test]
    fn clone_is_independent() {
        let t = tree_of(&(0..50).collect::<Vec<_>>());
        let mut c = t.clone();
        assert_eq!(c.check(), Ok(50));
        assert_eq!(c.get(t.begin()), None);
        for k in (0..50).step_by(5) {
            assert!(c.remove(&k).is_some());
            c.check().unwrap();
        }
        assert_eq!(c.len(), 40);
        assert_eq!(t.check(), Ok(50));
        assert_eq!(keys(&t), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn iter_mut_and_into_iter() {
        let mut t: RbTree<(i32, i32), _> =
            RbTree::with_cmp(|a: &(i32, i32), b: &(i32, i32)| a.0.cmp(&b.0));
        t.extend((0..10).rev().map(|k| (k, 0)));
        for e in t.iter_mut() {
            e.1 = e.0 * 2;
        }
        let v: Vec<_> = t.into_iter().collect();
        assert_eq!(v, (0..10).map(|k| (k, 2 * k)).collect::<Vec<_>>());
    }

    #[test]
    fn iter_double_ended() {
        let t = tree_of(&[4, 2, 6, 1, 3, 5, 7]);
        let mut it = t.iter();
        assert_eq!(it.len(), 7);
        assert_eq!(it.next(), Some(&1));
        assert_eq!(it.next_back(), Some(&7));
        assert_eq!(it.next_back(), Some(&6));
        assert_eq!(it.len(), 4);
        assert_eq!(it.copied().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn rm_each_test() {
        // build in order to encourage skewing, then try deleting each entry
        let t: Tree = (0..32).collect();
        for k in 0..32 {
            let mut t2 = t.clone();
            assert_eq!(t2.remove(&k), Some(k));
            assert_eq!(t2.check(), Ok(31));
        }

        let t: Tree = (0..32).rev().collect();
        for k in 0..32 {
            let mut t2 = t.clone();
            assert_eq!(t2.erase(t2.find(&k)), Ok(k));
            assert_eq!(t2.check(), Ok(31));
        }
    }

    #[test]
    fn erase_fixup_regr1() {
        // deleting black leaves with red siblings
        let mut t = tree_of(&[10, 5, 20, 15, 25, 30, 35, 40]);
        for k in [5, 10, 15] {
            t.remove(&k);
            t.check().unwrap();
        }
        assert_eq!(keys(&t), vec![20, 25, 30, 35, 40]);
    }

    #[test]
    fn erase_leftmost_advances_begin() {
        let mut t = tree_of(&[2, 1, 3]);
        assert_eq!(t.erase(t.begin()), Ok(1));
        assert_eq!(t.get(t.begin()), Some(&2));
        assert_eq!(t.erase(t.begin()), Ok(2));
        assert_eq!(t.erase(t.begin()), Ok(3));
        assert_eq!(t.begin(), t.end());
        assert_eq!(t.check(), Ok(0));
    }

    fn bal_test(vs: Vec<i16>) {
        let mut t = RbTree::with_cmp(natural::<i16>());
        let mut model = std::collections::BTreeSet::new();
        for v in vs {
            assert_eq!(t.insert(v).1, model.insert(v));
            assert_eq!(t.check(), Ok(model.len()));
        }
        assert!(t.iter().eq(model.iter()));
    }

    fn rm_test(vs: Vec<(bool, u8)>) {
        let mut t = RbTree::with_cmp(natural::<u8>());
        let mut model = std::collections::BTreeSet::new();
        for (ins, v) in vs {
            let v = v % 64;
            if ins {
                assert_eq!(t.insert(v).1, model.insert(v));
            } else {
                assert_eq!(t.remove(&v), model.take(&v));
            }
            assert_eq!(t.check(), Ok(model.len()));
            assert_eq!(t.first(), model.first());
        }
        assert!(t.iter().eq(model.iter()));
        assert!(t.iter().rev().eq(model.iter().rev()));
    }

    fn step_inverse_test(vs: Vec<u8>) {
        let t: RbTree<u8, Ascending<u8>> = vs.into_iter().collect();
        let mut pos = t.begin();
        while pos != t.end() {
            let next = t.next(pos).unwrap();
            assert_eq!(t.prev(next), Ok(pos));
            if pos != t.begin() {
                assert_eq!(t.next(t.prev(pos).unwrap()), Ok(pos));
            }
            pos = next;
        }
    }

    #[test]
    fn rm_test_regr1() {
        rm_test(vec![(true, 3), (true, 1), (true, 2), (false, 3), (false, 1)]);
    }

    quickcheck! {
        fn qc_bal_test(vs: Vec<i16>) -> () {
            bal_test(vs);
        }

        fn qc_rm_test(vs: Vec<(bool, u8)>) -> () {
            rm_test(vs);
        }

        fn qc_step_inverse(vs: Vec<u8>) -> () {
            step_inverse_test(vs);
        }
    }
}
