//! Arena vertices of the red-black tree and the storage cell they carry.

/// Index of the sentinel ("end") node.  The sentinel is allocated with the
/// arena and never freed; its left link is the root of the tree.
pub(super) const END: usize = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Color {
    Red,
    Black,
}

/// A side of a node.  Rotations are written once in terms of the `near` and
/// `far` sides of a direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Dir {
    Left,
    Right,
}

impl Dir {
    pub(super) fn flip(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// An optionally occupied cell holding one entry.
///
/// Reading an empty slot is a programming error and panics.  Cloning a slot
/// clones the entry it holds, never aliases it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Slot<T>(Option<T>);

impl<T> Slot<T> {
    /// Creates an unoccupied slot.
    pub(super) fn empty() -> Self {
        Slot(None)
    }

    /// Creates a slot holding `value`.
    pub(super) fn new(value: T) -> Self {
        Slot(Some(value))
    }

    /// Stores `value`, dropping whatever the slot held before.
    pub(super) fn set(&mut self, value: T) {
        self.0 = Some(value);
    }

    /// Moves the entry out, leaving the slot empty.
    pub(super) fn take(&mut self) -> Option<T> {
        self.0.take()
    }

    /// Tests whether the slot holds an entry.
    pub(super) fn is_occupied(&self) -> bool {
        self.0.is_some()
    }

    /// Borrows the entry.
    ///
    /// # Panics
    /// Panics if the slot is empty.
    pub(super) fn get(&self) -> &T {
        match &self.0 {
            Some(v) => v,
            None => panic!("read of an empty slot"),
        }
    }

    /// Mutably borrows the entry.
    ///
    /// # Panics
    /// Panics if the slot is empty.
    pub(super) fn get_mut(&mut self) -> &mut T {
        match &mut self.0 {
            Some(v) => v,
            None => panic!("write to an empty slot"),
        }
    }

    pub(super) fn as_mut(&mut self) -> Option<&mut T> {
        self.0.as_mut()
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

// Child links are owning in the sense that a node is reachable (and kept
// alive in the arena) only through them; `parent` is a plain back-reference.
#[derive(Debug)]
pub(super) struct Node<T> {
    pub(super) left: Option<usize>,
    pub(super) right: Option<usize>,
    pub(super) parent: usize,
    pub(super) color: Color,
    // bumped whenever the arena cell is freed, so stale cursors never match
    pub(super) gen: u64,
    pub(super) slot: Slot<T>,
}

impl<T> Node<T> {
    pub(super) fn sentinel() -> Self {
        Node {
            left: None,
            right: None,
            parent: END,
            color: Color::Black,
            gen: 0,
            slot: Slot::empty(),
        }
    }

    /// A fresh red leaf hanging under `parent`.
    pub(super) fn leaf(value: T, parent: usize, gen: u64) -> Self {
        Node {
            left: None,
            right: None,
            parent,
            color: Color::Red,
            gen,
            slot: Slot::new(value),
        }
    }

    pub(super) fn child(&self, dir: Dir) -> Option<usize> {
        match dir {
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }

    pub(super) fn child_mut(&mut self, dir: Dir) -> &mut Option<usize> {
        match dir {
            Dir::Left => &mut self.left,
            Dir::Right => &mut self.right,
        }
    }

    /// The child on the `dir` side; the one a rotation toward `dir` pushes
    /// down.
    pub(super) fn near(&self, dir: Dir) -> Option<usize> {
        self.child(dir)
    }

    /// The child opposite `dir`; the one a rotation toward `dir` lifts.
    pub(super) fn far(&self, dir: Dir) -> Option<usize> {
        self.child(dir.flip())
    }
}
