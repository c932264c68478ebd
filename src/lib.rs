#![warn(missing_docs)]
//! # An ordered map on a sentinel-anchored red-black tree
//!
//! `rbtree_map` provides [`RbMap`], a map sorted by key, and the engine
//! underneath it, [`RbTree`], an ordered set of unique entries kept balanced
//! by the red-black coloring discipline.  Insertion, lookup and removal are
//! O(log n); in-order traversal costs O(1) amortized per step and the least
//! entry is found in O(1).
//!
//! Ordering goes through a [`Compare`] comparator from the `compare` crate
//! rather than through `Ord` directly, so a map can be keyed by a custom
//! order, and lookups can use any probe type the comparator knows how to
//! order against stored keys.  The default comparator, [`Ascending`],
//! accepts any probe the key borrows as, e.g. `&str` for `String` keys.
//!
//! Positions are [`Cursor`]s.  A cursor is a copyable handle that does not
//! borrow the container; the container checks every cursor it is given and
//! reports misuse (stepping past an end, erasing the end position, using a
//! cursor of another container or of an erased entry) as
//! [`Error::InvalidIterator`] without changing anything.
//!
//! ```
//! use rbtree_map::{Error, RbMap};
//!
//! let mut m = RbMap::from([(3, "c"), (1, "a"), (2, "b")]);
//! let pos = m.find(&2);
//! assert_eq!(m.get_at(m.next(pos)?), Some((&3, &"c")));
//! assert_eq!(m.erase(pos)?, (2, "b"));
//! assert_eq!(m.erase(pos), Err(Error::InvalidIterator));
//! # Ok::<(), Error>(())
//! ```

mod error;
pub use error::{Error, Result};

pub mod rbtree;
pub use rbtree::{Cursor, RbTree};

mod map;
pub use map::{Iter, IterMut, RbMap};

mod order;
pub use order::Ascending;

pub use compare::Compare;

#[cfg(feature = "serde")]
mod serde;
