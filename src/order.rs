use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

use compare::Compare;

/// The default comparator: ascending order of `T` under [`Ord`].
///
/// Unlike [`compare::Natural`], `Ascending<T>` also orders any probe `Q`
/// that `T` borrows as, so a tree of `String`s can be searched with a
/// `&str` just as with [`std::collections::BTreeMap`].
///
/// # Examples
/// ```
/// use rbtree_map::RbMap;
///
/// let mut m: RbMap<String, u8> = RbMap::new();
/// m.insert("abc".to_string(), 1);
/// assert_eq!(m.get("abc"), Some(&1));
/// assert_eq!(m["abc"], 1);
/// ```
pub struct Ascending<T: ?Sized>(PhantomData<fn(&T, &T) -> Ordering>);

impl<T: ?Sized> Ascending<T> {
    /// Creates the comparator.
    pub fn new() -> Self {
        Ascending(PhantomData)
    }
}

// Hand-written so that none of them require anything of `T`.
impl<T: ?Sized> Clone for Ascending<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Ascending<T> {}

impl<T: ?Sized> Default for Ascending<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Debug for Ascending<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Ascending")
    }
}

impl<T, Q> Compare<Q, T> for Ascending<T>
where
    T: Borrow<Q> + ?Sized,
    Q: Ord + ?Sized,
{
    fn compare(&self, l: &Q, r: &T) -> Ordering {
        l.cmp(r.borrow())
    }
}
