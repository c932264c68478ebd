use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;

use compare::Compare;

use crate::rbtree::{self, Cursor, RbTree};
use crate::{Ascending, Error, Result};

/// Orders `(key, value)` entries by key alone.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ByKey<C>(C);

impl<K, V, C: Compare<K>> Compare<(K, V)> for ByKey<C> {
    fn compare(&self, l: &(K, V), r: &(K, V)) -> Ordering {
        self.0.compare(&l.0, &r.0)
    }
}

/// A map from keys to values sorted by key.
///
/// The map is a thin layer over an [`RbTree`] of `(key, value)` entries.
/// Keys are ordered by the comparator `C`, which defaults to the ascending
/// order of `K`.  Two keys are the same key when neither precedes the other.
/// With the default comparator, lookups take any `&Q` that `K` borrows as,
/// as with [`std::collections::BTreeMap`].
///
/// Besides the usual map API, positions can be held as [`Cursor`]s and
/// stepped with [`next`](RbMap::next)/[`prev`](RbMap::prev) or handed to
/// [`erase`](RbMap::erase); misuse of a cursor is reported as
/// [`Error::InvalidIterator`] rather than corrupting the map.
///
/// # Examples
/// ```
/// use rbtree_map::RbMap;
///
/// let mut m = RbMap::new();
/// m.insert(2, "b");
/// m.insert(1, "a");
/// m.insert(3, "c");
///
/// let mut it = m.iter();
/// assert_eq!(it.next(), Some((&1, &"a")));
/// assert_eq!(it.next(), Some((&2, &"b")));
/// assert_eq!(it.next(), Some((&3, &"c")));
/// assert_eq!(it.next(), None);
/// ```
pub struct RbMap<K, V, C = Ascending<K>> {
    tree: RbTree<(K, V), ByKey<C>>,
}

impl<K: Ord, V> RbMap<K, V> {
    /// Creates an empty map in ascending order of its keys.
    /// # Examples
    /// ```
    /// use rbtree_map::RbMap;
    /// let m: RbMap<usize, usize> = RbMap::new();
    /// assert!(m.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_cmp(Ascending::new())
    }

    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        RbMap {
            tree: RbTree::with_capacity_and_cmp(
                capacity,
                ByKey(Ascending::new()),
            ),
        }
    }
}

impl<K, V, C> RbMap<K, V, C> {
    /// Creates an empty map ordered by the given comparator.
    ///
    /// # Examples
    /// ```
    /// use rbtree_map::RbMap;
    ///
    /// let mut m = RbMap::with_cmp(|a: &i32, b: &i32| b.cmp(a));
    /// m.insert(1, 'a');
    /// m.insert(3, 'c');
    /// m.insert(2, 'b');
    /// assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
    /// ```
    pub fn with_cmp(cmp: C) -> Self {
        RbMap {
            tree: RbTree::with_cmp(ByKey(cmp)),
        }
    }

    /// Returns the map's key comparator.
    pub fn cmp(&self) -> &C {
        &self.tree.cmp().0
    }

    /// Drops all entries from the map.
    ///
    /// Cursors obtained before the call are no longer accepted.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Tests whether the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Cursor to the entry with the least key, or [`end`](RbMap::end) if the
    /// map is empty.
    pub fn begin(&self) -> Cursor {
        self.tree.begin()
    }

    /// The past-the-end cursor.
    pub fn end(&self) -> Cursor {
        self.tree.end()
    }

    /// Borrows the entry at `pos`, or `None` for the end cursor or a cursor
    /// this map does not accept.
    pub fn get_at(&self, pos: Cursor) -> Option<(&K, &V)> {
        self.tree.get(pos).map(|(k, v)| (k, v))
    }

    /// Borrows the entry at `pos` with a mutable value.
    pub fn get_at_mut(&mut self, pos: Cursor) -> Option<(&K, &mut V)> {
        self.tree.get_mut(pos).map(|(k, v)| (&*k, v))
    }

    /// Steps `pos` to the next entry in key order.
    pub fn next(&self, pos: Cursor) -> Result<Cursor> {
        self.tree.next(pos)
    }

    /// Steps `pos` to the previous entry in key order.
    pub fn prev(&self, pos: Cursor) -> Result<Cursor> {
        self.tree.prev(pos)
    }

    /// Removes the entry at `pos` and returns it.
    ///
    /// # Examples
    /// ```
    /// use rbtree_map::{Error, RbMap};
    ///
    /// let mut m = RbMap::from([(1, 'a'), (2, 'b')]);
    /// assert_eq!(m.erase(m.find(&1)), Ok((1, 'a')));
    /// assert_eq!(m.erase(m.end()), Err(Error::InvalidIterator));
    /// assert_eq!(m.len(), 1);
    /// ```
    pub fn erase(&mut self, pos: Cursor) -> Result<(K, V)> {
        self.tree.erase(pos)
    }

    /// The entry with the least key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|(k, v)| (k, v))
    }

    /// The entry with the greatest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|(k, v)| (k, v))
    }

    /// Like [`first_key_value`](RbMap::first_key_value), but reports an empty
    /// map as [`Error::ContainerIsEmpty`].
    pub fn front(&self) -> Result<(&K, &V)> {
        self.first_key_value().ok_or(Error::ContainerIsEmpty)
    }

    /// Like [`last_key_value`](RbMap::last_key_value), but reports an empty
    /// map as [`Error::ContainerIsEmpty`].
    pub fn back(&self) -> Result<(&K, &V)> {
        self.last_key_value().ok_or(Error::ContainerIsEmpty)
    }

    /// Creates an iterator over the map entries, sorted by key.
    ///
    /// # Examples
    /// ```
    /// use rbtree_map::RbMap;
    ///
    /// let m = RbMap::from([(0,1), (1,2), (2, 3)]);
    /// for (i, (k, v)) in m.iter().enumerate() {
    ///     assert_eq!(&i, k);
    ///     assert_eq!(&(i+1), v);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter(self.tree.iter())
    }

    /// Returns an iterator of the map's entries, sorted by key, with a
    /// mutable reference to each value.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut(self.tree.iter_mut())
    }

    /// Produces an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.iter().map(|p| p.0)
    }

    /// Produces an iterator over the values of the map, ordered by their
    /// associated keys.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> {
        self.iter().map(|p| p.1)
    }

    /// Mutable references to the map's values, ordered by their keys.
    ///
    /// # Examples
    /// ```
    /// use rbtree_map::RbMap;
    ///
    /// let mut m = RbMap::from([(0,0), (1,1), (2,2)]);
    /// for v in m.values_mut() {
    ///     *v *= 17;
    /// };
    /// assert_eq!(m.get(&2), Some(&34));
    /// ```
    pub fn values_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut V> {
        self.iter_mut().map(|p| p.1)
    }

    /// Verifies the red-black invariants of the underlying tree and returns
    /// the number of entries.
    pub fn check(&self) -> std::result::Result<usize, String>
    where
        C: Compare<K>,
    {
        self.tree.check()
    }

    fn search<Q: ?Sized>(&self, key: &Q) -> Cursor
    where
        C: Compare<Q, K>,
    {
        let cmp = self.cmp();
        self.tree.find_with(|(k, _)| cmp.compare(key, k))
    }
}

impl<K, V, C: Compare<K>> RbMap<K, V, C> {
    /// Inserts `key` with `val` unless the key is already present.
    ///
    /// Returns a cursor to the entry holding the key and whether the
    /// insertion took place.  An existing entry is never modified.
    ///
    /// # Examples
    /// ```
    /// use rbtree_map::RbMap;
    ///
    /// let mut m = RbMap::new();
    /// let (pos, inserted) = m.insert(7, "first");
    /// assert!(inserted);
    /// let (again, inserted) = m.insert(7, "second");
    /// assert!(!inserted);
    /// assert_eq!(pos, again);
    /// assert_eq!(m.get_at(again), Some((&7, &"first")));
    /// ```
    pub fn insert(&mut self, key: K, val: V) -> (Cursor, bool) {
        self.tree.insert((key, val))
    }

    /// Inserts `key` with `val`, replacing and returning the previous value
    /// if the key was present.
    pub fn replace(&mut self, key: K, val: V) -> Option<V> {
        let pos = self.search(&key);
        match self.tree.index_of(pos) {
            Some(i) => {
                let slot = &mut self.tree.entry_mut(i).1;
                Some(std::mem::replace(slot, val))
            }
            None => {
                self.tree.insert((key, val));
                None
            }
        }
    }

    /// Returns the value for `key`, inserting `V::default()` first if the
    /// key is absent.
    ///
    /// # Examples
    /// ```
    /// use rbtree_map::RbMap;
    ///
    /// let mut counts: RbMap<char, usize> = RbMap::new();
    /// for c in "abca".chars() {
    ///     *counts.get_or_insert_default(c) += 1;
    /// }
    /// assert_eq!(counts.get(&'a'), Some(&2));
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Returns the value for `key`, inserting `f()` first if the key is
    /// absent.  `f` is not called when the key is present.
    pub fn get_or_insert_with<F>(&mut self, key: K, f: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let pos = self.search(&key);
        let i = match self.tree.index_of(pos) {
            Some(i) => i,
            None => self.tree.insert_index((key, f())).0,
        };
        &mut self.tree.entry_mut(i).1
    }

    /// Removes `key` from the map and returns its value.
    ///
    /// # Examples
    /// ```
    /// use rbtree_map::RbMap;
    ///
    /// let mut m = RbMap::new();
    /// m.insert(1, 2);
    /// m.insert(2, 3);
    /// assert_eq!(m.remove(&2), Some(3));
    /// assert_eq!(m.remove(&2), None);
    /// ```
    pub fn remove<Q: ?Sized>(&mut self, key: &Q) -> Option<V>
    where
        C: Compare<Q, K>,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key` from the map and returns the stored key and value.
    pub fn remove_entry<Q: ?Sized>(&mut self, key: &Q) -> Option<(K, V)>
    where
        C: Compare<Q, K>,
    {
        let pos = self.search(key);
        self.tree.erase(pos).ok()
    }
}

// Lookups only need to order the probe against stored keys.
impl<K, V, C> RbMap<K, V, C> {
    /// Finds the entry for `key`, or returns [`end`](RbMap::end).
    pub fn find<Q: ?Sized>(&self, key: &Q) -> Cursor
    where
        C: Compare<Q, K>,
    {
        self.search(key)
    }

    /// Returns the number of entries with key `key`: 0 or 1.
    pub fn count<Q: ?Sized>(&self, key: &Q) -> usize
    where
        C: Compare<Q, K>,
    {
        self.contains_key(key) as usize
    }

    /// Tests whether the map holds an entry for `key`.
    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool
    where
        C: Compare<Q, K>,
    {
        self.search(key) != self.end()
    }

    /// Returns a reference to the value associated with `key`.
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V>
    where
        C: Compare<Q, K>,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and the value for `key`.
    pub fn get_key_value<Q: ?Sized>(&self, key: &Q) -> Option<(&K, &V)>
    where
        C: Compare<Q, K>,
    {
        self.get_at(self.search(key))
    }

    /// Returns a mutable reference to the value associated with `key`.
    pub fn get_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V>
    where
        C: Compare<Q, K>,
    {
        let pos = self.search(key);
        self.get_at_mut(pos).map(|(_, v)| v)
    }

    /// Returns the value for `key`, or [`Error::IndexOutOfBound`] if the key
    /// is absent.
    ///
    /// # Examples
    /// ```
    /// use rbtree_map::{Error, RbMap};
    ///
    /// let m = RbMap::from([(1, "one")]);
    /// assert_eq!(m.at(&1), Ok(&"one"));
    /// assert_eq!(m.at(&2), Err(Error::IndexOutOfBound));
    /// ```
    pub fn at<Q: ?Sized>(&self, key: &Q) -> Result<&V>
    where
        C: Compare<Q, K>,
    {
        self.get(key).ok_or(Error::IndexOutOfBound)
    }

    /// Mutable version of [`at`](RbMap::at).
    pub fn at_mut<Q: ?Sized>(&mut self, key: &Q) -> Result<&mut V>
    where
        C: Compare<Q, K>,
    {
        self.get_mut(key).ok_or(Error::IndexOutOfBound)
    }
}

impl<K: Ord, V> Default for RbMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for RbMap<K, V, C> {
    fn clone(&self) -> Self {
        RbMap {
            tree: self.tree.clone(),
        }
    }
}

impl<K: Debug, V: Debug, C> Debug for RbMap<K, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for RbMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().zip(other.iter()).all(|(x, y)| x == y)
    }
}

impl<K: Eq, V: Eq, C> Eq for RbMap<K, V, C> {}

impl<K, Q, V, C> std::ops::Index<&Q> for RbMap<K, V, C>
where
    C: Compare<Q, K>,
    Q: ?Sized,
{
    type Output = V;

    fn index(&self, index: &Q) -> &Self::Output {
        match self.get(index) {
            Some(v) => v,
            None => panic!("Key not found in RbMap"),
        }
    }
}

/// Repeated keys keep the last value, as with
/// [`std::collections::BTreeMap`].
impl<K, V, C: Compare<K>> Extend<(K, V)> for RbMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.replace(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RbMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for RbMap<K, V> {
    fn from(vs: [(K, V); N]) -> Self {
        Self::from_iter(vs)
    }
}

impl<'a, K, V, C> IntoIterator for &'a RbMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut RbMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, C> IntoIterator for RbMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = rbtree::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

/// In-order iterator over the entries of an [`RbMap`].
pub struct Iter<'a, K, V, C>(rbtree::Iter<'a, (K, V), ByKey<C>>);

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V, C> DoubleEndedIterator for Iter<'a, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, v)| (k, v))
    }
}

impl<'a, K, V, C> ExactSizeIterator for Iter<'a, K, V, C> {}

impl<'a, K, V, C> FusedIterator for Iter<'a, K, V, C> {}

/// In-order iterator over the entries of an [`RbMap`] with mutable values.
pub struct IterMut<'a, K, V>(rbtree::IterMut<'a, (K, V)>);

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, v)| (&*k, v))
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}

impl<'a, K, V> FusedIterator for IterMut<'a, K, V> {}

#[cfg(feature = "serde")]
impl<K, V, C> serde::ser::Serialize for RbMap<K, V, C>
where
    K: serde::ser::Serialize,
    V: serde::ser::Serialize,
{
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Deserialize<'de> for RbMap<K, V>
where
    K: serde::de::Deserialize<'de> + Ord,
    V: serde::de::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let map_visitor = crate::serde::MapVisitor {
            desc: "rbtree_map::RbMap",
            marker: std::marker::PhantomData,
        };
        deserializer.deserialize_map(map_visitor)
    }
}
