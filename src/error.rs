use std::fmt::{self, Display, Formatter};

/// The failures reported by the tree and the map.
///
/// Every fallible operation detects its failure before touching any link, so
/// a container that returned an `Error` is exactly as it was before the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// A key lookup (`at`, `at_mut`) found no equivalent key.
    IndexOutOfBound,

    /// An operation that needs at least one entry was called on an empty
    /// container.
    ContainerIsEmpty,

    /// A cursor was stepped past either end, or used on a tree that does not
    /// own it, or refers to an entry that has since been erased.
    InvalidIterator,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::IndexOutOfBound => f.write_str("index out of bound"),
            Error::ContainerIsEmpty => f.write_str("container is empty"),
            Error::InvalidIterator => f.write_str("invalid iterator"),
        }
    }
}

impl std::error::Error for Error {}

/// Shorthand for results carrying an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
