use std::fmt;
use std::marker::PhantomData;

use ::serde::de::{Deserialize, MapAccess, Visitor};

use crate::RbMap;

// Upper bound on the arena preallocated from an untrusted size hint.
const MAX_PREALLOC: usize = 4096;

pub(crate) struct MapVisitor<K, V> {
    pub(crate) desc: &'static str,
    pub(crate) marker: PhantomData<fn() -> (K, V)>,
}

impl<'de, K, V> Visitor<'de> for MapVisitor<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    type Value = RbMap<K, V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.desc)
    }

    // Entries may arrive in any order; a repeated key keeps the last value.
    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let hint = access.size_hint().unwrap_or(0).min(MAX_PREALLOC);
        let mut map = RbMap::with_capacity(hint);
        while let Some((k, v)) = access.next_entry()? {
            map.replace(k, v);
        }
        Ok(map)
    }
}
