//! `serde` support: a [`LinkedMap`] is written as an ordered sequence of
//! `[key, value]` pairs, which keeps the order through formats whose maps are
//! unordered or only allow string keys.

use std::{
    fmt,
    hash::Hash,
    marker::PhantomData,
};

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
    de::{
        SeqAccess,
        Visitor,
    },
    ser::SerializeSeq,
};

use crate::{
    LinkedMap,
    Touch,
};

const MAX_PREALLOCATED_PAIRS: usize = 4096;

impl<K: Serialize, V: Serialize> Serialize for LinkedMap<K, V> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for pair in self.iter() {
            seq.serialize_element(&pair)?;
        }
        seq.end()
    }
}

struct PairsVisitor<K, V> {
    marker: PhantomData<fn() -> LinkedMap<K, V>>,
}

impl<'de, K, V> Visitor<'de> for PairsVisitor<K, V>
where
    K: Deserialize<'de> + Hash + Eq,
    V: Deserialize<'de>,
{
    type Value = LinkedMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of [key, value] pairs")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let capacity = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATED_PAIRS);
        let mut map = LinkedMap::with_capacity(capacity);
        while let Some((key, value)) = seq.next_element::<(K, V)>()? {
            map.set(key, value, Touch::None);
        }
        Ok(map)
    }
}

impl<'de, K, V> Deserialize<'de> for LinkedMap<K, V>
where
    K: Deserialize<'de> + Hash + Eq,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(PairsVisitor {
            marker: PhantomData,
        })
    }
}
