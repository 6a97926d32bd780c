use super::{
    LinkedMap,
    Ptr,
};
use crate::{
    Error,
    Result,
};

/// A detached, generation-checked position in a [`LinkedMap`].
///
/// A cursor holds no borrow, so the map may be mutated between steps. Each
/// step first compares the generation captured at creation with the map's
/// current one and fails with [`Error::ConcurrentModification`] on mismatch.
/// Once that happened the cursor stays poisoned.
///
/// A cursor is bound to the map that created it. Stepping it with any other
/// map, clones included, fails with [`Error::InvalidArgument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    next: Ptr,
    generation: u64,
    map_id: u64,
    poisoned: bool,
}

impl Cursor {
    pub(super) fn new(head: Ptr, generation: u64, map_id: u64) -> Self {
        Self {
            next: head,
            generation,
            map_id,
            poisoned: false,
        }
    }

    /// Generation of the map when the cursor was created.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` once a step observed a structural modification.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Checks that `map` is the map this cursor was created from and that it
    /// has not been modified structurally since.
    pub fn validate<K, V>(&mut self, map: &LinkedMap<K, V>) -> Result<()> {
        if map.id != self.map_id {
            return Err(Error::invalid_argument(
                "map",
                "cursor was created by a different map",
            ));
        }
        if self.poisoned || map.generation() != self.generation {
            self.poisoned = true;
            return Err(Error::ConcurrentModification {
                expected: self.generation,
                found: map.generation(),
            });
        }
        Ok(())
    }

    /// Yields the next entry, or `None` once the new end has been passed.
    pub fn next_entry<'m, K, V>(
        &mut self,
        map: &'m LinkedMap<K, V>,
    ) -> Result<Option<(&'m K, &'m V)>> {
        self.validate(map)?;
        let Some(index) = self.next.get() else {
            return Ok(None);
        };
        let Some(node) = map.nodes.get(index) else {
            return Err(Error::InternalInvariantViolation(
                "cursor points at a vacant slot",
            ));
        };
        self.next = node.next;
        Ok(Some((&node.key, &node.value)))
    }

    /// Yields the next key.
    pub fn next_key<'m, K, V>(&mut self, map: &'m LinkedMap<K, V>) -> Result<Option<&'m K>> {
        Ok(self.next_entry(map)?.map(|(key, _)| key))
    }

    /// Yields the next value.
    pub fn next_value<'m, K, V>(&mut self, map: &'m LinkedMap<K, V>) -> Result<Option<&'m V>> {
        Ok(self.next_entry(map)?.map(|(_, value)| value))
    }
}
