use std::collections::BTreeMap;

use tracing::debug;

use super::{check_transient, stored_pk, Entity, Filter, Repository};
use crate::error::{Error, Result};

/// Process-lifetime store for one entity kind.
///
/// Pks come from a monotonic counter, so a deleted pk is never handed out
/// again and iteration order over the map is insertion order.
#[derive(Debug)]
pub(crate) struct MemoryRepository<T> {
    records: BTreeMap<i64, T>,
    last_pk: i64,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            last_pk: 0,
        }
    }
}

impl<T> MemoryRepository<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl<T: Entity> Repository<T> for MemoryRepository<T> {
    fn add(&mut self, obj: &mut T) -> Result<i64> {
        check_transient(obj)?;
        self.last_pk += 1;
        let pk = self.last_pk;
        obj.set_pk(pk);
        self.records.insert(pk, obj.clone());
        debug!(kind = T::KIND, pk, "added in memory");
        Ok(pk)
    }

    fn get(&self, pk: i64) -> Result<Option<T>> {
        Ok(self.records.get(&pk).cloned())
    }

    fn get_all(&self, filter: &Filter) -> Result<Vec<T>> {
        filter.check::<T>()?;
        let mut out = Vec::new();
        for obj in self.records.values() {
            if filter.matches(obj)? {
                out.push(obj.clone());
            }
        }
        Ok(out)
    }

    fn update(&mut self, obj: &T) -> Result<()> {
        let pk = stored_pk(obj)?;
        obj.validate()?;
        let slot = self.records.get_mut(&pk).ok_or(Error::InvalidKey {
            kind: T::KIND,
            pk,
        })?;
        *slot = obj.clone();
        debug!(kind = T::KIND, pk, "updated in memory");
        Ok(())
    }

    fn delete(&mut self, pk: i64) -> Result<()> {
        let removed = self.records.remove(&pk).is_some();
        debug!(kind = T::KIND, pk, removed, "deleted in memory");
        Ok(())
    }
}
