use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::AdError;
use crate::instance::{AdId, InstanceHandle};
use crate::method::Method;

/// Keyed store of ad instances, at most one per id.
///
/// The map lock is only held for the lookup itself; operations on an
/// instance lock that instance's own mutex, so different ids never wait
/// on each other.
#[derive(Default)]
pub struct InstanceRegistry {
    instances: RwLock<HashMap<AdId, InstanceHandle>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handle` for `id`, returning the handle it replaced.
    pub fn create(&self, id: AdId, handle: InstanceHandle) -> Result<Option<InstanceHandle>, AdError> {
        let mut instances = self
            .instances
            .write()
            .map_err(|_| AdError::LockPoisoned("registry create"))?;
        Ok(instances.insert(id, handle))
    }

    /// Install `handle` only if `id` is free.
    pub fn create_unique(&self, id: AdId, handle: InstanceHandle) -> Result<(), AdError> {
        let mut instances = self
            .instances
            .write()
            .map_err(|_| AdError::LockPoisoned("registry create"))?;
        if instances.contains_key(&id) {
            return Err(AdError::DuplicateId { id });
        }
        instances.insert(id, handle);
        Ok(())
    }

    pub fn get(&self, id: AdId) -> Result<Option<InstanceHandle>, AdError> {
        let instances = self
            .instances
            .read()
            .map_err(|_| AdError::LockPoisoned("registry get"))?;
        Ok(instances.get(&id).cloned())
    }

    /// Like [`InstanceRegistry::get`], failing with `NotFound` for `method`.
    pub fn require(&self, id: AdId, method: Method) -> Result<InstanceHandle, AdError> {
        self.get(id)?.ok_or(AdError::NotFound {
            id,
            method: method.name(),
        })
    }

    /// Remove whatever is registered for `id`. Idempotent.
    pub fn remove(&self, id: AdId) -> Result<Option<InstanceHandle>, AdError> {
        let mut instances = self
            .instances
            .write()
            .map_err(|_| AdError::LockPoisoned("registry remove"))?;
        Ok(instances.remove(&id))
    }

    /// Remove `id` only while it still maps to `handle`, so a stale destroy
    /// never removes an instance re-created under the same id.
    pub fn remove_if(&self, id: AdId, handle: &InstanceHandle) -> Result<bool, AdError> {
        let mut instances = self
            .instances
            .write()
            .map_err(|_| AdError::LockPoisoned("registry remove"))?;
        match instances.get(&id) {
            Some(current) if Arc::ptr_eq(current, handle) => {
                instances.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Registered ids, unordered.
    pub fn ids(&self) -> Vec<AdId> {
        self.instances
            .read()
            .map(|instances| instances.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.instances.read().map(|i| i.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empty the registry, handing back every handle it held.
    pub fn clear(&self) -> Result<Vec<(AdId, InstanceHandle)>, AdError> {
        let mut instances = self
            .instances
            .write()
            .map_err(|_| AdError::LockPoisoned("registry clear"))?;
        Ok(instances.drain().collect())
    }
}
