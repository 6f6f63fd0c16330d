//! In-process storage backend (native builds and tests)

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::{ChangeCallback, Storage, StorageError};

#[derive(Default)]
struct Inner {
    items: RefCell<HashMap<String, String>>,
    watchers: RefCell<Vec<(String, ChangeCallback)>>,
    unavailable: Cell<bool>,
}

/// Shared in-memory key-value store. Clones share the same contents.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with `Unavailable` (quota, private mode)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.set(unavailable);
    }

    /// Write `key` as if another tab or the popup had done it, notifying
    /// watchers of that key.
    pub fn simulate_external_write(&self, key: &str, value: Option<&str>) {
        {
            let mut items = self.inner.items.borrow_mut();
            match value {
                Some(v) => {
                    items.insert(key.to_string(), v.to_string());
                }
                None => {
                    items.remove(key);
                }
            }
        }

        let mut watchers = self.inner.watchers.borrow_mut();
        for (watched, callback) in watchers.iter_mut() {
            if watched == key {
                callback(value.map(str::to_string));
            }
        }
    }

    /// Empty the store as if another context had called `clear()`. Every
    /// watcher sees its key removed.
    pub fn simulate_external_clear(&self) {
        self.inner.items.borrow_mut().clear();
        let mut watchers = self.inner.watchers.borrow_mut();
        for (_, callback) in watchers.iter_mut() {
            callback(None);
        }
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.inner.unavailable.get() {
            Err(StorageError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.inner.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.items.borrow_mut().remove(key);
        Ok(())
    }

    fn watch(&self, key: &str, callback: ChangeCallback) -> Result<(), StorageError> {
        self.inner
            .watchers
            .borrow_mut()
            .push((key.to_string(), callback));
        Ok(())
    }
}
