//! Save/load of the pet model
//!
//! Features:
//! - Single JSON value under a fixed key
//! - Lenient load (missing fields default, bad saves are discarded)
//! - Change notification when another context (tab, popup) writes the key
//!
//! The backend is abstracted behind `Storage` so the simulation can run
//! against `MemoryStorage` natively and `LocalStorage` in the browser.

#[cfg(target_arch = "wasm32")]
pub mod local;
pub mod memory;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;

use crate::sim::RootModel;

/// Key the model is stored under
pub const MODEL_KEY: &str = "yippeeModel";

/// Storage backend failures
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("storage rejected write to {key}: {reason}")]
    WriteRejected { key: String, reason: String },
    #[error("could not serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Callback for values written by other contexts (`None` when removed)
pub type ChangeCallback = Box<dyn FnMut(Option<String>)>;

/// String key-value store with the semantics of `window.localStorage`
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Subscribe to writes of `key` made outside this context.
    ///
    /// Writes made through this handle are not reported. Clearing the whole
    /// store elsewhere is reported as a removal (`None`).
    fn watch(&self, key: &str, callback: ChangeCallback) -> Result<(), StorageError>;
}

/// Persists the `RootModel` under `MODEL_KEY`
pub struct PersistedStateStore<S: Storage> {
    storage: S,
    key: String,
}

impl<S: Storage> PersistedStateStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, MODEL_KEY)
    }

    pub fn with_key(storage: S, key: &str) -> Self {
        Self {
            storage,
            key: key.to_string(),
        }
    }

    /// Load the saved model. Any failure is reported as "no saved state".
    pub fn load(&self) -> Option<RootModel> {
        let json = match self.storage.get_item(&self.key) {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::info!("No saved model, starting fresh");
                return None;
            }
            Err(e) => {
                log::warn!("Failed to read saved model: {}", e);
                return None;
            }
        };

        match RootModel::validate(&json) {
            Ok(model) => {
                log::info!("Loaded model ({} apples)", model.apples.len());
                Some(model)
            }
            Err(e) => {
                log::warn!("Discarding saved model: {}", e);
                None
            }
        }
    }

    /// Write the model
    pub fn save(&self, model: &RootModel) -> Result<(), StorageError> {
        let json = model.to_json()?;
        self.storage.set_item(&self.key, &json)
    }

    /// Remove the saved model
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(&self.key)?;
        log::info!("Saved model cleared");
        Ok(())
    }

    /// Call `callback` whenever another context rewrites the model.
    ///
    /// Unparseable values are passed on as `None`, the same as a removal.
    pub fn on_external_change<F>(&self, mut callback: F) -> Result<(), StorageError>
    where
        F: FnMut(Option<RootModel>) + 'static,
    {
        self.storage.watch(
            &self.key,
            Box::new(move |value: Option<String>| {
                let model = value.and_then(|json| match RootModel::validate(&json) {
                    Ok(model) => Some(model),
                    Err(e) => {
                        log::warn!("Ignoring external model: {}", e);
                        None
                    }
                });
                callback(model);
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;

    use super::*;
    use crate::sim::Apple;

    fn sample_model() -> RootModel {
        let mut model = RootModel::default();
        model.yippee.pos = Vec2::new(120.5, 0.0);
        model.yippee.target_pos = Vec2::new(700.0, 33.0);
        model.yippee.flipped = false;
        model.apples.push(Apple::new(Vec2::new(10.0, 400.0), -0.25));
        model
    }

    #[test]
    fn test_load_missing_key() {
        let store = PersistedStateStore::new(MemoryStorage::new());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let store = PersistedStateStore::new(MemoryStorage::new());
        let model = sample_model();
        store.save(&model).unwrap();
        assert_eq!(store.load(), Some(model));
    }

    #[test]
    fn test_malformed_value_is_no_state() {
        let storage = MemoryStorage::new();
        storage.set_item(MODEL_KEY, "{not json").unwrap();
        let store = PersistedStateStore::new(storage);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_read_failure_is_no_state() {
        let storage = MemoryStorage::new();
        storage.set_item(MODEL_KEY, "{}").unwrap();
        storage.set_unavailable(true);
        let store = PersistedStateStore::new(storage);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_failure_is_reported() {
        let storage = MemoryStorage::new();
        storage.set_unavailable(true);
        let store = PersistedStateStore::new(storage);
        assert!(matches!(
            store.save(&RootModel::default()),
            Err(StorageError::Unavailable)
        ));
    }

    #[test]
    fn test_clear() {
        let store = PersistedStateStore::new(MemoryStorage::new());
        store.save(&sample_model()).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_external_change_is_parsed() {
        let storage = MemoryStorage::new();
        let store = PersistedStateStore::new(storage.clone());
        let seen: Rc<RefCell<Vec<Option<RootModel>>>> = Rc::default();
        {
            let seen = seen.clone();
            store
                .on_external_change(move |model| seen.borrow_mut().push(model))
                .unwrap();
        }

        let model = sample_model();
        storage.simulate_external_write(MODEL_KEY, Some(&model.to_json().unwrap()));
        storage.simulate_external_write(MODEL_KEY, Some("[1, 2"));
        storage.simulate_external_write("someOtherKey", Some("{}"));
        storage.simulate_external_write(MODEL_KEY, None);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], Some(model));
        assert_eq!(seen[1], None);
        assert_eq!(seen[2], None);
    }

    #[test]
    fn test_external_clear_reported_as_removal() {
        let storage = MemoryStorage::new();
        let store = PersistedStateStore::new(storage.clone());
        store.save(&sample_model()).unwrap();
        let seen: Rc<RefCell<Vec<Option<RootModel>>>> = Rc::default();
        {
            let seen = seen.clone();
            store
                .on_external_change(move |model| seen.borrow_mut().push(model))
                .unwrap();
        }

        storage.simulate_external_clear();
        assert_eq!(*seen.borrow(), vec![None]);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_own_writes_not_reported() {
        let storage = MemoryStorage::new();
        let store = PersistedStateStore::new(storage.clone());
        let count = Rc::new(RefCell::new(0));
        {
            let count = count.clone();
            store
                .on_external_change(move |_| *count.borrow_mut() += 1)
                .unwrap();
        }
        store.save(&sample_model()).unwrap();
        assert_eq!(*count.borrow(), 0);
    }
}
