//! `window.localStorage` backend
//!
//! Other tabs writing the same key fire the window `storage` event, which is
//! how cross-context changes reach `Storage::watch`.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{ChangeCallback, Storage, StorageError};

pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Open the window's localStorage
    pub fn open() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::WriteRejected {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }

    fn watch(&self, key: &str, mut callback: ChangeCallback) -> Result<(), StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let key = key.to_string();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::StorageEvent| {
            // `clear()` in another tab reports no key
            match event.key() {
                Some(changed) if changed == key => callback(event.new_value()),
                Some(_) => {}
                None => callback(None),
            }
        });
        window
            .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))?;
        closure.forget();
        Ok(())
    }
}
