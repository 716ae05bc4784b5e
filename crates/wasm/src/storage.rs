use stellar_core::storage::{KeyValueStore, StorageError};
use wasm_bindgen::JsValue;
use web_sys::Window;

use crate::dom::describe;

/// `window.localStorage`.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Fails when storage is disabled, e.g. by privacy settings.
    pub fn open(window: &Window) -> Result<Self, StorageError> {
        window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(describe(&e)))?
            .map(|storage| Self { storage })
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e: JsValue| StorageError::Unavailable(describe(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: describe(&e),
            })
    }
}
