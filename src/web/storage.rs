use anyhow::{Context, Result};
use pivot_core::preferences::PreferenceStorage;
use tracing::warn;
use web_sys::{Storage, Window};

use super::js_error;

pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    pub fn from_window(window: &Window) -> Self {
        let storage = window.local_storage().ok().flatten();
        if storage.is_none() {
            warn!("localStorage is unavailable; preferences will not persist");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage> {
        self.storage
            .as_ref()
            .context("localStorage is unavailable")
    }
}

impl PreferenceStorage for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.storage()?.get_item(key).map_err(js_error)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage()?
            .set_item(key, value)
            .map_err(js_error)
            .with_context(|| format!("Failed to write {key}"))
    }
}
