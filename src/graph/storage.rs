//! Durable key-value storage behind the edit store and persisted settings.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
	#[error("browser storage is unavailable")]
	Unavailable,
	#[error("storage rejected write for {key}: {reason}")]
	Rejected { key: String, reason: String },
}

/// Minimal string key-value contract. Values are serialized JSON documents.
pub trait KeyValueStore {
	fn get(&self, key: &str) -> Option<String>;
	fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local store, used off the browser and in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	entries: HashMap<String, String>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.entries.insert(key.into(), value.into());
		self
	}
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Option<String> {
		self.entries.get(key).cloned()
	}

	fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
		self.entries.insert(key.to_owned(), value.to_owned());
		Ok(())
	}
}

/// `window.localStorage`. Missing storage (private mode, no window) reads as
/// empty and rejects writes.
#[derive(Clone, Debug)]
pub struct BrowserStore {
	storage: Option<web_sys::Storage>,
}

impl BrowserStore {
	pub fn local() -> Self {
		let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
		if storage.is_none() {
			log::warn!("localStorage unavailable; edits will not survive reloads");
		}
		Self { storage }
	}
}

impl KeyValueStore for BrowserStore {
	fn get(&self, key: &str) -> Option<String> {
		self.storage.as_ref()?.get_item(key).ok().flatten()
	}

	fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
		let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
		storage.set_item(key, value).map_err(|err| StorageError::Rejected {
			key: key.to_owned(),
			reason: format!("{err:?}"),
		})
	}
}
