//! Explorer settings.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::graph::storage::KeyValueStore;
use crate::graph::types::ZoomLevel;

pub const ANIMATION_SETTINGS_KEY: &str = "legend-animation-settings";

/// Static wiring for one explorer instance.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplorerConfig {
	/// Path under the page origin holding `manifest.json` and `<repo>.json`.
	pub data_base_path: String,
	pub default_level: ZoomLevel,
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			data_base_path: "/generated".into(),
			default_level: ZoomLevel::Module,
		}
	}
}

impl ExplorerConfig {
	/// Absolute data URL for `origin` (fetch needs an absolute URL).
	pub fn data_url(&self, origin: &str) -> String {
		format!("{}{}", origin.trim_end_matches('/'), self.data_base_path)
	}
}

/// Edge flow animation, persisted across sessions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationSettings {
	pub enabled: bool,
	/// Seconds per dash cycle.
	pub speed: f64,
}

impl Default for AnimationSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			speed: 1.5,
		}
	}
}

impl AnimationSettings {
	pub fn load(store: &impl KeyValueStore) -> Self {
		store
			.get(ANIMATION_SETTINGS_KEY)
			.and_then(|raw| serde_json::from_str(&raw).ok())
			.unwrap_or_default()
	}

	pub fn save(&self, store: &mut impl KeyValueStore) {
		let Ok(raw) = serde_json::to_string(self) else {
			return;
		};
		if let Err(err) = store.set(ANIMATION_SETTINGS_KEY, &raw) {
			warn!("animation settings not saved: {err}");
		}
	}
}
