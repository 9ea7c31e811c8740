pub mod explorer;
pub mod home;
pub mod not_found;

use leptos::prelude::*;

use crate::config::ExplorerConfig;
use crate::graph::pipeline::RepoCatalog;

/// Absolute base URL of the generated pipeline data.
fn data_base() -> String {
	let origin = web_sys::window()
		.and_then(|w| w.location().origin().ok())
		.unwrap_or_default();
	ExplorerConfig::default().data_url(&origin)
}

fn use_catalog() -> RwSignal<RepoCatalog> {
	use_context::<RwSignal<RepoCatalog>>().unwrap_or_else(|| {
		log::warn!("no repository catalog in context; using a private one");
		RwSignal::new(RepoCatalog::new())
	})
}
