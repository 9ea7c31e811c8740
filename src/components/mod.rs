pub mod controls;
pub mod graph_canvas;

use leptos::prelude::{LocalStorage, RwSignal};

use crate::graph::session::{GraphSession, mint_edge_id, mint_node_id};
use crate::graph::storage::BrowserStore;

/// The explorer's session, shared by the canvas and the sidebar.
pub type SessionSignal = RwSignal<GraphSession<BrowserStore>, LocalStorage>;

fn now_millis() -> u64 {
	js_sys::Date::now() as u64
}

pub fn fresh_node_id() -> String {
	mint_node_id(now_millis(), js_sys::Math::random())
}

pub fn fresh_edge_id() -> String {
	mint_edge_id(now_millis(), js_sys::Math::random())
}
