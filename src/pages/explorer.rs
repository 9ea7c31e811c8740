use leptos::prelude::*;
use leptos_meta::Title;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;

use super::{data_base, use_catalog};
use crate::components::controls::{
	AddNodeForm, AnimationToggle, ConnectForm, EditsTransfer, FilterPanel, FocusPanel, LevelBar, NodeInspector,
};
use crate::components::graph_canvas::GraphCanvas;
use crate::components::SessionSignal;
use crate::config::{AnimationSettings, ExplorerConfig};
use crate::graph::loader::fetch_repo;
use crate::graph::pipeline::GeneratedRepoData;
use crate::graph::session::{EditIntent, GraphSession};
use crate::graph::storage::BrowserStore;
use crate::graph::types::Position;

/// Graph explorer for `/repo/:repo_id`.
#[component]
pub fn Explorer() -> impl IntoView {
	let params = use_params_map();
	let repo_id = move || params.read().get("repo_id").unwrap_or_default();
	let catalog = use_catalog();

	let repo = LocalResource::new(move || {
		let id = repo_id();
		async move {
			if let Some(data) = catalog.with_untracked(|c| c.get(&id).cloned()) {
				return Ok((id, data));
			}
			let data = fetch_repo(&data_base(), &id).await.map_err(|err| {
				log::error!("{err}");
				err.to_string()
			})?;
			catalog.update(|c| c.insert(id.clone(), data.clone()));
			Ok::<_, String>((id, data))
		}
	});

	move || match repo.get() {
		None => view! { <p class="loading">"Loading repository…"</p> }.into_any(),
		Some(Ok((id, data))) => view! { <Workspace repo_id=id data=data /> }.into_any(),
		Some(Err(err)) => view! {
			<div class="load-error">
				<h1>"Could not load repository"</h1>
				<p>{err}</p>
				<A href="/">"Back to repositories"</A>
			</div>
		}
		.into_any(),
	}
}

#[component]
fn Workspace(repo_id: String, data: GeneratedRepoData) -> impl IntoView {
	let config = ExplorerConfig::default();
	let session: SessionSignal =
		RwSignal::new_local(GraphSession::open(&repo_id, data, BrowserStore::local(), config.default_level));
	let animation = RwSignal::new(AnimationSettings::load(&BrowserStore::local()));
	let scene = Signal::derive(move || session.with(|s| s.scene()));

	let on_select = Callback::new(move |id: Option<String>| session.update(|s| s.select(id)));
	let on_open = Callback::new(move |id: String| {
		session.update(|s| {
			s.open_module(&id);
		})
	});
	let on_node_moved = Callback::new(move |(id, position): (String, Position)| {
		session.update(|s| s.dispatch(EditIntent::UpdateNodePosition { id, position }))
	});
	let pending_edge = RwSignal::new(None::<(String, String)>);
	let on_connect = Callback::new(move |endpoints: (String, String)| pending_edge.set(Some(endpoints)));

	view! {
		<Title text=move || format!("{} - {}", session.with(|s| s.title()), repo_id) />
		<div class="explorer">
			<header class="explorer-header">
				<A href="/">"Repositories"</A>
				<LevelBar session=session />
			</header>
			<div class="explorer-body">
				<div class="canvas-wrap">
					<GraphCanvas
						scene=scene
						animation=animation
						on_select=on_select
						on_open=on_open
						on_node_moved=on_node_moved
						on_connect=on_connect
					/>
				</div>
				<aside class="sidebar">
					<ConnectForm session=session pending=pending_edge />
					<FocusPanel session=session />
					<FilterPanel session=session />
					<AnimationToggle animation=animation />
					<NodeInspector session=session />
					<AddNodeForm session=session />
					<EditsTransfer session=session />
				</aside>
			</div>
		</div>
	}
}
