use leptos::prelude::*;
use leptos_router::components::A;
use log::warn;

use super::{data_base, use_catalog};
use crate::graph::loader::{fetch_manifest, fetch_repo};
use crate::graph::types::Repository;

fn repo_card(repo: Repository) -> impl IntoView {
	let name = if repo.name.is_empty() { repo.id.clone() } else { repo.name };
	view! {
		<li class="repo-card">
			<A href=format!("/repo/{}", repo.id)>{name}</A>
			<span class="owner">{repo.owner}</span>
			<p class="description">{repo.description}</p>
			<span class="language" style=format!("color: {}", repo.language_color)>
				{repo.language}
			</span>
			<span class="stars">{format!("★ {}", repo.stars)}</span>
		</li>
	}
}

/// Repository list built from the pipeline manifest.
#[component]
pub fn Home() -> impl IntoView {
	let catalog = use_catalog();

	// Each manifest entry is fetched once; a failure only drops that repository
	let loaded = LocalResource::new(move || async move {
		let base = data_base();
		let ids = fetch_manifest(&base).await;
		let mut failures = Vec::new();
		for id in &ids {
			if catalog.with_untracked(|c| c.contains(id)) {
				continue;
			}
			match fetch_repo(&base, id).await {
				Ok(data) => catalog.update(|c| c.insert(id.clone(), data)),
				Err(err) => {
					warn!("skipping {id}: {err}");
					failures.push(format!("{id}: {err}"));
				}
			}
		}
		catalog.update(|c| c.set_manifest(ids));
		failures
	});

	view! {
		<div class="home">
			<h1>"Legend"</h1>
			<p class="subtitle">"Pick a repository to explore its architecture."</p>
			{move || loaded.get().is_none().then(|| view! { <p class="loading">"Loading repositories…"</p> })}
			<ul class="repo-list">
				{move || catalog.with(|c| c.repositories()).into_iter().map(repo_card).collect_view()}
			</ul>
			{move || {
				let empty = loaded.get().is_some() && catalog.with(|c| c.repositories().is_empty());
				empty.then(|| view! { <p class="empty">"No generated repositories found."</p> })
			}}
			{move || {
				let failures = loaded.get().unwrap_or_default();
				(!failures.is_empty())
					.then(|| {
						view! {
							<ul class="load-errors">
								{failures.into_iter().map(|f| view! { <li>{f}</li> }).collect_view()}
							</ul>
						}
					})
			}}
		</div>
	}
}
