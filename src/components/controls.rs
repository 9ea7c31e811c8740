//! Sidebar controls. Every mutation goes through the shared session signal.

use leptos::prelude::*;
use log::warn;

use super::SessionSignal;
use super::{fresh_edge_id, fresh_node_id};
use crate::config::AnimationSettings;
use crate::graph::edits::{EdgeFieldEdits, NodeField, technical_specs_text};
use crate::graph::focus::{DisplayMode, MAX_DEPTH, MIN_DEPTH};
use crate::graph::session::{EditIntent, NodeDraft, user_edge};
use crate::graph::storage::BrowserStore;
use crate::graph::types::{CommunicationMode, EdgeType, GraphEdge, NodeType, Position, ZoomLevel};

#[component]
pub fn LevelBar(session: SessionSignal) -> impl IntoView {
	let level = move || session.with(|s| s.level());
	let title = move || session.with(|s| s.title());
	let drilled = move || session.with(|s| s.file_scope().is_some());

	view! {
		<nav class="level-bar">
			{ZoomLevel::ALL
				.into_iter()
				.map(|l| {
					view! {
						<button
							class:active=move || level() == l
							on:click=move |_| session.update(|s| s.set_level(l))
						>
							{l.title()}
						</button>
					}
				})
				.collect_view()}
			<Show when=drilled>
				<button class="back" on:click=move |_| session.update(|s| s.back_to_modules())>
					"Back to modules"
				</button>
			</Show>
			<h2 class="view-title">{title}</h2>
		</nav>
	}
}

#[component]
pub fn FocusPanel(session: SessionSignal) -> impl IntoView {
	let focus = move || session.with(|s| s.focus());

	view! {
		<section class="panel focus-panel">
			<h3>"Focus"</h3>
			<label>
				<input
					type="checkbox"
					prop:checked=move || focus().enabled
					on:change=move |ev| {
						let on = event_target_checked(&ev);
						session.update(|s| s.focus_mut().enabled = on);
					}
				/>
				"Focus on selection"
			</label>
			<select on:change=move |ev| {
				let mode = match event_target_value(&ev).as_str() {
					"hide" => DisplayMode::Hide,
					_ => DisplayMode::Dim,
				};
				session.update(|s| s.focus_mut().display_mode = mode);
			}>
				<option value="dim" prop:selected=move || focus().display_mode == DisplayMode::Dim>
					"Dim others"
				</option>
				<option value="hide" prop:selected=move || focus().display_mode == DisplayMode::Hide>
					"Hide others"
				</option>
			</select>
			<label>
				"Depth " {move || focus().depth()}
				<input
					type="range"
					min=MIN_DEPTH.to_string()
					max=MAX_DEPTH.to_string()
					prop:value=move || focus().depth().to_string()
					on:input=move |ev| {
						if let Ok(depth) = event_target_value(&ev).parse::<u8>() {
							session.update(|s| s.focus_mut().set_depth(depth));
						}
					}
				/>
			</label>
		</section>
	}
}

#[component]
pub fn FilterPanel(session: SessionSignal) -> impl IntoView {
	let level = move || session.with(|s| s.level());
	let filters = move || session.with(|s| s.filters());

	view! {
		<section class="panel filter-panel">
			<h3>"Edges"</h3>
			<Show when=move || matches!(level(), ZoomLevel::System | ZoomLevel::Module)>
				<label>
					<input
						type="checkbox"
						prop:checked=move || filters().verified_only
						on:change=move |ev| {
							let on = event_target_checked(&ev);
							session.update(|s| s.filters_mut().verified_only = on);
						}
					/>
					"Verified only"
				</label>
			</Show>
			<Show when=move || level() == ZoomLevel::Module>
				<label>
					<input
						type="checkbox"
						prop:checked=move || filters().circular_only
						on:change=move |ev| {
							let on = event_target_checked(&ev);
							session.update(|s| s.filters_mut().circular_only = on);
						}
					/>
					"Circular only"
				</label>
			</Show>
			<Show when=move || level() == ZoomLevel::File>
				<label>
					"Min coupling " {move || filters().weight_threshold}
					<input
						type="range"
						min="1"
						max="10"
						step="1"
						prop:value=move || filters().weight_threshold.to_string()
						on:input=move |ev| {
							if let Ok(threshold) = event_target_value(&ev).parse::<f64>() {
								session.update(|s| s.filters_mut().weight_threshold = threshold);
							}
						}
					/>
				</label>
			</Show>
			<input
				type="search"
				placeholder="Search nodes"
				prop:value=move || session.with(|s| s.search().to_owned())
				on:input=move |ev| {
					let query = event_target_value(&ev);
					session.update(|s| s.set_search(&query));
				}
			/>
		</section>
	}
}

const SPEED_PRESETS: [(&str, f64); 3] = [("Fast", 0.75), ("Normal", 1.5), ("Slow", 3.0)];

#[component]
pub fn AnimationToggle(animation: RwSignal<AnimationSettings>) -> impl IntoView {
	let save = move || animation.with_untracked(|a| a.save(&mut BrowserStore::local()));

	view! {
		<section class="panel animation-panel">
			<label>
				<input
					type="checkbox"
					prop:checked=move || animation.get().enabled
					on:change=move |ev| {
						let on = event_target_checked(&ev);
						animation.update(|a| a.enabled = on);
						save();
					}
				/>
				"Animate edges"
			</label>
			<select on:change=move |ev| {
				if let Ok(speed) = event_target_value(&ev).parse::<f64>() {
					animation.update(|a| a.speed = speed);
					save();
				}
			}>
				{SPEED_PRESETS
					.into_iter()
					.map(|(name, speed)| {
						view! {
							<option value=speed.to_string() prop:selected=move || animation.get().speed == speed>
								{name}
							</option>
						}
					})
					.collect_view()}
			</select>
		</section>
	}
}

fn node_type_options(current: NodeType) -> impl IntoView {
	NodeType::ALL
		.into_iter()
		.map(|t| view! { <option value=t.as_str() selected={t == current}>{t.as_str()}</option> })
		.collect_view()
}

fn edge_type_options(current: EdgeType) -> impl IntoView {
	EdgeType::ALL
		.into_iter()
		.map(|t| view! { <option value=t.as_str() selected={t == current}>{t.as_str()}</option> })
		.collect_view()
}

const PROTOCOL_SUGGESTIONS: [&str; 7] = ["http", "grpc", "kafka", "rabbitmq", "redis", "postgres", "sqs"];

/// Multi-line editor for one node field, committed on change.
fn field_editor(
	session: SessionSignal,
	id: String,
	title: &'static str,
	value: String,
	to_field: fn(String) -> NodeField,
) -> impl IntoView {
	view! {
		<label>
			{title}
			<textarea
				prop:value=value
				on:change=move |ev| {
					let field = to_field(event_target_value(&ev));
					session.update(|s| s.dispatch(EditIntent::EditNodeField { id: id.clone(), field }));
				}
			/>
		</label>
	}
}

/// Details and editable fields of the selected node.
#[component]
pub fn NodeInspector(session: SessionSignal) -> impl IntoView {
	let selected = move || session.with(|s| s.selected_node());

	view! {
		<section class="panel inspector">
			{move || {
				selected()
					.map(|node| {
						let id = node.id.clone();
						let (note, user_added, edited) = session
							.with_untracked(|s| {
								(
									s.edits().node_note(&id),
									s.edits().is_node_user_added(&id),
									s.edits().is_node_edited(&id),
								)
							});
						let edges: Vec<GraphEdge> = session
							.with_untracked(|s| {
								s.reconciled().edges.into_iter().filter(|e| e.touches(&id)).collect()
							});
						let (id_label, id_kind, id_group, id_note, id_delete) = (
							id.clone(),
							id.clone(),
							id.clone(),
							id.clone(),
							id.clone(),
						);
						let groups = session.with_untracked(|s| s.data().system_groups.clone());
						let overview = node.how_it_works.as_ref().and_then(|h| h.overview.clone()).unwrap_or_default();
						let decisions = node.key_decisions.clone().unwrap_or_default().join("\n");
						let specs = technical_specs_text(node.technical_specs.as_deref().unwrap_or_default());
						view! {
							<h3>{node.label.clone()}</h3>
							<p class="badges">
								<span class="badge">{node.kind.as_str()}</span>
								{user_added.then(|| view! { <span class="badge user">"user added"</span> })}
								{edited.then(|| view! { <span class="badge edited">"edited"</span> })}
							</p>
							<label>
								"Label"
								<input
									prop:value=node.label.clone()
									on:change=move |ev| {
										let field = NodeField::Label(event_target_value(&ev));
										session
											.update(|s| {
												s.dispatch(EditIntent::EditNodeField {
													id: id_label.clone(),
													field,
												})
											});
									}
								/>
							</label>
							<label>
								"Type"
								<select on:change=move |ev| {
									let Some(kind) = NodeType::parse(&event_target_value(&ev)) else {
										return;
									};
									session
										.update(|s| {
											s.dispatch(EditIntent::EditNodeField {
												id: id_kind.clone(),
												field: NodeField::Kind(kind),
											})
										});
								}>{node_type_options(node.kind)}</select>
							</label>
							<label>
								"Group"
								<input
									list="system-groups"
									prop:value=node.group.clone().unwrap_or_default()
									on:change=move |ev| {
										let group = event_target_value(&ev).trim().to_owned();
										if group.is_empty() {
											return;
										}
										session
											.update(|s| {
												s.dispatch(EditIntent::EditNodeField {
													id: id_group.clone(),
													field: NodeField::Group(group),
												})
											});
									}
								/>
								<datalist id="system-groups">
									{groups
										.into_iter()
										.map(|g| view! { <option value=g.id>{g.label}</option> })
										.collect_view()}
								</datalist>
							</label>
							{field_editor(session, id.clone(), "Description", node.description.clone(), NodeField::Description)}
							<p class="stats">{node.stats.clone()}</p>
							{field_editor(session, id.clone(), "Purpose", node.purpose.clone().unwrap_or_default(), NodeField::Purpose)}
							{field_editor(
								session,
								id.clone(),
								"Architecture",
								node.architecture.clone().unwrap_or_default(),
								NodeField::Architecture,
							)}
							{field_editor(session, id.clone(), "How it works", overview, NodeField::HowItWorksOverview)}
							{field_editor(
								session,
								id.clone(),
								"Technical specs (title: details per line)",
								specs,
								|raw: String| NodeField::technical_specs_from_text(&raw),
							)}
							{field_editor(
								session,
								id.clone(),
								"Key decisions (one per line)",
								decisions,
								|raw: String| NodeField::key_decisions_from_text(&raw),
							)}
							<label>
								"Note"
								<textarea
									prop:value=note
									on:change=move |ev| {
										let note = event_target_value(&ev);
										session
											.update(|s| {
												s.dispatch(EditIntent::SetNodeNote {
													id: id_note.clone(),
													note,
												})
											});
									}
								/>
							</label>
							<EdgeList session=session edges=edges />
							<button
								class="danger"
								on:click=move |_| {
									session.update(|s| s.dispatch(EditIntent::DeleteNode(id_delete.clone())))
								}
							>
								"Delete node"
							</button>
						}
					})
			}}
		</section>
	}
}

#[component]
fn EdgeList(session: SessionSignal, edges: Vec<GraphEdge>) -> impl IntoView {
	view! {
		<ul class="edge-list">
			{edges.into_iter().map(|edge| view! { <EdgeRow session=session edge=edge /> }).collect_view()}
		</ul>
		<datalist id="edge-protocols">
			{PROTOCOL_SUGGESTIONS.into_iter().map(|p| view! { <option value=p /> }).collect_view()}
		</datalist>
	}
}

/// One connection of the selected node with its editable fields.
#[component]
fn EdgeRow(session: SessionSignal, edge: GraphEdge) -> impl IntoView {
	let label = RwSignal::new(edge.label.clone().unwrap_or_default());
	let kind = RwSignal::new(edge.kind);
	let mode = RwSignal::new(edge.communication_mode);
	let protocol = RwSignal::new(edge.protocol.clone().unwrap_or_default());
	let (initial_kind, initial_mode) = (edge.kind, edge.communication_mode);
	let id_delete = edge.id.clone();
	let endpoints = format!("{} → {}", edge.source, edge.target);

	let save = move |_: leptos::ev::MouseEvent| {
		let patch = EdgeFieldEdits::changes(
			&edge,
			&label.get_untracked(),
			kind.get_untracked(),
			mode.get_untracked(),
			&protocol.get_untracked(),
		);
		if patch.is_empty() {
			return;
		}
		let id = edge.id.clone();
		session.update(|s| s.dispatch(EditIntent::EditEdge { id, patch }));
	};

	view! {
		<li>
			<span class="endpoints">{endpoints}</span>
			<input
				placeholder="label"
				prop:value=move || label.get()
				on:input=move |ev| label.set(event_target_value(&ev))
			/>
			<select on:change=move |ev| {
				if let Some(k) = EdgeType::parse(&event_target_value(&ev)) {
					kind.set(k);
				}
			}>{edge_type_options(initial_kind)}</select>
			<select on:change=move |ev| mode.set(CommunicationMode::parse(&event_target_value(&ev)))>
				<option value="" selected=initial_mode.is_none()>
					"mode"
				</option>
				{CommunicationMode::ALL
					.into_iter()
					.map(|m| view! { <option value=m.as_str() selected={initial_mode == Some(m)}>{m.as_str()}</option> })
					.collect_view()}
			</select>
			<input
				list="edge-protocols"
				placeholder="protocol"
				prop:value=move || protocol.get()
				on:input=move |ev| protocol.set(event_target_value(&ev))
			/>
			<button on:click=save>"Save"</button>
			<button on:click=move |_| {
				session.update(|s| s.dispatch(EditIntent::DeleteEdge(id_delete.clone())))
			}>"Remove"</button>
		</li>
	}
}

/// Pending shift-drag connection, confirmed with a type and label before
/// the edge is created.
#[component]
pub fn ConnectForm(session: SessionSignal, pending: RwSignal<Option<(String, String)>>) -> impl IntoView {
	let kind = RwSignal::new(EdgeType::DependsOn);
	let label = RwSignal::new(String::new());
	let endpoints = move || {
		let (source, target) = pending.get()?;
		let name = |id: &str| {
			session.with(|s| s.reconciled().node(id).map(|n| n.label.clone())).unwrap_or_else(|| id.to_owned())
		};
		Some(format!("{} → {}", name(&source), name(&target)))
	};

	let create = move |_: leptos::ev::MouseEvent| {
		let Some((source, target)) = pending.get_untracked() else {
			return;
		};
		let edge = user_edge(fresh_edge_id(), &source, &target, kind.get_untracked(), &label.get_untracked());
		session.update(|s| s.dispatch(EditIntent::AddEdge(edge)));
		pending.set(None);
		label.set(String::new());
	};

	view! {
		<Show when=move || pending.with(Option::is_some)>
			<section class="panel connect">
				<h3>"New connection"</h3>
				<p class="endpoints">{endpoints}</p>
				<select on:change=move |ev| {
					if let Some(k) = EdgeType::parse(&event_target_value(&ev)) {
						kind.set(k);
					}
				}>{move || edge_type_options(kind.get())}</select>
				<input
					placeholder="Optional label"
					prop:value=move || label.get()
					on:input=move |ev| label.set(event_target_value(&ev))
				/>
				<button on:click=create>"Connect"</button>
				<button on:click=move |_| pending.set(None)>"Cancel"</button>
			</section>
		</Show>
	}
}

#[component]
pub fn AddNodeForm(session: SessionSignal) -> impl IntoView {
	let (label, set_label) = signal(String::new());
	let (kind, set_kind) = signal(NodeType::Component);
	let (group, set_group) = signal(String::new());
	let (description, set_description) = signal(String::new());
	let grouped = move || session.with(|s| s.level().is_grouped());

	let add = move |_: leptos::ev::MouseEvent| {
		let draft = NodeDraft {
			label: label.get_untracked(),
			kind: kind.get_untracked(),
			description: description.get_untracked(),
			group: group.get_untracked(),
		};
		session.update(|s| {
			let Some(mut node) = draft.into_node(fresh_node_id(), s.level()) else {
				warn!("node label is required");
				return;
			};
			if let Some(module_id) = s.file_scope() {
				node.parent_id = Some(module_id.to_owned());
			}
			let offset = 40.0 * (s.edits().record().added_nodes.len() % 10) as f64;
			s.dispatch(EditIntent::AddNode {
				node,
				position: Position::new(100.0 + offset, 100.0 + offset),
			});
		});
		set_label.set(String::new());
		set_description.set(String::new());
	};

	view! {
		<section class="panel add-node">
			<h3>"Add node"</h3>
			<input
				placeholder="Label"
				prop:value=move || label.get()
				on:input=move |ev| set_label.set(event_target_value(&ev))
			/>
			<select on:change=move |ev| {
				if let Some(k) = NodeType::parse(&event_target_value(&ev)) {
					set_kind.set(k);
				}
			}>{node_type_options(NodeType::Component)}</select>
			<Show when=grouped>
				<input
					placeholder="Group"
					prop:value=move || group.get()
					on:input=move |ev| set_group.set(event_target_value(&ev))
				/>
			</Show>
			<textarea
				placeholder="Description"
				prop:value=move || description.get()
				on:input=move |ev| set_description.set(event_target_value(&ev))
			/>
			<button on:click=add>"Add"</button>
		</section>
	}
}

/// Export and import of the whole edit record as JSON.
#[component]
pub fn EditsTransfer(session: SessionSignal) -> impl IntoView {
	let (text, set_text) = signal(String::new());
	let (status, set_status) = signal(None::<String>);

	let export = move |_: leptos::ev::MouseEvent| {
		set_text.set(session.with_untracked(|s| s.export_edits()));
		set_status.set(Some("Edits exported".into()));
	};
	let import = move |_: leptos::ev::MouseEvent| {
		let raw = text.get_untracked();
		let outcome = session.try_update(|s| s.import_edits(&raw));
		match outcome {
			Some(Ok(())) => set_status.set(Some("Edits imported".into())),
			Some(Err(err)) => {
				warn!("{err}");
				set_status.set(Some(err.to_string()));
			}
			None => {}
		}
	};

	view! {
		<section class="panel transfer">
			<h3>"Edits"</h3>
			<textarea
				class="edits-json"
				prop:value=move || text.get()
				on:input=move |ev| set_text.set(event_target_value(&ev))
			/>
			<button on:click=export>"Export"</button>
			<button on:click=import>"Import"</button>
			{move || status.get().map(|s| view! { <p class="status">{s}</p> })}
		</section>
	}
}
