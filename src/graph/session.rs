//! The open repository: data, edits and view state, turned into a [`Scene`].

use std::collections::HashMap;

use log::{debug, info};

use super::edits::{EdgeFieldEdits, EditStore, ImportError, NodeField, NodeFieldEdits};
use super::filters::EdgeFilters;
use super::focus::{FocusState, FocusView, Visibility};
use super::layout::{GroupBounds, Grouping, Layout, LayoutInput, PlacedNode, compute_layout, group_bounds, overview_groups};
use super::pipeline::{GeneratedRepoData, PipelineSource};
use super::reconcile::{ReconciledGraph, merge_nodes, reconcile};
use super::storage::KeyValueStore;
use super::style::{EdgeEmphasis, EdgeStyle, NodeStyle, edge_display_label, edge_style, node_style};
use super::types::{
	EdgeType, GraphEdge, GraphNode, NodeType, Position, SystemGroupDef, USER_EDGE_ID_PREFIX, USER_ID_PREFIX,
	ZoomLevel,
};

/// A mutation requested by the surrounding UI.
#[derive(Clone, Debug, PartialEq)]
pub enum EditIntent {
	AddNode { node: GraphNode, position: Position },
	DeleteNode(String),
	AddEdge(GraphEdge),
	DeleteEdge(String),
	EditNode { id: String, patch: NodeFieldEdits },
	EditNodeField { id: String, field: NodeField },
	EditEdge { id: String, patch: EdgeFieldEdits },
	UpdateNodePosition { id: String, position: Position },
	SetNodeNote { id: String, note: String },
}

/// `<prefix><millis>-<5 base36 chars>`; `entropy` is a uniform sample in [0, 1).
pub fn mint_id(prefix: &str, millis: u64, entropy: f64) -> String {
	const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
	let mut n = (entropy.clamp(0.0, 1.0) * 36f64.powi(5)) as u64 % 36u64.pow(5);
	let mut suffix = [b'0'; 5];
	for slot in suffix.iter_mut().rev() {
		*slot = DIGITS[(n % 36) as usize];
		n /= 36;
	}
	format!("{prefix}{millis}-{}", String::from_utf8_lossy(&suffix))
}

pub fn mint_node_id(millis: u64, entropy: f64) -> String {
	mint_id(USER_ID_PREFIX, millis, entropy)
}

pub fn mint_edge_id(millis: u64, entropy: f64) -> String {
	mint_id(USER_EDGE_ID_PREFIX, millis, entropy)
}

/// Form contents for a new node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeDraft {
	pub label: String,
	pub kind: NodeType,
	pub description: String,
	pub group: String,
}

impl NodeDraft {
	/// `None` when the label is blank.
	pub fn into_node(self, id: String, level: ZoomLevel) -> Option<GraphNode> {
		let label = self.label.trim();
		if label.is_empty() {
			return None;
		}
		let description = match self.description.trim() {
			"" => format!("User-created {}", self.kind.as_str()),
			d => d.to_owned(),
		};
		let mut node = GraphNode::new(id, label, self.kind, level).with_description(description);
		node.stats = "User added".into();
		let group = self.group.trim();
		if level.is_grouped() && !group.is_empty() {
			node.group = Some(group.to_owned());
		}
		Some(node)
	}
}

/// User edges start unverified.
pub fn user_edge(id: String, source: &str, target: &str, kind: EdgeType, label: &str) -> GraphEdge {
	let mut edge = GraphEdge::new(id, source, target, kind);
	edge.verified = false;
	let label = label.trim();
	if !label.is_empty() {
		edge.label = Some(label.to_owned());
	}
	edge
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	pub id: String,
	pub label: String,
	pub kind: NodeType,
	pub position: Position,
	pub style: NodeStyle,
	pub group: Option<String>,
	pub highlighted: bool,
	pub dimmed: bool,
	pub has_problem: bool,
	pub user_added: bool,
	pub user_edited: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	pub from: Position,
	pub to: Position,
	pub style: EdgeStyle,
	/// Only set when the label should be drawn.
	pub label: Option<String>,
	pub highlighted: bool,
	pub dimmed: bool,
	pub user_edited: bool,
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub level: ZoomLevel,
	pub nodes: Vec<SceneNode>,
	pub edges: Vec<SceneEdge>,
	pub groups: Vec<GroupBounds>,
}

impl Scene {
	pub fn node(&self, id: &str) -> Option<&SceneNode> {
		self.nodes.iter().rev().find(|n| n.id == id)
	}
}

/// One open repository and the view state layered over it.
#[derive(Clone, Debug)]
pub struct GraphSession<S> {
	repo_id: String,
	data: GeneratedRepoData,
	edits: EditStore<S>,
	level: ZoomLevel,
	file_scope: Option<String>,
	selected: Option<String>,
	focus: FocusState,
	filters: EdgeFilters,
	search: String,
}

impl<S: KeyValueStore> GraphSession<S> {
	pub fn open(repo_id: &str, data: GeneratedRepoData, storage: S, level: ZoomLevel) -> Self {
		info!("opening repository {repo_id} at {} level", level.as_str());
		Self {
			repo_id: repo_id.to_owned(),
			edits: EditStore::open(Some(repo_id), storage),
			data,
			level,
			file_scope: None,
			selected: None,
			focus: FocusState::default(),
			filters: EdgeFilters::default(),
			search: String::new(),
		}
	}

	pub fn repo_id(&self) -> &str {
		&self.repo_id
	}

	pub fn data(&self) -> &GeneratedRepoData {
		&self.data
	}

	pub fn edits(&self) -> &EditStore<S> {
		&self.edits
	}

	pub fn level(&self) -> ZoomLevel {
		self.level
	}

	pub fn file_scope(&self) -> Option<&str> {
		self.file_scope.as_deref()
	}

	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	pub fn focus(&self) -> FocusState {
		self.focus
	}

	pub fn focus_mut(&mut self) -> &mut FocusState {
		&mut self.focus
	}

	pub fn filters(&self) -> EdgeFilters {
		self.filters
	}

	pub fn filters_mut(&mut self) -> &mut EdgeFilters {
		&mut self.filters
	}

	pub fn search(&self) -> &str {
		&self.search
	}

	pub fn set_search(&mut self, query: &str) {
		self.search = query.to_owned();
	}

	pub fn set_level(&mut self, level: ZoomLevel) {
		self.level = level;
		self.selected = None;
		if level != ZoomLevel::File {
			self.file_scope = None;
		}
	}

	/// Drills from a module into its files. Returns false when the node is not
	/// a module with file children.
	pub fn open_module(&mut self, module_id: &str) -> bool {
		if self.level != ZoomLevel::Module || !self.data.has_file_children(module_id) {
			return false;
		}
		debug!("drilling into {module_id}");
		self.level = ZoomLevel::File;
		self.file_scope = Some(module_id.to_owned());
		self.selected = None;
		true
	}

	pub fn back_to_modules(&mut self) {
		self.set_level(ZoomLevel::Module);
	}

	pub fn select(&mut self, node_id: Option<String>) {
		self.selected = node_id;
	}

	pub fn selected_node(&self) -> Option<GraphNode> {
		let id = self.selected.as_deref()?;
		self.reconciled().node(id).cloned()
	}

	pub fn title(&self) -> String {
		match (self.level, self.file_scope.as_deref()) {
			(ZoomLevel::File, Some(module_id)) => self
				.data
				.nodes_for_level(ZoomLevel::Module)
				.iter()
				.find(|n| n.id == module_id)
				.map_or_else(|| ZoomLevel::File.title().to_owned(), |m| format!("Files: {}", m.label)),
			(level, _) => level.title().to_owned(),
		}
	}

	pub fn dispatch(&mut self, intent: EditIntent) {
		debug!("edit intent: {intent:?}");
		match intent {
			EditIntent::AddNode { node, position } => self.edits.add_node(node, position),
			EditIntent::DeleteNode(id) => {
				if self.selected.as_deref() == Some(id.as_str()) {
					self.selected = None;
				}
				self.edits.delete_node(&id);
			}
			EditIntent::AddEdge(edge) => self.edits.add_edge(edge),
			EditIntent::DeleteEdge(id) => self.edits.delete_edge(&id),
			EditIntent::EditNode { id, patch } => self.edits.edit_node(&id, patch),
			EditIntent::EditNodeField { id, field } => self.edits.edit_node_field(&id, field),
			EditIntent::EditEdge { id, patch } => self.edits.edit_edge(&id, patch),
			EditIntent::UpdateNodePosition { id, position } => self.edits.update_node_position(&id, position),
			EditIntent::SetNodeNote { id, note } => self.edits.set_node_note(&id, &note),
		}
	}

	pub fn export_edits(&self) -> String {
		self.edits.export_edits()
	}

	pub fn import_edits(&mut self, raw: &str) -> Result<(), ImportError> {
		self.edits.import_edits(raw)?;
		self.selected = None;
		Ok(())
	}

	pub fn reconciled(&self) -> ReconciledGraph {
		reconcile(&self.data, self.level, self.file_scope.as_deref(), self.edits.record())
	}

	fn layout(&self, graph: &ReconciledGraph) -> Layout {
		let overview: Vec<SystemGroupDef>;
		let (groups, grouping) = match (self.level, self.file_scope.as_deref()) {
			(ZoomLevel::File, None) => {
				let modules = merge_nodes(
					self.data.nodes_for_level(ZoomLevel::Module),
					ZoomLevel::Module,
					self.edits.record(),
				);
				overview = overview_groups(&graph.nodes, &modules, self.data.system_groups());
				(overview.as_slice(), Grouping::ByParent)
			}
			_ => (self.data.system_groups(), Grouping::ByGroup),
		};
		compute_layout(&LayoutInput {
			level: self.level,
			nodes: &graph.nodes,
			groups,
			grouping,
			pinned: &self.edits.record().node_positions,
		})
	}

	pub fn scene(&self) -> Scene {
		let graph = self.reconciled();
		let layout = self.layout(&graph);
		let focus = FocusView::new(&self.focus, self.selected.as_deref(), &graph.edges);
		let query = self.search.trim().to_lowercase();
		let matches = |n: &GraphNode| query.is_empty() || n.label.to_lowercase().contains(&query);
		let selected = self.selected.as_deref();

		let mut nodes = Vec::with_capacity(graph.nodes.len());
		let mut visible: Vec<PlacedNode> = Vec::with_capacity(graph.nodes.len());
		for (node, placed) in graph.nodes.iter().zip(layout.nodes) {
			let visibility = focus.node(&node.id);
			if visibility == Visibility::Hidden {
				continue;
			}
			nodes.push(SceneNode {
				id: node.id.clone(),
				label: node.label.clone(),
				kind: node.kind,
				position: placed.position,
				style: node_style(node.kind),
				group: placed.group.clone(),
				highlighted: selected == Some(node.id.as_str()),
				dimmed: !matches(node) || visibility == Visibility::Dimmed,
				has_problem: node.has_problem,
				user_added: self.edits.is_node_user_added(&node.id),
				user_edited: self.edits.is_node_edited(&node.id),
			});
			visible.push(placed);
		}

		// later duplicates win
		let positions: HashMap<&str, Position> = nodes.iter().map(|n| (n.id.as_str(), n.position)).collect();
		let by_id: HashMap<&str, &GraphNode> = graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
		let edges = graph
			.edges
			.iter()
			.filter(|e| self.filters.admits(e, self.level))
			.filter_map(|e| {
				let visibility = focus.edge(e);
				if visibility == Visibility::Hidden {
					return None;
				}
				let (from, to) = (*positions.get(e.source.as_str())?, *positions.get(e.target.as_str())?);
				let search_dimmed = !query.is_empty()
					&& ![&e.source, &e.target]
						.iter()
						.any(|id| by_id.get(id.as_str()).is_some_and(|&n| matches(n)));
				let highlighted = selected.is_some_and(|id| e.touches(id));
				let dimmed = search_dimmed || visibility == Visibility::Dimmed;
				let user_edited = self.edits.is_edge_edited(&e.id);
				let emphasis = EdgeEmphasis {
					highlighted,
					dimmed,
					user_edited,
				};
				Some(SceneEdge {
					id: e.id.clone(),
					source: e.source.clone(),
					target: e.target.clone(),
					from,
					to,
					style: edge_style(e, emphasis),
					label: edge_display_label(e).filter(|_| !dimmed && (highlighted || e.is_circular)),
					highlighted,
					dimmed,
					user_edited,
				})
			})
			.collect();

		let groups = layout
			.groups
			.into_iter()
			.filter_map(|b| {
				let (x, y, width, height) = group_bounds(&visible, &b.group)?;
				Some(GroupBounds {
					x,
					y,
					width,
					height,
					..b
				})
			})
			.collect();

		Scene {
			level: self.level,
			nodes,
			edges,
			groups,
		}
	}
}
