//! Focus mode: n-hop neighbourhoods around the selected node.

use std::collections::{HashMap, HashSet};

use super::types::GraphEdge;

pub const MIN_DEPTH: u8 = 1;
pub const MAX_DEPTH: u8 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayMode {
	/// Non-members stay on screen at reduced opacity.
	#[default]
	Dim,
	/// Non-members and any edge touching one are dropped.
	Hide,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusState {
	pub enabled: bool,
	pub display_mode: DisplayMode,
	depth: u8,
}

impl Default for FocusState {
	fn default() -> Self {
		Self {
			enabled: false,
			display_mode: DisplayMode::Dim,
			depth: MIN_DEPTH,
		}
	}
}

impl FocusState {
	pub fn depth(&self) -> u8 {
		self.depth
	}

	pub fn set_depth(&mut self, depth: u8) {
		self.depth = depth.clamp(MIN_DEPTH, MAX_DEPTH);
	}
}

/// Ids reachable from `selected` within `depth` undirected hops, `selected`
/// included. An id that touches no edge yields just itself.
pub fn n_hop_neighbors(selected: &str, edges: &[GraphEdge], depth: usize) -> HashSet<String> {
	let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
	for e in edges {
		adjacency.entry(e.source.as_str()).or_default().push(e.target.as_str());
		adjacency.entry(e.target.as_str()).or_default().push(e.source.as_str());
	}

	let mut visited: HashSet<&str> = HashSet::from([selected]);
	let mut frontier: Vec<&str> = vec![selected];
	for _ in 0..depth {
		let mut next = Vec::new();
		for id in &frontier {
			for &neighbor in adjacency.get(id).into_iter().flatten() {
				if visited.insert(neighbor) {
					next.push(neighbor);
				}
			}
		}
		if next.is_empty() {
			break;
		}
		frontier = next;
	}
	visited.into_iter().map(str::to_owned).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
	Normal,
	Dimmed,
	Hidden,
}

/// Resolved focus for one render pass. Inactive when focus is off or nothing
/// is selected.
#[derive(Clone, Debug, Default)]
pub struct FocusView {
	members: Option<HashSet<String>>,
	mode: DisplayMode,
}

impl FocusView {
	pub fn new(state: &FocusState, selected: Option<&str>, edges: &[GraphEdge]) -> Self {
		let members = match selected {
			Some(id) if state.enabled => Some(n_hop_neighbors(id, edges, state.depth as usize)),
			_ => None,
		};
		Self {
			members,
			mode: state.display_mode,
		}
	}

	pub fn is_active(&self) -> bool {
		self.members.is_some()
	}

	pub fn contains(&self, node_id: &str) -> bool {
		self.members.as_ref().is_none_or(|m| m.contains(node_id))
	}

	fn outside(&self) -> Visibility {
		match self.mode {
			DisplayMode::Dim => Visibility::Dimmed,
			DisplayMode::Hide => Visibility::Hidden,
		}
	}

	pub fn node(&self, node_id: &str) -> Visibility {
		if self.contains(node_id) {
			Visibility::Normal
		} else {
			self.outside()
		}
	}

	/// An edge stays normal only when both endpoints are members.
	pub fn edge(&self, edge: &GraphEdge) -> Visibility {
		if self.contains(&edge.source) && self.contains(&edge.target) {
			Visibility::Normal
		} else {
			self.outside()
		}
	}
}
