//! Deterministic placement of reconciled nodes.
//!
//! Context level is radial around the first node, system level is a fixed
//! grid, and module/file levels pack one sub-grid per group into a macro grid
//! of three groups per row. Output depends only on the inputs.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

use log::debug;

use super::types::{GraphNode, Position, SystemGroupDef, ZoomLevel, is_user_id};

pub const NODE_WIDTH: f64 = 200.0;
pub const NODE_HEIGHT: f64 = 80.0;

const NODE_SPACING_X: f64 = 280.0;
const NODE_SPACING_Y: f64 = 140.0;
const GROUP_PADDING: f64 = 60.0;
const GROUP_HEADER: f64 = 30.0;
const GROUP_GAP: f64 = 80.0;
const GROUPS_PER_ROW: usize = 3;
const GROUP_ORIGIN: f64 = 100.0;

const BOUNDS_MARGIN: f64 = 40.0;
const BOUNDS_LABEL_BAND: f64 = 20.0;

const CONTEXT_CENTER: Position = Position::new(600.0, 400.0);
const CONTEXT_RADIUS: f64 = 350.0;

/// Origin, spacing and column count of a flat row-major grid.
struct Grid {
	origin: f64,
	spacing_x: f64,
	spacing_y: f64,
	cols: usize,
}

impl Grid {
	fn place(&self, index: usize) -> Position {
		let (row, col) = (index / self.cols, index % self.cols);
		Position::new(
			self.origin + col as f64 * self.spacing_x,
			self.origin + row as f64 * self.spacing_y,
		)
	}
}

const SYSTEM_GRID: Grid = Grid {
	origin: 200.0,
	spacing_x: 380.0,
	spacing_y: 280.0,
	cols: 3,
};

const FALLBACK_GRID: Grid = Grid {
	origin: 150.0,
	spacing_x: 340.0,
	spacing_y: 200.0,
	cols: 3,
};

/// Group key for file-level nodes without a parent in the overview.
pub const UNGROUPED_KEY: &str = "__ungrouped__";

const OVERVIEW_COLORS: [&str; 8] = [
	"hsl(220, 70%, 55%)",
	"hsl(280, 60%, 50%)",
	"hsl(150, 50%, 45%)",
	"hsl(35, 65%, 50%)",
	"hsl(350, 60%, 50%)",
	"hsl(180, 50%, 40%)",
	"hsl(100, 45%, 45%)",
	"hsl(260, 50%, 55%)",
];

/// What clusters nodes at module/file level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Grouping {
	#[default]
	ByGroup,
	/// File overview: cluster by containing module.
	ByParent,
}

impl Grouping {
	pub fn key(self, node: &GraphNode) -> Option<&str> {
		match self {
			Grouping::ByGroup => node.group.as_deref(),
			Grouping::ByParent => Some(node.parent_id.as_deref().unwrap_or(UNGROUPED_KEY)),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupDimensions {
	pub width: f64,
	pub height: f64,
	pub cols: usize,
}

pub fn group_dimensions(count: usize) -> GroupDimensions {
	if count == 0 {
		return GroupDimensions {
			width: 0.0,
			height: 0.0,
			cols: 0,
		};
	}
	let cols = if count <= 4 {
		2
	} else {
		((count as f64).sqrt().ceil() as usize).min(4)
	};
	let rows = count.div_ceil(cols);
	GroupDimensions {
		width: cols as f64 * NODE_SPACING_X + GROUP_PADDING * 2.0,
		height: rows as f64 * NODE_SPACING_Y + GROUP_PADDING * 2.0 + GROUP_HEADER,
		cols,
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupOrigin {
	pub x: f64,
	pub y: f64,
	pub cols: usize,
}

/// Packs every group with members into rows of three, in definition order.
pub fn group_origins(member_counts: &HashMap<&str, usize>, groups: &[SystemGroupDef]) -> HashMap<String, GroupOrigin> {
	let mut origins = HashMap::new();
	let mut active: Vec<(&str, GroupDimensions)> = Vec::new();
	for g in groups {
		let count = member_counts.get(g.id.as_str()).copied().unwrap_or(0);
		if count > 0 && !active.iter().any(|(id, _)| *id == g.id) {
			active.push((g.id.as_str(), group_dimensions(count)));
		}
	}

	let mut y = GROUP_ORIGIN;
	for row in active.chunks(GROUPS_PER_ROW) {
		let (mut x, mut row_height) = (GROUP_ORIGIN, 0.0_f64);
		for (id, dims) in row {
			origins.insert(
				(*id).to_owned(),
				GroupOrigin {
					x,
					y,
					cols: dims.cols,
				},
			);
			x += dims.width + GROUP_GAP;
			row_height = row_height.max(dims.height);
		}
		y += row_height + GROUP_GAP;
	}
	origins
}

/// Group definitions for the file overview, one per distinct parent module
/// in node order.
pub fn overview_groups(
	file_nodes: &[GraphNode],
	module_nodes: &[GraphNode],
	system_groups: &[SystemGroupDef],
) -> Vec<SystemGroupDef> {
	let modules: HashMap<&str, &GraphNode> = module_nodes.iter().map(|m| (m.id.as_str(), m)).collect();
	let mut defs: Vec<SystemGroupDef> = Vec::new();
	for node in file_nodes {
		let key = node.parent_id.as_deref().unwrap_or(UNGROUPED_KEY);
		if defs.iter().any(|d| d.id == key) {
			continue;
		}
		let parent = modules.get(key);
		let color = parent
			.and_then(|m| m.group.as_deref())
			.and_then(|g| system_groups.iter().find(|s| s.id == g))
			.map(|s| s.color.clone())
			.unwrap_or_else(|| OVERVIEW_COLORS[defs.len() % OVERVIEW_COLORS.len()].to_owned());
		let label = parent.map_or_else(|| key.to_owned(), |m| m.label.clone());
		defs.push(SystemGroupDef::new(key, label, color));
	}
	defs
}

pub struct LayoutInput<'a> {
	pub level: ZoomLevel,
	pub nodes: &'a [GraphNode],
	pub groups: &'a [SystemGroupDef],
	pub grouping: Grouping,
	/// Positions pinned by dragging; honoured for user-added nodes only.
	pub pinned: &'a BTreeMap<String, Position>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedNode {
	pub id: String,
	pub position: Position,
	/// Cluster key used for placement, if the level is grouped.
	pub group: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupBounds {
	pub group: String,
	pub label: String,
	pub color: String,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
	pub nodes: Vec<PlacedNode>,
	pub groups: Vec<GroupBounds>,
}

impl Layout {
	pub fn position(&self, node_id: &str) -> Option<Position> {
		self.nodes.iter().rev().find(|n| n.id == node_id).map(|n| n.position)
	}
}

fn context_position(index: usize, total: usize) -> Position {
	if index == 0 {
		return CONTEXT_CENTER;
	}
	let orbiting = total - 1;
	let angle = if orbiting == 1 {
		PI / 2.0
	} else {
		(index - 1) as f64 / orbiting as f64 * 2.0 * PI - PI / 2.0
	};
	Position::new(
		CONTEXT_CENTER.x + angle.cos() * CONTEXT_RADIUS,
		CONTEXT_CENTER.y + angle.sin() * CONTEXT_RADIUS,
	)
}

pub fn compute_layout(input: &LayoutInput<'_>) -> Layout {
	let grouped = input.level.is_grouped();
	let keys: Vec<Option<&str>> = input
		.nodes
		.iter()
		.map(|n| if grouped { input.grouping.key(n) } else { None })
		.collect();

	let mut counts: HashMap<&str, usize> = HashMap::new();
	for key in keys.iter().flatten() {
		*counts.entry(*key).or_default() += 1;
	}
	let origins = if grouped {
		group_origins(&counts, input.groups)
	} else {
		HashMap::new()
	};

	let total = input.nodes.len();
	let mut next_slot: HashMap<&str, usize> = HashMap::new();
	let nodes = input
		.nodes
		.iter()
		.zip(&keys)
		.enumerate()
		.map(|(index, (node, key))| {
			let slot = key.map(|k| {
				let slot = next_slot.entry(k).or_default();
				*slot += 1;
				*slot - 1
			});
			let pinned = is_user_id(&node.id)
				.then(|| input.pinned.get(&node.id).copied())
				.flatten();
			let position = pinned.unwrap_or_else(|| match input.level {
				ZoomLevel::Context => context_position(index, total),
				ZoomLevel::System => SYSTEM_GRID.place(index),
				ZoomLevel::Module | ZoomLevel::File => {
					match (key.and_then(|k| origins.get(k)), slot) {
						(Some(origin), Some(slot)) => {
							let (row, col) = (slot / origin.cols, slot % origin.cols);
							Position::new(
								origin.x + GROUP_PADDING + col as f64 * NODE_SPACING_X,
								origin.y + GROUP_PADDING + GROUP_HEADER + row as f64 * NODE_SPACING_Y,
							)
						}
						_ => {
							debug!("{} has no placed group; using fallback grid", node.id);
							FALLBACK_GRID.place(index)
						}
					}
				}
			});
			PlacedNode {
				id: node.id.clone(),
				position,
				group: key.map(str::to_owned),
			}
		})
		.collect::<Vec<_>>();

	let groups = if grouped {
		input
			.groups
			.iter()
			.filter_map(|def| {
				group_bounds(&nodes, &def.id).map(|(x, y, width, height)| GroupBounds {
					group: def.id.clone(),
					label: def.label.clone(),
					color: def.color.clone(),
					x,
					y,
					width,
					height,
				})
			})
			.collect()
	} else {
		Vec::new()
	};

	Layout { nodes, groups }
}

/// `(x, y, width, height)` enclosing every placed member of `group`, or
/// `None` when the group has no members.
pub fn group_bounds(nodes: &[PlacedNode], group: &str) -> Option<(f64, f64, f64, f64)> {
	let mut members = nodes
		.iter()
		.filter(|n| n.group.as_deref() == Some(group))
		.map(|n| n.position);
	let first = members.next()?;
	let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
	for p in members {
		min_x = min_x.min(p.x);
		min_y = min_y.min(p.y);
		max_x = max_x.max(p.x);
		max_y = max_y.max(p.y);
	}
	let (x, y) = (min_x - BOUNDS_MARGIN, min_y - BOUNDS_MARGIN - BOUNDS_LABEL_BAND);
	let (right, bottom) = (
		max_x + NODE_WIDTH + BOUNDS_MARGIN,
		max_y + NODE_HEIGHT + BOUNDS_MARGIN,
	);
	Some((x, y, right - x, bottom - y))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::NodeType;

	fn node(id: &str, level: ZoomLevel) -> GraphNode {
		GraphNode::new(id, id, NodeType::Component, level)
	}

	fn layout(level: ZoomLevel, nodes: &[GraphNode], groups: &[SystemGroupDef]) -> Layout {
		compute_layout(&LayoutInput {
			level,
			nodes,
			groups,
			grouping: Grouping::ByGroup,
			pinned: &BTreeMap::new(),
		})
	}

	fn close(a: Position, b: Position) -> bool {
		(a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
	}

	#[test]
	fn group_grid_widens_with_member_count() {
		assert_eq!(group_dimensions(0).cols, 0);
		assert_eq!(group_dimensions(4).cols, 2);
		assert_eq!(group_dimensions(5).cols, 3);
		assert_eq!(group_dimensions(9).cols, 3);
		assert_eq!(group_dimensions(10).cols, 4);
		assert_eq!(group_dimensions(40).cols, 4);
		let dims = group_dimensions(3);
		assert_eq!(dims.width, 2.0 * 280.0 + 120.0);
		assert_eq!(dims.height, 2.0 * 140.0 + 120.0 + 30.0);
	}

	#[test]
	fn context_orbit_starts_at_top() {
		let nodes: Vec<GraphNode> = (0..5).map(|i| node(&format!("c{i}"), ZoomLevel::Context)).collect();
		let placed = layout(ZoomLevel::Context, &nodes, &[]);
		assert_eq!(placed.nodes[0].position, CONTEXT_CENTER);
		assert!(close(placed.nodes[1].position, Position::new(600.0, 50.0)));
		// quarter turn clockwise with four orbiting nodes
		assert!(close(placed.nodes[2].position, Position::new(950.0, 400.0)));
	}

	#[test]
	fn single_orbiting_node_sits_below_center() {
		let nodes = vec![node("c0", ZoomLevel::Context), node("c1", ZoomLevel::Context)];
		let placed = layout(ZoomLevel::Context, &nodes, &[]);
		assert!(close(placed.nodes[1].position, Position::new(600.0, 750.0)));
	}

	#[test]
	fn system_level_is_three_column_grid() {
		let nodes: Vec<GraphNode> = (0..4).map(|i| node(&format!("s{i}"), ZoomLevel::System)).collect();
		let placed = layout(ZoomLevel::System, &nodes, &[]);
		assert_eq!(placed.nodes[2].position, Position::new(960.0, 200.0));
		assert_eq!(placed.nodes[3].position, Position::new(200.0, 480.0));
		assert!(placed.groups.is_empty());
	}

	#[test]
	fn groups_pack_left_to_right_then_wrap() {
		let groups: Vec<SystemGroupDef> = ["g1", "g2", "g3", "g4"]
			.iter()
			.map(|g| SystemGroupDef::new(*g, *g, "red"))
			.collect();
		let nodes: Vec<GraphNode> = ["g1", "g2", "g3", "g4"]
			.iter()
			.map(|g| node(&format!("n-{g}"), ZoomLevel::Module).with_group(*g))
			.collect();
		let placed = layout(ZoomLevel::Module, &nodes, &groups);

		let width = group_dimensions(1).width;
		let height = group_dimensions(1).height;
		assert_eq!(placed.nodes[0].position, Position::new(160.0, 190.0));
		assert_eq!(placed.nodes[1].position, Position::new(160.0 + width + 80.0, 190.0));
		assert_eq!(placed.nodes[3].position, Position::new(160.0, 190.0 + height + 80.0));
		assert_eq!(placed.groups.len(), 4);
	}

	#[test]
	fn members_fill_group_rows() {
		let groups = vec![SystemGroupDef::new("core", "Core", "blue")];
		let nodes: Vec<GraphNode> = (0..3)
			.map(|i| node(&format!("m{i}"), ZoomLevel::Module).with_group("core"))
			.collect();
		let placed = layout(ZoomLevel::Module, &nodes, &groups);
		assert_eq!(placed.nodes[1].position, Position::new(160.0 + 280.0, 190.0));
		assert_eq!(placed.nodes[2].position, Position::new(160.0, 190.0 + 140.0));

		let bounds = &placed.groups[0];
		assert_eq!((bounds.x, bounds.y), (120.0, 130.0));
		assert_eq!(bounds.width, 280.0 + 200.0 + 80.0);
		assert_eq!(bounds.height, 140.0 + 80.0 + 40.0 + 60.0);
	}

	#[test]
	fn unknown_group_uses_fallback_grid_by_global_index() {
		let groups = vec![SystemGroupDef::new("core", "Core", "blue")];
		let nodes = vec![
			node("a", ZoomLevel::Module).with_group("core"),
			node("b", ZoomLevel::Module).with_group("nowhere"),
			node("c", ZoomLevel::Module),
		];
		let placed = layout(ZoomLevel::Module, &nodes, &groups);
		assert_eq!(placed.nodes[1].position, Position::new(490.0, 150.0));
		assert_eq!(placed.nodes[2].position, Position::new(830.0, 150.0));
		assert_eq!(placed.groups.len(), 1);
	}

	#[test]
	fn pinned_positions_apply_to_user_nodes_only() {
		let groups = vec![SystemGroupDef::new("core", "Core", "blue")];
		let nodes = vec![
			node("a", ZoomLevel::Module).with_group("core"),
			node("user-1", ZoomLevel::Module).with_group("core"),
		];
		let mut pinned = BTreeMap::new();
		pinned.insert("a".to_owned(), Position::new(1.0, 1.0));
		pinned.insert("user-1".to_owned(), Position::new(10.0, 20.0));
		let placed = compute_layout(&LayoutInput {
			level: ZoomLevel::Module,
			nodes: &nodes,
			groups: &groups,
			grouping: Grouping::ByGroup,
			pinned: &pinned,
		});
		assert_eq!(placed.nodes[0].position, Position::new(160.0, 190.0));
		assert_eq!(placed.position("user-1"), Some(Position::new(10.0, 20.0)));
	}

	#[test]
	fn overview_groups_follow_parent_modules() {
		let modules = vec![node("m1", ZoomLevel::Module).with_group("core")];
		let files = vec![
			node("f1", ZoomLevel::File).with_parent("m1"),
			node("f2", ZoomLevel::File),
			node("f3", ZoomLevel::File).with_parent("m1"),
		];
		let systems = vec![SystemGroupDef::new("core", "Core", "teal")];
		let defs = overview_groups(&files, &modules, &systems);
		assert_eq!(defs.len(), 2);
		assert_eq!(defs[0], SystemGroupDef::new("m1", "m1", "teal"));
		assert_eq!(defs[1].id, UNGROUPED_KEY);
		assert_eq!(defs[1].color, OVERVIEW_COLORS[1]);

		let placed = compute_layout(&LayoutInput {
			level: ZoomLevel::File,
			nodes: &files,
			groups: &defs,
			grouping: Grouping::ByParent,
			pinned: &BTreeMap::new(),
		});
		assert_eq!(placed.nodes[2].group.as_deref(), Some("m1"));
		assert_eq!(placed.groups.len(), 2);
	}

	#[test]
	fn empty_group_has_no_bounds() {
		assert_eq!(group_bounds(&[], "core"), None);
	}
}
