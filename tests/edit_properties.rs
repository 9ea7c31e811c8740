//! Property tests over arbitrary edit histories and graphs.
//!
//! - Round trip: import(export(edits)) restores the same record
//! - Deleting a node twice leaves the record as deleting it once
//! - Focus neighbourhoods only grow with depth
//! - Layout is a pure function of its input

use std::collections::{BTreeMap, HashSet};

use legend_graph::graph::edits::{EdgeFieldEdits, EditStore, NodeFieldEdits};
use legend_graph::graph::focus::n_hop_neighbors;
use legend_graph::graph::layout::{Grouping, LayoutInput, compute_layout};
use legend_graph::graph::session::user_edge;
use legend_graph::graph::storage::MemoryStore;
use legend_graph::graph::types::{EdgeType, GraphEdge, GraphNode, NodeType, Position, SystemGroupDef, ZoomLevel};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
	AddNode { id: String, label: String, level: ZoomLevel },
	DeleteNode(String),
	AddEdge { id: String, source: String, target: String },
	DeleteEdge(String),
	Relabel { id: String, label: String },
	Protocol { id: String, protocol: String },
	Move { id: String, x: i32, y: i32 },
	Note { id: String, note: String },
}

fn node_id() -> impl Strategy<Value = String> {
	prop_oneof!["[A-D]".prop_map(String::from), "[a-d]".prop_map(|s| format!("user-{s}"))]
}

fn edge_id() -> impl Strategy<Value = String> {
	prop_oneof!["e[0-3]".prop_map(String::from), "[0-3]".prop_map(|s| format!("user-edge-{s}"))]
}

fn level() -> impl Strategy<Value = ZoomLevel> {
	prop::sample::select(ZoomLevel::ALL.to_vec())
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		("[a-d]", "[A-Za-z ]{0,10}", level()).prop_map(|(id, label, level)| Op::AddNode {
			id: format!("user-{id}"),
			label,
			level,
		}),
		node_id().prop_map(Op::DeleteNode),
		("[0-3]", node_id(), node_id()).prop_map(|(id, source, target)| Op::AddEdge {
			id: format!("user-edge-{id}"),
			source,
			target,
		}),
		edge_id().prop_map(Op::DeleteEdge),
		(node_id(), "[A-Za-z]{1,8}").prop_map(|(id, label)| Op::Relabel { id, label }),
		(edge_id(), "(grpc|http|kafka)").prop_map(|(id, protocol)| Op::Protocol { id, protocol }),
		(node_id(), -2000i32..2000, -2000i32..2000).prop_map(|(id, x, y)| Op::Move { id, x, y }),
		(node_id(), "[a-z ]{0,12}").prop_map(|(id, note)| Op::Note { id, note }),
	]
}

fn apply(store: &mut EditStore<MemoryStore>, op: Op) {
	match op {
		Op::AddNode { id, label, level } => {
			let node = GraphNode::new(id, label, NodeType::Component, level);
			store.add_node(node, Position::new(0.0, 0.0));
		}
		Op::DeleteNode(id) => store.delete_node(&id),
		Op::AddEdge { id, source, target } => {
			store.add_edge(user_edge(id, &source, &target, EdgeType::DependsOn, "uses"));
		}
		Op::DeleteEdge(id) => store.delete_edge(&id),
		Op::Relabel { id, label } => store.edit_node(
			&id,
			NodeFieldEdits {
				label: Some(label),
				..Default::default()
			},
		),
		Op::Protocol { id, protocol } => store.edit_edge(
			&id,
			EdgeFieldEdits {
				protocol: Some(protocol),
				..Default::default()
			},
		),
		Op::Move { id, x, y } => store.update_node_position(&id, Position::new(x as f64, y as f64)),
		Op::Note { id, note } => store.set_node_note(&id, &note),
	}
}

fn history(ops: Vec<Op>) -> EditStore<MemoryStore> {
	let mut store = EditStore::open(Some("prop"), MemoryStore::new());
	for op in ops {
		apply(&mut store, op);
	}
	store
}

proptest! {
	#[test]
	fn export_then_import_restores_the_record(ops in prop::collection::vec(op(), 0..24)) {
		let store = history(ops);
		let exported = store.export_edits();

		let mut fresh = EditStore::open(Some("other"), MemoryStore::new());
		prop_assert!(fresh.import_edits(&exported).is_ok());
		prop_assert_eq!(fresh.record(), store.record());
	}

	#[test]
	fn deleting_twice_equals_deleting_once(
		ops in prop::collection::vec(op(), 0..24),
		target in node_id(),
	) {
		let mut store = history(ops);
		store.delete_node(&target);
		let once = store.record().clone();
		store.delete_node(&target);
		prop_assert_eq!(store.record(), &once);
	}

	#[test]
	fn deeper_focus_never_loses_members(
		pairs in prop::collection::vec((0u8..8, 0u8..8), 0..20),
		selected in 0u8..8,
		d1 in 1usize..=3,
		d2 in 1usize..=3,
	) {
		prop_assume!(d1 < d2);
		let edges: Vec<GraphEdge> = pairs
			.iter()
			.enumerate()
			.map(|(i, (s, t))| GraphEdge::new(format!("e{i}"), format!("n{s}"), format!("n{t}"), EdgeType::DependsOn))
			.collect();
		let selected = format!("n{selected}");
		let near = n_hop_neighbors(&selected, &edges, d1);
		let far = n_hop_neighbors(&selected, &edges, d2);
		prop_assert!(near.contains(&selected));
		prop_assert!(near.is_subset(&far));
	}

	#[test]
	fn layout_is_deterministic(
		specs in prop::collection::vec((prop::option::of(0usize..4), any::<bool>()), 0..30),
		level in level(),
		pins in prop::collection::btree_map(0usize..30, (-500i32..500, -500i32..500), 0..5),
	) {
		let nodes: Vec<GraphNode> = specs
			.iter()
			.enumerate()
			.map(|(i, (group, user))| {
				let id = if *user { format!("user-{i}") } else { format!("n{i}") };
				let mut node = GraphNode::new(id, format!("Node {i}"), NodeType::Component, level);
				node.group = group.map(|g| format!("g{g}"));
				node
			})
			.collect();
		let groups = vec![
			SystemGroupDef::new("g0", "Zero", "#111111"),
			SystemGroupDef::new("g1", "One", "#222222"),
			SystemGroupDef::new("g2", "Two", "#333333"),
		];
		let pinned: BTreeMap<String, Position> = pins
			.into_iter()
			.filter_map(|(i, (x, y))| nodes.get(i).map(|n| (n.id.clone(), Position::new(x as f64, y as f64))))
			.collect();
		let input = LayoutInput {
			level,
			nodes: &nodes,
			groups: &groups,
			grouping: Grouping::ByGroup,
			pinned: &pinned,
		};

		let first = compute_layout(&input);
		let second = compute_layout(&input);
		prop_assert_eq!(first.nodes.len(), nodes.len());
		let bits = |l: &legend_graph::graph::layout::Layout| -> Vec<(String, u64, u64)> {
			l.nodes
				.iter()
				.map(|p| (p.id.clone(), p.position.x.to_bits(), p.position.y.to_bits()))
				.collect()
		};
		prop_assert_eq!(bits(&first), bits(&second));
		prop_assert_eq!(first.groups, second.groups);

		let ids: HashSet<&str> = first.nodes.iter().map(|p| p.id.as_str()).collect();
		prop_assert_eq!(ids.len(), nodes.len());
	}
}
