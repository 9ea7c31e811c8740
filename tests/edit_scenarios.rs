use legend_graph::graph::edits::{EdgeFieldEdits, EditStore, NodeField, NodeFieldEdits, storage_key};
use legend_graph::graph::focus::{DisplayMode, n_hop_neighbors};
use legend_graph::graph::pipeline::GeneratedRepoData;
use legend_graph::graph::reconcile::{merge_edges, merge_nodes, reconcile};
use legend_graph::graph::session::{EditIntent, GraphSession, user_edge};
use legend_graph::graph::storage::{KeyValueStore, MemoryStore};
use legend_graph::graph::types::{
	CommunicationMode, EdgeType, GraphEdge, GraphNode, HowItWorks, NodeType, Position, SystemGroupDef, TechnicalSpec,
	WorkflowStep, ZoomLevel,
};

fn module(id: &str, group: &str) -> GraphNode {
	GraphNode::new(id, id, NodeType::Component, ZoomLevel::Module).with_group(group)
}

fn repo() -> GeneratedRepoData {
	GeneratedRepoData {
		system_groups: vec![
			SystemGroupDef::new("core", "Core", "#3b82f6"),
			SystemGroupDef::new("infra", "Infra", "#10b981"),
		],
		module_nodes: vec![module("A", "core"), module("B", "core"), module("C", "infra")],
		module_edges: vec![GraphEdge::new("a-b", "A", "B", EdgeType::DependsOn).with_label("fetch")],
		file_nodes: vec![
			GraphNode::new("a.rs", "a.rs", NodeType::Utility, ZoomLevel::File).with_parent("A"),
			GraphNode::new("b.rs", "b.rs", NodeType::Utility, ZoomLevel::File).with_parent("B"),
		],
		file_edges: vec![GraphEdge::new("f1", "a.rs", "b.rs", EdgeType::Dependency)],
		..Default::default()
	}
}

fn ids(nodes: &[GraphNode]) -> Vec<&str> {
	nodes.iter().map(|n| n.id.as_str()).collect()
}

#[test]
fn added_node_survives_deleting_a_pipeline_node() {
	let data = repo();
	let mut store = EditStore::open(Some("R"), MemoryStore::new());
	store.add_node(
		GraphNode::new("user-1", "New", NodeType::Component, ZoomLevel::Module).with_group("core"),
		Position::new(10.0, 20.0),
	);
	store.delete_node("A");

	let graph = reconcile(&data, ZoomLevel::Module, None, store.record());
	assert_eq!(ids(&graph.nodes), ["B", "C", "user-1"]);
	assert!(graph.edges.is_empty());
	assert_eq!(store.node_position("user-1"), Some(Position::new(10.0, 20.0)));

	// the raw edge merge still carries the pipeline edge
	assert_eq!(merge_edges(&data.module_edges, store.record()).len(), 1);
}

#[test]
fn edits_persist_across_reopen() {
	let mut store = EditStore::open(Some("R"), MemoryStore::new());
	store.delete_node("A");
	store.set_node_note("B", "check ownership");
	assert!(store.storage().get(&storage_key("R")).is_some());

	let reopened = EditStore::open(Some("R"), store.storage().clone());
	assert_eq!(reopened.record(), store.record());
	assert_eq!(reopened.node_note("B"), "check ownership");

	let other = EditStore::open(Some("S"), store.storage().clone());
	assert!(other.record().is_empty());
}

#[test]
fn edge_patch_keeps_untouched_fields() {
	let data = repo();
	let mut store = EditStore::open(Some("R"), MemoryStore::new());
	store.edit_edge(
		"a-b",
		EdgeFieldEdits {
			protocol: Some("grpc".into()),
			..Default::default()
		},
	);

	let graph = reconcile(&data, ZoomLevel::Module, None, store.record());
	let edge = graph.edge("a-b").expect("edge kept");
	assert_eq!(edge.label.as_deref(), Some("fetch"));
	assert_eq!(edge.protocol.as_deref(), Some("grpc"));
}

#[test]
fn label_patch_changes_only_the_label() {
	let mut original = module("A", "core").with_description("Entry point");
	original.purpose = Some("Routes requests".into());
	original.key_decisions = Some(vec!["Keep it small".into()]);

	let mut store = EditStore::open(Some("R"), MemoryStore::new());
	store.edit_node(
		"A",
		NodeFieldEdits {
			label: Some("X".into()),
			..Default::default()
		},
	);

	let merged = merge_nodes(std::slice::from_ref(&original), ZoomLevel::Module, store.record());
	let expected = GraphNode {
		label: "X".into(),
		..original
	};
	assert_eq!(merged, [expected]);
}

#[test]
fn field_edits_replace_lists_and_only_the_overview() {
	let mut data = repo();
	let a = &mut data.module_nodes[0];
	a.purpose = Some("Routes requests".into());
	a.how_it_works = Some(HowItWorks {
		overview: Some("old overview".into()),
		workflow: vec![WorkflowStep {
			step: 1,
			description: "accept".into(),
		}],
	});
	a.technical_specs = Some(vec![
		TechnicalSpec {
			title: "Runtime".into(),
			details: "tokio".into(),
		},
		TechnicalSpec {
			title: "Storage".into(),
			details: "sqlite".into(),
		},
	]);
	a.key_decisions = Some(vec!["One".into(), "Two".into()]);

	let mut store = EditStore::open(Some("R"), MemoryStore::new());
	store.edit_node_field("A", NodeField::technical_specs_from_text("Transport: grpc"));
	store.edit_node_field("A", NodeField::HowItWorksOverview("new overview".into()));
	store.edit_node_field("A", NodeField::key_decisions_from_text("Only"));
	store.edit_node_field("A", NodeField::Group("infra".into()));
	store.edit_node_field("A", NodeField::Architecture("layered".into()));

	let graph = reconcile(&data, ZoomLevel::Module, None, store.record());
	let node = graph.node("A").expect("node kept");
	assert_eq!(
		node.technical_specs.as_deref(),
		Some(
			&[TechnicalSpec {
				title: "Transport".into(),
				details: "grpc".into(),
			}][..]
		)
	);
	let how = node.how_it_works.as_ref().expect("how it works kept");
	assert_eq!(how.overview.as_deref(), Some("new overview"));
	assert_eq!(how.workflow.len(), 1);
	assert_eq!(how.workflow[0].description, "accept");
	assert_eq!(node.key_decisions.as_deref(), Some(&["Only".to_owned()][..]));
	assert_eq!(node.group.as_deref(), Some("infra"));
	assert_eq!(node.architecture.as_deref(), Some("layered"));
	assert_eq!(node.purpose.as_deref(), Some("Routes requests"));
	assert_eq!(node.label, "A");
}

#[test]
fn edge_edit_covers_type_mode_and_protocol() {
	let data = repo();
	let mut store = EditStore::open(Some("R"), MemoryStore::new());
	store.edit_edge(
		"a-b",
		EdgeFieldEdits {
			label: Some("stream".into()),
			kind: Some(EdgeType::IntegratesWith),
			communication_mode: Some(CommunicationMode::Async),
			protocol: Some("kafka".into()),
		},
	);

	let graph = reconcile(&data, ZoomLevel::Module, None, store.record());
	let edge = graph.edge("a-b").expect("edge kept");
	assert_eq!(edge.label.as_deref(), Some("stream"));
	assert_eq!(edge.kind, EdgeType::IntegratesWith);
	assert_eq!(edge.communication_mode, Some(CommunicationMode::Async));
	assert_eq!(edge.protocol.as_deref(), Some("kafka"));
	assert_eq!((edge.source.as_str(), edge.target.as_str()), ("A", "B"));
}

#[test]
fn neighbourhood_stops_at_depth() {
	let edges = [
		GraphEdge::new("1", "X", "Y", EdgeType::DependsOn),
		GraphEdge::new("2", "Y", "Z", EdgeType::DependsOn),
		GraphEdge::new("3", "Z", "W", EdgeType::DependsOn),
	];
	let found = n_hop_neighbors("X", &edges, 2);
	let mut found: Vec<&str> = found.iter().map(String::as_str).collect();
	found.sort_unstable();
	assert_eq!(found, ["X", "Y", "Z"]);
}

#[test]
fn deleting_a_node_cascades_user_edges_on_every_level() {
	let data = repo();
	let mut store = EditStore::open(Some("R"), MemoryStore::new());
	store.add_edge(user_edge("user-edge-1".into(), "A", "C", EdgeType::DependsOn, ""));
	store.add_edge(user_edge("user-edge-2".into(), "B", "C", EdgeType::DependsOn, "calls"));
	store.add_edge(user_edge("user-edge-3".into(), "a.rs", "A", EdgeType::DependsOn, ""));
	store.delete_node("A");

	for level in ZoomLevel::ALL {
		let graph = reconcile(&data, level, None, store.record());
		assert!(graph.edges.iter().all(|e| !e.touches("A")), "{level:?}");
		assert!(graph.node("A").is_none());
	}
	let remaining: Vec<&str> = store.record().added_edges.iter().map(|e| e.id.as_str()).collect();
	assert_eq!(remaining, ["user-edge-2"]);
}

#[test]
fn session_drives_the_whole_pipeline() {
	let mut session = GraphSession::open("R", repo(), MemoryStore::new(), ZoomLevel::Module);
	assert_eq!(session.scene().nodes.len(), 3);

	session.dispatch(EditIntent::AddNode {
		node: GraphNode::new("user-1", "New", NodeType::Api, ZoomLevel::Module).with_group("core"),
		position: Position::new(10.0, 20.0),
	});
	session.select(Some("A".into()));
	session.focus_mut().enabled = true;
	session.focus_mut().display_mode = DisplayMode::Hide;

	let scene = session.scene();
	let visible: Vec<&str> = scene.nodes.iter().map(|n| n.id.as_str()).collect();
	assert_eq!(visible, ["A", "B"]);

	session.dispatch(EditIntent::DeleteNode("A".into()));
	assert_eq!(session.selected(), None);
	let scene = session.scene();
	assert_eq!(scene.nodes.len(), 3);
	assert_eq!(scene.node("user-1").map(|n| n.position), Some(Position::new(10.0, 20.0)));
	assert!(scene.edges.is_empty());
}

#[test]
fn drilling_into_a_module_scopes_the_file_level() {
	let mut session = GraphSession::open("R", repo(), MemoryStore::new(), ZoomLevel::Module);
	assert!(!session.open_module("C"));
	assert!(session.open_module("A"));
	assert_eq!(session.level(), ZoomLevel::File);
	assert_eq!(session.title(), "Files: A");

	let graph = session.reconciled();
	assert_eq!(ids(&graph.nodes), ["a.rs"]);
	assert!(graph.edges.is_empty());

	session.back_to_modules();
	assert_eq!(session.file_scope(), None);
	assert_eq!(session.level(), ZoomLevel::Module);
}

#[test]
fn rejected_import_leaves_edits_alone() {
	let mut session = GraphSession::open("R", repo(), MemoryStore::new(), ZoomLevel::Module);
	session.dispatch(EditIntent::DeleteNode("B".into()));
	let before = session.export_edits();

	assert!(session.import_edits("not json").is_err());
	assert!(session.import_edits(r#"{"addedNodes": []}"#).is_err());
	assert_eq!(session.export_edits(), before);

	session
		.import_edits(r#"{"addedNodes": [], "deletedNodeIds": ["C"]}"#)
		.expect("valid payload");
	assert_eq!(session.edits().record().deleted_node_ids, ["C"]);
	assert!(session.reconciled().node("B").is_some());
}
