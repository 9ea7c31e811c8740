//! Merges pipeline output with the user's [`EditRecord`] for one zoom level.

use std::collections::HashSet;

use log::debug;

use super::edits::{EdgeFieldEdits, EditRecord, NodeFieldEdits};
use super::pipeline::PipelineSource;
use super::types::{GraphEdge, GraphNode, HowItWorks, ZoomLevel};

/// Final node and edge lists for one level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconciledGraph {
	pub level: ZoomLevel,
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl ReconciledGraph {
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
		self.edges.iter().find(|e| e.id == id)
	}
}

pub fn apply_node_edits(node: &mut GraphNode, patch: &NodeFieldEdits) {
	if let Some(label) = &patch.label {
		node.label = label.clone();
	}
	if let Some(kind) = patch.kind {
		node.kind = kind;
	}
	if let Some(description) = &patch.description {
		node.description = description.clone();
	}
	if let Some(group) = &patch.group {
		node.group = Some(group.clone());
	}
	if let Some(purpose) = &patch.purpose {
		node.purpose = Some(purpose.clone());
	}
	if let Some(architecture) = &patch.architecture {
		node.architecture = Some(architecture.clone());
	}
	if let Some(overview) = &patch.how_it_works_overview {
		// only the overview is replaced; the workflow stays
		node.how_it_works.get_or_insert_with(HowItWorks::default).overview = Some(overview.clone());
	}
	if let Some(specs) = &patch.technical_specs {
		node.technical_specs = Some(specs.clone());
	}
	if let Some(decisions) = &patch.key_decisions {
		node.key_decisions = Some(decisions.clone());
	}
}

/// An empty label or protocol in the patch clears the field.
pub fn apply_edge_edits(edge: &mut GraphEdge, patch: &EdgeFieldEdits) {
	if let Some(label) = &patch.label {
		edge.label = (!label.is_empty()).then(|| label.clone());
	}
	if let Some(kind) = patch.kind {
		edge.kind = kind;
	}
	if let Some(mode) = patch.communication_mode {
		edge.communication_mode = Some(mode);
	}
	if let Some(protocol) = &patch.protocol {
		edge.protocol = (!protocol.is_empty()).then(|| protocol.clone());
	}
}

/// Pipeline nodes minus deletions with patches applied, then the user nodes
/// created at `level`, in insertion order.
pub fn merge_nodes(pipeline: &[GraphNode], level: ZoomLevel, edits: &EditRecord) -> Vec<GraphNode> {
	let deleted: HashSet<&str> = edits.deleted_node_ids.iter().map(String::as_str).collect();
	let mut merged: Vec<GraphNode> = pipeline
		.iter()
		.filter(|n| !deleted.contains(n.id.as_str()))
		.map(|n| {
			let mut node = n.clone();
			if let Some(patch) = edits.edited_nodes.get(&n.id) {
				apply_node_edits(&mut node, patch);
			}
			node
		})
		.collect();
	merged.extend(edits.added_nodes.iter().filter(|n| n.level == level).cloned());
	merged
}

/// Pipeline edges minus deletions with patches applied, then every user edge.
///
/// Endpoints are not checked here; see [`reconcile`].
pub fn merge_edges(pipeline: &[GraphEdge], edits: &EditRecord) -> Vec<GraphEdge> {
	let deleted: HashSet<&str> = edits.deleted_edge_ids.iter().map(String::as_str).collect();
	pipeline
		.iter()
		.filter(|e| !deleted.contains(e.id.as_str()))
		.map(|e| {
			let mut edge = e.clone();
			if let Some(patch) = edits.edited_edges.get(&e.id) {
				apply_edge_edits(&mut edge, patch);
			}
			edge
		})
		.chain(edits.added_edges.iter().cloned())
		.collect()
}

/// Builds the graph for `level`. With `file_scope` set at file level only the
/// children of that module are kept. Edges whose endpoints did not survive the
/// node merge are dropped.
pub fn reconcile(
	source: &impl PipelineSource,
	level: ZoomLevel,
	file_scope: Option<&str>,
	edits: &EditRecord,
) -> ReconciledGraph {
	let pipeline_nodes = source.nodes_for_level(level);
	let nodes = match (level, file_scope) {
		(ZoomLevel::File, Some(module_id)) => {
			let scoped: Vec<GraphNode> = pipeline_nodes
				.iter()
				.filter(|n| n.parent_id.as_deref() == Some(module_id))
				.cloned()
				.collect();
			merge_nodes(&scoped, level, edits)
		}
		_ => merge_nodes(pipeline_nodes, level, edits),
	};

	let present: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	let edges = merge_edges(source.edges_for_level(level), edits)
		.into_iter()
		.filter(|e| {
			let resolved = present.contains(e.source.as_str()) && present.contains(e.target.as_str());
			if !resolved {
				debug!("dropping edge {} ({} -> {}): endpoint not on {:?}", e.id, e.source, e.target, level);
			}
			resolved
		})
		.collect();

	ReconciledGraph { level, nodes, edges }
}
