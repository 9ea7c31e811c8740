//! Read-only pipeline data: one payload per repository, four levels each.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{GraphEdge, GraphNode, Repository, SystemGroupDef, ZoomLevel};

/// Provider of pipeline-generated nodes and edges for one repository.
pub trait PipelineSource {
	fn nodes_for_level(&self, level: ZoomLevel) -> &[GraphNode];
	fn edges_for_level(&self, level: ZoomLevel) -> &[GraphEdge];
	fn system_groups(&self) -> &[SystemGroupDef];
}

/// Shape of `/generated/<repoId>.json`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratedRepoData {
	pub repository: Repository,
	pub system_groups: Vec<SystemGroupDef>,
	pub context_nodes: Vec<GraphNode>,
	pub context_edges: Vec<GraphEdge>,
	pub system_nodes: Vec<GraphNode>,
	pub system_edges: Vec<GraphEdge>,
	pub module_nodes: Vec<GraphNode>,
	pub module_edges: Vec<GraphEdge>,
	pub file_nodes: Vec<GraphNode>,
	pub file_edges: Vec<GraphEdge>,
}

impl GeneratedRepoData {
	/// Whether any file-level node lives under `module_id`.
	pub fn has_file_children(&self, module_id: &str) -> bool {
		self.file_nodes.iter().any(|n| n.parent_id.as_deref() == Some(module_id))
	}
}

impl PipelineSource for GeneratedRepoData {
	fn nodes_for_level(&self, level: ZoomLevel) -> &[GraphNode] {
		match level {
			ZoomLevel::Context => &self.context_nodes,
			ZoomLevel::System => &self.system_nodes,
			ZoomLevel::Module => &self.module_nodes,
			ZoomLevel::File => &self.file_nodes,
		}
	}

	fn edges_for_level(&self, level: ZoomLevel) -> &[GraphEdge] {
		match level {
			ZoomLevel::Context => &self.context_edges,
			ZoomLevel::System => &self.system_edges,
			ZoomLevel::Module => &self.module_edges,
			ZoomLevel::File => &self.file_edges,
		}
	}

	fn system_groups(&self) -> &[SystemGroupDef] {
		&self.system_groups
	}
}

/// Loaded repositories keyed by id, plus the manifest of what can be loaded.
///
/// Owned by the app root and handed to pages; there is no global cache.
#[derive(Clone, Debug, Default)]
pub struct RepoCatalog {
	manifest: Option<Vec<String>>,
	repos: HashMap<String, GeneratedRepoData>,
}

impl RepoCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn manifest(&self) -> Option<&[String]> {
		self.manifest.as_deref()
	}

	pub fn set_manifest(&mut self, ids: Vec<String>) {
		self.manifest = Some(ids);
	}

	pub fn contains(&self, repo_id: &str) -> bool {
		self.repos.contains_key(repo_id)
	}

	/// Results are keyed by id, so a late response never clobbers another repo.
	pub fn insert(&mut self, repo_id: impl Into<String>, data: GeneratedRepoData) {
		self.repos.insert(repo_id.into(), data);
	}

	pub fn get(&self, repo_id: &str) -> Option<&GeneratedRepoData> {
		self.repos.get(repo_id)
	}

	/// Repository metadata in manifest order, then any loaded extras by id.
	pub fn repositories(&self) -> Vec<Repository> {
		let mut ids: Vec<&str> = self.manifest.iter().flatten().map(String::as_str).collect();
		let mut extra: Vec<&str> = self
			.repos
			.keys()
			.map(String::as_str)
			.filter(|id| !ids.contains(id))
			.collect();
		extra.sort_unstable();
		ids.extend(extra);
		ids.into_iter()
			.filter_map(|id| self.repos.get(id))
			.map(|d| d.repository.clone())
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::NodeType;

	fn repo(id: &str) -> GeneratedRepoData {
		GeneratedRepoData {
			repository: Repository {
				id: id.into(),
				name: id.into(),
				..Default::default()
			},
			..Default::default()
		}
	}

	#[test]
	fn payload_with_missing_levels_parses() {
		let data: GeneratedRepoData = serde_json::from_str(
			r#"{"repository":{"id":"r","name":"R","owner":"o"},
			"moduleNodes":[{"id":"m","label":"M","type":"data","level":"module"}]}"#,
		)
		.unwrap();
		assert_eq!(data.nodes_for_level(ZoomLevel::Module).len(), 1);
		assert!(data.nodes_for_level(ZoomLevel::File).is_empty());
		assert!(data.system_groups().is_empty());
	}

	#[test]
	fn file_children_are_found_by_parent() {
		let mut data = repo("r");
		data.file_nodes
			.push(GraphNode::new("f", "F", NodeType::Utility, ZoomLevel::File).with_parent("m1"));
		assert!(data.has_file_children("m1"));
		assert!(!data.has_file_children("m2"));
	}

	#[test]
	fn catalog_lists_manifest_order_first() {
		let mut catalog = RepoCatalog::new();
		catalog.set_manifest(vec!["b".into(), "a".into(), "missing".into()]);
		catalog.insert("a", repo("a"));
		catalog.insert("z", repo("z"));
		catalog.insert("b", repo("b"));
		let ids: Vec<String> = catalog.repositories().into_iter().map(|r| r.id).collect();
		assert_eq!(ids, vec!["b", "a", "z"]);
	}
}
