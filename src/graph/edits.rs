//! User edits layered over pipeline data, persisted per repository.
//!
//! Every mutation builds the next [`EditRecord`], swaps it in and writes it
//! through to the [`KeyValueStore`] before returning.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::storage::KeyValueStore;
use super::types::{
	CommunicationMode, EdgeType, GraphEdge, GraphNode, NodeType, Position, TechnicalSpec, is_user_id,
};

pub const EDITS_KEY_PREFIX: &str = "legend-user-edits-";
/// Session key used when no repository id is known.
pub const DEFAULT_REPO_KEY: &str = "__default__";

/// Patch over a node's editable fields. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFieldEdits {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<NodeType>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub group: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub purpose: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub architecture: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub how_it_works_overview: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub technical_specs: Option<Vec<TechnicalSpec>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key_decisions: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub note: Option<String>,
}

impl NodeFieldEdits {
	/// Shallow merge: fields set in `patch` win.
	pub fn merge(&mut self, patch: NodeFieldEdits) {
		fn take<T>(slot: &mut Option<T>, value: Option<T>) {
			if value.is_some() {
				*slot = value;
			}
		}
		take(&mut self.label, patch.label);
		take(&mut self.kind, patch.kind);
		take(&mut self.description, patch.description);
		take(&mut self.group, patch.group);
		take(&mut self.purpose, patch.purpose);
		take(&mut self.architecture, patch.architecture);
		take(&mut self.how_it_works_overview, patch.how_it_works_overview);
		take(&mut self.technical_specs, patch.technical_specs);
		take(&mut self.key_decisions, patch.key_decisions);
		take(&mut self.note, patch.note);
	}

	pub fn set(&mut self, field: NodeField) {
		match field {
			NodeField::Label(v) => self.label = Some(v),
			NodeField::Kind(v) => self.kind = Some(v),
			NodeField::Description(v) => self.description = Some(v),
			NodeField::Group(v) => self.group = Some(v),
			NodeField::Purpose(v) => self.purpose = Some(v),
			NodeField::Architecture(v) => self.architecture = Some(v),
			NodeField::HowItWorksOverview(v) => self.how_it_works_overview = Some(v),
			NodeField::TechnicalSpecs(v) => self.technical_specs = Some(v),
			NodeField::KeyDecisions(v) => self.key_decisions = Some(v),
		}
	}
}

/// A single editable node field with its new value.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeField {
	Label(String),
	Kind(NodeType),
	Description(String),
	Group(String),
	Purpose(String),
	Architecture(String),
	HowItWorksOverview(String),
	TechnicalSpecs(Vec<TechnicalSpec>),
	KeyDecisions(Vec<String>),
}

impl NodeField {
	/// Key decisions from a text area, one per non-blank line.
	pub fn key_decisions_from_text(raw: &str) -> Self {
		NodeField::KeyDecisions(
			raw.lines()
				.map(str::trim)
				.filter(|l| !l.is_empty())
				.map(str::to_owned)
				.collect(),
		)
	}

	/// Technical specs from `title: details` lines. A line without a colon
	/// becomes a title with empty details.
	pub fn technical_specs_from_text(raw: &str) -> Self {
		NodeField::TechnicalSpecs(
			raw.lines()
				.map(str::trim)
				.filter(|l| !l.is_empty())
				.map(|line| match line.split_once(':') {
					Some((title, details)) => TechnicalSpec {
						title: title.trim().to_owned(),
						details: details.trim().to_owned(),
					},
					None => TechnicalSpec {
						title: line.to_owned(),
						details: String::new(),
					},
				})
				.collect(),
		)
	}
}

pub fn technical_specs_text(specs: &[TechnicalSpec]) -> String {
	specs
		.iter()
		.map(|s| {
			if s.details.is_empty() {
				s.title.clone()
			} else {
				format!("{}: {}", s.title, s.details)
			}
		})
		.collect::<Vec<_>>()
		.join("\n")
}

/// Patch over an edge's mutable fields. Endpoints are never patchable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeFieldEdits {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<EdgeType>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub communication_mode: Option<CommunicationMode>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub protocol: Option<String>,
}

impl EdgeFieldEdits {
	/// Patch holding only the fields of a submitted edge form that differ
	/// from `edge`. A blank label or protocol becomes an empty string, which
	/// clears the field when applied.
	pub fn changes(
		edge: &GraphEdge,
		label: &str,
		kind: EdgeType,
		mode: Option<CommunicationMode>,
		protocol: &str,
	) -> Self {
		let (label, protocol) = (label.trim(), protocol.trim());
		Self {
			label: (label != edge.label.as_deref().unwrap_or_default()).then(|| label.to_owned()),
			kind: (kind != edge.kind).then_some(kind),
			communication_mode: mode.filter(|m| edge.communication_mode != Some(*m)),
			protocol: (protocol != edge.protocol.as_deref().unwrap_or_default()).then(|| protocol.to_owned()),
		}
	}

	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}

	pub fn merge(&mut self, patch: EdgeFieldEdits) {
		if patch.label.is_some() {
			self.label = patch.label;
		}
		if patch.kind.is_some() {
			self.kind = patch.kind;
		}
		if patch.communication_mode.is_some() {
			self.communication_mode = patch.communication_mode;
		}
		if patch.protocol.is_some() {
			self.protocol = patch.protocol;
		}
	}
}

/// Older exports write `null` for collections they never touched.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The persisted unit of user state for one repository.
///
/// `addedNodes` and `deletedNodeIds` are required on import; everything else
/// is backfilled for payloads written by older versions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRecord {
	pub added_nodes: Vec<GraphNode>,
	pub deleted_node_ids: Vec<String>,
	#[serde(default, deserialize_with = "null_as_empty")]
	pub added_edges: Vec<GraphEdge>,
	#[serde(default, deserialize_with = "null_as_empty")]
	pub deleted_edge_ids: Vec<String>,
	#[serde(default, deserialize_with = "null_as_empty")]
	pub node_positions: BTreeMap<String, Position>,
	#[serde(default, deserialize_with = "null_as_empty")]
	pub edited_nodes: BTreeMap<String, NodeFieldEdits>,
	#[serde(default, deserialize_with = "null_as_empty")]
	pub edited_edges: BTreeMap<String, EdgeFieldEdits>,
	/// Legacy top-level notes; superseded by `editedNodes[id].note`.
	#[serde(default, deserialize_with = "null_as_empty")]
	pub node_notes: BTreeMap<String, String>,
}

impl EditRecord {
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}

#[derive(Debug, Error)]
pub enum ImportError {
	#[error("import payload is not valid JSON: {0}")]
	Syntax(#[source] serde_json::Error),
	#[error("import payload is missing the `{0}` list")]
	MissingCollection(&'static str),
	#[error("import payload has an unexpected shape: {0}")]
	Shape(#[source] serde_json::Error),
}

pub fn storage_key(repo_id: &str) -> String {
	format!("{EDITS_KEY_PREFIX}{repo_id}")
}

/// Owner of the [`EditRecord`] for the currently viewed repository.
#[derive(Clone, Debug)]
pub struct EditStore<S> {
	key: String,
	storage: S,
	record: EditRecord,
}

impl<S: KeyValueStore> EditStore<S> {
	/// Loads persisted edits, falling back to an empty record when nothing is
	/// stored or the stored value is corrupted.
	pub fn open(repo_id: Option<&str>, storage: S) -> Self {
		let repo_id = repo_id.filter(|id| !id.is_empty()).unwrap_or(DEFAULT_REPO_KEY);
		let key = storage_key(repo_id);
		let record = match storage.get(&key) {
			Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
				warn!("discarding corrupted edits under {key}: {err}");
				EditRecord::default()
			}),
			None => EditRecord::default(),
		};
		debug!(
			"opened edits for {repo_id}: {} added nodes, {} deleted nodes",
			record.added_nodes.len(),
			record.deleted_node_ids.len()
		);
		Self { key, storage, record }
	}

	pub fn record(&self) -> &EditRecord {
		&self.record
	}

	pub fn storage(&self) -> &S {
		&self.storage
	}

	fn commit(&mut self, next: EditRecord) {
		self.record = next;
		match serde_json::to_string(&self.record) {
			Ok(raw) => {
				if let Err(err) = self.storage.set(&self.key, &raw) {
					warn!("edits kept in memory only: {err}");
				}
			}
			Err(err) => warn!("failed to serialize edits: {err}"),
		}
	}

	fn update(&mut self, f: impl FnOnce(&mut EditRecord)) {
		let mut next = self.record.clone();
		f(&mut next);
		self.commit(next);
	}

	pub fn add_node(&mut self, node: GraphNode, position: Position) {
		self.update(|r| {
			r.node_positions.insert(node.id.clone(), position);
			r.added_nodes.push(node);
		});
	}

	/// Removes a user node outright or tombstones a pipeline node, and drops
	/// user edges attached to it. Pipeline edges are left for the reconciler.
	pub fn delete_node(&mut self, node_id: &str) {
		self.update(|r| {
			let user_added = r.added_nodes.iter().any(|n| n.id == node_id);
			if user_added || is_user_id(node_id) {
				r.added_nodes.retain(|n| n.id != node_id);
				r.node_positions.remove(node_id);
			} else if !r.deleted_node_ids.iter().any(|id| id == node_id) {
				r.deleted_node_ids.push(node_id.to_owned());
			}
			r.added_edges.retain(|e| !e.touches(node_id));
		});
	}

	pub fn add_edge(&mut self, edge: GraphEdge) {
		self.update(|r| r.added_edges.push(edge));
	}

	pub fn delete_edge(&mut self, edge_id: &str) {
		self.update(|r| {
			if r.added_edges.iter().any(|e| e.id == edge_id) {
				r.added_edges.retain(|e| e.id != edge_id);
			} else if !r.deleted_edge_ids.iter().any(|id| id == edge_id) {
				r.deleted_edge_ids.push(edge_id.to_owned());
			}
		});
	}

	pub fn edit_node(&mut self, node_id: &str, patch: NodeFieldEdits) {
		self.update(|r| r.edited_nodes.entry(node_id.to_owned()).or_default().merge(patch));
	}

	pub fn edit_node_field(&mut self, node_id: &str, field: NodeField) {
		self.update(|r| r.edited_nodes.entry(node_id.to_owned()).or_default().set(field));
	}

	pub fn edit_edge(&mut self, edge_id: &str, patch: EdgeFieldEdits) {
		self.update(|r| r.edited_edges.entry(edge_id.to_owned()).or_default().merge(patch));
	}

	pub fn update_node_position(&mut self, node_id: &str, position: Position) {
		self.update(|r| {
			r.node_positions.insert(node_id.to_owned(), position);
		});
	}

	pub fn node_position(&self, node_id: &str) -> Option<Position> {
		self.record.node_positions.get(node_id).copied()
	}

	/// An empty note clears the annotation.
	pub fn set_node_note(&mut self, node_id: &str, note: &str) {
		self.update(|r| {
			let entry = r.edited_nodes.entry(node_id.to_owned()).or_default();
			entry.note = (!note.is_empty()).then(|| note.to_owned());
		});
	}

	pub fn node_note(&self, node_id: &str) -> String {
		self.record
			.edited_nodes
			.get(node_id)
			.and_then(|e| e.note.as_deref())
			.filter(|n| !n.is_empty())
			.or_else(|| self.record.node_notes.get(node_id).map(String::as_str))
			.unwrap_or_default()
			.to_owned()
	}

	pub fn field_edits(&self, node_id: &str) -> NodeFieldEdits {
		self.record.edited_nodes.get(node_id).cloned().unwrap_or_default()
	}

	pub fn is_node_edited(&self, node_id: &str) -> bool {
		self.record.edited_nodes.contains_key(node_id)
	}

	pub fn is_node_user_added(&self, node_id: &str) -> bool {
		self.record.added_nodes.iter().any(|n| n.id == node_id)
	}

	pub fn is_edge_edited(&self, edge_id: &str) -> bool {
		self.record.edited_edges.contains_key(edge_id)
	}

	/// Pretty-printed JSON of the whole record.
	pub fn export_edits(&self) -> String {
		serde_json::to_string_pretty(&self.record).unwrap_or_else(|err| {
			warn!("failed to export edits: {err}");
			String::from("{}")
		})
	}

	/// Replaces (never merges) the current record. On error nothing changes.
	pub fn import_edits(&mut self, raw: &str) -> Result<(), ImportError> {
		let value: Value = serde_json::from_str(raw).map_err(ImportError::Syntax)?;
		for field in ["addedNodes", "deletedNodeIds"] {
			if !value.get(field).is_some_and(Value::is_array) {
				return Err(ImportError::MissingCollection(field));
			}
		}
		let record: EditRecord = serde_json::from_value(value).map_err(ImportError::Shape)?;
		info!(
			"imported edits: {} added nodes, {} added edges",
			record.added_nodes.len(),
			record.added_edges.len()
		);
		self.commit(record);
		Ok(())
	}
}
