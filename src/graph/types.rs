//! Node, edge and repository definitions shared by every graph module.

use serde::{Deserialize, Serialize};

/// Id prefix carried by every node or edge created in the explorer.
pub const USER_ID_PREFIX: &str = "user-";
/// Id prefix for user-created edges.
pub const USER_EDGE_ID_PREFIX: &str = "user-edge-";

/// True when the id was minted by the explorer rather than the pipeline.
pub fn is_user_id(id: &str) -> bool {
	id.starts_with(USER_ID_PREFIX)
}

/// One of the four graph granularities. Each level owns its own id space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomLevel {
	Context,
	System,
	#[default]
	Module,
	File,
}

impl ZoomLevel {
	pub const ALL: [ZoomLevel; 4] = [
		ZoomLevel::Context,
		ZoomLevel::System,
		ZoomLevel::Module,
		ZoomLevel::File,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			ZoomLevel::Context => "context",
			ZoomLevel::System => "system",
			ZoomLevel::Module => "module",
			ZoomLevel::File => "file",
		}
	}

	pub fn title(self) -> &'static str {
		match self {
			ZoomLevel::Context => "Context View",
			ZoomLevel::System => "System View",
			ZoomLevel::Module => "Module View",
			ZoomLevel::File => "File View",
		}
	}

	/// Module and file levels cluster their nodes into groups.
	pub fn is_grouped(self) -> bool {
		matches!(self, ZoomLevel::Module | ZoomLevel::File)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
	#[default]
	Component,
	Api,
	Utility,
	Data,
	Config,
	Problem,
	Actor,
	External,
}

impl NodeType {
	pub const ALL: [NodeType; 8] = [
		NodeType::Component,
		NodeType::Api,
		NodeType::Utility,
		NodeType::Data,
		NodeType::Config,
		NodeType::Problem,
		NodeType::Actor,
		NodeType::External,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			NodeType::Component => "component",
			NodeType::Api => "api",
			NodeType::Utility => "utility",
			NodeType::Data => "data",
			NodeType::Config => "config",
			NodeType::Problem => "problem",
			NodeType::Actor => "actor",
			NodeType::External => "external",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|t| t.as_str() == raw)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeType {
	IntegratesWith,
	#[default]
	DependsOn,
	Dependency,
}

impl EdgeType {
	pub const ALL: [EdgeType; 3] = [EdgeType::IntegratesWith, EdgeType::DependsOn, EdgeType::Dependency];

	pub fn as_str(self) -> &'static str {
		match self {
			EdgeType::IntegratesWith => "integrates-with",
			EdgeType::DependsOn => "depends-on",
			EdgeType::Dependency => "dependency",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|t| t.as_str() == raw)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationMode {
	Sync,
	Async,
}

impl CommunicationMode {
	pub const ALL: [CommunicationMode; 2] = [CommunicationMode::Sync, CommunicationMode::Async];

	pub fn as_str(self) -> &'static str {
		match self {
			CommunicationMode::Sync => "sync",
			CommunicationMode::Async => "async",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|m| m.as_str() == raw)
	}
}

/// Which analysis produced an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
	Scip,
	Config,
	Ai,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSpec {
	pub title: String,
	pub details: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
	pub step: u32,
	pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HowItWorks {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub overview: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub workflow: Vec<WorkflowStep>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFile {
	pub path: String,
	pub language: String,
	pub symbol_count: u32,
}

/// A component at one zoom level.
///
/// The rich content fields (`purpose` onwards) only feed detail inspection;
/// reconciliation patches them but layout and focus never read them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	#[serde(rename = "type")]
	pub kind: NodeType,
	#[serde(default)]
	pub description: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub stats: String,
	pub level: ZoomLevel,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub group: Option<String>,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub has_problem: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub purpose: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub architecture: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub how_it_works: Option<HowItWorks>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub technical_specs: Option<Vec<TechnicalSpec>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key_decisions: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub code_files: Vec<CodeFile>,
}

impl GraphNode {
	pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeType, level: ZoomLevel) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			kind,
			description: String::new(),
			stats: String::new(),
			level,
			parent_id: None,
			group: None,
			has_problem: false,
			purpose: None,
			architecture: None,
			how_it_works: None,
			technical_specs: None,
			key_decisions: None,
			code_files: Vec::new(),
		}
	}

	pub fn with_group(mut self, group: impl Into<String>) -> Self {
		self.group = Some(group.into());
		self
	}

	pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
		self.parent_id = Some(parent_id.into());
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}
}

fn verified_by_default() -> bool {
	true
}

/// A directed relationship between two node ids of the same zoom level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	#[serde(rename = "type")]
	pub kind: EdgeType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	// older payloads omit the flag entirely
	#[serde(default = "verified_by_default")]
	pub verified: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub weight: Option<f64>,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub is_circular: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub communication_mode: Option<CommunicationMode>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub protocol: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data_source: Option<DataSource>,
}

impl GraphEdge {
	pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>, kind: EdgeType) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			kind,
			label: None,
			verified: true,
			weight: None,
			is_circular: false,
			communication_mode: None,
			protocol: None,
			data_source: None,
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Coupling strength; missing or non-positive weights count as 1.
	pub fn weight(&self) -> f64 {
		self.weight.filter(|w| *w > 0.0).unwrap_or(1.0)
	}

	pub fn touches(&self, node_id: &str) -> bool {
		self.source == node_id || self.target == node_id
	}
}

/// Repository metadata attached to a pipeline payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub owner: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub language: String,
	#[serde(default)]
	pub language_color: String,
	#[serde(default)]
	pub stars: u64,
	#[serde(default)]
	pub last_updated: String,
}

/// A logical cluster drawn as a background region at module/file level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemGroupDef {
	pub id: String,
	pub label: String,
	pub color: String,
}

impl SystemGroupDef {
	pub fn new(id: impl Into<String>, label: impl Into<String>, color: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			color: color.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn edge_without_verified_flag_is_verified() {
		let edge: GraphEdge =
			serde_json::from_str(r#"{"id":"e1","source":"a","target":"b","type":"depends-on"}"#).unwrap();
		assert!(edge.verified);
		assert_eq!(edge.weight(), 1.0);
		assert_eq!(edge.kind, EdgeType::DependsOn);
	}

	#[test]
	fn node_reads_pipeline_field_names() {
		let node: GraphNode = serde_json::from_str(
			r#"{"id":"m1","label":"Auth","type":"api","description":"d","stats":"3 files",
			"level":"module","parentId":"s1","group":"core","howItWorks":{"overview":"o"},
			"confidenceScore":0.8}"#,
		)
		.unwrap();
		assert_eq!(node.kind, NodeType::Api);
		assert_eq!(node.parent_id.as_deref(), Some("s1"));
		assert_eq!(node.group.as_deref(), Some("core"));
		assert_eq!(node.how_it_works.unwrap().overview.as_deref(), Some("o"));
	}

	#[test]
	fn select_values_match_wire_names() {
		for kind in EdgeType::ALL {
			let wire = serde_json::to_string(&kind).unwrap();
			assert_eq!(wire, format!("\"{}\"", kind.as_str()));
			assert_eq!(EdgeType::parse(kind.as_str()), Some(kind));
		}
		for mode in CommunicationMode::ALL {
			let wire = serde_json::to_string(&mode).unwrap();
			assert_eq!(wire, format!("\"{}\"", mode.as_str()));
			assert_eq!(CommunicationMode::parse(mode.as_str()), Some(mode));
		}
		assert_eq!(EdgeType::parse("calls"), None);
		assert_eq!(CommunicationMode::parse(""), None);
	}

	#[test]
	fn user_prefix_marks_provenance() {
		assert!(is_user_id("user-1712-abcde"));
		assert!(is_user_id("user-edge-1712-abcde"));
		assert!(!is_user_id("mod-auth"));
	}

	#[test]
	fn non_positive_weight_falls_back_to_one() {
		let mut edge = GraphEdge::new("e", "a", "b", EdgeType::Dependency);
		edge.weight = Some(0.0);
		assert_eq!(edge.weight(), 1.0);
		edge.weight = Some(4.0);
		assert_eq!(edge.weight(), 4.0);
	}
}
