//! Render attributes looked up from node and edge attributes.

use super::types::{CommunicationMode, EdgeType, GraphEdge, NodeType};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	pub fill: &'static str,
	pub border: &'static str,
	pub badge: &'static str,
}

pub fn node_style(kind: NodeType) -> NodeStyle {
	match kind {
		NodeType::Component => NodeStyle {
			fill: "hsl(217, 91%, 60%)",
			border: "hsl(217, 91%, 45%)",
			badge: "Component",
		},
		NodeType::Api => NodeStyle {
			fill: "hsl(142, 71%, 45%)",
			border: "hsl(142, 71%, 32%)",
			badge: "API",
		},
		NodeType::Utility => NodeStyle {
			fill: "hsl(38, 92%, 50%)",
			border: "hsl(38, 92%, 38%)",
			badge: "Utility",
		},
		NodeType::Data => NodeStyle {
			fill: "hsl(262, 83%, 58%)",
			border: "hsl(262, 83%, 44%)",
			badge: "Data",
		},
		NodeType::Config => NodeStyle {
			fill: "hsl(215, 16%, 47%)",
			border: "hsl(215, 16%, 35%)",
			badge: "Config",
		},
		NodeType::Problem => NodeStyle {
			fill: "hsl(0, 84%, 60%)",
			border: "hsl(0, 84%, 45%)",
			badge: "Problem",
		},
		NodeType::Actor => NodeStyle {
			fill: "hsl(330, 81%, 60%)",
			border: "hsl(330, 81%, 45%)",
			badge: "Actor",
		},
		NodeType::External => NodeStyle {
			fill: "hsl(190, 60%, 50%)",
			border: "hsl(190, 60%, 38%)",
			badge: "External",
		},
	}
}

const CIRCULAR_STROKE: &str = "hsl(0, 84%, 60%)";

fn edge_colors(kind: EdgeType) -> (&'static str, &'static str) {
	match kind {
		EdgeType::IntegratesWith => ("hsl(190, 60%, 50%)", "hsl(190, 80%, 45%)"),
		EdgeType::DependsOn | EdgeType::Dependency => ("hsl(220, 13%, 65%)", "hsl(220, 30%, 55%)"),
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	pub stroke: &'static str,
	/// Dash and gap lengths; empty for solid.
	pub dash: &'static [f64],
	pub width: f64,
	pub opacity: f64,
}

/// Edge state that affects styling beyond the edge's own attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeEmphasis {
	pub highlighted: bool,
	pub dimmed: bool,
	pub user_edited: bool,
}

pub fn edge_style(edge: &GraphEdge, emphasis: EdgeEmphasis) -> EdgeStyle {
	let width = match edge.kind {
		EdgeType::Dependency => (1.0 + edge.weight().log2()).clamp(1.0, 5.0),
		_ if emphasis.highlighted => 2.5,
		_ => 1.5,
	};
	let opacity = if emphasis.dimmed {
		0.15
	} else if edge.is_circular {
		1.0
	} else if emphasis.user_edited {
		0.9
	} else if edge.verified {
		1.0
	} else {
		0.7
	};

	if edge.is_circular {
		return EdgeStyle {
			stroke: CIRCULAR_STROKE,
			dash: &[],
			width,
			opacity,
		};
	}

	let (normal, highlighted) = edge_colors(edge.kind);
	let stroke = if emphasis.highlighted { highlighted } else { normal };
	let dash: &'static [f64] = if !edge.verified {
		&[6.0, 3.0]
	} else if edge.communication_mode == Some(CommunicationMode::Async) {
		&[8.0, 4.0]
	} else {
		match edge.kind {
			EdgeType::IntegratesWith => &[4.0, 4.0],
			EdgeType::DependsOn | EdgeType::Dependency => &[],
		}
	};
	EdgeStyle {
		stroke,
		dash,
		width,
		opacity,
	}
}

/// Label shown on the edge, prefixed with the protocol when both are known.
pub fn edge_display_label(edge: &GraphEdge) -> Option<String> {
	let label = edge.label.as_deref()?;
	Some(match edge.protocol.as_deref() {
		Some(protocol) => format!("{protocol}: {label}"),
		None => label.to_owned(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn circular_wins_over_unverified() {
		let mut edge = GraphEdge::new("e", "a", "b", EdgeType::DependsOn);
		edge.is_circular = true;
		edge.verified = false;
		let style = edge_style(&edge, EdgeEmphasis::default());
		assert_eq!(style.stroke, CIRCULAR_STROKE);
		assert!(style.dash.is_empty());
		assert_eq!(style.opacity, 1.0);
	}

	#[test]
	fn unverified_beats_async_dash() {
		let mut edge = GraphEdge::new("e", "a", "b", EdgeType::IntegratesWith);
		edge.communication_mode = Some(CommunicationMode::Async);
		assert_eq!(edge_style(&edge, EdgeEmphasis::default()).dash, &[8.0, 4.0]);
		edge.verified = false;
		let style = edge_style(&edge, EdgeEmphasis::default());
		assert_eq!(style.dash, &[6.0, 3.0]);
		assert_eq!(style.opacity, 0.7);
	}

	#[test]
	fn dependency_width_grows_with_weight() {
		let mut edge = GraphEdge::new("e", "a", "b", EdgeType::Dependency);
		edge.weight = Some(4.0);
		assert_eq!(edge_style(&edge, EdgeEmphasis::default()).width, 3.0);
		edge.weight = Some(1024.0);
		assert_eq!(edge_style(&edge, EdgeEmphasis::default()).width, 5.0);
		// light coupling still draws a visible line
		edge.weight = Some(0.5);
		assert_eq!(edge_style(&edge, EdgeEmphasis::default()).width, 1.0);
		edge.weight = Some(0.01);
		assert_eq!(edge_style(&edge, EdgeEmphasis::default()).width, 1.0);
	}

	#[test]
	fn dimmed_edges_fade() {
		let edge = GraphEdge::new("e", "a", "b", EdgeType::DependsOn);
		let emphasis = EdgeEmphasis {
			dimmed: true,
			user_edited: true,
			..Default::default()
		};
		assert_eq!(edge_style(&edge, emphasis).opacity, 0.15);
	}

	#[test]
	fn protocol_prefixes_label() {
		let mut edge = GraphEdge::new("e", "a", "b", EdgeType::DependsOn).with_label("fetch");
		assert_eq!(edge_display_label(&edge).as_deref(), Some("fetch"));
		edge.protocol = Some("grpc".into());
		assert_eq!(edge_display_label(&edge).as_deref(), Some("grpc: fetch"));
		edge.label = None;
		assert_eq!(edge_display_label(&edge), None);
	}
}
