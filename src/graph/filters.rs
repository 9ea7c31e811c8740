//! Level-aware edge filters from the sidebar.

use super::types::{GraphEdge, ZoomLevel};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeFilters {
	/// System and module levels: drop unverified edges.
	pub verified_only: bool,
	/// Module level: keep only circular dependencies.
	pub circular_only: bool,
	/// File level: minimum coupling weight.
	pub weight_threshold: f64,
}

impl Default for EdgeFilters {
	fn default() -> Self {
		Self {
			verified_only: false,
			circular_only: false,
			weight_threshold: 1.0,
		}
	}
}

impl EdgeFilters {
	pub fn admits(&self, edge: &GraphEdge, level: ZoomLevel) -> bool {
		match level {
			ZoomLevel::Context => true,
			ZoomLevel::System => !self.verified_only || edge.verified,
			ZoomLevel::Module => (!self.verified_only || edge.verified) && (!self.circular_only || edge.is_circular),
			ZoomLevel::File => edge.weight() >= self.weight_threshold,
		}
	}
}
