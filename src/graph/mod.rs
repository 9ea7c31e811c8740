//! Architecture graph model: pipeline data, user edits, reconciliation,
//! layout and focus.

pub mod edits;
pub mod filters;
pub mod focus;
pub mod layout;
pub mod loader;
pub mod pipeline;
pub mod reconcile;
pub mod session;
pub mod storage;
pub mod style;
pub mod types;

pub use edits::{EdgeFieldEdits, EditRecord, EditStore, ImportError, NodeField, NodeFieldEdits};
pub use focus::{DisplayMode, FocusState, n_hop_neighbors};
pub use pipeline::{GeneratedRepoData, PipelineSource, RepoCatalog};
pub use reconcile::{ReconciledGraph, merge_edges, merge_nodes, reconcile};
pub use session::{EditIntent, GraphSession, Scene};
pub use storage::{BrowserStore, KeyValueStore, MemoryStore};
pub use types::{EdgeType, GraphEdge, GraphNode, NodeType, Position, ZoomLevel};
