use std::collections::HashSet;

use crate::config::AnimationSettings;
use crate::graph::layout::{NODE_HEIGHT, NODE_WIDTH};
use crate::graph::session::Scene;
use crate::graph::types::{Position, ZoomLevel};

const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 2.5;
const FIT_PADDING: f64 = 60.0;
/// Screen pixels a press may travel before it counts as a drag.
const CLICK_SLOP: f64 = 4.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_id: Option<String>,
	/// Shift-drag draws a connection instead of moving the node.
	pub connecting: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
	/// Graph-space pointer while connecting.
	pub cursor: Option<Position>,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<String>,
	pub neighbors: HashSet<String>,
	pub highlight_t: f64,
}

/// What a finished pointer gesture asks the owner to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
	Select(Option<String>),
	Moved { id: String, position: Position },
	Connect { source: String, target: String },
}

pub struct CanvasState {
	pub scene: Scene,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	pub animation: AnimationSettings,
	fitted_level: Option<ZoomLevel>,
}

impl CanvasState {
	pub fn new(scene: Scene, width: f64, height: f64, animation: AnimationSettings) -> Self {
		let mut state = Self {
			scene: Scene::default(),
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			flow_time: 0.0,
			animation,
			fitted_level: None,
		};
		state.set_scene(scene);
		state
	}

	/// Swaps in a freshly computed scene, refitting the view when the level
	/// changed. A node being dragged keeps its in-flight position.
	pub fn set_scene(&mut self, scene: Scene) {
		let in_flight = match (&self.drag.node_id, self.drag.moved && !self.drag.connecting) {
			(Some(id), true) => self.node_position(id).map(|p| (id.clone(), p)),
			_ => None,
		};
		self.scene = scene;
		if let Some((id, at)) = in_flight {
			self.move_node(&id, at);
		}
		let hover = self.hover.node.take().filter(|id| self.scene.node(id).is_some());
		self.hover.neighbors.clear();
		self.set_hover(hover);
		if self.fitted_level != Some(self.scene.level) {
			self.fit();
		}
	}

	/// Centres the scene bounds in the viewport.
	pub fn fit(&mut self) {
		self.fitted_level = Some(self.scene.level);
		let Some((min_x, min_y, max_x, max_y)) = self.bounds() else {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		};
		let (w, h) = (max_x - min_x + 2.0 * FIT_PADDING, max_y - min_y + 2.0 * FIT_PADDING);
		let k = (self.width / w).min(self.height / h).clamp(MIN_ZOOM, 1.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - (min_x + max_x) / 2.0 * k,
			y: self.height / 2.0 - (min_y + max_y) / 2.0 * k,
			k,
		};
	}

	fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
		let mut nodes = self.scene.nodes.iter().map(|n| n.position);
		let first = nodes.next()?;
		let init = (first.x, first.y, first.x + NODE_WIDTH, first.y + NODE_HEIGHT);
		let nodes = nodes.fold(init, |(x0, y0, x1, y1), p| {
			(x0.min(p.x), y0.min(p.y), x1.max(p.x + NODE_WIDTH), y1.max(p.y + NODE_HEIGHT))
		});
		Some(self.scene.groups.iter().fold(nodes, |(x0, y0, x1, y1), g| {
			(x0.min(g.x), y0.min(g.y), x1.max(g.x + g.width), y1.max(g.y + g.height))
		}))
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.scene
			.nodes
			.iter()
			.rev()
			.find(|n| {
				let p = n.position;
				gx >= p.x && gx <= p.x + NODE_WIDTH && gy >= p.y && gy <= p.y + NODE_HEIGHT
			})
			.map(|n| n.id.clone())
	}

	pub fn node_position(&self, id: &str) -> Option<Position> {
		self.scene.node(id).map(|n| n.position)
	}

	fn move_node(&mut self, id: &str, to: Position) {
		for node in self.scene.nodes.iter_mut().filter(|n| n.id == id) {
			node.position = to;
		}
		for edge in &mut self.scene.edges {
			if edge.source == id {
				edge.from = to;
			}
			if edge.target == id {
				edge.to = to;
			}
		}
	}

	pub fn press(&mut self, x: f64, y: f64, shift: bool) {
		match self.node_at_position(x, y) {
			Some(id) => {
				self.drag = DragState {
					active: true,
					node_start: self.node_position(&id).unwrap_or_default(),
					node_id: Some(id),
					connecting: shift,
					moved: false,
					start_x: x,
					start_y: y,
					cursor: None,
				};
			}
			None => {
				self.pan = PanState {
					active: true,
					moved: false,
					start_x: x,
					start_y: y,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		// Update hover state when not dragging
		if !self.drag.active {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}

		if self.drag.active {
			let (dx, dy) = (x - self.drag.start_x, y - self.drag.start_y);
			if dx.hypot(dy) > CLICK_SLOP {
				self.drag.moved = true;
			}
			if !self.drag.moved {
				return;
			}
			if self.drag.connecting {
				let (gx, gy) = self.screen_to_graph(x, y);
				self.drag.cursor = Some(Position::new(gx, gy));
				return;
			}
			let Some(id) = self.drag.node_id.clone() else {
				return;
			};
			let draggable = self.scene.node(&id).is_some_and(|n| n.user_added);
			if draggable {
				let k = self.transform.k;
				let to = Position::new(self.drag.node_start.x + dx / k, self.drag.node_start.y + dy / k);
				self.move_node(&id, to);
			}
		} else if self.pan.active {
			let (dx, dy) = (x - self.pan.start_x, y - self.pan.start_y);
			if dx.hypot(dy) > CLICK_SLOP {
				self.pan.moved = true;
			}
			self.transform.x = self.pan.transform_start_x + dx;
			self.transform.y = self.pan.transform_start_y + dy;
		}
	}

	/// Ends the current gesture. Only user-added nodes report moves.
	pub fn release(&mut self, x: f64, y: f64) -> Option<Gesture> {
		let drag = std::mem::take(&mut self.drag);
		let pan = std::mem::take(&mut self.pan);

		if drag.active {
			let id = drag.node_id?;
			if !drag.moved {
				return Some(Gesture::Select(Some(id)));
			}
			if drag.connecting {
				return self
					.node_at_position(x, y)
					.filter(|target| *target != id)
					.map(|target| Gesture::Connect { source: id, target });
			}
			let node = self.scene.node(&id)?;
			return node.user_added.then(|| Gesture::Moved {
				position: node.position,
				id,
			});
		}
		if pan.active && !pan.moved {
			return Some(Gesture::Select(None));
		}
		None
	}

	pub fn cancel(&mut self) {
		if self.drag.active && self.drag.moved && !self.drag.connecting {
			if let Some(id) = self.drag.node_id.clone() {
				let start = self.drag.node_start;
				self.move_node(&id, start);
			}
		}
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.set_hover(None);
	}

	pub fn zoom_at(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn set_hover(&mut self, node: Option<String>) {
		if self.hover.node == node {
			return;
		}
		self.hover.neighbors.clear();
		if let Some(id) = node.as_deref() {
			for edge in &self.scene.edges {
				if edge.source == id {
					self.hover.neighbors.insert(edge.target.clone());
				} else if edge.target == id {
					self.hover.neighbors.insert(edge.source.clone());
				}
			}
		}
		self.hover.node = node;
	}

	pub fn is_hovered(&self, id: &str) -> bool {
		self.hover.node.as_deref() == Some(id)
	}

	pub fn is_hover_neighbor(&self, id: &str) -> bool {
		self.hover.neighbors.contains(id)
	}

	pub fn tick(&mut self, dt: f64) {
		if self.animation.enabled {
			self.flow_time += dt;
		}
		let target = if self.hover.node.is_some() { 1.0 } else { 0.0 };
		self.hover.highlight_t += (target - self.hover.highlight_t) * (6.0 * dt).min(1.0);
		if target == 0.0 && self.hover.highlight_t < 0.01 {
			self.hover.highlight_t = 0.0;
		}
	}

	/// Dash offset for a pattern whose cycle is `cycle` graph units long.
	pub fn dash_offset(&self, cycle: f64) -> f64 {
		if cycle <= 0.0 || self.animation.speed <= 0.0 {
			return 0.0;
		}
		-(self.flow_time / self.animation.speed * cycle) % cycle
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
