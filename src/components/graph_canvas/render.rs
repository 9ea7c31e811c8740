use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::CanvasState;
use crate::graph::layout::{NODE_HEIGHT, NODE_WIDTH};
use crate::graph::session::{SceneEdge, SceneNode};
use crate::graph::types::Position;

const BACKGROUND: &str = "#0f1117";
const DIMMED_ALPHA: f64 = 0.3;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_groups(state, ctx);
	draw_edges(state, ctx);
	draw_connector(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn set_dash(ctx: &CanvasRenderingContext2d, pattern: &[f64]) {
	let dash = js_sys::Array::new();
	for &len in pattern {
		dash.push(&JsValue::from_f64(len));
	}
	let _ = ctx.set_line_dash(&dash);
}

fn draw_groups(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	for group in &state.scene.groups {
		ctx.set_global_alpha(0.08);
		ctx.set_fill_style_str(&group.color);
		ctx.fill_rect(group.x, group.y, group.width, group.height);

		ctx.set_global_alpha(0.5);
		ctx.set_stroke_style_str(&group.color);
		ctx.set_line_width(2.0);
		set_dash(ctx, &[6.0, 4.0]);
		ctx.stroke_rect(group.x, group.y, group.width, group.height);
		set_dash(ctx, &[]);

		ctx.set_global_alpha(0.9);
		ctx.set_fill_style_str(&group.color);
		ctx.set_font("600 16px sans-serif");
		let _ = ctx.fill_text(&group.label, group.x + 16.0, group.y + 26.0);
	}
	ctx.set_global_alpha(1.0);
}

fn center(p: Position) -> (f64, f64) {
	(p.x + NODE_WIDTH / 2.0, p.y + NODE_HEIGHT / 2.0)
}

/// Distance from a rectangle's centre to its border along `(ux, uy)`.
fn border_offset(ux: f64, uy: f64) -> f64 {
	let (hw, hh) = (NODE_WIDTH / 2.0, NODE_HEIGHT / 2.0);
	let tx = if ux.abs() > f64::EPSILON { hw / ux.abs() } else { f64::INFINITY };
	let ty = if uy.abs() > f64::EPSILON { hh / uy.abs() } else { f64::INFINITY };
	tx.min(ty)
}

fn draw_edges(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let t = ease_out_cubic(state.hover.highlight_t);
	let hovering = state.hover.node.is_some();

	for edge in &state.scene.edges {
		draw_edge(state, ctx, edge, hovering, t);
	}
	set_dash(ctx, &[]);
	ctx.set_global_alpha(1.0);
}

fn draw_edge(state: &CanvasState, ctx: &CanvasRenderingContext2d, edge: &SceneEdge, hovering: bool, t: f64) {
	let ((x1, y1), (x2, y2)) = (center(edge.from), center(edge.to));
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let inset = border_offset(ux, uy);
	if dist <= 2.0 * inset {
		return;
	}

	let touches_hover = state.is_hovered(&edge.source) || state.is_hovered(&edge.target);
	// Hovering brightens the hovered node's edges and fades the rest
	let alpha = match (hovering, touches_hover) {
		(true, true) => edge.style.opacity + (1.0 - edge.style.opacity) * t,
		(true, false) => edge.style.opacity * (1.0 - 0.6 * t),
		_ => edge.style.opacity,
	};
	let width = edge.style.width * if touches_hover { 1.0 + 0.5 * t } else { 1.0 };
	let arrow_size = 10.0;

	ctx.set_global_alpha(alpha);
	ctx.set_stroke_style_str(edge.style.stroke);
	ctx.set_line_width(width);
	set_dash(ctx, edge.style.dash);
	ctx.set_line_dash_offset(state.dash_offset(edge.style.dash.iter().sum()));

	let (sx, sy) = (x1 + ux * inset, y1 + uy * inset);
	let (tip_x, tip_y) = (x2 - ux * inset, y2 - uy * inset);
	ctx.begin_path();
	ctx.move_to(sx, sy);
	ctx.line_to(tip_x - ux * arrow_size, tip_y - uy * arrow_size);
	ctx.stroke();

	set_dash(ctx, &[]);
	ctx.set_fill_style_str(edge.style.stroke);
	let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
	let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();

	if let Some(label) = &edge.label {
		let (mx, my) = ((sx + tip_x) / 2.0, (sy + tip_y) / 2.0);
		ctx.set_font("12px sans-serif");
		let text_width = ctx.measure_text(label).map(|m| m.width()).unwrap_or(0.0);
		ctx.set_fill_style_str(BACKGROUND);
		ctx.fill_rect(mx - text_width / 2.0 - 4.0, my - 10.0, text_width + 8.0, 16.0);
		ctx.set_fill_style_str("rgba(230, 235, 245, 0.95)");
		let _ = ctx.fill_text(label, mx - text_width / 2.0, my + 2.0);
	}
}

/// Rubber band while shift-dragging a new connection.
fn draw_connector(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let (Some(id), Some(cursor)) = (state.drag.node_id.as_deref(), state.drag.cursor) else {
		return;
	};
	if !state.drag.connecting {
		return;
	}
	let Some(from) = state.node_position(id) else {
		return;
	};
	let (x1, y1) = center(from);
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.7)");
	ctx.set_line_width(2.0);
	set_dash(ctx, &[4.0, 4.0]);
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(cursor.x, cursor.y);
	ctx.stroke();
	set_dash(ctx, &[]);
}

fn draw_nodes(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let t = ease_out_cubic(state.hover.highlight_t);
	for node in &state.scene.nodes {
		draw_node(state, ctx, node, t);
	}
	ctx.set_global_alpha(1.0);
}

fn draw_node(state: &CanvasState, ctx: &CanvasRenderingContext2d, node: &SceneNode, t: f64) {
	let Position { x, y } = node.position;
	let hovered = state.is_hovered(&node.id);
	let faded = state.hover.node.is_some() && !hovered && !state.is_hover_neighbor(&node.id);
	let mut alpha = if node.dimmed { DIMMED_ALPHA } else { 1.0 };
	if faded {
		alpha *= 1.0 - 0.5 * t;
	}
	ctx.set_global_alpha(alpha);

	if hovered && t > 0.01 {
		ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.35 * t));
		ctx.set_line_width(8.0);
		ctx.stroke_rect(x - 2.0, y - 2.0, NODE_WIDTH + 4.0, NODE_HEIGHT + 4.0);
	}

	ctx.set_fill_style_str("#1b1f2a");
	ctx.fill_rect(x, y, NODE_WIDTH, NODE_HEIGHT);
	ctx.set_fill_style_str(node.style.fill);
	ctx.fill_rect(x, y, 6.0, NODE_HEIGHT);

	let border = if node.highlighted { "white" } else { node.style.border };
	ctx.set_stroke_style_str(border);
	ctx.set_line_width(if node.highlighted { 3.0 } else { 1.5 });
	if node.user_added {
		set_dash(ctx, &[6.0, 3.0]);
	}
	ctx.stroke_rect(x, y, NODE_WIDTH, NODE_HEIGHT);
	set_dash(ctx, &[]);

	ctx.set_fill_style_str(node.style.fill);
	ctx.set_font("600 11px sans-serif");
	let _ = ctx.fill_text(node.style.badge, x + 16.0, y + 22.0);

	ctx.set_fill_style_str("rgba(240, 243, 250, 0.95)");
	ctx.set_font("600 15px sans-serif");
	let _ = ctx.fill_text_with_max_width(&node.label, x + 16.0, y + 48.0, NODE_WIDTH - 28.0);

	if node.has_problem {
		ctx.set_fill_style_str("hsl(0, 84%, 60%)");
		ctx.begin_path();
		let _ = ctx.arc(x + NODE_WIDTH - 14.0, y + 14.0, 5.0, 0.0, std::f64::consts::TAU);
		ctx.fill();
	}
	if node.user_edited {
		ctx.set_fill_style_str("hsl(38, 92%, 50%)");
		ctx.set_font("11px sans-serif");
		let _ = ctx.fill_text("edited", x + 16.0, y + NODE_HEIGHT - 10.0);
	}
}
