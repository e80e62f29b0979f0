use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::labels::{self, MeasureText};
use super::state::NetworkState;
use super::types::EdgeStrength;

const BACKGROUND: &str = "#1a1a2e";
const LABEL_COLOR: &str = "#e8e8f0";
const NODE_RIM: &str = "rgba(255, 255, 255, 0.25)";
const HIGHLIGHT_EDGE: &str = "#ffd166";
const HIGHLIGHT_STROKE: &str = "#ffffff";
const EXTERNAL_FONT_PX: f64 = 12.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Text measurement backed by the 2D context.
struct CanvasMeasure<'a> {
	ctx: &'a CanvasRenderingContext2d,
}

impl MeasureText for CanvasMeasure<'_> {
	fn text_width(&self, text: &str, font_px: f64) -> f64 {
		self.ctx.set_font(&format!("{font_px}px sans-serif"));
		self.ctx
			.measure_text(text)
			.map(|metrics| metrics.width())
			.unwrap_or_else(|_| text.chars().count() as f64 * font_px * 0.6)
	}
}

pub fn render(state: &mut NetworkState, ctx: &CanvasRenderingContext2d) {
	ensure_internal_labels(state, ctx);

	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	ctx.set_text_baseline("middle");
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

/// Wrap internal labels once per rebuild; external labels depend on live
/// positions and are recomputed every frame instead.
fn ensure_internal_labels(state: &mut NetworkState, ctx: &CanvasRenderingContext2d) {
	let measure = CanvasMeasure { ctx };
	for sprite in &mut state.sprites {
		if (sprite.is_root || sprite.size >= labels::INTERNAL_MIN_SIZE)
			&& sprite.internal_lines.is_none()
		{
			sprite.internal_lines = Some(labels::internal_lines(
				&sprite.name,
				sprite.size,
				sprite.is_root,
				&measure,
			));
		}
	}
}

fn draw_edges(state: &NetworkState, ctx: &CanvasRenderingContext2d) {
	let t = ease_out_cubic(state.hover.highlight_t);
	let highlighting = state.has_active_highlight();

	for edge in &state.edges {
		let source = &state.sim.nodes()[edge.source];
		let target = &state.sim.nodes()[edge.target];
		let (dx, dy) = (target.x - source.x, target.y - source.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let base_width = match edge.strength {
			EdgeStrength::Strong => 3.0,
			EdgeStrength::Normal => 1.5,
		};
		let connected =
			state.is_highlighted(edge.source) && state.is_highlighted(edge.target);

		// At rest every edge sits at the base alpha; while highlighting,
		// connected edges brighten and the rest dim to 0.1.
		let (alpha, width, color) = if connected {
			let color = if highlighting { HIGHLIGHT_EDGE } else { edge.color };
			(0.55 + 0.35 * t, base_width * (1.0 + 0.6 * t), color)
		} else {
			(0.55 - 0.45 * t, base_width, edge.color)
		};

		// Trim to the node rims so strokes do not cross the circles.
		let (ux, uy) = (dx / dist, dy / dist);
		let src_size = state.sprites[edge.source].size;
		let tgt_size = state.sprites[edge.target].size;

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(source.x + ux * src_size, source.y + uy * src_size);
		ctx.line_to(target.x - ux * tgt_size, target.y - uy * tgt_size);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &NetworkState, ctx: &CanvasRenderingContext2d) {
	let has_highlight = state.has_active_highlight();
	let t = ease_out_cubic(state.hover.highlight_t);

	// Dimmed pass first, highlighted nodes on top.
	for idx in 0..state.sprites.len() {
		if has_highlight && state.is_highlighted(idx) {
			continue;
		}
		draw_node(state, ctx, idx, 1.0 - 0.8 * t, false);
	}
	if !has_highlight {
		return;
	}
	for idx in 0..state.sprites.len() {
		if !state.is_highlighted(idx) {
			continue;
		}
		draw_node(state, ctx, idx, 1.0, state.is_hovered(idx));
	}
}

fn draw_node(
	state: &NetworkState,
	ctx: &CanvasRenderingContext2d,
	idx: usize,
	alpha: f64,
	hovered: bool,
) {
	let sprite = &state.sprites[idx];
	let node = &state.sim.nodes()[idx];
	let t = ease_out_cubic(state.hover.highlight_t);

	ctx.set_global_alpha(alpha);
	ctx.begin_path();
	let _ = ctx.arc(node.x, node.y, sprite.size, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(sprite.tier.color());
	ctx.fill();

	if hovered && t > 0.01 {
		// Brightness boost plus a thicker rim on the hovered node.
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, sprite.size, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", 0.25 * t));
		ctx.fill();
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, sprite.size, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(HIGHLIGHT_STROKE);
		ctx.set_line_width(3.0);
		ctx.stroke();
	} else {
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, sprite.size, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(NODE_RIM);
		ctx.set_line_width(1.5);
		ctx.stroke();
	}

	draw_label(state, ctx, idx);
	ctx.set_global_alpha(1.0);
}

fn draw_label(state: &NetworkState, ctx: &CanvasRenderingContext2d, idx: usize) {
	let sprite = &state.sprites[idx];
	let node = &state.sim.nodes()[idx];

	if let Some(lines) = &sprite.internal_lines {
		let (font_px, line_height) = labels::font_metrics(sprite.size);
		ctx.set_font(&format!("{font_px}px sans-serif"));
		ctx.set_fill_style_str(LABEL_COLOR);
		ctx.set_text_align("center");
		let first = node.y + labels::first_line_offset(lines.len(), line_height);
		for (i, line) in lines.iter().enumerate() {
			let _ = ctx.fill_text(line, node.x, first + i as f64 * line_height);
		}
		return;
	}

	// External label, pushed away from the incoming edge. Position depends
	// on live endpoints, so it is recomputed every frame.
	let incoming = state
		.edges
		.iter()
		.find(|edge| edge.target == idx)
		.map(|edge| {
			let source = &state.sim.nodes()[edge.source];
			(source.x, source.y)
		});
	let (dx, dy, anchor) = labels::external_placement((node.x, node.y), sprite.size, incoming);
	ctx.set_font(&format!("{EXTERNAL_FONT_PX}px sans-serif"));
	ctx.set_fill_style_str(LABEL_COLOR);
	ctx.set_text_align(anchor.canvas_align());
	let _ = ctx.fill_text(&sprite.name, node.x + dx, node.y + dy);
}
