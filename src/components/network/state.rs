use std::collections::{HashMap, HashSet};

use super::model::{ConceptEdge, ConceptNode, ROOT_ID};
use super::simulation::Simulation;
use super::types::{EdgeStrength, NodeTier};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;

/// Display data for one visible node; its position lives in the simulation
/// at the same index.
#[derive(Clone, Debug)]
pub struct NodeSprite {
	pub id: String,
	pub name: String,
	pub tier: NodeTier,
	pub size: f64,
	pub is_root: bool,
	/// Wrapped internal label lines, computed lazily on first render.
	pub internal_lines: Option<Vec<String>>,
}

#[derive(Clone, Debug)]
pub struct EdgeSprite {
	pub source: usize,
	pub target: usize,
	pub strength: EdgeStrength,
	pub color: &'static str,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
	/// Whether the pointer traveled far enough to count as a drag rather
	/// than a click.
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub neighbors: HashSet<usize>,
	pub highlight_t: f64,
	pub prev_node: Option<usize>,
	pub prev_neighbors: HashSet<usize>,
	delay_t: f64,
}

/// Everything one canvas needs per frame: the simulation over the current
/// visible subgraph, its display sprites, and the view/gesture state.
pub struct NetworkState {
	pub sim: Simulation,
	pub sprites: Vec<NodeSprite>,
	pub edges: Vec<EdgeSprite>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
}

impl NetworkState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			sim: Simulation::new(&[], &[], width, height),
			sprites: Vec::new(),
			edges: Vec::new(),
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
		}
	}

	/// Swap in a new visible subgraph: discard positions, rebuild sprites and
	/// restart the simulation. Hover indices would be stale, so they reset.
	pub fn rebuild(&mut self, nodes: Vec<ConceptNode>, edges: Vec<ConceptEdge>) {
		let index: HashMap<String, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();

		let entries: Vec<(String, f64)> =
			nodes.iter().map(|n| (n.id.clone(), n.size)).collect();
		let links: Vec<(usize, usize, EdgeStrength)> = edges
			.iter()
			.filter_map(|e| {
				Some((*index.get(&e.source)?, *index.get(&e.target)?, e.strength))
			})
			.collect();

		self.edges = edges
			.iter()
			.filter_map(|e| {
				Some(EdgeSprite {
					source: *index.get(&e.source)?,
					target: *index.get(&e.target)?,
					strength: e.strength,
					color: e.color,
				})
			})
			.collect();
		self.sprites = nodes
			.into_iter()
			.map(|node| NodeSprite {
				is_root: node.id == ROOT_ID,
				id: node.id,
				name: node.name,
				tier: node.tier,
				size: node.size,
				internal_lines: None,
			})
			.collect();
		self.sim = Simulation::new(&entries, &links, self.width, self.height);
		self.drag = DragState::default();
		self.hover = HoverState::default();
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.sim.resize(width, height);
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Hit-test against node circles; the node's own radius is the hit area.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		for (i, sprite) in self.sprites.iter().enumerate() {
			let node = &self.sim.nodes()[i];
			let (dx, dy) = (node.x - gx, node.y - gy);
			if (dx * dx + dy * dy).sqrt() < sprite.size {
				found = Some(i);
			}
		}
		found
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	/// Cross-highlighting entry point for the filter panel: hover by id.
	pub fn set_hover_id(&mut self, id: Option<&str>) {
		let idx = id.and_then(|id| self.sprites.iter().position(|s| s.id == id));
		if id.is_some() && idx.is_none() {
			// Unknown or currently invisible id: treat as no hover.
			self.set_hover(None);
			return;
		}
		self.set_hover(idx);
	}

	pub fn hovered_id(&self) -> Option<&str> {
		self.hover
			.node
			.map(|idx| self.sprites[idx].id.as_str())
	}

	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Advance the simulation one frame and ease the hover highlight.
	pub fn tick(&mut self, dt: f64) {
		self.sim.tick();

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Start dragging the node under the pointer: reheat the simulation and
	/// pin the node until release.
	pub fn begin_drag(&mut self, idx: usize, sx: f64, sy: f64) {
		let node = &self.sim.nodes()[idx];
		let (x, y) = (node.x, node.y);
		self.drag = DragState {
			active: true,
			node_idx: Some(idx),
			start_x: sx,
			start_y: sy,
			node_start_x: x,
			node_start_y: y,
			moved: false,
		};
		self.sim.reheat();
		self.sim.pin(idx, x, y);
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node_idx else {
			return;
		};
		if (sx - self.drag.start_x).abs() + (sy - self.drag.start_y).abs() > 4.0 {
			self.drag.moved = true;
		}
		let (dx, dy) = (
			(sx - self.drag.start_x) / self.transform.k,
			(sy - self.drag.start_y) / self.transform.k,
		);
		self.sim.pin(
			idx,
			self.drag.node_start_x + dx,
			self.drag.node_start_y + dy,
		);
	}

	/// Release the drag pin; the node rejoins free layout as the heat decays.
	pub fn end_drag(&mut self) {
		if let Some(idx) = self.drag.node_idx {
			self.sim.unpin(idx);
		}
		self.sim.cool();
		self.drag = DragState::default();
	}

	/// Zoom by `factor` keeping the screen point (sx, sy) fixed.
	pub fn zoom_by(&mut self, factor: f64, sx: f64, sy: f64) -> f64 {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
		new_k
	}

	pub fn zoom_reset(&mut self) -> f64 {
		self.transform = ViewTransform {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		};
		1.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn state_with_three_nodes() -> NetworkState {
		let nodes = vec![
			ConceptNode {
				id: "ai".to_string(),
				name: "Artificial Intelligence".to_string(),
				tier: NodeTier::Core,
				size: 80.0,
				children: vec!["ml".to_string(), "cv".to_string()],
				expanded: true,
				visible: true,
			},
			ConceptNode {
				id: "ml".to_string(),
				name: "Machine Learning".to_string(),
				tier: NodeTier::Major,
				size: 62.0,
				children: Vec::new(),
				expanded: false,
				visible: true,
			},
			ConceptNode {
				id: "cv".to_string(),
				name: "Computer Vision".to_string(),
				tier: NodeTier::Major,
				size: 50.0,
				children: Vec::new(),
				expanded: false,
				visible: true,
			},
		];
		let edges = vec![
			ConceptEdge {
				source: "ai".to_string(),
				target: "ml".to_string(),
				strength: EdgeStrength::Strong,
				color: NodeTier::Core.color(),
			},
			ConceptEdge {
				source: "ai".to_string(),
				target: "cv".to_string(),
				strength: EdgeStrength::Normal,
				color: NodeTier::Core.color(),
			},
		];
		let mut state = NetworkState::new(800.0, 600.0);
		state.rebuild(nodes, edges);
		state
	}

	#[test]
	fn hover_collects_one_hop_neighbors() {
		let mut state = state_with_three_nodes();
		state.set_hover_id(Some("ai"));
		assert_eq!(state.hovered_id(), Some("ai"));
		assert_eq!(state.hover.neighbors.len(), 2);
		state.set_hover_id(None);
		assert_eq!(state.hovered_id(), None);
	}

	#[test]
	fn hover_on_an_unknown_id_is_a_no_op_hover() {
		let mut state = state_with_three_nodes();
		state.set_hover_id(Some("no-such-node"));
		assert_eq!(state.hovered_id(), None);
		assert!(state.hover.neighbors.is_empty());
	}

	#[test]
	fn zoom_is_clamped_to_the_allowed_range() {
		let mut state = state_with_three_nodes();
		for _ in 0..100 {
			state.zoom_by(1.5, 400.0, 300.0);
		}
		assert!((state.transform.k - MAX_ZOOM).abs() < 1e-9);
		for _ in 0..100 {
			state.zoom_by(0.5, 400.0, 300.0);
		}
		assert!((state.transform.k - MIN_ZOOM).abs() < 1e-9);
		assert_eq!(state.zoom_reset(), 1.0);
		assert_eq!(state.transform.k, 1.0);
	}

	#[test]
	fn rebuild_resets_gestures_and_restarts_layout() {
		let mut state = state_with_three_nodes();
		state.begin_drag(0, 100.0, 100.0);
		state.set_hover(Some(1));
		for _ in 0..700 {
			state.tick(0.016);
		}
		state.rebuild(Vec::new(), Vec::new());
		assert!(!state.drag.active);
		assert_eq!(state.hover.node, None);
		assert!(state.sprites.is_empty());
	}

	#[test]
	fn a_short_drag_without_movement_counts_as_a_click() {
		let mut state = state_with_three_nodes();
		state.begin_drag(0, 100.0, 100.0);
		state.drag_to(101.0, 100.0);
		assert!(!state.drag.moved);
		state.drag_to(140.0, 150.0);
		assert!(state.drag.moved);
		state.end_drag();
		assert!(!state.drag.active);
	}
}
