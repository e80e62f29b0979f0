//! Force-directed layout over the visible subgraph.
//!
//! Positions converge through pairwise repulsion, link springs, a centering
//! pull and collision avoidance, all scaled by an exponentially decaying
//! "heat" value. The simulation is rebuilt from scratch whenever the visible
//! node set changes; dragging pins a node and raises the heat floor so the
//! rest of the graph keeps responding.

use super::types::EdgeStrength;

const ALPHA_MIN: f64 = 0.001;
const ALPHA_DECAY: f64 = 0.0228;
const VELOCITY_RETAIN: f64 = 0.6;
const LINK_STRENGTH: f64 = 0.1;
const CENTER_STRENGTH: f64 = 0.04;
const DRAG_ALPHA_TARGET: f64 = 0.3;

/// Inset keeping every node fully on the drawing surface.
pub const CLAMP_MARGIN: f64 = 40.0;

/// Repulsion by size tier: the two big tiers push harder.
fn charge_strength(size: f64) -> f64 {
	if size >= 60.0 {
		-800.0
	} else if size >= 45.0 {
		-500.0
	} else {
		-300.0
	}
}

/// Link rest length multiplier by the larger endpoint's size tier.
fn link_multiplier(size: f64) -> f64 {
	if size >= 60.0 {
		5.0
	} else if size >= 45.0 {
		4.0
	} else {
		3.0
	}
}

/// Collision margin added to a node's radius, by size tier.
fn collision_margin(size: f64) -> f64 {
	if size >= 60.0 {
		25.0
	} else if size >= 45.0 {
		20.0
	} else {
		15.0
	}
}

#[derive(Clone, Debug)]
pub struct SimNode {
	pub id: String,
	pub size: f64,
	pub x: f64,
	pub y: f64,
	vx: f64,
	vy: f64,
	fx: Option<f64>,
	fy: Option<f64>,
}

#[derive(Clone, Debug)]
struct SimLink {
	source: usize,
	target: usize,
	rest: f64,
}

#[derive(Clone, Debug)]
pub struct Simulation {
	nodes: Vec<SimNode>,
	links: Vec<SimLink>,
	alpha: f64,
	alpha_target: f64,
	width: f64,
	height: f64,
}

impl Simulation {
	/// Build a fresh simulation over `entries` (id, size) and index-based
	/// `links`. Positions are seeded on a deterministic spiral around the
	/// viewport center; nothing is carried over from a previous subgraph.
	pub fn new(
		entries: &[(String, f64)],
		links: &[(usize, usize, EdgeStrength)],
		width: f64,
		height: f64,
	) -> Self {
		let nodes: Vec<SimNode> = entries
			.iter()
			.enumerate()
			.map(|(i, (id, size))| {
				// Golden-angle spiral: distinct, deterministic seed positions.
				let angle = i as f64 * 2.399_963_229_728_653;
				let radius = 50.0 * (i as f64).sqrt();
				SimNode {
					id: id.clone(),
					size: *size,
					x: width / 2.0 + radius * angle.cos(),
					y: height / 2.0 + radius * angle.sin(),
					vx: 0.0,
					vy: 0.0,
					fx: None,
					fy: None,
				}
			})
			.collect();

		let links = links
			.iter()
			.filter(|&&(s, t, _)| s < nodes.len() && t < nodes.len() && s != t)
			.map(|&(s, t, strength)| {
				let larger = nodes[s].size.max(nodes[t].size);
				let mut rest = larger * link_multiplier(larger);
				if strength == EdgeStrength::Strong {
					rest *= 0.8;
				}
				SimLink {
					source: s,
					target: t,
					rest,
				}
			})
			.collect();

		Self {
			nodes,
			links,
			alpha: 1.0,
			alpha_target: 0.0,
			width,
			height,
		}
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Whether the layout still has heat left to burn.
	pub fn is_active(&self) -> bool {
		self.alpha >= ALPHA_MIN || self.alpha_target > 0.0
	}

	/// Raise the heat floor while a drag gesture is active.
	pub fn reheat(&mut self) {
		self.alpha_target = DRAG_ALPHA_TARGET;
		self.alpha = self.alpha.max(DRAG_ALPHA_TARGET);
	}

	/// Let the heat decay back to rest after a gesture ends.
	pub fn cool(&mut self) {
		self.alpha_target = 0.0;
	}

	/// Pin a node to a fixed position for the duration of a drag.
	pub fn pin(&mut self, index: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(index) {
			node.fx = Some(x);
			node.fy = Some(y);
		}
	}

	pub fn unpin(&mut self, index: usize) {
		if let Some(node) = self.nodes.get_mut(index) {
			node.fx = None;
			node.fy = None;
		}
	}

	/// One integration step: decay alpha, apply all forces, integrate
	/// velocities, resolve collisions and clamp into the viewport.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;
		if !self.is_active() || self.nodes.len() < 2 {
			self.clamp();
			return;
		}

		self.apply_links();
		self.apply_charge();
		self.apply_center();
		self.integrate();
		self.apply_collision();
		self.clamp();
	}

	fn apply_links(&mut self) {
		for link in &self.links {
			let (s, t) = (link.source, link.target);
			let dx = self.nodes[t].x - self.nodes[s].x;
			let dy = self.nodes[t].y - self.nodes[s].y;
			let dist = (dx * dx + dy * dy).sqrt().max(1e-3);
			let delta = (dist - link.rest) / dist * LINK_STRENGTH * self.alpha;
			let (fx, fy) = (dx * delta * 0.5, dy * delta * 0.5);
			self.nodes[s].vx += fx;
			self.nodes[s].vy += fy;
			self.nodes[t].vx -= fx;
			self.nodes[t].vy -= fy;
		}
	}

	fn apply_charge(&mut self) {
		for i in 0..self.nodes.len() {
			for j in (i + 1)..self.nodes.len() {
				let dx = self.nodes[j].x - self.nodes[i].x;
				let dy = self.nodes[j].y - self.nodes[i].y;
				let dist2 = (dx * dx + dy * dy).max(1.0);
				// Each node's own strength is what its neighbors feel.
				let on_i = charge_strength(self.nodes[j].size) * self.alpha / dist2;
				let on_j = charge_strength(self.nodes[i].size) * self.alpha / dist2;
				self.nodes[i].vx += dx * on_i;
				self.nodes[i].vy += dy * on_i;
				self.nodes[j].vx -= dx * on_j;
				self.nodes[j].vy -= dy * on_j;
			}
		}
	}

	fn apply_center(&mut self) {
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		for node in &mut self.nodes {
			node.vx += (cx - node.x) * CENTER_STRENGTH * self.alpha;
			node.vy += (cy - node.y) * CENTER_STRENGTH * self.alpha;
		}
	}

	fn integrate(&mut self) {
		for node in &mut self.nodes {
			match (node.fx, node.fy) {
				(Some(fx), Some(fy)) => {
					node.x = fx;
					node.y = fy;
					node.vx = 0.0;
					node.vy = 0.0;
				}
				_ => {
					node.vx *= VELOCITY_RETAIN;
					node.vy *= VELOCITY_RETAIN;
					node.x += node.vx;
					node.y += node.vy;
				}
			}
		}
	}

	fn apply_collision(&mut self) {
		for i in 0..self.nodes.len() {
			for j in (i + 1)..self.nodes.len() {
				let reach_i = self.nodes[i].size + collision_margin(self.nodes[i].size);
				let reach_j = self.nodes[j].size + collision_margin(self.nodes[j].size);
				let dx = self.nodes[j].x - self.nodes[i].x;
				let dy = self.nodes[j].y - self.nodes[i].y;
				let dist = (dx * dx + dy * dy).sqrt().max(1e-3);
				let overlap = reach_i + reach_j - dist;
				if overlap <= 0.0 {
					continue;
				}
				let (ux, uy) = (dx / dist, dy / dist);
				let i_pinned = self.nodes[i].fx.is_some();
				let j_pinned = self.nodes[j].fx.is_some();
				// A pinned node passes its share of the push to the other.
				let (share_i, share_j) = match (i_pinned, j_pinned) {
					(true, true) => (0.0, 0.0),
					(true, false) => (0.0, 1.0),
					(false, true) => (1.0, 0.0),
					(false, false) => (0.5, 0.5),
				};
				self.nodes[i].x -= ux * overlap * share_i;
				self.nodes[i].y -= uy * overlap * share_i;
				self.nodes[j].x += ux * overlap * share_j;
				self.nodes[j].y += uy * overlap * share_j;
			}
		}
	}

	fn clamp(&mut self) {
		let max_x = (self.width - CLAMP_MARGIN).max(CLAMP_MARGIN);
		let max_y = (self.height - CLAMP_MARGIN).max(CLAMP_MARGIN);
		for node in &mut self.nodes {
			node.x = node.x.clamp(CLAMP_MARGIN, max_x);
			node.y = node.y.clamp(CLAMP_MARGIN, max_y);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entries(sizes: &[f64]) -> Vec<(String, f64)> {
		sizes
			.iter()
			.enumerate()
			.map(|(i, &size)| (format!("n{i}"), size))
			.collect()
	}

	#[test]
	fn nodes_stay_inside_the_viewport() {
		let mut sim = Simulation::new(
			&entries(&[80.0, 62.0, 55.0, 40.0, 30.0]),
			&[
				(0, 1, EdgeStrength::Strong),
				(1, 2, EdgeStrength::Normal),
				(1, 3, EdgeStrength::Normal),
			],
			900.0,
			600.0,
		);
		for _ in 0..400 {
			sim.tick();
		}
		for node in sim.nodes() {
			assert!(node.x >= CLAMP_MARGIN && node.x <= 900.0 - CLAMP_MARGIN, "{node:?}");
			assert!(node.y >= CLAMP_MARGIN && node.y <= 600.0 - CLAMP_MARGIN, "{node:?}");
		}
	}

	#[test]
	fn collision_separates_overlapping_nodes() {
		let mut sim = Simulation::new(&entries(&[40.0, 40.0]), &[], 800.0, 600.0);
		for _ in 0..300 {
			sim.tick();
		}
		let a = &sim.nodes()[0];
		let b = &sim.nodes()[1];
		let dist = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
		// Effective radii are size + margin (40 + 15 each).
		assert!(dist >= 100.0, "nodes still overlap: {dist}");
	}

	#[test]
	fn a_pinned_node_does_not_move() {
		let mut sim = Simulation::new(
			&entries(&[50.0, 50.0, 50.0]),
			&[(0, 1, EdgeStrength::Normal)],
			800.0,
			600.0,
		);
		sim.pin(0, 200.0, 200.0);
		for _ in 0..100 {
			sim.tick();
		}
		let pinned = &sim.nodes()[0];
		assert_eq!((pinned.x, pinned.y), (200.0, 200.0));
	}

	#[test]
	fn heat_decays_to_rest_and_a_drag_reheats() {
		let mut sim = Simulation::new(&entries(&[40.0, 40.0]), &[], 800.0, 600.0);
		assert!(sim.is_active());
		for _ in 0..600 {
			sim.tick();
		}
		assert!(!sim.is_active());

		sim.reheat();
		assert!(sim.is_active());
		for _ in 0..600 {
			sim.tick();
		}
		// The drag floor keeps it warm until released.
		assert!(sim.is_active());
		sim.cool();
		for _ in 0..600 {
			sim.tick();
		}
		assert!(!sim.is_active());
	}

	#[test]
	fn a_link_pulls_its_endpoints_toward_the_rest_length() {
		let mut sim = Simulation::new(
			&entries(&[40.0, 40.0]),
			&[(0, 1, EdgeStrength::Normal)],
			2000.0,
			2000.0,
		);
		// Spread the pair far beyond the rest length (40 * 3 = 120).
		sim.pin(0, 400.0, 1000.0);
		sim.pin(1, 1600.0, 1000.0);
		sim.tick();
		sim.unpin(0);
		sim.unpin(1);
		sim.reheat();
		for _ in 0..400 {
			sim.tick();
		}
		let a = &sim.nodes()[0];
		let b = &sim.nodes()[1];
		let dist = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
		assert!(dist < 1200.0, "link never pulled the pair together: {dist}");
	}

	#[test]
	fn rebuild_discards_previous_positions() {
		let mut sim = Simulation::new(&entries(&[40.0, 40.0]), &[], 800.0, 600.0);
		for _ in 0..200 {
			sim.tick();
		}
		let settled: Vec<(f64, f64)> = sim.nodes().iter().map(|n| (n.x, n.y)).collect();
		let fresh = Simulation::new(&entries(&[40.0, 40.0, 40.0]), &[], 800.0, 600.0);
		assert_eq!(fresh.nodes().len(), 3);
		assert!(fresh.is_active());
		let reseeded: Vec<(f64, f64)> = fresh.nodes().iter().map(|n| (n.x, n.y)).collect();
		assert_ne!(settled, reseeded[..2].to_vec());
	}
}
