use std::collections::{HashMap, HashSet};

use super::loader::LoadError;
use super::types::{ChildSpec, ConceptDocument, EdgeStrength, NodeSpec, NodeTier};

/// The one node that is always present and always visible.
pub const ROOT_ID: &str = "ai";

/// One field/concept after load-time normalization: `children` holds
/// canonical ids into the table, never inline objects.
#[derive(Clone, Debug, PartialEq)]
pub struct ConceptNode {
	pub id: String,
	pub name: String,
	pub tier: NodeTier,
	pub size: f64,
	pub children: Vec<String>,
	pub expanded: bool,
	pub visible: bool,
}

/// A directed relation between two visible nodes, colored by its source tier.
#[derive(Clone, Debug, PartialEq)]
pub struct ConceptEdge {
	pub source: String,
	pub target: String,
	pub strength: EdgeStrength,
	pub color: &'static str,
}

/// One row of the filter tree. Hidden nodes stay listed so they can be
/// shown again; depth drives indentation.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelRow {
	pub id: String,
	pub name: String,
	pub tier: NodeTier,
	pub depth: usize,
	pub has_children: bool,
	pub expanded: bool,
	pub visible: bool,
}

/// The owned graph store. The node table is fixed after load; `expanded` and
/// `visible` are the only runtime-mutable fields, and every mutation goes
/// through the toggle/bulk methods so callers can trigger one recompute per
/// change.
#[derive(Clone, Debug)]
pub struct ConceptModel {
	nodes: Vec<ConceptNode>,
	index: HashMap<String, usize>,
	relations: Vec<(String, String, EdgeStrength)>,
}

impl ConceptModel {
	/// Build the model from a decoded document, hoisting inline children into
	/// the table. Fails fast when the root entry is absent.
	pub fn from_document(doc: ConceptDocument) -> Result<Self, LoadError> {
		let mut model = Self {
			nodes: Vec::with_capacity(doc.hierarchical_data.len()),
			index: HashMap::new(),
			relations: doc
				.relationships
				.iter()
				.map(|r| (r.source.clone(), r.target.clone(), r.strength))
				.collect(),
		};

		// Top-level entries first so an inline duplicate can never shadow one.
		for (id, spec) in &doc.hierarchical_data {
			model.insert_bare(id, spec);
		}
		for (id, spec) in &doc.hierarchical_data {
			let children = model.resolve_children(&spec.children);
			let slot = model.index[id.as_str()];
			model.nodes[slot].children = children;
		}

		match model.index.get(ROOT_ID) {
			Some(&slot) => {
				// The root can never be hidden, whatever the data says.
				model.nodes[slot].visible = true;
			}
			None => return Err(LoadError::MissingRoot),
		}
		Ok(model)
	}

	fn insert_bare(&mut self, id: &str, spec: &NodeSpec) {
		if self.index.contains_key(id) {
			return;
		}
		self.index.insert(id.to_string(), self.nodes.len());
		self.nodes.push(ConceptNode {
			id: id.to_string(),
			name: spec.name.clone(),
			tier: spec.tier,
			size: spec.size,
			children: Vec::new(),
			expanded: spec.expanded,
			visible: spec.visible,
		});
	}

	fn resolve_children(&mut self, children: &[ChildSpec]) -> Vec<String> {
		let mut ids = Vec::with_capacity(children.len());
		for child in children {
			match child {
				ChildSpec::Id(id) => ids.push(id.clone()),
				ChildSpec::Inline(inline) => {
					ids.push(inline.id.clone());
					if !self.index.contains_key(inline.id.as_str()) {
						self.insert_bare(&inline.id, &inline.node);
						let nested = self.resolve_children(&inline.node.children);
						let slot = self.index[inline.id.as_str()];
						self.nodes[slot].children = nested;
					}
				}
			}
		}
		ids
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn get(&self, id: &str) -> Option<&ConceptNode> {
		self.index.get(id).map(|&slot| &self.nodes[slot])
	}

	fn get_mut(&mut self, id: &str) -> Option<&mut ConceptNode> {
		let slot = *self.index.get(id)?;
		Some(&mut self.nodes[slot])
	}

	/// The visible subgraph: the root, its visible children when the root is
	/// expanded, and one further level under each expanded child. A node
	/// reachable from several expanded parents appears once.
	pub fn visible_nodes(&self) -> Vec<ConceptNode> {
		let mut out = Vec::new();
		let mut seen = HashSet::new();
		let Some(root) = self.get(ROOT_ID) else {
			return out;
		};
		seen.insert(root.id.clone());
		out.push(root.clone());
		if !root.expanded {
			return out;
		}
		for child_id in &root.children {
			let Some(child) = self.get(child_id) else {
				continue;
			};
			if !child.visible || !seen.insert(child.id.clone()) {
				continue;
			}
			out.push(child.clone());
			if !child.expanded {
				continue;
			}
			for grand_id in &child.children {
				let Some(grand) = self.get(grand_id) else {
					continue;
				};
				if !grand.visible || !seen.insert(grand.id.clone()) {
					continue;
				}
				out.push(grand.clone());
			}
		}
		out
	}

	/// The base relation list plus one derived edge per (expanded parent,
	/// child) pair across the whole table, filtered to edges whose endpoints
	/// are both visible. Base relations win over derived duplicates so their
	/// strength class survives.
	pub fn visible_edges(&self) -> Vec<ConceptEdge> {
		let visible: HashSet<String> = self.visible_nodes().into_iter().map(|n| n.id).collect();
		let mut out = Vec::new();
		let mut seen = HashSet::new();
		for (source, target, strength) in &self.relations {
			self.push_edge(&mut out, &mut seen, &visible, source, target, *strength);
		}
		for node in &self.nodes {
			if !node.expanded {
				continue;
			}
			for child_id in &node.children {
				self.push_edge(
					&mut out,
					&mut seen,
					&visible,
					&node.id,
					child_id,
					EdgeStrength::Normal,
				);
			}
		}
		out
	}

	fn push_edge(
		&self,
		out: &mut Vec<ConceptEdge>,
		seen: &mut HashSet<(String, String)>,
		visible: &HashSet<String>,
		source: &str,
		target: &str,
		strength: EdgeStrength,
	) {
		if !visible.contains(source) || !visible.contains(target) {
			return;
		}
		let Some(source_node) = self.get(source) else {
			return;
		};
		if seen.insert((source.to_string(), target.to_string())) {
			out.push(ConceptEdge {
				source: source.to_string(),
				target: target.to_string(),
				strength,
				color: source_node.tier.color(),
			});
		}
	}

	/// Flip the `expanded` flag. No-op for unknown ids and childless nodes.
	/// Returns whether anything changed.
	pub fn toggle_expansion(&mut self, id: &str) -> bool {
		match self.get_mut(id) {
			Some(node) if !node.children.is_empty() => {
				node.expanded = !node.expanded;
				true
			}
			_ => false,
		}
	}

	/// Flip the `visible` flag. The root can never be hidden; unknown ids
	/// are a no-op. Returns whether anything changed.
	pub fn toggle_visibility(&mut self, id: &str) -> bool {
		if id == ROOT_ID {
			return false;
		}
		match self.get_mut(id) {
			Some(node) => {
				node.visible = !node.visible;
				true
			}
			None => false,
		}
	}

	/// Set `expanded` on every node that has children.
	pub fn set_all_expanded(&mut self, expanded: bool) {
		for node in &mut self.nodes {
			if !node.children.is_empty() {
				node.expanded = expanded;
			}
		}
	}

	/// Set `visible` on every node except the root.
	pub fn set_all_visible(&mut self, visible: bool) {
		for node in &mut self.nodes {
			if node.id != ROOT_ID {
				node.visible = visible;
			}
		}
	}

	pub fn has_children(&self, id: &str) -> bool {
		self.get(id).is_some_and(|node| !node.children.is_empty())
	}

	/// 1-hop neighbor ids of `id` over the current visible edge list.
	pub fn neighbors_of(&self, id: &str) -> HashSet<String> {
		let mut out = HashSet::new();
		for edge in self.visible_edges() {
			if edge.source == id {
				out.insert(edge.target);
			} else if edge.target == id {
				out.insert(edge.source);
			}
		}
		out
	}

	/// Rows for the filter tree: the same expansion-driven traversal as the
	/// visible set, but hidden nodes stay listed (grayed) so they can be
	/// re-shown.
	pub fn panel_rows(&self) -> Vec<PanelRow> {
		let mut out = Vec::new();
		let mut seen = HashSet::new();
		let Some(root) = self.get(ROOT_ID) else {
			return out;
		};
		seen.insert(root.id.clone());
		out.push(self.row_for(root, 0));
		if !root.expanded {
			return out;
		}
		for child_id in &root.children {
			let Some(child) = self.get(child_id) else {
				continue;
			};
			if !seen.insert(child.id.clone()) {
				continue;
			}
			out.push(self.row_for(child, 1));
			if !child.expanded {
				continue;
			}
			for grand_id in &child.children {
				let Some(grand) = self.get(grand_id) else {
					continue;
				};
				if !seen.insert(grand.id.clone()) {
					continue;
				}
				out.push(self.row_for(grand, 2));
			}
		}
		out
	}

	fn row_for(&self, node: &ConceptNode, depth: usize) -> PanelRow {
		PanelRow {
			id: node.id.clone(),
			name: node.name.clone(),
			tier: node.tier,
			depth,
			has_children: !node.children.is_empty(),
			expanded: node.expanded,
			visible: node.visible,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::super::loader::parse_concepts;
	use super::*;

	const FIXTURE: &str = r#"{
		"hierarchicalData": {
			"ai": {
				"name": "Artificial Intelligence", "type": "core", "size": 80,
				"children": ["ml", "nlp", "cv"]
			},
			"ml": {
				"name": "Machine Learning", "type": "major", "size": 62,
				"children": [
					"dl",
					{ "id": "rl", "name": "Reinforcement Learning", "type": "specialized", "size": 40 }
				]
			},
			"nlp": {
				"name": "Natural Language Processing", "type": "major", "size": 52,
				"children": ["transformers"]
			},
			"cv": {
				"name": "Computer Vision", "type": "major", "size": 50,
				"children": ["transformers"]
			},
			"dl": { "name": "Deep Learning", "type": "major", "size": 55 },
			"transformers": { "name": "Transformers", "type": "specialized", "size": 40 }
		},
		"relationships": [
			{ "source": "ai", "target": "ml", "strength": "strong" },
			{ "source": "ml", "target": "dl" },
			{ "source": "dl", "target": "transformers" }
		]
	}"#;

	fn model() -> ConceptModel {
		parse_concepts(FIXTURE).unwrap()
	}

	fn visible_ids(model: &ConceptModel) -> Vec<String> {
		model.visible_nodes().into_iter().map(|n| n.id).collect()
	}

	#[test]
	fn missing_root_fails_fast() {
		let err = parse_concepts(
			r#"{ "hierarchicalData": { "ml": { "name": "ML", "type": "major", "size": 60 } } }"#,
		)
		.unwrap_err();
		assert!(matches!(err, LoadError::MissingRoot));
	}

	#[test]
	fn collapsed_root_is_the_entire_visible_set() {
		let model = model();
		assert_eq!(visible_ids(&model), vec!["ai"]);
		assert!(model.visible_edges().is_empty());
	}

	#[test]
	fn root_comes_first_and_is_always_included() {
		let mut model = model();
		model.toggle_expansion("ai");
		model.toggle_expansion("ml");
		let ids = visible_ids(&model);
		assert_eq!(ids[0], "ai");
		assert!(ids.contains(&"ml".to_string()));
		assert!(ids.contains(&"dl".to_string()));
	}

	#[test]
	fn collapsed_parent_excludes_descendants() {
		let mut model = model();
		model.toggle_expansion("ai");
		let ids = visible_ids(&model);
		assert!(ids.contains(&"ml".to_string()));
		assert!(!ids.contains(&"dl".to_string()));
		assert!(!ids.contains(&"rl".to_string()));
	}

	#[test]
	fn shared_specialized_child_appears_once() {
		let mut model = model();
		model.toggle_expansion("ai");
		model.toggle_expansion("nlp");
		model.toggle_expansion("cv");
		let count = visible_ids(&model)
			.iter()
			.filter(|id| id.as_str() == "transformers")
			.count();
		assert_eq!(count, 1);
	}

	#[test]
	fn toggle_expansion_is_idempotent_under_double_invocation() {
		let mut model = model();
		model.toggle_expansion("ai");
		let before = visible_ids(&model);
		assert!(model.toggle_expansion("ml"));
		assert!(model.toggle_expansion("ml"));
		assert_eq!(visible_ids(&model), before);
		assert!(!model.get("ml").unwrap().expanded);
	}

	#[test]
	fn toggle_expansion_is_a_no_op_without_children() {
		let mut model = model();
		model.toggle_expansion("ai");
		model.toggle_expansion("ml");
		assert!(!model.toggle_expansion("rl"));
		assert!(!model.toggle_expansion("no-such-node"));
	}

	#[test]
	fn hiding_a_node_removes_its_subtree_even_while_expanded() {
		let mut model = model();
		model.toggle_expansion("ai");
		model.toggle_expansion("ml");
		assert!(model.toggle_visibility("ml"));
		assert!(model.get("ml").unwrap().expanded);
		let ids = visible_ids(&model);
		assert!(!ids.contains(&"ml".to_string()));
		assert!(!ids.contains(&"dl".to_string()));
		assert!(!ids.contains(&"rl".to_string()));
	}

	#[test]
	fn the_root_cannot_be_hidden() {
		let mut model = model();
		assert!(!model.toggle_visibility("ai"));
		assert!(model.get("ai").unwrap().visible);
	}

	#[test]
	fn edges_never_reference_an_invisible_endpoint() {
		let mut model = model();
		model.toggle_expansion("ai");
		model.toggle_expansion("ml");
		model.toggle_visibility("dl");
		let ids = visible_ids(&model);
		for edge in model.visible_edges() {
			assert!(ids.contains(&edge.source), "dangling source {}", edge.source);
			assert!(ids.contains(&edge.target), "dangling target {}", edge.target);
		}
	}

	#[test]
	fn base_relation_wins_over_derived_duplicate() {
		let mut model = model();
		model.toggle_expansion("ai");
		let edges = model.visible_edges();
		let ai_ml: Vec<_> = edges
			.iter()
			.filter(|e| e.source == "ai" && e.target == "ml")
			.collect();
		assert_eq!(ai_ml.len(), 1);
		assert_eq!(ai_ml[0].strength, EdgeStrength::Strong);
		assert_eq!(ai_ml[0].color, NodeTier::Core.color());
	}

	#[test]
	fn derived_edges_cover_expanded_parents() {
		let mut model = model();
		model.toggle_expansion("ai");
		model.toggle_expansion("ml");
		let edges = model.visible_edges();
		assert!(
			edges
				.iter()
				.any(|e| e.source == "ml" && e.target == "rl" && e.strength == EdgeStrength::Normal)
		);
	}

	#[test]
	fn inline_children_are_hoisted_into_the_table() {
		let mut model = model();
		let rl = model.get("rl").expect("inline child in table");
		assert_eq!(rl.tier, NodeTier::Specialized);
		model.toggle_expansion("ai");
		model.toggle_expansion("ml");
		assert!(visible_ids(&model).contains(&"rl".to_string()));
	}

	#[test]
	fn bulk_expand_then_collapse_round_trips() {
		let mut model = model();
		model.set_all_expanded(true);
		for id in ["ai", "ml", "nlp", "cv"] {
			assert!(model.get(id).unwrap().expanded, "{id} not expanded");
		}
		assert!(!model.get("dl").unwrap().expanded, "childless node flagged");
		model.set_all_expanded(false);
		for id in ["ai", "ml", "nlp", "cv"] {
			assert!(!model.get(id).unwrap().expanded, "{id} still expanded");
		}
	}

	#[test]
	fn bulk_visibility_spares_the_root() {
		let mut model = model();
		model.set_all_visible(false);
		assert!(model.get("ai").unwrap().visible);
		assert!(!model.get("ml").unwrap().visible);
		assert_eq!(visible_ids(&model), vec!["ai"]);
		model.set_all_visible(true);
		assert!(model.get("ml").unwrap().visible);
	}

	#[test]
	fn neighbors_come_from_the_visible_edge_list() {
		let mut model = model();
		model.toggle_expansion("ai");
		let neighbors = model.neighbors_of("ai");
		assert!(neighbors.contains("ml"));
		assert!(neighbors.contains("nlp"));
		assert!(!neighbors.contains("dl"));
	}

	#[test]
	fn panel_rows_keep_hidden_nodes_listed() {
		let mut model = model();
		model.toggle_expansion("ai");
		model.toggle_visibility("ml");
		let rows = model.panel_rows();
		let ml = rows.iter().find(|r| r.id == "ml").expect("hidden row kept");
		assert!(!ml.visible);
		assert_eq!(ml.depth, 1);
		assert!(!visible_ids(&model).contains(&"ml".to_string()));
	}
}
