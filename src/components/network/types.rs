use std::collections::HashMap;

use serde::Deserialize;

/// Taxonomy tier of a field. Drives the fixed palette, force strength and
/// label treatment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeTier {
	Core,
	Major,
	Specialized,
	Niche,
}

impl NodeTier {
	pub const ALL: [NodeTier; 4] = [
		NodeTier::Core,
		NodeTier::Major,
		NodeTier::Specialized,
		NodeTier::Niche,
	];

	/// Fixed four-color palette shared by the canvas, the legend and the
	/// filter panel. Keep this the single source of truth for tier colors.
	pub fn color(self) -> &'static str {
		match self {
			NodeTier::Core => "#ff6b6b",
			NodeTier::Major => "#4ecdc4",
			NodeTier::Specialized => "#45b7d1",
			NodeTier::Niche => "#96ceb4",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			NodeTier::Core => "Core field",
			NodeTier::Major => "Major field",
			NodeTier::Specialized => "Specialized",
			NodeTier::Niche => "Niche",
		}
	}
}

/// Relation class. Affects link rest length and stroke weight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStrength {
	Strong,
	#[default]
	Normal,
}

/// The JSON input document: a node table keyed by id plus a base relation
/// list. Children may be bare ids or fully inline nodes; both forms are
/// normalized into canonical id references at load time.
#[derive(Clone, Debug, Deserialize)]
pub struct ConceptDocument {
	#[serde(rename = "hierarchicalData")]
	pub hierarchical_data: HashMap<String, NodeSpec>,
	#[serde(default)]
	pub relationships: Vec<RelationSpec>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeSpec {
	pub name: String,
	#[serde(rename = "type")]
	pub tier: NodeTier,
	pub size: f64,
	#[serde(default)]
	pub children: Vec<ChildSpec>,
	#[serde(default)]
	pub expanded: bool,
	#[serde(default = "default_visible")]
	pub visible: bool,
}

fn default_visible() -> bool {
	true
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ChildSpec {
	Id(String),
	Inline(InlineNode),
}

/// Inline child form: a node object carrying its own id, not present in the
/// top-level table.
#[derive(Clone, Debug, Deserialize)]
pub struct InlineNode {
	pub id: String,
	#[serde(flatten)]
	pub node: NodeSpec,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RelationSpec {
	pub source: String,
	pub target: String,
	#[serde(default)]
	pub strength: EdgeStrength,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_both_child_forms() {
		let doc: ConceptDocument = serde_json::from_str(
			r#"{
				"hierarchicalData": {
					"ai": {
						"name": "Artificial Intelligence",
						"type": "core",
						"size": 80,
						"children": [
							"ml",
							{ "id": "rl", "name": "Reinforcement Learning", "type": "specialized", "size": 40 }
						]
					},
					"ml": { "name": "Machine Learning", "type": "major", "size": 62 }
				}
			}"#,
		)
		.unwrap();

		let ai = &doc.hierarchical_data["ai"];
		assert_eq!(ai.children.len(), 2);
		assert!(matches!(&ai.children[0], ChildSpec::Id(id) if id == "ml"));
		match &ai.children[1] {
			ChildSpec::Inline(inline) => {
				assert_eq!(inline.id, "rl");
				assert_eq!(inline.node.tier, NodeTier::Specialized);
			}
			other => panic!("expected inline child, got {other:?}"),
		}
	}

	#[test]
	fn flag_defaults_are_collapsed_and_visible() {
		let doc: ConceptDocument = serde_json::from_str(
			r#"{ "hierarchicalData": { "ai": { "name": "AI", "type": "core", "size": 80 } } }"#,
		)
		.unwrap();
		let ai = &doc.hierarchical_data["ai"];
		assert!(!ai.expanded);
		assert!(ai.visible);
		assert!(ai.children.is_empty());
		assert!(doc.relationships.is_empty());
	}

	#[test]
	fn relation_strength_defaults_to_normal() {
		let rel: RelationSpec =
			serde_json::from_str(r#"{ "source": "ai", "target": "ml" }"#).unwrap();
		assert_eq!(rel.strength, EdgeStrength::Normal);
		let rel: RelationSpec =
			serde_json::from_str(r#"{ "source": "ai", "target": "ml", "strength": "strong" }"#)
				.unwrap();
		assert_eq!(rel.strength, EdgeStrength::Strong);
	}
}
