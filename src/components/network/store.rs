use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;

use super::model::{ConceptEdge, ConceptModel, ConceptNode, PanelRow};

/// Owned graph store shared by the canvas and the filter panel.
///
/// Every mutation funnels through [`GraphStore::mutate`], which bumps the
/// revision signal, so each model change triggers exactly one
/// recompute-restart-redraw cycle and the views never observe derived state
/// that is stale against the flags.
#[derive(Clone)]
pub struct GraphStore {
	model: Rc<RefCell<ConceptModel>>,
	revision: RwSignal<u64>,
	/// Shared hover id driving the symmetric cross-highlight between the
	/// canvas and the filter panel.
	pub hovered: RwSignal<Option<String>>,
}

impl GraphStore {
	pub fn new(model: ConceptModel) -> Self {
		Self {
			model: Rc::new(RefCell::new(model)),
			revision: RwSignal::new(0),
			hovered: RwSignal::new(None),
		}
	}

	/// Signal bumped on every effective model mutation.
	pub fn revision(&self) -> RwSignal<u64> {
		self.revision
	}

	fn mutate(&self, f: impl FnOnce(&mut ConceptModel) -> bool) {
		let changed = f(&mut self.model.borrow_mut());
		if changed {
			self.revision.update(|r| *r += 1);
		}
	}

	pub fn toggle_expansion(&self, id: &str) {
		self.mutate(|model| model.toggle_expansion(id));
	}

	pub fn toggle_visibility(&self, id: &str) {
		self.mutate(|model| model.toggle_visibility(id));
	}

	pub fn set_all_expanded(&self, expanded: bool) {
		self.mutate(|model| {
			model.set_all_expanded(expanded);
			true
		});
	}

	pub fn set_all_visible(&self, visible: bool) {
		self.mutate(|model| {
			model.set_all_visible(visible);
			true
		});
	}

	/// The current visible subgraph, for seeding the layout.
	pub fn visible(&self) -> (Vec<ConceptNode>, Vec<ConceptEdge>) {
		let model = self.model.borrow();
		(model.visible_nodes(), model.visible_edges())
	}

	pub fn panel_rows(&self) -> Vec<PanelRow> {
		self.model.borrow().panel_rows()
	}

	pub fn has_children(&self, id: &str) -> bool {
		self.model.borrow().has_children(id)
	}
}
