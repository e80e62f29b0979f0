use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;

use crate::components::filter_panel::FilterPanel;
use crate::components::legend::TierLegend;
use crate::components::network::{
	ConceptModel, GraphStore, LoadError, NetworkCanvas, fetch_concepts,
};

const DATA_URL: &str = "data/concepts.json";

/// The atlas page. Initialization waits on the single asynchronous step,
/// fetching the concept document, then either mounts the graph or replaces
/// the container with a static error view. A load failure is terminal: no
/// partial graph, no retry.
#[component]
pub fn Home() -> impl IntoView {
	let loaded = RwSignal::new(None::<Result<ConceptModel, LoadError>>);
	spawn_local(async move {
		let result = fetch_concepts(DATA_URL).await;
		if let Err(error) = &result {
			warn!("concept data load failed: {error}");
		}
		loaded.set(Some(result));
	});

	view! {
		<div class="atlas-page">
			{move || match loaded.get() {
				None => view! { <div class="graph-loading">"Loading the concept map\u{2026}"</div> }
					.into_any(),
				Some(Err(error)) => view! {
					<div class="graph-error">
						<h1>"The concept map could not be loaded"</h1>
						<p>{error.to_string()}</p>
						<p class="subtitle">"Reload the page to try again."</p>
					</div>
				}
					.into_any(),
				Some(Ok(model)) => view! { <AtlasView model /> }.into_any(),
			}}
		</div>
	}
}

#[component]
fn AtlasView(model: ConceptModel) -> impl IntoView {
	let store = GraphStore::new(model);

	view! {
		<div class="fullscreen-graph">
			<NetworkCanvas store=store.clone() />
			<FilterPanel store=store />
			<div class="graph-overlay">
				<h1>"AI Concept Atlas"</h1>
				<p class="subtitle">
					"Click a field to expand it. Drag nodes to reposition, scroll to zoom, drag the background to pan."
				</p>
				<TierLegend />
			</div>
		</div>
	}
}
