use leptos::prelude::*;

use crate::components::network::GraphStore;

/// The filter panel: an indented tree mirroring the graph hierarchy, with
/// expand/collapse and show/hide controls plus the two bulk toggles. Row
/// hover drives the same cross-highlight as hovering the graph node, and the
/// highlight flows back the other way through the shared hover signal.
#[component]
pub fn FilterPanel(store: GraphStore) -> impl IntoView {
	// Both bulk controls track intent through their label, not per-node
	// memory: the next click applies the label state to every node.
	let expand_all_next = RwSignal::new(true);
	let show_all_next = RwSignal::new(false);

	let store_rows = store.clone();
	let rows = move || {
		store_rows.revision().get();
		store_rows.panel_rows()
	};

	let store_expand = store.clone();
	let on_expand_all = move |_| {
		let expand = expand_all_next.get();
		store_expand.set_all_expanded(expand);
		expand_all_next.set(!expand);
	};
	let store_show = store.clone();
	let on_show_all = move |_| {
		let show = show_all_next.get();
		store_show.set_all_visible(show);
		show_all_next.set(!show);
	};

	view! {
		<div class="filter-panel">
			<div class="filter-actions">
				<button class="filter-bulk" on:click=on_expand_all>
					{move || if expand_all_next.get() { "Expand All" } else { "Collapse All" }}
				</button>
				<button class="filter-bulk" on:click=on_show_all>
					{move || if show_all_next.get() { "Show All" } else { "Hide All" }}
				</button>
			</div>
			<ul class="filter-items">
				{move || {
					let store = store.clone();
					rows()
						.into_iter()
						.map(|row| {
							let indicator = if row.has_children {
								if row.expanded { "\u{25be}" } else { "\u{25b8}" }
							} else {
								""
							};
							let row_id = row.id.clone();
							let hover_id = row.id.clone();
							let leave_store = store.clone();
							let enter_store = store.clone();
							let click_store = store.clone();
							let vis_store = store.clone();
							let vis_id = row.id.clone();
							let hovered = store.hovered;
							let class_id = row.id.clone();
							view! {
								<li
									class=move || {
										let mut class = String::from("filter-row");
										if !row.visible {
											class.push_str(" filter-row-hidden");
										}
										if hovered.get().as_deref() == Some(class_id.as_str()) {
											class.push_str(" filter-row-hovered");
										}
										class
									}
									style:padding-left=format!("{}px", 8 + row.depth * 16)
									on:mouseenter=move |_| {
										enter_store.hovered.set(Some(hover_id.clone()))
									}
									on:mouseleave=move |_| leave_store.hovered.set(None)
									on:click=move |_| click_store.toggle_expansion(&row_id)
								>
									<span class="filter-indicator">{indicator}</span>
									<span class="filter-name" style:color=row.tier.color()>
										{row.name.clone()}
									</span>
									// The root is always visible; it gets no toggle.
									{(row.depth > 0)
										.then(|| {
											view! {
												<button
													class="filter-visibility"
													title=if row.visible { "Hide" } else { "Show" }
													on:click=move |ev| {
														ev.stop_propagation();
														vis_store.toggle_visibility(&vis_id);
													}
												>
													{if row.visible { "\u{25cf}" } else { "\u{25cb}" }}
												</button>
											}
										})}
								</li>
							}
						})
						.collect_view()
				}}
			</ul>
		</div>
	}
}
