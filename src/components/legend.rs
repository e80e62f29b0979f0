use leptos::prelude::*;

use crate::components::network::NodeTier;

/// Legend for the tier palette. Colors come from the same table the canvas
/// and the filter panel use.
#[component]
pub fn TierLegend() -> impl IntoView {
	view! {
		<div class="tier-legend">
			{NodeTier::ALL
				.into_iter()
				.map(|tier| {
					view! {
						<div class="legend-entry">
							<span class="legend-swatch" style:background-color=tier.color()></span>
							<span class="legend-label">{tier.label()}</span>
						</div>
					}
				})
				.collect_view()}
		</div>
	}
}
