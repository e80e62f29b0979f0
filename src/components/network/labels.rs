//! Label placement policy.
//!
//! Big nodes carry their name inside the circle, wrapped and hyphenated to
//! fit; small nodes get a single external line pushed away from their
//! incoming edge. Text measurement goes through a seam so the policy can be
//! exercised without a canvas.

/// Node size below which labels move outside the circle (the root is always
/// internal regardless).
pub const INTERNAL_MIN_SIZE: f64 = 38.0;

/// Gap between a node's rim and its external label.
pub const EXTERNAL_OFFSET: f64 = 35.0;

const MIN_HYPHEN_PREFIX: usize = 3;

/// Measures rendered text width for a given font size. Canvas-backed in the
/// app, approximated in tests.
pub trait MeasureText {
	fn text_width(&self, text: &str, font_px: f64) -> f64;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
	Start,
	Middle,
	End,
}

impl TextAnchor {
	pub fn canvas_align(self) -> &'static str {
		match self {
			TextAnchor::Start => "left",
			TextAnchor::Middle => "center",
			TextAnchor::End => "right",
		}
	}
}

/// Font size and line height keyed to node size.
pub fn font_metrics(size: f64) -> (f64, f64) {
	if size >= 70.0 {
		(16.0, 17.0)
	} else if size >= 50.0 {
		(14.0, 15.0)
	} else {
		(12.0, 13.0)
	}
}

/// Vertical offset of the first line so the block is centered on the node.
pub fn first_line_offset(line_count: usize, line_height: f64) -> f64 {
	-(line_count.saturating_sub(1) as f64) * line_height / 2.0
}

/// Lines for an internal label. The root always gets its name stacked one
/// word per line ("Artificial" / "Intelligence"); everything else is packed
/// greedily into lines bounded by 1.6x the text radius (75% of the node
/// radius), hyphenating single words that cannot fit.
pub fn internal_lines(
	name: &str,
	size: f64,
	is_root: bool,
	measure: &dyn MeasureText,
) -> Vec<String> {
	if is_root {
		return name.split_whitespace().map(str::to_string).collect();
	}
	let (font_px, _) = font_metrics(size);
	let max_width = 1.6 * (size * 0.75);
	wrap(name, max_width, font_px, measure)
}

fn wrap(text: &str, max_width: f64, font_px: f64, measure: &dyn MeasureText) -> Vec<String> {
	let mut lines: Vec<String> = Vec::new();
	let mut current = String::new();
	for word in text.split_whitespace() {
		if measure.text_width(word, font_px) > max_width {
			if !current.is_empty() {
				lines.push(std::mem::take(&mut current));
			}
			let mut pieces = hyphenate(word, max_width, font_px, measure);
			// The last fragment may still share its line with later words.
			if let Some(last) = pieces.pop() {
				lines.append(&mut pieces);
				current = last;
			}
			continue;
		}
		let candidate = if current.is_empty() {
			word.to_string()
		} else {
			format!("{current} {word}")
		};
		if measure.text_width(&candidate, font_px) <= max_width {
			current = candidate;
		} else {
			if !current.is_empty() {
				lines.push(std::mem::take(&mut current));
			}
			current = word.to_string();
		}
	}
	if !current.is_empty() {
		lines.push(current);
	}
	if lines.is_empty() {
		lines.push(String::new());
	}
	lines
}

/// Split an overlong word into hyphen-terminated fragments. Each fragment
/// keeps at least three characters; the split point is the longest prefix
/// that still fits with its trailing hyphen, found by binary search.
fn hyphenate(word: &str, max_width: f64, font_px: f64, measure: &dyn MeasureText) -> Vec<String> {
	let mut pieces = Vec::new();
	let mut rest: Vec<char> = word.chars().collect();
	while rest.len() > MIN_HYPHEN_PREFIX
		&& measure.text_width(&rest.iter().collect::<String>(), font_px) > max_width
	{
		let mut lo = MIN_HYPHEN_PREFIX;
		let mut hi = rest.len() - 1;
		while lo < hi {
			let mid = (lo + hi + 1) / 2;
			let prefix: String = rest[..mid].iter().collect();
			if measure.text_width(&format!("{prefix}-"), font_px) <= max_width {
				lo = mid;
			} else {
				hi = mid - 1;
			}
		}
		pieces.push(format!("{}-", rest[..lo].iter().collect::<String>()));
		rest.drain(..lo);
	}
	pieces.push(rest.into_iter().collect());
	pieces
}

/// Offset and anchor for an external label, placed opposite the incoming
/// edge's direction. With no incoming edge the label sits to the right.
pub fn external_placement(
	node: (f64, f64),
	size: f64,
	incoming_source: Option<(f64, f64)>,
) -> (f64, f64, TextAnchor) {
	let dist = size + EXTERNAL_OFFSET;
	let (dx, dy) = match incoming_source {
		Some((sx, sy)) => {
			let (vx, vy) = (node.0 - sx, node.1 - sy);
			let len = (vx * vx + vy * vy).sqrt();
			if len < 1e-3 {
				(dist, 0.0)
			} else {
				(vx / len * dist, vy / len * dist)
			}
		}
		None => (dist, 0.0),
	};
	let anchor = if dx > 20.0 {
		TextAnchor::Start
	} else if dx < -20.0 {
		TextAnchor::End
	} else {
		TextAnchor::Middle
	};
	(dx, dy, anchor)
}
