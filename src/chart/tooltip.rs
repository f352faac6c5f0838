//! Hover Tooltips
//!
//! Panels live in their own layer drawn after every marker, so a panel is
//! never covered by a neighbouring point or bar. Panel and marker share a
//! `data-i` index, and [`hover_rules`] reveals panel `i` only while marker `i`
//! is hovered, so at most one tooltip is visible at a time.
//!
//! Placement follows the marker: centered horizontally, 10px above, then
//! clamped so the panel stays inside the chart container.

use std::fmt::Write;

use super::svg::Element;

/// Gap between the marker and the bottom edge of the panel
pub const ANCHOR_GAP: f64 = 10.0;

const PADDING_X: f64 = 12.0;
const PADDING_Y: f64 = 8.0;
const LINE_HEIGHT: f64 = 18.0;
const FONT_SIZE: f64 = 14.0;
/// Average glyph advance at 14px
const CHAR_WIDTH: f64 = 7.6;

/// Hover behaviour and panel styling, embedded in every chart
pub const STYLE: &str = "\
.chart .tooltip { visibility: hidden; pointer-events: none; }
.chart .marker:hover circle, .chart .marker:hover .bar { opacity: 0.8; }
.chart .tooltip rect { fill: rgba(17, 24, 39, 0.9); stroke: #374151; }
.chart .tooltip text { fill: #F3F4F6; font-size: 14px; }
.chart text { font-family: sans-serif; font-size: 12px; }
";

/// One rule per marker index: hovering marker `i` shows panel `i`
pub fn hover_rules(count: usize) -> String {
    let mut rules = String::new();
    for i in 0..count {
        let _ = writeln!(
            rules,
            ".chart:has(.marker[data-i=\"{i}\"]:hover) .tooltip[data-i=\"{i}\"] \
             {{ visibility: visible; }}"
        );
    }
    rules
}

/// A rectangle in container coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

/// Tooltip content
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    lines: Vec<String>,
}

impl Tooltip {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Estimated panel size
    pub fn size(&self) -> Bounds {
        let longest = self
            .lines
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);

        Bounds {
            width: longest as f64 * CHAR_WIDTH + 2.0 * PADDING_X,
            height: self.lines.len() as f64 * LINE_HEIGHT + 2.0 * PADDING_Y,
        }
    }

    /// Build the panel for a marker at `anchor` (container coordinates).
    ///
    /// `origin` is the offset of the drawing group the panel is nested in,
    /// so the panel can be positioned in container space.
    pub fn panel(&self, anchor: (f64, f64), container: Bounds, origin: (f64, f64)) -> Element {
        let size = self.size();
        let (left, top) = place(anchor, size, container);

        let text = self.lines.iter().enumerate().map(|(i, line)| {
            Element::new("text")
                .num("x", PADDING_X)
                .num("y", PADDING_Y + FONT_SIZE + i as f64 * LINE_HEIGHT)
                .text(line.clone())
        });

        Element::new("g")
            .attr("class", "tooltip")
            .attr(
                "transform",
                format!(
                    "translate({},{})",
                    super::svg::num(left - origin.0),
                    super::svg::num(top - origin.1)
                ),
            )
            .child(
                Element::new("rect")
                    .num("width", size.width)
                    .num("height", size.height)
                    .attr("rx", 6),
            )
            .children(text)
    }
}

/// Top-left corner for a panel of `size` next to `anchor`, kept inside
/// `container`. When the panel is wider than the container it sticks to the
/// left edge.
pub fn place(anchor: (f64, f64), size: Bounds, container: Bounds) -> (f64, f64) {
    let left = anchor.0 - size.width / 2.0;
    let top = anchor.1 - size.height - ANCHOR_GAP;

    let max_left = (container.width - size.width).max(0.0);
    (left.clamp(0.0, max_left), top.max(0.0))
}
