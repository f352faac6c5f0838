//! SVG Charts
//!
//! Renders the dashboard's two charts as self-contained SVG markup.
//!
//! ## Architecture
//!
//! - **series**: running totals and per-skill aggregates from transactions
//! - **scale**: clamped linear data-to-pixel mapping
//! - **svg**: the drawing tree and its serializer
//! - **tooltip**: hover panels, clamped inside the chart
//! - **renderer**: axes, gridlines, lines, bars and markers
//!
//! Both charts go through the same [`ChartRenderer`]; [`ChartOptions`]
//! decides aggregation, x-scale kind, size and tick counts.

pub mod renderer;
pub mod scale;
pub mod series;
pub mod svg;
pub mod tooltip;

pub use renderer::{ChartRenderer, Plot, Tick, BAR_PADDING, EMPTY_MESSAGE};
pub use scale::LinearScale;
pub use series::{grouped, running, skill_key, Aggregation, ChartPoint, TimedValue, SKILL_PREFIX};
pub use svg::Element;
pub use tooltip::Tooltip;

use serde::{Deserialize, Serialize};

use crate::format::{format_percent, format_xp};

/// Kind of x axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    /// Continuous time axis, one point per record
    Time,
    /// One slot per distinct key
    Category,
}

/// How values are printed on the y axis and in tooltips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    /// Byte units (`1.5 kB`)
    Xp,
    /// Whole percent (`55%`)
    Percent,
}

impl ValueFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            ValueFormat::Xp => format_xp(value),
            ValueFormat::Percent => format_percent(value),
        }
    }
}

/// Space between the SVG edge and the drawable area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 40.0,
            bottom: 30.0,
            left: 80.0,
        }
    }
}

/// Chart configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub title: String,
    pub aggregation: Aggregation,
    pub scale: ScaleKind,
    pub value_format: ValueFormat,
    /// Tooltip caption for the value line
    pub value_label: String,
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    /// Number of x-axis intervals (time scale only)
    pub x_ticks: usize,
    /// Number of y-axis intervals
    pub y_ticks: usize,
    pub color: String,
}

impl ChartOptions {
    /// Cumulative XP over time
    pub fn xp_progress() -> Self {
        Self {
            title: "XP Progress".to_string(),
            aggregation: Aggregation::Sum,
            scale: ScaleKind::Time,
            value_format: ValueFormat::Xp,
            value_label: "Total XP".to_string(),
            width: 800.0,
            height: 600.0,
            margin: Margin::default(),
            x_ticks: 5,
            y_ticks: 5,
            color: "#4ADE80".to_string(),
        }
    }

    /// Best level per skill
    pub fn skills() -> Self {
        Self {
            title: "Skills".to_string(),
            aggregation: Aggregation::Max,
            scale: ScaleKind::Category,
            value_format: ValueFormat::Percent,
            value_label: "Level".to_string(),
            width: 800.0,
            height: 400.0,
            // Rotated skill names need room below the axis
            margin: Margin {
                bottom: 90.0,
                left: 60.0,
                ..Margin::default()
            },
            x_ticks: 0,
            y_ticks: 10,
            color: "#60A5FA".to_string(),
        }
    }

    /// Builder method: override the overall size
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Width of the drawable area
    pub fn plot_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    /// Height of the drawable area
    pub fn plot_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawable_area() {
        let options = ChartOptions::xp_progress();
        assert_eq!(options.plot_width(), 680.0);
        assert_eq!(options.plot_height(), 550.0);

        let tiny = ChartOptions::xp_progress().with_size(50.0, 10.0);
        assert_eq!(tiny.plot_width(), 0.0);
        assert_eq!(tiny.plot_height(), 0.0);
    }

    #[test]
    fn test_value_format() {
        assert_eq!(ValueFormat::Xp.format(1500.0), "1.5 kB");
        assert_eq!(ValueFormat::Percent.format(55.0), "55%");
    }
}
