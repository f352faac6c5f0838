//! Chart Renderer
//!
//! One renderer for both dashboard charts, configured by [`ChartOptions`]:
//!
//! - `Time` scale: one point per dated record, values accumulated in order,
//!   drawn as a polyline with a marker per point
//! - `Category` scale: one equal-width slot per key, drawn as bars
//!
//! Rendering is split into [`ChartRenderer::plot`] (pure geometry) and
//! [`ChartRenderer::render`] (drawing tree).

use super::scale::LinearScale;
use super::series::{grouped, running, ChartPoint};
use super::svg::{num, Element, SVG_NS};
use super::tooltip::{hover_rules, Bounds, Tooltip, STYLE};
use super::{ChartOptions, ScaleKind};
use crate::client::Transaction;
use crate::format::{format_date, format_timestamp_millis};

/// Fraction of each bar slot left empty
pub const BAR_PADDING: f64 = 0.15;

/// Shown instead of a chart when there is nothing to draw
pub const EMPTY_MESSAGE: &str = "No data available";

const AXIS_COLOR: &str = "#4B5563";
const LABEL_COLOR: &str = "#9CA3AF";
const GRID_COLOR: &str = "#374151";
const MARKER_RADIUS: f64 = 4.0;
const TICK_LENGTH: f64 = 6.0;

/// An axis tick: position along the axis and its label
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// Chart geometry in drawable-area coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub points: Vec<ChartPoint>,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    /// Bar width, for category charts
    pub bar_width: Option<f64>,
}

/// Renders transactions into an SVG drawing
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    options: ChartOptions,
}

impl ChartRenderer {
    pub fn new(options: ChartOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Compute chart geometry. `None` when no record is plottable.
    pub fn plot(&self, records: &[Transaction]) -> Option<Plot> {
        match self.options.scale {
            ScaleKind::Time => self.plot_time(records),
            ScaleKind::Category => self.plot_category(records),
        }
    }

    fn plot_time(&self, records: &[Transaction]) -> Option<Plot> {
        let opts = &self.options;
        let series = running(records, opts.aggregation);
        if series.is_empty() {
            return None;
        }

        let (width, height) = (opts.plot_width(), opts.plot_height());

        let t_min = series.iter().map(|p| p.timestamp.timestamp_millis()).min()?;
        let t_max = series.iter().map(|p| p.timestamp.timestamp_millis()).max()?;
        let xs = LinearScale::new((t_min as f64, t_max as f64), (0.0, width));

        let y_max = series.iter().map(|p| p.value).fold(0.0, f64::max);
        let ys = LinearScale::new((0.0, y_max), (height, 0.0));

        let points = series
            .iter()
            .map(|p| ChartPoint {
                x: xs.map(p.timestamp.timestamp_millis() as f64),
                y: ys.map(p.value),
                label: format_date(&p.timestamp),
                value: p.value,
            })
            .collect();

        let x_ticks = xs
            .ticks(opts.x_ticks)
            .into_iter()
            .map(|t| Tick {
                position: xs.map(t),
                label: format_timestamp_millis(t.round() as i64),
            })
            .collect();

        Some(Plot {
            points,
            x_ticks,
            y_ticks: self.value_ticks(&ys),
            bar_width: None,
        })
    }

    fn plot_category(&self, records: &[Transaction]) -> Option<Plot> {
        let opts = &self.options;
        let groups = grouped(records, opts.aggregation);
        if groups.is_empty() {
            return None;
        }

        let (width, height) = (opts.plot_width(), opts.plot_height());
        let slot = width / groups.len() as f64;

        let y_max = groups.iter().map(|(_, v)| *v).fold(0.0, f64::max);
        let ys = LinearScale::new((0.0, y_max), (height, 0.0));

        let points: Vec<ChartPoint> = groups
            .into_iter()
            .enumerate()
            .map(|(i, (key, value))| ChartPoint {
                x: slot * i as f64 + slot / 2.0,
                y: ys.map(value),
                label: key,
                value,
            })
            .collect();

        let x_ticks = points
            .iter()
            .map(|p| Tick {
                position: p.x,
                label: p.label.clone(),
            })
            .collect();

        Some(Plot {
            points,
            x_ticks,
            y_ticks: self.value_ticks(&ys),
            bar_width: Some(slot * (1.0 - BAR_PADDING)),
        })
    }

    fn value_ticks(&self, ys: &LinearScale) -> Vec<Tick> {
        ys.ticks(self.options.y_ticks)
            .into_iter()
            .map(|v| Tick {
                position: ys.map(v),
                label: self.options.value_format.format(v),
            })
            .collect()
    }

    /// Render the chart, or the empty-state drawing when nothing is plottable
    pub fn render(&self, records: &[Transaction]) -> Element {
        let Some(plot) = self.plot(records) else {
            return self.placeholder(EMPTY_MESSAGE);
        };

        let opts = &self.options;
        let margin = opts.margin;

        let body = Element::new("g")
            .attr(
                "transform",
                format!("translate({},{})", num(margin.left), num(margin.top)),
            )
            .child(self.gridlines(&plot))
            .child(self.x_axis(&plot))
            .child(self.y_axis(&plot));

        let body = match opts.scale {
            ScaleKind::Time => body.child(self.line(&plot)).child(self.point_markers(&plot)),
            ScaleKind::Category => body.child(self.bar_markers(&plot)),
        };
        let body = body.child(self.tooltips(&plot));

        self.root(&hover_rules(plot.points.len())).child(body)
    }

    /// Render straight to SVG markup
    pub fn render_svg(&self, records: &[Transaction]) -> String {
        self.render(records).render()
    }

    /// A chart-sized drawing holding only a centered message
    pub fn placeholder(&self, message: &str) -> Element {
        let opts = &self.options;
        self.root("").child(
            Element::new("text")
                .attr("class", "empty-state")
                .num("x", opts.width / 2.0)
                .num("y", opts.height / 2.0)
                .attr("text-anchor", "middle")
                .attr("dominant-baseline", "middle")
                .attr("fill", LABEL_COLOR)
                .text(message),
        )
    }

    fn root(&self, hover: &str) -> Element {
        let opts = &self.options;
        let variant = match opts.scale {
            ScaleKind::Time => "chart-line",
            ScaleKind::Category => "chart-bar",
        };

        Element::new("svg")
            .attr("xmlns", SVG_NS)
            .attr(
                "viewBox",
                format!("0 0 {} {}", num(opts.width), num(opts.height)),
            )
            .attr("width", "100%")
            .attr("class", format!("chart {}", variant))
            .child(Element::new("style").text(format!("{}{}", STYLE, hover)))
    }

    fn gridlines(&self, plot: &Plot) -> Element {
        let width = self.options.plot_width();
        Element::new("g").attr("class", "grid").children(plot.y_ticks.iter().map(|tick| {
            Element::new("line")
                .num("x1", 0.0)
                .num("x2", width)
                .num("y1", tick.position)
                .num("y2", tick.position)
                .attr("stroke", GRID_COLOR)
                .attr("stroke-dasharray", "3 3")
        }))
    }

    fn x_axis(&self, plot: &Plot) -> Element {
        let (width, height) = (self.options.plot_width(), self.options.plot_height());
        let mut axis = Element::new("g").attr("class", "x-axis").child(
            Element::new("line")
                .num("x1", 0.0)
                .num("x2", width)
                .num("y1", height)
                .num("y2", height)
                .attr("stroke", AXIS_COLOR),
        );

        for tick in &plot.x_ticks {
            axis = axis.child(
                Element::new("line")
                    .num("x1", tick.position)
                    .num("x2", tick.position)
                    .num("y1", height)
                    .num("y2", height + TICK_LENGTH)
                    .attr("stroke", AXIS_COLOR),
            );

            let label = match self.options.scale {
                ScaleKind::Time => Element::new("text")
                    .num("x", tick.position)
                    .num("y", height + 25.0)
                    .attr("text-anchor", "middle"),
                ScaleKind::Category => {
                    let y = height + 14.0;
                    Element::new("text")
                        .num("x", tick.position)
                        .num("y", y)
                        .attr("text-anchor", "end")
                        .attr(
                            "transform",
                            format!("rotate(-45 {} {})", num(tick.position), num(y)),
                        )
                }
            };
            axis = axis.child(label.attr("fill", LABEL_COLOR).text(tick.label.clone()));
        }

        axis
    }

    fn y_axis(&self, plot: &Plot) -> Element {
        let height = self.options.plot_height();
        let mut axis = Element::new("g").attr("class", "y-axis").child(
            Element::new("line")
                .num("x1", 0.0)
                .num("x2", 0.0)
                .num("y1", 0.0)
                .num("y2", height)
                .attr("stroke", AXIS_COLOR),
        );

        for tick in &plot.y_ticks {
            axis = axis
                .child(
                    Element::new("line")
                        .num("x1", -TICK_LENGTH)
                        .num("x2", 0.0)
                        .num("y1", tick.position)
                        .num("y2", tick.position)
                        .attr("stroke", AXIS_COLOR),
                )
                .child(
                    Element::new("text")
                        .num("x", -15.0)
                        .num("y", tick.position)
                        .attr("text-anchor", "end")
                        .attr("dominant-baseline", "middle")
                        .attr("fill", LABEL_COLOR)
                        .text(tick.label.clone()),
                );
        }

        axis
    }

    fn line(&self, plot: &Plot) -> Element {
        let d = plot
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let cmd = if i == 0 { 'M' } else { 'L' };
                format!("{} {} {}", cmd, num(p.x), num(p.y))
            })
            .collect::<Vec<_>>()
            .join(" ");

        Element::new("path")
            .attr("class", "series")
            .attr("d", d)
            .attr("fill", "none")
            .attr("stroke", &self.options.color)
            .attr("stroke-width", 2)
    }

    fn point_markers(&self, plot: &Plot) -> Element {
        let opts = &self.options;
        let markers = plot.points.iter().enumerate().map(|(i, p)| {
            self.marker(i, p).child(
                Element::new("circle")
                    .num("cx", p.x)
                    .num("cy", p.y)
                    .num("r", MARKER_RADIUS)
                    .attr("fill", &opts.color),
            )
        });
        Element::new("g").attr("class", "points").children(markers)
    }

    fn bar_markers(&self, plot: &Plot) -> Element {
        let opts = &self.options;
        let height = opts.plot_height();
        let bar_width = plot.bar_width.unwrap_or(0.0);

        let bars = plot.points.iter().enumerate().map(|(i, p)| {
            self.marker(i, p).child(
                Element::new("rect")
                    .attr("class", "bar")
                    .num("x", p.x - bar_width / 2.0)
                    .num("y", p.y)
                    .num("width", bar_width)
                    .num("height", (height - p.y).max(0.0))
                    .attr("fill", &opts.color),
            )
        });
        Element::new("g").attr("class", "bars").children(bars)
    }

    fn marker(&self, index: usize, point: &ChartPoint) -> Element {
        Element::new("g")
            .attr("class", "marker")
            .attr("data-i", index)
            .attr("data-label", &point.label)
            .attr("data-value", self.options.value_format.format(point.value))
    }

    /// Panels for every point, drawn after all markers so none is covered
    fn tooltips(&self, plot: &Plot) -> Element {
        let opts = &self.options;
        let origin = (opts.margin.left, opts.margin.top);
        let container = Bounds {
            width: opts.width,
            height: opts.height,
        };

        let panels = plot.points.iter().enumerate().map(|(i, p)| {
            let value = opts.value_format.format(p.value);
            let heading = match opts.scale {
                ScaleKind::Time => format!("Date: {}", p.label),
                ScaleKind::Category => p.label.clone(),
            };
            let tooltip = Tooltip::new([heading, format!("{}: {}", opts.value_label, value)]);

            tooltip
                .panel((origin.0 + p.x, origin.1 + p.y), container, origin)
                .attr("data-i", i)
        });
        Element::new("g").attr("class", "tooltips").children(panels)
    }
}
