//! PNG bar charts for the report.
//!
//! Each chart is produced by a standalone function that takes the bar data and a target path and
//! writes one image; no drawing state is shared between calls.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle, FontTransform};
use thiserror::Error;

use crate::analysis::Summary;
use crate::error::ReportError;
use crate::fonts;
use crate::format::currency_compact;
use crate::period::ReportPeriod;

/// Font family name the chart text is registered under.
const FONT_FAMILY: &str = "sans-serif";
const NO_DATA_MESSAGE: &str = "No data available";

const DAILY_REVENUE_SIZE: (u32, u32) = (1200, 600);
const TOP_SUPPORTERS_SIZE: (u32, u32) = (1200, 800);

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);
const BAR_HALF_WIDTH: f64 = 0.4;
/// Largest factor an axis is stretched past the highest bar.
const AXIS_HEADROOM: f64 = 1.25;

/// Errors raised while drawing a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart font unavailable")]
    Font(#[source] genpdf::error::Error),

    #[error("chart font '{0}' could not be parsed")]
    InvalidFont(String),

    #[error("drawing failed: {0}")]
    Draw(String),
}

fn draw_error<E: fmt::Display>(err: E) -> ChartError {
    ChartError::Draw(err.to_string())
}

/// Labelled values for a bar chart, in display order.
#[derive(Clone, Debug, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub category_axis: String,
    pub value_axis: String,
    pub bars: Vec<(String, f64)>,
}

impl BarChart {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Largest bar value, or an error when a value cannot be placed on an axis.
    fn max_value(&self) -> Result<f64, ChartError> {
        let max = self.bars.iter().map(|(_, value)| *value).fold(0.0, f64::max);
        let plottable = (max * AXIS_HEADROOM).is_finite()
            && self.bars.iter().all(|(_, value)| value.is_finite());
        if plottable {
            Ok(max)
        } else {
            Err(ChartError::Draw(format!(
                "'{}' has a value too large to plot",
                self.title
            )))
        }
    }

    fn label(&self, index: usize) -> &str {
        self.bars.get(index).map(|(label, _)| label.as_str()).unwrap_or("")
    }
}

/// Revenue per day, in the order the days appear in the summary.
pub fn daily_revenue_chart(summary: &Summary, period: &ReportPeriod) -> BarChart {
    BarChart {
        title: format!("Daily Revenue - {}", period.label()),
        category_axis: "Date".into(),
        value_axis: "Revenue ($)".into(),
        bars: summary
            .daily_revenue
            .iter()
            .map(|(day, revenue)| (day.clone(), *revenue))
            .collect(),
    }
}

/// Supporter totals, highest first.
pub fn top_supporters_chart(summary: &Summary, period: &ReportPeriod) -> BarChart {
    BarChart {
        title: format!("Top 10 Supporters - {}", period.label()),
        category_axis: "Supporter".into(),
        value_axis: "Total Donated ($)".into(),
        bars: summary
            .top_supporters
            .iter()
            .map(|supporter| (supporter.name.clone(), supporter.total))
            .collect(),
    }
}

fn register_chart_font() -> Result<(), ChartError> {
    let bytes = fonts::chart_font_bytes().map_err(ChartError::Font)?;
    register_font(FONT_FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| ChartError::InvalidFont(FONT_FAMILY.to_owned()))
}

/// Maps an axis position back to the bar drawn there, if the position is a bar centre.
fn bar_index(position: f64, count: usize) -> Option<usize> {
    let rounded = position.round();
    if (position - rounded).abs() > 1e-6 || rounded < 0.0 || rounded >= count as f64 {
        return None;
    }
    Some(rounded as usize)
}

fn draw_placeholder(root: &DrawingArea<BitMapBackend<'_>, Shift>, title: &str) -> Result<(), ChartError> {
    let (width, height) = root.dim_in_pixel();
    root.titled(title, (FONT_FAMILY, 28)).map_err(draw_error)?;
    let style =
        TextStyle::from((FONT_FAMILY, 20).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    root.draw_text(
        NO_DATA_MESSAGE,
        &style,
        ((width / 2) as i32, (height / 2) as i32),
    )
    .map_err(draw_error)
}

/// Draws `chart` as vertical bars, one per category, left to right.
pub fn render_vertical_bars(chart: &BarChart, path: &Path, size: (u32, u32)) -> Result<(), ChartError> {
    let max = chart.max_value()?;
    register_chart_font()?;
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(draw_error)?;

    if chart.is_empty() {
        draw_placeholder(&root, &chart.title)?;
        return root.present().map_err(draw_error);
    }

    let count = chart.bars.len();
    let y_max = if max > 0.0 { max * 1.1 } else { 1.0 };
    let x_formatter = |x: &f64| {
        bar_index(*x, count)
            .map(|index| chart.label(index).to_owned())
            .unwrap_or_default()
    };
    let y_formatter = |y: &f64| format!("{:.0}", y);

    let mut context = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT_FAMILY, 28))
        .margin(20)
        .x_label_area_size(110)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..(count as f64 - 0.5), 0f64..y_max)
        .map_err(draw_error)?;

    context
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(count + 1)
        .x_label_formatter(&x_formatter)
        .x_label_style((FONT_FAMILY, 14).into_font().transform(FontTransform::Rotate90))
        .y_label_formatter(&y_formatter)
        .x_desc(chart.category_axis.as_str())
        .y_desc(chart.value_axis.as_str())
        .draw()
        .map_err(draw_error)?;

    context
        .draw_series(chart.bars.iter().enumerate().map(|(index, (_, value))| {
            let x = index as f64;
            Rectangle::new(
                [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, *value)],
                BAR_COLOR.filled(),
            )
        }))
        .map_err(draw_error)?;

    root.present().map_err(draw_error)
}

/// Draws `chart` as horizontal bars with the first category at the top and a currency label at
/// the end of every bar.
pub fn render_horizontal_bars(chart: &BarChart, path: &Path, size: (u32, u32)) -> Result<(), ChartError> {
    let max = chart.max_value()?;
    register_chart_font()?;
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(draw_error)?;

    if chart.is_empty() {
        draw_placeholder(&root, &chart.title)?;
        return root.present().map_err(draw_error);
    }

    let count = chart.bars.len();
    // Leave room to the right of the longest bar for its value label.
    let x_max = if max > 0.0 { max * AXIS_HEADROOM } else { 1.0 };
    // Bars are stacked bottom-up, so the first entry gets the highest row.
    let row = |index: usize| (count - 1 - index) as f64;
    let y_formatter = |y: &f64| {
        bar_index(*y, count)
            .map(|position| chart.label(count - 1 - position).to_owned())
            .unwrap_or_default()
    };
    let x_formatter = |x: &f64| format!("{:.0}", x);

    let mut context = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT_FAMILY, 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(220)
        .build_cartesian_2d(0f64..x_max, -0.5f64..(count as f64 - 0.5))
        .map_err(draw_error)?;

    context
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(count + 1)
        .y_label_formatter(&y_formatter)
        .x_label_formatter(&x_formatter)
        .x_desc(chart.value_axis.as_str())
        .draw()
        .map_err(draw_error)?;

    context
        .draw_series(chart.bars.iter().enumerate().map(|(index, (_, value))| {
            let y = row(index);
            Rectangle::new(
                [(0.0, y - BAR_HALF_WIDTH), (*value, y + BAR_HALF_WIDTH)],
                BAR_COLOR.filled(),
            )
        }))
        .map_err(draw_error)?;

    let label_style =
        TextStyle::from((FONT_FAMILY, 16).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
    context
        .draw_series(chart.bars.iter().enumerate().map(|(index, (_, value))| {
            Text::new(
                currency_compact(*value),
                (*value, row(index)),
                label_style.clone(),
            )
        }))
        .map_err(draw_error)?;

    root.present().map_err(draw_error)
}

/// Paths of the two chart images of a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartPaths {
    pub daily_revenue: PathBuf,
    pub top_supporters: PathBuf,
}

impl ChartPaths {
    /// File locations for `period` inside `images_dir`.
    pub fn for_period(images_dir: &Path, period: &ReportPeriod) -> Self {
        Self {
            daily_revenue: images_dir.join(format!(
                "daily_revenue_{}_{}.png",
                period.year(),
                period.month()
            )),
            top_supporters: images_dir.join(format!(
                "top_supporters_{}_{}.png",
                period.year(),
                period.month()
            )),
        }
    }
}

/// Renders both report charts into `images_dir`, creating the directory when needed.
pub fn render_report_charts(
    summary: &Summary,
    period: &ReportPeriod,
    images_dir: &Path,
) -> Result<ChartPaths, ReportError> {
    fs::create_dir_all(images_dir).map_err(|source| ReportError::io(images_dir, source))?;
    let paths = ChartPaths::for_period(images_dir, period);

    let daily = daily_revenue_chart(summary, period);
    debug!("Drawing {} daily revenue bars", daily.bars.len());
    render_vertical_bars(&daily, &paths.daily_revenue, DAILY_REVENUE_SIZE).map_err(|source| {
        ReportError::Chart {
            path: paths.daily_revenue.clone(),
            source,
        }
    })?;

    let supporters = top_supporters_chart(summary, period);
    debug!("Drawing {} supporter bars", supporters.bars.len());
    render_horizontal_bars(&supporters, &paths.top_supporters, TOP_SUPPORTERS_SIZE).map_err(
        |source| ReportError::Chart {
            path: paths.top_supporters.clone(),
            source,
        },
    )?;

    info!(
        "Visualizations created: {}, {}",
        paths.daily_revenue.display(),
        paths.top_supporters.display()
    );
    Ok(paths)
}
