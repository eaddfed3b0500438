use std::f64::consts::TAU;

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, PlotUi, Polygon};

use crate::chart::{x_positions, Chart, ChartKind, Histogram, PieSlice, SeriesPoint, XScale};
use crate::color::{rd_bu_palette, SERIES_COLOR};

const PLOT_HEIGHT: f32 = 420.0;

// ---------------------------------------------------------------------------
// Chart rendering (central panel)
// ---------------------------------------------------------------------------

/// Draw a chart description with egui_plot.
pub fn chart_plot(ui: &mut Ui, chart: &Chart) {
    ui.strong(chart.title.as_str());
    match &chart.kind {
        ChartKind::Line(points) => line_plot(ui, chart, points),
        ChartKind::Bar(points) => bar_plot(ui, chart, points),
        ChartKind::Histogram(hist) => histogram_plot(ui, chart, hist),
        ChartKind::Pie(slices) => pie_plot(ui, slices),
    }
}

/// Cartesian plot with the chart's axis labels and X tick labels from `scale`.
fn show_axes_plot(
    ui: &mut Ui,
    id: &str,
    chart: &Chart,
    scale: XScale,
    add_contents: impl FnOnce(&mut PlotUi),
) {
    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str())
        .x_axis_formatter(move |mark, _range| scale.tick_label(mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, add_contents);
}

fn line_plot(ui: &mut Ui, chart: &Chart, points: &[SeriesPoint]) {
    let xs: Vec<_> = points.iter().map(|p| &p.x).collect();
    let (positions, scale) = x_positions(&xs);

    let series: PlotPoints = positions
        .iter()
        .zip(points)
        .filter_map(|(x, p)| Some([(*x)?, p.y?]))
        .collect();

    show_axes_plot(ui, "line_chart", chart, scale, |plot_ui| {
        plot_ui.line(
            Line::new(series)
                .name(&chart.y_label)
                .color(SERIES_COLOR)
                .width(2.0),
        );
    });
}

fn bar_plot(ui: &mut Ui, chart: &Chart, points: &[SeriesPoint]) {
    let xs: Vec<_> = points.iter().map(|p| &p.x).collect();
    let (positions, scale) = x_positions(&xs);
    let width = bar_width(&positions);

    let bars: Vec<Bar> = positions
        .iter()
        .zip(points)
        .filter_map(|(x, p)| {
            Some(
                Bar::new((*x)?, p.y?)
                    .width(width)
                    .name(p.x.to_string()),
            )
        })
        .collect();

    show_axes_plot(ui, "bar_chart", chart, scale, |plot_ui| {
        plot_ui.bar_chart(
            BarChart::new(bars)
                .name(&chart.y_label)
                .color(SERIES_COLOR),
        );
    });
}

/// 80% of the smallest gap between neighbouring bars.
fn bar_width(positions: &[Option<f64>]) -> f64 {
    let mut xs: Vec<f64> = positions.iter().flatten().copied().collect();
    xs.sort_by(f64::total_cmp);
    xs.windows(2)
        .map(|w| w[1] - w[0])
        .filter(|gap| *gap > 0.0)
        .fold(None, |min: Option<f64>, gap| Some(min.map_or(gap, |m| m.min(gap))))
        .unwrap_or(1.0)
        * 0.8
}

fn histogram_plot(ui: &mut Ui, chart: &Chart, hist: &Histogram) {
    if hist.total() == 0 {
        ui.label("Nothing to plot: the selected column has no values.");
        return;
    }
    let (bars, scale) = match hist {
        Histogram::Numeric(bins) => {
            let bars: Vec<Bar> = bins
                .iter()
                .map(|b| {
                    Bar::new((b.start + b.end) / 2.0, b.count as f64)
                        .width(b.end - b.start)
                        .name(format!("{:.2} – {:.2}", b.start, b.end))
                })
                .collect();
            (bars, XScale::Numeric)
        }
        Histogram::Categorical(counts) => {
            let labels: Vec<String> = counts.iter().map(|(v, _)| v.to_string()).collect();
            let bars: Vec<Bar> = counts
                .iter()
                .enumerate()
                .map(|(i, (v, count))| {
                    Bar::new(i as f64, *count as f64)
                        .width(0.8)
                        .name(v.to_string())
                })
                .collect();
            (bars, XScale::Categories(labels))
        }
    };

    show_axes_plot(ui, "histogram", chart, scale, |plot_ui| {
        plot_ui.bar_chart(
            BarChart::new(bars)
                .name(&chart.x_label)
                .color(SERIES_COLOR),
        );
    });
}

/// Pie drawn as filled polygons on a unit circle, starting at 12 o'clock and
/// running clockwise.
fn pie_plot(ui: &mut Ui, slices: &[PieSlice]) {
    let total: usize = slices.iter().map(|s| s.count).sum();
    if total == 0 {
        ui.label("Nothing to plot: the selected column has no values.");
        return;
    }
    let colors = rd_bu_palette(slices.len());

    Plot::new("pie_chart")
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for (slice, color) in slices.iter().zip(colors) {
                let fraction = slice.count as f64 / total as f64;
                let sweep = fraction * TAU;
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(sector(start, sweep)))
                        .name(format!("{} ({:.1}%)", slice.value, fraction * 100.0))
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                );
                start += sweep;
            }
        });
}

/// Outline of a circle sector; angles in radians, clockwise from the top.
fn sector(start: f64, sweep: f64) -> Vec<[f64; 2]> {
    let steps = ((sweep / TAU) * 128.0).ceil().max(2.0) as usize;
    let mut points = vec![[0.0, 0.0]];
    points.extend((0..=steps).map(|i| {
        let angle = start + sweep * i as f64 / steps as f64;
        [angle.sin(), angle.cos()]
    }));
    points
}
