//! Plotters-powered chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - easy to extend later (legend, annotations, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
// Keep the plotters `Color` trait (for `filled()`) in scope even though the
// ratatui `Color` type below shadows its name.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One line series with its terminal color.
pub struct ChartLine<'a> {
    pub color: RGBColor,
    pub points: &'a [(f64, f64)],
}

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are computed
/// outside the render call. This keeps `render()` focused on drawing and makes
/// it easy to test/benchmark the data prep separately.
pub struct SeriesChart<'a> {
    /// Line series (time series, trend lines).
    pub lines: &'a [ChartLine<'a>],
    /// Scatter series (commune points).
    pub scatter: &'a [(f64, f64)],
    /// Histogram bars as `(x0, x1, height)`.
    pub bars: &'a [(f64, f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Axis labels (kept simple for terminal rendering).
    pub x_label: &'a str,
    pub y_label: String,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for SeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        // `plotters-ratatui-backend` draws Plotters primitives via Ratatui's
        // `Canvas` widget, which ultimately writes to the terminal buffer.
        //
        // We delegate rendering to the crate-provided widget helper to avoid
        // coupling our code to its internal backend types.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Small margins keep the chart readable without wasting space.
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes + tick labels, with mesh lines disabled to reduce visual
            // clutter in low-resolution terminal rendering.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(&self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // 1) Histogram bars (drawn first so series stay visible on top).
            let bar_color = RGBColor(0, 128, 255);
            chart.draw_series(self.bars.iter().map(|&(bx0, bx1, h)| {
                Rectangle::new([(bx0, 0.0), (bx1, h)], bar_color.filled())
            }))?;

            // 2) Line series.
            for line in self.lines {
                chart.draw_series(LineSeries::new(line.points.iter().copied(), &line.color))?;
            }

            // 3) Scatter points.
            //
            // We intentionally avoid `Circle` markers here. The underlying
            // `plotters-ratatui-backend` currently maps circle radii incorrectly
            // (pixel radius -> normalized canvas units), producing huge circles.
            // A `Pixel` gives a clean dot that looks good in terminals.
            chart.draw_series(
                self.scatter
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), WHITE)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    #[test]
    fn renders_bars_lines_and_points_into_a_buffer() {
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        let pts = [(0.0, 0.0), (10.0, 5.0)];
        let lines = [ChartLine {
            color: RGBColor(0, 255, 255),
            points: &pts,
        }];

        SeriesChart {
            lines: &lines,
            scatter: &[(5.0, 2.5)],
            bars: &[(0.0, 1.0, 3.0), (1.0, 2.0, 1.0)],
            x_bounds: [0.0, 10.0],
            y_bounds: [0.0, 5.0],
            x_label: "x",
            y_label: "y".to_string(),
            fmt_x: |v| format!("{v:.0}"),
            fmt_y: |v| format!("{v:.0}"),
        }
        .render(area, &mut buf);

        assert_ne!(buf, Buffer::empty(area));
    }

    #[test]
    fn tiny_area_shows_resize_hint() {
        let area = Rect::new(0, 0, 12, 4);
        let mut buf = Buffer::empty(area);

        SeriesChart {
            lines: &[],
            scatter: &[],
            bars: &[],
            x_bounds: [0.0, 1.0],
            y_bounds: [0.0, 1.0],
            x_label: "x",
            y_label: "y".to_string(),
            fmt_x: |v| format!("{v:.0}"),
            fmt_y: |v| format!("{v:.0}"),
        }
        .render(area, &mut buf);

        let row: String = (0..area.width)
            .filter_map(|x| buf.cell((x, 0)).map(|c| c.symbol().to_string()))
            .collect();
        assert!(row.starts_with("Chart area"));
    }
}
