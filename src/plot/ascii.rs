//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - series lines: one marker char per series (first series also gets `-`
//!   segments between its points)
//! - scatter points: `o`
//! - fitted trend: `-` line

use crate::domain::YearSeries;
use crate::math::ols::TrendLine;

/// One named line in a year plot.
pub struct PlotSeries<'a> {
    pub label: &'a str,
    pub marker: char,
    pub series: &'a YearSeries,
}

/// Render year-indexed series as overlaid lines.
pub fn render_year_plot(series: &[PlotSeries<'_>], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let points: Vec<Vec<(f64, f64)>> = series.iter().map(|s| s.series.points()).collect();
    let Some((x_min, x_max)) = x_range(points.iter().flatten()) else {
        return "Plot: no data\n".to_string();
    };
    let (y_min, y_max) = y_range(points.iter().flatten()).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for (s, pts) in series.iter().zip(&points) {
        draw_polyline(&mut grid, pts, x_min, x_max, y_min, y_max, s.marker);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: years=[{x_min:.0}, {x_max:.0}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    for s in series {
        out.push_str(&format!("  {} {}\n", s.marker, s.label));
    }
    out
}

/// Render a scatter with an optional fitted trend line.
pub fn render_scatter_plot(
    points: &[(f64, f64)],
    trend: Option<&TrendLine>,
    width: usize,
    height: usize,
    x_label: &str,
    y_label: &str,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((x_min, x_max)) = x_range(points.iter()) else {
        return "Plot: no data\n".to_string();
    };
    let (y_min, y_max) = y_range(points.iter()).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Trend first so points overlay it.
    if let Some(trend) = trend {
        let line: Vec<(f64, f64)> = (0..width.max(2))
            .map(|i| {
                let u = i as f64 / (width as f64 - 1.0);
                let x = x_min + u * (x_max - x_min);
                (x, trend.predict(x))
            })
            .collect();
        draw_polyline(&mut grid, &line, x_min, x_max, y_min, y_max, '-');
    }

    for &(x, y) in points {
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        grid[cy][cx] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {x_label}=[{x_min:.2}, {x_max:.2}] | {y_label}=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn x_range<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(x, _) in points {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    (min_x.is_finite() && max_x.is_finite() && max_x > min_x).then_some((min_x, max_x))
}

fn y_range<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    (min_y.is_finite() && max_y.is_finite() && max_y > min_y).then_some((min_y, max_y))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points {
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        if let Some((px, py)) = prev {
            draw_line(grid, px, py, cx, cy, ch);
        } else {
            grid[cy][cx] = ch;
        }
        prev = Some((cx, cy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_plot_golden_snapshot_small() {
        let mut s = YearSeries::default();
        s.push(2010, 0.0);
        s.push(2019, 9.0);

        let txt = render_year_plot(
            &[PlotSeries {
                label: "psup",
                marker: '*',
                series: &s,
            }],
            10,
            5,
        );
        let expected = concat!(
            "Plot: years=[2010, 2019] | y=[-0.45, 9.45]\n",
            "        **\n",
            "      **  \n",
            "    **    \n",
            "  **      \n",
            "**        \n",
            "  * psup\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn scatter_plot_marks_points_over_trend() {
        let points = vec![(0.0, 0.0), (10.0, 10.0)];
        let trend = TrendLine {
            intercept: 0.0,
            slope: 1.0,
        };
        let txt = render_scatter_plot(&points, Some(&trend), 12, 6, "x", "y");
        assert!(txt.starts_with("Plot: x=[0.00, 10.00]"));
        // Count markers in the grid only; the header line spells "Plot".
        let grid: String = txt.lines().skip(1).collect();
        assert_eq!(grid.matches('o').count(), 2);
        assert!(grid.contains('-'));
    }

    #[test]
    fn empty_series_renders_placeholder() {
        let s = YearSeries::default();
        let txt = render_year_plot(
            &[PlotSeries {
                label: "empty",
                marker: '*',
                series: &s,
            }],
            20,
            8,
        );
        assert_eq!(txt, "Plot: no data\n");
    }
}
