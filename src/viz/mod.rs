//! Visualization: render the ranking chart to **SVG**, **PNG** or an in-memory RGB buffer.
//!
//! - One line per country with a marker on every observation (missing years are not interpolated)
//! - Percentage mode: Y = headcount ratio, axis starts at 0
//! - Rank mode: Y = per-year rank, axis inverted so rank 1 (highest poverty) is at the top
//! - Distinct series colors (Microsoft Office palette), locale-aware tick labels
//! - Legend placement: `Inside`, `Right`, `Bottom`

pub mod legend;
pub mod text;
pub mod types;
pub mod util;

pub use types::{ChartOptions, DEFAULT_LEGEND_MODE, LegendMode, MarkerShape};

use crate::dashboard::ChartData;
use crate::models::YAxisMode;
use anyhow::{Result, anyhow};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::LineSeries;
use plotters::style::FontFamily;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Once;

use legend::{LegendItem, draw_legend_panel, estimate_bottom_legend_height_px};
use util::{compute_left_label_area_px, integer_tick_label, office_color, rate_tick_label};

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

/// Value ranges of a chart, already in drawing coordinates.
///
/// Rank mode draws `-rank` so that the plain (non-reversed) f64 axis shows
/// rank 1 at the top; tick labels undo the sign.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Extent {
    x: (f64, f64),
    y: (f64, f64),
}

fn extent(chart: &ChartData) -> Result<Extent> {
    let points: Vec<(i32, f64)> = chart
        .series
        .iter()
        .flat_map(|s| s.points.iter().copied())
        .collect();
    if points.is_empty() {
        return Err(anyhow!("no data to plot"));
    }

    let mut x_min = chart.year_min.min(points.iter().map(|p| p.0).min().unwrap_or(chart.year_min));
    let mut x_max = chart.year_max.max(points.iter().map(|p| p.0).max().unwrap_or(chart.year_max));
    if x_min == x_max {
        x_min -= 1;
        x_max += 1;
    }

    let max_val = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let y = match chart.y_axis {
        YAxisMode::Percentage => {
            let top = if max_val <= 0.0 { 1.0 } else { max_val * 1.05 };
            (0.0, top)
        }
        YAxisMode::Rank => (-(max_val.max(1.0) + 0.5), -0.5),
    };

    Ok(Extent {
        x: (x_min as f64, x_max as f64),
        y,
    })
}

fn to_draw_y(mode: YAxisMode, v: f64) -> f64 {
    match mode {
        YAxisMode::Percentage => v,
        YAxisMode::Rank => -v,
    }
}

fn y_tick_label(mode: YAxisMode, v: f64, locale: &str) -> String {
    match mode {
        YAxisMode::Percentage => rate_tick_label(v, locale),
        YAxisMode::Rank => integer_tick_label(-v),
    }
}

/// Render `chart` to a file; `.svg` selects SVG, anything else PNG.
pub fn plot_chart<P: AsRef<Path>>(chart: &ChartData, out_path: P, opts: &ChartOptions) -> Result<()> {
    let ext = extent(chart)?;
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let size = (opts.width, opts.height);

    let is_svg = out_path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.eq_ignore_ascii_case("svg"));
    if is_svg {
        let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_chart(root, chart, ext, opts)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_chart(root, chart, ext, opts)?;
    }
    Ok(())
}

/// Render `chart` to an SVG document in memory.
pub fn render_svg(chart: &ChartData, opts: &ChartOptions) -> Result<String> {
    let ext = extent(chart)?;
    ensure_fonts_registered();
    let mut out = String::new();
    {
        let root = SVGBackend::with_string(&mut out, (opts.width, opts.height)).into_drawing_area();
        draw_chart(root, chart, ext, opts)?;
    }
    Ok(out)
}

/// Render `chart` into an RGB8 buffer of `width * height * 3` bytes.
pub fn render_rgb(chart: &ChartData, opts: &ChartOptions) -> Result<Vec<u8>> {
    let ext = extent(chart)?;
    ensure_fonts_registered();
    let mut buf = vec![0u8; opts.width as usize * opts.height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (opts.width, opts.height)).into_drawing_area();
        draw_chart(root, chart, ext, opts)?;
    }
    Ok(buf)
}

fn draw_chart<DB>(root: DrawingArea<DB, Shift>, chart: &ChartData, ext: Extent, opts: &ChartOptions) -> Result<()>
where
    DB: DrawingBackend,
{
    const MARGIN: i32 = 16;
    let mode = chart.y_axis;
    let locale = opts.locale.as_str();

    let y_label_count = match mode {
        YAxisMode::Percentage => 10usize,
        // One label per rank when ranks are few, otherwise plotters picks nice steps.
        YAxisMode::Rank => ((ext.y.1 - ext.y.0).round() as usize).clamp(2, 12),
    };
    let x_label_count = ((ext.x.1 - ext.x.0) as usize + 1).min(12);

    // Left gutter sized from the labels that will actually be drawn.
    let sample_labels: Vec<String> = (0..=y_label_count)
        .map(|i| {
            let t = i as f64 / y_label_count as f64;
            y_tick_label(mode, ext.y.0 + (ext.y.1 - ext.y.0) * t, locale)
        })
        .collect();
    let left_label_width_px = compute_left_label_area_px(&sample_labels, 12);
    let axis_x_start_px = MARGIN + left_label_width_px as i32;

    let legend_items: Vec<LegendItem> = chart
        .series
        .iter()
        .enumerate()
        .map(|(idx, s)| LegendItem {
            label: s.country.clone(),
            color: office_color(idx),
            marker: MarkerShape::for_index(idx),
        })
        .collect();

    let (root_w, root_h) = root.dim_in_pixel();
    let (plot_area, legend_area) = match opts.legend {
        LegendMode::Right => {
            let (plot, legend) = root.split_horizontally((80).percent_width());
            (plot, Some(legend))
        }
        LegendMode::Bottom => {
            let labels: Vec<&str> = legend_items.iter().map(|i| i.label.as_str()).collect();
            let h = estimate_bottom_legend_height_px(&labels, axis_x_start_px, root_w as i32).max(40);
            // keep at least 40px for plot area
            let (plot, legend) = root.split_vertically((root_h as i32 - h).max(40));
            (plot, Some(legend))
        }
        LegendMode::Inside => (root, None),
    };

    plot_area.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    if let Some(ref area) = legend_area {
        area.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    }

    let mut ctx = ChartBuilder::on(&plot_area)
        .margin(MARGIN as u32)
        .caption(chart.title.as_str(), (FontFamily::SansSerif, 22))
        .set_label_area_size(LabelAreaPosition::Left, left_label_width_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 48)
        .build_cartesian_2d(ext.x.0..ext.x.1, ext.y.0..ext.y.1)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |x: &f64| integer_tick_label(*x);
    let y_label_fmt = |v: &f64| y_tick_label(mode, *v, locale);

    ctx.configure_mesh()
        .x_desc("Year")
        .y_desc(chart.y_label())
        .x_labels(x_label_count)
        .y_labels(y_label_count)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let inside = matches!(opts.legend, LegendMode::Inside);
    for (s, item) in chart.series.iter().zip(legend_items.iter()) {
        let pts: Vec<(f64, f64)> = s
            .points
            .iter()
            .map(|(year, v)| (*year as f64, to_draw_y(mode, *v)))
            .collect();
        let color = item.color;

        let line = ctx
            .draw_series(LineSeries::new(pts.clone(), color.stroke_width(2)))
            .map_err(|e| anyhow!("{:?}", e))?;
        if inside {
            line.label(s.country.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        let fill = color.filled();
        let r = 4;
        match item.marker {
            MarkerShape::Circle => ctx.draw_series(
                pts.iter().map(|c| EmptyElement::at(*c) + Circle::new((0, 0), r, fill)),
            ),
            MarkerShape::Square => ctx.draw_series(
                pts.iter()
                    .map(|c| EmptyElement::at(*c) + Rectangle::new([(-r, -r), (r, r)], fill)),
            ),
            MarkerShape::Triangle => ctx.draw_series(pts.iter().map(|c| {
                EmptyElement::at(*c) + Polygon::new(vec![(0, -r), (-r, r), (r, r)], fill)
            })),
            MarkerShape::Diamond => ctx.draw_series(pts.iter().map(|c| {
                EmptyElement::at(*c) + Polygon::new(vec![(0, -r), (-r, 0), (0, r), (r, 0)], fill)
            })),
        }
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    if inside {
        ctx.configure_series_labels()
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .label_font((FontFamily::SansSerif, 14))
            .draw()
            .map_err(|e| anyhow!("{:?}", e))?;
    } else if let Some(ref area) = legend_area {
        draw_legend_panel(area, &legend_items, opts.legend, axis_x_start_px)?;
    }

    plot_area.present().map_err(|e| anyhow!("{:?}", e))?;
    if let Some(ref area) = legend_area {
        area.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}
