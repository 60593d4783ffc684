//! Legend layout and drawing for external legend placement.

use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::{estimate_text_width_px, truncate_to_width};
use super::types::{LegendMode, MarkerShape};

/// One legend entry: label, series color and marker.
#[derive(Debug, Clone)]
pub struct LegendItem {
    pub label: String,
    pub color: RGBAColor,
    pub marker: MarkerShape,
}

// Must match between the estimator and the drawing code.
const FONT_PX: u32 = 14;
const LINE_H: i32 = FONT_PX as i32 + 6;
const PAD: i32 = 8;
const SAMPLE_W: i32 = 24;
const SAMPLE_TO_TEXT: i32 = 8;
const TRAILING_GAP: i32 = 16;

fn block_width(label: &str) -> i32 {
    SAMPLE_W + SAMPLE_TO_TEXT + estimate_text_width_px(label, FONT_PX) as i32 + TRAILING_GAP
}

/// Greedy flow of labels into rows that fit `usable_w` starting at `start_x`.
fn flow_rows(labels: &[&str], start_x: i32, usable_w: i32) -> Vec<Vec<usize>> {
    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut cur: Vec<usize> = Vec::new();
    let mut x = start_x;
    for (i, label) in labels.iter().enumerate() {
        let w = block_width(label).min(usable_w - start_x);
        if x + w > usable_w && !cur.is_empty() {
            rows.push(std::mem::take(&mut cur));
            x = start_x;
        }
        x += w;
        cur.push(i);
    }
    if !cur.is_empty() {
        rows.push(cur);
    }
    rows
}

/// Height of the bottom legend band needed to fit all items.
pub fn estimate_bottom_legend_height_px(labels: &[&str], start_x: i32, total_w: i32) -> i32 {
    let rows = flow_rows(labels, start_x, total_w - PAD).len().max(1) as i32;
    PAD * 2 + rows * LINE_H
}

/// Draw a line sample with the series marker in its middle.
fn draw_sample<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    x: i32,
    y: i32,
    item: &LegendItem,
) -> Result<()> {
    let style = item.color.stroke_width(2);
    area.draw(&PathElement::new(vec![(x, y), (x + SAMPLE_W, y)], style))
        .map_err(|e| anyhow!("{:?}", e))?;
    let c = (x + SAMPLE_W / 2, y);
    let fill = item.color.filled();
    let s = 4;
    match item.marker {
        MarkerShape::Circle => area.draw(&Circle::new(c, s, fill)),
        MarkerShape::Square => area.draw(&Rectangle::new(
            [(c.0 - s, c.1 - s), (c.0 + s, c.1 + s)],
            fill,
        )),
        MarkerShape::Triangle => area.draw(&Polygon::new(
            vec![(c.0, c.1 - s), (c.0 - s, c.1 + s), (c.0 + s, c.1 + s)],
            fill,
        )),
        MarkerShape::Diamond => area.draw(&Polygon::new(
            vec![(c.0, c.1 - s), (c.0 - s, c.1), (c.0, c.1 + s), (c.0 + s, c.1)],
            fill,
        )),
    }
    .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Draw the legend panel (Right: single column; Bottom: rows flowing left to right,
/// starting where the plot's X axis starts).
pub fn draw_legend_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    items: &[LegendItem],
    mode: LegendMode,
    axis_x_start_px: i32,
) -> Result<()> {
    let (w, _h) = area.dim_in_pixel();
    let w = w as i32;
    let text_style =
        TextStyle::from((FontFamily::SansSerif, FONT_PX)).pos(Pos::new(HPos::Left, VPos::Center));

    match mode {
        LegendMode::Right => {
            let max_text = (w - PAD * 2 - SAMPLE_W - SAMPLE_TO_TEXT).max(20) as u32;
            let mut y = PAD * 2 + LINE_H / 2;
            for item in items {
                draw_sample(area, PAD, y, item)?;
                let label = truncate_to_width(&item.label, FONT_PX, max_text);
                area.draw(&Text::new(
                    label,
                    (PAD + SAMPLE_W + SAMPLE_TO_TEXT, y),
                    text_style.clone(),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
                y += LINE_H;
            }
        }
        LegendMode::Bottom => {
            let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
            let usable_w = w - PAD;
            let max_text = (usable_w - axis_x_start_px - SAMPLE_W - SAMPLE_TO_TEXT - TRAILING_GAP)
                .max(20) as u32;
            let mut y = PAD + LINE_H / 2;
            for row in flow_rows(&labels, axis_x_start_px, usable_w) {
                let mut x = axis_x_start_px;
                for idx in row {
                    let item = &items[idx];
                    draw_sample(area, x, y, item)?;
                    let label = truncate_to_width(&item.label, FONT_PX, max_text);
                    area.draw(&Text::new(
                        label.clone(),
                        (x + SAMPLE_W + SAMPLE_TO_TEXT, y),
                        text_style.clone(),
                    ))
                    .map_err(|e| anyhow!("{:?}", e))?;
                    x += block_width(&label);
                }
                y += LINE_H;
            }
        }
        // Drawn by plotters' own series labels.
        LegendMode::Inside => {}
    }
    Ok(())
}
