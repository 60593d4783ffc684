use povrank::dashboard::{self, ChartOutcome, Controls};
use povrank::models::YAxisMode;
use povrank::sample;
use povrank::viz::{self, ChartOptions, LegendMode};
use std::fs;

fn sample_chart(mode: YAxisMode) -> povrank::dashboard::ChartData {
    let table = sample::load_sample().unwrap();
    let mut controls = Controls::defaults_for(&table);
    controls.y_axis = mode;
    match dashboard::render(&table, &controls).chart {
        ChartOutcome::Chart(c) => c,
        ChartOutcome::Info(msg) => panic!("expected a chart, got {msg}"),
    }
}

#[test]
fn every_legend_mode_writes_svg_and_png() {
    let dir = tempfile::tempdir().unwrap();
    for (i, legend) in [LegendMode::Bottom, LegendMode::Right, LegendMode::Inside]
        .into_iter()
        .enumerate()
    {
        let opts = ChartOptions {
            legend,
            ..ChartOptions::default()
        };
        for ext in ["svg", "png"] {
            let path = dir.path().join(format!("chart_{i}.{ext}"));
            viz::plot_chart(&sample_chart(YAxisMode::Rank), &path, &opts).unwrap();
            let meta = fs::metadata(&path).expect("file created");
            assert!(meta.len() > 0, "{ext} has content");
        }
    }
}

#[test]
fn svg_carries_title_and_axis_label() {
    let chart = sample_chart(YAxisMode::Percentage);
    let svg = viz::render_svg(&chart, &ChartOptions::default()).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Year"));
    assert!(svg.contains("India"));
}

#[test]
fn rgb_buffer_matches_requested_size() {
    let opts = ChartOptions {
        width: 320,
        height: 200,
        ..ChartOptions::default()
    };
    let buf = viz::render_rgb(&sample_chart(YAxisMode::Rank), &opts).unwrap();
    assert_eq!(buf.len(), 320 * 200 * 3);
    // Background is painted white somewhere.
    assert!(buf.chunks(3).any(|px| px == [255, 255, 255]));
}

#[test]
fn chart_without_points_is_an_error() {
    let table = sample::load_sample().unwrap();
    let mut controls = Controls::defaults_for(&table);
    controls.countries = vec!["Germany".into()];
    // No observations at all in 2003.
    controls.year_min = 2003;
    controls.year_max = 2003;
    let view = dashboard::render(&table, &controls);
    let chart = view.chart.chart().unwrap();
    assert!(chart.is_empty());
    assert!(viz::render_svg(chart, &ChartOptions::default()).is_err());
    assert!(viz::render_rgb(chart, &ChartOptions::default()).is_err());
}
