/*!
 * Dashboard for povrank - global poverty rankings
 *
 * A cross-platform desktop application providing:
 * - Year range, country selection, Y-axis mode and Top-N controls
 * - Top-N previews for the latest and the earliest year in range
 * - A per-country line chart of poverty rate or per-year rank
 *
 * Every control change re-runs the render pipeline on the cached table.
 */

use eframe::egui;
use povrank::dashboard::{
    self, ChartOutcome, Controls, DashboardView, PreviewTable, TOP_N_MAX, TOP_N_MIN,
};
use povrank::loader::{DataLoader, LoadedTable};
use povrank::viz::{self, ChartOptions};
use povrank::{YAxisMode, storage};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

const CHART_SIZE: (u32, u32) = (960, 540);

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Global Poverty Rankings"),
        ..Default::default()
    };

    eframe::run_native(
        "Global Poverty Rankings",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new()))),
    )
}

/// Result of a background load: the loader travels back with it so its caches survive.
type LoadResult = (DataLoader, Result<LoadedTable, String>);

struct DashboardApp {
    loader: Option<DataLoader>,
    loaded: Option<LoadedTable>,
    controls: Option<Controls>,
    country_filter: String,

    view: Option<DashboardView>,
    rendered_for: Option<Controls>,
    chart_texture: Option<egui::TextureHandle>,
    chart_error: String,

    is_loading: bool,
    status_message: String,
    error_message: String,
    load_receiver: Option<mpsc::Receiver<LoadResult>>,
}

impl DashboardApp {
    fn new() -> Self {
        let mut app = Self::idle();
        app.start_load(false);
        app
    }

    /// App with a fresh loader and nothing loaded yet.
    fn idle() -> Self {
        Self {
            loader: Some(DataLoader::default()),
            loaded: None,
            controls: None,
            country_filter: String::new(),
            view: None,
            rendered_for: None,
            chart_texture: None,
            chart_error: String::new(),
            is_loading: false,
            status_message: String::new(),
            error_message: String::new(),
            load_receiver: None,
        }
    }

    fn start_load(&mut self, refetch: bool) {
        let Some(mut loader) = self.loader.take() else {
            return;
        };
        if refetch {
            loader.invalidate();
        }
        self.is_loading = true;
        self.error_message.clear();
        self.status_message = "Fetching data from World Bank API...".to_string();

        let (sender, receiver) = mpsc::channel();
        self.load_receiver = Some(receiver);
        thread::spawn(move || {
            let result = loader.load().map_err(|e| format!("{e:#}"));
            let _ = sender.send((loader, result));
        });
    }

    fn check_load_result(&mut self) {
        let Some(receiver) = &self.load_receiver else {
            return;
        };
        let (loader, result) = match receiver.try_recv() {
            Ok(done) => done,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => {
                // The load thread died with the loader; start over with a fresh one.
                self.loader = Some(DataLoader::default());
                self.load_receiver = None;
                self.is_loading = false;
                self.status_message.clear();
                self.error_message = "Failed to load data: loader thread stopped unexpectedly".to_string();
                return;
            }
        };
        self.loader = Some(loader);
        self.load_receiver = None;
        self.is_loading = false;

        match result {
            Ok(loaded) => {
                self.status_message = loaded.status_line();
                // Keep the user's controls across reloads, clamped to the new data.
                let controls = match self.controls.take() {
                    Some(c) => c.clamped_to(&loaded.table),
                    None => Controls::defaults_for(&loaded.table),
                };
                self.controls = Some(controls);
                self.loaded = Some(loaded);
                self.rendered_for = None;
            }
            Err(err) => {
                self.error_message = format!("Failed to load data: {err}");
                self.status_message.clear();
            }
        }
    }

    /// Re-run the pipeline when the controls changed since the last render.
    fn refresh_view(&mut self, ctx: &egui::Context) {
        let (Some(loaded), Some(controls)) = (&self.loaded, &self.controls) else {
            return;
        };
        if self.rendered_for.as_ref() == Some(controls) {
            return;
        }
        let view = dashboard::render(&loaded.table, controls);
        self.chart_texture = None;
        self.chart_error.clear();
        if let ChartOutcome::Chart(chart) = &view.chart {
            let opts = ChartOptions {
                width: CHART_SIZE.0,
                height: CHART_SIZE.1,
                ..ChartOptions::default()
            };
            match viz::render_rgb(chart, &opts) {
                Ok(buf) => {
                    let image = egui::ColorImage::from_rgb(
                        [CHART_SIZE.0 as usize, CHART_SIZE.1 as usize],
                        &buf,
                    );
                    self.chart_texture =
                        Some(ctx.load_texture("chart", image, egui::TextureOptions::LINEAR));
                }
                Err(err) => self.chart_error = format!("No chart: {err}"),
            }
        }
        self.rendered_for = Some(controls.clone());
        self.view = Some(view);
    }

    fn export_csv(&mut self) {
        let Some(view) = &self.view else {
            return;
        };
        let default_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let Some(path) = rfd::FileDialog::new()
            .set_directory(default_dir)
            .set_file_name("poverty_ranks.csv")
            .save_file()
        else {
            return;
        };
        match storage::save_ranked_csv(&view.ranked, &path) {
            Ok(()) => {
                self.status_message = format!("Saved {} rows to {}", view.ranked.len(), path.display())
            }
            Err(err) => self.error_message = format!("Failed to save CSV: {err}"),
        }
    }

    fn filters_panel(&mut self, ui: &mut egui::Ui) {
        let (Some(loaded), Some(controls)) = (&self.loaded, &mut self.controls) else {
            ui.label("Waiting for data...");
            return;
        };
        let (lo, hi) = loaded.table.year_bounds().unwrap_or((0, 0));

        ui.heading("Filters");
        ui.add_space(5.0);

        ui.label("Year range");
        ui.add(egui::Slider::new(&mut controls.year_min, lo..=hi).text("from"));
        ui.add(egui::Slider::new(&mut controls.year_max, lo..=hi).text("to"));
        if controls.year_min > controls.year_max {
            std::mem::swap(&mut controls.year_min, &mut controls.year_max);
        }
        ui.add_space(8.0);

        ui.label("Y axis");
        ui.horizontal(|ui| {
            ui.radio_value(&mut controls.y_axis, YAxisMode::Percentage, "Poverty rate (%)");
            ui.radio_value(&mut controls.y_axis, YAxisMode::Rank, "Rank (per year)");
        });
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.label("Top N per year:");
            ui.add(egui::DragValue::new(&mut controls.top_n).range(TOP_N_MIN..=TOP_N_MAX));
        });
        ui.add_space(8.0);

        ui.label(format!("Countries ({} selected)", controls.countries.len()));
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.country_filter)
                .on_hover_text("Filter the list by name or ISO3 code");
            if ui.button("Clear").clicked() {
                controls.countries.clear();
            }
        });
        let needle = self.country_filter.trim().to_lowercase();
        egui::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
            for name in loaded.table.countries() {
                if !needle.is_empty() && !name.to_lowercase().contains(&needle) {
                    continue;
                }
                let mut checked = controls.countries.contains(&name);
                if ui.checkbox(&mut checked, name.as_str()).changed() {
                    if checked {
                        controls.countries.push(name.clone());
                    } else {
                        controls.countries.retain(|c| c != &name);
                    }
                }
            }
        });
    }
}

fn preview_grid(ui: &mut egui::Ui, id: &str, table: &PreviewTable) {
    egui::Grid::new(id).striped(true).num_columns(5).show(ui, |ui| {
        ui.strong("Country");
        ui.strong("ISO3");
        ui.strong("Year");
        ui.strong("Rate (%)");
        ui.strong("Rank");
        ui.end_row();
        for r in &table.rows {
            ui.label(r.country());
            ui.label(r.iso3());
            ui.label(r.year().to_string());
            ui.label(format!("{:.2}", r.poverty_rate()));
            ui.label(r.rank.to_string());
            ui.end_row();
        }
    });
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_result();

        // Request repaint if loading (for spinner animation)
        if self.is_loading {
            ctx.request_repaint();
        }

        egui::SidePanel::left("filters")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.filters_panel(ui));

        self.refresh_view(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Global Poverty Rankings");
                ui.label("Data: World Bank international poverty line ($2.15/day). Falls back to a bundled sample.");
                ui.add_space(6.0);

                ui.horizontal(|ui| {
                    if ui.add_enabled(!self.is_loading, egui::Button::new("Reload")).clicked() {
                        self.start_load(true);
                    }
                    if ui.add_enabled(self.view.is_some(), egui::Button::new("Export CSV")).clicked() {
                        self.export_csv();
                    }
                    if self.is_loading {
                        ui.spinner();
                        ui.label("Loading...");
                    }
                });

                let from_remote = self.loaded.as_ref().is_some_and(|l| l.source.is_remote());
                if !self.status_message.is_empty() {
                    let color = if from_remote || self.is_loading {
                        egui::Color32::DARK_GREEN
                    } else {
                        egui::Color32::from_rgb(200, 120, 0)
                    };
                    ui.colored_label(color, &self.status_message);
                }
                if !self.error_message.is_empty() {
                    ui.colored_label(egui::Color32::RED, &self.error_message);
                }
                ui.add_space(10.0);

                let Some(view) = &self.view else {
                    return;
                };
                let n = view.controls.top_n;

                ui.heading("Top N preview by year");
                ui.columns(2, |cols| {
                    match &view.latest {
                        Some(t) => {
                            cols[0].label(format!("Latest year Top {n} (year {}), by poverty rate", t.year));
                            preview_grid(&mut cols[0], "latest", t);
                        }
                        None => {
                            cols[0].label("No observations in the selected year range.");
                        }
                    }
                    if let Some(t) = &view.earliest {
                        cols[1].label(format!("Start of range Top {n} (year {}), by poverty rate", t.year));
                        preview_grid(&mut cols[1], "earliest", t);
                    }
                });
                ui.add_space(10.0);

                match &view.chart {
                    ChartOutcome::Info(msg) => {
                        ui.colored_label(egui::Color32::LIGHT_BLUE, msg);
                    }
                    ChartOutcome::Chart(_) => {
                        if let Some(tex) = &self.chart_texture {
                            let avail = ui.available_width().min(CHART_SIZE.0 as f32);
                            let scale = avail / CHART_SIZE.0 as f32;
                            ui.image((
                                tex.id(),
                                egui::vec2(CHART_SIZE.0 as f32 * scale, CHART_SIZE.1 as f32 * scale),
                            ));
                        } else if !self.chart_error.is_empty() {
                            ui.label(&self.chart_error);
                        }
                    }
                }

                ui.separator();
                ui.label(dashboard::INTERPRETATION_GUIDE);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_load_thread_reenables_reload() {
        let mut app = DashboardApp::idle();
        let (sender, receiver) = mpsc::channel::<LoadResult>();
        drop(sender);
        app.loader = None;
        app.is_loading = true;
        app.load_receiver = Some(receiver);

        app.check_load_result();

        assert!(!app.is_loading);
        assert!(app.loader.is_some());
        assert!(app.load_receiver.is_none());
        assert!(app.error_message.starts_with("Failed to load data"));
    }

    #[test]
    fn pending_load_keeps_waiting() {
        let mut app = DashboardApp::idle();
        let (_sender, receiver) = mpsc::channel::<LoadResult>();
        app.loader = None;
        app.is_loading = true;
        app.load_receiver = Some(receiver);

        app.check_load_result();

        assert!(app.is_loading);
        assert!(app.loader.is_none());
        assert!(app.error_message.is_empty());
    }
}
