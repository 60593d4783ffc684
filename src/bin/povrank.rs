use anyhow::{Result, bail};
use clap::builder::TypedValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use povrank::dashboard::{self, ChartOutcome, Controls, PreviewTable, TOP_N_DEFAULT};
use povrank::loader::{DataLoader, FallbackSource, LoadedTable, LoaderConfig};
use povrank::viz::{self, ChartOptions, LegendMode};
use povrank::{Client, ClientConfig, YAxisMode, rank, storage};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "povrank",
    version,
    about = "Rank countries by poverty headcount ratio ($2.15/day) per year"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load data, print the Top-N previews and the chart series (optionally write the chart).
    Show(ShowArgs),
    /// Save the loaded table (or a ranked year range) as CSV or JSON.
    Export(ExportArgs),
    /// List the countries available in the loaded data.
    Countries(SourceArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Skip the World Bank API and use the fallback data directly.
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Fallback CSV (Year,Country,ISO3,Headcount215) instead of the bundled sample.
    #[arg(long)]
    sample: Option<PathBuf>,
    /// API base URL.
    #[arg(long, default_value = "https://api.worldbank.org/v2")]
    base_url: String,
    /// Request timeout in seconds.
    #[arg(long, default_value_t = 20)]
    timeout: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum YAxisArg {
    Rate,
    Rank,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LegendArg {
    Bottom,
    Right,
    Inside,
}

#[derive(Args, Debug)]
struct ShowArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// First year of the range (default: 20 years before the latest year).
    #[arg(long)]
    from: Option<i32>,
    /// Last year of the range (default: latest year in the data).
    #[arg(long)]
    to: Option<i32>,
    /// Country name or ISO3 code; repeat for several (default: a preset list).
    #[arg(short, long = "country")]
    countries: Vec<String>,
    /// Start from an empty country selection (no chart is drawn without countries).
    #[arg(long, default_value_t = false)]
    clear_countries: bool,
    /// What the chart's Y axis shows.
    #[arg(long, value_enum, default_value_t = YAxisArg::Rank)]
    y_axis: YAxisArg,
    /// Rows per preview table (3-50).
    #[arg(long, default_value_t = TOP_N_DEFAULT, value_parser = clap::value_parser!(u16).range(3..=50).map(usize::from))]
    top: usize,
    /// Write the chart to this path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Locale for number formatting (en, de, fr, es, it, pt, nl, ko).
    #[arg(long, default_value = "en")]
    locale: String,
    /// Legend placement.
    #[arg(long, value_enum, default_value_t = LegendArg::Bottom)]
    legend: LegendArg,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Output file.
    #[arg(long)]
    out: PathBuf,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Export the ranked view (adds a Rank column) instead of the raw table.
    #[arg(long, default_value_t = false)]
    ranked: bool,
    /// First year of the ranked range.
    #[arg(long)]
    from: Option<i32>,
    /// Last year of the ranked range.
    #[arg(long)]
    to: Option<i32>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Show(args) => cmd_show(args),
        Command::Export(args) => cmd_export(args),
        Command::Countries(args) => cmd_countries(args),
    }
}

fn load(args: &SourceArgs) -> Result<LoadedTable> {
    let client = Client::with_config(ClientConfig {
        base_url: args.base_url.clone(),
        timeout: Duration::from_secs(args.timeout.max(1)),
        ..ClientConfig::default()
    });
    let config = LoaderConfig {
        offline: args.offline,
        fallback: match &args.sample {
            Some(p) => FallbackSource::File(p.clone()),
            None => FallbackSource::Bundled,
        },
        ..LoaderConfig::default()
    };
    DataLoader::with_remote(client, config).load()
}

fn cmd_show(args: ShowArgs) -> Result<()> {
    let loaded = load(&args.source)?;
    let table = &loaded.table;
    println!("{}", loaded.status_line());

    let mut controls = Controls::defaults_for(table);
    if let Some(from) = args.from {
        controls.year_min = from;
    }
    if let Some(to) = args.to {
        controls.year_max = to;
    }
    if args.clear_countries {
        controls.countries.clear();
    }
    if !args.countries.is_empty() {
        let (resolved, unknown) = dashboard::resolve_countries(table, &args.countries);
        for u in unknown {
            eprintln!("warning: unknown country {u:?} ignored");
        }
        controls.countries = resolved;
    }
    controls.y_axis = match args.y_axis {
        YAxisArg::Rate => YAxisMode::Percentage,
        YAxisArg::Rank => YAxisMode::Rank,
    };
    controls.top_n = args.top;
    let controls = controls.clamped_to(table);

    let view = dashboard::render(table, &controls);

    println!();
    match &view.latest {
        Some(t) => print_preview(&format!("Latest year Top {}", controls.top_n), t, &args.locale),
        None => println!("No observations between {} and {}.", controls.year_min, controls.year_max),
    }
    if let Some(t) = &view.earliest {
        println!();
        print_preview(
            &format!("Start of selected range Top {}", controls.top_n),
            t,
            &args.locale,
        );
    }

    println!();
    match &view.chart {
        ChartOutcome::Info(msg) => println!("{msg}"),
        ChartOutcome::Chart(chart) => {
            println!("{} [{}]", chart.title, chart.y_label());
            for s in &chart.series {
                let pts: Vec<String> = s
                    .points
                    .iter()
                    .map(|(y, v)| match controls.y_axis {
                        YAxisMode::Percentage => {
                            format!("{y}={}", viz::util::format_decimal(*v, 1, &args.locale))
                        }
                        YAxisMode::Rank => format!("{y}=#{}", *v as u32),
                    })
                    .collect();
                println!("  {} ({}): {}", s.country, s.iso3, pts.join(" "));
            }
            if let Some(plot_path) = args.plot.as_ref() {
                let opts = ChartOptions {
                    width: args.width,
                    height: args.height,
                    locale: args.locale.clone(),
                    legend: match args.legend {
                        LegendArg::Bottom => LegendMode::Bottom,
                        LegendArg::Right => LegendMode::Right,
                        LegendArg::Inside => LegendMode::Inside,
                    },
                };
                viz::plot_chart(chart, plot_path, &opts)?;
                eprintln!("Wrote plot to {}", plot_path.display());
            }
        }
    }

    println!();
    println!("{}", dashboard::INTERPRETATION_GUIDE);
    Ok(())
}

fn print_preview(heading: &str, t: &PreviewTable, locale: &str) {
    println!("{heading} (year {}), by poverty rate", t.year);
    println!(
        "{:<28} {:<4} {:>4} {:>9} {:>5}",
        "Country", "ISO3", "Year", "Rate (%)", "Rank"
    );
    for r in &t.rows {
        println!(
            "{:<28} {:<4} {:>4} {:>9} {:>5}",
            r.country(),
            r.iso3(),
            r.year(),
            viz::util::format_decimal(r.poverty_rate(), 2, locale),
            r.rank
        );
    }
}

fn cmd_export(args: ExportArgs) -> Result<()> {
    let loaded = load(&args.source)?;
    eprintln!("{}", loaded.status_line());
    let table = &loaded.table;

    let fmt = match args.format {
        Some(OutFormat::Csv) => "csv".to_string(),
        Some(OutFormat::Json) => "json".to_string(),
        None => args
            .out
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv")
            .to_ascii_lowercase(),
    };

    let rows = if args.ranked {
        let (lo, hi) = table.year_bounds().unwrap_or((0, 0));
        let from = args.from.unwrap_or(lo);
        let to = args.to.unwrap_or(hi);
        let ranked = rank::rank(table, from.min(to), from.max(to));
        match fmt.as_str() {
            "csv" => storage::save_ranked_csv(&ranked, &args.out)?,
            "json" => storage::save_json(&ranked, &args.out)?,
            other => bail!("unsupported format: {}", other),
        }
        ranked.len()
    } else {
        match fmt.as_str() {
            "csv" => storage::save_csv(table.rows(), &args.out)?,
            "json" => storage::save_json(table.rows(), &args.out)?,
            other => bail!("unsupported format: {}", other),
        }
        table.len()
    };
    eprintln!("Saved {} rows to {}", rows, args.out.display());
    Ok(())
}

fn cmd_countries(args: SourceArgs) -> Result<()> {
    let loaded = load(&args)?;
    eprintln!("{}", loaded.status_line());
    for name in loaded.table.countries() {
        println!("{name}");
    }
    Ok(())
}
