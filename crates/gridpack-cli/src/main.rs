use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use gridpack_core::{
    GridConfig, GridLayout, LayoutMode, LayoutResult, Measurement, Scene, SortAscending,
};
use handlebars::Handlebars;
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "gridpack",
    about = "Lay out a scene of boxes into columns",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lay out a scene and export positions
    Layout(LayoutArgs),
    /// Render positions through a handlebars template (forces --format template)
    Template(LayoutArgs),
    /// Simple timing bench (repeats the layout, prints time + occupancy)
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct LayoutArgs {
    // Input/Output
    /// Scene file (JSON or YAML): container, elements and an optional `config`
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Output base name (files will be name.json / name.css)
    #[arg(short, long, default_value = "layout", help_heading = "Input/Output")]
    name: String,
    /// Config file (JSON or YAML); overrides the scene's own config
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    // Layout
    /// Layout mode: masonry | fitRows | vertical
    #[arg(long, help_heading = "Layout")]
    layout_mode: Option<String>,
    /// Column width in pixels, or a selector of a sizer element
    #[arg(long, help_heading = "Layout")]
    column_width: Option<String>,
    /// Gutter in pixels, or a selector of a sizer element
    #[arg(long, help_heading = "Layout")]
    gutter: Option<String>,
    /// Only children matching this selector become items
    #[arg(long, help_heading = "Layout")]
    item_selector: Option<String>,
    /// Size the content width to the used columns
    #[arg(long, help_heading = "Layout")]
    fit_width: Option<bool>,
    /// Place items left to right instead of into the shortest column
    #[arg(long, help_heading = "Layout")]
    horizontal_order: Option<bool>,
    /// Measure positions from the right edge
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    origin_right: bool,
    /// Measure positions from the bottom edge
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    origin_bottom: bool,
    /// Vertical mode alignment (0.0 left .. 1.0 right)
    #[arg(long, help_heading = "Layout")]
    horizontal_alignment: Option<f64>,
    /// Selector of elements to stamp
    #[arg(long, help_heading = "Layout")]
    stamp: Option<String>,

    // Arrange
    /// Filter selector; non-matching items are hidden
    #[arg(long, help_heading = "Arrange")]
    filter: Option<String>,
    /// Sort keys, most significant first (comma separated)
    #[arg(long, value_delimiter = ',', help_heading = "Arrange")]
    sort_by: Vec<String>,
    /// Sort descending
    #[arg(long, default_value_t = false, help_heading = "Arrange")]
    sort_desc: bool,
    /// Named sort data spec, `name=[attr] parseInt` (repeatable)
    #[arg(long, help_heading = "Arrange")]
    sort_data: Vec<String>,
    /// Shuffle with this seed instead of sorting
    #[arg(long, help_heading = "Arrange")]
    shuffle_seed: Option<u64>,

    // Export
    /// Output format: json | json-hash | css | template
    #[arg(long, default_value = "json", help_heading = "Export")]
    format: String,
    /// External template file (handlebars), used when --format template
    #[arg(long, help_heading = "Export")]
    template: Option<PathBuf>,
    /// Container selector written by the css format
    #[arg(long, default_value = ".grid", help_heading = "Export")]
    container_selector: String,
    /// Export layout stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after scene/config file/CLI) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: print the output to stdout instead of writing files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Scene file (JSON or YAML)
    input: PathBuf,
    /// Config file (JSON or YAML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Layout passes to time
    #[arg(long, default_value_t = 100)]
    iterations: u32,
}

/// A scene file: the host scene plus an optional layout configuration.
#[derive(Debug, Deserialize)]
struct SceneFile {
    #[serde(default)]
    config: Option<GridConfig>,
    #[serde(flatten)]
    scene: Scene,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Layout(args) => run_layout(args),
        Commands::Template(args) => {
            let mut a = args.clone();
            a.format = "template".into();
            run_layout(&a)
        }
        Commands::Bench(b) => run_bench(b),
    }
}

fn run_layout(cli: &LayoutArgs) -> anyhow::Result<()> {
    let file: SceneFile = read_doc(&cli.input)?;
    let mut cfg = match &cli.config {
        Some(path) => read_doc(path)?,
        None => file.config.unwrap_or_default(),
    };
    apply_overrides(&mut cfg, cli)?;
    cfg.validate().context("invalid configuration")?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let scene = file.scene;
    info!(elements = scene.elements.len(), "loaded scene");
    let mut grid: GridLayout<String> = GridLayout::new(&scene, cfg.clone())?;
    let result = match cli.shuffle_seed {
        Some(seed) => grid.shuffle_with(&scene, &mut StdRng::seed_from_u64(seed)),
        None => grid.layout(&scene),
    };
    let stats = result.stats();
    info!(
        items = stats.num_items,
        columns = stats.columns,
        height = stats.height,
        occupancy = %format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );

    let (ext, body) = match cli.format.as_str() {
        "json" => (
            "json",
            serde_json::to_string_pretty(&gridpack_core::to_json(&result))?,
        ),
        "json-hash" => (
            "json",
            serde_json::to_string_pretty(&gridpack_core::to_json_hash(&result))?,
        ),
        "css" => {
            let ctx = build_template_context(&result, &scene, &cfg, &cli.container_selector);
            ("css", render(include_str!("templates/css.hbs"), &ctx)?)
        }
        "template" => {
            let path = cli
                .template
                .as_ref()
                .context("--format template needs --template <file>")?;
            let tpl = fs::read_to_string(path)
                .with_context(|| format!("read template {}", path.display()))?;
            let ctx = build_template_context(&result, &scene, &cfg, &cli.container_selector);
            ("txt", render(&tpl, &ctx)?)
        }
        other => anyhow::bail!("unknown output format: {}", other),
    };

    if cli.dry_run {
        println!("{body}");
    } else {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
        let out_path = cli.out_dir.join(format!("{}.{}", cli.name, ext));
        fs::write(&out_path, body).with_context(|| format!("write {}", out_path.display()))?;
        info!(?out_path, items = result.placements.len(), "layout written");
    }

    if let Some(stats_path) = &cli.export_stats {
        let value = serde_json::to_string_pretty(&stats)?;
        if cli.dry_run {
            println!("{}", stats.summary());
        } else {
            fs::write(stats_path, value)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        }
    }
    Ok(())
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    let file: SceneFile = read_doc(&b.input)?;
    let cfg = match &b.config {
        Some(path) => read_doc(path)?,
        None => file.config.unwrap_or_default(),
    };
    let scene = file.scene;
    let mut grid: GridLayout<String> = GridLayout::new(&scene, cfg)?;
    let iterations = b.iterations.max(1);
    let start = Instant::now();
    let mut last = LayoutResult::empty();
    for _ in 0..iterations {
        last = grid.layout(&scene);
    }
    let dur = start.elapsed();
    let stats = last.stats();
    println!(
        "items={} columns={} occupancy={:.2}% time/pass={}",
        stats.num_items,
        stats.columns,
        stats.occupancy * 100.0,
        bench_fmt_dur(dur / iterations)
    );
    Ok(())
}

fn bench_fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

/// Reads a JSON or YAML document, chosen by file extension.
fn read_doc<T: for<'de> Deserialize<'de>>(path: &Path) -> anyhow::Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "yaml" | "yml")
    );
    let doc = if is_yaml {
        serde_yaml::from_str(&text).with_context(|| format!("parse {}", path.display()))?
    } else {
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?
    };
    debug!(path = %path.display(), yaml = is_yaml, "document loaded");
    Ok(doc)
}

fn parse_measurement(s: &str) -> Measurement {
    match s.trim().parse::<f64>() {
        Ok(v) => Measurement::Fixed(v),
        Err(_) => Measurement::Selector(s.to_string()),
    }
}

fn apply_overrides(cfg: &mut GridConfig, cli: &LayoutArgs) -> anyhow::Result<()> {
    if let Some(v) = &cli.layout_mode {
        cfg.layout_mode = v.parse::<LayoutMode>()?;
    }
    if let Some(v) = &cli.column_width {
        cfg.column_width = Some(parse_measurement(v));
    }
    if let Some(v) = &cli.gutter {
        cfg.gutter = Some(parse_measurement(v));
    }
    if let Some(v) = &cli.item_selector {
        cfg.item_selector = Some(v.clone());
    }
    if let Some(v) = cli.fit_width {
        cfg.fit_width = v;
    }
    if let Some(v) = cli.horizontal_order {
        cfg.horizontal_order = v;
    }
    if cli.origin_right {
        cfg.origin_left = false;
    }
    if cli.origin_bottom {
        cfg.origin_top = false;
    }
    if let Some(v) = cli.horizontal_alignment {
        cfg.horizontal_alignment = v;
    }
    if let Some(v) = &cli.stamp {
        cfg.stamp = Some(v.clone());
    }
    if let Some(v) = &cli.filter {
        cfg.filter = Some(v.clone());
    }
    for entry in &cli.sort_data {
        let (name, spec) = entry
            .split_once('=')
            .with_context(|| format!("sort data must be name=spec: {entry}"))?;
        cfg.get_sort_data
            .insert(name.trim().to_string(), spec.trim().to_string());
    }
    if !cli.sort_by.is_empty() {
        cfg.sort_by = cli.sort_by.clone();
    }
    if cli.sort_desc {
        cfg.sort_ascending = SortAscending::All(false);
    }
    Ok(())
}

fn render(template: &str, ctx: &TemplateContext) -> anyhow::Result<String> {
    let mut reg = Handlebars::new();
    reg.set_strict_mode(true);
    reg.register_escape_fn(handlebars::no_escape);
    reg.register_template_string("tpl", template)?;
    Ok(reg.render("tpl", ctx)?)
}

#[derive(Serialize)]
struct TemplateItem {
    key: String,
    selector: String,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

#[derive(Serialize)]
struct TemplateContainer {
    selector: String,
    width: f64,
    height: f64,
}

#[derive(Serialize)]
struct TemplateContext {
    container: TemplateContainer,
    items: Vec<TemplateItem>,
    meta: serde_json::Value,
}

fn build_template_context(
    result: &LayoutResult<String>,
    scene: &Scene,
    cfg: &GridConfig,
    container_selector: &str,
) -> TemplateContext {
    let width = result.width.unwrap_or(scene.container.inner_width);
    let rects = result.to_top_left(width, cfg.origin_left, cfg.origin_top);
    let items = result
        .placements
        .iter()
        .zip(rects)
        .map(|(p, r)| TemplateItem {
            key: p.key.clone(),
            selector: format!("#{}", p.key),
            left: r.x,
            top: r.y,
            width: r.w,
            height: r.h,
        })
        .collect();
    let meta = serde_json::json!({
        "app": "gridpack",
        "version": env!("CARGO_PKG_VERSION"),
        "mode": cfg.layout_mode,
        "columns": result.columns,
        "columnWidth": result.column_width,
    });
    TemplateContext {
        container: TemplateContainer {
            selector: container_selector.to_string(),
            width,
            height: result.height,
        },
        items,
        meta,
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}
