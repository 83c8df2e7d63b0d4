use anyhow::{anyhow, Context, Result};
use catalog_hierarchy::{
    CatalogPipeline, ColorConfig, CssColor, HierarchyTree, InferenceStrategy, Key, KeyPartition,
    PipelineConfig, TrajectoryFormat,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

mod input;
mod output;

use input::KeyReader;
use output::{print_json, OutputFormat};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Hierarchy, layout weights and colours for classification catalogues", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Pipeline config file (JSON or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Colour preset: default|vivid|muted (replaces the config's colours)
    #[arg(long, global = true)]
    preset: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the annotated catalogue table
    Build(BuildArgs),

    /// Infer and verify the hierarchy without colouring it
    Check(KeyArgs),

    /// Sample the top-level hue circle
    Palette(PaletteArgs),

    /// Fill variant of a colour
    Tint(TintArgs),
}

#[derive(Args)]
struct KeyArgs {
    /// Key list, CSV or TSV with the key in the first column (`-` for stdin)
    input: Option<PathBuf>,

    /// Parent inference strategy
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Drop numeric keys at or above this value
    #[arg(long)]
    summary_floor: Option<u32>,

    /// Keys to leave out
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    exclude: Vec<String>,

    /// Drop every key containing `*`
    #[arg(long)]
    drop_wildcards: bool,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct BuildArgs {
    #[command(flatten)]
    keys: KeyArgs,

    /// Display name of the root node
    #[arg(long)]
    root_label: Option<String>,

    /// One JSON document or one record per line
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Args)]
struct PaletteArgs {
    /// Number of colours
    #[arg(long, short = 'n', default_value_t = 8)]
    count: usize,

    /// Hue offset in turns (overrides the config)
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<f64>,

    #[arg(long, value_enum, default_value = "css")]
    format: FormatArg,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct TintArgs {
    /// `#rrggbb` or `rgba(r,g,b,a)`
    color: String,

    /// Saturation factor
    #[arg(long, default_value_t = 0.5)]
    saturation: f64,

    /// Move lightness toward white by this share
    #[arg(long, default_value_t = 0.5)]
    brightness: f64,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Sequential,
    Prefix,
}

impl StrategyArg {
    fn as_domain(self) -> InferenceStrategy {
        match self {
            Self::Sequential => InferenceStrategy::Sequential,
            Self::Prefix => InferenceStrategy::Prefix,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Hsv,
    Rgb,
    Css,
}

impl FormatArg {
    fn as_domain(self) -> TrajectoryFormat {
        match self {
            Self::Hsv => TrajectoryFormat::Hsv,
            Self::Rgb => TrajectoryFormat::Rgb,
            Self::Css => TrajectoryFormat::Css,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = load_config(cli.config.as_ref(), cli.preset.as_deref())?;

    match cli.command {
        Commands::Build(args) => run_build(args, config)?,
        Commands::Check(args) => run_check(args, config)?,
        Commands::Palette(args) => run_palette(args, config)?,
        Commands::Tint(args) => run_tint(args)?,
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>, preset: Option<&str>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Invalid config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(name) = preset {
        config.colors = ColorConfig::preset(name)
            .ok_or_else(|| anyhow!("Unknown preset '{name}' (expected default|vivid|muted)"))?;
    }
    Ok(config)
}

/// Fold the key flags into `config` and read the partitioned keys
fn prepare(args: &KeyArgs, config: &mut PipelineConfig) -> Result<KeyPartition> {
    if let Some(strategy) = args.strategy {
        config.strategy = strategy.as_domain();
    }
    if args.summary_floor.is_some() {
        config.filter.summary_floor = args.summary_floor;
    }
    if args.drop_wildcards {
        config.filter.drop_wildcards = true;
    }
    for raw in &args.exclude {
        let key = Key::parse(raw.trim()).with_context(|| format!("Invalid --exclude key {raw}"))?;
        config.filter.exclude.push(key);
    }
    config.validate()?;

    let raw = KeyReader::new()?.read(args.input.as_deref())?;
    let partition = KeyPartition::from_unsorted(&raw, &config.filter)?;
    log::info!(
        "Catalogue has {} wildcard and {} numeric keys",
        partition.wildcard().len(),
        partition.numeric().len()
    );
    Ok(partition)
}

fn run_build(args: BuildArgs, mut config: PipelineConfig) -> Result<()> {
    if let Some(label) = args.root_label {
        config.root_label = label;
    }
    let partition = prepare(&args.keys, &mut config)?;
    let table = CatalogPipeline::new(config)
        .run(&partition)
        .context("Failed to build catalogue")?;

    match args.format {
        OutputFormat::Json => print_json(&table, args.keys.pretty)?,
        OutputFormat::Jsonl => {
            for record in table.iter() {
                print_json(record, false)?;
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct CheckReport {
    keys: usize,
    wildcard: usize,
    numeric: usize,
    nodes: usize,
    top_level: usize,
    max_depth: u8,
    max_children: usize,
}

fn run_check(args: KeyArgs, mut config: PipelineConfig) -> Result<()> {
    let partition = prepare(&args, &mut config)?;
    let nodes = CatalogPipeline::new(config)
        .hierarchize(&partition)
        .context("Hierarchy check failed")?;
    let tree = HierarchyTree::new(&nodes)?;

    let top_level = tree
        .find(&Key::ROOT)
        .map(|root| tree.children_count(root))
        .unwrap_or(0);
    let report = CheckReport {
        keys: partition.len(),
        wildcard: partition.wildcard().len(),
        numeric: partition.numeric().len(),
        nodes: tree.len(),
        top_level,
        max_depth: tree.nodes().map(|n| n.level).max().unwrap_or(0),
        max_children: tree.max_children(),
    };
    print_json(&report, args.pretty)
}

fn run_palette(args: PaletteArgs, config: PipelineConfig) -> Result<()> {
    let mut colors = config.colors;
    if let Some(offset) = args.offset {
        colors.hue_offset = offset;
    }
    colors.validate()?;
    let points = colors
        .top_trajectory()
        .sample_as(args.count, args.format.as_domain());
    print_json(&points, args.pretty)
}

fn run_tint(args: TintArgs) -> Result<()> {
    if !(0.0..=1.0).contains(&args.brightness) || args.saturation < 0.0 {
        return Err(anyhow!(
            "--brightness must lie in [0, 1] and --saturation must be >= 0"
        ));
    }
    let color = CssColor::parse(&args.color)?;
    println!("{}", color.desaturate_brighten(args.saturation, args.brightness));
    Ok(())
}
