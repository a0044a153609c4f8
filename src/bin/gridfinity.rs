//! gridfinity - generate Gridfinity bins, lids and accessories as mesh files
//!
//! # Commands
//!
//! - `gridfinity bin` - bin with optional dividers, label shelf and scoops
//! - `gridfinity sliding-lid` - bin with a sliding lid, plus the lid itself
//! - `gridfinity screw-holes` - plate of printable screw holes
//! - `gridfinity base` - base feet only
//! - `gridfinity info` - mesh statistics for a bin, nothing is written
//!
//! # Usage
//!
//! ```bash
//! gridfinity bin --grid 2x1 --height 3 --div 2x1 --label --scoop
//! gridfinity bin --layout "##/#." --config bin.toml --out stl/
//! RUST_LOG=gridfinity=debug gridfinity info --grid 1x1
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use gridfinity::export::{
    ExportFormat, base_file_name, bin_file_name, export_mesh, screw_holes_file_name,
    sliding_lid_bin_file_name, sliding_lid_cover_file_name,
};
use gridfinity::geom::{GeomMesh, mesh_diagnostics};
use gridfinity::{
    Base, BinConfig, Grid, ModelOptions, Part, ScoopSide, screw_holes, sliding_lid_bin,
};

/// Parametric Gridfinity generator
#[derive(Parser)]
#[command(name = "gridfinity")]
#[command(about = "Generate Gridfinity bins, lids and accessories as STL/OBJ meshes")]
#[command(version)]
struct Cli {
    /// Log part construction and boolean steps
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bin with optional compartments
    Bin(BinArgs),

    /// Bin with a sliding lid, and the lid
    SlidingLid(SlidingLidArgs),

    /// Plate of screw holes for a grid
    ScrewHoles(GridOnlyArgs),

    /// Base feet only
    Base(GridOnlyArgs),

    /// Print mesh diagnostics for a bin without writing it
    Info(BinArgs),
}

#[derive(Args)]
struct GridArgs {
    /// Grid size as WxH (e.g. 2x3)
    #[arg(long, conflicts_with = "layout")]
    grid: Option<String>,

    /// Irregular grid as ASCII rows, `#` filled and `.` empty (e.g. "##/#.")
    #[arg(long)]
    layout: Option<String>,
}

impl GridArgs {
    fn value(&self) -> Option<&str> {
        self.layout.as_deref().or(self.grid.as_deref())
    }

    fn parse(&self) -> Result<Grid> {
        let value = self.value().unwrap_or("1x1");
        value.parse().with_context(|| format!("invalid grid '{value}'"))
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Mesh format
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Segments per quarter circle
    #[arg(long)]
    segments: Option<usize>,

    /// Overwrite existing files
    #[arg(long)]
    overwrite: bool,
}

impl OutputArgs {
    fn write(&self, mesh: &GeomMesh, name: &str, format: ExportFormat) -> Result<()> {
        let path = self.out.join(name);
        let diagnostics = export_mesh(&path, mesh, format, self.overwrite)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!("{}: {}", path.display(), diagnostics);
        Ok(())
    }
}

#[derive(Args)]
struct BinArgs {
    #[command(flatten)]
    grid: GridArgs,

    /// Height in units of 7 mm
    #[arg(long)]
    height: Option<f64>,

    /// Compartment divisions as XxY (e.g. 2x2)
    #[arg(long, value_parser = parse_divisions)]
    div: Option<(usize, usize)>,

    /// Width of the notch cut into dividers
    #[arg(long)]
    div_cutout: Option<f64>,

    /// Add a label shelf
    #[arg(long)]
    label: bool,

    /// Add a finger scoop on the left side
    #[arg(long)]
    scoop: bool,

    /// Sides with finger scoops (front, back, left, right)
    #[arg(long, value_delimiter = ',')]
    scoops: Option<Vec<ScoopSide>>,

    /// Outer wall thickness in mm
    #[arg(long)]
    wall: Option<f64>,

    /// Leave out the stacking lip
    #[arg(long)]
    no_lip: bool,

    /// Cut screw holes into the base
    #[arg(long)]
    screw_holes: bool,

    /// Bin description in TOML; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

impl BinArgs {
    fn config(&self) -> Result<BinConfig> {
        let mut config = match &self.config {
            Some(path) => BinConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => BinConfig::default(),
        };
        if let Some(grid) = self.grid.value() {
            config.grid = grid.to_owned();
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(div) = self.div {
            config.divisions = div;
        }
        if let Some(cutout) = self.div_cutout {
            config.cutout = cutout;
        }
        config.label |= self.label;
        if let Some(scoops) = &self.scoops {
            config.scoops.clone_from(scoops);
        }
        if self.scoop && !config.scoops.contains(&ScoopSide::Left) {
            config.scoops.push(ScoopSide::Left);
        }
        if let Some(wall) = self.wall {
            config.wall_thickness = wall;
        }
        if self.no_lip {
            config.stacking_lip = false;
        }
        config.screw_holes |= self.screw_holes;
        if let Some(segments) = self.output.segments {
            config.arc_segments = segments;
        }
        if let Some(format) = self.output.format {
            config.format = format;
        }
        Ok(config)
    }
}

#[derive(Args)]
struct SlidingLidArgs {
    #[command(flatten)]
    grid: GridArgs,

    /// Height in units of 7 mm
    #[arg(long, default_value_t = 3.0)]
    height: f64,

    /// Compartment divisions as XxY (e.g. 2x2)
    #[arg(long, value_parser = parse_divisions, default_value = "1x1")]
    div: (usize, usize),

    /// Sides with finger scoops (front, back, left, right)
    #[arg(long, value_delimiter = ',')]
    scoops: Vec<ScoopSide>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct GridOnlyArgs {
    #[command(flatten)]
    grid: GridArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl GridOnlyArgs {
    fn options(&self) -> ModelOptions {
        self.output.segments.map(ModelOptions::new).unwrap_or_default()
    }
}

fn parse_divisions(value: &str) -> Result<(usize, usize), String> {
    Grid::parse_size(value).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Bin(args) => bin(&args),
        Commands::SlidingLid(args) => sliding_lid(&args),
        Commands::ScrewHoles(args) => screw_hole_plate(&args),
        Commands::Base(args) => base(&args),
        Commands::Info(args) => info_command(&args),
    }
}

fn build_bin(config: &BinConfig) -> Result<(Grid, GeomMesh)> {
    let grid = config.grid().context("invalid grid")?;
    let options = config.options();
    let start = Instant::now();
    let mesh = if config.sliding_lid {
        config.sliding_lid_bin(&grid)?.mesh(&options)
    } else {
        config.bin(&grid)?.mesh(&options)
    }
    .context("failed to build bin")?;
    info!(
        "built {} bin in {:.2?} ({} triangles)",
        grid.size_label(),
        start.elapsed(),
        mesh.triangle_count()
    );
    Ok((grid, mesh))
}

fn bin(args: &BinArgs) -> Result<()> {
    let config = args.config()?;
    if config.sliding_lid {
        return write_sliding_lid(&config, &args.output);
    }
    let (grid, mesh) = build_bin(&config)?;
    let name =
        bin_file_name(&grid, config.height, config.divisions, config.features(), config.format);
    args.output.write(&mesh, &name, config.format)
}

fn sliding_lid(args: &SlidingLidArgs) -> Result<()> {
    let config = BinConfig {
        grid: args.grid.value().unwrap_or("1x1").to_owned(),
        height: args.height,
        divisions: args.div,
        scoops: args.scoops.clone(),
        sliding_lid: true,
        arc_segments: args.output.segments.unwrap_or(BinConfig::default().arc_segments),
        format: args.output.format.unwrap_or_default(),
        ..BinConfig::default()
    };
    write_sliding_lid(&config, &args.output)
}

fn write_sliding_lid(config: &BinConfig, output: &OutputArgs) -> Result<()> {
    let grid = config.grid().context("invalid grid")?;
    let options = config.options();
    let parts = config.sliding_lid_bin(&grid)?;
    let start = Instant::now();
    let (body, cover) =
        sliding_lid_bin(&parts, &options).context("failed to build sliding lid bin")?;
    info!("built {} sliding lid bin in {:.2?}", grid.size_label(), start.elapsed());

    output.write(
        &body,
        &sliding_lid_bin_file_name(&grid, config.height, config.divisions, config.format),
        config.format,
    )?;
    output.write(&cover, &sliding_lid_cover_file_name(&grid, config.format), config.format)
}

fn screw_hole_plate(args: &GridOnlyArgs) -> Result<()> {
    let grid = args.grid.parse()?;
    let format = args.output.format.unwrap_or_default();
    let mesh = screw_holes(&grid, &args.options()).context("failed to build screw holes")?;
    args.output.write(&mesh, &screw_holes_file_name(&grid, format), format)
}

fn base(args: &GridOnlyArgs) -> Result<()> {
    let grid = args.grid.parse()?;
    let format = args.output.format.unwrap_or_default();
    let mesh = Base::new(&grid).mesh(&args.options()).context("failed to build base")?;
    args.output.write(&mesh, &base_file_name(&grid, format), format)
}

fn info_command(args: &BinArgs) -> Result<()> {
    let config = args.config()?;
    let (grid, mesh) = build_bin(&config)?;
    let diagnostics = mesh_diagnostics(&mesh);
    println!("grid:       {}", grid.size_label());
    println!("{grid}");
    println!("height:     {} mm", config.height_mm()?);
    println!("vertices:   {}", mesh.vertex_count());
    println!("triangles:  {}", mesh.triangle_count());
    println!("volume:     {:.1} mm^3", mesh.volume());
    if let Some(bbox) = mesh.bbox() {
        let size = bbox.size();
        println!("size:       {:.2} x {:.2} x {:.2} mm", size.x, size.y, size.z);
    }
    println!("diagnostics: {}", diagnostics.summary());
    if !diagnostics.is_valid_solid() {
        tracing::warn!("mesh is not a closed manifold solid");
    }
    Ok(())
}
