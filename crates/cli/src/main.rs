//! DSWE CLI - Dynamic Surface Water Extent classification

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use dswe_algorithms::classification::{
    ConfidenceClass, DsweThresholds, QualityEncoding, Sensor, ThresholdOverrides,
};
use dswe_algorithms::pipeline::{
    run_with_progress, BandScale, BandSet, ClassSummary, DsweOutput, DsweParams,
};
use dswe_algorithms::terrain::{
    scale_percent_slope, Hillshade, HillshadeParams, Slope, SlopeAlgorithm, SlopeParams,
    SunGeometry,
};
use dswe_core::io::{read_geotiff, write_geotiff};
use dswe_core::{Algorithm, GeoTransform, Raster, RasterElement};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "dswe")]
#[command(author, version, about = "Dynamic Surface Water Extent classification", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Classify a scene into surface water confidence classes
    Classify(ClassifyArgs),
    /// Calculate percent slope from a DEM
    Slope {
        /// Input DEM file
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Use Zevenbergen-Thorne instead of Horn (square pixels only)
        #[arg(long)]
        zevenbergen_thorne: bool,
        /// Write percent slope × 10 as 16-bit integers
        #[arg(long)]
        scaled: bool,
        #[command(flatten)]
        resolution: ResolutionArgs,
    },
    /// Calculate 8-bit hillshade from a DEM
    Hillshade {
        /// Input DEM file
        input: PathBuf,
        /// Output file
        output: PathBuf,
        #[command(flatten)]
        sun: SunArgs,
        #[command(flatten)]
        resolution: ResolutionArgs,
    },
}

#[derive(Args)]
struct ClassifyArgs {
    /// Blue surface reflectance band
    #[arg(long)]
    blue: PathBuf,
    /// Green surface reflectance band
    #[arg(long)]
    green: PathBuf,
    /// Red surface reflectance band
    #[arg(long)]
    red: PathBuf,
    /// Near-infrared surface reflectance band
    #[arg(long)]
    nir: PathBuf,
    /// Shortwave infrared 1 surface reflectance band
    #[arg(long)]
    swir1: PathBuf,
    /// Shortwave infrared 2 surface reflectance band
    #[arg(long)]
    swir2: PathBuf,
    /// Quality band (pixel QA bits, or CFmask classes with --cfmask)
    #[arg(long)]
    qa: PathBuf,
    /// Elevation band on the same grid as the reflectance bands
    #[arg(long)]
    elevation: PathBuf,

    /// Directory for the output bands
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Satellite selecting the default thresholds (LANDSAT_4, _5, _7, _8)
    #[arg(long, default_value = "LANDSAT_8")]
    sensor: String,

    /// JSON file with threshold overrides
    #[arg(long)]
    thresholds: Option<PathBuf>,

    #[command(flatten)]
    overrides: ThresholdArgs,

    #[command(flatten)]
    sun: SunArgs,

    #[command(flatten)]
    resolution: ResolutionArgs,

    /// Fill value of the reflectance bands, replacing the files' own
    #[arg(long, allow_hyphen_values = true)]
    reflectance_fill: Option<i16>,

    /// Fill value of the quality band, replacing the file's own
    #[arg(long)]
    qa_fill: Option<u16>,

    /// Scale factor applied to every reflectance band
    #[arg(long, default_value_t = 1.0)]
    reflectance_scale: f32,

    /// Quality band holds CFmask class codes instead of bit flags
    #[arg(long)]
    cfmask: bool,

    /// Use Zevenbergen-Thorne instead of Horn for percent slope
    #[arg(long)]
    zevenbergen_thorne: bool,

    /// Also write the raw diagnostic test codes
    #[arg(long)]
    include_tests: bool,

    /// Also write percent slope (× 10)
    #[arg(long)]
    include_ps: bool,

    /// Also write hillshade
    #[arg(long)]
    include_hs: bool,
}

/// Individual threshold overrides, applied after the thresholds file
#[derive(Args)]
struct ThresholdArgs {
    /// Wetness index (MNDWI) threshold
    #[arg(long, allow_hyphen_values = true)]
    wigt: Option<f32>,
    /// AWEsh threshold
    #[arg(long, allow_hyphen_values = true)]
    awgt: Option<f32>,
    #[arg(long, allow_hyphen_values = true)]
    pswt1_mndwi: Option<f32>,
    #[arg(long)]
    pswt1_nir: Option<f32>,
    #[arg(long)]
    pswt1_swir1: Option<f32>,
    #[arg(long)]
    pswt1_ndvi: Option<f32>,
    #[arg(long, allow_hyphen_values = true)]
    pswt2_mndwi: Option<f32>,
    #[arg(long)]
    pswt2_blue: Option<f32>,
    #[arg(long)]
    pswt2_nir: Option<f32>,
    #[arg(long)]
    pswt2_swir1: Option<f32>,
    #[arg(long)]
    pswt2_swir2: Option<f32>,
    /// Percent slope masking high confidence water
    #[arg(long)]
    percent_slope_high: Option<f32>,
    /// Percent slope masking moderate confidence water
    #[arg(long)]
    percent_slope_moderate: Option<f32>,
    /// Percent slope masking potential wetland
    #[arg(long)]
    percent_slope_wetland: Option<f32>,
    /// Percent slope masking low confidence water or wetland
    #[arg(long)]
    percent_slope_low: Option<f32>,
    /// Hillshade at or below which pixels are masked
    #[arg(long)]
    hillshade: Option<u8>,
}

impl From<&ThresholdArgs> for ThresholdOverrides {
    fn from(a: &ThresholdArgs) -> Self {
        ThresholdOverrides {
            wigt: a.wigt,
            awgt: a.awgt,
            pswt1_mndwi: a.pswt1_mndwi,
            pswt1_nir: a.pswt1_nir,
            pswt1_swir1: a.pswt1_swir1,
            pswt1_ndvi: a.pswt1_ndvi,
            pswt2_mndwi: a.pswt2_mndwi,
            pswt2_blue: a.pswt2_blue,
            pswt2_nir: a.pswt2_nir,
            pswt2_swir1: a.pswt2_swir1,
            pswt2_swir2: a.pswt2_swir2,
            percent_slope_high: a.percent_slope_high,
            percent_slope_moderate: a.percent_slope_moderate,
            percent_slope_wetland: a.percent_slope_wetland,
            percent_slope_low: a.percent_slope_low,
            hillshade: a.hillshade,
        }
    }
}

/// Sun position in degrees
#[derive(Args)]
struct SunArgs {
    /// Sun elevation above the horizon
    #[arg(long, conflicts_with = "sun_zenith")]
    sun_elevation: Option<f64>,
    /// Sun zenith angle (90 - elevation)
    #[arg(long)]
    sun_zenith: Option<f64>,
    /// Sun azimuth, clockwise from north
    #[arg(long, default_value_t = 315.0)]
    sun_azimuth: f64,
}

impl SunArgs {
    fn geometry(&self) -> SunGeometry {
        match (self.sun_elevation, self.sun_zenith) {
            (Some(elevation), _) => SunGeometry::from_degrees(elevation, self.sun_azimuth),
            (None, Some(zenith)) => SunGeometry::from_zenith_degrees(zenith, self.sun_azimuth),
            (None, None) => SunGeometry::from_degrees(45.0, self.sun_azimuth),
        }
    }
}

/// Pixel size of the elevation band
#[derive(Args)]
struct ResolutionArgs {
    /// Elevation pixel size as EW [NS], in elevation units; required when the
    /// DEM carries no georeferencing
    #[arg(long, num_args = 1..=2, value_name = "SIZE")]
    resolution: Vec<f64>,
}

impl ResolutionArgs {
    fn pixel_size(&self) -> Result<Option<(f64, f64)>> {
        match self.resolution[..] {
            [] => Ok(None),
            [res] => Ok(Some((res, res))),
            [ew, ns] => Ok(Some((ew, ns))),
            _ => anyhow::bail!("--resolution takes one or two values"),
        }
    }

    /// Apply the explicit pixel size to a DEM, or make sure it has its own
    fn apply(&self, dem: &mut Raster<f64>) -> Result<()> {
        match self.pixel_size()? {
            Some((ew, ns)) => {
                let gt = *dem.transform();
                dem.set_transform(GeoTransform::new(gt.origin_x, gt.origin_y, ew, -ns));
            }
            None if !dem.transform().is_georeferenced() => {
                anyhow::bail!("Elevation band has no georeferencing; pass --resolution")
            }
            None => {}
        }
        Ok(())
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logging")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn row_progress(rows: usize) -> ProgressBar {
    let pb = ProgressBar::new(rows as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Classifying [{bar:40.cyan/blue}] {pos}/{len} rows ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb
}

fn read_band<T: RasterElement>(path: &Path, name: &str) -> Result<Raster<T>> {
    let pb = spinner(&format!("Reading {}...", name));
    let raster: Raster<T> = read_geotiff(path)
        .with_context(|| format!("Failed to read {} band {}", name, path.display()))?;
    pb.finish_and_clear();
    debug!("{}: {} x {}, fill {:?}", name, raster.cols(), raster.rows(), raster.nodata());
    Ok(raster)
}

fn write_band<T: RasterElement>(raster: &Raster<T>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path).with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    debug!("Wrote {}", path.display());
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

/// Sensor defaults, then the thresholds file, then command-line overrides
fn resolve_thresholds(
    sensor: Sensor,
    file: Option<&Path>,
    cli: ThresholdOverrides,
) -> Result<DsweThresholds> {
    let mut overrides = ThresholdOverrides::default();
    if let Some(path) = file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read thresholds file {}", path.display()))?;
        overrides = serde_json::from_str(&text)
            .with_context(|| format!("Invalid thresholds file {}", path.display()))?;
    }

    let thresholds = overrides.merge(cli).apply(sensor.default_thresholds());
    thresholds.validate().context("Invalid threshold configuration")?;
    Ok(thresholds)
}

fn print_summary(summary: &ClassSummary) {
    let total = summary.total().max(1);
    println!("\nFiltered classes:");
    for (value, count) in summary.iter() {
        let label = ConfidenceClass::from_u8(value).map_or("unknown", ConfidenceClass::label);
        println!(
            "  {:>3} {:<32} {:>10} ({:.1}%)",
            value,
            label,
            count,
            100.0 * count as f64 / total as f64
        );
    }
}

// ─── Commands ───────────────────────────────────────────────────────────

fn classify(args: &ClassifyArgs) -> Result<()> {
    let sensor: Sensor = args.sensor.parse().context("Invalid --sensor")?;
    let thresholds = resolve_thresholds(
        sensor,
        args.thresholds.as_deref(),
        ThresholdOverrides::from(&args.overrides),
    )?;
    info!("Sensor: {}", sensor);
    debug!("Thresholds: {}", serde_json::to_string(&thresholds)?);

    let params = DsweParams {
        thresholds,
        slope_algorithm: if args.zevenbergen_thorne {
            SlopeAlgorithm::ZevenbergenThorne
        } else {
            SlopeAlgorithm::Horn
        },
        sun: args.sun.geometry(),
        quality_encoding: if args.cfmask {
            QualityEncoding::Cfmask
        } else {
            QualityEncoding::default()
        },
        hillshade_edge: 0,
        resolution: args.resolution.pixel_size()?,
        include_diagnostic: args.include_tests,
        include_percent_slope: args.include_ps,
        include_hillshade: args.include_hs,
    };
    params.validate().context("Invalid configuration")?;

    let mut reflectance = Vec::with_capacity(6);
    for (name, path) in [
        ("blue", &args.blue),
        ("green", &args.green),
        ("red", &args.red),
        ("nir", &args.nir),
        ("swir1", &args.swir1),
        ("swir2", &args.swir2),
    ] {
        let mut band: Raster<i16> = read_band(path, name)?;
        if args.reflectance_fill.is_some() {
            band.set_nodata(args.reflectance_fill);
        }
        reflectance.push(band);
    }
    let mut quality: Raster<u16> = read_band(&args.qa, "qa")?;
    if args.qa_fill.is_some() {
        quality.set_nodata(args.qa_fill);
    }
    let elevation: Raster<f32> = read_band(&args.elevation, "elevation")?;

    let (rows, cols) = reflectance[0].shape();
    info!("Input: {} x {}", cols, rows);

    let bands = BandSet {
        blue: &reflectance[0],
        green: &reflectance[1],
        red: &reflectance[2],
        nir: &reflectance[3],
        swir1: &reflectance[4],
        swir2: &reflectance[5],
        quality: &quality,
        elevation: &elevation,
        scale: BandScale::uniform(args.reflectance_scale),
    };

    let start = Instant::now();
    let pb = row_progress(rows);
    let output = run_with_progress(&bands, &params, |done, _| pb.set_position(done as u64));
    pb.finish_and_clear();
    let output = output.context("Failed to classify scene")?;
    let elapsed = start.elapsed();

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;
    let dir = args.output_dir.as_path();
    write_outputs(&output, dir)?;

    print_summary(&output.summary());
    done("DSWE", dir, elapsed);
    Ok(())
}

/// Write every product into a staging directory next to the outputs, then
/// move them into place. A failed write leaves no product behind.
fn write_outputs(output: &DsweOutput, dir: &Path) -> Result<Vec<PathBuf>> {
    let staging = tempfile::Builder::new()
        .prefix(".dswe-")
        .tempdir_in(dir)
        .with_context(|| format!("Failed to create staging directory in {}", dir.display()))?;

    let mut names = vec!["dswe_intrpd.tif", "dswe_pshsccss.tif", "dswe_mask.tif"];
    write_band(&output.interpreted, &staging.path().join(names[0]))?;
    write_band(&output.filtered, &staging.path().join(names[1]))?;
    write_band(&output.mask, &staging.path().join(names[2]))?;
    if let Some(diagnostic) = &output.diagnostic {
        names.push("dswe_diag.tif");
        write_band(diagnostic, &staging.path().join("dswe_diag.tif"))?;
    }
    if let Some(percent_slope) = &output.percent_slope {
        names.push("percent_slope.tif");
        write_band(percent_slope, &staging.path().join("percent_slope.tif"))?;
    }
    if let Some(hillshade) = &output.hillshade {
        names.push("hillshade.tif");
        write_band(hillshade, &staging.path().join("hillshade.tif"))?;
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(names.len());
    for name in names {
        let target = dir.join(name);
        if let Err(e) = std::fs::rename(staging.path().join(name), &target) {
            for path in &written {
                let _ = std::fs::remove_file(path);
            }
            return Err(e).with_context(|| format!("Failed to move {} into place", target.display()));
        }
        written.push(target);
    }
    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}

fn info_command(input: &Path) -> Result<()> {
    let raster: Raster<f64> = read_band(input, "input")?;
    let (rows, cols) = raster.shape();
    let (ew_res, ns_res) = raster.resolution();
    let bounds = raster.bounds();
    let stats = raster.statistics();

    println!("File: {}", input.display());
    println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
    println!("Resolution: {} x {}", ew_res, ns_res);
    println!(
        "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
        bounds.0, bounds.1, bounds.2, bounds.3
    );
    if let Some(nodata) = raster.nodata() {
        println!("Fill value: {}", nodata);
    }
    println!("\nStatistics:");
    if let Some(min) = stats.min {
        println!("  Min: {:.4}", min);
    }
    if let Some(max) = stats.max {
        println!("  Max: {:.4}", max);
    }
    println!(
        "  Valid cells: {} ({:.1}%)",
        stats.valid_count,
        100.0 * stats.valid_count as f64 / raster.len().max(1) as f64
    );
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => info_command(&input)?,

        Commands::Classify(args) => classify(&args)?,

        Commands::Slope {
            input,
            output,
            zevenbergen_thorne,
            scaled,
            resolution,
        } => {
            let algorithm = if zevenbergen_thorne {
                SlopeAlgorithm::ZevenbergenThorne
            } else {
                SlopeAlgorithm::Horn
            };
            let mut dem: Raster<f64> = read_band(&input, "elevation")?;
            resolution.apply(&mut dem)?;
            let start = Instant::now();
            let result = Slope
                .execute(dem, SlopeParams { algorithm })
                .context("Failed to calculate slope")?;
            let elapsed = start.elapsed();
            if scaled {
                write_band(&scale_percent_slope(&result)?, &output)?;
            } else {
                write_band(&result, &output)?;
            }
            done("Percent slope", &output, elapsed);
        }

        Commands::Hillshade {
            input,
            output,
            sun,
            resolution,
        } => {
            let mut dem: Raster<f64> = read_band(&input, "elevation")?;
            resolution.apply(&mut dem)?;
            let start = Instant::now();
            let params = HillshadeParams {
                sun: sun.geometry(),
                edge_value: 0,
            };
            let result = Hillshade
                .execute(dem, params)
                .context("Failed to calculate hillshade")?;
            let elapsed = start.elapsed();
            write_band(&result, &output)?;
            done("Hillshade", &output, elapsed);
        }
    }

    Ok(())
}
