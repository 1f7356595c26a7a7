//! Print the extent of a raster dataset in another reference system.

use std::path::PathBuf;

use clap::Parser as _;
use color_eyre::eyre::{ContextCompat as _, Result};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, Layer as _};

use tilewarp::dataset::{DatasetProvider as _, GeoTiffProvider};
use tilewarp::geometry::projection::{SpatialRef, Transformer};
use tilewarp::window::dataset_extent;

/// Arguments of `tilewarp-calcextent`
#[derive(clap::Parser, Debug)]
#[clap(author, version)]
#[command(about = "Compute the extent of a GeoTIFF dataset in a target reference system.")]
struct Args {
    /// Dataset to measure.
    #[arg(short, long, value_name = "GeoTIFF file")]
    file: PathBuf,

    /// Reference system of the dataset, overriding the one it declares.
    #[arg(short, long, value_name = "EPSG code or PROJ string")]
    srs: Option<String>,

    /// Reference system of the reported extent.
    #[arg(short, long, value_name = "EPSG code or PROJ string", default_value = "EPSG:4326")]
    target: String,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    setup_logging()?;
    let args = Args::parse();
    tracing::debug!("Running with arguments: {args:?}");

    let dataset = GeoTiffProvider.open(&args.file)?;
    let info = dataset.info();
    tracing::info!(width = info.width, height = info.height, "Dataset size");

    let source = match &args.srs {
        Some(srs) => {
            tracing::info!(srs = %srs, "Using user provided SRS");
            srs.clone()
        }
        None => info
            .srs
            .clone()
            .context("dataset has no spatial reference, pass --srs")?,
    };
    let source = SpatialRef::parse(&source)?;
    let target = SpatialRef::parse(&args.target)?;
    let forward = Transformer::new(&source, &target)?;

    let extent = dataset_extent(&info.geo_transform, &forward, info.width, info.height)
        .context("no border pixel could be transformed into the target reference system")?;
    println!(
        "EXTENT: {:.15} {:.15} {:.15} {:.15}",
        extent.minx, extent.miny, extent.maxx, extent.maxy
    );
    Ok(())
}

/// Setup logging.
fn setup_logging() -> Result<()> {
    let filters = tracing_subscriber::EnvFilter::builder()
        .with_default_directive("tilewarp=info".parse()?)
        .from_env_lossy();
    let filter_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filters);
    tracing_subscriber::registry().with(filter_layer).init();
    Ok(())
}
