//! Feature table builder CLI.
//!
//! Reads the raw CSV tables, runs the pipeline and writes the feature table.
//!
//! Usage: `features --data-dir DIR --counties MAP.json [--output FILE] [--config FILE]`

use std::{
    error::Error,
    fs::{self, File},
    path::{Path, PathBuf},
};

use clap::Parser;
use polars::prelude::*;
use prosumer::{
    pipeline::{FeatureBuilder, PipelineConfig, RawTables},
    primitives::CountyMap,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Build the prosumer feature table from raw CSV tables")]
struct Args {
    /// Directory holding the raw tables.
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,
    /// Base rows, relative to the data directory.
    #[arg(long, default_value = "train.csv")]
    base: String,
    /// Separate target history, relative to the data directory.
    #[arg(long)]
    targets: Option<String>,
    /// County map JSON: `{"57.6_21.7": 0, ...}`.
    #[arg(long)]
    counties: PathBuf,
    /// Pipeline configuration JSON. Missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fail when the joins duplicate base rows.
    #[arg(long)]
    strict: bool,
    /// Output CSV.
    #[arg(short, long, default_value = "features.csv")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let args = Args::parse();

    let mut config: PipelineConfig = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => PipelineConfig::default(),
    };
    config.strict_row_count |= args.strict;

    let counties: CountyMap = serde_json::from_str(&fs::read_to_string(&args.counties)?)?;
    info!(grid_points = counties.len(), "county map loaded");

    let dir = &args.data_dir;
    let tables = RawTables {
        base: read_csv(&dir.join(&args.base))?,
        client: read_csv(&dir.join("client.csv"))?,
        gas: read_csv(&dir.join("gas_prices.csv"))?,
        electricity: read_csv(&dir.join("electricity_prices.csv"))?,
        historical_weather: read_csv(&dir.join("historical_weather.csv"))?,
        forecast_weather: read_csv(&dir.join("forecast_weather.csv"))?,
        targets: args.targets.as_ref().map(|t| read_csv(&dir.join(t))).transpose()?,
    };

    let mut features = FeatureBuilder::with_config(config).build(tables, &counties)?;

    let mut file = File::create(&args.output)?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut features)?;
    info!(
        rows = features.height(),
        columns = features.width(),
        output = %args.output.display(),
        "feature table written"
    );

    Ok(())
}

/// Read a CSV table, leaving date columns as strings for the pipeline to parse.
fn read_csv(path: &Path) -> PolarsResult<DataFrame> {
    let df = LazyCsvReader::new(path).with_infer_schema_length(Some(10_000)).finish()?.collect()?;
    info!(path = %path.display(), rows = df.height(), "table loaded");
    Ok(df)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
