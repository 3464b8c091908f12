use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use stagepos::{CoordinateReporter, StagePosError, WriterSink};

/// Logs the stage X/Y position of every series in
/// OME-TIFF / OME-XML files, one value per line.
///
/// # Example
///
/// ```text
/// stage_positions tiles.ome.tif --tiles 4
/// ```
#[derive(Parser, Debug)]
#[command(name = "stage_positions")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Files to read, reported in the order given
    #[arg(value_name = "FILE", required = true)]
    files : Vec<PathBuf>,

    /// Number of tiles to report instead of the file's series count
    #[arg(short = 'n', long)]
    tiles : Option<usize>,

    /// Plane of each series to take the position from
    #[arg(short = 'p', long, default_value = "0")]
    plane : usize,

    /// Append the unit to each value
    #[arg(long)]
    units : bool,

    /// Convert physical units to micrometers
    #[arg(long)]
    micrometers : bool,

    /// Print a `# <file>` line before each file's values
    #[arg(long)]
    header : bool,
}

fn run<W : Write>(cli : &Cli, out : W) -> Result<(), StagePosError> {
    let reporter = CoordinateReporter::new()
        .with_plane(cli.plane)
        .with_units(cli.units)
        .with_micrometers(cli.micrometers)
        .with_header(cli.header);

    let mut sink = WriterSink::new(out);
    let result = reporter.report_files(cli.files.as_slice(), cli.tiles, &mut sink);
    // whatever was written before a failure still goes out
    sink.into_inner().flush().map_err(StagePosError::LogSinkError)?;
    result.map(|_| ())
}

fn main() {
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli, io::stdout().lock()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
