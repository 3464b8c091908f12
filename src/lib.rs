//! `stagepos` reads the stage positions recorded in the OME
//! metadata of microscopy files (OME-TIFF, BigTIFF, OME-XML)
//! and logs them one value per line, X before Y, in series
//! order.

use std::path::Path;

mod error;
mod file_data;
mod metadata;
mod reporter;
mod stagereader;
mod tiff;
mod utils;

pub use error::{Result, StagePosError};
pub use file_data::{FileType, ValidType};
pub use metadata::{
    Axis, Image, Length, LengthUnit, MetadataReader, OmeMetadata, Plane, StagePosition,
};
pub use reporter::{
    report, report_file, report_plane, series_to_report, CoordinateReporter, LogSink, WriterSink,
};
pub use stagereader::OmeReader;
pub use tiff::FileFormat;
pub use utils::format_value;

/// `open_metadata(filename)` opens an OME-TIFF
/// or OME-XML file, parses its metadata,
/// and returns an `OmeReader` object.
///
/// ## Arguments
///
/// * `filename` - Path of the file to open
///
/// ## Example
///
/// ```rust, ignore
/// let reader = open_metadata("tiles.ome.tif")?;
/// println!("{} series", reader.series_count());
/// ```
pub fn open_metadata<P : AsRef<Path>>(filename : P) -> Result<OmeReader> {
    OmeReader::open(filename)
}

/// `read_positions(filename, plane)` returns the stage
/// position of `plane` for every series of a file, in
/// series order.
///
/// ## Arguments
///
/// * `filename` - Path of the file to open
///
/// * `plane` - Plane index within each series, usually 0
///
/// ## Example
///
/// ```rust, ignore
/// for position in read_positions("tiles.ome.tif", 0)? {
///     let (x, y) = position.values();
/// }
/// ```
pub fn read_positions<P : AsRef<Path>>(filename : P, plane : usize) -> Result<Vec<StagePosition>> {
    open_metadata(filename)?.close().positions(plane)
}

/// Parses an OME-XML string directly, without a file.
/// `MissingOmeXml` if the text has no `OME` root.
pub fn parse_metadata(xml : &str) -> Result<OmeMetadata> {
    metadata::parse_ome_xml(xml)?
        .ok_or_else(|| StagePosError::MissingOmeXml("<string>".to_string()))
}
