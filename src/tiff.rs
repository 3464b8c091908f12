//! This module contains the TIFF container handling
//! -- purely for I/O operations, does not know about OME,
//! stage positions, etc.

mod file_format;
mod ifd;
mod tags;

use binrw::io::{Read, Seek};

pub use ifd::{TiffIFD, BigTiffIFD};
pub use file_format::FileFormat;

use crate::error::Result;

/// Returns the `ImageDescription` of the first IFD of a
/// TIFF or BigTIFF file, which is where OME-TIFF keeps its
/// OME-XML block. `None` if the first IFD has no description.
/// A truncated or corrupt first IFD is an error, not `None`.
///
/// ## Arguments
///
/// * `reader` - A reader over the whole file
///
/// ## Example
///
/// ```rust, ignore
/// let mut file = std::fs::File::open("tiles.ome.tif")?;
/// let (format, xml) = first_description(&mut file)?;
/// ```
pub fn first_description<R : Read + Seek>(reader : &mut R)
    -> Result<(FileFormat, Option<String>)> {
    let format = FileFormat::parse_from(reader)?;
    let endian = format.endian();
    let description = match format {
        FileFormat::Tiff { first_ifd, .. } => {
            ifd::description_at::<TiffIFD, R>(reader, first_ifd, endian)?
        },
        FileFormat::BigTiff { first_ifd, .. } => {
            ifd::description_at::<BigTiffIFD, R>(reader, first_ifd, endian)?
        },
    };
    tracing::debug!(?format, has_description = description.is_some(), "read TIFF header");
    Ok((format, description))
}
