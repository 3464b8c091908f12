//! Errors that can occur while opening a metadata container,
//! parsing it, or reporting the positions it holds.

use thiserror::Error;

use crate::metadata::Axis;

/// The single error type of the crate. Errors from the
/// file reader (the `IOError` variant), from the container's
/// structure (`FormatError`, `XmlError`) or from the values
/// requested of the metadata (out of range, missing).
#[derive(Debug, Error)]
pub enum StagePosError {
    #[error("IOError: {0}")]
    IOError(#[from] std::io::Error),

    #[error("FormatError: {0}")]
    FormatError(String),

    #[error("XmlError: {0}")]
    XmlError(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("No OME-XML metadata found in {0}")]
    MissingOmeXml(String),

    #[error("Series {series} out of range (file has {count} series)")]
    SeriesOutOfRange { series : usize, count : usize },

    #[error("Plane {plane} out of range for series {series} ({count} planes)")]
    PlaneOutOfRange { series : usize, plane : usize, count : usize },

    #[error("No stage position {axis} for series {series}, plane {plane}")]
    MissingPosition { series : usize, plane : usize, axis : Axis },

    #[error("Could not write to log: {0}")]
    LogSinkError(std::io::Error),
}

impl From<binrw::Error> for StagePosError {
    fn from(err : binrw::Error) -> Self {
        match err {
            binrw::Error::Io(io_err) => StagePosError::IOError(io_err),
            other => StagePosError::FormatError(other.to_string()),
        }
    }
}

impl From<quick_xml::Error> for StagePosError {
    fn from(err : quick_xml::Error) -> Self {
        StagePosError::XmlError(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for StagePosError {
    fn from(err : quick_xml::events::attributes::AttrError) -> Self {
        StagePosError::XmlError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StagePosError>;
