/// The primary `OmeReader` object, which
/// opens a file, parses its OME metadata into
/// an `OmeMetadata` store and hands that store
/// back once the file is closed.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::{
    error::{Result, StagePosError},
    file_data::{FileType, ValidType},
    metadata::{parse_ome_xml, OmeMetadata},
    tiff::first_description,
};

/// A struct for reading an OME-TIFF (or BigTIFF)
/// file or a standalone OME-XML file.
pub struct OmeReader {
    _file : BufReader<File>,
    _filename : String,
    pub filetype : FileType,
    metadata : OmeMetadata,
}

impl OmeReader{

    /// Opens a file and parses its metadata.
    ///
    /// # Arguments
    ///
    /// * `filename` - Path of the file to open
    ///
    /// # Errors
    ///
    /// * `IOError` - the file cannot be opened or read
    /// * `UnsupportedFile` - neither TIFF nor OME-XML
    /// * `MissingOmeXml` - a TIFF without an OME-XML description
    /// * `FormatError`, `XmlError` - the container is malformed
    ///
    /// # Example
    ///
    /// ```rust, ignore
    /// let reader = OmeReader::open("tiles.ome.tif")?;
    /// let n = reader.series_count();
    /// let metadata = reader.close();
    /// ```
    pub fn open<P : AsRef<Path>>(filename : P) -> Result<Self> {
        let path = filename.as_ref();
        let file = File::open(path)?;
        let mut buff = BufReader::new(file);
        let filetype = FileType::discern_filetype(&mut buff)?;

        let metadata = match filetype {
            FileType::Valid(ValidType::Tiff(_)) | FileType::Valid(ValidType::BigTiff(_)) => {
                let (_, description) = first_description(&mut buff)?;
                let xml = description.ok_or_else(
                    || StagePosError::MissingOmeXml(path.display().to_string())
                )?;
                let metadata = parse_ome_xml(&xml)?.ok_or_else(
                    || StagePosError::MissingOmeXml(path.display().to_string())
                )?;
                match metadata.binary_only_file().map(str::to_owned) {
                    Some(companion) => read_companion(path, &companion)?,
                    None => metadata,
                }
            },
            FileType::Valid(ValidType::OmeXml) => {
                let mut xml = String::new();
                buff.read_to_string(&mut xml)?;
                parse_ome_xml(&xml)?.ok_or_else(
                    || StagePosError::MissingOmeXml(path.display().to_string())
                )?
            },
            FileType::Other => {
                return Err(StagePosError::UnsupportedFile(path.display().to_string()));
            },
        };

        tracing::debug!(
            file = %path.display(),
            ?filetype,
            series = metadata.series_count(),
            "opened metadata"
        );

        Ok(OmeReader {
            _file : buff,
            _filename : path.display().to_string(),
            filetype,
            metadata,
        })
    }

    /// Copy internal `filename` field
    pub fn filename(&self) -> &str {
        &self._filename
    }

    /// Number of series the file holds.
    pub fn series_count(&self) -> usize {
        self.metadata.series_count()
    }

    pub fn metadata(&self) -> &OmeMetadata {
        &self.metadata
    }

    /// Releases the file handle and returns the populated
    /// metadata store, which stays readable on its own.
    pub fn close(self) -> OmeMetadata {
        tracing::debug!(file = %self._filename, "closing reader");
        drop(self._file);
        self.metadata
    }
}

/// Multi-file OME-TIFF keeps the full metadata in a companion
/// file next to the TIFFs; the TIFF holds a `BinaryOnly` stub.
fn read_companion(tiff_path : &Path, companion : &str) -> Result<OmeMetadata> {
    let companion_path : PathBuf = tiff_path
        .parent()
        .map(|dir| dir.join(companion))
        .unwrap_or_else(|| PathBuf::from(companion));
    tracing::debug!(companion = %companion_path.display(), "following BinaryOnly metadata");

    let xml = std::fs::read_to_string(&companion_path)?;
    let metadata = parse_ome_xml(&xml)?.ok_or_else(
        || StagePosError::MissingOmeXml(companion_path.display().to_string())
    )?;
    if metadata.binary_only_file().is_some() {
        return Err(StagePosError::FormatError(format!(
            "{} is itself a BinaryOnly stub",
            companion_path.display()
        )));
    }
    Ok(metadata)
}
