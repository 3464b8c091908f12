//! The TIFF header: byte order, classic vs. BigTIFF layout,
//! and where the first IFD lives.

use binrw::{
    io::{Read, Seek, SeekFrom},
    BinReaderExt,
    Endian,
};

use crate::error::{Result, StagePosError};

/// Which flavor of TIFF a file is, with the information
/// needed to start walking its IFDs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Tiff { endian : Endian, first_ifd : u64 },
    BigTiff { endian : Endian, first_ifd : u64 },
}

impl FileFormat {
    /// Reads the header from the start of `reader`.
    ///
    /// ## Errors
    ///
    /// * `FormatError` - the byte-order mark or version
    /// number is not one of the TIFF values, or BigTIFF
    /// declares an offset size other than 8.
    pub fn parse_from<R : Read + Seek>(reader : &mut R) -> Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let endian = match reader.read_le::<[u8; 2]>()? {
            [b'I', b'I'] => Endian::Little,
            [b'M', b'M'] => Endian::Big,
            other => {
                return Err(StagePosError::FormatError(
                    format!("Invalid byte order mark {:?}", other)
                ))
            }
        };

        match reader.read_type::<u16>(endian)? {
            42 => {
                let first_ifd = reader.read_type::<u32>(endian)? as u64;
                Ok(FileFormat::Tiff { endian, first_ifd })
            },
            43 => {
                let offset_size = reader.read_type::<u16>(endian)?;
                let _reserved = reader.read_type::<u16>(endian)?;
                if offset_size != 8 {
                    return Err(StagePosError::FormatError(
                        format!("Unsupported BigTIFF offset size {}", offset_size)
                    ));
                }
                let first_ifd = reader.read_type::<u64>(endian)?;
                Ok(FileFormat::BigTiff { endian, first_ifd })
            },
            version => Err(StagePosError::FormatError(
                format!("Invalid TIFF version {}", version)
            )),
        }
    }

    pub fn endian(&self) -> Endian {
        match self {
            FileFormat::Tiff { endian, .. } | FileFormat::BigTiff { endian, .. } => *endian,
        }
    }

    pub fn first_ifd(&self) -> u64 {
        match self {
            FileFormat::Tiff { first_ifd, .. } | FileFormat::BigTiff { first_ifd, .. } => *first_ifd,
        }
    }
}
