//! Tag entries of an IFD. Only a handful of tag IDs
//! matter for locating metadata; everything else is
//! carried as `TiffTagID::Other` so unknown tags never
//! fail a parse.

use std::fmt::{Debug, Display};

use binrw::{BinRead, Endian};

/// The TIFF tag IDs this crate cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffTagID {
    ImageWidth,
    ImageLength,
    ImageDescription,
    StripOffsets,
    StripByteCounts,
    Software,
    Other(u16),
}

impl From<u16> for TiffTagID {
    fn from(raw : u16) -> Self {
        match raw {
            256 => TiffTagID::ImageWidth,
            257 => TiffTagID::ImageLength,
            270 => TiffTagID::ImageDescription,
            273 => TiffTagID::StripOffsets,
            279 => TiffTagID::StripByteCounts,
            305 => TiffTagID::Software,
            other => TiffTagID::Other(other),
        }
    }
}

impl Display for TiffTagID {
    fn fmt(&self, f : &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TiffTagID::ImageWidth => write!(f, "ImageWidth"),
            TiffTagID::ImageLength => write!(f, "ImageLength"),
            TiffTagID::ImageDescription => write!(f, "ImageDescription"),
            TiffTagID::StripOffsets => write!(f, "StripOffsets"),
            TiffTagID::StripByteCounts => write!(f, "StripByteCounts"),
            TiffTagID::Software => write!(f, "Software"),
            TiffTagID::Other(raw) => write!(f, "Tag{}", raw),
        }
    }
}

/// TIFF field type 2, NUL-terminated 7-bit ASCII.
pub const ASCII_TYPE : u16 = 2;

/// Common interface of the `Tiff` and `BigTiff` tag layouts.
pub trait Tag : Debug {
    /// Number of bytes that fit in the value field itself.
    /// Longer data is stored at the offset held by the field.
    const INLINE_BYTES : u64;

    fn datatype(&self) -> u16;
    fn count(&self) -> u64;
    /// The raw value field: either the value or an offset.
    fn value(&self) -> u64;

    /// Returns the value field as the bytes it was stored as,
    /// for data short enough to live inline.
    fn inline_bytes(&self, endian : Endian) -> Vec<u8>;

    /// Whether the data this tag describes fits in the value field.
    fn is_inline(&self) -> bool {
        self.count() <= Self::INLINE_BYTES
    }
}

/// A 12-byte classic TIFF IFD entry.
#[derive(BinRead, Debug, Clone)]
pub struct TiffTag {
    #[br(map = |raw : u16| TiffTagID::from(raw))]
    pub tag : TiffTagID,
    pub datatype : u16,
    pub count : u32,
    pub value : u32,
}

impl Tag for TiffTag {
    const INLINE_BYTES : u64 = 4;

    fn datatype(&self) -> u16 { self.datatype }
    fn count(&self) -> u64 { self.count as u64 }
    fn value(&self) -> u64 { self.value as u64 }

    fn inline_bytes(&self, endian : Endian) -> Vec<u8> {
        match endian {
            Endian::Little => self.value.to_le_bytes().to_vec(),
            Endian::Big => self.value.to_be_bytes().to_vec(),
        }
    }
}

/// A 20-byte BigTIFF IFD entry.
#[derive(BinRead, Debug, Clone)]
pub struct BigTag {
    #[br(map = |raw : u16| TiffTagID::from(raw))]
    pub tag : TiffTagID,
    pub datatype : u16,
    pub count : u64,
    pub value : u64,
}

impl Tag for BigTag {
    const INLINE_BYTES : u64 = 8;

    fn datatype(&self) -> u16 { self.datatype }
    fn count(&self) -> u64 { self.count }
    fn value(&self) -> u64 { self.value }

    fn inline_bytes(&self, endian : Endian) -> Vec<u8> {
        match endian {
            Endian::Little => self.value.to_le_bytes().to_vec(),
            Endian::Big => self.value.to_be_bytes().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tags_are_kept() {
        assert_eq!(TiffTagID::from(270), TiffTagID::ImageDescription);
        assert_eq!(TiffTagID::from(50838), TiffTagID::Other(50838));
        assert_eq!(TiffTagID::Other(7).to_string(), "Tag7");
    }

    #[test]
    fn inline_bytes_follow_file_order() {
        let tag = TiffTag {
            tag : TiffTagID::ImageDescription,
            datatype : ASCII_TYPE,
            count : 3,
            value : u32::from_le_bytes(*b"ab\0\0"),
        };
        assert!(tag.is_inline());
        assert_eq!(&tag.inline_bytes(Endian::Little)[..2], b"ab");

        let big = BigTag {
            tag : TiffTagID::ImageDescription,
            datatype : ASCII_TYPE,
            count : 9,
            value : 0,
        };
        assert!(!big.is_inline());
    }
}
