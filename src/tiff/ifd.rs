//! Contains the Image File Directory (IFD) data structure
//! for the classic `Tiff` and the `BigTiff` layouts.
//!
//! Only the byte order differs between otherwise identical
//! files, so IFDs are read with the endianness found in the
//! header rather than a fixed one.
//!
//! Counts and offsets come straight from the file, so every
//! one of them is checked before anything is allocated.

use std::fmt::Debug;
use binrw::{
    io::{Read, Seek, SeekFrom},
    BinRead,
    Endian,
};

use crate::{
    error::{Result, StagePosError},
    tiff::tags::{TiffTag, TiffTagID, BigTag, Tag, ASCII_TYPE},
};

/// No real BigTIFF comes close to this many tags in one IFD.
const MAX_BIGTIFF_TAGS : u64 = 1 << 16;

/// Generic IFD trait for the `Tiff` and `BigTiff` formats
pub trait IFD : BinRead + Debug {
    type TagType : Tag;

    /// Reads an `IFD` from a reader pointing to the start of the IFD
    fn new<T : Read + Seek>(reader : &mut T, endian : Endian) -> binrw::BinResult<Self>
        where for<'b> <Self as BinRead>::Args<'b> : Default {
        Self::read_options(reader, endian, Default::default())
    }

    /// Returns the tag whose `TiffTagID` matches that provided
    ///
    /// ## Arguments
    ///
    /// * `tag_id` - The `TiffTagID` of the tag to retrieve
    fn get_tag(&self, tag_id : TiffTagID) -> Option<&Self::TagType>;

    /// Reads the string stored in an ASCII tag, if the
    /// IFD has it. Restores the reader's position afterwards.
    ///
    /// ## Arguments
    ///
    /// * `tag_id` - The tag to read, e.g. `ImageDescription`
    ///
    /// * `reader` - The reader of the file this IFD came from
    ///
    /// * `endian` - The byte order of the file
    ///
    /// ## Errors
    ///
    /// * `FormatError` - The tag is not ASCII, not valid UTF-8,
    /// or points past the end of the file
    /// * `IOError` - The data could not be read
    fn read_ascii<R : Read + Seek>(
        &self,
        tag_id : TiffTagID,
        reader : &mut R,
        endian : Endian,
    ) -> Result<Option<String>> {
        let tag = match self.get_tag(tag_id) {
            Some(tag) => tag,
            None => return Ok(None),
        };
        if tag.datatype() != ASCII_TYPE {
            return Err(StagePosError::FormatError(
                format!("{} has type {}, expected ASCII", tag_id, tag.datatype())
            ));
        }

        let bytes = if tag.is_inline() {
            let mut bytes = tag.inline_bytes(endian);
            bytes.truncate(tag.count() as usize);
            bytes
        } else {
            let cur_pos = reader.stream_position()?;
            let read = read_span(reader, tag.value(), tag.count());
            reader.seek(SeekFrom::Start(cur_pos))?;
            read.map_err(|err| match err {
                StagePosError::FormatError(msg) => StagePosError::FormatError(
                    format!("{}: {}", tag_id, msg)
                ),
                other => other,
            })?
        };

        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
        String::from_utf8(bytes[..end].to_vec())
            .map(Some)
            .map_err(|err| StagePosError::FormatError(
                format!("{} is not valid UTF-8: {}", tag_id, err)
            ))
    }
}

/// Reads `count` bytes at `offset`, refusing spans that do
/// not lie inside the file. Leaves the reader wherever it ends.
fn read_span<R : Read + Seek>(reader : &mut R, offset : u64, count : u64) -> Result<Vec<u8>> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    match offset.checked_add(count) {
        Some(end) if end <= file_len => (),
        _ => {
            return Err(StagePosError::FormatError(format!(
                "{} bytes at offset {} run past the end of the file ({} bytes)",
                count, offset, file_len
            )))
        },
    }
    reader.seek(SeekFrom::Start(offset))?;
    let mut bytes = vec![0u8; count as usize];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

/// Reads the IFD at `offset` and returns its `ImageDescription`.
/// An `offset` of 0 means the file has no IFD at all.
///
/// ## Errors
///
/// * `FormatError`, `IOError` - the IFD is truncated or corrupt
pub(crate) fn description_at<I, R>(reader : &mut R, offset : u64, endian : Endian)
    -> Result<Option<String>>
    where I : IFD, R : Read + Seek, for<'b> <I as BinRead>::Args<'b> : Default {
    if offset == 0 {
        return Ok(None);
    }
    reader.seek(SeekFrom::Start(offset))?;
    let ifd = I::new(reader, endian)?;
    ifd.read_ascii(TiffTagID::ImageDescription, reader, endian)
}

/// Contains the IFD data of a classic TIFF file.
#[derive(BinRead, Default)]
pub struct TiffIFD {
    num_tags : u16,

    #[br(count = num_tags)]
    tags : Vec<TiffTag>,

    next_ifd : u32,
}

impl IFD for TiffIFD {
    type TagType = TiffTag;

    fn get_tag(&self, tag_id : TiffTagID) -> Option<&TiffTag> {
        self.tags.iter()
            .find(|tag| tag.tag == tag_id)
    }
}

/// Contains the IFD data of a BigTIFF file.
#[derive(BinRead, Default)]
pub struct BigTiffIFD {
    #[br(assert(num_tags <= MAX_BIGTIFF_TAGS, "implausible IFD tag count {}", num_tags))]
    num_tags : u64,

    #[br(count = num_tags)]
    tags : Vec<BigTag>,

    next_ifd : u64,
}

impl IFD for BigTiffIFD {
    type TagType = BigTag;

    fn get_tag(&self, tag_id : TiffTagID) -> Option<&BigTag> {
        self.tags.iter()
            .find(|tag| tag.tag == tag_id)
    }
}

impl Debug for TiffIFD {
    fn fmt(&self, f : &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "IFD: Num Tags: {}\nTags: {:?}\nNext IFD: {}",
            self.num_tags,
            self.tags,
            self.next_ifd,
        )
    }
}

impl Debug for BigTiffIFD {
    fn fmt(&self, f : &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "IFD: Num Tags: {}\nTags: {:?}\nNext IFD: {}",
            self.num_tags,
            self.tags,
            self.next_ifd,
        )
    }
}
