use std::io::BufRead;

use binrw::Endian;

/// What kind of metadata container a file is, judged
/// only from its first bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileType {
    Valid(ValidType),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidType {
    Tiff(Endian),
    BigTiff(Endian),
    OmeXml,
}

impl FileType{
    /// Checks a file against all the
    /// criteria to determine the enum
    /// type of file contained. Does not
    /// consume anything from the buffer.
    ///
    /// ## Arguments
    ///
    /// * `buffer` - A BufRead pointing to
    /// the start of a file.
    ///
    /// ## Example
    ///
    /// ```rust, ignore
    /// use std::fs::File;
    /// use std::io::BufReader;
    ///
    /// let file = File::open("tiles.ome.tif")?;
    /// let mut buff = BufReader::new(file);
    ///
    /// let filetype = FileType::discern_filetype(&mut buff)?;
    /// ```
    pub fn discern_filetype(buffer : &mut dyn BufRead) -> std::io::Result<Self> {
        let head = buffer.fill_buf()?;
        if let Some(valid) = FileType::tiff_type(head) {
            return Ok(FileType::Valid(valid));
        }
        if FileType::looks_like_xml(head) {
            return Ok(FileType::Valid(ValidType::OmeXml));
        }
        Ok(FileType::Other)
    }

    /// Checks the endian of a file by examining the
    /// first two bytes of the file. "II" is little endian,
    /// "MM" is big endian. The next two bytes are 42
    /// for TIFF and 43 for BigTIFF.
    fn tiff_type(head : &[u8]) -> Option<ValidType> {
        if head.len() < 4 {
            return None;
        }
        let endian = match &head[..2] {
            b"II" => Endian::Little,
            b"MM" => Endian::Big,
            _ => return None,
        };
        let version = match endian {
            Endian::Little => u16::from_le_bytes([head[2], head[3]]),
            Endian::Big => u16::from_be_bytes([head[2], head[3]]),
        };
        match version {
            42 => Some(ValidType::Tiff(endian)),
            43 => Some(ValidType::BigTiff(endian)),
            _ => None,
        }
    }

    /// An XML declaration, or an `OME` root (with or without a
    /// namespace prefix) after any comments, doctype and
    /// processing instructions.
    fn looks_like_xml(head : &[u8]) -> bool {
        let mut head = head.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(head);
        head = skip_whitespace(head);
        if head.starts_with(b"<?xml") {
            return true;
        }
        loop {
            head = skip_whitespace(head);
            let rest = if head.starts_with(b"<!--") {
                after(head, b"-->")
            } else if head.starts_with(b"<!DOCTYPE") {
                skip_doctype(head)
            } else if head.starts_with(b"<?") {
                after(head, b"?>")
            } else {
                break;
            };
            match rest {
                Some(rest) => head = rest,
                None => return false,
            }
        }
        is_ome_root(head)
    }
}

fn skip_whitespace(bytes : &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    &bytes[start..]
}

/// The bytes following the first `marker`, if it occurs.
fn after<'a>(bytes : &'a [u8], marker : &[u8]) -> Option<&'a [u8]> {
    bytes.windows(marker.len())
        .position(|window| window == marker)
        .map(|at| &bytes[at + marker.len()..])
}

/// `<!DOCTYPE ...>`, including an internal subset in `[ ]`.
fn skip_doctype(bytes : &[u8]) -> Option<&[u8]> {
    let end = bytes.iter().position(|&b| b == b'>' || b == b'[')?;
    if bytes[end] == b'>' {
        return Some(&bytes[end + 1..]);
    }
    let subset = after(&bytes[end..], b"]")?;
    after(subset, b">")
}

/// `<OME` or `<prefix:OME`, followed by the end of the name.
fn is_ome_root(bytes : &[u8]) -> bool {
    let Some(tag) = bytes.strip_prefix(b"<".as_slice()) else {
        return false;
    };
    let name_end = tag.iter()
        .position(|&b| b.is_ascii_whitespace() || b == b'>' || b == b'/')
        .unwrap_or(tag.len());
    let name = &tag[..name_end];
    let local = match name.iter().position(|&b| b == b':') {
        Some(colon) => &name[colon + 1..],
        None => name,
    };
    local == b"OME"
}
