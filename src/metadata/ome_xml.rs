//! Pulls images, planes and stage positions out of an OME-XML
//! document. Elements are matched on their local names so that
//! prefixed documents (`<ome:Image>`) parse the same as the
//! default namespace.

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

use crate::{
    error::{Result, StagePosError},
    metadata::{Image, Length, LengthUnit, OmeMetadata, Plane},
};

/// Parses an OME-XML string into an `OmeMetadata` store.
/// Returns `Ok(None)` when the text is not an OME document
/// at all (no `OME` root), which is how a plain TIFF's
/// `ImageDescription` looks.
pub(crate) fn parse_ome_xml(xml : &str) -> Result<Option<OmeMetadata>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut parser = OmeXmlParser::default();
    loop {
        match reader.read_event()? {
            Event::Start(element) => parser.open(&element)?,
            Event::Empty(element) => {
                parser.open(&element)?;
                parser.close(element.local_name().as_ref());
            },
            Event::End(element) => parser.close(element.local_name().as_ref()),
            Event::Eof => break,
            _ => (),
        }
    }

    if !parser.saw_root {
        return Ok(None);
    }
    tracing::debug!(images = parser.images.len(), "parsed OME-XML");
    Ok(Some(OmeMetadata {
        images : parser.images,
        binary_only : parser.binary_only,
    }))
}

#[derive(Default)]
struct OmeXmlParser {
    saw_root : bool,
    images : Vec<Image>,
    current : Option<Image>,
    binary_only : Option<String>,
}

impl OmeXmlParser {
    fn open(&mut self, element : &BytesStart) -> Result<()> {
        match element.local_name().as_ref() {
            b"OME" => self.saw_root = true,
            b"Image" => {
                self.current = Some(Image {
                    id : attribute(element, b"ID")?.unwrap_or_default(),
                    name : attribute(element, b"Name")?,
                    planes : Vec::new(),
                });
            },
            b"Plane" => {
                // Planes outside an Image are malformed; skip them
                if let Some(image) = self.current.as_mut() {
                    image.planes.push(parse_plane(element)?);
                }
            },
            b"BinaryOnly" => {
                self.binary_only = attribute(element, b"MetadataFile")?;
            },
            _ => (),
        }
        Ok(())
    }

    fn close(&mut self, local_name : &[u8]) {
        if local_name == b"Image" {
            if let Some(image) = self.current.take() {
                self.images.push(image);
            }
        }
    }
}

fn parse_plane(element : &BytesStart) -> Result<Plane> {
    Ok(Plane {
        the_z : index(element, b"TheZ")?,
        the_c : index(element, b"TheC")?,
        the_t : index(element, b"TheT")?,
        position_x : length(element, b"PositionX", b"PositionXUnit")?,
        position_y : length(element, b"PositionY", b"PositionYUnit")?,
        position_z : length(element, b"PositionZ", b"PositionZUnit")?,
    })
}

fn attribute(element : &BytesStart, name : &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn index(element : &BytesStart, name : &[u8]) -> Result<u32> {
    match attribute(element, name)? {
        None => Ok(0),
        Some(text) => text.trim().parse::<u32>().map_err(|err| invalid(name, &text, err)),
    }
}

fn length(element : &BytesStart, name : &[u8], unit_name : &[u8]) -> Result<Option<Length>> {
    let text = match attribute(element, name)? {
        Some(text) => text,
        None => return Ok(None),
    };
    let value = text.trim().parse::<f64>().map_err(|err| invalid(name, &text, err))?;
    let unit = attribute(element, unit_name)?
        .map(|symbol| LengthUnit::from_symbol(&symbol))
        .unwrap_or_default();
    Ok(Some(Length::new(value, unit)))
}

fn invalid(name : &[u8], text : &str, err : impl std::fmt::Display) -> StagePosError {
    StagePosError::XmlError(format!(
        "Invalid {} \"{}\": {}",
        String::from_utf8_lossy(name),
        text,
        err
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TILES : &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">
  <Image ID="Image:0" Name="tile &amp; 0">
    <Pixels ID="Pixels:0" DimensionOrder="XYZCT" Type="uint16" SizeX="4" SizeY="4" SizeZ="2" SizeC="1" SizeT="1">
      <Channel ID="Channel:0:0" SamplesPerPixel="1"/>
      <TiffData/>
      <Plane TheZ="0" TheC="0" TheT="0" PositionX="-1500.25" PositionXUnit="µm" PositionY="320" PositionYUnit="µm"/>
      <Plane TheZ="1" TheC="0" TheT="0" PositionX="-1500.25" PositionY="320" PositionZ="5"/>
    </Pixels>
  </Image>
  <Image ID="Image:1">
    <Pixels ID="Pixels:1" DimensionOrder="XYZCT" Type="uint16" SizeX="4" SizeY="4" SizeZ="1" SizeC="1" SizeT="1">
      <Plane TheZ="0" TheC="0" TheT="0" PositionX="10.0" PositionXUnit="mm" PositionY="2e1" PositionYUnit="mm">
        <AnnotationRef ID="Annotation:0"/>
      </Plane>
    </Pixels>
  </Image>
</OME>"#;

    #[test]
    fn reads_images_and_planes() {
        let meta = parse_ome_xml(TWO_TILES).unwrap().unwrap();
        assert_eq!(meta.series_count(), 2);
        assert_eq!(meta.image_name(0).unwrap(), Some("tile & 0"));
        assert_eq!(meta.plane_count(0).unwrap(), 2);
        assert_eq!(meta.plane_count(1).unwrap(), 1);

        let first = meta.plane(0, 0).unwrap();
        assert_eq!(first.position_x, Some(Length::new(-1500.25, LengthUnit::Micrometer)));
        assert_eq!(first.position_y.as_ref().map(|l| l.value), Some(320.0));

        let second = meta.plane(0, 1).unwrap();
        assert_eq!(second.the_z, 1);
        // no unit attribute means reference frame
        assert_eq!(second.position_x.as_ref().unwrap().unit, LengthUnit::ReferenceFrame);
        assert_eq!(second.position_z.as_ref().unwrap().value, 5.0);

        let other = meta.plane(1, 0).unwrap();
        assert_eq!(other.position_y, Some(Length::new(20.0, LengthUnit::Millimeter)));
    }

    #[test]
    fn prefixed_namespace() {
        let xml = r#"<ome:OME xmlns:ome="http://www.openmicroscopy.org/Schemas/OME/2016-06">
            <ome:Image ID="Image:0"><ome:Pixels>
              <ome:Plane TheZ="0" TheC="0" TheT="0" PositionX="1" PositionY="2"/>
            </ome:Pixels></ome:Image>
        </ome:OME>"#;
        let meta = parse_ome_xml(xml).unwrap().unwrap();
        assert_eq!(meta.plane_position_x(0, 0).unwrap().map(|l| l.value), Some(1.0));
    }

    #[test]
    fn binary_only_stub() {
        let xml = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">
            <BinaryOnly MetadataFile="run.companion.ome" UUID="urn:uuid:1"/>
        </OME>"#;
        let meta = parse_ome_xml(xml).unwrap().unwrap();
        assert_eq!(meta.series_count(), 0);
        assert_eq!(meta.binary_only_file(), Some("run.companion.ome"));
    }

    #[test]
    fn not_ome() {
        assert!(parse_ome_xml("ImageJ=1.54f\nimages=3").unwrap().is_none());
        assert!(parse_ome_xml("<svg></svg>").unwrap().is_none());
    }

    #[test]
    fn bad_number() {
        let xml = r#"<OME><Image ID="Image:0"><Pixels>
            <Plane PositionX="left" PositionY="2"/></Pixels></Image></OME>"#;
        assert!(matches!(parse_ome_xml(xml), Err(StagePosError::XmlError(_))));
    }
}
