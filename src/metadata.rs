//! The `OmeMetadata` struct holds the acquisition metadata
//! parsed out of an OME-XML block: which images (series) a
//! file contains and, for each of their planes, where the
//! stage was when it was acquired.
//!
//! It is populated once by the reader and queried after the
//! reader has been closed, so nothing here touches the file.

mod length;
mod ome_xml;

use ndarray::Array2;

pub use length::{Length, LengthUnit};
pub(crate) use ome_xml::parse_ome_xml;

use crate::error::{Result, StagePosError};

/// A stage axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f : &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
            Axis::Z => write!(f, "Z"),
        }
    }
}

/// The X/Y stage coordinates of one plane.
#[derive(Debug, Clone, PartialEq)]
pub struct StagePosition {
    pub x : Length,
    pub y : Length,
}

impl StagePosition {
    /// The bare numbers, without units, as `(x, y)`.
    pub fn values(&self) -> (f64, f64) {
        (self.x.value, self.y.value)
    }
}

/// One OME `Plane`. Positions are optional in OME-XML.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plane {
    pub the_z : u32,
    pub the_c : u32,
    pub the_t : u32,
    pub position_x : Option<Length>,
    pub position_y : Option<Length>,
    pub position_z : Option<Length>,
}

impl Plane {
    pub fn position(&self, axis : Axis) -> Option<&Length> {
        match axis {
            Axis::X => self.position_x.as_ref(),
            Axis::Y => self.position_y.as_ref(),
            Axis::Z => self.position_z.as_ref(),
        }
    }
}

/// One OME `Image`, i.e. one series of the file.
/// `planes` are kept in document order, which is
/// what a plane index refers to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    pub id : String,
    pub name : Option<String>,
    pub planes : Vec<Plane>,
}

/// The metadata store. Built by parsing OME-XML,
/// read through the accessors below.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OmeMetadata {
    pub(crate) images : Vec<Image>,
    pub(crate) binary_only : Option<String>,
}

impl OmeMetadata {
    pub fn new(images : Vec<Image>) -> Self {
        OmeMetadata { images, binary_only : None }
    }

    /// Number of series (OME `Image` elements).
    pub fn series_count(&self) -> usize {
        self.images.len()
    }

    /// If this block is only a pointer to the real metadata
    /// (multi-file OME-TIFF), the name of that file.
    pub fn binary_only_file(&self) -> Option<&str> {
        self.binary_only.as_deref()
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Returns the `Image` of a series.
    ///
    /// ## Errors
    ///
    /// * `SeriesOutOfRange` - if `series >= series_count()`
    pub fn image(&self, series : usize) -> Result<&Image> {
        self.images.get(series).ok_or(StagePosError::SeriesOutOfRange {
            series,
            count : self.images.len(),
        })
    }

    pub fn image_id(&self, series : usize) -> Result<&str> {
        Ok(&self.image(series)?.id)
    }

    pub fn image_name(&self, series : usize) -> Result<Option<&str>> {
        Ok(self.image(series)?.name.as_deref())
    }

    pub fn plane_count(&self, series : usize) -> Result<usize> {
        Ok(self.image(series)?.planes.len())
    }

    /// Returns a `Plane` of a series.
    ///
    /// ## Errors
    ///
    /// * `SeriesOutOfRange` - no such series
    /// * `PlaneOutOfRange` - the series has fewer planes
    pub fn plane(&self, series : usize, plane : usize) -> Result<&Plane> {
        let image = self.image(series)?;
        image.planes.get(plane).ok_or(StagePosError::PlaneOutOfRange {
            series,
            plane,
            count : image.planes.len(),
        })
    }

    /// The recorded stage X of a plane, `None` if the plane
    /// has no `PositionX`.
    pub fn plane_position_x(&self, series : usize, plane : usize) -> Result<Option<&Length>> {
        Ok(self.plane(series, plane)?.position(Axis::X))
    }

    /// The recorded stage Y of a plane, `None` if the plane
    /// has no `PositionY`.
    pub fn plane_position_y(&self, series : usize, plane : usize) -> Result<Option<&Length>> {
        Ok(self.plane(series, plane)?.position(Axis::Y))
    }

    pub fn plane_position_z(&self, series : usize, plane : usize) -> Result<Option<&Length>> {
        Ok(self.plane(series, plane)?.position(Axis::Z))
    }

    /// Stage positions of `plane` for every series, in series order.
    pub fn positions(&self, plane : usize) -> Result<Vec<StagePosition>> {
        (0..self.series_count())
            .map(|series| self.position_at(series, plane))
            .collect()
    }

    /// Stage positions of `plane` for every series as a
    /// `(series, 2)` array of bare values, columns `x, y`.
    pub fn to_array(&self, plane : usize) -> Result<Array2<f64>> {
        let positions = self.positions(plane)?;
        let mut array = Array2::<f64>::zeros((positions.len(), 2));
        array.outer_iter_mut().zip(positions.iter()).for_each(|(mut row, position)| {
            let (x, y) = position.values();
            row[0] = x;
            row[1] = y;
        });
        Ok(array)
    }
}

/// The minimal view of a metadata source that the
/// coordinate reporter needs.
pub trait MetadataReader {
    /// Number of series the source describes.
    fn series_count(&self) -> usize;

    /// Stage position of a given plane of a series.
    fn position_at(&self, series : usize, plane : usize) -> Result<StagePosition>;

    /// Stage position of a series, taken from its first plane.
    fn position_of(&self, series : usize) -> Result<StagePosition> {
        self.position_at(series, 0)
    }
}

impl MetadataReader for OmeMetadata {
    fn series_count(&self) -> usize {
        OmeMetadata::series_count(self)
    }

    /// ## Errors
    ///
    /// * `SeriesOutOfRange`, `PlaneOutOfRange` - no such plane
    /// * `MissingPosition` - the plane lacks `PositionX` or `PositionY`
    fn position_at(&self, series : usize, plane : usize) -> Result<StagePosition> {
        let found = self.plane(series, plane)?;
        let missing = |axis| StagePosError::MissingPosition { series, plane, axis };
        Ok(StagePosition {
            x : found.position(Axis::X).cloned().ok_or_else(|| missing(Axis::X))?,
            y : found.position(Axis::Y).cloned().ok_or_else(|| missing(Axis::Y))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn um(value : f64) -> Length {
        Length::new(value, LengthUnit::Micrometer)
    }

    fn sample() -> OmeMetadata {
        OmeMetadata::new(vec![
            Image {
                id : "Image:0".to_string(),
                name : Some("tile 0".to_string()),
                planes : vec![
                    Plane { position_x : Some(um(1.0)), position_y : Some(um(2.0)), ..Default::default() },
                    Plane { the_z : 1, position_x : Some(um(1.5)), position_y : Some(um(2.5)), ..Default::default() },
                ],
            },
            Image {
                id : "Image:1".to_string(),
                name : None,
                planes : vec![
                    Plane { position_x : Some(um(3.0)), position_y : None, ..Default::default() },
                ],
            },
        ])
    }

    #[test]
    fn accessors_respect_ranges() {
        let meta = sample();
        assert_eq!(meta.series_count(), 2);
        assert_eq!(meta.plane_count(0).unwrap(), 2);
        assert_eq!(meta.image_name(0).unwrap(), Some("tile 0"));
        assert_eq!(meta.image_id(1).unwrap(), "Image:1");
        assert_eq!(meta.plane_position_x(0, 1).unwrap(), Some(&um(1.5)));
        assert_eq!(meta.plane_position_y(1, 0).unwrap(), None);
        assert!(meta.plane_position_z(0, 0).unwrap().is_none());

        assert!(matches!(
            meta.plane_position_x(2, 0),
            Err(StagePosError::SeriesOutOfRange { series : 2, count : 2 })
        ));
        assert!(matches!(
            meta.plane_position_x(1, 1),
            Err(StagePosError::PlaneOutOfRange { series : 1, plane : 1, count : 1 })
        ));
    }

    #[test]
    fn missing_position_is_an_error() {
        let meta = sample();
        assert_eq!(meta.position_of(0).unwrap().values(), (1.0, 2.0));
        assert!(matches!(
            meta.position_of(1),
            Err(StagePosError::MissingPosition { series : 1, plane : 0, axis : Axis::Y })
        ));
        assert!(meta.positions(0).is_err());
    }

    #[test]
    fn array_has_one_row_per_series() {
        let mut meta = sample();
        meta.images[1].planes[0].position_y = Some(um(4.0));
        let array = meta.to_array(0).unwrap();
        assert_eq!(array.shape(), &[2, 2]);
        assert_eq!(array.row(1).to_vec(), vec![3.0, 4.0]);
    }
}
