//! Lengths as OME records them: a number plus a unit
//! symbol, where the unit defaults to `reference frame`.

use std::fmt::Display;

/// Units of length that show up on stage positions.
/// Anything unrecognized is kept verbatim.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LengthUnit {
    Meter,
    Centimeter,
    Millimeter,
    Micrometer,
    Nanometer,
    Picometer,
    Angstrom,
    Pixel,
    #[default]
    ReferenceFrame,
    Other(String),
}

impl LengthUnit {
    /// Parses an OME `UnitsLength` symbol.
    pub fn from_symbol(symbol : &str) -> Self {
        match symbol {
            "m" => LengthUnit::Meter,
            "cm" => LengthUnit::Centimeter,
            "mm" => LengthUnit::Millimeter,
            // micro sign, Greek mu, and the ASCII fallback
            "\u{b5}m" | "\u{3bc}m" | "um" => LengthUnit::Micrometer,
            "nm" => LengthUnit::Nanometer,
            "pm" => LengthUnit::Picometer,
            "\u{c5}" => LengthUnit::Angstrom,
            "pixel" => LengthUnit::Pixel,
            "reference frame" => LengthUnit::ReferenceFrame,
            other => LengthUnit::Other(other.to_string()),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            LengthUnit::Meter => "m",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Millimeter => "mm",
            LengthUnit::Micrometer => "\u{b5}m",
            LengthUnit::Nanometer => "nm",
            LengthUnit::Picometer => "pm",
            LengthUnit::Angstrom => "\u{c5}",
            LengthUnit::Pixel => "pixel",
            LengthUnit::ReferenceFrame => "reference frame",
            LengthUnit::Other(symbol) => symbol,
        }
    }

    /// Micrometers per unit, for physical units only.
    pub fn micrometers_per_unit(&self) -> Option<f64> {
        match self {
            LengthUnit::Meter => Some(1e6),
            LengthUnit::Centimeter => Some(1e4),
            LengthUnit::Millimeter => Some(1e3),
            LengthUnit::Micrometer => Some(1.0),
            LengthUnit::Nanometer => Some(1e-3),
            LengthUnit::Picometer => Some(1e-6),
            LengthUnit::Angstrom => Some(1e-4),
            _ => None,
        }
    }
}

/// A wrapped numeric value with its unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Length {
    pub value : f64,
    pub unit : LengthUnit,
}

impl Length {
    pub fn new(value : f64, unit : LengthUnit) -> Self {
        Length { value, unit }
    }

    /// The value converted to micrometers, if the unit is physical.
    pub fn to_micrometers(&self) -> Option<f64> {
        self.unit.micrometers_per_unit().map(|scale| self.value * scale)
    }
}

impl Display for Length {
    fn fmt(&self, f : &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {}", crate::utils::format_value(self.value), self.unit.symbol())
    }
}
