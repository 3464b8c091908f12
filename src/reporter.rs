//! The coordinate reporter: reads the stage position of
//! every series and writes the values to a line-oriented
//! log, `x` before `y`, in ascending series order.
//!
//! All values are collected before the first line is
//! written, so a failure anywhere produces no output.

use std::io::Write;
use std::path::Path;

use itertools::interleave;
use rayon::prelude::*;

use crate::{
    error::{Result, StagePosError},
    metadata::{Length, LengthUnit, MetadataReader, OmeMetadata},
    stagereader::OmeReader,
    utils::format_value,
};

/// A line-oriented text output.
pub trait LogSink {
    fn log_line(&mut self, line : &str) -> Result<()>;
}

impl LogSink for Vec<String> {
    fn log_line(&mut self, line : &str) -> Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

/// Writes each line, newline-terminated, to any `Write`.
pub struct WriterSink<W : Write> {
    writer : W,
}

impl<W : Write> WriterSink<W> {
    pub fn new(writer : W) -> Self {
        WriterSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W : Write> LogSink for WriterSink<W> {
    fn log_line(&mut self, line : &str) -> Result<()> {
        writeln!(self.writer, "{}", line).map_err(StagePosError::LogSinkError)
    }
}

/// How many series to report: the override if one was
/// given, otherwise what the file holds. The override is
/// not checked against the file; reading past the last
/// series fails later.
pub fn series_to_report(native : usize, tiles : Option<usize>) -> usize {
    match tiles {
        Some(k) => {
            if k != native {
                tracing::warn!(native, requested = k, "tile count overrides the file's series count");
            }
            k
        },
        None => native,
    }
}

/// Reporting options. The default reads plane 0 and
/// writes bare numbers as recorded.
#[derive(Debug, Clone, Default)]
pub struct CoordinateReporter {
    pub plane : usize,
    pub units : bool,
    pub micrometers : bool,
    pub header : bool,
}

impl CoordinateReporter {
    pub fn new() -> Self {
        CoordinateReporter::default()
    }

    /// Read positions from `plane` instead of the first plane.
    pub fn with_plane(mut self, plane : usize) -> Self {
        self.plane = plane;
        self
    }

    /// Append the unit symbol to each value.
    pub fn with_units(mut self, units : bool) -> Self {
        self.units = units;
        self
    }

    /// Convert physical lengths to micrometers before writing.
    /// Pixel and reference-frame values are written unchanged.
    pub fn with_micrometers(mut self, micrometers : bool) -> Self {
        self.micrometers = micrometers;
        self
    }

    /// Write a `# <file>` line before each file in `report_files`.
    pub fn with_header(mut self, header : bool) -> Self {
        self.header = header;
        self
    }

    /// Opens `filename`, takes its series count (or `tiles`),
    /// closes it, then reports from the parsed metadata.
    /// Returns the number of series reported.
    ///
    /// ## Errors
    ///
    /// Anything `OmeReader::open` returns, plus the errors of
    /// `report_series`. Nothing is logged on failure.
    pub fn report_file<P, S>(&self, filename : P, tiles : Option<usize>, sink : &mut S)
        -> Result<usize> where P : AsRef<Path>, S : LogSink + ?Sized {
        let reader = OmeReader::open(filename)?;
        let count = series_to_report(reader.series_count(), tiles);
        let metadata = reader.close();
        self.report_series(&metadata, count, sink)
    }

    /// Reports several files in the order given. The files are
    /// opened and parsed in parallel, then written one after the
    /// other; the first file that fails stops the run, after the
    /// files before it have been written. Returns the total number
    /// of series reported.
    pub fn report_files<P, S>(&self, filenames : &[P], tiles : Option<usize>, sink : &mut S)
        -> Result<usize> where P : AsRef<Path> + Sync, S : LogSink + ?Sized {
        let loaded : Vec<Result<(usize, OmeMetadata)>> = filenames
            .par_iter()
            .map(|filename| -> Result<(usize, OmeMetadata)> {
                let reader = OmeReader::open(filename)?;
                let native = reader.series_count();
                Ok((native, reader.close()))
            })
            .collect();

        let mut total = 0;
        for (filename, result) in filenames.iter().zip(loaded) {
            let (native, metadata) = result?;
            if self.header {
                sink.log_line(&format!("# {}", filename.as_ref().display()))?;
            }
            let count = series_to_report(native, tiles);
            total += self.report_series(&metadata, count, sink)?;
        }
        Ok(total)
    }

    /// Reports from any metadata source, applying the
    /// `tiles` override to its series count.
    pub fn report<M, S>(&self, metadata : &M, tiles : Option<usize>, sink : &mut S)
        -> Result<usize> where M : MetadataReader + ?Sized, S : LogSink + ?Sized {
        let count = series_to_report(metadata.series_count(), tiles);
        self.report_series(metadata, count, sink)
    }

    /// Reports exactly the first `count` series.
    ///
    /// ## Errors
    ///
    /// * `SeriesOutOfRange` - `count` exceeds the series in `metadata`
    /// * `PlaneOutOfRange` - a series has no plane `self.plane`
    /// * `MissingPosition` - a plane has no X or Y position
    /// * `LogSinkError` - the sink could not be written
    pub fn report_series<M, S>(&self, metadata : &M, count : usize, sink : &mut S)
        -> Result<usize> where M : MetadataReader + ?Sized, S : LogSink + ?Sized {
        let (pos_x, pos_y) : (Vec<Length>, Vec<Length>) = (0..count)
            .map(|series| metadata.position_at(series, self.plane).map(|p| (p.x, p.y)))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();

        for value in interleave(pos_x, pos_y) {
            sink.log_line(&self.format(&value))?;
        }
        Ok(count)
    }

    fn format(&self, length : &Length) -> String {
        let converted;
        let length = match (self.micrometers, length.to_micrometers()) {
            (true, Some(value)) => {
                converted = Length::new(value, LengthUnit::Micrometer);
                &converted
            },
            (true, None) => {
                tracing::debug!(unit = length.unit.symbol(), "not a physical unit, left as is");
                length
            },
            (false, _) => length,
        };
        if self.units {
            length.to_string()
        } else {
            format_value(length.value)
        }
    }
}

/// Logs the stage positions of `filename`, plane 0 of each
/// series, bare values. `tiles` overrides the series count.
///
/// ## Example
///
/// ```rust, ignore
/// let mut lines = Vec::<String>::new();
/// stagepos::report_file("tiles.ome.tif", None, &mut lines)?;
/// ```
pub fn report_file<P, S>(filename : P, tiles : Option<usize>, sink : &mut S) -> Result<usize>
    where P : AsRef<Path>, S : LogSink + ?Sized {
    CoordinateReporter::new().report_file(filename, tiles, sink)
}

/// Same as `report` but reads positions from `plane` of
/// each series instead of the first plane.
pub fn report_plane<M, S>(metadata : &M, tiles : Option<usize>, plane : usize, sink : &mut S)
    -> Result<usize> where M : MetadataReader + ?Sized, S : LogSink + ?Sized {
    CoordinateReporter::new().with_plane(plane).report(metadata, tiles, sink)
}

/// Same as `report_file` over an already-parsed metadata source.
pub fn report<M, S>(metadata : &M, tiles : Option<usize>, sink : &mut S) -> Result<usize>
    where M : MetadataReader + ?Sized, S : LogSink + ?Sized {
    CoordinateReporter::new().report(metadata, tiles, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{LengthUnit, StagePosition};

    /// Three tiles at (1,2), (3,4), (5,6) in micrometers,
    /// with a second plane offset by 0.5.
    struct FixedStage {
        positions : Vec<(f64, f64)>,
    }

    impl FixedStage {
        fn three_tiles() -> Self {
            FixedStage { positions : vec![(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)] }
        }
    }

    impl MetadataReader for FixedStage {
        fn series_count(&self) -> usize {
            self.positions.len()
        }

        fn position_at(&self, series : usize, plane : usize) -> Result<StagePosition> {
            let &(x, y) = self.positions.get(series).ok_or(
                StagePosError::SeriesOutOfRange { series, count : self.positions.len() }
            )?;
            let offset = plane as f64 * 0.5;
            Ok(StagePosition {
                x : Length::new(x + offset, LengthUnit::Micrometer),
                y : Length::new(y + offset, LengthUnit::Micrometer),
            })
        }
    }

    #[test]
    fn all_series_in_order() {
        let mut lines = Vec::<String>::new();
        let reported = report(&FixedStage::three_tiles(), None, &mut lines).unwrap();
        assert_eq!(reported, 3);
        assert_eq!(lines, vec!["1.0", "2.0", "3.0", "4.0", "5.0", "6.0"]);
    }

    #[test]
    fn tile_override_truncates() {
        let stage = FixedStage::three_tiles();
        for k in 0..=3 {
            let mut lines = Vec::<String>::new();
            report(&stage, Some(k), &mut lines).unwrap();
            assert_eq!(lines.len(), 2 * k);
        }
        let mut lines = Vec::<String>::new();
        report(&stage, Some(2), &mut lines).unwrap();
        assert_eq!(lines, vec!["1.0", "2.0", "3.0", "4.0"]);
    }

    #[test]
    fn tile_override_past_the_end_fails_without_output() {
        let mut lines = Vec::<String>::new();
        let result = report(&FixedStage::three_tiles(), Some(4), &mut lines);
        assert!(matches!(
            result,
            Err(StagePosError::SeriesOutOfRange { series : 3, count : 3 })
        ));
        assert!(lines.is_empty());
    }

    #[test]
    fn other_plane_and_units() {
        let mut lines = Vec::<String>::new();
        CoordinateReporter::new()
            .with_plane(1)
            .with_units(true)
            .report(&FixedStage::three_tiles(), Some(1), &mut lines)
            .unwrap();
        assert_eq!(lines, vec!["1.5 \u{b5}m", "2.5 \u{b5}m"]);
    }

    #[test]
    fn plane_selection_free_function() {
        let mut lines = Vec::<String>::new();
        report_plane(&FixedStage::three_tiles(), Some(2), 2, &mut lines).unwrap();
        assert_eq!(lines, vec!["2.0", "3.0", "4.0", "5.0"]);
    }

    #[test]
    fn micrometer_conversion() {
        let reporter = CoordinateReporter::new().with_micrometers(true);
        assert_eq!(reporter.format(&Length::new(0.25, LengthUnit::Meter)), "250000.0");
        assert_eq!(reporter.format(&Length::new(3.0, LengthUnit::Pixel)), "3.0");

        let with_units = reporter.with_units(true);
        assert_eq!(with_units.format(&Length::new(2.0, LengthUnit::Millimeter)), "2000.0 \u{b5}m");
        assert_eq!(with_units.format(&Length::new(2.0, LengthUnit::ReferenceFrame)), "2.0 reference frame");
    }

    #[test]
    fn writer_sink_writes_lines() {
        let mut sink = WriterSink::new(Vec::<u8>::new());
        report(&FixedStage::three_tiles(), Some(1), &mut sink).unwrap();
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "1.0\n2.0\n");
    }

    #[test]
    fn override_resolution() {
        assert_eq!(series_to_report(5, None), 5);
        assert_eq!(series_to_report(5, Some(2)), 2);
        assert_eq!(series_to_report(5, Some(9)), 9);
    }
}
