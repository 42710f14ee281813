//! Key/value header shared by ASCII (`.asc`) and binary float
//! (`.hdr`) grids.

use crate::{Endian, GridError, Raster, C, DEFAULT_NODATA};
use geo::geometry::Coord;
use std::io::Write;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Header {
    pub ncols: usize,
    pub nrows: usize,

    /// Upper-left corner of the upper-left cell.
    pub origin: Coord<C>,

    /// Cell (width, height).
    pub cell_size: (C, C),

    pub nodata: f32,

    /// Sample byte order, only meaningful for binary grids.
    pub endian: Endian,
}

/// Header fields as they are encountered.
#[derive(Debug, Default)]
pub(crate) struct HeaderFields {
    ncols: Option<usize>,
    nrows: Option<usize>,
    /// Lower-left x and whether it refers to the cell center.
    xll: Option<(C, bool)>,
    /// Lower-left y and whether it refers to the cell center.
    yll: Option<(C, bool)>,
    cellsize: Option<C>,
    dx: Option<C>,
    dy: Option<C>,
    nodata: Option<f32>,
    endian: Option<Endian>,
}

impl HeaderFields {
    /// Parses `line` as a header field.
    ///
    /// Returns `Ok(false)` if the line does not start with a known
    /// key, which for ASCII grids marks the start of sample data.
    pub fn parse_line(&mut self, line: &str) -> Result<bool, GridError> {
        let mk_err = || GridError::Header(line.to_owned());
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.next() else {
            return Ok(true);
        };
        let key = key.to_ascii_lowercase();
        if !KNOWN_KEYS.contains(&key.as_str()) {
            return Ok(false);
        }
        let value = tokens.next().ok_or_else(mk_err)?;
        let float = || value.parse::<C>().map_err(|_| mk_err());
        let count = || value.parse::<usize>().map_err(|_| mk_err());
        match key.as_str() {
            "ncols" => self.ncols = Some(count()?),
            "nrows" => self.nrows = Some(count()?),
            "xllcorner" => self.xll = Some((float()?, false)),
            "xllcenter" => self.xll = Some((float()?, true)),
            "yllcorner" => self.yll = Some((float()?, false)),
            "yllcenter" => self.yll = Some((float()?, true)),
            "cellsize" => self.cellsize = Some(float()?),
            "dx" | "xdim" => self.dx = Some(float()?),
            "dy" | "ydim" => self.dy = Some(float()?),
            "nodata_value" | "nodata" => {
                self.nodata = Some(value.parse::<f32>().map_err(|_| mk_err())?);
            }
            "byteorder" => {
                self.endian = Some(match value.to_ascii_uppercase().as_str() {
                    "LSBFIRST" | "I" => Endian::Little,
                    "MSBFIRST" | "M" => Endian::Big,
                    _ => return Err(mk_err()),
                });
            }
            _ => unreachable!("key checked against KNOWN_KEYS"),
        }
        Ok(true)
    }

    pub fn finish(self) -> Result<Header, GridError> {
        let ncols = self.ncols.ok_or(GridError::MissingField("ncols"))?;
        let nrows = self.nrows.ok_or(GridError::MissingField("nrows"))?;
        let (xll, x_center) = self.xll.ok_or(GridError::MissingField("xllcorner"))?;
        let (yll, y_center) = self.yll.ok_or(GridError::MissingField("yllcorner"))?;
        let dx = self
            .dx
            .or(self.cellsize)
            .ok_or(GridError::MissingField("cellsize"))?;
        let dy = self
            .dy
            .or(self.cellsize)
            .ok_or(GridError::MissingField("cellsize"))?;
        if ncols == 0 || nrows == 0 {
            return Err(GridError::Dimensions(ncols, nrows));
        }
        for size in [dx, dy] {
            if !(size.is_finite() && size > 0.0) {
                return Err(GridError::CellSize(size));
            }
        }

        let x_min = if x_center { xll - dx / 2.0 } else { xll };
        let y_min = if y_center { yll - dy / 2.0 } else { yll };
        #[allow(clippy::cast_precision_loss)]
        let origin = Coord {
            x: x_min,
            y: y_min + nrows as C * dy,
        };

        Ok(Header {
            ncols,
            nrows,
            origin,
            cell_size: (dx, dy),
            nodata: self.nodata.unwrap_or(DEFAULT_NODATA),
            endian: self.endian.unwrap_or(Endian::Little),
        })
    }
}

const KNOWN_KEYS: &[&str] = &[
    "ncols",
    "nrows",
    "xllcorner",
    "xllcenter",
    "yllcorner",
    "yllcenter",
    "cellsize",
    "dx",
    "dy",
    "xdim",
    "ydim",
    "nodata_value",
    "nodata",
    "byteorder",
];

impl Header {
    pub fn of(raster: &Raster) -> Self {
        let (ncols, nrows) = raster.dimensions();
        Self {
            ncols,
            nrows,
            origin: raster.origin(),
            cell_size: raster.cell_size(),
            nodata: raster.nodata(),
            endian: Endian::Little,
        }
    }

    pub fn len(&self) -> usize {
        self.ncols * self.nrows
    }

    /// Writes the header. Square cells use `cellsize`, anything else
    /// `dx`/`dy`.
    pub fn write<W: Write>(&self, out: &mut W, with_byteorder: bool) -> Result<(), GridError> {
        let (dx, dy) = self.cell_size;
        #[allow(clippy::cast_precision_loss)]
        let y_min = self.origin.y - self.nrows as C * dy;
        writeln!(out, "ncols        {}", self.ncols)?;
        writeln!(out, "nrows        {}", self.nrows)?;
        writeln!(out, "xllcorner    {}", self.origin.x)?;
        writeln!(out, "yllcorner    {y_min}")?;
        #[allow(clippy::float_cmp)]
        if dx == dy {
            writeln!(out, "cellsize     {dx}")?;
        } else {
            writeln!(out, "dx           {dx}")?;
            writeln!(out, "dy           {dy}")?;
        }
        writeln!(out, "NODATA_value {}", self.nodata)?;
        if with_byteorder {
            let order = match self.endian {
                Endian::Little => "LSBFIRST",
                Endian::Big => "MSBFIRST",
            };
            writeln!(out, "byteorder    {order}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Endian, GridError, HeaderFields};
    use approx::assert_relative_eq;

    fn parse(text: &str) -> Result<super::Header, GridError> {
        let mut fields = HeaderFields::default();
        for line in text.lines() {
            assert!(fields.parse_line(line)?);
        }
        fields.finish()
    }

    #[test]
    fn test_corner_header() {
        let header = parse(
            "ncols 4\nNROWS 3\nxllcorner 100\nyllcorner 170\ncellsize 10\nNODATA_value -1",
        )
        .unwrap();
        assert_eq!((header.ncols, header.nrows), (4, 3));
        assert_relative_eq!(header.origin.x, 100.0);
        assert_relative_eq!(header.origin.y, 200.0);
        assert_eq!(header.cell_size, (10.0, 10.0));
        assert_relative_eq!(header.nodata, -1.0);
        assert_eq!(header.endian, Endian::Little);
    }

    #[test]
    fn test_center_header() {
        let header = parse(
            "ncols 4\nnrows 3\nxllcenter 105\nyllcenter 175\ndx 10\ndy 10\nbyteorder MSBFIRST",
        )
        .unwrap();
        assert_relative_eq!(header.origin.x, 100.0);
        assert_relative_eq!(header.origin.y, 200.0);
        assert_relative_eq!(header.nodata, -9999.0);
        assert_eq!(header.endian, Endian::Big);
    }

    #[test]
    fn test_missing_field() {
        assert!(matches!(
            parse("ncols 4\nnrows 3\nxllcorner 0\nyllcorner 0"),
            Err(GridError::MissingField("cellsize"))
        ));
    }

    #[test]
    fn test_data_line_is_not_header() {
        let mut fields = HeaderFields::default();
        assert!(!fields.parse_line("1.0 2.0 3.0").unwrap());
        assert!(fields.parse_line("ncols four").is_err());
    }
}
