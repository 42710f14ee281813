//! ESRI ASCII grid (`.asc`).

use crate::{
    header::{Header, HeaderFields},
    GridError, Raster,
};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

pub(crate) fn read(path: &Path) -> Result<Raster, GridError> {
    let file = BufReader::new(File::open(path)?);
    let mut fields = HeaderFields::default();
    let mut header: Option<Header> = None;
    let mut samples = Vec::new();

    for line in file.lines() {
        let line = line?;
        if header.is_none() {
            if fields.parse_line(&line)? {
                continue;
            }
            let h = std::mem::take(&mut fields).finish()?;
            samples.reserve_exact(h.len());
            header = Some(h);
        }
        for token in line.split_whitespace() {
            let sample = token
                .parse::<f32>()
                .map_err(|_| GridError::Sample(token.to_owned()))?;
            samples.push(sample);
        }
    }

    // A header without any sample lines.
    let header = match header {
        Some(header) => header,
        None => fields.finish()?,
    };

    if samples.len() != header.len() {
        return Err(GridError::SampleCount {
            expected: header.len(),
            found: samples.len(),
        });
    }

    Raster::new(
        header.origin,
        header.cell_size,
        (header.ncols, header.nrows),
        header.nodata,
        samples,
    )
}

pub(crate) fn write(raster: &Raster, path: &Path) -> Result<(), GridError> {
    let mut out = BufWriter::new(File::create(path)?);
    Header::of(raster).write(&mut out, false)?;
    let (cols, rows) = raster.dimensions();
    for row in 0..rows {
        for col in 0..cols {
            if col > 0 {
                out.write_all(b" ")?;
            }
            write!(out, "{}", raster.raw_or_nodata(row * cols + col))?;
        }
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{read, write};
    use crate::{ramp, GridError, RasterMode};
    use approx::assert_relative_eq;
    use std::fs;

    #[test]
    fn test_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.asc");
        fs::write(
            &path,
            "ncols 3\nnrows 2\nxllcorner 0.0\nyllcorner 0.0\ncellsize 5\nNODATA_value -9999\n\
             1 2 3\n4 -9999 6\n",
        )
        .unwrap();
        let raster = read(&path).unwrap();
        assert_eq!(raster.dimensions(), (3, 2));
        assert_relative_eq!(raster.origin().y, 10.0);
        assert_eq!(raster.get(2, 0), Some(3.0));
        assert_eq!(raster.get(1, 1), None);
        assert_eq!(raster.valid_count(), 5);
    }

    #[test]
    fn test_sample_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.asc");
        fs::write(
            &path,
            "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n",
        )
        .unwrap();
        assert!(matches!(
            read(&path),
            Err(GridError::SampleCount {
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn test_write_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.asc");
        let raster = ramp(4, 3);
        write(&raster, &path).unwrap();
        let reread = crate::Raster::open(&path, RasterMode::InMem).unwrap();
        assert_eq!(reread.dimensions(), raster.dimensions());
        assert_eq!(reread.origin(), raster.origin());
        assert_eq!(
            reread.iter().collect::<Vec<_>>(),
            raster.iter().collect::<Vec<_>>()
        );
    }
}
