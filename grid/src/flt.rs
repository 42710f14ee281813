//! ESRI binary float grid (`.flt` + `.hdr`).

use crate::{
    header::{Header, HeaderFields},
    Endian, GridError, Raster, RasterMode, SampleStore,
};
use byteorder::{BigEndian as BE, LittleEndian as LE, ReadBytesExt, WriteBytesExt};
use memmap2::Mmap;
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    mem::size_of,
    path::{Path, PathBuf},
};

pub(crate) fn read(path: &Path, mode: RasterMode) -> Result<Raster, GridError> {
    let (flt_path, hdr_path) = paths(path);
    let header = read_header(&hdr_path)?;

    let file_len = flt_path.metadata()?.len();
    let expected = (header.len() * size_of::<f32>()) as u64;
    if file_len != expected {
        #[allow(clippy::cast_possible_truncation)]
        let found = (file_len / size_of::<f32>() as u64) as usize;
        return Err(GridError::SampleCount {
            expected: header.len(),
            found,
        });
    }

    let samples = match mode {
        RasterMode::InMem => {
            let mut file = BufReader::new(File::open(&flt_path)?);
            let mut samples = vec![0.0_f32; header.len()];
            match header.endian {
                Endian::Little => file.read_f32_into::<LE>(&mut samples)?,
                Endian::Big => file.read_f32_into::<BE>(&mut samples)?,
            }
            SampleStore::InMem(samples.into_boxed_slice())
        }
        RasterMode::MemMap => {
            let file = File::open(&flt_path)?;
            let raw = unsafe { Mmap::map(&file)? };
            SampleStore::MemMap {
                raw,
                endian: header.endian,
            }
        }
    };

    Ok(Raster {
        origin: header.origin,
        cell_size: header.cell_size,
        dimensions: (header.ncols, header.nrows),
        nodata: header.nodata,
        samples,
    })
}

pub(crate) fn write(raster: &Raster, path: &Path) -> Result<(), GridError> {
    let (flt_path, hdr_path) = paths(path);

    let mut hdr = BufWriter::new(File::create(hdr_path)?);
    Header::of(raster).write(&mut hdr, true)?;
    hdr.flush()?;

    let mut flt = BufWriter::new(File::create(flt_path)?);
    for index in 0..raster.len() {
        flt.write_f32::<LE>(raster.raw_or_nodata(index))?;
    }
    flt.flush()?;
    Ok(())
}

/// Returns the (samples, header) paths for either file of the pair.
fn paths(path: &Path) -> (PathBuf, PathBuf) {
    (path.with_extension("flt"), path.with_extension("hdr"))
}

fn read_header(path: &Path) -> Result<Header, GridError> {
    let text = fs::read_to_string(path)?;
    let mut fields = HeaderFields::default();
    for line in text.lines() {
        if !fields.parse_line(line)? {
            return Err(GridError::Header(line.to_owned()));
        }
    }
    fields.finish()
}
