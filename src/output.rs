// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writing the finished image as a binary greymap.

use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use errors::{Error, Result};

/// Write `pixels`, one byte per pixel in row-major order, as a P5 PGM
/// with a maximum value of 255.
pub fn write_image<P: AsRef<Path>>(outfile: P, pixels: &[u8], width: usize, height: usize) -> Result<()> {
    if width.checked_mul(height) != Some(pixels.len()) {
        return Err(Error::Dimensions { width, height });
    }
    let (columns, rows) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(columns), Ok(rows)) => (columns, rows),
        _ => return Err(Error::Dimensions { width, height }),
    };
    let mut output = BufWriter::new(File::create(outfile.as_ref())?);
    {
        let mut encoder = PNMEncoder::new(&mut output)
            .with_subtype(PNMSubtype::Graymap(SampleEncoding::Binary));
        encoder.encode(pixels, columns, rows, ColorType::Gray(8))?;
    }
    output.flush()?;
    Ok(())
}
