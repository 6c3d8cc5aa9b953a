// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Handing the finished mask back to the workers and gathering their
//! pixels into the image.  Both transfers use the row partition that
//! assigned the rows in the first place; any other split would put rows
//! in the wrong place.

use cluster::{Communicator, ROOT};
use errors::{Error, Result};
use flood::Mask;
use partition::RowPartition;

/// Value of a pixel inside the set.
pub const INSIDE: u8 = 255;
/// Value of every other pixel.
pub const OUTSIDE: u8 = 0;

/// Give each worker the mask rows of its own range.  The root passes
/// the mask, everyone else passes None.
pub fn scatter_mask<C: Communicator>(
    comm: &C,
    mask: Option<&Mask>,
    partition: &RowPartition,
    width: usize,
) -> Result<Vec<bool>> {
    if let Some(mask) = mask {
        if mask.width() != width || mask.height() != partition.total() {
            return Err(Error::Dimensions {
                width: mask.width(),
                height: mask.height(),
            });
        }
    }
    let counts = partition.element_counts(width);
    comm.scatterv(mask.map(|m| m.as_slice()), &counts, ROOT)
}

/// Turn a stripe of the mask into grey levels.
pub fn pixelate(stripe: &[bool]) -> Vec<u8> {
    stripe
        .iter()
        .map(|&inside| if inside { INSIDE } else { OUTSIDE })
        .collect()
}

/// Assemble every worker's pixels into the image on the root.
pub fn gather_image<C: Communicator>(
    comm: &C,
    pixels: &[u8],
    partition: &RowPartition,
    width: usize,
) -> Result<Option<Vec<u8>>> {
    let counts = partition.element_counts(width);
    let counts = if comm.rank() == ROOT {
        Some(counts.as_slice())
    } else {
        None
    };
    comm.gatherv(pixels, counts, ROOT)
}
