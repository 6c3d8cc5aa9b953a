// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time test used by both phases of the renderer.
//!
//! The orbit is seeded with the sample point itself, `z = c`, rather
//! than with zero.  That shifts every escape count by one relative to
//! the textbook iteration and is what the rest of the crate expects.

use num::Complex;

/// Iterate `z <- z*z + c` starting from `z = c` for at most `limit`
/// steps.  Returns the step at which `|z|^2` first exceeds 4, or
/// `limit` when the orbit never does.
#[inline]
pub fn escape_time(c: Complex<f64>, limit: usize) -> usize {
    let mut z = c;
    for n in 0..limit {
        if z.norm_sqr() > 4.0 {
            return n;
        }
        z = z * z + c;
    }
    limit
}

/// A point is "inside" when its orbit survives the whole bound.
#[inline]
pub fn is_inside(c: Complex<f64>, limit: usize) -> bool {
    escape_time(c, limit) == limit
}
