// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Run parameters.  Set once before the workers start and never changed.

use num::Complex;

use errors::{Error, Result};
use planes::PlaneMapper;

/// Everything a worker needs to know about a run.  Every worker gets an
/// identical copy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Left-lower corner of the viewport, `x0 + y0 i`.
    pub leftlower: Complex<f64>,
    /// Right-upper corner of the viewport, `x1 + y1 i`.
    pub rightupper: Complex<f64>,
    /// Escape bound.
    pub iterations: usize,
    /// Threads per worker.
    pub threads: usize,
    /// Workers in the group.
    pub workers: usize,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            width: 800,
            height: 600,
            leftlower: Complex::new(-2.103, -1.238),
            rightupper: Complex::new(1.201, 1.240),
            iterations: 2000,
            threads: 1,
            workers: 1,
        }
    }
}

impl RenderConfig {
    /// Check every parameter.  Nothing parallel should start until this
    /// has passed.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::IterationLimit);
        }
        if self.threads == 0 {
            return Err(Error::Threads);
        }
        if self.workers == 0 {
            return Err(Error::Workers);
        }
        self.plane().map(|_| ())
    }

    /// The pixel-to-point mapping for this run.
    pub fn plane(&self) -> Result<PlaneMapper> {
        PlaneMapper::new(self.width, self.height, self.leftlower, self.rightupper)
    }
}
