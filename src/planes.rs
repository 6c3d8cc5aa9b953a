// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane with an arbitrary pair of
//! corners defining the leftlower and rightupper corners.
//!
//! Nothing here caches a scale factor.  Every stage of the renderer
//! derives the complex coordinate of a pixel from scratch with the same
//! expression, so the classifier on one worker and the flood fill on
//! the root agree on every point bit for bit.
use num::Complex;

use errors::{Error, Result};

/// Describes the column and row of a pixel on the integral plane.
/// `Pixel(i, j)` is column `i`, row `j`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel(pub usize, pub usize);

/// Describes the width and height of an integral plane that is assumed
/// to start at 0,0.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the lower-left corner and upper-right corner of the
/// complex plane, treating the real part of each value as the
/// x-component and the imaginary part of each value as the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub Complex<f64>, pub Complex<f64>);

/// Maps pixels of the integral plane onto points of the complex plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneMapper {
    /// The size of the integral cartesian plane.
    pub integral_plane: IntegralPlane,
    /// The two corners of the complex cartesian plane, left-lower and
    /// right-upper.
    pub complex_plane: ComplexPlane,
}

impl PlaneMapper {
    /// Takes the size of the integral plane and the two corners of the
    /// complex plane.  Rejects empty grids and grids too large to index,
    /// as well as corners that are not finite, are given in the wrong
    /// order, or lie too far apart for their difference to be finite.
    pub fn new(
        width: usize,
        height: usize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<PlaneMapper> {
        if width == 0 || height == 0 || width.checked_mul(height).is_none() {
            return Err(Error::Dimensions { width, height });
        }

        let corners = [leftlower.re, leftlower.im, rightupper.re, rightupper.im];
        if corners.iter().any(|c| !c.is_finite()) {
            return Err(Error::Viewport(
                "every corner coordinate must be finite".to_string(),
            ));
        }

        if rightupper.re < leftlower.re {
            return Err(Error::Viewport(
                "the left lower corner is not to the left of the right upper corner".to_string(),
            ));
        }

        if rightupper.im < leftlower.im {
            return Err(Error::Viewport(
                "the left lower corner is not lower than the right upper corner".to_string(),
            ));
        }

        let span = rightupper - leftlower;
        if !span.re.is_finite() || !span.im.is_finite() {
            return Err(Error::Viewport(
                "the distance between the corners is too large to represent".to_string(),
            ));
        }

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            complex_plane: ComplexPlane(leftlower, rightupper),
        })
    }

    /// Columns in the grid.
    #[inline]
    pub fn width(&self) -> usize {
        self.integral_plane.0
    }

    /// Rows in the grid.
    #[inline]
    pub fn height(&self) -> usize {
        self.integral_plane.1
    }

    /// The total number of points in the integral grid.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Whether the pixel lies on the grid.
    #[inline]
    pub fn contains(&self, pixel: &Pixel) -> bool {
        pixel.0 < self.width() && pixel.1 < self.height()
    }

    /// Row-major offset of a pixel, or None when it is off the grid.
    #[inline]
    pub fn offset(&self, pixel: &Pixel) -> Option<usize> {
        if self.contains(pixel) {
            Some(pixel.1 * self.width() + pixel.0)
        } else {
            None
        }
    }

    /// Given a pixel on the integral plane, return the point of the
    /// complex plane at its corner: `x0 + i*(x1-x0)/width`, and the same
    /// for rows.
    #[inline]
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let ComplexPlane(ll, ru) = self.complex_plane;
        Complex::new(
            ll.re + (pixel.0 as f64) * (ru.re - ll.re) / (self.width() as f64),
            ll.im + (pixel.1 as f64) * (ru.im - ll.im) / (self.height() as f64),
        )
    }

    /// The four axis-aligned neighbours of a pixel in the order left,
    /// right, up, down.  A neighbour off the grid is None.
    #[inline]
    pub fn neighbours(&self, pixel: &Pixel) -> [Option<Pixel>; 4] {
        let Pixel(i, j) = *pixel;
        let within = |p: Pixel| if self.contains(&p) { Some(p) } else { None };
        [
            if i > 0 { within(Pixel(i - 1, j)) } else { None },
            within(Pixel(i + 1, j)),
            if j > 0 { within(Pixel(i, j - 1)) } else { None },
            within(Pixel(i, j + 1)),
        ]
    }
}
