// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Border classification, the first phase of the renderer.
//!
//! A pixel is a border point when it is inside the set and at least one
//! of its four axis-aligned neighbours is not.  The frame of the image
//! counts as outside, so a shape that runs off the edge of the viewport
//! still has a border there.

use crossbeam;
use itertools::iproduct;

use errors::{Error, Result};
use escape::is_inside;
use partition::{RowPartition, RowRange};
use planes::{Pixel, PlaneMapper};

/// Decide whether one pixel is a border point.  Neighbours are
/// re-evaluated rather than looked up, so no stage needs anybody else's
/// escape values.
pub fn is_border_point(plane: &PlaneMapper, pixel: &Pixel, limit: usize) -> bool {
    if !is_inside(plane.pixel_to_point(pixel), limit) {
        return false;
    }
    plane.neighbours(pixel).iter().any(|neighbour| match neighbour {
        None => true,
        Some(n) => !is_inside(plane.pixel_to_point(n), limit),
    })
}

/// Scan the rows of a range on a single thread.
fn classify_range(plane: &PlaneMapper, limit: usize, rows: RowRange) -> Vec<Pixel> {
    iproduct!(rows.rows(), 0..plane.width())
        .map(|(j, i)| Pixel(i, j))
        .filter(|pixel| is_border_point(plane, pixel, limit))
        .collect()
}

/// Find every border point in `rows`, splitting the rows across
/// `threads` scoped threads.  Each thread collects into its own list and
/// the lists are concatenated in thread order once all have finished.
pub fn classify_rows(
    plane: &PlaneMapper,
    limit: usize,
    rows: RowRange,
    threads: usize,
) -> Result<Vec<Pixel>> {
    if threads == 0 {
        return Err(Error::Threads);
    }
    if rows.end() > plane.height() {
        return Err(Error::Partition {
            total: plane.height(),
            parts: 1,
            covered: rows.end(),
        });
    }

    let chunks: Vec<RowRange> = RowPartition::new(rows.count, threads)?
        .ranges()
        .iter()
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| RowRange {
            offset: rows.offset + chunk.offset,
            count: chunk.count,
        })
        .collect();

    let found = crossbeam::scope(|spawner| {
        let handles: Vec<_> = chunks
            .iter()
            .map(|&chunk| spawner.spawn(move |_| classify_range(plane, limit, chunk)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Vec<_>>()
    })
    .map_err(|_| Error::ThreadPanicked("border classification"))?;

    let mut points = Vec::new();
    for list in found {
        let list = list.map_err(|_| Error::ThreadPanicked("border classification"))?;
        points.extend(list);
    }
    debug!(
        "rows {}..{}: {} border points on {} threads",
        rows.offset,
        rows.end(),
        points.len(),
        chunks.len()
    );
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::Complex;

    fn fixture() -> PlaneMapper {
        // Columns and rows land on -4, -2, 0 and 2.
        PlaneMapper::new(4, 4, Complex::new(-4.0, -4.0), Complex::new(4.0, 4.0)).unwrap()
    }

    #[test]
    fn exterior_pixels_are_never_border_points() {
        let plane = fixture();
        assert!(!is_border_point(&plane, &Pixel(0, 0), 20));
        assert!(!is_border_point(&plane, &Pixel(3, 2), 20));
    }

    #[test]
    fn inside_pixels_next_to_outside_are_border_points() {
        let plane = fixture();
        // -2+0i is inside, its left neighbour -4+0i is not.
        assert!(is_border_point(&plane, &Pixel(1, 2), 20));
        // The origin is inside, its right neighbour 2+0i is not.
        assert!(is_border_point(&plane, &Pixel(2, 2), 20));
    }

    #[test]
    fn the_frame_counts_as_outside() {
        // Every pixel of this viewport is inside the set.
        let plane =
            PlaneMapper::new(4, 4, Complex::new(-0.1, -0.1), Complex::new(0.1, 0.1)).unwrap();
        assert!(is_border_point(&plane, &Pixel(0, 0), 50));
        assert!(is_border_point(&plane, &Pixel(3, 1), 50));
        assert!(!is_border_point(&plane, &Pixel(1, 1), 50));
        assert!(!is_border_point(&plane, &Pixel(2, 2), 50));
    }

    #[test]
    fn classify_finds_the_fixture_border() {
        let plane = fixture();
        let full = RowRange { offset: 0, count: 4 };
        let mut points = classify_rows(&plane, 20, full, 1).unwrap();
        points.sort();
        assert_eq!(points, vec![Pixel(1, 2), Pixel(2, 2)]);
    }

    #[test]
    fn thread_count_does_not_change_the_result() {
        let plane =
            PlaneMapper::new(48, 40, Complex::new(-2.0, -1.2), Complex::new(0.6, 1.2)).unwrap();
        let full = RowRange {
            offset: 0,
            count: 40,
        };
        let mut single = classify_rows(&plane, 64, full, 1).unwrap();
        let mut pooled = classify_rows(&plane, 64, full, 5).unwrap();
        single.sort();
        pooled.sort();
        assert!(!single.is_empty());
        assert_eq!(single, pooled);
    }

    #[test]
    fn more_threads_than_rows() {
        let plane = fixture();
        let rows = RowRange { offset: 2, count: 1 };
        let mut points = classify_rows(&plane, 20, rows, 8).unwrap();
        points.sort();
        assert_eq!(points, vec![Pixel(1, 2), Pixel(2, 2)]);
    }

    #[test]
    fn empty_range_has_no_points() {
        let plane = fixture();
        let rows = RowRange { offset: 4, count: 0 };
        assert!(classify_rows(&plane, 20, rows, 2).unwrap().is_empty());
    }

    #[test]
    fn range_past_the_grid_is_rejected() {
        let plane = fixture();
        let rows = RowRange { offset: 3, count: 2 };
        assert!(classify_rows(&plane, 20, rows, 2).is_err());
    }
}
