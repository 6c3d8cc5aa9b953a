// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The flood fill, the second phase of the renderer, run on the root
//! alone.
//!
//! The mask is seeded with the gathered border points and then grown in
//! bulk-synchronous passes.  A pass reads the state left by the previous
//! pass and writes each cell's new state into a second buffer; the
//! buffers are swapped once every thread has finished.  No cell can see
//! another cell's update from the same pass, so the result does not
//! depend on how the rows are shared out between threads.
//!
//! A cell that has been examined and found to escape is remembered as
//! exterior, so escape time is computed at most once per cell.  The fill
//! only reaches cells connected to a border point through inside cells;
//! an interior pocket with no detected border stays unmarked.

use std::mem;

use crossbeam;

use errors::{allocate, Error, Result};
use escape::is_inside;
use partition::{RowPartition, RowRange};
use planes::{Pixel, PlaneMapper};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Cell {
    Unvisited,
    Inside,
    Exterior,
}

/// The finished "is inside" grid, row-major, `width * height` cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Mask {
    /// Columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether a pixel is marked.  Pixels off the grid are not.
    pub fn get(&self, pixel: &Pixel) -> bool {
        pixel.0 < self.width && pixel.1 < self.height && self.cells[pixel.1 * self.width + pixel.0]
    }

    /// Number of marked cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// The whole grid, row-major.
    pub fn as_slice(&self) -> &[bool] {
        &self.cells
    }

    /// The cells of the given rows.
    pub fn rows(&self, range: RowRange) -> &[bool] {
        &self.cells[range.offset * self.width..range.end() * self.width]
    }
}

/// An in-progress flood fill.
pub struct FloodFill<'a> {
    plane: &'a PlaneMapper,
    limit: usize,
    chunks: Vec<RowRange>,
    cells: Vec<Cell>,
    scratch: Vec<Cell>,
    passes: usize,
}

impl<'a> FloodFill<'a> {
    /// Allocate the grid and mark every seed.  Seeds off the grid are
    /// skipped.
    pub fn new(
        plane: &'a PlaneMapper,
        limit: usize,
        threads: usize,
        seeds: &[Pixel],
    ) -> Result<FloodFill<'a>> {
        if threads == 0 {
            return Err(Error::Threads);
        }
        if limit == 0 {
            return Err(Error::IterationLimit);
        }
        let chunks: Vec<RowRange> = RowPartition::new(plane.height(), threads)?
            .ranges()
            .iter()
            .cloned()
            .filter(|chunk| !chunk.is_empty())
            .collect();

        let mut cells = allocate(plane.len(), Cell::Unvisited, "flood fill grid")?;
        let scratch = allocate(plane.len(), Cell::Unvisited, "flood fill scratch grid")?;

        let mut ignored = 0;
        for seed in seeds {
            match plane.offset(seed) {
                Some(offset) => cells[offset] = Cell::Inside,
                None => ignored += 1,
            }
        }
        if ignored > 0 {
            warn!("ignored {} seeds outside the {}x{} grid", ignored, plane.width(), plane.height());
        }

        Ok(FloodFill {
            plane,
            limit,
            chunks,
            cells,
            scratch,
            passes: 0,
        })
    }

    /// Passes run so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// The current state as a mask.
    pub fn mask(&self) -> Result<Mask> {
        let mut cells = allocate(self.cells.len(), false, "mask")?;
        for (mark, cell) in cells.iter_mut().zip(self.cells.iter()) {
            *mark = *cell == Cell::Inside;
        }
        Ok(Mask {
            width: self.plane.width(),
            height: self.plane.height(),
            cells,
        })
    }

    /// Run one pass over the whole grid.  Returns whether any cell became
    /// inside.
    pub fn pass(&mut self) -> Result<bool> {
        let width = self.plane.width();
        let plane = self.plane;
        let limit = self.limit;
        let current: &[Cell] = &self.cells;

        let mut stripes = Vec::with_capacity(self.chunks.len());
        let mut remaining: &mut [Cell] = &mut self.scratch;
        for chunk in &self.chunks {
            let (stripe, rest) = { remaining }.split_at_mut(chunk.count * width);
            stripes.push((*chunk, stripe));
            remaining = rest;
        }

        let outcomes = crossbeam::scope(|spawner| {
            let handles: Vec<_> = stripes
                .into_iter()
                .map(|(chunk, stripe)| {
                    spawner.spawn(move |_| grow_stripe(plane, limit, current, chunk, stripe))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Vec<_>>()
        })
        .map_err(|_| Error::ThreadPanicked("flood fill"))?;

        let mut grown = 0;
        for outcome in outcomes {
            grown += outcome.map_err(|_| Error::ThreadPanicked("flood fill"))?;
        }

        mem::swap(&mut self.cells, &mut self.scratch);
        self.passes += 1;
        trace!("flood fill pass {}: {} cells grown", self.passes, grown);
        Ok(grown > 0)
    }

    /// Pass until nothing changes, then hand back the mask.
    pub fn run(mut self) -> Result<Mask> {
        while self.pass()? {}
        let mask = self.mask()?;
        debug!(
            "flood fill settled after {} passes with {} cells inside",
            self.passes,
            mask.count()
        );
        Ok(mask)
    }
}

/// Compute the next state of one stripe of rows from the current state
/// of the whole grid.  Returns how many cells became inside.
fn grow_stripe(
    plane: &PlaneMapper,
    limit: usize,
    current: &[Cell],
    chunk: RowRange,
    stripe: &mut [Cell],
) -> usize {
    let width = plane.width();
    let base = chunk.offset * width;
    let mut grown = 0;
    for (local, next) in stripe.iter_mut().enumerate() {
        let offset = base + local;
        *next = match current[offset] {
            Cell::Unvisited => {
                let pixel = Pixel(offset % width, offset / width);
                let reached = plane.neighbours(&pixel).iter().any(|n| match *n {
                    Some(ref n) => current[n.1 * width + n.0] == Cell::Inside,
                    None => false,
                });
                if !reached {
                    Cell::Unvisited
                } else if is_inside(plane.pixel_to_point(&pixel), limit) {
                    grown += 1;
                    Cell::Inside
                } else {
                    Cell::Exterior
                }
            }
            settled => settled,
        };
    }
    grown
}

/// Seed a mask with `seeds` and grow it to its fixed point on `threads`
/// threads.
pub fn flood_fill(seeds: &[Pixel], plane: &PlaneMapper, limit: usize, threads: usize) -> Result<Mask> {
    FloodFill::new(plane, limit, threads, seeds)?.run()
}
