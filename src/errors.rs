// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The error type shared by every stage of the renderer.

use std::io;

/// Everything that can go wrong during a run.  Configuration errors are
/// raised before any thread is started; the rest abort the whole worker
/// group.
#[derive(Debug, Fail)]
pub enum Error {
    /// Width or height is zero, or the grid is too large to address.
    #[fail(display = "invalid image dimensions {}x{}", width, height)]
    Dimensions {
        /// Requested width in pixels.
        width: usize,
        /// Requested height in pixels.
        height: usize,
    },

    /// The escape bound must be at least one iteration.
    #[fail(display = "the iteration limit must be positive")]
    IterationLimit,

    /// A worker needs at least one thread.
    #[fail(display = "the thread count must be positive")]
    Threads,

    /// The worker group needs at least one member.
    #[fail(display = "the worker count must be positive")]
    Workers,

    /// The complex-plane rectangle is unusable.
    #[fail(display = "invalid viewport: {}", _0)]
    Viewport(String),

    /// A row partition does not cover its extent exactly.
    #[fail(
        display = "partition of {} rows into {} parts covers {} rows",
        total, parts, covered
    )]
    Partition {
        /// Rows to distribute.
        total: usize,
        /// Number of parts.
        parts: usize,
        /// Rows the computed ranges actually cover.
        covered: usize,
    },

    /// A buffer could not be reserved.
    #[fail(display = "could not allocate {} cells for the {}", cells, what)]
    Allocation {
        /// Requested element count.
        cells: usize,
        /// What the buffer was for.
        what: &'static str,
    },

    /// A collective was invoked with inconsistent arguments or received
    /// a contribution it did not expect.
    #[fail(display = "collective #{} failed: {}", seq, reason)]
    Collective {
        /// Sequence number of the collective on the reporting rank.
        seq: u64,
        /// What went wrong.
        reason: String,
    },

    /// A peer left the worker group before contributing to a collective.
    #[fail(display = "worker {} left the worker group", rank)]
    Aborted {
        /// The departed rank.
        rank: usize,
    },

    /// A worker thread panicked.
    #[fail(display = "worker {} panicked", rank)]
    WorkerPanicked {
        /// The rank that panicked.
        rank: usize,
    },

    /// A thread inside a worker's pool panicked.
    #[fail(display = "a pool thread panicked during {}", _0)]
    ThreadPanicked(&'static str),

    /// Writing the output failed.
    #[fail(display = "{}", _0)]
    Io(#[cause] io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = ::std::result::Result<T, Error>;

/// Reserve and fill a buffer, reporting exhaustion as an `Error`
/// rather than aborting the process.
pub fn allocate<T: Clone>(cells: usize, value: T, what: &'static str) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(cells)
        .map_err(|_| Error::Allocation { cells, what })?;
    buffer.resize(cells, value);
    Ok(buffer)
}
