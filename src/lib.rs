#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Borderbrot renderer
//!
//! Renders the interior of the Mandelbrot set as a black and white
//! image without testing every pixel for membership.  Each worker of a
//! group scans its own rows for border points: pixels inside the set
//! with at least one neighbour outside it, the frame of the image
//! counting as outside.  The border points are gathered on one root
//! worker, which floods inward from them in passes until the region
//! stops growing.  The finished mask is scattered back along the same
//! row split, each worker turns its rows into grey levels, and the root
//! gathers the rows into the final image.
//!
//! The fill only reaches inside pixels connected to a detected border
//! point.  An interior pocket cut off from every border point stays
//! black; that is a property of the two-phase method, not a bug.

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;

pub mod border;
pub mod cluster;
pub mod collect;
pub mod config;
pub mod errors;
pub mod escape;
pub mod flood;
pub mod output;
pub mod partition;
pub mod planes;
pub mod redistribute;
pub mod render;

pub use cluster::{Communicator, LocalCluster, ThreadComm, ROOT};
pub use config::RenderConfig;
pub use errors::{Error, Result};
pub use flood::{flood_fill, Mask};
pub use planes::{Pixel, PlaneMapper};
pub use render::{render, run_border_fill, WorkerOutput};
