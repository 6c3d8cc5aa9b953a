// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A whole run, as seen by one worker.
//!
//! Every worker executes the same four collectives in the same order no
//! matter how many rows or border points it has: the count gather, the
//! border point gather, the mask scatter and the image gather, with the
//! root's flood fill in between.

use border::classify_rows;
use cluster::{Communicator, LocalCluster, ROOT};
use collect::gather_border_points;
use config::RenderConfig;
use errors::{Error, Result};
use flood::flood_fill;
use partition::{RowPartition, RowRange};
use redistribute::{gather_image, pixelate, scatter_mask};

/// What one worker ends up with.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkerOutput {
    /// The rows this worker was responsible for.
    pub rows: RowRange,
    /// Grey levels of those rows, row-major.
    pub slice: Vec<u8>,
    /// Border points this worker found.
    pub border_points: usize,
    /// The assembled image; only the root has one.
    pub image: Option<Vec<u8>>,
}

/// Run border detection, flood fill and image assembly as one member of
/// the group behind `comm`.
pub fn run_border_fill<C: Communicator>(config: &RenderConfig, comm: &C) -> Result<WorkerOutput> {
    config.validate()?;
    let plane = config.plane()?;
    let partition = RowPartition::new(plane.height(), comm.size())?;
    let rows = partition.range(comm.rank());
    debug!(
        "worker {}/{} owns rows {}..{}",
        comm.rank(),
        comm.size(),
        rows.offset,
        rows.end()
    );

    let border = classify_rows(&plane, config.iterations, rows, config.threads)?;
    let border_points = border.len();
    let gathered = gather_border_points(comm, &border)?;
    drop(border);

    let mask = match gathered {
        Some(points) => {
            info!("flood filling from {} border points", points.len());
            Some(flood_fill(&points, &plane, config.iterations, config.threads)?)
        }
        None => None,
    };

    let stripe = scatter_mask(comm, mask.as_ref(), &partition, plane.width())?;
    drop(mask);
    let slice = pixelate(&stripe);
    let image = gather_image(comm, &slice, &partition, plane.width())?;

    Ok(WorkerOutput {
        rows,
        slice,
        border_points,
        image,
    })
}

/// Validate `config`, run it on a group of `config.workers` threads and
/// return the image assembled on the root.
pub fn render(config: &RenderConfig) -> Result<Vec<u8>> {
    config.validate()?;
    let cluster = LocalCluster::new(config.workers)?;
    let mut outputs = cluster.run(|comm| run_border_fill(config, comm))?;
    let total: usize = outputs.iter().map(|o| o.border_points).sum();
    info!("{} workers found {} border points", outputs.len(), total);
    outputs
        .get_mut(ROOT)
        .and_then(|root| root.image.take())
        .ok_or_else(|| Error::Collective {
            seq: 0,
            reason: "the root finished without an image".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::Complex;

    fn small() -> RenderConfig {
        RenderConfig {
            width: 24,
            height: 18,
            leftlower: Complex::new(-2.0, -1.2),
            rightupper: Complex::new(0.6, 1.2),
            iterations: 64,
            threads: 2,
            workers: 3,
        }
    }

    #[test]
    fn every_worker_gets_its_own_rows() {
        let config = small();
        let outputs = LocalCluster::new(3)
            .unwrap()
            .run(|comm| run_border_fill(&config, comm))
            .unwrap();
        let root_image = outputs[ROOT].image.clone().unwrap();
        assert_eq!(root_image.len(), 24 * 18);
        for output in &outputs {
            let start = output.rows.offset * 24;
            assert_eq!(output.slice.len(), output.rows.count * 24);
            assert_eq!(&root_image[start..start + output.slice.len()], output.slice.as_slice());
        }
        assert!(outputs[1..].iter().all(|o| o.image.is_none()));
    }

    #[test]
    fn render_returns_the_root_image() {
        let image = render(&small()).unwrap();
        assert_eq!(image.len(), 24 * 18);
        assert!(image.iter().all(|&p| p == 0 || p == 255));
        assert!(image.iter().any(|&p| p == 255));
    }

    #[test]
    fn invalid_configuration_fails_before_running() {
        let config = RenderConfig {
            iterations: 0,
            ..small()
        };
        match render(&config) {
            Err(Error::IterationLimit) => (),
            other => panic!("unexpected {:?}", other.map(|i| i.len())),
        }
    }

    #[test]
    fn more_workers_than_rows() {
        let config = RenderConfig {
            height: 3,
            workers: 5,
            ..small()
        };
        let image = render(&config).unwrap();
        assert_eq!(image.len(), 24 * 3);
    }
}
