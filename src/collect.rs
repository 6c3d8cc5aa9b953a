// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Moving every worker's border points to the root.

use cluster::{Communicator, ROOT};
use errors::Result;
use planes::Pixel;

/// Two collectives, entered by every rank whatever the size of its
/// list: a gather of the counts, then a variable-length gather of the
/// points themselves.  The root gets the concatenation in rank order,
/// everyone else gets None.
pub fn gather_border_points<C: Communicator>(comm: &C, local: &[Pixel]) -> Result<Option<Vec<Pixel>>> {
    let counts = comm.gather(local.len(), ROOT)?;
    if let Some(ref counts) = counts {
        debug!("border point counts per worker: {:?}", counts);
    }
    comm.gatherv(local, counts.as_ref().map(|c| c.as_slice()), ROOT)
}
