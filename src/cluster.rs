// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A group of cooperating workers that talk only through collective
//! operations.
//!
//! `LocalCluster` runs every worker as a scoped thread with its own
//! `ThreadComm` endpoint.  Endpoints exchange messages over crossbeam
//! channels, one inbox per rank.  Each collective a rank enters is
//! stamped with a sequence number, so a peer that races ahead into the
//! next collective cannot confuse the one in progress; its message is
//! parked until that collective runs.
//!
//! Every rank must enter the same collectives in the same order.  A rank
//! that leaves early, by returning an error or by panicking, announces
//! its departure when its endpoint is dropped, and anyone waiting on it
//! fails with `Error::Aborted` instead of blocking forever.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crossbeam;
use crossbeam::channel::{unbounded, Receiver, Sender};

use errors::{Error, Result};
use partition::displacements;

/// The rank that collects border points, runs the flood fill and
/// assembles the image.
pub const ROOT: usize = 0;

/// Collective operations over a fixed group of ranks.
pub trait Communicator {
    /// This worker's rank, in `0..size()`.
    fn rank(&self) -> usize;

    /// Number of workers in the group.
    fn size(&self) -> usize;

    /// Every rank contributes one value; the root receives them all in
    /// rank order, everyone else receives None.
    fn gather<T>(&self, value: T, root: usize) -> Result<Option<Vec<T>>>
    where
        T: Clone + Send + 'static;

    /// Every rank contributes a block of any length.  The root passes
    /// the expected length of each rank's block and receives the blocks
    /// concatenated in rank order; the other ranks pass None and receive
    /// None.
    fn gatherv<T>(&self, local: &[T], counts: Option<&[usize]>, root: usize) -> Result<Option<Vec<T>>>
    where
        T: Clone + Send + 'static;

    /// The root splits `data` into consecutive blocks of `counts[rank]`
    /// elements and hands one to each rank.  Every rank passes the same
    /// counts; only the root passes data.
    fn scatterv<T>(&self, data: Option<&[T]>, counts: &[usize], root: usize) -> Result<Vec<T>>
    where
        T: Clone + Send + 'static;
}

enum Envelope {
    Data {
        seq: u64,
        src: usize,
        payload: Box<dyn Any + Send>,
    },
    Departed {
        src: usize,
    },
}

/// One rank's endpoint in a `LocalCluster`.
pub struct ThreadComm {
    rank: usize,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    seq: Cell<u64>,
    parked: RefCell<HashMap<(u64, usize), Box<dyn Any + Send>>>,
    departed: RefCell<HashSet<usize>>,
}

impl ThreadComm {
    fn begin(&self) -> u64 {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        seq
    }

    fn send<T: Send + 'static>(&self, dest: usize, seq: u64, value: T) -> Result<()> {
        self.peers[dest]
            .send(Envelope::Data {
                seq,
                src: self.rank,
                payload: Box::new(value),
            })
            .map_err(|_| Error::Aborted { rank: dest })
    }

    fn receive<T: 'static>(&self, seq: u64, src: usize) -> Result<T> {
        loop {
            if let Some(payload) = self.parked.borrow_mut().remove(&(seq, src)) {
                return payload
                    .downcast::<T>()
                    .map(|value| *value)
                    .map_err(|_| Error::Collective {
                        seq,
                        reason: format!("rank {} sent a payload of the wrong type", src),
                    });
            }
            if self.departed.borrow().contains(&src) {
                return Err(Error::Aborted { rank: src });
            }
            match self.inbox.recv() {
                Ok(Envelope::Data { seq, src, payload }) => {
                    self.parked.borrow_mut().insert((seq, src), payload);
                }
                Ok(Envelope::Departed { src }) => {
                    self.departed.borrow_mut().insert(src);
                }
                Err(_) => return Err(Error::Aborted { rank: src }),
            }
        }
    }

    fn check_root(&self, seq: u64, root: usize) -> Result<()> {
        if root < self.size() {
            Ok(())
        } else {
            Err(Error::Collective {
                seq,
                reason: format!("root {} is not a rank of a group of {}", root, self.size()),
            })
        }
    }

    fn check_counts(&self, seq: u64, counts: &[usize]) -> Result<()> {
        if counts.len() == self.size() {
            Ok(())
        } else {
            Err(Error::Collective {
                seq,
                reason: format!(
                    "{} counts given for a group of {}",
                    counts.len(),
                    self.size()
                ),
            })
        }
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn gather<T>(&self, value: T, root: usize) -> Result<Option<Vec<T>>>
    where
        T: Clone + Send + 'static,
    {
        let seq = self.begin();
        self.check_root(seq, root)?;
        if self.rank != root {
            self.send(root, seq, value)?;
            return Ok(None);
        }
        let mut own = Some(value);
        let mut values = Vec::with_capacity(self.size());
        for src in 0..self.size() {
            if src == root {
                if let Some(value) = own.take() {
                    values.push(value);
                }
            } else {
                values.push(self.receive::<T>(seq, src)?);
            }
        }
        Ok(Some(values))
    }

    fn gatherv<T>(&self, local: &[T], counts: Option<&[usize]>, root: usize) -> Result<Option<Vec<T>>>
    where
        T: Clone + Send + 'static,
    {
        let seq = self.begin();
        self.check_root(seq, root)?;
        if self.rank != root {
            self.send(root, seq, local.to_vec())?;
            return Ok(None);
        }

        let counts = counts.ok_or_else(|| Error::Collective {
            seq,
            reason: "the root must know every rank's count".to_string(),
        })?;
        self.check_counts(seq, counts)?;
        let offsets = displacements(counts);
        let total: usize = counts.iter().sum();

        let mut gathered: Vec<T> = Vec::new();
        gathered
            .try_reserve_exact(total)
            .map_err(|_| Error::Allocation {
                cells: total,
                what: "gather buffer",
            })?;
        for src in 0..self.size() {
            let block = if src == root {
                local.to_vec()
            } else {
                self.receive::<Vec<T>>(seq, src)?
            };
            if block.len() != counts[src] || gathered.len() != offsets[src] {
                return Err(Error::Collective {
                    seq,
                    reason: format!(
                        "rank {} sent {} elements, {} expected at offset {}",
                        src,
                        block.len(),
                        counts[src],
                        offsets[src]
                    ),
                });
            }
            gathered.extend(block);
        }
        Ok(Some(gathered))
    }

    fn scatterv<T>(&self, data: Option<&[T]>, counts: &[usize], root: usize) -> Result<Vec<T>>
    where
        T: Clone + Send + 'static,
    {
        let seq = self.begin();
        self.check_root(seq, root)?;
        self.check_counts(seq, counts)?;
        if self.rank != root {
            let block = self.receive::<Vec<T>>(seq, root)?;
            if block.len() != counts[self.rank] {
                return Err(Error::Collective {
                    seq,
                    reason: format!(
                        "received {} elements, {} expected",
                        block.len(),
                        counts[self.rank]
                    ),
                });
            }
            return Ok(block);
        }

        let data = data.ok_or_else(|| Error::Collective {
            seq,
            reason: "the root has nothing to scatter".to_string(),
        })?;
        let total: usize = counts.iter().sum();
        if data.len() != total {
            return Err(Error::Collective {
                seq,
                reason: format!("{} elements to scatter, counts cover {}", data.len(), total),
            });
        }
        let offsets = displacements(counts);
        let mut own = Vec::new();
        for dest in 0..self.size() {
            let block = &data[offsets[dest]..offsets[dest] + counts[dest]];
            if dest == root {
                own = block.to_vec();
            } else {
                self.send(dest, seq, block.to_vec())?;
            }
        }
        Ok(own)
    }
}

impl Drop for ThreadComm {
    fn drop(&mut self) {
        for (dest, peer) in self.peers.iter().enumerate() {
            if dest != self.rank {
                // The peer may already be gone.
                let _ = peer.send(Envelope::Departed { src: self.rank });
            }
        }
    }
}

/// A worker group whose members are threads of this process.
#[derive(Copy, Clone, Debug)]
pub struct LocalCluster {
    size: usize,
}

impl LocalCluster {
    /// A group of `size` workers.
    pub fn new(size: usize) -> Result<LocalCluster> {
        if size == 0 {
            return Err(Error::Workers);
        }
        Ok(LocalCluster { size })
    }

    fn endpoints(&self) -> Vec<ThreadComm> {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..self.size).map(|_| unbounded()).unzip();
        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| ThreadComm {
                rank,
                peers: senders.clone(),
                inbox,
                seq: Cell::new(0),
                parked: RefCell::new(HashMap::new()),
                departed: RefCell::new(HashSet::new()),
            })
            .collect()
    }

    /// Run `job` once on every rank and wait for all of them.  Results
    /// come back in rank order.  When any rank fails, the error reported
    /// is the one that caused the run to fail, not a peer's complaint
    /// that the failing rank went away.
    pub fn run<F, R>(&self, job: F) -> Result<Vec<R>>
    where
        F: Fn(&ThreadComm) -> Result<R> + Sync,
        R: Send,
    {
        let endpoints = self.endpoints();
        let job = &job;
        let outcomes = crossbeam::scope(|spawner| {
            let handles: Vec<_> = endpoints
                .into_iter()
                .map(|comm| spawner.spawn(move |_| job(&comm)))
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(rank, handle)| match handle.join() {
                    Ok(outcome) => outcome,
                    Err(_) => Err(Error::WorkerPanicked { rank }),
                })
                .collect::<Vec<_>>()
        })
        .map_err(|_| Error::WorkerPanicked { rank: ROOT })?;

        let mut results = Vec::with_capacity(self.size);
        let mut secondary = None;
        let mut primary = None;
        for outcome in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(err @ Error::Aborted { .. }) => {
                    if secondary.is_none() {
                        secondary = Some(err);
                    }
                }
                Err(err) => {
                    if primary.is_none() {
                        primary = Some(err);
                    }
                }
            }
        }
        match primary.or(secondary) {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }
}
