//! Brute-force nearest-neighbour search between point clouds.
//!
//! Every point of the `from` cloud is compared against every point of the
//! `to` cloud. Work is split into fixed-size blocks of `from` indices that
//! threads claim from a shared atomic cursor; each block's results are
//! written back once all threads have joined, so the output never depends
//! on the thread count.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use interfere_math::Point3;
use tracing::warn;

use crate::{CloudError, Result};

/// Distance recorded for a point whose nearest neighbour is not yet known.
pub const UNSET_DISTANCE: f64 = 1e100;

/// Number of `from` points a worker claims at a time.
const CLAIM_BLOCK: usize = 64;

/// Nearest-neighbour records for every point of one cloud.
///
/// Indices are 1-based into the other cloud; 0 means unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Nearest {
    index: Vec<usize>,
    dist: Vec<f64>,
}

impl Nearest {
    /// `len` unset records.
    pub fn new(len: usize) -> Self {
        Self {
            index: vec![0; len],
            dist: vec![UNSET_DISTANCE; len],
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// 1-based nearest indices (0 = unset).
    pub fn indices(&self) -> &[usize] {
        &self.index
    }

    /// Nearest distances ([`UNSET_DISTANCE`] when unset).
    pub fn distances(&self) -> &[f64] {
        &self.dist
    }

    /// 0-based nearest index and distance for point `i`, if set.
    pub fn get(&self, i: usize) -> Option<(usize, f64)> {
        match self.index.get(i) {
            Some(&j) if j > 0 => Some((j - 1, self.dist[i])),
            _ => None,
        }
    }
}

/// Parallel brute-force nearest-neighbour solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearestSolver {
    workers: usize,
    spawn_limit: usize,
}

impl NearestSolver {
    /// Solver using up to `workers` threads (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            spawn_limit: usize::MAX,
        }
    }

    /// Refuse to start more than `limit` helper threads, as if spawning failed.
    #[cfg(test)]
    fn with_spawn_limit(mut self, limit: usize) -> Self {
        self.spawn_limit = limit;
        self
    }

    /// Solver sized to the machine's available parallelism.
    pub fn available() -> Self {
        Self::new(thread::available_parallelism().map_or(1, |n| n.get()))
    }

    /// Maximum number of threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fill `out` with the nearest `to` point of every `from` point.
    ///
    /// Ties keep the lowest index. Records are left unset when `to` is
    /// empty.
    pub fn solve_into(&self, from: &[Point3], to: &[Point3], out: &mut Nearest) -> Result<()> {
        if out.len() != from.len() {
            return Err(CloudError::Consistency(format!(
                "{} nearest records for {} points",
                out.len(),
                from.len()
            )));
        }
        self.fill(from, to, out);
        Ok(())
    }

    /// Nearest records of every `from` point in `to`.
    pub fn solve(&self, from: &[Point3], to: &[Point3]) -> Nearest {
        let mut out = Nearest::new(from.len());
        self.fill(from, to, &mut out);
        out
    }

    /// `out` must hold one record per `from` point.
    fn fill(&self, from: &[Point3], to: &[Point3], out: &mut Nearest) {
        if from.is_empty() || to.is_empty() {
            return;
        }

        let workers = self.workers.min(from.len().div_ceil(CLAIM_BLOCK));
        if workers <= 1 {
            for (i, p) in from.iter().enumerate() {
                if let Some((j, d)) = closest(p, to) {
                    out.index[i] = j;
                    out.dist[i] = d;
                }
            }
            return;
        }

        let cursor = AtomicUsize::new(0);
        let blocks = thread::scope(|s| {
            let work = || claim_blocks(&cursor, from, to);
            let mut handles = Vec::with_capacity(workers - 1);
            for w in 1..workers {
                let spawned = if handles.len() >= self.spawn_limit {
                    Err(io::Error::other("worker limit reached"))
                } else {
                    thread::Builder::new()
                        .name(format!("nearest-{w}"))
                        .spawn_scoped(s, work)
                };
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        warn!(worker = w, error = %err, "failed to spawn nearest-neighbour worker");
                        break;
                    }
                }
            }
            // The calling thread claims blocks too, so the search completes
            // even if no worker could be spawned.
            let mut blocks = work();
            for handle in handles {
                match handle.join() {
                    Ok(done) => blocks.extend(done),
                    Err(e) => std::panic::resume_unwind(e),
                }
            }
            blocks
        });

        for (start, hits) in blocks {
            for (k, hit) in hits.into_iter().enumerate() {
                if let Some((j, d)) = hit {
                    out.index[start + k] = j;
                    out.dist[start + k] = d;
                }
            }
        }
    }
}

impl Default for NearestSolver {
    fn default() -> Self {
        Self::available()
    }
}

type Block = (usize, Vec<Option<(usize, f64)>>);

fn claim_blocks(cursor: &AtomicUsize, from: &[Point3], to: &[Point3]) -> Vec<Block> {
    let mut done = Vec::new();
    loop {
        let start = cursor.fetch_add(CLAIM_BLOCK, Ordering::Relaxed);
        if start >= from.len() {
            break;
        }
        let end = (start + CLAIM_BLOCK).min(from.len());
        let hits = from[start..end].iter().map(|p| closest(p, to)).collect();
        done.push((start, hits));
    }
    done
}

/// 1-based index of the point of `to` closest to `p`, and its distance.
fn closest(p: &Point3, to: &[Point3]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (j, q) in to.iter().enumerate() {
        let d2 = (p - q).norm_squared();
        if best.map_or(true, |(_, b)| d2 < b) {
            best = Some((j + 1, d2));
            if d2 == 0.0 {
                break;
            }
        }
    }
    best.map(|(j, d2)| (j, d2.sqrt()))
}
