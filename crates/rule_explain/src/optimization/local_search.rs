use super::{rank, BitVector, Fitness, Scored, SearchContext, SearchStrategy};
use crate::error::{Error, Result};
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::function::factorial::binomial;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSearchConfig {
    pub radius: usize,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

/// Hill climbing to a k-optimal vector, one trajectory per population member.
///
/// A step scores every vector reachable by flipping 1 to `radius` bits and
/// moves to the best one if it strictly beats the current score. Ties go to
/// the neighbour enumerated first: smaller flips before larger ones, then
/// lexicographic flip positions.
#[derive(Clone, Copy, Debug)]
pub struct TrajectorySearch {
    radius: usize,
}

impl TrajectorySearch {
    pub fn new(radius: usize) -> Result<Self> {
        if radius == 0 {
            return Err(Error::InvalidConfig(
                "local search radius must be at least 1".to_string(),
            ));
        }
        Ok(Self { radius })
    }

    pub fn from_config(config: &LocalSearchConfig) -> Result<Self> {
        Self::new(config.radius)
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Evaluations per step for vectors of `length` bits.
    pub fn neighbourhood_size(&self, length: usize) -> f64 {
        (1..=self.radius.min(length))
            .map(|i| binomial(length as u64, i as u64))
            .sum()
    }

    pub fn climb(&self, start: BitVector, fitness: &Fitness<'_>) -> Scored {
        let length = start.len();
        let radius = self.radius.min(length);
        let score = fitness(&start);
        let mut current = Scored::new(start, score);
        let mut steps = 0usize;

        loop {
            let mut best: Option<Scored> = None;
            for size in 1..=radius {
                for flips in (0..length).combinations(size) {
                    let mut bits = current.bits.clone();
                    for i in flips {
                        bits[i] = !bits[i];
                    }
                    let score = fitness(&bits);
                    let bar = best.as_ref().map_or(current.score, |b| b.score);
                    if score > bar {
                        best = Some(Scored::new(bits, score));
                    }
                }
            }
            match best {
                Some(next) => {
                    current = next;
                    steps += 1;
                }
                None => break,
            }
        }

        debug!(steps, score = current.score, "trajectory reached k-optimum");
        current
    }
}

impl SearchStrategy for TrajectorySearch {
    fn name(&self) -> &'static str {
        "local_search"
    }

    fn search(
        &self,
        population: Vec<BitVector>,
        length: usize,
        fitness: &Fitness<'_>,
        ctx: &mut SearchContext<'_>,
    ) -> Vec<Scored> {
        // Climbs are deterministic, so repeated starts would repeat the work
        let starts: Vec<BitVector> = population.into_iter().unique().collect();
        info!(
            radius = self.radius,
            trajectories = starts.len(),
            neighbourhood = self.neighbourhood_size(length),
            "starting local search"
        );
        let mut results: Vec<Scored> = ctx.pool.install(|| {
            starts
                .into_par_iter()
                .map(|start| self.climb(start, fitness))
                .collect()
        });
        rank(&mut results);
        results
    }
}
