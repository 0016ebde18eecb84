//! Deterministic spring layout.
//!
//! Fruchterman-Reingold force simulation over the undirected adjacency of an
//! [`EdgeGraph`]. Every pair of nodes repels with `k²/d`, every edge attracts
//! with `d²/k`, and the step size is capped by a temperature that cools
//! linearly to zero. Initial positions come from a seeded RNG, so the same
//! graph and options always produce the same arrangement.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::graph::EdgeGraph;

/// Default seed for initial positions.
pub const DEFAULT_SEED: u64 = 42;
/// Default number of simulation steps.
pub const DEFAULT_ITERATIONS: usize = 50;

/// Minimum distance used when two nodes overlap.
const MIN_DISTANCE: f64 = 0.01;
/// Mean displacement below which the simulation stops early.
const THRESHOLD: f64 = 1e-4;

/// A 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One position per node, in the order of [`EdgeGraph::nodes`].
pub type Layout = Vec<Position>;

/// Spring layout parameters.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// RNG seed for the initial placement.
    pub seed: u64,
    /// Maximum number of simulation steps.
    pub iterations: usize,
    /// Largest absolute coordinate after rescaling.
    pub scale: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            iterations: DEFAULT_ITERATIONS,
            scale: 1.0,
        }
    }
}

/// Compute a position for every node of the graph.
///
/// The result is centered on the origin with the largest absolute coordinate
/// equal to `options.scale`. An empty graph yields an empty layout and a
/// single node sits at the origin.
pub fn spring_layout(graph: &EdgeGraph, options: &LayoutOptions) -> Layout {
    let n = graph.node_count();
    match n {
        0 => return Vec::new(),
        1 => return vec![Position { x: 0.0, y: 0.0 }],
        _ => {}
    }

    let neighbors = graph.neighbors();

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>()]).collect();

    let k = (1.0 / n as f64).sqrt();
    let mut t = initial_temperature(&pos);
    let dt = t / (options.iterations as f64 + 1.0);

    let mut steps = 0;
    for _ in 0..options.iterations {
        steps += 1;
        let mut displacement = vec![[0.0f64; 2]; n];

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let (dx, dy, distance) = offset(&pos, i, j);
                let force = k * k / (distance * distance);
                displacement[i][0] += dx * force;
                displacement[i][1] += dy * force;
            }
            for &j in &neighbors[i] {
                let (dx, dy, distance) = offset(&pos, i, j);
                let force = distance / k;
                displacement[i][0] -= dx * force;
                displacement[i][1] -= dy * force;
            }
        }

        let mut moved = 0.0;
        for (p, d) in pos.iter_mut().zip(&displacement) {
            let length = (d[0] * d[0] + d[1] * d[1]).sqrt().max(MIN_DISTANCE);
            let step = [d[0] * t / length, d[1] * t / length];
            p[0] += step[0];
            p[1] += step[1];
            moved += (step[0] * step[0] + step[1] * step[1]).sqrt();
        }

        t -= dt;
        if moved / (n as f64) < THRESHOLD {
            break;
        }
    }

    debug!("Spring layout for {} nodes settled after {} steps", n, steps);
    rescale(pos, options.scale)
}

/// Vector from node `j` to node `i` and its length, floored at `MIN_DISTANCE`.
fn offset(pos: &[[f64; 2]], i: usize, j: usize) -> (f64, f64, f64) {
    let dx = pos[i][0] - pos[j][0];
    let dy = pos[i][1] - pos[j][1];
    (dx, dy, (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE))
}

fn initial_temperature(pos: &[[f64; 2]]) -> f64 {
    let extent = |axis: usize| {
        let (min, max) = pos.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[axis]), hi.max(p[axis]))
        });
        max - min
    };
    extent(0).max(extent(1)) * 0.1
}

/// Center on the origin and scale so the largest absolute coordinate equals `scale`.
fn rescale(pos: Vec<[f64; 2]>, scale: f64) -> Layout {
    let n = pos.len() as f64;
    let mean_x = pos.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = pos.iter().map(|p| p[1]).sum::<f64>() / n;

    let centered: Vec<[f64; 2]> = pos.iter().map(|p| [p[0] - mean_x, p[1] - mean_y]).collect();
    let limit = centered
        .iter()
        .flat_map(|p| [p[0].abs(), p[1].abs()])
        .fold(0.0f64, f64::max);

    let factor = if limit > 0.0 { scale / limit } else { 1.0 };
    centered
        .into_iter()
        .map(|p| Position {
            x: p[0] * factor,
            y: p[1] * factor,
        })
        .collect()
}
