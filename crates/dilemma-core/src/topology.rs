//! Pairing topologies for tournament matches
//!
//! A topology is an undirected simple graph over player indices; every edge
//! is one match. Without a topology every unordered pair plays once.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use crate::random::SeededRng;

/// Parameters of the directed scale-free growth model.
const ALPHA: f64 = 0.41;
const BETA: f64 = 0.54;
const DELTA_IN: f64 = 0.2;
const DELTA_OUT: f64 = 0.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopologyKind {
    /// Each pair linked independently with probability `connectivity`
    Random,
    /// Preferential attachment, collapsed to a simple undirected graph
    ScaleFree,
    /// Every pair linked
    Complete,
}

impl TopologyKind {
    /// Unrecognized names fall back to `Complete`
    pub fn from_name(name: &str) -> Self {
        match name {
            "random" => TopologyKind::Random,
            "scale_free" => TopologyKind::ScaleFree,
            "complete" => TopologyKind::Complete,
            other => {
                log::warn!("Unknown network type {:?}; using a complete graph", other);
                TopologyKind::Complete
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub connectivity: f64,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: "random".to_string(),
            connectivity: 0.5,
        }
    }
}

/// Undirected graph with a fixed node set `0..node_count`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairingGraph {
    node_count: usize,
    edges: BTreeSet<(usize, usize)>,
}

impl PairingGraph {
    pub fn empty(node_count: usize) -> Self {
        Self { node_count, edges: BTreeSet::new() }
    }

    pub fn complete(node_count: usize) -> Self {
        let mut graph = Self::empty(node_count);
        for (a, b) in round_robin_pairs(node_count) {
            graph.add_edge(a, b);
        }
        graph
    }

    /// Self-loops and out-of-range endpoints are ignored.
    /// Returns whether the edge is new.
    pub fn add_edge(&mut self, a: usize, b: usize) -> bool {
        if a == b || a >= self.node_count || b >= self.node_count {
            return false;
        }
        self.edges.insert((a.min(b), a.max(b)))
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_edge(&self, a: usize, b: usize) -> bool {
        self.edges.contains(&(a.min(b), a.max(b)))
    }

    /// Edges as `(low, high)` pairs in lexicographic order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges.iter().copied()
    }

    pub fn degree(&self, node: usize) -> usize {
        self.edges.iter().filter(|(a, b)| *a == node || *b == node).count()
    }
}

/// All unordered pairs `(i, j)` with `i < j`, `i` outermost
pub fn round_robin_pairs(node_count: usize) -> Vec<(usize, usize)> {
    (0..node_count)
        .flat_map(|i| (i + 1..node_count).map(move |j| (i, j)))
        .collect()
}

/// Colexicographic rank of a pair: `C(high, 2) + low`. Unique per pair,
/// independent of the number of players.
pub fn pair_rank(a: usize, b: usize) -> u64 {
    let (low, high) = (a.min(b) as u64, a.max(b) as u64);
    high * high.saturating_sub(1) / 2 + low
}

/// Build the pairing graph for `node_count` players
pub fn build_topology(
    node_count: usize,
    kind: TopologyKind,
    connectivity: f64,
    rng: &mut SeededRng,
) -> PairingGraph {
    let graph = match kind {
        TopologyKind::Random => random_graph(node_count, connectivity, rng),
        TopologyKind::ScaleFree => scale_free_graph(node_count, rng),
        TopologyKind::Complete => PairingGraph::complete(node_count),
    };
    log::info!("Network built with {} edges.", graph.edge_count());
    graph
}

fn random_graph(node_count: usize, connectivity: f64, rng: &mut SeededRng) -> PairingGraph {
    let mut graph = PairingGraph::empty(node_count);
    for (a, b) in round_robin_pairs(node_count) {
        if rng.chance(connectivity) {
            graph.add_edge(a, b);
        }
    }
    graph
}

/// Pick a node: with weight `delta` per node uniformly, otherwise
/// proportionally to how often it appears in `candidates`.
fn choose_node(candidates: &[usize], node_list: &[usize], delta: f64, rng: &mut SeededRng) -> usize {
    if delta > 0.0 {
        let bias_sum = node_list.len() as f64 * delta;
        let p_delta = bias_sum / (bias_sum + candidates.len() as f64);
        if rng.chance(p_delta) {
            return node_list[rng.next_range(node_list.len() as u32) as usize];
        }
    }
    candidates[rng.next_range(candidates.len() as u32) as usize]
}

/// Directed scale-free growth from a 3-cycle, read back as undirected
fn scale_free_graph(node_count: usize, rng: &mut SeededRng) -> PairingGraph {
    let mut graph = PairingGraph::empty(node_count);

    let seed_edges = [(0usize, 1usize), (1, 2), (2, 0)];
    let mut sources: Vec<usize> = seed_edges.iter().map(|e| e.0).collect();
    let mut targets: Vec<usize> = seed_edges.iter().map(|e| e.1).collect();
    let mut node_list: Vec<usize> = vec![0, 1, 2];
    for (a, b) in seed_edges {
        graph.add_edge(a, b);
    }

    while node_list.len() < node_count {
        let r = rng.next_f64();
        let (v, w) = if r < ALPHA {
            let v = node_list.len();
            node_list.push(v);
            let w = choose_node(&targets, &node_list, DELTA_IN, rng);
            (v, w)
        } else if r < ALPHA + BETA {
            let v = choose_node(&sources, &node_list, DELTA_OUT, rng);
            let w = choose_node(&targets, &node_list, DELTA_IN, rng);
            (v, w)
        } else {
            let v = choose_node(&sources, &node_list, DELTA_OUT, rng);
            let w = node_list.len();
            node_list.push(w);
            (v, w)
        };
        sources.push(v);
        targets.push(w);
        graph.add_edge(v, w);
    }

    graph
}
