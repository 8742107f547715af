//! Topological invariant analysis: Betti numbers, cycles, layering, coupling

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

use crate::graph::GraphView;
use crate::layers::{LayerConfig, LayerViolation, ViolationKind};
use crate::model::SymbolId;

/// Per-independent-cycle penalty on the solid score.
pub const BETTI_WEIGHT: f32 = 5.0;
pub const MAX_BETTI_PENALTY: f32 = 40.0;
/// Applied to the coupling percentage (coupling_score × 100).
pub const COUPLING_WEIGHT: f32 = 0.5;
pub const MAX_COUPLING_PENALTY: f32 = 30.0;
/// Per-layer-violation penalty.
pub const VIOLATION_WEIGHT: f32 = 10.0;
pub const MAX_VIOLATION_PENALTY: f32 = 30.0;

/// Whole-graph triangle counting is skipped (reported as 0) above this
/// vertex count; neighborhood-scale subgraphs stay far below it.
pub const TRIANGLE_VERTEX_CAP: usize = 2_000;

/// Topological health metrics for a graph, produced by [`analyze`].
///
/// A pure function of the graph and the optional layer config: analyzing
/// the same inputs always yields an identical report, and all collections
/// are deterministically ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvariantReport {
    /// Weakly-connected component count.
    pub betti_0: usize,
    /// Independent cycle count: `E - V + betti_0` over distinct undirected
    /// edges.
    pub betti_1: usize,
    /// Unordered symbol triples with all three pairwise edges present,
    /// direction ignored.
    pub triangle_count: usize,
    /// Directed edge density: distinct (source, target) pairs over
    /// `V * (V - 1)`, self-loops excluded.
    pub coupling_score: f32,
    /// Composite health score in `[0, 100]`; weights are the fixed
    /// constants above.
    pub solid_score: f32,
    /// Each strongly connected component of size > 1 (or a self-loop) is
    /// one reported cycle listing its member ids in ascending order.
    /// Elementary cycles inside a component are not enumerated.
    pub cycles_detected: Vec<Vec<SymbolId>>,
    /// Empty when no layer config is supplied.
    pub layer_violations: Vec<LayerViolation>,
}

/// Compute the invariant report for a graph view.
pub fn analyze(view: &impl GraphView, layer_config: Option<&LayerConfig>) -> InvariantReport {
    let mut ids: Vec<SymbolId> = view.symbols().map(|s| s.id.clone()).collect();
    ids.sort();
    let index: HashMap<SymbolId, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), i))
        .collect();
    let v = ids.len();

    // Distinct directed pairs and distinct undirected endpoint pairs; edge
    // kind and multiplicity do not matter for topology.
    let mut directed: BTreeSet<(usize, usize)> = BTreeSet::new();
    let mut undirected: BTreeSet<(usize, usize)> = BTreeSet::new();
    for edge in view.edges() {
        let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) else {
            continue;
        };
        directed.insert((a, b));
        undirected.insert((a.min(b), a.max(b)));
    }

    let betti_0 = weak_components(v, &undirected);
    let betti_1 = (undirected.len() + betti_0).saturating_sub(v);

    let cycles_detected = detect_cycles(v, &directed, &ids);

    let triangle_count = if v > TRIANGLE_VERTEX_CAP {
        tracing::debug!(
            vertices = v,
            cap = TRIANGLE_VERTEX_CAP,
            "skipping triangle count above vertex cap"
        );
        0
    } else {
        count_triangles(v, &undirected)
    };

    let directed_simple = directed.iter().filter(|(a, b)| a != b).count();
    let coupling_score = if v > 1 {
        directed_simple as f32 / (v as f32 * (v as f32 - 1.0))
    } else {
        0.0
    };

    let mut layer_violations = Vec::new();
    if let Some(config) = layer_config {
        collect_upstream_violations(view, config, &directed, &ids, &mut layer_violations);
        collect_cycle_violations(view, config, &directed, &index, &cycles_detected, &mut layer_violations);
        layer_violations.sort_by(|a, b| {
            (&a.from_id, &a.to_id, a.violation_kind as u8)
                .cmp(&(&b.from_id, &b.to_id, b.violation_kind as u8))
        });
    }

    let betti_penalty = (betti_1 as f32 * BETTI_WEIGHT).min(MAX_BETTI_PENALTY);
    let coupling_penalty = (coupling_score * 100.0 * COUPLING_WEIGHT).min(MAX_COUPLING_PENALTY);
    let violation_penalty =
        (layer_violations.len() as f32 * VIOLATION_WEIGHT).min(MAX_VIOLATION_PENALTY);
    let solid_score = (100.0 - betti_penalty - coupling_penalty - violation_penalty).max(0.0);

    tracing::debug!(
        vertices = v,
        betti_0,
        betti_1,
        cycles = cycles_detected.len(),
        violations = layer_violations.len(),
        solid_score,
        "analyzed graph"
    );

    InvariantReport {
        betti_0,
        betti_1,
        triangle_count,
        coupling_score,
        solid_score,
        cycles_detected,
        layer_violations,
    }
}

/// Weakly-connected component count via union-find over undirected edges.
fn weak_components(v: usize, undirected: &BTreeSet<(usize, usize)>) -> usize {
    if v == 0 {
        return 0;
    }
    let mut uf: UnionFind<usize> = UnionFind::new(v);
    for &(a, b) in undirected {
        uf.union(a, b);
    }
    let roots: HashSet<usize> = (0..v).map(|i| uf.find(i)).collect();
    roots.len()
}

/// Strongly-connected-component decomposition; every SCC of size > 1 and
/// every self-loop is one cycle. Cycles and their members are sorted for
/// deterministic output.
fn detect_cycles(
    v: usize,
    directed: &BTreeSet<(usize, usize)>,
    ids: &[SymbolId],
) -> Vec<Vec<SymbolId>> {
    let mut graph = DiGraph::<(), ()>::with_capacity(v, directed.len());
    for _ in 0..v {
        graph.add_node(());
    }
    for &(a, b) in directed {
        graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
    }

    let mut cycles = Vec::new();
    for scc in tarjan_scc(&graph) {
        let is_cycle = scc.len() > 1
            || (scc.len() == 1 && directed.contains(&(scc[0].index(), scc[0].index())));
        if is_cycle {
            let mut members: Vec<SymbolId> =
                scc.iter().map(|idx| ids[idx.index()].clone()).collect();
            members.sort();
            cycles.push(members);
        }
    }
    cycles.sort();
    cycles
}

/// Brute-force triangle count over the undirected adjacency, self-loops
/// excluded. Acceptable at neighborhood scale; capped for whole graphs.
fn count_triangles(v: usize, undirected: &BTreeSet<(usize, usize)>) -> usize {
    let mut adjacency: Vec<HashSet<usize>> = vec![HashSet::new(); v];
    for &(a, b) in undirected {
        if a != b {
            adjacency[a].insert(b);
            adjacency[b].insert(a);
        }
    }
    let mut count = 0;
    for &(a, b) in undirected {
        if a == b {
            continue;
        }
        let (probe, other) = if adjacency[a].len() <= adjacency[b].len() {
            (&adjacency[a], &adjacency[b])
        } else {
            (&adjacency[b], &adjacency[a])
        };
        for &c in probe {
            if c > b && other.contains(&c) {
                count += 1;
            }
        }
    }
    count
}

fn collect_upstream_violations(
    view: &impl GraphView,
    config: &LayerConfig,
    directed: &BTreeSet<(usize, usize)>,
    ids: &[SymbolId],
    out: &mut Vec<LayerViolation>,
) {
    for &(a, b) in directed {
        if a == b {
            continue;
        }
        let (Some(from_sym), Some(to_sym)) = (view.symbol(&ids[a]), view.symbol(&ids[b])) else {
            continue;
        };
        let (Some(from_layer), Some(to_layer)) =
            (config.layer_of(from_sym), config.layer_of(to_sym))
        else {
            continue;
        };
        if !config.allows(from_layer, to_layer) {
            out.push(LayerViolation {
                from_id: ids[a].clone(),
                from_layer: Some(from_layer.name.clone()),
                to_id: ids[b].clone(),
                to_layer: Some(to_layer.name.clone()),
                violation_kind: ViolationKind::UpstreamDependency,
            });
        }
    }
}

/// One `Cycle` violation per detected cycle (not per edge), anchored on the
/// smallest directed edge inside the cycle.
fn collect_cycle_violations(
    view: &impl GraphView,
    config: &LayerConfig,
    directed: &BTreeSet<(usize, usize)>,
    index: &HashMap<SymbolId, usize>,
    cycles: &[Vec<SymbolId>],
    out: &mut Vec<LayerViolation>,
) {
    for cycle in cycles {
        let members: HashSet<usize> = cycle.iter().filter_map(|id| index.get(id).copied()).collect();
        let Some(&(a, b)) = directed
            .iter()
            .find(|(a, b)| members.contains(a) && members.contains(b))
        else {
            continue;
        };
        let from_id = cycle
            .iter()
            .find(|id| index.get(*id) == Some(&a))
            .cloned()
            .unwrap_or_else(|| cycle[0].clone());
        let to_id = cycle
            .iter()
            .find(|id| index.get(*id) == Some(&b))
            .cloned()
            .unwrap_or_else(|| cycle[0].clone());
        let from_layer = view
            .symbol(&from_id)
            .and_then(|s| config.layer_of(s))
            .map(|l| l.name.clone());
        let to_layer = view
            .symbol(&to_id)
            .and_then(|s| config.layer_of(s))
            .map(|l| l.name.clone());
        out.push(LayerViolation {
            from_id,
            from_layer,
            to_id,
            to_layer,
            violation_kind: ViolationKind::Cycle,
        });
    }
}
