//! Seed-driven bounded neighborhood assembly ("star neighborhood")

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::{Direction, GraphView, SymbolGraph};
use crate::invariants::analyze;
use crate::layers::LayerConfig;
use crate::model::{ByteRange, SymbolId, SymbolKind};

/// One symbol inside an assembled neighborhood.
///
/// `code` is left empty by assembly itself; filling it from disk is the
/// hydration collaborator's job, keeping this module free of I/O.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiniSymbol {
    pub id: SymbolId,
    pub name: String,
    pub file_path: PathBuf,
    pub kind: SymbolKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub byte_range: ByteRange,
    /// Normalized sum of adjacent edge strengths within the neighborhood;
    /// a ranking signal only, never used for traversal.
    pub importance: f32,
    pub in_cycle: bool,
}

/// Topological context handed to the agent alongside the symbols.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodInvariants {
    pub betti_1: usize,
    pub forbidden_dependencies: Vec<String>,
    pub layer_constraints: Vec<String>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodMetadata {
    pub depth: usize,
    pub strength_threshold: f32,
    pub total_symbols_in_graph: usize,
    pub solid_score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,
}

/// The minimal, depth- and strength-bounded context assembled around seed
/// symbols for one agent task. Ephemeral: created per task, discarded after
/// use, and never feeds back into the graph it was assembled from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiniCodebase {
    pub seed_symbols: Vec<SymbolId>,
    /// Sorted by descending importance.
    pub symbols: Vec<MiniSymbol>,
    pub files: Vec<PathBuf>,
    pub invariants: NeighborhoodInvariants,
    pub metadata: NeighborhoodMetadata,
}

/// Assemble the bounded neighborhood around `seed_ids`.
///
/// Multi-source BFS over both edge directions starting at the seeds
/// (distance 0); only edges with `strength >= strength_threshold` are
/// followed, and expansion stops once the frontier empties or the distance
/// would exceed `depth`. Seeds are always included regardless of threshold;
/// `depth == 0` returns exactly the seeds.
pub fn assemble(
    graph: &SymbolGraph,
    seed_ids: &[SymbolId],
    depth: usize,
    strength_threshold: f32,
    layer_config: Option<&LayerConfig>,
    issue_id: Option<&str>,
) -> Result<MiniCodebase> {
    if seed_ids.is_empty() {
        return Err(GraphError::EmptySeed);
    }
    if !(0.0..=1.0).contains(&strength_threshold) {
        return Err(GraphError::InvalidInput(format!(
            "strength threshold {strength_threshold} outside [0, 1]"
        )));
    }
    for seed in seed_ids {
        if !graph.contains(seed) {
            return Err(GraphError::DanglingReference(seed.clone()));
        }
    }

    let mut distance: HashMap<SymbolId, usize> = HashMap::new();
    let mut frontier: VecDeque<(SymbolId, usize)> = VecDeque::new();
    for seed in seed_ids {
        if !distance.contains_key(seed) {
            distance.insert(seed.clone(), 0);
            frontier.push_back((seed.clone(), 0));
        }
    }

    while let Some((id, dist)) = frontier.pop_front() {
        if dist >= depth {
            continue;
        }
        for (edge, neighbor) in graph.neighbors(&id, Direction::Both) {
            if edge.strength < strength_threshold {
                continue;
            }
            if !distance.contains_key(neighbor) {
                distance.insert(neighbor.clone(), dist + 1);
                frontier.push_back((neighbor.clone(), dist + 1));
            }
        }
    }

    let members: HashSet<SymbolId> = distance.keys().cloned().collect();
    let sub = graph.subgraph(&members);
    let report = analyze(&sub, layer_config);

    let in_cycle: HashSet<&SymbolId> = report.cycles_detected.iter().flatten().collect();

    // Importance: per-symbol sum of adjacent edge strengths inside the
    // neighborhood, normalized against the neighborhood maximum.
    let mut strength_sums: HashMap<SymbolId, f32> = HashMap::new();
    for edge in sub.edges() {
        *strength_sums.entry(edge.source.clone()).or_default() += edge.strength;
        *strength_sums.entry(edge.target.clone()).or_default() += edge.strength;
    }
    let max_sum = strength_sums.values().fold(0.0_f32, |acc, &s| acc.max(s));

    let mut symbols: Vec<MiniSymbol> = Vec::with_capacity(members.len());
    let mut files: BTreeSet<PathBuf> = BTreeSet::new();
    for id in &members {
        let Some(symbol) = graph.symbol(id) else {
            continue;
        };
        files.insert(symbol.file_path.clone());
        let raw = strength_sums.get(id).copied().unwrap_or(0.0);
        symbols.push(MiniSymbol {
            id: id.clone(),
            name: symbol.name.clone(),
            file_path: symbol.file_path.clone(),
            kind: symbol.kind,
            code: None,
            byte_range: symbol.byte_range,
            importance: if max_sum > 0.0 { raw / max_sum } else { 0.0 },
            in_cycle: in_cycle.contains(id),
        });
    }
    symbols.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut notes = Vec::new();
    if !report.cycles_detected.is_empty() {
        notes.push(format!(
            "{} symbols participate in {} dependency cycles",
            in_cycle.len(),
            report.cycles_detected.len()
        ));
    }
    if !report.layer_violations.is_empty() {
        notes.push(format!(
            "{} layer violations present in this neighborhood",
            report.layer_violations.len()
        ));
    }

    let mut seed_symbols: Vec<SymbolId> = seed_ids.to_vec();
    seed_symbols.sort();
    seed_symbols.dedup();

    tracing::debug!(
        seeds = seed_symbols.len(),
        depth,
        strength_threshold,
        collected = symbols.len(),
        "assembled neighborhood"
    );

    Ok(MiniCodebase {
        seed_symbols,
        symbols,
        files: files.into_iter().collect(),
        invariants: NeighborhoodInvariants {
            betti_1: report.betti_1,
            forbidden_dependencies: layer_config
                .map(|c| {
                    c.forbidden_pairs()
                        .into_iter()
                        .map(|(from, to)| format!("{from} -> {to}"))
                        .collect()
                })
                .unwrap_or_default(),
            layer_constraints: layer_config
                .map(LayerConfig::describe_constraints)
                .unwrap_or_default(),
            notes,
        },
        metadata: NeighborhoodMetadata {
            depth,
            strength_threshold,
            total_symbols_in_graph: graph.symbol_count(),
            solid_score: report.solid_score,
            issue_id: issue_id.map(str::to_string),
        },
    })
}
