//! Non-destructive "virtual apply" validation of proposed edits

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::{GraphView, SymbolGraph};
use crate::invariants::{InvariantReport, analyze};
use crate::layers::{LayerConfig, LayerViolation};
use crate::model::{Edge, SymbolId};
use crate::overlay::{Edit, GraphOverlay};

/// The comparable verdict for one candidate edit set.
///
/// Every call terminates in one of three states: collision-rejected (a new
/// symbol id collides with a live one; nothing is analyzed), safe, or
/// red-flagged. Internal failures are folded into `errors` instead of being
/// raised, so a consensus layer scoring k candidates always gets k
/// comparable values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_safe: bool,
    pub original_betti_1: usize,
    pub new_betti_1: usize,
    pub introduces_cycles: bool,
    /// Layer violations introduced by the edit; violations already present
    /// in the base graph are tolerated and not listed here.
    pub layer_violations: Vec<LayerViolation>,
    pub new_symbols: Vec<SymbolId>,
    pub new_dependencies: Vec<Edge>,
    /// Newly introduced edges whose endpoints sit in different files.
    /// Surfaced as warnings, never failures.
    pub cross_file_issues: Vec<Edge>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn rejected(error: GraphError) -> Self {
        ValidationResult {
            is_safe: false,
            original_betti_1: 0,
            new_betti_1: 0,
            introduces_cycles: false,
            layer_violations: Vec::new(),
            new_symbols: Vec::new(),
            new_dependencies: Vec::new(),
            cross_file_issues: Vec::new(),
            warnings: Vec::new(),
            errors: vec![error.to_string()],
        }
    }
}

/// Validate a proposed edit set against a base graph.
///
/// Builds a private overlay (the base graph is never mutated), analyzes
/// base and overlay, and diffs the reports. `previous_betti_1`, when
/// supplied, replaces the base report's value in the cycle comparison
/// (for callers tracking the betti baseline across a session), while
/// `original_betti_1` always reports the base graph's actual value.
pub fn validate(
    base: &SymbolGraph,
    layer_config: Option<&LayerConfig>,
    edits: &[Edit],
    previous_betti_1: Option<usize>,
) -> ValidationResult {
    let overlay = match GraphOverlay::from_edits(base, edits) {
        Ok(overlay) => overlay,
        Err(error) => return ValidationResult::rejected(error),
    };
    let base_report = analyze(base, layer_config);
    finish(base, &base_report, layer_config, overlay, previous_betti_1)
}

/// Like [`validate`], but reusing a cached report for the base graph.
pub fn validate_with_report(
    base: &SymbolGraph,
    base_report: &InvariantReport,
    layer_config: Option<&LayerConfig>,
    edits: &[Edit],
    previous_betti_1: Option<usize>,
) -> ValidationResult {
    let overlay = match GraphOverlay::from_edits(base, edits) {
        Ok(overlay) => overlay,
        Err(error) => return ValidationResult::rejected(error),
    };
    finish(base, base_report, layer_config, overlay, previous_betti_1)
}

/// Validate k candidate edit sets in parallel over one shared base report.
///
/// Each candidate owns a private overlay, so the evaluations are fully
/// independent; results come back in input order regardless of
/// interleaving.
pub fn validate_many(
    base: &SymbolGraph,
    layer_config: Option<&LayerConfig>,
    candidates: &[Vec<Edit>],
) -> Vec<ValidationResult> {
    let base_report = analyze(base, layer_config);
    candidates
        .par_iter()
        .map(|edits| validate_with_report(base, &base_report, layer_config, edits, None))
        .collect()
}

fn finish(
    base: &SymbolGraph,
    base_report: &InvariantReport,
    layer_config: Option<&LayerConfig>,
    overlay: GraphOverlay<'_>,
    previous_betti_1: Option<usize>,
) -> ValidationResult {
    let new_report = analyze(&overlay, layer_config);

    let baseline = previous_betti_1.unwrap_or(base_report.betti_1);
    let introduces_cycles = new_report.betti_1 > baseline;

    let new_violations: Vec<LayerViolation> = new_report
        .layer_violations
        .iter()
        .filter(|v| !base_report.layer_violations.contains(v))
        .cloned()
        .collect();

    let mut warnings = Vec::new();
    let mut missing_removals: Vec<&SymbolId> = overlay
        .removed_ids()
        .iter()
        .filter(|id| !base.contains(id))
        .collect();
    missing_removals.sort();
    for id in missing_removals {
        warnings.push(format!("removed symbol not present in base graph: {id}"));
    }

    let cross_file_issues: Vec<Edge> = overlay
        .new_edges()
        .iter()
        .filter(|edge| {
            let source_file = overlay.symbol(&edge.source).map(|s| &s.file_path);
            let target_file = overlay.symbol(&edge.target).map(|s| &s.file_path);
            matches!((source_file, target_file), (Some(a), Some(b)) if a != b)
        })
        .cloned()
        .collect();
    for edge in &cross_file_issues {
        warnings.push(format!(
            "new cross-file dependency: {} -> {}",
            edge.source, edge.target
        ));
    }

    let is_safe = !introduces_cycles && new_violations.is_empty();

    tracing::debug!(
        is_safe,
        introduces_cycles,
        original_betti_1 = base_report.betti_1,
        new_betti_1 = new_report.betti_1,
        new_violations = new_violations.len(),
        "validated candidate edit"
    );

    ValidationResult {
        is_safe,
        original_betti_1: base_report.betti_1,
        new_betti_1: new_report.betti_1,
        introduces_cycles,
        layer_violations: new_violations,
        new_symbols: overlay.new_symbol_ids(),
        new_dependencies: overlay.new_edges().to_vec(),
        cross_file_issues,
        warnings,
        errors: Vec::new(),
    }
}
