//! CLI command implementations

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use trellis_core::{
    Edit, ExtractionBundle, LayerConfig, SymbolGraph, SymbolId, SymbolIndex, build_graph,
};

pub fn analyze(graph_path: &Path, layers_path: Option<&Path>) -> Result<()> {
    let graph = load_graph(graph_path)?;
    let config = load_layers(layers_path)?;

    let report = trellis_core::analyze(&graph, config.as_ref());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn assemble(
    graph_path: &Path,
    seeds: &[String],
    depth: usize,
    threshold: f32,
    layers_path: Option<&Path>,
    issue_id: Option<&str>,
    hydrate_root: Option<&Path>,
) -> Result<()> {
    let graph = load_graph(graph_path)?;
    let config = load_layers(layers_path)?;
    let seed_ids = resolve_seeds(&graph, seeds)?;

    let mut mini =
        trellis_core::assemble(&graph, &seed_ids, depth, threshold, config.as_ref(), issue_id)?;
    if let Some(root) = hydrate_root {
        let hydrated = trellis_hydrate::hydrate(&mut mini, root);
        tracing::info!(hydrated, total = mini.symbols.len(), "hydrated symbol code");
    }

    println!("{}", serde_json::to_string_pretty(&mini)?);
    Ok(())
}

/// Returns whether the candidate is safe; the caller turns a red flag into
/// a nonzero exit code.
pub fn validate(
    graph_path: &Path,
    edits_path: &Path,
    layers_path: Option<&Path>,
    previous_betti: Option<usize>,
) -> Result<bool> {
    let graph = load_graph(graph_path)?;
    let config = load_layers(layers_path)?;
    let edits: Vec<Edit> = serde_json::from_str(
        &fs::read_to_string(edits_path)
            .with_context(|| format!("reading {}", edits_path.display()))?,
    )
    .context("parsing edits JSON")?;

    let result = trellis_core::validate(&graph, config.as_ref(), &edits, previous_betti);
    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.is_safe {
        tracing::warn!(
            errors = result.errors.len(),
            introduces_cycles = result.introduces_cycles,
            new_violations = result.layer_violations.len(),
            "candidate edit red-flagged"
        );
    }
    Ok(result.is_safe)
}

fn load_graph(path: &Path) -> Result<SymbolGraph> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let bundle: ExtractionBundle =
        serde_json::from_str(&text).context("parsing extraction JSON")?;

    let outcome = build_graph(bundle);
    for issue in &outcome.issues {
        tracing::warn!(%issue, "rejected extraction item");
    }
    tracing::info!(
        symbols = outcome.graph.symbol_count(),
        edges = outcome.graph.edge_count(),
        "loaded symbol graph"
    );
    Ok(outcome.graph)
}

fn load_layers(path: Option<&Path>) -> Result<Option<LayerConfig>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: LayerConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&text).context("parsing layer TOML")?,
        _ => serde_json::from_str(&text).context("parsing layer JSON")?,
    };
    config.validate()?;
    Ok(Some(config))
}

/// Resolve each seed reference: an exact symbol id wins, otherwise a bare
/// name is looked up and must be unambiguous.
fn resolve_seeds(graph: &SymbolGraph, seeds: &[String]) -> Result<Vec<SymbolId>> {
    let index = SymbolIndex::from_graph(graph);
    let mut resolved = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let as_id = SymbolId::from(seed.as_str());
        if graph.contains(&as_id) {
            resolved.push(as_id);
            continue;
        }
        let mut candidates = index.lookup_name(seed);
        match candidates.len() {
            0 => bail!("unknown seed symbol: {seed}"),
            1 => resolved.push(candidates.remove(0)),
            n => {
                candidates.sort();
                bail!(
                    "ambiguous seed name {seed} ({n} matches, e.g. {})",
                    candidates[0]
                );
            }
        }
    }
    Ok(resolved)
}
