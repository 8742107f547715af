//! Architectural layer configuration and violation reporting

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::model::{Symbol, SymbolId};

/// One architectural layer. Lower levels are "closer to the user" (e.g.
/// UI = 0); a layer may only depend on the levels listed in `allowed_deps`
/// plus itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub level: u32,
    #[serde(default)]
    pub allowed_deps: BTreeSet<u32>,
}

/// Maps symbols whose file path starts with `prefix` to `layer`.
/// The longest matching prefix wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRule {
    pub prefix: String,
    pub layer: String,
}

/// Externally supplied layering rules: the ordered layers themselves plus
/// how symbols are assigned to them. Immutable input; symbols matching no
/// rule are exempt from layer checking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub path_rules: Vec<PathRule>,
    #[serde(default)]
    pub overrides: HashMap<SymbolId, String>,
}

impl LayerConfig {
    /// Check internal consistency: unique names and levels, and
    /// `allowed_deps` referencing only existing, strictly lower levels.
    pub fn validate(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        let mut levels = BTreeSet::new();
        for layer in &self.layers {
            if !names.insert(layer.name.as_str()) {
                return Err(GraphError::InvalidInput(format!(
                    "duplicate layer name: {}",
                    layer.name
                )));
            }
            if !levels.insert(layer.level) {
                return Err(GraphError::InvalidInput(format!(
                    "duplicate layer level: {}",
                    layer.level
                )));
            }
        }
        for layer in &self.layers {
            for &dep in &layer.allowed_deps {
                if !levels.contains(&dep) {
                    return Err(GraphError::InvalidInput(format!(
                        "layer {} allows unknown level {}",
                        layer.name, dep
                    )));
                }
                if dep >= layer.level {
                    return Err(GraphError::InvalidInput(format!(
                        "layer {} (level {}) may only allow lower levels, got {}",
                        layer.name, layer.level, dep
                    )));
                }
            }
        }
        for rule in &self.path_rules {
            if self.layer_by_name(&rule.layer).is_none() {
                return Err(GraphError::InvalidInput(format!(
                    "path rule references unknown layer: {}",
                    rule.layer
                )));
            }
        }
        for layer_name in self.overrides.values() {
            if self.layer_by_name(layer_name).is_none() {
                return Err(GraphError::InvalidInput(format!(
                    "override references unknown layer: {layer_name}"
                )));
            }
        }
        Ok(())
    }

    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Resolve the layer of a symbol: explicit override first, then the
    /// longest path-prefix rule. `None` means the symbol is unassigned and
    /// exempt from layer checks.
    pub fn layer_of(&self, symbol: &Symbol) -> Option<&Layer> {
        if let Some(name) = self.overrides.get(&symbol.id) {
            return self.layer_by_name(name);
        }
        let path = symbol.file_path.to_string_lossy();
        self.path_rules
            .iter()
            .filter(|rule| path.starts_with(&rule.prefix))
            .max_by_key(|rule| rule.prefix.len())
            .and_then(|rule| self.layer_by_name(&rule.layer))
    }

    /// Whether a dependency from `from` to `to` respects the layering.
    /// Same-layer dependencies are always allowed.
    pub fn allows(&self, from: &Layer, to: &Layer) -> bool {
        from.name == to.name || from.allowed_deps.contains(&to.level)
    }

    /// All ordered (from, to) layer-name pairs that are forbidden.
    pub fn forbidden_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for from in &self.layers {
            for to in &self.layers {
                if !self.allows(from, to) {
                    pairs.push((from.name.clone(), to.name.clone()));
                }
            }
        }
        pairs
    }

    /// Human-readable rendering of each layer's contract, for inclusion in
    /// assembled task context.
    pub fn describe_constraints(&self) -> Vec<String> {
        let mut layers: Vec<&Layer> = self.layers.iter().collect();
        layers.sort_by_key(|l| l.level);
        layers
            .iter()
            .map(|layer| {
                if layer.allowed_deps.is_empty() {
                    format!("{} (level {}) may not depend on other layers", layer.name, layer.level)
                } else {
                    let deps: Vec<String> =
                        layer.allowed_deps.iter().map(|d| d.to_string()).collect();
                    format!(
                        "{} (level {}) may depend on levels {{{}}}",
                        layer.name,
                        layer.level,
                        deps.join(", ")
                    )
                }
            })
            .collect()
    }
}

/// How a dependency edge breaks the layering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// An edge pointing at a layer the source layer is not allowed to use.
    UpstreamDependency,
    /// An edge participating in a dependency cycle.
    Cycle,
}

/// A dependency edge crossing an architectural boundary in a disallowed
/// direction, or closing a cycle. Layer names are absent for endpoints that
/// no assignment rule covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerViolation {
    pub from_id: SymbolId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_layer: Option<String>,
    pub to_id: SymbolId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_layer: Option<String>,
    pub violation_kind: ViolationKind,
}
