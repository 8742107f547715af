//! Integration tests for Trellis
//!
//! These tests exercise the full path a pipeline takes: extraction JSON in,
//! graph built, neighborhood assembled and hydrated, candidate edits
//! virtually applied, verdict serialized back out.

use std::fs;

use trellis_core::{
    Edit, ExtractionBundle, LayerConfig, SymbolId, analyze, assemble, build_graph, validate,
};

const EXTRACTION: &str = r#"{
    "symbols": [
        {
            "id": "src/ui/view.rs::render",
            "name": "render",
            "kind": "Function",
            "file_path": "src/ui/view.rs",
            "byte_range": { "start": 0, "end": 14 },
            "line_start": 1,
            "line_end": 1
        },
        {
            "id": "src/logic/service.rs::plan",
            "name": "plan",
            "kind": "Function",
            "file_path": "src/logic/service.rs",
            "byte_range": { "start": 0, "end": 12 },
            "line_start": 1,
            "line_end": 1
        },
        {
            "id": "src/data/store.rs::fetch",
            "name": "fetch",
            "kind": "Function",
            "file_path": "src/data/store.rs",
            "byte_range": { "start": 0, "end": 13 },
            "line_start": 1,
            "line_end": 1
        }
    ],
    "edges": [
        {
            "source": "src/data/store.rs::fetch",
            "target": "src/logic/service.rs::plan",
            "kind": "Calls",
            "strength": 0.9
        },
        {
            "source": "src/logic/service.rs::plan",
            "target": "src/ui/view.rs::render",
            "kind": "Calls",
            "strength": 0.8
        }
    ]
}"#;

const LAYER_TOML: &str = r#"
[[layers]]
name = "UI"
level = 0
allowed_deps = []

[[layers]]
name = "Logic"
level = 1
allowed_deps = [0]

[[layers]]
name = "Data"
level = 2
allowed_deps = [1]

[[path_rules]]
prefix = "src/ui/"
layer = "UI"

[[path_rules]]
prefix = "src/logic/"
layer = "Logic"

[[path_rules]]
prefix = "src/data/"
layer = "Data"
"#;

fn load() -> trellis_core::SymbolGraph {
    let bundle: ExtractionBundle = serde_json::from_str(EXTRACTION).unwrap();
    let outcome = build_graph(bundle);
    assert!(outcome.is_clean(), "issues: {:?}", outcome.issues);
    outcome.graph
}

#[test]
fn extraction_feeds_a_clean_analysis() {
    let graph = load();
    let config: LayerConfig = toml::from_str(LAYER_TOML).unwrap();
    config.validate().unwrap();

    let report = analyze(&graph, Some(&config));
    assert_eq!(report.betti_0, 1);
    assert_eq!(report.betti_1, 0);
    assert!(report.cycles_detected.is_empty());
    assert!(report.layer_violations.is_empty());
    assert_eq!(report.solid_score, 100.0 - report.coupling_score * 100.0 * 0.5);
}

#[test]
fn assembled_neighborhood_hydrates_from_disk() {
    let graph = load();

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src/ui")).unwrap();
    fs::create_dir_all(root.join("src/logic")).unwrap();
    fs::create_dir_all(root.join("src/data")).unwrap();
    fs::write(root.join("src/ui/view.rs"), "fn render() {}").unwrap();
    fs::write(root.join("src/logic/service.rs"), "fn plan() {}").unwrap();
    fs::write(root.join("src/data/store.rs"), "fn fetch() {}").unwrap();

    let seeds = [SymbolId::from("src/logic/service.rs::plan")];
    let mut mini = assemble(&graph, &seeds, 1, 0.5, None, Some("issue-7")).unwrap();
    assert_eq!(mini.symbols.len(), 3);
    assert_eq!(mini.metadata.issue_id.as_deref(), Some("issue-7"));

    let hydrated = trellis_hydrate::hydrate(&mut mini, root);
    assert_eq!(hydrated, 3);
    let plan = mini
        .symbols
        .iter()
        .find(|s| s.name == "plan")
        .unwrap();
    assert_eq!(plan.code.as_deref(), Some("fn plan() {}"));

    // the serialized form is what the context-hydration layer consumes
    let json = serde_json::to_string_pretty(&mini).unwrap();
    assert!(json.contains("\"seed_symbols\""));
    assert!(json.contains("fn plan() {}"));
}

#[test]
fn cycle_closing_edit_is_rejected_end_to_end() {
    let graph = load();
    let config: LayerConfig = toml::from_str(LAYER_TOML).unwrap();

    // the candidate closes render → fetch, creating a cycle and an
    // upstream UI → Data dependency at once
    let edits: Vec<Edit> = serde_json::from_str(
        r#"[
            {
                "file_path": "src/ui/view.rs",
                "operation": "modify",
                "new_edges": [
                    {
                        "source": "src/ui/view.rs::render",
                        "target": "src/data/store.rs::fetch",
                        "kind": "Calls",
                        "strength": 1.0
                    }
                ]
            }
        ]"#,
    )
    .unwrap();

    let result = validate(&graph, Some(&config), &edits, None);
    assert!(!result.is_safe);
    assert!(result.introduces_cycles);
    assert_eq!(result.original_betti_1, 0);
    assert_eq!(result.new_betti_1, 1);
    assert!(!result.layer_violations.is_empty());
    assert!(result.errors.is_empty());

    // the consensus layer receives a serializable verdict
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"is_safe\":false"));

    // the base graph is untouched by the rejected candidate
    assert_eq!(graph.edge_count(), 2);
    assert!(analyze(&graph, Some(&config)).cycles_detected.is_empty());
}
