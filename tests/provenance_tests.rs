/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

mod common;

use common::{chain, converged_graph};
use kkr_rs::provenance::{
    find_parent_structure, find_parent_structure_within, CalcInputs, CalcStatus, CalculationKind,
    ProvenanceError, ProvenanceGraph, WalkStop, MAX_PARENT_HOPS,
};
use rstest::rstest;
use tempfile::TempDir;

#[rstest]
#[case(1)]
#[case(2)]
#[case(10)]
#[case(MAX_PARENT_HOPS + 1)]
fn test_resolves_structure_at_chain_root(#[case] length: usize) {
    let (graph, structure, tip) = chain(length);
    let found = find_parent_structure(&graph, tip).unwrap();
    assert_eq!(found.structure, structure);
    assert_eq!(found.hops, length - 1);
    assert_eq!(graph.record(found.voronoi).unwrap().kind, CalculationKind::Voronoi);
}

#[test]
fn test_resolution_from_an_intermediate_folder() {
    let (graph, structure, _) = chain(8);
    // Folder 3 is the output of the fourth record of the chain
    let folder = graph
        .records()
        .nth(3)
        .and_then(|r| r.outputs.remote_folder)
        .unwrap();
    let found = find_parent_structure(&graph, folder).unwrap();
    assert_eq!(found.structure, structure);
    assert_eq!(found.hops, 3);
}

#[rstest]
#[case(6, 0)]
#[case(6, 2)]
#[case(6, 5)]
fn test_structure_at_depth(#[case] length: usize, #[case] depth: usize) {
    // Record `length - 1 - depth` carries the structure; the others only link parents
    let mut graph = ProvenanceGraph::new();
    let structure = graph.add_structure(common::cu_fcc());
    let carrier = length - 1 - depth;
    let mut parent = None;
    for i in 0..length {
        let kind = if i == carrier {
            CalculationKind::Voronoi
        } else {
            CalculationKind::Kkr
        };
        let inputs = CalcInputs {
            structure: (i == carrier).then_some(structure),
            parent_folder: parent,
            ..Default::default()
        };
        let calc = graph.add_calculation(kind, "step", inputs).unwrap();
        parent = Some(
            graph
                .add_output_folder(calc, "localhost", format!("/w/{}", i))
                .unwrap(),
        );
    }

    let found = find_parent_structure(&graph, parent.unwrap()).unwrap();
    assert_eq!(found.structure, structure);
    assert_eq!(found.hops, depth);
}

#[test]
fn test_too_long_chain_hits_the_bound() {
    let (graph, _, tip) = chain(MAX_PARENT_HOPS + 2);
    match find_parent_structure(&graph, tip) {
        Err(ProvenanceError::StructureNotFound { hops, stop, .. }) => {
            assert_eq!(hops, MAX_PARENT_HOPS);
            assert_eq!(stop, WalkStop::HopLimit);
        }
        other => panic!("expected StructureNotFound, got {:?}", other),
    }
}

#[test]
fn test_cycle_is_detected() {
    let mut graph = ProvenanceGraph::new();
    let loose = graph.add_folder("localhost", "/w/b");
    let a = graph
        .add_calculation(
            CalculationKind::Kkr,
            "a",
            CalcInputs {
                parent_folder: Some(loose),
                ..Default::default()
            },
        )
        .unwrap();
    let folder_a = graph.add_output_folder(a, "localhost", "/w/a").unwrap();
    let b = graph
        .add_calculation(
            CalculationKind::Kkr,
            "b",
            CalcInputs {
                parent_folder: Some(folder_a),
                ..Default::default()
            },
        )
        .unwrap();
    graph.attach_output_folder(b, loose).unwrap();

    match find_parent_structure(&graph, folder_a) {
        Err(ProvenanceError::StructureNotFound { hops, stop, .. }) => {
            assert_eq!(stop, WalkStop::Cycle);
            assert_eq!(hops, 2);
        }
        other => panic!("expected a cycle, got {:?}", other),
    }
}

#[test]
fn test_structureless_chain_fails_within_bound() {
    let mut graph = ProvenanceGraph::new();
    let root = graph
        .add_calculation(CalculationKind::Kkr, "root", CalcInputs::default())
        .unwrap();
    let mut folder = graph.add_output_folder(root, "localhost", "/w/0").unwrap();
    for i in 1..5 {
        let calc = graph
            .add_calculation(
                CalculationKind::Kkr,
                "kkr",
                CalcInputs {
                    parent_folder: Some(folder),
                    ..Default::default()
                },
            )
            .unwrap();
        folder = graph
            .add_output_folder(calc, "localhost", format!("/w/{}", i))
            .unwrap();
    }

    assert!(matches!(
        find_parent_structure(&graph, folder),
        Err(ProvenanceError::StructureNotFound {
            hops: 4,
            stop: WalkStop::ChainEnds,
            ..
        })
    ));
    assert!(matches!(
        find_parent_structure_within(&graph, folder, 2),
        Err(ProvenanceError::StructureNotFound {
            hops: 2,
            stop: WalkStop::HopLimit,
            ..
        })
    ));
}

#[test]
fn test_folder_without_producer() {
    let mut graph = ProvenanceGraph::new();
    let folder = graph.add_folder("cluster", "/scratch/imported");
    assert!(matches!(
        find_parent_structure(&graph, folder),
        Err(ProvenanceError::UniquenessViolation(_))
    ));
}

#[test]
fn test_graph_persists_to_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("provenance.json");
    let (graph, folder, kkr) = converged_graph(0.68);
    graph.save(&path).unwrap();

    let loaded = ProvenanceGraph::load(&path).unwrap();
    assert_eq!(loaded.num_records(), 2);
    assert_eq!(loaded.producer_of(folder).unwrap(), kkr);
    let record = loaded.record(kkr).unwrap();
    assert_eq!(record.status, CalcStatus::FinishedOk);
    assert_eq!(record.results().and_then(|r| r.fermi_energy()), Some(0.68));
    assert_eq!(find_parent_structure(&loaded, folder).unwrap().hops, 1);
}

#[test]
fn test_missing_store_starts_empty() {
    let dir = TempDir::new().unwrap();
    let graph = ProvenanceGraph::load_or_default(dir.path().join("absent.json")).unwrap();
    assert_eq!(graph.num_records(), 0);
}
