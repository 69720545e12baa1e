/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kkr_rs::calculations::geometry::structure_parameters;
use kkr_rs::params::inputcard::{parse, render};
use kkr_rs::params::{KeyScope, ParamValue, ParameterSet};
use kkr_rs::provenance::{
    find_parent_structure, CalcInputs, CalculationKind, FolderId, ProvenanceGraph, MAX_PARENT_HOPS,
};
use kkr_rs::structure::{StructureDescriptor, Vector3D};

fn bcc_fe() -> StructureDescriptor {
    let a = 2.87;
    let mut fe = StructureDescriptor::new([
        Vector3D::new(a, 0.0, 0.0),
        Vector3D::new(0.0, a, 0.0),
        Vector3D::new(0.0, 0.0, a),
    ]);
    fe.append_atom(Vector3D::origin(), "Fe").unwrap();
    fe.append_atom(Vector3D::new(0.5 * a, 0.5 * a, 0.5 * a), "Fe").unwrap();
    fe
}

fn chain(length: usize) -> (ProvenanceGraph, FolderId) {
    let mut graph = ProvenanceGraph::new();
    let structure = graph.add_structure(bcc_fe());
    let voro = graph
        .add_calculation(
            CalculationKind::Voronoi,
            "voronoi",
            CalcInputs {
                structure: Some(structure),
                ..Default::default()
            },
        )
        .unwrap();
    let mut folder = graph.add_output_folder(voro, "localhost", "/w/0").unwrap();
    for i in 1..length {
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
    (graph, folder)
}

fn resolver_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Structure Resolution");

    for length in [1, 10, MAX_PARENT_HOPS] {
        let (graph, tip) = chain(length);
        group.bench_function(format!("chain_{}", length), |b| {
            b.iter(|| black_box(find_parent_structure(black_box(&graph), tip).unwrap()))
        });
    }

    group.finish();
}

fn inputcard_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Inputcard");

    let params = ParameterSet::from_map([
        ("LMAX", ParamValue::Int(3)),
        ("NSPIN", ParamValue::Int(2)),
        ("RMAX", ParamValue::Float(10.0)),
        ("GMAX", ParamValue::Float(100.0)),
    ])
    .unwrap()
    .fill_defaults(KeyScope::Calculation)
    .0
    .merged_with(&structure_parameters(&bcc_fe()).unwrap());
    let text = render(&params);

    group.bench_function("render", |b| b.iter(|| black_box(render(black_box(&params)))));
    group.bench_function("parse", |b| b.iter(|| black_box(parse(black_box(&text)).unwrap())));

    group.finish();
}

criterion_group!(benches, resolver_benchmark, inputcard_benchmark);
criterion_main!(benches);
