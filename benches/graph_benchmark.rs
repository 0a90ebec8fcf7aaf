// Benchmarks for graph queries and hybrid recommendation
use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hybridrec::{ActionKind, EngineConfig, ProductId, RecommendationService, SimilarityGraph, UserId};
use rand::prelude::*;
use rand::rngs::StdRng;

fn generate_graph(products: u64, edges_per_product: usize, rng: &mut StdRng) -> SimilarityGraph {
    let mut graph = SimilarityGraph::new();
    for id in 0..products {
        graph.add_product(ProductId::from(id));
    }
    for id in 0..products {
        for _ in 0..edges_per_product {
            let other = rng.random_range(0..products);
            if other != id {
                graph.add_edge(ProductId::from(id), ProductId::from(other), rng.random_range(0.0f32..1.0));
            }
        }
    }
    graph
}

fn generate_service(products: u64, users: usize, rng: &mut StdRng) -> RecommendationService {
    let service = RecommendationService::new(EngineConfig::default()).unwrap();
    for id in 0..products {
        let category = format!("cat{}", id % 10);
        if id < 10 {
            service.add_category(&category, &category, None).unwrap();
        }
        service.add_product_to_category(ProductId::from(id), &category).unwrap();
    }
    for id in 0..products {
        for _ in 0..4 {
            let other = rng.random_range(0..products);
            if other != id {
                service
                    .add_similarity(ProductId::from(id), ProductId::from(other), rng.random_range(0.0f32..1.0))
                    .unwrap();
            }
        }
    }
    let actions = [ActionKind::View, ActionKind::CartAdd, ActionKind::Purchase, ActionKind::Rating];
    let now = Utc::now();
    for user in 0..users {
        for _ in 0..20 {
            let item = ProductId::from(rng.random_range(0..products));
            let action = actions[rng.random_range(0..actions.len())];
            let rating = rng.random_range(1.0f32..5.0);
            let at = now - Duration::hours(rng.random_range(0..300));
            service
                .record_interaction_at(UserId::new(format!("user{}", user)), item, rating, action, at)
                .unwrap();
        }
    }
    service
}

fn benchmark_graph_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph");
    let mut rng = StdRng::seed_from_u64(42);

    for size in [1_000u64, 10_000].iter() {
        let graph = generate_graph(*size, 8, &mut rng);
        let origin = ProductId::from(0u64);
        let target = ProductId::from(size / 2);

        group.bench_with_input(BenchmarkId::new("neighbors", size), size, |b, _| {
            b.iter(|| black_box(graph.neighbors(&origin, 0.3, Some(10))));
        });
        group.bench_with_input(BenchmarkId::new("k_hop_transitive", size), size, |b, _| {
            b.iter(|| black_box(graph.k_hop_similarity(&origin, 10, true)));
        });
        group.bench_with_input(BenchmarkId::new("shortest_chain", size), size, |b, _| {
            b.iter(|| black_box(graph.shortest_chain(&origin, &target, 6)));
        });
        group.bench_with_input(BenchmarkId::new("clusters", size), size, |b, _| {
            b.iter(|| black_box(graph.clusters(0.8)));
        });
    }

    group.finish();
}

fn benchmark_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");
    let mut rng = StdRng::seed_from_u64(7);
    let service = generate_service(2_000, 200, &mut rng);
    let user = UserId::from("user17");

    group.bench_function("cold", |b| {
        b.iter(|| {
            service.invalidate_user(&user);
            black_box(service.recommend(&user, 10))
        });
    });
    group.bench_function("cached", |b| {
        b.iter(|| black_box(service.recommend(&user, 10)));
    });

    group.finish();
}

criterion_group!(benches, benchmark_graph_queries, benchmark_recommend);
criterion_main!(benches);
