//! Criterion benchmarks for the Almoner recommender.
//!
//! Covers the stages a query passes through:
//! - Query feature extraction
//! - Catalog index construction
//! - Semantic and category scoring
//! - End-to-end recommendation (cold and cached)

use std::hint::black_box;
use std::sync::Arc;

use almoner::analysis::linguistic::LexiconAnalyzer;
use almoner::catalog::{Catalog, Entity};
use almoner::category::{CategoryIndex, CategoryMatcher};
use almoner::config::{CategoryConfig, EngineConfig, SemanticConfig, VectorizerConfig};
use almoner::features::QueryFeatureExtractor;
use almoner::ranking::EntropySource;
use almoner::vector::{CatalogIndex, SemanticScorer};
use almoner::Recommender;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};

const CAUSES: &[(&str, &str)] = &[
    ("environment,wildlife", "protects marine wildlife and restores coral reefs"),
    ("education,children", "literacy programs and tutoring for children"),
    ("health", "free medical care for uninsured families"),
    ("housing,homelessness", "emergency shelter and transitional housing"),
    ("veterans", "job training and counseling for military veterans"),
    ("animal welfare", "rescues abandoned dogs and cats"),
    ("hunger,food", "delivers meals to families facing hunger"),
    ("arts,culture", "music lessons and community theater"),
    ("disaster relief", "emergency relief after floods and earthquakes"),
    ("human rights", "legal aid for refugees and asylum seekers"),
];

const QUERIES: &[&str] = &[
    "I want to help endangered animals",
    "clean water for rural villages",
    "support for homeless veterans",
    "I care about children's education",
    "disaster relief in texas",
    "music programs for kids",
];

/// Generate a synthetic catalog.
fn generate_catalog(count: usize) -> Catalog {
    let entities = (0..count)
        .map(|i| {
            let (categories, description) = CAUSES[i % CAUSES.len()];
            Entity::new(i as i64 + 1, format!("Charity {i}"))
                .with_description(format!("{description} in region {}", i % 17))
                .with_categories_str(categories)
        })
        .collect();
    Catalog::new(entities).expect("unique ids")
}

fn extractor() -> QueryFeatureExtractor {
    QueryFeatureExtractor::new(Some(Arc::new(LexiconAnalyzer::new())))
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    let extractor = extractor();

    group.bench_function("extract_single_query", |b| {
        b.iter(|| black_box(extractor.extract(black_box(QUERIES[0]))))
    });

    group.throughput(Throughput::Elements(QUERIES.len() as u64));
    group.bench_function("extract_query_batch", |b| {
        b.iter(|| {
            for query in QUERIES {
                black_box(extractor.extract(query));
            }
        })
    });

    group.bench_function("extract_degraded", |b| {
        let degraded = QueryFeatureExtractor::new(None);
        b.iter(|| black_box(degraded.extract(black_box(QUERIES[0]))))
    });

    group.finish();
}

fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexing");
    group.sample_size(20);

    let catalog = generate_catalog(1000);
    group.throughput(Throughput::Elements(catalog.len() as u64));
    group.bench_function("catalog_index_build", |b| {
        b.iter(|| {
            black_box(CatalogIndex::build(&catalog, &VectorizerConfig::default()).expect("index"))
        })
    });
    group.bench_function("category_index_build", |b| {
        b.iter(|| black_box(CategoryIndex::build(&catalog)))
    });

    group.finish();
}

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");

    let catalog = generate_catalog(1000);
    let catalog_index = CatalogIndex::build(&catalog, &VectorizerConfig::default()).expect("index");
    let category_index = CategoryIndex::build(&catalog);
    let features = extractor().extract(QUERIES[0]);
    let semantic = SemanticScorer::new(SemanticConfig::default());
    let matcher = CategoryMatcher::new(CategoryConfig::default());

    group.bench_function("semantic_score", |b| {
        b.iter(|| black_box(semantic.score(&features, &catalog_index).expect("scores")))
    });
    group.bench_function("category_score", |b| {
        b.iter(|| black_box(matcher.score(&features, &category_index)))
    });

    group.finish();
}

fn bench_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");
    group.sample_size(30);

    let recommender = Recommender::new(generate_catalog(1000), EngineConfig::default())
        .expect("recommender")
        .with_entropy(EntropySource::Seeded(7));

    group.bench_function("recommend_cached_features", |b| {
        b.iter(|| black_box(recommender.recommend(black_box(QUERIES[2]), 5, false).expect("ok")))
    });

    group.bench_function("recommend_randomized", |b| {
        b.iter(|| black_box(recommender.recommend(black_box(QUERIES[2]), 5, true).expect("ok")))
    });

    group.throughput(Throughput::Elements(QUERIES.len() as u64));
    group.bench_function("recommend_cold_cache", |b| {
        b.iter(|| {
            recommender.cache().clear();
            for query in QUERIES {
                black_box(recommender.recommend(query, 10, false).expect("ok"));
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_extraction,
    bench_indexing,
    bench_scoring,
    bench_recommend
);
criterion_main!(benches);
