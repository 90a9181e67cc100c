//! Command implementations for the Almoner CLI.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::info;

use crate::analysis::linguistic::{LexiconAnalyzer, LinguisticAnalyzer};
use crate::catalog::{Catalog, FileCatalog};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::EngineConfig;
use crate::engine::Recommender;
use crate::error::{AlmonerError, Result};
use crate::features::{DomainSynonyms, QueryFeatureExtractor};
use crate::ranking::EntropySource;
use crate::relevance::load_model_or_none;

/// Execute a CLI command.
pub fn execute_command(args: AlmonerArgs) -> Result<()> {
    match &args.command {
        Command::Recommend(recommend_args) => recommend(recommend_args.clone(), &args),
        Command::Extract(extract_args) => extract(extract_args.clone(), &args),
        Command::Stats(stats_args) => show_stats(stats_args.clone(), &args),
        Command::Bench(bench_args) => run_benchmark(bench_args.clone(), &args),
    }
}

/// Load the catalog and collaborators named on the command line.
pub fn build_recommender(args: &EngineArgs) -> Result<Recommender> {
    let config = match &args.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            EngineConfig::load_from_file(path)?
        }
        None => EngineConfig::default(),
    };

    info!("loading catalog from {}", args.catalog.display());
    let catalog = Catalog::from_source(&FileCatalog::new(&args.catalog)?)?;
    let mut recommender = Recommender::new(catalog, config)?;

    if args.no_nlp {
        recommender = recommender.with_analyzer(None);
    }
    if let Some(path) = &args.synonyms {
        recommender = recommender.with_synonyms(DomainSynonyms::load_from_file(path)?);
    }
    if let Some(path) = &args.model {
        recommender = recommender.with_model(load_model_or_none(path));
    }
    Ok(recommender)
}

/// Recommend charities for one query.
fn recommend(args: RecommendArgs, cli_args: &AlmonerArgs) -> Result<()> {
    let mut recommender = build_recommender(&args.engine)?;
    let entropy = match args.seed {
        Some(seed) => EntropySource::Seeded(seed),
        None => EntropySource::Os,
    };
    recommender = recommender.with_entropy(entropy);

    let start = Instant::now();
    let results = match args.user {
        Some(user_id) => {
            recommender.recommend_for_user(user_id, &args.query, args.top_n, args.randomize)?
        }
        None => recommender.recommend(&args.query, args.top_n, args.randomize)?,
    };

    output_result(
        "Recommendations completed",
        &RecommendationResults {
            query: args.query,
            top_n: args.top_n,
            randomized: args.randomize,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
            results,
        },
        cli_args,
    )
}

/// Show the features extracted from a query.
fn extract(args: ExtractArgs, cli_args: &AlmonerArgs) -> Result<()> {
    if args.query.trim().is_empty() {
        return Err(AlmonerError::invalid_argument("query must not be empty"));
    }

    let analyzer: Option<Arc<dyn LinguisticAnalyzer>> = if args.no_nlp {
        None
    } else {
        Some(Arc::new(LexiconAnalyzer::new()))
    };
    let mut extractor = QueryFeatureExtractor::new(analyzer);
    if let Some(path) = &args.synonyms {
        extractor = extractor.with_synonyms(DomainSynonyms::load_from_file(path)?);
    }

    output_result("Query features", &extractor.extract(&args.query), cli_args)
}

/// Show catalog and index statistics.
fn show_stats(args: StatsArgs, cli_args: &AlmonerArgs) -> Result<()> {
    let recommender = build_recommender(&args.engine)?;
    output_result("Engine statistics", &recommender.stats(), cli_args)
}

/// Replay a query file against a loaded recommender.
fn run_benchmark(args: BenchArgs, cli_args: &AlmonerArgs) -> Result<()> {
    if args.iterations == 0 {
        return Err(AlmonerError::invalid_argument("iterations must be at least 1"));
    }
    let queries = load_queries(&args.queries)?;
    if queries.is_empty() {
        return Err(AlmonerError::invalid_argument(format!(
            "no queries in {}",
            args.queries.display()
        )));
    }

    let recommender = build_recommender(&args.engine)?;
    info!(
        "benchmarking {} queries x {} iterations",
        queries.len(),
        args.iterations
    );

    let start_time = Instant::now();
    let mut latencies = Vec::with_capacity(queries.len() * args.iterations);
    let mut result_count = 0usize;

    for _ in 0..args.iterations {
        for query in &queries {
            let start = Instant::now();
            let results = recommender.recommend(query, args.top_n, false)?;
            latencies.push(start.elapsed().as_secs_f64() * 1000.0);
            result_count += results.len();
        }
    }

    let total_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    let results = summarize(
        &mut latencies,
        result_count,
        args.iterations,
        total_duration_ms,
    );

    output_result(
        "Benchmark completed",
        &BenchmarkResults {
            cache: recommender.stats().cache,
            ..results
        },
        cli_args,
    )
}

/// Non-empty lines of a query file; `#` starts a comment line.
fn load_queries(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut queries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let query = line.trim();
        if !query.is_empty() && !query.starts_with('#') {
            queries.push(query.to_string());
        }
    }
    Ok(queries)
}

fn summarize(
    latencies: &mut [f64],
    result_count: usize,
    iterations: usize,
    total_duration_ms: f64,
) -> BenchmarkResults {
    latencies.sort_by(f64::total_cmp);
    let n = latencies.len();
    let average = if n == 0 {
        0.0
    } else {
        latencies.iter().sum::<f64>() / n as f64
    };

    BenchmarkResults {
        total_queries: n,
        iterations,
        queries_per_second: if total_duration_ms > 0.0 {
            n as f64 * 1000.0 / total_duration_ms
        } else {
            0.0
        },
        average_latency_ms: average,
        p50_latency_ms: percentile(latencies, 50.0),
        p95_latency_ms: percentile(latencies, 95.0),
        min_latency_ms: latencies.first().copied().unwrap_or(0.0),
        max_latency_ms: latencies.last().copied().unwrap_or(0.0),
        average_results: if n == 0 {
            0.0
        } else {
            result_count as f64 / n as f64
        },
        cache: Default::default(),
        total_duration_ms,
    }
}

/// Nearest-rank percentile of sorted values.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (p / 100.0 * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_load_queries_skips_comments_and_blanks() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# warm-up set").unwrap();
        writeln!(file, "clean water").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  animal shelters  ").unwrap();

        let queries = load_queries(file.path()).unwrap();
        assert_eq!(queries, vec!["clean water", "animal shelters"]);
    }

    #[test]
    fn test_percentile() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 50.0), 3.0);
        assert_eq!(percentile(&values, 95.0), 5.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn test_summarize() {
        let mut latencies = vec![4.0, 1.0, 3.0, 2.0];
        let results = summarize(&mut latencies, 8, 2, 20.0);
        assert_eq!(results.total_queries, 4);
        assert_eq!(results.min_latency_ms, 1.0);
        assert_eq!(results.max_latency_ms, 4.0);
        assert_eq!(results.average_latency_ms, 2.5);
        assert_eq!(results.average_results, 2.0);
        assert_eq!(results.queries_per_second, 200.0);
    }

    #[test]
    fn test_build_recommender_from_files() {
        let mut catalog = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(catalog, "id,name,description,categories,website").unwrap();
        writeln!(
            catalog,
            "1,Ocean Trust,Protects marine wildlife,\"environment,wildlife\",https://ocean.example"
        )
        .unwrap();
        catalog.flush().unwrap();

        let args = EngineArgs {
            catalog: catalog.path().to_path_buf(),
            config: None,
            model: None,
            synonyms: None,
            no_nlp: true,
        };
        let recommender = build_recommender(&args).unwrap();
        let stats = recommender.stats();
        assert_eq!(stats.catalog_size, 1);
        assert_eq!(stats.analyzer, None);
    }
}
