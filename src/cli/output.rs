//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{AlmonerArgs, OutputFormat};
use crate::engine::EngineStats;
use crate::error::Result;
use crate::features::{CacheStats, QueryFeatures};
use crate::ranking::MatchResult;

/// Result structure for recommendations.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResults {
    pub query: String,
    pub top_n: usize,
    pub randomized: bool,
    pub duration_ms: f64,
    pub results: Vec<MatchResult>,
}

/// Benchmark results.
#[derive(Debug, Serialize)]
pub struct BenchmarkResults {
    pub total_queries: usize,
    pub iterations: usize,
    pub queries_per_second: f64,
    pub average_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    pub average_results: f64,
    pub cache: CacheStats,
    pub total_duration_ms: f64,
}

/// Types with a human-readable rendering.
pub trait HumanReadable {
    fn render_human(&self) -> String;
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanReadable>(
    message: &str,
    result: &T,
    args: &AlmonerArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            print!("{}", result.render_human());
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

fn output_json<T: Serialize>(result: &T, args: &AlmonerArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

fn heading(out: &mut String, title: &str) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"═".repeat(title.chars().count()));
    out.push('\n');
}

fn terms_line(out: &mut String, label: &str, terms: &[String]) {
    if !terms.is_empty() {
        out.push_str(&format!("{label}: {}\n", terms.join(", ")));
    }
}

impl HumanReadable for RecommendationResults {
    fn render_human(&self) -> String {
        let mut out = String::new();
        heading(&mut out, "Recommendations:");

        if self.results.is_empty() {
            out.push_str("\nNo matching charities.\n");
        }

        for (i, result) in self.results.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!(
                "{}. {} (Score: {:.3}, {})\n",
                i + 1,
                result.name,
                result.relevance_score,
                result.match_type
            ));
            out.push_str("─────────────\n");
            if !result.categories.is_empty() {
                out.push_str(&format!("Categories: {}\n", result.categories.join(", ")));
            }
            if let Some(website) = &result.website {
                out.push_str(&format!("Website: {website}\n"));
            }
            out.push_str(&format!(
                "Semantic: {:.3}  Category: {:.3}  External: {:.3}\n",
                result.semantic_score, result.category_score, result.external_score
            ));
            if !result.boosts.is_empty() {
                out.push_str(&format!("Boosts: {}\n", result.boosts.join(", ")));
            }
        }

        out.push_str(&format!("\nQuery time: {:.2}ms\n", self.duration_ms));
        out
    }
}

impl HumanReadable for QueryFeatures {
    fn render_human(&self) -> String {
        let mut out = String::new();
        heading(&mut out, "Query Features:");
        out.push_str(&format!("Normalized: {}\n", self.normalized));
        if self.degraded {
            out.push_str("Mode: degraded (no linguistic analysis)\n");
        }
        terms_line(&mut out, "Keywords", &self.keywords);
        terms_line(&mut out, "Entities", &self.entities);
        terms_line(&mut out, "Phrases", &self.phrases);
        terms_line(&mut out, "Important terms", &self.important_terms);
        terms_line(&mut out, "Domain entities", &self.domain_entities);
        terms_line(&mut out, "Context", &self.context);
        terms_line(&mut out, "Expanded", &self.expanded);
        out
    }
}

impl HumanReadable for EngineStats {
    fn render_human(&self) -> String {
        let mut out = String::new();
        heading(&mut out, "Engine Statistics:");
        out.push_str(&format!("Charities: {}\n", self.catalog_size));
        out.push_str(&format!("Vocabulary terms: {}\n", self.vocabulary_size));
        out.push_str(&format!("Categories: {}\n", self.category_count));
        out.push_str(&format!("Corpus format: v{}\n", self.corpus_format_version));
        out.push_str(&format!(
            "Relevance model: {} ({})\n",
            self.model,
            if self.model_available { "available" } else { "unavailable" }
        ));
        out.push_str(&format!(
            "Linguistic analyzer: {}\n",
            self.analyzer.unwrap_or("none")
        ));
        out.push_str(&format!(
            "Query cache: {}/{} entries\n",
            self.cache.size, self.cache.max_size
        ));
        out.push_str(&format!("Loaded at: {}\n", self.loaded_at.to_rfc3339()));
        out
    }
}

impl HumanReadable for BenchmarkResults {
    fn render_human(&self) -> String {
        let mut out = String::new();
        heading(&mut out, "Benchmark Results:");
        out.push_str(&format!(
            "Total queries: {} ({} iterations)\n",
            self.total_queries, self.iterations
        ));
        out.push_str(&format!("Queries per second: {:.1}\n", self.queries_per_second));
        out.push_str(&format!("Average latency: {:.2}ms\n", self.average_latency_ms));
        out.push_str(&format!(
            "p50 / p95 latency: {:.2}ms / {:.2}ms\n",
            self.p50_latency_ms, self.p95_latency_ms
        ));
        out.push_str(&format!(
            "Min / max latency: {:.2}ms / {:.2}ms\n",
            self.min_latency_ms, self.max_latency_ms
        ));
        out.push_str(&format!("Average results: {:.1}\n", self.average_results));
        out.push_str(&format!(
            "Cache hit ratio: {:.1}%\n",
            self.cache.hit_ratio() * 100.0
        ));
        out.push_str(&format!(
            "\nTotal benchmark time: {:.0}ms\n",
            self.total_duration_ms
        ));
        out
    }
}
