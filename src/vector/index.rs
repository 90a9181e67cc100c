//! The fitted catalog vector space.

use std::sync::Arc;
use std::time::Instant;

use log::info;
use rayon::prelude::*;

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::catalog::{Catalog, EntityId};
use crate::config::VectorizerConfig;
use crate::error::Result;
use crate::vector::sparse::SparseVector;
use crate::vector::tfidf::TfIdfVectorizer;

/// One unit-length TF-IDF vector per catalog entity, in catalog order.
#[derive(Debug)]
pub struct CatalogIndex {
    vectorizer: TfIdfVectorizer,
    ids: Vec<EntityId>,
    vectors: Vec<SparseVector>,
}

impl CatalogIndex {
    /// Fit the vectorizer on the catalog corpus and vectorize every entity.
    pub fn build(catalog: &Catalog, config: &VectorizerConfig) -> Result<Self> {
        let analyzer: Arc<dyn Analyzer> = Arc::new(PipelineAnalyzer::english()?);
        Self::build_with_analyzer(catalog, config, analyzer)
    }

    pub fn build_with_analyzer(
        catalog: &Catalog,
        config: &VectorizerConfig,
        analyzer: Arc<dyn Analyzer>,
    ) -> Result<Self> {
        let start = Instant::now();
        let corpus: Vec<String> = catalog.iter().map(|e| e.corpus_text()).collect();

        let mut vectorizer = TfIdfVectorizer::new(analyzer, config.clone());
        vectorizer.fit(&corpus)?;

        let vectors = corpus
            .par_iter()
            .map(|doc| vectorizer.transform(doc))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "built catalog index: {} entities, {} terms in {:?}",
            vectors.len(),
            vectorizer.vocabulary_size(),
            start.elapsed()
        );

        Ok(CatalogIndex {
            vectorizer,
            ids: catalog.iter().map(|e| e.id).collect(),
            vectors,
        })
    }

    /// Project query text into the catalog space.
    pub fn transform_query(&self, text: &str) -> Result<SparseVector> {
        self.vectorizer.transform(text)
    }

    /// Cosine similarity of a query vector against every entity, in catalog
    /// order.
    pub fn similarities(&self, query: &SparseVector) -> Vec<(EntityId, f64)> {
        if query.is_empty() {
            return self.ids.iter().map(|&id| (id, 0.0)).collect();
        }
        self.ids
            .par_iter()
            .zip(self.vectors.par_iter())
            .map(|(&id, vector)| (id, vector.dot(query)))
            .collect()
    }

    pub fn vector(&self, position: usize) -> Option<&SparseVector> {
        self.vectors.get(position)
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Entity;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Entity::new(1, "Ocean Trust")
                .with_description("Protecting marine life")
                .with_categories_str("Environment, Oceans"),
            Entity::new(2, "City Readers")
                .with_description("Literacy programs for children")
                .with_categories_str("Education"),
        ])
        .unwrap()
    }

    #[test]
    fn test_build() {
        let index = CatalogIndex::build(&catalog(), &VectorizerConfig::default()).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.vocabulary_size() > 0);
        for pos in 0..2 {
            assert!((index.vector(pos).unwrap().norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_similarities_in_catalog_order() {
        let index = CatalogIndex::build(&catalog(), &VectorizerConfig::default()).unwrap();
        let query = index.transform_query("marine life").unwrap();
        let sims = index.similarities(&query);

        assert_eq!(sims[0].0, 1);
        assert_eq!(sims[1].0, 2);
        assert!(sims[0].1 > 0.0);
        assert_eq!(sims[1].1, 0.0);
    }

    #[test]
    fn test_empty_catalog() {
        let index = CatalogIndex::build(&Catalog::default(), &VectorizerConfig::default()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.vocabulary_size(), 0);
        let query = index.transform_query("anything").unwrap();
        assert!(index.similarities(&query).is_empty());
    }
}
