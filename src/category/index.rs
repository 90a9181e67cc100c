//! Inverted index from category label to entities.

use std::collections::{BTreeMap, BTreeSet};

use log::info;

use crate::catalog::{Catalog, EntityId};

/// Lowercase category label → ids of the entities carrying it.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    labels: BTreeMap<String, BTreeSet<EntityId>>,
}

impl CategoryIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let mut labels: BTreeMap<String, BTreeSet<EntityId>> = BTreeMap::new();
        for entity in catalog.iter() {
            for category in &entity.categories {
                let label = category.trim().to_lowercase();
                if !label.is_empty() {
                    labels.entry(label).or_default().insert(entity.id);
                }
            }
        }

        info!(
            "built category index: {} labels over {} entities",
            labels.len(),
            catalog.len()
        );
        CategoryIndex { labels }
    }

    /// Entities carrying a label (matched case-insensitively).
    pub fn entities(&self, label: &str) -> Option<&BTreeSet<EntityId>> {
        self.labels.get(&label.to_lowercase())
    }

    /// Labels and their entities in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<EntityId>)> {
        self.labels.iter().map(|(label, ids)| (label.as_str(), ids))
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
