//! The entity catalog.
//!
//! The catalog is a read-only snapshot loaded once at startup. Entity order
//! is the source order; it drives corpus construction and deterministic
//! fallbacks.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use crate::error::{AlmonerError, Result};

pub mod entity;
pub mod loader;

pub use entity::{CORPUS_FORMAT_VERSION, Entity, EntityId, parse_categories};
pub use loader::{CatalogFormat, CatalogSource, FileCatalog, InMemoryCatalog};

/// Reject catalogs in which two records share an id.
pub(crate) fn validate_unique_ids(entities: &[Entity]) -> Result<()> {
    let mut seen: HashMap<EntityId, &str> = HashMap::with_capacity(entities.len());
    for entity in entities {
        if let Some(first) = seen.insert(entity.id, entity.name.as_str()) {
            return Err(AlmonerError::catalog(format!(
                "duplicate entity id {} ('{}' and '{}')",
                entity.id, first, entity.name
            )));
        }
    }
    Ok(())
}

/// An ordered, id-addressable entity snapshot.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entities: Vec<Arc<Entity>>,
    positions: HashMap<EntityId, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(entities: Vec<Entity>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(entities.len());
        for (position, entity) in entities.iter().enumerate() {
            match positions.entry(entity.id) {
                Entry::Occupied(_) => {
                    return Err(AlmonerError::catalog(format!(
                        "duplicate entity id {}",
                        entity.id
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(position);
                }
            }
        }

        Ok(Catalog {
            entities: entities.into_iter().map(Arc::new).collect(),
            positions,
        })
    }

    /// Load and build a catalog from a source.
    pub fn from_source(source: &dyn CatalogSource) -> Result<Self> {
        Self::new(source.load()?)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in source order.
    pub fn entities(&self) -> &[Arc<Entity>] {
        &self.entities
    }

    pub fn get(&self, id: EntityId) -> Option<&Arc<Entity>> {
        self.positions.get(&id).map(|&pos| &self.entities[pos])
    }

    /// Source position of an entity id.
    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let catalog = Catalog::new(vec![
            Entity::new(10, "First"),
            Entity::new(3, "Second"),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(3).unwrap().name, "Second");
        assert_eq!(catalog.position(10), Some(0));
        assert!(catalog.get(99).is_none());
    }

    #[test]
    fn test_duplicate_ids() {
        let result = Catalog::new(vec![Entity::new(1, "A"), Entity::new(1, "B")]);
        assert!(result.is_err());

        let result = validate_unique_ids(&[Entity::new(1, "A"), Entity::new(1, "B")]);
        assert!(matches!(result, Err(AlmonerError::Catalog(_))));
    }

    #[test]
    fn test_from_source() {
        let source = InMemoryCatalog::new(vec![Entity::new(1, "A")]);
        let catalog = Catalog::from_source(&source).unwrap();
        assert!(!catalog.is_empty());
    }
}
