//! Catalog entity records.

use serde::{Deserialize, Serialize};

/// Identifier of a catalog entity.
pub type EntityId = i64;

/// Version of the corpus text layout produced by [`Entity::corpus_text`].
///
/// Bump whenever the layout changes: vocabularies fitted on different
/// versions are not comparable.
pub const CORPUS_FORMAT_VERSION: u32 = 1;

/// An immutable catalog record (a charity).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Entity {
    /// Create an entity with an id and name; other fields empty.
    pub fn new<S: Into<String>>(id: EntityId, name: S) -> Self {
        Entity {
            id,
            name: name.into(),
            description: String::new(),
            categories: Vec::new(),
            website: None,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Set categories from a comma-separated label string.
    pub fn with_categories_str(mut self, categories: &str) -> Self {
        self.categories = parse_categories(categories);
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories
            .into_iter()
            .map(Into::into)
            .map(|c: String| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    pub fn with_website<S: Into<String>>(mut self, website: S) -> Self {
        let website = website.into();
        self.website = (!website.trim().is_empty()).then(|| website.trim().to_string());
        self
    }

    /// Whether the entity declares a non-empty website.
    pub fn has_website(&self) -> bool {
        self.website.as_deref().is_some_and(|w| !w.trim().is_empty())
    }

    /// The text the vectorizer is fitted on.
    ///
    /// Layout version [`CORPUS_FORMAT_VERSION`]: the description, one space,
    /// then the category labels joined by single spaces.
    pub fn corpus_text(&self) -> String {
        format!("{} {}", self.description, self.categories.join(" "))
    }
}

/// Split a comma-separated category string, trimming and dropping empties.
pub fn parse_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|area| !area.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_categories() {
        assert_eq!(
            parse_categories(" environment, wildlife ,,"),
            vec!["environment", "wildlife"]
        );
        assert!(parse_categories("").is_empty());
        assert!(parse_categories(" , ").is_empty());
    }

    #[test]
    fn test_corpus_text_layout() {
        let entity = Entity::new(1, "Ocean Trust")
            .with_description("protects marine wildlife")
            .with_categories_str("environment,wildlife");

        assert_eq!(
            entity.corpus_text(),
            "protects marine wildlife environment wildlife"
        );
        assert_eq!(CORPUS_FORMAT_VERSION, 1);
    }

    #[test]
    fn test_website() {
        let entity = Entity::new(1, "A").with_website("  ");
        assert!(!entity.has_website());

        let entity = Entity::new(1, "A").with_website("https://example.org");
        assert!(entity.has_website());
    }
}
