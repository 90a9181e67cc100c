//! Domain synonym table.
//!
//! Maps cause keywords to related terms. A query keyword that matches a key
//! contributes every synonym as an "important" term, which both the semantic
//! scorer and the category matcher weigh up.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AlmonerError, Result};

const DEFAULT_ENTRIES: &[(&str, &[&str])] = &[
    ("animal", &["wildlife", "animal welfare", "animal rescue", "pets", "conservation"]),
    ("pet", &["animal welfare", "animal rescue", "animals"]),
    ("dog", &["animal welfare", "animal rescue", "pets"]),
    ("cat", &["animal welfare", "animal rescue", "pets"]),
    ("endangered", &["wildlife", "conservation", "endangered species"]),
    ("wildlife", &["animals", "conservation", "environment"]),
    ("environment", &["climate", "conservation", "sustainability", "nature"]),
    ("climate", &["environment", "climate change", "sustainability"]),
    ("ocean", &["marine", "environment", "conservation"]),
    ("forest", &["environment", "conservation", "nature"]),
    ("education", &["school", "literacy", "learning", "scholarship"]),
    ("school", &["education", "literacy"]),
    ("literacy", &["education", "reading"]),
    ("child", &["children", "youth", "kids", "education"]),
    ("kid", &["children", "youth"]),
    ("youth", &["children", "mentoring"]),
    ("health", &["medical", "healthcare", "wellness"]),
    ("medical", &["health", "healthcare", "medical research"]),
    ("disease", &["health", "medical research"]),
    ("cancer", &["medical research", "health"]),
    ("mental", &["mental health", "counseling"]),
    ("hunger", &["food", "poverty", "food security", "nutrition"]),
    ("food", &["hunger", "nutrition", "food security"]),
    ("poverty", &["hunger", "homelessness", "economic development"]),
    ("homeless", &["housing", "shelter", "homelessness", "poverty"]),
    ("housing", &["shelter", "homelessness"]),
    ("disaster", &["disaster relief", "emergency relief", "humanitarian"]),
    ("refugee", &["humanitarian", "refugees", "immigration"]),
    ("veteran", &["veterans", "military", "service members"]),
    ("military", &["veterans", "armed forces"]),
    ("water", &["clean water", "sanitation"]),
    ("woman", &["women", "gender equality"]),
    ("right", &["human rights", "civil rights", "justice"]),
    ("art", &["arts", "culture", "music"]),
    ("community", &["community development", "local"]),
    ("faith", &["religion", "church"]),
];

/// One serialized table entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub key: String,
    pub synonyms: Vec<String>,
}

/// Lookup table from a domain keyword to its synonyms.
#[derive(Clone, Debug, Default)]
pub struct DomainSynonyms {
    synonyms: HashMap<String, Vec<String>>,
    /// Every key and synonym, for phrase promotion.
    vocabulary: HashSet<String>,
}

impl DomainSynonyms {
    /// An empty table.
    pub fn empty() -> Self {
        DomainSynonyms::default()
    }

    /// The built-in charity cause table.
    pub fn builtin() -> Self {
        let mut table = DomainSynonyms::empty();
        for (key, synonyms) in DEFAULT_ENTRIES {
            table.insert(key, synonyms.iter().map(|s| s.to_string()).collect());
        }
        table
    }

    /// Load a table from a JSON file of `{"key": ..., "synonyms": [...]}` entries.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AlmonerError::config(format!(
                "Failed to read synonym table '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content).map_err(|e| {
            AlmonerError::config(format!(
                "Failed to parse synonym table '{}': {e}",
                path.display()
            ))
        })
    }

    /// Parse a table from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<SynonymEntry> = serde_json::from_str(json)?;
        let mut table = DomainSynonyms::empty();
        for entry in entries {
            table.insert(&entry.key, entry.synonyms);
        }
        Ok(table)
    }

    /// Add or replace an entry. Keys and synonyms are lowercased.
    pub fn insert(&mut self, key: &str, synonyms: Vec<String>) {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        let synonyms: Vec<String> = synonyms
            .into_iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        self.vocabulary.insert(key.clone());
        self.vocabulary.extend(synonyms.iter().cloned());
        self.synonyms.insert(key, synonyms);
    }

    /// Synonyms of a key, in table order.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.synonyms.get(key).map(Vec::as_slice)
    }

    /// Whether `phrase` contains a key or synonym as a whole-word sequence.
    pub fn phrase_mentions_domain_term(&self, phrase: &str) -> bool {
        let padded = format!(" {phrase} ");
        self.vocabulary
            .iter()
            .any(|term| padded.contains(&format!(" {term} ")))
    }

    pub fn len(&self) -> usize {
        self.synonyms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
    }
}
