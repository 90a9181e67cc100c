//! Structured linguistic analysis.
//!
//! The feature extractor does not tokenize queries itself. It consumes a
//! [`ParsedText`] produced by a [`LinguisticAnalyzer`]: tokens with
//! part-of-speech tags, lemmas and dependency roles, plus sentence
//! boundaries and named-entity spans. [`LexiconAnalyzer`] is the bundled
//! rule-based implementation; hosts can plug in their own.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod lexicon;

pub use lexicon::LexiconAnalyzer;

/// Coarse universal part-of-speech tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Verb,
    Adjective,
    Adverb,
    Adposition,
    Determiner,
    Pronoun,
    Conjunction,
    Auxiliary,
    Particle,
    Numeral,
    Other,
}

impl PartOfSpeech {
    /// The universal tag string (`NOUN`, `PROPN`, ...).
    pub fn tag(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "NOUN",
            PartOfSpeech::ProperNoun => "PROPN",
            PartOfSpeech::Verb => "VERB",
            PartOfSpeech::Adjective => "ADJ",
            PartOfSpeech::Adverb => "ADV",
            PartOfSpeech::Adposition => "ADP",
            PartOfSpeech::Determiner => "DET",
            PartOfSpeech::Pronoun => "PRON",
            PartOfSpeech::Conjunction => "CCONJ",
            PartOfSpeech::Auxiliary => "AUX",
            PartOfSpeech::Particle => "PART",
            PartOfSpeech::Numeral => "NUM",
            PartOfSpeech::Other => "X",
        }
    }

    /// Nouns, proper nouns, adjectives and verbs carry query content.
    pub fn is_content(&self) -> bool {
        matches!(
            self,
            PartOfSpeech::Noun
                | PartOfSpeech::ProperNoun
                | PartOfSpeech::Adjective
                | PartOfSpeech::Verb
        )
    }

    pub fn is_nominal(&self) -> bool {
        matches!(self, PartOfSpeech::Noun | PartOfSpeech::ProperNoun)
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Simplified dependency relation of a token to its head.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyRole {
    Root,
    DirectObject,
    PrepositionalObject,
    Compound,
    Dep,
}

impl DependencyRole {
    pub fn label(&self) -> &'static str {
        match self {
            DependencyRole::Root => "ROOT",
            DependencyRole::DirectObject => "dobj",
            DependencyRole::PrepositionalObject => "pobj",
            DependencyRole::Compound => "compound",
            DependencyRole::Dep => "dep",
        }
    }

    /// Direct and prepositional objects.
    pub fn is_object(&self) -> bool {
        matches!(
            self,
            DependencyRole::DirectObject | DependencyRole::PrepositionalObject
        )
    }
}

/// One analyzed token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedToken {
    pub text: String,
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub dep: DependencyRole,
    pub is_stop: bool,
    /// Index of the sentence this token belongs to.
    pub sentence: usize,
    /// Byte offsets into the analyzed text.
    pub start: usize,
    pub end: usize,
}

/// A named-entity span over `tokens[start_token..end_token]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    /// Entity label such as `GPE`, `ORG` or `NORP`.
    pub label: String,
    pub start_token: usize,
    pub end_token: usize,
}

/// A sentence covering `tokens[start_token..end_token]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub start_token: usize,
    pub end_token: usize,
}

/// Output of a linguistic analyzer for one piece of text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedText {
    pub text: String,
    pub tokens: Vec<AnalyzedToken>,
    pub sentences: Vec<Sentence>,
    pub entities: Vec<EntitySpan>,
}

impl ParsedText {
    /// Tokens of one sentence.
    pub fn sentence_tokens(&self, sentence: &Sentence) -> &[AnalyzedToken] {
        let end = sentence.end_token.min(self.tokens.len());
        let start = sentence.start_token.min(end);
        &self.tokens[start..end]
    }

    /// Base noun phrases: maximal runs of adjectives, numerals and nouns
    /// inside a sentence, trimmed so they end on a noun.
    ///
    /// Single-token chunks are included; callers filter by length.
    pub fn noun_chunks(&self) -> Vec<Vec<&AnalyzedToken>> {
        let mut chunks = Vec::new();

        for sentence in &self.sentences {
            let mut run: Vec<&AnalyzedToken> = Vec::new();
            for token in self.sentence_tokens(sentence) {
                let chunkable = token.pos.is_nominal()
                    || matches!(token.pos, PartOfSpeech::Adjective | PartOfSpeech::Numeral);
                if chunkable {
                    run.push(token);
                } else {
                    flush_chunk(&mut run, &mut chunks);
                }
            }
            flush_chunk(&mut run, &mut chunks);
        }

        chunks
    }
}

fn flush_chunk<'a>(run: &mut Vec<&'a AnalyzedToken>, chunks: &mut Vec<Vec<&'a AnalyzedToken>>) {
    while run.last().is_some_and(|t| !t.pos.is_nominal()) {
        run.pop();
    }
    if !run.is_empty() {
        chunks.push(std::mem::take(run));
    }
    run.clear();
}

/// Trait for pluggable linguistic analysis.
///
/// Implementations receive text that is already lowercased with collapsed
/// whitespace.
pub trait LinguisticAnalyzer: Send + Sync {
    /// Analyze the given normalized text.
    fn analyze(&self, text: &str) -> Result<ParsedText>;

    /// Get the name of this analyzer.
    fn name(&self) -> &'static str;
}
