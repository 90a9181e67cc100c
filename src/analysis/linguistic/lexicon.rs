//! Lexicon-driven linguistic analyzer.
//!
//! A deterministic rule-based tagger. Sentences and words come from Unicode
//! segmentation; parts of speech from closed-class word lists, a cause-domain
//! verb lexicon and suffix rules; named entities from a longest-match
//! gazetteer; dependency roles from a few positional rules.
//!
//! # Examples
//!
//! ```
//! use almoner::analysis::linguistic::{LexiconAnalyzer, LinguisticAnalyzer, PartOfSpeech};
//!
//! let analyzer = LexiconAnalyzer::new();
//! let parsed = analyzer.analyze("i want to help endangered animals in kenya").unwrap();
//!
//! let animals = parsed.tokens.iter().find(|t| t.text == "animals").unwrap();
//! assert_eq!(animals.pos, PartOfSpeech::Noun);
//! assert_eq!(animals.lemma, "animal");
//! assert_eq!(parsed.entities[0].label, "GPE");
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use log::trace;
use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::lemmatizer::Lemmatizer;
use crate::analysis::linguistic::{
    AnalyzedToken, DependencyRole, EntitySpan, LinguisticAnalyzer, ParsedText, PartOfSpeech,
    Sentence,
};
use crate::analysis::token_filter::stop::is_english_stop_word;
use crate::error::Result;

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "my", "your", "his", "her", "its", "our",
    "their", "some", "any", "each", "every", "no", "all", "both", "either", "neither", "many",
    "much", "few", "several", "other", "another", "more", "most", "such", "what", "which",
    "whose",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "you", "he", "him", "she", "it", "we", "us", "they", "them", "myself", "yourself",
    "himself", "herself", "itself", "ourselves", "themselves", "mine", "yours", "hers", "ours",
    "theirs", "who", "whom", "someone", "anyone", "everyone", "something", "anything",
    "everything", "nobody", "i'm", "i'd", "i've",
];

const ADPOSITIONS: &[&str] = &[
    "in", "on", "at", "by", "for", "with", "about", "against", "between", "into", "through",
    "during", "before", "after", "above", "below", "to", "from", "up", "down", "of", "off",
    "over", "under", "around", "among", "across", "within", "without", "toward", "towards",
    "via", "near",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "because", "although", "while", "if", "unless",
    "whereas", "than",
];

const AUXILIARIES: &[&str] = &[
    "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does",
    "did", "can", "could", "will", "would", "shall", "should", "may", "might", "must",
];

const PARTICLES: &[&str] = &["not", "n't"];

const ADVERBS: &[&str] = &[
    "very", "really", "also", "especially", "just", "too", "quite", "rather", "always", "often",
    "never", "still", "even", "only", "mainly", "mostly", "particularly", "locally", "globally",
    "internationally", "directly", "here", "there", "now", "then", "however", "deeply",
];

/// Nouns that suffix rules would otherwise read as participles or verbs.
const KNOWN_NOUNS: &[&str] = &[
    "housing", "funding", "training", "schooling", "building", "clothing", "learning",
    "wellbeing", "nursing", "counseling", "mentoring", "tutoring", "fundraising", "recycling",
    "farming", "fishing", "planning", "bedding", "lodging", "screening",
    "seed", "seeds", "bed", "beds", "shed",
];

/// Words that read as nouns unless a subject or infinitive marker precedes them.
const NOUN_PREFERRED: &[&str] = &[
    "research", "shelter", "aid", "care", "support", "work", "fund", "house", "change", "end",
    "love", "volunteer", "mentor", "tutor", "sponsor",
];

const KNOWN_ADJECTIVES: &[&str] = &[
    "clean", "safe", "poor", "homeless", "hungry", "sick", "local", "global", "young", "old",
    "elderly", "disabled", "mental", "rural", "urban", "free", "fair", "green", "wild", "marine",
    "clear", "good", "great", "new", "best", "better", "small", "large", "big", "low", "high",
    "human", "civil", "public", "social", "basic", "early", "native", "indigenous", "low-income",
    "underserved", "vulnerable", "abused", "neglected", "at-risk", "chronic", "rare", "fresh",
];

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "less", "able", "ible", "al", "ic", "ary",
];

/// Entity label and gazetteer phrase pairs.
const GAZETTEER: &[(&str, &str)] = &[
    // countries and cities
    ("GPE", "afghanistan"),
    ("GPE", "bangladesh"),
    ("GPE", "brazil"),
    ("GPE", "canada"),
    ("GPE", "chicago"),
    ("GPE", "china"),
    ("GPE", "colombia"),
    ("GPE", "congo"),
    ("GPE", "detroit"),
    ("GPE", "ethiopia"),
    ("GPE", "flint"),
    ("GPE", "gaza"),
    ("GPE", "ghana"),
    ("GPE", "guatemala"),
    ("GPE", "haiti"),
    ("GPE", "india"),
    ("GPE", "indonesia"),
    ("GPE", "israel"),
    ("GPE", "kenya"),
    ("GPE", "lebanon"),
    ("GPE", "london"),
    ("GPE", "los angeles"),
    ("GPE", "malawi"),
    ("GPE", "mexico"),
    ("GPE", "nepal"),
    ("GPE", "new orleans"),
    ("GPE", "new york"),
    ("GPE", "new york city"),
    ("GPE", "nigeria"),
    ("GPE", "pakistan"),
    ("GPE", "philippines"),
    ("GPE", "puerto rico"),
    ("GPE", "rwanda"),
    ("GPE", "san francisco"),
    ("GPE", "somalia"),
    ("GPE", "south africa"),
    ("GPE", "south sudan"),
    ("GPE", "sudan"),
    ("GPE", "syria"),
    ("GPE", "tanzania"),
    ("GPE", "texas"),
    ("GPE", "turkey"),
    ("GPE", "uganda"),
    ("GPE", "ukraine"),
    ("GPE", "united kingdom"),
    ("GPE", "united states"),
    ("GPE", "usa"),
    ("GPE", "venezuela"),
    ("GPE", "vietnam"),
    ("GPE", "yemen"),
    ("GPE", "zambia"),
    // regions and natural places
    ("LOC", "africa"),
    ("LOC", "amazon"),
    ("LOC", "amazon rainforest"),
    ("LOC", "appalachia"),
    ("LOC", "arctic"),
    ("LOC", "asia"),
    ("LOC", "atlantic"),
    ("LOC", "caribbean"),
    ("LOC", "central america"),
    ("LOC", "east africa"),
    ("LOC", "europe"),
    ("LOC", "great barrier reef"),
    ("LOC", "latin america"),
    ("LOC", "middle east"),
    ("LOC", "pacific"),
    ("LOC", "south america"),
    ("LOC", "southeast asia"),
    ("LOC", "sub-saharan africa"),
    ("LOC", "west africa"),
    // nationalities, religious and political groups
    ("NORP", "afghan"),
    ("NORP", "african"),
    ("NORP", "african american"),
    ("NORP", "american"),
    ("NORP", "americans"),
    ("NORP", "asian"),
    ("NORP", "buddhist"),
    ("NORP", "catholic"),
    ("NORP", "christian"),
    ("NORP", "haitian"),
    ("NORP", "hindu"),
    ("NORP", "hispanic"),
    ("NORP", "jewish"),
    ("NORP", "latino"),
    ("NORP", "muslim"),
    ("NORP", "native american"),
    ("NORP", "palestinian"),
    ("NORP", "rohingya"),
    ("NORP", "syrian"),
    ("NORP", "ukrainian"),
    // organizations
    ("ORG", "amnesty international"),
    ("ORG", "doctors without borders"),
    ("ORG", "feeding america"),
    ("ORG", "greenpeace"),
    ("ORG", "habitat for humanity"),
    ("ORG", "oxfam"),
    ("ORG", "peace corps"),
    ("ORG", "red cross"),
    ("ORG", "salvation army"),
    ("ORG", "save the children"),
    ("ORG", "st jude"),
    ("ORG", "unicef"),
    ("ORG", "united nations"),
    ("ORG", "united way"),
    ("ORG", "world health organization"),
    ("ORG", "world wildlife fund"),
    ("ORG", "wwf"),
    ("ORG", "ymca"),
    // events
    ("EVENT", "covid"),
    ("EVENT", "hurricane harvey"),
    ("EVENT", "hurricane katrina"),
    ("EVENT", "hurricane maria"),
    ("EVENT", "holocaust"),
    ("EVENT", "vietnam war"),
    ("EVENT", "world war ii"),
];

fn word_set(words: &'static [&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

static DETERMINER_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| word_set(DETERMINERS));
static PRONOUN_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| word_set(PRONOUNS));
static ADPOSITION_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| word_set(ADPOSITIONS));
static CONJUNCTION_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| word_set(CONJUNCTIONS));
static AUXILIARY_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| word_set(AUXILIARIES));
static PARTICLE_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| word_set(PARTICLES));
static ADVERB_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| word_set(ADVERBS));
static KNOWN_NOUN_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| word_set(KNOWN_NOUNS));
static NOUN_PREFERRED_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| word_set(NOUN_PREFERRED));
static KNOWN_ADJECTIVE_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| word_set(KNOWN_ADJECTIVES));

/// Tag assigned by the first tagging pass.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Provisional {
    Fixed(PartOfSpeech),
    /// A word ending in `-ed` / `-ing` outside the lexicons.
    Participle,
}

/// Rule-based [`LinguisticAnalyzer`] backed by static lexicons.
#[derive(Clone, Debug)]
pub struct LexiconAnalyzer {
    lemmatizer: Lemmatizer,
    gazetteer: HashMap<String, String>,
    max_entity_words: usize,
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconAnalyzer {
    /// Create an analyzer with the built-in gazetteer.
    pub fn new() -> Self {
        let mut analyzer = LexiconAnalyzer {
            lemmatizer: Lemmatizer::new(),
            gazetteer: HashMap::new(),
            max_entity_words: 1,
        };
        for (label, phrase) in GAZETTEER {
            analyzer.add_entity(phrase, label);
        }
        analyzer
    }

    /// Register an additional gazetteer entry.
    pub fn with_entity(mut self, phrase: &str, label: &str) -> Self {
        self.add_entity(phrase, label);
        self
    }

    fn add_entity(&mut self, phrase: &str, label: &str) {
        let words: Vec<String> = phrase
            .to_lowercase()
            .unicode_words()
            .map(str::to_string)
            .collect();
        if words.is_empty() {
            return;
        }
        self.max_entity_words = self.max_entity_words.max(words.len());
        self.gazetteer.insert(words.join(" "), label.to_string());
    }

    /// Number of gazetteer entries.
    pub fn gazetteer_len(&self) -> usize {
        self.gazetteer.len()
    }

    fn first_pass_tag(&self, lower: &str) -> Provisional {
        if !lower.is_empty() && lower.chars().all(|c| c.is_numeric() || c == '.' || c == ',') {
            return Provisional::Fixed(PartOfSpeech::Numeral);
        }
        if DETERMINER_SET.contains(lower) {
            return Provisional::Fixed(PartOfSpeech::Determiner);
        }
        if PRONOUN_SET.contains(lower) {
            return Provisional::Fixed(PartOfSpeech::Pronoun);
        }
        if AUXILIARY_SET.contains(lower) {
            return Provisional::Fixed(PartOfSpeech::Auxiliary);
        }
        if PARTICLE_SET.contains(lower) {
            return Provisional::Fixed(PartOfSpeech::Particle);
        }
        if CONJUNCTION_SET.contains(lower) {
            return Provisional::Fixed(PartOfSpeech::Conjunction);
        }
        if ADPOSITION_SET.contains(lower) {
            return Provisional::Fixed(PartOfSpeech::Adposition);
        }
        if ADVERB_SET.contains(lower) {
            return Provisional::Fixed(PartOfSpeech::Adverb);
        }
        if KNOWN_NOUN_SET.contains(lower) {
            return Provisional::Fixed(PartOfSpeech::Noun);
        }
        if KNOWN_ADJECTIVE_SET.contains(lower) {
            return Provisional::Fixed(PartOfSpeech::Adjective);
        }
        if self.lemmatizer.is_known_verb_form(lower) {
            return Provisional::Fixed(PartOfSpeech::Verb);
        }
        if lower.chars().count() > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            return Provisional::Fixed(PartOfSpeech::Adjective);
        }
        if lower.chars().count() > 4 && (lower.ends_with("ing") || lower.ends_with("ed")) {
            return Provisional::Participle;
        }
        if lower.ends_with("ly") && lower.chars().count() > 4 {
            return Provisional::Fixed(PartOfSpeech::Adverb);
        }
        Provisional::Fixed(PartOfSpeech::Noun)
    }

    /// Longest-match gazetteer lookup within each sentence.
    fn find_entities(
        &self,
        text: &str,
        tokens: &[AnalyzedToken],
        sentences: &[Sentence],
    ) -> Vec<EntitySpan> {
        let mut spans = Vec::new();

        for sentence in sentences {
            let mut i = sentence.start_token;
            while i < sentence.end_token {
                let longest = (1..=self.max_entity_words)
                    .rev()
                    .filter(|len| i + len <= sentence.end_token)
                    .find_map(|len| {
                        let key = tokens[i..i + len]
                            .iter()
                            .map(|t| t.text.to_lowercase())
                            .collect::<Vec<_>>()
                            .join(" ");
                        self.gazetteer.get(&key).map(|label| (len, label))
                    });

                match longest {
                    Some((len, label)) => {
                        let start = tokens[i].start;
                        let end = tokens[i + len - 1].end;
                        spans.push(EntitySpan {
                            text: text.get(start..end).unwrap_or_default().to_string(),
                            label: label.clone(),
                            start_token: i,
                            end_token: i + len,
                        });
                        i += len;
                    }
                    None => i += 1,
                }
            }
        }

        spans
    }

    fn resolve_tags(&self, provisional: &[Provisional], tokens: &mut [AnalyzedToken], sentence: &Sentence) {
        let range = sentence.start_token..sentence.end_token;
        for i in range.clone() {
            let next = if i + 1 < range.end {
                Some(provisional[i + 1])
            } else {
                None
            };
            let prev = if i > range.start {
                Some(tokens[i - 1].pos)
            } else {
                None
            };
            let lower = tokens[i].text.to_lowercase();

            let pos = match provisional[i] {
                Provisional::Participle => match next {
                    Some(Provisional::Fixed(p)) if p.is_nominal() => PartOfSpeech::Adjective,
                    _ => PartOfSpeech::Verb,
                },
                Provisional::Fixed(PartOfSpeech::Adposition) if lower == "to" => match next {
                    Some(Provisional::Fixed(PartOfSpeech::Verb)) => PartOfSpeech::Particle,
                    _ => PartOfSpeech::Adposition,
                },
                Provisional::Fixed(PartOfSpeech::Verb) if NOUN_PREFERRED_SET.contains(lower.as_str()) => {
                    match prev {
                        Some(
                            PartOfSpeech::Pronoun
                            | PartOfSpeech::Auxiliary
                            | PartOfSpeech::Particle
                            | PartOfSpeech::Adverb,
                        ) => PartOfSpeech::Verb,
                        _ => PartOfSpeech::Noun,
                    }
                }
                Provisional::Fixed(PartOfSpeech::Verb) => match prev {
                    Some(
                        PartOfSpeech::Determiner
                        | PartOfSpeech::Adjective
                        | PartOfSpeech::Adposition
                        | PartOfSpeech::Numeral,
                    ) => PartOfSpeech::Noun,
                    _ => PartOfSpeech::Verb,
                },
                Provisional::Fixed(pos) => pos,
            };
            tokens[i].pos = pos;
        }
    }

    fn assign_dependencies(tokens: &mut [AnalyzedToken], sentence: &Sentence) {
        let range = sentence.start_token..sentence.end_token;

        if let Some(root) = range.clone().find(|&i| tokens[i].pos == PartOfSpeech::Verb) {
            tokens[root].dep = DependencyRole::Root;
        }

        for i in range.clone() {
            if i + 1 < range.end && tokens[i].pos.is_nominal() && tokens[i + 1].pos.is_nominal() {
                tokens[i].dep = DependencyRole::Compound;
            }
        }

        let mut expecting: Option<DependencyRole> = None;
        for i in range {
            let pos = tokens[i].pos;
            match (expecting, pos) {
                (Some(role), p) if p.is_nominal() => {
                    if tokens[i].dep != DependencyRole::Compound {
                        tokens[i].dep = role;
                        expecting = None;
                    }
                }
                (
                    Some(_),
                    PartOfSpeech::Determiner | PartOfSpeech::Adjective | PartOfSpeech::Numeral,
                ) => {}
                (_, PartOfSpeech::Verb) => expecting = Some(DependencyRole::DirectObject),
                (_, PartOfSpeech::Adposition) => {
                    expecting = Some(DependencyRole::PrepositionalObject)
                }
                _ => expecting = None,
            }
        }
    }
}

impl LinguisticAnalyzer for LexiconAnalyzer {
    fn analyze(&self, text: &str) -> Result<ParsedText> {
        let mut tokens: Vec<AnalyzedToken> = Vec::new();
        let mut sentences: Vec<Sentence> = Vec::new();

        for (offset, raw_sentence) in text.split_sentence_bound_indices() {
            let start_token = tokens.len();
            for (word_offset, word) in raw_sentence.unicode_word_indices() {
                let start = offset + word_offset;
                tokens.push(AnalyzedToken {
                    text: word.to_string(),
                    lemma: word.to_lowercase(),
                    pos: PartOfSpeech::Other,
                    dep: DependencyRole::Dep,
                    is_stop: is_english_stop_word(&word.to_lowercase()),
                    sentence: sentences.len(),
                    start,
                    end: start + word.len(),
                });
            }
            if tokens.len() > start_token {
                sentences.push(Sentence {
                    text: raw_sentence.trim().to_string(),
                    start_token,
                    end_token: tokens.len(),
                });
            }
        }

        let entities = self.find_entities(text, &tokens, &sentences);
        let mut in_entity = vec![false; tokens.len()];
        for span in &entities {
            for flag in &mut in_entity[span.start_token..span.end_token] {
                *flag = true;
            }
        }

        let provisional: Vec<Provisional> = tokens
            .iter()
            .zip(&in_entity)
            .map(|(token, &entity)| {
                if entity {
                    Provisional::Fixed(PartOfSpeech::ProperNoun)
                } else {
                    self.first_pass_tag(&token.text.to_lowercase())
                }
            })
            .collect();

        for sentence in &sentences {
            self.resolve_tags(&provisional, &mut tokens, sentence);
            Self::assign_dependencies(&mut tokens, sentence);
        }

        for token in &mut tokens {
            token.lemma = self.lemmatizer.lemmatize(&token.text, token.pos);
        }

        trace!(
            "lexicon analysis: {} tokens, {} sentences, {} entities",
            tokens.len(),
            sentences.len(),
            entities.len()
        );

        Ok(ParsedText {
            text: text.to_string(),
            tokens,
            sentences,
            entities,
        })
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(parsed: &'a ParsedText, text: &str) -> &'a AnalyzedToken {
        parsed.tokens.iter().find(|t| t.text == text).unwrap()
    }

    #[test]
    fn test_tags_and_lemmas() {
        let analyzer = LexiconAnalyzer::new();
        let parsed = analyzer.analyze("i want to help endangered animals").unwrap();

        assert_eq!(find(&parsed, "i").pos, PartOfSpeech::Pronoun);
        assert_eq!(find(&parsed, "want").pos, PartOfSpeech::Verb);
        assert_eq!(find(&parsed, "to").pos, PartOfSpeech::Particle);
        assert_eq!(find(&parsed, "help").pos, PartOfSpeech::Verb);
        assert_eq!(find(&parsed, "endangered").pos, PartOfSpeech::Adjective);
        assert_eq!(find(&parsed, "animals").pos, PartOfSpeech::Noun);
        assert_eq!(find(&parsed, "animals").lemma, "animal");
        assert!(find(&parsed, "to").is_stop);
        assert!(!find(&parsed, "animals").is_stop);
    }

    #[test]
    fn test_dependencies() {
        let analyzer = LexiconAnalyzer::new();
        let parsed = analyzer
            .analyze("we donate clean water filters to rural schools")
            .unwrap();

        assert_eq!(find(&parsed, "donate").dep, DependencyRole::Root);
        assert_eq!(find(&parsed, "water").dep, DependencyRole::Compound);
        assert_eq!(find(&parsed, "filters").dep, DependencyRole::DirectObject);
        assert_eq!(find(&parsed, "schools").dep, DependencyRole::PrepositionalObject);
    }

    #[test]
    fn test_sentences() {
        let analyzer = LexiconAnalyzer::new();
        let parsed = analyzer
            .analyze("i care about oceans. my sister loves dogs.")
            .unwrap();

        assert_eq!(parsed.sentences.len(), 2);
        assert_eq!(find(&parsed, "oceans").sentence, 0);
        assert_eq!(find(&parsed, "dogs").sentence, 1);
        assert_eq!(find(&parsed, "care").pos, PartOfSpeech::Verb);
        assert_eq!(find(&parsed, "oceans").dep, DependencyRole::PrepositionalObject);
    }

    #[test]
    fn test_gazetteer_longest_match() {
        let analyzer = LexiconAnalyzer::new();
        let parsed = analyzer
            .analyze("support for refugees in new york city and the red cross")
            .unwrap();

        let labels: Vec<_> = parsed
            .entities
            .iter()
            .map(|e| (e.text.as_str(), e.label.as_str()))
            .collect();
        assert_eq!(labels, vec![("new york city", "GPE"), ("red cross", "ORG")]);
        assert_eq!(find(&parsed, "york").pos, PartOfSpeech::ProperNoun);
        assert_eq!(find(&parsed, "support").pos, PartOfSpeech::Noun);
    }

    #[test]
    fn test_custom_entity() {
        let analyzer = LexiconAnalyzer::new().with_entity("Ocean Trust", "ORG");
        let parsed = analyzer.analyze("i like ocean trust").unwrap();
        assert_eq!(parsed.entities.len(), 1);
        assert_eq!(parsed.entities[0].label, "ORG");
        assert!(analyzer.gazetteer_len() > 100);
    }

    #[test]
    fn test_empty_text() {
        let analyzer = LexiconAnalyzer::new();
        let parsed = analyzer.analyze("").unwrap();
        assert!(parsed.tokens.is_empty());
        assert!(parsed.sentences.is_empty());
    }
}
