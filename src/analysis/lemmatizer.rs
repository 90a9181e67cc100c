//! Rule-based English lemmatizer.
//!
//! Reduces inflected words to a dictionary form given a part of speech.
//! Irregular forms are looked up first, then suffix rules are applied. When
//! a suffix rule produces several candidate stems the one found in the known
//! verb lexicon wins.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::analysis::linguistic::PartOfSpeech;

/// Base forms of verbs the lexicon recognizes.
pub(crate) const KNOWN_VERBS: &[&str] = &[
    "adopt", "advance", "advocate", "aid", "assist", "be", "become", "bring", "build", "buy",
    "care", "change", "clean", "combat", "conserve", "contribute", "create", "cure", "defend",
    "deliver", "develop", "do", "donate", "eat", "educate", "empower", "end", "ensure", "equip",
    "eradicate", "expand", "feed", "fight", "find", "fix", "focus", "foster", "fund", "get",
    "give", "go", "grow", "have", "heal", "help", "house", "improve", "increase", "invest",
    "keep", "lead", "learn", "leave", "like", "live", "lose", "love", "make", "mentor", "move",
    "need", "nurture", "offer", "plant", "prevent", "promote", "protect", "provide", "raise",
    "reach", "read", "rebuild", "recover", "reduce", "rescue", "research", "restore", "run",
    "save", "see", "serve", "share", "shelter", "solve", "sponsor", "stop", "strengthen",
    "support", "sustain", "take", "teach", "think", "train", "treat", "tutor", "use",
    "volunteer", "want", "wish", "work", "write",
];

/// Set view of [`KNOWN_VERBS`].
pub(crate) static KNOWN_VERB_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| KNOWN_VERBS.iter().copied().collect());

static IRREGULAR_NOUNS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("children", "child"),
        ("people", "person"),
        ("women", "woman"),
        ("men", "man"),
        ("mice", "mouse"),
        ("geese", "goose"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("lives", "life"),
        ("wives", "wife"),
        ("wolves", "wolf"),
        ("leaves", "leaf"),
        ("shelves", "shelf"),
        ("halves", "half"),
        ("knives", "knife"),
        ("calves", "calf"),
        ("fish", "fish"),
        ("sheep", "sheep"),
        ("deer", "deer"),
        ("species", "species"),
        ("series", "series"),
        ("news", "news"),
        ("data", "data"),
        ("criteria", "criterion"),
        ("phenomena", "phenomenon"),
        ("alumni", "alumnus"),
        ("cacti", "cactus"),
        ("fungi", "fungus"),
        ("analyses", "analysis"),
        ("crises", "crisis"),
        ("diagnoses", "diagnosis"),
        ("oases", "oasis"),
    ]
    .into_iter()
    .collect()
});

static IRREGULAR_VERBS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("am", "be"),
        ("is", "be"),
        ("are", "be"),
        ("was", "be"),
        ("were", "be"),
        ("been", "be"),
        ("being", "be"),
        ("has", "have"),
        ("had", "have"),
        ("does", "do"),
        ("did", "do"),
        ("done", "do"),
        ("went", "go"),
        ("gone", "go"),
        ("goes", "go"),
        ("gave", "give"),
        ("given", "give"),
        ("made", "make"),
        ("took", "take"),
        ("taken", "take"),
        ("fed", "feed"),
        ("built", "build"),
        ("taught", "teach"),
        ("brought", "bring"),
        ("fought", "fight"),
        ("found", "find"),
        ("got", "get"),
        ("gotten", "get"),
        ("ran", "run"),
        ("saw", "see"),
        ("seen", "see"),
        ("thought", "think"),
        ("wrote", "write"),
        ("written", "write"),
        ("ate", "eat"),
        ("eaten", "eat"),
        ("bought", "buy"),
        ("left", "leave"),
        ("lost", "lose"),
        ("kept", "keep"),
        ("led", "lead"),
        ("grew", "grow"),
        ("grown", "grow"),
        ("became", "become"),
        ("rebuilt", "rebuild"),
    ]
    .into_iter()
    .collect()
});

/// Lemmatizer applying irregular tables and suffix rules.
#[derive(Clone, Debug, Default)]
pub struct Lemmatizer;

impl Lemmatizer {
    /// Create a new lemmatizer.
    pub fn new() -> Self {
        Lemmatizer
    }

    /// Return the lemma of `word` for the given part of speech.
    ///
    /// The input is lowercased; parts of speech other than nouns and verbs
    /// return the lowercased word unchanged.
    pub fn lemmatize(&self, word: &str, pos: PartOfSpeech) -> String {
        let word = word.to_lowercase();
        match pos {
            PartOfSpeech::Noun => self.lemmatize_noun(&word),
            PartOfSpeech::Verb | PartOfSpeech::Auxiliary => self.lemmatize_verb(&word),
            _ => word,
        }
    }

    /// Check whether `word` is an inflected or base form of a known verb.
    pub fn is_known_verb_form(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        if KNOWN_VERB_SET.contains(word.as_str()) {
            return true;
        }
        if let Some(base) = IRREGULAR_VERBS.get(word.as_str()) {
            return KNOWN_VERB_SET.contains(base);
        }
        let has_suffix = word.ends_with("ing") || word.ends_with("ed") || word.ends_with('s');
        has_suffix && KNOWN_VERB_SET.contains(self.lemmatize_verb(&word).as_str())
    }

    fn lemmatize_noun(&self, word: &str) -> String {
        if let Some(lemma) = IRREGULAR_NOUNS.get(word) {
            return (*lemma).to_string();
        }
        if word.chars().count() <= 3 {
            return word.to_string();
        }
        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{stem}y");
        }
        for suffix in ["sses", "xes", "ches", "shes", "zes", "oes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }
        if let Some(stem) = word.strip_suffix('s') {
            return stem.to_string();
        }
        word.to_string()
    }

    fn lemmatize_verb(&self, word: &str) -> String {
        if let Some(lemma) = IRREGULAR_VERBS.get(word) {
            return (*lemma).to_string();
        }
        if KNOWN_VERB_SET.contains(word) {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix("ing") {
            if stem.chars().count() >= 2 {
                return self.restore_stem(stem);
            }
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ied") {
            return format!("{stem}y");
        }
        if let Some(stem) = word.strip_suffix("ed") {
            if stem.chars().count() >= 2 {
                return self.restore_stem(stem);
            }
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{stem}y");
        }
        for suffix in ["sses", "xes", "ches", "shes", "zes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }
        if word.ends_with("ss") {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix('s') {
            return stem.to_string();
        }
        word.to_string()
    }

    /// Pick the base form for a stem left after stripping `-ing` / `-ed`.
    fn restore_stem(&self, stem: &str) -> String {
        let with_e = format!("{stem}e");
        let undoubled = undouble(stem);

        for candidate in [Some(stem.to_string()), Some(with_e.clone()), undoubled.clone()]
            .into_iter()
            .flatten()
        {
            if KNOWN_VERB_SET.contains(candidate.as_str()) {
                return candidate;
            }
        }

        if let Some(undoubled) = undoubled {
            return undoubled;
        }
        if needs_silent_e(stem) {
            return with_e;
        }
        stem.to_string()
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// `running` → `run`: a doubled final consonant other than l, s or z.
fn undouble(stem: &str) -> Option<String> {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    if n >= 3 && chars[n - 1] == chars[n - 2] {
        let c = chars[n - 1];
        if !is_vowel(c) && !matches!(c, 'l' | 's' | 'z') {
            return Some(chars[..n - 1].iter().collect());
        }
    }
    None
}

/// Stems like `donat`, `serv`, `provid` that lost a silent `e`.
fn needs_silent_e(stem: &str) -> bool {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    if n < 2 {
        return false;
    }
    let last = chars[n - 1];
    let prev = chars[n - 2];
    if matches!(last, 'v' | 'z') {
        return true;
    }
    // consonant-vowel-consonant endings like "-at", "-id", "-ir", "-ur"
    let cvc_tail = n >= 3 && !is_vowel(chars[n - 3]) && is_vowel(prev) && !is_vowel(last);
    cvc_tail && matches!(last, 't' | 'd' | 'r' | 's' | 'g' | 'k') && prev != 'e'
}
