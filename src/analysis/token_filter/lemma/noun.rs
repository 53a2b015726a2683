//! Dictionary-style noun lemmatizer.
//!
//! Plural nouns are reduced in two passes, the way WordNet's morphological
//! processor works: an exception table handles irregular forms, then a short
//! list of suffix detachment rules handles regular ones. Rules never produce
//! a base shorter than [`MIN_BASE_LENGTH`] characters.
//!
//! Both passes repeat until the word stops changing, so a lemma is always its
//! own lemma ("mens" -> "men" -> "man").
//!
//! ```text
//! women    -> woman     (exception)
//! stories  -> story     (ies -> y)
//! churches -> church    (ches -> ch)
//! votes    -> vote      (s -> "")
//! crisis   -> crisis    (protected "is" ending)
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use super::Lemmatizer;

/// Shortest base a detachment rule may produce.
pub const MIN_BASE_LENGTH: usize = 3;

/// Suffix detachment rules, tried in order; the first matching suffix wins.
const DETACHMENT_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ies", "y"),
    ("xes", "x"),
    ("zzes", "zz"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("s", ""),
];

/// Upper bound on reduction steps; guards against cyclic custom tables.
const MAX_REDUCTIONS: usize = 8;

/// Endings that look plural but are not.
const PROTECTED_ENDINGS: &[&str] = &["ss", "us", "is"];

/// Nouns whose singular form ends in "s".
const INVARIANT_NOUNS: &[&str] = &[
    "news", "series", "species", "means", "headquarters", "physics", "politics", "economics",
    "mathematics", "ethics", "athletics", "aerobics", "diabetes", "measles", "mumps", "rabies",
    "herpes", "scissors", "trousers", "pants", "jeans", "thanks", "whereabouts", "barracks",
];

/// Irregular plurals and plurals the rules would get wrong.
const DEFAULT_EXCEPTIONS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("wolves", "wolf"),
    ("halves", "half"),
    ("thieves", "thief"),
    ("shelves", "shelf"),
    ("calves", "calf"),
    ("loaves", "loaf"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("theses", "thesis"),
    ("hypotheses", "hypothesis"),
    ("diagnoses", "diagnosis"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("appendices", "appendix"),
    ("vertices", "vertex"),
    ("businessmen", "businessman"),
    ("businesswomen", "businesswoman"),
    ("congressmen", "congressman"),
    ("congresswomen", "congresswoman"),
    ("chairmen", "chairman"),
    ("policemen", "policeman"),
    ("firemen", "fireman"),
    ("gentlemen", "gentleman"),
    ("spokesmen", "spokesman"),
    ("spokeswomen", "spokeswoman"),
    ("servicemen", "serviceman"),
    ("countrymen", "countryman"),
    ("movies", "movie"),
    ("cookies", "cookie"),
    ("zombies", "zombie"),
    ("calories", "calorie"),
    ("rookies", "rookie"),
    ("selfies", "selfie"),
    ("lies", "lie"),
    ("ties", "tie"),
    ("pies", "pie"),
    ("aunties", "auntie"),
    ("freebies", "freebie"),
    ("goalies", "goalie"),
    ("prairies", "prairie"),
    ("aches", "ache"),
    ("headaches", "headache"),
    ("niches", "niche"),
    ("caches", "cache"),
    ("avalanches", "avalanche"),
    ("quizzes", "quiz"),
    ("buses", "bus"),
    ("gases", "gas"),
    ("viruses", "virus"),
    ("bonuses", "bonus"),
    ("campuses", "campus"),
    ("statuses", "status"),
    ("censuses", "census"),
];

static DEFAULT_EXCEPTION_MAP: LazyLock<HashMap<String, String>> = LazyLock::new(|| {
    DEFAULT_EXCEPTIONS
        .iter()
        .map(|&(inflected, base)| (inflected.to_string(), base.to_string()))
        .collect()
});

static INVARIANT_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| INVARIANT_NOUNS.iter().copied().collect());

/// Rule and exception based noun lemmatizer.
#[derive(Debug, Clone)]
pub struct NounLemmatizer {
    exceptions: HashMap<String, String>,
}

impl NounLemmatizer {
    /// Create a lemmatizer with the built-in exception table.
    pub fn new() -> Self {
        NounLemmatizer {
            exceptions: DEFAULT_EXCEPTION_MAP.clone(),
        }
    }

    /// Create a lemmatizer with a custom exception table.
    pub fn with_exceptions(exceptions: HashMap<String, String>) -> Self {
        NounLemmatizer { exceptions }
    }

    /// Parse a WordNet-style exception list.
    ///
    /// Each line holds an inflected form followed by one or more base forms;
    /// the first base form is used. Blank lines and `#` comments are ignored.
    pub fn parse_exceptions(content: &str) -> HashMap<String, String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                let inflected = fields.next()?;
                let base = fields.next()?;
                Some((inflected.to_lowercase(), base.to_lowercase()))
            })
            .collect()
    }

    /// Number of entries in the exception table.
    pub fn exception_count(&self) -> usize {
        self.exceptions.len()
    }

    fn detach(word: &str) -> Option<String> {
        let (suffix, replacement) = DETACHMENT_RULES
            .iter()
            .find(|(suffix, _)| word.ends_with(suffix))?;

        if suffix.len() == 1 && PROTECTED_ENDINGS.iter().any(|ending| word.ends_with(ending)) {
            return None;
        }

        let base = format!("{}{}", &word[..word.len() - suffix.len()], replacement);
        (base.len() >= MIN_BASE_LENGTH).then_some(base)
    }

    /// One reduction step, or `None` when the word is already a base form.
    fn reduce(&self, word: &str) -> Option<String> {
        if let Some(base) = self.exceptions.get(word) {
            return (base != word).then(|| base.clone());
        }

        if !word.bytes().all(|b| b.is_ascii_lowercase()) || INVARIANT_SET.contains(word) {
            return None;
        }

        Self::detach(word)
    }
}

impl Default for NounLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer for NounLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        let mut current = word.to_string();
        for _ in 0..MAX_REDUCTIONS {
            match self.reduce(&current) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    fn name(&self) -> &'static str {
        "noun"
    }
}
