//! Paradigm Selection
//!
//! Static keyword routing from a task to a Sketch-of-Thought reasoning paradigm.
//! Checks run in priority order (math, then domain, then conceptual) and the first
//! match wins; anything unmatched falls through to conceptual chaining.

use serde::{Deserialize, Serialize};

/// Sketch-of-Thought reasoning paradigm
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Paradigm {
    /// Concepts linked with arrows: `Seoul -> South Korea -> Won`
    ConceptualChaining,
    /// Quantitative reasoning compressed into equations
    ChunkedSymbolism,
    /// Domain shorthand and abbreviations
    ExpertLexicon,
    /// Plain step-by-step reasoning
    Default,
}

impl Paradigm {
    pub const ALL: [Self; 4] = [
        Self::ConceptualChaining,
        Self::ChunkedSymbolism,
        Self::ExpertLexicon,
        Self::Default,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConceptualChaining => "conceptual_chaining",
            Self::ChunkedSymbolism => "chunked_symbolism",
            Self::ExpertLexicon => "expert_lexicon",
            Self::Default => "default",
        }
    }
}

impl std::fmt::Display for Paradigm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expert domain recognised by the lexicon check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Medical,
    Programming,
    Finance,
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Medical => write!(f, "medical"),
            Self::Programming => write!(f, "programming"),
            Self::Finance => write!(f, "finance"),
        }
    }
}

pub const MATH_KEYWORDS: &[&str] = &[
    "calculate", "compute", "solve", "equation", "formula",
    "how many", "what is the value", "percent", "average",
    "+", "-", "*", "/", "=", ">", "<", "≤", "≥",
];

pub const MEDICAL_KEYWORDS: &[&str] = &["patient", "diagnosis", "treatment", "symptom", "disease"];

pub const PROGRAMMING_KEYWORDS: &[&str] = &["code", "function", "class", "algorithm", "variable"];

pub const FINANCE_KEYWORDS: &[&str] = &["stock", "investment", "portfolio", "return", "market"];

pub const CONCEPTUAL_KEYWORDS: &[&str] = &[
    "relate", "connect", "compare", "contrast", "difference",
    "similarity", "causation", "impact", "effect", "influence",
    "why", "how does", "what causes", "relationship",
];

/// Keyword tables driving selection
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeywordTables {
    pub math: Vec<String>,

    /// Checked in order; the first domain with a hit wins
    pub domains: Vec<(Domain, Vec<String>)>,

    pub conceptual: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_owned()).collect()
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            math: owned(MATH_KEYWORDS),
            domains: vec![
                (Domain::Medical, owned(MEDICAL_KEYWORDS)),
                (Domain::Programming, owned(PROGRAMMING_KEYWORDS)),
                (Domain::Finance, owned(FINANCE_KEYWORDS)),
            ],
            conceptual: owned(CONCEPTUAL_KEYWORDS),
        }
    }
}

/// Keyword-driven paradigm classifier
#[derive(Clone, Debug, Default)]
pub struct ParadigmSelector {
    tables: KeywordTables,
}

impl ParadigmSelector {
    pub const fn new(tables: KeywordTables) -> Self {
        Self { tables }
    }

    pub const fn tables(&self) -> &KeywordTables {
        &self.tables
    }

    /// Pick the paradigm for `task`
    ///
    /// The matched expert domain is logged but not part of the result.
    pub fn select(&self, task: &str) -> Paradigm {
        let lowered = task.to_lowercase();
        let excerpt = crate::completion::preview(task);

        if contains_any(&lowered, &self.tables.math) {
            tracing::debug!(task = %excerpt, "Selected paradigm 'chunked_symbolism'");
            return Paradigm::ChunkedSymbolism;
        }

        for (domain, keywords) in &self.tables.domains {
            if contains_any(&lowered, keywords) {
                tracing::debug!(%domain, task = %excerpt, "Selected paradigm 'expert_lexicon'");
                return Paradigm::ExpertLexicon;
            }
        }

        if contains_any(&lowered, &self.tables.conceptual) {
            tracing::debug!(task = %excerpt, "Selected paradigm 'conceptual_chaining'");
            return Paradigm::ConceptualChaining;
        }

        tracing::debug!(task = %excerpt, "Using default paradigm 'conceptual_chaining'");
        Paradigm::ConceptualChaining
    }
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| haystack.contains(k.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(task: &str) -> Paradigm {
        ParadigmSelector::default().select(task)
    }

    #[test]
    fn test_math_keywords_pick_chunked_symbolism() {
        assert_eq!(select("calculate 3+2"), Paradigm::ChunkedSymbolism);
        assert_eq!(select("What is 7 ≥ 3?"), Paradigm::ChunkedSymbolism);
        assert_eq!(select("Solve for the unknown"), Paradigm::ChunkedSymbolism);
    }

    #[test]
    fn test_domain_keywords_pick_expert_lexicon() {
        assert_eq!(select("patient treatment plan"), Paradigm::ExpertLexicon);
        assert_eq!(select("Review this Algorithm"), Paradigm::ExpertLexicon);
        assert_eq!(select("stock outlook"), Paradigm::ExpertLexicon);
    }

    #[test]
    fn test_math_outranks_domain() {
        assert_eq!(select("calculate the patient dosage"), Paradigm::ChunkedSymbolism);
    }

    #[test]
    fn test_symbols_match_inside_words() {
        // "-" is a math keyword, so hyphenated words route to chunked symbolism
        assert_eq!(select("a well-known fact"), Paradigm::ChunkedSymbolism);
    }

    #[test]
    fn test_unmatched_tasks_default_to_conceptual_chaining() {
        assert_eq!(select("Tell me about Seoul"), Paradigm::ConceptualChaining);
        assert_eq!(select("Why is the sky blue"), Paradigm::ConceptualChaining);
        assert_eq!(select(""), Paradigm::ConceptualChaining);
    }

    #[test]
    fn test_custom_tables() {
        let mut tables = KeywordTables::default();
        tables.math.clear();
        tables.domains.clear();
        let selector = ParadigmSelector::new(tables);
        assert_eq!(selector.select("calculate 3+2"), Paradigm::ConceptualChaining);
    }

    #[test]
    fn test_paradigm_names() {
        let names: Vec<&str> = Paradigm::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            names,
            ["conceptual_chaining", "chunked_symbolism", "expert_lexicon", "default"]
        );
        assert_eq!(
            serde_json::to_string(&Paradigm::ExpertLexicon).unwrap(),
            r#""expert_lexicon""#
        );
    }
}
