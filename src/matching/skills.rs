//! Skill vocabulary normalization: taxonomy, synonyms, word-boundary matching

use crate::error::{MatcherError, Result};
use aho_corasick::AhoCorasick;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use strsim::jaro_winkler;

/// Minimum Jaro-Winkler similarity for a misspelled term to snap onto a
/// canonical tag.
const FUZZY_THRESHOLD: f64 = 0.92;

/// Canonicalizes free-text and skill-list input into tagged skill sets.
///
/// Alias matching is word-boundary aware: "java" never fires inside
/// "javascript". Terms that resolve to no canonical skill are passed through
/// lowercased so literal comparison with requisition skills stays possible.
pub struct SkillNormalizer {
    alias_matcher: AhoCorasick,
    /// Pattern index -> canonical tag, parallel to the matcher's patterns.
    alias_canonicals: Vec<String>,
    alias_patterns: Vec<String>,
    /// Exact alias -> canonical lookup for single-term canonicalization.
    alias_index: HashMap<String, String>,
    taxonomy: HashMap<String, Vec<String>>,
    qualifier_pattern: Regex,
}

impl SkillNormalizer {
    /// Build a normalizer over the default taxonomy and synonym table.
    pub fn new() -> Result<Self> {
        Self::with_tables(Self::default_taxonomy(), Self::default_synonyms())
    }

    /// Build a normalizer over caller-supplied tables. The synonym table maps
    /// canonical skill -> alias list; the canonical name is always an alias
    /// of itself.
    pub fn with_tables(
        taxonomy: HashMap<String, Vec<String>>,
        synonyms: HashMap<String, Vec<String>>,
    ) -> Result<Self> {
        let mut alias_patterns = Vec::new();
        let mut alias_canonicals = Vec::new();
        let mut alias_index = HashMap::new();

        let mut canonicals: BTreeSet<String> = taxonomy
            .values()
            .flatten()
            .map(|s| s.to_lowercase())
            .collect();
        canonicals.extend(synonyms.keys().map(|s| s.to_lowercase()));

        for canonical in &canonicals {
            let mut aliases = vec![canonical.clone()];
            if let Some(extra) = synonyms.get(canonical) {
                aliases.extend(extra.iter().map(|a| a.to_lowercase()));
            }
            for alias in aliases {
                if alias_index.contains_key(&alias) {
                    continue;
                }
                alias_index.insert(alias.clone(), canonical.clone());
                alias_patterns.push(alias);
                alias_canonicals.push(canonical.clone());
            }
        }

        let alias_matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(aho_corasick::MatchKind::LeftmostLongest)
            .build(&alias_patterns)
            .map_err(|e| {
                MatcherError::Configuration(format!("failed to build skill matcher: {}", e))
            })?;

        let qualifier_pattern = Regex::new(
            r"(?i)^(?:required|must have|should have|experience (?:with|in)|knowledge of|proficient (?:with|in)|expert (?:with|in))\s*:?\s*",
        )
        .map_err(|e| MatcherError::Configuration(format!("invalid qualifier pattern: {}", e)))?;

        Ok(Self {
            alias_matcher,
            alias_canonicals,
            alias_patterns,
            alias_index,
            taxonomy,
            qualifier_pattern,
        })
    }

    /// Normalize delimiter-separated skill text into canonical tags.
    ///
    /// Segments that hit no known alias are passed through verbatim
    /// (lowercased) rather than dropped. Empty input yields an empty set.
    pub fn normalize(&self, text: &str) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        if text.trim().is_empty() {
            return tags;
        }

        for segment in text.split(|c| matches!(c, ',' | ';' | '|' | '\n' | '•')) {
            let segment = self
                .qualifier_pattern
                .replace(segment.trim(), "")
                .to_lowercase();
            let segment = segment.trim().to_string();
            if segment.is_empty() {
                continue;
            }
            let hits = self.extract(&segment);
            if !hits.is_empty() {
                tags.extend(hits);
                continue;
            }
            if let Some(canonical) = self.fuzzy_canonical(&segment) {
                tags.insert(canonical);
                continue;
            }
            // Unknown term: keep it comparable with requisition skills.
            if segment.len() <= 50 {
                tags.insert(segment);
            }
        }
        tags
    }

    /// Recover near-miss spellings ("pyton", "kubernets") against canonical
    /// tags only, never against short aliases where one edit flips meaning.
    fn fuzzy_canonical(&self, term: &str) -> Option<String> {
        if term.len() < 4 {
            return None;
        }
        let mut best: Option<(f64, &str)> = None;
        for canonical in self.alias_index.values() {
            if canonical.len() < 4 {
                continue;
            }
            let score = jaro_winkler(term, canonical);
            if score >= FUZZY_THRESHOLD && best.map_or(true, |(b, _)| score > b) {
                best = Some((score, canonical));
            }
        }
        best.map(|(_, canonical)| canonical.to_string())
    }

    /// Normalize a structured skill list, one term per entry.
    pub fn normalize_list<S: AsRef<str>>(&self, skills: &[S]) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        for skill in skills {
            let term = skill.as_ref().trim().to_lowercase();
            if term.is_empty() {
                continue;
            }
            tags.insert(self.canonical_of(&term).unwrap_or(term));
        }
        tags
    }

    /// Extract canonical tags from free prose. Unlike [`normalize`], unknown
    /// words are not passed through; résumé text would drown the set.
    ///
    /// [`normalize`]: SkillNormalizer::normalize
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let haystack = text.to_lowercase();
        let mut tags = BTreeSet::new();

        for mat in self.alias_matcher.find_iter(&haystack) {
            if !Self::on_word_boundary(&haystack, mat.start(), mat.end()) {
                continue;
            }
            tags.insert(self.alias_canonicals[mat.pattern()].clone());
        }
        tags
    }

    /// True when two skill terms are equal after normalization or belong to
    /// the same synonym group.
    pub fn matches(&self, a: &str, b: &str) -> bool {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        if a.is_empty() || b.is_empty() {
            return false;
        }
        let ca = self.canonical_of(&a).unwrap_or(a);
        let cb = self.canonical_of(&b).unwrap_or(b);
        ca == cb
    }

    /// Resolve a single lowercased term to its canonical tag, if known.
    pub fn canonical_of(&self, term: &str) -> Option<String> {
        self.alias_index.get(term).cloned()
    }

    /// Category of a canonical tag, if it appears in the taxonomy.
    pub fn category_of(&self, tag: &str) -> Option<&str> {
        self.taxonomy
            .iter()
            .find(|(_, skills)| skills.iter().any(|s| s == tag))
            .map(|(category, _)| category.as_str())
    }

    pub fn alias_count(&self) -> usize {
        self.alias_patterns.len()
    }

    /// A match only counts when its neighborhood is non-alphanumeric, so
    /// substrings of longer identifiers never qualify.
    fn on_word_boundary(haystack: &str, start: usize, end: usize) -> bool {
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    }

    /// Category taxonomy: category -> canonical skills.
    fn default_taxonomy() -> HashMap<String, Vec<String>> {
        let entries: &[(&str, &[&str])] = &[
            (
                "programming",
                &["python", "java", "javascript", "typescript", "c++", "c#", "php", "ruby", "go", "rust"],
            ),
            (
                "web",
                &["html", "css", "react", "vue", "angular", "node.js", "django", "flask", "spring"],
            ),
            (
                "database",
                &["sql", "mysql", "postgresql", "mongodb", "redis", "oracle", "elasticsearch"],
            ),
            (
                "devops",
                &["docker", "kubernetes", "aws", "azure", "gcp", "jenkins", "git", "terraform", "ci/cd"],
            ),
            (
                "data_science",
                &["pandas", "numpy", "tensorflow", "pytorch", "machine learning", "ai", "spark"],
            ),
            (
                "mobile",
                &["android", "ios", "react native", "flutter", "swift", "kotlin"],
            ),
            (
                "soft_skills",
                &["communication", "leadership", "teamwork", "problem solving", "creativity", "adaptability"],
            ),
        ];
        entries
            .iter()
            .map(|(category, skills)| {
                (
                    category.to_string(),
                    skills.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect()
    }

    /// Synonym table: canonical skill -> surface-form aliases.
    fn default_synonyms() -> HashMap<String, Vec<String>> {
        let entries: &[(&str, &[&str])] = &[
            ("javascript", &["js", "ecmascript"]),
            ("typescript", &["ts"]),
            ("python", &["py"]),
            ("kubernetes", &["k8s"]),
            ("aws", &["amazon web services"]),
            ("gcp", &["google cloud", "google cloud platform"]),
            ("react", &["reactjs", "react.js"]),
            ("vue", &["vuejs", "vue.js"]),
            ("node.js", &["node", "nodejs"]),
            ("postgresql", &["postgres"]),
            ("mongodb", &["mongo"]),
            ("machine learning", &["ml"]),
            ("ci/cd", &["cicd", "continuous integration"]),
        ];
        entries
            .iter()
            .map(|(canonical, aliases)| {
                (
                    canonical.to_string(),
                    aliases.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect()
    }
}
