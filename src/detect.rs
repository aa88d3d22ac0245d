//! Language detection.
//!
//! The detector narrows a running mask of candidate languages by applying
//! pattern rules in order: an *accept* rule intersects the running mask
//! with its language set, a *reject* rule removes its language set. The
//! result selects the language-specific rule tables and gates attribute
//! compatibility during rewrites.
//!
//! Intersection semantics make multiple accept rules cumulative; reject
//! rules remove specific candidates without recomputing the universe. If
//! every bit is cleared the detector reports [`Language::Any`].

use regex::Regex;

use crate::language::{Language, NameType};

/// One detection rule: a pattern over the normalized input plus the
/// language set it accepts or rejects.
#[derive(Debug)]
pub struct DetectRule {
    regex: Regex,
    languages: u32,
    accept: bool,
}

impl DetectRule {
    /// Build a rule from an already compiled regex.
    pub fn new(regex: Regex, languages: u32, accept: bool) -> Self {
        DetectRule {
            regex,
            languages,
            accept,
        }
    }

    /// The language mask this rule accepts or rejects.
    pub fn languages(&self) -> u32 {
        self.languages
    }

    /// True for accept rules, false for reject rules.
    pub fn accept(&self) -> bool {
        self.accept
    }

    /// Whether the rule's pattern occurs in `input`.
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }
}

/// A pattern-driven language detector for one name type.
#[derive(Debug)]
pub struct LanguageDetector {
    name_type: NameType,
    rules: Vec<DetectRule>,
}

impl LanguageDetector {
    /// Build a detector over an ordered rule list.
    pub fn new(name_type: NameType, rules: Vec<DetectRule>) -> Self {
        LanguageDetector { name_type, rules }
    }

    /// A detector with no rules; every input maps to the full universe.
    pub fn empty(name_type: NameType) -> Self {
        LanguageDetector::new(name_type, Vec::new())
    }

    /// The name type this detector narrows within.
    pub fn name_type(&self) -> NameType {
        self.name_type
    }

    /// Narrow the universe mask by every matching rule, in rule order.
    ///
    /// Returns [`Language::Any`]'s value (1) when the rules clear every
    /// bit.
    pub fn detect(&self, input: &str) -> u32 {
        let universe = self.name_type.universe();
        let mut remaining = universe;
        for rule in &self.rules {
            if !rule.is_match(input) {
                continue;
            }
            if rule.accept {
                remaining &= rule.languages;
            } else {
                remaining &= !rule.languages & universe;
            }
        }
        if remaining == 0 {
            1
        } else {
            remaining
        }
    }

    /// Decode [`detect`](Self::detect) into the set of languages.
    pub fn detect_languages(&self, input: &str) -> Vec<Language> {
        self.name_type.decode(self.detect(input))
    }

    /// The first detected language that is not [`Language::Any`], or `Any`
    /// when nothing more specific remains.
    pub fn detect_primary(&self, input: &str) -> Language {
        let mask = self.detect(input);
        self.name_type
            .languages()
            .iter()
            .copied()
            .find(|lang| {
                *lang != Language::Any
                    && lang.mask(self.name_type).map(|m| m & mask != 0).unwrap_or(false)
            })
            .unwrap_or(Language::Any)
    }
}
