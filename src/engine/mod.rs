//! The encoding pipeline.
//!
//! [`BeiderMorse`] is the entry point: it owns a name type, an accuracy and
//! a shared [`RuleRegistry`], and chains the components together. A single
//! word flows through normalization, language detection, the main rewrite
//! pass and two final-rules passes. A compound name splits at its first
//! word boundary and merges the encodings of the parts with the encoding of
//! the joined whole, so a match succeeds whether a corpus stores the full
//! compound or the bare surname.
//!
//! Every encode is synchronous and CPU-bound; the handle is cheap to clone
//! and safe to share across threads.

pub mod rewrite;

use std::sync::Arc;

use crate::algebra::{expand, merge, normalize_attrs};
use crate::detect::LanguageDetector;
use crate::error::InputError;
use crate::language::{Accuracy, Language, NameType};
use crate::normalize::{canonicalize_delimiters, join_leading_prefix, normalize};
use crate::rules::registry::RuleRegistry;
use crate::rules::TableKind;

use self::rewrite::{apply_final_rules, rewrite};

/// Name pieces treated as surname prefixes when they lead a compound name.
const GENERIC_PREFIXES: &[&str] = &[
    "al", "bar", "ben", "da", "dal", "de", "del", "dela", "della", "des", "di", "do", "dos",
    "du", "el", "van", "von",
];

const ASHKENAZIC_PREFIXES: &[&str] = &["bar", "ben", "da", "de", "van", "von"];

const SEPHARDIC_PREFIXES: &[&str] = &[
    "al", "da", "dal", "de", "del", "dela", "della", "des", "di", "do", "dos", "du", "el",
    "van", "von",
];

fn prefixes(name_type: NameType) -> &'static [&'static str] {
    match name_type {
        NameType::Generic => GENERIC_PREFIXES,
        NameType::Ashkenazic => ASHKENAZIC_PREFIXES,
        NameType::Sephardic => SEPHARDIC_PREFIXES,
    }
}

/// A configured Beider-Morse encoder.
///
/// # Example
///
/// ```rust
/// use beidermorse::prelude::*;
///
/// let encoder = BeiderMorse::new(NameType::Generic, Accuracy::Approximate);
/// assert_eq!(encoder.encode("Smith").unwrap(), "(smit|zmit)");
/// ```
#[derive(Clone)]
pub struct BeiderMorse {
    name_type: NameType,
    accuracy: Accuracy,
    registry: Arc<RuleRegistry>,
}

impl BeiderMorse {
    /// An encoder over the bundled rule data.
    #[cfg(feature = "embedded-rules")]
    pub fn new(name_type: NameType, accuracy: Accuracy) -> Self {
        BeiderMorse::with_registry(RuleRegistry::global(), name_type, accuracy)
    }

    /// An encoder over caller-supplied rule tables.
    pub fn with_registry(
        registry: Arc<RuleRegistry>,
        name_type: NameType,
        accuracy: Accuracy,
    ) -> Self {
        BeiderMorse {
            name_type,
            accuracy,
            registry,
        }
    }

    /// The configured name type.
    pub fn name_type(&self) -> NameType {
        self.name_type
    }

    /// The configured accuracy.
    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    /// Encode a name into its phonetic form.
    ///
    /// The result may contain `(a|b)` alternatives and `[N]` language
    /// attributes. Empty or whitespace-only input encodes to `""`; other
    /// normalization failures are returned as errors.
    pub fn encode(&self, name: &str) -> Result<String, InputError> {
        match normalize(name) {
            Ok(normalized) => Ok(self.encode_normalized(&normalized, None)),
            Err(InputError::Empty) => Ok(String::new()),
            Err(err) => Err(err),
        }
    }

    /// Encode with a caller-supplied language mask instead of running the
    /// detector.
    pub fn encode_with_mask(&self, name: &str, mask: u32) -> Result<String, InputError> {
        match normalize(name) {
            Ok(normalized) => Ok(self.encode_normalized(&normalized, Some(mask))),
            Err(InputError::Empty) => Ok(String::new()),
            Err(err) => Err(err),
        }
    }

    /// Encode a name into a list of plain alternatives: expanded, with
    /// language attributes stripped, deduplicated in first-seen order.
    pub fn encode_to_vec(&self, name: &str) -> Result<Vec<String>, InputError> {
        let encoded = self.encode(name)?;
        if encoded.is_empty() {
            return Ok(Vec::new());
        }
        let alternatives: Vec<String> = if encoded.contains('(') {
            expand(&encoded)
        } else {
            encoded.split('|').map(str::to_string).collect()
        };
        let mut out: Vec<String> = Vec::with_capacity(alternatives.len());
        for alternative in &alternatives {
            let bare = normalize_attrs(alternative, true);
            if !bare.is_empty() && !out.contains(&bare) {
                out.push(bare);
            }
        }
        Ok(out)
    }

    /// Detect the language mask of a name.
    pub fn detect(&self, name: &str) -> Result<u32, InputError> {
        let normalized = normalize(name)?;
        Ok(self.detector().detect(&normalized))
    }

    /// Detect and decode the candidate language set of a name.
    pub fn detect_languages(&self, name: &str) -> Result<Vec<Language>, InputError> {
        let normalized = normalize(name)?;
        Ok(self.detector().detect_languages(&normalized))
    }

    /// The most specific single language detected for a name.
    pub fn detect_primary(&self, name: &str) -> Result<Language, InputError> {
        let normalized = normalize(name)?;
        Ok(self.detector().detect_primary(&normalized))
    }

    fn detector(&self) -> Arc<LanguageDetector> {
        self.registry.detector(self.name_type)
    }

    fn encode_normalized(&self, normalized: &str, mask: Option<u32>) -> String {
        let prepared = canonicalize_delimiters(&join_leading_prefix(normalized), self.name_type);
        match prepared.split_once(' ') {
            None => self.encode_word(&prepared, mask),
            Some((head, tail)) => self.encode_compound(head, tail, mask),
        }
    }

    /// Compound handling: `head` is the first token, `tail` the remainder
    /// (which may still hold residual boundaries the engine skips over).
    fn encode_compound(&self, head: &str, tail: &str, mask: Option<u32>) -> String {
        let combined = format!("{head}{tail}");
        if self.accuracy == Accuracy::Exact {
            return self.encode_word(&combined, mask);
        }

        let tail_only = self.encode_word(tail, mask);
        let whole = self.encode_word(&combined, mask);
        if prefixes(self.name_type).contains(&head) {
            merge(&tail_only, &whole)
        } else {
            let head_only = self.encode_word(head, mask);
            merge(&merge(&head_only, &tail_only), &whole)
        }
    }

    /// The single-word pipeline: detect, main pass, common finals,
    /// language finals.
    fn encode_word(&self, word: &str, mask: Option<u32>) -> String {
        let mask = mask.unwrap_or_else(|| self.detector().detect(word));
        let language = self.name_type.single(mask).unwrap_or(Language::Any);

        let main = self.registry.table(self.name_type, TableKind::Main(language));
        let mut phonetic = rewrite(word, &main, mask);

        let common = self
            .registry
            .table(self.name_type, TableKind::FinalCommon(self.accuracy));
        phonetic = apply_final_rules(&phonetic, &common, mask, false);

        let language_final = self
            .registry
            .table(self.name_type, TableKind::FinalLanguage(self.accuracy, language));
        apply_final_rules(&phonetic, &language_final, mask, true)
    }
}

#[cfg(all(test, feature = "embedded-rules"))]
mod tests {
    use super::*;

    fn approx() -> BeiderMorse {
        BeiderMorse::new(NameType::Generic, Accuracy::Approximate)
    }

    #[test]
    fn test_empty_input_encodes_to_empty() {
        let encoder = approx();
        assert_eq!(encoder.encode("").unwrap(), "");
        assert_eq!(encoder.encode("   ").unwrap(), "");
        assert_eq!(encoder.encode_to_vec("").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_detect_empty_is_error() {
        assert_eq!(approx().detect("  "), Err(InputError::Empty));
    }

    #[test]
    fn test_too_long_propagates() {
        let long = "a".repeat(2000);
        assert!(matches!(
            approx().encode(&long),
            Err(InputError::TooLong { .. })
        ));
    }

    #[test]
    fn test_encode_to_vec_strips_attributes() {
        let encoder = approx();
        for alternative in encoder.encode_to_vec("Schwarzenegger").unwrap() {
            assert!(!alternative.contains('['), "attribute left in {alternative}");
            assert!(!alternative.contains('('));
        }
    }

    #[test]
    fn test_prefix_sets_nest() {
        for prefix in ASHKENAZIC_PREFIXES {
            assert!(GENERIC_PREFIXES.contains(prefix));
        }
        for prefix in SEPHARDIC_PREFIXES {
            assert!(GENERIC_PREFIXES.contains(prefix));
        }
    }
}
